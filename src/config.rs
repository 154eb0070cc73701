//! 入力設定
//!
//! 文字種・長さ制限・先行入力の破棄・単独ESCの待ち時間をまとめる

use crate::buffer::{CharClass, EditBuffer};
use crate::key::KeyEncoding;
use std::time::Duration;

/// 1回の入力に対する設定
#[derive(Debug, Clone, Copy)]
pub struct InputOptions {
    /// 受け付ける文字種
    pub char_class: CharClass,
    /// 最大文字数（`None` は無制限）
    pub limit: Option<usize>,
    /// 表示前と各編集後に溜まった入力を捨てるか
    pub flush: bool,
    /// `ESC` の後の継続単位を待つ時間（`None` は届くまで待つ）
    pub escape_timeout: Option<Duration>,
}

impl InputOptions {
    /// 単独ESCの既定待ち時間
    pub const DEFAULT_ESCAPE_TIMEOUT: Duration = Duration::from_millis(50);

    /// 汎用文字入力の設定
    pub fn general(limit: Option<usize>) -> Self {
        Self {
            limit,
            ..Self::default()
        }
    }

    /// 数字入力の設定
    pub fn digits() -> Self {
        Self {
            char_class: CharClass::Digits,
            ..Self::default()
        }
    }

    pub fn with_flush(mut self, flush: bool) -> Self {
        self.flush = flush;
        self
    }

    pub fn with_escape_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.escape_timeout = timeout;
        self
    }

    /// 設定どおりの編集バッファを作成
    pub fn edit_buffer(&self) -> EditBuffer {
        EditBuffer::new(self.char_class, self.limit)
    }

    /// POSIX符号化に待ち時間を反映（コンソールは常に後続が届くので変更しない）
    pub fn key_encoding(&self) -> KeyEncoding {
        if cfg!(windows) {
            KeyEncoding::CONSOLE
        } else {
            KeyEncoding::POSIX.with_escape_timeout(self.escape_timeout)
        }
    }
}

impl Default for InputOptions {
    fn default() -> Self {
        Self {
            char_class: CharClass::General,
            limit: None,
            flush: true,
            escape_timeout: Some(Self::DEFAULT_ESCAPE_TIMEOUT),
        }
    }
}
