//! 入力プロンプト
//!
//! 文字列入力・整数入力の公開エントリポイント。どちらも同じ編集セッションを
//! 設定違いで使う薄いラッパー。

use crate::buffer::CharClass;
use crate::config::InputOptions;
use crate::error::{InputError, Result};
use crate::key::KeySource;
use crate::session::EditSession;
use std::io::{self, Write};
use std::time::Duration;

/// 1回分の入力プロンプト
#[derive(Debug, Clone)]
pub struct Prompt {
    message: String,
    options: InputOptions,
}

impl Prompt {
    /// メッセージを指定してプロンプトを作成
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            options: InputOptions::default(),
        }
    }

    /// 設定を丸ごと指定
    pub fn with_options(mut self, options: InputOptions) -> Self {
        self.options = options;
        self
    }

    /// 最大文字数
    pub fn limit(mut self, limit: usize) -> Self {
        self.options.limit = Some(limit);
        self
    }

    /// 先行入力を捨てるか
    pub fn flush(mut self, flush: bool) -> Self {
        self.options.flush = flush;
        self
    }

    /// 受け付ける文字種
    pub fn char_class(mut self, class: CharClass) -> Self {
        self.options.char_class = class;
        self
    }

    /// 単独ESCの待ち時間
    pub fn escape_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.options.escape_timeout = timeout;
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn options(&self) -> &InputOptions {
        &self.options
    }

    /// 端末から文字列を読む（Escapeなら `None`）
    pub fn read_line(&self) -> Result<Option<String>> {
        let source = native_source(&self.options);
        self.run_with(source, io::stdout())
    }

    /// 端末から整数を読む（Escapeなら `None`）
    pub fn read_integer(&self) -> Result<Option<u64>> {
        let source = native_source(&self.options);
        self.read_integer_with(source, io::stdout())
    }

    /// 任意の入力元・出力先で文字列を読む
    pub fn run_with<K: KeySource, W: Write>(&self, source: K, out: W) -> Result<Option<String>> {
        let mut session = EditSession::new(source, self.options.edit_buffer(), out, self.options.flush);
        session.run(&self.message)
    }

    /// 任意の入力元・出力先で整数を読む（文字種は数字に固定）
    pub fn read_integer_with<K: KeySource, W: Write>(&self, source: K, out: W) -> Result<Option<u64>> {
        let digits = self.clone().char_class(CharClass::Digits);
        digits
            .run_with(source, out)?
            .map(|text| parse_integer(&text))
            .transpose()
    }
}

#[cfg(unix)]
fn native_source(options: &InputOptions) -> crate::key::PosixKeySource {
    crate::key::PosixKeySource::with_encoding(options.key_encoding())
}

#[cfg(windows)]
fn native_source(_options: &InputOptions) -> crate::key::ConsoleKeySource {
    crate::key::ConsoleKeySource::new()
}

/// 数字列を整数に変換（空文字列は0）
pub fn parse_integer(digits: &str) -> Result<u64> {
    if digits.is_empty() {
        return Ok(0);
    }
    digits.parse::<u64>().map_err(|_| {
        let error = InputError::InvalidNumber {
            digits: digits.to_string(),
        };
        log::log!(error.log_level(), "{}", error);
        error
    })
}

/// 文字列を1行読む
///
/// `limiter` で最大文字数を制限する。空のまま確定すると `"0"` を返す。
pub fn read_line(prompt: &str, limiter: Option<usize>, flush: bool) -> Result<Option<String>> {
    Prompt::new(prompt)
        .with_options(InputOptions::general(limiter).with_flush(flush))
        .read_line()
}

/// 整数を1つ読む
pub fn read_integer(prompt: &str, flush: bool) -> Result<Option<u64>> {
    Prompt::new(prompt)
        .with_options(InputOptions::digits().with_flush(flush))
        .read_integer()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::ScriptedKeySource;

    #[test]
    fn parse_integer_values() {
        assert_eq!(parse_integer("42").unwrap(), 42);
        assert_eq!(parse_integer("007").unwrap(), 7);
        assert_eq!(parse_integer("").unwrap(), 0);
        assert!(matches!(
            parse_integer("18446744073709551616"),
            Err(InputError::InvalidNumber { .. })
        ));
    }

    #[test]
    fn builder_sets_options() {
        let prompt = Prompt::new("age: ").limit(3).flush(false).escape_timeout(None);
        assert_eq!(prompt.message(), "age: ");
        assert_eq!(prompt.options().limit, Some(3));
        assert!(!prompt.options().flush);
        assert_eq!(prompt.options().escape_timeout, None);
    }

    #[test]
    fn read_integer_forces_digit_class() {
        let prompt = Prompt::new("n: ").flush(false);
        let value = prompt
            .read_integer_with(ScriptedKeySource::new("4a2\r"), Vec::new())
            .unwrap();
        assert_eq!(value, Some(42));
    }

    #[test]
    fn read_integer_cancelled() {
        let prompt = Prompt::new("n: ").flush(false);
        let value = prompt
            .read_integer_with(ScriptedKeySource::new("12\x1b"), Vec::new())
            .unwrap();
        assert_eq!(value, None);
    }

    #[test]
    fn read_integer_overflow_is_error() {
        let prompt = Prompt::new("").flush(false);
        let result = prompt.read_integer_with(
            ScriptedKeySource::new("99999999999999999999\r"),
            Vec::new(),
        );
        assert!(matches!(result, Err(InputError::InvalidNumber { .. })));
    }
}
