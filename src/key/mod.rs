//! キー入力モジュール
//!
//! 生の入力単位を論理キーへ解釈するためのエスケープ表とキー割り当て、
//! およびプラットフォームごとのキー入力元を提供

use std::time::Duration;

pub mod source;
pub mod scripted;

#[cfg(unix)]
pub mod posix;
#[cfg(windows)]
pub mod console;

// 公開API
pub use scripted::ScriptedKeySource;
pub use source::{KeySource, RawModeGuard};

#[cfg(unix)]
pub use posix::PosixKeySource;
#[cfg(windows)]
pub use console::ConsoleKeySource;

/// 生の入力単位（POSIXではUTF-8を組み立てた1文字、コンソールではワイド文字1つ）
pub type RawUnit = char;

/// プラットフォームに依存しない論理キー
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalKey {
    /// 内容として入力され得る文字
    Char(char),
    Enter,
    Backspace,
    Delete,
    Escape,
    ArrowLeft,
    ArrowRight,
    /// 認識されない入力
    Ignored,
}

/// エスケープシーケンスの曖昧さ解消表
///
/// レベル `i` には長さ `i + 1` の接頭辞が並び、いずれかに一致した場合のみ
/// もう1単位読み進める。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EscapeTable {
    levels: &'static [&'static [&'static str]],
}

impl EscapeTable {
    /// POSIX端末: `ESC` 単独、続いて `ESC [` / `ESC O`
    pub const POSIX: EscapeTable = EscapeTable {
        levels: &[&["\x1b"], &["\x1b[", "\x1bO"]],
    };

    /// レガシーコンソール: 先行バイトの後に必ず1バイト続く
    pub const CONSOLE: EscapeTable = EscapeTable {
        levels: &[&["\x00", "\u{e0}"]],
    };

    /// 追加で読み得る最大単位数
    pub fn depth(&self) -> usize {
        self.levels.len()
    }

    /// `sequence` が継続を要求する接頭辞かどうか
    pub fn expects_continuation(&self, sequence: &str) -> bool {
        let len = sequence.chars().count();
        len >= 1
            && self
                .levels
                .get(len - 1)
                .is_some_and(|level| level.contains(&sequence))
    }
}

/// 1つのプラットフォームのキー符号化
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEncoding {
    escapes: EscapeTable,
    bindings: &'static [(&'static str, LogicalKey)],
    csi: Option<&'static str>,
    escape_timeout: Option<Duration>,
}

/// 1つのCSIシーケンスとして読み進める最大単位数
const MAX_CSI_LEN: usize = 32;

/// CSIのパラメータ・中間バイト（`0`-`9` `;` `?` や空白など）
fn is_csi_parameter(ch: char) -> bool {
    matches!(u32::from(ch), 0x20..=0x3f)
}

const POSIX_BINDINGS: &[(&str, LogicalKey)] = &[
    ("\r", LogicalKey::Enter),
    ("\n", LogicalKey::Enter),
    ("\x08", LogicalKey::Backspace),
    ("\x7f", LogicalKey::Backspace),
    ("\x1b", LogicalKey::Escape),
    ("\x1b[3~", LogicalKey::Delete),
    ("\x1b[D", LogicalKey::ArrowLeft),
    ("\x1bOD", LogicalKey::ArrowLeft),
    ("\x1b[C", LogicalKey::ArrowRight),
    ("\x1bOC", LogicalKey::ArrowRight),
];

const CONSOLE_BINDINGS: &[(&str, LogicalKey)] = &[
    ("\r", LogicalKey::Enter),
    ("\x08", LogicalKey::Backspace),
    ("\x1b", LogicalKey::Escape),
    ("\x00\x53", LogicalKey::Delete),
    ("\u{e0}\x53", LogicalKey::Delete),
    ("\x00\x4b", LogicalKey::ArrowLeft),
    ("\u{e0}\x4b", LogicalKey::ArrowLeft),
    ("\x00\x4d", LogicalKey::ArrowRight),
    ("\u{e0}\x4d", LogicalKey::ArrowRight),
];

impl KeyEncoding {
    /// POSIX端末の符号化（単独ESCは50ms待って確定）
    pub const POSIX: KeyEncoding = KeyEncoding {
        escapes: EscapeTable::POSIX,
        bindings: POSIX_BINDINGS,
        csi: Some("\x1b["),
        escape_timeout: Some(Duration::from_millis(50)),
    };

    /// レガシーコンソールの符号化（先行バイトの後続は常に届く）
    pub const CONSOLE: KeyEncoding = KeyEncoding {
        escapes: EscapeTable::CONSOLE,
        bindings: CONSOLE_BINDINGS,
        csi: None,
        escape_timeout: None,
    };

    /// 実行中のプラットフォームの符号化
    pub fn native() -> Self {
        if cfg!(windows) {
            Self::CONSOLE
        } else {
            Self::POSIX
        }
    }

    /// 継続単位を待つ時間を変更（`None` は無期限に待つ）
    pub fn with_escape_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.escape_timeout = timeout;
        self
    }

    pub fn escapes(&self) -> EscapeTable {
        self.escapes
    }

    pub fn escape_timeout(&self) -> Option<Duration> {
        self.escape_timeout
    }

    /// 曖昧さ解消の後もなお終端単位が残っているシーケンスか
    ///
    /// CSI（`ESC [`）はパラメータ・中間バイト（0x20-0x3F）が続く限り未完で、
    /// 0x40-0x7E の終端バイトで完成する（`ESC [ 3` → `~`、`ESC [ 1 ; 5` → `D`）。
    pub fn awaits_terminator(&self, sequence: &str) -> bool {
        let Some(csi) = self.csi else {
            return false;
        };
        let len = sequence.chars().count();
        if len <= self.escapes.depth() || len >= MAX_CSI_LEN {
            return false;
        }
        sequence
            .strip_prefix(csi)
            .and_then(|body| body.chars().last())
            .is_some_and(is_csi_parameter)
    }

    /// 完成したシーケンスを論理キーへ変換
    pub fn decode(&self, sequence: &str) -> LogicalKey {
        if let Some((_, key)) = self.bindings.iter().find(|(raw, _)| *raw == sequence) {
            return *key;
        }

        let mut chars = sequence.chars();
        match (chars.next(), chars.next()) {
            (Some(ch), None) if !ch.is_control() && ch != char::REPLACEMENT_CHARACTER => {
                LogicalKey::Char(ch)
            }
            _ => LogicalKey::Ignored,
        }
    }
}

impl Default for KeyEncoding {
    fn default() -> Self {
        Self::native()
    }
}
