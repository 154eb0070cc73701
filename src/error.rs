//! エラーハンドリング
//!
//! 入力セッション全体で使用されるエラー型を定義
//! 致命的なのは端末モードの取得失敗のみで、キー解釈の失敗はエラーにしない

use thiserror::Error;

/// 入力処理のエラー型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    /// 標準入力が端末ではない（rawモードに入れない）
    #[error("stdin is not a terminal")]
    NotATerminal,

    /// rawモードの切り替えに失敗
    #[error("Raw mode switch failed: {message}")]
    RawMode { message: String },

    /// 入出力エラー
    #[error("IO error: {message}")]
    Io { message: String },

    /// 数値として解釈できない入力
    #[error("Invalid number: {digits}")]
    InvalidNumber { digits: String },

    /// スクリプト入力が尽きた
    #[error("Input exhausted")]
    Exhausted,
}

/// エラーレベル分類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorLevel {
    Warning,
    Error,
    Fatal,
}

impl InputError {
    /// エラーの深刻度を判定
    pub fn level(&self) -> ErrorLevel {
        match self {
            InputError::NotATerminal | InputError::RawMode { .. } => ErrorLevel::Fatal,
            InputError::InvalidNumber { .. } => ErrorLevel::Warning,
            InputError::Io { .. } | InputError::Exhausted => ErrorLevel::Error,
        }
    }

    /// ログ出力用のレベル
    pub fn log_level(&self) -> log::Level {
        match self.level() {
            ErrorLevel::Warning => log::Level::Warn,
            ErrorLevel::Error | ErrorLevel::Fatal => log::Level::Error,
        }
    }
}

// std::io::Error から InputError への変換
impl From<std::io::Error> for InputError {
    fn from(error: std::io::Error) -> Self {
        InputError::Io { message: error.to_string() }
    }
}

/// プロジェクト標準のResult型
pub type Result<T> = std::result::Result<T, InputError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_errors_are_fatal() {
        assert_eq!(InputError::NotATerminal.level(), ErrorLevel::Fatal);
        let raw = InputError::RawMode { message: "tcsetattr".to_string() };
        assert_eq!(raw.level(), ErrorLevel::Fatal);
        assert_eq!(raw.log_level(), log::Level::Error);
    }

    #[test]
    fn test_invalid_number_is_warning() {
        let error = InputError::InvalidNumber { digits: "99999999999999999999999".to_string() };
        assert_eq!(error.level(), ErrorLevel::Warning);
        assert!(error.to_string().contains("99999"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed");
        let error: InputError = io_error.into();

        match error {
            InputError::Io { message } => assert!(message.contains("pipe closed")),
            _ => panic!("Expected Io error"),
        }
    }
}
