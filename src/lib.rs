//! inplace-input - 端末向けのその場編集入力
//!
//! rawモードでキーを1つずつ受け取り、カーソル位置だけを描き直しながら
//! 1行の値（文字列・整数）を読み取る

// コアモジュール
pub mod config;
pub mod error;
pub mod logging;

// 入力層
pub mod key;

// 編集層
pub mod buffer;

// 表示層
pub mod render;

// セッション
pub mod prompt;
pub mod session;

// 公開API
pub use buffer::{CharClass, CursorDelta, EditBuffer, EditState, Transition};
pub use config::InputOptions;
pub use error::{InputError, Result};
pub use key::{KeyEncoding, KeySource, LogicalKey, RawModeGuard, ScriptedKeySource};
pub use prompt::{read_integer, read_line, Prompt};
pub use render::Renderer;
pub use session::{EditSession, SessionState};
