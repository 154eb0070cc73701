//! 編集バッファ
//!
//! カーソルで左右に分割したテキストと、論理キー1つ分の状態遷移を提供する。
//! 遷移ごとに描画用のカーソル補正量（[`CursorDelta`]）を返す。

pub mod char_class;

pub use char_class::CharClass;

use crate::key::LogicalKey;
use std::collections::VecDeque;

/// 描画後にカーソルを戻す列数の補正量
///
/// 次の描画前の左移動量は `len(left) + delta` になる。編集前のカーソル位置へ
/// 戻すための値で、0以下は「移動しない」を意味する。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct CursorDelta(pub isize);

impl CursorDelta {
    pub const NONE: CursorDelta = CursorDelta(0);

    pub fn value(self) -> isize {
        self.0
    }
}

/// カーソルで分割されたテキスト
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EditState {
    left: Vec<char>,
    right: VecDeque<char>,
}

impl EditState {
    /// 空の状態を作成
    pub fn new() -> Self {
        Self::default()
    }

    /// テキスト全体（`left ++ right`）
    pub fn text(&self) -> String {
        self.left.iter().chain(self.right.iter()).collect()
    }

    /// カーソルより左のテキスト
    pub fn left_text(&self) -> String {
        self.left.iter().collect()
    }

    /// カーソルより右のテキスト
    pub fn right_text(&self) -> String {
        self.right.iter().collect()
    }

    pub fn left_len(&self) -> usize {
        self.left.len()
    }

    pub fn right_len(&self) -> usize {
        self.right.len()
    }

    /// カーソル位置（文字単位）
    pub fn cursor_index(&self) -> usize {
        self.left.len()
    }

    /// テキストの文字数
    pub fn len(&self) -> usize {
        self.left.len() + self.right.len()
    }

    pub fn is_empty(&self) -> bool {
        self.left.is_empty() && self.right.is_empty()
    }
}

/// 1回の遷移の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// 編集を続ける
    Edited(CursorDelta),
    /// Enterで確定
    Submitted(String),
    /// Escapeで中断
    Cancelled,
}

/// 文字種と長さ制限を持つ編集バッファ
#[derive(Debug, Clone, Default)]
pub struct EditBuffer {
    state: EditState,
    class: CharClass,
    limit: Option<usize>,
}

impl EditBuffer {
    /// 新しい編集バッファを作成
    pub fn new(class: CharClass, limit: Option<usize>) -> Self {
        Self {
            state: EditState::new(),
            class,
            limit,
        }
    }

    /// 数字のみのバッファ
    pub fn digits() -> Self {
        Self::new(CharClass::Digits, None)
    }

    pub fn state(&self) -> &EditState {
        &self.state
    }

    pub fn text(&self) -> String {
        self.state.text()
    }

    pub fn cursor_index(&self) -> usize {
        self.state.cursor_index()
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// セッションが反応すべきキーかどうか
    ///
    /// 文字種に合わない文字と `Ignored` は描画もせずに読み飛ばされる。
    pub fn is_actionable(&self, key: &LogicalKey) -> bool {
        match key {
            LogicalKey::Char(ch) => self.class.accepts(*ch),
            LogicalKey::Ignored => false,
            _ => true,
        }
    }

    /// 論理キーを1つ適用
    pub fn apply(&mut self, key: LogicalKey) -> Transition {
        let left_empty = self.state.left.is_empty();
        let right_empty = self.state.right.is_empty();

        let delta = match key {
            LogicalKey::Char(ch) => return Transition::Edited(self.insert(ch)),
            LogicalKey::Enter => return Transition::Submitted(self.finalized_text()),
            LogicalKey::Escape => return Transition::Cancelled,
            LogicalKey::Ignored => 0,

            LogicalKey::Backspace if left_empty => -1,
            LogicalKey::Backspace => {
                self.state.left.pop();
                1
            }

            LogicalKey::Delete if right_empty => {
                if left_empty {
                    -1
                } else {
                    0
                }
            }
            LogicalKey::Delete => {
                self.state.right.pop_front();
                if left_empty {
                    -2
                } else {
                    0
                }
            }

            LogicalKey::ArrowLeft => match self.state.left.pop() {
                Some(ch) => {
                    self.state.right.push_front(ch);
                    1
                }
                None => -1,
            },

            LogicalKey::ArrowRight => match self.state.right.pop_front() {
                Some(ch) => {
                    self.state.left.push(ch);
                    if left_empty {
                        -2
                    } else {
                        -1
                    }
                }
                None => 0,
            },
        };

        Transition::Edited(CursorDelta(delta))
    }

    fn insert(&mut self, ch: char) -> CursorDelta {
        if !self.class.accepts(ch) {
            return CursorDelta::NONE;
        }
        if self.limit.is_some_and(|limit| self.state.len() >= limit) {
            log::debug!("length limit reached, dropping {:?}", ch);
            return CursorDelta::NONE;
        }

        let delta = if self.state.left.is_empty() { -2 } else { -1 };
        self.state.left.push(ch);
        CursorDelta(delta)
    }

    /// 確定値（空なら `"0"`）
    fn finalized_text(&self) -> String {
        if self.state.is_empty() {
            "0".to_string()
        } else {
            self.state.text()
        }
    }
}
