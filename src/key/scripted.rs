//! 台本入力
//!
//! あらかじめ与えた入力単位を順に返すキー入力元。テストや非対話の組み込みで使う。
//!
//! 台本は「まとまり」に分かれる。現在のまとまりは先行入力として扱われ、
//! 読み切って待ちに入ったときに次のまとまりが届く。

use super::{KeyEncoding, KeySource, RawModeGuard, RawUnit};
use crate::error::{InputError, Result};
use std::cell::Cell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

/// 台本どおりに入力単位を返すキー入力元
#[derive(Debug)]
pub struct ScriptedKeySource {
    units: VecDeque<RawUnit>,
    later: VecDeque<Vec<RawUnit>>,
    encoding: KeyEncoding,
    raw_mode: Rc<Cell<bool>>,
    raw_mode_entries: Rc<Cell<usize>>,
}

impl ScriptedKeySource {
    /// POSIX符号化で台本を作成（単独ESCは待たずに確定）
    pub fn new(script: &str) -> Self {
        Self::with_encoding(script, KeyEncoding::POSIX.with_escape_timeout(Some(Duration::ZERO)))
    }

    /// 符号化を指定して台本を作成
    pub fn with_encoding(script: &str, encoding: KeyEncoding) -> Self {
        Self {
            units: script.chars().collect(),
            later: VecDeque::new(),
            encoding,
            raw_mode: Rc::new(Cell::new(false)),
            raw_mode_entries: Rc::new(Cell::new(0)),
        }
    }

    /// 現在の入力を読み切った後に届くまとまりを追加
    pub fn then(mut self, script: &str) -> Self {
        self.later.push_back(script.chars().collect());
        self
    }

    /// 未読の単位数
    pub fn remaining(&self) -> usize {
        self.units.len() + self.later.iter().map(Vec::len).sum::<usize>()
    }

    fn advance(&mut self) {
        while self.units.is_empty() {
            match self.later.pop_front() {
                Some(next) => self.units.extend(next),
                None => break,
            }
        }
    }

    /// 現在rawモード中かどうか
    pub fn is_raw_mode(&self) -> bool {
        self.raw_mode.get()
    }

    /// rawモードに入った回数
    pub fn raw_mode_entries(&self) -> usize {
        self.raw_mode_entries.get()
    }
}

impl KeySource for ScriptedKeySource {
    fn encoding(&self) -> KeyEncoding {
        self.encoding
    }

    fn poll_ready(&mut self) -> Result<bool> {
        self.advance();
        Ok(!self.units.is_empty())
    }

    fn read_raw(&mut self) -> Result<RawUnit> {
        self.advance();
        self.units.pop_front().ok_or(InputError::Exhausted)
    }

    // 現在のまとまりだけを捨てる。後のまとまりはまだ打鍵されていない扱い
    fn drain_pending(&mut self) -> Result<usize> {
        let discarded = self.units.len();
        self.units.clear();
        Ok(discarded)
    }

    fn scoped_raw_mode(&mut self) -> Result<RawModeGuard> {
        self.raw_mode.set(true);
        self.raw_mode_entries.set(self.raw_mode_entries.get() + 1);
        let flag = Rc::clone(&self.raw_mode);
        Ok(RawModeGuard::new(move || flag.set(false)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::LogicalKey;

    fn keys(source: &mut ScriptedKeySource) -> Vec<LogicalKey> {
        let mut keys = Vec::new();
        while source.poll_ready().unwrap() {
            keys.push(source.read_logical_key().unwrap());
        }
        keys
    }

    #[test]
    fn posix_arrow_and_delete_sequences() {
        let mut source = ScriptedKeySource::new("a\x1b[D\x1b[C\x1b[3~\x1bOD\x7f\r");
        assert_eq!(
            keys(&mut source),
            vec![
                LogicalKey::Char('a'),
                LogicalKey::ArrowLeft,
                LogicalKey::ArrowRight,
                LogicalKey::Delete,
                LogicalKey::ArrowLeft,
                LogicalKey::Backspace,
                LogicalKey::Enter,
            ]
        );
    }

    #[test]
    fn bare_escape_resolves_without_continuation() {
        let mut source = ScriptedKeySource::new("\x1b");
        assert_eq!(source.read_logical_key().unwrap(), LogicalKey::Escape);
        assert_eq!(source.remaining(), 0);
    }

    #[test]
    fn unknown_escape_continuation_is_ignored() {
        // Alt-x: ESC の後に表にない単位
        let mut source = ScriptedKeySource::new("\x1bxy");
        assert_eq!(source.read_logical_key().unwrap(), LogicalKey::Ignored);
        assert_eq!(source.read_logical_key().unwrap(), LogicalKey::Char('y'));
    }

    #[test]
    fn reads_bounded_by_table_depth() {
        // 上矢印は3単位で打ち切られ、後続の文字は残る
        let mut source = ScriptedKeySource::new("\x1b[Az");
        assert_eq!(source.read_logical_key().unwrap(), LogicalKey::Ignored);
        assert_eq!(source.remaining(), 1);
    }

    #[test]
    fn unbound_csi_keys_are_read_to_final_byte() {
        // PageUp、Ctrl-Left、Ctrl-Delete
        let mut source = ScriptedKeySource::new("\x1b[5~\x1b[1;5D\x1b[3;5~z");
        assert_eq!(source.read_logical_key().unwrap(), LogicalKey::Ignored);
        assert_eq!(source.read_logical_key().unwrap(), LogicalKey::Ignored);
        assert_eq!(source.read_logical_key().unwrap(), LogicalKey::Ignored);
        assert_eq!(source.read_logical_key().unwrap(), LogicalKey::Char('z'));
        assert_eq!(source.remaining(), 0);
    }

    #[test]
    fn console_sequences_use_single_level() {
        let mut source = ScriptedKeySource::with_encoding(
            "\u{e0}\x4b\x00\x4d\u{e0}\x53\x08\x1b",
            KeyEncoding::CONSOLE,
        );
        assert_eq!(
            keys(&mut source),
            vec![
                LogicalKey::ArrowLeft,
                LogicalKey::ArrowRight,
                LogicalKey::Delete,
                LogicalKey::Backspace,
                LogicalKey::Escape,
            ]
        );
    }

    #[test]
    fn drain_discards_everything_ready() {
        let mut source = ScriptedKeySource::new("12345");
        assert_eq!(source.drain_pending().unwrap(), 5);
        assert!(!source.poll_ready().unwrap());
        assert_eq!(source.read_raw(), Err(InputError::Exhausted));
    }

    #[test]
    fn drain_keeps_later_batches() {
        let mut source = ScriptedKeySource::new("stale").then("7").then("\r");
        assert_eq!(source.drain_pending().unwrap(), 5);
        assert_eq!(source.remaining(), 2);
        assert_eq!(source.read_logical_key().unwrap(), LogicalKey::Char('7'));
        assert_eq!(source.drain_pending().unwrap(), 0);
        assert_eq!(source.read_logical_key().unwrap(), LogicalKey::Enter);
    }

    #[test]
    fn raw_mode_flag_follows_guard() {
        let mut source = ScriptedKeySource::new("");
        let guard = source.scoped_raw_mode().unwrap();
        assert!(source.is_raw_mode());
        drop(guard);
        assert!(!source.is_raw_mode());
        assert_eq!(source.raw_mode_entries(), 1);
    }
}
