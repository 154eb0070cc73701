//! キー入力元の共通インターフェース

use super::{KeyEncoding, LogicalKey, RawUnit};
use crate::error::Result;
use std::fmt;
use std::time::{Duration, Instant};

/// rawモードの復元を保証するガード
///
/// 破棄時に元の端末モードへ戻す。Escapeによる早期終了やエラー伝播でも必ず実行される。
pub struct RawModeGuard {
    restore: Option<Box<dyn FnOnce()>>,
}

impl RawModeGuard {
    /// 復元処理を登録してガードを作成
    pub fn new(restore: impl FnOnce() + 'static) -> Self {
        Self {
            restore: Some(Box::new(restore)),
        }
    }

    /// 何もしないガード（コンソールはもともと非バッファ入力）
    pub fn noop() -> Self {
        Self { restore: None }
    }

    /// 明示的に復元する
    pub fn release(mut self) {
        self.run_restore();
    }

    fn run_restore(&mut self) {
        if let Some(restore) = self.restore.take() {
            restore();
        }
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        self.run_restore();
    }
}

impl fmt::Debug for RawModeGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawModeGuard")
            .field("armed", &self.restore.is_some())
            .finish()
    }
}

/// プラットフォームごとのキー入力元
pub trait KeySource {
    /// このキー入力元の符号化
    fn encoding(&self) -> KeyEncoding;

    /// 待たずに読める入力単位があるか
    fn poll_ready(&mut self) -> Result<bool>;

    /// 入力単位を1つ読む（届くまでブロック）
    fn read_raw(&mut self) -> Result<RawUnit>;

    /// セッションの間だけrawモードに入る
    fn scoped_raw_mode(&mut self) -> Result<RawModeGuard>;

    /// 論理キーを1つ読む
    ///
    /// エスケープ表の深さを超えて曖昧さ解消のための読み込みはしない。
    /// 継続単位が `escape_timeout` 以内に届かなければ、その時点の並びで確定する。
    /// CSIは終端バイトまで読み切るので、割り当てのないキーの残りが文字として漏れない。
    fn read_logical_key(&mut self) -> Result<LogicalKey> {
        let encoding = self.encoding();
        let escapes = encoding.escapes();
        let mut sequence = String::new();
        sequence.push(self.read_raw()?);

        for _ in 0..escapes.depth() {
            if !escapes.expects_continuation(&sequence) {
                break;
            }
            if !self.wait_ready(encoding.escape_timeout())? {
                break;
            }
            sequence.push(self.read_raw()?);
        }

        while encoding.awaits_terminator(&sequence) {
            if !self.wait_ready(encoding.escape_timeout())? {
                break;
            }
            sequence.push(self.read_raw()?);
        }

        let key = encoding.decode(&sequence);
        log::trace!("decoded {:?} from {:?}", key, sequence);
        Ok(key)
    }

    /// 溜まっている入力を捨てる（捨てた単位数を返す）
    fn drain_pending(&mut self) -> Result<usize> {
        let mut discarded = 0;
        while self.poll_ready()? {
            self.read_raw()?;
            discarded += 1;
        }
        if discarded > 0 {
            log::debug!("drained {} pending input units", discarded);
        }
        Ok(discarded)
    }

    /// 継続単位を待つ（`None` なら後続の読み込みでブロックする）
    fn wait_ready(&mut self, timeout: Option<Duration>) -> Result<bool> {
        let Some(timeout) = timeout else {
            return Ok(true);
        };

        let started = Instant::now();
        loop {
            if self.poll_ready()? {
                return Ok(true);
            }
            if started.elapsed() >= timeout {
                return Ok(false);
            }
            std::hint::spin_loop();
        }
    }
}

impl<K: KeySource + ?Sized> KeySource for &mut K {
    fn encoding(&self) -> KeyEncoding {
        (**self).encoding()
    }

    fn poll_ready(&mut self) -> Result<bool> {
        (**self).poll_ready()
    }

    fn read_raw(&mut self) -> Result<RawUnit> {
        (**self).read_raw()
    }

    fn scoped_raw_mode(&mut self) -> Result<RawModeGuard> {
        (**self).scoped_raw_mode()
    }

    fn read_logical_key(&mut self) -> Result<LogicalKey> {
        (**self).read_logical_key()
    }

    fn drain_pending(&mut self) -> Result<usize> {
        (**self).drain_pending()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn guard_restores_on_drop() {
        let restored = Rc::new(Cell::new(false));
        {
            let flag = Rc::clone(&restored);
            let _guard = RawModeGuard::new(move || flag.set(true));
            assert!(!restored.get());
        }
        assert!(restored.get());
    }

    #[test]
    fn guard_restores_once_on_release() {
        let count = Rc::new(Cell::new(0));
        let counter = Rc::clone(&count);
        let guard = RawModeGuard::new(move || counter.set(counter.get() + 1));
        guard.release();
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn noop_guard_is_disarmed() {
        let guard = RawModeGuard::noop();
        assert_eq!(format!("{:?}", guard), "RawModeGuard { armed: false }");
    }
}
