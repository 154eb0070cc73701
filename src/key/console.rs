//! Windowsレガシーコンソールのキー入力元
//!
//! CRTの `_kbhit` / `_getwch` を使う。コンソールはもともと非バッファ・非エコーで
//! キーを渡すため、rawモードの切り替えは行わない。

use super::{KeyEncoding, KeySource, RawModeGuard, RawUnit};
use crate::error::Result;

/// CRTのコンソール入力関数
///
/// クレート内の `unsafe` はこのモジュールだけに置く。外には安全な関数だけを見せる。
mod crt {
    extern "C" {
        fn _kbhit() -> i32;
        fn _getwch() -> u16;
    }

    /// 読まずに待っているキーがあるか
    pub(super) fn key_hit() -> bool {
        // SAFETY: 引数もポインタも取らず、コンソール入力バッファを覗くだけ
        unsafe { _kbhit() != 0 }
    }

    /// ワイド文字を1つ読む（届くまでブロック、エコーなし）
    pub(super) fn get_wide_char() -> u16 {
        // SAFETY: 引数もポインタも取らず、値を1つ返すだけ
        unsafe { _getwch() }
    }
}

/// ワイド文字を入力単位へ変換（単独のサロゲートは U+FFFD）
fn wide_to_unit(unit: u16) -> RawUnit {
    char::from_u32(u32::from(unit)).unwrap_or(char::REPLACEMENT_CHARACTER)
}

/// レガシーコンソールのキー入力元
#[derive(Debug, Clone, Copy)]
pub struct ConsoleKeySource {
    encoding: KeyEncoding,
}

impl ConsoleKeySource {
    pub fn new() -> Self {
        Self {
            encoding: KeyEncoding::CONSOLE,
        }
    }
}

impl Default for ConsoleKeySource {
    fn default() -> Self {
        Self::new()
    }
}

impl KeySource for ConsoleKeySource {
    fn encoding(&self) -> KeyEncoding {
        self.encoding
    }

    fn poll_ready(&mut self) -> Result<bool> {
        Ok(crt::key_hit())
    }

    fn read_raw(&mut self) -> Result<RawUnit> {
        Ok(wide_to_unit(crt::get_wide_char()))
    }

    fn scoped_raw_mode(&mut self) -> Result<RawModeGuard> {
        Ok(RawModeGuard::noop())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wide_units_map_to_chars() {
        assert_eq!(wide_to_unit(0x00e0), '\u{e0}');
        assert_eq!(wide_to_unit(0x0053), 'S');
        assert_eq!(wide_to_unit(0xd800), char::REPLACEMENT_CHARACTER);
    }

    #[test]
    fn console_source_uses_console_encoding() {
        let source = ConsoleKeySource::new();
        assert_eq!(source.encoding().escapes().depth(), 1);
        assert_eq!(source.encoding().escape_timeout(), None);
    }
}
