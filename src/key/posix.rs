//! POSIX端末のキー入力元
//!
//! 標準入力のファイル記述子から直接読み込む。std の `Stdin` は内部でバッファするため、
//! それを経由すると `poll` が読み残しを検出できなくなる。

use super::{KeyEncoding, KeySource, RawModeGuard, RawUnit};
use crate::error::{InputError, Result};
use crossterm::terminal;
use rustix::event::{poll, PollFd, PollFlags, Timespec};
use std::io::{self, IsTerminal};
use std::os::fd::AsFd;

/// POSIX端末のキー入力元
///
/// 既定は標準入力。任意のファイル記述子（パイプやソケット）からも読める。
#[derive(Debug)]
pub struct PosixKeySource<F = io::Stdin> {
    input: F,
    encoding: KeyEncoding,
}

impl PosixKeySource {
    /// 標準入力から読むキー入力元を作成
    pub fn new() -> Self {
        Self::with_encoding(KeyEncoding::POSIX)
    }

    /// 符号化を指定して作成（エスケープ待ち時間の調整用）
    pub fn with_encoding(encoding: KeyEncoding) -> Self {
        Self::with_input(io::stdin(), encoding)
    }
}

impl<F: AsFd> PosixKeySource<F> {
    /// 入力元のファイル記述子を指定して作成
    pub fn with_input(input: F, encoding: KeyEncoding) -> Self {
        Self { input, encoding }
    }

    fn read_byte(&mut self) -> Result<u8> {
        let mut buf = [0u8; 1];
        loop {
            match rustix::io::read(&self.input, &mut buf[..]) {
                Ok(0) => {
                    return Err(InputError::Io {
                        message: "unexpected end of input".to_string(),
                    })
                }
                Ok(_) => return Ok(buf[0]),
                Err(errno) if errno == rustix::io::Errno::INTR => continue,
                Err(errno) => return Err(io::Error::from(errno).into()),
            }
        }
    }
}

impl Default for PosixKeySource {
    fn default() -> Self {
        Self::new()
    }
}

/// UTF-8の先頭バイトからシーケンス長を求める（不正なら `None`）
fn utf8_width(lead: u8) -> Option<usize> {
    match lead {
        0x00..=0x7f => Some(1),
        0xc2..=0xdf => Some(2),
        0xe0..=0xef => Some(3),
        0xf0..=0xf4 => Some(4),
        _ => None,
    }
}

impl<F: AsFd> KeySource for PosixKeySource<F> {
    fn encoding(&self) -> KeyEncoding {
        self.encoding
    }

    fn poll_ready(&mut self) -> Result<bool> {
        let mut fds = [PollFd::new(&self.input, PollFlags::IN)];
        let timeout = Timespec {
            tv_sec: 0,
            tv_nsec: 0,
        };
        let ready = poll(&mut fds, Some(&timeout)).map_err(io::Error::from)?;
        // HUP も読み込み可能扱いにして EOF をエラーとして表に出す
        Ok(ready > 0 && fds[0].revents().intersects(PollFlags::IN | PollFlags::HUP))
    }

    fn read_raw(&mut self) -> Result<RawUnit> {
        let lead = self.read_byte()?;
        let Some(width) = utf8_width(lead) else {
            return Ok(char::REPLACEMENT_CHARACTER);
        };

        let mut bytes = [lead, 0, 0, 0];
        for slot in bytes.iter_mut().take(width).skip(1) {
            *slot = self.read_byte()?;
        }

        Ok(std::str::from_utf8(&bytes[..width])
            .ok()
            .and_then(|s| s.chars().next())
            .unwrap_or(char::REPLACEMENT_CHARACTER))
    }

    fn scoped_raw_mode(&mut self) -> Result<RawModeGuard> {
        if !self.input.as_fd().is_terminal() {
            return Err(InputError::NotATerminal);
        }

        terminal::enable_raw_mode().map_err(|e| InputError::RawMode {
            message: e.to_string(),
        })?;
        log::debug!("raw mode enabled");

        Ok(RawModeGuard::new(|| match terminal::disable_raw_mode() {
            Ok(()) => log::debug!("raw mode restored"),
            Err(e) => log::warn!("failed to restore terminal mode: {}", e),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::LogicalKey;
    use std::io::Write;
    use std::os::unix::net::UnixStream;

    #[test]
    fn utf8_width_from_lead_byte() {
        assert_eq!(utf8_width(b'a'), Some(1));
        assert_eq!(utf8_width(0x1b), Some(1));
        assert_eq!(utf8_width(0xc3), Some(2));
        assert_eq!(utf8_width(0xe2), Some(3));
        assert_eq!(utf8_width(0xf0), Some(4));
        assert_eq!(utf8_width(0x80), None);
        assert_eq!(utf8_width(0xff), None);
    }

    #[test]
    fn posix_source_uses_posix_encoding() {
        let source = PosixKeySource::new();
        assert_eq!(source.encoding().escapes().depth(), 2);
    }

    fn socket_source() -> (PosixKeySource<UnixStream>, UnixStream) {
        let (reader, writer) = UnixStream::pair().unwrap();
        (PosixKeySource::with_input(reader, KeyEncoding::POSIX), writer)
    }

    #[test]
    fn poll_ready_tracks_pending_bytes() {
        let (mut source, mut writer) = socket_source();
        assert!(!source.poll_ready().unwrap());

        writer.write_all(b"a").unwrap();
        assert!(source.poll_ready().unwrap());
        assert_eq!(source.read_raw().unwrap(), 'a');
        assert!(!source.poll_ready().unwrap());
    }

    #[test]
    fn read_raw_assembles_utf8() {
        let (mut source, mut writer) = socket_source();
        writer.write_all("é".as_bytes()).unwrap();
        writer.write_all(&[0xff, b'z']).unwrap();

        assert_eq!(source.read_raw().unwrap(), 'é');
        assert_eq!(source.read_raw().unwrap(), char::REPLACEMENT_CHARACTER);
        assert_eq!(source.read_raw().unwrap(), 'z');
    }

    #[test]
    fn end_of_input_is_ready_and_then_an_error() {
        let (mut source, writer) = socket_source();
        drop(writer);

        assert!(source.poll_ready().unwrap());
        assert!(matches!(source.read_raw(), Err(InputError::Io { .. })));
    }

    #[test]
    fn logical_keys_from_descriptor() {
        let (mut source, mut writer) = socket_source();
        writer.write_all(b"\x1b[1;5D\x1b[Dx").unwrap();

        assert_eq!(source.read_logical_key().unwrap(), LogicalKey::Ignored);
        assert_eq!(source.read_logical_key().unwrap(), LogicalKey::ArrowLeft);
        assert_eq!(source.read_logical_key().unwrap(), LogicalKey::Char('x'));
        assert!(!source.poll_ready().unwrap());
    }

    #[test]
    fn raw_mode_requires_a_terminal() {
        let (mut source, _writer) = socket_source();
        assert!(matches!(
            source.scoped_raw_mode(),
            Err(InputError::NotATerminal)
        ));
    }
}
