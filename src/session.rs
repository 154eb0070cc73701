//! 編集セッション
//!
//! キー入力元・編集バッファ・描画器をつなぎ、Enter か Escape まで入力を続ける。

use crate::buffer::{EditBuffer, Transition};
use crate::error::Result;
use crate::key::{KeySource, LogicalKey};
use crate::render::Renderer;
use std::io::Write;

/// セッションの状態
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// メッセージ表示前
    Prompting,
    /// 編集中
    Editing,
    /// Enterで確定
    Submitted(String),
    /// Escapeで中断
    Cancelled,
}

impl SessionState {
    pub fn is_finished(&self) -> bool {
        matches!(self, SessionState::Submitted(_) | SessionState::Cancelled)
    }
}

/// 1回分の入力セッション
#[derive(Debug)]
pub struct EditSession<K: KeySource, W: Write> {
    source: K,
    buffer: EditBuffer,
    renderer: Renderer<W>,
    flush: bool,
    state: SessionState,
}

impl<K: KeySource, W: Write> EditSession<K, W> {
    /// 新しいセッションを作成
    pub fn new(source: K, buffer: EditBuffer, out: W, flush: bool) -> Self {
        Self {
            source,
            buffer,
            renderer: Renderer::new(out),
            flush,
            state: SessionState::Prompting,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn buffer(&self) -> &EditBuffer {
        &self.buffer
    }

    /// 入力を最後まで実行（中断なら `None`）
    ///
    /// rawモードはこの関数の中だけで有効で、エラーで抜けた場合も元に戻る。
    pub fn run(&mut self, message: &str) -> Result<Option<String>> {
        self.renderer.prompt(message)?;
        if self.flush {
            self.source.drain_pending()?;
        }

        let _raw_mode = self.source.scoped_raw_mode()?;
        self.state = SessionState::Editing;

        loop {
            self.renderer.draw(self.buffer.state())?;
            let key = self.wait_for_key()?;

            match self.buffer.apply(key) {
                Transition::Submitted(text) => {
                    self.renderer.finish()?;
                    log::debug!("submitted {} chars", text.chars().count());
                    self.state = SessionState::Submitted(text.clone());
                    return Ok(Some(text));
                }
                Transition::Cancelled => {
                    log::debug!("cancelled by escape");
                    self.state = SessionState::Cancelled;
                    return Ok(None);
                }
                Transition::Edited(delta) => {
                    if self.flush {
                        self.source.drain_pending()?;
                    }
                    self.renderer.reposition(self.buffer.state(), delta)?;
                }
            }
        }
    }

    /// 反応すべきキーが届くまで待つ（意図的なスピン待ち）
    fn wait_for_key(&mut self) -> Result<LogicalKey> {
        loop {
            if !self.source.poll_ready()? {
                std::hint::spin_loop();
                continue;
            }

            let key = self.source.read_logical_key()?;
            if self.buffer.is_actionable(&key) {
                return Ok(key);
            }
            log::trace!("skipping {:?}", key);
        }
    }

    /// 入力元と出力先を取り出す
    pub fn into_parts(self) -> (K, W) {
        (self.source, self.renderer.into_inner())
    }
}
