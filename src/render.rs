//! カーソル位置のみの再描画
//!
//! 行全体を描き直さず、テキストの再出力と相対的な左移動（`ESC [ n D`）だけで
//! 端末上のカーソルを論理位置に合わせる。

use crate::buffer::{CursorDelta, EditState};
use crate::error::Result;
use crossterm::cursor::MoveLeft;
use crossterm::queue;
use crossterm::style::Print;
use std::io::Write;

/// 入力行の描画器
#[derive(Debug)]
pub struct Renderer<W: Write> {
    out: W,
}

impl<W: Write> Renderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// 呼び出し側のメッセージを表示
    pub fn prompt(&mut self, message: &str) -> Result<()> {
        queue!(self.out, Print(message))?;
        self.out.flush()?;
        Ok(())
    }

    /// テキストと末尾の空白を出力し、カーソルを論理位置まで戻す
    ///
    /// 末尾の空白は直前に消えた1文字を上書きするためのもの。
    pub fn draw(&mut self, state: &EditState) -> Result<()> {
        queue!(self.out, Print(state.text()), Print(' '))?;
        self.move_left(state.right_len() as isize + 1)?;
        self.out.flush()?;
        Ok(())
    }

    /// 遷移後、次の描画の起点（編集前のカーソル位置）へ戻す
    pub fn reposition(&mut self, state: &EditState, delta: CursorDelta) -> Result<()> {
        self.move_left(state.left_len() as isize + delta.value())?;
        self.out.flush()?;
        Ok(())
    }

    /// 確定後に改行（rawモードでは復帰も明示する）
    pub fn finish(&mut self) -> Result<()> {
        queue!(self.out, Print("\r\n"))?;
        self.out.flush()?;
        Ok(())
    }

    /// 出力先を取り出す
    pub fn into_inner(self) -> W {
        self.out
    }

    // `ESC [ 0 D` は多くの端末で1列移動になるため、0以下は何も出さない
    fn move_left(&mut self, columns: isize) -> Result<()> {
        if columns <= 0 {
            return Ok(());
        }
        let columns = u16::try_from(columns).unwrap_or(u16::MAX);
        queue!(self.out, MoveLeft(columns))?;
        Ok(())
    }
}
