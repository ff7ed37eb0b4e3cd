//! Live preview of in-progress results on reserved console rows.

use std::io;

use crate::schema::SinkKind;
use crate::table::TableRenderer;
use crate::terminal::Terminal;

/// Text of the rows reserved for jobs that have not reported yet.
pub const PLACEHOLDER: &str = " Not yet executed";

/// Renders console rows in place. Cloned once per running job; all clones
/// serialize on the shared [`Terminal`].
#[derive(Debug)]
pub struct PreviewRenderer<R> {
    renderer: TableRenderer<R>,
    terminal: Terminal,
}

impl<R> Clone for PreviewRenderer<R> {
    fn clone(&self) -> Self {
        Self {
            renderer: self.renderer.clone(),
            terminal: self.terminal.clone(),
        }
    }
}

impl<R> PreviewRenderer<R> {
    pub fn new(renderer: TableRenderer<R>, terminal: Terminal) -> Self {
        Self { renderer, terminal }
    }

    /// Reserve one row per job below the cursor.
    pub fn reserve(&self, rows: usize) -> io::Result<()> {
        self.terminal.reserve_rows(rows, PLACEHOLDER)
    }

    /// Put the cursor below all `rows` reserved lines, leaving their text
    /// in place.
    pub fn skip_reserved(&self, rows: usize) -> io::Result<()> {
        self.terminal.move_down(rows)
    }

    /// Write `row` on the line `offset` rows below the cursor; the cursor ends
    /// up where it started.
    pub fn preview_row(&self, row: &R, offset: usize) -> io::Result<()> {
        let cells = self.renderer.cells(row);
        let line = self.renderer.row_text(&cells, SinkKind::Console);
        self.terminal.overwrite_row(offset, &line)
    }
}
