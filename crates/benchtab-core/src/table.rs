//! Bordered text table rendering.
//!
//! Layout for each sink, with only the columns visible on that sink:
//!
//! ```text
//!  << name >>
//! -----------------------------------------
//!  Name                    | Value         |
//! -----------------------------------------
//!  x                         3.14
//! ```
//!
//! The first visible column takes a one-space gutter and `width - 1` chars,
//! the others a two-char gutter (`"| "` in the header) and `width - 2` chars.
//! A one-char column keeps only the first char of its gutter.
//! Text longer than its slot is truncated so widths never change mid-run.

use std::io::{self, Write};
use std::sync::Arc;

use crate::schema::{Schema, SinkKind};
use crate::sink::Sink;

/// Renders headers and rows of one schema.
#[derive(Debug)]
pub struct TableRenderer<R> {
    schema: Arc<Schema<R>>,
}

impl<R> Clone for TableRenderer<R> {
    fn clone(&self) -> Self {
        Self {
            schema: Arc::clone(&self.schema),
        }
    }
}

impl<R> TableRenderer<R> {
    pub fn new(schema: Arc<Schema<R>>) -> Self {
        Self { schema }
    }

    /// Header block for one kind of sink, including the optional title line.
    pub fn header_text(&self, name: Option<&str>, sink: SinkKind) -> String {
        let mut out = String::new();
        if let Some(name) = name.filter(|n| !n.is_empty()) {
            out.push_str(&format!(" << {} >>\n", name));
        }
        let rule = "-".repeat(self.schema.total_width(sink));
        out.push_str(&rule);
        out.push('\n');
        for (i, column) in self.schema.visible(sink).enumerate() {
            let gutter = if i == 0 { " " } else { "| " };
            cell(gutter, column.name(), column.width(), &mut out);
        }
        out.push_str("|\n");
        out.push_str(&rule);
        out.push('\n');
        out
    }

    /// One row for one kind of sink, from cells computed for every column.
    /// No trailing newline.
    pub fn row_text(&self, cells: &[String], sink: SinkKind) -> String {
        let mut out = String::new();
        let mut first = true;
        for (column, text) in self.schema.columns().iter().zip(cells) {
            if !column.shows_on(sink) {
                continue;
            }
            let gutter = if first { " " } else { "  " };
            first = false;
            cell(gutter, text, column.width(), &mut out);
        }
        out
    }

    /// Display text of every column of `row`, computed once per row.
    pub fn cells(&self, row: &R) -> Vec<String> {
        self.schema.columns().iter().map(|c| c.cell(row)).collect()
    }

    /// Print the header to every sink.
    pub fn print_header(&self, name: Option<&str>, sinks: &mut [Sink]) -> io::Result<()> {
        for sink in sinks.iter_mut() {
            let text = self.header_text(name, sink.kind());
            sink.write_all(text.as_bytes())?;
            sink.flush()?;
        }
        Ok(())
    }

    /// Print one row to every sink and flush each of them.
    pub fn print_row(&self, row: &R, sinks: &mut [Sink]) -> io::Result<()> {
        let cells = self.cells(row);
        for sink in sinks.iter_mut() {
            let mut line = self.row_text(&cells, sink.kind());
            line.push('\n');
            sink.write_all(line.as_bytes())?;
            sink.flush()?;
        }
        Ok(())
    }
}

/// Append one `width`-char slot: the gutter (cut short on narrow columns),
/// then `text` fitted to the rest.
fn cell(gutter: &str, text: &str, width: usize, out: &mut String) {
    let gutter_len = gutter.len().min(width);
    out.push_str(&gutter[..gutter_len]);
    fit(text, width - gutter_len, out);
}

/// Append `text` to `out`, truncated or right-padded with spaces to `width` chars.
fn fit(text: &str, width: usize, out: &mut String) {
    let mut used = 0;
    for ch in text.chars().take(width) {
        out.push(ch);
        used += 1;
    }
    out.extend(std::iter::repeat(' ').take(width - used));
}
