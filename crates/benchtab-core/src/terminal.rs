//! Shared console handle: the only place that touches the terminal cursor.
//!
//! All writes go through one mutex so concurrent previews never interleave
//! their cursor movement and text. Cursor control uses ANSI escape sequences
//! and is skipped when the output is not interactive.

use std::io::{self, IsTerminal, Write};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

const HIDE_CURSOR: &str = "\x1b[?25l";
const SHOW_CURSOR: &str = "\x1b[?25h";
const CLEAR_LINE: &str = "\x1b[2K";

struct TermState {
    out: Box<dyn Write + Send>,
    cursor_visible: bool,
}

/// Cloneable handle to the console; clones share the same lock and output.
#[derive(Clone)]
pub struct Terminal {
    state: Arc<Mutex<TermState>>,
    interactive: bool,
}

impl std::fmt::Debug for Terminal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Terminal")
            .field("interactive", &self.interactive)
            .finish_non_exhaustive()
    }
}

impl Terminal {
    /// Console on stdout; interactive when stdout is a TTY.
    pub fn stdout() -> Self {
        let interactive = io::stdout().is_terminal();
        Self::from_writer(io::stdout(), interactive)
    }

    /// Console backed by any writer. `interactive` enables cursor control.
    pub fn from_writer(out: impl Write + Send + 'static, interactive: bool) -> Self {
        Self {
            state: Arc::new(Mutex::new(TermState {
                out: Box::new(out),
                cursor_visible: true,
            })),
            interactive,
        }
    }

    /// In-memory console, for capturing exactly what a run writes.
    pub fn buffered(interactive: bool) -> (Self, OutputBuffer) {
        let buffer = OutputBuffer::default();
        (Self::from_writer(buffer.clone(), interactive), buffer)
    }

    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    fn lock(&self) -> MutexGuard<'_, TermState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether the cursor is currently shown, as last set through this handle.
    pub fn cursor_visible(&self) -> bool {
        self.lock().cursor_visible
    }

    pub fn set_cursor_visible(&self, visible: bool) -> io::Result<()> {
        let mut state = self.lock();
        if self.interactive && state.cursor_visible != visible {
            let seq = if visible { SHOW_CURSOR } else { HIDE_CURSOR };
            state.out.write_all(seq.as_bytes())?;
            state.out.flush()?;
        }
        state.cursor_visible = visible;
        Ok(())
    }

    /// Hide the cursor until the returned guard is dropped, which restores the
    /// previous visibility (also on error paths).
    pub fn hide_cursor(&self) -> io::Result<CursorGuard> {
        let previous = self.cursor_visible();
        self.set_cursor_visible(false)?;
        Ok(CursorGuard {
            terminal: self.clone(),
            previous,
        })
    }

    /// Print `count` placeholder lines and move the cursor back to the first.
    pub fn reserve_rows(&self, count: usize, placeholder: &str) -> io::Result<()> {
        if count == 0 {
            return Ok(());
        }
        let mut state = self.lock();
        for _ in 0..count {
            writeln!(state.out, "{}", placeholder)?;
        }
        write!(state.out, "\x1b[{}A\r", count)?;
        state.out.flush()
    }

    /// Overwrite the line `offset` rows below the cursor with `line`, then put
    /// the cursor back where it was.
    pub fn overwrite_row(&self, offset: usize, line: &str) -> io::Result<()> {
        let mut state = self.lock();
        state.out.write_all(b"\r")?;
        if offset > 0 {
            write!(state.out, "\x1b[{}B", offset)?;
        }
        write!(state.out, "{}{}\n\x1b[{}A\r", CLEAR_LINE, line, offset + 1)?;
        state.out.flush()
    }

    /// Move the cursor `rows` lines down, to column 0.
    pub fn move_down(&self, rows: usize) -> io::Result<()> {
        if rows == 0 {
            return Ok(());
        }
        let mut state = self.lock();
        write!(state.out, "\r\x1b[{}B", rows)?;
        state.out.flush()
    }

    /// Clear the current line before it is written over.
    pub fn clear_line(&self) -> io::Result<()> {
        let mut state = self.lock();
        write!(state.out, "\r{}", CLEAR_LINE)
    }
}

impl Write for Terminal {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.lock().out.write(buf)
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        self.lock().out.write_all(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.lock().out.flush()
    }
}

/// Restores cursor visibility when dropped.
pub struct CursorGuard {
    terminal: Terminal,
    previous: bool,
}

impl Drop for CursorGuard {
    fn drop(&mut self) {
        if let Err(err) = self.terminal.set_cursor_visible(self.previous) {
            tracing::warn!("could not restore cursor visibility: {}", err);
        }
    }
}

/// Shared in-memory writer returned by [`Terminal::buffered`].
#[derive(Clone, Default)]
pub struct OutputBuffer(Arc<Mutex<Vec<u8>>>);

impl OutputBuffer {
    pub fn contents(&self) -> String {
        let bytes = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

impl Write for OutputBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_guard_restores_previous_visibility() {
        let (term, buf) = Terminal::buffered(true);
        {
            let _guard = term.hide_cursor().unwrap();
            assert!(!term.cursor_visible());
        }
        assert!(term.cursor_visible());
        assert_eq!(buf.contents(), format!("{}{}", HIDE_CURSOR, SHOW_CURSOR));
    }

    #[test]
    fn nested_guard_keeps_cursor_hidden() {
        let (term, _buf) = Terminal::buffered(true);
        let outer = term.hide_cursor().unwrap();
        drop(term.hide_cursor().unwrap());
        assert!(!term.cursor_visible());
        drop(outer);
        assert!(term.cursor_visible());
    }

    #[test]
    fn non_interactive_writes_no_escapes() {
        let (term, buf) = Terminal::buffered(false);
        let guard = term.hide_cursor().unwrap();
        drop(guard);
        assert_eq!(buf.contents(), "");
    }

    #[test]
    fn reserve_rows_moves_back_up() {
        let (term, buf) = Terminal::buffered(true);
        term.reserve_rows(3, " wait").unwrap();
        assert_eq!(buf.contents(), " wait\n wait\n wait\n\x1b[3A\r");
        term.reserve_rows(0, " wait").unwrap();
        assert_eq!(buf.contents(), " wait\n wait\n wait\n\x1b[3A\r");
    }

    #[test]
    fn overwrite_row_returns_to_start() {
        let (term, buf) = Terminal::buffered(true);
        term.overwrite_row(0, "a").unwrap();
        term.overwrite_row(2, "b").unwrap();
        assert_eq!(
            buf.contents(),
            "\r\x1b[2Ka\n\x1b[1A\r\r\x1b[2B\x1b[2Kb\n\x1b[3A\r"
        );
    }

    #[test]
    fn move_down_skips_rows() {
        let (term, buf) = Terminal::buffered(true);
        term.move_down(0).unwrap();
        assert_eq!(buf.contents(), "");
        term.move_down(4).unwrap();
        assert_eq!(buf.contents(), "\r\x1b[4B");
    }

    #[test]
    fn plain_writes_pass_through() {
        let (mut term, buf) = Terminal::buffered(true);
        write!(term, "hello {}", 1).unwrap();
        term.flush().unwrap();
        assert_eq!(buf.contents(), "hello 1");
    }
}
