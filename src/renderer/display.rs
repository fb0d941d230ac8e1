use anyhow::Result;
use crossterm::{
    cursor,
    style::Print,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use std::io::{BufWriter, Stdout, Write};

use super::cell::CellData;

/// Truecolor diff renderer over the alternate screen.
///
/// Owns raw mode and the alternate screen for its whole lifetime; Drop
/// restores the terminal on every exit path, including panics unwinding out
/// of the review and stream loops.
pub struct DisplayManager {
    stdout: BufWriter<Stdout>,
    last_cells: Option<Vec<CellData>>,
    render_buffer: Vec<u8>,
}

impl DisplayManager {
    pub fn new() -> Result<Self> {
        // Large output buffer so a full-frame redraw is one write syscall.
        let stdout = BufWriter::with_capacity(4 * 1024 * 1024, std::io::stdout());
        let mut dm = Self {
            stdout,
            last_cells: None,
            render_buffer: Vec::with_capacity(4 * 1024 * 1024),
        };

        dm.initialize_terminal()?;
        Ok(dm)
    }

    fn initialize_terminal(&mut self) -> Result<()> {
        terminal::enable_raw_mode()?;
        self.stdout.execute(EnterAlternateScreen)?;
        self.stdout.execute(cursor::Hide)?;

        // No line wrapping at the right edge.
        self.stdout.execute(Print("\x1b[?7l"))?;
        // Synchronized updates (mode 2026); unsupported terminals ignore it.
        self.stdout.execute(Print("\x1b[?2026h"))?;
        self.stdout.execute(Print("\x1b[?12l"))?;

        Ok(())
    }

    /// Terminal size in character cells.
    pub fn terminal_size_chars(&self) -> Result<(u16, u16)> {
        Ok(terminal::size()?)
    }

    #[inline(always)]
    fn write_u8_fast(buffer: &mut Vec<u8>, mut n: u8) {
        if n >= 100 {
            buffer.push(b'0' + n / 100);
            n %= 100;
            buffer.push(b'0' + n / 10);
            buffer.push(b'0' + n % 10);
        } else if n >= 10 {
            buffer.push(b'0' + n / 10);
            buffer.push(b'0' + n % 10);
        } else {
            buffer.push(b'0' + n);
        }
    }

    #[inline(always)]
    fn write_u16_fast(buffer: &mut Vec<u8>, n: u16) {
        let mut digits = [0u8; 5];
        let mut len = 0;
        let mut v = n;
        loop {
            digits[len] = b'0' + (v % 10) as u8;
            v /= 10;
            len += 1;
            if v == 0 {
                break;
            }
        }
        for i in (0..len).rev() {
            buffer.push(digits[i]);
        }
    }

    /// Emit only the cells that changed since the previous frame.
    pub fn render_diff(&mut self, cells: &[CellData], width: usize) -> Result<()> {
        let start_render = std::time::Instant::now();

        self.render_buffer.clear();
        let buffer = &mut self.render_buffer;

        buffer.extend_from_slice(b"\x1b[?2026h");

        let mut force_redraw = false;
        if self.last_cells.as_ref().map(|v| v.len()).unwrap_or(0) != cells.len() {
            buffer.extend_from_slice(b"\x1b[2J");
            self.last_cells = Some(vec![CellData::default(); cells.len()]);
            force_redraw = true;
        }

        let last_cells = match &mut self.last_cells {
            Some(v) => v,
            None => return Ok(()),
        };

        let (term_cols, term_rows) = terminal::size().unwrap_or((80, 24));
        let content_width = width as u16;
        let content_height = (cells.len() / width) as u16;

        let offset_x = term_cols.saturating_sub(content_width) / 2;
        let offset_y = term_rows.saturating_sub(content_height) / 2;

        let mut last_fg: Option<(u8, u8, u8)> = None;
        let mut last_bg: Option<(u8, u8, u8)> = None;

        // Virtual cursor; -1 forces a move escape on the next changed cell.
        let mut cursor_x: i32 = -1;
        let mut cursor_y: i32 = -1;

        for (i, cell) in cells.iter().enumerate() {
            let old_cell = &last_cells[i];
            let is_different =
                force_redraw || cell.char != old_cell.char || cell.fg != old_cell.fg
                    || cell.bg != old_cell.bg;

            if !is_different {
                cursor_x = -1;
                continue;
            }

            let target_x = (i % width) as u16 + offset_x;
            let target_y = (i / width) as u16 + offset_y;

            if target_x >= term_cols || target_y >= term_rows {
                cursor_x = -1;
                continue;
            }

            if cursor_x != target_x as i32 || cursor_y != target_y as i32 {
                buffer.extend_from_slice(b"\x1b[");
                Self::write_u16_fast(buffer, target_y + 1);
                buffer.push(b';');
                Self::write_u16_fast(buffer, target_x + 1);
                buffer.push(b'H');
                cursor_x = target_x as i32;
                cursor_y = target_y as i32;
            }

            if Some(cell.fg) != last_fg {
                buffer.extend_from_slice(b"\x1b[38;2;");
                Self::write_u8_fast(buffer, cell.fg.0);
                buffer.push(b';');
                Self::write_u8_fast(buffer, cell.fg.1);
                buffer.push(b';');
                Self::write_u8_fast(buffer, cell.fg.2);
                buffer.push(b'm');
                last_fg = Some(cell.fg);
            }
            if Some(cell.bg) != last_bg {
                buffer.extend_from_slice(b"\x1b[48;2;");
                Self::write_u8_fast(buffer, cell.bg.0);
                buffer.push(b';');
                Self::write_u8_fast(buffer, cell.bg.1);
                buffer.push(b';');
                Self::write_u8_fast(buffer, cell.bg.2);
                buffer.push(b'm');
                last_bg = Some(cell.bg);
            }

            let mut utf8 = [0u8; 4];
            buffer.extend_from_slice(cell.char.encode_utf8(&mut utf8).as_bytes());

            last_cells[i] = *cell;
            cursor_x += 1;
        }

        buffer.extend_from_slice(b"\x1b[0m");
        buffer.extend_from_slice(b"\x1b[?2026l");

        self.stdout.write_all(buffer)?;
        self.stdout.flush()?;

        let total_time = start_render.elapsed();
        if total_time.as_millis() > 10 {
            crate::utils::logger::debug(&format!(
                "Slow render: {}us for {} cells",
                total_time.as_micros(),
                cells.len()
            ));
        }

        Ok(())
    }
}

impl Drop for DisplayManager {
    fn drop(&mut self) {
        let _ = self.stdout.execute(Print("\x1b[?7h"));
        let _ = self.stdout.execute(cursor::Show);
        let _ = self.stdout.execute(LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}
