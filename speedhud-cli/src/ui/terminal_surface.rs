//! Terminal-backed drawing surface.
//!
//! One terminal cell is one pixel. Lines are rasterised with box-drawing
//! glyphs and text is written one character per cell; the terminal has no
//! transparency, so alpha is applied by darkening the colour towards the
//! black background.

use std::io::{self, Stdout};

use crossterm::{
    cursor::{Hide, Show},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    buffer::Buffer,
    layout::Rect,
    style::Color as CellColor,
    widgets::Widget,
    Terminal,
};
use speedhud::render::{Canvas, Color, Paint, Point, SurfaceSize, TextAlign, TextBounds};
use speedhud::surface::{Surface, SurfaceError};

const VERTICAL: char = '│';
const HORIZONTAL: char = '─';
const DIAGONAL: char = '·';

/// A frame's worth of terminal cells.
#[derive(Debug, Clone)]
pub struct CellCanvas {
    buffer: Buffer,
}

impl CellCanvas {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            buffer: Buffer::empty(Rect::new(0, 0, width, height)),
        }
    }

    pub fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    /// Symbol in the cell at (`col`, `row`), if inside the canvas.
    pub fn symbol_at(&self, col: u16, row: u16) -> Option<&str> {
        self.buffer.cell((col, row)).map(|cell| cell.symbol())
    }

    /// Write `ch` into one cell, clipping anything outside the canvas.
    fn put(&mut self, col: i64, row: i64, ch: char, color: Color) {
        let area = self.buffer.area;
        if col < 0 || row < 0 || col >= area.width as i64 || row >= area.height as i64 {
            return;
        }
        if let Some(cell) = self.buffer.cell_mut((col as u16, row as u16)) {
            cell.set_char(ch).set_fg(cell_color(color));
        }
    }
}

fn cell_color(color: Color) -> CellColor {
    let (r, g, b) = color.premultiplied();
    CellColor::Rgb(r, g, b)
}

impl Canvas for CellCanvas {
    fn size(&self) -> SurfaceSize {
        SurfaceSize::new(self.buffer.area.width as u32, self.buffer.area.height as u32)
    }

    fn clear(&mut self, color: Color) {
        let bg = cell_color(color);
        for cell in self.buffer.content.iter_mut() {
            cell.reset();
            cell.set_bg(bg);
        }
    }

    fn draw_line(&mut self, from: Point, to: Point, paint: &Paint) {
        let dx = to.x - from.x;
        let dy = to.y - from.y;
        let glyph = if dx.abs() < 0.5 {
            VERTICAL
        } else if dy.abs() < 0.5 {
            HORIZONTAL
        } else {
            DIAGONAL
        };

        // DDA: one sample per cell along the longer axis
        let steps = dx.abs().max(dy.abs()).ceil().max(1.0) as i64;
        for i in 0..=steps {
            let t = i as f32 / steps as f32;
            let x = from.x + dx * t;
            let y = from.y + dy * t;
            self.put(x.floor() as i64, y.floor() as i64, glyph, paint.color);
        }
    }

    fn draw_text(&mut self, text: &str, origin: Point, paint: &Paint) {
        let len = text.chars().count() as f32;
        let left = match paint.align {
            TextAlign::Left => origin.x,
            TextAlign::Center => origin.x - len / 2.0,
            TextAlign::Right => origin.x - len,
        };
        let col = left.round() as i64;
        // Glyphs sit in the row just above the baseline
        let row = origin.y.ceil() as i64 - 1;

        for (i, ch) in text.chars().enumerate() {
            self.put(col + i as i64, row.max(0), ch, paint.color);
        }
    }

    fn text_bounds(&self, text: &str, _paint: &Paint) -> TextBounds {
        TextBounds {
            width: text.chars().count() as f32,
            height: 1.0,
        }
    }
}

impl Widget for &CellCanvas {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let visible = area.intersection(self.buffer.area);
        for y in visible.top()..visible.bottom() {
            for x in visible.left()..visible.right() {
                if let (Some(src), Some(dst)) = (self.buffer.cell((x, y)), buf.cell_mut((x, y))) {
                    *dst = src.clone();
                }
            }
        }
    }
}

/// The terminal as a [`Surface`].
///
/// Creating it switches the terminal to raw mode on the alternate screen;
/// dropping it restores the terminal.
pub struct TerminalSurface {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    restored: bool,
}

impl TerminalSurface {
    pub fn new() -> io::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, Hide)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;

        Ok(Self {
            terminal,
            restored: false,
        })
    }

    pub fn size(&self) -> io::Result<SurfaceSize> {
        let size = self.terminal.size()?;
        Ok(SurfaceSize::new(size.width as u32, size.height as u32))
    }

    /// Leave raw mode and the alternate screen.
    pub fn restore(&mut self) -> io::Result<()> {
        if self.restored {
            return Ok(());
        }
        self.restored = true;
        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen, Show)?;
        Ok(())
    }
}

impl Surface for TerminalSurface {
    type Canvas = CellCanvas;

    fn lock_canvas(&mut self) -> Result<CellCanvas, SurfaceError> {
        let size = self.terminal.size()?;
        if size.width == 0 || size.height == 0 {
            return Err(SurfaceError::Unavailable("terminal has no area".to_string()));
        }
        Ok(CellCanvas::new(size.width, size.height))
    }

    fn unlock_canvas_and_post(&mut self, canvas: CellCanvas) -> Result<(), SurfaceError> {
        self.terminal
            .draw(|frame| frame.render_widget(&canvas, frame.area()))
            .map_err(|e| SurfaceError::PostFailed(e.to_string()))?;
        Ok(())
    }
}

impl Drop for TerminalSurface {
    fn drop(&mut self) {
        let _ = self.restore();
    }
}

/// Restore the terminal without a [`TerminalSurface`] at hand.
pub fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen, Show)?;
    Ok(())
}
