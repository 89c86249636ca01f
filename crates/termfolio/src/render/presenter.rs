#![forbid(unsafe_code)]

//! Presenter: emits the difference between two grids as terminal output.
//!
//! The presenter remembers the last grid it wrote, the style the terminal is
//! currently in, and where the cursor is. Only changed cells are emitted;
//! cursor moves are skipped when the cursor already sits at the next changed
//! cell, and SGR is only re-sent when the style changes.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Write error | Terminal closed | `io::Error` returned; state invalidated |
//! | Size change | Resize between frames | Full clear and redraw |

use std::io::{self, BufWriter, Write};

use crossterm::cursor::MoveTo;
use crossterm::queue;
use crossterm::style::{Attribute, Color, Print, SetAttribute, SetBackgroundColor, SetForegroundColor};
use crossterm::terminal::{Clear, ClearType};

use super::grid::{Cell, CellContent, Grid, Rgb, Style, StyleFlags};

const BUFFER_CAPACITY: usize = 64 * 1024;

#[derive(Debug)]
pub struct Presenter<W: Write> {
    writer: BufWriter<W>,
    previous: Option<Grid>,
    current_style: Option<Style>,
    cursor: Option<(u16, u16)>,
}

impl<W: Write> Presenter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: BufWriter::with_capacity(BUFFER_CAPACITY, writer),
            previous: None,
            current_style: None,
            cursor: None,
        }
    }

    /// Forget the previous frame so the next present redraws everything.
    pub fn invalidate(&mut self) {
        self.previous = None;
        self.current_style = None;
        self.cursor = None;
    }

    /// Write the cells of `grid` that differ from the previous frame.
    /// Returns the number of cells emitted.
    pub fn present(&mut self, grid: &Grid) -> io::Result<usize> {
        match self.emit(grid) {
            Ok(count) => {
                self.previous = Some(grid.clone());
                Ok(count)
            }
            Err(err) => {
                self.invalidate();
                Err(err)
            }
        }
    }

    pub fn get_ref(&self) -> &W {
        self.writer.get_ref()
    }

    fn emit(&mut self, grid: &Grid) -> io::Result<usize> {
        let full = self
            .previous
            .as_ref()
            .is_none_or(|prev| prev.width() != grid.width() || prev.height() != grid.height());
        if full {
            queue!(self.writer, SetAttribute(Attribute::Reset), Clear(ClearType::All))?;
            self.current_style = Some(Style::default());
            self.cursor = None;
        }

        let mut emitted = 0;
        for y in 0..grid.height() {
            for x in 0..grid.width() {
                let Some(cell) = grid.get(x, y) else { continue };
                if cell.content == CellContent::Continuation {
                    continue;
                }
                let unchanged = !full
                    && self
                        .previous
                        .as_ref()
                        .and_then(|prev| prev.get(x, y))
                        .is_some_and(|prev| prev == cell);
                if unchanged {
                    continue;
                }
                self.emit_cell(x, y, cell)?;
                emitted += 1;
            }
        }

        queue!(self.writer, SetAttribute(Attribute::Reset))?;
        self.current_style = Some(Style::default());
        self.writer.flush()?;
        tracing::trace!(emitted, full, "frame presented");
        Ok(emitted)
    }

    fn emit_cell(&mut self, x: u16, y: u16, cell: &Cell) -> io::Result<()> {
        if self.cursor != Some((x, y)) {
            queue!(self.writer, MoveTo(x, y))?;
        }
        if self.current_style != Some(cell.style) {
            self.apply_style(cell.style)?;
        }
        match &cell.content {
            CellContent::Empty | CellContent::Continuation => queue!(self.writer, Print(' '))?,
            CellContent::Char(ch) => queue!(self.writer, Print(*ch))?,
            CellContent::Grapheme(g) => queue!(self.writer, Print(&**g))?,
        }
        self.cursor = Some((x.saturating_add(cell.width()), y));
        Ok(())
    }

    fn apply_style(&mut self, style: Style) -> io::Result<()> {
        queue!(self.writer, SetAttribute(Attribute::Reset))?;
        if let Some(fg) = style.fg {
            queue!(self.writer, SetForegroundColor(color(fg)))?;
        }
        if let Some(bg) = style.bg {
            queue!(self.writer, SetBackgroundColor(color(bg)))?;
        }
        for (flag, attr) in [
            (StyleFlags::BOLD, Attribute::Bold),
            (StyleFlags::DIM, Attribute::Dim),
            (StyleFlags::ITALIC, Attribute::Italic),
            (StyleFlags::UNDERLINE, Attribute::Underlined),
            (StyleFlags::REVERSE, Attribute::Reverse),
        ] {
            if style.flags.contains(flag) {
                queue!(self.writer, SetAttribute(attr))?;
            }
        }
        self.current_style = Some(style);
        Ok(())
    }
}

fn color(Rgb(r, g, b): Rgb) -> Color {
    Color::Rgb { r, g, b }
}
