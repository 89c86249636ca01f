#![forbid(unsafe_code)]

//! Cell grid: the frame being composed before it is presented.
//!
//! Each cell holds one grapheme and its style. Wide graphemes occupy their
//! head cell plus [`CellContent::Continuation`] cells; overwriting either
//! half of a wide grapheme blanks the other half so the grid never holds a
//! dangling half.

use bitflags::bitflags;
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

pub use termfolio_core::spawner::Rgb;

bitflags! {
    /// Text attributes.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct StyleFlags: u8 {
        const BOLD      = 0b0000_0001;
        const DIM       = 0b0000_0010;
        const ITALIC    = 0b0000_0100;
        const UNDERLINE = 0b0000_1000;
        const REVERSE   = 0b0001_0000;
    }
}

/// Colours and attributes of a cell. `None` colours use the terminal default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Style {
    pub fg: Option<Rgb>,
    pub bg: Option<Rgb>,
    pub flags: StyleFlags,
}

impl Style {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            fg: None,
            bg: None,
            flags: StyleFlags::empty(),
        }
    }

    #[must_use]
    pub const fn fg(mut self, color: Rgb) -> Self {
        self.fg = Some(color);
        self
    }

    #[must_use]
    pub const fn bg(mut self, color: Rgb) -> Self {
        self.bg = Some(color);
        self
    }

    #[must_use]
    pub const fn flags(mut self, flags: StyleFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Overlay `other` on top of `self`: set colours win, flags combine.
    #[must_use]
    pub fn patch(self, other: Style) -> Self {
        Self {
            fg: other.fg.or(self.fg),
            bg: other.bg.or(self.bg),
            flags: self.flags | other.flags,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CellContent {
    #[default]
    Empty,
    Char(char),
    /// Multi-codepoint grapheme cluster.
    Grapheme(Box<str>),
    /// Trailing cell of a wide grapheme.
    Continuation,
}

impl CellContent {
    fn from_grapheme(grapheme: &str) -> Self {
        let mut chars = grapheme.chars();
        match (chars.next(), chars.next()) {
            (Some(ch), None) => Self::Char(ch),
            (Some(_), Some(_)) => Self::Grapheme(grapheme.into()),
            (None, _) => Self::Empty,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Cell {
    pub content: CellContent,
    pub style: Style,
}

impl Cell {
    /// Display width of the cell's content.
    #[must_use]
    pub fn width(&self) -> u16 {
        match &self.content {
            CellContent::Empty => 1,
            CellContent::Char(ch) => {
                let mut buf = [0u8; 4];
                display_width(ch.encode_utf8(&mut buf)).max(1)
            }
            CellContent::Grapheme(g) => display_width(g).max(1),
            CellContent::Continuation => 0,
        }
    }
}

/// Display width of a string, in cells.
#[must_use]
pub fn display_width(text: &str) -> u16 {
    u16::try_from(UnicodeWidthStr::width(text)).unwrap_or(u16::MAX)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

impl Rect {
    #[must_use]
    pub const fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[must_use]
    pub const fn right(&self) -> u16 {
        self.x.saturating_add(self.width)
    }

    #[must_use]
    pub const fn bottom(&self) -> u16 {
        self.y.saturating_add(self.height)
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    #[must_use]
    pub const fn contains(&self, x: u16, y: u16) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Shrink by `dx` on the left and right and `dy` on the top and bottom.
    #[must_use]
    pub const fn inset(&self, dx: u16, dy: u16) -> Self {
        let width = self.width.saturating_sub(dx.saturating_mul(2));
        let height = self.height.saturating_sub(dy.saturating_mul(2));
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
            width,
            height,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

impl Grid {
    #[must_use]
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::default(); usize::from(width) * usize::from(height)],
        }
    }

    #[must_use]
    pub fn width(&self) -> u16 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u16 {
        self.height
    }

    #[must_use]
    pub fn area(&self) -> Rect {
        Rect::new(0, 0, self.width, self.height)
    }

    /// Resize and blank every cell.
    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.cells = vec![Cell::default(); usize::from(width) * usize::from(height)];
    }

    pub fn clear(&mut self) {
        self.cells.fill(Cell::default());
    }

    #[must_use]
    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        self.index(x, y).map(|i| &self.cells[i])
    }

    /// Blank every cell of `rect` with `style`.
    pub fn fill(&mut self, rect: Rect, style: Style) {
        for y in rect.y..rect.bottom().min(self.height) {
            for x in rect.x..rect.right().min(self.width) {
                self.set(x, y, Cell {
                    content: CellContent::Empty,
                    style,
                });
            }
        }
    }

    /// Write `text` starting at column `x` (which may be negative), clipped
    /// to `clip`. Returns the column after the last grapheme, clipped or not.
    pub fn put_str(&mut self, x: i32, y: u16, text: &str, style: Style, clip: Rect) -> i32 {
        let mut col = x;
        if y < clip.y || y >= clip.bottom() || y >= self.height {
            return col + i32::from(display_width(text));
        }
        let left = i32::from(clip.x);
        let right = i32::from(clip.right().min(self.width));
        for grapheme in text.graphemes(true) {
            let width = i32::from(display_width(grapheme));
            if width == 0 {
                continue;
            }
            if col >= right {
                col += width;
                continue;
            }
            if col >= left && col + width <= right {
                let head = col as u16;
                self.set(head, y, Cell {
                    content: CellContent::from_grapheme(grapheme),
                    style,
                });
                for dx in 1..width {
                    self.set(head + dx as u16, y, Cell {
                        content: CellContent::Continuation,
                        style,
                    });
                }
            } else {
                // Partially visible wide grapheme: blank the visible part.
                for c in col.max(left)..(col + width).min(right) {
                    self.set(c as u16, y, Cell {
                        content: CellContent::Empty,
                        style,
                    });
                }
            }
            col += width;
        }
        col
    }

    /// Plain text of row `y`, continuation cells skipped and empty cells as
    /// spaces.
    #[must_use]
    pub fn row_text(&self, y: u16) -> String {
        let mut out = String::new();
        for x in 0..self.width {
            match self.get(x, y).map(|c| &c.content) {
                Some(CellContent::Char(ch)) => out.push(*ch),
                Some(CellContent::Grapheme(g)) => out.push_str(g),
                Some(CellContent::Empty) => out.push(' '),
                Some(CellContent::Continuation) | None => {}
            }
        }
        out
    }

    fn index(&self, x: u16, y: u16) -> Option<usize> {
        (x < self.width && y < self.height)
            .then(|| usize::from(y) * usize::from(self.width) + usize::from(x))
    }

    fn set(&mut self, x: u16, y: u16, cell: Cell) {
        let Some(i) = self.index(x, y) else {
            return;
        };
        let incoming_continuation = cell.content == CellContent::Continuation;
        // Overwriting the tail of a wide grapheme orphans its head.
        if self.cells[i].content == CellContent::Continuation && !incoming_continuation {
            let mut hx = x;
            while hx > 0 {
                hx -= 1;
                let Some(h) = self.index(hx, y) else { break };
                if self.cells[h].content != CellContent::Continuation {
                    self.cells[h].content = CellContent::Empty;
                    break;
                }
                self.cells[h].content = CellContent::Empty;
            }
        }
        // Overwriting a wide head orphans its tail.
        let mut tx = x + 1;
        while let Some(t) = self.index(tx, y) {
            if self.cells[t].content != CellContent::Continuation {
                break;
            }
            self.cells[t].content = CellContent::Empty;
            tx += 1;
        }
        self.cells[i] = cell;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAIN: Style = Style::new();

    #[test]
    fn put_str_writes_and_clips() {
        let mut grid = Grid::new(6, 1);
        let end = grid.put_str(2, 0, "abcdef", PLAIN, grid.area());
        assert_eq!(end, 8);
        assert_eq!(grid.row_text(0), "  abcd");
    }

    #[test]
    fn negative_start_is_clipped_on_the_left() {
        let mut grid = Grid::new(5, 1);
        grid.put_str(-2, 0, "abcdefg", PLAIN, grid.area());
        assert_eq!(grid.row_text(0), "cdefg");
    }

    #[test]
    fn wide_graphemes_take_two_cells() {
        let mut grid = Grid::new(6, 1);
        let end = grid.put_str(0, 0, "🐰ab", PLAIN, grid.area());
        assert_eq!(end, 4);
        assert_eq!(grid.get(1, 0).map(|c| &c.content), Some(&CellContent::Continuation));
        assert_eq!(grid.row_text(0), "🐰ab  ");
    }

    #[test]
    fn overwriting_half_a_wide_grapheme_blanks_the_rest() {
        let mut grid = Grid::new(4, 1);
        grid.put_str(0, 0, "🐰", PLAIN, grid.area());
        grid.put_str(1, 0, "x", PLAIN, grid.area());
        assert_eq!(grid.row_text(0), " x  ");

        grid.put_str(2, 0, "🐰", PLAIN, grid.area());
        grid.put_str(2, 0, "y", PLAIN, grid.area());
        assert_eq!(grid.row_text(0), " xy ");
    }

    #[test]
    fn wide_grapheme_straddling_clip_is_blanked() {
        let mut grid = Grid::new(3, 1);
        grid.put_str(0, 0, "ab", PLAIN, grid.area());
        grid.put_str(2, 0, "🐰", PLAIN, grid.area());
        assert_eq!(grid.row_text(0), "ab ");
    }

    #[test]
    fn fill_blanks_and_styles_the_rect() {
        let mut grid = Grid::new(3, 2);
        let green = Rgb(0, 255, 0);
        grid.put_str(0, 1, "abc", PLAIN, grid.area());
        grid.fill(Rect::new(0, 1, 3, 1), Style::new().bg(green));
        let cell = grid.get(1, 1).cloned().unwrap_or_default();
        assert_eq!(cell.content, CellContent::Empty);
        assert_eq!(cell.style.bg, Some(green));
        assert_eq!(grid.get(0, 0).map(|c| c.style), Some(PLAIN));
    }

    #[test]
    fn patch_overlays_colours_and_merges_flags() {
        let base = Style::new().fg(Rgb(1, 1, 1)).bg(Rgb(2, 2, 2)).flags(StyleFlags::BOLD);
        let top = Style::new().fg(Rgb(9, 9, 9)).flags(StyleFlags::UNDERLINE);
        let merged = base.patch(top);
        assert_eq!(merged.fg, Some(Rgb(9, 9, 9)));
        assert_eq!(merged.bg, Some(Rgb(2, 2, 2)));
        assert_eq!(merged.flags, StyleFlags::BOLD | StyleFlags::UNDERLINE);
    }

    #[test]
    fn rect_inset_and_contains() {
        let r = Rect::new(0, 0, 10, 6).inset(2, 1);
        assert_eq!(r, Rect::new(2, 1, 6, 4));
        assert!(r.contains(2, 1));
        assert!(!r.contains(8, 1));
        assert!(Rect::new(0, 0, 3, 3).inset(2, 2).is_empty());
    }
}
