#![forbid(unsafe_code)]

//! Colours and styles for every drawn element.
//!
//! | Element | Colour | Flags |
//! |---------|--------|-------|
//! | Command bits | bright green | BOLD |
//! | Random bits | dark green | DIM |
//! | Command links | cyan | UNDERLINE |
//! | Ghost suggestion | grey | DIM |

use termfolio_core::{BitSource, LineStyle, SpanKind};

use crate::render::{Rgb, Style, StyleFlags};

// ---------------------------------------------------------------------------
// Palette
// ---------------------------------------------------------------------------

pub const GREEN_BRIGHT: Rgb = Rgb(0, 255, 65);
pub const GREEN_DARK: Rgb = Rgb(0, 110, 30);
pub const PANEL_BG: Rgb = Rgb(8, 12, 8);
pub const BORDER: Rgb = Rgb(0, 170, 60);
pub const TEXT: Rgb = Rgb(205, 220, 205);
pub const MUTED: Rgb = Rgb(120, 130, 120);
pub const RED: Rgb = Rgb(255, 85, 85);
pub const YELLOW: Rgb = Rgb(255, 200, 60);
pub const BLUE: Rgb = Rgb(120, 200, 255);
pub const CYAN: Rgb = Rgb(100, 230, 230);
pub const GOLD: Rgb = Rgb(255, 220, 120);
pub const MENU_BG: Rgb = Rgb(16, 24, 16);

// ---------------------------------------------------------------------------
// Backdrop
// ---------------------------------------------------------------------------

/// Style of a bit symbol by where its block came from.
#[must_use]
pub fn bit(source: BitSource) -> Style {
    match source {
        BitSource::Command => Style::new().fg(GREEN_BRIGHT).flags(StyleFlags::BOLD),
        BitSource::Random => Style::new().fg(GREEN_DARK).flags(StyleFlags::DIM),
    }
}

// ---------------------------------------------------------------------------
// Panel
// ---------------------------------------------------------------------------

#[must_use]
pub fn panel() -> Style {
    Style::new().fg(TEXT).bg(PANEL_BG)
}

#[must_use]
pub fn border() -> Style {
    panel().fg(BORDER)
}

#[must_use]
pub fn title() -> Style {
    panel().fg(GREEN_BRIGHT).flags(StyleFlags::BOLD)
}

#[must_use]
pub fn prompt() -> Style {
    panel().fg(GREEN_BRIGHT).flags(StyleFlags::BOLD)
}

#[must_use]
pub fn ghost() -> Style {
    panel().fg(MUTED).flags(StyleFlags::DIM)
}

#[must_use]
pub fn cursor() -> Style {
    panel().flags(StyleFlags::REVERSE)
}

/// Base style of an output line.
#[must_use]
pub fn line(style: LineStyle) -> Style {
    let base = panel();
    match style {
        LineStyle::Plain => base,
        LineStyle::CommandEcho => base.fg(GREEN_BRIGHT),
        LineStyle::Error => base.fg(RED),
        LineStyle::Warning => base.fg(YELLOW),
        LineStyle::Success => base.fg(GREEN_BRIGHT),
        LineStyle::SectionHeader => base.fg(BLUE).flags(StyleFlags::BOLD),
        LineStyle::Loading => base.fg(YELLOW).flags(StyleFlags::ITALIC),
        LineStyle::AsciiArt => base.fg(GREEN_BRIGHT),
    }
}

/// Style of a span drawn on a line whose base style is `base`.
#[must_use]
pub fn span(kind: &SpanKind, base: Style) -> Style {
    match kind {
        SpanKind::Text => base,
        SpanKind::CommandLink(_) => base.patch(Style::new().fg(CYAN).flags(StyleFlags::UNDERLINE)),
        SpanKind::Highlight => base.patch(Style::new().fg(GOLD).flags(StyleFlags::BOLD)),
        SpanKind::Url(_) => base.patch(Style::new().fg(BLUE).flags(StyleFlags::UNDERLINE)),
    }
}

// ---------------------------------------------------------------------------
// Help menu
// ---------------------------------------------------------------------------

#[must_use]
pub fn menu() -> Style {
    Style::new().fg(TEXT).bg(MENU_BG)
}

#[must_use]
pub fn menu_border() -> Style {
    menu().fg(GREEN_BRIGHT)
}

#[must_use]
pub fn menu_entry() -> Style {
    menu().fg(CYAN).flags(StyleFlags::BOLD)
}
