#![forbid(unsafe_code)]

//! Scene: draws a [`Session`] into a [`Grid`].
//!
//! Layers, bottom to top:
//!
//! 1. Binary backdrop rows
//! 2. Terminal panel (border, output, input line)
//! 3. Sprites
//! 4. Help menu
//!
//! Drawing also records every clickable region in a [`HitMap`], so hit
//! testing always matches what is on screen.

use std::time::Duration;

use termfolio_core::{BinaryBackground, Command, LineStyle, OutputLine, Session, SpanKind};

use crate::render::{Grid, Rect, Style, StyleFlags, display_width};
use crate::theme;

/// Panels smaller than this are not drawn; only the backdrop shows.
pub const MIN_PANEL_WIDTH: u16 = 24;
pub const MIN_PANEL_HEIGHT: u16 = 5;

/// One more loading dot appears every period, up to three.
const LOADING_DOT_PERIOD_MS: u128 = 400;

const HELP_BUTTON: &str = "[?]";
const HELP_FOOTER: &str = "Click a command, or Esc to close";

/// What a clickable region does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
    Command(Command),
    HelpButton,
    /// Inside the help menu but not on an entry.
    HelpMenu,
}

/// Clickable regions of the last drawn frame. Later regions sit on top.
#[derive(Debug, Clone, Default)]
pub struct HitMap {
    regions: Vec<(Rect, Hit)>,
}

impl HitMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, rect: Rect, hit: Hit) {
        if !rect.is_empty() {
            self.regions.push((rect, hit));
        }
    }

    /// Topmost region containing the cell.
    #[must_use]
    pub fn hit_test(&self, x: u16, y: u16) -> Option<Hit> {
        self.regions
            .iter()
            .rev()
            .find(|(rect, _)| rect.contains(x, y))
            .map(|(_, hit)| *hit)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

/// Whether the frame changes with time alone (loading dots, sprites).
#[must_use]
pub fn is_animating(session: &Session) -> bool {
    session.dispatcher().pending_count() > 0 || !session.spawner().sprites().is_empty()
}

/// Draw the whole scene at `now`.
pub fn draw(session: &Session, grid: &mut Grid, now: Duration) -> HitMap {
    grid.clear();
    let mut hits = HitMap::new();

    draw_backdrop(session.background(), grid);

    let config = session.config();
    let panel = grid
        .area()
        .inset(config.panel_margin_x, config.panel_margin_y);
    if panel.width >= MIN_PANEL_WIDTH && panel.height >= MIN_PANEL_HEIGHT {
        draw_panel(session, grid, panel, now, &mut hits);
    }

    draw_sprites(session, grid, now);

    if session.help_open() {
        draw_help_menu(grid, &mut hits);
    }
    hits
}

// ---------------------------------------------------------------------------
// Backdrop
// ---------------------------------------------------------------------------

fn draw_backdrop(background: &BinaryBackground, grid: &mut Grid) {
    let area = grid.area();
    let mut symbols = String::new();
    for row in background.rows() {
        let y = (row.vertical_position() / 100.0 * f32::from(area.height)).round() as u16;
        if y >= area.height {
            continue;
        }
        let mut x = 0i32;
        for block in row.blocks() {
            if x >= i32::from(area.width) {
                break;
            }
            symbols.clear();
            block.render_into(&mut symbols);
            x = grid.put_str(x, y, &symbols, theme::bit(block.source()), area);
        }
    }
}

// ---------------------------------------------------------------------------
// Panel
// ---------------------------------------------------------------------------

fn draw_panel(session: &Session, grid: &mut Grid, panel: Rect, now: Duration, hits: &mut HitMap) {
    grid.fill(panel, theme::panel());
    draw_frame(grid, panel, theme::border());

    let config = session.config();
    let button_x = panel.right().saturating_sub(2 + display_width(HELP_BUTTON));
    let title = format!(
        " {}@{}: ~/portfolio/{} ",
        config.user,
        config.host,
        session.dispatcher().section()
    );
    let title_clip = Rect::new(panel.x, panel.y, button_x.saturating_sub(panel.x + 1), 1);
    grid.put_str(i32::from(panel.x) + 2, panel.y, &title, theme::title(), title_clip);

    grid.put_str(i32::from(button_x), panel.y, HELP_BUTTON, theme::title(), panel);
    hits.register(
        Rect::new(button_x, panel.y, display_width(HELP_BUTTON), 1),
        Hit::HelpButton,
    );

    let inner = Rect::new(
        panel.x + 2,
        panel.y + 1,
        panel.width.saturating_sub(4),
        panel.height.saturating_sub(2),
    );
    let output_height = inner.height.saturating_sub(1);
    let output_area = Rect::new(inner.x, inner.y, inner.width, output_height);
    let output = session.output();
    for (i, line) in output.visible(usize::from(output_height)).iter().enumerate() {
        draw_output_line(grid, line, output_area.y + i as u16, output_area, now, hits);
    }

    let hidden = output.scroll_from_bottom();
    if hidden > 0 {
        let marker = format!(" {hidden} more below ");
        let x = panel.right().saturating_sub(2 + display_width(&marker));
        grid.put_str(i32::from(x), panel.bottom() - 1, &marker, theme::border(), panel);
    }

    draw_input(session, grid, Rect::new(inner.x, inner.bottom().saturating_sub(1), inner.width, 1));
}

fn draw_frame(grid: &mut Grid, rect: Rect, style: Style) {
    if rect.width < 2 || rect.height < 2 {
        return;
    }
    let horizontal = "─".repeat(usize::from(rect.width - 2));
    let x = i32::from(rect.x);
    grid.put_str(x, rect.y, &format!("╭{horizontal}╮"), style, rect);
    grid.put_str(x, rect.bottom() - 1, &format!("╰{horizontal}╯"), style, rect);
    for y in rect.y + 1..rect.bottom() - 1 {
        grid.put_str(x, y, "│", style, rect);
        grid.put_str(i32::from(rect.right() - 1), y, "│", style, rect);
    }
}

fn draw_output_line(
    grid: &mut Grid,
    line: &OutputLine,
    y: u16,
    clip: Rect,
    now: Duration,
    hits: &mut HitMap,
) {
    let base = theme::line(line.style);
    let mut x = i32::from(clip.x);
    for span in &line.spans {
        let start = x;
        x = grid.put_str(x, y, &span.text, theme::span(&span.kind, base), clip);
        if let SpanKind::CommandLink(command) = span.kind {
            let left = start.max(i32::from(clip.x));
            let right = x.min(i32::from(clip.right()));
            if right > left {
                hits.register(
                    Rect::new(left as u16, y, (right - left) as u16, 1),
                    Hit::Command(command),
                );
            }
        }
    }
    if line.style == LineStyle::Loading {
        let dots = (now.as_millis() / LOADING_DOT_PERIOD_MS % 4) as usize;
        grid.put_str(x, y, &".".repeat(dots), base, clip);
    }
}

/// Prompt, typed text, dimmed suggestion suffix, then a block cursor. The
/// line scrolls left once it no longer fits.
fn draw_input(session: &Session, grid: &mut Grid, area: Rect) {
    let prompt = format!("{} ", session.config().prompt());
    let input = session.input();
    let ghost = input.ghost_suffix().unwrap_or("");
    let total = i32::from(display_width(&prompt))
        + i32::from(display_width(input.text()))
        + i32::from(display_width(ghost))
        + 1;
    let overflow = (total - i32::from(area.width)).max(0);

    let mut x = i32::from(area.x) - overflow;
    x = grid.put_str(x, area.y, &prompt, theme::prompt(), area);
    x = grid.put_str(x, area.y, input.text(), theme::panel(), area);
    x = grid.put_str(x, area.y, ghost, theme::ghost(), area);
    grid.put_str(x, area.y, " ", theme::cursor(), area);
}

// ---------------------------------------------------------------------------
// Sprites
// ---------------------------------------------------------------------------

fn draw_sprites(session: &Session, grid: &mut Grid, now: Duration) {
    let area = grid.area();
    for sprite in session.spawner().sprites() {
        let character = sprite.character();
        let width = display_width(character.glyph);
        let x = sprite.column(now, area.width, width);
        let y = sprite.row(now, area.height);
        let under = grid
            .get(x.clamp(0, i32::from(u16::MAX)) as u16, y)
            .and_then(|cell| cell.style.bg);
        let mut style = Style::new().fg(character.color).flags(StyleFlags::BOLD);
        style.bg = under;
        grid.put_str(x, y, character.glyph, style, area);
    }
}

// ---------------------------------------------------------------------------
// Help menu
// ---------------------------------------------------------------------------

fn draw_help_menu(grid: &mut Grid, hits: &mut HitMap) {
    let area = grid.area();
    let name_width = Command::ALL
        .iter()
        .map(|cmd| display_width(cmd.name()))
        .max()
        .unwrap_or(0);
    let entries: Vec<(Command, String)> = Command::ALL
        .into_iter()
        .map(|cmd| {
            let pad = usize::from(name_width);
            (cmd, format!("{:<pad$}  {}", cmd.name(), cmd.description()))
        })
        .collect();
    let content_width = entries
        .iter()
        .map(|(_, text)| display_width(text))
        .chain([display_width(HELP_FOOTER)])
        .max()
        .unwrap_or(0);

    let width = (content_width + 4).min(area.width);
    let height = (entries.len() as u16 + 4).min(area.height);
    let menu = Rect::new(
        (area.width - width) / 2,
        (area.height - height) / 2,
        width,
        height,
    );

    grid.fill(menu, theme::menu());
    draw_frame(grid, menu, theme::menu_border());
    grid.put_str(i32::from(menu.x) + 2, menu.y, " Commands ", theme::menu_border(), menu);
    hits.register(menu, Hit::HelpMenu);

    let inner = menu.inset(2, 1);
    for (i, (command, text)) in entries.iter().enumerate() {
        let y = inner.y + i as u16;
        if y >= inner.bottom() {
            break;
        }
        grid.put_str(i32::from(inner.x), y, text, theme::menu(), inner);
        grid.put_str(i32::from(inner.x), y, command.name(), theme::menu_entry(), inner);
        hits.register(Rect::new(inner.x, y, inner.width, 1), Hit::Command(*command));
    }
    let footer_y = inner.y + entries.len() as u16 + 1;
    if footer_y < inner.bottom() {
        let mut footer = theme::menu();
        footer.flags = StyleFlags::DIM;
        grid.put_str(i32::from(inner.x), footer_y, HELP_FOOTER, footer, inner);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use termfolio_core::{Config, KeyInput, Viewport};

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn session(width: u16, height: u16) -> Session {
        let config = Config {
            seed: Some(5),
            ..Config::default()
        };
        Session::new(config, Some(Viewport::new(width, height)), Duration::ZERO)
    }

    fn render(session: &Session, now: Duration) -> (Grid, HitMap) {
        let viewport = session.viewport().unwrap_or_default();
        let mut grid = Grid::new(viewport.width, viewport.height);
        let hits = draw(session, &mut grid, now);
        (grid, hits)
    }

    /// Row and column of the first occurrence of `needle`. Only valid for
    /// rows made of single-width characters.
    fn find(grid: &Grid, needle: &str) -> Option<(u16, u16)> {
        (0..grid.height()).find_map(|y| {
            let row: Vec<char> = grid.row_text(y).chars().collect();
            let needle: Vec<char> = needle.chars().collect();
            row.windows(needle.len())
                .position(|w| w == needle.as_slice())
                .map(|x| (x as u16, y))
        })
    }

    #[test]
    fn backdrop_rows_show_bits() {
        let s = session(80, 24);
        let (grid, _) = render(&s, ms(0));
        let top = grid.row_text(0);
        assert_eq!(top.chars().count(), 80);
        assert!(top.chars().all(|ch| matches!(ch, '0' | '1' | ' ')));
        assert!(top.starts_with(|ch| matches!(ch, '0' | '1')));
    }

    #[test]
    fn panel_shows_welcome_and_prompt() {
        let s = session(80, 24);
        let (grid, _) = render(&s, ms(0));
        assert_eq!(grid.get(6, 1).map(|c| c.content.clone()), Some(crate::render::CellContent::Char('╭')));
        assert!(find(&grid, "Welcome to my terminal portfolio.").is_some());
        assert!(find(&grid, "user@portfolio:~$ ").is_some());
        assert!(find(&grid, "~/portfolio/home").is_some());
    }

    #[test]
    fn welcome_link_is_clickable() {
        let s = session(80, 24);
        let (grid, hits) = render(&s, ms(0));
        let (x, y) = find(&grid, "Type help").map(|(x, y)| (x + 5, y)).unwrap_or_default();
        assert_eq!(hits.hit_test(x, y), Some(Hit::Command(Command::Help)));
        assert_eq!(hits.hit_test(x + 3, y), Some(Hit::Command(Command::Help)));
        assert_eq!(hits.hit_test(x + 4, y), None);
    }

    #[test]
    fn help_button_is_clickable() {
        let s = session(80, 24);
        let (grid, hits) = render(&s, ms(0));
        let (x, y) = find(&grid, HELP_BUTTON).unwrap_or_default();
        assert_eq!(hits.hit_test(x + 1, y), Some(Hit::HelpButton));
    }

    #[test]
    fn ghost_suggestion_follows_typed_text() {
        let mut s = session(80, 24);
        s.handle_key(KeyInput::Char('e'), ms(0));
        s.handle_key(KeyInput::Char('x'), ms(0));
        let (grid, _) = render(&s, ms(0));
        let (x, y) = find(&grid, "user@portfolio:~$ experience").unwrap_or_default();
        let ghost_x = x + display_width("user@portfolio:~$ ex");
        let cell = grid.get(ghost_x, y).cloned().unwrap_or_default();
        assert!(cell.style.flags.contains(StyleFlags::DIM));
    }

    #[test]
    fn loading_dots_animate() {
        let mut s = session(80, 24);
        s.execute("help", ms(0));
        assert!(is_animating(&s));
        let (grid, _) = render(&s, ms(800));
        assert!(find(&grid, "> Executing help..").is_some());
        assert!(find(&grid, "> Executing help...").is_none());
    }

    #[test]
    fn help_menu_overlays_and_captures_clicks() {
        let mut s = session(80, 24);
        s.handle_key(KeyInput::Help, ms(0));
        let (grid, hits) = render(&s, ms(0));
        let (x, y) = find(&grid, "coffee").unwrap_or_default();
        assert_eq!(hits.hit_test(x, y), Some(Hit::Command(Command::Coffee)));
        let (fx, fy) = find(&grid, HELP_FOOTER).unwrap_or_default();
        assert_eq!(hits.hit_test(fx, fy), Some(Hit::HelpMenu));
    }

    #[test]
    fn sprites_are_drawn_in_their_colour() {
        let mut s = session(80, 24);
        s.execute("spawn", ms(0));
        s.advance(ms(7_000));
        assert!(is_animating(&s));
        let (grid, _) = render(&s, ms(7_000));
        let coloured = (0..grid.height()).any(|y| {
            (0..grid.width()).any(|x| {
                grid.get(x, y).is_some_and(|cell| {
                    s.spawner()
                        .sprites()
                        .iter()
                        .any(|sprite| cell.style.fg == Some(sprite.character().color))
                })
            })
        });
        assert!(coloured);
    }

    #[test]
    fn tiny_screen_draws_only_the_backdrop() {
        let s = session(12, 3);
        let (grid, hits) = render(&s, ms(0));
        assert!(hits.is_empty());
        assert!(grid.row_text(0).chars().all(|ch| matches!(ch, '0' | '1' | ' ')));
    }

    #[test]
    fn hit_map_prefers_later_regions() {
        let mut hits = HitMap::new();
        hits.register(Rect::new(0, 0, 10, 10), Hit::HelpMenu);
        hits.register(Rect::new(2, 2, 3, 1), Hit::Command(Command::Ls));
        hits.register(Rect::new(0, 0, 0, 5), Hit::HelpButton);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits.hit_test(3, 2), Some(Hit::Command(Command::Ls)));
        assert_eq!(hits.hit_test(3, 3), Some(Hit::HelpMenu));
        assert_eq!(hits.hit_test(11, 0), None);
    }
}
