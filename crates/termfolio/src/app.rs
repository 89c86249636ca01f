#![forbid(unsafe_code)]

//! Application loop.
//!
//! The loop owns the wall clock. Each iteration it advances the session to
//! the current instant, draws a frame if anything visible changed, then
//! waits for input no longer than the session's next deadline.
//!
//! # Frame Pacing
//!
//! | State | Frames |
//! |-------|--------|
//! | Idle | Only when the session reports a change (row ticks, input) |
//! | Animating | At most one per [`FRAME_INTERVAL`] (loading dots, sprites) |

use std::io::{self, Write};
use std::time::{Duration, Instant};

use termfolio_core::{KeyInput, Session, Viewport};
use time::OffsetDateTime;

use crate::cli::Opts;
use crate::error::Result;
use crate::render::{Grid, Presenter};
use crate::scene::{self, Hit, HitMap};
use crate::terminal::{InputEvent, TerminalSession, WHEEL_LINES};

/// Minimum spacing between frames while something animates.
pub const FRAME_INTERVAL: Duration = Duration::from_millis(50);

/// Longest wait for input when nothing is scheduled.
pub const IDLE_POLL: Duration = Duration::from_millis(500);

/// Date format used by `resume`.
const DATE_FORMAT: &str = "[month padding:none]/[day padding:none]/[year]";

/// Run the portfolio in the current terminal until the user quits.
pub fn run(opts: Opts) -> Result<()> {
    let mouse = opts.config.mouse;
    let terminal = TerminalSession::new(mouse)?;
    let (width, height) = terminal.size()?;
    let clock = Instant::now();

    let mut session = Session::new(opts.config, Some(Viewport::new(width, height)), Duration::ZERO);
    session.set_today(today());
    tracing::info!(width, height, mouse, "session started");

    let mut app = App::new(session, width, height, io::stdout());
    let result = app.run_loop(&terminal, clock);
    app.session.shutdown();
    result
}

/// Current date in the `resume` format; ISO 8601 if formatting fails.
fn today() -> String {
    let date = OffsetDateTime::now_utc().date();
    time::format_description::parse(DATE_FORMAT)
        .ok()
        .and_then(|items| date.format(&items).ok())
        .unwrap_or_else(|| date.to_string())
}

/// Session plus everything needed to put it on a screen.
#[derive(Debug)]
pub struct App<W: Write> {
    session: Session,
    grid: Grid,
    presenter: Presenter<W>,
    hits: HitMap,
    dirty: bool,
    last_frame: Option<Duration>,
    frames: u64,
}

impl<W: Write> App<W> {
    pub fn new(session: Session, width: u16, height: u16, writer: W) -> Self {
        Self {
            session,
            grid: Grid::new(width, height),
            presenter: Presenter::new(writer),
            hits: HitMap::new(),
            dirty: true,
            last_frame: None,
            frames: 0,
        }
    }

    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    #[must_use]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    fn run_loop(&mut self, terminal: &TerminalSession, clock: Instant) -> Result<()> {
        loop {
            let now = clock.elapsed();
            if self.session.should_exit(now) {
                tracing::info!(elapsed_ms = now.as_millis() as u64, "exit-after elapsed");
                return Ok(());
            }
            self.tick(now);
            if self.needs_frame(now) {
                self.render(now)?;
            }

            let timeout = self.poll_timeout(clock.elapsed());
            if let Some(event) = terminal.next_event(timeout)?
                && !self.handle_event(event, clock.elapsed())
            {
                tracing::info!(frames = self.frames, "quit requested");
                return Ok(());
            }
        }
    }

    /// Apply one input event. Returns `false` when the app should quit.
    pub fn handle_event(&mut self, event: InputEvent, now: Duration) -> bool {
        match event {
            InputEvent::Key(key) => self.dirty |= self.session.handle_key(key, now),
            InputEvent::Click { x, y } => self.click(x, y, now),
            InputEvent::ScrollUp => self.dirty |= self.session.scroll(WHEEL_LINES as isize),
            InputEvent::ScrollDown => self.dirty |= self.session.scroll(-(WHEEL_LINES as isize)),
            InputEvent::Resize { width, height } => {
                self.session.resize(Viewport::new(width, height), now);
                self.grid.resize(width, height);
                self.presenter.invalidate();
                self.dirty = true;
            }
            InputEvent::Quit => return false,
        }
        true
    }

    fn click(&mut self, x: u16, y: u16, now: Duration) {
        match self.hits.hit_test(x, y) {
            Some(Hit::Command(command)) => {
                tracing::debug!(command = command.name(), x, y, "command link clicked");
                self.session.handle_click_command(command, now);
                self.dirty = true;
            }
            Some(Hit::HelpButton) => {
                self.dirty |= self.session.handle_key(KeyInput::Help, now);
            }
            Some(Hit::HelpMenu) => {}
            None => self.dirty |= self.session.hide_help(),
        }
    }

    /// Advance the session to `now`.
    pub fn tick(&mut self, now: Duration) {
        self.dirty |= self.session.advance(now);
    }

    #[must_use]
    pub fn needs_frame(&self, now: Duration) -> bool {
        if self.dirty {
            return true;
        }
        scene::is_animating(&self.session)
            && self
                .last_frame
                .is_none_or(|last| now >= last + FRAME_INTERVAL)
    }

    /// Draw and present a frame.
    pub fn render(&mut self, now: Duration) -> io::Result<()> {
        self.hits = scene::draw(&self.session, &mut self.grid, now);
        let emitted = self.presenter.present(&self.grid)?;
        self.dirty = false;
        self.last_frame = Some(now);
        self.frames += 1;
        tracing::trace!(frame = self.frames, emitted, "frame rendered");
        Ok(())
    }

    /// How long to wait for input before the next scheduled work.
    #[must_use]
    pub fn poll_timeout(&self, now: Duration) -> Duration {
        let next_frame = scene::is_animating(&self.session)
            .then(|| self.last_frame.map_or(now, |last| last + FRAME_INTERVAL));
        [self.session.next_deadline(), next_frame]
            .into_iter()
            .flatten()
            .min()
            .map_or(IDLE_POLL, |at| at.saturating_sub(now))
            .min(IDLE_POLL)
    }
}
