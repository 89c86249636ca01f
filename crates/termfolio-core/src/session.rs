#![forbid(unsafe_code)]

//! Session: the owned context tying every component together.
//!
//! A [`Session`] holds the input line, output view, dispatcher, binary
//! backdrop, sprite spawner, and every timer. It never reads a clock; the
//! host calls [`Session::advance`] with the elapsed time and sleeps until
//! [`Session::next_deadline`].
//!
//! ```
//! use std::time::Duration;
//! use termfolio_core::{Config, Session, Viewport};
//!
//! let config = Config { seed: Some(7), ..Config::default() };
//! let mut session = Session::new(config, Some(Viewport::new(80, 24)), Duration::ZERO);
//! session.execute("ls", Duration::ZERO);
//! session.advance(Duration::from_millis(1500));
//! assert!(session.output().len() > 1);
//! ```

use std::time::Duration;

use crate::background::{BinaryBackground, RowMetrics, Viewport};
use crate::block::BLOCK_WIDTH;
use crate::command::Command;
use crate::config::{Config, RESIZE_QUIET_PERIOD, ROW_TICK_INTERVAL};
use crate::content;
use crate::debounce::Debouncer;
use crate::dispatch::{Dispatch, Dispatcher, RunContext};
use crate::input::InputLine;
use crate::output::{LineStyle, OutputLine, OutputView};
use crate::rng::Rng;
use crate::spawner::Spawner;
use crate::timer::Interval;

/// Lines moved per PageUp/PageDown.
pub const SCROLL_PAGE: usize = 10;

/// Keys the session understands. Hosts map their own events onto these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    Char(char),
    Backspace,
    Enter,
    Tab,
    Up,
    Down,
    PageUp,
    PageDown,
    /// Closes the help menu.
    Escape,
    /// Toggles the help menu.
    Help,
}

#[derive(Debug)]
pub struct Session {
    config: Config,
    started: Duration,
    now: Duration,
    viewport: Option<Viewport>,
    input: InputLine,
    output: OutputView,
    dispatcher: Dispatcher,
    background: BinaryBackground,
    spawner: Spawner,
    row_ticks: Interval,
    resize: Debouncer<Viewport>,
    help_open: bool,
    rng: Rng,
    today: String,
    exit_at: Option<Duration>,
    shut_down: bool,
}

impl Session {
    /// Start a session at `now`. `viewport` is the rendering surface; `None`
    /// leaves the backdrop and sprites inert.
    #[must_use]
    pub fn new(config: Config, viewport: Option<Viewport>, now: Duration) -> Self {
        let mut seeder = config.seed.map_or_else(Rng::from_entropy, Rng::new);
        let metrics = RowMetrics {
            row_height: config.row_height,
            block_width: BLOCK_WIDTH as u16,
        };
        let background = BinaryBackground::start(viewport, metrics, Rng::new(seeder.next_u64()));
        let spawner = Spawner::new(viewport.is_some(), Rng::new(seeder.next_u64()), now);
        let exit_at = (config.exit_after_ms > 0)
            .then(|| now + Duration::from_millis(config.exit_after_ms));

        let mut output = OutputView::new();
        content::welcome(&mut output);

        tracing::info!(
            seed = ?config.seed,
            rows = background.row_count(),
            max_blocks = background.max_blocks(),
            "session started"
        );

        Self {
            config,
            started: now,
            now,
            viewport,
            input: InputLine::new(),
            output,
            dispatcher: Dispatcher::new(),
            background,
            spawner,
            row_ticks: Interval::new(ROW_TICK_INTERVAL, now),
            resize: Debouncer::new(RESIZE_QUIET_PERIOD),
            help_open: false,
            rng: Rng::new(seeder.next_u64()),
            today: String::new(),
            exit_at,
            shut_down: false,
        }
    }

    /// Set the date shown by `resume`.
    pub fn set_today(&mut self, today: impl Into<String>) {
        self.today = today.into();
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub fn input(&self) -> &InputLine {
        &self.input
    }

    #[must_use]
    pub fn output(&self) -> &OutputView {
        &self.output
    }

    #[must_use]
    pub fn background(&self) -> &BinaryBackground {
        &self.background
    }

    #[must_use]
    pub fn spawner(&self) -> &Spawner {
        &self.spawner
    }

    #[must_use]
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Viewport after the last applied resize.
    #[must_use]
    pub fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }

    #[must_use]
    pub fn help_open(&self) -> bool {
        self.help_open
    }

    /// Time of the last `advance`.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.now
    }

    #[must_use]
    pub fn uptime(&self) -> Duration {
        self.now.saturating_sub(self.started)
    }

    #[must_use]
    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    /// Whether the configured auto-exit time has passed.
    #[must_use]
    pub fn should_exit(&self, now: Duration) -> bool {
        self.exit_at.is_some_and(|at| now >= at)
    }

    /// Apply a key press at `now`. Returns `true` if anything visible changed.
    pub fn handle_key(&mut self, key: KeyInput, now: Duration) -> bool {
        if self.shut_down {
            return false;
        }
        self.now = self.now.max(now);
        match key {
            KeyInput::Char(' ') => {
                self.input.space();
            }
            KeyInput::Char(ch) => self.input.insert_char(ch),
            KeyInput::Backspace => self.input.backspace(),
            KeyInput::Tab => self.input.tab(),
            KeyInput::Up => self.input.history_prev(),
            KeyInput::Down => self.input.history_next(),
            KeyInput::PageUp => self.output.scroll_up(SCROLL_PAGE),
            KeyInput::PageDown => self.output.scroll_down(SCROLL_PAGE),
            KeyInput::Escape => {
                if !self.help_open {
                    return false;
                }
                self.help_open = false;
            }
            KeyInput::Help => self.help_open = !self.help_open,
            KeyInput::Enter => {
                if let Some(line) = self.input.enter() {
                    self.output.push(OutputLine::styled(
                        format!("{} {line}", self.config.prompt()),
                        LineStyle::CommandEcho,
                    ));
                    self.execute(&line, now);
                }
            }
        }
        true
    }

    /// A command link or help-menu entry was clicked.
    pub fn handle_click_command(&mut self, command: Command, now: Duration) -> Dispatch {
        self.help_open = false;
        self.execute(command.name(), now)
    }

    /// Close the help menu, e.g. on a click outside it.
    pub fn hide_help(&mut self) -> bool {
        std::mem::replace(&mut self.help_open, false)
    }

    /// Scroll the output by `lines`; positive values move towards older
    /// output.
    pub fn scroll(&mut self, lines: isize) -> bool {
        if self.shut_down || lines == 0 {
            return false;
        }
        let before = self.output.scroll_from_bottom();
        if lines > 0 {
            self.output.scroll_up(lines.unsigned_abs());
        } else {
            self.output.scroll_down(lines.unsigned_abs());
        }
        self.output.scroll_from_bottom() != before
    }

    /// Dispatch a command line without echoing it.
    pub fn execute(&mut self, line: &str, now: Duration) -> Dispatch {
        if self.shut_down {
            return Dispatch::Ignored;
        }
        self.now = self.now.max(now);
        let dispatch = self
            .dispatcher
            .execute(line, &mut self.output, &mut self.spawner, now);
        self.forward_notifications();
        dispatch
    }

    /// Record a new surface size. Applied once no further resize arrives
    /// for the quiet period.
    pub fn resize(&mut self, viewport: Viewport, now: Duration) {
        if self.shut_down {
            return;
        }
        self.resize.trigger(viewport, now);
    }

    /// Run everything due at `now`. Returns `true` if anything visible
    /// changed.
    pub fn advance(&mut self, now: Duration) -> bool {
        if self.shut_down {
            return false;
        }
        self.now = self.now.max(now);
        let mut changed = false;

        if let Some(viewport) = self.resize.poll(now) {
            self.apply_resize(viewport);
            changed = true;
        }

        if self.background.is_attached() {
            let ticks = self.row_ticks.poll(now);
            for _ in 0..ticks {
                self.background.tick();
            }
            changed |= ticks > 0;
        }

        let mut ctx = RunContext {
            rng: &mut self.rng,
            uptime: now.saturating_sub(self.started),
            today: &self.today,
        };
        if self.dispatcher.poll(now, &mut self.output, &mut ctx) > 0 {
            changed = true;
        }
        self.forward_notifications();

        changed |= self.spawner.advance(now);
        changed
    }

    /// Earliest time at which [`advance`](Self::advance) has work to do.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        if self.shut_down {
            return None;
        }
        let rows = self
            .background
            .is_attached()
            .then(|| self.row_ticks.next_deadline());
        [
            rows,
            self.resize.deadline(),
            self.dispatcher.next_deadline(),
            self.spawner.next_deadline(),
            self.exit_at,
        ]
        .into_iter()
        .flatten()
        .min()
    }

    /// Cancel every timer and remove every sprite. Later calls are no-ops.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        let cancelled = self.dispatcher.cancel_all(&mut self.output);
        self.spawner.shutdown();
        self.resize.cancel();
        self.shut_down = true;
        tracing::info!(
            cancelled,
            uptime_ms = self.uptime().as_millis() as u64,
            "session shut down"
        );
    }

    fn apply_resize(&mut self, viewport: Viewport) {
        self.viewport = Some(viewport);
        self.background.resize(viewport.width);
        tracing::debug!(
            width = viewport.width,
            height = viewport.height,
            coalesced = self.resize.coalesced(),
            "resize applied"
        );
    }

    fn forward_notifications(&mut self) {
        for executed in self.dispatcher.drain_notifications() {
            self.background.project_command(executed.name);
        }
    }
}
