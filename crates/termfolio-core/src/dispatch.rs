#![forbid(unsafe_code)]

//! Command dispatcher.
//!
//! Parses a submitted line, resolves it against both registries and runs
//! it. Ordinary commands go through a simulated loading phase and complete
//! on a later [`Dispatcher::poll`]; secret commands run immediately.
//!
//! # Notification contract
//!
//! Each resolved command produces exactly one [`CommandExecuted`], carrying
//! the literal lowercase command token (never its arguments). Unknown and
//! empty input produce none. Notifications are queued until the owner
//! drains them.

use std::time::Duration;

use crate::command::{Command, Resolved, SecretCommand, resolve};
use crate::content::{self, ContentContext};
use crate::output::{LineStyle, LoadingId, OutputLine, OutputView};
use crate::rng::Rng;
use crate::timer::Timers;

/// Section reported by `pwd` before any section command has run.
pub const HOME_SECTION: &str = "home";

/// A submitted line split into command token and arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    pub name: String,
    pub args: Vec<String>,
}

/// Lowercase, trim, split on spaces. `None` for blank input.
#[must_use]
pub fn parse(line: &str) -> Option<ParsedCommand> {
    let lowered = line.trim().to_lowercase();
    let mut parts = lowered.split(' ').filter(|part| !part.is_empty());
    let name = parts.next()?.to_string();
    let args = parts.map(str::to_string).collect();
    Some(ParsedCommand { name, args })
}

/// Emitted once per resolved command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandExecuted {
    pub name: &'static str,
}

/// What a call to [`Dispatcher::execute`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// Blank input.
    Ignored,
    /// Ordinary command waiting out its loading delay.
    Scheduled {
        command: Command,
        loading: LoadingId,
        deadline: Duration,
    },
    Secret(SecretCommand),
    Unknown(String),
}

/// Runs secret commands. Implemented by the character spawner.
pub trait SecretHandler {
    fn run_secret(&mut self, command: SecretCommand, view: &mut OutputView, now: Duration);
}

/// Dynamic inputs for completing ordinary commands.
#[derive(Debug)]
pub struct RunContext<'a> {
    pub rng: &'a mut Rng,
    pub uptime: Duration,
    pub today: &'a str,
}

#[derive(Debug, Clone)]
struct PendingRun {
    command: Command,
    loading: LoadingId,
}

#[derive(Debug, Default)]
pub struct Dispatcher {
    pending: Timers<PendingRun>,
    next_loading: u64,
    section: Option<Command>,
    notifications: Vec<CommandExecuted>,
}

impl Dispatcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Section shown by `pwd`.
    #[must_use]
    pub fn section(&self) -> &'static str {
        self.section.map_or(HOME_SECTION, Command::name)
    }

    /// Earliest pending completion.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.pending.next_deadline()
    }

    /// Ordinary commands still loading.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Parse and run `line` at `now`.
    pub fn execute<S: SecretHandler + ?Sized>(
        &mut self,
        line: &str,
        view: &mut OutputView,
        secrets: &mut S,
        now: Duration,
    ) -> Dispatch {
        let Some(parsed) = parse(line) else {
            return Dispatch::Ignored;
        };
        match resolve(&parsed.name) {
            Some(Resolved::Ordinary(command)) => {
                let loading = LoadingId(self.next_loading);
                self.next_loading += 1;
                view.push(OutputLine {
                    loading: Some(loading),
                    ..OutputLine::styled(
                        format!("> Executing {}", command.name()),
                        LineStyle::Loading,
                    )
                });
                view.scroll_to_bottom();
                let deadline = now + command.loading_delay();
                self.pending.schedule(deadline, PendingRun { command, loading });
                tracing::debug!(
                    command = command.name(),
                    args = parsed.args.len(),
                    delay_ms = command.loading_delay().as_millis() as u64,
                    "command scheduled"
                );
                Dispatch::Scheduled {
                    command,
                    loading,
                    deadline,
                }
            }
            Some(Resolved::Secret(command)) => {
                secrets.run_secret(command, view, now);
                view.scroll_to_bottom();
                self.notify(command.name());
                Dispatch::Secret(command)
            }
            None => {
                view.push(OutputLine::styled(
                    format!("Command not found: {}", parsed.name),
                    LineStyle::Error,
                ));
                view.push(OutputLine::styled(
                    "Type 'help' to see available commands",
                    LineStyle::Warning,
                ));
                view.scroll_to_bottom();
                tracing::debug!(command = %parsed.name, "unknown command");
                Dispatch::Unknown(parsed.name)
            }
        }
    }

    /// Complete every ordinary command whose delay has elapsed at `now`.
    /// Returns how many completed.
    pub fn poll(&mut self, now: Duration, view: &mut OutputView, ctx: &mut RunContext<'_>) -> usize {
        let mut completed = 0;
        while let Some((_, run)) = self.pending.pop_due(now) {
            view.remove_loading(run.loading);
            if run.command.auto_clears() {
                view.clear();
                self.section = Some(run.command);
            }
            let mut content_ctx = ContentContext {
                rng: &mut *ctx.rng,
                uptime: ctx.uptime,
                today: ctx.today,
                section: self.section(),
            };
            content::run(run.command, view, &mut content_ctx);
            view.scroll_to_bottom();
            self.notify(run.command.name());
            completed += 1;
        }
        completed
    }

    /// Take queued notifications in emission order.
    pub fn drain_notifications(&mut self) -> Vec<CommandExecuted> {
        std::mem::take(&mut self.notifications)
    }

    /// Drop every pending completion along with its loading line.
    pub fn cancel_all(&mut self, view: &mut OutputView) -> usize {
        let mut cancelled = 0;
        while let Some((_, run)) = self.pending.pop_due(Duration::MAX) {
            view.remove_loading(run.loading);
            cancelled += 1;
        }
        cancelled
    }

    fn notify(&mut self, name: &'static str) {
        tracing::trace!(command = name, "command executed");
        self.notifications.push(CommandExecuted { name });
    }
}
