#![forbid(unsafe_code)]

//! Terminal lifecycle guard and event mapping.
//!
//! [`TerminalSession`] enters raw mode, the alternate screen, and (when
//! asked) mouse capture, and undoes all of it in reverse order on drop.
//!
//! # Lifecycle Guarantees
//!
//! 1. Drop restores the terminal on every exit path that unwinds.
//! 2. A panic hook restores it before the panic message prints, so the
//!    message is readable.
//! 3. On Unix, SIGINT and SIGTERM restore it before the process exits.
//!
//! # Cleanup Order
//!
//! 1. Disable mouse capture (if enabled)
//! 2. Show cursor
//! 3. Leave alternate screen
//! 4. Exit raw mode
//! 5. Flush stdout

use std::io::{self, Write};
use std::sync::OnceLock;
use std::time::Duration;

use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
use termfolio_core::KeyInput;

#[cfg(unix)]
use signal_hook::consts::signal::{SIGINT, SIGTERM};
#[cfg(unix)]
use signal_hook::iterator::Signals;

/// Lines scrolled per mouse wheel notch.
pub const WHEEL_LINES: usize = 3;

/// Host events after mapping, in the session's vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Key(KeyInput),
    /// Left click at a cell.
    Click { x: u16, y: u16 },
    ScrollUp,
    ScrollDown,
    Resize { width: u16, height: u16 },
    Quit,
}

#[derive(Debug)]
pub struct TerminalSession {
    mouse_enabled: bool,
    alternate_screen_enabled: bool,
    #[cfg(unix)]
    signal_guard: Option<SignalGuard>,
}

impl TerminalSession {
    /// Enter raw mode and the alternate screen; capture the mouse if `mouse`.
    ///
    /// # Errors
    ///
    /// Returns an error if raw mode or any mode switch fails. Modes already
    /// enabled are rolled back by drop.
    pub fn new(mouse: bool) -> io::Result<Self> {
        install_panic_hook();

        crossterm::terminal::enable_raw_mode()?;
        tracing::info!("terminal raw mode enabled");

        let mut session = Self {
            mouse_enabled: false,
            alternate_screen_enabled: false,
            #[cfg(unix)]
            signal_guard: None,
        };

        let mut stdout = io::stdout();
        crossterm::execute!(stdout, crossterm::terminal::EnterAlternateScreen)?;
        session.alternate_screen_enabled = true;
        crossterm::execute!(stdout, crossterm::cursor::Hide)?;

        if mouse {
            crossterm::execute!(stdout, crossterm::event::EnableMouseCapture)?;
            session.mouse_enabled = true;
            tracing::info!("mouse capture enabled");
        }

        #[cfg(unix)]
        {
            session.signal_guard = Some(SignalGuard::new()?);
        }

        Ok(session)
    }

    /// Current terminal size (columns, rows).
    pub fn size(&self) -> io::Result<(u16, u16)> {
        crossterm::terminal::size()
    }

    /// Wait up to `timeout` for an event. `Ok(None)` on timeout or for
    /// events the session has no use for.
    pub fn next_event(&self, timeout: Duration) -> io::Result<Option<InputEvent>> {
        if !crossterm::event::poll(timeout)? {
            return Ok(None);
        }
        Ok(map_event(crossterm::event::read()?))
    }

    fn cleanup(&mut self) {
        #[cfg(unix)]
        let _ = self.signal_guard.take();

        let mut stdout = io::stdout();
        if self.mouse_enabled {
            let _ = crossterm::execute!(stdout, crossterm::event::DisableMouseCapture);
            self.mouse_enabled = false;
            tracing::info!("mouse capture disabled");
        }
        let _ = crossterm::execute!(
            stdout,
            crossterm::style::ResetColor,
            crossterm::cursor::Show
        );
        if self.alternate_screen_enabled {
            let _ = crossterm::execute!(stdout, crossterm::terminal::LeaveAlternateScreen);
            self.alternate_screen_enabled = false;
        }
        let _ = crossterm::terminal::disable_raw_mode();
        tracing::info!("terminal restored");
        let _ = stdout.flush();
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        self.cleanup();
    }
}

fn install_panic_hook() {
    static HOOK: OnceLock<()> = OnceLock::new();
    HOOK.get_or_init(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            best_effort_cleanup();
            previous(info);
        }));
    });
}

fn best_effort_cleanup() {
    let mut stdout = io::stdout();
    let _ = crossterm::execute!(stdout, crossterm::event::DisableMouseCapture);
    let _ = crossterm::execute!(stdout, crossterm::style::ResetColor, crossterm::cursor::Show);
    let _ = crossterm::execute!(stdout, crossterm::terminal::LeaveAlternateScreen);
    let _ = crossterm::terminal::disable_raw_mode();
    let _ = stdout.flush();
}

#[cfg(unix)]
#[derive(Debug)]
struct SignalGuard {
    handle: signal_hook::iterator::Handle,
    thread: Option<std::thread::JoinHandle<()>>,
}

#[cfg(unix)]
impl SignalGuard {
    fn new() -> io::Result<Self> {
        let mut signals = Signals::new([SIGINT, SIGTERM]).map_err(io::Error::other)?;
        let handle = signals.handle();
        let thread = std::thread::spawn(move || {
            for signal in signals.forever() {
                if matches!(signal, SIGINT | SIGTERM) {
                    tracing::warn!(signal, "termination signal received, restoring terminal");
                    best_effort_cleanup();
                    std::process::exit(128 + signal);
                }
            }
        });
        Ok(Self {
            handle,
            thread: Some(thread),
        })
    }
}

#[cfg(unix)]
impl Drop for SignalGuard {
    fn drop(&mut self) {
        self.handle.close();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

/// Map a crossterm event onto the session's vocabulary.
#[must_use]
pub fn map_event(event: Event) -> Option<InputEvent> {
    match event {
        Event::Key(key) => map_key_event(key),
        Event::Mouse(mouse) => map_mouse_event(mouse),
        Event::Resize(width, height) => Some(InputEvent::Resize { width, height }),
        _ => None,
    }
}

fn map_key_event(event: KeyEvent) -> Option<InputEvent> {
    if event.kind == KeyEventKind::Release {
        return None;
    }
    let ctrl = event.modifiers.contains(KeyModifiers::CONTROL);
    let key = match event.code {
        KeyCode::Char('c' | 'd') if ctrl => return Some(InputEvent::Quit),
        KeyCode::Char(_) if ctrl || event.modifiers.contains(KeyModifiers::ALT) => return None,
        KeyCode::Char(ch) => KeyInput::Char(ch),
        KeyCode::Backspace => KeyInput::Backspace,
        KeyCode::Enter => KeyInput::Enter,
        KeyCode::Tab => KeyInput::Tab,
        KeyCode::Up => KeyInput::Up,
        KeyCode::Down => KeyInput::Down,
        KeyCode::PageUp => KeyInput::PageUp,
        KeyCode::PageDown => KeyInput::PageDown,
        KeyCode::Esc => KeyInput::Escape,
        KeyCode::F(1) => KeyInput::Help,
        _ => return None,
    };
    Some(InputEvent::Key(key))
}

fn map_mouse_event(event: MouseEvent) -> Option<InputEvent> {
    match event.kind {
        MouseEventKind::Down(MouseButton::Left) => Some(InputEvent::Click {
            x: event.column,
            y: event.row,
        }),
        MouseEventKind::ScrollUp => Some(InputEvent::ScrollUp),
        MouseEventKind::ScrollDown => Some(InputEvent::ScrollDown),
        _ => None,
    }
}
