#![forbid(unsafe_code)]

//! Core: host-agnostic state for the terminal portfolio.
//!
//! Everything here is deterministic given a seed and the sequence of host
//! calls: no clock reads, no I/O. The `termfolio` binary drives a
//! [`Session`] from a crossterm event loop; tests drive it directly.

pub mod background;
pub mod block;
pub mod command;
pub mod config;
pub mod content;
pub mod debounce;
pub mod dispatch;
pub mod input;
pub mod output;
pub mod rng;
pub mod session;
pub mod spawner;
pub mod timer;

pub use background::{BinaryBackground, Row, RowMetrics, Viewport};
pub use block::{BitSource, Block};
pub use command::{Command, SecretCommand};
pub use config::{Config, ConfigError};
pub use dispatch::{CommandExecuted, Dispatch};
pub use output::{LineStyle, OutputLine, OutputView, Span, SpanKind};
pub use session::{KeyInput, Session};
