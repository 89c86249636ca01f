#![forbid(unsafe_code)]

//! Fixed behaviour constants and presentation-level configuration.
//!
//! The constants describe how the backdrop and the command layer behave and
//! are deliberately not configurable. [`Config`] only carries presentation
//! and session settings, layered as defaults, then `TERMFOLIO_*` environment
//! variables, then command-line flags (applied by the binary).

use std::fmt;
use std::time::Duration;

/// Period of the per-row backdrop tick. Every row shares it.
pub const ROW_TICK_INTERVAL: Duration = Duration::from_millis(400);

/// Maximum number of rows one executed command is projected into.
pub const PROJECTION_FAN_OUT: usize = 3;

/// Inclusive range of code points used for random filler characters.
pub const PRINTABLE_RANGE: std::ops::RangeInclusive<u32> = 32..=126;

/// Lifetime of a spawned decorative character.
pub const SPRITE_LIFETIME: Duration = Duration::from_millis(20_000);

/// Quiet period before a burst of resize events is applied.
pub const RESIZE_QUIET_PERIOD: Duration = Duration::from_millis(250);

/// Loading delay for commands without an explicit entry.
pub const DEFAULT_LOADING_DELAY: Duration = Duration::from_millis(1500);

/// Errors raised while reading configuration values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A value could not be parsed for the named setting.
    InvalidValue { key: String, value: String },
    /// A numeric value was outside its accepted range.
    OutOfRange { key: String, value: u64, min: u64 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidValue { key, value } => {
                write!(f, "invalid value for {key}: {value:?}")
            }
            Self::OutOfRange { key, value, min } => {
                write!(f, "{key} must be at least {min} (got {value})")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Session and presentation settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Seed for every random decision. `None` seeds from the clock.
    pub seed: Option<u64>,
    /// Height of one backdrop row in terminal cells.
    pub row_height: u16,
    /// Horizontal inset of the terminal panel from the screen edge.
    pub panel_margin_x: u16,
    /// Vertical inset of the terminal panel from the screen edge.
    pub panel_margin_y: u16,
    /// User name shown in the prompt.
    pub user: String,
    /// Host name shown in the prompt.
    pub host: String,
    /// Capture mouse clicks for command links and the help menu.
    pub mouse: bool,
    /// Quit automatically after this many milliseconds (0 = never).
    pub exit_after_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            seed: None,
            row_height: 1,
            panel_margin_x: 6,
            panel_margin_y: 1,
            user: "user".into(),
            host: "portfolio".into(),
            mouse: true,
            exit_after_ms: 0,
        }
    }
}

impl Config {
    /// Prompt printed before echoed commands.
    #[must_use]
    pub fn prompt(&self) -> String {
        format!("{}@{}:~$", self.user, self.host)
    }

    /// Apply `TERMFOLIO_*` variables from the process environment.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_env_with(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("TERMFOLIO_SEED") {
            self.seed = Some(parse_u64("TERMFOLIO_SEED", &val)?);
        }
        if let Some(val) = lookup("TERMFOLIO_ROW_HEIGHT") {
            self.set_row_height("TERMFOLIO_ROW_HEIGHT", &val)?;
        }
        if let Some(val) = lookup("TERMFOLIO_EXIT_AFTER_MS") {
            self.exit_after_ms = parse_u64("TERMFOLIO_EXIT_AFTER_MS", &val)?;
        }
        if let Some(val) = lookup("TERMFOLIO_NO_MOUSE") {
            self.mouse = !parse_flag("TERMFOLIO_NO_MOUSE", &val)?;
        }
        if let Some(val) = lookup("TERMFOLIO_USER")
            && !val.trim().is_empty()
        {
            self.user = val.trim().to_string();
        }
        if let Some(val) = lookup("TERMFOLIO_HOST")
            && !val.trim().is_empty()
        {
            self.host = val.trim().to_string();
        }
        Ok(())
    }

    /// Parse and validate a row height value.
    pub fn set_row_height(&mut self, key: &str, raw: &str) -> Result<(), ConfigError> {
        let value = parse_u64(key, raw)?;
        if value == 0 {
            return Err(ConfigError::OutOfRange {
                key: key.to_string(),
                value,
                min: 1,
            });
        }
        self.row_height = u16::try_from(value).map_err(|_| ConfigError::InvalidValue {
            key: key.to_string(),
            value: raw.to_string(),
        })?;
        Ok(())
    }
}

/// Parse an unsigned integer setting.
pub fn parse_u64(key: &str, raw: &str) -> Result<u64, ConfigError> {
    raw.trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue {
            key: key.to_string(),
            value: raw.to_string(),
        })
}

fn parse_flag(key: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: raw.to_string(),
        }),
    }
}
