#![forbid(unsafe_code)]

//! Command-line argument parsing.
//!
//! Args are parsed by hand. `TERMFOLIO_*` environment variables are applied
//! first and explicit flags override them.

use std::env;
use std::path::PathBuf;
use std::process;

use termfolio_core::Config;
use termfolio_core::config::parse_u64;

use crate::error::{Error, Result};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const HELP_TEXT: &str = "\
termfolio: a terminal-style portfolio over a streaming binary backdrop

USAGE:
    termfolio [OPTIONS]

OPTIONS:
    --seed=N             Seed every random decision (default: from clock)
    --row-height=N       Terminal rows per backdrop row (default: 1)
    --exit-after-ms=N    Quit automatically after N milliseconds
    --no-mouse           Disable mouse capture (no clickable links)
    --log-file=PATH      Write logs to PATH (default: no logging)
    --log-json           Write logs as JSON lines
    --help, -h           Show this help message
    --version, -V        Show version

KEYS:
    Enter           Run the command (accepts a suggestion first)
    Tab             Autocomplete; repeat to cycle matches
    Space           Accept the suggestion without running it
    Up / Down       Command history
    PgUp / PgDn     Scroll output
    F1              Toggle the help menu
    Esc             Close the help menu
    Ctrl+C          Quit

ENVIRONMENT VARIABLES:
    TERMFOLIO_SEED           Override --seed
    TERMFOLIO_ROW_HEIGHT     Override --row-height
    TERMFOLIO_EXIT_AFTER_MS  Override --exit-after-ms
    TERMFOLIO_NO_MOUSE       Disable mouse capture (1/true/yes)
    TERMFOLIO_USER           User name in the prompt
    TERMFOLIO_HOST           Host name in the prompt
    TERMFOLIO_LOG            Log filter directives (default: warn)";

/// Parsed command-line options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Opts {
    pub config: Config,
    /// Log destination. Nothing is logged without one, since the screen is
    /// owned by the UI.
    pub log_file: Option<PathBuf>,
    pub log_json: bool,
}

/// What the command line asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    Run(Opts),
    Help,
    Version,
}

impl Opts {
    /// Parse the process arguments and environment, exiting on `--help`,
    /// `--version`, or invalid input.
    pub fn parse() -> Self {
        let args = env::args().skip(1);
        match parse_from(args, |key| env::var(key).ok()) {
            Ok(Invocation::Run(opts)) => opts,
            Ok(Invocation::Help) => {
                println!("{HELP_TEXT}");
                process::exit(0);
            }
            Ok(Invocation::Version) => {
                println!("termfolio {VERSION}");
                process::exit(0);
            }
            Err(err) => {
                eprintln!("{err}");
                eprintln!("Run with --help for usage information.");
                process::exit(1);
            }
        }
    }
}

/// Parse `args` (program name excluded) with `lookup` for environment
/// variables.
pub fn parse_from<I, F>(args: I, lookup: F) -> Result<Invocation>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
    F: Fn(&str) -> Option<String>,
{
    let mut opts = Opts::default();
    opts.config.apply_env_with(&lookup)?;

    for arg in args {
        let arg = arg.as_ref();
        match arg {
            "--help" | "-h" => return Ok(Invocation::Help),
            "--version" | "-V" => return Ok(Invocation::Version),
            "--no-mouse" => opts.config.mouse = false,
            "--log-json" => opts.log_json = true,
            other => {
                if let Some(val) = other.strip_prefix("--seed=") {
                    opts.config.seed = Some(parse_u64("--seed", val)?);
                } else if let Some(val) = other.strip_prefix("--row-height=") {
                    opts.config.set_row_height("--row-height", val)?;
                } else if let Some(val) = other.strip_prefix("--exit-after-ms=") {
                    opts.config.exit_after_ms = parse_u64("--exit-after-ms", val)?;
                } else if let Some(val) = other.strip_prefix("--log-file=") {
                    opts.log_file = Some(PathBuf::from(val));
                } else {
                    return Err(Error::UnknownArgument(other.to_string()));
                }
            }
        }
    }

    Ok(Invocation::Run(opts))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use pretty_assertions::assert_eq;

    use termfolio_core::ConfigError;

    fn parse(args: &[&str], env: &[(&str, &str)]) -> Result<Invocation> {
        let env: HashMap<String, String> = env
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        parse_from(args.iter().copied(), move |key| env.get(key).cloned())
    }

    fn run(args: &[&str], env: &[(&str, &str)]) -> Opts {
        match parse(args, env) {
            Ok(Invocation::Run(opts)) => opts,
            other => panic!("expected options, got {other:?}"),
        }
    }

    #[test]
    fn defaults() {
        let opts = run(&[], &[]);
        assert_eq!(opts.config, Config::default());
        assert!(opts.log_file.is_none());
        assert!(!opts.log_json);
    }

    #[test]
    fn flags_are_applied() {
        let opts = run(
            &[
                "--seed=42",
                "--row-height=2",
                "--exit-after-ms=1000",
                "--no-mouse",
                "--log-file=/tmp/termfolio.log",
                "--log-json",
            ],
            &[],
        );
        assert_eq!(opts.config.seed, Some(42));
        assert_eq!(opts.config.row_height, 2);
        assert_eq!(opts.config.exit_after_ms, 1000);
        assert!(!opts.config.mouse);
        assert_eq!(opts.log_file, Some(PathBuf::from("/tmp/termfolio.log")));
        assert!(opts.log_json);
    }

    #[test]
    fn flags_override_environment() {
        let opts = run(&["--seed=7"], &[("TERMFOLIO_SEED", "3"), ("TERMFOLIO_USER", "ada")]);
        assert_eq!(opts.config.seed, Some(7));
        assert_eq!(opts.config.prompt(), "ada@portfolio:~$");
    }

    #[test]
    fn help_and_version_short_circuit() {
        assert_eq!(parse(&["--seed=1", "-h"], &[]).ok(), Some(Invocation::Help));
        assert_eq!(parse(&["--version"], &[]).ok(), Some(Invocation::Version));
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(matches!(
            parse(&["--row-height=0"], &[]),
            Err(Error::Config(ConfigError::OutOfRange { .. }))
        ));
        assert!(matches!(
            parse(&["--seed=abc"], &[]),
            Err(Error::Config(ConfigError::InvalidValue { .. }))
        ));
        assert!(matches!(
            parse(&["--frobnicate"], &[]),
            Err(Error::UnknownArgument(arg)) if arg == "--frobnicate"
        ));
    }

    #[test]
    fn help_text_documents_every_flag() {
        for flag in [
            "--seed",
            "--row-height",
            "--exit-after-ms",
            "--no-mouse",
            "--log-file",
            "--log-json",
        ] {
            assert!(HELP_TEXT.contains(flag), "{flag} missing from help");
        }
        assert!(!VERSION.is_empty());
    }
}
