#![forbid(unsafe_code)]

//! Command registry.
//!
//! Two closed sets of commands: the ordinary ones listed in `help` and
//! offered by autocomplete, and a secret set that is only reachable by
//! typing its exact name. Lookup is by lowercase token.

use std::time::Duration;

/// Documented commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Help,
    About,
    Projects,
    Experience,
    Contact,
    Resume,
    Clear,
    Ls,
    Whoami,
    Pwd,
    Matrix,
    Hack,
    Coffee,
    Uptime,
}

impl Command {
    /// Registry order. Autocomplete and the help menu follow it.
    pub const ALL: [Command; 14] = [
        Self::Help,
        Self::About,
        Self::Projects,
        Self::Experience,
        Self::Contact,
        Self::Resume,
        Self::Clear,
        Self::Ls,
        Self::Whoami,
        Self::Pwd,
        Self::Matrix,
        Self::Hack,
        Self::Coffee,
        Self::Uptime,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Help => "help",
            Self::About => "about",
            Self::Projects => "projects",
            Self::Experience => "experience",
            Self::Contact => "contact",
            Self::Resume => "resume",
            Self::Clear => "clear",
            Self::Ls => "ls",
            Self::Whoami => "whoami",
            Self::Pwd => "pwd",
            Self::Matrix => "matrix",
            Self::Hack => "hack",
            Self::Coffee => "coffee",
            Self::Uptime => "uptime",
        }
    }

    /// One-line description for the help listing.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Help => "Show this help message",
            Self::About => "Learn about me",
            Self::Projects => "View my projects",
            Self::Experience => "See my work history",
            Self::Contact => "Get my contact information",
            Self::Resume => "Download my resume",
            Self::Clear => "Clear the terminal",
            Self::Ls => "List available sections",
            Self::Whoami => "Quick introduction",
            Self::Pwd => "Show current section",
            Self::Matrix => "Enter the matrix",
            Self::Hack => "Initiate hack sequence",
            Self::Coffee => "Brew some coffee",
            Self::Uptime => "System information",
        }
    }

    /// Simulated work before the handler runs.
    #[must_use]
    pub const fn loading_delay(self) -> Duration {
        let ms = match self {
            Self::Help | Self::Clear | Self::Ls | Self::Whoami | Self::Pwd => 1500,
            Self::About => 1800,
            Self::Projects => 2000,
            Self::Experience => 1900,
            Self::Contact => 1600,
            Self::Resume => 2200,
            Self::Matrix => 3000,
            Self::Hack => 2800,
            Self::Coffee => 2500,
            Self::Uptime => 1700,
        };
        Duration::from_millis(ms)
    }

    /// Section commands wipe the output view before printing.
    #[must_use]
    pub const fn auto_clears(self) -> bool {
        matches!(
            self,
            Self::About | Self::Projects | Self::Experience | Self::Contact | Self::Resume
        )
    }

    /// Listed under "Fun commands" rather than the main list.
    #[must_use]
    pub const fn is_fun(self) -> bool {
        matches!(self, Self::Matrix | Self::Hack | Self::Coffee | Self::Uptime)
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|cmd| cmd.name() == name)
    }
}

/// Undocumented commands. They run without a loading delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SecretCommand {
    Pacman,
    Rabbit,
    Ghost,
    Cookies,
    TableFlip,
    Dance,
    Chase,
    Runner,
    Spawn,
}

impl SecretCommand {
    pub const ALL: [SecretCommand; 9] = [
        Self::Pacman,
        Self::Rabbit,
        Self::Ghost,
        Self::Cookies,
        Self::TableFlip,
        Self::Dance,
        Self::Chase,
        Self::Runner,
        Self::Spawn,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Pacman => "pacman",
            Self::Rabbit => "rabbit",
            Self::Ghost => "ghost",
            Self::Cookies => "cookies",
            Self::TableFlip => "tableflip",
            Self::Dance => "dance",
            Self::Chase => "chase",
            Self::Runner => "runner",
            Self::Spawn => "spawn",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|cmd| cmd.name() == name)
    }
}

/// Result of looking a token up in both registries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolved {
    Ordinary(Command),
    Secret(SecretCommand),
}

impl Resolved {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Ordinary(cmd) => cmd.name(),
            Self::Secret(cmd) => cmd.name(),
        }
    }
}

/// Look a lowercase token up, ordinary commands first.
#[must_use]
pub fn resolve(token: &str) -> Option<Resolved> {
    Command::from_name(token)
        .map(Resolved::Ordinary)
        .or_else(|| SecretCommand::from_name(token).map(Resolved::Secret))
}

/// Ordinary commands starting with `prefix`, in registry order.
#[must_use]
pub fn completions(prefix: &str) -> Vec<Command> {
    Command::ALL
        .into_iter()
        .filter(|cmd| cmd.name().starts_with(prefix))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for cmd in Command::ALL {
            assert_eq!(Command::from_name(cmd.name()), Some(cmd));
        }
        for cmd in SecretCommand::ALL {
            assert_eq!(SecretCommand::from_name(cmd.name()), Some(cmd));
        }
    }

    #[test]
    fn registries_do_not_overlap() {
        for cmd in SecretCommand::ALL {
            assert_eq!(Command::from_name(cmd.name()), None, "{}", cmd.name());
        }
    }

    #[test]
    fn resolve_checks_both_registries() {
        assert_eq!(resolve("ls"), Some(Resolved::Ordinary(Command::Ls)));
        assert_eq!(
            resolve("tableflip"),
            Some(Resolved::Secret(SecretCommand::TableFlip))
        );
        assert_eq!(resolve("sudo"), None);
        assert_eq!(resolve("LS"), None, "lookup expects a lowercase token");
    }

    #[test]
    fn completions_exclude_secret_commands() {
        let names: Vec<&str> = completions("c").into_iter().map(Command::name).collect();
        assert_eq!(names, vec!["contact", "clear", "coffee"]);
        assert!(completions("pac").is_empty());
    }

    #[test]
    fn empty_prefix_lists_everything() {
        assert_eq!(completions("").len(), Command::ALL.len());
    }

    #[test]
    fn loading_delays() {
        assert_eq!(Command::Help.loading_delay(), Duration::from_millis(1500));
        assert_eq!(Command::Resume.loading_delay(), Duration::from_millis(2200));
        assert_eq!(Command::Matrix.loading_delay(), Duration::from_millis(3000));
    }

    #[test]
    fn only_sections_auto_clear() {
        let clearing: Vec<&str> = Command::ALL
            .into_iter()
            .filter(|c| c.auto_clears())
            .map(Command::name)
            .collect();
        assert_eq!(
            clearing,
            vec!["about", "projects", "experience", "contact", "resume"]
        );
    }
}
