#![forbid(unsafe_code)]

//! Pre-authored content for every ordinary command.
//!
//! Handlers only append to an [`OutputView`]; the few dynamic bits (date,
//! uptime, random gauges, the matrix block) come from [`ContentContext`].

use std::time::Duration;

use crate::command::Command;
use crate::output::{LineStyle, OutputLine, OutputView, Span};
use crate::rng::Rng;

/// Dynamic inputs available to handlers.
#[derive(Debug)]
pub struct ContentContext<'a> {
    pub rng: &'a mut Rng,
    /// Time since the session started.
    pub uptime: Duration,
    /// Pre-formatted current date.
    pub today: &'a str,
    /// Section last navigated to, shown by `pwd`.
    pub section: &'a str,
}

/// Run an ordinary command's handler.
pub fn run(command: Command, view: &mut OutputView, ctx: &mut ContentContext<'_>) {
    match command {
        Command::Help => help(view),
        Command::About => about(view),
        Command::Projects => projects(view),
        Command::Experience => experience(view),
        Command::Contact => contact(view),
        Command::Resume => resume(view, ctx.today),
        Command::Clear => {
            view.clear();
            view.push(OutputLine::styled("Terminal cleared", LineStyle::Success));
        }
        Command::Ls => list_sections(view),
        Command::Whoami => whoami(view),
        Command::Pwd => view.push(OutputLine::new(format!(
            "/home/user/portfolio/{}",
            ctx.section
        ))),
        Command::Matrix => matrix(view, ctx.rng),
        Command::Hack => hack(view),
        Command::Coffee => coffee(view),
        Command::Uptime => uptime(view, ctx),
    }
}

/// Banner printed when a session starts.
pub fn welcome(view: &mut OutputView) {
    view.extend([
        OutputLine::styled("Welcome to my terminal portfolio.", LineStyle::SectionHeader),
        OutputLine::blank(),
        OutputLine::from_spans(vec![
            Span::text("Type "),
            Span::link(Command::Help),
            Span::text(" to see available commands, or press F1 for the menu."),
        ]),
        OutputLine::blank(),
    ]);
}

fn header(title: &str) -> OutputLine {
    OutputLine::styled(title, LineStyle::SectionHeader)
}

fn link_line(command: Command, description: &str) -> OutputLine {
    OutputLine::from_spans(vec![
        Span::link(command),
        Span::text(format!(" - {description}")),
    ])
}

fn help(view: &mut OutputView) {
    view.push(header("Available commands:"));
    view.push(OutputLine::blank());
    for cmd in Command::ALL.into_iter().filter(|c| !c.is_fun()) {
        view.push(link_line(cmd, cmd.description()));
    }
    view.push(OutputLine::blank());
    view.push(header("Fun commands:"));
    for cmd in Command::ALL.into_iter().filter(|c| c.is_fun()) {
        view.push(link_line(cmd, cmd.description()));
    }
    view.extend([
        OutputLine::blank(),
        OutputLine::styled("Navigation tips:", LineStyle::Success),
        OutputLine::new("• Use Tab for auto-complete"),
        OutputLine::new("• Use Up/Down arrows for command history"),
        OutputLine::new("• Press F1 or click [?] for a visual menu"),
        OutputLine::from_spans(vec![
            Span::text("• "),
            Span::highlight("Click any command above to execute it!"),
        ]),
    ]);
}

fn about(view: &mut OutputView) {
    view.extend([
        header("About Me"),
        OutputLine::blank(),
        OutputLine::new("> Loading personal profile..."),
        OutputLine::blank(),
        OutputLine::new("Name: [Your Name Here]"),
        OutputLine::new("Role: Systems Developer / Security Enthusiast"),
        OutputLine::new("Location: [Your Location]"),
        OutputLine::blank(),
        OutputLine::new("Bio:"),
        OutputLine::new("Developer who likes small tools, careful code, and"),
        OutputLine::new("interfaces that live in a terminal. Most of my work sits"),
        OutputLine::new("close to the system: CLIs, services, and the glue between them."),
        OutputLine::blank(),
        OutputLine::new("Interests: Security research, Rust, open source,"),
        OutputLine::new("Linux internals, networking, coffee ☕"),
        OutputLine::blank(),
        OutputLine::from_spans(vec![
            Span::text("Email: "),
            Span::url("your.email@domain.com", "mailto:your.email@domain.com"),
        ]),
        OutputLine::from_spans(vec![
            Span::text("GitHub: "),
            Span::url("github.com/yourusername", "https://github.com/yourusername"),
        ]),
    ]);
}

fn projects(view: &mut OutputView) {
    view.extend([
        header("Projects Directory"),
        OutputLine::blank(),
        OutputLine::new("drwxr-xr-x  project1/     Web Application Security Scanner"),
        OutputLine::new("drwxr-xr-x  project2/     Terminal Task Manager"),
        OutputLine::new("drwxr-xr-x  project3/     Encrypted Chat Service"),
        OutputLine::new("drwxr-xr-x  project4/     Network Monitoring Dashboard"),
        OutputLine::blank(),
        OutputLine::styled("Featured Projects:", LineStyle::Success),
        OutputLine::blank(),
        OutputLine::new("1. Security Scanner"),
        OutputLine::new("   └─ Crawls a web app and flags injectable inputs"),
        OutputLine::new("   └─ Detects SQL injection and reflected XSS"),
        OutputLine::from_spans(vec![
            Span::text("   └─ Source: "),
            Span::url(
                "github.com/yourusername/security-scanner",
                "https://github.com/yourusername/security-scanner",
            ),
        ]),
        OutputLine::blank(),
        OutputLine::new("2. Terminal Portfolio (this program)"),
        OutputLine::new("   └─ A portfolio you browse with shell commands"),
        OutputLine::new("   └─ Command history, autocomplete, binary backdrop"),
        OutputLine::from_spans(vec![
            Span::text("   └─ Try: "),
            Span::link(Command::Matrix),
            Span::text(", "),
            Span::link(Command::Hack),
            Span::text(", "),
            Span::link(Command::Coffee),
        ]),
        OutputLine::blank(),
        OutputLine::from_spans(vec![Span::highlight("Click a command link to run it.")]),
        OutputLine::from_spans(vec![
            Span::text("Type "),
            Span::link(Command::Ls),
            Span::text(" to see all sections"),
        ]),
    ]);
}

fn experience(view: &mut OutputView) {
    view.extend([
        header("Work Experience"),
        OutputLine::blank(),
        OutputLine::new("> tail /var/log/career.log"),
        OutputLine::blank(),
        OutputLine::new("[2023-Present] Senior Developer @ Tech Company"),
        OutputLine::new("├─ Led a security-focused platform team"),
        OutputLine::new("├─ Introduced threat modelling into design reviews"),
        OutputLine::new("└─ Stack: Rust, Go, PostgreSQL, AWS"),
        OutputLine::blank(),
        OutputLine::new("[2021-2023] Full Stack Developer @ Previous Company"),
        OutputLine::new("├─ Built and operated customer-facing web services"),
        OutputLine::new("├─ Ran internal audits and penetration tests"),
        OutputLine::new("└─ Stack: Python, Django, Docker, Linux"),
        OutputLine::blank(),
        OutputLine::new("[2020-2021] Junior Developer @ First Company"),
        OutputLine::new("├─ Frontend work and accessibility fixes"),
        OutputLine::new("└─ Stack: JavaScript, HTML/CSS, Git"),
        OutputLine::blank(),
        OutputLine::styled("Skills:", LineStyle::Success),
        OutputLine::new("Languages: Rust, Python, Go, TypeScript, C"),
        OutputLine::new("Security: OWASP, Nmap, Burp Suite, fuzzing"),
        OutputLine::new("Systems: Linux, Docker, Kubernetes, Nginx"),
        OutputLine::new("Data: PostgreSQL, Redis, SQLite"),
    ]);
}

fn contact(view: &mut OutputView) {
    view.extend([
        header("Contact Information"),
        OutputLine::blank(),
        OutputLine::new("> Opening secure channels..."),
        OutputLine::blank(),
        OutputLine::from_spans(vec![
            Span::text("Email:    "),
            Span::url("your.email@domain.com", "mailto:your.email@domain.com"),
        ]),
        OutputLine::from_spans(vec![
            Span::text("LinkedIn: "),
            Span::url(
                "linkedin.com/in/yourprofile",
                "https://linkedin.com/in/yourprofile",
            ),
        ]),
        OutputLine::from_spans(vec![
            Span::text("GitHub:   "),
            Span::url("github.com/yourusername", "https://github.com/yourusername"),
        ]),
        OutputLine::new("Signal:   available on request"),
        OutputLine::new("GPG:      [Fingerprint]"),
        OutputLine::blank(),
        OutputLine::new("Response time: usually within 24 hours"),
        OutputLine::new("Preferred: email for professional inquiries"),
        OutputLine::blank(),
        OutputLine::new("Location: [Your City, Country]"),
        OutputLine::new("Timezone: [Your Timezone]"),
    ]);
}

fn resume(view: &mut OutputView, today: &str) {
    view.extend([
        header("Resume Access"),
        OutputLine::blank(),
        OutputLine::new("> Generating PDF export..."),
        OutputLine::new("> Redacting private data..."),
        OutputLine::new("> Ready for download"),
        OutputLine::blank(),
        OutputLine::new(format!("Resume.pdf [1.2MB] - Last updated: {today}")),
        OutputLine::blank(),
        OutputLine::from_spans(vec![
            Span::text("Download: "),
            Span::url("resume.pdf", "https://example.com/resume.pdf"),
        ]),
        OutputLine::blank(),
        OutputLine::new("Other formats:"),
        OutputLine::new("├─ PDF (recommended)"),
        OutputLine::new("├─ Plain text"),
        OutputLine::new("└─ JSON (machine readable)"),
    ]);
}

fn list_sections(view: &mut OutputView) {
    const SECTIONS: [(Command, &str); 6] = [
        (Command::About, "Personal information"),
        (Command::Projects, "Portfolio showcase"),
        (Command::Experience, "Work history"),
        (Command::Contact, "Communication channels"),
        (Command::Resume, "CV and credentials"),
        (Command::Help, "Command reference"),
    ];
    view.push(header("Available Sections"));
    view.push(OutputLine::blank());
    view.push(OutputLine::new(format!("total {} sections", SECTIONS.len())));
    for (cmd, blurb) in SECTIONS {
        let pad = 13usize.saturating_sub(cmd.name().len());
        view.push(OutputLine::from_spans(vec![
            Span::text("drwxr-xr-x "),
            Span::link(cmd),
            Span::text(format!("{}{blurb}", " ".repeat(pad))),
        ]));
    }
    view.push(OutputLine::blank());
    view.push(OutputLine::from_spans(vec![Span::highlight(
        "Click any section name to open it",
    )]));
}

fn whoami(view: &mut OutputView) {
    view.extend([
        OutputLine::new("user"),
        OutputLine::blank(),
        OutputLine::new("Current user: Portfolio Visitor"),
        OutputLine::new("Access level: Guest"),
        OutputLine::new("Session: Active"),
        OutputLine::new("Shell: /bin/portfolio"),
    ]);
}

/// Rows and columns of the `matrix` bit block.
pub const MATRIX_ROWS: usize = 5;
pub const MATRIX_COLS: usize = 50;

fn matrix(view: &mut OutputView, rng: &mut Rng) {
    view.push(OutputLine::styled("Entering the Matrix...", LineStyle::Success));
    view.push(OutputLine::blank());
    for _ in 0..MATRIX_ROWS {
        let line: String = (0..MATRIX_COLS)
            .map(|_| if rng.chance(0.3) { '1' } else { '0' })
            .collect();
        view.push(OutputLine::styled(line, LineStyle::AsciiArt));
    }
    view.push(OutputLine::styled("Welcome to the real world.", LineStyle::Success));
}

fn hack(view: &mut OutputView) {
    view.extend([
        OutputLine::styled("> Initializing hack sequence...", LineStyle::Warning),
        OutputLine::new("> Scanning for vulnerabilities..."),
        OutputLine::new("> Buffer overflow detected at 0x7fff5fbff7a0"),
        OutputLine::new("> Injecting payload..."),
        OutputLine::new("> Bypassing authentication..."),
        OutputLine::styled("> Access granted!", LineStyle::Success),
        OutputLine::blank(),
        OutputLine::styled("Just kidding! This is only for fun.", LineStyle::Error),
        OutputLine::new("Always hack ethically and responsibly!"),
    ]);
}

const COFFEE_ART: &[&str] = &[
    "      (  )   (   )  )",
    "       ) (   )  (  (",
    "       ( )  (    ) )",
    "       _____________",
    "      <_____________> ___",
    "      |             |/ _ \\",
    "      |               | | |",
    "      |               |_| |",
    "   ___|             |\\___/",
    "  /    \\___________/    \\",
    " /                      \\",
    " \\______________________/",
];

fn coffee(view: &mut OutputView) {
    for line in COFFEE_ART {
        view.push(OutputLine::styled(*line, LineStyle::AsciiArt));
    }
    view.push(OutputLine::new("☕ Coffee brewing... please wait"));
    view.push(OutputLine::styled(
        "Perfect fuel for coding sessions!",
        LineStyle::Success,
    ));
}

fn uptime(view: &mut OutputView, ctx: &mut ContentContext<'_>) {
    let secs = ctx.uptime.as_secs();
    let (hours, minutes, seconds) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    let memory = ctx.rng.in_range(20..=69);
    let cpu = ctx.rng.in_range(5..=34);
    view.extend([
        header("System Information"),
        OutputLine::blank(),
        OutputLine::new(format!("Uptime: {hours}h {minutes}m {seconds}s")),
        OutputLine::new("System: TerminalPortfolio v1.0"),
        OutputLine::new(format!("Kernel: {}", std::env::consts::OS)),
        OutputLine::new(format!("Architecture: {}", std::env::consts::ARCH)),
        OutputLine::new("Shell: /bin/portfolio"),
        OutputLine::new(format!("Memory Usage: {memory}%")),
        OutputLine::new(format!("CPU Usage: {cpu}%")),
        OutputLine::styled("Status: All systems operational", LineStyle::Success),
    ]);
}
