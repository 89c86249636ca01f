#![forbid(unsafe_code)]

//! termfolio binary entry point.

use termfolio::{app, cli, logging};

fn main() {
    let opts = cli::Opts::parse();

    if let Some(path) = opts.log_file.as_deref()
        && let Err(e) = logging::init(path, opts.log_json)
    {
        eprintln!("Failed to initialize: {e}");
        std::process::exit(1);
    }

    if let Err(e) = app::run(opts) {
        tracing::error!(error = %e, "termfolio exited with an error");
        eprintln!("Failed to run: {e}");
        std::process::exit(1);
    }
}
