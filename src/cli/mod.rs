//! cli
//!
//! Command-line interface layer for Slotwise.
//!
//! # Responsibilities
//!
//! - Parse command-line flags
//! - Load configuration and apply flag overrides
//! - Hand stdin and stdout to an [`engine::Session`](crate::engine::Session)
//!
//! # Architecture
//!
//! The CLI layer is thin. It never touches containers directly; every
//! command line flows through the engine.

pub mod args;

pub use args::Cli;

use std::io;

use anyhow::{Context, Result};

use crate::core::config::Config;
use crate::engine::Session;
use crate::ui::output::{self, Verbosity};

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<()> {
    let cli = Cli::parse_args();
    let verbosity = Verbosity::from_flags(cli.quiet, cli.debug);

    let loaded = Config::load(cli.config.as_deref()).context("failed to load configuration")?;
    for warning in &loaded.warnings {
        output::warn(
            format!("{} ({})", warning.message, warning.path.display()),
            verbosity,
        );
    }
    if let Some(path) = &loaded.path {
        output::debug(format!("config: {}", path.display()), verbosity);
    }

    let mut config = loaded.config;
    cli.apply_overrides(&mut config);
    config.validate().context("invalid command-line override")?;

    let mut session = Session::new(&config, verbosity);
    let stdin = io::stdin();
    let stdout = io::stdout();
    let summary = session
        .run(stdin.lock(), &mut stdout.lock())
        .context("I/O error while running session")?;

    output::debug(
        format!(
            "{} line(s) read, {} rejected",
            summary.lines, summary.failures
        ),
        verbosity,
    );
    Ok(())
}
