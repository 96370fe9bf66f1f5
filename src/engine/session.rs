//! engine::session
//!
//! The read-eval-print loop over one registry.
//!
//! A [`Session`] owns the registry and the shuffle RNG for its whole life.
//! It reads lines until `quit` or end of input, writes results to the
//! output writer and diagnostics to stderr, then tears the registry down.

use std::io::{self, BufRead, Write};

use rand::rngs::StdRng;
use rand::SeedableRng;

use super::command;
use super::dispatch::{dispatch, Reply};
use super::ExecError;
use crate::core::config::HarnessConfig;
use crate::core::registry::{Registry, Teardown};
use crate::ui::output::{self, Verbosity};

/// Counters for one [`Session::run`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSummary {
    /// Input lines read, including blanks and comments.
    pub lines: usize,
    /// Lines rejected with a diagnostic.
    pub failures: usize,
    /// Whether input ended with `quit` rather than end of input.
    pub quit: bool,
    /// What the final teardown released.
    pub released: Teardown,
}

/// A harness session.
#[derive(Debug)]
pub struct Session {
    registry: Registry,
    rng: StdRng,
    verbosity: Verbosity,
    echo: bool,
}

impl Session {
    /// Creates a session with an empty registry.
    ///
    /// The shuffle RNG is seeded from `shuffle_seed` when configured and
    /// from the OS otherwise.
    pub fn new(config: &HarnessConfig, verbosity: Verbosity) -> Self {
        let rng = match config.shuffle_seed() {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            registry: Registry::new(config.slot_count(), config.node_limit()),
            rng,
            verbosity,
            echo: config.echo(),
        }
    }

    /// The live registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Parses and executes one line.
    ///
    /// Blank and comment lines yield [`Reply::Silent`].
    pub fn execute_line(&mut self, line: &str) -> Result<Reply, ExecError> {
        let Some(command) = command::parse(line)? else {
            return Ok(Reply::Silent);
        };
        output::debug(format!("dispatch: {}", line.trim()), self.verbosity);
        dispatch(&mut self.registry, &mut self.rng, command, self.verbosity)
    }

    /// Runs until `quit` or end of input, then tears the registry down.
    ///
    /// # Errors
    ///
    /// Only I/O failures on `input` or `out` end the loop early. Command
    /// failures are reported on stderr and counted.
    pub fn run<R, W>(&mut self, mut input: R, out: &mut W) -> io::Result<SessionSummary>
    where
        R: BufRead,
        W: Write,
    {
        let mut summary = SessionSummary::default();
        let mut buf = Vec::new();
        loop {
            buf.clear();
            if input.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            summary.lines += 1;
            let text = String::from_utf8_lossy(&buf);
            let line = text.trim_end_matches(['\n', '\r']);
            if self.echo {
                writeln!(out, "{}", line)?;
            }
            match self.execute_line(line) {
                Ok(Reply::Quit) => {
                    summary.quit = true;
                    break;
                }
                Ok(reply) => {
                    for result in reply.lines() {
                        writeln!(out, "{}", result)?;
                    }
                }
                Err(err) => {
                    summary.failures += 1;
                    output::diagnostic(&err, self.verbosity);
                }
            }
        }
        out.flush()?;
        summary.released = self.teardown();
        Ok(summary)
    }

    /// Destroys every live instance.
    pub fn teardown(&mut self) -> Teardown {
        let released = self.registry.teardown();
        output::debug(
            format!(
                "teardown: {} instance(s), {} node(s) released",
                released.instances(),
                released.nodes
            ),
            self.verbosity,
        );
        released
    }
}
