//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Flags
//!
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--config <path>`: Read configuration from this file only
//! - `--debug`: Enable debug logging
//! - `--quiet` / `-q`: Results only, no diagnostics
//! - `--slots <N>`: Slots per container kind
//! - `--seed <u64>`: Fixed seed for `list_shuffle`

use clap::Parser;
use std::path::PathBuf;

use crate::core::config::HarnessConfig;

/// Slotwise - drive lists, hash tables and bitmaps from line commands on stdin
#[derive(Parser, Debug)]
#[command(name = "slotwise")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "\
EXAMPLES:
    # Sort a list
    printf 'create list list0\\nlist_push_back list0 3\\nlist_push_back list0 1\\nlist_sort list0\\ndumpdata list0\\n' | slotwise

    # Reproducible shuffles
    slotwise --seed 42 < script.txt

Type `help` at the prompt for the command summary.")]
pub struct Cli {
    /// Read configuration from this file instead of the default locations
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Results only; suppress diagnostics
    #[arg(short, long)]
    pub quiet: bool,

    /// Slots per container kind (overrides slot_count)
    #[arg(long, value_name = "N")]
    pub slots: Option<usize>,

    /// Seed for list_shuffle (overrides shuffle_seed)
    #[arg(long, value_name = "SEED")]
    pub seed: Option<u64>,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }

    /// Apply flag overrides on top of file configuration.
    pub fn apply_overrides(&self, config: &mut HarnessConfig) {
        if let Some(slots) = self.slots {
            config.slot_count = Some(slots);
        }
        if let Some(seed) = self.seed {
            config.shuffle_seed = Some(seed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn flags_parse() {
        let cli = Cli::try_parse_from(["slotwise", "--debug", "--slots", "4", "--seed", "9"]).unwrap();
        assert!(cli.debug);
        assert!(!cli.quiet);
        assert_eq!(cli.slots, Some(4));
        assert_eq!(cli.seed, Some(9));
    }

    #[test]
    fn overrides_win_over_file_values() {
        let cli = Cli::try_parse_from(["slotwise", "--slots", "3"]).unwrap();
        let mut config = HarnessConfig {
            slot_count: Some(8),
            shuffle_seed: Some(1),
            ..Default::default()
        };
        cli.apply_overrides(&mut config);
        assert_eq!(config.slot_count(), 3);
        assert_eq!(config.shuffle_seed(), Some(1));
    }

    #[test]
    fn rejects_negative_slots() {
        assert!(Cli::try_parse_from(["slotwise", "--slots", "-1"]).is_err());
    }
}
