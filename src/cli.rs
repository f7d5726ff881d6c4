//! Command-line interface definition using clap.
//!
//! This module defines:
//! - [`Args`] - CLI argument structure (for use with clap)
//! - [`Command`] - `split` and `ledger` subcommands
//! - [`SplitArgs`] - options of `split`, convertible to a [`SplitConfig`]
//!
//! Values are resolved here (including the `COMMITTEE_NAME` environment
//! variable) so the library only ever sees finished configuration.
//!
//! ```rust
//! use chatminutes::cli::{Args, Command};
//! use clap::Parser;
//!
//! let args = Args::try_parse_from(["chatminutes", "split", "chat.txt", "--prefix", "Board"]).unwrap();
//! let Command::Split(split) = args.command else { panic!() };
//! assert_eq!(split.to_config().prefix, "Board");
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::{AmbiguousOrder, DateOrder, DatePolicy, SplitConfig, prefix_from_committee_name};
use crate::core::ResumeMode;

/// Split WhatsApp chat exports into per-day files and manage the
/// transcription resume ledger.
#[derive(Parser, Debug, Clone)]
#[command(name = "chatminutes")]
#[command(version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    chatminutes split
    chatminutes split chat.txt -o output/raw --prefix BoardMeeting
    chatminutes split chat.txt --date-order dmy --encoding windows-1252
    chatminutes ledger show --ledger output/transcripts/ledger.json
    chatminutes ledger plan --input-dir output/raw --ledger output/transcripts/ledger.json --retry-failed")]
pub struct Args {
    /// Show debug diagnostics on stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Split an export into one file per day
    Split(SplitArgs),

    /// Inspect the resume ledger
    #[command(subcommand)]
    Ledger(LedgerCommand),
}

#[derive(clap::Args, Debug, Clone)]
pub struct SplitArgs {
    /// Path to the exported chat
    #[arg(default_value = "input/ChatData.txt")]
    pub input: PathBuf,

    /// Directory for day files
    #[arg(short, long, value_name = "DIR", default_value = "output/raw")]
    pub output_dir: PathBuf,

    /// File name prefix for day files (wins over --committee-name)
    #[arg(long, value_name = "PREFIX")]
    pub prefix: Option<String>,

    /// Derive the prefix from a committee name
    #[arg(long, value_name = "NAME", env = "COMMITTEE_NAME")]
    pub committee_name: Option<String>,

    /// Encoding of the export
    #[arg(long, value_name = "LABEL", default_value = "utf-8")]
    pub encoding: String,

    /// Encoding of the day files (defaults to the input encoding)
    #[arg(long, value_name = "LABEL")]
    pub output_encoding: Option<String>,

    /// How to read dates that are not year-first
    #[arg(long, value_enum, default_value_t = DateOrder::Auto)]
    pub date_order: DateOrder,

    /// Tie-break for `auto` when both leading parts are 12 or less
    #[arg(long, value_enum, default_value_t = AmbiguousOrder::default())]
    pub ambiguous_order: AmbiguousOrder,

    /// Extension of day files
    #[arg(long, value_name = "EXT", default_value = "txt")]
    pub ext: String,
}

impl SplitArgs {
    /// The prefix in effect: `--prefix`, else one derived from the
    /// committee name, else the default.
    pub fn resolved_prefix(&self) -> String {
        match (&self.prefix, &self.committee_name) {
            (Some(prefix), _) => prefix.clone(),
            (None, Some(name)) => prefix_from_committee_name(name),
            (None, None) => SplitConfig::default().prefix,
        }
    }

    pub fn to_config(&self) -> SplitConfig {
        let mut config = SplitConfig::new()
            .with_date_policy(DatePolicy::new(self.date_order).with_ambiguous(self.ambiguous_order))
            .with_prefix(self.resolved_prefix())
            .with_output_dir(&self.output_dir)
            .with_encoding(&self.encoding)
            .with_extension(&self.ext);
        if let Some(ref label) = self.output_encoding {
            config = config.with_output_encoding(label);
        }
        config
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum LedgerCommand {
    /// List every ledger record
    Show {
        /// Ledger file
        #[arg(long, value_name = "PATH")]
        ledger: PathBuf,
    },

    /// List the days a transcription run would process
    Plan {
        /// Directory with day files
        #[arg(long, value_name = "DIR", default_value = "output/raw")]
        input_dir: PathBuf,

        /// Ledger file
        #[arg(long, value_name = "PATH")]
        ledger: PathBuf,

        /// Skip days already recorded as successful
        #[arg(long)]
        retry_failed: bool,

        /// Extension of day files
        #[arg(long, value_name = "EXT", default_value = "txt")]
        ext: String,
    },
}

/// Resume mode selected by `--retry-failed`.
pub fn resume_mode(retry_failed: bool) -> ResumeMode {
    if retry_failed {
        ResumeMode::RetryFailed
    } else {
        ResumeMode::All
    }
}
