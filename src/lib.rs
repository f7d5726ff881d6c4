//! # Chatminutes
//!
//! Partition a WhatsApp chat export into one file per calendar day, and
//! track per-day transcription outcomes so later runs can resume.
//!
//! ## Overview
//!
//! An export is a flat text log. Each message opens with a header in one of
//! two shapes:
//!
//! - **Bracketed** — `[10/18/22, 09:00] Alice: text`
//! - **Dashed** — `10/18/22, 09:00 - Alice: text`
//!
//! Lines without a header continue the previous message. The partitioner
//! folds them into the owning message's day and writes each day verbatim
//! to `<prefix>-<YYYY-MM-DD>.<ext>`.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use chatminutes::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let config = SplitConfig::new()
//!         .with_prefix("BoardMeeting")
//!         .with_date_order(DateOrder::DayMonthYear);
//!
//!     let summary = split_file_by_day("chat.txt".as_ref(), &config)?;
//!     println!("{} days written", summary.report.written.len());
//!
//!     // Later: decide which days a transcription run should redo
//!     let ledger = ResumeLedger::open_file("output/transcripts/ledger.json");
//!     let days: Vec<DayFile> = summary.report.day_files().cloned().collect();
//!     for day in ledger.plan(&days, ResumeMode::RetryFailed) {
//!         println!("todo: {}", day.day_id);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Ambiguous dates
//!
//! `03/04/22` can be March 4 or April 3. With [`DateOrder::Auto`] a
//! component above 12 settles it; otherwise the tie-break
//! [`config::DEFAULT_AMBIGUOUS_ORDER`] (month first) applies unless
//! overridden with [`DatePolicy::with_ambiguous`].
//!
//! ## Module Structure
//!
//! - [`parsing`] — Line-level grammars
//!   - [`recognize_header`](parsing::recognize_header), [`normalize_date`](parsing::normalize_date), [`parse_time`](parsing::parse_time)
//! - [`core`] — Grouping, writing, and the resume ledger
//!   - [`MessageGrouper`](core::MessageGrouper), [`PartitionWriter`](core::PartitionWriter), [`ResumeLedger`](core::ResumeLedger)
//! - [`config`] — [`SplitConfig`](config::SplitConfig), [`DatePolicy`](config::DatePolicy)
//! - [`encoding`] — Export decoding and day-file encoding
//! - [`cli`] — CLI argument types (feature `cli`)
//! - [`error`] — [`ChatminutesError`], [`Result`]
//! - [`prelude`] — Convenient re-exports
//!
//! [`DateOrder::Auto`]: config::DateOrder::Auto
//! [`DatePolicy::with_ambiguous`]: config::DatePolicy::with_ambiguous

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod core;
pub mod encoding;
pub mod error;
pub mod parsing;

// Re-export the main types at the crate root for convenience
pub use error::{ChatminutesError, Result};

/// Convenient re-exports for common usage.
///
/// ```rust
/// use chatminutes::prelude::*;
/// ```
pub mod prelude {
    // Error types
    pub use crate::error::{ChatminutesError, Result};

    // Configuration
    pub use crate::config::{AmbiguousOrder, DateOrder, DatePolicy, SplitConfig};

    // Parsing
    pub use crate::parsing::{CanonicalDate, HeaderMatch, normalize_date, parse_time, recognize_header};

    // Grouping and writing
    pub use crate::core::{
        DayBucket, DayFile, Partition, PartitionReport, PartitionWriter, SplitSummary, group_lines,
        split_file_by_day,
    };

    // Ledger
    pub use crate::core::{
        DayOutcome, DayStatus, FileLedgerStore, LedgerStore, MemoryLedgerStore, Outcome,
        ResumeLedger, ResumeMode,
    };
}
