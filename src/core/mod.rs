//! Stateful pipeline: grouping, day files, and the resume ledger.
//!
//! This module contains:
//! - [`grouper`] - Single-pass assignment of lines to day buckets
//! - [`day`] - Buckets, partitions, and the day-file view for later stages
//! - [`writer`] - Atomic per-day file output
//! - [`splitter`] - Read, group, and write in one call
//! - [`ledger`] - Per-day outcome ledger for resumable transcription
//!
//! # Quick Start
//!
//! ```rust
//! use chatminutes::config::DatePolicy;
//! use chatminutes::core::group_lines;
//!
//! let text = "10/18/22, 09:00 - Alice: Agenda\nsecond line\n";
//! let partition = group_lines(text, DatePolicy::default());
//! assert_eq!(partition.len(), 1);
//! assert_eq!(partition.stats().continuation_lines, 1);
//! ```

pub mod atomic;
pub mod day;
pub mod grouper;
pub mod ledger;
pub mod splitter;
pub mod writer;

pub use atomic::write_atomic;
pub use day::{
    DayBucket, DayFile, DayLine, GroupingStats, Partition, date_from_path, day_id_from_path,
    discover_day_files,
};
pub use grouper::{Cursor, Disposition, MessageGrouper, RawLine, group_lines};
#[cfg(feature = "file-lock")]
pub use ledger::LedgerLock;
pub use ledger::{
    DEFAULT_LEDGER_FILE_NAME, DayOutcome, DayStatus, FileLedgerStore, LedgerEntries,
    LedgerRecord, LedgerStore, MemoryLedgerStore, Outcome, ResumeLedger, ResumeMode,
    default_ledger_path,
};
pub use splitter::{SplitSummary, split_file_by_day};
pub use writer::{FailedDay, PartitionReport, PartitionWriter, WrittenDay, day_file_name};
