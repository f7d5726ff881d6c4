//! End-to-end split of one export into day files.
//!
//! Reading and decoding the export is process-fatal; grouping never fails;
//! writing collects per-day failures in the [`PartitionReport`].
//!
//! ```rust,no_run
//! use chatminutes::config::SplitConfig;
//! use chatminutes::core::split_file_by_day;
//!
//! let config = SplitConfig::new().with_prefix("Board");
//! let summary = split_file_by_day("chat.txt".as_ref(), &config)?;
//! for day in &summary.report.written {
//!     println!("{} -> {}", day.day.day_id, day.day.path.display());
//! }
//! # Ok::<(), chatminutes::ChatminutesError>(())
//! ```

use std::path::{Path, PathBuf};

use tracing::info;

use super::day::GroupingStats;
use super::grouper::group_lines;
use super::writer::{PartitionReport, PartitionWriter};
use crate::config::SplitConfig;
use crate::encoding;
use crate::error::Result;

/// Result of splitting one export.
#[derive(Debug)]
pub struct SplitSummary {
    pub input: PathBuf,
    /// Line accounting from the grouping pass
    pub stats: GroupingStats,
    pub report: PartitionReport,
}

impl SplitSummary {
    /// Returns `true` if every day file was written.
    pub fn is_complete(&self) -> bool {
        self.report.is_complete()
    }

    /// Number of distinct days found in the export.
    pub fn day_count(&self) -> usize {
        self.report.written.len() + self.report.failed.len()
    }
}

/// Splits `input` into day files according to `config`.
///
/// # Errors
///
/// Returns an error if either encoding label is unknown, the export cannot
/// be read or decoded, or the output directory cannot be created.
pub fn split_file_by_day(input: &Path, config: &SplitConfig) -> Result<SplitSummary> {
    let input_encoding = encoding::resolve(&config.encoding)?;
    let writer = PartitionWriter::from_config(config)?;

    let text = encoding::read_export(input, input_encoding)?;
    let partition = group_lines(&text, config.date_policy);
    let stats = *partition.stats();
    info!(
        input = %input.display(),
        days = partition.len(),
        lines = stats.total_lines,
        "grouped export"
    );

    let report = writer.write(&partition)?;
    Ok(SplitSummary {
        input: input.to_path_buf(),
        stats,
        report,
    })
}
