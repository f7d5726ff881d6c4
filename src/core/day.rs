//! Day buckets and day files.
//!
//! A [`DayBucket`] holds every export line that belongs to one
//! [`CanonicalDate`], in file order. A [`DayFile`] is the written form of a
//! bucket as seen by downstream stages: a date, a day identifier, and a
//! path.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{ChatminutesError, Result};
use crate::parsing::CanonicalDate;

static FILE_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{4}-\d{2}-\d{2}").expect("file date pattern is valid"));

/// One export line, verbatim, including its original line terminator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayLine {
    /// 1-based line number in the export
    pub number: usize,
    /// Line text including `\n` / `\r\n` when the export had one
    pub text: String,
}

impl DayLine {
    /// The line without its terminator.
    pub fn content(&self) -> &str {
        self.text
            .strip_suffix('\n')
            .map(|s| s.strip_suffix('\r').unwrap_or(s))
            .unwrap_or(&self.text)
    }
}

/// All lines of the export that belong to one date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayBucket {
    date: CanonicalDate,
    lines: Vec<DayLine>,
    header_count: usize,
    participants: Vec<String>,
}

impl DayBucket {
    pub fn new(date: CanonicalDate) -> Self {
        Self {
            date,
            lines: Vec::new(),
            header_count: 0,
            participants: Vec::new(),
        }
    }

    pub fn date(&self) -> CanonicalDate {
        self.date
    }

    /// Lines in original file order.
    pub fn lines(&self) -> &[DayLine] {
        &self.lines
    }

    /// Number of lines (headers and continuations).
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of messages, i.e. header lines.
    pub fn message_count(&self) -> usize {
        self.header_count
    }

    /// Distinct senders in order of first appearance.
    pub fn participants(&self) -> &[String] {
        &self.participants
    }

    /// The bucket's exact file content.
    pub fn contents(&self) -> String {
        self.lines.iter().map(|l| l.text.as_str()).collect()
    }

    pub(crate) fn push_header(&mut self, line: DayLine, sender: Option<&str>) {
        self.header_count += 1;
        if let Some(sender) = sender {
            if !self.participants.iter().any(|p| p == sender) {
                self.participants.push(sender.to_string());
            }
        }
        self.lines.push(line);
    }

    pub(crate) fn push_continuation(&mut self, line: DayLine) {
        self.lines.push(line);
    }
}

/// Line accounting for one grouping pass.
///
/// `total_lines == header_lines + continuation_lines + preamble_lines +
/// orphaned_lines` always holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupingStats {
    /// Lines seen
    pub total_lines: usize,
    /// Header lines with a normalized date, appended to a bucket
    pub header_lines: usize,
    /// Continuation lines appended to a bucket
    pub continuation_lines: usize,
    /// Lines before the first header, discarded
    pub preamble_lines: usize,
    /// Unparsable headers plus their continuations, discarded
    pub orphaned_lines: usize,
    /// Headers whose date could not be normalized (counted in `orphaned_lines`)
    pub unparsable_headers: usize,
}

impl GroupingStats {
    /// Lines that ended up in some bucket.
    pub fn bucketed_lines(&self) -> usize {
        self.header_lines + self.continuation_lines
    }

    /// Lines that were dropped.
    pub fn discarded_lines(&self) -> usize {
        self.preamble_lines + self.orphaned_lines
    }
}

/// The result of grouping one export: buckets keyed by date.
#[derive(Debug, Clone, Default)]
pub struct Partition {
    pub(crate) buckets: BTreeMap<CanonicalDate, DayBucket>,
    pub(crate) stats: GroupingStats,
}

impl Partition {
    /// Buckets in ascending date order.
    pub fn days(&self) -> impl Iterator<Item = &DayBucket> {
        self.buckets.values()
    }

    pub fn dates(&self) -> impl Iterator<Item = CanonicalDate> + '_ {
        self.buckets.keys().copied()
    }

    pub fn get(&self, date: CanonicalDate) -> Option<&DayBucket> {
        self.buckets.get(&date)
    }

    /// Number of distinct days.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn stats(&self) -> &GroupingStats {
        &self.stats
    }

    pub fn into_buckets(self) -> BTreeMap<CanonicalDate, DayBucket> {
        self.buckets
    }
}

/// A written day file, as handed to downstream stages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayFile {
    pub date: CanonicalDate,
    /// Ledger key for this day
    pub day_id: String,
    pub path: PathBuf,
}

impl DayFile {
    /// Builds a day file for `path`, taking the date from its name.
    ///
    /// Returns `None` if the file name carries no valid `YYYY-MM-DD`.
    pub fn from_path(path: impl Into<PathBuf>) -> Option<Self> {
        let path = path.into();
        let date = date_from_path(&path)?;
        Some(Self {
            date,
            day_id: date.to_string(),
            path,
        })
    }

    /// Reads the day file back as text.
    pub fn read_to_string(&self) -> Result<String> {
        fs::read_to_string(&self.path)
            .map_err(|e| ChatminutesError::input_read(&self.path, "UTF-8", e))
    }
}

/// The first valid `YYYY-MM-DD` in a file name.
pub fn date_from_path(path: &Path) -> Option<CanonicalDate> {
    let name = path.file_name()?.to_str()?;
    FILE_DATE
        .find_iter(name)
        .find_map(|m| m.as_str().parse().ok())
}

/// Ledger key for a day file: its date, or the file stem when the name has
/// no date.
pub fn day_id_from_path(path: &Path) -> Option<String> {
    if let Some(date) = date_from_path(path) {
        return Some(date.to_string());
    }
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(str::to_string)
}

/// Lists day files with extension `ext` in `dir`, sorted by date then name.
///
/// Files whose name carries no date are skipped.
pub fn discover_day_files(dir: &Path, ext: &str) -> Result<Vec<DayFile>> {
    let ext = ext.trim_start_matches('.');
    let mut days = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some(ext) {
            continue;
        }
        if let Some(day) = DayFile::from_path(path) {
            days.push(day);
        }
    }
    days.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.path.cmp(&b.path)));
    Ok(days)
}
