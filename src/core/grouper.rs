//! Single-pass grouping of export lines into day buckets.
//!
//! The grouper is a small state machine. Its whole state is a [`Cursor`]:
//!
//! ```text
//!             header (date ok)
//!  Preamble ─────────────────────▶ Day(d) ◀──┐ header (date ok)
//!     │                            │  ▲  └──┘ continuation → bucket d
//!     │ header (bad date)          │  │
//!     ▼                            │  │ header (date ok)
//!  Orphaned ◀──────────────────────┘  │
//!     │    header (bad date)          │
//!     └───────────────────────────────┘
//! ```
//!
//! Preamble lines and lines under an unparsable header are discarded, so
//! one malformed header never swallows the rest of the file.

use tracing::debug;

use super::day::{DayBucket, DayLine, Partition};
use crate::config::DatePolicy;
use crate::parsing::{CanonicalDate, HeaderMatch, normalize_date, recognize_header};

/// One line of the export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawLine<'a> {
    /// 1-based line number
    pub number: usize,
    /// Line text without its terminator
    pub content: &'a str,
    /// `"\n"`, `"\r\n"`, or `""` for a final unterminated line
    pub terminator: &'a str,
}

impl<'a> RawLine<'a> {
    /// Splits text into lines, keeping each terminator.
    pub fn split(text: &'a str) -> impl Iterator<Item = RawLine<'a>> + 'a {
        text.split_inclusive('\n')
            .enumerate()
            .map(|(i, raw)| {
                let content = raw.strip_suffix('\n').map_or(raw, |s| s.strip_suffix('\r').unwrap_or(s));
                RawLine {
                    number: i + 1,
                    content,
                    terminator: &raw[content.len()..],
                }
            })
    }

    fn to_day_line(self) -> DayLine {
        DayLine {
            number: self.number,
            text: format!("{}{}", self.content, self.terminator),
        }
    }
}

/// Where the grouper currently sends non-header lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cursor {
    /// No header seen yet
    #[default]
    Preamble,
    /// Lines go to this day's bucket
    Day(CanonicalDate),
    /// The last header had an unparsable date; lines are dropped
    Orphaned,
}

/// What happened to one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition<'a> {
    /// Header appended to the bucket for `date`
    Header {
        date: CanonicalDate,
        header: HeaderMatch<'a>,
    },
    /// Continuation appended to the bucket for the date
    Continuation(CanonicalDate),
    /// Discarded before the first header
    Preamble,
    /// Header discarded because its date could not be normalized
    UnparsableHeader(HeaderMatch<'a>),
    /// Continuation discarded under an unparsable header
    Orphaned,
}

impl Cursor {
    /// Computes the next cursor and the fate of `line`.
    pub fn step(self, line: &str, policy: DatePolicy) -> (Cursor, Disposition<'_>) {
        if let Some(header) = recognize_header(line) {
            return match normalize_date(header.date, policy) {
                Some(date) => (Cursor::Day(date), Disposition::Header { date, header }),
                None => (Cursor::Orphaned, Disposition::UnparsableHeader(header)),
            };
        }

        let disposition = match self {
            Cursor::Preamble => Disposition::Preamble,
            Cursor::Day(date) => Disposition::Continuation(date),
            Cursor::Orphaned => Disposition::Orphaned,
        };
        (self, disposition)
    }

    /// Returns `true` once any header, parsable or not, has been seen.
    pub fn have_seen_any_header(self) -> bool {
        !matches!(self, Cursor::Preamble)
    }

    /// The day currently receiving lines.
    pub fn current_date(self) -> Option<CanonicalDate> {
        match self {
            Cursor::Day(date) => Some(date),
            _ => None,
        }
    }
}

/// Accumulates day buckets over a stream of lines.
///
/// # Example
///
/// ```rust
/// use chatminutes::config::DatePolicy;
/// use chatminutes::core::grouper::{MessageGrouper, RawLine};
///
/// let text = "10/18/22, 09:00 - Alice: Agenda\nsecond line\n";
/// let mut grouper = MessageGrouper::new(DatePolicy::default());
/// for line in RawLine::split(text) {
///     grouper.push(line);
/// }
/// let partition = grouper.finish();
/// assert_eq!(partition.len(), 1);
/// assert_eq!(partition.stats().continuation_lines, 1);
/// ```
#[derive(Debug, Clone)]
pub struct MessageGrouper {
    policy: DatePolicy,
    cursor: Cursor,
    partition: Partition,
}

impl MessageGrouper {
    pub fn new(policy: DatePolicy) -> Self {
        Self {
            policy,
            cursor: Cursor::Preamble,
            partition: Partition::default(),
        }
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Feeds one line.
    pub fn push<'a>(&mut self, line: RawLine<'a>) -> Disposition<'a> {
        let (next, disposition) = self.cursor.step(line.content, self.policy);
        self.cursor = next;

        let stats = &mut self.partition.stats;
        stats.total_lines += 1;

        match disposition {
            Disposition::Header { date, header } => {
                stats.header_lines += 1;
                self.partition
                    .buckets
                    .entry(date)
                    .or_insert_with(|| DayBucket::new(date))
                    .push_header(line.to_day_line(), header.sender);
            }
            Disposition::Continuation(date) => {
                stats.continuation_lines += 1;
                self.partition
                    .buckets
                    .entry(date)
                    .or_insert_with(|| DayBucket::new(date))
                    .push_continuation(line.to_day_line());
            }
            Disposition::Preamble => stats.preamble_lines += 1,
            Disposition::UnparsableHeader(header) => {
                stats.orphaned_lines += 1;
                stats.unparsable_headers += 1;
                debug!(
                    line = line.number,
                    date = header.date,
                    "skipping header with unparsable date"
                );
            }
            Disposition::Orphaned => stats.orphaned_lines += 1,
        }

        disposition
    }

    /// Ends the pass. Buckets are final only after this call.
    pub fn finish(self) -> Partition {
        self.partition
    }
}

/// Groups a whole export in one call.
pub fn group_lines(text: &str, policy: DatePolicy) -> Partition {
    let mut grouper = MessageGrouper::new(policy);
    for line in RawLine::split(text) {
        grouper.push(line);
    }
    grouper.finish()
}
