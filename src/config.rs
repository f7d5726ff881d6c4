//! Configuration types for the partitioner.
//!
//! These structs carry already-resolved values: nothing in this module reads
//! environment variables or option strings. The binary does that and hands
//! the result over.
//!
//! - [`DateOrder`] - how to read three-part dates that are not year-first
//! - [`AmbiguousOrder`] - the `auto` tie-break when both leading parts are ≤ 12
//! - [`DatePolicy`] - the two combined, as consumed by the date normalizer
//! - [`SplitConfig`] - everything the split stage needs
//!
//! # Example
//!
//! ```rust
//! use chatminutes::config::{DateOrder, SplitConfig};
//!
//! let config = SplitConfig::new()
//!     .with_date_order(DateOrder::DayMonthYear)
//!     .with_prefix("BoardMeeting")
//!     .with_output_dir("minutes/raw");
//!
//! assert_eq!(config.extension, "txt");
//! ```

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Committee name used when none is configured.
pub const DEFAULT_COMMITTEE_NAME: &str = "KU Math Seminar Committee";

/// Tie-break applied by [`DateOrder::Auto`] when a token such as `03/04/22`
/// could be read either way.
///
/// WhatsApp's default export locale writes month first.
pub const DEFAULT_AMBIGUOUS_ORDER: AmbiguousOrder = AmbiguousOrder::MonthFirst;

/// Interpretation of three-part dates whose first component is not a
/// four-digit year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "kebab-case")]
pub enum DateOrder {
    /// Infer from the values; see [`AmbiguousOrder`] for the tie-break
    #[default]
    Auto,
    /// `DD/MM/YY`
    #[serde(alias = "dmy")]
    #[cfg_attr(feature = "cli", value(alias = "dmy"))]
    DayMonthYear,
    /// `MM/DD/YY`
    #[serde(alias = "mdy")]
    #[cfg_attr(feature = "cli", value(alias = "mdy"))]
    MonthDayYear,
    /// `YY/MM/DD`
    #[serde(alias = "ymd")]
    #[cfg_attr(feature = "cli", value(alias = "ymd"))]
    YearMonthDay,
}

impl DateOrder {
    /// Returns all supported names (including aliases).
    pub fn all_names() -> &'static [&'static str] {
        &[
            "auto",
            "day-month-year",
            "dmy",
            "month-day-year",
            "mdy",
            "year-month-day",
            "ymd",
        ]
    }
}

impl fmt::Display for DateOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateOrder::Auto => write!(f, "auto"),
            DateOrder::DayMonthYear => write!(f, "day-month-year"),
            DateOrder::MonthDayYear => write!(f, "month-day-year"),
            DateOrder::YearMonthDay => write!(f, "year-month-day"),
        }
    }
}

impl FromStr for DateOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(DateOrder::Auto),
            "day-month-year" | "dmy" => Ok(DateOrder::DayMonthYear),
            "month-day-year" | "mdy" => Ok(DateOrder::MonthDayYear),
            "year-month-day" | "ymd" => Ok(DateOrder::YearMonthDay),
            _ => Err(format!(
                "Unknown date order: '{}'. Expected one of: {}",
                s,
                DateOrder::all_names().join(", ")
            )),
        }
    }
}

/// Which reading wins when both leading components are ≤ 12 under
/// [`DateOrder::Auto`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "kebab-case")]
pub enum AmbiguousOrder {
    /// Read `03/04/22` as March 4th
    #[serde(alias = "mdy")]
    #[cfg_attr(feature = "cli", value(alias = "mdy"))]
    MonthFirst,
    /// Read `03/04/22` as April 3rd
    #[serde(alias = "dmy")]
    #[cfg_attr(feature = "cli", value(alias = "dmy"))]
    DayFirst,
}

impl Default for AmbiguousOrder {
    fn default() -> Self {
        DEFAULT_AMBIGUOUS_ORDER
    }
}

impl fmt::Display for AmbiguousOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AmbiguousOrder::MonthFirst => write!(f, "month-first"),
            AmbiguousOrder::DayFirst => write!(f, "day-first"),
        }
    }
}

impl FromStr for AmbiguousOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "month-first" | "mdy" => Ok(AmbiguousOrder::MonthFirst),
            "day-first" | "dmy" => Ok(AmbiguousOrder::DayFirst),
            _ => Err(format!(
                "Unknown ambiguous order: '{}'. Expected one of: month-first, day-first",
                s
            )),
        }
    }
}

/// Date disambiguation policy, fixed for the duration of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DatePolicy {
    /// Component order for non-year-first tokens
    pub order: DateOrder,
    /// Tie-break used only when `order` is [`DateOrder::Auto`]
    pub ambiguous: AmbiguousOrder,
}

impl DatePolicy {
    /// Creates a policy with the given order and the default tie-break.
    pub fn new(order: DateOrder) -> Self {
        Self {
            order,
            ambiguous: DEFAULT_AMBIGUOUS_ORDER,
        }
    }

    /// Sets the `auto` tie-break.
    #[must_use]
    pub fn with_ambiguous(mut self, ambiguous: AmbiguousOrder) -> Self {
        self.ambiguous = ambiguous;
        self
    }
}

/// Configuration for splitting one export into day files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitConfig {
    /// Date disambiguation (default: auto, month-first tie-break)
    pub date_policy: DatePolicy,

    /// File name prefix, as in `<prefix>-2022-10-18.txt`
    pub prefix: String,

    /// Directory receiving the day files (default: `output/raw`)
    pub output_dir: PathBuf,

    /// Encoding label of the input export (default: `utf-8`)
    pub encoding: String,

    /// Encoding label for day files; `None` reuses the input encoding
    pub output_encoding: Option<String>,

    /// Day file extension without the dot (default: `txt`)
    pub extension: String,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            date_policy: DatePolicy::default(),
            prefix: prefix_from_committee_name(DEFAULT_COMMITTEE_NAME),
            output_dir: PathBuf::from("output").join("raw"),
            encoding: "utf-8".to_string(),
            output_encoding: None,
            extension: "txt".to_string(),
        }
    }
}

impl SplitConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the full date policy.
    #[must_use]
    pub fn with_date_policy(mut self, policy: DatePolicy) -> Self {
        self.date_policy = policy;
        self
    }

    /// Sets the date order, keeping the current tie-break.
    #[must_use]
    pub fn with_date_order(mut self, order: DateOrder) -> Self {
        self.date_policy.order = order;
        self
    }

    /// Sets the `auto` tie-break, keeping the current order.
    #[must_use]
    pub fn with_ambiguous_order(mut self, ambiguous: AmbiguousOrder) -> Self {
        self.date_policy.ambiguous = ambiguous;
        self
    }

    /// Sets the file name prefix.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Sets the output directory.
    #[must_use]
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Sets the input encoding label.
    #[must_use]
    pub fn with_encoding(mut self, label: impl Into<String>) -> Self {
        self.encoding = label.into();
        self
    }

    /// Sets a distinct output encoding label.
    #[must_use]
    pub fn with_output_encoding(mut self, label: impl Into<String>) -> Self {
        self.output_encoding = Some(label.into());
        self
    }

    /// Sets the day file extension (a leading dot is dropped).
    #[must_use]
    pub fn with_extension(mut self, ext: impl Into<String>) -> Self {
        let ext = ext.into();
        self.extension = ext.trim_start_matches('.').to_string();
        self
    }

    /// Encoding label the day files are written in.
    pub fn effective_output_encoding(&self) -> &str {
        self.output_encoding.as_deref().unwrap_or(&self.encoding)
    }
}

/// Collapses a committee name to its ASCII alphanumeric runs.
///
/// `"KU Math Seminar Committee"` becomes `"KUMathSeminarCommittee"`; a name
/// without any such characters becomes `"Committee"`.
pub fn compact_committee_name(name: &str) -> String {
    let compact: String = name.chars().filter(char::is_ascii_alphanumeric).collect();
    if compact.is_empty() {
        "Committee".to_string()
    } else {
        compact
    }
}

/// Default day file prefix for a committee: the compact name plus `Meeting`.
pub fn prefix_from_committee_name(name: &str) -> String {
    format!("{}Meeting", compact_committee_name(name))
}
