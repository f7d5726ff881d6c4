//! Line-level grammars for WhatsApp text exports.
//!
//! Everything here is pure: no I/O, no state, no errors. Functions return
//! `Option` and leave the policy for `None` to the caller.
//!
//! - [`header`] - recognizes message header lines
//! - [`date`] - normalizes header date tokens to [`CanonicalDate`]
//! - [`time`] - parses header time tokens to minutes after midnight

pub mod date;
pub mod header;
pub mod time;

pub use date::{CanonicalDate, TWO_DIGIT_YEAR_PIVOT, normalize_date, pivot_two_digit_year};
pub use header::{HeaderMatch, HeaderStyle, is_header, recognize_header};
pub use time::{MINUTES_PER_DAY, parse_time};
