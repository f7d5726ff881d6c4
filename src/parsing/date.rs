//! Date token normalization.
//!
//! Export headers carry dates like `10/18/22`, `18.10.2022` or `2022-10-18`.
//! [`normalize_date`] turns such a token into a [`CanonicalDate`] under a
//! [`DatePolicy`], or returns `None` when no valid calendar date can be read
//! from it.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::config::{AmbiguousOrder, DateOrder, DatePolicy};
use crate::error::ChatminutesError;

/// Two-digit years up to and including this value map to 20xx; the rest to 19xx.
pub const TWO_DIGIT_YEAR_PIVOT: i32 = 68;

/// A calendar date, displayed as `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CanonicalDate(NaiveDate);

impl CanonicalDate {
    /// Builds a date from its parts, rejecting impossible combinations.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    /// The underlying chrono date.
    pub fn naive(&self) -> NaiveDate {
        self.0
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn day(&self) -> u32 {
        self.0.day()
    }
}

impl From<NaiveDate> for CanonicalDate {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl fmt::Display for CanonicalDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl FromStr for CanonicalDate {
    type Err = ChatminutesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Self)
            .map_err(|_| ChatminutesError::invalid_date(s))
    }
}

impl Serialize for CanonicalDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CanonicalDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// One numeric component of a date token, with its written width.
#[derive(Debug, Clone, Copy)]
struct Part {
    value: u32,
    digits: usize,
}

impl Part {
    fn parse(s: &str) -> Option<Self> {
        if s.is_empty() || s.len() > 4 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        Some(Self {
            value: s.parse().ok()?,
            digits: s.len(),
        })
    }

    /// Reads this component as a year, pivoting two-digit values.
    fn year(self) -> Option<i32> {
        let value = i32::try_from(self.value).ok()?;
        match self.digits {
            4 => Some(value),
            2 => Some(pivot_two_digit_year(value)),
            _ => None,
        }
    }

    /// Day and month components are written with one or two digits.
    fn small(self) -> Option<u32> {
        (self.digits <= 2).then_some(self.value)
    }
}

/// Maps `00..=68` to 2000–2068 and `69..=99` to 1969–1999.
pub fn pivot_two_digit_year(year: i32) -> i32 {
    if year <= TWO_DIGIT_YEAR_PIVOT {
        2000 + year
    } else {
        1900 + year
    }
}

/// Splits a token on its separator, requiring exactly three parts and a
/// single separator character throughout.
fn split_parts(token: &str) -> Option<[Part; 3]> {
    let sep = token.chars().find(|c| matches!(c, '/' | '-' | '.'))?;
    if token.chars().any(|c| !c.is_ascii_digit() && c != sep) {
        return None;
    }
    let mut pieces = token.split(sep);
    let parts = [
        Part::parse(pieces.next()?)?,
        Part::parse(pieces.next()?)?,
        Part::parse(pieces.next()?)?,
    ];
    if pieces.next().is_some() {
        return None;
    }
    Some(parts)
}

fn build(year: Part, month: Part, day: Part) -> Option<CanonicalDate> {
    CanonicalDate::from_ymd(year.year()?, month.small()?, day.small()?)
}

/// Picks day-first or month-first from the values of the two leading parts.
///
/// Returns `None` when both exceed 12, which no reading can satisfy.
fn infer_order(first: u32, second: u32, tie_break: AmbiguousOrder) -> Option<AmbiguousOrder> {
    match (first > 12, second > 12) {
        (true, false) => Some(AmbiguousOrder::DayFirst),
        (false, true) => Some(AmbiguousOrder::MonthFirst),
        (false, false) => Some(tie_break),
        (true, true) => None,
    }
}

/// Normalizes a raw date token.
///
/// Year-first tokens (`2022-10-18`, `2022/10/18`, `2022.10.18`) are honored
/// directly. Other three-part tokens follow `policy.order`; under
/// [`DateOrder::Auto`] a leading component above 12 must be the day, and
/// `policy.ambiguous` decides when neither is.
///
/// # Example
///
/// ```rust
/// use chatminutes::config::{DateOrder, DatePolicy};
/// use chatminutes::parsing::normalize_date;
///
/// let auto = DatePolicy::default();
/// assert_eq!(normalize_date("18/10/22", auto).unwrap().to_string(), "2022-10-18");
/// assert_eq!(normalize_date("10/18/22", auto).unwrap().to_string(), "2022-10-18");
/// assert!(normalize_date("32/10/22", auto).is_none());
///
/// let dmy = DatePolicy::new(DateOrder::DayMonthYear);
/// assert_eq!(normalize_date("03/04/22", dmy).unwrap().to_string(), "2022-04-03");
/// ```
pub fn normalize_date(token: &str, policy: DatePolicy) -> Option<CanonicalDate> {
    let [a, b, c] = split_parts(token.trim())?;

    if a.digits == 4 {
        return build(a, b, c);
    }

    match policy.order {
        DateOrder::DayMonthYear => build(c, b, a),
        DateOrder::MonthDayYear => build(c, a, b),
        DateOrder::YearMonthDay => build(a, b, c),
        DateOrder::Auto => match infer_order(a.value, b.value, policy.ambiguous)? {
            AmbiguousOrder::DayFirst => build(c, b, a),
            AmbiguousOrder::MonthFirst => build(c, a, b),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn norm(token: &str, order: DateOrder) -> Option<String> {
        normalize_date(token, DatePolicy::new(order)).map(|d| d.to_string())
    }

    #[test]
    fn test_year_first_ignores_policy() {
        for order in [
            DateOrder::Auto,
            DateOrder::DayMonthYear,
            DateOrder::MonthDayYear,
        ] {
            assert_eq!(norm("2022-10-18", order).as_deref(), Some("2022-10-18"));
            assert_eq!(norm("2022/1/5", order).as_deref(), Some("2022-01-05"));
        }
    }

    #[test]
    fn test_auto_day_above_twelve_in_either_position() {
        assert_eq!(
            norm("18/10/22", DateOrder::Auto).as_deref(),
            Some("2022-10-18")
        );
        assert_eq!(
            norm("10/18/22", DateOrder::Auto).as_deref(),
            Some("2022-10-18")
        );
        assert_eq!(
            norm("26.10.2025", DateOrder::Auto).as_deref(),
            Some("2025-10-26")
        );
    }

    #[test]
    fn test_auto_tie_break_is_configurable() {
        let month_first = DatePolicy::new(DateOrder::Auto);
        let day_first = month_first.with_ambiguous(AmbiguousOrder::DayFirst);

        assert_eq!(
            normalize_date("03/04/22", month_first).unwrap().to_string(),
            "2022-03-04"
        );
        assert_eq!(
            normalize_date("03/04/22", day_first).unwrap().to_string(),
            "2022-04-03"
        );
    }

    #[test]
    fn test_explicit_orders() {
        assert_eq!(
            norm("03/04/22", DateOrder::DayMonthYear).as_deref(),
            Some("2022-04-03")
        );
        assert_eq!(
            norm("03/04/22", DateOrder::MonthDayYear).as_deref(),
            Some("2022-03-04")
        );
        assert_eq!(
            norm("22/04/03", DateOrder::YearMonthDay).as_deref(),
            Some("2022-04-03")
        );
        // Explicit order does not fall back to another reading
        assert_eq!(norm("18/10/22", DateOrder::MonthDayYear), None);
    }

    #[test]
    fn test_two_digit_year_pivot() {
        assert_eq!(pivot_two_digit_year(69), 1969);
        assert_eq!(pivot_two_digit_year(68), 2068);
        assert_eq!(pivot_two_digit_year(0), 2000);
        assert_eq!(
            norm("1/2/69", DateOrder::MonthDayYear).as_deref(),
            Some("1969-01-02")
        );
        assert_eq!(
            norm("1/2/00", DateOrder::MonthDayYear).as_deref(),
            Some("2000-01-02")
        );
    }

    #[test]
    fn test_not_normalizable() {
        assert_eq!(norm("32/10/22", DateOrder::Auto), None);
        assert_eq!(norm("13/14/22", DateOrder::Auto), None);
        assert_eq!(norm("10/18", DateOrder::Auto), None);
        assert_eq!(norm("10/18/22/1", DateOrder::Auto), None);
        assert_eq!(norm("10/18-22", DateOrder::Auto), None);
        assert_eq!(norm("10/18/222", DateOrder::Auto), None);
        assert_eq!(norm("ab/cd/ef", DateOrder::Auto), None);
        assert_eq!(norm("", DateOrder::Auto), None);
    }

    #[test]
    fn test_calendar_validation() {
        assert_eq!(norm("31/04/22", DateOrder::DayMonthYear), None);
        assert_eq!(norm("29/02/23", DateOrder::DayMonthYear), None);
        assert_eq!(
            norm("29/02/24", DateOrder::DayMonthYear).as_deref(),
            Some("2024-02-29")
        );
    }

    #[test]
    fn test_canonical_date_parse_and_serde() {
        let date: CanonicalDate = "2022-10-18".parse().unwrap();
        assert_eq!((date.year(), date.month(), date.day()), (2022, 10, 18));
        assert!("18/10/2022".parse::<CanonicalDate>().is_err());

        let json = serde_json::to_string(&date).unwrap();
        assert_eq!(json, "\"2022-10-18\"");
        let back: CanonicalDate = serde_json::from_str(&json).unwrap();
        assert_eq!(back, date);
    }
}
