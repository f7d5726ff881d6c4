//! WhatsApp message header recognition.
//!
//! Two header grammars are tried in a fixed order:
//!
//! - Bracketed: `[10/19/22, 8:30 AM] Carol: Agenda`
//! - Dashed: `10/18/22, 09:00 - Alice: Agenda`
//!
//! Both are anchored at line start, so a colon or ` - ` inside the message
//! text never creates a header. Lines that match neither grammar are
//! continuation lines.
//!
//! Digits are ASCII only, matching what the date normalizer accepts. A line
//! written with other digit systems is a continuation line.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::time::parse_time;

/// Date token: `D/M/Y` style or year-first, separated by `/`, `-` or `.`.
const DATE: &str = r"[0-9]{1,2}[/.\-][0-9]{1,2}[/.\-][0-9]{2,4}|[0-9]{4}[/.\-][0-9]{1,2}[/.\-][0-9]{1,2}";

/// Time token: `H:MM`, optional seconds, optional `AM`/`PM` marker.
const TIME: &str = r"[0-9]{1,2}:[0-9]{2}(?::[0-9]{2})?(?:\s?[AaPp]\.?\s?[Mm]\.?)?";

// [10/19/22, 08:30] Carol: ...
static BRACKETED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^\[\s*(?P<date>{DATE}),\s*(?P<time>{TIME})\s*\]\s*(?P<rest>.*)$"
    ))
    .expect("bracketed header pattern is valid")
});

// 10/18/22, 09:00 - Alice: ...
static DASHED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^(?P<date>{DATE}),\s*(?P<time>{TIME})\s-\s(?P<rest>.*)$"
    ))
    .expect("dashed header pattern is valid")
});

/// Which grammar matched a header line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderStyle {
    /// `[date, time] sender: text` (iOS exports)
    Bracketed,
    /// `date, time - sender: text` (Android exports)
    Dashed,
}

/// Fields extracted from a header line.
///
/// All fields borrow from the recognized line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderMatch<'a> {
    pub style: HeaderStyle,
    /// Raw date token, e.g. `10/18/22`
    pub date: &'a str,
    /// Raw time token, e.g. `9:00 PM`
    pub time: &'a str,
    /// Sender name; `None` for system messages such as
    /// `Alice added Bob`
    pub sender: Option<&'a str>,
    /// Message text after the sender (or the whole remainder when there is
    /// no sender)
    pub text: &'a str,
}

impl HeaderMatch<'_> {
    /// Minutes after midnight for the header's time, when it parses.
    pub fn minute_of_day(&self) -> Option<u16> {
        parse_time(self.time)
    }

    /// Returns `true` for messages without a sender.
    pub fn is_system(&self) -> bool {
        self.sender.is_none()
    }
}

/// Strips whitespace plus the BOM and direction marks that iOS exports put
/// in front of some lines.
fn trim_line(line: &str) -> &str {
    line.trim_matches(|c: char| c.is_whitespace() || matches!(c, '\u{feff}' | '\u{200e}' | '\u{200f}'))
}

/// Splits the text after the timestamp into sender and message.
///
/// The first colon ends the sender. Without a colon the remainder is a
/// system message.
fn split_sender(rest: &str) -> (Option<&str>, &str) {
    match rest.split_once(':') {
        Some((sender, text)) => {
            let sender = trim_line(sender);
            if sender.is_empty() {
                (None, rest)
            } else {
                (Some(sender), text.strip_prefix(' ').unwrap_or(text))
            }
        }
        None => (None, rest),
    }
}

fn from_captures<'a>(style: HeaderStyle, caps: &Captures<'a>) -> Option<HeaderMatch<'a>> {
    let date = caps.name("date")?.as_str();
    let time = caps.name("time")?.as_str().trim_end();
    let rest = caps.name("rest").map_or("", |m| m.as_str());
    let (sender, text) = split_sender(rest);
    Some(HeaderMatch {
        style,
        date,
        time,
        sender,
        text,
    })
}

/// Recognizes a message header.
///
/// Returns `None` for continuation lines.
///
/// # Example
///
/// ```rust
/// use chatminutes::parsing::{HeaderStyle, recognize_header};
///
/// let header = recognize_header("10/18/22, 09:00 - Alice: Agenda: budget - v2").unwrap();
/// assert_eq!(header.style, HeaderStyle::Dashed);
/// assert_eq!(header.date, "10/18/22");
/// assert_eq!(header.sender, Some("Alice"));
/// assert_eq!(header.text, "Agenda: budget - v2");
///
/// assert!(recognize_header("just more text: 10/18/22, 09:00 - x").is_none());
/// ```
pub fn recognize_header(line: &str) -> Option<HeaderMatch<'_>> {
    let line = trim_line(line);
    if let Some(caps) = BRACKETED.captures(line) {
        return from_captures(HeaderStyle::Bracketed, &caps);
    }
    if let Some(caps) = DASHED.captures(line) {
        return from_captures(HeaderStyle::Dashed, &caps);
    }
    None
}

/// Returns `true` if the line opens a new message.
pub fn is_header(line: &str) -> bool {
    recognize_header(line).is_some()
}
