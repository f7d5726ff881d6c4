//! Header time tokens.

/// Minutes in a day; valid results are `0..MINUTES_PER_DAY`.
pub const MINUTES_PER_DAY: u16 = 24 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Meridiem {
    Am,
    Pm,
}

/// Strips a trailing `AM`/`PM` marker (`pm`, `p.m.`, `P M`, ...).
fn split_meridiem(token: &str) -> (&str, Option<Meridiem>) {
    let letters: String = token
        .chars()
        .rev()
        .take_while(|c| c.is_ascii_alphabetic() || *c == '.' || c.is_whitespace())
        .filter(char::is_ascii_alphabetic)
        .collect::<String>()
        .to_ascii_lowercase();

    let meridiem = match letters.as_str() {
        // collected in reverse
        "ma" => Meridiem::Am,
        "mp" => Meridiem::Pm,
        _ => return (token, None),
    };

    let clock_end = token
        .rfind(|c: char| c.is_ascii_digit())
        .map_or(0, |i| i + 1);
    (&token[..clock_end], Some(meridiem))
}

/// Parses `H:MM` or `H:MM:SS` into hour and minute.
fn split_clock(clock: &str) -> Option<(u16, u16)> {
    let mut parts = clock.split(':');
    let hour = parts.next()?;
    let minute = parts.next()?;
    let second = parts.next();
    if parts.next().is_some() {
        return None;
    }

    let digits = |s: &str, min: usize, max: usize| {
        (min..=max).contains(&s.len()) && s.bytes().all(|b| b.is_ascii_digit())
    };
    if !digits(hour, 1, 2) || !digits(minute, 2, 2) {
        return None;
    }
    if let Some(second) = second {
        if !digits(second, 2, 2) || second > "59" {
            return None;
        }
    }

    let hour: u16 = hour.parse().ok()?;
    let minute: u16 = minute.parse().ok()?;
    (minute < 60).then_some((hour, minute))
}

/// Parses a header time token into minutes after midnight.
///
/// Accepts 24-hour `HH:MM` and 12-hour `H:MM AM|PM` (any case, space
/// before the marker optional). Seconds, when present, are ignored.
///
/// # Example
///
/// ```rust
/// use chatminutes::parsing::parse_time;
///
/// assert_eq!(parse_time("09:05"), Some(545));
/// assert_eq!(parse_time("12:00 AM"), Some(0));
/// assert_eq!(parse_time("12:00pm"), Some(720));
/// assert_eq!(parse_time("25:00"), None);
/// ```
pub fn parse_time(token: &str) -> Option<u16> {
    let (clock, meridiem) = split_meridiem(token.trim());
    let (hour, minute) = split_clock(clock.trim_end())?;

    let hour = match meridiem {
        None if hour < 24 => hour,
        Some(m) if (1..=12).contains(&hour) => match m {
            Meridiem::Am => hour % 12,
            Meridiem::Pm => hour % 12 + 12,
        },
        _ => return None,
    };

    Some(hour * 60 + minute)
}
