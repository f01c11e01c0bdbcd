use super::types::{ClockTime, Interval, ShiftCell, CLOSED_SENTINEL};

/// Reads the leading run of ASCII digits, ignoring surrounding whitespace.
/// `"09:30"` gives 9, `"38h"` gives 38, `"ferie"` gives None.
pub fn leading_int(text: &str) -> Option<i32> {
    let trimmed = text.trim();
    let digits: String = trimmed.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}

pub fn contains_digit(text: &str) -> bool {
    text.chars().any(|c| c.is_ascii_digit())
}

/// True for the closed-store marker, in either language
pub fn is_closed_marker(text: &str) -> bool {
    let trimmed = text.trim();
    trimmed.eq_ignore_ascii_case(CLOSED_SENTINEL) || trimmed.eq_ignore_ascii_case("closed")
}

/// Parses `HH:MM` or a bare `HH`
pub fn parse_clock(text: &str) -> Option<ClockTime> {
    let trimmed = text.trim();
    let (hours, minutes) = match trimmed.split_once(':') {
        Some((h, m)) => (h, m),
        None => (trimmed, "0"),
    };
    if hours.is_empty() || !hours.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    if minutes.is_empty() || !minutes.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let hour: u32 = hours.parse().ok()?;
    let minute: u32 = minutes.parse().ok()?;
    if hour > 24 || minute >= 60 {
        return None;
    }
    Some(ClockTime { hour, minute })
}

/// Parses one `HH:MM - HH:MM` segment. The end hour may not precede the start hour.
pub fn parse_interval(text: &str) -> Option<Interval> {
    let (start, end) = text.split_once('-')?;
    let start = parse_clock(start)?;
    let end = parse_clock(end)?;
    if end.hour < start.hour {
        return None;
    }
    Some(Interval { start, end })
}

/// Parses a `/`-joined list of ranges; every segment must be valid
pub fn parse_shift(text: &str) -> Option<Vec<Interval>> {
    let shift: Option<Vec<Interval>> = text.split('/').map(parse_interval).collect();
    shift.filter(|s| !s.is_empty())
}

/// Converts a legacy grid string into a cell
pub fn parse_cell(text: &str) -> ShiftCell {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        ShiftCell::Unset
    } else if is_closed_marker(trimmed) {
        ShiftCell::Closed
    } else if let Some(shift) = parse_shift(trimmed) {
        ShiftCell::Worked(shift)
    } else {
        ShiftCell::Locked(text.to_string())
    }
}

/// Lenient hour count for arbitrary text: sums every `/` segment that has a
/// `-` with a number on each side. Anything else contributes nothing.
pub fn legacy_duration(text: &str) -> i32 {
    text.split('/')
        .filter_map(|segment| {
            let (start, end) = segment.split_once('-')?;
            let start = leading_int(start)?;
            let end = leading_int(end)?;
            Some((end - start).max(0))
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_shift_is_eight_hours_not_twelve() {
        let cell = parse_cell("09:00 - 13:00 / 17:00 - 21:00");
        assert_eq!(cell.duration(), 8);
    }

    #[test]
    fn minutes_are_dropped_from_durations() {
        let cell = parse_cell("09:30 - 13:45");
        assert_eq!(cell.duration(), 4);
        // the text itself is preserved
        assert_eq!(cell.to_string(), "09:30 - 13:45");
    }

    #[test]
    fn compact_ranges_parse() {
        assert_eq!(parse_shift("9-13"), Some(vec![Interval::hours(9, 13)]));
    }

    #[test]
    fn malformed_ranges_become_locked_text() {
        assert_eq!(parse_cell("13:00 - 09:00"), ShiftCell::Locked("13:00 - 09:00".to_string()));
        assert_eq!(parse_cell("ferie"), ShiftCell::Locked("ferie".to_string()));
        assert_eq!(parse_cell("  "), ShiftCell::Unset);
        assert_eq!(parse_cell("Chiuso"), ShiftCell::Closed);
    }

    #[test]
    fn legacy_duration_tolerates_junk() {
        assert_eq!(legacy_duration("ROL 9-13"), 0);
        assert_eq!(legacy_duration("9-13 / x"), 4);
        assert_eq!(legacy_duration("permesso"), 0);
    }

    #[test]
    fn leading_int_reads_prefix_only() {
        assert_eq!(leading_int(" 09:30"), Some(9));
        assert_eq!(leading_int("abc"), None);
    }
}
