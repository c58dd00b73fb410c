use chrono::{Datelike, Local, NaiveDate, NaiveDateTime, Timelike};

/// Wire format shared by query parameters, projected rows and `/health`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

pub fn format_timestamp(dt: &NaiveDateTime) -> String {
    dt.format(TIMESTAMP_FORMAT).to_string()
}

/// Separator expected at each byte offset of `YYYY-MM-DD HH:MM:SS`; every
/// other offset must be an ASCII digit.
const TIMESTAMP_SHAPE: [Option<u8>; 19] = [
    None, None, None, None, Some(b'-'), None, None, Some(b'-'), None, None, Some(b' '),
    None, None, Some(b':'), None, None, Some(b':'), None, None,
];

/// Parses exactly `YYYY-MM-DD HH:MM:SS`. No padding, signs or leap seconds.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let bytes = s.as_bytes();
    if bytes.len() != TIMESTAMP_SHAPE.len() {
        return None;
    }
    let shaped = bytes
        .iter()
        .zip(TIMESTAMP_SHAPE)
        .all(|(b, sep)| match sep {
            Some(sep) => *b == sep,
            None => b.is_ascii_digit(),
        });
    if !shaped {
        return None;
    }
    NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT)
        .ok()
        .filter(|dt| dt.nanosecond() < 1_000_000_000)
}

/// Midnight on January 1 of the year `now` falls in.
pub fn start_of_year(now: NaiveDateTime) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(now.year(), 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or(now)
}
