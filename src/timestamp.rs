//! Timestamp validation for both header families.
//!
//! Records expose the raw timestamp token; these routines exist so the
//! builder can tell a well-formed token from a malformed one (the
//! `MalformedTimestamp` deviation), and to back the typed convenience
//! accessor on the record.

use chrono::offset::LocalResult;
use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone};
use thiserror::Error;

#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum TimestampError {
    #[error("timestamp too short")]
    TooShort,
    #[error("invalid date")]
    InvalidDate,
    #[error("invalid time")]
    InvalidTime,
    #[error("invalid timezone offset")]
    InvalidOffset,
    #[error("second fraction too long")]
    FractionTooLong,
    #[error("trailing characters after timestamp")]
    TrailingInput,
}

fn num(bytes: &[u8], at: usize, len: usize, err: TimestampError) -> Result<u32, TimestampError> {
    let mut value = 0u32;
    for &b in bytes.get(at..at + len).ok_or(err)? {
        if !b.is_ascii_digit() {
            return Err(err);
        }
        value = value * 10 + (b - b'0') as u32;
    }
    Ok(value)
}

fn sep(bytes: &[u8], at: usize, expected: u8, err: TimestampError) -> Result<(), TimestampError> {
    if bytes[at] != expected {
        return Err(err);
    }
    Ok(())
}

/// Parse the RFC 3339 profile RFC 5424 uses for its header timestamp:
/// `YYYY-MM-DDTHH:MM:SS[.frac][Z|±HH:MM]`, fraction at most six digits,
/// offset mandatory.
pub fn parse_rfc3339(input: &str) -> Result<DateTime<FixedOffset>, TimestampError> {
    let bytes = input.as_bytes();
    // 20 is the length of `1990-12-31T23:59:59Z`
    if bytes.len() < 20 {
        return Err(TimestampError::TooShort);
    }

    let year = num(bytes, 0, 4, TimestampError::InvalidDate)? as i32;
    sep(bytes, 4, b'-', TimestampError::InvalidDate)?;
    let month = num(bytes, 5, 2, TimestampError::InvalidDate)?;
    sep(bytes, 7, b'-', TimestampError::InvalidDate)?;
    let day = num(bytes, 8, 2, TimestampError::InvalidDate)?;

    if bytes[10] != b'T' && bytes[10] != b't' {
        return Err(TimestampError::InvalidTime);
    }

    let hour = num(bytes, 11, 2, TimestampError::InvalidTime)?;
    sep(bytes, 13, b':', TimestampError::InvalidTime)?;
    let minute = num(bytes, 14, 2, TimestampError::InvalidTime)?;
    sep(bytes, 16, b':', TimestampError::InvalidTime)?;
    let second = num(bytes, 17, 2, TimestampError::InvalidTime)?;

    let mut pos = 19;
    let mut nanos = 0u32;
    if bytes.get(pos) == Some(&b'.') {
        pos += 1;
        let start = pos;
        while pos < bytes.len() && bytes[pos].is_ascii_digit() {
            pos += 1;
        }
        let count = pos - start;
        if count == 0 {
            return Err(TimestampError::InvalidTime);
        }
        // TIME-SECFRAC is at most six digits in RFC 5424
        if count > 6 {
            return Err(TimestampError::FractionTooLong);
        }
        for &b in &bytes[start..pos] {
            nanos = nanos * 10 + (b - b'0') as u32;
        }
        nanos *= 10u32.pow(9 - count as u32);
    }

    let offset_seconds = match bytes.get(pos) {
        Some(&b'Z') | Some(&b'z') => {
            pos += 1;
            0
        }
        Some(&sign_byte) if sign_byte == b'+' || sign_byte == b'-' => {
            let sign = if sign_byte == b'+' { 1 } else { -1 };
            pos += 1;
            if bytes.len() < pos + 5 {
                return Err(TimestampError::InvalidOffset);
            }
            let hours = num(bytes, pos, 2, TimestampError::InvalidOffset)? as i32;
            if bytes[pos + 2] != b':' {
                return Err(TimestampError::InvalidOffset);
            }
            let minutes = num(bytes, pos + 3, 2, TimestampError::InvalidOffset)? as i32;
            if hours > 23 || minutes > 59 {
                return Err(TimestampError::InvalidOffset);
            }
            pos += 5;
            sign * (hours * 3600 + minutes * 60)
        }
        _ => return Err(TimestampError::InvalidOffset),
    };

    if pos != bytes.len() {
        return Err(TimestampError::TrailingInput);
    }

    let offset = FixedOffset::east_opt(offset_seconds).ok_or(TimestampError::InvalidOffset)?;
    let datetime = NaiveDate::from_ymd_opt(year, month, day)
        .ok_or(TimestampError::InvalidDate)?
        .and_hms_nano_opt(hour, minute, second, nanos)
        .ok_or(TimestampError::InvalidTime)?;

    match offset.from_local_datetime(&datetime) {
        LocalResult::Single(ts) => Ok(ts),
        _ => Err(TimestampError::InvalidOffset),
    }
}

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Check the BSD header timestamp `Mmm dd hh:mm:ss`, with the optional
/// trailing year some emitters add. The grammar only guarantees the coarse
/// token shape; ranges and the month name are checked here.
pub fn valid_rfc3164(token: &str) -> bool {
    let mut parts = token.split_ascii_whitespace();

    let Some(month) = parts.next() else {
        return false;
    };
    if !MONTHS.contains(&month) {
        return false;
    }

    let Some(day) = parts.next() else {
        return false;
    };
    let Ok(day) = day.parse::<u8>() else {
        return false;
    };
    if !(1..=31).contains(&day) {
        return false;
    }

    let Some(time) = parts.next() else {
        return false;
    };
    let mut fields = time.split(':');
    for limit in [24u32, 60, 60] {
        let Some(field) = fields.next() else {
            return false;
        };
        if field.len() != 2 {
            return false;
        }
        let Ok(value) = field.parse::<u32>() else {
            return false;
        };
        if value >= limit {
            return false;
        }
    }
    if fields.next().is_some() {
        return false;
    }

    match parts.next() {
        Some(year) => year.len() == 4 && year.parse::<u16>().is_ok() && parts.next().is_none(),
        None => true,
    }
}
