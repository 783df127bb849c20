//! Timestamp parsing for recording file names.
//!
//! Names look like `2025-06-17-14-50-00.fit`. Parsing fails closed: anything
//! that is not exactly six zero-padded fields describing a real calendar
//! date and time is rejected instead of being coerced into an epoch value.

use chrono::{Local, NaiveDateTime, TimeZone};

use crate::model::{TimestampedFile, ZonePolicy};

/// `strftime` layout of the embedded timestamp.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d-%H-%M-%S";

const TIMESTAMP_LEN: usize = 19;
const DELIMITER_POSITIONS: [usize; 5] = [4, 7, 10, 13, 16];

/// Why a file name did not yield a timestamp.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimestampError {
    #[error("name does not end in .{extension}")]
    WrongExtension { extension: String },

    #[error("'{raw}' is not of the form YYYY-MM-DD-HH-MM-SS")]
    Malformed { raw: String },

    #[error("'{raw}' is not a valid calendar date/time")]
    OutOfRange { raw: String },

    #[error("'{raw}' does not exist in the local time zone (DST gap)")]
    NonexistentLocalTime { raw: String },
}

/// Strip a case-insensitive `.<extension>` suffix, returning the stem.
pub fn strip_extension<'a>(filename: &'a str, extension: &str) -> Option<&'a str> {
    let (stem, suffix) = filename.rsplit_once('.')?;
    (!stem.is_empty() && suffix.eq_ignore_ascii_case(extension)).then_some(stem)
}

/// Convert a raw `YYYY-MM-DD-HH-MM-SS` string to epoch seconds.
pub fn parse_timestamp(raw: &str, zone: ZonePolicy) -> Result<i64, TimestampError> {
    if !has_timestamp_shape(raw) {
        return Err(TimestampError::Malformed {
            raw: raw.to_string(),
        });
    }

    // chrono accepts second 60 as a leap second; recordings never carry one.
    if raw.as_bytes()[17] > b'5' {
        return Err(TimestampError::OutOfRange {
            raw: raw.to_string(),
        });
    }

    let naive = NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT).map_err(|_| {
        TimestampError::OutOfRange {
            raw: raw.to_string(),
        }
    })?;

    match zone {
        ZonePolicy::Utc => Ok(naive.and_utc().timestamp()),
        ZonePolicy::Local => Local
            .from_local_datetime(&naive)
            .earliest()
            .map(|dt| dt.timestamp())
            .ok_or_else(|| TimestampError::NonexistentLocalTime {
                raw: raw.to_string(),
            }),
    }
}

/// Parse a directory entry name into a [`TimestampedFile`].
pub fn parse_filename(
    filename: &str,
    extension: &str,
    zone: ZonePolicy,
) -> Result<TimestampedFile, TimestampError> {
    let raw = strip_extension(filename, extension).ok_or_else(|| {
        TimestampError::WrongExtension {
            extension: extension.to_string(),
        }
    })?;
    let epoch_seconds = parse_timestamp(raw, zone)?;
    Ok(TimestampedFile {
        filename: filename.to_string(),
        timestamp_raw: raw.to_string(),
        epoch_seconds,
    })
}

fn has_timestamp_shape(raw: &str) -> bool {
    raw.len() == TIMESTAMP_LEN
        && raw.bytes().enumerate().all(|(i, b)| {
            if DELIMITER_POSITIONS.contains(&i) {
                b == b'-'
            } else {
                b.is_ascii_digit()
            }
        })
}
