// src/data/datetime.rs

//! Functions to transform the producer's compact 14-digit timestamps
//! (`YYYYMMDDhhmmss`, no separators) to and from chrono [`NaiveDateTime`].
//!
//! The producer writes local wall-clock time without any timezone offset, so
//! a timestamp is a [`DateTimeL`] (a `NaiveDateTime`), never a
//! `DateTime<Tz>`.
//!
//! The same format names data files, e.g. `20230101120000.lgp` is the data
//! file whose first record is at or after `2023-01-01 12:00:00`.
//!
//! [`NaiveDateTime`]: https://docs.rs/chrono/0.4.40/chrono/struct.NaiveDateTime.html

#[doc(hidden)]
pub use std::time::SystemTime;

#[doc(hidden)]
pub use ::chrono::{
    Datelike,
    NaiveDate,
    NaiveDateTime,
    Timelike,
};
#[allow(unused_imports)]
use ::si_trace_print::{
    defn,
    defo,
    defx,
    defñ,
};

/// The local datetime of an event log record.
pub type DateTimeL = NaiveDateTime;
/// Optional [`DateTimeL`].
pub type DateTimeLOpt = Option<DateTimeL>;

/// Number of digits of a compact timestamp, `YYYYMMDDhhmmss`.
pub const TIMESTAMP_LEN: usize = 14;

/// `strftime` pattern of a compact timestamp.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// Sum `digits` as a base-10 number.
///
/// Caller must have checked every byte is an ASCII digit.
#[inline(always)]
fn digits_to_u32(digits: &[u8]) -> u32 {
    digits
        .iter()
        .fold(0, |acc, b| acc * 10 + (b - b'0') as u32)
}

/// Parse exactly 14 ASCII digits `YYYYMMDDhhmmss` into a [`DateTimeL`].
///
/// Returns `None` for any other length, any non-digit byte, or any
/// out-of-range calendar or clock component (e.g. month `13`).
pub fn timestamp_from_bytes(bytes: &[u8]) -> DateTimeLOpt {
    if bytes.len() != TIMESTAMP_LEN
        || !bytes.iter().all(u8::is_ascii_digit)
    {
        return None;
    }
    let year = digits_to_u32(&bytes[0..4]) as i32;
    let month = digits_to_u32(&bytes[4..6]);
    let day = digits_to_u32(&bytes[6..8]);
    let hour = digits_to_u32(&bytes[8..10]);
    let minute = digits_to_u32(&bytes[10..12]);
    let second = digits_to_u32(&bytes[12..14]);

    NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, minute, second)
}

/// `str` version of [`timestamp_from_bytes`].
#[inline(always)]
pub fn timestamp_from_str(s: &str) -> DateTimeLOpt {
    timestamp_from_bytes(s.as_bytes())
}

/// Write the compact 14-digit form of `dt`.
pub fn timestamp_to_string(dt: &DateTimeL) -> String {
    dt.format(TIMESTAMP_FORMAT).to_string()
}

/// Convert a file-system [`SystemTime`] to nanoseconds since the Unix epoch.
///
/// Times before the epoch (broken clocks, odd file systems) become `0`,
/// times beyond `u64::MAX` nanoseconds (year 2554) become `u64::MAX`.
pub fn systemtime_to_nanos(systemtime: &SystemTime) -> u64 {
    match systemtime.duration_since(SystemTime::UNIX_EPOCH) {
        Ok(duration) => u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX),
        Err(_err) => {
            defñ!("systemtime before UNIX_EPOCH {:?}", _err);
            0
        }
    }
}
