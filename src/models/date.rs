use std::fmt;

use chrono::{Local, NaiveDate};
use serde::{Serialize, Serializer};

use crate::errors::LogSliceError;

// ---------------------------------------------------------------------------
// Clock trait + implementations
// ---------------------------------------------------------------------------

/// Source of "today" in the server's local calendar.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Real clock backed by the local system time.
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Clock pinned to a single day, for deterministic tests.
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

// ---------------------------------------------------------------------------
// CanonicalDate
// ---------------------------------------------------------------------------

/// A validated request date, rendered as `YYYY-MM-DD`.
///
/// Only [`normalize`] produces one, so holding a `CanonicalDate` means the
/// date was well-formed, real, and not in the future when it was accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CanonicalDate(NaiveDate);

impl CanonicalDate {
    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// File name of the per-date artifact: `application-YYYY-MM-DD.log`.
    pub fn artifact_file_name(&self) -> String {
        format!("application-{}.log", self)
    }
}

impl fmt::Display for CanonicalDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl Serialize for CanonicalDate {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

// ---------------------------------------------------------------------------
// Normalizer / validator
// ---------------------------------------------------------------------------

/// Convert an external `DD-MM-YYYY` string into a [`CanonicalDate`].
///
/// Rejects anything that is not exactly two digits, dash, two digits, dash,
/// four digits; components that do not form a real calendar date; and dates
/// strictly after `today`.
pub fn normalize(raw: &str, today: NaiveDate) -> Result<CanonicalDate, LogSliceError> {
    let bytes = raw.as_bytes();
    let well_formed = bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            2 | 5 => *b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !well_formed {
        return Err(LogSliceError::Validation(format!(
            "Date '{}' must match the format DD-MM-YYYY",
            raw
        )));
    }

    let date = NaiveDate::parse_from_str(raw, "%d-%m-%Y").map_err(|_| {
        LogSliceError::Validation(format!("Date '{}' is not a valid calendar date", raw))
    })?;

    if date > today {
        return Err(LogSliceError::Validation(format!(
            "Date '{}' is in the future",
            raw
        )));
    }

    Ok(CanonicalDate(date))
}
