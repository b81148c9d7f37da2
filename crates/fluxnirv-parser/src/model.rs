use std::fmt;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Timelike};

/// A wall-clock minute in the compact `YYYYMMDDHHmm` encoding used by both
/// sensor logs. The year is written unpadded; month, day, hour and minute are
/// always zero-padded to two digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CompactTimestamp(NaiveDateTime);

impl CompactTimestamp {
    pub fn parse(value: &str) -> Result<Self, String> {
        let trimmed = value.trim();
        if trimmed.len() != 12 || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(format!("expected 12-digit timestamp, got '{trimmed}'"));
        }

        let year: i32 = trimmed[0..4]
            .parse()
            .map_err(|_| format!("invalid year in '{trimmed}'"))?;
        let month: u32 = trimmed[4..6]
            .parse()
            .map_err(|_| format!("invalid month in '{trimmed}'"))?;
        let day: u32 = trimmed[6..8]
            .parse()
            .map_err(|_| format!("invalid day in '{trimmed}'"))?;
        let hour: u32 = trimmed[8..10]
            .parse()
            .map_err(|_| format!("invalid hour in '{trimmed}'"))?;
        let minute: u32 = trimmed[10..12]
            .parse()
            .map_err(|_| format!("invalid minute in '{trimmed}'"))?;

        Self::from_parts(year, month, day, hour, minute)
            .ok_or_else(|| format!("'{trimmed}' is not a valid calendar timestamp"))
    }

    pub fn from_parts(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|date| date.and_hms_opt(hour, minute, 0))
            .map(Self)
    }

    pub fn datetime(&self) -> NaiveDateTime {
        self.0
    }

    /// Shifts the timestamp by a whole number of hours (the site logs carry a
    /// fixed timezone correction).
    pub fn shift_hours(&self, hours: i64) -> Self {
        Self(self.0 + Duration::hours(hours))
    }

    /// The 12-digit integer form used for ordering and interval comparison.
    pub fn numeric(&self) -> i64 {
        let dt = self.0;
        i64::from(dt.year()) * 100_000_000
            + i64::from(dt.month()) * 1_000_000
            + i64::from(dt.day()) * 10_000
            + i64::from(dt.hour()) * 100
            + i64::from(dt.minute())
    }
}

impl fmt::Display for CompactTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dt = self.0;
        write!(
            f,
            "{}{:02}{:02}{:02}{:02}",
            dt.year(),
            dt.month(),
            dt.day(),
            dt.hour(),
            dt.minute()
        )
    }
}

impl TryFrom<&str> for CompactTimestamp {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        CompactTimestamp::parse(value)
    }
}

/// One tracked site measurement cell. The parsed value drives filtering; the
/// original text is what gets written through to the cleaned output.
#[derive(Debug, Clone, PartialEq)]
pub struct SiteField {
    pub value: f64,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SiteRecord {
    pub start: CompactTimestamp,
    pub end: CompactTimestamp,
    pub fields: [SiteField; 4],
}

/// Classification of one raw site row. Header and metadata rows are values,
/// not errors; `Invalid` marks rows whose timestamps look numeric but whose
/// content is corrupt, so they can be dropped loudly instead of masquerading
/// as metadata.
#[derive(Debug, Clone, PartialEq)]
pub enum SiteRowKind {
    Measurement(SiteRecord),
    Metadata(Vec<String>),
    Invalid { reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct EpicRecord {
    /// 12-digit `YYYYMMDDHHmm` key assembled from the five date-part columns.
    pub timestamp: String,
    pub band_a: f64,
    pub band_b: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EpicRowKind {
    Measurement(EpicRecord),
    /// At least one cell carried the literal missing marker `NaN`.
    Missing,
    /// Non-numeric row without missing markers (the file's header line).
    Header,
}
