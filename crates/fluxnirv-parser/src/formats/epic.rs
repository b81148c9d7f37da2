use csv::StringRecord;
use serde::Deserialize;

use crate::model::{EpicRecord, EpicRowKind};

/// Positional layout of the raw EPIC file: five date-part columns and the
/// two spectral bands the derived index is computed from.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EpicSchema {
    pub year_col: usize,
    pub month_col: usize,
    pub day_col: usize,
    pub hour_col: usize,
    pub minute_col: usize,
    pub band_a_col: usize,
    pub band_b_col: usize,
}

impl Default for EpicSchema {
    fn default() -> Self {
        Self {
            year_col: 0,
            month_col: 1,
            day_col: 2,
            hour_col: 3,
            minute_col: 4,
            band_a_col: 7,
            band_b_col: 8,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct EpicFormat {
    schema: EpicSchema,
}

impl EpicFormat {
    /// Literal marker the instrument writes for a missing value.
    pub const MISSING_MARKER: &'static str = "NaN";

    pub fn new(schema: EpicSchema) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> &EpicSchema {
        &self.schema
    }

    /// Classifies one raw row. Any cell equal to the missing marker discards
    /// the whole row; rows that fail numeric conversion without carrying the
    /// marker are the file's header line.
    pub fn parse_row(&self, record: &StringRecord) -> EpicRowKind {
        if record.iter().any(|cell| cell == Self::MISSING_MARKER) {
            return EpicRowKind::Missing;
        }

        let Some(timestamp) = self.timestamp(record) else {
            return EpicRowKind::Header;
        };
        let Some(band_a) = parse_band(record, self.schema.band_a_col) else {
            return EpicRowKind::Header;
        };
        let Some(band_b) = parse_band(record, self.schema.band_b_col) else {
            return EpicRowKind::Header;
        };

        EpicRowKind::Measurement(EpicRecord {
            timestamp,
            band_a,
            band_b,
        })
    }

    /// Assembles the 12-digit key: unpadded year, two-digit month, day, hour
    /// and minute.
    fn timestamp(&self, record: &StringRecord) -> Option<String> {
        let year: i32 = cell(record, self.schema.year_col)?.parse().ok()?;
        let month: u32 = cell(record, self.schema.month_col)?.parse().ok()?;
        let day: u32 = cell(record, self.schema.day_col)?.parse().ok()?;
        let hour: u32 = cell(record, self.schema.hour_col)?.parse().ok()?;
        let minute: u32 = cell(record, self.schema.minute_col)?.parse().ok()?;
        Some(format!("{year}{month:02}{day:02}{hour:02}{minute:02}"))
    }
}

fn cell(record: &StringRecord, col: usize) -> Option<&str> {
    record.get(col).map(str::trim)
}

fn parse_band(record: &StringRecord, col: usize) -> Option<f64> {
    cell(record, col)?.parse().ok()
}
