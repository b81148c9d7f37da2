use csv::StringRecord;
use serde::Deserialize;

use crate::model::{CompactTimestamp, SiteField, SiteRecord, SiteRowKind};

use super::cells;

/// Positional layout of the raw flux-tower file: where the interval
/// timestamps and the four tracked sensor fields live.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteSchema {
    pub start_col: usize,
    pub end_col: usize,
    pub field_cols: [usize; 4],
}

impl Default for SiteSchema {
    fn default() -> Self {
        Self {
            start_col: 0,
            end_col: 1,
            field_cols: [17, 18, 34, 43],
        }
    }
}

impl SiteSchema {
    fn required_width(&self) -> usize {
        let widest = self
            .field_cols
            .iter()
            .copied()
            .fold(self.start_col.max(self.end_col), usize::max);
        widest + 1
    }

    /// The six columns that survive into the cleaned file, in output order.
    fn projection(&self) -> [usize; 6] {
        [
            self.start_col,
            self.end_col,
            self.field_cols[0],
            self.field_cols[1],
            self.field_cols[2],
            self.field_cols[3],
        ]
    }
}

#[derive(Debug, Clone, Default)]
pub struct SiteFormat {
    schema: SiteSchema,
}

impl SiteFormat {
    pub fn new(schema: SiteSchema) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> &SiteSchema {
        &self.schema
    }

    /// Classifies one raw row. Rows that are too short to hold the schema
    /// pass through as metadata; rows whose leading timestamp is non-numeric
    /// are header/metadata rows projected down to the schema columns; rows
    /// that look numeric but fail strict parsing are reported as invalid.
    pub fn parse_row(&self, record: &StringRecord) -> SiteRowKind {
        if record.len() < 2 || record.len() < self.schema.required_width() {
            return SiteRowKind::Metadata(cells(record));
        }

        let start_cell = record.get(self.schema.start_col).unwrap_or("").trim();
        if start_cell.parse::<i64>().is_err() {
            let projected = self
                .schema
                .projection()
                .iter()
                .map(|&idx| record.get(idx).unwrap_or("").to_string())
                .collect();
            return SiteRowKind::Metadata(projected);
        }

        let start = match CompactTimestamp::parse(start_cell) {
            Ok(ts) => ts,
            Err(reason) => {
                return SiteRowKind::Invalid {
                    reason: format!("start timestamp: {reason}"),
                }
            }
        };

        let end_cell = record.get(self.schema.end_col).unwrap_or("").trim();
        let end = match CompactTimestamp::parse(end_cell) {
            Ok(ts) => ts,
            Err(reason) => {
                return SiteRowKind::Invalid {
                    reason: format!("end timestamp: {reason}"),
                }
            }
        };

        let fields = match self.parse_fields(record) {
            Ok(fields) => fields,
            Err(reason) => return SiteRowKind::Invalid { reason },
        };

        SiteRowKind::Measurement(SiteRecord { start, end, fields })
    }

    fn parse_fields(&self, record: &StringRecord) -> Result<[SiteField; 4], String> {
        let [c0, c1, c2, c3] = self.schema.field_cols;
        Ok([
            parse_field(record, c0)?,
            parse_field(record, c1)?,
            parse_field(record, c2)?,
            parse_field(record, c3)?,
        ])
    }
}

fn parse_field(record: &StringRecord, col: usize) -> Result<SiteField, String> {
    let text = record.get(col).unwrap_or("").trim();
    text.parse::<f64>()
        .map(|value| SiteField {
            value,
            text: text.to_string(),
        })
        .map_err(|_| format!("column {col} is not numeric: '{text}'"))
}
