use std::io::{Read, Write};

use csv::{ReaderBuilder, Writer};
use tracing::warn;

use fluxnirv_parser::{EpicFormat, EpicRowKind};

use crate::config::EpicCleanerConfig;
use crate::error::Result;
use crate::nirv::nirv;

/// Column name of the derived index in every downstream output.
pub const DERIVED_COLUMN: &str = "NIRV";

/// Header pair written in place of the raw file's header line.
pub const OUTPUT_HEADER: [&str; 2] = ["TIMESTAMP", DERIVED_COLUMN];

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EpicCleanSummary {
    pub rows_read: usize,
    pub rows_kept: usize,
    pub header_rows: usize,
    pub dropped_missing: usize,
    pub dropped_degenerate: usize,
}

/// Streams the raw EPIC file once, emitting one (timestamp, index) pair per
/// complete row. Rows carrying the missing marker disappear silently; the
/// raw header line is replaced with the cleaned schema's own header.
pub fn clean_epic<R: Read, W: Write>(
    input: R,
    output: W,
    config: &EpicCleanerConfig,
) -> Result<EpicCleanSummary> {
    let format = EpicFormat::new(config.schema.clone());
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(input);
    let mut writer = Writer::from_writer(output);
    let mut summary = EpicCleanSummary::default();

    for (index, record) in reader.records().enumerate() {
        let record = record?;
        summary.rows_read += 1;

        match format.parse_row(&record) {
            EpicRowKind::Measurement(measurement) => {
                match nirv(measurement.band_a, measurement.band_b) {
                    Some(value) => {
                        writer.write_record(&[
                            measurement.timestamp.as_str(),
                            value.to_string().as_str(),
                        ])?;
                        summary.rows_kept += 1;
                    }
                    None => {
                        warn!(
                            line = index + 1,
                            timestamp = %measurement.timestamp,
                            "band sum is zero, dropping EPIC row"
                        );
                        summary.dropped_degenerate += 1;
                    }
                }
            }
            EpicRowKind::Missing => summary.dropped_missing += 1,
            EpicRowKind::Header => {
                writer.write_record(&OUTPUT_HEADER)?;
                summary.header_rows += 1;
            }
        }
    }

    writer.flush()?;
    Ok(summary)
}
