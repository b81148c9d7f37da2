use std::io::{Read, Write};

use csv::{ReaderBuilder, WriterBuilder};
use tracing::warn;

use fluxnirv_parser::{SiteFormat, SiteRecord, SiteRowKind};

use crate::config::SiteCleanerConfig;
use crate::error::Result;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SiteCleanSummary {
    pub rows_read: usize,
    pub rows_kept: usize,
    pub passthrough_rows: usize,
    pub dropped_before_cutoff: usize,
    pub dropped_sentinel: usize,
    pub dropped_invalid: usize,
}

/// Outcome of cleaning one classified row.
#[derive(Debug, Clone, PartialEq)]
pub enum SiteRowOutcome {
    /// Shifted timestamps plus the four tracked cells, ready to write.
    Clean([String; 6]),
    Passthrough(Vec<String>),
    BeforeCutoff,
    Sentinel,
    Invalid(String),
}

pub fn clean_row(kind: SiteRowKind, config: &SiteCleanerConfig) -> SiteRowOutcome {
    match kind {
        SiteRowKind::Measurement(record) => clean_measurement(record, config),
        SiteRowKind::Metadata(cells) => SiteRowOutcome::Passthrough(cells),
        SiteRowKind::Invalid { reason } => SiteRowOutcome::Invalid(reason),
    }
}

fn clean_measurement(record: SiteRecord, config: &SiteCleanerConfig) -> SiteRowOutcome {
    if record.start.numeric() < config.cutoff {
        return SiteRowOutcome::BeforeCutoff;
    }
    if record
        .fields
        .iter()
        .any(|field| field.value == config.sentinel)
    {
        return SiteRowOutcome::Sentinel;
    }

    let start = record.start.shift_hours(config.utc_offset_hours);
    let end = record.end.shift_hours(config.utc_offset_hours);
    let [f0, f1, f2, f3] = record.fields;

    SiteRowOutcome::Clean([
        start.to_string(),
        end.to_string(),
        f0.text,
        f1.text,
        f2.text,
        f3.text,
    ])
}

/// Streams the raw site file once, writing cleaned measurement rows and
/// pass-through metadata rows in their original order. Rows failing the
/// cutoff or sentinel filters are dropped; corrupt rows are dropped with a
/// warning instead of being mistaken for metadata.
pub fn clean_site<R: Read, W: Write>(
    input: R,
    output: W,
    config: &SiteCleanerConfig,
) -> Result<SiteCleanSummary> {
    let format = SiteFormat::new(config.schema.clone());
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(input);
    let mut writer = WriterBuilder::new().flexible(true).from_writer(output);
    let mut summary = SiteCleanSummary::default();

    for (index, record) in reader.records().enumerate() {
        let record = record?;
        summary.rows_read += 1;

        match clean_row(format.parse_row(&record), config) {
            SiteRowOutcome::Clean(cells) => {
                writer.write_record(&cells)?;
                summary.rows_kept += 1;
            }
            SiteRowOutcome::Passthrough(cells) => {
                writer.write_record(&cells)?;
                summary.passthrough_rows += 1;
            }
            SiteRowOutcome::BeforeCutoff => summary.dropped_before_cutoff += 1,
            SiteRowOutcome::Sentinel => summary.dropped_sentinel += 1,
            SiteRowOutcome::Invalid(reason) => {
                warn!(line = index + 1, %reason, "dropping corrupt site row");
                summary.dropped_invalid += 1;
            }
        }
    }

    writer.flush()?;
    Ok(summary)
}
