use std::io::{Read, Write};

use csv::{ReaderBuilder, WriterBuilder};

use crate::epic_cleaner::DERIVED_COLUMN;
use crate::error::{PipelineError, Result};
use crate::merge::{merge_into, EpicPoint, MergeSummary, SiteInterval, DERIVED_INSERT_POSITION};

/// Joins the two cleaned files into the final dataset: the site file's two
/// leading metadata lines verbatim, its column-name line with the derived
/// index name inserted, then one merged row per matched point/interval pair.
///
/// The cleaned site input is expected to carry its three-line header block;
/// the cleaned EPIC input leads with its substituted header line, which is
/// consumed here.
pub fn assemble<SR, ER, W>(site_input: SR, epic_input: ER, output: W) -> Result<MergeSummary>
where
    SR: Read,
    ER: Read,
    W: Write,
{
    let site_reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(site_input);
    let epic_reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(epic_input);
    let mut writer = WriterBuilder::new().flexible(true).from_writer(output);

    let mut site_records = site_reader.into_records();
    let mut epic_records = epic_reader.into_records();

    if epic_records.next().transpose()?.is_none() {
        return Err(PipelineError::Processing(
            "cleaned EPIC data is empty".into(),
        ));
    }

    for _ in 0..2 {
        let record = site_records.next().transpose()?.ok_or_else(|| {
            PipelineError::Processing("cleaned site data is missing its header block".into())
        })?;
        writer.write_record(&record)?;
    }

    let names = site_records.next().transpose()?.ok_or_else(|| {
        PipelineError::Processing("cleaned site data is missing its column-name row".into())
    })?;
    let mut names: Vec<String> = names.iter().map(str::to_string).collect();
    let insert_at = DERIVED_INSERT_POSITION.min(names.len());
    names.insert(insert_at, DERIVED_COLUMN.to_string());
    writer.write_record(&names)?;

    // data begins on line 4 of the site file and line 2 of the EPIC file
    let site_intervals = site_records.enumerate().map(|(index, record)| {
        let record = record?;
        SiteInterval::from_cells(record.iter().map(str::to_string).collect(), index + 4)
    });
    let epic_points = epic_records.enumerate().map(|(index, record)| {
        let record = record?;
        let cells: Vec<String> = record.iter().map(str::to_string).collect();
        EpicPoint::from_cells(&cells, index + 2)
    });

    let summary = merge_into(site_intervals, epic_points, &mut writer)?;
    writer.flush()?;
    Ok(summary)
}
