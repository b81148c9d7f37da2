use std::fs::File;
use std::io::{BufReader, BufWriter};

use tracing::info;

use crate::assembler::assemble;
use crate::config::PipelineConfig;
use crate::epic_cleaner::{clean_epic, EpicCleanSummary};
use crate::error::Result;
use crate::merge::MergeSummary;
use crate::site_cleaner::{clean_site, SiteCleanSummary};

#[derive(Debug, Clone)]
pub struct PipelineSummary {
    pub site: SiteCleanSummary,
    pub epic: EpicCleanSummary,
    pub merge: MergeSummary,
}

pub fn clean_site_stage(config: &PipelineConfig) -> Result<SiteCleanSummary> {
    let input = BufReader::new(File::open(&config.paths.site_raw)?);
    let output = BufWriter::new(File::create(&config.paths.clean_site)?);
    let summary = clean_site(input, output, &config.site)?;
    info!(
        rows_read = summary.rows_read,
        rows_kept = summary.rows_kept,
        passthrough = summary.passthrough_rows,
        dropped_before_cutoff = summary.dropped_before_cutoff,
        dropped_sentinel = summary.dropped_sentinel,
        dropped_invalid = summary.dropped_invalid,
        "site cleaning finished"
    );
    Ok(summary)
}

pub fn clean_epic_stage(config: &PipelineConfig) -> Result<EpicCleanSummary> {
    let input = BufReader::new(File::open(&config.paths.epic_raw)?);
    let output = BufWriter::new(File::create(&config.paths.clean_epic)?);
    let summary = clean_epic(input, output, &config.epic)?;
    info!(
        rows_read = summary.rows_read,
        rows_kept = summary.rows_kept,
        dropped_missing = summary.dropped_missing,
        dropped_degenerate = summary.dropped_degenerate,
        "EPIC cleaning finished"
    );
    Ok(summary)
}

pub fn assemble_stage(config: &PipelineConfig) -> Result<MergeSummary> {
    let site = BufReader::new(File::open(&config.paths.clean_site)?);
    let epic = BufReader::new(File::open(&config.paths.clean_epic)?);
    let output = BufWriter::new(File::create(&config.paths.dataset)?);
    let summary = assemble(site, epic, output)?;
    info!(
        merged_rows = summary.merged_rows,
        unmatched_points = summary.unmatched_points,
        unmatched_intervals = summary.unmatched_intervals,
        "dataset assembly finished"
    );
    Ok(summary)
}

/// Runs the three data stages in order. Each stage streams its files to
/// completion and closes them before the next stage begins; any failure
/// aborts the run immediately.
pub fn run(config: &PipelineConfig) -> Result<PipelineSummary> {
    let site = clean_site_stage(config)?;
    let epic = clean_epic_stage(config)?;
    let merge = assemble_stage(config)?;
    Ok(PipelineSummary { site, epic, merge })
}
