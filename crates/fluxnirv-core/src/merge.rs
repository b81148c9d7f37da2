use std::io::Write;

use csv::Writer;

use crate::error::{PipelineError, Result};

/// Where the derived index lands in merged rows and in the column-name
/// header: spliced in before the final tracked field.
pub const DERIVED_INSERT_POSITION: usize = 5;

/// The three transitions of the two-cursor merge. Exactly one cursor
/// advances per step except on a match, where both do, so the scan finishes
/// in at most n + m steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeStep {
    /// The point falls inside the interval: emit a merged row, advance both.
    MatchBoth,
    /// The point precedes the interval and can never match: advance it away.
    SkipEpic,
    /// The interval ends before the point: no remaining point can match it.
    SkipSite,
}

/// Classifies one cursor pair. Interval bounds are inclusive at both ends;
/// when an interval's end touches the next interval's start, the earlier
/// interval wins because the matched point is consumed with it.
pub fn step(point: i64, start: i64, end: i64) -> MergeStep {
    if point >= start && point <= end {
        MergeStep::MatchBoth
    } else if point < start {
        MergeStep::SkipEpic
    } else {
        MergeStep::SkipSite
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SiteInterval {
    pub start: i64,
    pub end: i64,
    /// The six cleaned cells in file order (start, end, four fields).
    pub cells: Vec<String>,
}

impl SiteInterval {
    pub fn from_cells(cells: Vec<String>, line: usize) -> Result<Self> {
        let start = parse_key(&cells, 0, "site interval", line)?;
        let end = parse_key(&cells, 1, "site interval", line)?;
        Ok(Self { start, end, cells })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EpicPoint {
    pub timestamp: i64,
    /// The derived-index cell, carried through verbatim.
    pub value: String,
}

impl EpicPoint {
    pub fn from_cells(cells: &[String], line: usize) -> Result<Self> {
        let timestamp = parse_key(cells, 0, "EPIC point", line)?;
        let value = cells.get(1).cloned().unwrap_or_default();
        Ok(Self { timestamp, value })
    }
}

fn parse_key(cells: &[String], index: usize, stage: &'static str, line: usize) -> Result<i64> {
    let cell = cells.get(index).map(String::as_str).unwrap_or("");
    cell.trim()
        .parse::<i64>()
        .map_err(|_| PipelineError::Timestamp {
            stage,
            line,
            value: cell.to_string(),
        })
}

#[derive(Debug, Clone, PartialEq)]
pub struct MergedRecord {
    pub cells: Vec<String>,
}

fn combine(interval: &SiteInterval, point: &EpicPoint) -> MergedRecord {
    let split = DERIVED_INSERT_POSITION.min(interval.cells.len());
    let mut cells = Vec::with_capacity(interval.cells.len() + 1);
    cells.extend(interval.cells.iter().take(split).cloned());
    cells.push(point.value.clone());
    cells.extend(interval.cells.iter().skip(split).cloned());
    MergedRecord { cells }
}

/// Sorted two-pointer join of point-in-time records against interval
/// records. Both inputs must already be ascending by their timestamp keys;
/// the merger never re-sorts or backtracks. Once either input is exhausted
/// the remainder of the other is silently dropped.
pub struct IntervalMerger<S, E> {
    site: S,
    epic: E,
    current_interval: Option<SiteInterval>,
    current_point: Option<EpicPoint>,
    skipped_points: usize,
    skipped_intervals: usize,
    done: bool,
}

impl<S, E> IntervalMerger<S, E>
where
    S: Iterator<Item = Result<SiteInterval>>,
    E: Iterator<Item = Result<EpicPoint>>,
{
    pub fn new(site: S, epic: E) -> Self {
        Self {
            site,
            epic,
            current_interval: None,
            current_point: None,
            skipped_points: 0,
            skipped_intervals: 0,
            done: false,
        }
    }

    /// Points dropped because they fell before (or between) intervals.
    pub fn skipped_points(&self) -> usize {
        self.skipped_points
    }

    /// Intervals dropped because no point fell inside them.
    pub fn skipped_intervals(&self) -> usize {
        self.skipped_intervals
    }
}

impl<S, E> Iterator for IntervalMerger<S, E>
where
    S: Iterator<Item = Result<SiteInterval>>,
    E: Iterator<Item = Result<EpicPoint>>,
{
    type Item = Result<MergedRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        loop {
            if self.current_interval.is_none() {
                match self.site.next() {
                    Some(Ok(interval)) => self.current_interval = Some(interval),
                    Some(Err(err)) => {
                        self.done = true;
                        return Some(Err(err));
                    }
                    None => {
                        self.done = true;
                        return None;
                    }
                }
            }
            if self.current_point.is_none() {
                match self.epic.next() {
                    Some(Ok(point)) => self.current_point = Some(point),
                    Some(Err(err)) => {
                        self.done = true;
                        return Some(Err(err));
                    }
                    None => {
                        self.done = true;
                        return None;
                    }
                }
            }

            let decision = match (&self.current_interval, &self.current_point) {
                (Some(interval), Some(point)) => {
                    step(point.timestamp, interval.start, interval.end)
                }
                _ => {
                    self.done = true;
                    return None;
                }
            };

            match decision {
                MergeStep::MatchBoth => {
                    let interval = self.current_interval.take();
                    let point = self.current_point.take();
                    if let (Some(interval), Some(point)) = (interval, point) {
                        return Some(Ok(combine(&interval, &point)));
                    }
                }
                MergeStep::SkipEpic => {
                    self.current_point = None;
                    self.skipped_points += 1;
                }
                MergeStep::SkipSite => {
                    self.current_interval = None;
                    self.skipped_intervals += 1;
                }
            }
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MergeSummary {
    pub merged_rows: usize,
    pub unmatched_points: usize,
    pub unmatched_intervals: usize,
}

/// Drives the merger to exhaustion, writing each merged row.
pub fn merge_into<S, E, W>(site: S, epic: E, writer: &mut Writer<W>) -> Result<MergeSummary>
where
    S: Iterator<Item = Result<SiteInterval>>,
    E: Iterator<Item = Result<EpicPoint>>,
    W: Write,
{
    let mut merger = IntervalMerger::new(site, epic);
    let mut merged_rows = 0usize;

    for record in merger.by_ref() {
        let record = record?;
        writer.write_record(&record.cells)?;
        merged_rows += 1;
    }

    Ok(MergeSummary {
        merged_rows,
        unmatched_points: merger.skipped_points(),
        unmatched_intervals: merger.skipped_intervals(),
    })
}
