//! Run of homozygosity (ROH) detection
//!
//! A single pass over a file sorted by chromosome and position. Homozygous
//! calls extend the current run; a heterozygous call either breaks it or,
//! when it is far enough from the previous heterozygous call, is folded in
//! as a tolerated exception. Runs are reported when they are long enough,
//! with a lower bar for stretches of no-calls.

use crate::{
    raw::RawReader, Chromosome, Genotype, RohConfig, SnpKitError, SnpKitResult, SnpRecord, Vendor,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Read;
use std::path::Path;

/// Candidate run being accumulated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Run {
    pub chromosome: Chromosome,
    pub start_position: u64,
    pub last_position: u64,
    /// Positions folded in so far, tolerated heterozygous calls included
    pub length: u64,
    /// Starts at -1 and is incremented for every tolerated heterozygous call
    pub heterozygous_count: i64,
    /// Run length at the most recent tolerated heterozygous call
    pub last_heterozygous_offset: u64,
    pub current_genotype: Genotype,
}

impl Run {
    fn start(record: &SnpRecord) -> Self {
        Run {
            chromosome: record.chromosome,
            start_position: record.position,
            last_position: record.position,
            length: 0,
            heterozygous_count: -1,
            last_heterozygous_offset: 0,
            current_genotype: record.genotype,
        }
    }

    fn add_homozygous(&mut self, record: &SnpRecord) {
        self.current_genotype = record.genotype;
        self.last_position = record.position;
        self.length += 1;
    }

    fn add_tolerated(&mut self, record: &SnpRecord) {
        self.last_position = record.position;
        self.length += 1;
        self.last_heterozygous_offset = self.length;
        self.heterozygous_count += 1;
    }

    /// SNPs since the last heterozygous call if `record` were added
    fn heterozygous_gap(&self) -> u64 {
        (self.length + 1) - self.last_heterozygous_offset
    }

    fn is_no_call(&self) -> bool {
        self.current_genotype.is_no_call()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RunState {
    #[default]
    Idle,
    InRun(Run),
}

/// State after one record plus the run it completed, if any
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub state: RunState,
    pub report: Option<RunReport>,
}

/// A completed run that met the reporting thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub chromosome: Chromosome,
    pub length: u64,
    pub start_position: u64,
    pub end_position: u64,
    pub no_call: bool,
    pub heterozygous_count: Option<u64>,
}

impl RunReport {
    pub fn span_mb(&self) -> f64 {
        (self.end_position as f64 - self.start_position as f64) / 1_000_000.0
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} has a ROH of length {} from position {} to position {} ({:.2} Mb)",
            self.chromosome.report_label(),
            self.length,
            self.start_position,
            self.end_position,
            self.span_mb()
        )?;
        if let Some(count) = self.heterozygous_count {
            write!(f, "\t({} heterozygous SNPs treated as homozygous)", count)?;
        }
        Ok(())
    }
}

/// Apply the reporting thresholds to a finished run
pub fn close_run(run: Run, config: &RohConfig) -> Option<RunReport> {
    let long_no_call_run = run.is_no_call() && run.length > config.no_call_threshold;
    if !long_no_call_run && run.length <= config.length_threshold {
        log::trace!(
            "Discarding run of length {} on {} at {}",
            run.length,
            run.chromosome,
            run.start_position
        );
        return None;
    }

    Some(RunReport {
        chromosome: run.chromosome,
        length: run.length,
        start_position: run.start_position,
        end_position: run.last_position,
        no_call: run.is_no_call(),
        heterozygous_count: (run.heterozygous_count > 0).then_some(run.heterozygous_count as u64),
    })
}

/// Whether `record` ends the run before being looked at on its own
fn breaks_before(run: &Run, record: &SnpRecord, config: &RohConfig) -> bool {
    if run.chromosome != record.chromosome {
        return true;
    }
    !config.treat_no_calls_as_homozygous && record.genotype.is_no_call() != run.is_no_call()
}

/// Advance the scan by one record
pub fn step(state: RunState, record: &SnpRecord, config: &RohConfig) -> Step {
    let (state, report) = match state {
        RunState::InRun(run) if breaks_before(&run, record, config) => {
            (RunState::Idle, close_run(run, config))
        }
        state => (state, None),
    };

    let homozygous = record.genotype.is_homozygous();
    match state {
        RunState::Idle if homozygous => {
            let mut run = Run::start(record);
            run.add_homozygous(record);
            Step {
                state: RunState::InRun(run),
                report,
            }
        }
        RunState::Idle => Step {
            state: RunState::Idle,
            report,
        },
        RunState::InRun(mut run) if homozygous => {
            run.add_homozygous(record);
            Step {
                state: RunState::InRun(run),
                report,
            }
        }
        RunState::InRun(mut run) => {
            if run.heterozygous_gap() > config.min_to_ignore_heterozygous {
                run.add_tolerated(record);
                Step {
                    state: RunState::InRun(run),
                    report,
                }
            } else {
                Step {
                    state: RunState::Idle,
                    report: close_run(run, config),
                }
            }
        }
    }
}

/// Validate ROH configuration parameters
pub fn validate_roh_config(config: &RohConfig) -> SnpKitResult<()> {
    if config.min_to_ignore_heterozygous == 0 {
        return Err(SnpKitError::InvalidConfig(
            "min_to_ignore_heterozygous must be at least 1".to_string(),
        ));
    }

    if config.no_call_threshold >= config.length_threshold {
        log::warn!(
            "No-call threshold {} is not below the ROH length threshold {}; no-call runs get no special treatment",
            config.no_call_threshold,
            config.length_threshold
        );
    }

    Ok(())
}

/// Streaming ROH scanner with sort-order checks
#[derive(Debug, Clone)]
pub struct RunDetector {
    config: RohConfig,
    state: RunState,
    previous: Option<(Chromosome, u64)>,
    ordering_warnings: usize,
}

impl RunDetector {
    pub fn new(config: RohConfig) -> Self {
        Self {
            config,
            state: RunState::Idle,
            previous: None,
            ordering_warnings: 0,
        }
    }

    pub fn config(&self) -> &RohConfig {
        &self.config
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    pub fn ordering_warnings(&self) -> usize {
        self.ordering_warnings
    }

    /// Feed the next record, returning the run it completed, if any
    pub fn push(&mut self, record: &SnpRecord) -> Option<RunReport> {
        self.check_order(record);

        let Step { state, report } = step(std::mem::take(&mut self.state), record, &self.config);
        self.state = state;
        self.previous = Some((record.chromosome, record.position));

        report
    }

    /// End of input: report the open run, if any
    pub fn finish(&mut self) -> Option<RunReport> {
        self.previous = None;
        match std::mem::take(&mut self.state) {
            RunState::InRun(run) => close_run(run, &self.config),
            RunState::Idle => None,
        }
    }

    fn check_order(&mut self, record: &SnpRecord) {
        let Some((prev_chromosome, prev_position)) = self.previous else {
            return;
        };

        if prev_chromosome.code() > record.chromosome.code() {
            log::warn!(
                "Chr {} encountered after Chr {}. The file is not properly sorted.",
                record.chromosome,
                prev_chromosome
            );
            self.ordering_warnings += 1;
        } else if prev_chromosome == record.chromosome && prev_position > record.position {
            log::warn!(
                "Chr {} position {} encountered after position {}. The file is not properly sorted.",
                record.chromosome,
                record.position,
                prev_position
            );
            self.ordering_warnings += 1;
        }
    }
}

/// Scan a sequence of records and collect every reported run
pub fn scan<'a, I>(records: I, config: &RohConfig) -> Vec<RunReport>
where
    I: IntoIterator<Item = &'a SnpRecord>,
{
    let mut detector = RunDetector::new(config.clone());
    let mut reports: Vec<RunReport> = records
        .into_iter()
        .filter_map(|record| detector.push(record))
        .collect();
    reports.extend(detector.finish());
    reports
}

/// Outcome of scanning one raw file
#[derive(Debug, Clone)]
pub struct ScanSummary {
    pub vendor: Vendor,
    pub records: usize,
    pub ordering_warnings: usize,
    pub reports: Vec<RunReport>,
}

/// Scan the records of an open raw file, handing each reported run to
/// `on_report` as soon as it completes. Any malformed line aborts the scan.
pub fn scan_reader<R, F>(
    reader: RawReader<R>,
    config: &RohConfig,
    mut on_report: F,
) -> SnpKitResult<ScanSummary>
where
    R: Read,
    F: FnMut(&RunReport) -> SnpKitResult<()>,
{
    let vendor = reader.vendor();
    let mut detector = RunDetector::new(config.clone());
    let mut records = 0;
    let mut reports = Vec::new();

    for record in reader {
        let record = record?;
        records += 1;
        if let Some(report) = detector.push(&record) {
            on_report(&report)?;
            reports.push(report);
        }
    }
    if let Some(report) = detector.finish() {
        on_report(&report)?;
        reports.push(report);
    }

    log::info!("Scanned {} SNPs, {} runs reported", records, reports.len());

    Ok(ScanSummary {
        vendor,
        records,
        ordering_warnings: detector.ordering_warnings(),
        reports,
    })
}

/// Scan a raw data file and collect the reported runs
pub fn scan_file<P: AsRef<Path>>(path: P, config: &RohConfig) -> SnpKitResult<ScanSummary> {
    scan_reader(RawReader::open(&path)?, config, |report| {
        log::debug!("Run completed: {}", report);
        Ok(())
    })
}
