//! Merging of several raw data files describing one individual

use crate::{raw::read_snp_file, SnpKitError, SnpKitResult, SnpRecord};
use std::collections::HashMap;
use std::fmt;
use std::io::Write;
use std::path::Path;

/// Two files disagree on a SNP even after allowing for a strand flip
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    pub id: String,
    pub new_file: String,
    pub existing_file: String,
    pub new_genotype: String,
    pub existing_genotype: String,
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Conflict for {}: {} vs {}, values {} vs {}",
            self.id, self.new_file, self.existing_file, self.new_genotype, self.existing_genotype
        )
    }
}

/// Which record survives an id collision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    KeepExisting,
    TakeNew,
}

/// Priority rule for colliding records.
///
/// | existing trusted | new trusted | winner   |
/// |------------------|-------------|----------|
/// | yes              | no          | existing |
/// | yes              | yes         | new      |
/// | no               | yes         | new      |
/// | no               | no          | new      |
pub fn select_record(existing: &SnpRecord, new: &SnpRecord) -> Selection {
    match (existing.source.is_trusted(), new.source.is_trusted()) {
        (true, false) => Selection::KeepExisting,
        (true, true) | (false, true) | (false, false) => Selection::TakeNew,
    }
}

/// Result of folding one record into the table
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    Inserted,
    Intersected {
        selection: Selection,
        conflict: Option<Conflict>,
    },
    SkippedNoCall,
}

/// Accumulator for a merge: the table keyed by SNP id in first-seen order
/// plus the statistics reported in the merged file header
#[derive(Debug, Default)]
pub struct MergeState {
    records: Vec<SnpRecord>,
    index: HashMap<String, usize>,
    file_counts: Vec<(String, usize)>,
    intersections: usize,
    conflicts: Vec<Conflict>,
    skipped_no_calls: usize,
}

impl MergeState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one record into the table
    pub fn add(&mut self, record: SnpRecord) -> MergeOutcome {
        if record.genotype.is_no_call() {
            log::debug!("Skipping no-call {} from {}", record.id, record.origin_file);
            self.skipped_no_calls += 1;
            return MergeOutcome::SkippedNoCall;
        }

        match self
            .file_counts
            .iter_mut()
            .find(|(file, _)| *file == record.origin_file)
        {
            Some((_, count)) => *count += 1,
            None => self.file_counts.push((record.origin_file.clone(), 1)),
        }

        let slot = self.index.get(&record.id).copied();
        let Some(slot) = slot else {
            self.index.insert(record.id.clone(), self.records.len());
            self.records.push(record);
            return MergeOutcome::Inserted;
        };

        self.intersections += 1;
        let existing = &self.records[slot];

        let conflict = if existing.genotype.is_equivalent(&record.genotype) {
            None
        } else {
            let conflict = Conflict {
                id: record.id.clone(),
                new_file: record.origin_file.clone(),
                existing_file: existing.origin_file.clone(),
                new_genotype: record.genotype.to_string(),
                existing_genotype: existing.genotype.to_string(),
            };
            log::warn!("{}", conflict);
            self.conflicts.push(conflict.clone());
            Some(conflict)
        };

        let selection = select_record(&self.records[slot], &record);
        if selection == Selection::TakeNew {
            self.records[slot] = record;
        }

        MergeOutcome::Intersected {
            selection,
            conflict,
        }
    }

    pub fn intersections(&self) -> usize {
        self.intersections
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn finish(self) -> MergeSummary {
        MergeSummary {
            records: self.records,
            file_counts: self.file_counts,
            intersections: self.intersections,
            conflicts: self.conflicts,
            skipped_no_calls: self.skipped_no_calls,
            rejected_files: Vec::new(),
        }
    }
}

/// Outcome of merging a set of files
#[derive(Debug, Clone)]
pub struct MergeSummary {
    pub records: Vec<SnpRecord>,
    pub file_counts: Vec<(String, usize)>,
    pub intersections: usize,
    pub conflicts: Vec<Conflict>,
    pub skipped_no_calls: usize,
    pub rejected_files: Vec<String>,
}

/// Errors caused by the content of one file rather than by access to it
fn is_malformed_input(error: &SnpKitError) -> bool {
    match error {
        SnpKitError::Format { .. } | SnpKitError::Csv(_) => true,
        SnpKitError::Io(e) => e.kind() == std::io::ErrorKind::InvalidData,
        SnpKitError::FileNotFound(_) | SnpKitError::InvalidConfig(_) => false,
    }
}

/// Merge raw data files in the given order.
///
/// A file with a malformed or undecodable line is rejected as a whole and the remaining
/// files are still merged. Missing or unreadable files abort the merge.
pub fn merge_files<P: AsRef<Path>>(paths: &[P]) -> SnpKitResult<MergeSummary> {
    if paths.is_empty() {
        return Err(SnpKitError::InvalidConfig(
            "at least one input file is required".to_string(),
        ));
    }

    let mut state = MergeState::new();
    let mut rejected_files = Vec::new();

    for path in paths {
        let label = path.as_ref().to_string_lossy().to_string();
        let (vendor, records) = match read_snp_file(path) {
            Ok(read) => read,
            Err(e) if is_malformed_input(&e) => {
                log::error!("Rejecting {}: {}", label, e);
                rejected_files.push(label);
                continue;
            }
            Err(e) => return Err(e),
        };

        log::info!("Read {} SNPs from {} ({})", records.len(), label, vendor);
        for record in records {
            state.add(record);
        }
    }

    log::info!(
        "Merged table holds {} SNPs, {} intersections",
        state.len(),
        state.intersections()
    );

    let mut summary = state.finish();
    summary.rejected_files = rejected_files;
    Ok(summary)
}

/// Write the merged table in 23andMe layout
pub fn write_merged_table<W: Write>(summary: &MergeSummary, writer: &mut W) -> SnpKitResult<()> {
    writeln!(writer, "#DNA raw data file merged from:")?;
    for (file, count) in &summary.file_counts {
        writeln!(writer, "#    {} with {} SNPs", file, count)?;
    }
    writeln!(
        writer,
        "# {} intersections were found among these files.",
        summary.intersections
    )?;
    writeln!(writer, "#")?;
    writeln!(writer, "# rsid  chromosome      position        genotype")?;

    for record in &summary.records {
        writeln!(
            writer,
            "{}\t{}\t{}\t{}",
            record.id, record.chromosome, record.position, record.genotype
        )?;
    }

    writer.flush()?;
    Ok(())
}
