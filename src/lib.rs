//! # snpkit - consumer DNA raw data tools
//!
//! Works on the raw genotype exports of direct-to-consumer testing services
//! (23andMe, AncestryDNA, Genes for Good). Two analyses are provided:
//! merging several raw files of one individual into a single table, and
//! scanning one sorted file for runs of homozygosity and no-call runs.

pub mod chromosome;
pub mod genotype;
pub mod merge;
pub mod raw;
pub mod roh;
pub mod strand;
pub mod utils;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use chromosome::Chromosome;
pub use genotype::Genotype;

/// The testing service a raw file was exported from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Vendor {
    TwentyThreeAndMe,
    AncestryDna,
    GenesForGood,
    Other,
}

impl Vendor {
    /// Detect the vendor from a header comment line.
    ///
    /// Markers are checked in a fixed order so that a Genes for Good header,
    /// which also mentions 23andMe compatibility, is classified correctly.
    pub fn from_header_line(line: &str) -> Option<Self> {
        let line = line.to_ascii_lowercase();
        let mut detected = None;
        if line.contains("ancestrydna") {
            detected = Some(Vendor::AncestryDna);
        }
        if line.contains("23andme") {
            detected = Some(Vendor::TwentyThreeAndMe);
        }
        if line.contains("genes for good") {
            detected = Some(Vendor::GenesForGood);
        }
        detected
    }

    /// Records from trusted vendors win merge collisions
    pub fn is_trusted(&self) -> bool {
        matches!(self, Vendor::TwentyThreeAndMe | Vendor::GenesForGood)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Vendor::TwentyThreeAndMe => "23andMe",
            Vendor::AncestryDna => "AncestryDNA",
            Vendor::GenesForGood => "Genes for Good",
            Vendor::Other => "other",
        }
    }
}

impl fmt::Display for Vendor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One normalized SNP call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnpRecord {
    pub id: String,
    pub chromosome: Chromosome,
    pub position: u64,
    pub genotype: Genotype,
    pub source: Vendor,
    pub origin_file: String,
}

impl SnpRecord {
    pub fn new(
        id: String,
        chromosome: Chromosome,
        position: u64,
        genotype: Genotype,
        source: Vendor,
        origin_file: String,
    ) -> Self {
        Self {
            id,
            chromosome,
            position,
            genotype,
            source,
            origin_file,
        }
    }
}

/// Thresholds for the run-of-homozygosity scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RohConfig {
    pub length_threshold: u64,
    pub no_call_threshold: u64,
    pub treat_no_calls_as_homozygous: bool,
    pub min_to_ignore_heterozygous: u64,
}

impl Default for RohConfig {
    fn default() -> Self {
        Self {
            length_threshold: 200,
            no_call_threshold: 10,
            treat_no_calls_as_homozygous: true,
            min_to_ignore_heterozygous: 150,
        }
    }
}

/// Problems with a single raw data line
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    #[error("missing {0} field")]
    MissingField(&'static str),

    #[error("invalid position: {0}")]
    InvalidPosition(String),

    #[error("invalid chromosome: {0}")]
    InvalidChromosome(String),

    #[error("invalid genotype: {0}")]
    InvalidGenotype(String),
}

/// Error types for the snpkit library
#[derive(Debug, thiserror::Error)]
pub enum SnpKitError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("{path}: line {line}: {source}")]
    Format {
        path: String,
        line: u64,
        #[source]
        source: FormatError,
    },

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type SnpKitResult<T> = Result<T, SnpKitError>;
