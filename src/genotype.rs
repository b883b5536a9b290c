//! Genotype normalization
//!
//! Vendors spell the same call in several ways: allele order varies, haploid
//! calls are a single letter, AncestryDNA splits the two alleles into
//! separate columns and every service has its own no-call marker. A
//! [`Genotype`] is always two upper-case characters in lexical order, or the
//! [`Genotype::NO_CALL`] sentinel.

use crate::strand;
use crate::FormatError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Vendor spellings of a failed call
const NO_CALL_SPELLINGS: &[&str] = &["--", "---", "00", "??", "-", "0"];

/// Characters allowed in a called genotype. `D` and `I` are indel calls.
const ALLOWED_BASES: &[u8] = b"ACGTDI";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Genotype([u8; 2]);

impl Genotype {
    pub const NO_CALL: Genotype = Genotype(*b"--");

    /// Normalize a single genotype field
    pub fn parse(raw: &str) -> Result<Self, FormatError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(FormatError::MissingField("genotype"));
        }
        if NO_CALL_SPELLINGS.contains(&raw) {
            return Ok(Self::NO_CALL);
        }

        let bytes = raw.to_ascii_uppercase().into_bytes();
        let mut pair = match bytes.as_slice() {
            [base] => [*base, *base],
            [first, second] => [*first, *second],
            _ => return Err(FormatError::InvalidGenotype(raw.to_string())),
        };

        if !pair.iter().all(|b| ALLOWED_BASES.contains(b)) {
            return Err(FormatError::InvalidGenotype(raw.to_string()));
        }

        pair.sort_unstable();
        Ok(Genotype(pair))
    }

    /// Normalize a genotype given as two single-allele columns
    pub fn from_alleles(allele1: &str, allele2: &str) -> Result<Self, FormatError> {
        let allele1 = allele1.trim();
        let allele2 = allele2.trim();
        if allele2.is_empty() {
            return Self::parse(allele1);
        }
        Self::parse(&format!("{}{}", allele1, allele2))
    }

    pub fn is_no_call(&self) -> bool {
        *self == Self::NO_CALL
    }

    /// Both alleles identical. The no-call sentinel counts as homozygous;
    /// callers decide whether that is wanted.
    pub fn is_homozygous(&self) -> bool {
        self.0[0] == self.0[1]
    }

    pub fn bases(&self) -> [char; 2] {
        [self.0[0] as char, self.0[1] as char]
    }

    /// Same physical genotype, allowing for a strand flip
    pub fn is_equivalent(&self, other: &Genotype) -> bool {
        strand::equivalent_bases(self.bases(), other.bases())
    }
}

impl fmt::Display for Genotype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [first, second] = self.bases();
        write!(f, "{}{}", first, second)
    }
}
