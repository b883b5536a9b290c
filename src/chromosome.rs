//! Chromosome label normalization

use crate::{FormatError, Vendor};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A normalized chromosome.
///
/// Ordering follows the numeric codes used by the vendors: autosomes by
/// number, then X (23), Y (24), XY (25) and MT (26).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Chromosome {
    Autosome(u8),
    X,
    Y,
    XY,
    MT,
}

impl Chromosome {
    /// Parse a raw chromosome label as written by `vendor`.
    ///
    /// AncestryDNA encodes the sex chromosomes numerically and uses 25 for
    /// the pseudo-autosomal region, which is folded into X.
    pub fn parse(label: &str, vendor: Vendor) -> Result<Self, FormatError> {
        let label = label.trim();
        match label.to_ascii_uppercase().as_str() {
            "X" => return Ok(Chromosome::X),
            "Y" => return Ok(Chromosome::Y),
            "XY" => return Ok(Chromosome::XY),
            "MT" | "M" => return Ok(Chromosome::MT),
            _ => {}
        }

        let code = label
            .parse::<u8>()
            .map_err(|_| FormatError::InvalidChromosome(label.to_string()))?;

        Ok(match (code, vendor) {
            (25, Vendor::AncestryDna) => Chromosome::X,
            _ => Chromosome::from_code(code),
        })
    }

    pub fn from_code(code: u8) -> Self {
        match code {
            23 => Chromosome::X,
            24 => Chromosome::Y,
            25 => Chromosome::XY,
            26 => Chromosome::MT,
            n => Chromosome::Autosome(n),
        }
    }

    /// Integer code used for ordering checks
    pub fn code(&self) -> u8 {
        match self {
            Chromosome::Autosome(n) => *n,
            Chromosome::X => 23,
            Chromosome::Y => 24,
            Chromosome::XY => 25,
            Chromosome::MT => 26,
        }
    }

    /// Label used in ROH reports
    pub fn report_label(&self) -> String {
        match self {
            Chromosome::Autosome(n) => format!("Chr {}", n),
            Chromosome::X => "Chr X".to_string(),
            Chromosome::Y => "Chr Y".to_string(),
            Chromosome::XY => "Chr XY".to_string(),
            Chromosome::MT => "mtDNA".to_string(),
        }
    }
}

/// 23andMe spelling, as written to merged files
impl fmt::Display for Chromosome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Chromosome::Autosome(n) => write!(f, "{}", n),
            Chromosome::X => f.write_str("X"),
            Chromosome::Y => f.write_str("Y"),
            Chromosome::XY => f.write_str("XY"),
            Chromosome::MT => f.write_str("MT"),
        }
    }
}
