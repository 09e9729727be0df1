// ==============================================================================
// validator.rs - VCF Structural Validation
// ==============================================================================
// Description: Document-level checks on raw VCF text before any lookups run
// Author: Matt Barham
// Created: 2026-10-19
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================
// Checks:
//   1. A ##fileformat=VCF... declaration exists            (fatal)
//   2. Exactly one #CHROM column-header line                (fatal)
//   3. At least one data line after the #CHROM header       (fatal)
//   4. ##reference= names hg38/GRCh38                       (warning only)
// ==============================================================================

use std::fmt;
use tracing::{debug, warn};

use crate::error::PreprocessError;

const FILEFORMAT_PREFIX: &str = "##fileformat=VCF";
const COLUMN_HEADER_PREFIX: &str = "#CHROM";
const REFERENCE_PREFIX: &str = "##reference=";

/// Result of a successful validation pass
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedVcf {
    /// Zero-based line index of the #CHROM header
    pub column_header_index: usize,

    /// Number of data lines following the #CHROM header
    pub record_count: usize,

    /// Non-fatal assembly findings
    pub warnings: Vec<AssemblyWarning>,
}

/// Non-fatal finding about the declared reference assembly
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssemblyWarning {
    /// `##reference=` exists but does not look like GRCh38
    Mismatch { declared: String },

    /// No `##reference=` line; GRCh38 assumed
    Missing,
}

impl fmt::Display for AssemblyWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssemblyWarning::Mismatch { declared } => write!(
                f,
                "reference '{}' does not appear to be hg38/GRCh38; coordinates may not match",
                declared
            ),
            AssemblyWarning::Missing => {
                write!(f, "no ##reference= header found; assuming GRCh38")
            }
        }
    }
}

/// Validate raw VCF text
pub fn validate(content: &str) -> Result<ValidatedVcf, PreprocessError> {
    let lines: Vec<&str> = content.lines().collect();

    if !lines.iter().any(|l| l.starts_with(FILEFORMAT_PREFIX)) {
        return Err(PreprocessError::Format(
            "missing ##fileformat=VCF declaration".to_string(),
        ));
    }

    let header_indices: Vec<usize> = lines
        .iter()
        .enumerate()
        .filter(|(_, l)| l.starts_with(COLUMN_HEADER_PREFIX))
        .map(|(i, _)| i)
        .collect();

    if header_indices.len() != 1 {
        return Err(PreprocessError::Format(format!(
            "expected exactly one #CHROM header line, found {}",
            header_indices.len()
        )));
    }
    let column_header_index = header_indices[0];

    let record_count = count_data_lines(&lines[column_header_index + 1..]);
    if record_count == 0 {
        return Err(PreprocessError::Empty);
    }
    debug!(
        "Structure check passed: #CHROM at line {}, {} data lines",
        column_header_index + 1,
        record_count
    );

    let warnings = check_assembly(&lines[..column_header_index]);
    for warning in &warnings {
        warn!("Assembly check: {}", warning);
    }

    Ok(ValidatedVcf {
        column_header_index,
        record_count,
        warnings,
    })
}

/// Data lines are non-blank and not `#`-prefixed
pub(crate) fn count_data_lines(lines: &[&str]) -> usize {
    lines
        .iter()
        .filter(|l| !l.trim().is_empty() && !l.starts_with('#'))
        .count()
}

fn check_assembly(header: &[&str]) -> Vec<AssemblyWarning> {
    let references: Vec<&str> = header
        .iter()
        .filter_map(|l| l.strip_prefix(REFERENCE_PREFIX))
        .collect();

    if references.is_empty() {
        return vec![AssemblyWarning::Missing];
    }

    references
        .into_iter()
        .filter(|value| {
            let lower = value.to_lowercase();
            !lower.contains("hg38") && !lower.contains("grch38")
        })
        .map(|value| AssemblyWarning::Mismatch {
            declared: value.to_string(),
        })
        .collect()
}
