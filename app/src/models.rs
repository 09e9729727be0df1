// ==============================================================================
// models.rs - VCF Document and Annotation Data Models
// ==============================================================================
// Description: In-memory VCF document, per-variant records and annotation results
// Author: Matt Barham
// Created: 2026-10-19
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Minimum number of tab-separated columns for a usable data line
/// (CHROM POS ID REF ALT QUAL FILTER INFO)
pub const MIN_VCF_COLUMNS: usize = 8;

/// Parsed VCF document: header lines in file order plus variant records
#[derive(Debug, Clone, Default)]
pub struct VcfDocument {
    /// All `#`-prefixed lines, insertion order preserved
    pub header_lines: Vec<String>,

    /// Records that survived stripping
    pub records: Vec<VariantRecord>,
}

impl VcfDocument {
    /// The single `#CHROM` column-header line, if present
    pub fn column_header(&self) -> Option<&str> {
        self.header_lines
            .iter()
            .find(|l| l.starts_with("#CHROM"))
            .map(String::as_str)
    }
}

/// A single variant line after its INFO column has been blanked
#[derive(Debug, Clone, PartialEq)]
pub struct VariantRecord {
    /// Chromosome without a leading "chr" (the form Ensembl expects)
    pub chrom: String,

    /// 1-based position, kept textual as found in the file
    pub pos: String,

    pub id: String,

    /// Reference allele (e.g., "A")
    pub ref_allele: String,

    /// Alternate allele string as found in the line
    pub alt_allele: String,

    pub qual: String,
    pub filter: String,

    /// Always "." once stripped
    pub info: String,

    /// Columns after INFO (FORMAT and samples), verbatim
    pub trailing: Vec<String>,

    /// The stripped tab-separated line, verbatim. Kept for provenance only;
    /// output is rebuilt from the fields above.
    pub line: String,
}

impl VariantRecord {
    /// Numeric position, if the POS column is an integer
    pub fn position(&self) -> Option<u64> {
        self.pos.parse().ok()
    }

    /// FORMAT key list (column 9), when present
    pub fn format(&self) -> Option<&str> {
        self.trailing.first().map(String::as_str)
    }

    /// First sample column (column 10), when present
    pub fn first_sample(&self) -> Option<&str> {
        self.trailing.get(1).map(String::as_str)
    }

    /// Value of a FORMAT key in the first sample (e.g., "DP")
    pub fn sample_value(&self, key: &str) -> Option<&str> {
        let format = self.format()?;
        let sample = self.first_sample()?;
        let index = format.split(':').position(|k| k == key)?;
        sample.split(':').nth(index)
    }
}

/// Why a data line was dropped during stripping
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    /// Fewer than eight tab-separated columns
    TooFewColumns { found: usize },
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::TooFewColumns { found } => write!(
                f,
                "expected at least {} columns, found {}",
                MIN_VCF_COLUMNS, found
            ),
        }
    }
}

/// Outcome of stripping one data line
#[derive(Debug, Clone, PartialEq)]
pub enum RecordOutcome {
    Accepted(VariantRecord),
    Rejected { line_number: usize, reason: RejectReason },
}

/// Population frequency and consequence from a VEP lookup
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnnotationResult {
    /// Non-negative finite allele frequency; None when unknown
    pub gnomad_af: Option<f64>,

    /// `most_severe_consequence`, verbatim
    pub consequence: Option<String>,
}

impl AnnotationResult {
    /// Both fields unknown (lookup failed or nothing found)
    pub fn unknown() -> Self {
        Self::default()
    }
}

/// Normalised clinical significance vocabulary written to CLNSIG
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum ClinicalSignificance {
    Pathogenic,
    #[serde(rename = "Likely_Pathogenic")]
    LikelyPathogenic,
    Benign,
    #[serde(rename = "Likely_Benign")]
    LikelyBenign,
    #[default]
    #[serde(rename = "VUS")]
    Vus,
}

impl ClinicalSignificance {
    pub const ALL: [ClinicalSignificance; 5] = [
        ClinicalSignificance::Pathogenic,
        ClinicalSignificance::LikelyPathogenic,
        ClinicalSignificance::Benign,
        ClinicalSignificance::LikelyBenign,
        ClinicalSignificance::Vus,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ClinicalSignificance::Pathogenic => "Pathogenic",
            ClinicalSignificance::LikelyPathogenic => "Likely_Pathogenic",
            ClinicalSignificance::Benign => "Benign",
            ClinicalSignificance::LikelyBenign => "Likely_Benign",
            ClinicalSignificance::Vus => "VUS",
        }
    }
}

impl fmt::Display for ClinicalSignificance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-run counts reported once the output file is written
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreprocessSummary {
    pub run_id: uuid::Uuid,
    pub input_path: String,
    pub output_path: String,

    /// SHA-256 of the raw input bytes
    pub input_sha256: String,

    pub genome_assembly: String,

    /// Data lines found after the #CHROM header
    pub input_records: usize,

    /// Records written to the output
    pub accepted_records: usize,

    /// Records dropped for having too few columns
    pub rejected_records: usize,

    /// Records whose gnomAD_AF was resolved to a number
    pub with_frequency: usize,

    /// Records carrying a VEP_Consequence
    pub with_consequence: usize,

    /// CLNSIG tallies, keyed by vocabulary value
    pub significance_counts: BTreeMap<String, usize>,

    pub warnings: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_with_trailing(trailing: &[&str]) -> VariantRecord {
        VariantRecord {
            chrom: "1".to_string(),
            pos: "100".to_string(),
            id: ".".to_string(),
            ref_allele: "A".to_string(),
            alt_allele: "G".to_string(),
            qual: ".".to_string(),
            filter: "PASS".to_string(),
            info: ".".to_string(),
            trailing: trailing.iter().map(|s| s.to_string()).collect(),
            line: String::new(),
        }
    }

    #[test]
    fn test_sample_value_lookup() {
        let record = record_with_trailing(&["GT:AD:DP", "0/1:10,12:22"]);
        assert_eq!(record.sample_value("DP"), Some("22"));
        assert_eq!(record.sample_value("GT"), Some("0/1"));
        assert_eq!(record.sample_value("GQ"), None);

        // Key declared but value truncated
        let short = record_with_trailing(&["GT:DP", "0/1"]);
        assert_eq!(short.sample_value("DP"), None);

        // No sample columns at all
        assert_eq!(record_with_trailing(&[]).sample_value("DP"), None);
    }

    #[test]
    fn test_significance_str() {
        assert_eq!(ClinicalSignificance::Pathogenic.as_str(), "Pathogenic");
        assert_eq!(ClinicalSignificance::LikelyPathogenic.as_str(), "Likely_Pathogenic");
        assert_eq!(ClinicalSignificance::LikelyBenign.to_string(), "Likely_Benign");
        assert_eq!(ClinicalSignificance::default(), ClinicalSignificance::Vus);
    }

    #[test]
    fn test_significance_serde_matches_display() {
        for sig in ClinicalSignificance::ALL {
            let json = serde_json::to_string(&sig).unwrap();
            assert_eq!(json, format!("\"{}\"", sig.as_str()));
        }
    }

    #[test]
    fn test_reject_reason_display() {
        let reason = RejectReason::TooFewColumns { found: 5 };
        assert_eq!(reason.to_string(), "expected at least 8 columns, found 5");
    }
}
