// ==============================================================================
// parsers/vcf.rs - VCF Loader, INFO Stripper and Field Extractor
// ==============================================================================
// Description: Reads VCF text (plain or gzip), blanks INFO, extracts lookup fields
// Author: Matt Barham
// Created: 2026-10-19
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================
// References:
// - VCF 4.2 Spec: https://samtools.github.io/hts-specs/VCFv4.2.pdf
// ==============================================================================

use sha2::{Digest, Sha256};
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::error::PreprocessError;
use crate::models::{RecordOutcome, RejectReason, VariantRecord, VcfDocument, MIN_VCF_COLUMNS};
use crate::validator::ValidatedVcf;

const INFO_COLUMN: usize = 7;

/// Raw input text plus the checksum of the bytes on disk
#[derive(Debug, Clone)]
pub struct RawVcf {
    pub content: String,
    pub sha256: String,
}

/// Read a VCF file, transparently decompressing `.gz` inputs
pub fn read_vcf(path: &Path) -> Result<RawVcf, PreprocessError> {
    if !path.is_file() {
        return Err(PreprocessError::InputNotFound(path.to_path_buf()));
    }

    let bytes = std::fs::read(path).map_err(|e| PreprocessError::io(path, e))?;
    let sha256 = format!("{:x}", Sha256::digest(&bytes));

    let is_gzip = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("gz"))
        .unwrap_or(false);

    let content = if is_gzip {
        let mut decoded = String::new();
        flate2::read::MultiGzDecoder::new(bytes.as_slice())
            .read_to_string(&mut decoded)
            .map_err(|e| PreprocessError::io(path, e))?;
        decoded
    } else {
        String::from_utf8(bytes).map_err(|e| {
            PreprocessError::io(
                path,
                std::io::Error::new(std::io::ErrorKind::InvalidData, e),
            )
        })?
    };

    debug!("Read {} bytes of VCF text from {:?} (sha256 {})", content.len(), path, sha256);
    Ok(RawVcf { content, sha256 })
}

/// Strip a single data line.
///
/// Lines with fewer than eight columns are rejected. Accepted lines have
/// their INFO column replaced with "." and a lookup chromosome derived by
/// dropping a literal leading "chr".
pub fn strip_line(line: &str, line_number: usize) -> RecordOutcome {
    let mut fields: Vec<&str> = line.split('\t').collect();

    if fields.len() < MIN_VCF_COLUMNS {
        return RecordOutcome::Rejected {
            line_number,
            reason: RejectReason::TooFewColumns { found: fields.len() },
        };
    }

    fields[INFO_COLUMN] = ".";
    let stripped = fields.join("\t");

    let chrom = fields[0].strip_prefix("chr").unwrap_or(fields[0]);

    RecordOutcome::Accepted(VariantRecord {
        chrom: chrom.to_string(),
        pos: fields[1].to_string(),
        id: fields[2].to_string(),
        ref_allele: fields[3].to_string(),
        alt_allele: fields[4].to_string(),
        qual: fields[5].to_string(),
        filter: fields[6].to_string(),
        info: ".".to_string(),
        trailing: fields[MIN_VCF_COLUMNS..].iter().map(|s| s.to_string()).collect(),
        line: stripped,
    })
}

/// Outcome of stripping a validated document
#[derive(Debug, Clone)]
pub struct StrippedVcf {
    pub document: VcfDocument,

    /// Data lines seen after the #CHROM header
    pub input_records: usize,

    /// Lines dropped for structural defects
    pub rejected: Vec<RecordOutcome>,
}

/// Split validated content into header lines and stripped records
pub fn strip_document(content: &str, validated: &ValidatedVcf) -> StrippedVcf {
    let mut document = VcfDocument::default();
    let mut rejected = Vec::new();
    let mut input_records = 0;

    for (index, raw) in content.lines().enumerate() {
        let line = raw.trim_end_matches('\r');

        if line.starts_with('#') {
            if index <= validated.column_header_index {
                document.header_lines.push(line.to_string());
            }
            continue;
        }
        if index < validated.column_header_index || line.trim().is_empty() {
            continue;
        }

        input_records += 1;
        match strip_line(line, index + 1) {
            RecordOutcome::Accepted(record) => document.records.push(record),
            RecordOutcome::Rejected { line_number, reason } => {
                warn!("Dropping line {}: {}", line_number, reason);
                rejected.push(RecordOutcome::Rejected { line_number, reason });
            }
        }
    }

    info!(
        "Stripped INFO from {} records ({} dropped as malformed)",
        document.records.len(),
        rejected.len()
    );

    StrippedVcf {
        document,
        input_records,
        rejected,
    }
}
