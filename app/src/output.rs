// ==============================================================================
// output.rs - Standardised VCF Reconstruction
// ==============================================================================
// Description: Rebuilds header block and INFO fields, writes the cleaned VCF
// Author: Matt Barham
// Created: 2026-10-19
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================
// Header block order:
//   1. fixed declarations (fileformat, fileDate, reference, DP, FORMAT)
//   2. INFO declarations for gnomAD_AF, CLNSIG, VEP_Consequence
//   3. one ##contig per observed chromosome, first-seen order, "chr" prefixed
//   4. the original #CHROM line, unmodified
// INFO per record: [DP=..;]gnomAD_AF=<%.6f|.>;CLNSIG=..[;VEP_Consequence=..]
// ==============================================================================

use chrono::NaiveDate;
use std::collections::HashSet;
use std::path::Path;
use tracing::info;

use crate::error::PreprocessError;
use crate::models::{AnnotationResult, ClinicalSignificance, VariantRecord, VcfDocument};

const FILEFORMAT: &str = "##fileformat=VCFv4.2";

/// INFO declarations consumed by the downstream filter and classifier
pub const ANNOTATION_INFO_DECLARATIONS: [&str; 3] = [
    "##INFO=<ID=gnomAD_AF,Number=A,Type=Float,Description=\"Allele frequency from gnomAD (Ensembl VEP colocated variants)\">",
    "##INFO=<ID=CLNSIG,Number=1,Type=String,Description=\"Clinical significance (CIViC): Pathogenic, Likely_Pathogenic, Benign, Likely_Benign or VUS\">",
    "##INFO=<ID=VEP_Consequence,Number=1,Type=String,Description=\"Most severe consequence from Ensembl VEP\">",
];

const DP_DECLARATION: &str =
    "##INFO=<ID=DP,Number=1,Type=Integer,Description=\"Read depth of the first sample\">";
const GT_DECLARATION: &str =
    "##FORMAT=<ID=GT,Number=1,Type=String,Description=\"Genotype\">";

/// Ordered list of header declarations emitted ahead of the #CHROM line
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderTemplate {
    pub file_date: NaiveDate,
    pub assembly: String,
}

impl HeaderTemplate {
    pub fn new(file_date: NaiveDate, assembly: impl Into<String>) -> Self {
        Self {
            file_date,
            assembly: assembly.into(),
        }
    }

    /// Fixed format/date/reference/DP/FORMAT declarations
    pub fn required_declarations(&self) -> Vec<String> {
        vec![
            FILEFORMAT.to_string(),
            format!("##fileDate={}", self.file_date.format("%Y%m%d")),
            format!("##reference={}", self.assembly),
            DP_DECLARATION.to_string(),
            GT_DECLARATION.to_string(),
        ]
    }

    /// Full header block for a document
    pub fn render(&self, document: &VcfDocument) -> Vec<String> {
        let mut lines = self.required_declarations();
        lines.extend(ANNOTATION_INFO_DECLARATIONS.iter().map(|s| s.to_string()));
        lines.extend(contig_declarations(&document.records));
        if let Some(column_header) = document.column_header() {
            lines.push(column_header.to_string());
        }
        lines
    }
}

/// `##contig=<ID=chrN>` per distinct chromosome, first-seen order
pub fn contig_declarations(records: &[VariantRecord]) -> Vec<String> {
    let mut seen = HashSet::new();
    records
        .iter()
        .filter(|r| seen.insert(r.chrom.as_str()))
        .map(|r| format!("##contig=<ID=chr{}>", r.chrom))
        .collect()
}

/// `gnomAD_AF` value: six decimals, or "." when unknown
pub fn format_frequency(af: Option<f64>) -> String {
    match af {
        Some(value) if value.is_finite() && value >= 0.0 => format!("{:.6}", value),
        _ => ".".to_string(),
    }
}

/// Rebuilt INFO column for one record
pub fn build_info(
    record: &VariantRecord,
    annotation: &AnnotationResult,
    significance: ClinicalSignificance,
) -> String {
    let mut parts = Vec::with_capacity(4);

    if let Some(dp) = record.sample_value("DP") {
        parts.push(format!("DP={}", dp));
    }
    parts.push(format!("gnomAD_AF={}", format_frequency(annotation.gnomad_af)));
    parts.push(format!("CLNSIG={}", significance));
    if let Some(consequence) = &annotation.consequence {
        parts.push(format!("VEP_Consequence={}", consequence));
    }

    parts.join(";")
}

/// Full data line with "chr" restored on CHROM and the rebuilt INFO
pub fn build_record_line(
    record: &VariantRecord,
    annotation: &AnnotationResult,
    significance: ClinicalSignificance,
) -> String {
    let chrom = format!("chr{}", record.chrom);
    let info = build_info(record, annotation, significance);

    let mut fields: Vec<&str> = vec![
        chrom.as_str(),
        record.pos.as_str(),
        record.id.as_str(),
        record.ref_allele.as_str(),
        record.alt_allele.as_str(),
        record.qual.as_str(),
        record.filter.as_str(),
        info.as_str(),
    ];
    fields.extend(record.trailing.iter().map(String::as_str));
    fields.join("\t")
}

/// Render the whole output document.
///
/// `annotations` and `significances` are indexed like `document.records`;
/// a missing entry is treated as unknown / VUS.
pub fn build(
    document: &VcfDocument,
    annotations: &[AnnotationResult],
    significances: &[ClinicalSignificance],
    template: &HeaderTemplate,
) -> String {
    let unknown = AnnotationResult::unknown();
    let mut lines = template.render(document);

    for (index, record) in document.records.iter().enumerate() {
        let annotation = annotations.get(index).unwrap_or(&unknown);
        let significance = significances.get(index).copied().unwrap_or_default();
        lines.push(build_record_line(record, annotation, significance));
    }

    let mut text = lines.join("\n");
    text.push('\n');
    text
}

/// Write the rendered document in one shot
pub fn write_output(path: &Path, text: &str) -> Result<(), PreprocessError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| PreprocessError::io(parent, e))?;
    }
    std::fs::write(path, text).map_err(|e| PreprocessError::io(path, e))?;
    info!("Wrote cleaned VCF: {:?} ({} bytes)", path, text.len());
    Ok(())
}
