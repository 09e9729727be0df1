// ==============================================================================
// processor.rs - Preprocessing Pipeline Driver
// ==============================================================================
// Description: Validate -> strip -> annotate (VEP, CIViC) -> reconstruct -> write
// Author: Matt Barham
// Created: 2026-10-19
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================
// Lookups run strictly one at a time. Each service has its own RateGate;
// a failed lookup degrades only that variant's annotation. Fatal errors
// are raised before the output file is touched.
// ==============================================================================

use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, info_span, Instrument};
use uuid::Uuid;

use crate::annotation::{
    CivicClient, Clock, FrequencyAnnotator, RateGate, SignificanceSource, TokioClock, VepClient,
};
use crate::config::PipelineConfig;
use crate::error::PreprocessError;
use crate::models::{AnnotationResult, ClinicalSignificance, PreprocessSummary, VcfDocument};
use crate::output::{self, HeaderTemplate};
use crate::parsers;
use crate::significance::map_significance;
use crate::validator;

/// Sequences the preprocessing stages for one input file at a time
pub struct Preprocessor<V, C> {
    config: PipelineConfig,
    vep: V,
    civic: C,
    vep_gate: RateGate,
    civic_gate: RateGate,
}

impl Preprocessor<VepClient, CivicClient> {
    /// Production wiring: real HTTP clients and the tokio clock
    pub fn from_config(config: PipelineConfig) -> Result<Self, PreprocessError> {
        let vep = VepClient::from_config(&config)?;
        let civic = CivicClient::from_config(&config)?;
        Ok(Self::new(config, vep, civic, Arc::new(TokioClock)))
    }
}

impl<V, C> Preprocessor<V, C>
where
    V: FrequencyAnnotator,
    C: SignificanceSource,
{
    pub fn new(config: PipelineConfig, vep: V, civic: C, clock: Arc<dyn Clock>) -> Self {
        let vep_gate = RateGate::new("VEP", config.vep_interval(), clock.clone());
        let civic_gate = RateGate::new("CIViC", config.civic_interval(), clock);

        Self {
            config,
            vep,
            civic,
            vep_gate,
            civic_gate,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn frequency_source(&self) -> &V {
        &self.vep
    }

    pub fn significance_source(&self) -> &C {
        &self.civic
    }

    /// Run the full pipeline, stamping the header with today's date
    pub async fn process(
        &mut self,
        input: &Path,
        output: &Path,
    ) -> Result<PreprocessSummary, PreprocessError> {
        let today = chrono::Utc::now().date_naive();
        self.process_with_date(input, output, today).await
    }

    /// Run the full pipeline with an explicit `##fileDate`
    pub async fn process_with_date(
        &mut self,
        input: &Path,
        output: &Path,
        file_date: NaiveDate,
    ) -> Result<PreprocessSummary, PreprocessError> {
        let run_id = Uuid::new_v4();
        let span = info_span!("preprocess", run_id = %run_id);
        self.run(run_id, input, output, file_date)
            .instrument(span)
            .await
    }

    async fn run(
        &mut self,
        run_id: Uuid,
        input: &Path,
        output: &Path,
        file_date: NaiveDate,
    ) -> Result<PreprocessSummary, PreprocessError> {
        info!("Preprocessing {:?} -> {:?}", input, output);

        // 1. Load and validate (fatal errors stop here, nothing written)
        let raw = parsers::read_vcf(input)?;
        let validated = validator::validate(&raw.content)?;
        info!("Validation passed: {} data records", validated.record_count);

        // 2. Strip INFO and extract lookup fields
        let stripped = parsers::strip_document(&raw.content, &validated);
        let document = stripped.document;

        // 3. Annotate each surviving record
        let (annotations, significances) = self.annotate_document(&document).await;

        // 4. Rebuild and write
        let template = HeaderTemplate::new(file_date, self.config.genome_assembly.clone());
        let text = output::build(&document, &annotations, &significances, &template);
        output::write_output(output, &text)?;

        let summary = PreprocessSummary {
            run_id,
            input_path: input.display().to_string(),
            output_path: output.display().to_string(),
            input_sha256: raw.sha256,
            genome_assembly: self.config.genome_assembly.clone(),
            input_records: stripped.input_records,
            accepted_records: document.records.len(),
            rejected_records: stripped.rejected.len(),
            with_frequency: annotations.iter().filter(|a| a.gnomad_af.is_some()).count(),
            with_consequence: annotations.iter().filter(|a| a.consequence.is_some()).count(),
            significance_counts: tally(&significances),
            warnings: validated.warnings.iter().map(ToString::to_string).collect(),
        };

        info!(
            "Preprocessing complete: {} records written ({} dropped, {} with gnomAD_AF, {} with consequence)",
            summary.accepted_records,
            summary.rejected_records,
            summary.with_frequency,
            summary.with_consequence
        );

        Ok(summary)
    }

    /// Look up every record against VEP then CIViC, one call at a time
    pub async fn annotate_document(
        &mut self,
        document: &VcfDocument,
    ) -> (Vec<AnnotationResult>, Vec<ClinicalSignificance>) {
        let total = document.records.len();
        let assembly = self.config.genome_assembly.clone();
        let vep_timeout = self.config.vep_timeout();
        let civic_timeout = self.config.civic_timeout();

        let mut annotations = Vec::with_capacity(total);
        let mut significances = Vec::with_capacity(total);

        for (index, record) in document.records.iter().enumerate() {
            debug!(
                "Annotating {}/{}: {}:{} {}>{}",
                index + 1,
                total,
                record.chrom,
                record.pos,
                record.ref_allele,
                record.alt_allele
            );

            let annotation = self
                .vep_gate
                .run(self.vep.annotate(record, &assembly, vep_timeout))
                .await;

            let raw_significance = self
                .civic_gate
                .run(self.civic.annotate(record, civic_timeout))
                .await;

            annotations.push(annotation);
            significances.push(map_significance(raw_significance.as_deref()));

            if (index + 1) % 100 == 0 {
                info!("Annotated {}/{} variants", index + 1, total);
            }
        }

        (annotations, significances)
    }
}

/// CLNSIG counts with every vocabulary value present
fn tally(significances: &[ClinicalSignificance]) -> BTreeMap<String, usize> {
    let mut counts: BTreeMap<String, usize> = ClinicalSignificance::ALL
        .iter()
        .map(|s| (s.as_str().to_string(), 0))
        .collect();
    for significance in significances {
        *counts.entry(significance.as_str().to_string()).or_insert(0) += 1;
    }
    counts
}
