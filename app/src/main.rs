// ==============================================================================
// main.rs - VCF Re-annotator Entry Point
// ==============================================================================
// Description: Validates, strips and re-annotates a VCF with gnomAD/CIViC data
// Author: Matt Barham
// Created: 2026-10-19
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vcf_reannotator::{PipelineConfig, Preprocessor};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input VCF (.vcf or .vcf.gz)
    input: PathBuf,

    /// Output path for the cleaned, re-annotated VCF
    output: PathBuf,

    /// JSON configuration file (flags below override its values)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Reference assembly (e.g., GRCh38)
    #[arg(long, env = "GENOME_ASSEMBLY")]
    genome_assembly: Option<String>,

    /// VEP request timeout in seconds
    #[arg(long, env = "VEP_TIMEOUT")]
    vep_timeout: Option<u64>,

    /// CIViC request timeout in seconds
    #[arg(long, env = "CIVIC_TIMEOUT")]
    civic_timeout: Option<u64>,

    /// Ensembl REST base URL
    #[arg(long, env = "VEP_BASE_URL")]
    vep_base_url: Option<String>,

    /// Ensembl REST base URL used for GRCh37/hg19 inputs
    #[arg(long, env = "VEP_GRCH37_BASE_URL")]
    vep_grch37_base_url: Option<String>,

    /// CIViC API base URL
    #[arg(long, env = "CIVIC_BASE_URL")]
    civic_base_url: Option<String>,

    /// Minimum milliseconds between VEP calls
    #[arg(long)]
    vep_interval_ms: Option<u64>,

    /// Minimum milliseconds between CIViC calls
    #[arg(long)]
    civic_interval_ms: Option<u64>,

    /// Write the run summary as JSON to this path
    #[arg(long)]
    summary_json: Option<PathBuf>,
}

impl Args {
    fn pipeline_config(&self) -> Result<PipelineConfig> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::from_json_file(path)
                .with_context(|| format!("Failed to load config {:?}", path))?,
            None => PipelineConfig::default(),
        };

        if let Some(assembly) = &self.genome_assembly {
            config.genome_assembly = assembly.clone();
        }
        if let Some(timeout) = self.vep_timeout {
            config.vep_timeout = timeout;
        }
        if let Some(timeout) = self.civic_timeout {
            config.civic_timeout = timeout;
        }
        if let Some(url) = &self.vep_base_url {
            config.vep_base_url = url.clone();
        }
        if let Some(url) = &self.vep_grch37_base_url {
            config.vep_grch37_base_url = url.clone();
        }
        if let Some(url) = &self.civic_base_url {
            config.civic_base_url = url.clone();
        }
        if let Some(ms) = self.vep_interval_ms {
            config.vep_interval_ms = ms;
        }
        if let Some(ms) = self.civic_interval_ms {
            config.civic_interval_ms = ms;
        }

        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vcf_reannotator=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let config = args.pipeline_config()?;

    info!(
        "VCF re-annotator starting (assembly {}, VEP timeout {}s, CIViC timeout {}s)",
        config.genome_assembly, config.vep_timeout, config.civic_timeout
    );

    let mut preprocessor = Preprocessor::from_config(config)?;

    let summary = match preprocessor.process(&args.input, &args.output).await {
        Ok(summary) => summary,
        Err(e) => {
            error!("Preprocessing failed: {}", e);
            return Err(e).context("Preprocessing aborted; no output written");
        }
    };

    info!(
        "Summary: {}/{} records kept, {} with gnomAD_AF, CLNSIG {:?}",
        summary.accepted_records,
        summary.input_records,
        summary.with_frequency,
        summary.significance_counts
    );

    if let Some(path) = &args.summary_json {
        let json = serde_json::to_string_pretty(&summary)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write summary {:?}", path))?;
        info!("Summary written to {:?}", path);
    }

    Ok(())
}
