// ==============================================================================
// lib.rs - VCF Re-annotator Library
// ==============================================================================
// Description: Library interface for VCF validation and re-annotation modules
// Author: Matt Barham
// Created: 2026-10-19
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================

pub mod annotation;
pub mod config;
pub mod error;
pub mod models;
pub mod output;
pub mod parsers;
pub mod processor;
pub mod significance;
pub mod validator;

pub use config::PipelineConfig;
pub use error::{LookupError, PreprocessError};
pub use models::{AnnotationResult, ClinicalSignificance, PreprocessSummary, VcfDocument, VariantRecord};
pub use processor::Preprocessor;
