// ==============================================================================
// annotation/mod.rs - External Annotation Sources
// ==============================================================================
// Description: Ensembl VEP (frequency/consequence) and CIViC (significance) lookups
// Author: Matt Barham
// Created: 2026-10-19
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================

pub mod civic;
pub mod rate_limit;
pub mod vep;

#[cfg(test)]
mod test_server;

use async_trait::async_trait;
use std::time::Duration;

use crate::models::{AnnotationResult, VariantRecord};

pub use civic::CivicClient;
pub use rate_limit::{Clock, ManualClock, RateGate, TokioClock};
pub use vep::VepClient;

/// Source of population frequency and consequence for a variant.
///
/// Implementations never fail: any lookup problem yields
/// [`AnnotationResult::unknown`].
#[async_trait]
pub trait FrequencyAnnotator: Send + Sync {
    async fn annotate(
        &self,
        variant: &VariantRecord,
        assembly: &str,
        timeout: Duration,
    ) -> AnnotationResult;
}

/// Source of a raw clinical-significance string for a variant.
///
/// Returns `None` when nothing was found or the lookup failed.
#[async_trait]
pub trait SignificanceSource: Send + Sync {
    async fn annotate(&self, variant: &VariantRecord, timeout: Duration) -> Option<String>;
}
