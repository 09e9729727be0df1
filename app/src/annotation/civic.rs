// ==============================================================================
// annotation/civic.rs - CIViC GraphQL Client
// ==============================================================================
// Description: Clinical significance lookup by genomic coordinate
// Author: Matt Barham
// Created: 2026-10-19
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================
// Endpoint: POST {base}/graphql  body: {"query": "..."}
// Lookup is coordinate-only (start == end == POS, GRCh38); chromosome and
// gene are not part of the filter, so same-position hits on other
// chromosomes can be returned. Only the first edge is used.
// ==============================================================================

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use super::SignificanceSource;
use crate::config::PipelineConfig;
use crate::error::{LookupError, PreprocessError};
use crate::models::VariantRecord;

#[derive(Debug, Serialize)]
struct GraphQlRequest {
    query: String,
}

/// CIViC client. Holds only configuration; no pacing of its own.
#[derive(Debug, Clone)]
pub struct CivicClient {
    http: reqwest::Client,
    base_url: String,
}

impl CivicClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, PreprocessError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| PreprocessError::Http(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &PipelineConfig) -> Result<Self, PreprocessError> {
        Self::new(&config.civic_base_url)
    }

    pub fn graphql_url(&self) -> String {
        format!("{}/graphql", self.base_url)
    }

    /// GraphQL document selecting variants whose span is exactly `position`
    pub fn build_query(position: u64) -> String {
        format!(
            "query {{ variants(startPosition: {pos}, endPosition: {pos}, referenceBuild: GRCH38) \
             {{ edges {{ node {{ clinicalSignificance }} }} }} }}",
            pos = position
        )
    }

    async fn fetch(&self, position: u64, timeout: Duration) -> Result<Value, LookupError> {
        let body = GraphQlRequest {
            query: Self::build_query(position),
        };

        let response = self
            .http
            .post(self.graphql_url())
            .json(&body)
            .timeout(timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Status(status.as_u16()));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| LookupError::Decode(e.to_string()))
    }
}

#[async_trait]
impl SignificanceSource for CivicClient {
    async fn annotate(&self, variant: &VariantRecord, timeout: Duration) -> Option<String> {
        let Some(position) = variant.position() else {
            warn!("CIViC lookup skipped for {}:{}: non-numeric position", variant.chrom, variant.pos);
            return None;
        };

        match self.fetch(position, timeout).await {
            Ok(body) => {
                let significance = parse_civic_response(&body);
                if significance.is_none() {
                    debug!("CIViC: no significance for position {}", position);
                }
                significance
            }
            Err(e) => {
                warn!("CIViC lookup failed for {}:{}: {}", variant.chrom, variant.pos, e);
                None
            }
        }
    }
}

/// `data.variants.edges[0].node.clinicalSignificance`; later edges are ignored
pub fn parse_civic_response(body: &Value) -> Option<String> {
    let significance = body
        .pointer("/data/variants/edges/0/node/clinicalSignificance")?;

    match significance {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .find(|s| !s.is_empty())
            .map(str::to_string),
        _ => None,
    }
}
