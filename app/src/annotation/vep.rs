// ==============================================================================
// annotation/vep.rs - Ensembl VEP REST Client
// ==============================================================================
// Description: gnomAD allele frequency and most severe consequence per variant
// Author: Matt Barham
// Created: 2026-10-19
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================
// Endpoint: GET {base}/vep/human/region/{chrom}:{pos}-{pos}:{ref}/{alt}/1
//           ?canonical=1&vcf_string=1&variant_class=1
// ==============================================================================

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use super::FrequencyAnnotator;
use crate::config::PipelineConfig;
use crate::error::{LookupError, PreprocessError};
use crate::models::{AnnotationResult, VariantRecord};

const GNOMAD_GENOMES: &str = "gnomadg";
const GNOMAD_EXOMES: &str = "gnomade";

/// Ensembl VEP client. Holds only configuration; no pacing of its own.
#[derive(Debug, Clone)]
pub struct VepClient {
    http: reqwest::Client,
    base_url: String,
    grch37_base_url: String,
}

impl VepClient {
    pub fn new(
        base_url: impl Into<String>,
        grch37_base_url: impl Into<String>,
    ) -> Result<Self, PreprocessError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| PreprocessError::Http(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            grch37_base_url: grch37_base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &PipelineConfig) -> Result<Self, PreprocessError> {
        Self::new(&config.vep_base_url, &config.vep_grch37_base_url)
    }

    /// Region query, forward strand: `{chrom}:{pos}-{pos}:{ref}/{alt}/1`
    pub fn region_path(variant: &VariantRecord) -> String {
        format!(
            "{chrom}:{pos}-{pos}:{ref_allele}/{alt}/1",
            chrom = variant.chrom,
            pos = variant.pos,
            ref_allele = variant.ref_allele,
            alt = variant.alt_allele,
        )
    }

    /// Full request URL (without query string) for the given assembly
    pub fn request_url(&self, variant: &VariantRecord, assembly: &str) -> String {
        format!(
            "{}/vep/human/region/{}",
            self.endpoint(assembly),
            Self::region_path(variant)
        )
    }

    fn endpoint(&self, assembly: &str) -> &str {
        let lower = assembly.to_lowercase();
        if lower.contains("grch37") || lower.contains("hg19") {
            &self.grch37_base_url
        } else {
            &self.base_url
        }
    }

    async fn fetch(
        &self,
        variant: &VariantRecord,
        assembly: &str,
        timeout: Duration,
    ) -> Result<Value, LookupError> {
        let url = self.request_url(variant, assembly);
        debug!("VEP request: {}", url);

        let response = self
            .http
            .get(&url)
            .query(&[("canonical", "1"), ("vcf_string", "1"), ("variant_class", "1")])
            .header(ACCEPT, "application/json")
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
impl FrequencyAnnotator for VepClient {
    async fn annotate(
        &self,
        variant: &VariantRecord,
        assembly: &str,
        timeout: Duration,
    ) -> AnnotationResult {
        match self.fetch(variant, assembly, timeout).await {
            Ok(body) => parse_vep_response(&body),
            Err(e) => {
                warn!(
                    "VEP lookup failed for {}:{} {}>{}: {}",
                    variant.chrom, variant.pos, variant.ref_allele, variant.alt_allele, e
                );
                AnnotationResult::unknown()
            }
        }
    }
}

/// Interpret a VEP region response.
///
/// Frequency is the maximum gnomAD genomes value across all colocated
/// variants; failing that, the gnomAD exomes value of the first colocated
/// variant carrying either population.
pub fn parse_vep_response(body: &Value) -> AnnotationResult {
    // The region endpoint returns an array with one entry per input variant
    let entry = match body {
        Value::Array(items) => items.first(),
        other => Some(other),
    };
    let Some(entry) = entry else {
        return AnnotationResult::unknown();
    };

    let colocated: &[Value] = entry
        .get("colocated_variants")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[]);

    let genomes = colocated
        .iter()
        .flat_map(|cv| population_frequencies(cv, GNOMAD_GENOMES))
        .reduce(f64::max);

    let gnomad_af = genomes.or_else(|| {
        colocated
            .iter()
            .find(|cv| {
                !population_frequencies(cv, GNOMAD_GENOMES).is_empty()
                    || !population_frequencies(cv, GNOMAD_EXOMES).is_empty()
            })
            .and_then(|cv| population_frequencies(cv, GNOMAD_EXOMES).into_iter().reduce(f64::max))
    });

    let consequence = entry
        .get("most_severe_consequence")
        .and_then(Value::as_str)
        .map(str::to_string);

    AnnotationResult {
        gnomad_af,
        consequence,
    }
}

/// Usable frequencies for one population in a colocated variant.
///
/// Accepts both `frequencies.gnomADg` and the per-allele form
/// `frequencies.{allele}.gnomadg`; keys compare case-insensitively.
fn population_frequencies(colocated: &Value, population: &str) -> Vec<f64> {
    let Some(frequencies) = colocated.get("frequencies").and_then(Value::as_object) else {
        return Vec::new();
    };

    let mut values = Vec::new();
    for (key, value) in frequencies {
        if key.eq_ignore_ascii_case(population) {
            values.extend(as_frequency(value));
        } else if let Some(per_allele) = value.as_object() {
            values.extend(
                per_allele
                    .iter()
                    .filter(|(k, _)| k.eq_ignore_ascii_case(population))
                    .filter_map(|(_, v)| as_frequency(v)),
            );
        }
    }
    values
}

fn as_frequency(value: &Value) -> Option<f64> {
    let af = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }?;
    (af.is_finite() && af >= 0.0).then_some(af)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::test_server::serve_once;
    use serde_json::json;

    fn variant(chrom: &str, pos: &str, ref_allele: &str, alt: &str) -> VariantRecord {
        VariantRecord {
            chrom: chrom.to_string(),
            pos: pos.to_string(),
            id: ".".to_string(),
            ref_allele: ref_allele.to_string(),
            alt_allele: alt.to_string(),
            qual: ".".to_string(),
            filter: ".".to_string(),
            info: ".".to_string(),
            trailing: Vec::new(),
            line: String::new(),
        }
    }

    #[test]
    fn test_region_path() {
        let v = variant("7", "140753336", "A", "T");
        assert_eq!(VepClient::region_path(&v), "7:140753336-140753336:A/T/1");
    }

    #[test]
    fn test_endpoint_follows_assembly() {
        let client = VepClient::new("https://rest.ensembl.org/", "https://grch37.rest.ensembl.org").unwrap();
        let v = variant("1", "100", "C", "G");

        assert_eq!(
            client.request_url(&v, "GRCh38"),
            "https://rest.ensembl.org/vep/human/region/1:100-100:C/G/1"
        );
        assert_eq!(
            client.request_url(&v, "hg19"),
            "https://grch37.rest.ensembl.org/vep/human/region/1:100-100:C/G/1"
        );
    }

    #[test]
    fn test_max_genomes_frequency() {
        let body = json!([{
            "most_severe_consequence": "missense_variant",
            "colocated_variants": [
                {"frequencies": {"T": {"gnomadg": 0.0012, "gnomade": 0.5}}},
                {"id": "COSV1"},
                {"frequencies": {"T": {"gnomadg": 0.0031}}}
            ]
        }]);

        let result = parse_vep_response(&body);
        assert_eq!(result.gnomad_af, Some(0.0031));
        assert_eq!(result.consequence.as_deref(), Some("missense_variant"));
    }

    #[test]
    fn test_flat_population_keys() {
        let body = json!({
            "colocated_variants": [{"frequencies": {"gnomADg": 0.25}}]
        });
        assert_eq!(parse_vep_response(&body).gnomad_af, Some(0.25));
    }

    #[test]
    fn test_exomes_fallback_uses_first_carrier() {
        let body = json!([{
            "colocated_variants": [
                {"frequencies": {"A": {"af": 0.3}}},
                {"frequencies": {"A": {"gnomade": 0.02}}},
                {"frequencies": {"A": {"gnomade": 0.09}}}
            ]
        }]);
        assert_eq!(parse_vep_response(&body).gnomad_af, Some(0.02));
    }

    #[test]
    fn test_missing_data_is_unknown() {
        let body = json!([{"colocated_variants": [{"frequencies": {"A": {"af": 0.3}}}]}]);
        let result = parse_vep_response(&body);
        assert_eq!(result.gnomad_af, None);
        assert_eq!(result.consequence, None);

        assert_eq!(parse_vep_response(&json!([])), AnnotationResult::unknown());
    }

    #[test]
    fn test_negative_or_invalid_frequencies_ignored() {
        let body = json!([{
            "colocated_variants": [{"frequencies": {"A": {"gnomadg": -1.0, "gnomade": "0.004"}}}]
        }]);
        assert_eq!(parse_vep_response(&body).gnomad_af, Some(0.004));
    }

    #[tokio::test]
    async fn test_unreachable_service_degrades_to_unknown() {
        // Port 9 (discard) on localhost is not serving HTTP
        let client = VepClient::new("http://127.0.0.1:9", "http://127.0.0.1:9").unwrap();
        let result = client
            .annotate(&variant("1", "100", "A", "G"), "GRCh38", Duration::from_millis(500))
            .await;
        assert_eq!(result, AnnotationResult::unknown());
    }

    #[tokio::test]
    async fn test_request_shape_and_success() {
        let (base, server) = serve_once(
            "200 OK",
            r#"[{"most_severe_consequence":"missense_variant","colocated_variants":[{"frequencies":{"T":{"gnomadg":0.0031}}}]}]"#,
            Duration::ZERO,
        )
        .await;
        let client = VepClient::new(&base, &base).unwrap();

        let result = client
            .annotate(&variant("7", "140753336", "A", "T"), "GRCh38", Duration::from_secs(5))
            .await;
        let request = server.await.unwrap();

        assert_eq!(
            request.request_line,
            "GET /vep/human/region/7:140753336-140753336:A/T/1?canonical=1&vcf_string=1&variant_class=1 HTTP/1.1"
        );
        assert_eq!(result.gnomad_af, Some(0.0031));
        assert_eq!(result.consequence.as_deref(), Some("missense_variant"));
    }

    #[tokio::test]
    async fn test_error_status_degrades_to_unknown() {
        let (base, server) = serve_once("503 Service Unavailable", "{}", Duration::ZERO).await;
        let client = VepClient::new(&base, &base).unwrap();

        let result = client
            .annotate(&variant("7", "140753336", "A", "T"), "GRCh38", Duration::from_secs(5))
            .await;
        server.await.unwrap();

        assert_eq!(result, AnnotationResult::unknown());
    }

    #[tokio::test]
    async fn test_slow_service_times_out_to_unknown() {
        let (base, server) = serve_once(
            "200 OK",
            r#"[{"most_severe_consequence":"missense_variant"}]"#,
            Duration::from_secs(2),
        )
        .await;
        let client = VepClient::new(&base, &base).unwrap();

        let result = client
            .annotate(&variant("7", "140753336", "A", "T"), "GRCh38", Duration::from_millis(50))
            .await;
        server.abort();

        assert_eq!(result, AnnotationResult::unknown());
    }
}
