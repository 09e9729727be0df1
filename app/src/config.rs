// ==============================================================================
// config.rs - Pipeline Configuration
// ==============================================================================
// Description: Assembly, service endpoints, timeouts and pacing intervals
// Author: Matt Barham
// Created: 2026-10-19
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::PreprocessError;

pub const DEFAULT_ASSEMBLY: &str = "GRCh38";
pub const DEFAULT_VEP_BASE_URL: &str = "https://rest.ensembl.org";
pub const DEFAULT_VEP_GRCH37_BASE_URL: &str = "https://grch37.rest.ensembl.org";
pub const DEFAULT_CIVIC_BASE_URL: &str = "https://civicdb.org/api";

/// Runtime settings for one preprocessing run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Reference assembly name written to ##reference= and used for VEP routing
    pub genome_assembly: String,

    /// VEP request timeout (seconds)
    pub vep_timeout: u64,

    /// CIViC request timeout (seconds)
    pub civic_timeout: u64,

    pub vep_base_url: String,
    pub vep_grch37_base_url: String,
    pub civic_base_url: String,

    /// Minimum gap between VEP calls (milliseconds)
    pub vep_interval_ms: u64,

    /// Minimum gap between CIViC calls (milliseconds)
    pub civic_interval_ms: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            genome_assembly: DEFAULT_ASSEMBLY.to_string(),
            vep_timeout: 120,
            civic_timeout: 60,
            vep_base_url: DEFAULT_VEP_BASE_URL.to_string(),
            vep_grch37_base_url: DEFAULT_VEP_GRCH37_BASE_URL.to_string(),
            civic_base_url: DEFAULT_CIVIC_BASE_URL.to_string(),
            vep_interval_ms: 300,
            civic_interval_ms: 500,
        }
    }
}

impl PipelineConfig {
    /// Load from a JSON file; absent keys take their defaults
    pub fn from_json_file(path: &Path) -> Result<Self, PreprocessError> {
        let text = std::fs::read_to_string(path).map_err(|e| PreprocessError::io(path, e))?;
        serde_json::from_str(&text).map_err(|e| {
            PreprocessError::io(
                path,
                std::io::Error::new(std::io::ErrorKind::InvalidData, e),
            )
        })
    }

    pub fn vep_timeout(&self) -> Duration {
        Duration::from_secs(self.vep_timeout)
    }

    pub fn civic_timeout(&self) -> Duration {
        Duration::from_secs(self.civic_timeout)
    }

    pub fn vep_interval(&self) -> Duration {
        Duration::from_millis(self.vep_interval_ms)
    }

    pub fn civic_interval(&self) -> Duration {
        Duration::from_millis(self.civic_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.genome_assembly, "GRCh38");
        assert_eq!(config.vep_timeout(), Duration::from_secs(120));
        assert_eq!(config.civic_timeout(), Duration::from_secs(60));
        assert_eq!(config.vep_interval(), Duration::from_millis(300));
        assert_eq!(config.civic_interval(), Duration::from_millis(500));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"vep_timeout": 30, "civic_base_url": "http://localhost:3000/api"}}"#).unwrap();
        file.flush().unwrap();

        let config = PipelineConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.vep_timeout, 30);
        assert_eq!(config.civic_timeout, 60);
        assert_eq!(config.civic_base_url, "http://localhost:3000/api");
        assert_eq!(config.genome_assembly, "GRCh38");
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "not json").unwrap();
        file.flush().unwrap();

        assert!(PipelineConfig::from_json_file(file.path()).is_err());
    }
}
