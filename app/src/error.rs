// ==============================================================================
// error.rs - Error Types
// ==============================================================================
// Description: Fatal (document-level) and non-fatal (per-lookup) error tiers
// Author: Matt Barham
// Created: 2026-10-19
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================

use std::path::PathBuf;
use thiserror::Error;

/// Fatal preprocessing errors. Any of these aborts the run before the
/// output file is created.
#[derive(Error, Debug)]
pub enum PreprocessError {
    #[error("Input file not found: {0}")]
    InputNotFound(PathBuf),

    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid VCF format: {0}")]
    Format(String),

    #[error("VCF contains no data records after the #CHROM header")]
    Empty,

    #[error("Failed to initialise HTTP client: {0}")]
    Http(String),
}

impl PreprocessError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PreprocessError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Errors from a single external lookup. Never propagated past a client's
/// `annotate`; they degrade that variant's annotation to "unknown".
#[derive(Error, Debug)]
pub enum LookupError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP status {0}")]
    Status(u16),

    #[error("malformed response: {0}")]
    Decode(String),
}
