//! Crate-level errors
//!
//! Per-job resolution and load failures never show up here; they are kept
//! on the job record. These are the failures that abort a call.

use crate::config::ConfigError;
use std::collections::TryReserveError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Cannot append job for {format_id} to ledger: {source}")]
    LedgerAppend {
        format_id: String,
        #[source]
        source: TryReserveError,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to write tune report {path}: {source}")]
    Report {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode tune report: {0}")]
    ReportEncode(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
