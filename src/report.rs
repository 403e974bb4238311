//! Tune report
//!
//! JSON snapshot of the job ledger, written after a prewarm so the outcome
//! of each fallback preparation can be inspected offline.

use crate::error::{Error, Result};
use crate::format::FormatTag;
use crate::job::{Job, JobLedger, JobStatus, LedgerCounts};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Serialize)]
pub struct TuneReport {
    pub generated_at: String,
    pub counts: LedgerCounts,
    pub jobs: Vec<JobEntry>,
}

#[derive(Debug, Serialize)]
pub struct JobEntry {
    pub seq: u64,
    pub format: String,
    pub tag: FormatTag,
    pub status: JobStatus,
    pub path: Option<PathBuf>,
    pub size: usize,
    pub failure: Option<String>,
}

impl From<&Job> for JobEntry {
    fn from(job: &Job) -> Self {
        Self {
            seq: job.seq(),
            format: job.format_id().to_string(),
            tag: job.tag(),
            status: job.status(),
            path: job.path().map(Path::to_path_buf),
            size: job.size(),
            failure: job.failure().map(|f| f.to_string()),
        }
    }
}

impl TuneReport {
    pub fn from_ledger(ledger: &JobLedger) -> Self {
        Self {
            generated_at: chrono::Utc::now().to_rfc3339(),
            counts: ledger.counts(),
            jobs: ledger.jobs().iter().map(JobEntry::from).collect(),
        }
    }
}

/// Write the ledger snapshot to `path`, creating parent directories
pub fn write_tune_report(path: &Path, ledger: &JobLedger) -> Result<()> {
    let report = TuneReport::from_ledger(ledger);
    let json = serde_json::to_string_pretty(&report)?;

    let io_err = |source: std::io::Error| Error::Report {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
    }
    std::fs::write(path, json).map_err(io_err)?;

    info!("Tune report written to {}", path.display());
    Ok(())
}
