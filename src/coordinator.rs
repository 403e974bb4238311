//! Fallback preparation
//!
//! `ensure_ready` classifies a format, resolves its decoder shader, appends a
//! job and then walks every still-pending job in the ledger, loading what it
//! can. Individual failures are recorded on the job and logged; they never
//! fail the call.

use crate::capability::HardwareCapability;
use crate::config::FallbackConfig;
use crate::error::Result;
use crate::format::classify;
use crate::fs::{Filesystem, RealFs};
use crate::job::{FormatId, Job, JobFailure, JobLedger, JobStatus, DEFAULT_MAX_FORMAT_ID_LEN};
use crate::loader::AssetLoader;
use crate::resolver::{AssetResolver, SearchPath};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{info, warn};

/// Formats prewarmed at driver init when hardware BC is missing
pub const DEFAULT_PREWARM_FORMATS: &[&str] = &["BC1_UNORM", "BC3_UNORM"];

/// Formats exercised by [`PrepareCoordinator::selftest`]
pub const SELFTEST_FORMATS: &[&str] = &["BC1_UNORM", "BC3_UNORM", "BC7_UNORM"];

/// Coordinator shared between threads; append and walk run under one lock
pub type SharedCoordinator<F = RealFs> = Arc<Mutex<PrepareCoordinator<F>>>;

/// Outcome of a prewarm pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PrewarmSummary {
    /// Formats the hardware handles natively
    pub skipped: usize,
    /// Formats a job was appended for
    pub prepared: usize,
    pub ready: usize,
    pub failed: usize,
}

/// Drives classification, resolution and loading, and owns the job ledger
#[derive(Debug)]
pub struct PrepareCoordinator<F = RealFs> {
    resolver: AssetResolver<F>,
    loader: AssetLoader,
    ledger: JobLedger,
    max_format_id_len: usize,
}

impl PrepareCoordinator<RealFs> {
    pub fn new(search_path: SearchPath) -> Self {
        Self::with_resolver(AssetResolver::new(search_path), DEFAULT_MAX_FORMAT_ID_LEN)
    }

    pub fn from_config(config: &FallbackConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::with_resolver(
            AssetResolver::new(config.search_path()),
            config.max_format_id_len,
        ))
    }
}

impl Default for PrepareCoordinator<RealFs> {
    fn default() -> Self {
        Self::new(SearchPath::default())
    }
}

impl<F: Filesystem> PrepareCoordinator<F> {
    pub fn with_resolver(resolver: AssetResolver<F>, max_format_id_len: usize) -> Self {
        Self {
            resolver,
            loader: AssetLoader::new(),
            ledger: JobLedger::new(),
            max_format_id_len,
        }
    }

    pub fn ledger(&self) -> &JobLedger {
        &self.ledger
    }

    pub fn resolver(&self) -> &AssetResolver<F> {
        &self.resolver
    }

    /// Record a preparation attempt for `format_id` and process pending jobs.
    ///
    /// Every call appends a new job, even for a format that is already
    /// ready. Only a failure to grow the ledger is returned as an error.
    pub fn ensure_ready(&mut self, format_id: &str) -> Result<()> {
        let tag = classify(Some(format_id));
        let path = self.resolver.resolve_for(format_id, tag);
        let job = Job::pending(FormatId::new(format_id, self.max_format_id_len), tag, path);

        self.ledger.append(job)?;
        self.process_pending();
        Ok(())
    }

    /// Walk the whole ledger and settle every pending job
    fn process_pending(&mut self) {
        let loader = &self.loader;

        for job in self.ledger.pending_mut() {
            let Some(result) = job.path().map(|p| loader.load(p)) else {
                warn!("Failed to prepare fallback {}: {}", job.format_id(), JobFailure::NotFound);
                job.fail(JobFailure::NotFound);
                continue;
            };

            match result {
                Ok(asset) => {
                    job.complete(asset);
                    match job.status() {
                        JobStatus::Ready => {
                            info!("Prepared fallback {} size={}", job.format_id(), job.size())
                        }
                        _ => warn!("Failed to prepare fallback {}: empty shader", job.format_id()),
                    }
                }
                Err(e) => {
                    warn!("Failed to prepare fallback {}: {}", job.format_id(), e);
                    job.fail(e.into());
                }
            }
        }
    }

    /// Prepare fallbacks for every format the hardware cannot sample natively
    pub fn prewarm<C, S>(&mut self, capability: &C, formats: &[S]) -> Result<PrewarmSummary>
    where
        C: HardwareCapability + ?Sized,
        S: AsRef<str>,
    {
        let mut summary = PrewarmSummary::default();

        for format in formats {
            let format = format.as_ref();
            if capability.supports_format(format) {
                summary.skipped += 1;
                continue;
            }

            self.ensure_ready(format)?;
            summary.prepared += 1;
            match self.ledger.latest().map(Job::status) {
                Some(JobStatus::Ready) => summary.ready += 1,
                Some(JobStatus::Failed) => summary.failed += 1,
                _ => {}
            }
        }

        info!(
            "Prewarm complete: prepared={} ready={} failed={} skipped={}",
            summary.prepared, summary.ready, summary.failed, summary.skipped
        );
        Ok(summary)
    }

    /// Prepare the selftest formats regardless of hardware support
    pub fn selftest(&mut self) -> Result<()> {
        info!("Fallback selftest");
        for format in SELFTEST_FORMATS {
            self.ensure_ready(format)?;
        }
        info!("Fallback selftest complete");
        Ok(())
    }

    pub fn into_shared(self) -> SharedCoordinator<F> {
        Arc::new(Mutex::new(self))
    }
}

/// `ensure_ready` on a shared coordinator, holding the lock for append and walk
pub fn ensure_ready_shared<F: Filesystem>(
    shared: &Mutex<PrepareCoordinator<F>>,
    format_id: &str,
) -> Result<()> {
    shared
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .ensure_ready(format_id)
}
