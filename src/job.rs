//! Fallback preparation jobs and the ledger that records them
//!
//! Every preparation attempt appends one [`Job`]. Jobs are never merged or
//! evicted: preparing the same format twice leaves two records.

use crate::error::{Error, Result};
use crate::format::FormatTag;
use crate::loader::{FallbackAsset, LoadError};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Default cap on stored format names, in bytes
pub const DEFAULT_MAX_FORMAT_ID_LEN: usize = 63;

/// Format name as stored on a job, capped at a fixed byte length.
///
/// Longer inputs are cut at the last char boundary that fits; this is a
/// storage cap, not a validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct FormatId(String);

impl FormatId {
    pub fn new(raw: &str, max_len: usize) -> Self {
        if raw.len() <= max_len {
            return Self(raw.to_string());
        }

        let mut end = max_len;
        while !raw.is_char_boundary(end) {
            end -= 1;
        }
        Self(raw[..end].to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FormatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Ready,
    Failed,
}

impl JobStatus {
    pub fn name(self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Ready => "ready",
            JobStatus::Failed => "failed",
        }
    }
}

/// Why a job ended up `Failed`
#[derive(Debug, thiserror::Error)]
pub enum JobFailure {
    #[error("no fallback shader found in any search path")]
    NotFound,

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("fallback shader {0} is empty")]
    EmptyAsset(PathBuf),
}

/// One fallback preparation attempt
#[derive(Debug)]
pub struct Job {
    seq: u64,
    format_id: FormatId,
    tag: FormatTag,
    path: Option<PathBuf>,
    asset: Option<FallbackAsset>,
    status: JobStatus,
    failure: Option<JobFailure>,
}

impl Job {
    pub(crate) fn pending(format_id: FormatId, tag: FormatTag, path: Option<PathBuf>) -> Self {
        Self {
            seq: 0,
            format_id,
            tag,
            path,
            asset: None,
            status: JobStatus::Pending,
            failure: None,
        }
    }

    /// Position in the ledger, starting at 0
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn format_id(&self) -> &FormatId {
        &self.format_id
    }

    pub fn tag(&self) -> FormatTag {
        self.tag
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn asset(&self) -> Option<&FallbackAsset> {
        self.asset.as_ref()
    }

    /// Loaded blob size, 0 unless ready
    pub fn size(&self) -> usize {
        self.asset.as_ref().map_or(0, FallbackAsset::len)
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    pub fn failure(&self) -> Option<&JobFailure> {
        self.failure.as_ref()
    }

    pub fn is_pending(&self) -> bool {
        self.status == JobStatus::Pending
    }

    /// Only non-empty blobs make a job ready
    pub(crate) fn complete(&mut self, asset: FallbackAsset) {
        if asset.is_empty() {
            self.fail(JobFailure::EmptyAsset(asset.path().to_path_buf()));
            return;
        }
        self.asset = Some(asset);
        self.status = JobStatus::Ready;
    }

    pub(crate) fn fail(&mut self, failure: JobFailure) {
        self.asset = None;
        self.failure = Some(failure);
        self.status = JobStatus::Failed;
    }
}

/// Tally of job states
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LedgerCounts {
    pub pending: usize,
    pub ready: usize,
    pub failed: usize,
}

/// Append-only record of preparation attempts, oldest first
#[derive(Debug, Default)]
pub struct JobLedger {
    jobs: Vec<Job>,
}

impl JobLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a job, returning its sequence number.
    ///
    /// Fails only if the ledger cannot grow.
    pub(crate) fn append(&mut self, mut job: Job) -> Result<u64> {
        self.jobs.try_reserve(1).map_err(|source| Error::LedgerAppend {
            format_id: job.format_id.to_string(),
            source,
        })?;
        let seq = self.jobs.len() as u64;
        job.seq = seq;
        self.jobs.push(job);
        Ok(seq)
    }

    /// Still-pending jobs, newest first
    pub(crate) fn pending_mut(&mut self) -> impl Iterator<Item = &mut Job> {
        self.jobs.iter_mut().rev().filter(|j| j.is_pending())
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn get(&self, seq: u64) -> Option<&Job> {
        usize::try_from(seq).ok().and_then(|i| self.jobs.get(i))
    }

    pub fn latest(&self) -> Option<&Job> {
        self.jobs.last()
    }

    /// All jobs recorded for `format_id`, oldest first
    pub fn for_format<'a>(&'a self, format_id: &'a str) -> impl Iterator<Item = &'a Job> + 'a {
        self.jobs.iter().filter(move |j| j.format_id.as_str() == format_id)
    }

    /// Most recent ready job for a format family
    pub fn ready_for_tag(&self, tag: FormatTag) -> Option<&Job> {
        self.jobs
            .iter()
            .rev()
            .find(|j| j.tag == tag && j.status == JobStatus::Ready)
    }

    pub fn counts(&self) -> LedgerCounts {
        self.jobs.iter().fold(LedgerCounts::default(), |mut c, j| {
            match j.status {
                JobStatus::Pending => c.pending += 1,
                JobStatus::Ready => c.ready += 1,
                JobStatus::Failed => c.failed += 1,
            }
            c
        })
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(name: &str, tag: FormatTag) -> Job {
        Job::pending(FormatId::new(name, DEFAULT_MAX_FORMAT_ID_LEN), tag, None)
    }

    #[test]
    fn test_format_id_short_kept() {
        let id = FormatId::new("BC1_UNORM", DEFAULT_MAX_FORMAT_ID_LEN);
        assert_eq!(id.as_str(), "BC1_UNORM");
    }

    #[test]
    fn test_format_id_truncated() {
        let long = "X".repeat(200);
        let id = FormatId::new(&long, DEFAULT_MAX_FORMAT_ID_LEN);
        assert_eq!(id.as_str().len(), 63);
    }

    #[test]
    fn test_format_id_truncates_on_char_boundary() {
        // 'é' is two bytes; a cap of 4 would split the second one
        let id = FormatId::new("BCéé", 4);
        assert_eq!(id.as_str(), "BCé");
    }

    #[test]
    fn test_append_assigns_sequence() {
        let mut ledger = JobLedger::new();
        assert_eq!(ledger.append(job("BC1_UNORM", FormatTag::BC1)).unwrap(), 0);
        assert_eq!(ledger.append(job("BC1_UNORM", FormatTag::BC1)).unwrap(), 1);
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.for_format("BC1_UNORM").count(), 2);
        assert_eq!(ledger.get(1).unwrap().seq(), 1);
    }

    #[test]
    fn test_pending_walk_is_newest_first() {
        let mut ledger = JobLedger::new();
        ledger.append(job("A", FormatTag::Unknown)).unwrap();
        ledger.append(job("B", FormatTag::Unknown)).unwrap();
        ledger.append(job("C", FormatTag::Unknown)).unwrap();
        ledger.jobs[1].fail(JobFailure::NotFound);

        let order: Vec<String> = ledger
            .pending_mut()
            .map(|j| j.format_id().to_string())
            .collect();
        assert_eq!(order, vec!["C", "A"]);
    }

    #[test]
    fn test_empty_asset_fails_job() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("bc1.spv");
        std::fs::write(&path, b"").unwrap();
        let asset = crate::loader::AssetLoader::new().load(&path).unwrap();

        let mut j = job("BC1_UNORM", FormatTag::BC1);
        j.complete(asset);
        assert_eq!(j.status(), JobStatus::Failed);
        assert!(matches!(j.failure(), Some(JobFailure::EmptyAsset(_))));
        assert!(j.asset().is_none());
    }

    #[test]
    fn test_counts() {
        let mut ledger = JobLedger::new();
        ledger.append(job("A", FormatTag::Unknown)).unwrap();
        ledger.append(job("B", FormatTag::Unknown)).unwrap();
        ledger.jobs[0].fail(JobFailure::NotFound);

        assert_eq!(
            ledger.counts(),
            LedgerCounts {
                pending: 1,
                ready: 0,
                failed: 1
            }
        );
    }
}
