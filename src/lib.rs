//! bcfallback - BCn decode fallback for Xclipse drivers
//!
//! When the driver cannot sample a block-compressed format natively, this
//! crate finds the precompiled SPIR-V decoder for that format family, loads
//! it, and records the attempt in a job ledger that hosts can prewarm and
//! inspect.

pub mod capability;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod format;
pub mod fs;
pub mod gpu;
pub mod job;
pub mod loader;
pub mod logging;
pub mod report;
pub mod resolver;

pub use capability::{HardwareCapability, ProbedCapability, StaticCapability};
pub use config::{ConfigError, FallbackConfig};
pub use coordinator::{
    ensure_ready_shared, PrepareCoordinator, PrewarmSummary, SharedCoordinator,
    DEFAULT_PREWARM_FORMATS,
};
pub use error::{Error, Result};
pub use format::{classify, FormatTag};
pub use job::{FormatId, Job, JobFailure, JobLedger, JobStatus};
pub use loader::{AssetLoader, FallbackAsset, LoadError};
pub use resolver::{AssetResolver, SearchPath};
