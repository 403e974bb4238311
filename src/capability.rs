//! Hardware BC support detection
//!
//! Decides whether the native driver path can sample a BCn format, which in
//! turn decides whether a fallback decoder has to be prepared at all.
//!
//! Detection order:
//! 1. `XCLIPSE_DISABLE_ALL_HW_BC` set -> no hardware BC
//! 2. `XCLIPSE_FORCE_HW_BC` set -> parsed as a bool
//! 3. a DRM device whose kernel module looks like an Xclipse driver
//! 4. any DRM card node
//! 5. assume hardware support

use crate::format::classify;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{debug, info};

pub const ENV_DISABLE_ALL_HW_BC: &str = "XCLIPSE_DISABLE_ALL_HW_BC";
pub const ENV_FORCE_HW_BC: &str = "XCLIPSE_FORCE_HW_BC";

const DRM_CLASS_ROOT: &str = "/sys/class/drm";
const DRI_CARD0: &str = "/dev/dri/card0";
const DRIVER_MODULE_HINTS: &[&str] = &["xcl", "xclipse", "xeno"];

/// Answers whether hardware can natively sample a format
pub trait HardwareCapability {
    /// Whether the hardware samples BCn blocks at all
    fn hardware_bc(&self) -> bool;

    /// Formats outside the BCn families always count as supported
    fn supports_format(&self, format_id: &str) -> bool {
        !classify(Some(format_id)).is_known() || self.hardware_bc()
    }
}

/// Fixed answer, for hosts that already know
#[derive(Debug, Clone, Copy)]
pub struct StaticCapability(pub bool);

impl HardwareCapability for StaticCapability {
    fn hardware_bc(&self) -> bool {
        self.0
    }
}

/// How the hardware decision was reached
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetectionSource {
    DisabledByEnv,
    ForcedByEnv,
    DriverModule(String),
    DriCard,
    Default,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HwDecision {
    pub supported: bool,
    pub source: DetectionSource,
}

/// Environment overrides for detection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvOverrides {
    pub disable_all: bool,
    pub force_hw: Option<bool>,
}

impl EnvOverrides {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.is_empty());

        Self {
            disable_all: non_empty(ENV_DISABLE_ALL_HW_BC).is_some(),
            force_hw: non_empty(ENV_FORCE_HW_BC).map(|v| parse_bool_default(&v, true)),
        }
    }
}

/// "1"/"true" and "0"/"false" (case-insensitive), anything else is `default`
fn parse_bool_default(value: &str, default: bool) -> bool {
    if value == "1" || value.eq_ignore_ascii_case("true") {
        true
    } else if value == "0" || value.eq_ignore_ascii_case("false") {
        false
    } else {
        default
    }
}

/// Environment and sysfs based detection.
///
/// The first capability query runs [`ProbedCapability::detect`] and the
/// decision is reused for every later format.
#[derive(Debug, Clone)]
pub struct ProbedCapability {
    overrides: EnvOverrides,
    drm_root: PathBuf,
    dri_card: PathBuf,
    decision: OnceLock<HwDecision>,
}

impl ProbedCapability {
    pub fn from_env() -> Self {
        Self::with_roots(EnvOverrides::from_env(), DRM_CLASS_ROOT, DRI_CARD0)
    }

    pub fn with_roots(
        overrides: EnvOverrides,
        drm_root: impl Into<PathBuf>,
        dri_card: impl Into<PathBuf>,
    ) -> Self {
        Self {
            overrides,
            drm_root: drm_root.into(),
            dri_card: dri_card.into(),
            decision: OnceLock::new(),
        }
    }

    /// Cached detection result
    pub fn decision(&self) -> &HwDecision {
        self.decision.get_or_init(|| self.detect())
    }

    /// Run detection and log the result
    pub fn detect(&self) -> HwDecision {
        let decision = self.run_detection();
        info!(
            "BC hardware detection result: {} ({:?})",
            decision.supported, decision.source
        );
        decision
    }

    fn run_detection(&self) -> HwDecision {
        if self.overrides.disable_all {
            return HwDecision {
                supported: false,
                source: DetectionSource::DisabledByEnv,
            };
        }

        if let Some(forced) = self.overrides.force_hw {
            if !forced {
                info!("HW BC disabled by env");
            }
            return HwDecision {
                supported: forced,
                source: DetectionSource::ForcedByEnv,
            };
        }

        if let Some(module) = find_xclipse_module(&self.drm_root) {
            return HwDecision {
                supported: true,
                source: DetectionSource::DriverModule(module),
            };
        }

        if self.dri_card.exists() {
            return HwDecision {
                supported: true,
                source: DetectionSource::DriCard,
            };
        }

        HwDecision {
            supported: true,
            source: DetectionSource::Default,
        }
    }
}

impl HardwareCapability for ProbedCapability {
    fn hardware_bc(&self) -> bool {
        let decision = self.decision();
        debug!("HW BC: {} ({:?})", decision.supported, decision.source);
        decision.supported
    }
}

/// Scan `<drm_root>/*/device/driver/module` links for an Xclipse kernel module
fn find_xclipse_module(drm_root: &Path) -> Option<String> {
    let entries = std::fs::read_dir(drm_root).ok()?;

    entries.filter_map(|e| e.ok()).find_map(|entry| {
        let name = entry.file_name();
        if name.to_string_lossy().starts_with('.') {
            return None;
        }

        let link = entry.path().join("device").join("driver").join("module");
        let target = std::fs::read_link(&link).ok()?;
        let target = target.to_string_lossy().to_lowercase();

        DRIVER_MODULE_HINTS
            .iter()
            .any(|hint| target.contains(hint))
            .then_some(target)
    })
}
