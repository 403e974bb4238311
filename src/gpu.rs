//! GPU adapter probing
//!
//! Asks the Vulkan adapter directly whether it exposes BC texture
//! compression, as an alternative to the environment/sysfs heuristics.

use crate::capability::HardwareCapability;
use anyhow::{Context, Result};
use tracing::info;

/// Capability answer taken from a live wgpu adapter
#[derive(Debug, Clone)]
pub struct WgpuCapability {
    pub device_name: String,
    pub backend: String,
    pub bc_supported: bool,
}

fn vulkan_instance() -> wgpu::Instance {
    wgpu::Instance::new(&wgpu::InstanceDescriptor {
        backends: wgpu::Backends::VULKAN,
        ..Default::default()
    })
}

impl WgpuCapability {
    /// Query the primary Vulkan adapter
    pub fn probe() -> Result<Self> {
        let instance = vulkan_instance();

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: None,
            force_fallback_adapter: false,
        }))
        .context("No Vulkan adapter found")?;

        let cap = Self::from_adapter(&adapter);
        info!(
            "Detected GPU: {} ({}), BC compression: {}",
            cap.device_name, cap.backend, cap.bc_supported
        );
        Ok(cap)
    }

    /// Every Vulkan adapter with its BC feature bit
    pub fn enumerate() -> Vec<Self> {
        let instance = vulkan_instance();
        let adapters: Vec<wgpu::Adapter> =
            pollster::block_on(instance.enumerate_adapters(wgpu::Backends::VULKAN));

        adapters.iter().map(Self::from_adapter).collect()
    }

    fn from_adapter(adapter: &wgpu::Adapter) -> Self {
        let info = adapter.get_info();
        Self {
            device_name: info.name,
            backend: info.backend.to_str().to_string(),
            bc_supported: adapter
                .features()
                .contains(wgpu::Features::TEXTURE_COMPRESSION_BC),
        }
    }
}

impl HardwareCapability for WgpuCapability {
    fn hardware_bc(&self) -> bool {
        self.bc_supported
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capability_from_adapter_flags() {
        let cap = WgpuCapability {
            device_name: "Xclipse 940".to_string(),
            backend: "vulkan".to_string(),
            bc_supported: false,
        };
        assert!(!cap.supports_format("BC1_UNORM"));
        assert!(cap.supports_format("ASTC_4x4_UNORM"));

        let cap = WgpuCapability {
            bc_supported: true,
            ..cap
        };
        assert!(cap.supports_format("BC6H_UFLOAT"));
    }
}
