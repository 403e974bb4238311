//! bcfallback - BCn decode fallback for Xclipse drivers
//!
//! Command-line host for probing BC support and prewarming fallback
//! decoder shaders.

use anyhow::{Context, Result};
use bcfallback::capability::{DetectionSource, ProbedCapability};
use bcfallback::coordinator::{PrepareCoordinator, DEFAULT_PREWARM_FORMATS};
use bcfallback::gpu::WgpuCapability;
use bcfallback::{classify, report, FallbackConfig, HardwareCapability, JobLedger};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "bcfallback")]
#[command(version)]
#[command(about = "Resolve and prewarm BCn fallback decode shaders")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging (use RUST_LOG=debug for more detail)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// JSON config file (search paths, format id cap, report location)
    #[arg(short, long, global = true, env = "BCFALLBACK_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Prepare fallbacks for formats the hardware cannot sample
    Prewarm {
        /// Format names (defaults to BC1_UNORM and BC3_UNORM)
        formats: Vec<String>,

        /// Decide hardware support from the Vulkan adapter instead of env/sysfs
        #[arg(long)]
        wgpu: bool,

        /// Skip the capability check and prepare every format
        #[arg(long)]
        force: bool,
    },

    /// Show where the fallback shader for a format would be loaded from
    Resolve {
        /// Format name, e.g. VK_FORMAT_BC7_UNORM_BLOCK
        format: String,
    },

    /// Report hardware BC detection
    Probe {
        /// Also query Vulkan adapters through wgpu
        #[arg(long)]
        wgpu: bool,
    },

    /// Prepare BC1, BC3 and BC7 fallbacks unconditionally
    Selftest,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => FallbackConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => FallbackConfig::default(),
    }
    .with_env_overrides();

    let _log_guard = bcfallback::logging::init(cli.verbose, config.side_log.as_deref())?;

    match cli.command {
        Commands::Prewarm {
            formats,
            wgpu,
            force,
        } => {
            let formats: Vec<String> = if formats.is_empty() {
                DEFAULT_PREWARM_FORMATS.iter().map(|s| s.to_string()).collect()
            } else {
                formats
            };

            let capability: Box<dyn HardwareCapability> = if force {
                Box::new(bcfallback::StaticCapability(false))
            } else if wgpu {
                Box::new(WgpuCapability::probe()?)
            } else {
                Box::new(ProbedCapability::from_env())
            };

            let mut coordinator = PrepareCoordinator::from_config(&config)?;
            let summary = coordinator.prewarm(capability.as_ref(), formats.as_slice())?;

            println!(
                "Prepared {} (ready {}, failed {}), skipped {} with hardware support",
                summary.prepared, summary.ready, summary.failed, summary.skipped
            );
            print_ledger(coordinator.ledger());

            report::write_tune_report(&config.tune_report, coordinator.ledger())?;
            println!("Report: {}", config.tune_report.display());
        }

        Commands::Resolve { format } => {
            let tag = classify(Some(&format));
            let coordinator = PrepareCoordinator::from_config(&config)?;

            println!("Format: {}", format);
            println!("Family: {}", tag);
            match coordinator.resolver().resolve_for(&format, tag) {
                Some(path) => println!("Shader: {}", path.display()),
                None => println!("Shader: not found"),
            }
        }

        Commands::Probe { wgpu } => {
            let decision = ProbedCapability::from_env().detect();
            let source = match &decision.source {
                DetectionSource::DisabledByEnv => "disabled by environment".to_string(),
                DetectionSource::ForcedByEnv => "forced by environment".to_string(),
                DetectionSource::DriverModule(m) => format!("driver module {}", m),
                DetectionSource::DriCard => "DRM card node present".to_string(),
                DetectionSource::Default => "default".to_string(),
            };
            println!("BC hardware detection result: {} ({})", decision.supported, source);

            if wgpu {
                let adapters = WgpuCapability::enumerate();
                if adapters.is_empty() {
                    println!("No Vulkan adapters found");
                }
                for (i, cap) in adapters.iter().enumerate() {
                    println!(
                        "GPU {}: {} ({}), BC compression {}",
                        i,
                        cap.device_name,
                        cap.backend,
                        if cap.bc_supported { "supported" } else { "missing" }
                    );
                }
            }
        }

        Commands::Selftest => {
            let mut coordinator = PrepareCoordinator::from_config(&config)?;
            coordinator.selftest()?;
            print_ledger(coordinator.ledger());
        }
    }

    Ok(())
}

fn print_ledger(ledger: &JobLedger) {
    println!("\n=== Fallback Jobs ===");
    for job in ledger.jobs() {
        let detail = match (job.path(), job.failure()) {
            (_, Some(failure)) => failure.to_string(),
            (Some(path), None) => format!("{} ({} bytes)", path.display(), job.size()),
            (None, None) => String::new(),
        };
        println!(
            "  #{:<3} {:<24} {:<5} {:<8} {}",
            job.seq(),
            job.format_id(),
            job.tag(),
            job.status().name(),
            detail
        );
    }
}
