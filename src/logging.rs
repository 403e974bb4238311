//! Diagnostics setup
//!
//! Everything logs through `tracing`. Hosts call [`init`] once to get stderr
//! output and, optionally, a side-log file that survives the process.

use crate::config::PACKAGE_SIDE_LOG;
use anyhow::Result;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Install the global subscriber.
///
/// The returned guard flushes the side log on drop and must be kept alive
/// for as long as logging is wanted.
pub fn init(verbose: bool, side_log: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::from_default_env().add_directive(if verbose {
        "bcfallback=debug".parse()?
    } else {
        "bcfallback=info".parse()?
    });

    let (file_layer, guard) = match side_log.and_then(open_side_log) {
        Some((file, _)) => {
            let (writer, guard) = tracing_appender::non_blocking(file);
            (
                Some(fmt::layer().with_ansi(false).with_writer(writer)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .try_init()?;

    Ok(guard)
}

/// Open `primary` for appending, falling back to the package log location
pub fn open_side_log(primary: &Path) -> Option<(File, PathBuf)> {
    [primary, Path::new(PACKAGE_SIDE_LOG)]
        .into_iter()
        .find_map(|candidate| open_append(candidate).map(|f| (f, candidate.to_path_buf())))
}

fn open_append(path: &Path) -> Option<File> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).ok()?;
    }
    OpenOptions::new().create(true).append(true).open(path).ok()
}
