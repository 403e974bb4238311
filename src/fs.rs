//! Filesystem seam used by asset resolution
//!
//! Resolution only ever needs an existence probe, so the trait is kept to
//! that. Tests swap in a counting stub to prove that some paths never touch
//! the disk.

use std::path::Path;

/// Existence probe over some filesystem
pub trait Filesystem {
    /// True if `path` names an entry that can be stat'ed
    fn exists(&self, path: &Path) -> bool;
}

/// The real filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct RealFs;

impl Filesystem for RealFs {
    fn exists(&self, path: &Path) -> bool {
        std::fs::metadata(path).is_ok()
    }
}

impl<F: Filesystem + ?Sized> Filesystem for &F {
    fn exists(&self, path: &Path) -> bool {
        (**self).exists(path)
    }
}
