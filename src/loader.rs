//! Fallback shader loading
//!
//! Reads a resolved decoder shader fully into memory. The buffer is sized
//! from the file metadata up front and only handed back once every byte
//! has been read, so callers never see a partial blob.

use std::collections::TryReserveError;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Why a decoder shader could not be loaded
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to determine size of {path}: {source}")]
    Size {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Cannot allocate {size} bytes for {path}: {source}")]
    Alloc {
        path: PathBuf,
        size: u64,
        #[source]
        source: TryReserveError,
    },

    #[error("Short read on {path}: expected {expected} bytes")]
    ReadShort { path: PathBuf, expected: u64 },

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl LoadError {
    /// Path the failed load was attempted on
    pub fn path(&self) -> &Path {
        match self {
            LoadError::Open { path, .. }
            | LoadError::Size { path, .. }
            | LoadError::Alloc { path, .. }
            | LoadError::ReadShort { path, .. }
            | LoadError::Read { path, .. } => path,
        }
    }
}

/// A decoder shader resolved on disk and read into memory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackAsset {
    path: PathBuf,
    bytes: Vec<u8>,
}

impl FallbackAsset {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Reads decoder shaders from disk
#[derive(Debug, Clone, Copy, Default)]
pub struct AssetLoader;

impl AssetLoader {
    pub fn new() -> Self {
        Self
    }

    /// Read the whole file at `path`.
    ///
    /// The file may have vanished since it was resolved; that surfaces as
    /// [`LoadError::Open`].
    pub fn load(&self, path: &Path) -> Result<FallbackAsset, LoadError> {
        let file = File::open(path).map_err(|source| LoadError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        let size = file
            .metadata()
            .map_err(|source| LoadError::Size {
                path: path.to_path_buf(),
                source,
            })?
            .len();

        let bytes = read_exact_sized(file, size, path)?;

        Ok(FallbackAsset {
            path: path.to_path_buf(),
            bytes,
        })
    }
}

/// Read exactly `size` bytes from `reader` into a freshly allocated buffer
fn read_exact_sized<R: Read>(mut reader: R, size: u64, path: &Path) -> Result<Vec<u8>, LoadError> {
    let len = usize::try_from(size).map_err(|_| LoadError::Size {
        path: path.to_path_buf(),
        source: io::Error::new(io::ErrorKind::InvalidData, "file larger than address space"),
    })?;

    let mut buf = Vec::new();
    buf.try_reserve_exact(len).map_err(|source| LoadError::Alloc {
        path: path.to_path_buf(),
        size,
        source,
    })?;
    buf.resize(len, 0);

    match reader.read_exact(&mut buf) {
        Ok(()) => Ok(buf),
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Err(LoadError::ReadShort {
            path: path.to_path_buf(),
            expected: size,
        }),
        Err(source) => Err(LoadError::Read {
            path: path.to_path_buf(),
            source,
        }),
    }
}
