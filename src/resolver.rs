//! Fallback shader lookup
//!
//! Walks an ordered list of shader directories and returns the first one
//! holding the decoder for the requested BCn family. Nothing is cached, so a
//! shader installed between two calls is picked up by the second.

use crate::format::FormatTag;
use crate::fs::{Filesystem, RealFs};
use std::path::PathBuf;
use tracing::{debug, warn};

/// Shader directories searched when no configuration says otherwise
pub const DEFAULT_SEARCH_PATHS: &[&str] = &[
    "/usr/share/exynostools/shaders/pipeline_cache/",
    "/assets/shaders/decode/",
    "/usr/share/xclipse/shaders/",
];

/// Ordered, immutable list of directories to probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPath {
    dirs: Vec<PathBuf>,
}

impl SearchPath {
    pub fn new<I, P>(dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            dirs: dirs.into_iter().map(Into::into).collect(),
        }
    }

    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    /// Candidate paths for `file_name`, in probe order
    pub fn candidates<'a>(&'a self, file_name: &'a str) -> impl Iterator<Item = PathBuf> + 'a {
        self.dirs.iter().map(move |dir| dir.join(file_name))
    }
}

impl Default for SearchPath {
    fn default() -> Self {
        Self::new(DEFAULT_SEARCH_PATHS.iter().copied())
    }
}

/// Resolves a format family to an on-disk decoder shader
#[derive(Debug, Clone)]
pub struct AssetResolver<F = RealFs> {
    search_path: SearchPath,
    fs: F,
}

impl AssetResolver<RealFs> {
    pub fn new(search_path: SearchPath) -> Self {
        Self::with_fs(search_path, RealFs)
    }
}

impl<F: Filesystem> AssetResolver<F> {
    pub fn with_fs(search_path: SearchPath, fs: F) -> Self {
        Self { search_path, fs }
    }

    pub fn search_path(&self) -> &SearchPath {
        &self.search_path
    }

    /// Find the first existing decoder for `tag`.
    ///
    /// `Unknown` returns `None` without touching the filesystem.
    pub fn resolve(&self, tag: FormatTag) -> Option<PathBuf> {
        self.resolve_for(tag.name(), tag)
    }

    /// Same as [`resolve`](Self::resolve), naming `format_id` in the miss diagnostic
    pub fn resolve_for(&self, format_id: &str, tag: FormatTag) -> Option<PathBuf> {
        let file_name = tag.asset_file_name()?;

        let found = self
            .search_path
            .candidates(file_name)
            .find(|candidate| self.fs.exists(candidate));

        match &found {
            Some(path) => debug!("Resolved {} fallback to {}", format_id, path.display()),
            None => warn!("No fallback SPV found for {}", format_id),
        }

        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::testing::CountingFs;
    use tempfile::TempDir;

    fn three_dirs(temp: &TempDir) -> SearchPath {
        SearchPath::new(["a", "b", "c"].iter().map(|d| temp.path().join(d)))
    }

    #[test]
    fn test_unknown_never_probes() {
        let fs = CountingFs::with_files(["/a/bc1.spv"]);
        let resolver = AssetResolver::with_fs(SearchPath::new(["/a", "/b", "/c"]), &fs);

        assert_eq!(resolver.resolve(FormatTag::Unknown), None);
        assert_eq!(resolver.resolve_for("R8_UNORM", FormatTag::Unknown), None);
        assert_eq!(fs.calls.get(), 0);
    }

    #[test]
    fn test_probes_in_declared_order() {
        let fs = CountingFs::default();
        let resolver = AssetResolver::with_fs(SearchPath::new(["/a", "/b", "/c"]), &fs);

        assert_eq!(resolver.resolve(FormatTag::BC6H), None);
        assert_eq!(
            *fs.probed.borrow(),
            vec![
                PathBuf::from("/a/bc6h.spv"),
                PathBuf::from("/b/bc6h.spv"),
                PathBuf::from("/c/bc6h.spv"),
            ]
        );
    }

    #[test]
    fn test_first_hit_wins() {
        let temp = TempDir::new().unwrap();
        let search = three_dirs(&temp);
        for dir in search.dirs() {
            std::fs::create_dir_all(dir).unwrap();
        }
        std::fs::write(temp.path().join("b").join("bc3.spv"), b"from b").unwrap();
        std::fs::write(temp.path().join("c").join("bc3.spv"), b"from c").unwrap();

        let resolver = AssetResolver::new(search);
        assert_eq!(
            resolver.resolve(FormatTag::BC3),
            Some(temp.path().join("b").join("bc3.spv"))
        );
    }

    #[test]
    fn test_stops_after_first_hit() {
        let fs = CountingFs::with_files(["/a/bc2.spv", "/b/bc2.spv"]);
        let resolver = AssetResolver::with_fs(SearchPath::new(["/a", "/b", "/c"]), &fs);

        assert_eq!(resolver.resolve(FormatTag::BC2), Some(PathBuf::from("/a/bc2.spv")));
        assert_eq!(fs.calls.get(), 1);
    }

    #[test]
    fn test_missing_everywhere() {
        let temp = TempDir::new().unwrap();
        let resolver = AssetResolver::new(three_dirs(&temp));
        assert_eq!(resolver.resolve(FormatTag::BC7), None);
    }

    #[test]
    fn test_resolve_is_repeatable() {
        let fs = CountingFs::with_files(["/c/bc5.spv"]);
        let resolver = AssetResolver::with_fs(SearchPath::new(["/a", "/b", "/c"]), &fs);

        let first = resolver.resolve(FormatTag::BC5);
        let second = resolver.resolve(FormatTag::BC5);
        assert_eq!(first, second);
        assert_eq!(first, Some(PathBuf::from("/c/bc5.spv")));
        // No negative caching: both calls probed all three candidates
        assert_eq!(fs.calls.get(), 6);
    }

    #[test]
    fn test_default_search_path() {
        let search = SearchPath::default();
        assert_eq!(search.dirs().len(), 3);
        assert_eq!(
            search.dirs()[0],
            PathBuf::from("/usr/share/exynostools/shaders/pipeline_cache/")
        );
        assert_eq!(search.dirs()[1], PathBuf::from("/assets/shaders/decode/"));
    }
}
