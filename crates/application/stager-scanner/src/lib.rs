use camino::{Utf8Path, Utf8PathBuf};
use stager_core::{Md5Digest, RelativePath, TreeListing};
use stager_infra::hashing::{is_sidecar, HashCache, HashError};
use std::path::PathBuf;
use tracing::{debug, info};
use walkdir::WalkDir;

#[derive(Debug, thiserror::Error)]
pub enum ScannerError {
    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Path is not valid UTF-8: {0:?}")]
    NonUtf8Path(PathBuf),
    #[error("Path escapes scan root: {0}")]
    OutsideRoot(Utf8PathBuf),
    #[error("Hashing error: {0}")]
    Hash(#[from] HashError),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    pub folders: u64,
    pub files: u64,
    pub sidecars_skipped: u64,
}

pub struct Scanner;

impl Scanner {
    /// Enumerate every folder and non-sidecar file under `root`, recursively.
    ///
    /// Any unreadable entry fails the whole listing.
    pub fn list(root: &Utf8Path) -> Result<TreeListing, ScannerError> {
        let (listing, stats) = Self::list_with_stats(root)?;
        info!(
            "Listed {}: {} folders, {} files ({} sidecars skipped)",
            root, stats.folders, stats.files, stats.sidecars_skipped
        );
        Ok(listing)
    }

    pub fn list_with_stats(root: &Utf8Path) -> Result<(TreeListing, ScanStats), ScannerError> {
        let mut listing = TreeListing::default();
        let mut stats = ScanStats::default();

        for entry in WalkDir::new(root).min_depth(1) {
            let entry = entry?;
            let fs_path = Utf8PathBuf::from_path_buf(entry.path().to_path_buf())
                .map_err(ScannerError::NonUtf8Path)?;
            let file_type = entry.file_type();

            if file_type.is_dir() {
                listing.folders.push(Self::relative(root, &fs_path)?);
                stats.folders += 1;
            } else if file_type.is_file() {
                if is_sidecar(&fs_path) {
                    stats.sidecars_skipped += 1;
                    continue;
                }
                listing.files.push(Self::relative(root, &fs_path)?);
                stats.files += 1;
            } else {
                debug!("Skipping special entry {}", fs_path);
            }
        }

        Ok((listing, stats))
    }

    /// Checksum of `rel` under `root`, through the sidecar-aware cache.
    pub fn checksum(
        root: &Utf8Path,
        rel: &RelativePath,
        cache: &HashCache,
    ) -> Result<Md5Digest, ScannerError> {
        Ok(cache.hash_of(&rel.join_onto(root))?)
    }

    fn relative(root: &Utf8Path, fs_path: &Utf8Path) -> Result<RelativePath, ScannerError> {
        RelativePath::from_root(root, fs_path)
            .ok_or_else(|| ScannerError::OutsideRoot(fs_path.to_path_buf()))
    }
}
