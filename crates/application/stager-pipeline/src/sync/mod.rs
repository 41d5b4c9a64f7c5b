use camino::Utf8PathBuf;
use stager_core::{ChangeSet, RelativePath};
use stager_infra::SidecarPolicy;
use std::fmt;
use tracing::warn;

use crate::tracker::Phase;

pub mod download;
pub mod engine;
pub mod install;

pub use download::DownloadReport;
pub use engine::SyncEngine;
pub use install::InstallReport;

pub const DEFAULT_STAGING_PREFIX: &str = "stager";

#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub sidecars: SidecarPolicy,
    /// Parent of per-run staging areas. The system temp directory when unset.
    pub staging_parent: Option<Utf8PathBuf>,
    pub staging_prefix: String,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            sidecars: SidecarPolicy::default(),
            staging_parent: None,
            staging_prefix: DEFAULT_STAGING_PREFIX.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct UpdateRequest {
    /// Tree holding the latest files. No update happens when unset or absent.
    pub source: Option<Utf8PathBuf>,
    /// Installed tree, created if absent.
    pub target: Utf8PathBuf,
}

/// Phase-fatal failures. Per-item problems are reported as [`ItemWarning`] instead.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("Source folder not found: {0}")]
    SourceMissing(Utf8PathBuf),
    #[error("Scan error: {0}")]
    Scan(#[from] stager_scanner::ScannerError),
    #[error("Staging error: {0}")]
    Staging(#[source] std::io::Error),
    #[error("IO error on {path}: {source}")]
    Io {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Background task failed: {0}")]
    Join(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WarningReason {
    /// Source file vanished between the diff and the copy.
    MissingSource,
    /// Nothing was staged for this entry.
    MissingStaged,
    Io(String),
}

impl fmt::Display for WarningReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WarningReason::MissingSource => f.write_str("file not found for download"),
            WarningReason::MissingStaged => f.write_str("file not found for move"),
            WarningReason::Io(msg) => f.write_str(msg),
        }
    }
}

/// One changed entry that was skipped. The rest of the batch carries on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemWarning {
    pub phase: Phase,
    pub path: RelativePath,
    pub reason: WarningReason,
}

impl fmt::Display for ItemWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {} ({})", self.phase, self.path, self.reason)
    }
}

pub(crate) fn push_warning(
    warnings: &mut Vec<ItemWarning>,
    phase: Phase,
    path: &RelativePath,
    reason: WarningReason,
) {
    let warning = ItemWarning {
        phase,
        path: path.clone(),
        reason,
    };
    warn!("Skipped {}", warning);
    warnings.push(warning);
}

#[derive(Debug, Clone)]
pub struct CycleReport {
    pub changes: ChangeSet,
    pub download: DownloadReport,
    pub install: InstallReport,
}

impl CycleReport {
    pub fn warnings(&self) -> impl Iterator<Item = &ItemWarning> {
        self.download
            .warnings
            .iter()
            .chain(self.install.warnings.iter())
    }

    /// Number of entries that did not make it into the target.
    pub fn skipped(&self) -> usize {
        self.download.warnings.len() + self.install.warnings.len()
    }
}

#[derive(Debug, Clone)]
pub enum CycleOutcome {
    /// No usable source tree; nothing was checked.
    SourceMissing,
    UpToDate,
    Updated(CycleReport),
}
