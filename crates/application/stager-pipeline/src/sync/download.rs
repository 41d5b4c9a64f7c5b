use camino::Utf8Path;
use stager_core::{ChangeSet, RelativePath};
use std::fs;
use std::io;
use tracing::info;

use crate::sync::{push_warning, ItemWarning, WarningReason};
use crate::tracker::{Phase, Progress};

#[derive(Debug, Clone, Default)]
pub struct DownloadReport {
    pub staged: usize,
    pub warnings: Vec<ItemWarning>,
}

/// Copy every new or updated source file into `staging`, keeping its relative location.
///
/// Reads only from `source` and writes only under `staging`. A file that can no longer be
/// copied is skipped with a warning.
pub fn download(
    changes: &ChangeSet,
    source: &Utf8Path,
    staging: &Utf8Path,
    progress: Progress<'_>,
) -> DownloadReport {
    info!("Start loading files");
    progress.started(Phase::Downloading, changes.len());

    let mut report = DownloadReport::default();

    for record in changes {
        if record.kind().carries_content() {
            match stage_file(record.path(), source, staging) {
                Ok(true) => report.staged += 1,
                Ok(false) => push_warning(
                    &mut report.warnings,
                    Phase::Downloading,
                    record.path(),
                    WarningReason::MissingSource,
                ),
                Err(e) => push_warning(
                    &mut report.warnings,
                    Phase::Downloading,
                    record.path(),
                    WarningReason::Io(e.to_string()),
                ),
            }
        }
        progress.item_done(Phase::Downloading);
    }

    progress.finished(Phase::Downloading);
    info!("Finish loading files");
    report
}

/// `Ok(false)` when the source file is gone.
fn stage_file(rel: &RelativePath, source: &Utf8Path, staging: &Utf8Path) -> io::Result<bool> {
    let from = rel.join_onto(source);
    if !from.is_file() {
        return Ok(false);
    }

    let to = rel.join_onto(staging);
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(&from, &to)?;
    info!("- file downloaded: {}", from);
    Ok(true)
}
