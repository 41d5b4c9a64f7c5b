use camino::Utf8Path;
use stager_core::{ChangeKind, ChangeRecord, ChangeSet, Md5Digest, RelativePath};
use stager_infra::hashing::{sidecar_path, HashCache};
use std::collections::{HashMap, HashSet};
use std::io;
use tracing::info;

use crate::io_utils::{
    create_dir_if_absent, place_file, remove_dir_if_present, remove_file_if_present, Placement,
};
use crate::sync::{push_warning, ItemWarning, WarningReason};
use crate::tracker::{Phase, Progress};

#[derive(Debug, Clone, Default)]
pub struct InstallReport {
    pub folders_created: usize,
    pub files_placed: usize,
    pub entries_deleted: usize,
    pub warnings: Vec<ItemWarning>,
}

/// Entries the change set deletes anyway. When one of them sits where an addition has to go
/// (a file that became a folder or the reverse) it is removed ahead of the delete pass.
struct Clearance<'a> {
    doomed: HashMap<&'a RelativePath, ChangeKind>,
    cleared: HashSet<RelativePath>,
}

impl<'a> Clearance<'a> {
    fn new(changes: &'a ChangeSet) -> Self {
        Self {
            doomed: changes
                .iter()
                .filter(|r| r.kind().is_delete())
                .map(|r| (r.path(), r.kind()))
                .collect(),
            cleared: HashSet::new(),
        }
    }

    /// Remove `key` early if it is scheduled as a `kind` delete. `Ok(false)` when it is not.
    fn clear(
        &mut self,
        key: &RelativePath,
        kind: ChangeKind,
        target: &Utf8Path,
    ) -> io::Result<bool> {
        if self.doomed.get(key) != Some(&kind) {
            return Ok(false);
        }
        let path = key.join_onto(target);
        remove_entry(kind, &path)?;
        info!("- delete {}: {}", entry_noun(kind), path);
        self.cleared.insert(key.clone());
        Ok(true)
    }

    /// Whether `key` or one of its ancestors was already removed.
    fn covers(&self, key: &RelativePath) -> bool {
        let mut cur = Some(key.clone());
        while let Some(k) = cur {
            if self.cleared.contains(&k) {
                return true;
            }
            cur = k.parent();
        }
        false
    }
}

/// Apply staged changes to `target`.
///
/// Records are re-bucketed so folders exist before files land in them and nothing is deleted
/// until every addition and update has been attempted: create folders, place files, delete.
/// A failing item is logged and skipped.
pub fn install(
    changes: &ChangeSet,
    staging: &Utf8Path,
    target: &Utf8Path,
    cache: &HashCache,
    progress: Progress<'_>,
) -> InstallReport {
    info!("Start installing updates");
    progress.started(Phase::Installing, changes.len());

    let mut report = InstallReport::default();
    let mut clearance = Clearance::new(changes);

    for record in changes.of_kind(ChangeKind::NewFolder) {
        let path = record.path().join_onto(target);
        if path.is_file() {
            match clearance.clear(record.path(), ChangeKind::DeleteFile, target) {
                Ok(true) => report.entries_deleted += 1,
                Ok(false) => {}
                Err(e) => {
                    warn_io(&mut report, record, e);
                    progress.item_done(Phase::Installing);
                    continue;
                }
            }
        }
        match create_dir_if_absent(path.as_std_path()) {
            Ok(true) => {
                info!("- create folder: {}", path);
                report.folders_created += 1;
            }
            Ok(false) => {}
            Err(e) => warn_io(&mut report, record, e),
        }
        progress.item_done(Phase::Installing);
    }

    for record in changes.iter().filter(|r| r.kind().carries_content()) {
        let dest = record.path().join_onto(target);
        if dest.is_dir() {
            match clearance.clear(record.path(), ChangeKind::DeleteFolder, target) {
                Ok(true) => report.entries_deleted += 1,
                Ok(false) => {}
                Err(e) => {
                    warn_io(&mut report, record, e);
                    progress.item_done(Phase::Installing);
                    continue;
                }
            }
        }
        match place_staged(record, staging, target, cache) {
            Ok(Some((hash, placement))) => {
                info!(
                    "- file {}: [{}] {}",
                    placement_verb(placement),
                    hash,
                    dest
                );
                report.files_placed += 1;
            }
            Ok(None) => push_warning(
                &mut report.warnings,
                Phase::Installing,
                record.path(),
                WarningReason::MissingStaged,
            ),
            Err(e) => push_warning(
                &mut report.warnings,
                Phase::Installing,
                record.path(),
                WarningReason::Io(e),
            ),
        }
        progress.item_done(Phase::Installing);
    }

    for record in changes.iter().filter(|r| r.kind().is_delete()) {
        if clearance.covers(record.path()) {
            progress.item_done(Phase::Installing);
            continue;
        }
        let path = record.path().join_onto(target);
        match remove_entry(record.kind(), &path) {
            Ok(true) => {
                info!("- delete {}: {}", entry_noun(record.kind()), path);
                report.entries_deleted += 1;
            }
            Ok(false) => {}
            Err(e) => warn_io(&mut report, record, e),
        }
        progress.item_done(Phase::Installing);
    }

    progress.finished(Phase::Installing);
    info!("Finish installing updates");
    report
}

/// Delete a file together with its sidecar, or a folder recursively.
fn remove_entry(kind: ChangeKind, path: &Utf8Path) -> io::Result<bool> {
    match kind {
        ChangeKind::DeleteFolder => remove_dir_if_present(path.as_std_path()),
        _ => {
            let removed = remove_file_if_present(path.as_std_path())?;
            remove_file_if_present(sidecar_path(path).as_std_path())?;
            Ok(removed)
        }
    }
}

/// Move one staged file into place and refresh its sidecar. `Ok(None)` when nothing was staged.
fn place_staged(
    record: &ChangeRecord,
    staging: &Utf8Path,
    target: &Utf8Path,
    cache: &HashCache,
) -> Result<Option<(Md5Digest, Placement)>, String> {
    let staged = record.path().join_onto(staging);
    if !staged.is_file() {
        return Ok(None);
    }

    let dest = record.path().join_onto(target);
    let placement = place_file(staged.as_std_path(), dest.as_std_path())
        .map_err(|e| format!("cannot place {dest}: {e}"))?;

    let hash = cache.refresh_sidecar(&dest).map_err(|e| e.to_string())?;
    Ok(Some((hash, placement)))
}

fn warn_io(report: &mut InstallReport, record: &ChangeRecord, e: io::Error) {
    push_warning(
        &mut report.warnings,
        Phase::Installing,
        record.path(),
        WarningReason::Io(e.to_string()),
    );
}

fn entry_noun(kind: ChangeKind) -> &'static str {
    match kind {
        ChangeKind::DeleteFolder | ChangeKind::NewFolder => "folder",
        _ => "file",
    }
}

fn placement_verb(placement: Placement) -> &'static str {
    match placement {
        Placement::Overwritten => "replaced",
        Placement::Moved => "moved",
        Placement::Copied => "copied",
    }
}
