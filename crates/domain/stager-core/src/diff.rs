use crate::{ChangeKind, ChangeRecord, ChangeSet, Md5Digest, RelativePath, Side, TreeListing};
use std::collections::{HashMap, HashSet};

/// Reconcile a source listing against a target listing.
///
/// `checksum` resolves the content hash of a file on either side. Every target file is hashed;
/// a source file is only hashed when the same key exists in the target. The first error aborts
/// the diff and no partial change set is returned.
pub fn diff<E, F>(
    source: &TreeListing,
    target: &TreeListing,
    mut checksum: F,
) -> Result<ChangeSet, E>
where
    F: FnMut(Side, &RelativePath) -> Result<Md5Digest, E>,
{
    let (new_folders, deleted_folders) = diff_folders(&source.folders, &target.folders);

    let mut target_files: Vec<(&RelativePath, Md5Digest)> = Vec::with_capacity(target.files.len());
    for path in &target.files {
        target_files.push((path, checksum(Side::Target, path)?));
    }
    let file_changes = diff_files(&source.files, &target_files, |path| {
        checksum(Side::Source, path)
    })?;

    Ok(new_folders
        .into_iter()
        .chain(file_changes)
        .chain(deleted_folders)
        .collect())
}

/// Directories are matched by key only. Returns `(NewFolder records, DeleteFolder records)`.
pub fn diff_folders(
    source: &[RelativePath],
    target: &[RelativePath],
) -> (Vec<ChangeRecord>, Vec<ChangeRecord>) {
    let mut remaining: HashSet<&RelativePath> = target.iter().collect();
    let mut added = Vec::new();

    for dir in source {
        if !remaining.remove(dir) {
            added.push(ChangeRecord::new(dir.clone(), ChangeKind::NewFolder));
        }
    }

    // Walk the target list again so leftovers come out in enumeration order.
    let removed = target
        .iter()
        .filter(|dir| remaining.remove(*dir))
        .map(|dir| ChangeRecord::new(dir.clone(), ChangeKind::DeleteFolder))
        .collect();

    (added, removed)
}

/// Files are matched by key and compared by checksum.
pub fn diff_files<E, F>(
    source: &[RelativePath],
    target: &[(&RelativePath, Md5Digest)],
    mut source_checksum: F,
) -> Result<Vec<ChangeRecord>, E>
where
    F: FnMut(&RelativePath) -> Result<Md5Digest, E>,
{
    let mut remaining: HashMap<&RelativePath, &str> =
        target.iter().map(|(p, h)| (*p, h.as_str())).collect();
    let mut changes = Vec::new();

    for file in source {
        match remaining.remove(file) {
            Some(target_hash) => {
                if source_checksum(file)? != target_hash {
                    changes.push(ChangeRecord::new(file.clone(), ChangeKind::UpdateFile));
                }
            }
            None => changes.push(ChangeRecord::new(file.clone(), ChangeKind::NewFile)),
        }
    }

    for (file, _) in target {
        if remaining.remove(*file).is_some() {
            changes.push(ChangeRecord::new((*file).clone(), ChangeKind::DeleteFile));
        }
    }

    Ok(changes)
}
