use crate::path_utils::RelativePath;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ChangeKind {
    NewFile,
    UpdateFile,
    DeleteFile,
    NewFolder,
    DeleteFolder,
}

impl ChangeKind {
    /// Kinds whose content has to be copied from the source tree.
    pub fn carries_content(self) -> bool {
        matches!(self, ChangeKind::NewFile | ChangeKind::UpdateFile)
    }

    pub fn is_delete(self) -> bool {
        matches!(self, ChangeKind::DeleteFile | ChangeKind::DeleteFolder)
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ChangeKind::NewFile => "NewFile",
            ChangeKind::UpdateFile => "UpdateFile",
            ChangeKind::DeleteFile => "DeleteFile",
            ChangeKind::NewFolder => "NewFolder",
            ChangeKind::DeleteFolder => "DeleteFolder",
        };
        f.write_str(s)
    }
}

/// A single required transition of one filesystem entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeRecord {
    path: RelativePath,
    kind: ChangeKind,
}

impl ChangeRecord {
    pub fn new(path: RelativePath, kind: ChangeKind) -> Self {
        Self { path, kind }
    }

    pub fn path(&self) -> &RelativePath {
        &self.path
    }

    pub fn kind(&self) -> ChangeKind {
        self.kind
    }
}

impl fmt::Display for ChangeRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.path)
    }
}

/// Ordered output of one diff run.
///
/// Producer order is new folders, then files in discovery order, then deleted folders.
/// Consumers that need install-safe ordering re-bucket by kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ChangeSet {
    records: Vec<ChangeRecord>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ChangeSummary {
    pub new_files: usize,
    pub updated_files: usize,
    pub deleted_files: usize,
    pub new_folders: usize,
    pub deleted_folders: usize,
}

impl ChangeSet {
    pub fn new(records: Vec<ChangeRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ChangeRecord> {
        self.records.iter()
    }

    pub fn records(&self) -> &[ChangeRecord] {
        &self.records
    }

    pub fn of_kind(&self, kind: ChangeKind) -> impl Iterator<Item = &ChangeRecord> {
        self.records.iter().filter(move |r| r.kind == kind)
    }

    pub fn summary(&self) -> ChangeSummary {
        let mut s = ChangeSummary::default();
        for r in &self.records {
            match r.kind {
                ChangeKind::NewFile => s.new_files += 1,
                ChangeKind::UpdateFile => s.updated_files += 1,
                ChangeKind::DeleteFile => s.deleted_files += 1,
                ChangeKind::NewFolder => s.new_folders += 1,
                ChangeKind::DeleteFolder => s.deleted_folders += 1,
            }
        }
        s
    }
}

impl<'a> IntoIterator for &'a ChangeSet {
    type Item = &'a ChangeRecord;
    type IntoIter = std::slice::Iter<'a, ChangeRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl FromIterator<ChangeRecord> for ChangeSet {
    fn from_iter<T: IntoIterator<Item = ChangeRecord>>(iter: T) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}
