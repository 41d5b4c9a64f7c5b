pub mod change;
pub mod diff;
pub mod path_utils;

pub use change::{ChangeKind, ChangeRecord, ChangeSet, ChangeSummary};
pub use path_utils::RelativePath;

/// Lower-case hex MD5 of a file's content, as stored in sidecars.
pub type Md5Digest = String;

/// Which of the two trees a path belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Source,
    Target,
}

/// Entries found under one tree root, in enumeration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeListing {
    pub folders: Vec<RelativePath>,
    pub files: Vec<RelativePath>,
}
