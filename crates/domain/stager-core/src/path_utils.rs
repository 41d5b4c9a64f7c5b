use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use serde::Serialize;
use std::fmt;

/// Location of an entry relative to a tree root.
///
/// The wire form always starts with `/` and separates segments with `/`, regardless of the
/// host separator, so source-side and target-side keys compare equal. Parent and current
/// directory components are rejected at construction, which keeps a joined path inside its root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RelativePath(String);

impl RelativePath {
    /// Build the key for `path` as seen from `root`. Returns `None` for the root itself or for
    /// paths that do not live under `root`.
    pub fn from_root(root: &Utf8Path, path: &Utf8Path) -> Option<Self> {
        let rel = path.strip_prefix(root).ok()?;
        let mut segments = Vec::new();
        for component in rel.components() {
            match component {
                Utf8Component::Normal(seg) => segments.push(seg),
                _ => return None,
            }
        }
        Self::from_segments(segments)
    }

    /// Parse a wire-format (or backslash separated) relative path.
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.replace('\\', "/");
        let mut segments = Vec::new();
        for seg in normalized.split('/') {
            match seg {
                "" => continue,
                "." | ".." => return None,
                _ => segments.push(seg),
            }
        }
        Self::from_segments(segments)
    }

    fn from_segments<'a>(segments: impl IntoIterator<Item = &'a str>) -> Option<Self> {
        let mut out = String::new();
        for seg in segments {
            out.push('/');
            out.push_str(seg);
        }
        if out.is_empty() {
            None
        } else {
            Some(Self(out))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/').filter(|s| !s.is_empty())
    }

    /// The containing entry, or `None` when this entry sits directly under the root.
    pub fn parent(&self) -> Option<Self> {
        let idx = self.0.rfind('/')?;
        if idx == 0 {
            None
        } else {
            Some(Self(self.0[..idx].to_string()))
        }
    }

    /// Resolve this key against a concrete tree root using host path composition.
    pub fn join_onto(&self, root: &Utf8Path) -> Utf8PathBuf {
        let mut out = root.to_path_buf();
        for seg in self.segments() {
            out.push(seg);
        }
        out
    }
}

impl fmt::Display for RelativePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for RelativePath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
