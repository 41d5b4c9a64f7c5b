use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use std::io;
use tracing::{info, warn};
use uuid::Uuid;

/// Temporary directory owned by one update run.
///
/// Named `<prefix>_<uuid>` under the chosen parent. It is removed recursively when closed or
/// dropped, so every exit path that unwinds normally leaves nothing behind.
#[derive(Debug)]
pub struct StagingArea {
    path: Utf8PathBuf,
    removed: bool,
}

impl StagingArea {
    pub fn create(parent: &Utf8Path, prefix: &str) -> io::Result<Self> {
        let path = parent.join(format!("{}_{}", prefix, Uuid::new_v4()));
        fs::create_dir_all(&path)?;
        info!("Create temp folder: {}", path);
        Ok(Self {
            path,
            removed: false,
        })
    }

    /// Create under the system temp directory.
    pub fn create_in_temp(prefix: &str) -> io::Result<Self> {
        let tmp = Utf8PathBuf::from_path_buf(std::env::temp_dir()).map_err(|p| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("temp dir is not valid UTF-8: {p:?}"),
            )
        })?;
        Self::create(&tmp, prefix)
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Remove the directory now and surface any failure.
    pub fn close(mut self) -> io::Result<()> {
        self.removed = true;
        remove(&self.path)
    }
}

impl Drop for StagingArea {
    fn drop(&mut self) {
        if self.removed {
            return;
        }
        if let Err(e) = remove(&self.path) {
            warn!("Failed to delete temp folder {}: {}", self.path, e);
        }
    }
}

fn remove(path: &Utf8Path) -> io::Result<()> {
    match fs::remove_dir_all(path) {
        Ok(()) => {
            info!("Delete temp folder: {}", path);
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn parent(dir: &tempfile::TempDir) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap()
    }

    #[test]
    fn name_carries_prefix_and_unique_id() {
        let dir = tempdir().unwrap();
        let parent = parent(&dir);

        let a = StagingArea::create(&parent, "stager").unwrap();
        let b = StagingArea::create(&parent, "stager").unwrap();

        assert!(a.path().file_name().unwrap().starts_with("stager_"));
        assert_ne!(a.path(), b.path());
    }

    #[test]
    fn drop_removes_populated_directory() {
        let dir = tempdir().unwrap();
        let area = StagingArea::create(&parent(&dir), "stager").unwrap();
        let path = area.path().to_path_buf();
        fs::create_dir_all(path.join("nested")).unwrap();
        fs::write(path.join("nested/file.bin"), b"x").unwrap();

        drop(area);
        assert!(!path.exists());
    }

    #[test]
    fn close_removes_directory() {
        let dir = tempdir().unwrap();
        let area = StagingArea::create(&parent(&dir), "stager").unwrap();
        let path = area.path().to_path_buf();

        area.close().unwrap();
        assert!(!path.exists());
    }
}
