use std::fs;
use std::io;
use std::path::Path;
use tracing::debug;

/// How a staged file reached its destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Placement {
    Overwritten,
    Moved,
    Copied,
}

/// Put `from` at `to`.
///
/// An existing destination is overwritten in place (copy-then-replace) because it may be held
/// open by a running process. A new destination is renamed into place, falling back to
/// copy-and-remove when the rename crosses filesystems.
pub(crate) fn place_file(from: &Path, to: &Path) -> io::Result<Placement> {
    if to.exists() {
        fs::copy(from, to)?;
        return Ok(Placement::Overwritten);
    }

    match fs::rename(from, to) {
        Ok(()) => Ok(Placement::Moved),
        Err(_) => {
            fs::copy(from, to)?;
            // The staged copy goes away with the staging area either way.
            if let Err(e) = fs::remove_file(from) {
                debug!("Left staged copy {} in place: {}", from.display(), e);
            }
            Ok(Placement::Copied)
        }
    }
}

/// Returns whether anything was removed. A missing file is already satisfied.
pub(crate) fn remove_file_if_present(path: &Path) -> io::Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

pub(crate) fn remove_dir_if_present(path: &Path) -> io::Result<bool> {
    match fs::remove_dir_all(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

pub(crate) fn create_dir_if_absent(path: &Path) -> io::Result<bool> {
    if path.is_dir() {
        return Ok(false);
    }
    fs::create_dir_all(path)?;
    Ok(true)
}
