use camino::{Utf8Path, Utf8PathBuf};
use md5::Context;
use stager_core::Md5Digest;
use std::fs::{self, File};
use std::io::{self, BufReader, Read};
use tracing::debug;

/// Extension of the companion file holding a precomputed checksum.
pub const SIDECAR_EXTENSION: &str = "md5";

const READ_BUF_SIZE: usize = 64 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum HashError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },
}

impl HashError {
    fn io(path: &Utf8Path, source: io::Error) -> Self {
        HashError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// How far a sidecar is trusted in place of the file's bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SidecarPolicy {
    /// A present sidecar is the checksum. No content is read.
    #[default]
    Trust,
    /// Trust the sidecar only if it was written no earlier than the file was last modified.
    VerifyFreshness,
    /// Always hash file content.
    Ignore,
}

/// `<file>.md5`, next to the file.
pub fn sidecar_path(path: &Utf8Path) -> Utf8PathBuf {
    Utf8PathBuf::from(format!("{}.{}", path, SIDECAR_EXTENSION))
}

/// Sidecars are metadata and never synced as content.
pub fn is_sidecar(path: &Utf8Path) -> bool {
    path.as_str().ends_with(&format!(".{SIDECAR_EXTENSION}"))
}

/// Extract the checksum from sidecar text: either `<hex>` or `<hex> <metadata>`.
pub fn parse_sidecar(text: &str) -> Md5Digest {
    let text = text.trim();
    match text.split_once(' ') {
        Some((hash, _)) => hash.to_lowercase(),
        None => text.to_lowercase(),
    }
}

/// Stream the file through MD5 and render the digest as lower-case hex.
pub fn compute_file_checksum(path: &Utf8Path) -> Result<Md5Digest, HashError> {
    let file = File::open(path).map_err(|e| HashError::io(path, e))?;
    let mut reader = BufReader::with_capacity(READ_BUF_SIZE, file);
    let mut hasher = Context::new();
    let mut buf = vec![0u8; READ_BUF_SIZE];

    loop {
        let n = reader.read(&mut buf).map_err(|e| HashError::io(path, e))?;
        if n == 0 {
            break;
        }
        hasher.consume(&buf[..n]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

/// Checksum lookup that prefers a colocated sidecar over rereading the file.
#[derive(Debug, Clone, Copy, Default)]
pub struct HashCache {
    policy: SidecarPolicy,
}

impl HashCache {
    pub fn new(policy: SidecarPolicy) -> Self {
        Self { policy }
    }

    pub fn hash_of(&self, path: &Utf8Path) -> Result<Md5Digest, HashError> {
        if let Some(cached) = self.read_sidecar(path)? {
            return Ok(cached);
        }
        compute_file_checksum(path)
    }

    /// Replace the sidecar of a freshly written file with its recomputed checksum.
    pub fn refresh_sidecar(&self, path: &Utf8Path) -> Result<Md5Digest, HashError> {
        let sidecar = sidecar_path(path);
        match fs::remove_file(&sidecar) {
            Ok(()) => debug!("Removed stale sidecar {}", sidecar),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(HashError::io(&sidecar, e)),
        }

        let checksum = self.hash_of(path)?;
        fs::write(&sidecar, &checksum).map_err(|e| HashError::io(&sidecar, e))?;
        Ok(checksum)
    }

    fn read_sidecar(&self, path: &Utf8Path) -> Result<Option<Md5Digest>, HashError> {
        if self.policy == SidecarPolicy::Ignore {
            return Ok(None);
        }

        let sidecar = sidecar_path(path);
        let sidecar_meta = match fs::metadata(&sidecar) {
            Ok(meta) if meta.is_file() => meta,
            Ok(_) => return Ok(None),
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(HashError::io(&sidecar, e)),
        };

        if self.policy == SidecarPolicy::VerifyFreshness {
            let file_meta = fs::metadata(path).map_err(|e| HashError::io(path, e))?;
            let fresh = match (sidecar_meta.modified(), file_meta.modified()) {
                (Ok(sidecar_mtime), Ok(file_mtime)) => sidecar_mtime >= file_mtime,
                _ => false,
            };
            if !fresh {
                debug!("Sidecar older than {}, rehashing", path);
                return Ok(None);
            }
        }

        let text = fs::read_to_string(&sidecar).map_err(|e| HashError::io(&sidecar, e))?;
        Ok(Some(parse_sidecar(&text)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_takes_first_token_when_space_present() {
        assert_eq!(
            parse_sidecar("0CC175B9C0F1B6A831C399E269772661 a.txt"),
            "0cc175b9c0f1b6a831c399e269772661"
        );
    }

    #[test]
    fn parse_takes_whole_trimmed_text_otherwise() {
        assert_eq!(parse_sidecar("  ABCDEF\r\n"), "abcdef");
        assert_eq!(parse_sidecar("not-a-hash"), "not-a-hash");
    }

    #[test]
    fn leading_whitespace_does_not_hide_the_hash() {
        // Trimming happens before the split, so the hash is never the empty token.
        assert_eq!(parse_sidecar(" ABC meta"), "abc");
        assert_eq!(parse_sidecar("\tABC"), "abc");
        assert_eq!(parse_sidecar(""), "");
    }

    #[test]
    fn sidecar_naming() {
        let p = Utf8Path::new("/srv/app/lib/core.dll");
        assert_eq!(sidecar_path(p).as_str(), "/srv/app/lib/core.dll.md5");
        assert!(is_sidecar(&sidecar_path(p)));
        assert!(!is_sidecar(p));
    }
}
