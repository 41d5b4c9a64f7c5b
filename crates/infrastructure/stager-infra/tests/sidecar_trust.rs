use camino::Utf8PathBuf;
use filetime::{set_file_mtime, FileTime};
use stager_infra::hashing::{compute_file_checksum, sidecar_path, HashCache, SidecarPolicy};
use std::fs;
use tempfile::tempdir;

// MD5("hello")
const HELLO_MD5: &str = "5d41402abc4b2a76b9719d911017c592";

fn setup() -> (tempfile::TempDir, Utf8PathBuf) {
    let dir = tempdir().unwrap();
    let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
    let file = root.join("payload.bin");
    fs::write(&file, b"hello").unwrap();
    (dir, file)
}

#[test]
fn content_hash_is_lowercase_hex_md5() {
    let (_dir, file) = setup();
    assert_eq!(compute_file_checksum(&file).unwrap(), HELLO_MD5);
    assert_eq!(HashCache::default().hash_of(&file).unwrap(), HELLO_MD5);
}

#[test]
fn sidecar_without_space_is_trusted_whole() {
    let (_dir, file) = setup();
    fs::write(sidecar_path(&file), "DEADBEEF\n").unwrap();

    let cache = HashCache::new(SidecarPolicy::Trust);
    assert_eq!(cache.hash_of(&file).unwrap(), "deadbeef");
}

#[test]
fn sidecar_with_space_yields_first_token() {
    let (_dir, file) = setup();
    fs::write(sidecar_path(&file), "ABC123 payload.bin 2024-01-01").unwrap();

    let cache = HashCache::new(SidecarPolicy::Trust);
    assert_eq!(cache.hash_of(&file).unwrap(), "abc123");
}

#[test]
fn trusted_sidecar_skips_reading_content() {
    let dir = tempdir().unwrap();
    let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
    // Data file does not exist at all; only its sidecar does.
    let file = root.join("ghost.bin");
    fs::write(sidecar_path(&file), HELLO_MD5).unwrap();

    assert_eq!(HashCache::default().hash_of(&file).unwrap(), HELLO_MD5);
}

#[test]
fn missing_file_and_sidecar_is_an_io_error() {
    let dir = tempdir().unwrap();
    let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();

    let err = HashCache::default().hash_of(&root.join("nope")).unwrap_err();
    assert!(err.to_string().contains("nope"));
}

#[test]
fn ignore_policy_always_hashes_content() {
    let (_dir, file) = setup();
    fs::write(sidecar_path(&file), "stale").unwrap();

    let cache = HashCache::new(SidecarPolicy::Ignore);
    assert_eq!(cache.hash_of(&file).unwrap(), HELLO_MD5);
}

#[test]
fn freshness_policy_rehashes_when_file_is_newer_than_sidecar() {
    let (_dir, file) = setup();
    let sidecar = sidecar_path(&file);
    fs::write(&sidecar, "stale").unwrap();

    set_file_mtime(&sidecar, FileTime::from_unix_time(1_000_000, 0)).unwrap();
    set_file_mtime(&file, FileTime::from_unix_time(2_000_000, 0)).unwrap();

    let cache = HashCache::new(SidecarPolicy::VerifyFreshness);
    assert_eq!(cache.hash_of(&file).unwrap(), HELLO_MD5);

    // Once the sidecar is at least as new as the file it is trusted again.
    set_file_mtime(&sidecar, FileTime::from_unix_time(3_000_000, 0)).unwrap();
    assert_eq!(cache.hash_of(&file).unwrap(), "stale");
}

#[test]
fn refresh_replaces_stale_sidecar_with_content_hash() {
    let (_dir, file) = setup();
    let sidecar = sidecar_path(&file);
    fs::write(&sidecar, "0000 old metadata").unwrap();

    let cache = HashCache::default();
    let written = cache.refresh_sidecar(&file).unwrap();

    assert_eq!(written, HELLO_MD5);
    assert_eq!(fs::read_to_string(&sidecar).unwrap(), HELLO_MD5);
    assert_eq!(cache.hash_of(&file).unwrap(), HELLO_MD5);
}
