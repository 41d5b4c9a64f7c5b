use camino::Utf8PathBuf;
use stager_infra::hashing::{sidecar_path, HashCache};
use stager_scanner::{ScannerError, Scanner};
use std::fs;
use tempfile::tempdir;

fn utf8_root(dir: &tempfile::TempDir) -> Utf8PathBuf {
    Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap()
}

fn sorted(v: &[stager_core::RelativePath]) -> Vec<String> {
    let mut out: Vec<String> = v.iter().map(|p| p.to_string()).collect();
    out.sort();
    out
}

#[test]
fn listing_excludes_sidecars_and_root() {
    let dir = tempdir().unwrap();
    let root = utf8_root(&dir);
    fs::create_dir_all(root.join("sub/deeper")).unwrap();
    fs::write(root.join("a.txt"), b"a").unwrap();
    fs::write(sidecar_path(&root.join("a.txt")), "0cc175b9c0f1b6a831c399e269772661").unwrap();
    fs::write(root.join("sub/deeper/b.bin"), b"b").unwrap();
    // A lone .md5 file is still metadata.
    fs::write(root.join("sub/orphan.md5"), "ffff").unwrap();

    let (listing, stats) = Scanner::list_with_stats(&root).unwrap();

    assert_eq!(sorted(&listing.folders), vec!["/sub", "/sub/deeper"]);
    assert_eq!(sorted(&listing.files), vec!["/a.txt", "/sub/deeper/b.bin"]);
    assert_eq!(stats.sidecars_skipped, 2);
    assert_eq!(stats.files, 2);
    assert_eq!(stats.folders, 2);
}

#[test]
fn empty_root_lists_nothing() {
    let dir = tempdir().unwrap();
    let listing = Scanner::list(&utf8_root(&dir)).unwrap();
    assert!(listing.folders.is_empty());
    assert!(listing.files.is_empty());
}

#[test]
fn missing_root_is_an_error() {
    let dir = tempdir().unwrap();
    let missing = utf8_root(&dir).join("not-there");

    match Scanner::list(&missing) {
        Err(ScannerError::Walk(_)) => {}
        other => panic!("expected walk error, got {other:?}"),
    }
}

#[test]
fn checksum_resolves_relative_key_against_root() {
    let dir = tempdir().unwrap();
    let root = utf8_root(&dir);
    fs::create_dir_all(root.join("sub")).unwrap();
    fs::write(root.join("sub/a.txt"), b"a").unwrap();

    let listing = Scanner::list(&root).unwrap();
    let rel = listing.files.first().unwrap();

    let hash = Scanner::checksum(&root, rel, &HashCache::default()).unwrap();
    assert_eq!(hash, "0cc175b9c0f1b6a831c399e269772661");
}
