use stager_core::diff::{diff, diff_folders};
use stager_core::{ChangeKind, RelativePath, Side, TreeListing};
use std::collections::HashMap;
use std::convert::Infallible;

// --- Helper Functions to build listings easily ---

fn rel(p: &str) -> RelativePath {
    RelativePath::parse(p).unwrap()
}

fn listing(folders: &[&str], files: &[&str]) -> TreeListing {
    TreeListing {
        folders: folders.iter().map(|p| rel(p)).collect(),
        files: files.iter().map(|p| rel(p)).collect(),
    }
}

fn hashes(entries: &[(&str, &str)]) -> HashMap<String, String> {
    entries
        .iter()
        .map(|(p, h)| (p.to_string(), h.to_string()))
        .collect()
}

fn kinds(set: &stager_core::ChangeSet) -> Vec<(ChangeKind, String)> {
    set.iter()
        .map(|r| (r.kind(), r.path().to_string()))
        .collect()
}

// --- Tests ---

#[test]
fn end_to_end_scenario_produces_expected_records() {
    let source = listing(&["/sub"], &["/a.txt", "/sub/b.txt"]);
    let target = listing(&[], &["/a.txt", "/old.txt"]);
    let src = hashes(&[("/a.txt", "h1"), ("/sub/b.txt", "h2")]);
    let tgt = hashes(&[("/a.txt", "h1"), ("/old.txt", "h3")]);

    let set = diff(&source, &target, |side, p| {
        let map = match side {
            Side::Source => &src,
            Side::Target => &tgt,
        };
        Ok::<_, Infallible>(map[p.as_str()].clone())
    })
    .unwrap();

    assert_eq!(
        kinds(&set),
        vec![
            (ChangeKind::NewFolder, "/sub".to_string()),
            (ChangeKind::NewFile, "/sub/b.txt".to_string()),
            (ChangeKind::DeleteFile, "/old.txt".to_string()),
        ]
    );
}

#[test]
fn identical_trees_produce_no_records() {
    let tree = listing(&["/x", "/x/y"], &["/x/y/z.bin", "/top.cfg"]);
    let h = hashes(&[("/x/y/z.bin", "aa"), ("/top.cfg", "bb")]);

    let set = diff(&tree, &tree, |_, p| Ok::<_, Infallible>(h[p.as_str()].clone())).unwrap();
    assert!(set.is_empty());
}

#[test]
fn changed_hash_is_an_update() {
    let source = listing(&[], &["/app.exe"]);
    let target = listing(&[], &["/app.exe"]);

    let set = diff(&source, &target, |side, _| {
        Ok::<_, Infallible>(match side {
            Side::Source => "new".to_string(),
            Side::Target => "old".to_string(),
        })
    })
    .unwrap();

    assert_eq!(kinds(&set), vec![(ChangeKind::UpdateFile, "/app.exe".to_string())]);
}

#[test]
fn new_source_files_are_never_hashed() {
    let source = listing(&[], &["/fresh.dat", "/shared.dat"]);
    let target = listing(&[], &["/shared.dat"]);
    let mut source_hashed = Vec::new();

    let set = diff(&source, &target, |side, p| {
        if side == Side::Source {
            source_hashed.push(p.to_string());
        }
        Ok::<_, Infallible>("same".to_string())
    })
    .unwrap();

    assert_eq!(source_hashed, vec!["/shared.dat".to_string()]);
    assert_eq!(kinds(&set), vec![(ChangeKind::NewFile, "/fresh.dat".to_string())]);
}

#[test]
fn folder_reconciliation_is_a_symmetric_difference() {
    let source = vec![rel("/keep"), rel("/add"), rel("/add/deep")];
    let target = vec![rel("/gone"), rel("/keep"), rel("/gone/inner")];

    let (added, removed) = diff_folders(&source, &target);

    let added: Vec<_> = added.iter().map(|r| r.path().to_string()).collect();
    let removed: Vec<_> = removed.iter().map(|r| r.path().to_string()).collect();
    assert_eq!(added, vec!["/add", "/add/deep"]);
    assert_eq!(removed, vec!["/gone", "/gone/inner"]);
}

#[test]
fn deleted_folders_come_after_file_records() {
    let source = listing(&[], &[]);
    let target = listing(&["/old"], &["/old/f.txt"]);

    let set = diff(&source, &target, |_, _| Ok::<_, Infallible>("h".to_string())).unwrap();

    assert_eq!(
        kinds(&set),
        vec![
            (ChangeKind::DeleteFile, "/old/f.txt".to_string()),
            (ChangeKind::DeleteFolder, "/old".to_string()),
        ]
    );
    let summary = set.summary();
    assert_eq!(summary.deleted_files, 1);
    assert_eq!(summary.deleted_folders, 1);
}

#[test]
fn hashing_error_aborts_the_diff() {
    let source = listing(&[], &["/a"]);
    let target = listing(&[], &["/a", "/b"]);

    let result = diff(&source, &target, |_, p| {
        if p.as_str() == "/b" {
            Err("unreadable")
        } else {
            Ok("h".to_string())
        }
    });

    assert_eq!(result, Err("unreadable"));
}

#[test]
fn change_set_serializes_as_plain_records() {
    let source = listing(&["/sub"], &[]);
    let target = listing(&[], &[]);
    let set = diff(&source, &target, |_, _| Ok::<_, Infallible>(String::new())).unwrap();

    let json = serde_json::to_string(&set).unwrap();
    assert_eq!(json, r#"[{"path":"/sub","kind":"NewFolder"}]"#);
}
