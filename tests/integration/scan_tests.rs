use rmdupes::context::RunContext;
use rmdupes::duplicates::{DuplicateFinder, FinderConfig};
use rmdupes::scanner::{Fingerprinter, Hash, HashAlgorithm, HashError, Hasher, WalkerConfig};
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::tempdir;

fn write(path: &Path, content: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    File::create(path).unwrap().write_all(content).unwrap();
}

/// Records every path it is asked to fingerprint.
struct CountingFingerprinter {
    inner: Hasher,
    calls: Mutex<HashMap<PathBuf, usize>>,
}

impl CountingFingerprinter {
    fn new() -> Self {
        Self {
            inner: Hasher::new(),
            calls: Mutex::new(HashMap::new()),
        }
    }

    fn calls(&self) -> HashMap<PathBuf, usize> {
        self.calls.lock().unwrap().clone()
    }
}

impl Fingerprinter for CountingFingerprinter {
    fn fingerprint(&self, path: &Path) -> Result<Hash, HashError> {
        *self
            .calls
            .lock()
            .unwrap()
            .entry(path.to_path_buf())
            .or_insert(0) += 1;
        self.inner.full_hash(path)
    }
}

#[test]
fn test_scan_empty_directory() {
    let dir = tempdir().unwrap();
    let (groups, errors) = rmdupes::find_duplicates(dir.path()).unwrap();

    assert!(groups.is_empty());
    assert!(errors.is_empty());
}

#[test]
fn test_scan_unique_files() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("a.txt"), b"content a");
    write(&dir.path().join("b.txt"), b"content b");
    write(&dir.path().join("c.txt"), b"content c");

    let mut ctx = RunContext::new(dir.path());
    DuplicateFinder::with_defaults().scan(&mut ctx).unwrap();

    assert!(ctx.groups().is_empty());
    assert_eq!(ctx.summary().total_files, 3);
    assert_eq!(ctx.summary().fingerprinted_files, 3);
    assert_eq!(ctx.summary().duplicate_groups, 0);
}

#[test]
fn test_three_copies_keep_shortest_path() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("a.txt"), b"hello");
    write(&dir.path().join("b").join("c.txt"), b"hello");
    write(&dir.path().join("d.bin"), b"hello");

    let (groups, errors) = rmdupes::find_duplicates(dir.path()).unwrap();

    assert!(errors.is_empty());
    assert_eq!(groups.len(), 1);
    let group = &groups[0];
    assert_eq!(group.len(), 3);
    assert_eq!(group.size, 5);
    assert_eq!(group.survivor().path.file_name(), Some("a.txt"));

    let mut redundant: Vec<String> = group
        .redundant()
        .map(|f| f.path.file_name().unwrap_or_default().to_string())
        .collect();
    redundant.sort();
    assert_eq!(redundant, vec!["c.txt", "d.bin"]);
}

#[test]
fn test_unique_sizes_are_never_fingerprinted() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("small"), &[0u8; 1024]);
    write(&dir.path().join("large"), &[0u8; 2048]);

    let counting = Arc::new(CountingFingerprinter::new());
    let config = FinderConfig::default().with_fingerprinter(counting.clone());
    let mut ctx = RunContext::new(dir.path());
    DuplicateFinder::new(config).scan(&mut ctx).unwrap();

    assert!(ctx.groups().is_empty());
    assert!(counting.calls().is_empty());
    assert_eq!(ctx.summary().eliminated_by_size, 2);
}

#[test]
fn test_candidates_fingerprinted_exactly_once() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("a"), b"same");
    write(&dir.path().join("b"), b"same");
    write(&dir.path().join("c"), b"diff");
    write(&dir.path().join("lonely"), b"no other file has this size");

    let counting = Arc::new(CountingFingerprinter::new());
    let config = FinderConfig::default()
        .with_fingerprinter(counting.clone())
        .with_io_threads(3);
    let (groups, _) = DuplicateFinder::new(config)
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(groups.len(), 1);
    let calls = counting.calls();
    assert_eq!(calls.len(), 3);
    assert!(calls.values().all(|&n| n == 1));
    assert!(!calls.keys().any(|p| p.ends_with("lonely")));
}

#[test]
fn test_same_size_different_content() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("a"), b"aaaa");
    write(&dir.path().join("b"), b"bbbb");

    let (groups, _) = rmdupes::find_duplicates(dir.path()).unwrap();
    assert!(groups.is_empty());
}

#[test]
fn test_multiple_groups_in_discovery_order() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("1a.txt"), b"group1");
    write(&dir.path().join("1b.txt"), b"group1");
    write(&dir.path().join("1c.txt"), b"group1");
    write(&dir.path().join("2a.txt"), b"second group");
    write(&dir.path().join("2b.txt"), b"second group");
    write(&dir.path().join("3.txt"), b"unique");

    let mut ctx = RunContext::new(dir.path());
    DuplicateFinder::with_defaults().scan(&mut ctx).unwrap();

    let groups = ctx.groups();
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].len(), 3);
    assert_eq!(groups[1].len(), 2);
    assert!(groups[0].first_index() < groups[1].first_index());

    let summary = ctx.summary();
    assert_eq!(summary.duplicate_groups, 2);
    assert_eq!(summary.duplicate_files, 3);
    assert_eq!(summary.reclaimable_space, 2 * 6 + 12);
}

#[test]
fn test_repeated_runs_are_identical() {
    let dir = tempdir().unwrap();
    for name in ["x/one", "y/two", "three", "z/w/four"] {
        write(&dir.path().join(name), b"payload");
    }
    write(&dir.path().join("p"), b"other");
    write(&dir.path().join("q/p"), b"other");

    let (first, _) = rmdupes::find_duplicates(dir.path()).unwrap();
    let (second, _) = rmdupes::find_duplicates(dir.path()).unwrap();

    assert_eq!(first.len(), 2);
    let shape = |groups: &[rmdupes::duplicates::DuplicateGroup]| {
        groups
            .iter()
            .map(|g| (g.paths(), g.survivor().path.as_path().to_path_buf()))
            .collect::<Vec<_>>()
    };
    assert_eq!(shape(&first), shape(&second));
}

#[test]
fn test_size_filters() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("tiny1"), b"ab");
    write(&dir.path().join("tiny2"), b"ab");
    write(&dir.path().join("big1"), &[7u8; 4096]);
    write(&dir.path().join("big2"), &[7u8; 4096]);

    let config = FinderConfig::default().with_walker_config(WalkerConfig::new(false, Some(100), None));
    let (groups, _) = DuplicateFinder::new(config)
        .find_duplicates(dir.path())
        .unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].size, 4096);

    let config = FinderConfig::default().with_walker_config(WalkerConfig::new(false, None, Some(100)));
    let (groups, _) = DuplicateFinder::new(config)
        .find_duplicates(dir.path())
        .unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].size, 2);
}

#[test]
fn test_sha256_finds_same_groups() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("a"), b"identical bytes");
    write(&dir.path().join("nested/b"), b"identical bytes");

    let config = FinderConfig::default().with_algorithm(HashAlgorithm::Sha256);
    let (groups, _) = DuplicateFinder::new(config)
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].hash_hex().len(), 64);
}

#[test]
fn test_group_paths_are_absolute() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("a"), b"dup");
    write(&dir.path().join("b"), b"dup");

    let (groups, _) = rmdupes::find_duplicates(dir.path()).unwrap();
    assert!(groups[0].files.iter().all(|f| f.path.as_path().is_absolute()));
}
