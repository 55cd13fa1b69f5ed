use filetime::{set_file_mtime, FileTime};
use rmdupes::duplicates::{DuplicateFinder, FinderConfig, KeepStrategy, SurvivorPolicy};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn write(path: &Path, content: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn survivor_name(config: FinderConfig, root: &Path) -> String {
    let (groups, _) = DuplicateFinder::new(config).find_duplicates(root).unwrap();
    assert_eq!(groups.len(), 1);
    groups[0]
        .survivor()
        .path
        .file_name()
        .unwrap_or_default()
        .to_string()
}

fn aged_copies(root: &Path) {
    write(&root.join("a.txt"), b"same content");
    write(&root.join("deeper/b.txt"), b"same content");
    write(&root.join("deeper/still/c.txt"), b"same content");
    set_file_mtime(root.join("a.txt"), FileTime::from_unix_time(2_000_000, 0)).unwrap();
    set_file_mtime(root.join("deeper/b.txt"), FileTime::from_unix_time(3_000_000, 0)).unwrap();
    set_file_mtime(
        root.join("deeper/still/c.txt"),
        FileTime::from_unix_time(1_000_000, 0),
    )
    .unwrap();
}

#[test]
fn test_keep_newest() {
    let dir = tempdir().unwrap();
    aged_copies(dir.path());

    let policy = SurvivorPolicy::from_options(KeepStrategy::Newest, Vec::new());
    let config = FinderConfig::default().with_survivor_policy(policy);
    assert_eq!(survivor_name(config, dir.path()), "b.txt");
}

#[test]
fn test_keep_oldest() {
    let dir = tempdir().unwrap();
    aged_copies(dir.path());

    let policy = SurvivorPolicy::from_options(KeepStrategy::Oldest, Vec::new());
    let config = FinderConfig::default().with_survivor_policy(policy);
    assert_eq!(survivor_name(config, dir.path()), "c.txt");
}

#[test]
fn test_equal_mtimes_fall_back_to_shortest_path() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("long/name.txt"), b"x");
    write(&dir.path().join("n.txt"), b"x");
    let same = FileTime::from_unix_time(5_000_000, 0);
    set_file_mtime(dir.path().join("long/name.txt"), same).unwrap();
    set_file_mtime(dir.path().join("n.txt"), same).unwrap();

    let config = FinderConfig::default().with_survivor_policy(SurvivorPolicy::Newest);
    assert_eq!(survivor_name(config, dir.path()), "n.txt");
}

#[test]
fn test_prefer_directory_beats_shorter_path() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("x.txt"), b"keep me");
    write(&dir.path().join("originals/deep/x.txt"), b"keep me");

    let prefer: Vec<PathBuf> = vec![dir.path().join("originals")];
    let policy = SurvivorPolicy::from_options(KeepStrategy::Shortest, prefer);
    let config = FinderConfig::default().with_survivor_policy(policy);

    let (groups, _) = DuplicateFinder::new(config)
        .find_duplicates(dir.path())
        .unwrap();
    assert!(groups[0]
        .survivor()
        .path
        .as_path()
        .starts_with(dir.path().join("originals")));
}

#[test]
fn test_prefer_directory_matches_whole_segments() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("keep2/a"), b"dup");
    write(&dir.path().join("zz/keep/a"), b"dup");

    let policy = SurvivorPolicy::PreferDirectory(vec![dir.path().join("keep").into()]);
    let config = FinderConfig::default().with_survivor_policy(policy);
    let (groups, _) = DuplicateFinder::new(config)
        .find_duplicates(dir.path())
        .unwrap();

    // "keep2" is not inside "keep", so neither member is preferred
    assert!(groups[0]
        .survivor()
        .path
        .as_path()
        .starts_with(dir.path().join("keep2")));
}

#[test]
fn test_custom_survivor_function() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("a.txt"), b"dup");
    write(&dir.path().join("bbbbbbbb.txt"), b"dup");

    // Longest path wins
    let config = FinderConfig::default().with_survivor_fn(|a, b| b.path.cmp(&a.path));
    assert_eq!(survivor_name(config, dir.path()), "bbbbbbbb.txt");
}

#[test]
fn test_prefer_directory_with_parent_components() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("a"), b"same");
    write(&dir.path().join("keep/original.txt"), b"same");
    fs::create_dir_all(dir.path().join("work")).unwrap();

    // As if `--prefer ../keep` was given from inside `work`
    let prefer = vec![std::path::absolute(dir.path().join("work/../keep")).unwrap()];
    let policy = SurvivorPolicy::from_options(KeepStrategy::Shortest, prefer);
    let config = FinderConfig::default().with_survivor_policy(policy);

    let (groups, _) = DuplicateFinder::new(config)
        .find_duplicates(dir.path())
        .unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].survivor().path.file_name(), Some("original.txt"));
}

#[test]
fn test_root_with_parent_components_keeps_preference() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("a"), b"same");
    write(&dir.path().join("keep/original.txt"), b"same");
    fs::create_dir_all(dir.path().join("work")).unwrap();

    let prefer = vec![dir.path().join("keep")];
    let policy = SurvivorPolicy::from_options(KeepStrategy::Shortest, prefer);
    let config = FinderConfig::default().with_survivor_policy(policy);

    let (groups, _) = DuplicateFinder::new(config)
        .find_duplicates(&dir.path().join("work/.."))
        .unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].survivor().path.file_name(), Some("original.txt"));
}
