use rmdupes::actions::{purge, report, DeleteConfig, DeleteError, MemberOutcome};
use rmdupes::context::{RunContext, RunError, RunState};
use rmdupes::duplicates::{DuplicateFinder, DuplicateGroup, FinderError};
use std::fs;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tempfile::tempdir;

fn write(path: &Path, content: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn three_copies(root: &Path) {
    write(&root.join("a.txt"), b"hello");
    write(&root.join("b/c.txt"), b"hello");
    write(&root.join("d.bin"), b"hello");
}

#[test]
fn test_delete_keeps_survivor_only() {
    let dir = tempdir().unwrap();
    three_copies(dir.path());
    write(&dir.path().join("unique.txt"), b"nothing like it");

    let (report, errors) = rmdupes::delete_duplicates(dir.path()).unwrap();

    assert!(errors.is_empty());
    assert_eq!(report.success_count(), 2);
    assert_eq!(report.kept_count(), 1);
    assert_eq!(report.bytes_freed, 10);
    assert!(report.all_succeeded());

    assert_eq!(report.groups.len(), 1);
    let group = &report.groups[0];
    assert_eq!(group.group.size, 5);
    assert_eq!(group.group.hash_hex().len(), 64);
    let outcomes: Vec<(String, MemberOutcome)> = group
        .members()
        .map(|(p, o)| (p.file_name().unwrap().to_string_lossy().into_owned(), o))
        .collect();
    assert_eq!(
        outcomes,
        [
            ("a.txt".to_string(), MemberOutcome::Kept),
            ("c.txt".to_string(), MemberOutcome::Deleted),
            ("d.bin".to_string(), MemberOutcome::Deleted),
        ]
    );

    assert_eq!(fs::read(dir.path().join("a.txt")).unwrap(), b"hello");
    assert!(!dir.path().join("b/c.txt").exists());
    assert!(!dir.path().join("d.bin").exists());
    assert!(dir.path().join("unique.txt").exists());
}

#[test]
fn test_second_delete_finds_nothing() {
    let dir = tempdir().unwrap();
    three_copies(dir.path());

    rmdupes::delete_duplicates(dir.path()).unwrap();
    let (report, errors) = rmdupes::delete_duplicates(dir.path()).unwrap();

    assert!(errors.is_empty());
    assert_eq!(report.success_count(), 0);
    assert!(report.groups.is_empty());
}

#[test]
fn test_modified_file_is_skipped() {
    let dir = tempdir().unwrap();
    three_copies(dir.path());

    let mut ctx = RunContext::new(dir.path());
    DuplicateFinder::with_defaults().scan(&mut ctx).unwrap();

    // Grow one redundant copy after the scan
    write(&dir.path().join("d.bin"), b"hello, world");

    let report = purge(&mut ctx, &DeleteConfig::default()).unwrap();

    assert_eq!(report.success_count(), 1);
    assert_eq!(report.failure_count(), 1);
    assert!(dir.path().join("d.bin").exists());
    assert!(!dir.path().join("b/c.txt").exists());
    assert!(matches!(
        ctx.errors(),
        [RunError::Delete(DeleteError::Modified(_))]
    ));
    assert_eq!(ctx.state(), RunState::Done);
}

#[test]
fn test_no_verify_deletes_modified_file() {
    let dir = tempdir().unwrap();
    three_copies(dir.path());

    let mut ctx = RunContext::new(dir.path());
    DuplicateFinder::with_defaults().scan(&mut ctx).unwrap();
    write(&dir.path().join("d.bin"), b"changed");

    let report = purge(&mut ctx, &DeleteConfig::default().with_verify(false)).unwrap();

    assert_eq!(report.success_count(), 2);
    assert!(!ctx.has_errors());
    assert!(!dir.path().join("d.bin").exists());
}

#[test]
fn test_vanished_file_does_not_stop_purge() {
    let dir = tempdir().unwrap();
    three_copies(dir.path());
    write(&dir.path().join("x1"), b"second group");
    write(&dir.path().join("x2"), b"second group");

    let mut ctx = RunContext::new(dir.path());
    DuplicateFinder::with_defaults().scan(&mut ctx).unwrap();
    fs::remove_file(dir.path().join("b/c.txt")).unwrap();

    let report = purge(&mut ctx, &DeleteConfig::default()).unwrap();

    assert_eq!(report.failure_count(), 1);
    assert_eq!(report.success_count(), 2);
    assert!(dir.path().join("a.txt").exists());
    assert!(dir.path().join("x1").exists());
    assert!(!dir.path().join("x2").exists());
    assert!(matches!(
        ctx.errors(),
        [RunError::Delete(DeleteError::NotFound(_))]
    ));
}

#[test]
fn test_interrupted_purge_deletes_nothing_more() {
    let dir = tempdir().unwrap();
    three_copies(dir.path());

    let flag = Arc::new(AtomicBool::new(false));
    let mut ctx = RunContext::new(dir.path());
    DuplicateFinder::with_defaults().scan(&mut ctx).unwrap();

    flag.store(true, std::sync::atomic::Ordering::SeqCst);
    let report = purge(&mut ctx, &DeleteConfig::default().with_shutdown_flag(flag)).unwrap();

    assert!(report.interrupted);
    assert_eq!(report.success_count(), 0);
    for group in &report.groups {
        for (index, outcome) in group.outcomes.iter().enumerate() {
            let expected = if group.group.is_survivor(index) {
                MemberOutcome::Kept
            } else {
                MemberOutcome::Skipped
            };
            assert_eq!(*outcome, expected);
        }
    }
    assert!(dir.path().join("b/c.txt").exists());
    assert!(dir.path().join("d.bin").exists());
}

#[test]
fn test_report_then_purge_is_rejected() {
    let dir = tempdir().unwrap();
    three_copies(dir.path());

    let mut ctx = RunContext::new(dir.path());
    DuplicateFinder::with_defaults().scan(&mut ctx).unwrap();
    let mut groups: Vec<DuplicateGroup> = Vec::new();
    report(&mut ctx, &mut groups).unwrap();

    let err = purge(&mut ctx, &DeleteConfig::default()).unwrap_err();
    assert!(matches!(err, FinderError::InvalidState { .. }));
    assert!(dir.path().join("d.bin").exists());
}
