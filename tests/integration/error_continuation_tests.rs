use rmdupes::context::{RunContext, RunError};
use rmdupes::duplicates::DuplicateFinder;
use rmdupes::scanner::{FileEntry, HashError};
use std::fs;
use std::path::PathBuf;
use std::time::SystemTime;
use tempfile::tempdir;

#[test]
fn test_group_continues_after_fingerprint_errors() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("a");
    let b = dir.path().join("b");
    fs::write(&a, b"0123456789").unwrap();
    fs::write(&b, b"0123456789").unwrap();

    let entries = vec![
        FileEntry::new(a, 10, SystemTime::now()).with_index(0),
        FileEntry::new(PathBuf::from("nonexistent_1.txt"), 10, SystemTime::now()).with_index(1),
        FileEntry::new(b, 10, SystemTime::now()).with_index(2),
        FileEntry::new(PathBuf::from("nonexistent_2.txt"), 10, SystemTime::now()).with_index(3),
    ];

    let mut ctx = RunContext::new(dir.path());
    let groups = DuplicateFinder::with_defaults()
        .group(entries, &mut ctx)
        .unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].len(), 2);
    assert_eq!(ctx.errors().len(), 2);
    for err in ctx.errors() {
        match err {
            RunError::Hash(HashError::NotFound(_)) => {}
            other => panic!("Expected NotFound HashError, got: {:?}", other),
        }
    }
    assert_eq!(ctx.errors()[0].path(), Some(PathBuf::from("nonexistent_1.txt").as_path()));
}

#[cfg(unix)]
#[test]
fn test_unreadable_directory_is_a_warning() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), b"dup").unwrap();
    fs::write(dir.path().join("b.txt"), b"dup").unwrap();
    let locked = dir.path().join("locked");
    fs::create_dir(&locked).unwrap();
    fs::write(locked.join("c.txt"), b"dup").unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    // Permission bits do not bind a privileged user
    if fs::read_dir(&locked).is_ok() {
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        return;
    }

    let result = rmdupes::find_duplicates(dir.path());
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
    let (groups, errors) = result.unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].len(), 2);
    assert!(!errors.is_empty());
    assert!(errors
        .iter()
        .all(|e| matches!(e, RunError::Scan(_)) && e.kind() == "walk"));
    assert!(errors.iter().any(|e| e.path() == Some(locked.as_path())));
}

#[cfg(unix)]
#[test]
fn test_unreadable_file_is_a_fingerprint_error() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    let secret = dir.path().join("secret");
    fs::write(dir.path().join("a"), b"same").unwrap();
    fs::write(dir.path().join("b"), b"same").unwrap();
    fs::write(&secret, b"same").unwrap();
    fs::set_permissions(&secret, fs::Permissions::from_mode(0o000)).unwrap();

    if fs::File::open(&secret).is_ok() {
        return;
    }

    let (groups, errors) = rmdupes::find_duplicates(dir.path()).unwrap();
    fs::set_permissions(&secret, fs::Permissions::from_mode(0o644)).unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].len(), 2);
    assert!(matches!(
        errors.as_slice(),
        [RunError::Hash(HashError::PermissionDenied(_))]
    ));
}
