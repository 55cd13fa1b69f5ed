use clap::Parser;
use rmdupes::cli::Cli;
use rmdupes::duplicates::FinderError;
use rmdupes::error::ExitCode;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn cli(args: &[&str]) -> Cli {
    let mut argv = vec!["rmdupes"];
    argv.extend_from_slice(args);
    Cli::try_parse_from(argv).unwrap()
}

fn three_copies(root: &Path) {
    fs::create_dir_all(root.join("b")).unwrap();
    fs::write(root.join("a.txt"), b"hello").unwrap();
    fs::write(root.join("b/c.txt"), b"hello").unwrap();
    fs::write(root.join("d.bin"), b"hello").unwrap();
}

#[test]
fn test_print_mode_changes_nothing() {
    let dir = tempdir().unwrap();
    three_copies(dir.path());
    let root = dir.path().to_str().unwrap();

    let code = rmdupes::run_app(cli(&["-p", root, "-q"])).unwrap();

    assert_eq!(code, ExitCode::Success);
    assert!(dir.path().join("b/c.txt").exists());
    assert!(dir.path().join("d.bin").exists());
}

#[test]
fn test_print_mode_json() {
    let dir = tempdir().unwrap();
    three_copies(dir.path());
    let root = dir.path().to_str().unwrap();

    let code = rmdupes::run_app(cli(&["--print", root, "--format", "json", "-q"])).unwrap();
    assert_eq!(code, ExitCode::Success);
}

#[test]
fn test_delete_mode_removes_redundant_copies() {
    let dir = tempdir().unwrap();
    three_copies(dir.path());
    let root = dir.path().to_str().unwrap();

    let code = rmdupes::run_app(cli(&["-d", root, "-q"])).unwrap();

    assert_eq!(code, ExitCode::Success);
    assert_eq!(fs::read(dir.path().join("a.txt")).unwrap(), b"hello");
    assert!(!dir.path().join("b/c.txt").exists());
    assert!(!dir.path().join("d.bin").exists());
}

#[test]
fn test_delete_mode_honours_prefer() {
    let dir = tempdir().unwrap();
    three_copies(dir.path());
    let root = dir.path().to_str().unwrap();
    let prefer = dir.path().join("b");

    rmdupes::run_app(cli(&[
        "-d",
        root,
        "--prefer",
        prefer.to_str().unwrap(),
        "-q",
    ]))
    .unwrap();

    assert!(dir.path().join("b/c.txt").exists());
    assert!(!dir.path().join("a.txt").exists());
    assert!(!dir.path().join("d.bin").exists());
}

#[test]
fn test_missing_root_is_fatal() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("does-not-exist");

    let err = rmdupes::run_app(cli(&["-p", missing.to_str().unwrap(), "-q"])).unwrap_err();

    assert!(matches!(
        err.downcast_ref::<FinderError>(),
        Some(FinderError::PathNotFound(_))
    ));
    assert_eq!(ExitCode::for_error(&err), ExitCode::GeneralError);
}

#[cfg(unix)]
#[test]
fn test_unreadable_file_gives_partial_success() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    three_copies(dir.path());
    let locked = dir.path().join("locked.txt");
    fs::write(&locked, b"hello").unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
    if fs::File::open(&locked).is_ok() {
        return;
    }

    let code = rmdupes::run_app(cli(&["-p", dir.path().to_str().unwrap(), "-q"])).unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o644)).unwrap();

    assert_eq!(code, ExitCode::PartialSuccess);
}

#[test]
fn test_usage_errors() {
    for args in [
        vec!["rmdupes"],
        vec!["rmdupes", "/tmp"],
        vec!["rmdupes", "-p", "-d"],
        vec!["rmdupes", "-p", "--format", "xml"],
        vec!["rmdupes", "-p", "--keep", "largest"],
        vec!["rmdupes", "-p", "--min-size", "lots"],
    ] {
        assert!(Cli::try_parse_from(args.clone()).is_err(), "{:?} should be rejected", args);
    }
}

#[test]
fn test_no_arguments_prints_usage() {
    let err = Cli::try_parse_from(["rmdupes"]).unwrap_err();
    assert_eq!(
        err.kind(),
        clap::error::ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
    );
    assert_eq!(err.exit_code(), 2);
}
