use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use rmdupes::config::Config;
use rmdupes::duplicates::{KeepStrategy, SurvivorPolicy};
use rmdupes::scanner::HashAlgorithm;
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

#[test]
fn test_config_load_defaults() {
    let figment = Figment::from(Serialized::defaults(Config::default()));
    let config: Config = figment.extract().unwrap();
    assert_eq!(config.io_threads, 4);
    assert_eq!(config.keep, KeepStrategy::Shortest);
    assert_eq!(config.algorithm, HashAlgorithm::Blake3);
    assert!(config.verify_before_delete);
    assert!(matches!(config.survivor_policy(), SurvivorPolicy::ShortestPath));
}

#[test]
fn test_config_load_from_toml() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(
        &config_path,
        r#"
io_threads = 8
keep = "newest"
algorithm = "sha256"
verify_before_delete = false
skip_hidden = true
max_size = 1048576
prefer = ["/srv/originals", "/srv/backup"]
"#,
    )
    .unwrap();

    let config = Config::load_from(&config_path).unwrap();

    assert_eq!(config.io_threads, 8);
    assert_eq!(config.keep, KeepStrategy::Newest);
    assert_eq!(config.algorithm, HashAlgorithm::Sha256);
    assert!(!config.verify_before_delete);
    assert!(config.skip_hidden);
    assert_eq!(config.min_size, None);
    assert_eq!(config.max_size, Some(1_048_576));
    assert_eq!(
        config.prefer,
        vec![PathBuf::from("/srv/originals"), PathBuf::from("/srv/backup")]
    );
    assert!(matches!(
        config.survivor_policy(),
        SurvivorPolicy::PreferDirectory(ref dirs) if dirs.len() == 2
    ));
}

#[test]
fn test_config_file_written_by_toml_reloads() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");

    let config = Config {
        io_threads: 2,
        keep: KeepStrategy::Oldest,
        min_size: Some(4096),
        ..Config::default()
    };
    fs::write(&config_path, toml::to_string_pretty(&config).unwrap()).unwrap();

    let saved = fs::read_to_string(&config_path).unwrap();
    assert!(saved.contains("keep = \"oldest\""));
    assert!(saved.contains("io_threads = 2"));

    let reloaded: Config = Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file(&config_path))
        .extract()
        .unwrap();
    assert_eq!(reloaded, config);
}

#[test]
fn test_config_env_layer() {
    std::env::set_var("RMDUPES_ITEST_KEEP", "oldest");
    std::env::set_var("RMDUPES_ITEST_MIN_SIZE", "100");

    let figment = Figment::from(Serialized::defaults(Config::default()))
        .merge(Env::prefixed("RMDUPES_ITEST_"));
    let result: Result<Config, _> = figment.extract();

    std::env::remove_var("RMDUPES_ITEST_KEEP");
    std::env::remove_var("RMDUPES_ITEST_MIN_SIZE");

    let config = result.unwrap();
    assert_eq!(config.keep, KeepStrategy::Oldest);
    assert_eq!(config.min_size, Some(100));
}

#[test]
fn test_config_invalid_toml_is_an_error() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "io_threads = [").unwrap();

    assert!(Config::load_from(&config_path).is_err());
}
