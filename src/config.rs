//! Layered configuration.
//!
//! Sources, lowest priority first:
//!
//! 1. Built-in defaults ([`Config::default`])
//! 2. `config.toml` in the platform config directory
//!    (e.g. `~/.config/rmdupes/config.toml` on Linux)
//! 3. Environment variables prefixed `RMDUPES_` (e.g. `RMDUPES_IO_THREADS=8`)
//! 4. Command-line flags ([`Config::apply_cli`])
//!
//! ```toml
//! io_threads = 8
//! keep = "newest"
//! algorithm = "sha256"
//! skip_hidden = true
//! min_size = 1024
//! prefer = ["/home/me/Photos/originals"]
//! ```

use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::cli::Cli;
use crate::duplicates::{KeepStrategy, SurvivorPolicy};
use crate::scanner::{HashAlgorithm, WalkerConfig};

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "RMDUPES_";

/// Effective settings for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Hashing threads
    pub io_threads: usize,
    pub keep: KeepStrategy,
    pub algorithm: HashAlgorithm,
    /// Re-check sizes before deleting
    pub verify_before_delete: bool,
    pub skip_hidden: bool,
    pub min_size: Option<u64>,
    pub max_size: Option<u64>,
    /// Directories whose files are preferred as survivors; no order among them
    pub prefer: Vec<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            io_threads: 4,
            keep: KeepStrategy::default(),
            algorithm: HashAlgorithm::default(),
            verify_before_delete: true,
            skip_hidden: false,
            min_size: None,
            max_size: None,
            prefer: Vec::new(),
        }
    }
}

impl Config {
    /// Load defaults, the platform config file and `RMDUPES_*` variables.
    ///
    /// A config file that cannot be parsed is logged and ignored.
    pub fn load() -> Self {
        let path = Self::config_path();
        match Self::layered(path.as_deref(), Env::prefixed(ENV_PREFIX)).extract() {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Ignoring invalid configuration: {}", e);
                Self::default()
            }
        }
    }

    /// Load defaults, the given TOML file and `RMDUPES_*` variables.
    ///
    /// # Errors
    ///
    /// Returns the figment error if a value has the wrong type.
    pub fn load_from(path: &Path) -> Result<Self, figment::Error> {
        Self::layered(Some(path), Env::prefixed(ENV_PREFIX)).extract()
    }

    pub(crate) fn layered(file: Option<&Path>, env: Env) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = file {
            log::debug!("Reading configuration from {}", path.display());
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(env)
    }

    /// `config.toml` in the platform config directory.
    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "rmdupes").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Override settings with flags given on the command line.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(n) = cli.io_threads {
            self.io_threads = usize::try_from(n).unwrap_or(usize::MAX);
        }
        if let Some(keep) = cli.keep {
            self.keep = keep;
        }
        if let Some(algorithm) = cli.algorithm {
            self.algorithm = algorithm;
        }
        if cli.no_verify {
            self.verify_before_delete = false;
        }
        if cli.skip_hidden {
            self.skip_hidden = true;
        }
        if cli.min_size.is_some() {
            self.min_size = cli.min_size;
        }
        if cli.max_size.is_some() {
            self.max_size = cli.max_size;
        }
        if !cli.prefer.is_empty() {
            self.prefer = cli.prefer.clone();
        }
    }

    #[must_use]
    pub fn walker_config(&self) -> WalkerConfig {
        WalkerConfig {
            skip_hidden: self.skip_hidden,
            min_size: self.min_size,
            max_size: self.max_size,
        }
    }

    #[must_use]
    pub fn survivor_policy(&self) -> SurvivorPolicy {
        SurvivorPolicy::from_options(self.keep, self.prefer.clone())
    }
}
