//! Duplicate finder implementation with two-phase detection.
//!
//! # Overview
//!
//! This module orchestrates the duplicate detection pipeline:
//! 1. **Walk**: collect regular files below the root (see [`crate::scanner::walker`])
//! 2. **Phase 1 - Size grouping**: bucket files by size, no I/O (see [`crate::duplicates::groups`])
//! 3. **Phase 2 - Fingerprint**: hash every member of a size bucket with 2+ files
//!    and split the bucket by fingerprint
//!
//! Buckets that end with two or more members become [`DuplicateGroup`]s and
//! get a survivor chosen by the configured policy.
//!
//! # Example
//!
//! ```no_run
//! use rmdupes::duplicates::{DuplicateFinder, FinderConfig};
//! use std::path::Path;
//!
//! let finder = DuplicateFinder::new(FinderConfig::default().with_io_threads(2));
//! let (groups, errors) = finder.find_duplicates(Path::new(".")).unwrap();
//!
//! for group in &groups {
//!     println!("{} keeps {}", group.hash_hex(), group.survivor().path);
//! }
//! println!("{} non-fatal errors", errors.len());
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytesize::ByteSize;
use rayon::prelude::*;

use super::groups::{group_by_size, DuplicateGroup};
use super::survivor::{select_survivor, SurvivorFn, SurvivorPolicy};
use crate::context::{RunContext, RunError, RunState};
use crate::progress::{ProgressCallback, PHASE_HASHING, PHASE_WALKING};
use crate::scanner::{
    resolve_dots, FileEntry, Fingerprinter, Hash, HashAlgorithm, HashError, Hasher, Walker,
    WalkerConfig,
};

/// Configuration for the duplicate finder.
#[derive(Clone)]
pub struct FinderConfig {
    /// Number of I/O threads for parallel hashing.
    /// Default is 4 to prevent disk thrashing.
    pub io_threads: usize,
    /// Walker configuration for directory traversal.
    pub walker_config: WalkerConfig,
    /// Digest used by the built-in fingerprinter.
    pub algorithm: HashAlgorithm,
    /// Replaces the built-in fingerprinter when set.
    pub fingerprinter: Option<Arc<dyn Fingerprinter>>,
    /// Built-in survivor policy.
    pub survivor_policy: SurvivorPolicy,
    /// Custom survivor comparison; overrides `survivor_policy` when set.
    pub survivor_fn: Option<Arc<SurvivorFn>>,
    /// Optional shutdown flag for graceful termination.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback for reporting.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for FinderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinderConfig")
            .field("io_threads", &self.io_threads)
            .field("walker_config", &self.walker_config)
            .field("algorithm", &self.algorithm)
            .field(
                "fingerprinter",
                &self.fingerprinter.as_ref().map(|_| "<fingerprinter>"),
            )
            .field("survivor_policy", &self.survivor_policy)
            .field("survivor_fn", &self.survivor_fn.as_ref().map(|_| "<fn>"))
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            io_threads: 4,
            walker_config: WalkerConfig::default(),
            algorithm: HashAlgorithm::default(),
            fingerprinter: None,
            survivor_policy: SurvivorPolicy::default(),
            survivor_fn: None,
            shutdown_flag: None,
            progress_callback: None,
        }
    }
}

impl FinderConfig {
    /// Create a new configuration with custom I/O thread count.
    #[must_use]
    pub fn with_io_threads(mut self, threads: usize) -> Self {
        self.io_threads = threads.max(1);
        self
    }

    /// Set the walker configuration.
    #[must_use]
    pub fn with_walker_config(mut self, config: WalkerConfig) -> Self {
        self.walker_config = config;
        self
    }

    /// Select the digest algorithm of the built-in fingerprinter.
    #[must_use]
    pub fn with_algorithm(mut self, algorithm: HashAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Use a custom fingerprinter.
    #[must_use]
    pub fn with_fingerprinter(mut self, fingerprinter: Arc<dyn Fingerprinter>) -> Self {
        self.fingerprinter = Some(fingerprinter);
        self
    }

    /// Set the survivor policy.
    #[must_use]
    pub fn with_survivor_policy(mut self, policy: SurvivorPolicy) -> Self {
        self.survivor_policy = policy;
        self
    }

    /// Use a custom survivor comparison; the minimum member is kept.
    #[must_use]
    pub fn with_survivor_fn<F>(mut self, f: F) -> Self
    where
        F: Fn(&FileEntry, &FileEntry) -> std::cmp::Ordering + Send + Sync + 'static,
    {
        self.survivor_fn = Some(Arc::new(f));
        self
    }

    /// Set the shutdown flag for graceful termination.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Check if shutdown has been requested.
    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }
}

/// Summary statistics from a duplicate scan.
#[derive(Debug, Clone, Default)]
pub struct ScanSummary {
    /// Total number of files scanned
    pub total_files: usize,
    /// Total size of all scanned files in bytes
    pub total_size: u64,
    /// Number of files eliminated by size grouping (unique sizes)
    pub eliminated_by_size: usize,
    /// Number of files whose content was fingerprinted
    pub fingerprinted_files: usize,
    /// Number of confirmed duplicate groups
    pub duplicate_groups: usize,
    /// Total number of redundant files (excluding survivors)
    pub duplicate_files: usize,
    /// Total space that can be reclaimed by removing duplicates
    pub reclaimable_space: u64,
    /// Number of walk warnings
    pub walk_errors: usize,
    /// Number of fingerprint failures
    pub hash_errors: usize,
    /// Duration of the walk and grouping phases
    pub scan_duration: Duration,
}

impl ScanSummary {
    /// Calculate the percentage of space that is wasted by duplicates.
    #[must_use]
    pub fn wasted_percentage(&self) -> f64 {
        if self.total_size == 0 {
            0.0
        } else {
            (self.reclaimable_space as f64 / self.total_size as f64) * 100.0
        }
    }

    /// Format reclaimable space as human-readable string.
    #[must_use]
    pub fn reclaimable_display(&self) -> String {
        ByteSize(self.reclaimable_space).to_string()
    }

    /// Format total size as human-readable string.
    #[must_use]
    pub fn total_size_display(&self) -> String {
        ByteSize(self.total_size).to_string()
    }
}

/// Errors that end a run without results.
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// The scan was interrupted by user (Ctrl+C or shutdown signal).
    #[error("Scan interrupted by user")]
    Interrupted,

    /// The provided path does not exist.
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    /// The provided path is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// The root directory exists but cannot be read.
    #[error("I/O error for {path}: {source}")]
    IoWithPath {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// An operation was attempted in the wrong run state.
    #[error("Invalid run state transition: {from} → {to}")]
    InvalidState {
        /// State the run was in
        from: RunState,
        /// State that was requested
        to: RunState,
    },
}

/// Duplicate finder that orchestrates the detection pipeline.
pub struct DuplicateFinder {
    config: FinderConfig,
    fingerprinter: Arc<dyn Fingerprinter>,
    survivor: Arc<SurvivorFn>,
}

impl DuplicateFinder {
    /// Create a new duplicate finder with the given configuration.
    #[must_use]
    pub fn new(config: FinderConfig) -> Self {
        let fingerprinter: Arc<dyn Fingerprinter> = match config.fingerprinter {
            Some(ref custom) => Arc::clone(custom),
            None => {
                let mut hasher = Hasher::new().with_algorithm(config.algorithm);
                if let Some(ref flag) = config.shutdown_flag {
                    hasher = hasher.with_shutdown_flag(flag.clone());
                }
                Arc::new(hasher)
            }
        };
        let survivor = match config.survivor_fn {
            Some(ref f) => Arc::clone(f),
            None => config.survivor_policy.clone().into_fn(),
        };

        Self {
            config,
            fingerprinter,
            survivor,
        }
    }

    /// Create a new duplicate finder with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(FinderConfig::default())
    }

    /// The configuration this finder was built with.
    #[must_use]
    pub fn config(&self) -> &FinderConfig {
        &self.config
    }

    /// Find all duplicate files below `path`.
    ///
    /// Runs walk and grouping on a fresh [`RunContext`] and returns the
    /// groups with every non-fatal error recorded along the way.
    ///
    /// # Errors
    ///
    /// Returns `FinderError` if:
    /// - The path does not exist or is not a readable directory
    /// - The scan is interrupted by shutdown signal
    pub fn find_duplicates(
        &self,
        path: &Path,
    ) -> Result<(Vec<DuplicateGroup>, Vec<RunError>), FinderError> {
        let mut ctx = RunContext::new(path);
        self.scan(&mut ctx)?;
        ctx.transition(RunState::Reporting)?;
        ctx.transition(RunState::Done)?;
        Ok(ctx.into_parts())
    }

    /// Walk and group the context's root, leaving the context in
    /// [`RunState::Grouping`] with groups and summary filled in.
    ///
    /// # Errors
    ///
    /// Returns `FinderError` for an unusable root (the context moves to
    /// [`RunState::Failed`]), for interruption, or if the context is not idle.
    pub fn scan(&self, ctx: &mut RunContext) -> Result<(), FinderError> {
        let start_time = Instant::now();
        ctx.transition(RunState::Walking)?;

        let root = match validate_root(ctx.root()) {
            Ok(root) => root,
            Err(e) => {
                log::error!("{}", e);
                ctx.transition(RunState::Failed)?;
                return Err(e);
            }
        };
        ctx.set_root(root);

        log::info!("Starting duplicate scan of {}", ctx.root().display());

        let files = self.walk(ctx)?;

        ctx.transition(RunState::Grouping)?;
        let groups = self.group(files, ctx)?;

        let summary = ctx.summary_mut();
        summary.duplicate_groups = groups.len();
        summary.duplicate_files = groups.iter().map(DuplicateGroup::duplicate_count).sum();
        summary.reclaimable_space = groups.iter().map(DuplicateGroup::wasted_space).sum();
        summary.scan_duration = start_time.elapsed();

        log::info!(
            "Scan complete: {} duplicate groups, {} redundant files, {} reclaimable",
            summary.duplicate_groups,
            summary.duplicate_files,
            summary.reclaimable_display()
        );

        ctx.set_groups(groups);
        Ok(())
    }

    /// Collect every file below the context's root.
    ///
    /// Walk warnings are recorded in the context and the walk continues.
    ///
    /// # Errors
    ///
    /// Returns [`FinderError::Interrupted`] if shutdown was requested.
    pub fn walk(&self, ctx: &mut RunContext) -> Result<Vec<FileEntry>, FinderError> {
        if self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_start(PHASE_WALKING, 0);
        }

        let mut walker = Walker::new(ctx.root(), self.config.walker_config.clone());
        if let Some(ref flag) = self.config.shutdown_flag {
            walker = walker.with_shutdown_flag(flag.clone());
        }

        let mut files = Vec::new();
        let mut walk_errors = 0usize;
        for result in walker.walk() {
            match result {
                Ok(file) => {
                    if let Some(ref callback) = self.config.progress_callback {
                        callback.on_progress(files.len() + 1, &file.path.to_string());
                    }
                    files.push(file);
                }
                Err(e) => {
                    walk_errors += 1;
                    ctx.record(e);
                }
            }
        }

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_end(PHASE_WALKING);
        }

        if self.config.is_shutdown_requested() {
            log::info!("Walk interrupted after {} files", files.len());
            return Err(FinderError::Interrupted);
        }

        let summary = ctx.summary_mut();
        summary.total_files = files.len();
        summary.total_size = files.iter().map(|f| f.size).sum();
        summary.walk_errors = walk_errors;

        log::info!(
            "Walk complete: {} files ({}), {} warnings",
            files.len(),
            summary.total_size_display(),
            walk_errors
        );

        Ok(files)
    }

    /// Group entries into duplicate groups.
    ///
    /// Only members of size buckets with two or more entries are
    /// fingerprinted, each exactly once. A fingerprint failure is recorded in
    /// the context and excludes only the failing entry.
    ///
    /// # Errors
    ///
    /// Returns [`FinderError::Interrupted`] if shutdown was requested.
    pub fn group(
        &self,
        entries: Vec<FileEntry>,
        ctx: &mut RunContext,
    ) -> Result<Vec<DuplicateGroup>, FinderError> {
        let (size_groups, size_stats) = group_by_size(entries);
        ctx.summary_mut().eliminated_by_size = size_stats.eliminated_unique;

        let candidates: Vec<FileEntry> = size_groups.into_iter().flat_map(|g| g.files).collect();
        let results = self.fingerprint_all(candidates);

        if self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        // Single writer: partition by (size, fingerprint) in result order
        let mut positions: HashMap<(u64, Hash), usize> = HashMap::new();
        let mut buckets: Vec<(u64, Hash, Vec<FileEntry>)> = Vec::new();
        let mut hashed = 0usize;
        let mut hash_errors = 0usize;

        for (file, result) in results {
            match result {
                Ok(hash) => {
                    hashed += 1;
                    let key = (file.size, hash);
                    let slot = *positions.entry(key).or_insert_with(|| {
                        buckets.push((file.size, hash, Vec::new()));
                        buckets.len() - 1
                    });
                    buckets[slot].2.push(file.with_fingerprint(hash));
                }
                Err(HashError::Interrupted(_)) => return Err(FinderError::Interrupted),
                Err(e) => {
                    hash_errors += 1;
                    ctx.record(e);
                }
            }
        }

        let mut groups: Vec<DuplicateGroup> = buckets
            .into_iter()
            .filter(|(_, _, files)| files.len() > 1)
            .filter_map(|(size, hash, files)| {
                let survivor = select_survivor(&files, |a, b| (self.survivor)(a, b))?;
                Some(DuplicateGroup::new(hash, size, files, survivor))
            })
            .collect();

        groups.sort_by_key(DuplicateGroup::first_index);

        let summary = ctx.summary_mut();
        summary.fingerprinted_files = hashed;
        summary.hash_errors = hash_errors;

        log::info!(
            "Fingerprinting complete: {} files hashed, {} failed, {} duplicate groups",
            hashed,
            hash_errors,
            groups.len()
        );

        Ok(groups)
    }

    /// Fingerprint every candidate on a bounded pool.
    ///
    /// Results come back in candidate order.
    fn fingerprint_all(&self, candidates: Vec<FileEntry>) -> Vec<(FileEntry, Result<Hash, HashError>)> {
        if candidates.is_empty() {
            log::debug!("No candidates to fingerprint");
            return Vec::new();
        }

        let total = candidates.len();
        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_start(PHASE_HASHING, total);
        }
        log::info!(
            "Fingerprinting {} files with {} I/O threads",
            total,
            self.config.io_threads
        );

        let done = AtomicUsize::new(0);
        let work = |file: FileEntry| {
            let result = if self.config.is_shutdown_requested() {
                Err(HashError::Interrupted(file.path.as_path().to_path_buf()))
            } else {
                self.fingerprinter.fingerprint(&file.path)
            };
            let current = done.fetch_add(1, Ordering::Relaxed) + 1;
            if let Some(ref callback) = self.config.progress_callback {
                callback.on_progress(current, &file.path.to_string());
            }
            (file, result)
        };

        let results: Vec<(FileEntry, Result<Hash, HashError>)> = match rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.io_threads)
            .build()
        {
            Ok(pool) => pool.install(|| candidates.into_par_iter().map(&work).collect()),
            Err(e) => {
                log::warn!("Failed to create thread pool ({}), hashing sequentially", e);
                candidates.into_iter().map(&work).collect()
            }
        };

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_end(PHASE_HASHING);
        }

        results
    }
}

/// Resolve `path` to an absolute, readable directory with `..` resolved
/// lexically.
///
/// # Errors
///
/// Returns [`FinderError::PathNotFound`], [`FinderError::NotADirectory`] or
/// [`FinderError::IoWithPath`] if the directory cannot be listed.
pub fn validate_root(path: &Path) -> Result<PathBuf, FinderError> {
    if !path.exists() {
        return Err(FinderError::PathNotFound(path.to_path_buf()));
    }
    if !path.is_dir() {
        return Err(FinderError::NotADirectory(path.to_path_buf()));
    }

    let absolute = std::path::absolute(path)
        .map(|p| resolve_dots(&p))
        .map_err(|source| FinderError::IoWithPath {
            path: path.to_path_buf(),
            source,
        })?;

    std::fs::read_dir(&absolute).map_err(|source| FinderError::IoWithPath {
        path: absolute.clone(),
        source,
    })?;

    Ok(absolute)
}
