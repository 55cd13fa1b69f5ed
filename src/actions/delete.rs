//! Removal of redundant copies.
//!
//! # Overview
//!
//! [`purge`] walks every duplicate group of a finished scan and permanently
//! removes each member except the survivor. Deletions are independent and
//! best-effort: a failure is recorded in the run context and the remaining
//! members and groups are still processed.
//!
//! There is no trash and no undo. Before a file is removed its size is
//! compared with the size seen during the scan (unless disabled), so a copy
//! that changed in the meantime is left alone.
//!
//! # Example
//!
//! ```no_run
//! use rmdupes::actions::delete::{purge, DeleteConfig};
//! use rmdupes::context::RunContext;
//! use rmdupes::duplicates::DuplicateFinder;
//!
//! let finder = DuplicateFinder::with_defaults();
//! let mut ctx = RunContext::new("/data/photos");
//! finder.scan(&mut ctx).unwrap();
//!
//! let report = purge(&mut ctx, &DeleteConfig::default()).unwrap();
//! println!("{}", report.summary());
//! ```

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use thiserror::Error;

use crate::context::{RunContext, RunState};
use crate::duplicates::{DuplicateGroup, FinderError};
use crate::progress::{ProgressCallback, PHASE_DELETING};

/// Error type for deletion operations.
#[derive(Debug, Error)]
pub enum DeleteError {
    /// File was not found (may have been deleted or moved).
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    /// Permission denied when attempting to delete.
    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// File size changed since the scan.
    #[error("file modified since scan: {0}")]
    Modified(PathBuf),

    /// The remove call failed for another reason.
    #[error("failed to remove {path}: {source}")]
    RemoveFailed {
        /// File that could not be removed
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// A deletion plan included the survivor of its group.
    #[error("refusing to delete survivor: {0}")]
    SurvivorProtected(PathBuf),

    /// Attempted to delete all copies (at least one must be preserved).
    #[error("cannot delete all copies - at least one file must be preserved")]
    AllCopiesWouldBeDeleted,
}

impl DeleteError {
    /// Classify an I/O error for `path`.
    #[must_use]
    pub fn from_io(path: &Path, error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::RemoveFailed {
                path: path.to_path_buf(),
                source: error,
            },
        }
    }

    /// Get the path associated with this error (if any).
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::NotFound(p)
            | Self::PermissionDenied(p)
            | Self::Modified(p)
            | Self::SurvivorProtected(p)
            | Self::RemoveFailed { path: p, .. } => Some(p),
            Self::AllCopiesWouldBeDeleted => None,
        }
    }
}

/// Result of a successful deletion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteResult {
    /// Path that was deleted.
    pub path: PathBuf,
    /// Size of the deleted file in bytes.
    pub size: u64,
}

impl DeleteResult {
    /// Create a new delete result.
    #[must_use]
    pub fn new(path: PathBuf, size: u64) -> Self {
        Self { path, size }
    }
}

/// What happened to one group member during a purge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberOutcome {
    /// The survivor; never touched
    Kept,
    /// Removed from disk
    Deleted,
    /// Removal was attempted and failed, or verification skipped it
    Failed,
    /// Not attempted because the run was interrupted
    Skipped,
}

/// A group together with what happened to each of its members.
#[derive(Debug, Clone)]
pub struct GroupOutcome {
    /// The duplicate group as scanned
    pub group: DuplicateGroup,
    /// One outcome per member, parallel to `group.files`
    pub outcomes: Vec<MemberOutcome>,
}

impl GroupOutcome {
    /// Members paired with their outcomes, in discovery order.
    pub fn members(&self) -> impl Iterator<Item = (&Path, MemberOutcome)> + '_ {
        self.group
            .files
            .iter()
            .zip(&self.outcomes)
            .map(|(file, outcome)| (file.path.as_path(), *outcome))
    }
}

/// Results of a purge.
#[derive(Debug, Clone, Default)]
pub struct PurgeReport {
    /// Every group in group order, with per-member outcomes.
    pub groups: Vec<GroupOutcome>,
    /// Successfully deleted files.
    pub deleted: Vec<DeleteResult>,
    /// Total bytes freed.
    pub bytes_freed: u64,
    /// Whether the purge stopped early on a shutdown request.
    pub interrupted: bool,
}

impl PurgeReport {
    /// Number of successful deletions.
    #[must_use]
    pub fn success_count(&self) -> usize {
        self.deleted.len()
    }

    /// Number of failed deletions.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.count(MemberOutcome::Failed)
    }

    /// Number of survivors kept.
    #[must_use]
    pub fn kept_count(&self) -> usize {
        self.count(MemberOutcome::Kept)
    }

    /// All members of all groups with their outcomes.
    pub fn outcomes(&self) -> impl Iterator<Item = (&Path, MemberOutcome)> + '_ {
        self.groups.iter().flat_map(|g| g.members())
    }

    fn count(&self, outcome: MemberOutcome) -> usize {
        self.outcomes().filter(|(_, o)| *o == outcome).count()
    }

    /// Check if all deletions succeeded.
    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.failure_count() == 0 && !self.interrupted
    }

    /// Human-readable summary of the operation.
    #[must_use]
    pub fn summary(&self) -> String {
        let freed = bytesize::ByteSize(self.bytes_freed);
        if self.failure_count() == 0 {
            format!(
                "Deleted {} file(s), kept {}, freed {}",
                self.success_count(),
                self.kept_count(),
                freed
            )
        } else {
            format!(
                "Deleted {} file(s), {} failed, kept {}, freed {}",
                self.success_count(),
                self.failure_count(),
                self.kept_count(),
                freed
            )
        }
    }
}

/// Configuration for deletion operations.
#[derive(Clone)]
pub struct DeleteConfig {
    /// Check the file size against the scanned size before removing.
    pub verify_before_delete: bool,
    /// Optional shutdown flag; checked before every removal.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for DeleteConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeleteConfig")
            .field("verify_before_delete", &self.verify_before_delete)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Default for DeleteConfig {
    fn default() -> Self {
        Self {
            verify_before_delete: true,
            shutdown_flag: None,
            progress_callback: None,
        }
    }
}

impl DeleteConfig {
    /// Enable/disable size verification.
    #[must_use]
    pub fn with_verify(mut self, verify: bool) -> Self {
        self.verify_before_delete = verify;
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

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }
}

/// File metadata snapshot for verification.
#[derive(Debug, Clone)]
pub struct FileSnapshot {
    /// Path to the file.
    pub path: PathBuf,
    /// File size in bytes.
    pub size: u64,
}

impl FileSnapshot {
    /// Create a snapshot of a file's current state.
    ///
    /// # Errors
    ///
    /// Returns error if file doesn't exist or can't be accessed.
    pub fn capture(path: &Path) -> Result<Self, DeleteError> {
        let metadata = fs::symlink_metadata(path).map_err(|e| DeleteError::from_io(path, e))?;
        Ok(Self {
            path: path.to_path_buf(),
            size: metadata.len(),
        })
    }

    /// Verify that the file still has the expected size.
    ///
    /// # Errors
    ///
    /// Returns [`DeleteError::Modified`] if the size changed, or the capture
    /// error if the file is gone or unreadable.
    pub fn verify(path: &Path, expected_size: u64) -> Result<Self, DeleteError> {
        let current = Self::capture(path)?;
        if current.size != expected_size {
            log::debug!(
                "File modified since scan: {} (size changed from {} to {})",
                path.display(),
                expected_size,
                current.size
            );
            return Err(DeleteError::Modified(path.to_path_buf()));
        }
        Ok(current)
    }
}

/// Permanently delete a single file.
///
/// **WARNING**: This operation cannot be undone.
///
/// # Errors
///
/// - `NotFound` if the file doesn't exist
/// - `PermissionDenied` if deletion is not allowed
/// - `RemoveFailed` if the remove call fails for another reason
pub fn permanent_delete(path: &Path, size: u64) -> Result<DeleteResult, DeleteError> {
    fs::remove_file(path).map_err(|e| DeleteError::from_io(path, e))?;
    log::debug!("Deleted: {} ({} bytes)", path.display(), size);
    Ok(DeleteResult::new(path.to_path_buf(), size))
}

/// Validate that a selection doesn't delete all copies.
///
/// # Errors
///
/// Returns `AllCopiesWouldBeDeleted` if every path of the group is selected.
///
/// # Example
///
/// ```
/// use rmdupes::actions::delete::validate_preserves_copy;
/// use std::path::PathBuf;
///
/// let group = vec![
///     PathBuf::from("/original.txt"),
///     PathBuf::from("/copy1.txt"),
///     PathBuf::from("/copy2.txt"),
/// ];
///
/// let selected = vec![PathBuf::from("/copy1.txt"), PathBuf::from("/copy2.txt")];
/// assert!(validate_preserves_copy(&selected, &group).is_ok());
/// assert!(validate_preserves_copy(&group, &group).is_err());
/// ```
pub fn validate_preserves_copy(
    selected_paths: &[PathBuf],
    group_paths: &[PathBuf],
) -> Result<(), DeleteError> {
    let selected_set: HashSet<&PathBuf> = selected_paths.iter().collect();
    let preserved_count = group_paths
        .iter()
        .filter(|p| !selected_set.contains(p))
        .count();

    if preserved_count == 0 {
        log::error!(
            "Attempted to delete all {} copies of a duplicate group",
            group_paths.len()
        );
        Err(DeleteError::AllCopiesWouldBeDeleted)
    } else {
        Ok(())
    }
}

/// Deletion plan for one group: the survivor and the members to remove.
#[derive(Debug, Clone)]
pub struct GroupPlan {
    /// Member that stays
    pub survivor: PathBuf,
    /// Members to remove with their scanned sizes
    pub targets: Vec<(PathBuf, u64)>,
}

impl GroupPlan {
    /// Plan removal of every redundant member of `group`.
    #[must_use]
    pub fn for_group(group: &DuplicateGroup) -> Self {
        Self {
            survivor: group.survivor().path.as_path().to_path_buf(),
            targets: group
                .redundant()
                .map(|f| (f.path.as_path().to_path_buf(), f.size))
                .collect(),
        }
    }

    /// Check the plan against its group.
    ///
    /// # Errors
    ///
    /// Returns `SurvivorProtected` if the survivor is a target, or
    /// `AllCopiesWouldBeDeleted` if nothing of the group would remain.
    pub fn validate(&self, group: &DuplicateGroup) -> Result<(), DeleteError> {
        if self.targets.iter().any(|(p, _)| *p == self.survivor) {
            return Err(DeleteError::SurvivorProtected(self.survivor.clone()));
        }
        let selected: Vec<PathBuf> = self.targets.iter().map(|(p, _)| p.clone()).collect();
        validate_preserves_copy(&selected, &group.paths())
    }
}

/// Remove every redundant member of every group in the context.
///
/// The context must be in [`RunState::Grouping`]; it ends in
/// [`RunState::Done`]. Each failure is recorded in the context and does not
/// stop the purge. A shutdown request stops it before the next removal and
/// sets [`PurgeReport::interrupted`].
///
/// # Errors
///
/// Returns [`FinderError::InvalidState`] if the context is not ready.
pub fn purge(ctx: &mut RunContext, config: &DeleteConfig) -> Result<PurgeReport, FinderError> {
    ctx.transition(RunState::Purging)?;

    let groups = ctx.groups().to_vec();
    let mut rejected = Vec::new();
    let planned: Vec<bool> = groups
        .iter()
        .map(|group| match GroupPlan::for_group(group).validate(group) {
            Ok(()) => true,
            Err(e) => {
                rejected.push(e);
                false
            }
        })
        .collect();
    for e in rejected {
        ctx.record(e);
    }

    let total: usize = groups
        .iter()
        .zip(&planned)
        .filter(|(_, ok)| **ok)
        .map(|(group, _)| group.duplicate_count())
        .sum();
    log::info!("Deleting {} redundant files from {} groups", total, groups.len());
    if let Some(ref callback) = config.progress_callback {
        callback.on_phase_start(PHASE_DELETING, total);
    }

    let mut report = PurgeReport::default();
    let mut attempted = 0usize;

    for (group, ok) in groups.into_iter().zip(planned) {
        let mut outcomes = Vec::with_capacity(group.len());

        for (index, file) in group.files.iter().enumerate() {
            if group.is_survivor(index) {
                outcomes.push(MemberOutcome::Kept);
                continue;
            }
            if !ok {
                outcomes.push(MemberOutcome::Failed);
                continue;
            }
            if report.interrupted || config.is_shutdown_requested() {
                report.interrupted = true;
                outcomes.push(MemberOutcome::Skipped);
                continue;
            }

            let path = file.path.as_path();
            attempted += 1;
            if let Some(ref callback) = config.progress_callback {
                callback.on_progress(attempted, &path.to_string_lossy());
            }

            match delete_member(path, file.size, config) {
                Ok(result) => {
                    report.bytes_freed += result.size;
                    report.deleted.push(result);
                    outcomes.push(MemberOutcome::Deleted);
                }
                Err(e) => {
                    ctx.record(e);
                    outcomes.push(MemberOutcome::Failed);
                }
            }
        }

        report.groups.push(GroupOutcome { group, outcomes });
    }

    if let Some(ref callback) = config.progress_callback {
        callback.on_phase_end(PHASE_DELETING);
    }

    if report.interrupted {
        log::warn!("Deletion interrupted after {} files", attempted);
    }
    log::info!("{}", report.summary());

    ctx.transition(RunState::Done)?;
    Ok(report)
}

fn delete_member(path: &Path, size: u64, config: &DeleteConfig) -> Result<DeleteResult, DeleteError> {
    if config.verify_before_delete {
        FileSnapshot::verify(path, size)?;
    }
    permanent_delete(path, size)
}
