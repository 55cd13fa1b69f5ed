//! Per-run state threaded through walk, grouping and the final action.
//!
//! A [`RunContext`] is created for every run and owns everything the run
//! produces: the lifecycle state, the duplicate groups, the scan summary and
//! every non-fatal error in the order it happened. Nothing is shared between
//! runs.
//!
//! ```text
//! Idle → Walking → Grouping → Reporting → Done
//!                          ↘ Purging   → Done
//!          Walking → Failed
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use crate::actions::delete::DeleteError;
use crate::duplicates::{DuplicateGroup, FinderError, ScanSummary};
use crate::scanner::{HashError, ScanError};

/// Lifecycle of a single run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Created, nothing done yet
    Idle,
    /// Traversing the directory tree
    Walking,
    /// Bucketing by size and fingerprint
    Grouping,
    /// Handing groups to an output sink
    Reporting,
    /// Removing redundant copies
    Purging,
    /// Finished; results are final
    Done,
    /// The root could not be scanned
    Failed,
}

impl RunState {
    /// Whether `self → next` is a legal transition.
    #[must_use]
    pub fn can_transition_to(self, next: RunState) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Walking)
                | (Self::Walking, Self::Grouping)
                | (Self::Walking, Self::Failed)
                | (Self::Grouping, Self::Reporting)
                | (Self::Grouping, Self::Purging)
                | (Self::Reporting, Self::Done)
                | (Self::Purging, Self::Done)
        )
    }

    /// Whether no further transition is possible.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Walking => "walking",
            Self::Grouping => "grouping",
            Self::Reporting => "reporting",
            Self::Purging => "purging",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// A non-fatal error recorded during a run.
#[derive(thiserror::Error, Debug)]
pub enum RunError {
    /// A file or directory could not be listed or inspected during the walk.
    #[error(transparent)]
    Scan(#[from] ScanError),

    /// A candidate file could not be fingerprinted.
    #[error(transparent)]
    Hash(#[from] HashError),

    /// A redundant copy could not be removed.
    #[error(transparent)]
    Delete(#[from] DeleteError),
}

impl RunError {
    /// Path the error refers to.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Scan(e) => Some(e.path()),
            Self::Hash(e) => Some(e.path()),
            Self::Delete(e) => e.path(),
        }
    }

    /// Short machine-readable category.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Scan(_) => "walk",
            Self::Hash(_) => "fingerprint",
            Self::Delete(_) => "delete",
        }
    }
}

/// State, results and errors of one run.
#[derive(Debug)]
pub struct RunContext {
    root: PathBuf,
    state: RunState,
    errors: Vec<RunError>,
    groups: Vec<DuplicateGroup>,
    summary: ScanSummary,
}

impl RunContext {
    /// Create a fresh context for a run rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            state: RunState::Idle,
            errors: Vec::new(),
            groups: Vec::new(),
            summary: ScanSummary::default(),
        }
    }

    /// Root directory of the run.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub(crate) fn set_root(&mut self, root: PathBuf) {
        self.root = root;
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Move to `next`.
    ///
    /// # Errors
    ///
    /// Returns [`FinderError::InvalidState`] if the transition is not allowed.
    pub fn transition(&mut self, next: RunState) -> Result<(), FinderError> {
        if !self.state.can_transition_to(next) {
            return Err(FinderError::InvalidState {
                from: self.state,
                to: next,
            });
        }
        log::debug!("Run state: {} → {}", self.state, next);
        self.state = next;
        Ok(())
    }

    /// Record a non-fatal error and log it.
    pub fn record(&mut self, error: impl Into<RunError>) {
        let error = error.into();
        log::warn!("{}", error);
        self.errors.push(error);
    }

    /// Non-fatal errors, in the order they occurred.
    #[must_use]
    pub fn errors(&self) -> &[RunError] {
        &self.errors
    }

    /// Whether any non-fatal error was recorded.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Duplicate groups found by the run.
    #[must_use]
    pub fn groups(&self) -> &[DuplicateGroup] {
        &self.groups
    }

    pub(crate) fn set_groups(&mut self, groups: Vec<DuplicateGroup>) {
        self.groups = groups;
    }

    /// Scan statistics.
    #[must_use]
    pub fn summary(&self) -> &ScanSummary {
        &self.summary
    }

    pub(crate) fn summary_mut(&mut self) -> &mut ScanSummary {
        &mut self.summary
    }

    /// Consume the context, returning the groups and the error list.
    #[must_use]
    pub fn into_parts(self) -> (Vec<DuplicateGroup>, Vec<RunError>) {
        (self.groups, self.errors)
    }

    /// Consume the context, returning only the error list.
    #[must_use]
    pub fn into_errors(self) -> Vec<RunError> {
        self.errors
    }
}
