//! Survivor selection for duplicate groups.
//!
//! Every duplicate group keeps exactly one member. The member is the minimum
//! of the group under a comparison function; [`SurvivorPolicy`] provides the
//! built-in comparisons and any closure can be used instead.
//!
//! # Example
//!
//! ```
//! use rmdupes::duplicates::survivor::{select_survivor, SurvivorPolicy};
//! use rmdupes::scanner::FileEntry;
//! use std::time::SystemTime;
//!
//! let files = vec![
//!     FileEntry::new("/photos/backup/img.jpg", 10, SystemTime::now()),
//!     FileEntry::new("/photos/img.jpg", 10, SystemTime::now()),
//! ];
//!
//! let policy = SurvivorPolicy::ShortestPath;
//! assert_eq!(select_survivor(&files, |a, b| policy.compare(a, b)), Some(1));
//! ```

use std::cmp::Ordering;
use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::scanner::{resolve_dots, EntryPath, FileEntry};

/// Comparison used to pick a survivor; the minimum member is kept.
pub type SurvivorFn = dyn Fn(&FileEntry, &FileEntry) -> Ordering + Send + Sync;

/// Which member to keep, as exposed by the CLI and the config file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum KeepStrategy {
    /// Keep the file with the shortest path
    #[default]
    Shortest,
    /// Keep the most recently modified file
    Newest,
    /// Keep the least recently modified file
    Oldest,
}

/// Built-in survivor selection policies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SurvivorPolicy {
    /// Fewest characters in the full path, then lexicographic order.
    #[default]
    ShortestPath,
    /// Most recent modification time.
    Newest,
    /// Oldest modification time.
    Oldest,
    /// Members under one of these directories win.
    PreferDirectory(Vec<EntryPath>),
}

impl SurvivorPolicy {
    /// Build a policy from a keep strategy and preferred directories.
    ///
    /// A non-empty `prefer` list selects [`SurvivorPolicy::PreferDirectory`]
    /// regardless of `keep`. `.` and `..` in the directories are resolved
    /// lexically so they match scanned paths segment by segment.
    #[must_use]
    pub fn from_options(keep: KeepStrategy, prefer: Vec<PathBuf>) -> Self {
        if !prefer.is_empty() {
            return Self::PreferDirectory(
                prefer
                    .iter()
                    .map(|dir| EntryPath::new(resolve_dots(dir)))
                    .collect(),
            );
        }
        match keep {
            KeepStrategy::Shortest => Self::ShortestPath,
            KeepStrategy::Newest => Self::Newest,
            KeepStrategy::Oldest => Self::Oldest,
        }
    }

    /// Compare two members; `Less` means `a` is the better survivor.
    ///
    /// Every policy falls back to [`shortest_path`], so the result is only
    /// `Equal` for identical paths.
    #[must_use]
    pub fn compare(&self, a: &FileEntry, b: &FileEntry) -> Ordering {
        match self {
            Self::ShortestPath => shortest_path(a, b),
            Self::Newest => b
                .modified
                .cmp(&a.modified)
                .then_with(|| shortest_path(a, b)),
            Self::Oldest => a
                .modified
                .cmp(&b.modified)
                .then_with(|| shortest_path(a, b)),
            Self::PreferDirectory(dirs) => {
                let a_preferred = dirs.iter().any(|d| a.path.is_within(d));
                let b_preferred = dirs.iter().any(|d| b.path.is_within(d));
                b_preferred
                    .cmp(&a_preferred)
                    .then_with(|| shortest_path(a, b))
            }
        }
    }

    /// Turn the policy into a shareable comparison function.
    #[must_use]
    pub fn into_fn(self) -> Arc<SurvivorFn> {
        Arc::new(move |a: &FileEntry, b: &FileEntry| self.compare(a, b))
    }
}

/// Shortest full path first, ties broken lexicographically.
#[must_use]
pub fn shortest_path(a: &FileEntry, b: &FileEntry) -> Ordering {
    a.path.cmp(&b.path)
}

/// Index of the minimum member under `cmp`.
///
/// When several members compare equal the first one wins. Returns `None`
/// only for an empty slice.
pub fn select_survivor<F>(files: &[FileEntry], cmp: F) -> Option<usize>
where
    F: Fn(&FileEntry, &FileEntry) -> Ordering,
{
    files
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| cmp(a, b))
        .map(|(i, _)| i)
}
