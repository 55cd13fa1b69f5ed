//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Size-based file grouping (phase 1)
//! - Fingerprint grouping (phase 2)
//! - Survivor selection for each duplicate group

pub mod finder;
pub mod groups;
pub mod survivor;

pub use finder::{validate_root, DuplicateFinder, FinderConfig, FinderError, ScanSummary};
pub use groups::{group_by_size, DuplicateGroup, GroupingStats, SizeGroup};
pub use survivor::{select_survivor, shortest_path, KeepStrategy, SurvivorFn, SurvivorPolicy};
