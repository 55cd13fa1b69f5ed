//! Size buckets and confirmed duplicate groups.
//!
//! # Overview
//!
//! Size grouping is the first phase of duplicate detection. Files with
//! different sizes cannot be duplicates, so every file is placed in the bucket
//! for its exact byte size and buckets holding a single file are dropped
//! before any content is read.
//!
//! Zero-byte files are grouped like any other size: all empty files are
//! duplicates of each other.
//!
//! # Example
//!
//! ```
//! use rmdupes::scanner::FileEntry;
//! use rmdupes::duplicates::group_by_size;
//! use std::time::SystemTime;
//!
//! let files = vec![
//!     FileEntry::new("/file1.txt", 1024, SystemTime::now()),
//!     FileEntry::new("/file2.txt", 1024, SystemTime::now()),
//!     FileEntry::new("/file3.txt", 2048, SystemTime::now()),
//! ];
//!
//! let (groups, stats) = group_by_size(files);
//!
//! assert_eq!(stats.total_files, 3);
//! assert_eq!(stats.potential_duplicates, 2);
//! assert_eq!(groups.len(), 1);
//! ```

use std::collections::HashMap;
use std::path::PathBuf;

use crate::scanner::{hash_to_hex, FileEntry, Hash};

/// A group of files with the same size.
#[derive(Debug, Clone)]
pub struct SizeGroup {
    /// File size in bytes (shared by all files in this group)
    pub size: u64,
    /// Files with this exact size, in discovery order
    pub files: Vec<FileEntry>,
}

impl SizeGroup {
    /// Create a new, empty size group.
    #[must_use]
    pub fn new(size: u64) -> Self {
        Self {
            size,
            files: Vec::new(),
        }
    }

    /// Create a size group with initial files.
    #[must_use]
    pub fn with_files(size: u64, files: Vec<FileEntry>) -> Self {
        Self { size, files }
    }

    /// Add a file to this group.
    ///
    /// # Panics
    ///
    /// Debug assertion fails if file size doesn't match group size.
    pub fn add(&mut self, file: FileEntry) {
        debug_assert_eq!(
            file.size, self.size,
            "File size {} doesn't match group size {}",
            file.size, self.size
        );
        self.files.push(file);
    }

    /// Number of files in this group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if this group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Check if this group has potential duplicates (2+ files).
    #[must_use]
    pub fn has_duplicates(&self) -> bool {
        self.files.len() > 1
    }

    /// Potential space savings (all copies minus one).
    #[must_use]
    pub fn potential_savings(&self) -> u64 {
        self.size * (self.files.len() as u64).saturating_sub(1)
    }
}

/// Confirmed duplicate group of files.
///
/// All members share the same size and fingerprint. Exactly one member is
/// the survivor; the others are redundant copies.
#[derive(Debug, Clone)]
pub struct DuplicateGroup {
    /// Content fingerprint shared by all members
    pub hash: Hash,
    /// File size in bytes
    pub size: u64,
    /// Members in discovery order
    pub files: Vec<FileEntry>,
    /// Position of the survivor in `files`
    pub survivor: usize,
}

impl DuplicateGroup {
    /// Create a new duplicate group.
    ///
    /// # Panics
    ///
    /// Debug assertion fails if `survivor` is out of range.
    #[must_use]
    pub fn new(hash: Hash, size: u64, files: Vec<FileEntry>, survivor: usize) -> Self {
        debug_assert!(survivor < files.len(), "survivor index out of range");
        Self {
            hash,
            size,
            files,
            survivor,
        }
    }

    /// Number of files in this group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if this group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// The member that is kept.
    #[must_use]
    pub fn survivor(&self) -> &FileEntry {
        &self.files[self.survivor]
    }

    /// Every member except the survivor, in discovery order.
    pub fn redundant(&self) -> impl Iterator<Item = &FileEntry> + '_ {
        self.files
            .iter()
            .enumerate()
            .filter(move |(i, _)| *i != self.survivor)
            .map(|(_, f)| f)
    }

    /// Check whether the member at `index` is the survivor.
    #[must_use]
    pub fn is_survivor(&self, index: usize) -> bool {
        index == self.survivor
    }

    /// Total size of all files in this group.
    #[must_use]
    pub fn total_size(&self) -> u64 {
        self.size * self.files.len() as u64
    }

    /// Space freed by removing every redundant member.
    #[must_use]
    pub fn wasted_space(&self) -> u64 {
        self.size * self.duplicate_count() as u64
    }

    /// Number of redundant copies (total - 1 survivor).
    #[must_use]
    pub fn duplicate_count(&self) -> usize {
        self.files.len().saturating_sub(1)
    }

    /// Hash as hexadecimal string.
    #[must_use]
    pub fn hash_hex(&self) -> String {
        hash_to_hex(&self.hash)
    }

    /// Discovery index of the first member, used to order groups.
    #[must_use]
    pub fn first_index(&self) -> usize {
        self.files.first().map_or(usize::MAX, |f| f.index)
    }

    /// Get just the paths of files in this group.
    #[must_use]
    pub fn paths(&self) -> Vec<PathBuf> {
        self.files
            .iter()
            .map(|f| f.path.as_path().to_path_buf())
            .collect()
    }
}

/// Statistics from the size grouping phase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupingStats {
    /// Total number of files processed
    pub total_files: usize,
    /// Total size of all files in bytes
    pub total_size: u64,
    /// Number of unique file sizes
    pub unique_sizes: usize,
    /// Number of files that could be duplicates (in groups of 2+)
    pub potential_duplicates: usize,
    /// Number of files eliminated as unique (singleton groups)
    pub eliminated_unique: usize,
    /// Number of empty files encountered
    pub empty_files: usize,
    /// Number of size groups with 2+ files
    pub duplicate_groups: usize,
}

impl GroupingStats {
    /// Percentage of files eliminated by size grouping.
    #[must_use]
    pub fn elimination_rate(&self) -> f64 {
        if self.total_files == 0 {
            0.0
        } else {
            (self.eliminated_unique as f64 / self.total_files as f64) * 100.0
        }
    }
}

/// Group files by size (phase 1 of duplicate detection).
///
/// No file I/O is performed. Only groups with two or more files are
/// returned, ordered by the discovery position of their first member, and
/// each group keeps its files in input order.
///
/// # Example
///
/// ```
/// use rmdupes::scanner::FileEntry;
/// use rmdupes::duplicates::group_by_size;
/// use std::time::SystemTime;
///
/// let files = vec![
///     FileEntry::new("/a.txt", 100, SystemTime::now()),
///     FileEntry::new("/c.txt", 200, SystemTime::now()),
///     FileEntry::new("/b.txt", 100, SystemTime::now()),
/// ];
///
/// let (groups, stats) = group_by_size(files);
///
/// assert_eq!(groups.len(), 1);
/// assert_eq!(groups[0].size, 100);
/// assert_eq!(stats.eliminated_unique, 1);
/// ```
#[must_use]
pub fn group_by_size(files: impl IntoIterator<Item = FileEntry>) -> (Vec<SizeGroup>, GroupingStats) {
    let mut positions: HashMap<u64, usize> = HashMap::new();
    let mut all_groups: Vec<SizeGroup> = Vec::new();
    let mut stats = GroupingStats::default();

    for file in files {
        stats.total_files += 1;
        stats.total_size += file.size;
        if file.size == 0 {
            stats.empty_files += 1;
        }

        let slot = *positions.entry(file.size).or_insert_with(|| {
            all_groups.push(SizeGroup::new(file.size));
            all_groups.len() - 1
        });
        all_groups[slot].add(file);
    }

    stats.unique_sizes = all_groups.len();

    let groups: Vec<SizeGroup> = all_groups
        .into_iter()
        .filter(|group| {
            if group.has_duplicates() {
                stats.potential_duplicates += group.len();
                stats.duplicate_groups += 1;
                log::debug!(
                    "Size group {} bytes: {} potential duplicates",
                    group.size,
                    group.len()
                );
                true
            } else {
                stats.eliminated_unique += group.len();
                if let Some(file) = group.files.first() {
                    log::trace!("Eliminated unique size {}: {}", group.size, file.path);
                }
                false
            }
        })
        .collect();

    log::info!(
        "Size grouping: {} files → {} potential duplicates ({:.1}% eliminated)",
        stats.total_files,
        stats.potential_duplicates,
        stats.elimination_rate()
    );

    (groups, stats)
}
