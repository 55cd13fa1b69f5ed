//! Path value type and Unicode path normalization.
//!
//! # Overview
//!
//! [`EntryPath`] is the path representation used throughout duplicate
//! detection. It keeps the OS path for I/O next to an ordered list of
//! NFC-normalized segments, and defines the ordering used when picking a
//! survivor: fewer characters first, then lexicographic.
//!
//! # Background
//!
//! macOS uses NFD (Decomposed) normalization for file paths, while Windows
//! and Linux typically use NFC (Composed) normalization. The same visual
//! filename can have different byte representations:
//!
//! - NFC: `café.txt` - 'é' is U+00E9 (single code point)
//! - NFD: `café.txt` - 'e' U+0065 + combining acute accent U+0301
//!
//! Counting characters on the raw bytes would make the NFD spelling one
//! character longer, so lengths and comparisons are computed on the
//! normalized segments.
//!
//! # Example
//!
//! ```
//! use rmdupes::scanner::path_utils::EntryPath;
//!
//! let short = EntryPath::new("/data/a.txt");
//! let long = EntryPath::new("/data/b/c.txt");
//! assert!(short < long);
//! assert_eq!(short.char_len(), 11);
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::ops::Deref;
use std::path::{Component, Path, PathBuf, MAIN_SEPARATOR};

use unicode_normalization::UnicodeNormalization;

/// Normalize a path string to NFC (Composed) form.
///
/// # Example
///
/// ```
/// use rmdupes::scanner::path_utils::normalize_path_str;
///
/// let nfd = "cafe\u{0301}.txt"; // NFD form
/// assert_eq!(normalize_path_str(nfd), "café.txt");
/// ```
#[must_use]
pub fn normalize_path_str(s: &str) -> String {
    s.nfc().collect()
}

/// Check if a string is already in NFC form.
#[must_use]
pub fn is_nfc(s: &str) -> bool {
    unicode_normalization::is_nfc(s)
}

/// Split a path into NFC-normalized segments.
///
/// The root directory is not a segment; `.` components are dropped and
/// `..` is kept as-is. Invalid UTF-8 is converted lossily.
#[must_use]
pub fn path_segments(path: &Path) -> Vec<String> {
    path.components()
        .filter_map(|component| match component {
            Component::Prefix(prefix) => {
                Some(normalize_path_str(&prefix.as_os_str().to_string_lossy()))
            }
            Component::RootDir | Component::CurDir => None,
            Component::ParentDir => Some("..".to_string()),
            Component::Normal(name) => Some(normalize_path_str(&name.to_string_lossy())),
        })
        .collect()
}

/// Resolve `.` and `..` components without touching the filesystem.
///
/// A `..` removes the preceding normal segment. At the root it is dropped;
/// at the start of a relative path it is kept. Symlinks are not resolved.
///
/// ```
/// use rmdupes::scanner::path_utils::resolve_dots;
/// use std::path::Path;
///
/// assert_eq!(resolve_dots(Path::new("/data/work/../keep")), Path::new("/data/keep"));
/// assert_eq!(resolve_dots(Path::new("../a/./b")), Path::new("../a/b"));
/// ```
#[must_use]
pub fn resolve_dots(path: &Path) -> PathBuf {
    let mut resolved = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match resolved.components().next_back() {
                Some(Component::Normal(_)) => {
                    resolved.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => resolved.push(".."),
            },
            other => resolved.push(other.as_os_str()),
        }
    }
    resolved
}

/// A file path as an ordered sequence of normalized segments.
///
/// Equality follows the underlying OS path. Ordering compares the
/// character count of the joined path first and the joined string second,
/// falling back to the raw OS path so the order stays total.
#[derive(Clone)]
pub struct EntryPath {
    raw: PathBuf,
    segments: Vec<String>,
    joined: String,
    char_len: usize,
}

impl EntryPath {
    /// Build an entry path from anything path-like.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let raw = path.into();
        let segments = path_segments(&raw);

        let mut joined = String::new();
        let mut segment_iter = segments.iter();
        for component in raw.components() {
            match component {
                Component::RootDir => joined.push(MAIN_SEPARATOR),
                Component::CurDir => {}
                _ => {
                    if let Some(segment) = segment_iter.next() {
                        if !joined.is_empty() && !joined.ends_with(MAIN_SEPARATOR) {
                            joined.push(MAIN_SEPARATOR);
                        }
                        joined.push_str(segment);
                    }
                }
            }
        }
        let char_len = joined.chars().count();

        Self {
            raw,
            segments,
            joined,
            char_len,
        }
    }

    /// The OS path, for I/O.
    #[must_use]
    pub fn as_path(&self) -> &Path {
        &self.raw
    }

    /// Normalized segments, outermost first.
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// File name segment, if any.
    #[must_use]
    pub fn file_name(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// Number of characters in the normalized full path.
    #[must_use]
    pub fn char_len(&self) -> usize {
        self.char_len
    }

    /// The normalized full path as a string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.joined
    }

    /// Whether this path lies inside `dir` (segment-wise prefix match).
    #[must_use]
    pub fn is_within(&self, dir: &EntryPath) -> bool {
        self.raw.has_root() == dir.raw.has_root()
            && self.segments.len() >= dir.segments.len()
            && self.segments.iter().zip(&dir.segments).all(|(a, b)| a == b)
    }

    /// Consume and return the OS path.
    #[must_use]
    pub fn into_path_buf(self) -> PathBuf {
        self.raw
    }
}

impl Deref for EntryPath {
    type Target = Path;

    fn deref(&self) -> &Path {
        &self.raw
    }
}

impl AsRef<Path> for EntryPath {
    fn as_ref(&self) -> &Path {
        &self.raw
    }
}

impl From<PathBuf> for EntryPath {
    fn from(path: PathBuf) -> Self {
        Self::new(path)
    }
}

impl From<&Path> for EntryPath {
    fn from(path: &Path) -> Self {
        Self::new(path)
    }
}

impl From<&str> for EntryPath {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

impl PartialEq for EntryPath {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Eq for EntryPath {}

impl PartialEq<Path> for EntryPath {
    fn eq(&self, other: &Path) -> bool {
        self.raw == other
    }
}

impl PartialEq<PathBuf> for EntryPath {
    fn eq(&self, other: &PathBuf) -> bool {
        &self.raw == other
    }
}

impl std::hash::Hash for EntryPath {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

impl Ord for EntryPath {
    fn cmp(&self, other: &Self) -> Ordering {
        self.char_len
            .cmp(&other.char_len)
            .then_with(|| self.joined.cmp(&other.joined))
            .then_with(|| self.raw.cmp(&other.raw))
    }
}

impl PartialOrd for EntryPath {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Debug for EntryPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.raw, f)
    }
}

impl fmt::Display for EntryPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.joined)
    }
}
