//! JSON output formatter for duplicate scan results.
//!
//! Provides machine-readable JSON output for scripting and automation.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "groups": [
//!     {
//!       "hash": "abc123...",
//!       "size": 1024,
//!       "survivor": "/path/to/file1.txt",
//!       "duplicates": ["/path/to/copy/file1.txt"]
//!     }
//!   ],
//!   "summary": {
//!     "total_files": 100,
//!     "total_size": 1048576,
//!     "duplicate_groups": 5,
//!     "duplicate_files": 10,
//!     "reclaimable_space": 51200,
//!     "scan_duration_ms": 1234
//!   },
//!   "errors": [
//!     { "kind": "walk", "path": "/locked", "message": "Permission denied: /locked" }
//!   ]
//! }
//! ```

use std::io::Write;

use serde::Serialize;

use crate::actions::{MemberOutcome, PurgeReport, ReportSink};
use crate::context::RunError;
use crate::duplicates::{DuplicateGroup, ScanSummary};

/// A single duplicate group in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonDuplicateGroup {
    /// Content hash as hexadecimal string (64 characters)
    pub hash: String,
    /// File size in bytes
    pub size: u64,
    /// Path of the member that is kept
    pub survivor: String,
    /// Paths of the redundant members
    pub duplicates: Vec<String>,
}

impl JsonDuplicateGroup {
    /// Create a JSON duplicate group from a DuplicateGroup.
    #[must_use]
    pub fn from_duplicate_group(group: &DuplicateGroup) -> Self {
        Self {
            hash: group.hash_hex(),
            size: group.size,
            survivor: group.survivor().path.to_string_lossy().into_owned(),
            duplicates: group
                .redundant()
                .map(|f| f.path.to_string_lossy().into_owned())
                .collect(),
        }
    }
}

/// Summary statistics in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSummary {
    /// Total number of files scanned
    pub total_files: usize,
    /// Total size of all scanned files in bytes
    pub total_size: u64,
    /// Number of files whose content was fingerprinted
    pub fingerprinted_files: usize,
    /// Number of confirmed duplicate groups
    pub duplicate_groups: usize,
    /// Total number of redundant files
    pub duplicate_files: usize,
    /// Total space that can be reclaimed by removing duplicates (bytes)
    pub reclaimable_space: u64,
    /// Duration of the scan in milliseconds
    pub scan_duration_ms: u64,
}

impl From<&ScanSummary> for JsonSummary {
    fn from(summary: &ScanSummary) -> Self {
        Self {
            total_files: summary.total_files,
            total_size: summary.total_size,
            fingerprinted_files: summary.fingerprinted_files,
            duplicate_groups: summary.duplicate_groups,
            duplicate_files: summary.duplicate_files,
            reclaimable_space: summary.reclaimable_space,
            scan_duration_ms: summary.scan_duration.as_millis() as u64,
        }
    }
}

/// A non-fatal error in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRunError {
    /// `walk`, `fingerprint` or `delete`
    pub kind: &'static str,
    /// Path the error refers to
    pub path: Option<String>,
    /// Human-readable message
    pub message: String,
}

impl From<&RunError> for JsonRunError {
    fn from(error: &RunError) -> Self {
        Self {
            kind: error.kind(),
            path: error.path().map(|p| p.to_string_lossy().into_owned()),
            message: error.to_string(),
        }
    }
}

/// Complete JSON report.
#[derive(Debug, Clone, Serialize)]
pub struct JsonReport {
    /// List of duplicate groups
    pub groups: Vec<JsonDuplicateGroup>,
    /// Scan summary statistics
    pub summary: JsonSummary,
    /// Non-fatal errors in the order they occurred
    pub errors: Vec<JsonRunError>,
}

impl JsonReport {
    /// Build a report from groups, summary and errors.
    ///
    /// # Example
    ///
    /// ```
    /// use rmdupes::duplicates::{DuplicateGroup, ScanSummary};
    /// use rmdupes::output::json::JsonReport;
    /// use rmdupes::scanner::FileEntry;
    /// use std::time::SystemTime;
    ///
    /// let groups = vec![DuplicateGroup::new(
    ///     [0u8; 32],
    ///     1024,
    ///     vec![
    ///         FileEntry::new("/file1.txt", 1024, SystemTime::now()),
    ///         FileEntry::new("/file2.txt", 1024, SystemTime::now()),
    ///     ],
    ///     0,
    /// )];
    ///
    /// let report = JsonReport::new(&groups, &ScanSummary::default(), &[]);
    /// assert_eq!(report.groups.len(), 1);
    /// assert_eq!(report.groups[0].duplicates.len(), 1);
    /// ```
    #[must_use]
    pub fn new(groups: &[DuplicateGroup], summary: &ScanSummary, errors: &[RunError]) -> Self {
        Self {
            groups: groups
                .iter()
                .map(JsonDuplicateGroup::from_duplicate_group)
                .collect(),
            summary: JsonSummary::from(summary),
            errors: errors.iter().map(JsonRunError::from).collect(),
        }
    }

    /// Serialize to pretty-printed JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Report sink that buffers groups and writes one JSON document at the end.
pub struct JsonOutput<W: Write> {
    writer: W,
    groups: Vec<JsonDuplicateGroup>,
    pretty: bool,
}

impl<W: Write> JsonOutput<W> {
    /// Create a sink writing to `writer`.
    pub fn new(writer: W, pretty: bool) -> Self {
        Self {
            writer,
            groups: Vec::new(),
            pretty,
        }
    }

    /// Consume the sink, returning the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> ReportSink for JsonOutput<W> {
    fn group(&mut self, group: &DuplicateGroup) -> std::io::Result<()> {
        self.groups.push(JsonDuplicateGroup::from_duplicate_group(group));
        Ok(())
    }

    fn finish(&mut self, summary: &ScanSummary, errors: &[RunError]) -> std::io::Result<()> {
        let report = JsonReport {
            groups: std::mem::take(&mut self.groups),
            summary: JsonSummary::from(summary),
            errors: errors.iter().map(JsonRunError::from).collect(),
        };
        if self.pretty {
            serde_json::to_writer_pretty(&mut self.writer, &report)?;
        } else {
            serde_json::to_writer(&mut self.writer, &report)?;
        }
        self.writer.write_all(b"\n")?;
        self.writer.flush()
    }
}

/// Delete mode result in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonPurgeReport {
    /// Paths that were removed
    pub deleted: Vec<String>,
    /// Survivors that were kept
    pub kept: Vec<String>,
    /// Paths whose removal failed
    pub failed: Vec<String>,
    /// Total bytes freed
    pub bytes_freed: u64,
    /// Whether the purge stopped early
    pub interrupted: bool,
    /// Non-fatal errors in the order they occurred
    pub errors: Vec<JsonRunError>,
}

impl JsonPurgeReport {
    /// Build from a purge report and the run's errors.
    #[must_use]
    pub fn new(report: &PurgeReport, errors: &[RunError]) -> Self {
        let paths_with = |outcome: MemberOutcome| {
            report
                .outcomes()
                .filter(|(_, o)| *o == outcome)
                .map(|(p, _)| p.to_string_lossy().into_owned())
                .collect()
        };
        Self {
            deleted: paths_with(MemberOutcome::Deleted),
            kept: paths_with(MemberOutcome::Kept),
            failed: paths_with(MemberOutcome::Failed),
            bytes_freed: report.bytes_freed,
            interrupted: report.interrupted,
            errors: errors.iter().map(JsonRunError::from).collect(),
        }
    }
}
