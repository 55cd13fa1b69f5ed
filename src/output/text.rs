//! Plain text report, one line per file.
//!
//! Each group starts with its survivor on a line prefixed by `#`, followed
//! by one line per redundant copy prefixed by a space:
//!
//! ```text
//! #2cf24dba...	/data/a.txt
//!  2cf24dba...	/data/b/c.txt
//!  2cf24dba...	/data/d.bin
//! #	2 files can be deleted freeing
//! #	10 bytes of space
//! ```
//!
//! Commented lines are the files that stay, so the listing can be saved,
//! reviewed and fed to other tools before running delete mode.

use std::io::Write;

use crate::actions::ReportSink;
use crate::context::RunError;
use crate::duplicates::{DuplicateGroup, ScanSummary};

/// Report sink writing the text format.
pub struct TextOutput<W: Write> {
    writer: W,
    redundant_files: usize,
    redundant_bytes: u64,
}

impl<W: Write> TextOutput<W> {
    /// Create a sink writing to `writer`.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            redundant_files: 0,
            redundant_bytes: 0,
        }
    }

    /// Consume the sink, returning the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> ReportSink for TextOutput<W> {
    fn group(&mut self, group: &DuplicateGroup) -> std::io::Result<()> {
        let hex = group.hash_hex();
        writeln!(self.writer, "#{}\t{}", hex, group.survivor().path.display())?;
        for file in group.redundant() {
            writeln!(self.writer, " {}\t{}", hex, file.path.display())?;
        }
        self.redundant_files += group.duplicate_count();
        self.redundant_bytes += group.wasted_space();
        Ok(())
    }

    fn finish(&mut self, _summary: &ScanSummary, _errors: &[RunError]) -> std::io::Result<()> {
        writeln!(
            self.writer,
            "#\t{} files can be deleted freeing",
            self.redundant_files
        )?;
        writeln!(self.writer, "#\t{} bytes of space", self.redundant_bytes)?;
        self.writer.flush()
    }
}
