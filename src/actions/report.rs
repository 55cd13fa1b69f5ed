//! Report mode: hand every duplicate group to an output sink.
//!
//! Reporting never touches the filesystem. The sink decides how groups are
//! rendered; see [`crate::output`] for the text and JSON sinks.

use std::io;

use crate::context::{RunContext, RunError, RunState};
use crate::duplicates::{DuplicateGroup, FinderError, ScanSummary};

/// Receives the results of a run, one group at a time.
pub trait ReportSink {
    /// Called once for every duplicate group, in group order.
    ///
    /// # Errors
    ///
    /// Returns any error from the underlying writer.
    fn group(&mut self, group: &DuplicateGroup) -> io::Result<()>;

    /// Called once after the last group.
    ///
    /// # Errors
    ///
    /// Returns any error from the underlying writer.
    fn finish(&mut self, _summary: &ScanSummary, _errors: &[RunError]) -> io::Result<()> {
        Ok(())
    }
}

/// Collects reported groups in memory.
impl ReportSink for Vec<DuplicateGroup> {
    fn group(&mut self, group: &DuplicateGroup) -> io::Result<()> {
        self.push(group.clone());
        Ok(())
    }
}

/// Errors from report mode.
#[derive(thiserror::Error, Debug)]
pub enum ReportError {
    /// The run was not ready to report.
    #[error(transparent)]
    State(#[from] FinderError),

    /// The sink failed to write.
    #[error("failed to write report: {0}")]
    Io(#[from] io::Error),
}

/// Hand every group of the context to `sink`, then finish it.
///
/// The context must be in [`RunState::Grouping`] and ends in
/// [`RunState::Done`].
///
/// # Errors
///
/// Returns [`ReportError::State`] for a context in the wrong state and
/// [`ReportError::Io`] if the sink fails.
pub fn report(ctx: &mut RunContext, sink: &mut dyn ReportSink) -> Result<(), ReportError> {
    ctx.transition(RunState::Reporting)?;

    for group in ctx.groups() {
        sink.group(group)?;
    }
    sink.finish(ctx.summary(), ctx.errors())?;

    log::debug!("Reported {} duplicate groups", ctx.groups().len());
    ctx.transition(RunState::Done)?;
    Ok(())
}
