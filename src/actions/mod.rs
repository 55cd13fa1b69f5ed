//! Actions applied to the groups of a finished scan.
//!
//! - [`report`]: hand groups to an output sink, no filesystem changes
//! - [`delete`]: remove every redundant copy, keeping the survivor
//!
//! ```no_run
//! use rmdupes::actions::{report, ReportSink};
//! use rmdupes::context::RunContext;
//! use rmdupes::duplicates::{DuplicateFinder, DuplicateGroup};
//!
//! let mut ctx = RunContext::new(".");
//! DuplicateFinder::with_defaults().scan(&mut ctx).unwrap();
//!
//! let mut groups: Vec<DuplicateGroup> = Vec::new();
//! report(&mut ctx, &mut groups).unwrap();
//! ```

pub mod delete;
pub mod report;

pub use delete::{
    permanent_delete, purge, validate_preserves_copy, DeleteConfig, DeleteError, DeleteResult,
    FileSnapshot, GroupOutcome, GroupPlan, MemberOutcome, PurgeReport,
};
pub use report::{report, ReportError, ReportSink};
