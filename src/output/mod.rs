//! Output formatters for duplicate scan results.
//!
//! Both formatters are [`ReportSink`](crate::actions::ReportSink)s:
//! - [`text`]: the line-oriented listing, survivors commented with `#`
//! - [`json`]: one JSON document for automation
//!
//! # Example
//!
//! ```no_run
//! use rmdupes::actions::report;
//! use rmdupes::context::RunContext;
//! use rmdupes::duplicates::DuplicateFinder;
//! use rmdupes::output::TextOutput;
//!
//! let mut ctx = RunContext::new(".");
//! DuplicateFinder::with_defaults().scan(&mut ctx).unwrap();
//!
//! let mut sink = TextOutput::new(std::io::stdout().lock());
//! report(&mut ctx, &mut sink).unwrap();
//! ```

pub mod json;
pub mod text;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

pub use json::{JsonOutput, JsonPurgeReport, JsonReport};
pub use text::TextOutput;

/// Report format selected on the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Line-oriented listing
    #[default]
    Text,
    /// JSON document
    Json,
}
