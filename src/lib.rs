//! rmdupes - find duplicate files and remove the redundant copies.
//!
//! Files below a root are grouped by size, then same-sized files are
//! hashed. Every group of identical files gets a survivor, the copy that
//! is kept; all other members are reported or deleted.
//!
//! ```no_run
//! let (groups, errors) = rmdupes::find_duplicates(".").unwrap();
//! for group in &groups {
//!     println!("keep {}", group.survivor().path);
//! }
//! assert!(errors.is_empty());
//! ```

pub mod actions;
pub mod cli;
pub mod config;
pub mod context;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;
pub mod signal;

use anyhow::Context;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::actions::{purge, report, DeleteConfig, PurgeReport};
use crate::cli::Cli;
use crate::config::Config;
use crate::context::{RunContext, RunError};
use crate::duplicates::{DuplicateFinder, DuplicateGroup, FinderConfig, FinderError};
use crate::error::ExitCode;
use crate::output::{JsonOutput, JsonPurgeReport, OutputFormat, TextOutput};
use crate::progress::{Progress, ProgressCallback};

/// Find every group of identical files below `root` with default settings.
///
/// # Errors
///
/// Returns [`FinderError`] if `root` is missing, not a directory or
/// unreadable.
pub fn find_duplicates(
    root: impl AsRef<Path>,
) -> Result<(Vec<DuplicateGroup>, Vec<RunError>), FinderError> {
    DuplicateFinder::with_defaults().find_duplicates(root.as_ref())
}

/// Find duplicates below `root` and delete every copy except the survivor.
///
/// [`PurgeReport::groups`] holds every group in order with the outcome of
/// each member.
///
/// # Errors
///
/// Returns [`FinderError`] if `root` is unusable. Failures to delete single
/// files are returned in the error list instead.
pub fn delete_duplicates(
    root: impl AsRef<Path>,
) -> Result<(PurgeReport, Vec<RunError>), FinderError> {
    let mut ctx = RunContext::new(root.as_ref());
    DuplicateFinder::with_defaults().scan(&mut ctx)?;
    let report = purge(&mut ctx, &DeleteConfig::default())?;
    Ok((report, ctx.into_errors()))
}

/// Run the command line application.
///
/// # Errors
///
/// Returns an error for fatal conditions: an unusable root, an interrupted
/// scan, or a failure writing the report.
pub fn run_app(cli: Cli) -> anyhow::Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);

    let mut config = Config::load();
    config.apply_cli(&cli);
    config.prefer = config.prefer.iter().map(|p| absolute_or_same(p)).collect();
    log::debug!(
        "Log level {}, effective configuration: {:?}",
        logging::current_level_name(),
        config
    );

    let handler = signal::install_handler().context("Failed to install Ctrl+C handler")?;

    let root = match cli.path {
        Some(ref path) => path.clone(),
        None => std::env::current_dir().context("Failed to determine current directory")?,
    };

    let progress: Option<Arc<dyn ProgressCallback>> = if cli.progress && !cli.quiet {
        Some(Arc::new(Progress::new(false)))
    } else {
        None
    };

    let mut finder_config = FinderConfig::default()
        .with_io_threads(config.io_threads)
        .with_walker_config(config.walker_config())
        .with_algorithm(config.algorithm)
        .with_survivor_policy(config.survivor_policy())
        .with_shutdown_flag(handler.get_flag());
    if let Some(ref callback) = progress {
        finder_config = finder_config.with_progress_callback(Arc::clone(callback));
    }

    let mut ctx = RunContext::new(root);
    DuplicateFinder::new(finder_config).scan(&mut ctx)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if cli.delete {
        let mut delete_config = DeleteConfig::default()
            .with_verify(config.verify_before_delete)
            .with_shutdown_flag(handler.get_flag());
        if let Some(callback) = progress {
            delete_config = delete_config.with_progress_callback(callback);
        }

        let purge_report = purge(&mut ctx, &delete_config)?;

        if cli.format == OutputFormat::Json {
            serde_json::to_writer_pretty(
                &mut out,
                &JsonPurgeReport::new(&purge_report, ctx.errors()),
            )
            .context("Failed to write delete report")?;
            writeln!(out).context("Failed to write delete report")?;
        }
        if cli.quiet {
            print_errors(io::stderr().lock(), ctx.errors())
                .context("Failed to write errors to stderr")?;
        } else {
            eprintln!("{}", purge_report.summary());
        }

        if purge_report.interrupted {
            return Ok(ExitCode::Interrupted);
        }
    } else {
        match cli.format {
            OutputFormat::Text => report(&mut ctx, &mut TextOutput::new(&mut out))?,
            OutputFormat::Json => report(&mut ctx, &mut JsonOutput::new(&mut out, true))?,
        }
        if cli.quiet {
            print_errors(io::stderr().lock(), ctx.errors())
                .context("Failed to write errors to stderr")?;
        }
    }

    if ctx.has_errors() {
        log::warn!(
            "{} file(s) could not be processed",
            ctx.errors().len()
        );
        Ok(ExitCode::PartialSuccess)
    } else {
        Ok(ExitCode::Success)
    }
}

/// Non-fatal errors are logged at `warn` as they happen; with `-q` the log
/// is silenced, so they are listed here instead.
fn print_errors<W: Write>(mut err: W, errors: &[RunError]) -> io::Result<()> {
    for e in errors {
        writeln!(err, "{}: {}", e.kind(), e)?;
    }
    err.flush()
}

fn absolute_or_same(path: &Path) -> PathBuf {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    scanner::resolve_dots(&absolute)
}
