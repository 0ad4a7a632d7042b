use crate::error::{FlattenError, Result, RunAborted};
use crate::models::{ExtensionMapping, FlattenPlan, RunMode, RunReport};
use crate::services::materializer::Materializer;
use crate::services::tree_walker::{DirectoryReader, FsDirectoryReader, TreeWalker};
use crate::utils::{absolute_path, ExclusionSet};
use chrono::Local;
use std::fs;
use std::path::PathBuf;
use tracing::{error, info};

/// Header timestamp format, local time.
pub const ARCHIVE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Configuration for a flattening run
#[derive(Debug, Clone)]
pub struct FlattenConfig {
    pub root: PathBuf,
    pub destination: PathBuf,
    pub in_exts: Vec<String>,
    pub out_exts: Vec<String>,
    pub exclude: Vec<String>,
    pub dry_run: bool,
}

impl Default for FlattenConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            destination: PathBuf::from("flattened"),
            in_exts: Vec::new(),
            out_exts: Vec::new(),
            exclude: Vec::new(),
            dry_run: false,
        }
    }
}

/// Validate the configuration and resolve everything a run needs.
///
/// Nothing is read from the source tree and nothing is created; every
/// failure here is a [`FlattenError::Config`].
pub fn plan(config: &FlattenConfig) -> Result<FlattenPlan> {
    let mapping = ExtensionMapping::build(&config.in_exts, &config.out_exts)?;
    let exclusions = ExclusionSet::new(&config.exclude)?;

    if !config.root.is_dir() {
        return Err(FlattenError::config(format!(
            "root directory not found: {}",
            config.root.display()
        )));
    }
    let root = fs::canonicalize(&config.root).map_err(|e| {
        FlattenError::config(format!("cannot resolve root {}: {}", config.root.display(), e))
    })?;

    if config.destination.exists() && !config.destination.is_dir() {
        return Err(FlattenError::config(format!(
            "destination is not a directory: {}",
            config.destination.display()
        )));
    }
    let destination = absolute_path(&config.destination).map_err(|e| {
        FlattenError::config(format!(
            "destination parent directory not found for {}: {}",
            config.destination.display(),
            e
        ))
    })?;

    Ok(FlattenPlan {
        mode: RunMode::from_dry_run(config.dry_run),
        root,
        destination,
        mapping,
        exclusions,
        archived_at: Local::now().format(ARCHIVE_TIMESTAMP_FORMAT).to_string(),
    })
}

/// Walk the tree and materialize every candidate in traversal order.
pub fn execute(plan: &FlattenPlan) -> std::result::Result<RunReport, RunAborted> {
    execute_with_reader(plan, FsDirectoryReader)
}

/// [`execute`] over a caller-supplied directory reader.
///
/// Stops at the first fatal error; the returned [`RunAborted`] carries the
/// counts accumulated so far.
pub fn execute_with_reader<R: DirectoryReader>(
    plan: &FlattenPlan,
    reader: R,
) -> std::result::Result<RunReport, RunAborted> {
    info!(
        mode = ?plan.mode,
        root = %plan.root.display(),
        destination = %plan.destination.display(),
        "Starting flatten run"
    );

    let mut report = RunReport::empty();

    if !plan.mode.is_dry_run() && !plan.destination.exists() {
        if let Err(source) = fs::create_dir(&plan.destination) {
            return Err(abort(
                report,
                FlattenError::Write {
                    path: plan.destination.clone(),
                    source,
                },
            ));
        }
        info!(path = %plan.destination.display(), "Created destination directory");
    }

    let mut walker = TreeWalker::with_reader(&plan.root, &plan.mapping, &plan.exclusions, reader)
        .skip_path(plan.destination.clone());
    let mut materializer = Materializer::new(&plan.destination, plan.mode, plan.archived_at.clone());

    let mut failure = None;
    for next in walker.by_ref() {
        match next.and_then(|task| materializer.process(&task)) {
            Ok(outcome) => report.record(outcome),
            Err(e) => {
                failure = Some(e);
                break;
            }
        }
    }

    let stats = walker.stats();
    report.files_scanned = stats.files_scanned;
    report.files_skipped = stats.files_skipped;
    report.dirs_pruned = stats.dirs_pruned;

    if let Some(e) = failure {
        return Err(abort(report, e));
    }

    report.completed = true;
    if report.files_written == 0 {
        info!("No files found matching criteria");
    }
    info!(
        processed = report.files_written,
        scanned = report.files_scanned,
        skipped = report.files_skipped,
        pruned = report.dirs_pruned,
        "Flatten run complete"
    );
    Ok(report)
}

fn abort(mut report: RunReport, error: FlattenError) -> RunAborted {
    error!(
        path = ?error.path(),
        processed = report.files_written,
        "Fatal error, aborting run: {}",
        error
    );
    report.errors = 1;
    report.completed = false;
    RunAborted { report, error }
}
