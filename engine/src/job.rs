//! Run orchestration.
//!
//! This module sequences a planned transfer:
//! - Running a single-file transfer for every work item, in plan order
//! - Forwarding progress to a ProgressSink
//! - Collecting tolerated failures, skips and warnings into a TransferOutcome
//! - Removing emptied source directories after a successful move

use std::fs;
use std::path::Path;

use crate::confirm::ConfirmOverwrite;
use crate::error::EngineError;
use crate::file_transfer;
use crate::model::{FileStatus, TransferOptions, TransferOutcome, TransferPlan};
use crate::plan::plan;
use crate::progress::ProgressSink;

/// Execute a plan.
///
/// Items are transferred one after the other. For each item the sink sees
/// `on_new_file`, the byte/zero signals of the transfer, then `on_file_done`.
///
/// # Errors
/// Returns EngineError::Transfer for the first failure when
/// `options.ignore_errors` is not set; files already transferred stay in
/// place and no source directory is removed. Returns EngineError::RemoveDir
/// if a source directory cannot be removed after a move.
pub fn execute(
    plan: TransferPlan,
    options: &TransferOptions,
    confirm: &mut dyn ConfirmOverwrite,
    sink: &dyn ProgressSink,
) -> Result<TransferOutcome, EngineError> {
    let mut outcome = TransferOutcome::default();

    for item in &plan.items {
        sink.on_new_file(&item.source, &item.destination, item.size);
        let result = file_transfer::transfer(item, options, confirm, &mut |bytes| {
            sink.on_file_transfer(bytes)
        });
        sink.on_file_done();

        let report = result?;
        outcome.bytes_transferred += report.bytes_transferred;
        outcome.warnings.extend(report.warnings);
        match report.status {
            FileStatus::Done => outcome.files_done += 1,
            FileStatus::Skipped => outcome.skipped.push(item.destination.clone()),
            FileStatus::Failed(e) => {
                outcome.errors.insert(item.source.clone(), e);
            }
        }
    }

    if options.is_move() {
        remove_source_dirs(&plan, &outcome)?;
    }

    tracing::info!(
        "{} files transferred ({} bytes), {} skipped, {} failed",
        outcome.files_done,
        outcome.bytes_transferred,
        outcome.skipped.len(),
        outcome.errors.len()
    );

    Ok(outcome)
}

/// Remove the plan's source directories, children before parents.
///
/// Nothing is removed if any file failed or was skipped: those sources are
/// still in place, so their directories are not empty.
fn remove_source_dirs(plan: &TransferPlan, outcome: &TransferOutcome) -> Result<(), EngineError> {
    if !outcome.errors.is_empty() || !outcome.skipped.is_empty() {
        tracing::warn!("some files were not moved; keeping source directories");
        return Ok(());
    }

    for dir in &plan.dirs_to_remove {
        tracing::debug!("removing directory {}", dir.display());
        fs::remove_dir(dir).map_err(|e| EngineError::RemoveDir {
            path: dir.clone(),
            source: e,
        })?;
    }
    Ok(())
}

/// Plan and execute in one call.
///
/// # Errors
/// Returns EngineError::Plan if planning fails (nothing is transferred),
/// otherwise whatever `execute` returns.
pub fn run<P: AsRef<Path>>(
    sources: &[P],
    destination: &Path,
    options: &TransferOptions,
    confirm: &mut dyn ConfirmOverwrite,
    sink: &dyn ProgressSink,
) -> Result<TransferOutcome, EngineError> {
    let plan = plan(sources, destination, options.all_files)?;
    tracing::debug!("planned {} files, {} bytes", plan.len(), plan.total_size);
    execute(plan, options, confirm, sink)
}
