//! Single-file transfer.
//!
//! Transfers one `WorkItem`: same-file guard, overwrite policy, then either
//! a link copy or a streamed copy followed by metadata finalization. On a
//! move the source is removed once the destination is complete.

use std::fs;

use crate::confirm::ConfirmOverwrite;
use crate::error::{FinalizeWarning, TransferError};
use crate::fs_ops;
use crate::model::{FileReport, FileStatus, OverwritePolicy, TransferOptions, WorkItem};

/// Transfer a single item.
///
/// `on_progress` receives chunk lengths while streaming and `0` at the end
/// of the file (or once for a symbolic link).
///
/// # Returns
/// A FileReport with status `Done` or `Skipped`. When
/// `options.ignore_errors` is set, failures are returned as
/// `FileStatus::Failed` too.
///
/// # Errors
/// Returns the TransferError when `options.ignore_errors` is not set.
pub fn transfer(
    item: &WorkItem,
    options: &TransferOptions,
    confirm: &mut dyn ConfirmOverwrite,
    on_progress: &mut dyn FnMut(u64),
) -> Result<FileReport, TransferError> {
    match transfer_file(item, options, confirm, on_progress) {
        Ok(report) => Ok(report),
        Err(e) if options.ignore_errors => {
            // The same-file destination is the source itself, and a move
            // must not lose the partially written destination.
            if !options.is_move() && !e.is_same_file() {
                fs_ops::remove_quietly(&item.destination);
            }
            tracing::debug!("tolerating failure of {}: {}", item.source.display(), e);
            Ok(FileReport::new(FileStatus::Failed(e)))
        }
        Err(e) => Err(e),
    }
}

fn transfer_file(
    item: &WorkItem,
    options: &TransferOptions,
    confirm: &mut dyn ConfirmOverwrite,
    on_progress: &mut dyn FnMut(u64),
) -> Result<FileReport, TransferError> {
    let src = &item.source;
    let dst = &item.destination;

    if fs_ops::is_same_file(src, dst) {
        return Err(TransferError::SameFile {
            source_path: src.clone(),
            destination: dst.clone(),
        });
    }

    if fs_ops::entry_exists(dst) && should_skip(dst, options.overwrite_policy, confirm) {
        return Ok(FileReport::new(FileStatus::Skipped));
    }

    let mut report = FileReport::new(FileStatus::Done);

    if item.is_symlink {
        fs_ops::copy_symlink(src, dst).map_err(|e| TransferError::Link {
            source_path: src.clone(),
            destination: dst.clone(),
            cause: e,
        })?;
        on_progress(0);
    } else {
        // Read before streaming: on relatime mounts the copy bumps atime.
        let src_metadata = fs::metadata(src);
        report.bytes_transferred = copy_contents(item, on_progress)?;

        let finalized = src_metadata
            .and_then(|metadata| fs_ops::finalize_metadata(&metadata, dst, options.preserve));
        if let Err(e) = finalized {
            let warning = FinalizeWarning::Metadata {
                path: dst.clone(),
                source: e,
            };
            tracing::warn!("{}", warning);
            report.warnings.push(warning);
        }
    }

    if options.is_move() {
        tracing::debug!("removing {}", src.display());
        if let Err(e) = fs::remove_file(src) {
            let warning = FinalizeWarning::RemoveSource {
                path: src.clone(),
                source: e,
            };
            tracing::warn!("{}", warning);
            report.warnings.push(warning);
        }
    }

    Ok(report)
}

/// Stream the item's bytes. Both handles are closed before returning.
fn copy_contents(item: &WorkItem, on_progress: &mut dyn FnMut(u64)) -> Result<u64, TransferError> {
    let (mut src_file, mut dst_file) = fs_ops::open_for_transfer(&item.source, &item.destination)?;
    let result = fs_ops::stream_copy(&mut src_file, &mut dst_file, on_progress);
    drop(src_file);
    drop(dst_file);

    result.map_err(|e| TransferError::Stream {
        source_path: item.source.clone(),
        destination: item.destination.clone(),
        cause: e,
    })
}

/// Apply the overwrite policy to an existing destination.
fn should_skip(
    destination: &std::path::Path,
    policy: OverwritePolicy,
    confirm: &mut dyn ConfirmOverwrite,
) -> bool {
    match policy {
        OverwritePolicy::Skip => {
            tracing::warn!("skipping {}", destination.display());
            true
        }
        OverwritePolicy::Overwrite => false,
        OverwritePolicy::Ask => !confirm.confirm_overwrite(destination),
    }
}
