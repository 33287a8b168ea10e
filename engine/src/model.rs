//! Core data model for transfers.
//!
//! This module defines the main data structures:
//! - WorkItem / TransferPlan: what the planner produces
//! - TransferOptions, Mode, OverwritePolicy: what controls execution
//! - FileStatus / FileReport: the result of one file
//! - TransferOutcome: the result of a whole run

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::error::{FinalizeWarning, TransferError};

/// A single file (or symbolic link) to transfer.
///
/// The destination's parent directory is created by the planner, so it
/// exists by the time the item is executed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    /// Full source path
    pub source: PathBuf,

    /// Full destination path
    pub destination: PathBuf,

    /// Size in bytes. For a symbolic link this is the link's own size.
    pub size: u64,

    /// True if the source is a symbolic link (copied as a link, never followed)
    pub is_symlink: bool,
}

/// The result of planning: everything a run will do, in order.
#[derive(Debug, Default, Clone)]
pub struct TransferPlan {
    /// Items in discovery order
    pub items: Vec<WorkItem>,

    /// Sum of item sizes, symbolic links excluded
    pub total_size: u64,

    /// Source directories that were recursed into, in post-order.
    ///
    /// Every directory appears after all of its subdirectories, so removing
    /// them front to back never hits a non-empty directory.
    pub dirs_to_remove: Vec<PathBuf>,
}

impl TransferPlan {
    /// Number of work items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// The operation mode for a transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Copy files; source remains unchanged
    #[default]
    Copy,
    /// Move files; sources are deleted after a successful transfer
    Move,
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Copy => write!(f, "Copy"),
            Mode::Move => write!(f, "Move"),
        }
    }
}

/// Policy for handling existing files at the destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverwritePolicy {
    /// Never overwrite; skip existing destinations with a warning
    Skip,
    /// Overwrite existing destinations silently
    #[default]
    Overwrite,
    /// Ask through a `ConfirmOverwrite` for every existing destination
    Ask,
}

impl std::fmt::Display for OverwritePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OverwritePolicy::Skip => write!(f, "Skip"),
            OverwritePolicy::Overwrite => write!(f, "Overwrite"),
            OverwritePolicy::Ask => write!(f, "Ask"),
        }
    }
}

/// Options controlling a run.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransferOptions {
    pub mode: Mode,

    pub overwrite_policy: OverwritePolicy,

    /// Record per-file failures in the outcome instead of aborting the run
    pub ignore_errors: bool,

    /// Include names starting with `.` when recursing into directories
    pub all_files: bool,

    /// Also preserve timestamps and, when permitted, owner and group.
    /// Permission bits are always preserved.
    pub preserve: bool,
}

impl TransferOptions {
    pub fn is_move(&self) -> bool {
        self.mode == Mode::Move
    }
}

/// How a single file transfer ended.
#[derive(Debug)]
pub enum FileStatus {
    /// Content (or link) written to the destination
    Done,
    /// Destination existed and the overwrite policy said no
    Skipped,
    /// Transfer failed and errors are being tolerated
    Failed(TransferError),
}

/// Result of one file transfer: its status plus any non-fatal warnings.
#[derive(Debug)]
pub struct FileReport {
    pub status: FileStatus,
    pub warnings: Vec<FinalizeWarning>,
    /// Bytes streamed for this file (0 for links and skipped files)
    pub bytes_transferred: u64,
}

impl FileReport {
    pub(crate) fn new(status: FileStatus) -> Self {
        FileReport {
            status,
            warnings: Vec::new(),
            bytes_transferred: 0,
        }
    }
}

/// Aggregated result of a run.
#[derive(Debug, Default)]
pub struct TransferOutcome {
    /// Tolerated failures, keyed by source path
    pub errors: BTreeMap<PathBuf, TransferError>,

    /// Destinations left untouched because of the overwrite policy
    pub skipped: Vec<PathBuf>,

    /// Non-fatal warnings raised while finalizing items
    pub warnings: Vec<FinalizeWarning>,

    /// Number of items transferred
    pub files_done: usize,

    /// Bytes streamed across all items
    pub bytes_transferred: u64,
}

impl TransferOutcome {
    /// True if no file failed.
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options_copy_and_overwrite() {
        let options = TransferOptions::default();
        assert_eq!(options.mode, Mode::Copy);
        assert_eq!(options.overwrite_policy, OverwritePolicy::Overwrite);
        assert!(!options.ignore_errors);
        assert!(!options.all_files);
        assert!(!options.preserve);
        assert!(!options.is_move());
    }

    #[test]
    fn test_outcome_success_ignores_skips() {
        let mut outcome = TransferOutcome::default();
        outcome.skipped.push(PathBuf::from("dst/a"));
        assert!(outcome.is_success());

        outcome.errors.insert(
            PathBuf::from("src/a"),
            TransferError::SameFile {
                source_path: PathBuf::from("src/a"),
                destination: PathBuf::from("src/a"),
            },
        );
        assert!(!outcome.is_success());
    }
}
