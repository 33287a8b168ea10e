//! Progress reporting trait.
//!
//! This module defines the ProgressSink trait, which decouples the transfer
//! engine from how progress is rendered. The CLI ships a per-file and an
//! aggregate renderer.

use std::path::Path;

/// Receives progress events from a run.
///
/// All methods are called synchronously, in order, from the thread running
/// the transfer. For every item the sequence is one `on_new_file`, any
/// number of `on_file_transfer`, then one `on_file_done`.
pub trait ProgressSink: Send {
    /// Called when a file is about to be transferred.
    fn on_new_file(&self, source: &Path, destination: &Path, size: u64);

    /// Called with the length of each chunk before it is written.
    ///
    /// A value of `0` marks the end of the current file's content.
    fn on_file_transfer(&self, bytes: u64);

    /// Called when a file is done (transferred, skipped, or failed).
    fn on_file_done(&self);
}

/// Ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn on_new_file(&self, _source: &Path, _destination: &Path, _size: u64) {}

    fn on_file_transfer(&self, _bytes: u64) {}

    fn on_file_done(&self) {}
}
