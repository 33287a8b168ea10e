//! # fcp engine - recursive copy/move library
//!
//! A headless engine for copying and moving files and directory trees,
//! in the spirit of `cp -r` and `mv`. Designed as the foundation for
//! command-line and other front ends.
//!
//! ## Overview
//!
//! A run has two phases:
//! - **Planning** walks the sources, creates destination directories and
//!   produces a flat, ordered list of work items.
//! - **Execution** transfers the items one by one with an overwrite policy,
//!   optional tolerance of per-file failures, progress reporting through a
//!   `ProgressSink`, and removal of emptied source directories after a move.
//!
//! ## Basic Usage
//!
//! ```no_run
//! use engine::{execute, plan, FixedAnswer, NoProgress, TransferOptions};
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let plan = plan(&["notes.txt", "photos"], Path::new("/backup"), false)?;
//! println!("Will copy {} files ({} bytes)", plan.len(), plan.total_size);
//!
//! let outcome = execute(plan, &TransferOptions::default(), &mut FixedAnswer(false), &NoProgress)?;
//! for (source, error) in &outcome.errors {
//!     println!("{}: {}", source.display(), error);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - **model**: Core data structures (WorkItem, TransferPlan, options, outcome)
//! - **error**: Error types
//! - **plan**: Source walking and destination resolution
//! - **fs_ops**: Low-level filesystem operations
//! - **file_transfer**: Transfer of a single work item
//! - **job**: Orchestration of a whole run
//! - **progress**: Progress sink trait and the null sink
//! - **confirm**: Overwrite confirmation

pub mod confirm;
pub mod error;
pub mod file_transfer;
pub mod fs_ops;
pub mod job;
pub mod model;
pub mod plan;
pub mod progress;

// Re-export main types and functions
pub use confirm::{ConfirmOverwrite, FixedAnswer, StdinConfirm};
pub use error::{EngineError, FinalizeWarning, PlanError, TransferError};
pub use file_transfer::transfer;
pub use job::{execute, run};
pub use model::{
    FileReport, FileStatus, Mode, OverwritePolicy, TransferOptions, TransferOutcome, TransferPlan,
    WorkItem,
};
pub use plan::plan;
pub use progress::{NoProgress, ProgressSink};
