//! Error types for the transfer engine.
//!
//! Errors are split by the phase that produces them:
//! - `PlanError`: a source cannot be planned; the run never starts.
//! - `TransferError`: one file could not be transferred. Whether it aborts the
//!   run or is recorded in the outcome depends on `TransferOptions::ignore_errors`.
//! - `FinalizeWarning`: content was transferred but a follow-up step failed.
//!   Never fails the item.
//! - `EngineError`: anything that aborts a whole run.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while building a transfer plan.
#[derive(Debug, Error)]
pub enum PlanError {
    /// Source path does not exist
    #[error("No such file or directory: {}", .path.display())]
    NotFound { path: PathBuf },

    /// Source is neither a regular file, a directory nor a symbolic link
    #[error("Unsupported file type: {}", .path.display())]
    UnsupportedType { path: PathBuf },

    /// Source has no final component to append to the destination
    #[error("Cannot determine file name of {}", .path.display())]
    NoFileName { path: PathBuf },

    /// A directory source would be copied onto something that is not a directory
    #[error("Destination exists and is not a directory: {}", .path.display())]
    DestinationNotDirectory { path: PathBuf },

    /// Failed to create a destination directory
    #[error("Failed to create directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to list a source directory
    #[error("Failed to read directory {}: {source}", .path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to query a source's metadata
    #[error("Failed to read metadata of {}: {source}", .path.display())]
    Metadata {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Errors raised while transferring a single file.
#[derive(Debug, Error)]
pub enum TransferError {
    /// Source and destination are the same filesystem object
    #[error("{} and {} are the same file!", .source_path.display(), .destination.display())]
    SameFile {
        source_path: PathBuf,
        destination: PathBuf,
    },

    /// Source could not be opened
    #[error("Could not open {} for reading: {source}", .path.display())]
    OpenRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Destination could not be opened
    #[error("Could not open {} for writing: {source}", .path.display())]
    OpenWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Read or write failed after both files were opened
    #[error(
        "Problem when transferring {} to {}: {cause}",
        .source_path.display(),
        .destination.display()
    )]
    Stream {
        source_path: PathBuf,
        destination: PathBuf,
        #[source]
        cause: io::Error,
    },

    /// Symbolic link could not be read or recreated
    #[error(
        "Could not copy link {} to {}: {cause}",
        .source_path.display(),
        .destination.display()
    )]
    Link {
        source_path: PathBuf,
        destination: PathBuf,
        #[source]
        cause: io::Error,
    },
}

impl TransferError {
    /// Extract the OS error code from this error, if available.
    pub fn raw_os_error(&self) -> Option<i32> {
        match self {
            Self::SameFile { .. } => None,
            Self::OpenRead { source, .. } | Self::OpenWrite { source, .. } => source.raw_os_error(),
            Self::Stream { cause, .. } | Self::Link { cause, .. } => cause.raw_os_error(),
        }
    }

    /// True for the failure where source and destination are one file.
    pub fn is_same_file(&self) -> bool {
        matches!(self, Self::SameFile { .. })
    }
}

/// Non-fatal problems reported after a file's content has been committed.
#[derive(Debug, Error)]
pub enum FinalizeWarning {
    /// Permissions or timestamps could not be applied to the destination
    #[error("failed to finalize transfer of {}: {source}", .path.display())]
    Metadata {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The source of a move could not be removed
    #[error("could not remove {}: {source}", .path.display())]
    RemoveSource {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Errors that abort a whole run.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Plan(#[from] PlanError),

    #[error(transparent)]
    Transfer(#[from] TransferError),

    /// A source directory could not be removed after a move
    #[error("Failed to remove directory {}: {source}", .path.display())]
    RemoveDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_file_message_names_both_paths() {
        let err = TransferError::SameFile {
            source_path: PathBuf::from("a.txt"),
            destination: PathBuf::from("b.txt"),
        };
        assert_eq!(err.to_string(), "a.txt and b.txt are the same file!");
        assert!(err.is_same_file());
        assert_eq!(err.raw_os_error(), None);
    }

    #[test]
    fn test_open_errors_are_distinct_from_stream_errors() {
        let open = TransferError::OpenRead {
            path: PathBuf::from("src"),
            source: io::Error::from_raw_os_error(2),
        };
        let stream = TransferError::Stream {
            source_path: PathBuf::from("src"),
            destination: PathBuf::from("dst"),
            cause: io::Error::from_raw_os_error(5),
        };
        assert!(open.to_string().starts_with("Could not open src for reading"));
        assert!(stream.to_string().starts_with("Problem when transferring src to dst"));
        assert_eq!(open.raw_os_error(), Some(2));
        assert_eq!(stream.raw_os_error(), Some(5));
    }

    #[test]
    fn test_engine_error_is_transparent_over_plan_error() {
        let err: EngineError = PlanError::NotFound {
            path: PathBuf::from("missing"),
        }
        .into();
        assert_eq!(err.to_string(), "No such file or directory: missing");
    }
}
