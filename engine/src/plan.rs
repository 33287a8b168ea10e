//! Transfer planning.
//!
//! Walks the sources, resolves every destination path, creates missing
//! destination directories and produces a `TransferPlan`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::PlanError;
use crate::model::{TransferPlan, WorkItem};

/// How a source takes part in the walk.
enum SourceKind {
    File { size: u64 },
    Symlink { size: u64, targets_dir: bool },
    Directory,
}

/// Build a transfer plan for `sources` into `destination`.
///
/// Regular files and symbolic links are planned before directories. When
/// `destination` is an existing directory, each source lands inside it
/// under its own name; otherwise the source is transferred *as*
/// `destination`. Directory destinations are created as they are reached.
///
/// # Errors
/// Returns PlanError if a source is missing or of an unsupported type, or if
/// a destination directory cannot be created.
pub fn plan<P: AsRef<Path>>(
    sources: &[P],
    destination: &Path,
    all_files: bool,
) -> Result<TransferPlan, PlanError> {
    let mut planner = Planner {
        all_files,
        plan: TransferPlan::default(),
    };
    let sources: Vec<PathBuf> = sources.iter().map(|s| s.as_ref().to_path_buf()).collect();
    planner.parse(&sources, destination)?;
    Ok(planner.plan)
}

struct Planner {
    all_files: bool,
    plan: TransferPlan,
}

impl Planner {
    fn parse(&mut self, sources: &[PathBuf], destination: &Path) -> Result<(), PlanError> {
        let mut files = Vec::new();
        let mut directories = Vec::new();

        for source in sources {
            match classify(source)? {
                SourceKind::File { size } => files.push((source, size, false)),
                SourceKind::Symlink { size, targets_dir: false } => files.push((source, size, true)),
                SourceKind::Symlink { size, targets_dir: true } => {
                    directories.push((source, Some(size)))
                }
                SourceKind::Directory => directories.push((source, None)),
            }
        }

        for (source, size, is_symlink) in files {
            self.parse_file(source, destination, size, is_symlink)?;
        }

        for (source, link_size) in directories {
            match link_size {
                Some(size) => self.parse_file(source, destination, size, true)?,
                None => self.parse_dir(source, destination)?,
            }
        }

        Ok(())
    }

    fn parse_file(
        &mut self,
        source: &Path,
        destination: &Path,
        size: u64,
        is_symlink: bool,
    ) -> Result<(), PlanError> {
        let destination = resolve_destination(source, destination)?;
        tracing::debug!("file {} -> {}", source.display(), destination.display());

        if !is_symlink {
            self.plan.total_size += size;
        }
        self.plan.items.push(WorkItem {
            source: source.to_path_buf(),
            destination,
            size,
            is_symlink,
        });
        Ok(())
    }

    fn parse_dir(&mut self, source: &Path, destination: &Path) -> Result<(), PlanError> {
        let destination = resolve_destination(source, destination)?;
        tracing::debug!("dir {} -> {}", source.display(), destination.display());

        ensure_dir_exists(&destination)?;

        let mut names: Vec<_> = fs::read_dir(source)
            .and_then(|entries| {
                entries
                    .map(|entry| entry.map(|e| e.file_name()))
                    .collect::<io::Result<Vec<_>>>()
            })
            .map_err(|e| PlanError::ReadDir {
                path: source.to_path_buf(),
                source: e,
            })?;
        names.sort();
        if !self.all_files {
            names.retain(|name| !name.to_string_lossy().starts_with('.'));
        }

        let children: Vec<PathBuf> = names.iter().map(|name| source.join(name)).collect();
        self.parse(&children, &destination)?;

        self.plan.dirs_to_remove.push(source.to_path_buf());
        Ok(())
    }
}

fn classify(source: &Path) -> Result<SourceKind, PlanError> {
    let metadata = fs::symlink_metadata(source).map_err(|e| {
        if e.kind() == io::ErrorKind::NotFound {
            PlanError::NotFound {
                path: source.to_path_buf(),
            }
        } else {
            PlanError::Metadata {
                path: source.to_path_buf(),
                source: e,
            }
        }
    })?;

    let file_type = metadata.file_type();
    if file_type.is_symlink() {
        // Dangling links have no target and are treated like file links.
        let targets_dir = fs::metadata(source).map(|m| m.is_dir()).unwrap_or(false);
        Ok(SourceKind::Symlink {
            size: metadata.len(),
            targets_dir,
        })
    } else if file_type.is_dir() {
        Ok(SourceKind::Directory)
    } else if file_type.is_file() {
        Ok(SourceKind::File {
            size: metadata.len(),
        })
    } else {
        Err(PlanError::UnsupportedType {
            path: source.to_path_buf(),
        })
    }
}

/// Append the source's name to `destination` if it is an existing directory.
fn resolve_destination(source: &Path, destination: &Path) -> Result<PathBuf, PlanError> {
    if !destination.is_dir() {
        return Ok(destination.to_path_buf());
    }
    let name = match source.file_name() {
        Some(name) => name.to_os_string(),
        None => fs::canonicalize(source)
            .ok()
            .and_then(|p| p.file_name().map(|n| n.to_os_string()))
            .ok_or_else(|| PlanError::NoFileName {
                path: source.to_path_buf(),
            })?,
    };
    Ok(destination.join(name))
}

/// Create `path` as a directory unless it already is one.
fn ensure_dir_exists(path: &Path) -> Result<(), PlanError> {
    match fs::metadata(path) {
        Ok(metadata) if metadata.is_dir() => Ok(()),
        Ok(_) => Err(PlanError::DestinationNotDirectory {
            path: path.to_path_buf(),
        }),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::debug!("making dir {}", path.display());
            fs::create_dir(path).map_err(|e| PlanError::CreateDir {
                path: path.to_path_buf(),
                source: e,
            })
        }
        Err(e) => Err(PlanError::CreateDir {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}
