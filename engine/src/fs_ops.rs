//! Filesystem operations module.
//!
//! This module provides the low-level operations a single file transfer is
//! built from:
//! - Same-file detection
//! - Recreating symbolic links
//! - Opening and streaming file contents in chunks
//! - Applying permissions, timestamps and ownership to the destination

use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Component, Path, PathBuf};

use crate::error::TransferError;

/// Size of the buffer used when streaming file contents.
pub const CHUNK_SIZE: usize = 100 * 1024;

/// True if anything (including a dangling symbolic link) exists at `path`.
pub fn entry_exists(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

/// Check whether `src` and `dst` refer to the same filesystem object.
///
/// Uses device and inode numbers where the platform has them, and falls back
/// to comparing normalized absolute paths otherwise. A destination that does
/// not exist is never the same file.
pub fn is_same_file(src: &Path, dst: &Path) -> bool {
    match (fs::metadata(src), fs::metadata(dst)) {
        (_, Err(e)) if e.kind() == io::ErrorKind::NotFound => false,
        (Ok(src_meta), Ok(dst_meta)) => match file_identity(&src_meta, &dst_meta) {
            Some(same) => same,
            None => normalize_path(src) == normalize_path(dst),
        },
        _ => normalize_path(src) == normalize_path(dst),
    }
}

#[cfg(unix)]
fn file_identity(a: &fs::Metadata, b: &fs::Metadata) -> Option<bool> {
    use std::os::unix::fs::MetadataExt;
    Some(a.dev() == b.dev() && a.ino() == b.ino())
}

#[cfg(not(unix))]
fn file_identity(_a: &fs::Metadata, _b: &fs::Metadata) -> Option<bool> {
    None
}

/// Make `path` absolute and lexically resolve `.` and `..` components.
///
/// On case-insensitive platforms the result is also lowercased.
pub fn normalize_path(path: &Path) -> PathBuf {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    let mut normalized = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }

    if cfg!(windows) {
        PathBuf::from(normalized.to_string_lossy().to_lowercase())
    } else {
        normalized
    }
}

/// Recreate the symbolic link `src` at `dst`, replacing whatever is there.
pub fn copy_symlink(src: &Path, dst: &Path) -> io::Result<()> {
    let target = fs::read_link(src)?;
    if entry_exists(dst) {
        fs::remove_file(dst)?;
    }
    create_symlink(src, &target, dst)
}

#[cfg(unix)]
fn create_symlink(_src: &Path, target: &Path, dst: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, dst)
}

#[cfg(windows)]
fn create_symlink(src: &Path, target: &Path, dst: &Path) -> io::Result<()> {
    if fs::metadata(src).map(|m| m.is_dir()).unwrap_or(false) {
        std::os::windows::fs::symlink_dir(target, dst)
    } else {
        std::os::windows::fs::symlink_file(target, dst)
    }
}

#[cfg(not(any(unix, windows)))]
fn create_symlink(_src: &Path, _target: &Path, _dst: &Path) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "symbolic links are not supported on this platform",
    ))
}

/// Open `src` for reading and `dst` for writing (created or truncated).
///
/// Each failure names the path that could not be opened.
pub fn open_for_transfer(src: &Path, dst: &Path) -> Result<(File, File), TransferError> {
    let src_file = File::open(src).map_err(|e| TransferError::OpenRead {
        path: src.to_path_buf(),
        source: e,
    })?;
    let dst_file = File::create(dst).map_err(|e| TransferError::OpenWrite {
        path: dst.to_path_buf(),
        source: e,
    })?;
    Ok((src_file, dst_file))
}

/// Stream `reader` into `writer` in `CHUNK_SIZE` chunks.
///
/// `on_progress` receives each chunk's length before the chunk is written,
/// and a final `0` once the end of input is reached. Returns the number of
/// bytes written.
pub fn stream_copy<R: Read, W: Write>(
    reader: &mut R,
    writer: &mut W,
    on_progress: &mut dyn FnMut(u64),
) -> io::Result<u64> {
    let mut buffer = vec![0u8; CHUNK_SIZE];
    let mut transferred = 0u64;
    loop {
        let read = match reader.read(&mut buffer) {
            Ok(0) => {
                on_progress(0);
                break;
            }
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        on_progress(read as u64);
        writer.write_all(&buffer[..read])?;
        transferred += read as u64;
    }
    writer.flush()?;
    Ok(transferred)
}

/// Apply the source's metadata to the destination.
///
/// `src_metadata` must be read before the source's content is, or the
/// read itself may have moved its access time. Permission bits are always
/// copied. With `preserve`, access and modification times are copied too,
/// and owner/group are set on a best-effort basis (failure to chown is
/// ignored).
pub fn finalize_metadata(src_metadata: &fs::Metadata, dst: &Path, preserve: bool) -> io::Result<()> {
    fs::set_permissions(dst, src_metadata.permissions())?;

    if !preserve {
        return Ok(());
    }

    let atime = filetime::FileTime::from_last_access_time(src_metadata);
    let mtime = filetime::FileTime::from_last_modification_time(src_metadata);
    filetime::set_file_times(dst, atime, mtime)?;

    copy_ownership(src_metadata, dst);
    Ok(())
}

#[cfg(unix)]
fn copy_ownership(src_metadata: &fs::Metadata, dst: &Path) {
    use std::os::unix::fs::MetadataExt;
    // Usually fails when not running privileged.
    if let Err(e) = std::os::unix::fs::chown(dst, Some(src_metadata.uid()), Some(src_metadata.gid())) {
        tracing::debug!("could not set owner of {}: {}", dst.display(), e);
    }
}

#[cfg(not(unix))]
fn copy_ownership(_src_metadata: &fs::Metadata, _dst: &Path) {}

/// Remove a file or link, ignoring any error.
pub fn remove_quietly(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        tracing::debug!("could not remove {}: {}", path.display(), e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_copy_reports_chunks_then_zero() {
        let data = vec![7u8; CHUNK_SIZE * 2 + 10];
        let mut reader = io::Cursor::new(data.clone());
        let mut writer = Vec::new();
        let mut calls = Vec::new();

        let written = stream_copy(&mut reader, &mut writer, &mut |n| calls.push(n))
            .expect("Failed to stream");

        assert_eq!(written, data.len() as u64);
        assert_eq!(writer, data);
        assert_eq!(calls.last(), Some(&0));
        assert_eq!(calls.iter().sum::<u64>(), data.len() as u64);
        assert!(calls.iter().all(|&n| n as usize <= CHUNK_SIZE));
    }

    #[test]
    fn test_stream_copy_empty_input() {
        let mut reader = io::Cursor::new(Vec::<u8>::new());
        let mut writer = Vec::new();
        let mut calls = Vec::new();

        let written = stream_copy(&mut reader, &mut writer, &mut |n| calls.push(n))
            .expect("Failed to stream");

        assert_eq!(written, 0);
        assert_eq!(calls, vec![0]);
    }

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "disk full"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_stream_copy_propagates_write_failure() {
        let mut reader = io::Cursor::new(b"some data".to_vec());
        let result = stream_copy(&mut reader, &mut FailingWriter, &mut |_| {});
        let err = result.expect_err("write failure should propagate");
        assert_eq!(err.to_string(), "disk full");
    }

    #[test]
    fn test_is_same_file_same_path_and_missing_dest() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let file = temp_dir.path().join("file.txt");
        fs::write(&file, b"data").expect("Failed to write file");

        assert!(is_same_file(&file, &file));
        assert!(is_same_file(&file, &temp_dir.path().join(".").join("file.txt")));
        assert!(!is_same_file(&file, &temp_dir.path().join("other.txt")));
    }

    #[test]
    fn test_is_same_file_distinct_files() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let a = temp_dir.path().join("a");
        let b = temp_dir.path().join("b");
        fs::write(&a, b"same").expect("Failed to write a");
        fs::write(&b, b"same").expect("Failed to write b");

        assert!(!is_same_file(&a, &b));
    }

    #[cfg(unix)]
    #[test]
    fn test_is_same_file_hardlink() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let a = temp_dir.path().join("a");
        let b = temp_dir.path().join("b");
        fs::write(&a, b"data").expect("Failed to write a");
        fs::hard_link(&a, &b).expect("Failed to create hardlink");

        assert!(is_same_file(&a, &b));
    }

    #[test]
    fn test_normalize_path_resolves_dots() {
        let normalized = normalize_path(Path::new("/tmp/a/./b/../c"));
        if cfg!(unix) {
            assert_eq!(normalized, PathBuf::from("/tmp/a/c"));
        }
        assert!(normalized.is_absolute());
    }

    #[cfg(unix)]
    #[test]
    fn test_copy_symlink_replaces_existing_entry() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let link = temp_dir.path().join("link");
        let dst = temp_dir.path().join("dst");
        std::os::unix::fs::symlink("target.txt", &link).expect("Failed to create link");
        fs::write(&dst, b"old").expect("Failed to write dst");

        copy_symlink(&link, &dst).expect("Failed to copy link");

        let target = fs::read_link(&dst).expect("dst should be a link");
        assert_eq!(target, PathBuf::from("target.txt"));
    }

    #[test]
    fn test_open_for_transfer_names_missing_source() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let src = temp_dir.path().join("missing");
        let dst = temp_dir.path().join("dst");

        match open_for_transfer(&src, &dst) {
            Err(TransferError::OpenRead { path, .. }) => assert_eq!(path, src),
            other => panic!("expected OpenRead, got {:?}", other),
        }
        assert!(!dst.exists(), "destination must not be created when source fails");
    }

    #[test]
    fn test_open_for_transfer_names_unwritable_destination() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let src = temp_dir.path().join("src");
        fs::write(&src, b"data").expect("Failed to write src");
        let dst = temp_dir.path().join("dst");
        fs::create_dir(&dst).expect("Failed to create dst dir");

        match open_for_transfer(&src, &dst) {
            Err(TransferError::OpenWrite { path, .. }) => assert_eq!(path, dst),
            other => panic!("expected OpenWrite, got {:?}", other),
        }
    }

    #[test]
    fn test_finalize_metadata_preserves_times() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let src = temp_dir.path().join("src");
        let dst = temp_dir.path().join("dst");
        fs::write(&src, b"data").expect("Failed to write src");
        fs::write(&dst, b"data").expect("Failed to write dst");

        let old = filetime::FileTime::from_unix_time(1_000_000_000, 0);
        filetime::set_file_times(&src, old, old).expect("Failed to set times");

        let src_meta = fs::metadata(&src).expect("Failed to stat src");
        finalize_metadata(&src_meta, &dst, true).expect("Failed to finalize");

        let dst_meta = fs::metadata(&dst).expect("Failed to stat dst");
        assert_eq!(filetime::FileTime::from_last_modification_time(&dst_meta), old);
        assert_eq!(filetime::FileTime::from_last_access_time(&dst_meta), old);
    }

    #[cfg(unix)]
    #[test]
    fn test_finalize_metadata_copies_mode_without_preserve() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let src = temp_dir.path().join("src");
        let dst = temp_dir.path().join("dst");
        fs::write(&src, b"data").expect("Failed to write src");
        fs::write(&dst, b"data").expect("Failed to write dst");
        fs::set_permissions(&src, fs::Permissions::from_mode(0o640)).expect("Failed to chmod");

        let old = filetime::FileTime::from_unix_time(1_000_000_000, 0);
        filetime::set_file_mtime(&src, old).expect("Failed to set mtime");

        let src_meta = fs::metadata(&src).expect("Failed to stat src");
        finalize_metadata(&src_meta, &dst, false).expect("Failed to finalize");

        let dst_meta = fs::metadata(&dst).expect("Failed to stat dst");
        assert_eq!(dst_meta.permissions().mode() & 0o777, 0o640);
        assert_ne!(filetime::FileTime::from_last_modification_time(&dst_meta), old);
    }
}
