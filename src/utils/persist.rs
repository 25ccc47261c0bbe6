//! Atomic file replacement.
//!
//! Every output is written to a temporary file in the destination directory
//! and renamed over the target only once complete, so readers never observe
//! a partially written file.

use crate::error::{PipelineError, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use uuid::Uuid;

/// A set of outputs that become visible together on `commit`.
///
/// Dropping an uncommitted batch removes its temporary files and leaves the
/// targets untouched.
#[derive(Default)]
pub struct AtomicBatch {
    staged: Vec<(NamedTempFile, PathBuf)>,
}

impl AtomicBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write `bytes` to a temporary file next to `target`
    pub fn stage(&mut self, target: &Path, bytes: &[u8]) -> Result<()> {
        let dir = parent_dir(target);
        fs::create_dir_all(dir)?;

        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(bytes)?;
        tmp.as_file().sync_all()?;

        self.staged.push((tmp, target.to_path_buf()));
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.staged.len()
    }

    pub fn is_empty(&self) -> bool {
        self.staged.is_empty()
    }

    /// Rename every staged file over its target.
    ///
    /// Existing targets are moved aside first. If any rename fails, targets
    /// already replaced are restored from those backups and the error is
    /// returned, so either every target holds the new bytes or none does.
    pub fn commit(self) -> Result<Vec<PathBuf>> {
        let mut replaced: Vec<Replaced> = Vec::with_capacity(self.staged.len());
        for (tmp, target) in self.staged {
            match replace(tmp, &target) {
                Ok(backup) => replaced.push(Replaced { target, backup }),
                Err(err) => {
                    tracing::warn!(path = %target.display(), error = %err, "commit failed, rolling back");
                    rollback(&replaced);
                    return Err(err);
                }
            }
        }

        for entry in &replaced {
            if let Some(backup) = &entry.backup {
                if let Err(e) = fs::remove_file(backup) {
                    tracing::warn!(path = %backup.display(), error = %e, "stale backup left behind");
                }
            }
        }
        Ok(replaced.into_iter().map(|entry| entry.target).collect())
    }
}

/// A target renamed into place, with the file it displaced
struct Replaced {
    target: PathBuf,
    backup: Option<PathBuf>,
}

/// Move `target` aside if present, then rename `tmp` over it
fn replace(tmp: NamedTempFile, target: &Path) -> Result<Option<PathBuf>> {
    if target.is_dir() {
        return Err(PipelineError::PersistError {
            path: target.display().to_string(),
            reason: "target is a directory".to_string(),
        });
    }

    let backup = if target.exists() {
        let backup = backup_path(target);
        fs::rename(target, &backup)?;
        Some(backup)
    } else {
        None
    };

    if let Err(err) = tmp.persist(target) {
        if let Some(backup) = &backup {
            restore(backup, target);
        }
        return Err(err.into());
    }
    tracing::debug!(path = %target.display(), "persisted");
    Ok(backup)
}

/// Undo replacements newest first
fn rollback(replaced: &[Replaced]) {
    for entry in replaced.iter().rev() {
        match &entry.backup {
            Some(backup) => restore(backup, &entry.target),
            None => {
                if let Err(e) = fs::remove_file(&entry.target) {
                    tracing::error!(path = %entry.target.display(), error = %e, "could not remove new file");
                }
            }
        }
    }
}

fn restore(backup: &Path, target: &Path) {
    if let Err(e) = fs::rename(backup, target) {
        tracing::error!(
            path = %target.display(),
            backup = %backup.display(),
            error = %e,
            "could not restore previous file"
        );
    }
}

fn backup_path(target: &Path) -> PathBuf {
    let name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    parent_dir(target).join(format!(".{}.{}.bak", name, Uuid::new_v4().simple()))
}

/// Atomically replace a single file
pub fn write_atomic(target: &Path, bytes: &[u8]) -> Result<PathBuf> {
    let mut batch = AtomicBatch::new();
    batch.stage(target, bytes)?;
    let mut written = batch.commit()?;
    Ok(written.remove(0))
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_atomic_overwrites() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("out.txt");
        fs::write(&target, "old").unwrap();

        write_atomic(&target, b"new").unwrap();
        assert_eq!(fs::read_to_string(&target).unwrap(), "new");
    }

    #[test]
    fn test_write_atomic_creates_parent() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("nested").join("deeper").join("out.txt");

        write_atomic(&target, b"x").unwrap();
        assert!(target.exists());
    }

    #[test]
    fn test_dropped_batch_leaves_targets_untouched() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a.csv");
        let b = dir.path().join("b.csv");
        fs::write(&a, "previous").unwrap();

        {
            let mut batch = AtomicBatch::new();
            batch.stage(&a, b"next").unwrap();
            batch.stage(&b, b"next").unwrap();
            assert_eq!(batch.len(), 2);
        }

        assert_eq!(fs::read_to_string(&a).unwrap(), "previous");
        assert!(!b.exists());
        // Only the pre-existing file remains in the directory
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_commit_writes_all() {
        let dir = TempDir::new().unwrap();
        let mut batch = AtomicBatch::new();
        for name in ["x.csv", "y.csv"] {
            batch.stage(&dir.path().join(name), name.as_bytes()).unwrap();
        }

        let written = batch.commit().unwrap();
        assert_eq!(written.len(), 2);
        assert_eq!(fs::read_to_string(dir.path().join("y.csv")).unwrap(), "y.csv");
    }

    #[test]
    fn test_failed_commit_restores_earlier_targets() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a.csv");
        let b = dir.path().join("b.csv");
        let blocked = dir.path().join("c.csv");
        fs::write(&a, "old a").unwrap();
        fs::write(&b, "old b").unwrap();
        fs::create_dir(&blocked).unwrap();
        fs::write(blocked.join("inside"), "x").unwrap();

        let mut batch = AtomicBatch::new();
        batch.stage(&a, b"new a").unwrap();
        batch.stage(&b, b"new b").unwrap();
        batch.stage(&blocked, b"new c").unwrap();

        assert!(matches!(batch.commit(), Err(PipelineError::PersistError { .. })));
        assert_eq!(fs::read_to_string(&a).unwrap(), "old a");
        assert_eq!(fs::read_to_string(&b).unwrap(), "old b");
        assert!(blocked.is_dir());
        // No temporaries or backups left over
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 3);
    }

    #[test]
    fn test_failed_commit_removes_new_targets() {
        let dir = TempDir::new().unwrap();
        let fresh = dir.path().join("fresh.csv");
        let blocked = dir.path().join("blocked.csv");
        fs::create_dir(&blocked).unwrap();
        fs::write(blocked.join("inside"), "x").unwrap();

        let mut batch = AtomicBatch::new();
        batch.stage(&fresh, b"new").unwrap();
        batch.stage(&blocked, b"new").unwrap();

        assert!(batch.commit().is_err());
        assert!(!fresh.exists());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_commit_leaves_no_backups() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("out.csv");
        fs::write(&target, "old").unwrap();

        let mut batch = AtomicBatch::new();
        batch.stage(&target, b"new").unwrap();
        batch.commit().unwrap();

        assert_eq!(fs::read_to_string(&target).unwrap(), "new");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
