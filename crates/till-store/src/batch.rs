//! # Write Batch
//!
//! All-or-nothing replacement of several store files.
//!
//! ## Commit Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    WriteBatch::commit                                   │
//! │                                                                         │
//! │  Phase 1: write every new file beside its target                       │
//! │     products.json ← .products.json.tmp                                 │
//! │     sales.json    ← .sales.json.tmp                                    │
//! │     (any failure: delete temps, targets never touched)                 │
//! │                                                                         │
//! │  Phase 2: for each target in order                                     │
//! │     remember current bytes (or "absent")                               │
//! │     rename temp over target                                            │
//! │     (any failure: put back every target already replaced,             │
//! │      newest first, delete the rest of the temps)                       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Temp files live in the same directory as their target so the rename
//! never crosses a filesystem. A process crash between two renames is not
//! covered; single-terminal operation makes that window a few syscalls wide.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, error, warn};

use crate::error::{StoreError, StoreResult};

#[derive(Debug, Clone)]
struct Staged {
    target: PathBuf,
    contents: Vec<u8>,
}

/// A set of file replacements applied together.
///
/// ## Example
/// ```rust,ignore
/// let mut batch = WriteBatch::new();
/// batch.stage(products_path, products_bytes);
/// batch.stage(sales_path, sales_bytes);
/// batch.commit()?; // both files replaced, or neither
/// ```
#[derive(Debug, Clone, Default)]
pub struct WriteBatch {
    staged: Vec<Staged>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `contents` to replace `target`. Nothing is written yet.
    pub fn stage(&mut self, target: impl Into<PathBuf>, contents: Vec<u8>) -> &mut Self {
        self.staged.push(Staged {
            target: target.into(),
            contents,
        });
        self
    }

    /// Replaces every staged target, or none of them.
    pub fn commit(self) -> StoreResult<()> {
        debug!(files = self.staged.len(), "Committing write batch");

        let mut temps: Vec<PathBuf> = Vec::with_capacity(self.staged.len());
        for staged in &self.staged {
            let temp = temp_path(&staged.target);
            if let Err(err) = write_synced(&temp, &staged.contents) {
                warn!(path = %temp.display(), error = %err, "Temp write failed, abandoning batch");
                temps.push(temp);
                discard(&temps);
                return Err(StoreError::io(&staged.target, err));
            }
            temps.push(temp);
        }

        let mut replaced: Vec<(&Path, Option<Vec<u8>>)> = Vec::with_capacity(self.staged.len());
        for (staged, temp) in self.staged.iter().zip(&temps) {
            let step = snapshot(&staged.target).and_then(|prior| {
                fs::rename(temp, &staged.target)?;
                Ok(prior)
            });

            match step {
                Ok(prior) => replaced.push((staged.target.as_path(), prior)),
                Err(err) => {
                    warn!(
                        path = %staged.target.display(),
                        error = %err,
                        replaced = replaced.len(),
                        "Replace failed, rolling back batch"
                    );
                    discard(&temps);
                    rollback(&replaced)?;
                    return Err(StoreError::io(&staged.target, err));
                }
            }
        }

        Ok(())
    }
}

/// `dir/name` → `dir/.name.tmp`
fn temp_path(target: &Path) -> PathBuf {
    let name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    target.with_file_name(format!(".{}.tmp", name))
}

fn write_synced(path: &Path, contents: &[u8]) -> io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(contents)?;
    file.sync_all()
}

/// Current bytes of `path`, or `None` if it does not exist.
fn snapshot(path: &Path) -> io::Result<Option<Vec<u8>>> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err),
    }
}

/// Best-effort removal of leftover temp files.
fn discard(temps: &[PathBuf]) {
    for temp in temps {
        match fs::remove_file(temp) {
            Ok(()) => {}
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => warn!(path = %temp.display(), error = %err, "Could not remove temp file"),
        }
    }
}

/// Puts replaced targets back, newest first. Reports the first failure.
fn rollback(replaced: &[(&Path, Option<Vec<u8>>)]) -> StoreResult<()> {
    let mut first_failure = None;

    for (path, prior) in replaced.iter().rev() {
        let restored = match prior {
            Some(bytes) => write_synced(path, bytes),
            None => fs::remove_file(path),
        };
        if let Err(err) = restored {
            error!(path = %path.display(), error = %err, "Rollback failed");
            first_failure.get_or_insert(StoreError::RollbackFailed {
                path: path.to_path_buf(),
                reason: err.to_string(),
            });
        }
    }

    match first_failure {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_commit_replaces_all_targets() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a.json");
        let b = dir.path().join("b.json");
        fs::write(&a, b"old a").unwrap();

        let mut batch = WriteBatch::new();
        batch.stage(&a, b"new a".to_vec()).stage(&b, b"new b".to_vec());
        batch.commit().unwrap();

        assert_eq!(fs::read(&a).unwrap(), b"new a");
        assert_eq!(fs::read(&b).unwrap(), b"new b");
        assert!(!temp_path(&a).exists());
        assert!(!temp_path(&b).exists());
    }

    #[test]
    fn test_failed_replace_rolls_back_earlier_targets() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a.json");
        let created = dir.path().join("created.json");
        let blocked = dir.path().join("blocked.json");
        fs::write(&a, b"old a").unwrap();
        // A non-empty directory cannot be read or replaced by a file
        fs::create_dir(&blocked).unwrap();
        fs::write(blocked.join("keep"), b"x").unwrap();

        let mut batch = WriteBatch::new();
        batch
            .stage(&a, b"new a".to_vec())
            .stage(&created, b"new file".to_vec())
            .stage(&blocked, b"never".to_vec());
        let err = batch.commit().unwrap_err();

        assert!(matches!(err, StoreError::Io { .. }));
        assert_eq!(fs::read(&a).unwrap(), b"old a");
        assert!(!created.exists());
        assert!(blocked.is_dir());
        for target in [&a, &created, &blocked] {
            assert!(!temp_path(target).exists());
        }
    }

    #[test]
    fn test_failed_temp_write_touches_nothing() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a.json");
        let missing_dir = dir.path().join("nope").join("b.json");
        fs::write(&a, b"old a").unwrap();

        let mut batch = WriteBatch::new();
        batch.stage(&a, b"new a".to_vec()).stage(&missing_dir, b"new b".to_vec());

        assert!(batch.commit().is_err());
        assert_eq!(fs::read(&a).unwrap(), b"old a");
        assert!(!temp_path(&a).exists());
    }

    #[test]
    fn test_temp_path_is_hidden_sibling() {
        let temp = temp_path(Path::new("/data/sales.json"));
        assert_eq!(temp, PathBuf::from("/data/.sales.json.tmp"));
    }
}
