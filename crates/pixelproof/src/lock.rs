//! Per-component advisory locks.
//!
//! A lock is a `.<component>.lock` file created with `create_new`, so two
//! processes cannot both hold it. The file is removed when the guard drops.

use crate::result::{ProofError, ProofResult};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Exclusive lock on one component's review or baseline state
#[derive(Debug)]
pub struct ComponentLock {
    path: PathBuf,
}

impl ComponentLock {
    /// Acquire the lock for `component` inside `dir`.
    ///
    /// Fails with [`ProofError::Locked`] if another holder exists.
    pub fn acquire(dir: &Path, component: &str) -> ProofResult<Self> {
        fs::create_dir_all(dir)?;
        let path = dir.join(format!(".{component}.lock"));
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(mut file) => {
                // pid is informational only
                let _ = writeln!(file, "{}", std::process::id());
                tracing::trace!(path = %path.display(), "acquired component lock");
                Ok(Self { path })
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Err(ProofError::Locked {
                component: component.to_string(),
                path: path.display().to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    /// Lock file path
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ComponentLock {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to release component lock");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_second_acquire_is_locked() {
        let dir = TempDir::new().unwrap();
        let first = ComponentLock::acquire(dir.path(), "inbox").unwrap();
        let err = ComponentLock::acquire(dir.path(), "inbox").unwrap_err();
        assert!(matches!(err, ProofError::Locked { ref component, .. } if component == "inbox"));
        drop(first);
        assert!(ComponentLock::acquire(dir.path(), "inbox").is_ok());
    }

    #[test]
    fn test_locks_are_per_component() {
        let dir = TempDir::new().unwrap();
        let _a = ComponentLock::acquire(dir.path(), "inbox").unwrap();
        let _b = ComponentLock::acquire(dir.path(), "sidebar").unwrap();
    }

    #[test]
    fn test_drop_removes_file() {
        let dir = TempDir::new().unwrap();
        let lock = ComponentLock::acquire(dir.path(), "inbox").unwrap();
        let path = lock.path().to_path_buf();
        assert!(path.exists());
        drop(lock);
        assert!(!path.exists());
    }
}
