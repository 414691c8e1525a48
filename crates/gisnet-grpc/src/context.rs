//! Scoped simulation context.
//!
//! The engine reads and writes working files while a call is in
//! flight. Each call pins that ambient state to its own scratch
//! directory: acquired before the engine runs, released exactly once
//! when the handle drops, on every exit path including faults and
//! panics. Concurrent calls receive disjoint directories and can
//! never observe each other's working files.

use std::path::{Path, PathBuf};
use tempfile::TempDir;
use thiserror::Error;
use tracing::warn;

/// Context acquisition failure, surfaced before the engine runs.
#[derive(Debug, Error)]
pub enum ResourceError {
    /// The configured simulation root cannot host a scratch directory
    #[error("simulation root `{root}`: {source}")]
    Acquire {
        /// Root path as configured
        root: String,
        /// Underlying filesystem error
        #[source]
        source: std::io::Error,
    },
}

fn acquire_err(root: &Path, source: std::io::Error) -> ResourceError {
    ResourceError::Acquire {
        root: root.display().to_string(),
        source,
    }
}

/// Working directory for a single engine invocation.
#[derive(Debug)]
pub struct SimContext {
    path: PathBuf,
    dir: Option<TempDir>,
}

impl SimContext {
    /// Acquire a fresh scratch directory under `root`.
    ///
    /// The root is created if absent; the scratch directory beneath it
    /// is unique to this call.
    pub fn acquire(root: &Path) -> Result<Self, ResourceError> {
        std::fs::create_dir_all(root).map_err(|e| acquire_err(root, e))?;
        let dir = tempfile::Builder::new()
            .prefix("call-")
            .tempdir_in(root)
            .map_err(|e| acquire_err(root, e))?;
        Ok(Self {
            path: dir.path().to_path_buf(),
            dir: Some(dir),
        })
    }

    /// Scratch directory for this call.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for SimContext {
    fn drop(&mut self) {
        if let Some(dir) = self.dir.take() {
            // Release failures are logged, never raised: they must not
            // mask the in-flight engine outcome.
            if let Err(e) = dir.close() {
                warn!(
                    "failed to release simulation context at {}: {e}",
                    self.path.display()
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::{catch_unwind, AssertUnwindSafe};

    fn entries(root: &Path) -> usize {
        std::fs::read_dir(root).unwrap().count()
    }

    #[test]
    fn test_acquire_and_release() {
        let root = tempfile::tempdir().unwrap();

        let context = SimContext::acquire(root.path()).unwrap();
        assert!(context.path().is_dir());
        assert!(context.path().starts_with(root.path()));
        assert_eq!(entries(root.path()), 1);

        drop(context);
        assert_eq!(entries(root.path()), 0, "release must remove the scratch dir");
    }

    #[test]
    fn test_missing_root_is_created() {
        let base = tempfile::tempdir().unwrap();
        let root = base.path().join("sim").join("runs");

        let context = SimContext::acquire(&root).unwrap();
        assert!(context.path().starts_with(&root));
    }

    #[test]
    fn test_concurrent_contexts_are_disjoint() {
        let root = tempfile::tempdir().unwrap();

        let a = SimContext::acquire(root.path()).unwrap();
        let b = SimContext::acquire(root.path()).unwrap();
        assert_ne!(a.path(), b.path());
        assert_eq!(entries(root.path()), 2);
    }

    #[test]
    fn test_unusable_root_is_resource_error() {
        let base = tempfile::tempdir().unwrap();
        let root = base.path().join("not-a-dir");
        std::fs::write(&root, b"occupied").unwrap();

        let err = SimContext::acquire(&root).unwrap_err();
        assert!(err.to_string().contains("not-a-dir"));
    }

    #[test]
    fn test_release_fires_during_panic_unwind() {
        let root = tempfile::tempdir().unwrap();

        let outcome = catch_unwind(AssertUnwindSafe(|| {
            let _context = SimContext::acquire(root.path()).unwrap();
            panic!("engine exploded");
        }));

        assert!(outcome.is_err());
        assert_eq!(entries(root.path()), 0);
    }
}
