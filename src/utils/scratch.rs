//! Scoped scratch directory.
//!
//! Intermediate editor exports, generated scripts and converter blobs live
//! here. The guard clears the directory on drop, so every exit path of the
//! pipeline, including early fatal aborts, leaves no scratch files behind.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Guard over the pipeline's scratch directory.
pub struct ScratchDir {
    path: PathBuf,
}

impl ScratchDir {
    /// Create (or empty) the scratch directory at `path`.
    pub fn acquire(path: &Path) -> Result<Self> {
        if path.exists() {
            clear_dir(path);
        }
        fs::create_dir_all(path)
            .with_context(|| format!("Failed to create scratch dir {}", path.display()))?;
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    /// The scratch directory path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A file path inside the scratch directory.
    pub fn file(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        clear_dir(&self.path);
    }
}

/// Best-effort removal of a directory's contents.
fn clear_dir(path: &Path) {
    let Ok(entries) = fs::read_dir(path) else {
        return;
    };
    for entry in entries.flatten() {
        let p = entry.path();
        let _ = if p.is_dir() {
            fs::remove_dir_all(&p)
        } else {
            fs::remove_file(&p)
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_scratch_cleared_on_drop() {
        let dir = TempDir::new().unwrap();
        let scratch_path = dir.path().join("temp");

        {
            let scratch = ScratchDir::acquire(&scratch_path).unwrap();
            fs::write(scratch.file("a.svg"), "x").unwrap();
            fs::write(scratch.file("gen.py"), "y").unwrap();
            assert!(scratch_path.join("a.svg").exists());
        }

        // Directory still exists but is empty
        assert!(scratch_path.exists());
        assert_eq!(fs::read_dir(&scratch_path).unwrap().count(), 0);
    }

    #[test]
    fn test_acquire_clears_leftovers() {
        let dir = TempDir::new().unwrap();
        let scratch_path = dir.path().join("temp");
        fs::create_dir_all(&scratch_path).unwrap();
        fs::write(scratch_path.join("stale.bin"), "z").unwrap();

        let _scratch = ScratchDir::acquire(&scratch_path).unwrap();
        assert!(!scratch_path.join("stale.bin").exists());
    }

    #[test]
    fn test_cleared_on_unwind() {
        let dir = TempDir::new().unwrap();
        let scratch_path = dir.path().join("temp");

        let result = std::panic::catch_unwind(|| {
            let scratch = ScratchDir::acquire(&scratch_path).unwrap();
            fs::write(scratch.file("partial.ttf"), "x").unwrap();
            panic!("stage failure");
        });
        assert!(result.is_err());
        assert_eq!(fs::read_dir(&scratch_path).unwrap().count(), 0);
    }
}
