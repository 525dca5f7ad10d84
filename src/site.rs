//! Output tree writes.
//!
//! Every path handed to [`SiteWriter`] is relative to the output root.

use std::{
    fs, io,
    path::{Path, PathBuf},
};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Debug, Error)]
pub enum WriteError {
    #[error("cannot reset output directory `{0}`")]
    Reset(PathBuf, #[source] io::Error),

    #[error("cannot create directory `{0}`")]
    CreateDir(PathBuf, #[source] io::Error),

    #[error("cannot write `{0}`")]
    Write(PathBuf, #[source] io::Error),

    #[error("cannot remove `{0}`")]
    Remove(PathBuf, #[source] io::Error),
}

pub struct SiteWriter {
    root: PathBuf,
}

impl SiteWriter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Empty the output root, keeping the directory itself.
    pub fn reset(&self) -> Result<(), WriteError> {
        let reset_err = |e| WriteError::Reset(self.root.clone(), e);

        if !self.root.exists() {
            return fs::create_dir_all(&self.root).map_err(reset_err);
        }

        for entry in fs::read_dir(&self.root).map_err(reset_err)? {
            let path = entry.map_err(reset_err)?.path();
            let removed = if path.is_dir() {
                fs::remove_dir_all(&path)
            } else {
                fs::remove_file(&path)
            };
            removed.map_err(|e| WriteError::Reset(path, e))?;
        }
        Ok(())
    }

    pub fn ensure_dir(&self, rel: impl AsRef<Path>) -> Result<(), WriteError> {
        let path = self.root.join(rel);
        fs::create_dir_all(&path).map_err(|e| WriteError::CreateDir(path, e))
    }

    /// Create or overwrite a file. The parent directory must exist.
    pub fn write(&self, rel: impl AsRef<Path>, content: &str) -> Result<(), WriteError> {
        let path = self.root.join(rel);
        fs::write(&path, content).map_err(|e| WriteError::Write(path, e))
    }

    /// Delete a file; a missing one is fine.
    pub fn remove(&self, rel: impl AsRef<Path>) -> Result<(), WriteError> {
        let path = self.root.join(rel);
        match fs::remove_file(&path) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(WriteError::Remove(path, e)),
            _ => Ok(()),
        }
    }

    /// Every `.html` file under the root, relative and sorted.
    pub fn html_files(&self) -> Vec<PathBuf> {
        let mut files: Vec<_> = WalkDir::new(&self.root)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_file())
            .filter(|entry| entry.path().extension().is_some_and(|ext| ext == "html"))
            .filter_map(|entry| entry.path().strip_prefix(&self.root).ok().map(Path::to_path_buf))
            .collect();
        files.sort();
        files
    }
}
