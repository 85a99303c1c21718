//! Directory operations

use std::path::{Path, PathBuf};

use tokio::fs;

use crate::errors::DeployError;
use crate::filesys::file::File;

/// A directory wrapper with path
#[derive(Debug, Clone)]
pub struct Dir {
    path: PathBuf,
}

impl Dir {
    /// Create a new directory reference
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The process working directory
    pub fn current() -> Result<Self, DeployError> {
        Ok(Self::new(std::env::current_dir()?))
    }

    /// Get the directory path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// List regular files in the directory, sorted by path
    pub async fn list_files(&self) -> Result<Vec<PathBuf>, DeployError> {
        let mut files = Vec::new();
        let mut entries = fs::read_dir(&self.path).await?;

        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_file() {
                files.push(entry.path());
            }
        }

        files.sort();
        Ok(files)
    }

    /// List regular files with exactly the given extension, sorted
    pub async fn files_with_extension(&self, extension: &str) -> Result<Vec<PathBuf>, DeployError> {
        let files = self.list_files().await?;
        Ok(files
            .into_iter()
            .filter(|path| {
                path.extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| ext == extension)
            })
            .collect())
    }

    /// Get a file within this directory
    pub fn file(&self, name: &str) -> File {
        File::new(self.path.join(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_files_with_extension_sorted() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("b.nomad"), "").unwrap();
        std::fs::write(tmp.path().join("a.NOMAD"), "").unwrap();
        std::fs::write(tmp.path().join("c.hcl"), "").unwrap();
        std::fs::create_dir(tmp.path().join("d.nomad")).unwrap();
        std::fs::write(tmp.path().join("e.nomad"), "").unwrap();

        let dir = Dir::new(tmp.path());
        let found = dir.files_with_extension("nomad").await.unwrap();

        assert_eq!(
            found,
            vec![tmp.path().join("b.nomad"), tmp.path().join("e.nomad")]
        );
    }
}
