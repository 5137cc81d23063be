use crate::domain::ports::Storage;
use crate::utils::error::Result;
use std::path::{Path, PathBuf};
use tokio::fs;

/// The output directory. Files written here replace existing ones.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub async fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.base_path).await?;
        Ok(())
    }
}

impl Storage for LocalStorage {
    fn path_for(&self, name: &str) -> PathBuf {
        self.base_path.join(name)
    }

    async fn write_file(&self, name: &str, data: &[u8]) -> Result<PathBuf> {
        self.ensure_dir().await?;
        let full_path = self.path_for(name);
        fs::write(&full_path, data).await?;
        Ok(full_path)
    }

    /// Moves `from` to `name` inside the output directory, replacing any
    /// file already there.
    async fn rename_into(&self, from: &Path, name: &str) -> Result<PathBuf> {
        let target = self.path_for(name);
        if from == target {
            return Ok(target);
        }
        if fs::try_exists(&target).await? {
            fs::remove_file(&target).await?;
        }
        fs::rename(from, &target).await?;
        Ok(target)
    }

    async fn remove_file(&self, path: &Path) -> Result<()> {
        fs::remove_file(path).await?;
        Ok(())
    }
}
