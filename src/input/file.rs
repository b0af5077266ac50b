use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::PathBuf;

use super::{LoadedSheet, SheetLoader};

pub struct FileLoader {
    path: PathBuf,
}

impl FileLoader {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl SheetLoader for FileLoader {
    fn name(&self) -> String {
        self.path.display().to_string()
    }

    async fn load(&self) -> Result<Vec<LoadedSheet>> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .with_context(|| format!("Failed to read sheet {}", self.path.display()))?;

        Ok(vec![LoadedSheet {
            path: self.path.clone(),
            bytes,
        }])
    }
}
