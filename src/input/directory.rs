use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::debug;
use walkdir::WalkDir;

use super::{is_sheet_image, LoadedSheet, SheetLoader};

/// Loads every sheet image below a directory, sorted by path.
pub struct DirectoryLoader {
    root: PathBuf,
}

impl DirectoryLoader {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    fn sheet_paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = WalkDir::new(&self.root)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|p| is_sheet_image(p))
            .collect();
        paths.sort();
        paths
    }
}

#[async_trait]
impl SheetLoader for DirectoryLoader {
    fn name(&self) -> String {
        format!("{}/", self.root.display())
    }

    async fn load(&self) -> Result<Vec<LoadedSheet>> {
        let root = self.root.clone();
        let loader = DirectoryLoader::new(root);
        let paths = tokio::task::spawn_blocking(move || loader.sheet_paths())
            .await
            .context("Directory walk failed")?;

        debug!(root = %self.root.display(), sheets = paths.len(), "collected sheet images");

        let mut sheets = Vec::with_capacity(paths.len());
        for path in paths {
            let bytes = tokio::fs::read(&path)
                .await
                .with_context(|| format!("Failed to read sheet {}", path.display()))?;
            sheets.push(LoadedSheet { path, bytes });
        }
        Ok(sheets)
    }
}
