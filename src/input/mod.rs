//! Sheet loaders.
//!
//! This module provides the [`SheetLoader`] trait and implementations for
//! collecting scanned sheets from the filesystem.
//!
//! | Loader | Reads |
//! |--------|-------|
//! | [`FileLoader`] | A single image file |
//! | [`DirectoryLoader`] | Every JPG/PNG under a directory, recursively |
//!
//! # Example
//!
//! ```no_run
//! use omrgrade::input::{loaders_for, SheetLoader};
//! use std::path::PathBuf;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     for loader in loaders_for(&[PathBuf::from("scans/")])? {
//!         let sheets = loader.load().await?;
//!         println!("{}: {} sheets", loader.name(), sheets.len());
//!     }
//!     Ok(())
//! }
//! ```

mod directory;
mod file;

pub use directory::DirectoryLoader;
pub use file::FileLoader;

use anyhow::{bail, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// File extensions accepted as sheet images.
pub const SHEET_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// A sheet read from disk, before it is given a student label.
#[derive(Debug, Clone)]
pub struct LoadedSheet {
    pub path: PathBuf,
    pub bytes: Vec<u8>,
}

impl LoadedSheet {
    /// File name used as the sheet's source in reports.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// Trait for collecting sheet images from a location.
#[async_trait]
pub trait SheetLoader: Send + Sync {
    /// Returns a human-readable name for this loader.
    fn name(&self) -> String;

    /// Reads all sheets this loader covers.
    ///
    /// # Errors
    ///
    /// Returns an error if the location cannot be read.
    async fn load(&self) -> Result<Vec<LoadedSheet>>;
}

/// True if `path` has a sheet image extension (case-insensitive).
pub fn is_sheet_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            let e = e.to_lowercase();
            SHEET_EXTENSIONS.contains(&e.as_str())
        })
        .unwrap_or(false)
}

/// Returns a loader per path: directories are walked, anything else is
/// read as a single file.
///
/// # Errors
///
/// Returns an error if a path does not exist.
pub fn loaders_for(paths: &[PathBuf]) -> Result<Vec<Box<dyn SheetLoader>>> {
    let mut loaders: Vec<Box<dyn SheetLoader>> = Vec::with_capacity(paths.len());
    for path in paths {
        if !path.exists() {
            bail!("Sheet path not found: {}", path.display());
        }
        if path.is_dir() {
            loaders.push(Box::new(DirectoryLoader::new(path.clone())));
        } else {
            loaders.push(Box::new(FileLoader::new(path.clone())));
        }
    }
    Ok(loaders)
}

/// Runs every loader in order and concatenates their sheets.
pub async fn load_all(loaders: &[Box<dyn SheetLoader>]) -> Result<Vec<LoadedSheet>> {
    let mut sheets = Vec::new();
    for loader in loaders {
        sheets.extend(loader.load().await?);
    }
    Ok(sheets)
}
