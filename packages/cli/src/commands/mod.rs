pub mod check;
pub mod render;

pub use check::{check, CheckArgs};
pub use render::{render, RenderArgs};

use anyhow::{anyhow, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Template files below `dir`, sorted by path
pub(crate) fn find_templates(dir: &Path, extension: &str) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|path| path.extension().and_then(|s| s.to_str()) == Some(extension))
        .collect();
    files.sort();
    files
}

/// A single template file, or every template of a directory
pub(crate) fn collect_templates(target: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    if target.is_file() {
        Ok(vec![target.to_path_buf()])
    } else if target.is_dir() {
        Ok(find_templates(target, extension))
    } else {
        Err(anyhow!("Template path does not exist: {}", target.display()))
    }
}
