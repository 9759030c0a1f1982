//! CLI command implementations

pub mod drag;
pub mod pick;
pub mod session;
pub mod tree;

use anyhow::{Context, Result};
use atelier_editor::EditorConfig;
use std::path::Path;

/// Resolve the editor config: an explicit file, or the layered lookup
pub fn load_config(path: Option<&str>) -> Result<EditorConfig> {
    match path {
        Some(path) => EditorConfig::load_from_file(Path::new(path))
            .with_context(|| format!("Failed to load config: {}", path)),
        None => EditorConfig::load().context("Failed to load editor config"),
    }
}
