pub mod check;
pub mod publish;
pub mod run;

use anyhow::{Context, Result};
use quality_parser::{Settings, parse_settings};
use quality_store::{BucketStore, LocalObjectStore};
use std::path::Path;

/// Bucket used when no settings file is given.
pub const DEFAULT_BUCKET: &str = "dq-expectations";

/// Loads settings from `config`, or defaults, then applies `--root`.
pub fn load_settings(config: Option<&Path>, root: Option<&Path>) -> Result<Settings> {
    let mut settings = match config {
        Some(path) => parse_settings(path)
            .with_context(|| format!("Failed to load settings: {}", path.display()))?,
        None => Settings::for_bucket(DEFAULT_BUCKET)?,
    };

    if let Some(root) = root {
        settings.root = root.to_path_buf();
    }
    Ok(settings)
}

/// Opens the bucket store described by the settings.
pub fn open_store(settings: &Settings) -> BucketStore<LocalObjectStore> {
    BucketStore::new(
        LocalObjectStore::new(&settings.root),
        settings.storage.clone(),
    )
}
