//! Seeding a store from a TOML records file

use crate::record::Record;
use crate::store::MemoryStore;
use atelier_core::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Root structure of a records TOML file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordsFile {
    #[serde(default)]
    pub records: Vec<Record>,
}

/// Load a store from a TOML records file
pub fn load_records<P: AsRef<Path>>(path: P) -> Result<MemoryStore> {
    let content = fs::read_to_string(path)?;
    load_records_string(&content)
}

/// Load a store from a TOML string
pub fn load_records_string(content: &str) -> Result<MemoryStore> {
    let file: RecordsFile = toml::from_str(content)?;
    let store = MemoryStore::from_records(file.records)?;
    log::debug!("loaded {} top-level records", store.len());
    Ok(store)
}
