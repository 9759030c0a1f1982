//! Atelier Sync - scene membership management
//!
//! Keeps the live render tree in step with the record store:
//! - `SceneSync` - owns the id <-> node bindings and runs reconciliation passes
//! - `PassReport` - what a pass attached, updated, or destroyed
//! - `SyncConfig` - first-pass behaviour

mod sync;

pub use sync::{PassReport, SceneSync, SyncConfig};
