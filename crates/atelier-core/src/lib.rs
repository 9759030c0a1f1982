//! Atelier Core - Foundational types for the Atelier scene editor
//!
//! This crate provides the core types that all other Atelier crates depend on:
//! - `RecordId` - Stable, string-valued record identifiers
//! - `Transform`, `Vec3` - Spatial types
//! - `Color` - Solid colors with hex decoding
//! - Error types and Result alias

mod error;
mod id;
mod types;

pub use error::{AtelierError, Result};
pub use id::RecordId;
pub use types::{mat4_mul, Color, Transform, Vec3, TRANSFORM_EPSILON};
