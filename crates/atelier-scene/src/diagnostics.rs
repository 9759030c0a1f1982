//! Recoverable conditions reported by the editing core

use atelier_core::RecordId;
use std::fmt;

/// Which resource was missing at materialization time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Prototype,
    Geometry,
    Material,
}

impl ResourceKind {
    pub fn label(&self) -> &'static str {
        match self {
            ResourceKind::Prototype => "prototype",
            ResourceKind::Geometry => "geometry",
            ResourceKind::Material => "material",
        }
    }
}

/// A condition that was recovered from locally.
///
/// None of these propagate as errors; they are logged and handed back to
/// callers that want to inspect them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A default was substituted for a missing resource
    MissingResource { id: RecordId, resource: ResourceKind },
    /// The engine refused to take the record id as the node's identity
    IdentityCoercionFailure { id: RecordId },
    /// The selected id no longer resolves to a node in the tree
    StaleSelection { id: RecordId },
    /// The hit node carries no editable tag
    InvalidSelectionTarget,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::MissingResource { id, resource } => {
                write!(f, "missing {} for '{}', using default", resource.label(), id)
            }
            Diagnostic::IdentityCoercionFailure { id } => {
                write!(f, "engine kept its own identity for '{}'", id)
            }
            Diagnostic::StaleSelection { id } => {
                write!(f, "selection '{}' is no longer in the scene", id)
            }
            Diagnostic::InvalidSelectionTarget => write!(f, "hit node is not editable"),
        }
    }
}
