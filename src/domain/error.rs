//! Domain-level errors (no I/O concerns)

use generational_arena::Index;
use thiserror::Error;

/// Domain errors represent violations of the markup tree's structure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The tree breaks the boundary-marker placement rules, or a section's
    /// marker is no longer anchored in the tree.
    #[error("structural invariant violated: {reason}")]
    StructuralInvariant { reason: String },

    #[error("node not found in tree: {0:?}")]
    NodeNotFound(Index),

    #[error("node is not a paragraph: {0:?}")]
    NotAParagraph(Index),

    #[error("document has no body element")]
    MissingBody,

    #[error("invalid tree move: {reason}")]
    InvalidMove { reason: String },
}

impl DomainError {
    pub fn structural(reason: impl Into<String>) -> Self {
        Self::StructuralInvariant {
            reason: reason.into(),
        }
    }
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
