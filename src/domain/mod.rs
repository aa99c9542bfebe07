//! Domain layer: markup tree, section model and traversal
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod entities;
pub mod error;
pub mod resolver;
pub mod walker;
pub mod wml;

pub use arena::{Attribute, Element, MarkupTree, NodeData, TreeNode};
pub use entities::*;
pub use error::{DomainError, DomainResult};
pub use resolver::SectionRange;
