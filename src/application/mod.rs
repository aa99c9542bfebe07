//! Application layer: document accessor, collaborators and use cases
//!
//! This layer orchestrates domain logic and depends on I/O boundary traits.

pub mod document;
pub mod error;
pub mod error_ext;
pub mod formatting;
pub mod outline;
pub mod revision;
pub mod services;

pub use document::Document;
pub use error::{ApplicationError, ApplicationResult};
pub use error_ext::ResultExt;
pub use formatting::{FormattingApplier, RunFormatter};
pub use outline::OutlineConvert;
pub use revision::{RevisionIds, RevisionMarkerBuilder, TrackedChanges};
