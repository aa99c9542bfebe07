//! I/O boundary traits for testability
//!
//! These traits abstract package access, markup parsing and time, allowing
//! the document model to be tested with in-memory implementations.

use std::path::Path;

use chrono::{DateTime, Utc};

use crate::domain::MarkupTree;
use crate::infrastructure::package::DocxPackage;
use crate::infrastructure::InfraResult;

/// Access to the compressed container holding the document parts.
pub trait PackageStore: Send + Sync {
    /// Read every part of the package at `path` into memory.
    fn load(&self, path: &Path) -> InfraResult<DocxPackage>;

    /// Write all parts of `package` to `path`.
    fn save(&self, package: &DocxPackage, path: &Path) -> InfraResult<()>;
}

/// Conversion between raw part bytes and the markup tree.
pub trait MarkupCodec: Send + Sync {
    fn decode(&self, bytes: &[u8]) -> InfraResult<MarkupTree>;

    fn encode(&self, tree: &MarkupTree) -> InfraResult<Vec<u8>>;
}

/// Source of timestamps for revision marks.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

// ============================================================
// REAL IMPLEMENTATIONS
// ============================================================

/// Wall clock.
#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
