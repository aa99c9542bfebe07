//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::sync::Arc;

use crate::application::services::DocumentService;
use crate::config::Settings;
use crate::infrastructure::codec::XmlCodec;
use crate::infrastructure::package::ZipPackageStore;
use crate::infrastructure::traits::{Clock, MarkupCodec, PackageStore, SystemClock};

/// Container holding all application services.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Package archive access
    pub store: Arc<dyn PackageStore>,

    /// Part bytes <-> markup tree
    pub codec: Arc<dyn MarkupCodec>,

    /// Revision timestamps
    pub clock: Arc<dyn Clock>,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> Self {
        Self::with_deps(
            settings,
            Arc::new(ZipPackageStore),
            Arc::new(XmlCodec),
            Arc::new(SystemClock),
        )
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(
        settings: Settings,
        store: Arc<dyn PackageStore>,
        codec: Arc<dyn MarkupCodec>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let settings = Arc::new(settings);

        Self {
            settings,
            store,
            codec,
            clock,
        }
    }

    pub fn document_service(&self) -> DocumentService {
        DocumentService::new(
            Arc::clone(&self.store),
            Arc::clone(&self.codec),
            Arc::clone(&self.clock),
            Arc::clone(&self.settings),
        )
    }
}
