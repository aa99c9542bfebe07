//! Document open/save use case
//!
//! Loads a package, decodes its main document part into a [`Document`] wired
//! with configured collaborators, and writes the mutated tree back.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::application::document::Document;
use crate::application::formatting::RunFormatter;
use crate::application::revision::TrackedChanges;
use crate::application::{ApplicationResult, ResultExt};
use crate::config::Settings;
use crate::domain::MarkupTree;
use crate::infrastructure::package::DocxPackage;
use crate::infrastructure::traits::{Clock, MarkupCodec, PackageStore};
use crate::infrastructure::InfraError;

/// A loaded package with its decoded main part.
pub struct OpenDocument {
    /// Every part of the package, untouched until save
    pub package: DocxPackage,
    /// Name of the main document part, e.g. `word/document.xml`
    pub part: String,
    pub document: Document,
}

/// Service for opening and saving `.docx` documents.
pub struct DocumentService {
    store: Arc<dyn PackageStore>,
    codec: Arc<dyn MarkupCodec>,
    clock: Arc<dyn Clock>,
    settings: Arc<Settings>,
}

impl DocumentService {
    /// Create a new document service.
    pub fn new(
        store: Arc<dyn PackageStore>,
        codec: Arc<dyn MarkupCodec>,
        clock: Arc<dyn Clock>,
        settings: Arc<Settings>,
    ) -> Self {
        Self {
            store,
            codec,
            clock,
            settings,
        }
    }

    /// Load the package at `path` and decode its main document part.
    #[instrument(level = "debug", skip(self))]
    pub fn open(&self, path: &Path) -> ApplicationResult<OpenDocument> {
        let package = self
            .store
            .load(path)
            .with_path_context("load package", path)?;
        let part = package.main_document_part();
        debug!("open: main part {}", part);

        let bytes = package
            .part(&part)
            .ok_or_else(|| InfraError::MissingPart(part.clone()))
            .with_path_context("locate main part", path)?;
        let tree = self
            .codec
            .decode(bytes)
            .with_path_context(&format!("decode {part}"), path)?;

        let document = self.wrap(tree)?;
        Ok(OpenDocument {
            package,
            part,
            document,
        })
    }

    /// Wrap a decoded tree with the configured author, clock and defaults.
    pub fn wrap(&self, tree: MarkupTree) -> ApplicationResult<Document> {
        let document = Document::with_collaborators(
            tree,
            Box::new(RunFormatter),
            Box::new(TrackedChanges::new(self.settings.author.clone())),
            Arc::clone(&self.clock),
        )?
        .with_defaults(self.settings.track_changes, self.settings.formatting.clone());
        Ok(document)
    }

    /// Encode the document back into its part and write the package to `path`.
    #[instrument(level = "debug", skip(self, open))]
    pub fn save(&self, open: &mut OpenDocument, path: &Path) -> ApplicationResult<()> {
        let bytes = self
            .codec
            .encode(open.document.tree())
            .with_path_context(&format!("encode {}", open.part), path)?;
        open.package.set_part(&open.part, bytes);
        self.store
            .save(&open.package, path)
            .with_path_context("save package", path)?;
        info!("saved {}", path.display());
        Ok(())
    }
}
