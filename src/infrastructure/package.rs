//! Zip package store for `.docx` containers.

use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::{debug, instrument};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::infrastructure::traits::PackageStore;
use crate::infrastructure::{InfraError, InfraResult};

pub const ROOT_RELATIONSHIPS: &str = "_rels/.rels";
pub const DEFAULT_DOCUMENT_PART: &str = "word/document.xml";
const OFFICE_DOCUMENT_RELATIONSHIP: &str = "/officeDocument";

/// One archive entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageEntry {
    pub name: String,
    pub data: Vec<u8>,
}

/// In-memory package: every part, in archive order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocxPackage {
    entries: Vec<PackageEntry>,
}

impl DocxPackage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[PackageEntry] {
        &self.entries
    }

    pub fn part(&self, name: &str) -> Option<&[u8]> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.data.as_slice())
    }

    /// Replace a part's content, or append a new part.
    pub fn set_part(&mut self, name: &str, data: Vec<u8>) {
        match self.entries.iter_mut().find(|e| e.name == name) {
            Some(entry) => entry.data = data,
            None => self.entries.push(PackageEntry {
                name: name.to_string(),
                data,
            }),
        }
    }

    /// Name of the main document part, taken from the package's
    /// `officeDocument` relationship.
    pub fn main_document_part(&self) -> String {
        self.part(ROOT_RELATIONSHIPS)
            .and_then(|bytes| std::str::from_utf8(bytes).ok())
            .and_then(|xml| {
                let rels = roxmltree::Document::parse(xml).ok()?;
                let target = rels
                    .root_element()
                    .children()
                    .filter(|n| n.tag_name().name() == "Relationship")
                    .find(|n| {
                        n.attribute("Type")
                            .is_some_and(|t| t.ends_with(OFFICE_DOCUMENT_RELATIONSHIP))
                    })
                    .and_then(|n| n.attribute("Target"))?;
                Some(target.trim_start_matches('/').to_string())
            })
            .unwrap_or_else(|| DEFAULT_DOCUMENT_PART.to_string())
    }
}

/// Reads and writes `.docx` archives on disk.
#[derive(Debug, Default)]
pub struct ZipPackageStore;

impl PackageStore for ZipPackageStore {
    #[instrument(level = "debug", skip(self))]
    fn load(&self, path: &Path) -> InfraResult<DocxPackage> {
        let file = File::open(path)
            .map_err(|e| InfraError::io(format!("open package {}", path.display()), e))?;
        let mut archive = ZipArchive::new(BufReader::new(file))
            .map_err(|e| InfraError::archive(format!("read archive {}", path.display()), e))?;

        let mut package = DocxPackage::new();
        for i in 0..archive.len() {
            let mut entry = archive
                .by_index(i)
                .map_err(|e| InfraError::archive(format!("read entry {i}"), e))?;
            if entry.is_dir() {
                continue;
            }
            let name = entry.name().to_string();
            let mut data = Vec::with_capacity(entry.size() as usize);
            entry
                .read_to_end(&mut data)
                .map_err(|e| InfraError::io(format!("read part {name}"), e))?;
            package.entries.push(PackageEntry { name, data });
        }
        debug!("load: {} parts from {}", package.entries.len(), path.display());
        Ok(package)
    }

    /// Writes through a temp file in the target directory, then renames it
    /// over `path`.
    #[instrument(level = "debug", skip(self, package))]
    fn save(&self, package: &DocxPackage, path: &Path) -> InfraResult<()> {
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let temp = NamedTempFile::new_in(dir)
            .map_err(|e| InfraError::io(format!("create temp file in {}", dir.display()), e))?;

        let mut writer = ZipWriter::new(temp);
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        for entry in package.entries() {
            writer
                .start_file(entry.name.as_str(), options)
                .map_err(|e| InfraError::archive(format!("start part {}", entry.name), e))?;
            writer
                .write_all(&entry.data)
                .map_err(|e| InfraError::io(format!("write part {}", entry.name), e))?;
        }
        let temp = writer
            .finish()
            .map_err(|e| InfraError::archive(format!("finish archive {}", path.display()), e))?;
        temp.persist(path)
            .map_err(|e| InfraError::io(format!("persist package {}", path.display()), e.error))?;
        debug!("save: {} parts to {}", package.entries().len(), path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RELS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="/word/main.xml"/>
</Relationships>"#;

    #[test]
    fn given_relationship_when_resolving_main_part_then_uses_target() {
        let mut package = DocxPackage::new();
        package.set_part(ROOT_RELATIONSHIPS, RELS.as_bytes().to_vec());
        assert_eq!(package.main_document_part(), "word/main.xml");
    }

    #[test]
    fn given_no_relationships_when_resolving_main_part_then_default() {
        assert_eq!(DocxPackage::new().main_document_part(), DEFAULT_DOCUMENT_PART);
    }

    #[test]
    fn given_existing_part_when_setting_then_replaced_in_place() {
        let mut package = DocxPackage::new();
        package.set_part("a", vec![1]);
        package.set_part("b", vec![2]);
        package.set_part("a", vec![3]);
        assert_eq!(package.entries().len(), 2);
        assert_eq!(package.part("a"), Some(&[3u8][..]));
        assert_eq!(package.entries()[0].name, "a");
    }
}
