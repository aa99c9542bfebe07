use std::sync::Arc;

use docsect::config::Settings;
use docsect::domain::Formatting;
use docsect::infrastructure::di::ServiceContainer;
use docsect::infrastructure::traits::PackageStore;
use docsect::infrastructure::{DocxPackage, XmlCodec, ZipPackageStore};
use docsect::util::testing::{document_xml, fixed_clock, init_test_setup};
use tempfile::TempDir;

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="xml" ContentType="application/xml"/></Types>"#;
const RELS: &str = r#"<?xml version="1.0" encoding="UTF-8"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;
const STYLES: &str = "<styles/>";

fn package(body: &str) -> DocxPackage {
    let mut package = DocxPackage::new();
    package.set_part("[Content_Types].xml", CONTENT_TYPES.as_bytes().to_vec());
    package.set_part("_rels/.rels", RELS.as_bytes().to_vec());
    package.set_part("word/document.xml", document_xml(body).into_bytes());
    package.set_part("word/styles.xml", STYLES.as_bytes().to_vec());
    package
}

fn container() -> ServiceContainer {
    let settings = Settings {
        author: "packager".into(),
        track_changes: false,
        formatting: Formatting::default(),
    };
    ServiceContainer::with_deps(
        settings,
        Arc::new(ZipPackageStore),
        Arc::new(XmlCodec),
        Arc::new(fixed_clock()),
    )
}

#[test]
fn given_package_when_saved_and_loaded_then_parts_identical() {
    init_test_setup();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("roundtrip.docx");
    let original = package("<w:p/>");

    ZipPackageStore.save(&original, &path).unwrap();
    let loaded = ZipPackageStore.load(&path).unwrap();

    assert_eq!(loaded, original);
    assert_eq!(loaded.main_document_part(), "word/document.xml");
}

#[test]
fn given_docx_when_inserting_through_service_then_saved_copy_has_paragraph() {
    init_test_setup();
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("in.docx");
    let output = dir.path().join("out.docx");
    ZipPackageStore
        .save(
            &package("<w:p><w:r><w:t>first</w:t></w:r></w:p><w:sectPr/>"),
            &input,
        )
        .unwrap();

    let container = container();
    let service = container.document_service();
    let mut open = service.open(&input).unwrap();
    let section = open.document.sections().unwrap()[0];
    open.document
        .insert_paragraph(section, "second", true, &Formatting::default())
        .unwrap();
    service.save(&mut open, &output).unwrap();

    let reopened = service.open(&output).unwrap();
    let texts: Vec<String> = reopened
        .document
        .paragraphs()
        .into_iter()
        .map(|p| reopened.document.paragraph_text(p))
        .collect();
    assert_eq!(texts, vec!["first", "second"]);
    assert_eq!(reopened.package.part("word/styles.xml"), Some(STYLES.as_bytes()));

    let xml = String::from_utf8(reopened.package.part("word/document.xml").unwrap().to_vec()).unwrap();
    assert!(xml.contains(r#"w:author="packager""#));

    // input untouched
    let untouched = service.open(&input).unwrap();
    assert_eq!(untouched.document.paragraphs().len(), 1);
}

#[test]
fn given_missing_file_when_opening_then_operation_failed() {
    init_test_setup();
    let dir = TempDir::new().unwrap();

    let result = container().document_service().open(&dir.path().join("absent.docx"));

    assert!(result.is_err());
}

#[test]
fn given_package_without_document_part_when_opening_then_error() {
    init_test_setup();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("empty.docx");
    let mut package = DocxPackage::new();
    package.set_part("[Content_Types].xml", CONTENT_TYPES.as_bytes().to_vec());
    ZipPackageStore.save(&package, &path).unwrap();

    let result = container().document_service().open(&path);

    assert!(result.is_err());
}
