use docsect::domain::{MarkupTree, NodeData};
use docsect::infrastructure::traits::MarkupCodec;
use docsect::infrastructure::XmlCodec;
use docsect::util::testing::init_test_setup;

const DOCUMENT: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" xmlns:w14="http://schemas.microsoft.com/office/word/2010/wordml" xmlns:mc="http://schemas.openxmlformats.org/markup-compatibility/2006" mc:Ignorable="w14">
  <w:body>
    <w:p w14:paraId="1A2B3C4D">
      <w:r>
        <w:t xml:space="preserve"> leading and trailing </w:t>
      </w:r>
      <w:r><w:t>a &lt; b &amp; c</w:t></w:r>
    </w:p>
    <w:sectPr/>
  </w:body>
</w:document>"#;

fn text_nodes(tree: &MarkupTree) -> Vec<String> {
    tree.iter()
        .filter_map(|(_, node)| match &node.data {
            NodeData::Text(t) => Some(t.clone()),
            _ => None,
        })
        .collect()
}

#[test]
fn given_document_when_decoding_then_formatting_whitespace_dropped() {
    init_test_setup();
    let tree = XmlCodec.decode(DOCUMENT.as_bytes()).unwrap();

    assert_eq!(
        text_nodes(&tree),
        vec![" leading and trailing ".to_string(), "a < b & c".to_string()]
    );
}

#[test]
fn given_document_when_round_tripping_then_prefixes_and_space_preserved() {
    init_test_setup();
    let tree = XmlCodec.decode(DOCUMENT.as_bytes()).unwrap();

    let encoded = String::from_utf8(XmlCodec.encode(&tree).unwrap()).unwrap();

    assert!(encoded.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>"));
    assert!(encoded.contains(r#"xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main""#));
    assert!(encoded.contains(r#"mc:Ignorable="w14""#));
    assert!(encoded.contains(r#"<w:p w14:paraId="1A2B3C4D">"#));
    assert!(encoded.contains(r#"<w:t xml:space="preserve"> leading and trailing </w:t>"#));
    assert!(encoded.contains("a &lt; b &amp; c"));
    assert!(encoded.contains("<w:sectPr/>"));

    let again = XmlCodec.decode(encoded.as_bytes()).unwrap();
    assert_eq!(again.len(), tree.len());
    assert_eq!(text_nodes(&again), text_nodes(&tree));
}

#[test]
fn given_nested_declaration_when_encoding_then_declared_once_where_introduced() {
    init_test_setup();
    let xml = r#"<a:root xmlns:a="urn:a"><a:child xmlns:b="urn:b"><b:leaf/></a:child></a:root>"#;
    let tree = XmlCodec.decode(xml.as_bytes()).unwrap();

    let encoded = String::from_utf8(XmlCodec.encode(&tree).unwrap()).unwrap();

    assert_eq!(encoded.matches("xmlns:a=").count(), 1);
    assert!(encoded.contains(r#"<a:child xmlns:b="urn:b"><b:leaf/></a:child>"#));
}

#[test]
fn given_byte_order_mark_when_decoding_then_ignored() {
    init_test_setup();
    let mut bytes = "\u{feff}".as_bytes().to_vec();
    bytes.extend_from_slice(DOCUMENT.as_bytes());

    assert!(XmlCodec.decode(&bytes).is_ok());
}

#[test]
fn given_comments_and_processing_instructions_when_round_tripping_then_kept() {
    init_test_setup();
    let xml = r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body><!-- generated --><?mso-application progid="Word.Document"?><w:p/></w:body></w:document>"#;
    let tree = XmlCodec.decode(xml.as_bytes()).unwrap();

    let encoded = String::from_utf8(XmlCodec.encode(&tree).unwrap()).unwrap();

    assert!(encoded.contains(r#"<w:body><!-- generated --><?mso-application progid="Word.Document"?><w:p/></w:body>"#));
    assert!(tree
        .iter()
        .any(|(_, n)| n.data == NodeData::Comment(" generated ".to_string())));
}

#[test]
fn given_whitespace_in_math_text_when_round_tripping_then_preserved() {
    init_test_setup();
    let xml = r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" xmlns:m="http://schemas.openxmlformats.org/officeDocument/2006/math"><w:body><w:p><m:oMath><m:r><m:t> </m:t></m:r></m:oMath><w:r><w:instrText xml:space="preserve"> </w:instrText></w:r></w:p><w:customXml xml:space="preserve"><w:tag> </w:tag></w:customXml></w:body></w:document>"#;
    let tree = XmlCodec.decode(xml.as_bytes()).unwrap();

    let encoded = String::from_utf8(XmlCodec.encode(&tree).unwrap()).unwrap();

    assert!(encoded.contains("<m:t> </m:t>"));
    assert!(encoded.contains(r#"<w:instrText xml:space="preserve"> </w:instrText>"#));
    assert!(encoded.contains("<w:tag> </w:tag>"));
    assert_eq!(text_nodes(&tree), vec![" ", " ", " "]);
}
