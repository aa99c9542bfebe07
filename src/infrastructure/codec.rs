//! XML codec: part bytes ⇄ arena markup tree.

use generational_arena::Index;
use tracing::{debug, instrument};

use crate::domain::wml::{MATH_NS, MATH_TEXT, TEXT_CARRIERS, WML_NS, XML_NS};
use crate::domain::{Attribute, Element, MarkupTree, NodeData};
use crate::infrastructure::traits::MarkupCodec;
use crate::infrastructure::{InfraError, InfraResult};

const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\r\n";

/// roxmltree-based parser with a stack-driven serializer.
///
/// Namespace prefixes and declarations, comments and processing instructions
/// survive a round trip. Whitespace-only text is dropped unless it sits inside
/// a text-bearing element (`w:t`, `m:t`, ...) or under `xml:space="preserve"`.
#[derive(Debug, Default)]
pub struct XmlCodec;

impl MarkupCodec for XmlCodec {
    #[instrument(level = "debug", skip_all, fields(len = bytes.len()))]
    fn decode(&self, bytes: &[u8]) -> InfraResult<MarkupTree> {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| InfraError::markup(format!("part is not valid UTF-8: {e}")))?;
        let text = text.trim_start_matches('\u{feff}');
        let xml = roxmltree::Document::parse(text).map_err(|e| InfraError::markup(e.to_string()))?;

        let mut tree = MarkupTree::new();
        let mut stack: Vec<(roxmltree::Node, Option<Index>)> = vec![(xml.root_element(), None)];

        while let Some((node, parent)) = stack.pop() {
            if node.is_element() {
                let idx = tree.insert_node(NodeData::Element(convert_element(node)), parent);
                let children: Vec<roxmltree::Node> = node.children().collect();
                for child in children.into_iter().rev() {
                    stack.push((child, Some(idx)));
                }
            } else if node.is_comment() {
                let content = node.text().unwrap_or_default();
                tree.insert_node(NodeData::Comment(content.to_string()), parent);
            } else if let Some(pi) = node.pi() {
                let data = NodeData::ProcessingInstruction {
                    target: pi.target.to_string(),
                    value: pi.value.map(str::to_string),
                };
                tree.insert_node(data, parent);
            } else if let Some(content) = node.text().filter(|_| node.is_text()) {
                if content.trim().is_empty() && !keeps_whitespace(node) {
                    continue;
                }
                tree.insert_node(NodeData::Text(content.to_string()), parent);
            }
        }
        debug!("decode: {} nodes", tree.len());
        Ok(tree)
    }

    #[instrument(level = "debug", skip_all)]
    fn encode(&self, tree: &MarkupTree) -> InfraResult<Vec<u8>> {
        enum Step {
            Open(Index),
            Close(Index),
        }

        let root = tree
            .root()
            .ok_or_else(|| InfraError::markup("cannot encode an empty tree"))?;
        let mut out = String::from(XML_DECLARATION);
        let mut stack = vec![Step::Open(root)];

        while let Some(step) = stack.pop() {
            match step {
                Step::Open(idx) => {
                    let Some(node) = tree.get_node(idx) else {
                        continue;
                    };
                    match &node.data {
                        NodeData::Text(text) => out.push_str(&escape_text(text)),
                        NodeData::Comment(text) => {
                            out.push_str("<!--");
                            out.push_str(text);
                            out.push_str("-->");
                        }
                        NodeData::ProcessingInstruction { target, value } => {
                            out.push_str("<?");
                            out.push_str(target);
                            if let Some(value) = value {
                                out.push(' ');
                                out.push_str(value);
                            }
                            out.push_str("?>");
                        }
                        NodeData::Element(element) => {
                            out.push('<');
                            out.push_str(&element.qualified_name());
                            for attr in &element.attributes {
                                out.push(' ');
                                out.push_str(&attr.name);
                                out.push_str("=\"");
                                out.push_str(&escape_attr(&attr.value));
                                out.push('"');
                            }
                            if node.children.is_empty() {
                                out.push_str("/>");
                            } else {
                                out.push('>');
                                stack.push(Step::Close(idx));
                                for &child in node.children.iter().rev() {
                                    stack.push(Step::Open(child));
                                }
                            }
                        }
                    }
                }
                Step::Close(idx) => {
                    if let Some(element) = tree.element(idx) {
                        out.push_str("</");
                        out.push_str(&element.qualified_name());
                        out.push('>');
                    }
                }
            }
        }
        Ok(out.into_bytes())
    }
}

fn keeps_whitespace(node: roxmltree::Node) -> bool {
    let Some(parent) = node.parent_element() else {
        return false;
    };
    let tag = parent.tag_name();
    let carrier = match tag.namespace() {
        Some(WML_NS) => TEXT_CARRIERS.contains(&tag.name()),
        Some(MATH_NS) => tag.name() == MATH_TEXT,
        _ => false,
    };
    carrier
        || parent
            .ancestors()
            .filter_map(|n| n.attribute((XML_NS, "space")))
            .next()
            .is_some_and(|space| space == "preserve")
}

fn convert_element(node: roxmltree::Node) -> Element {
    let tag = node.tag_name();
    let prefix = tag.namespace().and_then(|uri| {
        node.namespaces()
            .find(|ns| ns.uri() == uri)
            .and_then(|ns| ns.name())
    });
    let mut element = Element::new(prefix, tag.name(), tag.namespace());

    // declarations introduced on this element
    let inherited: Vec<(Option<&str>, &str)> = node
        .parent_element()
        .map(|p| p.namespaces().map(|ns| (ns.name(), ns.uri())).collect())
        .unwrap_or_default();
    for ns in node.namespaces() {
        if ns.name() == Some("xml") || inherited.contains(&(ns.name(), ns.uri())) {
            continue;
        }
        let name = match ns.name() {
            Some(prefix) => format!("xmlns:{prefix}"),
            None => "xmlns".to_string(),
        };
        element.attributes.push(Attribute::new(name, ns.uri()));
    }

    for attr in node.attributes() {
        let name = match attr.namespace() {
            Some(XML_NS) => format!("xml:{}", attr.name()),
            Some(uri) => match node
                .namespaces()
                .find(|ns| ns.uri() == uri && ns.name().is_some())
                .and_then(|ns| ns.name())
            {
                Some(prefix) => format!("{prefix}:{}", attr.name()),
                None => attr.name().to_string(),
            },
            None => attr.name().to_string(),
        };
        element.attributes.push(Attribute::new(name, attr.value()));
    }
    element
}

fn escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

fn escape_attr(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\n' => out.push_str("&#10;"),
            '\r' => out.push_str("&#13;"),
            '\t' => out.push_str("&#9;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_special_characters_when_escaping_then_entities() {
        assert_eq!(escape_text("a < b & c > d"), "a &lt; b &amp; c &gt; d");
        assert_eq!(escape_attr("say \"hi\"\n"), "say &quot;hi&quot;&#10;");
    }

    #[test]
    fn given_empty_tree_when_encoding_then_markup_error() {
        let result = XmlCodec.encode(&MarkupTree::new());
        assert!(matches!(result, Err(InfraError::Markup { .. })));
    }

    #[test]
    fn given_malformed_xml_when_decoding_then_markup_error() {
        let result = XmlCodec.decode(b"<w:document><w:body></w:document>");
        assert!(matches!(result, Err(InfraError::Markup { .. })));
    }
}
