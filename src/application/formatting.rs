//! Run construction for inserted text.

use generational_arena::Index;
use tracing::instrument;

use crate::domain::wml;
use crate::domain::{DomainResult, Element, Formatting, MarkupTree, NodeData};

/// Builds the run-level children of a new paragraph.
pub trait FormattingApplier: Send + Sync {
    /// Returns detached run nodes, in order, for `text` under `formatting`.
    fn apply(
        &self,
        tree: &mut MarkupTree,
        text: &str,
        formatting: &Formatting,
    ) -> DomainResult<Vec<Index>>;
}

/// Emits a single `w:r` carrying the formatting as `w:rPr`.
///
/// Tabs and line feeds become `w:tab` / `w:br`; carriage returns are dropped.
/// Empty text still yields the (property-only) run.
#[derive(Debug, Default)]
pub struct RunFormatter;

impl FormattingApplier for RunFormatter {
    #[instrument(level = "debug", skip(self, tree))]
    fn apply(
        &self,
        tree: &mut MarkupTree,
        text: &str,
        formatting: &Formatting,
    ) -> DomainResult<Vec<Index>> {
        let run = tree.create_element(Element::wml(wml::R));
        if !formatting.is_plain() {
            let rpr = run_properties(tree, formatting)?;
            tree.append_child(run, rpr)?;
        }

        let mut segment = String::new();
        for ch in text.chars() {
            match ch {
                '\t' | '\n' => {
                    flush_segment(tree, run, &mut segment)?;
                    let local = if ch == '\t' { wml::TAB } else { wml::BR };
                    let node = tree.create_element(Element::wml(local));
                    tree.append_child(run, node)?;
                }
                '\r' => {}
                _ => segment.push(ch),
            }
        }
        flush_segment(tree, run, &mut segment)?;
        Ok(vec![run])
    }
}

fn flush_segment(tree: &mut MarkupTree, run: Index, segment: &mut String) -> DomainResult<()> {
    if segment.is_empty() {
        return Ok(());
    }
    let mut t = Element::wml(wml::T);
    if segment.starts_with(char::is_whitespace) || segment.ends_with(char::is_whitespace) {
        t.set_attr("xml:space", "preserve");
    }
    let t = tree.create_element(t);
    tree.insert_node(NodeData::Text(std::mem::take(segment)), Some(t));
    tree.append_child(run, t)
}

/// `w:rPr` with children in schema order.
fn run_properties(tree: &mut MarkupTree, f: &Formatting) -> DomainResult<Index> {
    let mut props: Vec<Element> = Vec::new();
    if let Some(font) = &f.font_family {
        props.push(
            Element::wml(wml::R_FONTS)
                .with_attr("w:ascii", font.as_str())
                .with_attr("w:hAnsi", font.as_str())
                .with_attr("w:cs", font.as_str()),
        );
    }
    if f.bold {
        props.push(Element::wml(wml::B));
    }
    if f.italic {
        props.push(Element::wml(wml::I));
    }
    if f.strike {
        props.push(Element::wml(wml::STRIKE));
    }
    if let Some(color) = &f.color {
        let hex = color.trim_start_matches('#').to_ascii_uppercase();
        props.push(Element::wml(wml::COLOR).with_attr("w:val", hex));
    }
    if let Some(size) = f.size {
        let half_points = ((size * 2.0).round() as i64).to_string();
        props.push(Element::wml(wml::SZ).with_attr("w:val", half_points.as_str()));
        props.push(Element::wml(wml::SZ_CS).with_attr("w:val", half_points));
    }
    if let Some(highlight) = &f.highlight {
        props.push(Element::wml(wml::HIGHLIGHT).with_attr("w:val", highlight.as_str()));
    }
    if f.underline {
        props.push(Element::wml(wml::U).with_attr("w:val", "single"));
    }

    let rpr = tree.create_element(Element::wml(wml::R_PR));
    for prop in props {
        tree.insert_node(NodeData::Element(prop), Some(rpr));
    }
    Ok(rpr)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locals(tree: &MarkupTree, idx: Index) -> Vec<String> {
        tree.children(idx)
            .iter()
            .filter_map(|&c| tree.element(c).map(|e| e.local.clone()))
            .collect()
    }

    #[test]
    fn given_plain_text_when_applied_then_single_run_without_properties() {
        let mut tree = MarkupTree::new();
        let runs = RunFormatter
            .apply(&mut tree, "hello", &Formatting::default())
            .unwrap();
        assert_eq!(runs.len(), 1);
        assert_eq!(locals(&tree, runs[0]), vec!["t"]);
    }

    #[test]
    fn given_tabs_and_newlines_when_applied_then_split_into_breaks() {
        let mut tree = MarkupTree::new();
        let runs = RunFormatter
            .apply(&mut tree, "a\tb\r\nc", &Formatting::default())
            .unwrap();
        assert_eq!(locals(&tree, runs[0]), vec!["t", "tab", "t", "br", "t"]);
    }

    #[test]
    fn given_surrounding_spaces_when_applied_then_space_preserved() {
        let mut tree = MarkupTree::new();
        let runs = RunFormatter
            .apply(&mut tree, " padded ", &Formatting::default())
            .unwrap();
        let t = tree.children(runs[0])[0];
        assert_eq!(tree.element(t).unwrap().attr("space"), Some("preserve"));
    }

    #[test]
    fn given_formatting_when_applied_then_properties_in_schema_order() {
        let mut tree = MarkupTree::new();
        let formatting = Formatting {
            bold: true,
            underline: true,
            size: Some(10.5),
            font_family: Some("Arial".into()),
            color: Some("#ff0000".into()),
            ..Formatting::default()
        };
        let runs = RunFormatter.apply(&mut tree, "x", &formatting).unwrap();
        let rpr = tree.children(runs[0])[0];
        assert_eq!(
            locals(&tree, rpr),
            vec!["rFonts", "b", "color", "sz", "szCs", "u"]
        );
        let color = tree.find_wml_child(rpr, wml::COLOR).unwrap();
        assert_eq!(tree.element(color).unwrap().attr("val"), Some("FF0000"));
        let sz = tree.find_wml_child(rpr, wml::SZ).unwrap();
        assert_eq!(tree.element(sz).unwrap().attr("val"), Some("21"));
    }

    #[test]
    fn given_empty_text_when_applied_then_run_still_emitted() {
        let mut tree = MarkupTree::new();
        let runs = RunFormatter
            .apply(&mut tree, "", &Formatting::default())
            .unwrap();
        assert_eq!(runs.len(), 1);
        assert!(tree.children(runs[0]).is_empty());
    }
}
