/*
Section outline as a termtree: document -> sections -> blocks.
Tables and block containers show their paragraphs (nested tables
flattened) as leaves.
 */
use generational_arena::Index;
use termtree::Tree;
use tracing::instrument;

use crate::application::document::Document;
use crate::domain::resolver;
use crate::domain::walker;
use crate::domain::wml;
use crate::domain::{DomainResult, Paragraph};

const PREVIEW_CHARS: usize = 40;

pub trait OutlineConvert {
    fn to_tree_string(&self) -> DomainResult<Tree<String>>;
}

impl OutlineConvert for Document {
    #[instrument(level = "debug", skip(self))]
    fn to_tree_string(&self) -> DomainResult<Tree<String>> {
        let sections = self.sections()?;
        let mut root = Tree::new(format!("document ({} sections)", sections.len()));

        for (i, &section) in sections.iter().enumerate() {
            let paragraphs = self.section_paragraphs(section)?;
            let mut node = Tree::new(format!(
                "section {} [{}] ({} paragraphs)",
                i + 1,
                self.break_type(section)?,
                paragraphs.len()
            ));
            let range = resolver::resolve(self.tree(), self.body(), section)?;
            for member in range.members {
                if let Some(block) = block_tree(self, member, &paragraphs) {
                    node.push(block);
                }
            }
            root.push(node);
        }
        Ok(root)
    }
}

fn block_tree(doc: &Document, member: Index, visible: &[Paragraph]) -> Option<Tree<String>> {
    let tree = doc.tree();
    if tree.is_wml(member, wml::P) {
        let paragraph = Paragraph::new(member);
        return visible
            .contains(&paragraph)
            .then(|| Tree::new(paragraph_label(doc, paragraph)));
    }
    if tree.is_wml(member, wml::TBL) {
        let leaves: Vec<Tree<String>> = walker::collect_paragraphs(tree, member)
            .into_iter()
            .map(|p| Tree::new(paragraph_label(doc, p)))
            .collect();
        let rows = tree
            .children(member)
            .iter()
            .filter(|&&c| tree.is_wml(c, wml::TR))
            .count();
        return Some(Tree::new(format!("table ({rows} rows)")).with_leaves(leaves));
    }
    // block containers (content controls, custom XML) show their paragraphs
    let leaves: Vec<Tree<String>> = walker::collect_paragraphs(tree, member)
        .into_iter()
        .filter(|p| visible.contains(p))
        .map(|p| Tree::new(paragraph_label(doc, p)))
        .collect();
    if leaves.is_empty() {
        return None;
    }
    let name = tree.get_node(member)?.data.to_string();
    Some(Tree::new(name).with_leaves(leaves))
}

fn paragraph_label(doc: &Document, paragraph: Paragraph) -> String {
    let text = doc.paragraph_text(paragraph);
    let mut preview: String = text
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .take(PREVIEW_CHARS)
        .collect();
    if text.chars().count() > PREVIEW_CHARS {
        preview.push('…');
    }
    if doc.is_deleted(paragraph) {
        format!("¶ [deleted] {preview}")
    } else {
        format!("¶ {preview}")
    }
}
