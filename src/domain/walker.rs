//! Depth-first traversal of block-level content.
//!
//! Paragraphs are leaves. Every other element is descended: tables row → cell
//! → content to any nesting depth, and block containers such as content
//! controls (`w:sdt/w:sdtContent`) or `w:customXml`. Uses an explicit work
//! stack. The walker knows nothing about sections.

use generational_arena::Index;
use tracing::instrument;

use crate::domain::arena::MarkupTree;
use crate::domain::entities::{Paragraph, Table};
use crate::domain::wml;

/// Paragraphs at or below `node`, in document order.
#[instrument(level = "trace", skip(tree))]
pub fn collect_paragraphs(tree: &MarkupTree, node: Index) -> Vec<Paragraph> {
    collect(tree, node, wml::P)
        .into_iter()
        .map(Paragraph::new)
        .collect()
}

/// Tables at or below `node`, outer tables before the tables nested in them.
#[instrument(level = "trace", skip(tree))]
pub fn collect_tables(tree: &MarkupTree, node: Index) -> Vec<Table> {
    collect(tree, node, wml::TBL)
        .into_iter()
        .map(Table::new)
        .collect()
}

fn collect(tree: &MarkupTree, node: Index, wanted: &str) -> Vec<Index> {
    let mut found = Vec::new();
    let mut stack = vec![node];

    while let Some(current) = stack.pop() {
        let Some(element) = tree.element(current) else {
            continue;
        };
        let descend = match element.wml_local() {
            Some(wml::P) => {
                if wanted == wml::P {
                    found.push(current);
                }
                false
            }
            Some(wml::TBL) => {
                if wanted == wml::TBL {
                    found.push(current);
                }
                true
            }
            _ => true,
        };
        if descend {
            for &child in tree.children(current).iter().rev() {
                stack.push(child);
            }
        }
    }
    found
}
