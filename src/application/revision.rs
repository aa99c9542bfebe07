//! Tracked-change wrappers (`w:ins` / `w:del`).

use chrono::{DateTime, Utc};
use generational_arena::Index;
use tracing::{debug, instrument};

use crate::domain::wml;
use crate::domain::{DomainError, DomainResult, Element, MarkupTree, NodeData, RevisionKind};

/// Timestamp format of `w:date`.
pub const REVISION_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Wraps nodes in a revision marker.
pub trait RevisionMarkerBuilder: Send + Sync {
    /// Create a `kind` wrapper stamped with `timestamp` and revision `id`, and
    /// move `nodes` into it.
    ///
    /// The wrapper takes the place of the first node when that node is in the
    /// tree; otherwise it is returned detached.
    fn wrap(
        &self,
        tree: &mut MarkupTree,
        kind: RevisionKind,
        timestamp: DateTime<Utc>,
        id: u64,
        nodes: &[Index],
    ) -> DomainResult<Index>;

    /// Bare marker element (no children) for paragraph-mark revisions.
    fn marker(
        &self,
        tree: &mut MarkupTree,
        kind: RevisionKind,
        timestamp: DateTime<Utc>,
        id: u64,
    ) -> DomainResult<Index> {
        self.wrap(tree, kind, timestamp, id, &[])
    }
}

/// Hands out revision ids for one editing operation.
///
/// Seeded from the tree once; every call to [`RevisionIds::next_id`] yields a
/// fresh id without rescanning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevisionIds {
    next: u64,
}

impl RevisionIds {
    pub fn scan(tree: &MarkupTree) -> Self {
        Self {
            next: next_revision_id(tree),
        }
    }

    pub fn next_id(&mut self) -> u64 {
        let id = self.next;
        self.next += 1;
        id
    }
}

/// WordprocessingML revision marks attributed to one author.
#[derive(Debug, Clone)]
pub struct TrackedChanges {
    author: String,
}

impl TrackedChanges {
    pub fn new(author: impl Into<String>) -> Self {
        Self {
            author: author.into(),
        }
    }

    pub fn author(&self) -> &str {
        &self.author
    }
}

impl RevisionMarkerBuilder for TrackedChanges {
    #[instrument(level = "debug", skip(self, tree))]
    fn wrap(
        &self,
        tree: &mut MarkupTree,
        kind: RevisionKind,
        timestamp: DateTime<Utc>,
        id: u64,
        nodes: &[Index],
    ) -> DomainResult<Index> {
        let wrapper = tree.create_element(
            Element::wml(kind.local_name())
                .with_attr("w:id", id.to_string())
                .with_attr("w:author", self.author.as_str())
                .with_attr("w:date", timestamp.format(REVISION_DATE_FORMAT).to_string()),
        );

        if let Some(&first) = nodes.first() {
            if !tree.contains(first) {
                return Err(DomainError::NodeNotFound(first));
            }
            if tree.parent(first).is_some() {
                tree.insert_before(first, wrapper)?;
            }
        }
        for &node in nodes {
            tree.append_child(wrapper, node)?;
        }
        if kind == RevisionKind::Deletion {
            mark_deleted_text(tree, wrapper);
        }
        debug!("wrap: {:?} id={} around {} nodes", kind, id, nodes.len());
        Ok(wrapper)
    }
}

/// One past the largest `w:id` already used by a revision element, counting
/// nodes that are not linked into the tree yet. Walks the whole arena.
fn next_revision_id(tree: &MarkupTree) -> u64 {
    tree.nodes()
        .filter_map(|(_, node)| match &node.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        })
        .filter(|e| {
            e.wml_local()
                .is_some_and(|local| wml::REVISION_ELEMENTS.contains(&local))
        })
        .filter_map(|e| e.attr("id").and_then(|id| id.parse::<u64>().ok()))
        .max()
        .map_or(0, |max| max + 1)
}

/// Deleted runs keep their text in `w:delText` / `w:delInstrText`.
fn mark_deleted_text(tree: &mut MarkupTree, wrapper: Index) {
    let carriers: Vec<Index> = tree
        .descendants(wrapper)
        .map(|(idx, _)| idx)
        .filter(|&idx| tree.is_wml(idx, wml::T) || tree.is_wml(idx, wml::INSTR_TEXT))
        .collect();
    for idx in carriers {
        if let Some(element) = tree.element_mut(idx) {
            element.local = if element.local == wml::T {
                wml::DEL_TEXT.to_string()
            } else {
                wml::DEL_INSTR_TEXT.to_string()
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn timestamp() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap()
    }

    fn paragraph_with_run(tree: &mut MarkupTree) -> (Index, Index, Index) {
        let p = tree.insert_node(NodeData::Element(Element::wml(wml::P)), None);
        let r = tree.insert_node(NodeData::Element(Element::wml(wml::R)), Some(p));
        let t = tree.insert_node(NodeData::Element(Element::wml(wml::T)), Some(r));
        tree.insert_node(NodeData::Text("gone".into()), Some(t));
        (p, r, t)
    }

    #[test]
    fn given_attached_run_when_wrapping_insertion_then_wrapper_takes_its_place() {
        let mut tree = MarkupTree::new();
        let (p, r, _) = paragraph_with_run(&mut tree);

        let id = RevisionIds::scan(&tree).next_id();
        let ins = TrackedChanges::new("alice")
            .wrap(&mut tree, RevisionKind::Insertion, timestamp(), id, &[r])
            .unwrap();

        assert_eq!(tree.children(p), &[ins]);
        assert_eq!(tree.children(ins), &[r]);
        let element = tree.element(ins).unwrap();
        assert_eq!(element.attr("author"), Some("alice"));
        assert_eq!(element.attr("date"), Some("2024-03-01T12:30:00Z"));
        assert_eq!(element.attr("id"), Some("0"));
    }

    #[test]
    fn given_deletion_when_wrapping_then_text_becomes_del_text() {
        let mut tree = MarkupTree::new();
        let (_, r, t) = paragraph_with_run(&mut tree);

        TrackedChanges::new("bob")
            .wrap(&mut tree, RevisionKind::Deletion, timestamp(), 1, &[r])
            .unwrap();

        assert!(tree.is_wml(t, wml::DEL_TEXT));
    }

    #[test]
    fn given_existing_revisions_when_scanning_then_ids_continue_after_max() {
        let mut tree = MarkupTree::new();
        let (p, _, _) = paragraph_with_run(&mut tree);
        tree.insert_node(
            NodeData::Element(Element::wml(wml::INS).with_attr("w:id", "7")),
            Some(p),
        );
        // detached revision nodes count too
        tree.create_element(Element::wml(wml::DEL).with_attr("w:id", "9"));

        let mut ids = RevisionIds::scan(&tree);
        assert_eq!(ids.next_id(), 10);
        assert_eq!(ids.next_id(), 11);
    }

    #[test]
    fn given_allocated_ids_when_wrapping_repeatedly_then_no_rescan_needed() {
        let mut tree = MarkupTree::new();
        let (_, r, _) = paragraph_with_run(&mut tree);
        let mut ids = RevisionIds::scan(&tree);
        let builder = TrackedChanges::new("carol");

        let first = builder
            .wrap(&mut tree, RevisionKind::Deletion, timestamp(), ids.next_id(), &[r])
            .unwrap();
        let second = builder
            .marker(&mut tree, RevisionKind::Deletion, timestamp(), ids.next_id())
            .unwrap();

        assert_eq!(tree.element(first).unwrap().attr("id"), Some("0"));
        assert_eq!(tree.element(second).unwrap().attr("id"), Some("1"));
    }

    #[test]
    fn given_no_nodes_when_requesting_marker_then_detached_empty_wrapper() {
        let mut tree = MarkupTree::new();
        paragraph_with_run(&mut tree);
        let marker = TrackedChanges::new("dave")
            .marker(&mut tree, RevisionKind::Deletion, timestamp(), 0)
            .unwrap();
        assert_eq!(tree.parent(marker), None);
        assert!(tree.children(marker).is_empty());
        assert!(tree.is_wml(marker, wml::DEL));
    }
}
