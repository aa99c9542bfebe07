//! Section-aware access to a document body.
//!
//! [`Document`] owns the markup tree of the main document part and exposes
//! section-scoped reads and mutations. Section membership is recomputed from
//! the live tree on every call.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use generational_arena::Index;
use tracing::{debug, instrument};

use crate::application::formatting::{FormattingApplier, RunFormatter};
use crate::application::revision::{RevisionIds, RevisionMarkerBuilder, TrackedChanges};
use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::resolver::{self, SectionRange};
use crate::domain::walker;
use crate::domain::wml;
use crate::domain::{
    DomainError, DomainResult, Element, Formatting, MarkerHost, MarkupTree, NodeData, Paragraph,
    RevisionKind, Section, SectionBreakType, Table,
};
use crate::infrastructure::traits::{Clock, SystemClock};

/// Revision author used when none is configured.
pub const DEFAULT_AUTHOR: &str = "docsect";

/// Main document part with its section model.
pub struct Document {
    tree: MarkupTree,
    body: Index,
    formatter: Box<dyn FormattingApplier>,
    revisions: Box<dyn RevisionMarkerBuilder>,
    clock: Arc<dyn Clock>,
    /// Used by [`Document::append_paragraph`]
    track_changes: bool,
    /// Used by [`Document::append_paragraph`]
    formatting: Formatting,
    /// Marker hosts emptied by an untracked removal
    emptied_hosts: HashSet<Index>,
}

impl Document {
    /// Wrap a decoded tree using the built-in collaborators.
    pub fn new(tree: MarkupTree) -> DomainResult<Self> {
        Self::with_collaborators(
            tree,
            Box::new(RunFormatter),
            Box::new(TrackedChanges::new(DEFAULT_AUTHOR)),
            Arc::new(SystemClock),
        )
    }

    /// Wrap a decoded tree with custom collaborators (for testing).
    pub fn with_collaborators(
        tree: MarkupTree,
        formatter: Box<dyn FormattingApplier>,
        revisions: Box<dyn RevisionMarkerBuilder>,
        clock: Arc<dyn Clock>,
    ) -> DomainResult<Self> {
        let body = resolver::find_body(&tree)?;
        Ok(Self {
            tree,
            body,
            formatter,
            revisions,
            clock,
            track_changes: false,
            formatting: Formatting::default(),
            emptied_hosts: HashSet::new(),
        })
    }

    /// Defaults applied by [`Document::append_paragraph`].
    pub fn with_defaults(mut self, track_changes: bool, formatting: Formatting) -> Self {
        self.track_changes = track_changes;
        self.formatting = formatting;
        self
    }

    pub fn tree(&self) -> &MarkupTree {
        &self.tree
    }

    /// Raw tree access. Sections obtained earlier may go stale.
    pub fn tree_mut(&mut self) -> &mut MarkupTree {
        &mut self.tree
    }

    pub fn into_tree(self) -> MarkupTree {
        self.tree
    }

    pub fn body(&self) -> Index {
        self.body
    }

    // ============================================================
    // Reads
    // ============================================================

    /// All sections in document order; never empty.
    pub fn sections(&self) -> DomainResult<Vec<Section>> {
        resolver::discover_sections(&self.tree, self.body)
    }

    /// Section by zero-based position.
    pub fn section(&self, index: usize) -> ApplicationResult<Section> {
        let sections = self.sections()?;
        let count = sections.len();
        sections
            .into_iter()
            .nth(index)
            .ok_or(ApplicationError::SectionOutOfRange { index, count })
    }

    /// Every paragraph of the body, including those inside tables.
    pub fn paragraphs(&self) -> Vec<Paragraph> {
        walker::collect_paragraphs(&self.tree, self.body)
            .into_iter()
            .filter(|p| !self.is_break_carrier(p.index()))
            .collect()
    }

    /// Paragraphs of `section` in document order.
    #[instrument(level = "debug", skip(self))]
    pub fn section_paragraphs(&self, section: Section) -> DomainResult<Vec<Paragraph>> {
        let range = resolver::resolve(&self.tree, self.body, section)?;
        Ok(range
            .members
            .iter()
            .flat_map(|&member| walker::collect_paragraphs(&self.tree, member))
            .filter(|p| !self.is_break_carrier(p.index()))
            .collect())
    }

    /// Tables of `section`, nested tables included.
    pub fn section_tables(&self, section: Section) -> DomainResult<Vec<Table>> {
        let range = resolver::resolve(&self.tree, self.body, section)?;
        Ok(range
            .members
            .iter()
            .flat_map(|&member| walker::collect_tables(&self.tree, member))
            .collect())
    }

    /// Break type from `w:type/@w:val`; `nextPage` when absent.
    pub fn break_type(&self, section: Section) -> DomainResult<SectionBreakType> {
        let Some(marker) = section.marker() else {
            return Ok(SectionBreakType::default());
        };
        resolver::marker_host(&self.tree, self.body, marker)?;
        Ok(self
            .tree
            .find_wml_child(marker, wml::SECT_TYPE)
            .and_then(|t| self.tree.element(t))
            .and_then(|e| e.attr("val"))
            .and_then(SectionBreakType::from_val)
            .unwrap_or_default())
    }

    /// Visible text: `w:t` content, tabs and line breaks. Deleted text is
    /// not included.
    pub fn paragraph_text(&self, paragraph: Paragraph) -> String {
        let mut text = String::new();
        for (idx, node) in self.tree.descendants(paragraph.index()) {
            let NodeData::Element(element) = &node.data else {
                continue;
            };
            match element.wml_local() {
                Some(wml::T) => {
                    for &child in self.tree.children(idx) {
                        if let Some(NodeData::Text(s)) = self.tree.get_node(child).map(|n| &n.data)
                        {
                            text.push_str(s);
                        }
                    }
                }
                Some(wml::TAB) => text.push('\t'),
                Some(wml::BR) | Some(wml::CR) => text.push('\n'),
                _ => {}
            }
        }
        text
    }

    /// The paragraph mark carries a tracked deletion.
    pub fn is_deleted(&self, paragraph: Paragraph) -> bool {
        self.tree
            .find_wml_child(paragraph.index(), wml::P_PR)
            .and_then(|ppr| self.tree.find_wml_child(ppr, wml::R_PR))
            .and_then(|rpr| self.tree.find_wml_child(rpr, wml::DEL))
            .is_some()
    }

    /// A marker host whose content was removed here: what is left is the
    /// physical section break, not a paragraph. Loaded documents may contain
    /// paragraphs of the same shape; those are content and stay listed.
    fn is_break_carrier(&self, idx: Index) -> bool {
        self.emptied_hosts.contains(&idx) && self.hosts_marker(idx)
    }

    fn hosts_marker(&self, idx: Index) -> bool {
        self.tree
            .find_wml_child(idx, wml::P_PR)
            .and_then(|ppr| self.tree.find_wml_child(ppr, wml::SECT_PR))
            .is_some()
    }

    /// Only paragraph left in a table cell.
    fn is_sole_cell_paragraph(&self, idx: Index) -> bool {
        self.tree
            .parent(idx)
            .filter(|&cell| self.tree.is_wml(cell, wml::TC))
            .is_some_and(|cell| {
                self.tree
                    .children(cell)
                    .iter()
                    .filter(|&&c| self.tree.is_wml(c, wml::P))
                    .count()
                    == 1
            })
    }

    fn require_paragraph(&self, idx: Index) -> DomainResult<()> {
        if !self.tree.contains(idx) {
            return Err(DomainError::NodeNotFound(idx));
        }
        if !self.tree.is_wml(idx, wml::P) {
            return Err(DomainError::NotAParagraph(idx));
        }
        Ok(())
    }

    // ============================================================
    // Mutations
    // ============================================================

    /// Remove every paragraph of `section`.
    ///
    /// Membership is taken once, before any removal. Untracked, body-level
    /// tables and block wrappers (content controls, custom XML) go as a
    /// whole; tracked, every paragraph stays and is marked
    /// deleted. A marker host is emptied rather than removed, so the
    /// section itself survives.
    #[instrument(level = "debug", skip(self))]
    pub fn clear(&mut self, section: Section, track_changes: bool) -> DomainResult<()> {
        let range = resolver::resolve(&self.tree, self.body, section)?;

        if track_changes {
            let paragraphs = self.section_paragraphs(section)?;
            debug!("clear: marking {} paragraphs deleted", paragraphs.len());
            let mut ids = RevisionIds::scan(&self.tree);
            for paragraph in paragraphs {
                self.mark_deleted(paragraph.index(), &mut ids)?;
            }
            return Ok(());
        }

        debug!("clear: removing {} members", range.members.len());
        for member in range.members {
            if self.tree.is_wml(member, wml::TBL) {
                self.tree.remove_subtree(member)?;
                continue;
            }
            let paragraphs = walker::collect_paragraphs(&self.tree, member);
            // content controls and other block wrappers go with their content
            let wrapper = !self.tree.is_wml(member, wml::P)
                && !paragraphs.is_empty()
                && !resolver::contains_marker(&self.tree, member);
            if wrapper {
                self.tree.remove_subtree(member)?;
                continue;
            }
            for paragraph in paragraphs {
                self.remove_paragraph(paragraph, false)?;
            }
        }
        Ok(())
    }

    /// Remove one paragraph.
    ///
    /// Tracked: its content is wrapped in `w:del` and the paragraph mark is
    /// flagged deleted; nothing leaves the tree. Untracked: the paragraph is
    /// freed, except that a marker host keeps its properties (becoming a bare
    /// break carrier) and the last paragraph of a table cell is only emptied.
    #[instrument(level = "debug", skip(self))]
    pub fn remove_paragraph(&mut self, paragraph: Paragraph, track_changes: bool) -> DomainResult<()> {
        let idx = paragraph.index();
        self.require_paragraph(idx)?;

        if track_changes {
            let mut ids = RevisionIds::scan(&self.tree);
            return self.mark_deleted(idx, &mut ids);
        }
        let host = self.hosts_marker(idx);
        if host || self.is_sole_cell_paragraph(idx) {
            let content: Vec<Index> = self
                .tree
                .children(idx)
                .iter()
                .copied()
                .filter(|&c| !self.tree.is_wml(c, wml::P_PR))
                .collect();
            for child in content {
                self.tree.remove_subtree(child)?;
            }
            if host {
                self.emptied_hosts.insert(idx);
            }
            return Ok(());
        }
        self.tree.remove_subtree(idx)
    }

    /// Insert a paragraph at the end of `section` and return it.
    ///
    /// The new paragraph lands after every existing paragraph of the section
    /// and before the next one; a boundary marker carried by the last
    /// paragraph moves onto the new one.
    #[instrument(level = "debug", skip(self, formatting))]
    pub fn insert_paragraph(
        &mut self,
        section: Section,
        text: &str,
        track_changes: bool,
        formatting: &Formatting,
    ) -> DomainResult<Paragraph> {
        let range = resolver::resolve(&self.tree, self.body, section)?;

        let p = self.tree.create_element(Element::wml(wml::P));
        let ppr = self.tree.create_element(Element::wml(wml::P_PR));
        self.tree.append_child(p, ppr)?;
        let runs = self.formatter.apply(&mut self.tree, text, formatting)?;
        for &run in &runs {
            self.tree.append_child(p, run)?;
        }

        if track_changes {
            let timestamp = self.clock.now();
            let mut ids = RevisionIds::scan(&self.tree);
            if !runs.is_empty() {
                self.revisions.wrap(
                    &mut self.tree,
                    RevisionKind::Insertion,
                    timestamp,
                    ids.next_id(),
                    &runs,
                )?;
            }
            self.mark_paragraph_mark(p, RevisionKind::Insertion, &mut ids)?;
        }

        self.place_at_tail(&range, p)?;
        self.last_paragraph(section)
    }

    /// Insert a copy of `source` at the end of `section`. Boundary markers
    /// inside the copy are dropped.
    #[instrument(level = "debug", skip(self))]
    pub fn insert_paragraph_copy(
        &mut self,
        section: Section,
        source: Paragraph,
    ) -> DomainResult<Paragraph> {
        self.require_paragraph(source.index())?;
        let range = resolver::resolve(&self.tree, self.body, section)?;

        let copy = self.tree.deep_clone(source.index())?;
        let markers = resolver::markers(&self.tree, copy);
        for marker in markers {
            self.tree.remove_subtree(marker)?;
        }

        self.place_at_tail(&range, copy)?;
        self.last_paragraph(section)
    }

    /// [`Document::insert_paragraph`] with the document's defaults.
    pub fn append_paragraph(&mut self, section: Section, text: &str) -> DomainResult<Paragraph> {
        let formatting = self.formatting.clone();
        self.insert_paragraph(section, text, self.track_changes, &formatting)
    }

    fn last_paragraph(&self, section: Section) -> DomainResult<Paragraph> {
        self.section_paragraphs(section)?
            .last()
            .copied()
            .ok_or_else(|| DomainError::structural("inserted paragraph is not part of its section"))
    }

    /// Link the detached paragraph `p` as the last block of the section.
    fn place_at_tail(&mut self, range: &SectionRange, p: Index) -> DomainResult<()> {
        match (range.host, range.marker) {
            (Some(MarkerHost::Body), Some(marker)) => self.tree.insert_before(marker, p),
            (Some(MarkerHost::Paragraph(host)), _) if self.is_break_carrier(host) => {
                self.tree.insert_before(host, p)
            }
            (Some(MarkerHost::Paragraph(host)), Some(marker)) => {
                self.tree.insert_after(host, p)?;
                let ppr = self.ensure_properties(p)?;
                self.tree.append_child(ppr, marker)?;
                debug!("place_at_tail: marker moved to inserted paragraph");
                Ok(())
            }
            (None, _) => {
                let last = self.tree.children(self.body).last().copied();
                if last.is_some_and(|c| resolver::is_marker(&self.tree, c)) {
                    return Err(DomainError::structural(
                        "implicit section cannot follow a body-level boundary marker",
                    ));
                }
                self.tree.append_child(self.body, p)
            }
            (Some(_), None) => Err(DomainError::structural("section range has a host but no marker")),
        }
    }

    /// `w:pPr` of `p`, created as first child when missing.
    fn ensure_properties(&mut self, p: Index) -> DomainResult<Index> {
        if let Some(ppr) = self.tree.find_wml_child(p, wml::P_PR) {
            return Ok(ppr);
        }
        let ppr = self.tree.create_element(Element::wml(wml::P_PR));
        match self.tree.children(p).first().copied() {
            Some(first) => self.tree.insert_before(first, ppr)?,
            None => self.tree.append_child(p, ppr)?,
        }
        Ok(ppr)
    }

    /// Flag the paragraph mark with a revision in `w:pPr/w:rPr`.
    fn mark_paragraph_mark(
        &mut self,
        p: Index,
        kind: RevisionKind,
        ids: &mut RevisionIds,
    ) -> DomainResult<()> {
        let ppr = self.ensure_properties(p)?;
        let rpr = match self.tree.find_wml_child(ppr, wml::R_PR) {
            Some(rpr) => rpr,
            None => {
                let rpr = self.tree.create_element(Element::wml(wml::R_PR));
                // rPr precedes sectPr and pPrChange
                let successor = self.tree.children(ppr).iter().copied().find(|&c| {
                    self.tree.is_wml(c, wml::SECT_PR) || self.tree.is_wml(c, "pPrChange")
                });
                match successor {
                    Some(next) => self.tree.insert_before(next, rpr)?,
                    None => self.tree.append_child(ppr, rpr)?,
                }
                rpr
            }
        };
        if self.tree.find_wml_child(rpr, kind.local_name()).is_none() {
            let timestamp = self.clock.now();
            let marker = self
                .revisions
                .marker(&mut self.tree, kind, timestamp, ids.next_id())?;
            self.tree.append_child(rpr, marker)?;
        }
        Ok(())
    }

    /// Tracked deletion of a paragraph's content and mark.
    fn mark_deleted(&mut self, p: Index, ids: &mut RevisionIds) -> DomainResult<()> {
        let timestamp = self.clock.now();
        let mut containers = vec![p];

        while let Some(container) = containers.pop() {
            let children = self.tree.children(container).to_vec();
            let mut group: Vec<Index> = Vec::new();
            for child in children {
                let separator = self.tree.is_wml(child, wml::P_PR)
                    || self.tree.is_wml(child, wml::DEL)
                    || self.tree.is_wml(child, wml::INS);
                if self.tree.is_wml(child, wml::INS) {
                    containers.push(child);
                }
                if separator {
                    self.delete_group(&mut group, timestamp, ids)?;
                } else {
                    group.push(child);
                }
            }
            self.delete_group(&mut group, timestamp, ids)?;
        }
        self.mark_paragraph_mark(p, RevisionKind::Deletion, ids)
    }

    fn delete_group(
        &mut self,
        group: &mut Vec<Index>,
        timestamp: DateTime<Utc>,
        ids: &mut RevisionIds,
    ) -> DomainResult<()> {
        if group.is_empty() {
            return Ok(());
        }
        self.revisions.wrap(
            &mut self.tree,
            RevisionKind::Deletion,
            timestamp,
            ids.next_id(),
            group,
        )?;
        group.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // body: p1, p2[sectPr], p3
    fn document() -> (Document, Index, Index, Index, Index) {
        let mut tree = MarkupTree::new();
        let root = tree.insert_node(NodeData::Element(Element::wml(wml::DOCUMENT)), None);
        let body = tree.insert_node(NodeData::Element(Element::wml(wml::BODY)), Some(root));
        let p1 = tree.insert_node(NodeData::Element(Element::wml(wml::P)), Some(body));
        let r = tree.insert_node(NodeData::Element(Element::wml(wml::R)), Some(p1));
        let t = tree.insert_node(NodeData::Element(Element::wml(wml::T)), Some(r));
        tree.insert_node(NodeData::Text("one".into()), Some(t));
        let p2 = tree.insert_node(NodeData::Element(Element::wml(wml::P)), Some(body));
        let ppr = tree.insert_node(NodeData::Element(Element::wml(wml::P_PR)), Some(p2));
        let marker = tree.insert_node(NodeData::Element(Element::wml(wml::SECT_PR)), Some(ppr));
        tree.insert_node(NodeData::Element(Element::wml(wml::R)), Some(p2));
        let p3 = tree.insert_node(NodeData::Element(Element::wml(wml::P)), Some(body));
        (Document::new(tree).unwrap(), p1, p2, p3, marker)
    }

    #[test]
    fn given_tree_without_body_when_wrapping_then_missing_body() {
        let mut tree = MarkupTree::new();
        tree.insert_node(NodeData::Element(Element::wml(wml::DOCUMENT)), None);
        assert!(matches!(Document::new(tree), Err(DomainError::MissingBody)));
    }

    #[test]
    fn given_paragraph_when_reading_text_then_runs_concatenated() {
        let (doc, p1, ..) = document();
        assert_eq!(doc.paragraph_text(Paragraph::new(p1)), "one");
    }

    #[test]
    fn given_content_host_when_inserting_then_marker_moves_to_new_paragraph() {
        let (mut doc, p1, p2, _, marker) = document();
        let section = Section::from_marker(marker);

        let inserted = doc
            .insert_paragraph(section, "new", false, &Formatting::default())
            .unwrap();

        let ppr = doc.tree().find_wml_child(inserted.index(), wml::P_PR).unwrap();
        assert_eq!(doc.tree().parent(marker), Some(ppr));
        assert_eq!(
            doc.section_paragraphs(section).unwrap(),
            vec![Paragraph::new(p1), Paragraph::new(p2), inserted]
        );
    }

    #[test]
    fn given_marker_host_when_removed_untracked_then_becomes_carrier() {
        let (mut doc, _, p2, _, marker) = document();
        doc.remove_paragraph(Paragraph::new(p2), false).unwrap();

        assert!(doc.tree().contains(p2));
        assert!(doc.is_break_carrier(p2));
        assert!(doc.tree().is_attached(marker));
        assert!(!doc.paragraphs().contains(&Paragraph::new(p2)));
    }

    #[test]
    fn given_non_paragraph_when_removing_then_not_a_paragraph() {
        let (mut doc, ..) = document();
        let body = doc.body();
        let err = doc.remove_paragraph(Paragraph::new(body), false).unwrap_err();
        assert_eq!(err, DomainError::NotAParagraph(body));
    }

    #[test]
    fn given_tracked_removal_twice_when_checking_then_single_deletion_mark() {
        let (mut doc, p1, ..) = document();
        doc.remove_paragraph(Paragraph::new(p1), true).unwrap();
        doc.remove_paragraph(Paragraph::new(p1), true).unwrap();

        let ppr = doc.tree().find_wml_child(p1, wml::P_PR).unwrap();
        let rpr = doc.tree().find_wml_child(ppr, wml::R_PR).unwrap();
        let dels = doc
            .tree()
            .children(rpr)
            .iter()
            .filter(|&&c| doc.tree().is_wml(c, wml::DEL))
            .count();
        assert_eq!(dels, 1);
        assert!(doc.is_deleted(Paragraph::new(p1)));
        assert_eq!(doc.paragraph_text(Paragraph::new(p1)), "");
    }

    #[test]
    fn given_marker_without_type_when_reading_break_type_then_next_page() {
        let (doc, .., marker) = document();
        assert_eq!(
            doc.break_type(Section::from_marker(marker)).unwrap(),
            SectionBreakType::NextPage
        );
    }
}
