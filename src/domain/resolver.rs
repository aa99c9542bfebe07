//! Section boundary resolution.
//!
//! Sections are not subtrees: they are runs of body-level siblings closed by
//! a `w:sectPr` that sits either in the properties of the section's last
//! paragraph or, for the final section, directly in the body.

use generational_arena::Index;
use tracing::{debug, instrument};

use crate::domain::arena::MarkupTree;
use crate::domain::entities::{MarkerHost, Section, SectionBoundary};
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::wml;

/// Body-level elements forming one section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionRange {
    /// Closing marker, None for the implicit end-of-body section
    pub marker: Option<Index>,
    /// Where the closing marker lives, None for the implicit section
    pub host: Option<MarkerHost>,
    /// Body children in document order; includes the host paragraph
    pub members: Vec<Index>,
}

/// Locate `w:body`: either the root itself or a child of `w:document`.
pub fn find_body(tree: &MarkupTree) -> DomainResult<Index> {
    let root = tree.root().ok_or(DomainError::MissingBody)?;
    if tree.is_wml(root, wml::BODY) {
        return Ok(root);
    }
    tree.find_wml_child(root, wml::BODY)
        .ok_or(DomainError::MissingBody)
}

pub fn is_marker(tree: &MarkupTree, idx: Index) -> bool {
    tree.is_wml(idx, wml::SECT_PR)
}

/// True if `idx` is, or has below it, a boundary marker.
pub fn contains_marker(tree: &MarkupTree, idx: Index) -> bool {
    tree.descendants(idx).any(|(i, _)| is_marker(tree, i))
}

/// Boundary markers under `body` in document order.
///
/// Does not look inside a marker: `w:sectPrChange` keeps a historical
/// `w:sectPr` that is not a boundary.
pub fn markers(tree: &MarkupTree, body: Index) -> Vec<Index> {
    let mut found = Vec::new();
    let mut stack = vec![body];
    while let Some(current) = stack.pop() {
        if current != body && is_marker(tree, current) {
            found.push(current);
            continue;
        }
        for &child in tree.children(current).iter().rev() {
            stack.push(child);
        }
    }
    found
}

/// Classify the placement of `marker`.
#[instrument(level = "trace", skip(tree))]
pub fn marker_host(tree: &MarkupTree, body: Index, marker: Index) -> DomainResult<MarkerHost> {
    let node = tree
        .get_node(marker)
        .ok_or_else(|| DomainError::structural("boundary marker is no longer part of the tree"))?;
    if !is_marker(tree, marker) {
        return Err(DomainError::structural(format!(
            "{} is not a boundary marker",
            node.data
        )));
    }
    let parent = node
        .parent
        .ok_or_else(|| DomainError::structural("boundary marker is detached (no parent)"))?;

    if parent == body {
        return Ok(MarkerHost::Body);
    }
    if tree.is_wml(parent, wml::P_PR) {
        let paragraph = tree
            .parent(parent)
            .filter(|&p| tree.is_wml(p, wml::P))
            .ok_or_else(|| {
                DomainError::structural("paragraph properties holding a boundary marker have no paragraph")
            })?;
        if tree.parent(paragraph) != Some(body) {
            return Err(DomainError::structural(
                "boundary marker host paragraph is not a direct child of the body",
            ));
        }
        return Ok(MarkerHost::Paragraph(paragraph));
    }

    let parent_name = tree
        .get_node(parent)
        .map(|n| n.data.to_string())
        .unwrap_or_default();
    Err(DomainError::structural(format!(
        "boundary marker parent {} is neither paragraph properties nor the body",
        parent_name
    )))
}

/// Compute the body-level elements of `section`.
///
/// The range starts right after the nearest preceding element that contains a
/// marker (the previous section's closing host) and ends at the host
/// paragraph (inclusive) or at the body-level marker (exclusive).
#[instrument(level = "debug", skip(tree))]
pub fn resolve(tree: &MarkupTree, body: Index, section: Section) -> DomainResult<SectionRange> {
    let siblings = tree.children(body);

    let (marker, host, end) = match section.boundary() {
        SectionBoundary::Marker(marker) => {
            let host = marker_host(tree, body, marker)?;
            let anchor = match host {
                MarkerHost::Paragraph(paragraph) => paragraph,
                MarkerHost::Body => marker,
            };
            let end = siblings
                .iter()
                .position(|&c| c == anchor)
                .ok_or_else(|| DomainError::structural("boundary marker host is not in the body"))?;
            (Some(marker), Some(host), end)
        }
        SectionBoundary::EndOfBody => (None, None, siblings.len()),
    };

    let preceding = &siblings[..end];
    let start = preceding
        .iter()
        .rposition(|&c| contains_marker(tree, c))
        .map_or(0, |previous_host| previous_host + 1);

    let mut members = preceding[start..].to_vec();
    if let Some(MarkerHost::Paragraph(paragraph)) = host {
        members.push(paragraph);
    }
    debug!(
        "resolve: {} members (siblings {}..{})",
        members.len(),
        start,
        end
    );

    Ok(SectionRange {
        marker,
        host,
        members,
    })
}

/// All sections of the body, in document order.
///
/// One section per marker; if the last marker is not body-level (or there are
/// none) an implicit section covers the trailing content.
#[instrument(level = "debug", skip(tree))]
pub fn discover_sections(tree: &MarkupTree, body: Index) -> DomainResult<Vec<Section>> {
    let markers = markers(tree, body);
    let mut sections = Vec::with_capacity(markers.len() + 1);
    let mut closed_by_body = false;

    for (i, &marker) in markers.iter().enumerate() {
        match marker_host(tree, body, marker)? {
            MarkerHost::Body if i + 1 != markers.len() => {
                return Err(DomainError::structural(
                    "body-level boundary marker must be the last marker in document order",
                ));
            }
            MarkerHost::Body => closed_by_body = true,
            MarkerHost::Paragraph(_) => {}
        }
        sections.push(Section::from_marker(marker));
    }
    if !closed_by_body {
        sections.push(Section::implicit());
    }
    debug!("discover_sections: {} sections", sections.len());
    Ok(sections)
}
