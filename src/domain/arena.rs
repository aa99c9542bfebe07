//! Arena-backed markup tree.
//!
//! All nodes of a document part live in one generational arena and are
//! addressed by [`Index`]. A removed node's index stops resolving, so a stale
//! handle is detected on lookup instead of silently aliasing a reused slot.

use generational_arena::{Arena, Index};
use std::fmt;
use tracing::instrument;

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::wml;

/// A single attribute, stored with its qualified name (e.g. `w:val`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Name without its namespace prefix.
    pub fn local_name(&self) -> &str {
        self.name
            .split_once(':')
            .map(|(_, local)| local)
            .unwrap_or(&self.name)
    }
}

/// Element payload: qualified name parts plus ordered attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Namespace prefix as written in the source, e.g. `w`
    pub prefix: Option<String>,
    /// Local name, e.g. `p`
    pub local: String,
    /// Resolved namespace URI
    pub namespace: Option<String>,
    /// Attributes in document order (namespace declarations included)
    pub attributes: Vec<Attribute>,
}

impl Element {
    pub fn new(prefix: Option<&str>, local: &str, namespace: Option<&str>) -> Self {
        Self {
            prefix: prefix.map(str::to_string),
            local: local.to_string(),
            namespace: namespace.map(str::to_string),
            attributes: Vec::new(),
        }
    }

    /// WordprocessingML element bound to the conventional `w` prefix.
    pub fn wml(local: &str) -> Self {
        Self::new(Some(wml::PREFIX), local, Some(wml::WML_NS))
    }

    pub fn with_attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn qualified_name(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("{}:{}", prefix, self.local),
            None => self.local.clone(),
        }
    }

    pub fn is(&self, namespace: &str, local: &str) -> bool {
        self.local == local && self.namespace.as_deref() == Some(namespace)
    }

    pub fn is_wml(&self, local: &str) -> bool {
        self.is(wml::WML_NS, local)
    }

    /// Local name if this is a WordprocessingML element.
    pub fn wml_local(&self) -> Option<&str> {
        (self.namespace.as_deref() == Some(wml::WML_NS)).then_some(self.local.as_str())
    }

    /// Attribute value looked up by local name (`val` matches `w:val`).
    pub fn attr(&self, local: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.local_name() == local && !a.name.starts_with("xmlns"))
            .map(|a| a.value.as_str())
    }

    /// Set an attribute by qualified name, replacing an existing value.
    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attributes.iter_mut().find(|a| a.name == name) {
            Some(existing) => existing.value = value,
            None => self.attributes.push(Attribute::new(name, value)),
        }
    }
}

/// Data payload for tree nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    Element(Element),
    Text(String),
    /// `<!-- ... -->`, kept so a round trip does not lose it
    Comment(String),
    /// `<?target value?>`
    ProcessingInstruction {
        target: String,
        value: Option<String>,
    },
}

impl fmt::Display for NodeData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeData::Element(element) => write!(f, "<{}>", element.qualified_name()),
            NodeData::Text(text) => write!(f, "{:?}", text),
            NodeData::Comment(text) => write!(f, "<!--{}-->", text),
            NodeData::ProcessingInstruction { target, .. } => write!(f, "<?{}?>", target),
        }
    }
}

/// Tree node in the arena.
#[derive(Debug)]
pub struct TreeNode {
    /// Element or text payload
    pub data: NodeData,
    /// Index of parent node in the arena, None for the root and detached nodes
    pub parent: Option<Index>,
    /// Indices of child nodes in document order
    pub children: Vec<Index>,
}

/// Arena-based markup tree for one document part.
#[derive(Debug)]
pub struct MarkupTree {
    /// Arena storage for all tree nodes
    arena: Arena<TreeNode>,
    /// Index of the root element, None for empty trees
    root: Option<Index>,
}

impl Default for MarkupTree {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkupTree {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            root: None,
        }
    }

    /// Insert a node as the last child of `parent`; without a parent the node
    /// becomes the root.
    #[instrument(level = "trace", skip(self, data))]
    pub fn insert_node(&mut self, data: NodeData, parent: Option<Index>) -> Index {
        let node = TreeNode {
            data,
            parent,
            children: Vec::new(),
        };
        let node_idx = self.arena.insert(node);

        if let Some(parent_idx) = parent {
            if let Some(parent) = self.arena.get_mut(parent_idx) {
                parent.children.push(node_idx);
            }
        } else {
            self.root = Some(node_idx);
        }

        node_idx
    }

    /// Allocate a node that is not linked into the tree yet.
    pub fn create_detached(&mut self, data: NodeData) -> Index {
        self.arena.insert(TreeNode {
            data,
            parent: None,
            children: Vec::new(),
        })
    }

    /// Allocate a detached element.
    pub fn create_element(&mut self, element: Element) -> Index {
        self.create_detached(NodeData::Element(element))
    }

    pub fn get_node(&self, idx: Index) -> Option<&TreeNode> {
        self.arena.get(idx)
    }

    pub fn get_node_mut(&mut self, idx: Index) -> Option<&mut TreeNode> {
        self.arena.get_mut(idx)
    }

    pub fn root(&self) -> Option<Index> {
        self.root
    }

    pub fn contains(&self, idx: Index) -> bool {
        self.arena.contains(idx)
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn element(&self, idx: Index) -> Option<&Element> {
        match self.get_node(idx).map(|n| &n.data) {
            Some(NodeData::Element(element)) => Some(element),
            _ => None,
        }
    }

    pub fn element_mut(&mut self, idx: Index) -> Option<&mut Element> {
        match self.get_node_mut(idx).map(|n| &mut n.data) {
            Some(NodeData::Element(element)) => Some(element),
            _ => None,
        }
    }

    pub fn parent(&self, idx: Index) -> Option<Index> {
        self.get_node(idx).and_then(|n| n.parent)
    }

    /// Children of a node; empty for unknown indices.
    pub fn children(&self, idx: Index) -> &[Index] {
        self.get_node(idx)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    /// Position of a node among its parent's children.
    pub fn position(&self, idx: Index) -> Option<usize> {
        let parent = self.parent(idx)?;
        self.children(parent).iter().position(|&c| c == idx)
    }

    pub fn is_wml(&self, idx: Index, local: &str) -> bool {
        self.element(idx).is_some_and(|e| e.is_wml(local))
    }

    /// First child that is the WordprocessingML element `local`.
    pub fn find_wml_child(&self, idx: Index, local: &str) -> Option<Index> {
        self.children(idx)
            .iter()
            .copied()
            .find(|&c| self.is_wml(c, local))
    }

    /// True if the node is reachable from the root by parent links.
    pub fn is_attached(&self, idx: Index) -> bool {
        let mut current = idx;
        loop {
            if Some(current) == self.root {
                return true;
            }
            match self.parent(current) {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    fn node_exists(&self, idx: Index) -> DomainResult<()> {
        if self.contains(idx) {
            Ok(())
        } else {
            Err(DomainError::NodeNotFound(idx))
        }
    }

    /// `ancestor` is `node` or one of its ancestors.
    fn is_ancestor_or_self(&self, ancestor: Index, node: Index) -> bool {
        let mut current = Some(node);
        while let Some(idx) = current {
            if idx == ancestor {
                return true;
            }
            current = self.parent(idx);
        }
        false
    }

    /// Unlink a node from its parent. The subtree stays allocated.
    #[instrument(level = "trace", skip(self))]
    pub fn detach(&mut self, idx: Index) -> DomainResult<()> {
        self.node_exists(idx)?;
        if let Some(parent_idx) = self.parent(idx) {
            if let Some(parent) = self.arena.get_mut(parent_idx) {
                parent.children.retain(|&c| c != idx);
            }
        }
        if let Some(node) = self.arena.get_mut(idx) {
            node.parent = None;
        }
        if self.root == Some(idx) {
            self.root = None;
        }
        Ok(())
    }

    /// Move `child` (detaching it first if needed) to the end of `parent`.
    #[instrument(level = "trace", skip(self))]
    pub fn append_child(&mut self, parent: Index, child: Index) -> DomainResult<()> {
        self.node_exists(parent)?;
        self.node_exists(child)?;
        if self.is_ancestor_or_self(child, parent) {
            return Err(DomainError::InvalidMove {
                reason: "a node cannot become a child of its own subtree".to_string(),
            });
        }
        self.detach(child)?;
        if let Some(node) = self.arena.get_mut(child) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.arena.get_mut(parent) {
            node.children.push(child);
        }
        Ok(())
    }

    /// Move `node` to sit at `offset` relative to `reference` among its siblings.
    fn insert_sibling(&mut self, reference: Index, node: Index, offset: usize) -> DomainResult<()> {
        self.node_exists(reference)?;
        self.node_exists(node)?;
        if reference == node {
            return Err(DomainError::InvalidMove {
                reason: "a node cannot be inserted next to itself".to_string(),
            });
        }
        let parent = self.parent(reference).ok_or_else(|| DomainError::InvalidMove {
            reason: "reference node has no parent".to_string(),
        })?;
        if self.is_ancestor_or_self(node, parent) {
            return Err(DomainError::InvalidMove {
                reason: "a node cannot become a sibling inside its own subtree".to_string(),
            });
        }
        self.detach(node)?;
        let position = self
            .children(parent)
            .iter()
            .position(|&c| c == reference)
            .ok_or(DomainError::NodeNotFound(reference))?;
        if let Some(parent_node) = self.arena.get_mut(parent) {
            parent_node.children.insert(position + offset, node);
        }
        if let Some(moved) = self.arena.get_mut(node) {
            moved.parent = Some(parent);
        }
        Ok(())
    }

    /// Move `node` directly before `reference`.
    #[instrument(level = "trace", skip(self))]
    pub fn insert_before(&mut self, reference: Index, node: Index) -> DomainResult<()> {
        self.insert_sibling(reference, node, 0)
    }

    /// Move `node` directly after `reference`.
    #[instrument(level = "trace", skip(self))]
    pub fn insert_after(&mut self, reference: Index, node: Index) -> DomainResult<()> {
        self.insert_sibling(reference, node, 1)
    }

    /// Detach a node and free it together with all of its descendants.
    #[instrument(level = "trace", skip(self))]
    pub fn remove_subtree(&mut self, idx: Index) -> DomainResult<()> {
        self.detach(idx)?;
        let doomed: Vec<Index> = self.iter_postorder_from(idx).map(|(i, _)| i).collect();
        for node in doomed {
            self.arena.remove(node);
        }
        Ok(())
    }

    /// Copy a subtree; the copy is detached.
    #[instrument(level = "trace", skip(self))]
    pub fn deep_clone(&mut self, idx: Index) -> DomainResult<Index> {
        let data = self
            .get_node(idx)
            .map(|n| n.data.clone())
            .ok_or(DomainError::NodeNotFound(idx))?;
        let copy_root = self.create_detached(data);
        let mut stack = vec![(idx, copy_root)];

        while let Some((original, copy)) = stack.pop() {
            let children = self.children(original).to_vec();
            for child in children {
                let Some(data) = self.get_node(child).map(|n| n.data.clone()) else {
                    continue;
                };
                let child_copy = self.insert_node(data, Some(copy));
                stack.push((child, child_copy));
            }
        }
        Ok(copy_root)
    }

    /// Every allocated node, attached or not, in arena order.
    pub fn nodes(&self) -> impl Iterator<Item = (Index, &TreeNode)> {
        self.arena.iter()
    }

    /// Pre-order traversal of the whole tree.
    pub fn iter(&self) -> TreeIterator<'_> {
        TreeIterator::new(self, self.root)
    }

    /// Pre-order traversal of `idx` and its descendants.
    pub fn descendants(&self, idx: Index) -> TreeIterator<'_> {
        TreeIterator::new(self, Some(idx))
    }

    pub fn iter_postorder(&self) -> PostOrderIterator<'_> {
        PostOrderIterator::new(self, self.root)
    }

    pub fn iter_postorder_from(&self, idx: Index) -> PostOrderIterator<'_> {
        PostOrderIterator::new(self, Some(idx))
    }
}

pub struct TreeIterator<'a> {
    tree: &'a MarkupTree,
    stack: Vec<Index>,
}

impl<'a> TreeIterator<'a> {
    fn new(tree: &'a MarkupTree, start: Option<Index>) -> Self {
        Self {
            tree,
            stack: start.into_iter().collect(),
        }
    }
}

impl<'a> Iterator for TreeIterator<'a> {
    type Item = (Index, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current_idx) = self.stack.pop() {
            if let Some(node) = self.tree.get_node(current_idx) {
                // Push children in reverse order for left-to-right traversal
                for &child in node.children.iter().rev() {
                    self.stack.push(child);
                }
                return Some((current_idx, node));
            }
        }
        None
    }
}

pub struct PostOrderIterator<'a> {
    tree: &'a MarkupTree,
    stack: Vec<(Index, bool)>,
}

impl<'a> PostOrderIterator<'a> {
    fn new(tree: &'a MarkupTree, start: Option<Index>) -> Self {
        Self {
            tree,
            stack: start.map(|idx| (idx, false)).into_iter().collect(),
        }
    }
}

impl<'a> Iterator for PostOrderIterator<'a> {
    type Item = (Index, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current_idx, visited)) = self.stack.pop() {
            if let Some(node) = self.tree.get_node(current_idx) {
                if !visited {
                    self.stack.push((current_idx, true));
                    for &child in node.children.iter().rev() {
                        self.stack.push((child, false));
                    }
                } else {
                    return Some((current_idx, node));
                }
            }
        }
        None
    }
}
