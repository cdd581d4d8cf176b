//! DOM Node Operations
//!
//! The validated state-transition layer: pre-insertion checks, adoption,
//! insert/append/replace/remove and "replace all". Every public verb checks
//! all of its preconditions before touching the tree, so an `Err` means
//! nothing changed.
//!
//! Also hosts the `ChildNode` (`before`, `after`, `replace_with`, `remove`)
//! and `ParentNode` (`prepend`, `append`, `replace_children`) capabilities.

use crate::error::{DomError, DomResult};
use crate::node::NodeType;
use crate::tree::DomTree;
use crate::NodeId;

/// Argument to the `ChildNode`/`ParentNode` methods: a node, or a string
/// that becomes a new Text node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeOrText {
    Node(NodeId),
    Text(String),
}

impl From<NodeId> for NodeOrText {
    fn from(id: NodeId) -> Self {
        Self::Node(id)
    }
}

impl From<&str> for NodeOrText {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl DomTree {
    // --- Public verbs ---

    /// `appendChild(node)`
    pub fn append_child(&mut self, parent: NodeId, node: NodeId) -> DomResult<NodeId> {
        self.pre_insert(node, parent, None)
    }

    /// `insertBefore(node, child)`; `None` appends
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        node: NodeId,
        child: Option<NodeId>,
    ) -> DomResult<NodeId> {
        self.pre_insert(node, parent, child)
    }

    /// `replaceChild(node, child)`: returns the replaced `child`
    pub fn replace_child(&mut self, parent: NodeId, node: NodeId, child: NodeId) -> DomResult<NodeId> {
        self.replace(child, node, parent)
    }

    /// `removeChild(child)`
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<NodeId> {
        self.pre_remove(child, parent)
    }

    /// `Document.adoptNode(node)`
    pub fn adopt_node(&mut self, document: NodeId, node: NodeId) -> DomResult<NodeId> {
        if self.node_type(node) == NodeType::Document {
            return Err(DomError::NotSupported("documents cannot be adopted"));
        }
        let document = self.node_document(document);
        self.adopt(node, document);
        Ok(node)
    }

    // --- Engine ---

    /// Checks run before every insertion, in DOM order
    pub(crate) fn ensure_pre_insertion_validity(
        &self,
        node: NodeId,
        parent: NodeId,
        child: Option<NodeId>,
    ) -> DomResult<()> {
        self.check_insertion_shape(node, parent)?;

        if let Some(child) = child {
            if self.parent(child) != Some(parent) {
                return Err(DomError::NotFound("reference child is not a child of parent"));
            }
        }

        if self.node_type(parent) != NodeType::Document {
            return Ok(());
        }

        match self.node_type(node) {
            NodeType::DocumentFragment => {
                let elements = self.child_element_count(node);
                if elements > 1 {
                    return Err(DomError::HierarchyRequest("document can have only one element child"));
                }
                if self.children(node).any(|c| self.node(c).is_text()) {
                    return Err(DomError::HierarchyRequest("document cannot have text children"));
                }
                if elements == 1
                    && (self.has_child_of_type(parent, NodeType::Element)
                        || self.element_blocked_by_doctype(child))
                {
                    return Err(DomError::HierarchyRequest("document can have only one element child"));
                }
            }
            NodeType::Element => {
                if self.has_child_of_type(parent, NodeType::Element) {
                    return Err(DomError::HierarchyRequest("document already has an element child"));
                }
                if self.element_blocked_by_doctype(child) {
                    return Err(DomError::HierarchyRequest("element cannot precede the doctype"));
                }
            }
            NodeType::DocumentType => {
                if self.has_child_of_type(parent, NodeType::DocumentType) {
                    return Err(DomError::HierarchyRequest("document already has a doctype"));
                }
                let element_before = match child {
                    Some(child) => self.preceding_siblings(child).any(|s| self.node(s).is_element()),
                    None => self.has_child_of_type(parent, NodeType::Element),
                };
                if element_before {
                    return Err(DomError::HierarchyRequest("doctype must precede the document element"));
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Parent kind, cycle, node kind and text/doctype placement checks
    /// shared by insertion and replacement
    fn check_insertion_shape(&self, node: NodeId, parent: NodeId) -> DomResult<()> {
        let parent_type = self.node_type(parent);
        if !parent_type.is_parent_kind() {
            return Err(DomError::HierarchyRequest("parent cannot have children"));
        }
        if self.is_inclusive_ancestor(node, parent) {
            return Err(DomError::HierarchyRequest("node is an inclusive ancestor of parent"));
        }
        let node_type = self.node_type(node);
        if matches!(node_type, NodeType::Document | NodeType::Attribute) {
            return Err(DomError::HierarchyRequest("node cannot be a child"));
        }
        if self.node(node).is_text() && parent_type == NodeType::Document {
            return Err(DomError::HierarchyRequest("document cannot have text children"));
        }
        if node_type == NodeType::DocumentType && parent_type != NodeType::Document {
            return Err(DomError::HierarchyRequest("doctype can only be a child of a document"));
        }
        Ok(())
    }

    /// Would an element inserted before `child` land ahead of a doctype?
    fn element_blocked_by_doctype(&self, child: Option<NodeId>) -> bool {
        child.is_some_and(|child| {
            self.node_type(child) == NodeType::DocumentType
                || self
                    .following_siblings(child)
                    .any(|s| self.node_type(s) == NodeType::DocumentType)
        })
    }

    fn preceding_siblings(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.prev_sibling(id), |&s| self.prev_sibling(s))
    }

    fn following_siblings(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.next_sibling(id), |&s| self.next_sibling(s))
    }

    pub(crate) fn pre_insert(
        &mut self,
        node: NodeId,
        parent: NodeId,
        child: Option<NodeId>,
    ) -> DomResult<NodeId> {
        self.ensure_pre_insertion_validity(node, parent, child)?;

        let reference = if child == Some(node) {
            self.next_sibling(node)
        } else {
            child
        };

        let document = self.node_document(parent);
        self.adopt(node, document);
        self.insert_node(node, parent, reference);
        Ok(node)
    }

    /// Splice `node` (or a fragment's children) into `parent` before `child`.
    /// Cannot fail; callers have validated and adopted.
    pub(crate) fn insert_node(&mut self, node: NodeId, parent: NodeId, child: Option<NodeId>) {
        let nodes: Vec<NodeId> = if self.node_type(node) == NodeType::DocumentFragment {
            self.children(node).collect()
        } else {
            vec![node]
        };
        if nodes.is_empty() {
            return;
        }

        if self.node_type(node) == NodeType::DocumentFragment {
            for &n in &nodes {
                self.remove_node(n);
            }
        }

        if let Some(child) = child {
            self.ranges_after_insert(parent, child, nodes.len());
        }

        tracing::trace!("insert {} node(s) into {:?} before {:?}", nodes.len(), parent, child);
        for n in nodes {
            self.link(n, parent, child);
        }
    }

    /// Move `node` into `document`: detach it, then rewrite the owner
    /// document of its inclusive descendants and their attributes.
    pub(crate) fn adopt(&mut self, node: NodeId, document: NodeId) {
        let old_document = self.node_document(node);

        if self.parent(node).is_some() {
            self.remove_node(node);
        }

        if old_document == document {
            return;
        }

        if let Some(owner) = self.node(node).as_attr().and_then(|a| a.owner_element()) {
            self.detach_attribute(owner, node);
        }

        tracing::debug!("Adopting {:?} from {:?} into {:?}", node, old_document, document);
        let subtree: Vec<NodeId> = std::iter::once(node).chain(self.descendants(node)).collect();
        for id in subtree {
            self.node_mut(id).owner_document = Some(document);
            let attrs = self
                .node(id)
                .as_element()
                .map(|e| e.attributes.clone())
                .unwrap_or_default();
            for attr in attrs {
                self.node_mut(attr).owner_document = Some(document);
            }
        }
    }

    /// `replace a child`: validity is checked as if `child` were already gone
    pub(crate) fn replace(&mut self, child: NodeId, node: NodeId, parent: NodeId) -> DomResult<NodeId> {
        self.check_insertion_shape(node, parent)?;

        if self.parent(child) != Some(parent) {
            return Err(DomError::NotFound("child is not a child of parent"));
        }

        if self.node_type(parent) == NodeType::Document {
            let other_element = self
                .children(parent)
                .any(|c| c != child && self.node(c).is_element());
            let doctype_after = self
                .following_siblings(child)
                .any(|s| self.node_type(s) == NodeType::DocumentType);

            match self.node_type(node) {
                NodeType::DocumentFragment => {
                    let elements = self.child_element_count(node);
                    if elements > 1 {
                        return Err(DomError::HierarchyRequest("document can have only one element child"));
                    }
                    if self.children(node).any(|c| self.node(c).is_text()) {
                        return Err(DomError::HierarchyRequest("document cannot have text children"));
                    }
                    if elements == 1 && (other_element || doctype_after) {
                        return Err(DomError::HierarchyRequest("document can have only one element child"));
                    }
                }
                NodeType::Element => {
                    if other_element || doctype_after {
                        return Err(DomError::HierarchyRequest("document can have only one element child"));
                    }
                }
                NodeType::DocumentType => {
                    let other_doctype = self
                        .children(parent)
                        .any(|c| c != child && self.node_type(c) == NodeType::DocumentType);
                    let element_before = self.preceding_siblings(child).any(|s| self.node(s).is_element());
                    if other_doctype || element_before {
                        return Err(DomError::HierarchyRequest("doctype must precede the document element"));
                    }
                }
                _ => {}
            }
        }

        let mut reference = self.next_sibling(child);
        if reference == Some(node) {
            reference = self.next_sibling(node);
        }

        let document = self.node_document(parent);
        self.adopt(node, document);

        if self.parent(child).is_some() {
            self.remove_node(child);
        }
        self.insert_node(node, parent, reference);
        Ok(child)
    }

    /// `replace all`: remove every child of `parent`, then insert `node`
    pub(crate) fn replace_all(&mut self, node: Option<NodeId>, parent: NodeId) {
        if let Some(node) = node {
            let document = self.node_document(parent);
            self.adopt(node, document);
        }
        let children: Vec<NodeId> = self.children(parent).collect();
        for child in children {
            self.remove_node(child);
        }
        if let Some(node) = node {
            self.insert_node(node, parent, None);
        }
    }

    pub(crate) fn pre_remove(&mut self, child: NodeId, parent: NodeId) -> DomResult<NodeId> {
        if self.parent(child) != Some(parent) {
            return Err(DomError::NotFound("node is not a child of parent"));
        }
        self.remove_node(child);
        Ok(child)
    }

    /// Unsplice `node` from its parent after updating live ranges
    pub(crate) fn remove_node(&mut self, node: NodeId) {
        let Some(parent) = self.parent(node) else {
            return;
        };
        self.ranges_before_remove(node, parent);
        tracing::trace!("remove {:?} from {:?}", node, parent);
        self.unlink(node);
    }

    // --- ChildNode / ParentNode ---

    /// Turn a `NodeOrText` list into one node, wrapping several in a fragment
    fn convert_nodes_into_node(&mut self, document: NodeId, nodes: Vec<NodeOrText>) -> DomResult<NodeId> {
        let mut ids: Vec<NodeId> = nodes
            .into_iter()
            .map(|n| match n {
                NodeOrText::Node(id) => id,
                NodeOrText::Text(text) => self.create_text_node(document, &text),
            })
            .collect();

        if ids.len() == 1 {
            return Ok(ids.remove(0));
        }
        let fragment = self.create_document_fragment(document);
        for id in ids {
            self.append_child(fragment, id)?;
        }
        Ok(fragment)
    }

    /// Nodes that conversion would gather into the temporary fragment,
    /// with fragment arguments expanded to their children
    fn moved_nodes(&self, nodes: &[NodeOrText]) -> Vec<NodeId> {
        let mut moved = Vec::new();
        for n in nodes {
            let NodeOrText::Node(id) = n else {
                continue;
            };
            let ids: Vec<NodeId> = if self.node_type(*id) == NodeType::DocumentFragment {
                self.children(*id).collect()
            } else {
                vec![*id]
            };
            for id in ids {
                if !moved.contains(&id) {
                    moved.push(id);
                }
            }
        }
        moved
    }

    /// Check a multi-argument call against the tree as it will look once
    /// the arguments sit in a fragment. A rejected call must not move any
    /// argument out of its old parent.
    ///
    /// `reference` is the insertion point before conversion. `replacing` is
    /// the child a `replace_with` would swap out.
    fn ensure_conversion_validity(
        &self,
        parent: NodeId,
        nodes: &[NodeOrText],
        reference: Option<NodeId>,
        replacing: Option<NodeId>,
    ) -> DomResult<()> {
        if nodes.len() < 2 {
            return Ok(());
        }
        for n in nodes {
            if let NodeOrText::Node(id) = n {
                if matches!(
                    self.node_type(*id),
                    NodeType::Document | NodeType::Attribute | NodeType::DocumentType
                ) {
                    return Err(DomError::HierarchyRequest("node cannot be a fragment child"));
                }
            }
        }

        let moved = self.moved_nodes(nodes);
        if moved.iter().any(|&m| self.is_inclusive_ancestor(m, parent)) {
            return Err(DomError::HierarchyRequest("node is an inclusive ancestor of parent"));
        }
        if self.node_type(parent) != NodeType::Document {
            return Ok(());
        }

        let has_text = nodes.iter().any(|n| matches!(n, NodeOrText::Text(_)))
            || moved.iter().any(|&m| self.node(m).is_text());
        if has_text {
            return Err(DomError::HierarchyRequest("document cannot have text children"));
        }
        let elements = moved.iter().filter(|&&m| self.node(m).is_element()).count();
        if elements > 1 {
            return Err(DomError::HierarchyRequest("document can have only one element child"));
        }
        if elements == 0 {
            return Ok(());
        }

        let replacing = replacing.filter(|r| !moved.contains(r));
        let other_element = self
            .children(parent)
            .any(|c| Some(c) != replacing && !moved.contains(&c) && self.node(c).is_element());
        let doctype_after = match replacing {
            Some(child) => self
                .following_siblings(child)
                .any(|s| self.node_type(s) == NodeType::DocumentType),
            None => {
                let reference = std::iter::successors(reference, |&s| self.next_sibling(s))
                    .find(|s| !moved.contains(s));
                self.element_blocked_by_doctype(reference)
            }
        };
        if other_element || doctype_after {
            return Err(DomError::HierarchyRequest("document can have only one element child"));
        }
        Ok(())
    }

    /// Sibling right after `prev`, or the first child of `parent` when `prev` is `None`
    fn child_after(&self, parent: NodeId, prev: Option<NodeId>) -> Option<NodeId> {
        match prev {
            Some(prev) => self.next_sibling(prev),
            None => self.first_child(parent),
        }
    }

    fn check_child_node(&self, id: NodeId) -> DomResult<()> {
        match self.node_type(id) {
            NodeType::DocumentType | NodeType::Element => Ok(()),
            kind if kind.is_character_data() => Ok(()),
            _ => Err(DomError::NotSupported("node does not implement ChildNode")),
        }
    }

    fn check_parent_node(&self, id: NodeId) -> DomResult<()> {
        if self.node_type(id).is_parent_kind() {
            Ok(())
        } else {
            Err(DomError::NotSupported("node does not implement ParentNode"))
        }
    }

    fn contains_node(nodes: &[NodeOrText], id: NodeId) -> bool {
        nodes.iter().any(|n| *n == NodeOrText::Node(id))
    }

    /// `ChildNode.before(...nodes)`
    pub fn before(&mut self, id: NodeId, nodes: Vec<NodeOrText>) -> DomResult<()> {
        self.check_child_node(id)?;
        let Some(parent) = self.parent(id) else {
            return Ok(());
        };
        let viable_prev = self
            .preceding_siblings(id)
            .find(|&s| !Self::contains_node(&nodes, s));

        let reference = self.child_after(parent, viable_prev);
        self.ensure_conversion_validity(parent, &nodes, reference, None)?;

        let document = self.node_document(id);
        let node = self.convert_nodes_into_node(document, nodes)?;
        let reference = self.child_after(parent, viable_prev);
        self.pre_insert(node, parent, reference)?;
        Ok(())
    }

    /// `ChildNode.after(...nodes)`
    pub fn after(&mut self, id: NodeId, nodes: Vec<NodeOrText>) -> DomResult<()> {
        self.check_child_node(id)?;
        let Some(parent) = self.parent(id) else {
            return Ok(());
        };
        let viable_next = self
            .following_siblings(id)
            .find(|&s| !Self::contains_node(&nodes, s));
        self.ensure_conversion_validity(parent, &nodes, viable_next, None)?;

        let document = self.node_document(id);
        let node = self.convert_nodes_into_node(document, nodes)?;
        self.pre_insert(node, parent, viable_next)?;
        Ok(())
    }

    /// `ChildNode.replaceWith(...nodes)`
    pub fn replace_with(&mut self, id: NodeId, nodes: Vec<NodeOrText>) -> DomResult<()> {
        self.check_child_node(id)?;
        let Some(parent) = self.parent(id) else {
            return Ok(());
        };
        let viable_next = self
            .following_siblings(id)
            .find(|&s| !Self::contains_node(&nodes, s));
        self.ensure_conversion_validity(parent, &nodes, viable_next, Some(id))?;

        let document = self.node_document(id);
        let node = self.convert_nodes_into_node(document, nodes)?;
        if self.parent(id) == Some(parent) {
            self.replace(id, node, parent)?;
        } else {
            self.pre_insert(node, parent, viable_next)?;
        }
        Ok(())
    }

    /// `ChildNode.remove()`
    pub fn remove(&mut self, id: NodeId) -> DomResult<()> {
        self.check_child_node(id)?;
        self.remove_node(id);
        Ok(())
    }

    /// `ParentNode.prepend(...nodes)`
    pub fn prepend(&mut self, parent: NodeId, nodes: Vec<NodeOrText>) -> DomResult<()> {
        self.check_parent_node(parent)?;
        let first = self.first_child(parent);
        self.ensure_conversion_validity(parent, &nodes, first, None)?;

        let document = self.node_document(parent);
        let node = self.convert_nodes_into_node(document, nodes)?;
        let first = self.first_child(parent);
        self.pre_insert(node, parent, first)?;
        Ok(())
    }

    /// `ParentNode.append(...nodes)`
    pub fn append(&mut self, parent: NodeId, nodes: Vec<NodeOrText>) -> DomResult<()> {
        self.check_parent_node(parent)?;
        self.ensure_conversion_validity(parent, &nodes, None, None)?;
        let document = self.node_document(parent);
        let node = self.convert_nodes_into_node(document, nodes)?;
        self.pre_insert(node, parent, None)?;
        Ok(())
    }

    /// `ParentNode.replaceChildren(...nodes)`
    pub fn replace_children(&mut self, parent: NodeId, nodes: Vec<NodeOrText>) -> DomResult<()> {
        self.check_parent_node(parent)?;
        self.ensure_conversion_validity(parent, &nodes, None, None)?;
        let document = self.node_document(parent);
        let node = self.convert_nodes_into_node(document, nodes)?;
        self.ensure_pre_insertion_validity(node, parent, None)?;
        self.replace_all(Some(node), parent);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(tree: &DomTree, parent: NodeId) -> Vec<String> {
        tree.children(parent).map(|c| tree.node_name(c)).collect()
    }

    fn setup() -> (DomTree, NodeId, NodeId) {
        let mut tree = DomTree::new();
        let doc = tree.create_document();
        let root = tree.create_element(doc, "root").unwrap();
        tree.append_child(doc, root).unwrap();
        (tree, doc, root)
    }

    #[test]
    fn test_append_and_insert_before() {
        let (mut tree, doc, root) = setup();
        let a = tree.create_element(doc, "a").unwrap();
        let b = tree.create_element(doc, "b").unwrap();
        let c = tree.create_element(doc, "c").unwrap();
        tree.append_child(root, a).unwrap();
        tree.append_child(root, c).unwrap();
        tree.insert_before(root, b, Some(c)).unwrap();
        assert_eq!(names(&tree, root), ["a", "b", "c"]);
    }

    #[test]
    fn test_insert_before_self_keeps_position() {
        let (mut tree, doc, root) = setup();
        let a = tree.create_element(doc, "a").unwrap();
        let b = tree.create_element(doc, "b").unwrap();
        tree.append_child(root, a).unwrap();
        tree.append_child(root, b).unwrap();
        tree.insert_before(root, a, Some(a)).unwrap();
        assert_eq!(names(&tree, root), ["a", "b"]);
    }

    #[test]
    fn test_append_moves_existing_child() {
        let (mut tree, doc, root) = setup();
        let a = tree.create_element(doc, "a").unwrap();
        let b = tree.create_element(doc, "b").unwrap();
        tree.append_child(root, a).unwrap();
        tree.append_child(root, b).unwrap();
        tree.append_child(root, a).unwrap();
        assert_eq!(names(&tree, root), ["b", "a"]);
        assert_eq!(tree.child_count(root), 2);
    }

    #[test]
    fn test_cycle_rejected() {
        let (mut tree, doc, root) = setup();
        let child = tree.create_element(doc, "child").unwrap();
        tree.append_child(root, child).unwrap();
        assert_eq!(
            tree.append_child(child, root).unwrap_err().name(),
            "HierarchyRequestError"
        );
        assert_eq!(
            tree.append_child(child, child).unwrap_err().name(),
            "HierarchyRequestError"
        );
    }

    #[test]
    fn test_reference_child_must_belong() {
        let (mut tree, doc, root) = setup();
        let stray = tree.create_element(doc, "stray").unwrap();
        let node = tree.create_element(doc, "node").unwrap();
        assert_eq!(
            tree.insert_before(root, node, Some(stray)),
            Err(DomError::NotFound("reference child is not a child of parent"))
        );
    }

    #[test]
    fn test_leaf_parent_rejected() {
        let (mut tree, doc, _) = setup();
        let text = tree.create_text_node(doc, "t");
        let el = tree.create_element(doc, "e").unwrap();
        assert!(tree.append_child(text, el).is_err());
        let attr = tree.create_attribute(doc, "a").unwrap();
        assert!(tree.append_child(el, attr).is_err());
    }

    #[test]
    fn test_fragment_is_unwrapped_and_emptied() {
        let (mut tree, doc, root) = setup();
        let frag = tree.create_document_fragment(doc);
        for name in ["x", "y", "z"] {
            let el = tree.create_element(doc, name).unwrap();
            tree.append_child(frag, el).unwrap();
        }
        tree.append_child(root, frag).unwrap();
        assert_eq!(names(&tree, root), ["x", "y", "z"]);
        assert_eq!(tree.child_count(frag), 0);
        assert!(tree.parent(frag).is_none());
    }

    #[test]
    fn test_document_arity() {
        let (mut tree, doc, root) = setup();
        let second = tree.create_element(doc, "second").unwrap();
        assert!(tree.append_child(doc, second).is_err());

        let doctype = tree.implementation(doc).create_document_type(&mut tree, "root", "", "").unwrap();
        // doctype may not follow the document element
        assert!(tree.append_child(doc, doctype).is_err());
        tree.insert_before(doc, doctype, Some(root)).unwrap();

        let other = tree.implementation(doc).create_document_type(&mut tree, "x", "", "").unwrap();
        assert!(tree.insert_before(doc, other, Some(doctype)).is_err());
        assert_eq!(tree.child_count(doc), 2);
    }

    #[test]
    fn test_element_cannot_precede_doctype() {
        let mut tree = DomTree::new();
        let doc = tree.create_document();
        let doctype = tree.implementation(doc).create_document_type(&mut tree, "r", "", "").unwrap();
        tree.append_child(doc, doctype).unwrap();
        let el = tree.create_element(doc, "r").unwrap();
        assert!(tree.insert_before(doc, el, Some(doctype)).is_err());
        tree.append_child(doc, el).unwrap();
    }

    #[test]
    fn test_replace_child() {
        let (mut tree, doc, root) = setup();
        let a = tree.create_element(doc, "a").unwrap();
        let b = tree.create_element(doc, "b").unwrap();
        let c = tree.create_element(doc, "c").unwrap();
        tree.append_child(root, a).unwrap();
        tree.append_child(root, b).unwrap();

        let old = tree.replace_child(root, c, a).unwrap();
        assert_eq!(old, a);
        assert!(tree.parent(a).is_none());
        assert_eq!(names(&tree, root), ["c", "b"]);

        // replacing with the next sibling
        tree.replace_child(root, b, c).unwrap();
        assert_eq!(names(&tree, root), ["b"]);
    }

    #[test]
    fn test_replace_document_element() {
        let (mut tree, doc, root) = setup();
        let other = tree.create_element(doc, "other").unwrap();
        tree.replace_child(doc, other, root).unwrap();
        assert_eq!(tree.document_element(doc), Some(other));
    }

    #[test]
    fn test_remove_child_not_found() {
        let (mut tree, doc, root) = setup();
        let stray = tree.create_element(doc, "stray").unwrap();
        assert_eq!(tree.remove_child(root, stray).unwrap_err().name(), "NotFoundError");
    }

    #[test]
    fn test_adopt_rewrites_owner_documents() {
        let (mut tree, doc, root) = setup();
        let child = tree.create_element(doc, "child").unwrap();
        tree.set_attribute(child, "k", "v").unwrap();
        tree.append_child(root, child).unwrap();

        let other = tree.create_document();
        tree.adopt_node(other, root).unwrap();
        assert!(tree.parent(root).is_none());
        assert_eq!(tree.owner_document(root), Some(other));
        assert_eq!(tree.owner_document(child), Some(other));
        let attr = tree.get_attribute_node(child, "k").unwrap();
        assert_eq!(tree.owner_document(attr), Some(other));
        assert_eq!(tree.adopt_node(other, doc).unwrap_err().name(), "NotSupportedError");
    }

    #[test]
    fn test_append_across_documents_adopts() {
        let (mut tree, _, root) = setup();
        let other = tree.create_document();
        let foreign = tree.create_element(other, "foreign").unwrap();
        tree.append_child(root, foreign).unwrap();
        assert_eq!(tree.owner_document(foreign), tree.owner_document(root));
    }

    #[test]
    fn test_child_node_methods() {
        let (mut tree, doc, root) = setup();
        let b = tree.create_element(doc, "b").unwrap();
        tree.append_child(root, b).unwrap();

        let a = tree.create_element(doc, "a").unwrap();
        tree.before(b, vec![a.into()]).unwrap();
        tree.after(b, vec!["tail".into()]).unwrap();
        assert_eq!(names(&tree, root), ["a", "b", "#text"]);

        let c = tree.create_element(doc, "c").unwrap();
        tree.replace_with(b, vec![c.into(), "mid".into()]).unwrap();
        assert_eq!(names(&tree, root), ["a", "c", "#text", "#text"]);
        assert!(tree.parent(b).is_none());

        tree.remove(a).unwrap();
        assert_eq!(names(&tree, root), ["c", "#text", "#text"]);
        assert_eq!(tree.remove(doc).unwrap_err().name(), "NotSupportedError");
    }

    #[test]
    fn test_before_with_own_sibling_in_arguments() {
        let (mut tree, doc, root) = setup();
        let a = tree.create_element(doc, "a").unwrap();
        let b = tree.create_element(doc, "b").unwrap();
        tree.append_child(root, a).unwrap();
        tree.append_child(root, b).unwrap();
        tree.before(b, vec![a.into()]).unwrap();
        assert_eq!(names(&tree, root), ["a", "b"]);
    }

    #[test]
    fn test_parent_node_methods() {
        let (mut tree, doc, root) = setup();
        let m = tree.create_element(doc, "m").unwrap();
        tree.append(root, vec![m.into()]).unwrap();
        let f = tree.create_element(doc, "f").unwrap();
        tree.prepend(root, vec![f.into(), "t".into()]).unwrap();
        assert_eq!(names(&tree, root), ["f", "#text", "m"]);

        let only = tree.create_element(doc, "only").unwrap();
        tree.replace_children(root, vec![only.into()]).unwrap();
        assert_eq!(names(&tree, root), ["only"]);
        assert!(tree.parent(m).is_none());

        let text = tree.create_text_node(doc, "x");
        assert_eq!(tree.append(text, vec![]).unwrap_err().name(), "NotSupportedError");
    }

    #[test]
    fn test_replace_children_validates_first() {
        let (mut tree, doc, root) = setup();
        let text = tree.create_text_node(doc, "nope");
        assert!(tree.replace_children(doc, vec![text.into()]).is_err());
        assert_eq!(tree.document_element(doc), Some(root));
    }

    #[test]
    fn test_rejected_after_moves_nothing() {
        let (mut tree, doc, root) = setup();
        let comment = tree.create_comment(doc, "c");
        tree.append_child(doc, comment).unwrap();
        let a = tree.create_element(doc, "a").unwrap();
        let b = tree.create_element(doc, "b").unwrap();
        tree.append_child(root, a).unwrap();
        tree.append_child(root, b).unwrap();

        let err = tree.after(comment, vec![a.into(), b.into()]).unwrap_err();
        assert_eq!(err.name(), "HierarchyRequestError");
        assert_eq!(names(&tree, root), ["a", "b"]);
        assert_eq!(tree.parent(a), Some(root));
        assert_eq!(names(&tree, doc), ["root", "#comment"]);
    }

    #[test]
    fn test_moved_document_element_does_not_count() {
        let (mut tree, doc, root) = setup();
        let comment = tree.create_comment(doc, "c");
        tree.append(doc, vec![comment.into(), root.into()]).unwrap();
        assert_eq!(names(&tree, doc), ["#comment", "root"]);
    }
}
