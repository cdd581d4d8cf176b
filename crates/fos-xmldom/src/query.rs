//! Tree Query
//!
//! Read-only graph algorithms: root, ancestor/descendant predicates,
//! tree order, node index and length, `compareDocumentPosition`.

use crate::node::{NodeData, NodeType};
use crate::tree::DomTree;
use crate::NodeId;

/// `compareDocumentPosition` result bits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DocumentPosition(pub u16);

impl DocumentPosition {
    pub const DISCONNECTED: u16 = 0x01;
    pub const PRECEDING: u16 = 0x02;
    pub const FOLLOWING: u16 = 0x04;
    pub const CONTAINS: u16 = 0x08;
    pub const CONTAINED_BY: u16 = 0x10;
    pub const IMPLEMENTATION_SPECIFIC: u16 = 0x20;

    pub fn contains(self, flag: u16) -> bool {
        self.0 & flag == flag
    }
}

impl DomTree {
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    /// Parent, if it is an element
    pub fn parent_element(&self, id: NodeId) -> Option<NodeId> {
        self.parent(id).filter(|&p| self.node(p).is_element())
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).first_child
    }

    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).last_child
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).next_sibling
    }

    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).prev_sibling
    }

    pub fn child_count(&self, id: NodeId) -> usize {
        self.node(id).child_count
    }

    pub fn has_child_nodes(&self, id: NodeId) -> bool {
        self.node(id).first_child.is_some()
    }

    /// Iterator over the children of a node
    pub fn children(&self, id: NodeId) -> Children<'_> {
        Children {
            tree: self,
            next: self.node(id).first_child,
        }
    }

    /// Iterator over a node and its ancestors, innermost first
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: Some(id),
        }
    }

    /// Iterator over the descendants of a node in tree order (exclusive)
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        Descendants {
            tree: self,
            root: id,
            next: self.node(id).first_child,
        }
    }

    /// Element children
    pub fn element_children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id).filter(|&c| self.node(c).is_element())
    }

    pub fn first_element_child(&self, id: NodeId) -> Option<NodeId> {
        self.element_children(id).next()
    }

    pub fn last_element_child(&self, id: NodeId) -> Option<NodeId> {
        let mut cur = self.last_child(id);
        while let Some(c) = cur {
            if self.node(c).is_element() {
                return Some(c);
            }
            cur = self.prev_sibling(c);
        }
        None
    }

    pub fn child_element_count(&self, id: NodeId) -> usize {
        self.element_children(id).count()
    }

    pub fn previous_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        let mut cur = self.prev_sibling(id);
        while let Some(c) = cur {
            if self.node(c).is_element() {
                return Some(c);
            }
            cur = self.prev_sibling(c);
        }
        None
    }

    pub fn next_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        let mut cur = self.next_sibling(id);
        while let Some(c) = cur {
            if self.node(c).is_element() {
                return Some(c);
            }
            cur = self.next_sibling(c);
        }
        None
    }

    /// The root of the tree `id` participates in
    pub fn root(&self, id: NodeId) -> NodeId {
        self.ancestors(id).last().unwrap_or(id)
    }

    /// `getRootNode()`
    pub fn get_root_node(&self, id: NodeId) -> NodeId {
        self.root(id)
    }

    /// Is `ancestor` a strict ancestor of `id`?
    pub fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        self.ancestors(id).skip(1).any(|a| a == ancestor)
    }

    pub fn is_inclusive_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        ancestor == id || self.is_ancestor(ancestor, id)
    }

    pub fn is_descendant(&self, descendant: NodeId, id: NodeId) -> bool {
        self.is_ancestor(id, descendant)
    }

    pub fn is_inclusive_descendant(&self, descendant: NodeId, id: NodeId) -> bool {
        self.is_inclusive_ancestor(id, descendant)
    }

    /// `contains(other)`: inclusive descendant test
    pub fn contains(&self, id: NodeId, other: Option<NodeId>) -> bool {
        other.is_some_and(|o| self.is_inclusive_descendant(o, id))
    }

    /// Are `a` and `b` siblings (same non-null parent, distinct nodes)?
    pub fn is_sibling(&self, a: NodeId, b: NodeId) -> bool {
        a != b && self.parent(a).is_some() && self.parent(a) == self.parent(b)
    }

    /// Index of `id` among its parent's children (0 when parentless)
    pub fn index(&self, id: NodeId) -> usize {
        let mut index = 0;
        let mut cur = self.prev_sibling(id);
        while let Some(prev) = cur {
            index += 1;
            cur = self.prev_sibling(prev);
        }
        index
    }

    /// Node length: character count for character data, child count otherwise
    pub fn node_length(&self, id: NodeId) -> usize {
        match &self.node(id).data {
            NodeData::DocumentType(_) | NodeData::Attr(_) => 0,
            _ => match self.node(id).character_data() {
                Some(data) => data.chars().count(),
                None => self.node(id).child_count,
            },
        }
    }

    /// Path of child indices from the root down to `id`
    fn tree_position(&self, id: NodeId) -> Vec<usize> {
        let mut path: Vec<usize> = self
            .ancestors(id)
            .take_while(|&a| self.parent(a).is_some())
            .map(|a| self.index(a))
            .collect();
        path.reverse();
        path
    }

    /// Is `a` preceding `b` in tree order (same tree, not an ancestor)?
    pub fn is_preceding(&self, a: NodeId, b: NodeId) -> bool {
        if a == b || self.root(a) != self.root(b) {
            return false;
        }
        self.tree_position(a) < self.tree_position(b)
    }

    /// Is `a` following `b` in tree order?
    pub fn is_following(&self, a: NodeId, b: NodeId) -> bool {
        self.is_preceding(b, a)
    }

    /// `compareDocumentPosition(other)` evaluated on `id`
    pub fn compare_document_position(&self, id: NodeId, other: NodeId) -> DocumentPosition {
        use DocumentPosition as P;

        if id == other {
            return DocumentPosition(0);
        }

        let mut node1 = Some(other);
        let mut node2 = Some(id);
        let mut attr1 = None;
        let mut attr2 = None;

        if let Some(attr) = self.node(other).as_attr() {
            attr1 = Some(other);
            node1 = attr.owner_element;
        }
        if let Some(attr) = self.node(id).as_attr() {
            attr2 = Some(id);
            node2 = attr.owner_element;

            if let (Some(a1), Some(n1)) = (attr1, node1) {
                if Some(n1) == node2 {
                    let attrs = self.node(n1).as_element().map(|e| e.attributes.clone()).unwrap_or_default();
                    for attr in attrs {
                        if attr == a1 {
                            return DocumentPosition(P::IMPLEMENTATION_SPECIFIC | P::PRECEDING);
                        }
                        if Some(attr) == attr2 {
                            return DocumentPosition(P::IMPLEMENTATION_SPECIFIC | P::FOLLOWING);
                        }
                    }
                }
            }
        }

        let (Some(n1), Some(n2)) = (node1, node2) else {
            return self.disconnected(id, other);
        };
        if self.root(n1) != self.root(n2) {
            return self.disconnected(id, other);
        }

        if (self.is_ancestor(n1, n2) && attr1.is_none()) || (n1 == n2 && attr2.is_some()) {
            return DocumentPosition(P::CONTAINS | P::PRECEDING);
        }
        if (self.is_descendant(n1, n2) && attr2.is_none()) || (n1 == n2 && attr1.is_some()) {
            return DocumentPosition(P::CONTAINED_BY | P::FOLLOWING);
        }
        if self.is_preceding(n1, n2) {
            return DocumentPosition(P::PRECEDING);
        }
        DocumentPosition(P::FOLLOWING)
    }

    /// Disconnected nodes order by arena index so repeated calls agree
    fn disconnected(&self, id: NodeId, other: NodeId) -> DocumentPosition {
        use DocumentPosition as P;
        let direction = if other < id { P::PRECEDING } else { P::FOLLOWING };
        DocumentPosition(P::DISCONNECTED | P::IMPLEMENTATION_SPECIFIC | direction)
    }

    /// Does `id` have a child of the given type?
    pub(crate) fn has_child_of_type(&self, id: NodeId, kind: NodeType) -> bool {
        self.children(id).any(|c| self.node_type(c) == kind)
    }
}

// --- Iterators ---

/// Iterator over the children of a node
pub struct Children<'a> {
    tree: &'a DomTree,
    next: Option<NodeId>,
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.tree.node(current).next_sibling;
        Some(current)
    }
}

/// Iterator over a node and its ancestors
pub struct Ancestors<'a> {
    tree: &'a DomTree,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.tree.node(current).parent;
        Some(current)
    }
}

/// Depth-first iterator over all descendants of a node
pub struct Descendants<'a> {
    tree: &'a DomTree,
    root: NodeId,
    next: Option<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;

        if let Some(child) = self.tree.first_child(current) {
            self.next = Some(child);
            return Some(current);
        }

        let mut cur = current;
        loop {
            if cur == self.root {
                self.next = None;
                break;
            }
            if let Some(sibling) = self.tree.next_sibling(cur) {
                self.next = Some(sibling);
                break;
            }
            match self.tree.parent(cur) {
                Some(parent) => cur = parent,
                None => {
                    self.next = None;
                    break;
                }
            }
        }
        Some(current)
    }
}
