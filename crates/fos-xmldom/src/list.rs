//! Linkage Primitives
//!
//! O(1) splice/unsplice of a node in its parent's doubly-linked child
//! list. These do no validation beyond the duplicate guard; callers go
//! through the mutation engine.

use crate::tree::DomTree;
use crate::NodeId;

impl DomTree {
    /// Splice `node` into `parent`'s children before `before`, or at the end.
    ///
    /// No-op if `node` is already a child of `parent`. `node` must be
    /// detached and `before`, when given, must be a child of `parent`.
    pub(crate) fn link(&mut self, node: NodeId, parent: NodeId, before: Option<NodeId>) {
        if self.node(node).parent == Some(parent) {
            tracing::trace!("link: {:?} already a child of {:?}", node, parent);
            return;
        }
        debug_assert!(self.node(node).parent.is_none(), "node must be detached before linking");
        debug_assert!(
            before.is_none_or(|b| self.node(b).parent == Some(parent)),
            "reference child must belong to parent"
        );

        let prev = match before {
            Some(b) => self.node(b).prev_sibling,
            None => self.node(parent).last_child,
        };

        {
            let n = self.node_mut(node);
            n.parent = Some(parent);
            n.prev_sibling = prev;
            n.next_sibling = before;
        }

        match prev {
            Some(p) => self.node_mut(p).next_sibling = Some(node),
            None => self.node_mut(parent).first_child = Some(node),
        }
        match before {
            Some(b) => self.node_mut(b).prev_sibling = Some(node),
            None => self.node_mut(parent).last_child = Some(node),
        }

        self.node_mut(parent).child_count += 1;
    }

    /// Unsplice `node` from its parent, re-linking its former neighbours.
    pub(crate) fn unlink(&mut self, node: NodeId) {
        let Some(parent) = self.node(node).parent else {
            return;
        };

        let prev = self.node(node).prev_sibling;
        let next = self.node(node).next_sibling;

        match prev {
            Some(p) => self.node_mut(p).next_sibling = next,
            None => self.node_mut(parent).first_child = next,
        }
        match next {
            Some(n) => self.node_mut(n).prev_sibling = prev,
            None => self.node_mut(parent).last_child = prev,
        }

        let n = self.node_mut(node);
        n.parent = None;
        n.prev_sibling = None;
        n.next_sibling = None;

        self.node_mut(parent).child_count -= 1;
    }
}
