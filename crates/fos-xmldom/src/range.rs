//! Live Range bookkeeping
//!
//! The Range API itself lives outside this crate. What lives here is the
//! part the mutation engine owes every live range: boundary points that
//! stay meaningful across insertions, removals and character-data edits.

use crate::error::{DomError, DomResult};
use crate::node::NodeType;
use crate::tree::DomTree;
use crate::NodeId;

/// Handle to a registered live range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RangeId(pub(crate) u32);

/// Range boundary point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundaryPoint {
    /// The container node
    pub node: NodeId,
    /// Character offset for character data, child index otherwise
    pub offset: usize,
}

impl BoundaryPoint {
    pub fn new(node: NodeId, offset: usize) -> Self {
        Self { node, offset }
    }
}

/// A live range's boundary points
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiveRange {
    pub start: BoundaryPoint,
    pub end: BoundaryPoint,
}

impl LiveRange {
    pub fn collapsed(&self) -> bool {
        self.start == self.end
    }
}

impl DomTree {
    /// Register a live range collapsed at `(document, 0)`
    pub fn create_range(&mut self, document: NodeId) -> RangeId {
        let document = self.node_document(document);
        let point = BoundaryPoint::new(document, 0);
        let id = RangeId(self.ranges.len() as u32);
        self.ranges.push(Some(LiveRange { start: point, end: point }));
        self.live_ranges += 1;
        id
    }

    pub fn range(&self, id: RangeId) -> Option<&LiveRange> {
        self.ranges.get(id.0 as usize).and_then(Option::as_ref)
    }

    /// Stop tracking a range
    pub fn detach_range(&mut self, id: RangeId) {
        if let Some(slot) = self.ranges.get_mut(id.0 as usize) {
            if slot.take().is_some() {
                self.live_ranges -= 1;
            }
        }
    }

    /// Ranges whose start container is in `document`'s tree
    pub fn ranges_of(&self, document: NodeId) -> Vec<RangeId> {
        self.ranges
            .iter()
            .enumerate()
            .filter_map(|(i, r)| r.map(|r| (i, r)))
            .filter(|(_, r)| self.node_document(r.start.node) == document)
            .map(|(i, _)| RangeId(i as u32))
            .collect()
    }

    /// `setStart(node, offset)`
    pub fn set_range_start(&mut self, id: RangeId, node: NodeId, offset: usize) -> DomResult<()> {
        self.set_range_boundary(id, BoundaryPoint::new(node, offset), true)
    }

    /// `setEnd(node, offset)`
    pub fn set_range_end(&mut self, id: RangeId, node: NodeId, offset: usize) -> DomResult<()> {
        self.set_range_boundary(id, BoundaryPoint::new(node, offset), false)
    }

    fn set_range_boundary(&mut self, id: RangeId, point: BoundaryPoint, start: bool) -> DomResult<()> {
        if self.node_type(point.node) == NodeType::DocumentType {
            return Err(DomError::InvalidNodeType("a range boundary cannot be in a doctype"));
        }
        if point.offset > self.node_length(point.node) {
            return Err(DomError::IndexSize);
        }
        let Some(mut range) = self.range(id).copied() else {
            return Err(DomError::NotFound("range is not registered"));
        };

        if start {
            range.start = point;
            if self.root(range.end.node) != self.root(point.node)
                || self.is_boundary_after(point, range.end)
            {
                range.end = point;
            }
        } else {
            range.end = point;
            if self.root(range.start.node) != self.root(point.node)
                || self.is_boundary_after(range.start, point)
            {
                range.start = point;
            }
        }
        self.ranges[id.0 as usize] = Some(range);
        Ok(())
    }

    /// Is boundary point `a` after `b`? Both must share a root.
    fn is_boundary_after(&self, a: BoundaryPoint, b: BoundaryPoint) -> bool {
        if a.node == b.node {
            return a.offset > b.offset;
        }
        if self.is_preceding(b.node, a.node) {
            // a follows b's container; a is before b only if a sits inside b
            // at or before b's offset
            if self.is_ancestor(b.node, a.node) {
                let child = self
                    .ancestors(a.node)
                    .find(|&anc| self.parent(anc) == Some(b.node))
                    .unwrap_or(a.node);
                return self.index(child) >= b.offset;
            }
            return true;
        }
        if self.is_ancestor(a.node, b.node) {
            let child = self
                .ancestors(b.node)
                .find(|&anc| self.parent(anc) == Some(a.node))
                .unwrap_or(b.node);
            return self.index(child) < a.offset;
        }
        false
    }

    fn for_each_boundary(&mut self, mut f: impl FnMut(&DomTree, &mut BoundaryPoint)) {
        let mut ranges = std::mem::take(&mut self.ranges);
        for range in ranges.iter_mut().flatten() {
            f(self, &mut range.start);
            f(self, &mut range.end);
        }
        self.ranges = ranges;
    }

    /// `count` nodes are about to be inserted into `parent` before `child`
    pub(crate) fn ranges_after_insert(&mut self, parent: NodeId, child: NodeId, count: usize) {
        if self.live_ranges == 0 {
            return;
        }
        let index = self.index(child);
        tracing::trace!("ranges: insert {} at {:?}[{}]", count, parent, index);
        self.for_each_boundary(|_, point| {
            if point.node == parent && point.offset > index {
                point.offset += count;
            }
        });
    }

    /// `node` is about to be removed from `parent`
    pub(crate) fn ranges_before_remove(&mut self, node: NodeId, parent: NodeId) {
        if self.live_ranges == 0 {
            return;
        }
        let index = self.index(node);
        tracing::trace!("ranges: remove {:?} from {:?}[{}]", node, parent, index);
        self.for_each_boundary(|tree, point| {
            if tree.is_inclusive_ancestor(node, point.node) {
                *point = BoundaryPoint::new(parent, index);
            } else if point.node == parent && point.offset > index {
                point.offset -= 1;
            }
        });
    }

    /// `count` characters at `offset` of `node` were replaced by `inserted` characters
    pub(crate) fn ranges_after_replace_data(
        &mut self,
        node: NodeId,
        offset: usize,
        count: usize,
        inserted: usize,
    ) {
        if self.live_ranges == 0 {
            return;
        }
        self.for_each_boundary(|_, point| {
            if point.node != node || point.offset <= offset {
                return;
            }
            if point.offset <= offset + count {
                point.offset = offset;
            } else {
                point.offset = point.offset + inserted - count;
            }
        });
    }

    /// Text `node` was split at `offset`; the tail now lives in `new_node`,
    /// inserted right after `node` in `parent`
    pub(crate) fn ranges_after_split(
        &mut self,
        node: NodeId,
        new_node: NodeId,
        offset: usize,
        parent: NodeId,
    ) {
        if self.live_ranges == 0 {
            return;
        }
        let node_index = self.index(node);
        self.for_each_boundary(|_, point| {
            if point.node == node && point.offset > offset {
                *point = BoundaryPoint::new(new_node, point.offset - offset);
            } else if point.node == parent && point.offset == node_index + 1 {
                point.offset += 1;
            }
        });
    }

    /// Text `from`, a child of `parent`, is being merged into `into` whose
    /// data was `base` characters long before `from`'s data
    pub(crate) fn ranges_before_merge(&mut self, from: NodeId, into: NodeId, parent: NodeId, base: usize) {
        if self.live_ranges == 0 {
            return;
        }
        let index = self.index(from);
        self.for_each_boundary(|_, point| {
            if point.node == from {
                *point = BoundaryPoint::new(into, point.offset + base);
            } else if point.node == parent && point.offset == index {
                *point = BoundaryPoint::new(into, base);
            }
        });
    }
}
