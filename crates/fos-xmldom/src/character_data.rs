//! CharacterData, Text and ProcessingInstruction
//!
//! Offsets and counts are in Unicode scalar values.

use crate::error::{DomError, DomResult};
use crate::node::{NodeData, NodeType};
use crate::tree::DomTree;
use crate::NodeId;

/// Byte index of the `chars`-th character of `s` (or `s.len()`)
fn byte_offset(s: &str, chars: usize) -> usize {
    s.char_indices().nth(chars).map_or(s.len(), |(i, _)| i)
}

impl DomTree {
    /// `data` of a Text, CDATA, Comment or PI node
    pub fn data(&self, id: NodeId) -> Option<&str> {
        self.node(id).character_data()
    }

    /// `data = value`
    pub fn set_data(&mut self, id: NodeId, value: &str) -> DomResult<()> {
        let length = self.length(id)?;
        self.replace_data(id, 0, length, value)
    }

    /// `length` in characters
    pub fn length(&self, id: NodeId) -> DomResult<usize> {
        self.data(id)
            .map(|d| d.chars().count())
            .ok_or(DomError::NotSupported("node is not character data"))
    }

    /// `substringData(offset, count)`; `count` is clamped to the end
    pub fn substring_data(&self, id: NodeId, offset: usize, count: usize) -> DomResult<String> {
        let data = self
            .data(id)
            .ok_or(DomError::NotSupported("node is not character data"))?;
        if offset > data.chars().count() {
            return Err(DomError::IndexSize);
        }
        Ok(data.chars().skip(offset).take(count).collect())
    }

    pub fn append_data(&mut self, id: NodeId, value: &str) -> DomResult<()> {
        let length = self.length(id)?;
        self.replace_data(id, length, 0, value)
    }

    pub fn insert_data(&mut self, id: NodeId, offset: usize, value: &str) -> DomResult<()> {
        self.replace_data(id, offset, 0, value)
    }

    pub fn delete_data(&mut self, id: NodeId, offset: usize, count: usize) -> DomResult<()> {
        self.replace_data(id, offset, count, "")
    }

    /// `replaceData(offset, count, data)`
    pub fn replace_data(&mut self, id: NodeId, offset: usize, count: usize, value: &str) -> DomResult<()> {
        let length = self.length(id)?;
        if offset > length {
            return Err(DomError::IndexSize);
        }
        let count = count.min(length - offset);

        if let Some(data) = self.node_mut(id).character_data_mut() {
            let start = byte_offset(data, offset);
            let end = start + byte_offset(&data[start..], count);
            data.replace_range(start..end, value);
        }

        self.ranges_after_replace_data(id, offset, count, value.chars().count());
        Ok(())
    }

    /// Replace all data; used by the `nodeValue`/`textContent` setters
    pub(crate) fn replace_whole_data(&mut self, id: NodeId, value: &str) {
        if let Err(err) = self.set_data(id, value) {
            tracing::debug!("replace_whole_data on {:?}: {}", id, err);
        }
    }

    /// `Text.splitText(offset)`: the tail moves into a new node of the
    /// same kind, inserted after `id` when it has a parent
    pub fn split_text(&mut self, id: NodeId, offset: usize) -> DomResult<NodeId> {
        if !self.node(id).is_text() {
            return Err(DomError::NotSupported("only text nodes can be split"));
        }
        let length = self.length(id)?;
        if offset > length {
            return Err(DomError::IndexSize);
        }
        let count = length - offset;
        let tail = self.substring_data(id, offset, count)?;

        let document = self.node_document(id);
        let new_node = match self.node_type(id) {
            NodeType::CData => self.create_cdata_section(document, &tail)?,
            _ => self.create_text_node(document, &tail),
        };

        if let Some(parent) = self.parent(id) {
            let next = self.next_sibling(id);
            self.insert_node(new_node, parent, next);
            self.ranges_after_split(id, new_node, offset, parent);
        }

        self.replace_data(id, offset, count, "")?;
        Ok(new_node)
    }

    /// `Text.wholeText`: data of the contiguous text nodes around `id`
    pub fn whole_text(&self, id: NodeId) -> String {
        let mut first = id;
        while let Some(prev) = self.prev_sibling(first).filter(|&p| self.node(p).is_text()) {
            first = prev;
        }
        std::iter::successors(Some(first), |&n| self.next_sibling(n))
            .take_while(|&n| self.node(n).is_text())
            .filter_map(|n| self.data(n))
            .collect()
    }

    /// `ProcessingInstruction.target`
    pub fn target(&self, id: NodeId) -> Option<&str> {
        match &self.node(id).data {
            NodeData::ProcessingInstruction { target, .. } => Some(target),
            _ => None,
        }
    }

    /// `normalize()`: drop empty Text descendants and merge runs of
    /// adjacent Text nodes into the first of each run. CDATA sections are
    /// left alone.
    pub fn normalize(&mut self, id: NodeId) {
        let texts: Vec<NodeId> = self
            .descendants(id)
            .filter(|&d| self.node_type(d) == NodeType::Text)
            .collect();

        for node in texts {
            // already merged into an earlier node
            if self.parent(node).is_none() {
                continue;
            }
            let mut length = self.data(node).map_or(0, |d| d.chars().count());
            if length == 0 {
                self.remove_node(node);
                continue;
            }

            let run: Vec<NodeId> = std::iter::successors(self.next_sibling(node), |&n| self.next_sibling(n))
                .take_while(|&n| self.node_type(n) == NodeType::Text)
                .collect();
            if run.is_empty() {
                continue;
            }

            let merged: String = run.iter().filter_map(|&n| self.data(n)).collect();
            if let Some(data) = self.node_mut(node).character_data_mut() {
                data.push_str(&merged);
            }

            let Some(parent) = self.parent(node) else {
                continue;
            };
            for &next in &run {
                self.ranges_before_merge(next, node, parent, length);
                length += self.data(next).map_or(0, |d| d.chars().count());
            }
            for next in run {
                self.remove_node(next);
            }
        }
        tracing::trace!("normalized {:?}", id);
    }
}
