//! DOM Tree (arena-based allocation)
//!
//! One arena holds the nodes of every document created through it, so
//! moving a subtree between documents is a relink plus an owner-document
//! rewrite rather than a copy. Nodes are never freed before the tree is
//! dropped; an unlinked node is simply unreachable.
//!
//! `NodeId`s are only meaningful for the `DomTree` that issued them.
//! Passing an id from another tree is a contract violation and panics.

use crate::error::{DomError, DomResult};
use crate::namespace::{self, HTML_NAMESPACE};
use crate::node::{AttrData, DocumentData, DocumentTypeData, ElementData, Node, NodeData, NodeType};
use crate::range::LiveRange;
use crate::NodeId;

/// Arena-based DOM tree
#[derive(Debug, Default, Clone)]
pub struct DomTree {
    nodes: Vec<Node>,
    /// Live range registry, indexed by `RangeId`
    pub(crate) ranges: Vec<Option<LiveRange>>,
    /// Registered ranges not yet detached
    pub(crate) live_ranges: usize,
}

impl DomTree {
    /// Create a new empty tree
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a node by ID
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Number of nodes ever allocated in the arena
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[inline]
    pub(crate) fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    #[inline]
    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    fn alloc(&mut self, data: NodeData, owner_document: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node::new(data, owner_document));
        id
    }

    // --- Factories ---

    /// Create an empty XML document (`application/xml`)
    pub fn create_document(&mut self) -> NodeId {
        self.create_document_with_content_type(DocumentData::XML)
    }

    /// Create an empty document with the given content type
    pub fn create_document_with_content_type(&mut self, content_type: &str) -> NodeId {
        let id = self.alloc(NodeData::Document(DocumentData::new(content_type)), None);
        tracing::debug!("Created document {:?} ({})", id, content_type);
        id
    }

    /// `createElement`: HTML documents lower-case the name and use the
    /// HTML namespace, as do `application/xhtml+xml` documents.
    pub fn create_element(&mut self, document: NodeId, local_name: &str) -> DomResult<NodeId> {
        if !namespace::is_valid_name(local_name) {
            return Err(DomError::InvalidCharacter("element name does not match the Name production"));
        }
        let document = self.node_document(document);
        let (local_name, namespace) = match self.node(document).as_document() {
            Some(data) if data.is_html() => {
                (local_name.to_ascii_lowercase(), Some(HTML_NAMESPACE.to_string()))
            }
            Some(data) if data.content_type == DocumentData::XHTML => {
                (local_name.to_string(), Some(HTML_NAMESPACE.to_string()))
            }
            _ => (local_name.to_string(), None),
        };
        let data = ElementData::new(namespace, None, local_name);
        Ok(self.alloc(NodeData::Element(data), Some(document)))
    }

    /// `createElementNS`
    pub fn create_element_ns(
        &mut self,
        document: NodeId,
        namespace: Option<&str>,
        qualified_name: &str,
    ) -> DomResult<NodeId> {
        let name = namespace::validate_and_extract(namespace, qualified_name)?;
        let document = self.node_document(document);
        let data = ElementData::new(name.namespace, name.prefix, name.local_name);
        Ok(self.alloc(NodeData::Element(data), Some(document)))
    }

    /// `createAttribute`: lower-cased in HTML documents
    pub fn create_attribute(&mut self, document: NodeId, local_name: &str) -> DomResult<NodeId> {
        if !namespace::is_valid_name(local_name) {
            return Err(DomError::InvalidCharacter("attribute name does not match the Name production"));
        }
        let document = self.node_document(document);
        let local_name = if self.is_html_document(document) {
            local_name.to_ascii_lowercase()
        } else {
            local_name.to_string()
        };
        let data = AttrData::new(None, None, local_name, String::new());
        Ok(self.alloc(NodeData::Attr(data), Some(document)))
    }

    /// `createAttributeNS`
    pub fn create_attribute_ns(
        &mut self,
        document: NodeId,
        namespace: Option<&str>,
        qualified_name: &str,
    ) -> DomResult<NodeId> {
        let name = namespace::validate_and_extract(namespace, qualified_name)?;
        let document = self.node_document(document);
        let data = AttrData::new(name.namespace, name.prefix, name.local_name, String::new());
        Ok(self.alloc(NodeData::Attr(data), Some(document)))
    }

    /// Allocate a detached attribute with an already-validated name
    pub(crate) fn alloc_attr(&mut self, document: NodeId, data: AttrData) -> NodeId {
        self.alloc(NodeData::Attr(data), Some(document))
    }

    pub fn create_text_node(&mut self, document: NodeId, data: &str) -> NodeId {
        let document = self.node_document(document);
        self.alloc(NodeData::Text(data.to_string()), Some(document))
    }

    pub fn create_comment(&mut self, document: NodeId, data: &str) -> NodeId {
        let document = self.node_document(document);
        self.alloc(NodeData::Comment(data.to_string()), Some(document))
    }

    /// `createCDATASection`: unsupported in HTML documents
    pub fn create_cdata_section(&mut self, document: NodeId, data: &str) -> DomResult<NodeId> {
        let document = self.node_document(document);
        if self.is_html_document(document) {
            return Err(DomError::NotSupported("CDATA sections are not supported in HTML documents"));
        }
        if data.contains("]]>") {
            return Err(DomError::InvalidCharacter("CDATA section data contains \"]]>\""));
        }
        Ok(self.alloc(NodeData::CData(data.to_string()), Some(document)))
    }

    pub fn create_processing_instruction(
        &mut self,
        document: NodeId,
        target: &str,
        data: &str,
    ) -> DomResult<NodeId> {
        if !namespace::is_valid_name(target) {
            return Err(DomError::InvalidCharacter("target does not match the Name production"));
        }
        if data.contains("?>") {
            return Err(DomError::InvalidCharacter("processing instruction data contains \"?>\""));
        }
        let document = self.node_document(document);
        let data = NodeData::ProcessingInstruction {
            target: target.to_string(),
            data: data.to_string(),
        };
        Ok(self.alloc(data, Some(document)))
    }

    pub fn create_document_fragment(&mut self, document: NodeId) -> NodeId {
        let document = self.node_document(document);
        self.alloc(NodeData::DocumentFragment, Some(document))
    }

    /// Allocate a doctype owned by `document`; the name is not validated here
    pub(crate) fn alloc_doctype(&mut self, document: NodeId, data: DocumentTypeData) -> NodeId {
        let document = self.node_document(document);
        self.alloc(NodeData::DocumentType(data), Some(document))
    }

    /// `createEvent` belongs to the event subsystem, which lives elsewhere
    pub fn create_event(&mut self, _document: NodeId, interface: &str) -> DomResult<NodeId> {
        tracing::warn!("createEvent({}) is not supported", interface);
        Err(DomError::NotSupported("events are not supported"))
    }

    // --- Node-generic getters ---

    /// Node type of `id`
    pub fn node_type(&self, id: NodeId) -> NodeType {
        self.node(id).node_type()
    }

    /// `nodeName`
    pub fn node_name(&self, id: NodeId) -> String {
        match &self.node(id).data {
            NodeData::Element(_) => self.tag_name(id).unwrap_or_default(),
            NodeData::Attr(attr) => attr.qualified_name(),
            NodeData::Text(_) => "#text".to_string(),
            NodeData::CData(_) => "#cdata-section".to_string(),
            NodeData::Comment(_) => "#comment".to_string(),
            NodeData::ProcessingInstruction { target, .. } => target.clone(),
            NodeData::Document(_) => "#document".to_string(),
            NodeData::DocumentType(doctype) => doctype.name.clone(),
            NodeData::DocumentFragment => "#document-fragment".to_string(),
        }
    }

    /// The document `id` belongs to; a document is its own node document
    pub fn node_document(&self, id: NodeId) -> NodeId {
        self.node(id).owner_document.unwrap_or(id)
    }

    /// `ownerDocument`: `None` for documents
    pub fn owner_document(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).owner_document
    }

    pub fn content_type(&self, document: NodeId) -> Option<&str> {
        self.node(document).as_document().map(|d| d.content_type.as_str())
    }

    /// Is `document` an HTML document?
    pub fn is_html_document(&self, document: NodeId) -> bool {
        self.node(document).as_document().is_some_and(DocumentData::is_html)
    }

    /// Element with the HTML namespace in an HTML document
    pub(crate) fn is_html_element_in_html_document(&self, id: NodeId) -> bool {
        self.node(id)
            .as_element()
            .is_some_and(|e| e.namespace.as_deref() == Some(HTML_NAMESPACE))
            && self.is_html_document(self.node_document(id))
    }

    /// `documentElement`
    pub fn document_element(&self, document: NodeId) -> Option<NodeId> {
        self.children(document).find(|&c| self.node(c).is_element())
    }

    /// `doctype`
    pub fn doctype(&self, document: NodeId) -> Option<NodeId> {
        self.children(document)
            .find(|&c| self.node_type(c) == NodeType::DocumentType)
    }

    /// `nodeValue`
    pub fn node_value(&self, id: NodeId) -> Option<String> {
        match &self.node(id).data {
            NodeData::Attr(attr) => Some(attr.value.clone()),
            _ => self.node(id).character_data().map(str::to_string),
        }
    }

    /// `nodeValue = value`; `None` is treated as the empty string
    pub fn set_node_value(&mut self, id: NodeId, value: Option<&str>) {
        let value = value.unwrap_or("");
        match self.node_type(id) {
            NodeType::Attribute => self.change_attr_value(id, value),
            kind if kind.is_character_data() => self.replace_whole_data(id, value),
            _ => {}
        }
    }

    /// `textContent`
    pub fn text_content(&self, id: NodeId) -> Option<String> {
        match &self.node(id).data {
            NodeData::Element(_) | NodeData::DocumentFragment => {
                let mut buf = String::new();
                self.collect_text(id, &mut buf);
                Some(buf)
            }
            NodeData::Attr(attr) => Some(attr.value.clone()),
            NodeData::Document(_) | NodeData::DocumentType(_) => None,
            _ => self.node(id).character_data().map(str::to_string),
        }
    }

    fn collect_text(&self, id: NodeId, buf: &mut String) {
        for desc in self.descendants(id) {
            if let NodeData::Text(data) | NodeData::CData(data) = &self.node(desc).data {
                buf.push_str(data);
            }
        }
    }

    /// `textContent = value`: replaces all children of elements and
    /// fragments with a single Text node (or nothing for `""`).
    pub fn set_text_content(&mut self, id: NodeId, value: Option<&str>) {
        let value = value.unwrap_or("");
        match self.node_type(id) {
            NodeType::Element | NodeType::DocumentFragment => {
                let text = (!value.is_empty()).then(|| {
                    let document = self.node_document(id);
                    self.create_text_node(document, value)
                });
                self.replace_all(text, id);
            }
            NodeType::Attribute => self.change_attr_value(id, value),
            kind if kind.is_character_data() => self.replace_whole_data(id, value),
            _ => {}
        }
    }

    // --- Cloning ---

    /// `cloneNode(deep)`: the copy belongs to the same node document
    pub fn clone_node(&mut self, id: NodeId, deep: bool) -> NodeId {
        let document = self.node_document(id);
        self.clone_into(id, document, deep)
    }

    /// `importNode(node, deep)`: clone `id` into `document`
    pub fn import_node(&mut self, document: NodeId, id: NodeId, deep: bool) -> DomResult<NodeId> {
        if self.node_type(id) == NodeType::Document {
            return Err(DomError::NotSupported("documents cannot be imported"));
        }
        let document = self.node_document(document);
        Ok(self.clone_into(id, document, deep))
    }

    fn clone_into(&mut self, id: NodeId, document: NodeId, deep: bool) -> NodeId {
        let data = self.node(id).data.clone();
        let (copy, document) = match data {
            NodeData::Document(doc) => {
                let copy = self.alloc(NodeData::Document(doc), None);
                (copy, copy)
            }
            NodeData::Element(el) => {
                let attrs = el.attributes.clone();
                let fresh = ElementData::new(el.namespace, el.prefix, el.local_name);
                let copy = self.alloc(NodeData::Element(fresh), Some(document));
                for attr in attrs {
                    let attr_copy = self.clone_into(attr, document, false);
                    self.append_attribute(copy, attr_copy);
                }
                (copy, document)
            }
            NodeData::Attr(attr) => {
                let fresh = AttrData::new(attr.namespace, attr.prefix, attr.local_name, attr.value);
                (self.alloc(NodeData::Attr(fresh), Some(document)), document)
            }
            other => (self.alloc(other, Some(document)), document),
        };

        if deep {
            let children: Vec<NodeId> = self.children(id).collect();
            for child in children {
                let child_copy = self.clone_into(child, document, true);
                self.link(child_copy, copy, None);
            }
        }
        copy
    }

    // --- Equality ---

    /// `isEqualNode`
    pub fn is_equal_node(&self, a: NodeId, b: NodeId) -> bool {
        let (na, nb) = (self.node(a), self.node(b));
        let same_payload = match (&na.data, &nb.data) {
            (NodeData::DocumentType(x), NodeData::DocumentType(y)) => x == y,
            (NodeData::Element(x), NodeData::Element(y)) => {
                x.namespace == y.namespace
                    && x.prefix == y.prefix
                    && x.local_name == y.local_name
                    && x.attributes.len() == y.attributes.len()
                    && x.attributes.iter().all(|&attr| {
                        y.attributes.iter().any(|&other| self.attrs_equal(attr, other))
                    })
            }
            (NodeData::Attr(_), NodeData::Attr(_)) => self.attrs_equal(a, b),
            (
                NodeData::ProcessingInstruction { target: t1, data: d1 },
                NodeData::ProcessingInstruction { target: t2, data: d2 },
            ) => t1 == t2 && d1 == d2,
            (NodeData::Text(x), NodeData::Text(y))
            | (NodeData::CData(x), NodeData::CData(y))
            | (NodeData::Comment(x), NodeData::Comment(y)) => x == y,
            (NodeData::Document(_), NodeData::Document(_))
            | (NodeData::DocumentFragment, NodeData::DocumentFragment) => true,
            _ => false,
        };

        same_payload
            && na.child_count == nb.child_count
            && self
                .children(a)
                .zip(self.children(b))
                .all(|(x, y)| self.is_equal_node(x, y))
    }

    fn attrs_equal(&self, a: NodeId, b: NodeId) -> bool {
        match (self.node(a).as_attr(), self.node(b).as_attr()) {
            (Some(x), Some(y)) => {
                x.namespace == y.namespace && x.local_name == y.local_name && x.value == y.value
            }
            _ => false,
        }
    }

    /// `isSameNode`
    pub fn is_same_node(&self, a: NodeId, b: Option<NodeId>) -> bool {
        b == Some(a)
    }
}
