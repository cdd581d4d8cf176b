//! DOM Node - arena entry
//!
//! A `Node` is the link record (parent, first/last child, siblings,
//! owner document) plus a kind-specific payload in [`NodeData`].
//! Links are only ever changed by the linkage primitives in `list.rs`
//! and by adoption, so they are read-only outside the crate.

use crate::NodeId;
use crate::namespace::qualified_name;

/// Node type discriminant, numbered as in the DOM
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum NodeType {
    Element = 1,
    Attribute = 2,
    Text = 3,
    CData = 4,
    ProcessingInstruction = 7,
    Comment = 8,
    Document = 9,
    DocumentType = 10,
    DocumentFragment = 11,
}

impl NodeType {
    /// The numeric `nodeType` value
    pub fn as_u16(self) -> u16 {
        self as u16
    }

    /// Text, CDATA, comment and processing instruction nodes
    pub fn is_character_data(self) -> bool {
        matches!(
            self,
            Self::Text | Self::CData | Self::Comment | Self::ProcessingInstruction
        )
    }

    /// Kinds that may hold children
    pub fn is_parent_kind(self) -> bool {
        matches!(self, Self::Document | Self::DocumentFragment | Self::Element)
    }
}

/// DOM Node - links plus payload
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) parent: Option<NodeId>,
    pub(crate) first_child: Option<NodeId>,
    pub(crate) last_child: Option<NodeId>,
    pub(crate) prev_sibling: Option<NodeId>,
    pub(crate) next_sibling: Option<NodeId>,
    /// Maintained by the linkage primitives
    pub(crate) child_count: usize,
    /// `None` only for documents, which are their own node document
    pub(crate) owner_document: Option<NodeId>,
    pub(crate) data: NodeData,
}

impl Node {
    pub(crate) fn new(data: NodeData, owner_document: Option<NodeId>) -> Self {
        Self {
            parent: None,
            first_child: None,
            last_child: None,
            prev_sibling: None,
            next_sibling: None,
            child_count: 0,
            owner_document,
            data,
        }
    }

    /// Parent node, if attached
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn first_child(&self) -> Option<NodeId> {
        self.first_child
    }

    pub fn last_child(&self) -> Option<NodeId> {
        self.last_child
    }

    pub fn prev_sibling(&self) -> Option<NodeId> {
        self.prev_sibling
    }

    pub fn next_sibling(&self) -> Option<NodeId> {
        self.next_sibling
    }

    /// Number of children
    pub fn child_count(&self) -> usize {
        self.child_count
    }

    /// Kind-specific payload
    pub fn data(&self) -> &NodeData {
        &self.data
    }

    /// Node type discriminant
    pub fn node_type(&self) -> NodeType {
        self.data.node_type()
    }

    #[inline]
    pub fn is_element(&self) -> bool {
        matches!(self.data, NodeData::Element(_))
    }

    #[inline]
    pub fn is_text(&self) -> bool {
        matches!(self.data, NodeData::Text(_) | NodeData::CData(_))
    }

    #[inline]
    pub fn as_element(&self) -> Option<&ElementData> {
        match &self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    #[inline]
    pub(crate) fn as_element_mut(&mut self) -> Option<&mut ElementData> {
        match &mut self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    #[inline]
    pub fn as_attr(&self) -> Option<&AttrData> {
        match &self.data {
            NodeData::Attr(a) => Some(a),
            _ => None,
        }
    }

    #[inline]
    pub(crate) fn as_attr_mut(&mut self) -> Option<&mut AttrData> {
        match &mut self.data {
            NodeData::Attr(a) => Some(a),
            _ => None,
        }
    }

    #[inline]
    pub fn as_document(&self) -> Option<&DocumentData> {
        match &self.data {
            NodeData::Document(d) => Some(d),
            _ => None,
        }
    }

    #[inline]
    pub fn as_doctype(&self) -> Option<&DocumentTypeData> {
        match &self.data {
            NodeData::DocumentType(d) => Some(d),
            _ => None,
        }
    }

    /// Character data of Text, CDATA, Comment and PI nodes
    pub fn character_data(&self) -> Option<&str> {
        match &self.data {
            NodeData::Text(data) | NodeData::CData(data) | NodeData::Comment(data) => Some(data),
            NodeData::ProcessingInstruction { data, .. } => Some(data),
            _ => None,
        }
    }

    pub(crate) fn character_data_mut(&mut self) -> Option<&mut String> {
        match &mut self.data {
            NodeData::Text(data) | NodeData::CData(data) | NodeData::Comment(data) => Some(data),
            NodeData::ProcessingInstruction { data, .. } => Some(data),
            _ => None,
        }
    }
}

/// Node-specific data
#[derive(Debug, Clone)]
pub enum NodeData {
    Document(DocumentData),
    DocumentType(DocumentTypeData),
    DocumentFragment,
    Element(ElementData),
    Attr(AttrData),
    Text(String),
    CData(String),
    Comment(String),
    ProcessingInstruction {
        target: String,
        data: String,
    },
}

impl NodeData {
    pub fn node_type(&self) -> NodeType {
        match self {
            Self::Document(_) => NodeType::Document,
            Self::DocumentType(_) => NodeType::DocumentType,
            Self::DocumentFragment => NodeType::DocumentFragment,
            Self::Element(_) => NodeType::Element,
            Self::Attr(_) => NodeType::Attribute,
            Self::Text(_) => NodeType::Text,
            Self::CData(_) => NodeType::CData,
            Self::Comment(_) => NodeType::Comment,
            Self::ProcessingInstruction { .. } => NodeType::ProcessingInstruction,
        }
    }
}

/// Document payload
#[derive(Debug, Clone)]
pub struct DocumentData {
    /// MIME type the document was created with
    pub content_type: String,
}

impl DocumentData {
    pub const XML: &'static str = "application/xml";
    pub const HTML: &'static str = "text/html";
    pub const XHTML: &'static str = "application/xhtml+xml";
    pub const SVG: &'static str = "image/svg+xml";

    pub fn new(content_type: &str) -> Self {
        Self { content_type: content_type.to_string() }
    }

    /// HTML documents lower-case names in factories and attribute lookups
    pub fn is_html(&self) -> bool {
        self.content_type == Self::HTML
    }
}

/// DOCTYPE payload, immutable after creation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentTypeData {
    pub name: String,
    pub public_id: String,
    pub system_id: String,
}

/// Element payload
#[derive(Debug, Clone)]
pub struct ElementData {
    pub namespace: Option<String>,
    pub prefix: Option<String>,
    pub local_name: String,
    /// Attr nodes, in order; unique by (namespace, local name)
    pub(crate) attributes: Vec<NodeId>,
}

impl ElementData {
    pub fn new(namespace: Option<String>, prefix: Option<String>, local_name: String) -> Self {
        Self {
            namespace,
            prefix,
            local_name,
            attributes: Vec::new(),
        }
    }

    /// `prefix:localName`, or `localName` without a prefix
    pub fn qualified_name(&self) -> String {
        qualified_name(self.prefix.as_deref(), &self.local_name)
    }

    /// Attr node ids in attribute-list order
    pub fn attributes(&self) -> &[NodeId] {
        &self.attributes
    }
}

/// Attr payload
#[derive(Debug, Clone)]
pub struct AttrData {
    pub namespace: Option<String>,
    pub prefix: Option<String>,
    pub local_name: String,
    pub value: String,
    /// Set while the Attr sits in an element's attribute list
    pub(crate) owner_element: Option<NodeId>,
}

impl AttrData {
    pub fn new(
        namespace: Option<String>,
        prefix: Option<String>,
        local_name: String,
        value: String,
    ) -> Self {
        Self {
            namespace,
            prefix,
            local_name,
            value,
            owner_element: None,
        }
    }

    pub fn qualified_name(&self) -> String {
        qualified_name(self.prefix.as_deref(), &self.local_name)
    }

    pub fn owner_element(&self) -> Option<NodeId> {
        self.owner_element
    }

    /// Does this attribute have the given namespace and local name?
    pub fn matches(&self, namespace: Option<&str>, local_name: &str) -> bool {
        self.namespace.as_deref() == namespace && self.local_name == local_name
    }
}
