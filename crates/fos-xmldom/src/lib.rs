//! fOS XML DOM - Document Object Model for XML
//!
//! Arena-backed W3C DOM tree with a validating mutation engine,
//! namespace resolution and the namespace-aware XML serializer.
//!
//! ```
//! use fos_xmldom::{DomTree, serial};
//!
//! let mut tree = DomTree::new();
//! let doc = tree.create_document();
//! let root = tree.create_element_ns(doc, Some("urn:x"), "root").unwrap();
//! tree.append_child(doc, root).unwrap();
//!
//! let xml = serial::serialize_to_string(&tree, doc).unwrap();
//! assert_eq!(xml, r#"<root xmlns="urn:x"/>"#);
//! ```

mod character_data;
mod element;
mod list;
mod lookup;
mod mutation;
mod query;

pub mod collections;
pub mod error;
pub mod implementation;
pub mod namespace;
pub mod node;
pub mod parser;
pub mod range;
pub mod serial;
pub mod tree;

pub use collections::{HtmlCollection, NamedNodeMap, NodeList};
pub use error::{DomError, DomResult};
pub use implementation::DomImplementation;
pub use mutation::NodeOrText;
pub use node::{Node, NodeData, NodeType};
pub use query::{DocumentPosition, Ancestors, Children, Descendants};
pub use range::{BoundaryPoint, LiveRange, RangeId};
pub use tree::DomTree;

/// Node identifier (index into the tree arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Raw arena index, stable for the lifetime of the tree
    pub fn index(self) -> usize {
        self.0 as usize
    }
}
