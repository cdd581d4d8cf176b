//! XML Serialization
//!
//! Namespace-aware serialization of a node and its subtree, either to a
//! string or to a [`PreSerializedNode`] tree for pretty-printing and
//! streaming callers.

mod prefix_map;
mod tuple_set;
mod xml;

pub use prefix_map::NamespacePrefixMap;
pub use tuple_set::TupleSet;
pub use xml::{
    pre_serialize, serialize_to_string, serialize_with_options, ElementEnd, PreSerializedKind,
    PreSerializedNode, SerializeOptions, SerializedAttribute, XmlVersion,
};
