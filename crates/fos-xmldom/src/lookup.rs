//! Namespace Resolution
//!
//! `lookupNamespaceURI`, `lookupPrefix` and `isDefaultNamespace`, walking
//! the ancestor chain and the `xmlns` declarations found on the way.

use crate::namespace::{XML_NAMESPACE, XMLNS_NAMESPACE};
use crate::node::NodeData;
use crate::tree::DomTree;
use crate::NodeId;

impl DomTree {
    /// The element a namespace lookup on `id` starts from, if any
    fn lookup_element(&self, id: NodeId) -> Option<NodeId> {
        match &self.node(id).data {
            NodeData::Element(_) => Some(id),
            NodeData::Document(_) => self.document_element(id),
            NodeData::DocumentType(_) | NodeData::DocumentFragment => None,
            NodeData::Attr(attr) => attr.owner_element(),
            _ => self.parent_element(id),
        }
    }

    /// "Locate a namespace" for `prefix` (`None` is the default namespace)
    fn locate_namespace(&self, id: NodeId, prefix: Option<&str>) -> Option<String> {
        match prefix {
            Some("xml") => return Some(XML_NAMESPACE.to_string()),
            Some("xmlns") => return Some(XMLNS_NAMESPACE.to_string()),
            _ => {}
        }

        let mut current = self.lookup_element(id);
        while let Some(element) = current {
            let data = self.node(element).as_element()?;
            if data.namespace.is_some() && data.prefix.as_deref() == prefix {
                return data.namespace.clone();
            }

            let declaration = data.attributes.iter().filter_map(|&a| self.node(a).as_attr()).find(|a| {
                a.namespace.as_deref() == Some(XMLNS_NAMESPACE)
                    && match prefix {
                        Some(prefix) => a.prefix.as_deref() == Some("xmlns") && a.local_name == prefix,
                        None => a.prefix.is_none() && a.local_name == "xmlns",
                    }
            });
            if let Some(attr) = declaration {
                return (!attr.value.is_empty()).then(|| attr.value.clone());
            }

            current = self.parent_element(element);
        }
        None
    }

    /// `lookupNamespaceURI(prefix)`; an empty prefix means the default namespace
    pub fn lookup_namespace_uri(&self, id: NodeId, prefix: Option<&str>) -> Option<String> {
        let prefix = prefix.filter(|p| !p.is_empty());
        self.locate_namespace(id, prefix)
    }

    /// `lookupPrefix(namespace)`
    pub fn lookup_prefix(&self, id: NodeId, namespace: Option<&str>) -> Option<String> {
        let namespace = namespace.filter(|ns| !ns.is_empty())?;

        let mut current = self.lookup_element(id);
        while let Some(element) = current {
            let data = self.node(element).as_element()?;
            if data.namespace.as_deref() == Some(namespace) && data.prefix.is_some() {
                return data.prefix.clone();
            }

            let declared = data
                .attributes
                .iter()
                .filter_map(|&a| self.node(a).as_attr())
                .find(|a| a.prefix.as_deref() == Some("xmlns") && a.value == namespace);
            if let Some(attr) = declared {
                return Some(attr.local_name.clone());
            }

            current = self.parent_element(element);
        }
        None
    }

    /// `isDefaultNamespace(namespace)`
    pub fn is_default_namespace(&self, id: NodeId, namespace: Option<&str>) -> bool {
        let namespace = namespace.filter(|ns| !ns.is_empty());
        self.locate_namespace(id, None).as_deref() == namespace
    }
}
