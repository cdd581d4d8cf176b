//! Live collection views
//!
//! `NodeList`, `HtmlCollection` and `NamedNodeMap` store only their root
//! and filter. Every access re-queries the tree, so a view never goes
//! stale and never needs invalidating.

use crate::error::{DomError, DomResult};
use crate::namespace::HTML_NAMESPACE;
use crate::query::Children;
use crate::tree::DomTree;
use crate::NodeId;

/// Live list of a node's children
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeList {
    parent: NodeId,
}

impl NodeList {
    pub fn length(&self, tree: &DomTree) -> usize {
        tree.child_count(self.parent)
    }

    pub fn item(&self, tree: &DomTree, index: usize) -> Option<NodeId> {
        tree.children(self.parent).nth(index)
    }

    pub fn iter<'a>(&self, tree: &'a DomTree) -> Children<'a> {
        tree.children(self.parent)
    }
}

/// Which elements an [`HtmlCollection`] selects
#[derive(Debug, Clone, PartialEq, Eq)]
enum Filter {
    /// Element children of the root
    Children,
    /// Descendant elements by qualified name (`*` matches all)
    TagName(String),
    /// Descendant elements by namespace and local name (`*` wildcards)
    TagNameNs {
        namespace: Option<String>,
        local_name: String,
    },
}

/// Live, filtered view of elements under a root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlCollection {
    root: NodeId,
    filter: Filter,
}

impl HtmlCollection {
    pub fn iter<'a>(&'a self, tree: &'a DomTree) -> Box<dyn Iterator<Item = NodeId> + 'a> {
        match &self.filter {
            Filter::Children => Box::new(tree.element_children(self.root)),
            filter => Box::new(
                tree.descendants(self.root)
                    .filter(move |&d| Self::matches(tree, filter, d)),
            ),
        }
    }

    fn matches(tree: &DomTree, filter: &Filter, id: NodeId) -> bool {
        let Some(element) = tree.node(id).as_element() else {
            return false;
        };
        match filter {
            Filter::Children => true,
            Filter::TagName(name) if name == "*" => true,
            Filter::TagName(name) => {
                let qualified = element.qualified_name();
                if tree.is_html_document(tree.node_document(id))
                    && element.namespace.as_deref() == Some(HTML_NAMESPACE)
                {
                    qualified == name.to_ascii_lowercase()
                } else {
                    qualified == *name
                }
            }
            Filter::TagNameNs { namespace, local_name } => {
                let namespace_ok = namespace.as_deref() == Some("*") || element.namespace == *namespace;
                let local_ok = local_name == "*" || element.local_name == *local_name;
                namespace_ok && local_ok
            }
        }
    }

    pub fn length(&self, tree: &DomTree) -> usize {
        self.iter(tree).count()
    }

    pub fn item(&self, tree: &DomTree, index: usize) -> Option<NodeId> {
        self.iter(tree).nth(index)
    }

    /// First element whose `id` is `key`, or an HTML element whose `name` is `key`
    pub fn named_item(&self, tree: &DomTree, key: &str) -> Option<NodeId> {
        if key.is_empty() {
            return None;
        }
        self.iter(tree).find(|&el| {
            tree.get_attribute_ns(el, None, "id").as_deref() == Some(key)
                || (tree.namespace_uri(el).as_deref() == Some(HTML_NAMESPACE)
                    && tree.get_attribute_ns(el, None, "name").as_deref() == Some(key))
        })
    }
}

/// Live view of an element's attribute list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NamedNodeMap {
    element: NodeId,
}

impl NamedNodeMap {
    /// The element whose attributes this map exposes
    pub fn owner(&self) -> NodeId {
        self.element
    }

    pub fn length(&self, tree: &DomTree) -> usize {
        tree.node(self.element)
            .as_element()
            .map_or(0, |e| e.attributes.len())
    }

    pub fn item(&self, tree: &DomTree, index: usize) -> Option<NodeId> {
        tree.node(self.element)
            .as_element()
            .and_then(|e| e.attributes.get(index).copied())
    }

    pub fn get_named_item(&self, tree: &DomTree, qualified_name: &str) -> Option<NodeId> {
        tree.get_attribute_node(self.element, qualified_name)
    }

    pub fn get_named_item_ns(
        &self,
        tree: &DomTree,
        namespace: Option<&str>,
        local_name: &str,
    ) -> Option<NodeId> {
        tree.get_attribute_node_ns(self.element, namespace, local_name)
    }

    pub fn set_named_item(&self, tree: &mut DomTree, attr: NodeId) -> DomResult<Option<NodeId>> {
        tree.set_attribute_node(self.element, attr)
    }

    pub fn set_named_item_ns(&self, tree: &mut DomTree, attr: NodeId) -> DomResult<Option<NodeId>> {
        tree.set_attribute_node_ns(self.element, attr)
    }

    /// Unlike `removeAttribute`, a missing name is an error here
    pub fn remove_named_item(&self, tree: &mut DomTree, qualified_name: &str) -> DomResult<NodeId> {
        let attr = tree
            .get_attribute_node(self.element, qualified_name)
            .ok_or(DomError::NotFound("no attribute with that name"))?;
        tree.detach_attribute(self.element, attr);
        Ok(attr)
    }

    pub fn remove_named_item_ns(
        &self,
        tree: &mut DomTree,
        namespace: Option<&str>,
        local_name: &str,
    ) -> DomResult<NodeId> {
        let attr = tree
            .get_attribute_node_ns(self.element, namespace, local_name)
            .ok_or(DomError::NotFound("no attribute with that namespace and local name"))?;
        tree.detach_attribute(self.element, attr);
        Ok(attr)
    }
}

impl DomTree {
    /// `childNodes`
    pub fn child_nodes(&self, id: NodeId) -> NodeList {
        NodeList { parent: id }
    }

    /// `ParentNode.children`
    pub fn child_elements(&self, id: NodeId) -> HtmlCollection {
        HtmlCollection { root: id, filter: Filter::Children }
    }

    /// `getElementsByTagName(qualifiedName)`
    pub fn get_elements_by_tag_name(&self, root: NodeId, qualified_name: &str) -> HtmlCollection {
        HtmlCollection {
            root,
            filter: Filter::TagName(qualified_name.to_string()),
        }
    }

    /// `getElementsByTagNameNS(namespace, localName)`
    pub fn get_elements_by_tag_name_ns(
        &self,
        root: NodeId,
        namespace: Option<&str>,
        local_name: &str,
    ) -> HtmlCollection {
        HtmlCollection {
            root,
            filter: Filter::TagNameNs {
                namespace: namespace.filter(|ns| !ns.is_empty()).map(str::to_string),
                local_name: local_name.to_string(),
            },
        }
    }

    /// `getElementById`: first descendant element in tree order
    pub fn get_element_by_id(&self, root: NodeId, id: &str) -> Option<NodeId> {
        if id.is_empty() {
            return None;
        }
        self.descendants(root)
            .find(|&d| self.node(d).is_element() && self.get_attribute_ns(d, None, "id").as_deref() == Some(id))
    }

    /// `Element.attributes`
    pub fn attributes(&self, element: NodeId) -> NamedNodeMap {
        NamedNodeMap { element }
    }
}
