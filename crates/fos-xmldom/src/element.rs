//! Element Attributes and Names
//!
//! getAttribute/setAttribute and their NS and Attr-node variants. An
//! element's attribute list is ordered and holds at most one Attr per
//! (namespace, local name); an Attr belongs to at most one element.

use crate::error::{DomError, DomResult};
use crate::namespace;
use crate::node::{AttrData, NodeData};
use crate::tree::DomTree;
use crate::NodeId;

impl DomTree {
    // --- Names ---

    /// `tagName`: the qualified name, upper-cased for HTML elements in
    /// HTML documents
    pub fn tag_name(&self, id: NodeId) -> Option<String> {
        let qualified = self.node(id).as_element()?.qualified_name();
        if self.is_html_element_in_html_document(id) {
            Some(qualified.to_ascii_uppercase())
        } else {
            Some(qualified)
        }
    }

    /// `localName` of an element or attribute
    pub fn local_name(&self, id: NodeId) -> Option<String> {
        match &self.node(id).data {
            NodeData::Element(e) => Some(e.local_name.clone()),
            NodeData::Attr(a) => Some(a.local_name.clone()),
            _ => None,
        }
    }

    /// `namespaceURI` of an element or attribute
    pub fn namespace_uri(&self, id: NodeId) -> Option<String> {
        match &self.node(id).data {
            NodeData::Element(e) => e.namespace.clone(),
            NodeData::Attr(a) => a.namespace.clone(),
            _ => None,
        }
    }

    /// `prefix` of an element or attribute
    pub fn prefix(&self, id: NodeId) -> Option<String> {
        match &self.node(id).data {
            NodeData::Element(e) => e.prefix.clone(),
            NodeData::Attr(a) => a.prefix.clone(),
            _ => None,
        }
    }

    /// `id`: the value of the un-namespaced `id` attribute, or `""`
    pub fn id(&self, element: NodeId) -> String {
        self.get_attribute_ns(element, None, "id").unwrap_or_default()
    }

    // --- Lookup ---

    fn attribute_ids(&self, element: NodeId) -> &[NodeId] {
        self.node(element)
            .as_element()
            .map(|e| e.attributes.as_slice())
            .unwrap_or(&[])
    }

    fn attr(&self, attr: NodeId) -> Option<&AttrData> {
        self.node(attr).as_attr()
    }

    /// "Get an attribute by name": HTML elements in HTML documents match
    /// the lower-cased name
    pub fn get_attribute_node(&self, element: NodeId, qualified_name: &str) -> Option<NodeId> {
        let name = if self.is_html_element_in_html_document(element) {
            qualified_name.to_ascii_lowercase()
        } else {
            qualified_name.to_string()
        };
        self.attribute_ids(element)
            .iter()
            .copied()
            .find(|&a| self.attr(a).is_some_and(|a| a.qualified_name() == name))
    }

    pub fn get_attribute_node_ns(
        &self,
        element: NodeId,
        namespace: Option<&str>,
        local_name: &str,
    ) -> Option<NodeId> {
        let namespace = namespace.filter(|ns| !ns.is_empty());
        self.attribute_ids(element)
            .iter()
            .copied()
            .find(|&a| self.attr(a).is_some_and(|a| a.matches(namespace, local_name)))
    }

    pub fn get_attribute(&self, element: NodeId, qualified_name: &str) -> Option<String> {
        let attr = self.get_attribute_node(element, qualified_name)?;
        self.attr(attr).map(|a| a.value.clone())
    }

    pub fn get_attribute_ns(
        &self,
        element: NodeId,
        namespace: Option<&str>,
        local_name: &str,
    ) -> Option<String> {
        let attr = self.get_attribute_node_ns(element, namespace, local_name)?;
        self.attr(attr).map(|a| a.value.clone())
    }

    /// Qualified names of all attributes, in order
    pub fn get_attribute_names(&self, element: NodeId) -> Vec<String> {
        self.attribute_ids(element)
            .iter()
            .filter_map(|&a| self.attr(a))
            .map(AttrData::qualified_name)
            .collect()
    }

    pub fn has_attribute(&self, element: NodeId, qualified_name: &str) -> bool {
        self.get_attribute_node(element, qualified_name).is_some()
    }

    pub fn has_attribute_ns(&self, element: NodeId, namespace: Option<&str>, local_name: &str) -> bool {
        self.get_attribute_node_ns(element, namespace, local_name).is_some()
    }

    pub fn has_attributes(&self, element: NodeId) -> bool {
        !self.attribute_ids(element).is_empty()
    }

    /// `ownerElement` of an Attr
    pub fn owner_element(&self, attr: NodeId) -> Option<NodeId> {
        self.attr(attr).and_then(AttrData::owner_element)
    }

    // --- Mutation ---

    /// `setAttribute(name, value)`
    pub fn set_attribute(&mut self, element: NodeId, qualified_name: &str, value: &str) -> DomResult<()> {
        if !namespace::is_valid_name(qualified_name) {
            return Err(DomError::InvalidCharacter("attribute name does not match the Name production"));
        }
        if !self.node(element).is_element() {
            return Err(DomError::InvalidNodeType("attributes can only be set on elements"));
        }
        let name = if self.is_html_element_in_html_document(element) {
            qualified_name.to_ascii_lowercase()
        } else {
            qualified_name.to_string()
        };

        match self.get_attribute_node(element, &name) {
            Some(attr) => self.change_attr_value(attr, value),
            None => {
                let document = self.node_document(element);
                let attr = self.alloc_attr(document, AttrData::new(None, None, name, value.to_string()));
                self.append_attribute(element, attr);
            }
        }
        Ok(())
    }

    /// `setAttributeNS(namespace, qualifiedName, value)`
    pub fn set_attribute_ns(
        &mut self,
        element: NodeId,
        namespace: Option<&str>,
        qualified_name: &str,
        value: &str,
    ) -> DomResult<()> {
        let name = namespace::validate_and_extract(namespace, qualified_name)?;
        if !self.node(element).is_element() {
            return Err(DomError::InvalidNodeType("attributes can only be set on elements"));
        }

        match self.get_attribute_node_ns(element, name.namespace.as_deref(), &name.local_name) {
            Some(attr) => self.change_attr_value(attr, value),
            None => {
                let document = self.node_document(element);
                let data = AttrData::new(name.namespace, name.prefix, name.local_name, value.to_string());
                let attr = self.alloc_attr(document, data);
                self.append_attribute(element, attr);
            }
        }
        Ok(())
    }

    /// `removeAttribute(name)`: a missing attribute is not an error
    pub fn remove_attribute(&mut self, element: NodeId, qualified_name: &str) {
        if let Some(attr) = self.get_attribute_node(element, qualified_name) {
            self.detach_attribute(element, attr);
        }
    }

    /// `removeAttributeNS(namespace, localName)`: silent when absent
    pub fn remove_attribute_ns(&mut self, element: NodeId, namespace: Option<&str>, local_name: &str) {
        if let Some(attr) = self.get_attribute_node_ns(element, namespace, local_name) {
            self.detach_attribute(element, attr);
        }
    }

    /// `toggleAttribute(name, force)`: returns whether the attribute is
    /// present afterwards
    pub fn toggle_attribute(
        &mut self,
        element: NodeId,
        qualified_name: &str,
        force: Option<bool>,
    ) -> DomResult<bool> {
        if !namespace::is_valid_name(qualified_name) {
            return Err(DomError::InvalidCharacter("attribute name does not match the Name production"));
        }
        let present = self.has_attribute(element, qualified_name);
        match (present, force) {
            (false, None | Some(true)) => {
                self.set_attribute(element, qualified_name, "")?;
                Ok(true)
            }
            (true, None | Some(false)) => {
                self.remove_attribute(element, qualified_name);
                Ok(false)
            }
            (present, _) => Ok(present),
        }
    }

    /// `setAttributeNode(attr)`: returns the Attr it replaced
    pub fn set_attribute_node(&mut self, element: NodeId, attr: NodeId) -> DomResult<Option<NodeId>> {
        let Some(data) = self.attr(attr) else {
            return Err(DomError::HierarchyRequest("node is not an attribute"));
        };
        if !self.node(element).is_element() {
            return Err(DomError::InvalidNodeType("attributes can only be set on elements"));
        }
        if data.owner_element.is_some_and(|owner| owner != element) {
            return Err(DomError::InUseAttribute);
        }

        let namespace = data.namespace.clone();
        let local_name = data.local_name.clone();
        let old = self.get_attribute_node_ns(element, namespace.as_deref(), &local_name);
        if old == Some(attr) {
            return Ok(Some(attr));
        }

        match old {
            Some(old) => self.replace_attribute(element, old, attr),
            None => self.append_attribute(element, attr),
        }
        Ok(old)
    }

    /// `setAttributeNodeNS(attr)`
    pub fn set_attribute_node_ns(&mut self, element: NodeId, attr: NodeId) -> DomResult<Option<NodeId>> {
        self.set_attribute_node(element, attr)
    }

    /// `removeAttributeNode(attr)`
    pub fn remove_attribute_node(&mut self, element: NodeId, attr: NodeId) -> DomResult<NodeId> {
        if !self.attribute_ids(element).contains(&attr) {
            return Err(DomError::NotFound("attribute is not owned by this element"));
        }
        self.detach_attribute(element, attr);
        Ok(attr)
    }

    /// Selector matching lives outside this crate
    pub fn query_selector(&self, _root: NodeId, selector: &str) -> DomResult<Option<NodeId>> {
        tracing::warn!("querySelector({}) is not supported", selector);
        Err(DomError::NotSupported("selectors are not supported"))
    }

    pub fn query_selector_all(&self, _root: NodeId, selector: &str) -> DomResult<Vec<NodeId>> {
        tracing::warn!("querySelectorAll({}) is not supported", selector);
        Err(DomError::NotSupported("selectors are not supported"))
    }

    // --- Attribute list primitives ---

    pub(crate) fn change_attr_value(&mut self, attr: NodeId, value: &str) {
        if let Some(data) = self.node_mut(attr).as_attr_mut() {
            data.value = value.to_string();
        }
    }

    /// Append `attr` to `element`'s list, taking it into the element's document
    pub(crate) fn append_attribute(&mut self, element: NodeId, attr: NodeId) {
        let document = self.node_document(element);
        if let Some(data) = self.node_mut(attr).as_attr_mut() {
            data.owner_element = Some(element);
        }
        self.node_mut(attr).owner_document = Some(document);
        if let Some(el) = self.node_mut(element).as_element_mut() {
            el.attributes.push(attr);
        }
    }

    /// Put `new` in `old`'s slot
    fn replace_attribute(&mut self, element: NodeId, old: NodeId, new: NodeId) {
        let document = self.node_document(element);
        if let Some(el) = self.node_mut(element).as_element_mut() {
            if let Some(slot) = el.attributes.iter_mut().find(|a| **a == old) {
                *slot = new;
            }
        }
        if let Some(data) = self.node_mut(old).as_attr_mut() {
            data.owner_element = None;
        }
        if let Some(data) = self.node_mut(new).as_attr_mut() {
            data.owner_element = Some(element);
        }
        self.node_mut(new).owner_document = Some(document);
    }

    pub(crate) fn detach_attribute(&mut self, element: NodeId, attr: NodeId) {
        if let Some(el) = self.node_mut(element).as_element_mut() {
            el.attributes.retain(|&a| a != attr);
        }
        if let Some(data) = self.node_mut(attr).as_attr_mut() {
            data.owner_element = None;
        }
    }
}
