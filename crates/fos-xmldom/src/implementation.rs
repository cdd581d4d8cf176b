//! DOMImplementation
//!
//! Convenience constructors for documents and doctypes. Everything they
//! build goes through the ordinary factories and `append_child`.

use crate::error::{DomError, DomResult};
use crate::namespace::{self, HTML_NAMESPACE, SVG_NAMESPACE};
use crate::node::{DocumentData, DocumentTypeData, NodeType};
use crate::tree::DomTree;
use crate::NodeId;

/// `document.implementation`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DomImplementation {
    document: NodeId,
}

impl DomImplementation {
    /// The document this implementation object belongs to
    pub fn document(&self) -> NodeId {
        self.document
    }

    /// Always `true`
    pub fn has_feature(&self) -> bool {
        true
    }

    /// `createDocumentType(name, publicId, systemId)`
    pub fn create_document_type(
        &self,
        tree: &mut DomTree,
        name: &str,
        public_id: &str,
        system_id: &str,
    ) -> DomResult<NodeId> {
        namespace::validate(name)?;
        let data = DocumentTypeData {
            name: name.to_string(),
            public_id: public_id.to_string(),
            system_id: system_id.to_string(),
        };
        Ok(tree.alloc_doctype(self.document, data))
    }

    /// `createDocument(namespace, qualifiedName, doctype)`
    ///
    /// The content type follows the namespace: XHTML for the HTML
    /// namespace, SVG for the SVG namespace, XML otherwise.
    pub fn create_document(
        &self,
        tree: &mut DomTree,
        namespace: Option<&str>,
        qualified_name: &str,
        doctype: Option<NodeId>,
    ) -> DomResult<NodeId> {
        if !qualified_name.is_empty() {
            namespace::validate_and_extract(namespace, qualified_name)?;
        }
        if let Some(doctype) = doctype {
            if tree.node_type(doctype) != NodeType::DocumentType {
                return Err(DomError::HierarchyRequest("doctype argument is not a document type"));
            }
        }

        let content_type = match namespace {
            Some(HTML_NAMESPACE) => DocumentData::XHTML,
            Some(SVG_NAMESPACE) => DocumentData::SVG,
            _ => DocumentData::XML,
        };
        let document = tree.create_document_with_content_type(content_type);

        if let Some(doctype) = doctype {
            tree.append_child(document, doctype)?;
        }
        if !qualified_name.is_empty() {
            let element = tree.create_element_ns(document, namespace, qualified_name)?;
            tree.append_child(document, element)?;
        }
        Ok(document)
    }

    /// `createHTMLDocument(title)`: doctype, `html`, `head` (with `title`
    /// when given) and `body`
    pub fn create_html_document(&self, tree: &mut DomTree, title: Option<&str>) -> DomResult<NodeId> {
        let document = tree.create_document_with_content_type(DocumentData::HTML);
        let doctype = DomImplementation { document }.create_document_type(tree, "html", "", "")?;
        tree.append_child(document, doctype)?;

        let html = tree.create_element(document, "html")?;
        tree.append_child(document, html)?;
        let head = tree.create_element(document, "head")?;
        tree.append_child(html, head)?;

        if let Some(title) = title {
            let title_element = tree.create_element(document, "title")?;
            let text = tree.create_text_node(document, title);
            tree.append_child(title_element, text)?;
            tree.append_child(head, title_element)?;
        }

        let body = tree.create_element(document, "body")?;
        tree.append_child(html, body)?;
        Ok(document)
    }
}

impl DomTree {
    /// `document.implementation`
    pub fn implementation(&self, document: NodeId) -> DomImplementation {
        DomImplementation {
            document: self.node_document(document),
        }
    }
}
