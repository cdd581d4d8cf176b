//! XML Parser
//!
//! Builds a document from XML text using `quick-xml` for lexing. Every
//! node is created through the public factories and attached with
//! `append_child`, so a parsed tree obeys the same invariants as one
//! built by hand.
//!
//! Namespaces are resolved as each element opens: the element's own
//! `xmlns` declarations first, then `lookup_namespace_uri` on the parent.
//!
//! Line endings are normalized to `\n` everywhere, and literal whitespace
//! in attribute values becomes a space, as XML 1.0 requires of a processor
//! without a DTD.

use std::borrow::Cow;
use std::collections::HashMap;

use quick_xml::escape::{resolve_predefined_entity, unescape};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::DomError;
use crate::namespace::{XML_NAMESPACE, XMLNS_NAMESPACE};
use crate::node::{DocumentTypeData, NodeType};
use crate::tree::DomTree;
use crate::NodeId;

/// Failures while building a document from text
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// The lexer rejected the input
    #[error("XML syntax error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Well-formed to the lexer but not a valid document
    #[error("malformed document: {0}")]
    Syntax(String),

    /// A DOM operation rejected the constructed node
    #[error(transparent)]
    Dom(#[from] DomError),
}

/// Parse `text` into a fresh XML document owned by `tree`
///
/// ```
/// use fos_xmldom::{DomTree, parser, serial};
///
/// let mut tree = DomTree::new();
/// let doc = parser::parse_xml(&mut tree, r#"<p:a xmlns:p="urn:p"><p:b/></p:a>"#).unwrap();
/// let root = tree.document_element(doc).unwrap();
/// assert_eq!(tree.namespace_uri(root).as_deref(), Some("urn:p"));
/// assert_eq!(
///     serial::serialize_to_string(&tree, doc).unwrap(),
///     r#"<p:a xmlns:p="urn:p"><p:b/></p:a>"#
/// );
/// ```
pub fn parse_xml(tree: &mut DomTree, text: &str) -> Result<NodeId, ParseError> {
    let document = tree.create_document();
    tracing::debug!("Parsing {} bytes of XML into {:?}", text.len(), document);

    let mut builder = Builder {
        tree,
        document,
        open: Vec::new(),
        pending_text: String::new(),
    };

    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(false);

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                builder.flush_text()?;
                let element = builder.element(&e)?;
                builder.open.push(element);
            }
            Event::Empty(e) => {
                builder.flush_text()?;
                builder.element(&e)?;
            }
            Event::End(_) => {
                builder.flush_text()?;
                builder.open.pop();
            }
            Event::Text(e) => {
                let raw = normalize_line_endings(utf8(e.as_ref())?);
                let decoded = unescape(&raw).map_err(|err| ParseError::Syntax(err.to_string()))?;
                builder.pending_text.push_str(&decoded);
            }
            Event::GeneralRef(e) => {
                let name = utf8(e.as_ref())?;
                let resolved = match name.strip_prefix('#') {
                    Some(code) => resolve_char_reference(code).map(String::from),
                    None => resolve_predefined_entity(name).map(str::to_string),
                };
                let resolved =
                    resolved.ok_or_else(|| ParseError::Syntax(format!("unknown entity reference `&{name};`")))?;
                builder.pending_text.push_str(&resolved);
            }
            Event::CData(e) => {
                builder.flush_text()?;
                let data = normalize_line_endings(utf8(&e)?).into_owned();
                let node = builder.tree.create_cdata_section(document, &data)?;
                builder.append(node)?;
            }
            Event::Comment(e) => {
                builder.flush_text()?;
                let data = normalize_line_endings(utf8(e.as_ref())?).into_owned();
                let node = builder.tree.create_comment(document, &data);
                builder.append(node)?;
            }
            Event::PI(e) => {
                builder.flush_text()?;
                let target = utf8(e.target())?.to_string();
                let data = normalize_line_endings(utf8(e.content())?.trim_start()).into_owned();
                let node = builder.tree.create_processing_instruction(document, &target, &data)?;
                builder.append(node)?;
            }
            Event::DocType(e) => {
                builder.flush_text()?;
                let data = parse_doctype(utf8(&e)?)?;
                let node = builder.tree.implementation(document).create_document_type(
                    builder.tree,
                    &data.name,
                    &data.public_id,
                    &data.system_id,
                )?;
                builder.append(node)?;
            }
            Event::Decl(_) => {}
            Event::Eof => break,
        }
    }
    builder.flush_text()?;

    if !builder.open.is_empty() {
        return Err(ParseError::Syntax("unclosed element at end of input".to_string()));
    }
    if builder.tree.document_element(document).is_none() {
        return Err(ParseError::Syntax("document has no root element".to_string()));
    }

    tracing::debug!("Parsed {:?} ({} nodes in tree)", document, builder.tree.len());
    Ok(document)
}

struct Builder<'t> {
    tree: &'t mut DomTree,
    document: NodeId,
    /// Elements whose end tag has not been seen yet
    open: Vec<NodeId>,
    /// Adjacent text and references coalesce into one Text node
    pending_text: String,
}

impl Builder<'_> {
    fn parent(&self) -> NodeId {
        self.open.last().copied().unwrap_or(self.document)
    }

    fn append(&mut self, node: NodeId) -> Result<(), ParseError> {
        let parent = self.parent();
        self.tree.append_child(parent, node)?;
        Ok(())
    }

    fn flush_text(&mut self) -> Result<(), ParseError> {
        if self.pending_text.is_empty() {
            return Ok(());
        }
        let text = std::mem::take(&mut self.pending_text);
        if self.open.is_empty() {
            // whitespace between prolog items has no node
            if text.trim().is_empty() {
                return Ok(());
            }
            return Err(ParseError::Syntax("character data outside the root element".to_string()));
        }
        let node = self.tree.create_text_node(self.document, &text);
        self.append(node)
    }

    fn element(&mut self, start: &BytesStart<'_>) -> Result<NodeId, ParseError> {
        let qualified_name = utf8(start.name().into_inner())?.to_string();

        let mut attributes = Vec::new();
        let mut declarations: HashMap<Option<String>, Option<String>> = HashMap::new();
        for attr in start.attributes() {
            let attr = attr.map_err(quick_xml::Error::from)?;
            let name = utf8(attr.key.into_inner())?.to_string();
            let value = unescape(&normalize_attribute_value(utf8(&attr.value)?))
                .map_err(|err| ParseError::Syntax(err.to_string()))?
                .into_owned();

            if name == "xmlns" {
                declarations.insert(None, (!value.is_empty()).then(|| value.clone()));
            } else if let Some(prefix) = name.strip_prefix("xmlns:") {
                declarations.insert(Some(prefix.to_string()), (!value.is_empty()).then(|| value.clone()));
            }
            attributes.push((name, value));
        }

        let parent = self.parent();
        let prefix = qualified_name.split_once(':').map(|(p, _)| p);
        let namespace = self.resolve(parent, &declarations, prefix)?;
        let element = self
            .tree
            .create_element_ns(self.document, namespace.as_deref(), &qualified_name)?;

        for (name, value) in &attributes {
            let namespace = match name.split_once(':') {
                Some(("xmlns", _)) => Some(XMLNS_NAMESPACE.to_string()),
                Some((prefix, _)) => self.resolve(parent, &declarations, Some(prefix))?,
                None if name == "xmlns" => Some(XMLNS_NAMESPACE.to_string()),
                None => None,
            };
            self.tree
                .set_attribute_ns(element, namespace.as_deref(), name, value)?;
        }

        self.append(element)?;
        Ok(element)
    }

    /// Namespace bound to `prefix` for an element opening under `parent`
    fn resolve(
        &self,
        parent: NodeId,
        declarations: &HashMap<Option<String>, Option<String>>,
        prefix: Option<&str>,
    ) -> Result<Option<String>, ParseError> {
        if let Some(declared) = declarations.get(&prefix.map(str::to_string)) {
            return Ok(declared.clone());
        }
        if prefix == Some("xml") {
            return Ok(Some(XML_NAMESPACE.to_string()));
        }
        let namespace = match self.tree.node_type(parent) {
            NodeType::Element => self.tree.lookup_namespace_uri(parent, prefix),
            _ => None,
        };
        match (prefix, namespace) {
            (Some(prefix), None) => Err(ParseError::Syntax(format!("unbound namespace prefix `{prefix}`"))),
            (_, namespace) => Ok(namespace),
        }
    }
}

fn utf8(bytes: &[u8]) -> Result<&str, ParseError> {
    std::str::from_utf8(bytes).map_err(|err| ParseError::Syntax(err.to_string()))
}

/// `\r\n` and a lone `\r` both become `\n`
fn normalize_line_endings(s: &str) -> Cow<'_, str> {
    if !s.contains('\r') {
        return Cow::Borrowed(s);
    }
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '\r' {
            if chars.peek() == Some(&'\n') {
                chars.next();
            }
            out.push('\n');
        } else {
            out.push(ch);
        }
    }
    Cow::Owned(out)
}

/// Literal tabs and line breaks in a raw attribute value become spaces.
/// Runs before unescaping, so `&#9;` still yields a tab.
fn normalize_attribute_value(raw: &str) -> Cow<'_, str> {
    let raw = normalize_line_endings(raw);
    if raw.contains(['\t', '\n']) {
        Cow::Owned(raw.replace(['\t', '\n'], " "))
    } else {
        raw
    }
}

fn resolve_char_reference(code: &str) -> Option<char> {
    let code_point = match code.strip_prefix('x') {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => code.parse::<u32>().ok()?,
    };
    char::from_u32(code_point)
}

/// Split the body of `<!DOCTYPE ...>` into name, public id and system id.
/// An internal subset is skipped.
fn parse_doctype(raw: &str) -> Result<DocumentTypeData, ParseError> {
    let raw = raw.split('[').next().unwrap_or_default().trim();
    let (name, rest) = raw.split_once(char::is_whitespace).unwrap_or((raw, ""));
    if name.is_empty() {
        return Err(ParseError::Syntax("doctype without a name".to_string()));
    }

    let mut rest = rest.trim_start();
    let mut literals = Vec::new();
    let keyword = if let Some(r) = rest.strip_prefix("PUBLIC") {
        rest = r;
        Some(2)
    } else if let Some(r) = rest.strip_prefix("SYSTEM") {
        rest = r;
        Some(1)
    } else {
        None
    };

    if let Some(count) = keyword {
        for _ in 0..count {
            rest = rest.trim_start();
            let Some(quote) = rest.chars().next().filter(|c| *c == '"' || *c == '\'') else {
                break;
            };
            let body = &rest[1..];
            let end = body
                .find(quote)
                .ok_or_else(|| ParseError::Syntax("unterminated doctype literal".to_string()))?;
            literals.push(body[..end].to_string());
            rest = &body[end + 1..];
        }
    }

    let (public_id, system_id) = match (keyword, literals.as_slice()) {
        (Some(2), [public, system]) => (public.clone(), system.clone()),
        (Some(2), [public]) => (public.clone(), String::new()),
        (Some(1), [system]) => (String::new(), system.clone()),
        _ => (String::new(), String::new()),
    };

    Ok(DocumentTypeData {
        name: name.to_string(),
        public_id,
        system_id,
    })
}
