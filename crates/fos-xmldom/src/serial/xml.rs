//! XML serializer
//!
//! One recursive pass builds a [`PreSerializedNode`] tree: qualified names
//! resolved, namespace declarations placed, text escaped. Flat and pretty
//! string output are renderings of that tree.
//!
//! Threaded through the recursion: the context namespace (inherited
//! default namespace), a [`NamespacePrefixMap`] cloned per element, and
//! the generated-prefix counter, shared by `&mut` across the whole pass.

use std::collections::HashMap;

use super::prefix_map::NamespacePrefixMap;
use super::tuple_set::TupleSet;
use crate::error::{DomResult, WellFormedError};
use crate::namespace::{self, HTML_NAMESPACE, XML_NAMESPACE, XMLNS_NAMESPACE};
use crate::node::{DocumentTypeData, ElementData, NodeData};
use crate::tree::DomTree;
use crate::NodeId;

/// HTML elements that never have content
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "basefont", "bgsound", "br", "col", "embed", "frame", "hr", "img", "input",
    "keygen", "link", "menuitem", "meta", "param", "source", "track", "wbr",
];

/// XML version whose `Char` production well-formedness checks use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum XmlVersion {
    #[default]
    V1_0,
    V1_1,
}

impl XmlVersion {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::V1_0 => "1.0",
            Self::V1_1 => "1.1",
        }
    }

    fn is_char(self, c: char) -> bool {
        match self {
            Self::V1_0 => namespace::is_xml_char(c),
            Self::V1_1 => namespace::is_xml11_char(c),
        }
    }
}

/// Options controlling XML serialization output.
///
/// ```
/// use fos_xmldom::serial::{SerializeOptions, XmlVersion};
///
/// let options = SerializeOptions::default()
///     .require_well_formed(true)
///     .xml_version(XmlVersion::V1_1)
///     .indent("  ");
/// assert_eq!(options.indent.as_deref(), Some("  "));
/// ```
#[derive(Debug, Clone, Default)]
pub struct SerializeOptions {
    /// Reject trees that would not re-parse to the same tree.
    /// Defaults to `false`.
    pub require_well_formed: bool,
    /// Defaults to XML 1.0.
    pub xml_version: XmlVersion,
    /// Indentation per nesting level for pretty output; `None` (the
    /// default) produces flat output.
    pub indent: Option<String>,
}

impl SerializeOptions {
    #[must_use]
    pub fn require_well_formed(mut self, require: bool) -> Self {
        self.require_well_formed = require;
        self
    }

    #[must_use]
    pub fn xml_version(mut self, version: XmlVersion) -> Self {
        self.xml_version = version;
        self
    }

    /// Pretty-print, indenting each level with `indent`
    #[must_use]
    pub fn indent(mut self, indent: &str) -> Self {
        self.indent = Some(indent.to_string());
        self
    }
}

/// A start-tag attribute or namespace declaration, value already escaped
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SerializedAttribute {
    pub name: String,
    pub value: String,
}

impl SerializedAttribute {
    fn new(name: impl Into<String>, value: String) -> Self {
        Self { name: name.into(), value }
    }
}

/// How an element's start tag is closed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum ElementEnd {
    /// `<p>...</p>`
    EndTag,
    /// `<p/>`
    SelfClosing,
    /// `<br />`
    Void,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum PreSerializedKind {
    /// Document or fragment; only its children produce output
    Container { children: Vec<PreSerializedNode> },
    Element {
        qualified_name: String,
        /// Declarations and attributes in output order
        attributes: Vec<SerializedAttribute>,
        children: Vec<PreSerializedNode>,
        end: ElementEnd,
    },
    /// Escaped text or a CDATA section
    Text(String),
    /// Comment, processing instruction or doctype markup
    Markup(String),
}

/// One node of the annotated serialization tree
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PreSerializedNode {
    pub node: NodeId,
    /// Element nesting depth below the serialization root
    pub level: usize,
    pub kind: PreSerializedKind,
}

impl PreSerializedNode {
    /// Flat XML text
    pub fn to_xml_string(&self) -> String {
        let mut out = String::new();
        self.write_flat(&mut out);
        out
    }

    /// XML text with element-only content broken onto indented lines.
    /// Elements holding text keep their content on one line.
    pub fn to_pretty_string(&self, indent: &str) -> String {
        let mut out = String::new();
        self.write_pretty(&mut out, indent);
        out
    }

    fn write_start_tag(out: &mut String, qualified_name: &str, attributes: &[SerializedAttribute], end: ElementEnd) {
        out.push('<');
        out.push_str(qualified_name);
        for attr in attributes {
            out.push(' ');
            out.push_str(&attr.name);
            out.push_str("=\"");
            out.push_str(&attr.value);
            out.push('"');
        }
        out.push_str(match end {
            ElementEnd::EndTag => ">",
            ElementEnd::SelfClosing => "/>",
            ElementEnd::Void => " />",
        });
    }

    fn write_flat(&self, out: &mut String) {
        match &self.kind {
            PreSerializedKind::Container { children } => {
                for child in children {
                    child.write_flat(out);
                }
            }
            PreSerializedKind::Element { qualified_name, attributes, children, end } => {
                Self::write_start_tag(out, qualified_name, attributes, *end);
                if *end == ElementEnd::EndTag {
                    for child in children {
                        child.write_flat(out);
                    }
                    out.push_str("</");
                    out.push_str(qualified_name);
                    out.push('>');
                }
            }
            PreSerializedKind::Text(s) | PreSerializedKind::Markup(s) => out.push_str(s),
        }
    }

    /// Mixed content is rendered flat so its whitespace survives
    fn has_text(children: &[PreSerializedNode]) -> bool {
        children.iter().any(|c| matches!(c.kind, PreSerializedKind::Text(_)))
    }

    fn write_pretty(&self, out: &mut String, indent: &str) {
        match &self.kind {
            PreSerializedKind::Container { children } => {
                if Self::has_text(children) {
                    self.write_flat(out);
                    return;
                }
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        out.push('\n');
                        out.push_str(&indent.repeat(child.level));
                    }
                    child.write_pretty(out, indent);
                }
            }
            PreSerializedKind::Element { qualified_name, attributes, children, end } => {
                if Self::has_text(children) || children.is_empty() {
                    self.write_flat(out);
                    return;
                }
                Self::write_start_tag(out, qualified_name, attributes, *end);
                for child in children {
                    out.push('\n');
                    out.push_str(&indent.repeat(child.level));
                    child.write_pretty(out, indent);
                }
                out.push('\n');
                out.push_str(&indent.repeat(self.level));
                out.push_str("</");
                out.push_str(qualified_name);
                out.push('>');
            }
            PreSerializedKind::Text(s) | PreSerializedKind::Markup(s) => out.push_str(s),
        }
    }
}

/// `XMLSerializer.serializeToString(node)`: no well-formedness checks
///
/// ```
/// use fos_xmldom::{DomTree, serial};
///
/// let mut tree = DomTree::new();
/// let doc = tree.create_document();
/// let el = tree.create_element(doc, "a").unwrap();
/// tree.set_attribute(el, "q", "\"&\"").unwrap();
/// assert_eq!(serial::serialize_to_string(&tree, el).unwrap(), r#"<a q="&quot;&amp;&quot;"/>"#);
/// ```
pub fn serialize_to_string(tree: &DomTree, node: NodeId) -> DomResult<String> {
    serialize_with_options(tree, node, &SerializeOptions::default())
}

/// Serialize `node` with explicit options. Any well-formedness violation
/// surfaces as `InvalidStateError` with the violation as its source.
pub fn serialize_with_options(tree: &DomTree, node: NodeId, options: &SerializeOptions) -> DomResult<String> {
    let pre = pre_serialize(tree, node, options)?;
    Ok(match &options.indent {
        Some(indent) => pre.to_pretty_string(indent),
        None => pre.to_xml_string(),
    })
}

/// Build the annotated serialization tree for `node`
pub fn pre_serialize(tree: &DomTree, node: NodeId, options: &SerializeOptions) -> DomResult<PreSerializedNode> {
    tracing::debug!(
        "Serializing {:?} (XML {}, well-formed: {})",
        node,
        options.xml_version.as_str(),
        options.require_well_formed
    );
    let serializer = Serializer {
        tree,
        require_well_formed: options.require_well_formed,
        version: options.xml_version,
    };
    let mut map = NamespacePrefixMap::new();
    let mut prefix_index = 1;
    serializer
        .node(node, None, &mut map, &mut prefix_index, 0)
        .map_err(|cause| {
            tracing::warn!("Serialization of {:?} rejected: {}", node, cause);
            cause.into()
        })
}

type SerialResult<T> = Result<T, WellFormedError>;

/// Prefix → namespace bindings declared on the element being serialized
type LocalPrefixes = HashMap<String, Option<String>>;

struct Serializer<'t> {
    tree: &'t DomTree,
    require_well_formed: bool,
    version: XmlVersion,
}

impl Serializer<'_> {
    fn node(
        &self,
        id: NodeId,
        context_ns: Option<&str>,
        map: &mut NamespacePrefixMap,
        prefix_index: &mut usize,
        level: usize,
    ) -> SerialResult<PreSerializedNode> {
        let kind = match &self.tree.node(id).data {
            NodeData::Element(data) => {
                return self.element(id, data, context_ns, map, prefix_index, level);
            }
            NodeData::Document(_) => {
                if self.require_well_formed && self.tree.document_element(id).is_none() {
                    return Err(WellFormedError::MissingDocumentElement);
                }
                PreSerializedKind::Container {
                    children: self.children(id, context_ns, map, prefix_index, level)?,
                }
            }
            NodeData::DocumentFragment => PreSerializedKind::Container {
                children: self.children(id, context_ns, map, prefix_index, level)?,
            },
            NodeData::Text(data) => PreSerializedKind::Text(self.text(data)?),
            NodeData::CData(data) => PreSerializedKind::Text(self.cdata(data)?),
            NodeData::Comment(data) => PreSerializedKind::Markup(self.comment(data)?),
            NodeData::ProcessingInstruction { target, data } => {
                PreSerializedKind::Markup(self.processing_instruction(target, data)?)
            }
            NodeData::DocumentType(doctype) => PreSerializedKind::Markup(self.doctype(doctype)?),
            NodeData::Attr(_) => PreSerializedKind::Markup(String::new()),
        };
        Ok(PreSerializedNode { node: id, level, kind })
    }

    fn children(
        &self,
        id: NodeId,
        context_ns: Option<&str>,
        map: &mut NamespacePrefixMap,
        prefix_index: &mut usize,
        level: usize,
    ) -> SerialResult<Vec<PreSerializedNode>> {
        self.tree
            .children(id)
            .map(|child| self.node(child, context_ns, map, prefix_index, level))
            .collect()
    }

    fn element(
        &self,
        id: NodeId,
        data: &ElementData,
        context_ns: Option<&str>,
        inherited_map: &NamespacePrefixMap,
        prefix_index: &mut usize,
        level: usize,
    ) -> SerialResult<PreSerializedNode> {
        let local_name = &data.local_name;
        if self.require_well_formed && (local_name.contains(':') || !namespace::is_valid_name(local_name)) {
            return Err(WellFormedError::ElementName(local_name.clone()));
        }

        let mut map = inherited_map.clone();
        let mut local_prefixes = LocalPrefixes::new();
        let local_default = self.record_namespace_information(data, &mut map, &mut local_prefixes);

        let ns = data.namespace.as_deref();
        let mut inherited_ns = context_ns.map(str::to_string);
        let mut ignore_namespace_definition = false;
        let mut attributes = Vec::new();
        let qualified_name;

        if inherited_ns.as_deref() == ns {
            if local_default.is_some() {
                ignore_namespace_definition = true;
            }
            qualified_name = if ns == Some(XML_NAMESPACE) {
                format!("xml:{local_name}")
            } else {
                local_name.clone()
            };
        } else {
            let prefix = data.prefix.as_deref();
            let mut candidate = map.get(prefix, ns).map(str::to_string);
            if prefix == Some("xmlns") {
                if self.require_well_formed {
                    return Err(WellFormedError::XmlnsElementPrefix);
                }
                candidate = prefix.map(str::to_string);
            }

            if let Some(candidate) = candidate {
                qualified_name = format!("{candidate}:{local_name}");
                if let Some(default) = local_default.as_deref().filter(|d| *d != XML_NAMESPACE) {
                    inherited_ns = (!default.is_empty()).then(|| default.to_string());
                }
            } else if let Some(prefix) = prefix {
                let prefix = if local_prefixes.contains_key(prefix) {
                    map.generate(ns, prefix_index)
                } else {
                    map.set(prefix, ns);
                    prefix.to_string()
                };
                qualified_name = format!("{prefix}:{local_name}");
                attributes.push(SerializedAttribute::new(
                    format!("xmlns:{prefix}"),
                    self.attribute_value(ns.unwrap_or(""))?,
                ));
                if let Some(default) = local_default.as_deref() {
                    inherited_ns = (!default.is_empty()).then(|| default.to_string());
                }
            } else if local_default.is_none() || local_default.as_deref() != ns {
                ignore_namespace_definition = true;
                qualified_name = local_name.clone();
                inherited_ns = ns.map(str::to_string);
                attributes.push(SerializedAttribute::new("xmlns", self.attribute_value(ns.unwrap_or(""))?));
            } else {
                qualified_name = local_name.clone();
                inherited_ns = ns.map(str::to_string);
            }
        }

        self.attributes(
            data,
            &mut map,
            &local_prefixes,
            ignore_namespace_definition,
            prefix_index,
            &mut attributes,
        )?;

        let has_children = self.tree.has_child_nodes(id);
        let end = match ns == Some(HTML_NAMESPACE) {
            true if !has_children && VOID_ELEMENTS.contains(&local_name.as_str()) => ElementEnd::Void,
            false if !has_children => ElementEnd::SelfClosing,
            _ => ElementEnd::EndTag,
        };

        let children = if end == ElementEnd::EndTag {
            self.children(id, inherited_ns.as_deref(), &mut map, prefix_index, level + 1)?
        } else {
            Vec::new()
        };

        Ok(PreSerializedNode {
            node: id,
            level,
            kind: PreSerializedKind::Element { qualified_name, attributes, children, end },
        })
    }

    /// Record the element's own `xmlns:*` declarations into `map` and
    /// `local_prefixes`; returns the value of its `xmlns` attribute, if any
    fn record_namespace_information(
        &self,
        data: &ElementData,
        map: &mut NamespacePrefixMap,
        local_prefixes: &mut LocalPrefixes,
    ) -> Option<String> {
        let mut default_namespace = None;
        for attr in data.attributes.iter().filter_map(|&a| self.tree.node(a).as_attr()) {
            if attr.namespace.as_deref() != Some(XMLNS_NAMESPACE) {
                continue;
            }
            if attr.prefix.is_none() {
                default_namespace = Some(attr.value.clone());
                continue;
            }

            let prefix = attr.local_name.as_str();
            if attr.value == XML_NAMESPACE {
                continue;
            }
            let namespace = (!attr.value.is_empty()).then_some(attr.value.as_str());
            if map.has(prefix, namespace) {
                continue;
            }
            map.set(prefix, namespace);
            local_prefixes.insert(prefix.to_string(), namespace.map(str::to_string));
        }
        default_namespace
    }

    fn attributes(
        &self,
        data: &ElementData,
        map: &mut NamespacePrefixMap,
        local_prefixes: &LocalPrefixes,
        ignore_namespace_definition: bool,
        prefix_index: &mut usize,
        out: &mut Vec<SerializedAttribute>,
    ) -> SerialResult<()> {
        let mut seen = TupleSet::new();

        for attr in data.attributes.iter().filter_map(|&a| self.tree.node(a).as_attr()) {
            let attr_ns = attr.namespace.as_deref();
            if self.require_well_formed && seen.contains(attr_ns, &attr.local_name) {
                return Err(WellFormedError::DuplicateAttribute {
                    namespace: attr_ns.unwrap_or_default().to_string(),
                    local_name: attr.local_name.clone(),
                });
            }
            seen.add(attr_ns, &attr.local_name);

            let mut candidate = None;
            if let Some(attr_ns) = attr_ns {
                candidate = map.get(attr.prefix.as_deref(), Some(attr_ns)).map(str::to_string);

                if attr_ns == XMLNS_NAMESPACE {
                    let declared = (!attr.value.is_empty()).then_some(attr.value.as_str());
                    let declared_here = local_prefixes
                        .get(&attr.local_name)
                        .is_some_and(|ns| ns.as_deref() == declared);
                    let redundant = attr.value == XML_NAMESPACE
                        || (attr.prefix.is_none() && ignore_namespace_definition)
                        || (attr.prefix.is_some() && !declared_here && map.has(&attr.local_name, declared));
                    if redundant {
                        continue;
                    }
                    if self.require_well_formed && attr.value == XMLNS_NAMESPACE {
                        return Err(WellFormedError::XmlnsNamespaceDeclared);
                    }
                    if self.require_well_formed && attr.value.is_empty() {
                        return Err(WellFormedError::EmptyNamespaceDeclaration);
                    }
                    if attr.prefix.as_deref() == Some("xmlns") {
                        candidate = Some("xmlns".to_string());
                    }
                } else if candidate.is_none() {
                    let generated = map.generate(Some(attr_ns), prefix_index);
                    out.push(SerializedAttribute::new(
                        format!("xmlns:{generated}"),
                        self.attribute_value(attr_ns)?,
                    ));
                    candidate = Some(generated);
                }
            }

            if self.require_well_formed
                && (attr.local_name.contains(':')
                    || !namespace::is_valid_name(&attr.local_name)
                    || (attr.local_name == "xmlns" && attr_ns.is_none()))
            {
                return Err(WellFormedError::AttributeName(attr.local_name.clone()));
            }

            let name = match candidate {
                Some(prefix) => format!("{prefix}:{}", attr.local_name),
                None => attr.local_name.clone(),
            };
            out.push(SerializedAttribute::new(name, self.attribute_value(&attr.value)?));
        }
        Ok(())
    }

    fn all_chars(&self, s: &str) -> bool {
        s.chars().all(|c| self.version.is_char(c))
    }

    fn attribute_value(&self, value: &str) -> SerialResult<String> {
        if self.require_well_formed && !self.all_chars(value) {
            return Err(WellFormedError::AttributeValue);
        }
        let mut out = String::with_capacity(value.len());
        for c in value.chars() {
            match c {
                '&' => out.push_str("&amp;"),
                '"' => out.push_str("&quot;"),
                '<' => out.push_str("&lt;"),
                '>' => out.push_str("&gt;"),
                _ => out.push(c),
            }
        }
        Ok(out)
    }

    fn text(&self, data: &str) -> SerialResult<String> {
        if self.require_well_formed && !self.all_chars(data) {
            return Err(WellFormedError::TextData);
        }
        let mut out = String::with_capacity(data.len());
        for c in data.chars() {
            match c {
                '&' => out.push_str("&amp;"),
                '<' => out.push_str("&lt;"),
                '>' => out.push_str("&gt;"),
                _ => out.push(c),
            }
        }
        Ok(out)
    }

    fn cdata(&self, data: &str) -> SerialResult<String> {
        if self.require_well_formed && data.contains("]]>") {
            return Err(WellFormedError::CDataData);
        }
        Ok(format!("<![CDATA[{data}]]>"))
    }

    fn comment(&self, data: &str) -> SerialResult<String> {
        if self.require_well_formed && (!self.all_chars(data) || data.contains("--") || data.ends_with('-')) {
            return Err(WellFormedError::CommentData);
        }
        Ok(format!("<!--{data}-->"))
    }

    fn processing_instruction(&self, target: &str, data: &str) -> SerialResult<String> {
        if self.require_well_formed {
            if target.contains(':') || target.eq_ignore_ascii_case("xml") {
                return Err(WellFormedError::PiTarget(target.to_string()));
            }
            if !self.all_chars(data) || data.contains("?>") {
                return Err(WellFormedError::PiData);
            }
        }
        Ok(format!("<?{target} {data}?>"))
    }

    fn doctype(&self, doctype: &DocumentTypeData) -> SerialResult<String> {
        let DocumentTypeData { name, public_id, system_id } = doctype;
        if self.require_well_formed {
            if !public_id.chars().all(namespace::is_pubid_char) {
                return Err(WellFormedError::DoctypePublicId);
            }
            if !self.all_chars(system_id) || (system_id.contains('"') && system_id.contains('\'')) {
                return Err(WellFormedError::DoctypeSystemId);
            }
        }

        let mut out = format!("<!DOCTYPE {name}");
        if !public_id.is_empty() {
            out.push_str(&format!(" PUBLIC \"{public_id}\""));
        }
        if !system_id.is_empty() && public_id.is_empty() {
            out.push_str(" SYSTEM");
        }
        if !system_id.is_empty() {
            out.push_str(&format!(" \"{system_id}\""));
        }
        out.push('>');
        Ok(out)
    }
}
