//! Namespace Utilities
//!
//! XML name productions (XML 1.0 §2.3, Namespaces in XML 1.0 §3) and the
//! DOM "validate" / "validate and extract" algorithms. No state.

use crate::error::{DomError, DomResult};

/// The namespace bound to the `xml` prefix
pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// The namespace of namespace declaration attributes
pub const XMLNS_NAMESPACE: &str = "http://www.w3.org/2000/xmlns/";

/// The HTML namespace
pub const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

/// The SVG namespace
pub const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";

// -------------------------------------------------------------------------
// Character classes
// -------------------------------------------------------------------------

/// `Char` per XML 1.0 §2.2 `[2]`
pub fn is_xml_char(c: char) -> bool {
    matches!(c as u32,
        0x09 | 0x0A | 0x0D | 0x20..=0xD7FF | 0xE000..=0xFFFD | 0x0001_0000..=0x0010_FFFF
    )
}

/// `Char` per XML 1.1 §2.2 `[2]`
pub fn is_xml11_char(c: char) -> bool {
    matches!(c as u32, 0x01..=0xD7FF | 0xE000..=0xFFFD | 0x0001_0000..=0x0010_FFFF)
}

/// `NameStartChar` per XML 1.0 §2.3 `[4]`
pub fn is_name_start_char(c: char) -> bool {
    matches!(c,
        ':' | 'A'..='Z' | '_' | 'a'..='z' |
        '\u{C0}'..='\u{D6}' | '\u{D8}'..='\u{F6}' | '\u{F8}'..='\u{2FF}' |
        '\u{370}'..='\u{37D}' | '\u{37F}'..='\u{1FFF}' |
        '\u{200C}'..='\u{200D}' | '\u{2070}'..='\u{218F}' |
        '\u{2C00}'..='\u{2FEF}' | '\u{3001}'..='\u{D7FF}' |
        '\u{F900}'..='\u{FDCF}' | '\u{FDF0}'..='\u{FFFD}' |
        '\u{10000}'..='\u{EFFFF}'
    )
}

/// `NameChar` per XML 1.0 §2.3 `[4a]`
pub fn is_name_char(c: char) -> bool {
    is_name_start_char(c)
        || matches!(c,
            '-' | '.' | '0'..='9' | '\u{B7}' |
            '\u{300}'..='\u{36F}' | '\u{203F}'..='\u{2040}'
        )
}

/// `PubidChar` per XML 1.0 §2.3 `[13]`
pub fn is_pubid_char(c: char) -> bool {
    matches!(c,
        ' ' | '\r' | '\n' |
        'a'..='z' | 'A'..='Z' | '0'..='9' |
        '-' | '\'' | '(' | ')' | '+' | ',' | '.' | '/' | ':' |
        '=' | '?' | ';' | '!' | '*' | '#' | '@' | '$' | '_' | '%'
    )
}

// -------------------------------------------------------------------------
// Productions
// -------------------------------------------------------------------------

/// Does `name` match the XML `Name` production?
pub fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if is_name_start_char(first) => chars.all(is_name_char),
        _ => false,
    }
}

/// Does `name` match the `NCName` production (a Name without colons)?
pub fn is_valid_ncname(name: &str) -> bool {
    !name.contains(':') && is_valid_name(name)
}

/// Does `name` match the `QName` production?
pub fn is_valid_qname(name: &str) -> bool {
    match split_qname(name) {
        (Some(prefix), local) => is_valid_ncname(prefix) && is_valid_ncname(local),
        (None, local) => is_valid_ncname(local),
    }
}

/// Splits a qualified name on its first colon.
///
/// `"svg:rect"` → `(Some("svg"), "rect")`, `"rect"` → `(None, "rect")`
pub fn split_qname(qname: &str) -> (Option<&str>, &str) {
    match qname.split_once(':') {
        Some((prefix, local)) => (Some(prefix), local),
        None => (None, qname),
    }
}

/// Throws InvalidCharacterError unless `qualified_name` is a QName.
pub fn validate(qualified_name: &str) -> DomResult<()> {
    if is_valid_qname(qualified_name) {
        Ok(())
    } else {
        Err(DomError::InvalidCharacter("qualified name does not match the QName production"))
    }
}

/// Namespace, prefix and local name produced by [`validate_and_extract`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedName {
    pub namespace: Option<String>,
    pub prefix: Option<String>,
    pub local_name: String,
}

/// The DOM "validate and extract" algorithm.
///
/// An empty namespace is treated as no namespace. Prefix and namespace
/// combinations involving the reserved `xml` and `xmlns` prefixes are
/// checked against their fixed namespaces.
pub fn validate_and_extract(namespace: Option<&str>, qualified_name: &str) -> DomResult<ExtractedName> {
    let namespace = namespace.filter(|ns| !ns.is_empty());
    validate(qualified_name)?;

    let (prefix, local_name) = split_qname(qualified_name);

    if prefix.is_some() && namespace.is_none() {
        return Err(DomError::Namespace("a prefix requires a namespace"));
    }
    if prefix == Some("xml") && namespace != Some(XML_NAMESPACE) {
        return Err(DomError::Namespace("the xml prefix is bound to the XML namespace"));
    }
    let is_xmlns = qualified_name == "xmlns" || prefix == Some("xmlns");
    if is_xmlns && namespace != Some(XMLNS_NAMESPACE) {
        return Err(DomError::Namespace("xmlns is bound to the XMLNS namespace"));
    }
    if namespace == Some(XMLNS_NAMESPACE) && !is_xmlns {
        return Err(DomError::Namespace("the XMLNS namespace requires the xmlns prefix"));
    }

    Ok(ExtractedName {
        namespace: namespace.map(str::to_string),
        prefix: prefix.map(str::to_string),
        local_name: local_name.to_string(),
    })
}

/// Joins an optional prefix and a local name into a qualified name.
pub fn qualified_name(prefix: Option<&str>, local_name: &str) -> String {
    match prefix {
        Some(prefix) => format!("{prefix}:{local_name}"),
        None => local_name.to_string(),
    }
}
