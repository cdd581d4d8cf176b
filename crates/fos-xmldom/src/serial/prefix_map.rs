//! Namespace prefix map
//!
//! Namespace URI (or no namespace) to every prefix seen for it, in the
//! order they were recorded. The last entry is the most recently used.
//! The serializer clones the map per element, so a subtree can extend
//! its copy without the ancestors seeing the new bindings.

use std::collections::HashMap;

use crate::namespace::XML_NAMESPACE;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespacePrefixMap {
    map: HashMap<Option<String>, Vec<String>>,
}

impl Default for NamespacePrefixMap {
    fn default() -> Self {
        Self::new()
    }
}

impl NamespacePrefixMap {
    /// A map holding only `xml` → the XML namespace
    pub fn new() -> Self {
        let mut map = HashMap::new();
        map.insert(Some(XML_NAMESPACE.to_string()), vec!["xml".to_string()]);
        Self { map }
    }

    /// Record `prefix` as the most recent prefix for `namespace`
    pub fn set(&mut self, prefix: &str, namespace: Option<&str>) {
        self.map
            .entry(namespace.map(str::to_string))
            .or_default()
            .push(prefix.to_string());
    }

    /// Retrieve a preferred prefix: `preferred` if it is bound to
    /// `namespace`, otherwise the most recent prefix for `namespace`
    pub fn get(&self, preferred: Option<&str>, namespace: Option<&str>) -> Option<&str> {
        let candidates = self.map.get(&namespace.map(str::to_string))?;
        candidates
            .iter()
            .find(|p| Some(p.as_str()) == preferred)
            .or_else(|| candidates.last())
            .map(String::as_str)
    }

    /// Has `prefix` ever been recorded for `namespace`?
    pub fn has(&self, prefix: &str, namespace: Option<&str>) -> bool {
        self.map
            .get(&namespace.map(str::to_string))
            .is_some_and(|list| list.iter().any(|p| p == prefix))
    }

    /// Generate `ns{index}`, bump the shared index and record the new
    /// binding
    pub fn generate(&mut self, namespace: Option<&str>, index: &mut usize) -> String {
        let prefix = format!("ns{index}");
        *index += 1;
        self.set(&prefix, namespace);
        prefix
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_with_xml() {
        let map = NamespacePrefixMap::new();
        assert_eq!(map.get(None, Some(XML_NAMESPACE)), Some("xml"));
        assert!(map.has("xml", Some(XML_NAMESPACE)));
        assert_eq!(map.get(None, Some("urn:x")), None);
    }

    #[test]
    fn test_preferred_then_most_recent() {
        let mut map = NamespacePrefixMap::new();
        map.set("a", Some("urn:x"));
        map.set("b", Some("urn:x"));
        assert_eq!(map.get(Some("a"), Some("urn:x")), Some("a"));
        assert_eq!(map.get(Some("zz"), Some("urn:x")), Some("b"));
        assert_eq!(map.get(None, Some("urn:x")), Some("b"));
    }

    #[test]
    fn test_copy_is_independent() {
        let mut parent = NamespacePrefixMap::new();
        parent.set("a", Some("urn:x"));
        let mut child = parent.clone();
        child.set("c", Some("urn:y"));
        assert!(child.has("c", Some("urn:y")));
        assert!(!parent.has("c", Some("urn:y")));
    }

    #[test]
    fn test_generate() {
        let mut map = NamespacePrefixMap::new();
        let mut index = 1;
        assert_eq!(map.generate(Some("urn:x"), &mut index), "ns1");
        assert_eq!(map.generate(Some("urn:y"), &mut index), "ns2");
        assert_eq!(index, 3);
        assert_eq!(map.get(None, Some("urn:y")), Some("ns2"));
    }

    #[test]
    fn test_null_namespace_key() {
        let mut map = NamespacePrefixMap::new();
        map.set("p", None);
        assert!(map.has("p", None));
        assert_eq!(map.get(Some("p"), None), Some("p"));
    }
}
