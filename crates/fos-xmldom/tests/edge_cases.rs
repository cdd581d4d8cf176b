//! Edge case tests for fos-xmldom
//!
//! Silent versus failing removals, rejected insertions that must leave the
//! tree untouched, non-ASCII offsets, live collections and live ranges.

use fos_xmldom::namespace::XMLNS_NAMESPACE;
use fos_xmldom::{DocumentPosition, DomTree, NodeType};

// ============================================================================
// ATTRIBUTE REMOVAL
// ============================================================================

#[test]
fn test_remove_missing_attribute_is_silent() {
    let mut tree = DomTree::new();
    let doc = tree.create_document();
    let el = tree.create_element(doc, "e").unwrap();
    tree.set_attribute(el, "keep", "1").unwrap();

    tree.remove_attribute(el, "absent");
    tree.remove_attribute_ns(el, Some("urn:x"), "absent");
    assert_eq!(tree.get_attribute_names(el), ["keep"]);
}

#[test]
fn test_named_node_map_remove_missing_fails() {
    let mut tree = DomTree::new();
    let doc = tree.create_document();
    let el = tree.create_element(doc, "e").unwrap();
    let map = tree.attributes(el);

    let err = map.remove_named_item(&mut tree, "absent").unwrap_err();
    assert_eq!(err.name(), "NotFoundError");
    let err = map.remove_named_item_ns(&mut tree, None, "absent").unwrap_err();
    assert_eq!(err.name(), "NotFoundError");
}

#[test]
fn test_attr_in_use_elsewhere() {
    let mut tree = DomTree::new();
    let doc = tree.create_document();
    let a = tree.create_element(doc, "a").unwrap();
    let b = tree.create_element(doc, "b").unwrap();
    let attr = tree.create_attribute(doc, "x").unwrap();

    assert_eq!(tree.set_attribute_node(a, attr).unwrap(), None);
    assert_eq!(tree.set_attribute_node(a, attr).unwrap(), Some(attr));
    assert_eq!(tree.set_attribute_node(b, attr).unwrap_err().name(), "InUseAttributeError");
    assert_eq!(tree.owner_element(attr), Some(a));
}

// ============================================================================
// REJECTED INSERTIONS
// ============================================================================

#[test]
fn test_text_under_document_rejected() {
    let mut tree = DomTree::new();
    let doc = tree.create_document();
    let root = tree.create_element(doc, "root").unwrap();
    tree.append_child(doc, root).unwrap();
    let text = tree.create_text_node(doc, "stray");

    let err = tree.append_child(doc, text).unwrap_err();
    assert_eq!(err.name(), "HierarchyRequestError");
    let err = tree.insert_before(doc, text, Some(root)).unwrap_err();
    assert_eq!(err.name(), "HierarchyRequestError");

    assert_eq!(tree.children(doc).collect::<Vec<_>>(), [root]);
    assert!(tree.parent(text).is_none());
}

#[test]
fn test_attributes_are_not_children() {
    let mut tree = DomTree::new();
    let doc = tree.create_document();
    let el = tree.create_element(doc, "e").unwrap();
    let attr = tree.create_attribute(doc, "a").unwrap();
    assert_eq!(tree.append_child(el, attr).unwrap_err().name(), "HierarchyRequestError");
}

#[test]
fn test_invalid_names_rejected_before_allocation() {
    let mut tree = DomTree::new();
    let doc = tree.create_document();
    let before = tree.len();

    assert_eq!(tree.create_element(doc, "1abc").unwrap_err().name(), "InvalidCharacterError");
    assert_eq!(
        tree.create_element_ns(doc, None, "p:local").unwrap_err().name(),
        "NamespaceError"
    );
    assert_eq!(
        tree.create_element_ns(doc, Some("urn:x"), "xmlns:e").unwrap_err().name(),
        "NamespaceError"
    );
    assert_eq!(
        tree.create_attribute_ns(doc, Some(XMLNS_NAMESPACE), "x").unwrap_err().name(),
        "NamespaceError"
    );
    assert_eq!(tree.len(), before);
}

// ============================================================================
// CHARACTER DATA
// ============================================================================

#[test]
fn test_offsets_count_characters() {
    let mut tree = DomTree::new();
    let doc = tree.create_document();
    let text = tree.create_text_node(doc, "h\u{e9}llo w\u{f6}rld");

    assert_eq!(tree.length(text).unwrap(), 11);
    assert_eq!(tree.substring_data(text, 1, 4).unwrap(), "\u{e9}llo");
    tree.replace_data(text, 7, 1, "o").unwrap();
    assert_eq!(tree.data(text), Some("h\u{e9}llo world"));
    assert_eq!(tree.delete_data(text, 12, 1).unwrap_err().name(), "IndexSizeError");
    tree.delete_data(text, 5, 100).unwrap();
    assert_eq!(tree.data(text), Some("h\u{e9}llo"));
}

#[test]
fn test_split_and_normalize() {
    let mut tree = DomTree::new();
    let doc = tree.create_document();
    let el = tree.create_element(doc, "p").unwrap();
    let text = tree.create_text_node(doc, "hello world");
    tree.append_child(el, text).unwrap();

    let tail = tree.split_text(text, 5).unwrap();
    assert_eq!(tree.child_count(el), 2);
    assert_eq!(tree.data(tail), Some(" world"));
    assert_eq!(tree.whole_text(text), "hello world");

    let empty = tree.create_text_node(doc, "");
    tree.append_child(el, empty).unwrap();
    tree.normalize(el);
    assert_eq!(tree.child_count(el), 1);
    assert_eq!(tree.data(text), Some("hello world"));
}

// ============================================================================
// LIVE COLLECTIONS
// ============================================================================

#[test]
fn test_collections_reflect_later_mutations() {
    let mut tree = DomTree::new();
    let doc = tree.create_document();
    let root = tree.create_element(doc, "root").unwrap();
    tree.append_child(doc, root).unwrap();

    let items = tree.get_elements_by_tag_name(doc, "item");
    let children = tree.child_nodes(root);
    assert_eq!(items.length(&tree), 0);

    let item = tree.create_element(doc, "item").unwrap();
    tree.append_child(root, item).unwrap();
    let nested = tree.create_element(doc, "item").unwrap();
    tree.append_child(item, nested).unwrap();

    assert_eq!(items.length(&tree), 2);
    assert_eq!(items.item(&tree, 1), Some(nested));
    assert_eq!(children.length(&tree), 1);

    tree.remove_child(root, item).unwrap();
    assert_eq!(items.length(&tree), 0);
    assert_eq!(children.item(&tree, 0), None);
}

#[test]
fn test_get_element_by_id() {
    let mut tree = DomTree::new();
    let doc = tree.create_document();
    let root = tree.create_element(doc, "root").unwrap();
    let target = tree.create_element(doc, "t").unwrap();
    tree.append_child(doc, root).unwrap();
    tree.append_child(root, target).unwrap();
    tree.set_attribute(target, "id", "main").unwrap();

    assert_eq!(tree.get_element_by_id(doc, "main"), Some(target));
    tree.remove_attribute(target, "id");
    assert_eq!(tree.get_element_by_id(doc, "main"), None);
}

// ============================================================================
// NAMESPACE LOOKUP AND POSITION
// ============================================================================

#[test]
fn test_lookup_through_declarations() {
    let mut tree = DomTree::new();
    let doc = tree.create_document();
    let root = tree.create_element_ns(doc, Some("urn:d"), "root").unwrap();
    tree.set_attribute_ns(root, Some(XMLNS_NAMESPACE), "xmlns:p", "urn:p").unwrap();
    let leaf = tree.create_element(doc, "leaf").unwrap();
    tree.append_child(doc, root).unwrap();
    tree.append_child(root, leaf).unwrap();

    assert_eq!(tree.lookup_namespace_uri(leaf, Some("p")).as_deref(), Some("urn:p"));
    assert_eq!(tree.lookup_prefix(leaf, Some("urn:p")).as_deref(), Some("p"));
    assert!(tree.is_default_namespace(root, Some("urn:d")));
    assert_eq!(tree.lookup_namespace_uri(doc, None).as_deref(), Some("urn:d"));
    assert_eq!(tree.lookup_namespace_uri(leaf, Some("missing")), None);
}

#[test]
fn test_document_position() {
    let mut tree = DomTree::new();
    let doc = tree.create_document();
    let root = tree.create_element(doc, "root").unwrap();
    let a = tree.create_element(doc, "a").unwrap();
    let b = tree.create_element(doc, "b").unwrap();
    tree.append_child(doc, root).unwrap();
    tree.append_child(root, a).unwrap();
    tree.append_child(root, b).unwrap();

    assert!(tree.compare_document_position(a, b).contains(DocumentPosition::FOLLOWING));
    assert!(tree.compare_document_position(b, a).contains(DocumentPosition::PRECEDING));
    let pos = tree.compare_document_position(root, a);
    assert!(pos.contains(DocumentPosition::CONTAINED_BY));
    assert!(pos.contains(DocumentPosition::FOLLOWING));
    assert_eq!(tree.compare_document_position(a, a).0, 0);

    let loose = tree.create_element(doc, "loose").unwrap();
    assert!(tree.compare_document_position(a, loose).contains(DocumentPosition::DISCONNECTED));
}

// ============================================================================
// LIVE RANGES
// ============================================================================

#[test]
fn test_range_tracks_removal_and_insertion() {
    let mut tree = DomTree::new();
    let doc = tree.create_document();
    let root = tree.create_element(doc, "root").unwrap();
    tree.append_child(doc, root).unwrap();
    let kids: Vec<_> = (0..3).map(|_| tree.create_element(doc, "k").unwrap()).collect();
    for &k in &kids {
        tree.append_child(root, k).unwrap();
    }

    let range = tree.create_range(doc);
    tree.set_range_start(range, root, 1).unwrap();
    tree.set_range_end(range, root, 3).unwrap();

    tree.remove_child(root, kids[0]).unwrap();
    let r = tree.range(range).unwrap();
    assert_eq!((r.start.offset, r.end.offset), (0, 2));

    tree.insert_before(root, kids[0], Some(kids[1])).unwrap();
    let r = tree.range(range).unwrap();
    assert_eq!((r.start.offset, r.end.offset), (0, 3));
}

#[test]
fn test_range_follows_split_text() {
    let mut tree = DomTree::new();
    let doc = tree.create_document();
    let el = tree.create_element(doc, "p").unwrap();
    tree.append_child(doc, el).unwrap();
    let text = tree.create_text_node(doc, "abcdef");
    tree.append_child(el, text).unwrap();

    let range = tree.create_range(doc);
    tree.set_range_start(range, text, 4).unwrap();
    tree.set_range_end(range, text, 6).unwrap();

    let tail = tree.split_text(text, 3).unwrap();
    let r = tree.range(range).unwrap();
    assert_eq!((r.start.node, r.start.offset), (tail, 1));
    assert_eq!((r.end.node, r.end.offset), (tail, 3));

    let doctype = tree.implementation(doc).create_document_type(&mut tree, "p", "", "").unwrap();
    assert_eq!(
        tree.set_range_start(range, doctype, 0).unwrap_err().name(),
        "InvalidNodeTypeError"
    );
    assert_eq!(tree.node_type(tail), NodeType::Text);
}
