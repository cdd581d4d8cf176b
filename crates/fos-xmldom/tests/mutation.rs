//! Mutation engine tests for fos-xmldom
//!
//! Tree-shape guarantees that must hold across arbitrary sequences of
//! insertions, removals, replacements and adoptions.

use fos_xmldom::{DomError, DomTree, NodeId, NodeOrText, NodeType};

fn forward(tree: &DomTree, parent: NodeId) -> Vec<NodeId> {
    let mut out = Vec::new();
    let mut cur = tree.first_child(parent);
    while let Some(id) = cur {
        out.push(id);
        cur = tree.next_sibling(id);
    }
    out
}

fn backward(tree: &DomTree, parent: NodeId) -> Vec<NodeId> {
    let mut out = Vec::new();
    let mut cur = tree.last_child(parent);
    while let Some(id) = cur {
        out.push(id);
        cur = tree.prev_sibling(id);
    }
    out.reverse();
    out
}

fn assert_linkage(tree: &DomTree, parent: NodeId) {
    let fwd = forward(tree, parent);
    assert_eq!(fwd, backward(tree, parent));
    assert_eq!(fwd.len(), tree.child_count(parent));
    for child in fwd {
        assert_eq!(tree.parent(child), Some(parent));
        assert_linkage(tree, child);
    }
}

fn names(tree: &DomTree, parent: NodeId) -> Vec<String> {
    tree.children(parent).map(|c| tree.node_name(c)).collect()
}

// ============================================================================
// LINKAGE CONSISTENCY
// ============================================================================

#[test]
fn test_linkage_after_mixed_mutations() {
    let mut tree = DomTree::new();
    let doc = tree.create_document();
    let root = tree.create_element(doc, "root").unwrap();
    tree.append_child(doc, root).unwrap();

    let ids: Vec<NodeId> = ["a", "b", "c", "d", "e"]
        .iter()
        .map(|n| tree.create_element(doc, n).unwrap())
        .collect();
    for &id in &ids {
        tree.append_child(root, id).unwrap();
        assert_linkage(&tree, doc);
    }

    tree.insert_before(root, ids[4], Some(ids[0])).unwrap();
    assert_linkage(&tree, doc);
    tree.remove_child(root, ids[2]).unwrap();
    assert_linkage(&tree, doc);
    tree.append_child(ids[1], ids[2]).unwrap();
    assert_linkage(&tree, doc);
    let x = tree.create_element(doc, "x").unwrap();
    tree.replace_child(root, x, ids[3]).unwrap();
    assert_linkage(&tree, doc);

    assert_eq!(names(&tree, root), ["e", "a", "b", "x"]);
    assert_eq!(names(&tree, ids[1]), ["c"]);
    assert!(tree.parent(ids[3]).is_none());
}

#[test]
fn test_reinserting_existing_child_keeps_length() {
    let mut tree = DomTree::new();
    let doc = tree.create_document();
    let root = tree.create_element(doc, "root").unwrap();
    let a = tree.create_element(doc, "a").unwrap();
    let b = tree.create_element(doc, "b").unwrap();
    let c = tree.create_element(doc, "c").unwrap();
    for id in [a, b, c] {
        tree.append_child(root, id).unwrap();
    }

    tree.insert_before(root, b, Some(b)).unwrap();
    assert_eq!(names(&tree, root), ["a", "b", "c"]);
    tree.insert_before(root, c, Some(a)).unwrap();
    assert_eq!(names(&tree, root), ["c", "a", "b"]);
    tree.append_child(root, c).unwrap();
    assert_eq!(names(&tree, root), ["a", "b", "c"]);
    assert_eq!(tree.child_count(root), 3);
    assert_linkage(&tree, root);
}

#[test]
fn test_detach_then_attach_restores_tree() {
    let mut tree = DomTree::new();
    let doc = tree.create_document();
    let root = tree.create_element(doc, "root").unwrap();
    for name in ["a", "b", "c"] {
        let el = tree.create_element(doc, name).unwrap();
        tree.append_child(root, el).unwrap();
    }
    let before = tree.clone_node(root, true);

    let b = tree.children(root).nth(1).unwrap();
    let reference = tree.next_sibling(b);
    tree.remove_child(root, b).unwrap();
    tree.insert_before(root, b, reference).unwrap();

    assert!(tree.is_equal_node(root, before));
    assert_linkage(&tree, root);
}

// ============================================================================
// VALIDATION
// ============================================================================

#[test]
fn test_cycle_rejected() {
    let mut tree = DomTree::new();
    let doc = tree.create_document();
    let outer = tree.create_element(doc, "outer").unwrap();
    let inner = tree.create_element(doc, "inner").unwrap();
    tree.append_child(outer, inner).unwrap();

    let err = tree.append_child(inner, outer).unwrap_err();
    assert_eq!(err.name(), "HierarchyRequestError");
    let err = tree.append_child(outer, outer).unwrap_err();
    assert_eq!(err.name(), "HierarchyRequestError");
    assert_eq!(tree.child_count(inner), 0);
}

#[test]
fn test_reference_child_must_belong_to_parent() {
    let mut tree = DomTree::new();
    let doc = tree.create_document();
    let a = tree.create_element(doc, "a").unwrap();
    let b = tree.create_element(doc, "b").unwrap();
    let stranger = tree.create_element(doc, "s").unwrap();

    let err = tree.insert_before(a, b, Some(stranger)).unwrap_err();
    assert!(matches!(err, DomError::NotFound(_)));
    let err = tree.remove_child(a, stranger).unwrap_err();
    assert!(matches!(err, DomError::NotFound(_)));
}

#[test]
fn test_leaf_parents_rejected() {
    let mut tree = DomTree::new();
    let doc = tree.create_document();
    let text = tree.create_text_node(doc, "t");
    let el = tree.create_element(doc, "e").unwrap();
    assert_eq!(tree.append_child(text, el).unwrap_err().name(), "HierarchyRequestError");

    let doctype = tree.implementation(doc).create_document_type(&mut tree, "e", "", "").unwrap();
    assert_eq!(tree.append_child(el, doctype).unwrap_err().name(), "HierarchyRequestError");
}

// ============================================================================
// DOCUMENT ARITY
// ============================================================================

#[test]
fn test_document_accepts_one_element_and_one_doctype() {
    let mut tree = DomTree::new();
    let doc = tree.create_document();
    let root = tree.create_element(doc, "root").unwrap();
    let other = tree.create_element(doc, "other").unwrap();
    let dt = tree.implementation(doc).create_document_type(&mut tree, "root", "", "").unwrap();
    let dt2 = tree.implementation(doc).create_document_type(&mut tree, "root", "", "").unwrap();

    tree.append_child(doc, root).unwrap();
    assert!(tree.append_child(doc, other).is_err());

    // doctype after the element is out of order
    assert!(tree.append_child(doc, dt).is_err());
    tree.insert_before(doc, dt, Some(root)).unwrap();
    assert!(tree.insert_before(doc, dt2, Some(root)).is_err());

    assert_eq!(
        tree.children(doc).map(|c| tree.node_type(c)).collect::<Vec<_>>(),
        [NodeType::DocumentType, NodeType::Element]
    );
    assert_linkage(&tree, doc);
}

#[test]
fn test_document_fragment_arity() {
    let mut tree = DomTree::new();
    let doc = tree.create_document();
    let frag = tree.create_document_fragment(doc);
    let a = tree.create_element(doc, "a").unwrap();
    let b = tree.create_element(doc, "b").unwrap();
    tree.append_child(frag, a).unwrap();
    tree.append_child(frag, b).unwrap();

    assert!(tree.append_child(doc, frag).is_err());
    assert_eq!(tree.child_count(frag), 2);
    assert_eq!(tree.child_count(doc), 0);

    tree.remove_child(frag, b).unwrap();
    let text = tree.create_text_node(doc, "x");
    tree.append_child(frag, text).unwrap();
    assert!(tree.append_child(doc, frag).is_err());

    tree.remove_child(frag, text).unwrap();
    tree.append_child(doc, frag).unwrap();
    assert_eq!(tree.document_element(doc), Some(a));
    assert_eq!(tree.child_count(frag), 0);
}

#[test]
fn test_replace_document_element() {
    let mut tree = DomTree::new();
    let doc = tree.create_document();
    let old = tree.create_element(doc, "old").unwrap();
    let new = tree.create_element(doc, "new").unwrap();
    tree.append_child(doc, old).unwrap();

    assert_eq!(tree.replace_child(doc, new, old).unwrap(), old);
    assert_eq!(tree.document_element(doc), Some(new));
}

// ============================================================================
// FRAGMENTS AND CONVENIENCE METHODS
// ============================================================================

#[test]
fn test_fragment_children_move_in_order() {
    let mut tree = DomTree::new();
    let doc = tree.create_document();
    let root = tree.create_element(doc, "root").unwrap();
    let last = tree.create_element(doc, "last").unwrap();
    tree.append_child(root, last).unwrap();

    let frag = tree.create_document_fragment(doc);
    for name in ["a", "b"] {
        let el = tree.create_element(doc, name).unwrap();
        tree.append_child(frag, el).unwrap();
    }
    tree.insert_before(root, frag, Some(last)).unwrap();
    assert_eq!(names(&tree, root), ["a", "b", "last"]);
    assert!(!tree.has_child_nodes(frag));
    assert_linkage(&tree, root);
}

#[test]
fn test_parent_and_child_node_mixins() {
    let mut tree = DomTree::new();
    let doc = tree.create_document();
    let root = tree.create_element(doc, "root").unwrap();
    let mid = tree.create_element(doc, "mid").unwrap();
    tree.append_child(root, mid).unwrap();

    tree.prepend(root, vec![NodeOrText::from("start")]).unwrap();
    tree.append(root, vec!["end".into()]).unwrap();
    let before = tree.create_element(doc, "before").unwrap();
    tree.before(mid, vec![before.into()]).unwrap();
    tree.after(mid, vec!["after".into()]).unwrap();

    assert_eq!(tree.text_content(root).as_deref(), Some("startafterend"));
    assert_eq!(names(&tree, root), ["#text", "before", "mid", "#text", "#text"]);

    let repl = tree.create_element(doc, "repl").unwrap();
    tree.replace_with(mid, vec![repl.into()]).unwrap();
    assert!(tree.parent(mid).is_none());

    tree.replace_children(root, vec!["only".into()]).unwrap();
    assert_eq!(tree.child_count(root), 1);
    let only = tree.first_child(root).unwrap();
    tree.remove(only).unwrap();
    assert_eq!(tree.child_count(root), 0);
    assert_linkage(&tree, root);
}

#[test]
fn test_rejected_convenience_calls_leave_tree_untouched() {
    let mut tree = DomTree::new();
    let doc = tree.create_document();
    let root = tree.create_element(doc, "root").unwrap();
    tree.append_child(doc, root).unwrap();
    let a = tree.create_element(doc, "a").unwrap();
    let b = tree.create_element(doc, "b").unwrap();
    tree.append_child(root, a).unwrap();
    tree.append_child(a, b).unwrap();
    let loose = tree.create_element(doc, "loose").unwrap();
    let before = tree.clone_node(root, true);

    // element plus text under the document
    let err = tree.append(doc, vec![b.into(), "text".into()]).unwrap_err();
    assert_eq!(err.name(), "HierarchyRequestError");

    // a second document element
    let err = tree.prepend(doc, vec![a.into(), loose.into()]).unwrap_err();
    assert_eq!(err.name(), "HierarchyRequestError");

    // an ancestor of the insertion point among the arguments
    let err = tree.append(b, vec![loose.into(), a.into()]).unwrap_err();
    assert_eq!(err.name(), "HierarchyRequestError");

    assert!(tree.is_equal_node(root, before));
    assert_eq!(tree.parent(b), Some(a));
    assert!(tree.parent(loose).is_none());
    assert_eq!(tree.children(doc).collect::<Vec<_>>(), [root]);
    assert_linkage(&tree, doc);
}

// ============================================================================
// ADOPTION
// ============================================================================

#[test]
fn test_adoption_rewrites_whole_subtree() {
    let mut tree = DomTree::new();
    let source = tree.create_document();
    let target = tree.create_document();

    let root = tree.create_element(source, "root").unwrap();
    let child = tree.create_element(source, "child").unwrap();
    let text = tree.create_text_node(source, "t");
    tree.append_child(source, root).unwrap();
    tree.append_child(root, child).unwrap();
    tree.append_child(child, text).unwrap();
    tree.set_attribute(root, "a", "1").unwrap();
    tree.set_attribute(child, "b", "2").unwrap();

    tree.adopt_node(target, root).unwrap();

    assert!(tree.parent(root).is_none());
    assert!(tree.document_element(source).is_none());
    for id in [root, child, text] {
        assert_eq!(tree.owner_document(id), Some(target));
    }
    for (el, name) in [(root, "a"), (child, "b")] {
        let attr = tree.get_attribute_node(el, name).unwrap();
        assert_eq!(tree.owner_document(attr), Some(target));
    }
}

#[test]
fn test_insertion_adopts_foreign_nodes() {
    let mut tree = DomTree::new();
    let a = tree.create_document();
    let b = tree.create_document();
    let root = tree.create_element(a, "root").unwrap();
    let foreign = tree.create_element(b, "foreign").unwrap();

    tree.append_child(root, foreign).unwrap();
    assert_eq!(tree.owner_document(foreign), Some(a));
}

#[test]
fn test_documents_cannot_be_adopted() {
    let mut tree = DomTree::new();
    let a = tree.create_document();
    let b = tree.create_document();
    assert_eq!(tree.adopt_node(a, b).unwrap_err().name(), "NotSupportedError");
}
