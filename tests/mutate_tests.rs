use cfgcmd::mutate::{merge, remove, remove_all, set};
use cfgcmd::path::lookup;
use cfgcmd::{Document, Error, Node, ParseOptions};
use proptest::prelude::*;

const MAX_DEPTH: usize = 128;

fn doc(text: &str) -> Node {
    Document::parse(text, "test", &ParseOptions::default()).unwrap().root
}

fn int_array(values: &[i64]) -> Node {
    Node::Array(values.iter().copied().map(Node::Integer).collect())
}

#[test]
fn test_set_replaces_existing() {
    let mut root = doc(r#"{"a": 1, "b": 2}"#);
    set(&mut root, ".a", Node::Integer(10), '.').unwrap();
    assert_eq!(root, doc(r#"{"a": 10, "b": 2}"#));
}

#[test]
fn test_set_inserts_new_key() {
    let mut root = doc(r#"{"a": {}}"#);
    set(&mut root, ".a.b", Node::from("x"), '.').unwrap();
    assert_eq!(lookup(&root, ".a.b", '.'), Some(&Node::from("x")));
}

#[test]
fn test_set_array_element_and_append() {
    let mut root = doc(r#"{"list": [1, 2]}"#);
    set(&mut root, ".list.0", Node::Integer(9), '.').unwrap();
    set(&mut root, ".list.7", Node::Integer(3), '.').unwrap();
    assert_eq!(root.child("list"), Some(&int_array(&[9, 2, 3])));
}

#[test]
fn test_set_array_boundary_index_appends() {
    let mut root = doc(r#"{"list": [1, 2]}"#);
    set(&mut root, ".list.1", Node::Integer(5), '.').unwrap();
    set(&mut root, ".list.2", Node::Integer(6), '.').unwrap();
    set(&mut root, ".list.x", Node::Integer(7), '.').unwrap();
    assert_eq!(root.child("list"), Some(&int_array(&[1, 5, 6, 7])));
}

#[test]
fn test_set_root_replaces_document() {
    let mut root = doc(r#"{"a": 1}"#);
    set(&mut root, ".", int_array(&[1]), '.').unwrap();
    assert_eq!(root, int_array(&[1]));
}

#[test]
fn test_set_missing_parent() {
    let mut root = doc(r#"{"a": 1}"#);
    let err = set(&mut root, ".x.y", Node::Integer(1), '.').unwrap_err();
    assert!(matches!(err, Error::ParentNotFound(_)));
    assert_eq!(err.exit_code(), 1);
}

#[test]
fn test_set_under_scalar_parent() {
    let mut root = doc(r#"{"a": 1}"#);
    let err = set(&mut root, ".a.b", Node::Integer(1), '.').unwrap_err();
    assert!(matches!(err, Error::InvalidParent { .. }));
}

#[test]
fn test_merge_arrays_concatenate() {
    let mut root = doc(r#"{"list": [1, 2]}"#);
    merge(&mut root, ".list", int_array(&[3, 4]), '.', MAX_DEPTH).unwrap();
    assert_eq!(root.child("list"), Some(&int_array(&[1, 2, 3, 4])));
}

#[test]
fn test_merge_objects_recursively() {
    let mut root = doc(r#"{"cfg": {"a": 1, "nested": {"x": 1}, "list": [1]}}"#);
    let incoming = doc(r#"{"b": 2, "a": 9, "nested": {"y": 2}, "list": [2]}"#);
    merge(&mut root, ".cfg", incoming, '.', MAX_DEPTH).unwrap();
    assert_eq!(
        root,
        doc(r#"{"cfg": {"a": 9, "nested": {"x": 1, "y": 2}, "list": [1, 2], "b": 2}}"#)
    );
}

#[test]
fn test_merge_scalar_into_array_appends() {
    let mut root = doc(r#"{"list": [1]}"#);
    merge(&mut root, ".list", Node::Integer(2), '.', MAX_DEPTH).unwrap();
    assert_eq!(root.child("list"), Some(&int_array(&[1, 2])));
}

#[test]
fn test_merge_scalar_promotes_to_array() {
    let mut root = doc(r#"{"n": 3}"#);
    merge(&mut root, ".n", Node::Integer(5), '.', MAX_DEPTH).unwrap();
    assert_eq!(root.child("n"), Some(&int_array(&[3, 5])));

    // a second merge appends to the promoted array
    merge(&mut root, ".n", Node::Integer(7), '.', MAX_DEPTH).unwrap();
    assert_eq!(root.child("n"), Some(&int_array(&[3, 5, 7])));
}

#[test]
fn test_merge_mixed_kinds_in_object_chain() {
    let mut root = doc(r#"{"k": 1}"#);
    merge(&mut root, ".k", doc(r#"{"x": 1}"#), '.', MAX_DEPTH).unwrap();
    let member = root.as_object().unwrap().member("k").unwrap();
    assert!(member.is_implicit_array());
    assert_eq!(member.values()[0], Node::Integer(1));
    assert_eq!(member.values()[1], doc(r#"{"x": 1}"#));
}

#[test]
fn test_merge_mixed_kinds_in_array_replace() {
    let mut root = doc(r#"{"list": [1, {"a": 1}]}"#);
    merge(&mut root, ".list.1", Node::Integer(5), '.', MAX_DEPTH).unwrap();
    assert_eq!(root.child("list"), Some(&int_array(&[1, 5])));
}

#[test]
fn test_merge_into_missing_key_inserts() {
    let mut root = doc(r#"{"a": 1}"#);
    merge(&mut root, ".b", Node::Integer(2), '.', MAX_DEPTH).unwrap();
    assert_eq!(root, doc(r#"{"a": 1, "b": 2}"#));
}

#[test]
fn test_merge_at_root() {
    let mut root = doc(r#"{"a": 1}"#);
    merge(&mut root, ".", doc(r#"{"b": 2}"#), '.', MAX_DEPTH).unwrap();
    assert_eq!(root, doc(r#"{"a": 1, "b": 2}"#));

    let err = merge(&mut root, ".", Node::Integer(1), '.', MAX_DEPTH).unwrap_err();
    assert!(matches!(err, Error::InvalidRoot { .. }));
}

#[test]
fn test_merge_depth_cap() {
    let mut root = doc(r#"{"a": {"b": {"c": {}}}}"#);
    let incoming = doc(r#"{"b": {"c": {"d": 1}}}"#);
    let err = merge(&mut root, ".a", incoming, '.', 1).unwrap_err();
    assert!(matches!(err, Error::TooDeep { limit: 1 }));
}

#[test]
fn test_remove_object_key() {
    let mut root = doc(r#"{"a": 1, "b": 2}"#);
    remove(&mut root, ".a", '.').unwrap();
    assert_eq!(root, doc(r#"{"b": 2}"#));
}

#[test]
fn test_remove_missing_key() {
    let mut root = doc(r#"{"a": 1}"#);
    let before = root.clone();
    let err = remove(&mut root, ".b", '.').unwrap_err();
    assert!(matches!(err, Error::KeyNotFound(_)));
    assert_eq!(root, before);
}

#[test]
fn test_remove_root_fails() {
    let mut root = doc(r#"{"a": 1}"#);
    assert!(matches!(remove(&mut root, ".", '.'), Err(Error::InvalidRoot { .. })));
}

#[test]
fn test_remove_array_element_by_resolved_position() {
    let mut root = doc(r#"{"list": ["x", "y", "x"]}"#);
    remove(&mut root, ".list.2", '.').unwrap();
    assert_eq!(root.child("list"), Some(&Node::Array(vec![Node::from("x"), Node::from("y")])));
}

#[test]
fn test_remove_batch_reports_failures() {
    let mut root = doc(r#"{"a": 1, "b": 2, "c": 3}"#);
    let report = remove_all(&mut root, &[".a", ".missing", ".c"], '.');
    assert_eq!(report.removed, 2);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].0, ".missing");
    assert_eq!(root, doc(r#"{"b": 2}"#));

    let err = report.into_result().unwrap_err();
    assert!(matches!(err, Error::PartialRemoval { count: 1 }));
    assert_eq!(err.exit_code(), 1);
}

#[test]
fn test_remove_batch_shifting_indices() {
    let mut root = doc(r#"[10, 20, 30]"#);
    let report = remove_all(&mut root, &[".0", ".0"], '.');
    assert!(report.is_complete());
    assert_eq!(root, int_array(&[30]));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Whatever `set` stores is what a lookup of the same path returns.
    #[test]
    fn prop_set_then_lookup(key in "[a-z]{1,8}", n in any::<i64>()) {
        let mut root = doc(r#"{"a": {"b": 1}}"#);
        let path = format!(".a.{key}");
        set(&mut root, &path, Node::Integer(n), '.').unwrap();
        prop_assert_eq!(lookup(&root, &path, '.').cloned(), Some(Node::Integer(n)));
    }
}
