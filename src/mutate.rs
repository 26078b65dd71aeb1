//! The mutation engine: `set`, `merge` and `remove`.
//!
//! Each operation resolves the path into a parent and a final fragment
//! with [`path::locate`], then edits the parent in place. A value that is
//! never attached (because the operation failed) is simply dropped.

use crate::{
    error::{Error, Result},
    node::{Kind, Node, Object},
    path::{self, Location},
};

/// Replace the node at `path`, or insert it when the final fragment does
/// not exist yet. The root path replaces the whole document.
///
/// # Examples
///
/// ```
/// use cfgcmd::{Node, Object};
/// use cfgcmd::mutate::set;
///
/// let mut root = Node::Object(Object::new());
/// set(&mut root, ".server", Node::Object(Object::new()), '.').unwrap();
/// set(&mut root, ".server.port", Node::Integer(80), '.').unwrap();
/// set(&mut root, ".server.port", Node::Integer(8080), '.').unwrap();
///
/// assert_eq!(cfgcmd::path::lookup(&root, ".server.port", '.'), Some(&Node::Integer(8080)));
/// assert!(set(&mut root, ".missing.port", Node::Integer(1), '.').is_err());
/// ```
pub fn set(root: &mut Node, path: &str, value: Node, delimiter: char) -> Result<()> {
    let location =
        path::locate(root, path, delimiter).ok_or_else(|| Error::ParentNotFound(path.to_string()))?;
    if location.split.is_root() {
        tracing::debug!(kind = %value.kind(), "replacing document root");
        *root = value;
        return Ok(());
    }
    let parent = path::parent_mut(root, &location, delimiter)
        .ok_or_else(|| Error::ParentNotFound(path.to_string()))?;
    attach(parent, &location, value, path)
}

/// Insert or replace `value` under the location's fragment.
fn attach(parent: &mut Node, location: &Location<'_>, value: Node, path: &str) -> Result<()> {
    let fragment = location.split.fragment;
    match parent {
        Node::Object(obj) => {
            if obj.insert(fragment, value).is_some() {
                tracing::debug!(path, "replaced member");
            } else {
                tracing::debug!(path, "inserted member");
            }
            Ok(())
        }
        Node::Array(arr) => {
            let slot = fragment
                .parse::<usize>()
                .ok()
                .filter(|_| location.occupied)
                .and_then(|index| arr.get_mut(index));
            match slot {
                Some(slot) => *slot = value,
                None => arr.push(value),
            }
            Ok(())
        }
        other => Err(Error::InvalidParent {
            path: path.to_string(),
            kind: other.kind(),
        }),
    }
}

/// Merge `value` into the node at `path`.
///
/// Depending on what meets what:
///
/// 1. array and array: the elements are appended
/// 2. object and object: keys merge recursively (absent keys are inserted,
///    nested objects merge, nested arrays concatenate, anything else is
///    replaced)
/// 3. array and anything else: the value is appended as one element
/// 4. scalar and scalar: the slot becomes the array `[old, new]`
/// 5. any other mix: inside an object the key keeps both values as an
///    implicit array, inside an array the element is replaced, and at the
///    root it is an error
///
/// A path whose final fragment does not exist receives the value as-is.
///
/// # Examples
///
/// ```
/// use cfgcmd::{Document, Node, ParseOptions};
/// use cfgcmd::mutate::merge;
///
/// let mut doc = Document::parse(r#"{"retries": 3}"#, "-", &ParseOptions::default()).unwrap();
/// merge(&mut doc.root, ".retries", Node::Integer(5), '.', 128).unwrap();
///
/// let merged = doc.root.child("retries").unwrap();
/// assert_eq!(merged, &Node::Array(vec![Node::Integer(3), Node::Integer(5)]));
/// ```
pub fn merge(root: &mut Node, path: &str, value: Node, delimiter: char, max_depth: usize) -> Result<()> {
    let location =
        path::locate(root, path, delimiter).ok_or_else(|| Error::ParentNotFound(path.to_string()))?;
    if location.split.is_root() {
        return match combine(root, value, max_depth)? {
            None => Ok(()),
            Some(value) => Err(Error::InvalidRoot {
                op: "merge",
                kind: value.kind(),
            }),
        };
    }

    let parent = path::parent_mut(root, &location, delimiter)
        .ok_or_else(|| Error::ParentNotFound(path.to_string()))?;
    if !location.occupied {
        return attach(parent, &location, value, path);
    }

    let fragment = location.split.fragment;
    let target = parent
        .child_mut(fragment)
        .ok_or_else(|| Error::KeyNotFound(path.to_string()))?;
    let Some(value) = combine(target, value, max_depth)? else {
        return Ok(());
    };

    tracing::debug!(path, kind = %value.kind(), "merging mixed kinds at the parent");
    match parent.kind() {
        Kind::Object => {
            let member = parent
                .as_object_mut()
                .and_then(|obj| obj.member_mut(fragment))
                .ok_or_else(|| Error::KeyNotFound(path.to_string()))?;
            member.push(value);
            Ok(())
        }
        Kind::Array => attach(parent, &location, value, path),
        kind => Err(Error::InvalidParent {
            path: path.to_string(),
            kind,
        }),
    }
}

/// Cases 1 to 4 of [`merge`], applied to the target node itself.
///
/// Hands the value back when the kinds do not combine in place.
fn combine(target: &mut Node, value: Node, max_depth: usize) -> Result<Option<Node>> {
    match (target, value) {
        (Node::Array(arr), Node::Array(items)) => arr.extend(items),
        (Node::Object(obj), Node::Object(incoming)) => merge_objects(obj, incoming, 1, max_depth)?,
        (Node::Array(arr), value) => arr.push(value),
        (target, value) if !target.is_compound() && !value.is_compound() => {
            let old = std::mem::replace(target, Node::Null);
            *target = Node::Array(vec![old, value]);
        }
        (_, value) => return Ok(Some(value)),
    }
    Ok(None)
}

fn merge_objects(target: &mut Object, incoming: Object, depth: usize, max_depth: usize) -> Result<()> {
    if depth > max_depth {
        return Err(Error::TooDeep { limit: max_depth });
    }
    for (key, member) in incoming {
        for value in member.into_values() {
            let existing = target.get(&key).map(Node::kind);
            match (existing, value) {
                (Some(Kind::Object), Node::Object(incoming)) => {
                    if let Some(Node::Object(obj)) = target.get_mut(&key) {
                        merge_objects(obj, incoming, depth + 1, max_depth)?;
                    }
                }
                (Some(Kind::Array), Node::Array(items)) => {
                    if let Some(Node::Array(arr)) = target.get_mut(&key) {
                        arr.extend(items);
                    }
                }
                (_, value) => {
                    target.insert(key.as_str(), value);
                }
            }
        }
    }
    Ok(())
}

/// Remove the node at `path`.
///
/// Array elements are removed at the index the path resolves to at the
/// time of the call, object members by key (all values of a repeated key
/// go together).
pub fn remove(root: &mut Node, path: &str, delimiter: char) -> Result<()> {
    let location =
        path::locate(root, path, delimiter).ok_or_else(|| Error::ParentNotFound(path.to_string()))?;
    if location.split.is_root() {
        return Err(Error::InvalidRoot {
            op: "remove",
            kind: root.kind(),
        });
    }
    if !location.occupied {
        return Err(Error::KeyNotFound(path.to_string()));
    }

    let fragment = location.split.fragment;
    let parent = path::parent_mut(root, &location, delimiter)
        .ok_or_else(|| Error::ParentNotFound(path.to_string()))?;
    match parent {
        Node::Object(obj) => {
            obj.remove(fragment)
                .ok_or_else(|| Error::KeyNotFound(path.to_string()))?;
        }
        Node::Array(arr) => {
            let index = fragment
                .parse::<usize>()
                .ok()
                .filter(|&i| i < arr.len())
                .ok_or_else(|| Error::KeyNotFound(path.to_string()))?;
            arr.remove(index);
        }
        other => {
            return Err(Error::InvalidParent {
                path: path.to_string(),
                kind: other.kind(),
            });
        }
    }
    tracing::debug!(path, "removed");
    Ok(())
}

/// Outcome of a batch of removals.
#[derive(Debug, Default)]
pub struct RemoveReport {
    pub removed: usize,
    /// Each path that could not be removed, with the reason
    pub failures: Vec<(String, Error)>,
}

impl RemoveReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// `Ok` when every removal succeeded, [`Error::PartialRemoval`] otherwise.
    pub fn into_result(self) -> Result<()> {
        if self.failures.is_empty() {
            Ok(())
        } else {
            Err(Error::PartialRemoval {
                count: self.failures.len(),
            })
        }
    }
}

/// Remove several paths in order. A failed path is recorded and skipped.
///
/// Each path is resolved against the document as left by the removals
/// before it.
pub fn remove_all<S: AsRef<str>>(root: &mut Node, paths: &[S], delimiter: char) -> RemoveReport {
    let mut report = RemoveReport::default();
    for path in paths {
        let path = path.as_ref();
        match remove(root, path, delimiter) {
            Ok(()) => report.removed += 1,
            Err(e) => {
                tracing::debug!(path, error = %e, "remove failed");
                report.failures.push((path.to_string(), e));
            }
        }
    }
    report
}
