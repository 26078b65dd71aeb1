//! Path resolution.
//!
//! A path is a string of segments separated by one delimiter character,
//! e.g. `.servers.0.name`. A leading delimiter (or the bare delimiter) means
//! the root. Object members are selected by key, array elements by a
//! non-negative decimal index.
//!
//! Mutations need the node that *contains* the target as well as the
//! target itself, so paths are split into a prefix naming the parent and a
//! final fragment.

use crate::node::Node;

/// A path split at its last delimiter.
///
/// # Examples
///
/// ```
/// use cfgcmd::path::split;
///
/// let p = split(".servers.0.name", '.');
/// assert_eq!(p.prefix, Some("servers.0"));
/// assert_eq!(p.fragment, "name");
///
/// let p = split("name", '.');
/// assert_eq!(p.prefix, None);
/// assert_eq!(p.fragment, "name");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitPath<'p> {
    /// Path of the parent, `None` when the parent is the root
    pub prefix: Option<&'p str>,
    /// Key or index selected inside the parent
    pub fragment: &'p str,
}

impl SplitPath<'_> {
    /// True for `.` and the empty path.
    pub fn is_root(&self) -> bool {
        self.prefix.is_none() && self.fragment.is_empty()
    }
}

/// Drop the leading root delimiter and any trailing delimiters.
pub fn normalize(path: &str, delimiter: char) -> &str {
    path.strip_prefix(delimiter)
        .unwrap_or(path)
        .trim_end_matches(delimiter)
}

pub fn split(path: &str, delimiter: char) -> SplitPath<'_> {
    let path = normalize(path, delimiter);
    match path.rfind(delimiter) {
        Some(i) => SplitPath {
            prefix: Some(&path[..i]),
            fragment: &path[i + delimiter.len_utf8()..],
        },
        None => SplitPath {
            prefix: None,
            fragment: path,
        },
    }
}

/// Walk `path` down from `node` one segment at a time.
///
/// Empty segments are skipped, so `a..b` is `a.b` and `.a` is `a`.
/// Returns `None` as soon as a step does not exist; that is an absence,
/// not an error.
pub fn lookup<'a>(node: &'a Node, path: &str, delimiter: char) -> Option<&'a Node> {
    path.split(delimiter)
        .filter(|segment| !segment.is_empty())
        .try_fold(node, |current, segment| current.child(segment))
}

pub fn lookup_mut<'a>(node: &'a mut Node, path: &str, delimiter: char) -> Option<&'a mut Node> {
    let mut current = node;
    for segment in path.split(delimiter).filter(|segment| !segment.is_empty()) {
        current = current.child_mut(segment)?;
    }
    Some(current)
}

/// The node that contains whatever `path` names.
///
/// `None` means an intermediate step of the path does not exist.
pub fn resolve_parent<'a>(root: &'a Node, path: &str, delimiter: char) -> Option<&'a Node> {
    match split(path, delimiter).prefix {
        None => Some(root),
        Some(prefix) => lookup(root, prefix, delimiter),
    }
}

/// The node `path` names, or its parent when the final fragment is missing.
///
/// Callers compare the result with [`resolve_parent`] by identity
/// (`std::ptr::eq`) to tell "does not exist yet" from "exists".
pub fn resolve_target<'a>(root: &'a Node, path: &str, delimiter: char) -> Option<&'a Node> {
    let split = split(path, delimiter);
    let parent = resolve_parent(root, path, delimiter)?;
    if split.is_root() {
        return Some(parent);
    }
    let target = parent.child(split.fragment).unwrap_or(parent);
    tracing::trace!(
        path,
        fragment = split.fragment,
        found = !std::ptr::eq(target, parent),
        "resolved target"
    );
    Some(target)
}

/// Where a mutation lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location<'p> {
    pub split: SplitPath<'p>,
    /// The final fragment already names a child of the parent
    pub occupied: bool,
}

/// Resolve `path` for a mutation. `None` when the parent does not exist.
pub fn locate<'p>(root: &Node, path: &'p str, delimiter: char) -> Option<Location<'p>> {
    let parent = resolve_parent(root, path, delimiter)?;
    let target = resolve_target(root, path, delimiter)?;
    let split = split(path, delimiter);
    Some(Location {
        split,
        occupied: !split.is_root() && !std::ptr::eq(parent, target),
    })
}

/// Mutable access to the parent named by a [`Location`].
pub fn parent_mut<'a>(root: &'a mut Node, location: &Location<'_>, delimiter: char) -> Option<&'a mut Node> {
    match location.split.prefix {
        None => Some(root),
        Some(prefix) => lookup_mut(root, prefix, delimiter),
    }
}
