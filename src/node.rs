use std::fmt;

use indexmap::{IndexMap, map::Entry};

/// A typed node of a configuration document.
///
/// The root node owns its whole subtree. Children are reached through
/// [`Node::Array`] (positional order) or [`Node::Object`] (insertion order).
/// A node's kind never changes in place: edits replace whole nodes.
///
/// # Examples
///
/// ```
/// use cfgcmd::{Node, Object};
///
/// let mut server = Object::new();
/// server.insert("port", Node::Integer(8080));
/// server.insert("name", Node::from("web"));
///
/// let root = Node::Object(server);
/// assert_eq!(root.len(), 2);
/// assert_eq!(root.child("port"), Some(&Node::Integer(8080)));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Explicit null
    Null,

    /// true/false
    Boolean(bool),

    /// Signed integer
    Integer(i64),

    /// Floating-point number
    Float(f64),

    /// UTF-8 string
    String(String),

    /// A duration in seconds (`10s`, `5min`, `1h`, ...)
    Timestamp(f64),

    /// Opaque application data; never produced by the parsers
    Userdata(String),

    /// Ordered list of nodes
    Array(Vec<Node>),

    /// Ordered map of keys to members
    Object(Object),
}

/// The kind of a [`Node`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Object,
    Array,
    Integer,
    Float,
    String,
    Boolean,
    Timestamp,
    Userdata,
    Null,
}

impl Kind {
    /// The name printed by the `type` command.
    pub fn name(self) -> &'static str {
        match self {
            Kind::Object => "object",
            Kind::Array => "array",
            Kind::Integer => "int",
            Kind::Float => "float",
            Kind::String => "string",
            Kind::Boolean => "boolean",
            Kind::Timestamp => "time",
            Kind::Userdata => "userdata",
            Kind::Null => "null",
        }
    }

    /// Parse a kind name as accepted by `set --type`.
    pub fn from_name(name: &str) -> Option<Kind> {
        match name.to_ascii_lowercase().as_str() {
            "object" | "obj" => Some(Kind::Object),
            "array" | "arr" => Some(Kind::Array),
            "int" | "integer" => Some(Kind::Integer),
            "float" | "double" | "number" => Some(Kind::Float),
            "string" | "str" => Some(Kind::String),
            "bool" | "boolean" => Some(Kind::Boolean),
            "time" => Some(Kind::Timestamp),
            "userdata" => Some(Kind::Userdata),
            "null" => Some(Kind::Null),
            _ => None,
        }
    }

    pub fn is_compound(self) -> bool {
        matches!(self, Kind::Object | Kind::Array)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Node {
    pub fn kind(&self) -> Kind {
        match self {
            Node::Null => Kind::Null,
            Node::Boolean(_) => Kind::Boolean,
            Node::Integer(_) => Kind::Integer,
            Node::Float(_) => Kind::Float,
            Node::String(_) => Kind::String,
            Node::Timestamp(_) => Kind::Timestamp,
            Node::Userdata(_) => Kind::Userdata,
            Node::Array(_) => Kind::Array,
            Node::Object(_) => Kind::Object,
        }
    }

    pub fn is_compound(&self) -> bool {
        self.kind().is_compound()
    }

    /// The value reported by the `length` command.
    ///
    /// Objects count their keys, arrays their elements and strings their
    /// bytes. Every other scalar has length 0.
    pub fn len(&self) -> usize {
        match self {
            Node::Object(obj) => obj.len(),
            Node::Array(arr) => arr.len(),
            Node::String(s) => s.len(),
            _ => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Look up one path fragment below this node.
    ///
    /// Arrays interpret the fragment as a base-10 index, objects as a key.
    /// A key holding an implicit array resolves to its first value.
    pub fn child(&self, fragment: &str) -> Option<&Node> {
        match self {
            Node::Array(arr) => fragment.parse::<usize>().ok().and_then(|i| arr.get(i)),
            Node::Object(obj) => obj.get(fragment),
            _ => None,
        }
    }

    pub fn child_mut(&mut self, fragment: &str) -> Option<&mut Node> {
        match self {
            Node::Array(arr) => fragment.parse::<usize>().ok().and_then(|i| arr.get_mut(i)),
            Node::Object(obj) => obj.get_mut(fragment),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Node::Object(obj) => Some(obj),
            _ => None,
        }
    }

    pub fn as_object_mut(&mut self) -> Option<&mut Object> {
        match self {
            Node::Object(obj) => Some(obj),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Vec<Node>> {
        match self {
            Node::Array(arr) => Some(arr),
            _ => None,
        }
    }

    pub fn as_array_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Node::Array(arr) => Some(arr),
            _ => None,
        }
    }

    /// Nesting depth: scalars are 0, `{}` and `[]` are 1.
    pub fn depth(&self) -> usize {
        match self {
            Node::Array(arr) => 1 + arr.iter().map(Node::depth).max().unwrap_or(0),
            Node::Object(obj) => {
                1 + obj
                    .iter()
                    .flat_map(|(_, member)| member.values())
                    .map(Node::depth)
                    .max()
                    .unwrap_or(0)
            }
            _ => 0,
        }
    }
}

impl From<bool> for Node {
    fn from(b: bool) -> Self {
        Node::Boolean(b)
    }
}

impl From<i64> for Node {
    fn from(n: i64) -> Self {
        Node::Integer(n)
    }
}

impl From<f64> for Node {
    fn from(n: f64) -> Self {
        Node::Float(n)
    }
}

impl From<&str> for Node {
    fn from(s: &str) -> Self {
        Node::String(s.to_string())
    }
}

impl From<String> for Node {
    fn from(s: String) -> Self {
        Node::String(s)
    }
}

impl From<Vec<Node>> for Node {
    fn from(arr: Vec<Node>) -> Self {
        Node::Array(arr)
    }
}

impl From<Object> for Node {
    fn from(obj: Object) -> Self {
        Node::Object(obj)
    }
}

/// What an object key holds: one value, or the values of a key that was
/// repeated while parsing.
#[derive(Debug, Clone, PartialEq)]
pub enum Member {
    Value(Node),
    /// Always holds two or more values, in the order they were seen.
    ImplicitArray(Vec<Node>),
}

impl Member {
    /// The value a key lookup sees.
    pub fn first(&self) -> &Node {
        match self {
            Member::Value(node) => node,
            Member::ImplicitArray(values) => &values[0],
        }
    }

    pub fn first_mut(&mut self) -> &mut Node {
        match self {
            Member::Value(node) => node,
            Member::ImplicitArray(values) => &mut values[0],
        }
    }

    /// All values, expanding an implicit array.
    pub fn values(&self) -> &[Node] {
        match self {
            Member::Value(node) => std::slice::from_ref(node),
            Member::ImplicitArray(values) => values,
        }
    }

    pub fn into_values(self) -> Vec<Node> {
        match self {
            Member::Value(node) => vec![node],
            Member::ImplicitArray(values) => values,
        }
    }

    pub fn is_implicit_array(&self) -> bool {
        matches!(self, Member::ImplicitArray(_))
    }

    /// Chain another value onto this key.
    pub fn push(&mut self, node: Node) {
        match self {
            Member::ImplicitArray(values) => values.push(node),
            Member::Value(_) => {
                let placeholder = Member::ImplicitArray(Vec::new());
                if let Member::Value(first) = std::mem::replace(self, placeholder) {
                    *self = Member::ImplicitArray(vec![first, node]);
                }
            }
        }
    }
}

/// An insertion-ordered map from keys to [`Member`]s.
///
/// Removing a key keeps the order of the keys after it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Object {
    members: IndexMap<String, Member>,
}

impl Object {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Position of `key` in insertion order.
    pub fn index_of(&self, key: &str) -> Option<usize> {
        self.members.get_index_of(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.members.contains_key(key)
    }

    /// First value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.member(key).map(Member::first)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Node> {
        self.member_mut(key).map(Member::first_mut)
    }

    pub fn member(&self, key: &str) -> Option<&Member> {
        self.members.get(key)
    }

    pub fn member_mut(&mut self, key: &str) -> Option<&mut Member> {
        self.members.get_mut(key)
    }

    /// Insert or replace `key`, keeping the position of an existing key.
    /// Returns whatever the key held before.
    pub fn insert(&mut self, key: impl Into<String>, node: Node) -> Option<Member> {
        self.members.insert(key.into(), Member::Value(node))
    }

    /// Add a value under `key`, turning an existing key into an implicit array.
    pub fn push(&mut self, key: impl Into<String>, node: Node) {
        match self.members.entry(key.into()) {
            Entry::Occupied(mut slot) => slot.get_mut().push(node),
            Entry::Vacant(slot) => {
                slot.insert(Member::Value(node));
            }
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<Member> {
        self.members.shift_remove(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Member)> {
        self.members.iter().map(|(key, member)| (key.as_str(), member))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.members.keys().map(String::as_str)
    }
}

impl IntoIterator for Object {
    type Item = (String, Member);
    type IntoIter = indexmap::map::IntoIter<String, Member>;

    fn into_iter(self) -> Self::IntoIter {
        self.members.into_iter()
    }
}

impl<K: Into<String>> FromIterator<(K, Node)> for Object {
    /// Later duplicates replace earlier ones; use [`Object::push`] to keep both.
    fn from_iter<T: IntoIterator<Item = (K, Node)>>(iter: T) -> Self {
        let mut obj = Object::new();
        for (key, node) in iter {
            obj.insert(key, node);
        }
        obj
    }
}
