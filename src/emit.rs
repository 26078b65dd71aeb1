//! Structured emitters.
//!
//! JSON, YAML and MessagePack go through serde via the [`Serialize`] impl on
//! [`Node`]. The canonical config text has no serde backend and is printed
//! by [`ConfigPrinter`].
//!
//! Implicit arrays become arrays in the serde formats and repeated keys in
//! config text. Timestamps are written as float seconds and userdata as null.
//!
//! # Examples
//!
//! ```
//! use cfgcmd::{Node, Object};
//! use cfgcmd::emit::{to_config, to_json};
//!
//! let mut obj = Object::new();
//! obj.insert("port", Node::Integer(80));
//! obj.push("tag", Node::from("a"));
//! obj.push("tag", Node::from("b"));
//! let node = Node::Object(obj);
//!
//! assert_eq!(to_json(&node).unwrap(), r#"{"port":80,"tag":["a","b"]}"#);
//! assert_eq!(to_config(&node), "port = 80;\ntag = \"a\";\ntag = \"b\";\n");
//! ```

use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

use crate::{
    config::OutputFormat,
    error::{Error, Result},
    node::{Member, Node, Object},
};

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Node::Null | Node::Userdata(_) => serializer.serialize_unit(),
            Node::Boolean(b) => serializer.serialize_bool(*b),
            Node::Integer(n) => serializer.serialize_i64(*n),
            Node::Float(f) | Node::Timestamp(f) => serializer.serialize_f64(*f),
            Node::String(s) => serializer.serialize_str(s),
            Node::Array(arr) => {
                let mut seq = serializer.serialize_seq(Some(arr.len()))?;
                for item in arr {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Node::Object(obj) => obj.serialize(serializer),
        }
    }
}

impl Serialize for Object {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (key, member) in self.iter() {
            map.serialize_entry(key, member)?;
        }
        map.end()
    }
}

impl Serialize for Member {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Member::Value(node) => node.serialize(serializer),
            Member::ImplicitArray(values) => values.serialize(serializer),
        }
    }
}

/// Serialize `node` in `format`.
///
/// [`OutputFormat::Text`] has no whole-tree form of its own and is treated
/// as config text here.
pub fn emit(node: &Node, format: OutputFormat) -> Result<Vec<u8>> {
    let emit_error = |message: String| Error::Emit {
        format: format.name(),
        message,
    };
    match format {
        OutputFormat::Text | OutputFormat::Config => Ok(to_config(node).into_bytes()),
        OutputFormat::Json => to_json_pretty(node).map(String::into_bytes),
        OutputFormat::JsonCompact => to_json(node).map(String::into_bytes),
        OutputFormat::Yaml => to_yaml(node).map(String::into_bytes),
        OutputFormat::Msgpack => rmp_serde::to_vec(node).map_err(|e| emit_error(e.to_string())),
    }
}

/// Compact JSON, no trailing newline.
pub fn to_json(node: &Node) -> Result<String> {
    serde_json::to_string(node).map_err(|e| Error::Emit {
        format: OutputFormat::JsonCompact.name(),
        message: e.to_string(),
    })
}

/// JSON with 2-space indentation, no trailing newline.
pub fn to_json_pretty(node: &Node) -> Result<String> {
    serde_json::to_string_pretty(node).map_err(|e| Error::Emit {
        format: OutputFormat::Json.name(),
        message: e.to_string(),
    })
}

/// YAML, always newline-terminated.
pub fn to_yaml(node: &Node) -> Result<String> {
    serde_yaml::to_string(node).map_err(|e| Error::Emit {
        format: OutputFormat::Yaml.name(),
        message: e.to_string(),
    })
}

pub fn to_config(node: &Node) -> String {
    ConfigPrinter::new().print(node)
}

/// Prints the canonical `key = value;` config syntax.
///
/// The top-level object is written without braces. Nested objects open a
/// `key {` block and arrays a `key [` block, indented by four spaces per
/// level. A key holding an implicit array is written once per value.
pub struct ConfigPrinter {
    indent_width: usize,
}

impl Default for ConfigPrinter {
    fn default() -> Self {
        ConfigPrinter { indent_width: 4 }
    }
}

impl ConfigPrinter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn print(&self, node: &Node) -> String {
        let mut out = String::new();
        match node {
            Node::Object(obj) => self.print_members(obj, 0, &mut out),
            other => {
                self.print_value(other, 0, &mut out);
                out.push('\n');
            }
        }
        out
    }

    fn print_members(&self, obj: &Object, level: usize, out: &mut String) {
        for (key, member) in obj.iter() {
            for value in member.values() {
                out.push_str(&self.indent(level));
                out.push_str(&self.key(key));
                match value {
                    Node::Object(child) => {
                        out.push_str(" {\n");
                        self.print_members(child, level + 1, out);
                        out.push_str(&self.indent(level));
                        out.push_str("}\n");
                    }
                    Node::Array(items) => {
                        out.push(' ');
                        self.print_array(items, level, out);
                        out.push('\n');
                    }
                    scalar => {
                        out.push_str(" = ");
                        out.push_str(&self.scalar(scalar));
                        out.push_str(";\n");
                    }
                }
            }
        }
    }

    fn print_value(&self, node: &Node, level: usize, out: &mut String) {
        match node {
            Node::Object(obj) => {
                out.push_str("{\n");
                self.print_members(obj, level + 1, out);
                out.push_str(&self.indent(level));
                out.push('}');
            }
            Node::Array(items) => self.print_array(items, level, out),
            scalar => out.push_str(&self.scalar(scalar)),
        }
    }

    fn print_array(&self, items: &[Node], level: usize, out: &mut String) {
        if items.is_empty() {
            out.push_str("[]");
            return;
        }
        out.push_str("[\n");
        for item in items {
            out.push_str(&self.indent(level + 1));
            self.print_value(item, level + 1, out);
            out.push_str(",\n");
        }
        out.push_str(&self.indent(level));
        out.push(']');
    }

    fn scalar(&self, node: &Node) -> String {
        match node {
            Node::Null | Node::Userdata(_) => "null".to_string(),
            Node::Boolean(b) => b.to_string(),
            Node::Integer(n) => n.to_string(),
            Node::Float(f) | Node::Timestamp(f) => format_float(*f),
            Node::String(s) => quote(s),
            Node::Array(_) | Node::Object(_) => String::new(),
        }
    }

    /// Bare keys are written as-is, anything else is quoted.
    fn key(&self, key: &str) -> String {
        let bare = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '/' | '.'));
        if bare { key.to_string() } else { quote(key) }
    }

    fn indent(&self, level: usize) -> String {
        " ".repeat(self.indent_width * level)
    }
}

/// Keep a decimal point on whole floats so they read back as floats.
fn format_float(f: f64) -> String {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e16 {
        format!("{f:.1}")
    } else {
        f.to_string()
    }
}

fn quote(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_else(|_| format!("\"{s}\""))
}

/// Structural listing used by the `dump` command and subcommand.
///
/// Every node prints its key (when it has one), kind, length and value,
/// indented four spaces per level.
pub fn dump(node: &Node) -> String {
    let mut out = String::new();
    dump_node(None, node, 0, &mut out);
    out
}

fn dump_node(key: Option<&str>, node: &Node, level: usize, out: &mut String) {
    let pad = "    ".repeat(level);
    if let Some(key) = key {
        out.push_str(&format!("{pad}key: {}\n", quote(key)));
    }
    out.push_str(&format!("{pad}type: {}\n", node.kind()));
    out.push_str(&format!("{pad}len: {}\n", node.len()));
    match node {
        Node::Object(obj) => {
            out.push_str(&format!("{pad}value: {{\n"));
            for (key, member) in obj.iter() {
                for value in member.values() {
                    dump_node(Some(key), value, level + 1, out);
                }
            }
            out.push_str(&format!("{pad}}}\n"));
        }
        Node::Array(items) => {
            out.push_str(&format!("{pad}value: [\n"));
            for item in items {
                dump_node(None, item, level + 1, out);
            }
            out.push_str(&format!("{pad}]\n"));
        }
        Node::Userdata(_) => out.push_str(&format!("{pad}value: {{userdata}}\n")),
        scalar => out.push_str(&format!("{pad}value: {}\n", ConfigPrinter::new().scalar(scalar))),
    }
}
