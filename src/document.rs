//! Parse adapter: turns document text into a [`Node`] tree.
//!
//! JSON goes through `serde_json` and everything else through `serde_yaml`
//! (YAML 1.2 accepts any JSON document). Both drive the same
//! [`DeserializeSeed`], which builds nodes directly so that repeated object
//! keys survive as implicit arrays instead of being overwritten.
//!
//! Inline values given on the command line are usually bare scalars, so
//! [`parse_value`] falls back to literal inference ([`parse_literal`]) the
//! way a config parser reads an unquoted value.

use std::{fmt, sync::LazyLock};

use regex::Regex;
use serde::de::{self, DeserializeSeed, Deserializer, MapAccess, SeqAccess, Visitor};

use crate::{
    config::DEFAULT_MAX_DEPTH,
    error::{Error, Result},
    node::{Kind, Node, Object},
};

static INTEGER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[+-]?\d+$").unwrap());
static HEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([+-]?)0[xX]([0-9a-fA-F]+)$").unwrap());
static FLOAT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(\d+\.\d*|\.\d+|\d+)([eE][+-]?\d+)?$").unwrap()
});
static SUFFIXED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^([+-]?(?:\d+\.?\d*|\.\d+))(kb|mb|gb|ms|min|k|m|g|s|h|d|w|y)$").unwrap()
});
static MAPPING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*[\w.-]+:(\s|$)").unwrap());

/// Surface syntax a document was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Syntax {
    Json,
    Yaml,
}

impl Syntax {
    /// JSON when the first non-blank character opens an object or array.
    pub fn detect(text: &str) -> Syntax {
        match text.trim_start().chars().next() {
            Some('{') | Some('[') => Syntax::Json,
            _ => Syntax::Yaml,
        }
    }
}

/// Parser behaviour switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Fold every object key to lowercase
    pub lowercase_keys: bool,
    /// Keep repeated keys as implicit arrays; when off the last value wins
    pub implicit_arrays: bool,
    pub max_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            lowercase_keys: false,
            implicit_arrays: true,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// A parsed document and the syntax it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub root: Node,
    pub syntax: Syntax,
}

impl Document {
    /// Parse a whole document. `source_name` only appears in error messages.
    ///
    /// Blank input yields an empty object.
    pub fn parse(text: &str, source_name: &str, options: &ParseOptions) -> Result<Document> {
        let syntax = Syntax::detect(text);
        if text.trim().is_empty() {
            return Ok(Document {
                root: Node::Object(Object::new()),
                syntax,
            });
        }

        let seed = NodeSeed { options };
        let parsed = match syntax {
            Syntax::Json => {
                let mut de = serde_json::Deserializer::from_str(text);
                seed.deserialize(&mut de)
                    .and_then(|node| de.end().map(|_| node))
                    .map_err(|e| e.to_string())
            }
            Syntax::Yaml => seed
                .deserialize(serde_yaml::Deserializer::from_str(text))
                .map_err(|e| e.to_string()),
        };
        let root = parsed.map_err(|message| Error::Parse {
            source_name: source_name.to_string(),
            message,
        })?;

        if root.depth() > options.max_depth {
            return Err(Error::TooDeep {
                limit: options.max_depth,
            });
        }
        tracing::debug!(source = source_name, ?syntax, kind = %root.kind(), "parsed document");
        Ok(Document { root, syntax })
    }
}

/// Parse a value supplied for `set` or `merge`.
///
/// Text that looks structured (`{...}`, `[...]`, `key: value`, or several
/// lines) is parsed as a document. Anything else, and structured text that
/// fails to parse, goes through [`parse_literal`].
pub fn parse_value(text: &str, options: &ParseOptions) -> Result<Node> {
    let structured = matches!(text.trim_start().chars().next(), Some('{') | Some('['))
        || text.trim().lines().count() > 1
        || MAPPING.is_match(text);
    if !structured {
        return Ok(parse_literal(text));
    }
    match Document::parse(text, "value", options) {
        Ok(doc) => Ok(doc.root),
        Err(Error::Parse { message, .. }) => {
            tracing::debug!(%message, "value is not a document, treating it as a literal");
            Ok(parse_literal(text))
        }
        Err(e) => Err(e),
    }
}

/// Infer the kind of a bare scalar.
///
/// # Examples
///
/// ```
/// use cfgcmd::Node;
/// use cfgcmd::document::parse_literal;
///
/// assert_eq!(parse_literal("42"), Node::Integer(42));
/// assert_eq!(parse_literal("0x1f"), Node::Integer(31));
/// assert_eq!(parse_literal("yes"), Node::Boolean(true));
/// assert_eq!(parse_literal("2min"), Node::Timestamp(120.0));
/// assert_eq!(parse_literal("4kb"), Node::Integer(4096));
/// assert_eq!(parse_literal("\"quoted\""), Node::from("quoted"));
/// assert_eq!(parse_literal("plain words"), Node::from("plain words"));
/// ```
pub fn parse_literal(text: &str) -> Node {
    let t = text.trim();

    if t.len() >= 2 && t.starts_with('"') && t.ends_with('"') {
        if let Ok(s) = serde_json::from_str::<String>(t) {
            return Node::String(s);
        }
    }
    if t.len() >= 2 && t.starts_with('\'') && t.ends_with('\'') {
        return Node::String(t[1..t.len() - 1].to_string());
    }

    match t.to_ascii_lowercase().as_str() {
        "null" => return Node::Null,
        "true" | "yes" | "on" => return Node::Boolean(true),
        "false" | "no" | "off" => return Node::Boolean(false),
        _ => {}
    }

    if INTEGER.is_match(t) {
        if let Ok(n) = t.parse::<i64>() {
            return Node::Integer(n);
        }
    }
    if let Some(n) = parse_hex(t) {
        return Node::Integer(n);
    }
    if FLOAT.is_match(t) {
        if let Ok(f) = t.parse::<f64>() {
            return Node::Float(f);
        }
    }
    if let Some(node) = parse_suffixed(t) {
        return node;
    }

    Node::String(text.to_string())
}

fn parse_hex(t: &str) -> Option<i64> {
    let caps = HEX.captures(t)?;
    let n = i64::from_str_radix(&caps[2], 16).ok()?;
    Some(if &caps[1] == "-" { -n } else { n })
}

/// `10k`, `4kb`, `250ms`, `5min`, ...
fn parse_suffixed(t: &str) -> Option<Node> {
    let caps = SUFFIXED.captures(t)?;
    let number: f64 = caps[1].parse().ok()?;
    let suffix = caps[2].to_ascii_lowercase();

    let size = |mult: f64| {
        let n = number * mult;
        if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
            Node::Integer(n as i64)
        } else {
            Node::Float(n)
        }
    };

    Some(match suffix.as_str() {
        "k" => size(1e3),
        "kb" => size(1024.0),
        "m" => size(1e6),
        "mb" => size(1024.0 * 1024.0),
        "g" => size(1e9),
        "gb" => size(1024.0 * 1024.0 * 1024.0),
        "ms" => Node::Timestamp(number / 1000.0),
        "s" => Node::Timestamp(number),
        "min" => Node::Timestamp(number * 60.0),
        "h" => Node::Timestamp(number * 3600.0),
        "d" => Node::Timestamp(number * 86_400.0),
        "w" => Node::Timestamp(number * 604_800.0),
        "y" => Node::Timestamp(number * 31_536_000.0),
        _ => return None,
    })
}

/// Integer with C `strtol(.., 0)` prefixes: `0x` hex, leading `0` octal.
fn parse_c_integer(t: &str) -> Option<i64> {
    let t = t.trim();
    let (negative, digits) = match t.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, t.strip_prefix('+').unwrap_or(t)),
    };
    let n = if let Some(hex) = digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
        i64::from_str_radix(hex, 16).ok()?
    } else if digits.len() > 1 && digits.starts_with('0') {
        i64::from_str_radix(&digits[1..], 8).ok()?
    } else {
        digits.parse::<i64>().ok()?
    };
    Some(if negative { -n } else { n })
}

/// Build a node of exactly `kind` from `text`, as `set --type` does.
///
/// Literal inference runs first. When it yields a different kind a
/// kind-specific fallback is tried; if that fails too the result is a
/// [`Error::Coercion`], never a node of the wrong kind.
pub fn parse_typed(text: &str, kind: Kind, options: &ParseOptions) -> Result<Node> {
    let literal = parse_literal(text);
    let node = match kind {
        Kind::String => Node::String(text.to_string()),
        Kind::Integer => parse_c_integer(text).map(Node::Integer).unwrap_or(literal),
        Kind::Float => match literal {
            n @ Node::Float(_) => n,
            Node::Integer(n) => Node::Float(n as f64),
            other => text.trim().parse::<f64>().map(Node::Float).unwrap_or(other),
        },
        Kind::Boolean => match literal {
            n @ Node::Boolean(_) => n,
            _ => Node::Boolean(!text.is_empty()),
        },
        Kind::Timestamp => match literal {
            n @ Node::Timestamp(_) => n,
            Node::Integer(n) => Node::Timestamp(n as f64),
            Node::Float(f) => Node::Timestamp(f),
            other => text
                .trim()
                .parse::<f64>()
                .map(Node::Timestamp)
                .unwrap_or(other),
        },
        Kind::Object | Kind::Array | Kind::Null | Kind::Userdata => parse_value(text, options)?,
    };

    if node.kind() != kind {
        return Err(Error::Coercion {
            data: text.to_string(),
            wanted: kind,
            found: node.kind(),
        });
    }
    Ok(node)
}

#[derive(Clone, Copy)]
struct NodeSeed<'o> {
    options: &'o ParseOptions,
}

impl<'de> DeserializeSeed<'de> for NodeSeed<'_> {
    type Value = Node;

    fn deserialize<D>(self, deserializer: D) -> std::result::Result<Node, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(self)
    }
}

impl<'de> Visitor<'de> for NodeSeed<'_> {
    type Value = Node;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a configuration value")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> std::result::Result<Node, E> {
        Ok(Node::Boolean(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<Node, E> {
        Ok(Node::Integer(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<Node, E> {
        Ok(match i64::try_from(v) {
            Ok(n) => Node::Integer(n),
            Err(_) => Node::Float(v as f64),
        })
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<Node, E> {
        Ok(Node::Float(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Node, E> {
        Ok(Node::String(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> std::result::Result<Node, E> {
        Ok(Node::String(v))
    }

    fn visit_unit<E: de::Error>(self) -> std::result::Result<Node, E> {
        Ok(Node::Null)
    }

    fn visit_none<E: de::Error>(self) -> std::result::Result<Node, E> {
        Ok(Node::Null)
    }

    fn visit_some<D>(self, deserializer: D) -> std::result::Result<Node, D::Error>
    where
        D: Deserializer<'de>,
    {
        self.deserialize(deserializer)
    }

    fn visit_seq<A>(self, mut seq: A) -> std::result::Result<Node, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element_seed(self)? {
            items.push(item);
        }
        Ok(Node::Array(items))
    }

    fn visit_map<A>(self, mut map: A) -> std::result::Result<Node, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut obj = Object::new();
        while let Some(key) = map.next_key_seed(KeySeed)? {
            let key = if self.options.lowercase_keys {
                key.to_lowercase()
            } else {
                key
            };
            let value = map.next_value_seed(self)?;
            if self.options.implicit_arrays {
                obj.push(key, value);
            } else {
                obj.insert(key, value);
            }
        }
        Ok(Node::Object(obj))
    }
}

/// Accepts any scalar as an object key. YAML allows `1: one`.
struct KeySeed;

impl<'de> DeserializeSeed<'de> for KeySeed {
    type Value = String;

    fn deserialize<D>(self, deserializer: D) -> std::result::Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(self)
    }
}

impl<'de> Visitor<'de> for KeySeed {
    type Value = String;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a scalar key")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_string<E: de::Error>(self, v: String) -> std::result::Result<String, E> {
        Ok(v)
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> std::result::Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_unit<E: de::Error>(self) -> std::result::Result<String, E> {
        Ok("null".to_string())
    }
}
