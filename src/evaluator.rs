//! The command interpreter.
//!
//! [`Interpreter::run`] resolves a request's path and evaluates its command
//! chain against the result, writing records to a [`Sink`]. Evaluation is
//! recursive: `each`, `iterate`, `recurse` and sub-path selection replay the
//! rest of the chain once per child they visit.
//!
//! The chain is a read-only slice. Every call to [`Interpreter::evaluate`]
//! returns the depth it reached; the difference from the depth it was
//! called with is the number of leading commands it consumed.

use std::io::Write;

use crate::{
    command::{Command, Request},
    emit,
    error::{Error, Result},
    node::Node,
    output::Sink,
    path,
};

/// Evaluates command chains and writes results to a [`Sink`].
///
/// # Examples
///
/// ```
/// use cfgcmd::{Document, Interpreter, Options, ParseOptions};
/// use cfgcmd::command::Request;
/// use cfgcmd::output::Sink;
///
/// let doc = Document::parse(r#"{"a": 1, "b": 2}"#, "-", &ParseOptions::default()).unwrap();
/// let mut interp = Interpreter::new(Sink::new(Vec::new(), Options::default()));
///
/// interp.run(&doc.root, &Request::parse(".|each", '.').unwrap()).unwrap();
///
/// let out = String::from_utf8(interp.into_sink().into_inner()).unwrap();
/// assert_eq!(out, "1\n2\n");
/// ```
pub struct Interpreter<W: Write> {
    sink: Sink<W>,
}

impl<W: Write> Interpreter<W> {
    pub fn new(sink: Sink<W>) -> Self {
        Interpreter { sink }
    }

    pub fn sink(&mut self) -> &mut Sink<W> {
        &mut self.sink
    }

    pub fn into_sink(self) -> Sink<W> {
        self.sink
    }

    fn delimiter(&self) -> char {
        self.sink.options().input_delimiter
    }

    /// Evaluate one request against `root`.
    ///
    /// A missing path is not an error: it evaluates as an absent node and
    /// renders as `null`.
    pub fn run(&mut self, root: &Node, request: &Request) -> Result<()> {
        let delimiter = self.delimiter();
        let node = path::lookup(root, &request.path, delimiter);
        if node.is_none() {
            tracing::debug!(path = %request.path, "path not found");
        }

        if request.chain.is_empty() {
            return self.sink.render(node, "", &request.path);
        }
        let nodepath = path::normalize(&request.path, delimiter).to_string();
        self.run_chain(node, &nodepath, &request.chain, 0)
    }

    /// Evaluate every command of `chain`, in order, against `node`.
    pub fn run_chain(
        &mut self,
        node: Option<&Node>,
        nodepath: &str,
        chain: &[Command],
        depth: usize,
    ) -> Result<()> {
        let mut cursor = 0;
        while cursor < chain.len() {
            let reached = self.evaluate(node, nodepath, &chain[cursor..], depth)?;
            cursor += reached - depth;
        }
        Ok(())
    }

    /// Evaluate the first command of `chain`.
    ///
    /// Returns the depth reached: `depth + 1` for commands that only
    /// consume themselves, `depth + chain.len()` for commands that replay
    /// the rest of the chain on their children.
    pub fn evaluate(
        &mut self,
        node: Option<&Node>,
        nodepath: &str,
        chain: &[Command],
        depth: usize,
    ) -> Result<usize> {
        let max_depth = self.sink.options().max_depth;
        if depth > max_depth {
            return Err(Error::TooDeep { limit: max_depth });
        }
        let Some((command, rest)) = chain.split_first() else {
            return Ok(depth);
        };
        tracing::trace!(%command, nodepath, depth, "evaluate");

        match command {
            Command::Length => {
                let len = node.map_or(0, Node::len);
                self.sink.line(nodepath, "", &len.to_string())?;
            }
            Command::Type => {
                let name = node.map_or("null", |n| n.kind().name());
                self.sink.line(nodepath, "", name)?;
            }
            Command::Keys => self.keys(node, nodepath)?,
            Command::Values => self.values(node, nodepath)?,
            Command::Dump => {
                let text = emit::dump(node.unwrap_or(&Node::Null));
                self.sink.raw(&text)?;
            }
            Command::Each => {
                self.each(node, nodepath, rest, depth, true)?;
                return Ok(depth + chain.len());
            }
            Command::Iterate => {
                self.each(node, nodepath, rest, depth, false)?;
                return Ok(depth + chain.len());
            }
            Command::Recurse => {
                if let Some(node) = node {
                    self.recurse(node, nodepath, rest, depth)?;
                }
                return Ok(depth + chain.len());
            }
            Command::Select(paths) => {
                self.select(node, nodepath, paths, rest, depth)?;
                return Ok(depth + chain.len());
            }
        }
        Ok(depth + 1)
    }

    fn keys(&mut self, node: Option<&Node>, nodepath: &str) -> Result<()> {
        match node {
            Some(Node::Object(obj)) if !obj.is_empty() => {
                for key in obj.keys() {
                    self.sink.line("", "", key)?;
                }
            }
            Some(Node::Array(arr)) if !arr.is_empty() => {
                for index in 0..arr.len() {
                    self.sink.line("", "", &index.to_string())?;
                }
            }
            _ => tracing::debug!(nodepath, "no keys"),
        }
        Ok(())
    }

    fn values(&mut self, node: Option<&Node>, nodepath: &str) -> Result<()> {
        let delimiter = self.delimiter();
        for (key, child) in node.map(|n| children(n, true)).unwrap_or_default() {
            self.sink
                .render(Some(child), nodepath, &format!("{delimiter}{key}"))?;
        }
        Ok(())
    }

    /// `each` (with `expand`) and `iterate` (without).
    ///
    /// `iterate` sees only the first value of a repeated key, labels its
    /// records with an empty key and keeps the parent's display path.
    fn each(
        &mut self,
        node: Option<&Node>,
        nodepath: &str,
        rest: &[Command],
        depth: usize,
        expand: bool,
    ) -> Result<()> {
        let Some(node) = node else {
            return Ok(());
        };
        let delimiter = self.delimiter();
        for (key, child) in children(node, expand) {
            match (rest.is_empty(), expand) {
                (true, true) => self
                    .sink
                    .render(Some(child), nodepath, &format!("{delimiter}{key}"))?,
                (true, false) => self.sink.render(Some(child), nodepath, "")?,
                (false, true) => {
                    let child_path = join(nodepath, &key, delimiter);
                    self.run_chain(Some(child), &child_path, rest, depth + 1)?;
                }
                (false, false) => self.run_chain(Some(child), nodepath, rest, depth + 1)?,
            }
        }
        Ok(())
    }

    /// Depth-first walk of the whole subtree.
    ///
    /// Each visited node is rendered (or has the rest of the chain evaluated
    /// on it). The starting node is skipped when its display path is empty.
    /// With expand mode on, objects also produce a `_keys` record, and arrays
    /// with a non-empty display path a `_length` record.
    fn recurse(&mut self, node: &Node, nodepath: &str, rest: &[Command], depth: usize) -> Result<()> {
        let max_depth = self.sink.options().max_depth;
        if depth > max_depth {
            return Err(Error::TooDeep { limit: max_depth });
        }
        let delimiter = self.delimiter();

        let expand = self.sink.options().expand;
        if !nodepath.is_empty() {
            self.visit(node, nodepath, rest, depth)?;
            if let (true, Node::Array(arr)) = (expand, node) {
                let len = Node::Integer(arr.len() as i64);
                self.sink.render(Some(&len), nodepath, "_length")?;
            }
        }
        if let (true, Node::Object(obj)) = (expand, node) {
            let keys = Node::String(obj.keys().collect::<Vec<_>>().join(" "));
            self.sink.render(Some(&keys), nodepath, "_keys")?;
        }

        for (key, child) in children(node, true) {
            let child_path = join(nodepath, &key, delimiter);
            if child.is_compound() {
                self.recurse(child, &child_path, rest, depth + 1)?;
            } else {
                self.visit(child, &child_path, rest, depth + 1)?;
            }
        }
        Ok(())
    }

    fn visit(&mut self, node: &Node, nodepath: &str, rest: &[Command], depth: usize) -> Result<()> {
        if rest.is_empty() {
            self.sink.render(Some(node), nodepath, "")
        } else {
            self.run_chain(Some(node), nodepath, rest, depth)
        }
    }

    fn select(
        &mut self,
        node: Option<&Node>,
        nodepath: &str,
        paths: &[String],
        rest: &[Command],
        depth: usize,
    ) -> Result<()> {
        let delimiter = self.delimiter();
        for sub in paths {
            let child = node.and_then(|n| path::lookup(n, sub, delimiter));
            if rest.is_empty() {
                self.sink.render(child, nodepath, sub)?;
            } else {
                let child_path = join(nodepath, path::normalize(sub, delimiter), delimiter);
                self.run_chain(child, &child_path, rest, depth + 1)?;
            }
        }
        Ok(())
    }
}

/// Children of a compound node with their display keys: member names for
/// objects, indices for arrays. Scalars have none.
///
/// With `expand`, a repeated key yields each of its values; without it
/// only the first.
fn children(node: &Node, expand: bool) -> Vec<(String, &Node)> {
    match node {
        Node::Array(arr) => arr
            .iter()
            .enumerate()
            .map(|(i, child)| (i.to_string(), child))
            .collect(),
        Node::Object(obj) if expand => obj
            .iter()
            .flat_map(|(key, member)| member.values().iter().map(move |v| (key.to_string(), v)))
            .collect(),
        Node::Object(obj) => obj
            .iter()
            .map(|(key, member)| (key.to_string(), member.first()))
            .collect(),
        _ => Vec::new(),
    }
}

fn join(nodepath: &str, key: &str, delimiter: char) -> String {
    if nodepath.is_empty() {
        key.to_string()
    } else {
        format!("{nodepath}{delimiter}{key}")
    }
}
