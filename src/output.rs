//! Output sink for query results.
//!
//! Results are written as records. In [`OutputFormat::Text`] each record is
//! one scalar rendered for the shell:
//!
//! - strings are double quoted unless raw mode is on
//! - integers are decimal, floats and times use six decimals
//! - objects, arrays and userdata print as `{object}`, `[array]` and `{userdata}`
//! - a missing node prints `null`
//!
//! Every other format hands the whole subtree to [`crate::emit`] and writes
//! the bytes it returns.
//!
//! Records end with a newline, or are separated by single spaces in
//! nonewline mode. With key display on, a record starts with `label=`, where
//! the label is the display path plus key re-written with the output
//! delimiter.
//!
//! # Examples
//!
//! ```
//! use cfgcmd::{Node, Options};
//! use cfgcmd::output::Sink;
//!
//! let mut options = Options::default().with_shellvars();
//! options.show_keys = true;
//!
//! let mut sink = Sink::new(Vec::new(), options);
//! sink.render(Some(&Node::from("web")), "", ".server.name").unwrap();
//! sink.render(None, "", ".server.missing").unwrap();
//! sink.finish().unwrap();
//!
//! let out = String::from_utf8(sink.into_inner()).unwrap();
//! assert_eq!(out, "server_name=\"web\"\nserver_missing=null\n");
//! ```

use std::io::Write;

use crate::{
    config::{Options, OutputFormat},
    emit,
    error::{Error, Result},
    node::Node,
};

pub struct Sink<W: Write> {
    out: W,
    options: Options,
    /// No record has been written yet
    first_line: bool,
    warned: bool,
}

impl<W: Write> Sink<W> {
    pub fn new(out: W, options: Options) -> Self {
        Sink {
            out,
            options,
            first_line: true,
            warned: false,
        }
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Render one node.
    ///
    /// `nodepath` and `key` are joined to form the label shown with key
    /// display. Both use the input delimiter.
    pub fn render(&mut self, node: Option<&Node>, nodepath: &str, key: &str) -> Result<()> {
        if self.options.format.is_structured() {
            return self.render_structured(node.unwrap_or(&Node::Null), nodepath, key);
        }
        let text = self.text(node);
        self.record(nodepath, key, &text)
    }

    /// Write a plain text record, whatever the output format.
    ///
    /// Used for `length`, `type` and `keys`, which produce text rather
    /// than nodes.
    pub fn line(&mut self, nodepath: &str, key: &str, text: &str) -> Result<()> {
        self.record(nodepath, key, text)
    }

    /// Write text verbatim, outside the record structure.
    pub fn raw(&mut self, text: &str) -> Result<()> {
        self.out.write_all(text.as_bytes()).map_err(Error::stdout)
    }

    /// Terminate nonewline output and flush.
    pub fn finish(&mut self) -> Result<()> {
        if self.options.nonewline && !self.first_line {
            self.out.write_all(b"\n").map_err(Error::stdout)?;
        }
        self.out.flush().map_err(Error::stdout)
    }

    /// The label for a record: `nodepath` followed by `key`, minus one
    /// leading input delimiter, with every input delimiter replaced by the
    /// output delimiter.
    pub fn label(&self, nodepath: &str, key: &str) -> String {
        let joined = format!("{nodepath}{key}");
        let trimmed = joined
            .strip_prefix(self.options.input_delimiter)
            .unwrap_or(&joined);
        trimmed
            .chars()
            .map(|c| {
                if c == self.options.input_delimiter {
                    self.options.output_delimiter
                } else {
                    c
                }
            })
            .collect()
    }

    fn text(&self, node: Option<&Node>) -> String {
        match node {
            None | Some(Node::Null) => "null".to_string(),
            Some(Node::Boolean(b)) => b.to_string(),
            Some(Node::Integer(n)) => n.to_string(),
            Some(Node::Float(f)) | Some(Node::Timestamp(f)) => format!("{f:.6}"),
            Some(Node::String(s)) if self.options.raw => s.clone(),
            Some(Node::String(s)) => format!("\"{s}\""),
            Some(Node::Userdata(_)) => "{userdata}".to_string(),
            Some(Node::Object(_)) => "{object}".to_string(),
            Some(Node::Array(_)) => "[array]".to_string(),
        }
    }

    fn begin_record(&mut self) -> Result<()> {
        if self.options.nonewline && !self.first_line {
            self.out.write_all(b" ").map_err(Error::stdout)?;
        }
        self.first_line = false;
        Ok(())
    }

    fn prefix(&mut self, nodepath: &str, key: &str) -> Result<()> {
        if !self.options.show_keys {
            return Ok(());
        }
        let label = self.label(nodepath, key);
        if label.is_empty() {
            return Ok(());
        }
        write!(self.out, "{label}=").map_err(Error::stdout)
    }

    fn record(&mut self, nodepath: &str, key: &str, text: &str) -> Result<()> {
        self.begin_record()?;
        self.prefix(nodepath, key)?;
        self.out.write_all(text.as_bytes()).map_err(Error::stdout)?;
        if !self.options.nonewline {
            self.out.write_all(b"\n").map_err(Error::stdout)?;
        }
        Ok(())
    }

    fn render_structured(&mut self, node: &Node, nodepath: &str, key: &str) -> Result<()> {
        let format = self.options.format;
        if self.options.nonewline && format != OutputFormat::JsonCompact && !self.warned {
            tracing::warn!(
                format = format.name(),
                "nonewline output with a multi-line format; records will run together"
            );
            self.warned = true;
        }

        let blob = emit::emit(node, format)?;
        self.begin_record()?;
        self.prefix(nodepath, key)?;
        self.out.write_all(&blob).map_err(Error::stdout)?;

        let terminated = blob.last() == Some(&b'\n');
        if !self.options.nonewline && !terminated && format != OutputFormat::Msgpack {
            self.out.write_all(b"\n").map_err(Error::stdout)?;
        }
        Ok(())
    }
}
