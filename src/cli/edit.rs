//! `set`, `merge` and `remove`, plus writing the edited document.

use std::{
    io::Write,
    path::{Path, PathBuf},
};

use super::io::{is_stdin, read_text, write_atomic};
use crate::{
    config::OutputFormat,
    document::{self, Document, ParseOptions, Syntax},
    emit,
    error::{Error, Result},
    mutate::{self, RemoveReport},
    node::{Kind, Node},
};

/// Where the new value for `set` or `merge` comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueSource {
    /// Given on the command line
    Inline(String),
    /// `--input FILE`; `-` is standard input
    File(PathBuf),
    Stdin,
}

impl ValueSource {
    /// Pick the source from the command line: `--input` wins over an
    /// inline value, and standard input is the fallback.
    pub fn select(input: Option<PathBuf>, inline: Option<String>) -> ValueSource {
        match (input, inline) {
            (Some(path), _) if is_stdin(Some(path.as_path())) => ValueSource::Stdin,
            (Some(path), _) => ValueSource::File(path),
            (None, Some(text)) => ValueSource::Inline(text),
            (None, None) => ValueSource::Stdin,
        }
    }

    /// Read the value text. `document_on_stdin` tells whether standard
    /// input is already taken by the document.
    ///
    /// One trailing line break is dropped from file and stdin values.
    pub fn read(&self, document_on_stdin: bool) -> Result<String> {
        let text = match self {
            ValueSource::Inline(text) => return Ok(text.clone()),
            ValueSource::File(path) => read_text(Some(path.as_path()))?,
            ValueSource::Stdin if document_on_stdin => {
                return Err(Error::MissingArgument(
                    "value (standard input already holds the document)".to_string(),
                ));
            }
            ValueSource::Stdin => read_text(None)?,
        };
        let trimmed = text
            .strip_suffix('\n')
            .map(|t| t.strip_suffix('\r').unwrap_or(t));
        Ok(trimmed.map(str::to_string).unwrap_or(text))
    }
}

/// Where and how an edited document is written.
#[derive(Debug, Clone, Default)]
pub struct WriteOptions {
    /// Document file; `None` or `-` for standard input
    pub document: Option<PathBuf>,
    /// Write here instead of back to the document file
    pub output: Option<PathBuf>,
    /// Format to write; defaults to the document's own syntax
    pub format: Option<OutputFormat>,
    /// Print the result instead of writing any file
    pub noop: bool,
}

impl WriteOptions {
    /// The file to replace, or `None` to print to standard output.
    pub fn target(&self) -> Option<&Path> {
        if self.noop {
            return None;
        }
        self.output
            .as_deref()
            .or_else(|| self.document.as_deref().filter(|p| !is_stdin(Some(*p))))
    }

    pub fn format_for(&self, doc: &Document) -> OutputFormat {
        self.format.unwrap_or(match doc.syntax {
            Syntax::Json => OutputFormat::Json,
            Syntax::Yaml => OutputFormat::Yaml,
        })
    }
}

/// Serialize the edited document and write it to its target.
pub fn write_back<W: Write>(doc: &Document, options: &WriteOptions, mut stdout: W) -> Result<()> {
    let format = options.format_for(doc);
    let mut bytes = emit::emit(&doc.root, format)?;
    if format != OutputFormat::Msgpack && bytes.last() != Some(&b'\n') {
        bytes.push(b'\n');
    }

    match options.target() {
        Some(path) => write_atomic(path, &bytes),
        None => stdout
            .write_all(&bytes)
            .and_then(|()| stdout.flush())
            .map_err(Error::stdout),
    }
}

/// `set PATH VALUE`. With `kind`, the value must parse to exactly that kind.
pub fn execute_set(
    doc: &mut Document,
    path: &str,
    text: &str,
    kind: Option<Kind>,
    parse: &ParseOptions,
    delimiter: char,
) -> Result<()> {
    let value = match kind {
        Some(kind) => document::parse_typed(text, kind, parse)?,
        None => document::parse_value(text, parse)?,
    };
    tracing::debug!(path, kind = %value.kind(), "set");
    mutate::set(&mut doc.root, path, value, delimiter)
}

/// `merge PATH VALUE`. Repeated keys inside the value keep their last value.
pub fn execute_merge(
    doc: &mut Document,
    path: &str,
    text: &str,
    parse: &ParseOptions,
    delimiter: char,
) -> Result<()> {
    let parse = ParseOptions {
        implicit_arrays: false,
        ..*parse
    };
    let value: Node = document::parse_value(text, &parse)?;
    tracing::debug!(path, kind = %value.kind(), "merge");
    mutate::merge(&mut doc.root, path, value, delimiter, parse.max_depth)
}

pub fn execute_remove(doc: &mut Document, paths: &[String], delimiter: char) -> Result<RemoveReport> {
    if paths.is_empty() {
        return Err(Error::MissingArgument("path".to_string()));
    }
    Ok(mutate::remove_all(&mut doc.root, paths, delimiter))
}
