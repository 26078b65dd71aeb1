use std::{io, path::PathBuf};

use crate::node::Kind;

/// Process exit codes. Scripts depend on these, so they never change meaning.
pub mod exit {
    pub const SUCCESS: u8 = 0;
    /// A set/merge/remove could not be applied
    pub const FAILURE: u8 = 1;
    /// The input document could not be read or parsed
    pub const PARSE: u8 = 2;
    /// The input parsed but is not a usable document
    pub const INVALID_DOCUMENT: u8 = 3;
    /// A required argument or input is missing
    pub const USAGE: u8 = 4;
    /// A `get` chain contains an unknown command
    pub const INVALID_COMMAND: u8 = 5;
    /// `set --type` could not produce the requested kind
    pub const COERCION: u8 = 6;
    /// Writing the result failed
    pub const OUTPUT: u8 = 7;
}

/// Errors produced while reading, querying, editing or writing a document.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed document text, with the parser's own message
    #[error("Parse error in {source_name}: {message}")]
    Parse {
        source_name: String,
        message: String,
    },

    /// The document could not be read at all
    #[error("Failed to read {}: {source}", .path.display())]
    Input {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Object/array nesting exceeds the configured cap
    #[error("Document is nested too deeply (limit {limit})")]
    TooDeep { limit: usize },

    #[error("Missing argument: {0}")]
    MissingArgument(String),

    #[error("No input provided. Use --file or pipe a document to stdin.")]
    NoInput,

    #[error("Invalid command {0}")]
    InvalidCommand(String),

    #[error("Unable to convert '{data}' to a {wanted}, only {found}")]
    Coercion {
        data: String,
        wanted: Kind,
        found: Kind,
    },

    #[error("Unknown type '{0}'")]
    UnknownType(String),

    /// A path prefix that must exist does not
    #[error("Failed to find parent of key {0}")]
    ParentNotFound(String),

    #[error("Failed to find key {0}")]
    KeyNotFound(String),

    #[error("Invalid parent object type for '{path}': {kind}")]
    InvalidParent { path: String, kind: Kind },

    #[error("Cannot {op} the document root with a {kind}")]
    InvalidRoot { op: &'static str, kind: Kind },

    #[error("{count} of the requested removals failed")]
    PartialRemoval { count: usize },

    #[error("Failed to serialize as {format}: {message}")]
    Emit {
        format: &'static str,
        message: String,
    },

    #[error("Failed to write {}: {source}", .path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl Error {
    pub fn exit_code(&self) -> u8 {
        match self {
            Error::Parse { .. } | Error::Input { .. } => exit::PARSE,
            Error::TooDeep { .. } => exit::INVALID_DOCUMENT,
            Error::MissingArgument(_) | Error::NoInput | Error::UnknownType(_) => exit::USAGE,
            Error::InvalidCommand(_) => exit::INVALID_COMMAND,
            Error::Coercion { .. } => exit::COERCION,
            Error::ParentNotFound(_)
            | Error::KeyNotFound(_)
            | Error::InvalidParent { .. }
            | Error::InvalidRoot { .. }
            | Error::PartialRemoval { .. }
            | Error::Emit { .. } => exit::FAILURE,
            Error::Output { .. } => exit::OUTPUT,
        }
    }

    /// Wrap a failed write to standard output.
    pub fn stdout(source: io::Error) -> Self {
        Error::Output {
            path: PathBuf::from("<stdout>"),
            source,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
