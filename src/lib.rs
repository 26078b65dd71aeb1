//! Query and edit configuration documents from the shell.
//!
//! A document is parsed into a [`Node`] tree, a path selects a node, and a
//! `|`-separated command chain (`keys`, `values`, `each`, `recurse`, ...)
//! turns it into lines of output. The mutation engine edits the tree in
//! place for `set`, `merge` and `remove`.
//!
//! ```
//! use cfgcmd::{Document, Interpreter, Options, ParseOptions, Request, Sink};
//!
//! let doc = Document::parse("servers:\n  - name: web\n  - name: db\n", "-", &ParseOptions::default())?;
//!
//! let mut options = Options::default();
//! options.raw = true;
//! let mut interp = Interpreter::new(Sink::new(Vec::new(), options));
//! interp.run(&doc.root, &Request::parse(".servers|each|.name", '.')?)?;
//!
//! let out = String::from_utf8(interp.into_sink().into_inner()).unwrap();
//! assert_eq!(out, "web\ndb\n");
//! # Ok::<(), cfgcmd::Error>(())
//! ```

pub mod command;
pub mod config;
pub mod document;
pub mod emit;
pub mod error;
pub mod evaluator;
pub mod mutate;
pub mod node;
pub mod output;
pub mod path;

#[cfg(feature = "cli")]
pub mod cli;

pub use command::{Command, Request};
pub use config::{Options, OutputFormat};
pub use document::{Document, ParseOptions, Syntax};
pub use error::{Error, Result};
pub use evaluator::Interpreter;
pub use node::{Kind, Member, Node, Object};
pub use output::Sink;
