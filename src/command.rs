//! Command chains: `path|verb|verb...`.
//!
//! A request is split and validated up front, so an unknown verb is
//! reported before anything is printed. The interpreter then walks the
//! resulting slice without modifying it.

use std::fmt;

use crate::error::{Error, Result};

/// One token of a command chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Length,
    Type,
    Keys,
    Values,
    Each,
    Iterate,
    Recurse,
    Dump,
    /// One or more space-separated sub-paths, each starting with the delimiter
    Select(Vec<String>),
}

impl Command {
    /// Parse a single token. Sub-paths must start with `delimiter`.
    pub fn parse(token: &str, delimiter: char) -> Result<Command> {
        let token = token.trim();
        match token {
            "length" => Ok(Command::Length),
            "type" => Ok(Command::Type),
            "keys" => Ok(Command::Keys),
            "values" => Ok(Command::Values),
            "each" => Ok(Command::Each),
            "iterate" => Ok(Command::Iterate),
            "recurse" => Ok(Command::Recurse),
            "dump" => Ok(Command::Dump),
            t if t.starts_with(delimiter) => Ok(Command::Select(
                t.split(' ')
                    .filter(|p| !p.is_empty())
                    .map(str::to_string)
                    .collect(),
            )),
            other => Err(Error::InvalidCommand(other.to_string())),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Length => f.write_str("length"),
            Command::Type => f.write_str("type"),
            Command::Keys => f.write_str("keys"),
            Command::Values => f.write_str("values"),
            Command::Each => f.write_str("each"),
            Command::Iterate => f.write_str("iterate"),
            Command::Recurse => f.write_str("recurse"),
            Command::Dump => f.write_str("dump"),
            Command::Select(paths) => f.write_str(&paths.join(" ")),
        }
    }
}

/// A `get` argument: the node to start from and the commands to run on it.
///
/// # Examples
///
/// ```
/// use cfgcmd::command::{Command, Request};
///
/// let req = Request::parse(".servers|each|.name", '.').unwrap();
/// assert_eq!(req.path, ".servers");
/// assert_eq!(req.chain, vec![Command::Each, Command::Select(vec![".name".into()])]);
///
/// assert!(Request::parse(".servers|sort", '.').is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub path: String,
    pub chain: Vec<Command>,
}

impl Request {
    pub fn parse(text: &str, delimiter: char) -> Result<Request> {
        let mut tokens = text.split('|');
        let path = tokens.next().unwrap_or_default().trim().to_string();
        let chain = tokens
            .map(|token| Command::parse(token, delimiter))
            .collect::<Result<Vec<_>>>()?;
        Ok(Request { path, chain })
    }
}
