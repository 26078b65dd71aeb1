//! Subcommand drivers for the `cfgcmd` binary.
//!
//! Each driver takes already-parsed options and an output writer, so the
//! subcommands can be embedded in other tools and tested without a
//! process boundary.

mod edit;
mod get;
pub mod io;

pub use edit::{
    ValueSource, WriteOptions, execute_merge, execute_remove, execute_set, write_back,
};
pub use get::{execute_dump, execute_get};
