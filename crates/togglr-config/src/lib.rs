//! Configuration document codec.
//!
//! Parses a JSON document into a [`togglr_types::configuration::Configuration`]
//! and exports it back. The contract is structural: `parse(export(c))`
//! equals `c` by value; exact textual formatting is not part of it.

pub mod doc;
mod parser;
mod writer;

pub use parser::parse;
pub use writer::export;

// vim: ts=4
