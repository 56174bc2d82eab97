//! Textual net descriptions.
//!
//! A description lists places, transitions and arcs in any order:
//!
//! ```text
//! Place "p1" { name: "idle", tokens: 1, position: (10, -20) }
//! Place "p2"
//! Transition "t1" { name: "start" }
//! Arc "a1" : "p1" -> "t1"
//! Arc "a2" : "t1" -> "p2"
//! ```
//!
//! Attributes are optional, places default to zero tokens and every node defaults to its id as
//! name. Arcs may reference nodes declared further down the file.

mod ast;

// Include the generated parser with clippy warnings suppressed
#[allow(clippy::all)]
mod parser {
    #![allow(clippy::all)]
    #![allow(dead_code)]
    #![allow(unused_variables)]
    #![allow(unused_imports)]
    #![allow(non_snake_case)]
    #![allow(non_camel_case_types)]
    #![allow(non_upper_case_globals)]
    include!(concat!(env!("OUT_DIR"), "/net/parser/parser.rs"));
}

use super::{Net, NetError};
use ast::{Attribute, Entry};
use std::{error::Error, fmt};

type LalrpopError<'a> = lalrpop_util::ParseError<usize, parser::Token<'a>, &'static str>;

/// Error Response of [`parse`]
#[derive(Debug, PartialEq, Eq)]
pub enum ParseError {
    SyntaxError(String),
    Net(NetError),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::SyntaxError(err) => write!(f, "{}", err),
            ParseError::Net(err) => write!(f, "{}", err),
        }
    }
}

impl Error for ParseError {}

impl From<LalrpopError<'_>> for ParseError {
    fn from(err: LalrpopError) -> Self {
        ParseError::SyntaxError(format!("{}", err))
    }
}

impl From<NetError> for ParseError {
    fn from(err: NetError) -> Self {
        ParseError::Net(err)
    }
}

/// Parse a net description.
///
/// Nodes are created first so arcs can point anywhere in the file; attributes are applied in
/// the order they appear, the last one of a kind wins.
pub fn parse(input: &str) -> Result<Net, ParseError> {
    let entries = parser::NetParser::new().parse(input)?;
    let mut net = Net::new();

    for entry in entries.iter() {
        match entry {
            Entry::Place { id, .. } => net.add_place(id)?,
            Entry::Transition { id, .. } => net.add_transition(id)?,
            Entry::Arc { .. } => {}
        }
    }

    for entry in entries.iter() {
        match entry {
            Entry::Place { id, attributes } | Entry::Transition { id, attributes } => {
                for attribute in attributes {
                    match attribute {
                        Attribute::Name(name) => net.set_name(id, name)?,
                        Attribute::Tokens(tokens) => net.set_tokens(id, *tokens)?,
                        Attribute::Position(x, y) => net.set_position(id, *x, *y)?,
                    }
                }
            }
            Entry::Arc { .. } => {}
        }
    }

    for entry in entries.iter() {
        if let Entry::Arc { id, source, target } = entry {
            net.add_arc(id, source, target)?;
        }
    }

    Ok(net)
}
