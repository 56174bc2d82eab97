//! Boundedness analysis of place/transition Petri nets.
//!
//! A net is *bounded* when there is a limit on the number of tokens any place can ever hold,
//! whatever transitions fire. This library builds the reachability graph of a net breadth first
//! and stops as soon as it meets a marking that strictly covers an earlier marking it is
//! reachable from; such a pair proves the net unbounded and is reported together with the
//! firing sequence joining them.
//!
//! # Usage Example
//!
//! ```
//! use pnbound::{BoundednessAnalysis, net::parser::parse};
//!
//! let net = parse(r#"
//!     Place "p" { tokens: 1 }
//!     Transition "t"
//!     Arc "a1" : "p" -> "t"
//!     Arc "a2" : "t" -> "p"
//!     Arc "a3" : "t" -> "p"
//! "#).unwrap();
//!
//! let analysis = BoundednessAnalysis::run(&net);
//! assert!(!analysis.is_bounded());
//!
//! let witness = analysis.witness().unwrap();
//! assert_eq!(witness.m1.key().as_str(), "(1)");
//! assert_eq!(witness.m2.key().as_str(), "(2)");
//! ```
//!
//! # Modules
//!
//! - **[`net`]**: Places, transitions, arcs and the firing rule, plus markings
//!   ([`net::marking`]) and the textual loader ([`net::parser`])
//! - **[`rgraph`]**: Deduplicated reachability graph with presentation flags and DOT output
//! - **[`analyse`]**: The boundedness search and the command-line front end

use anyhow::Result;
use clap::Parser;
use std::{fs, path::Path};
use string_cache::DefaultAtom;

pub mod analyse;
pub mod net;
pub mod rgraph;

// Re-export the main functions for easy access
pub use analyse::{
    AnalyseArgs, BatchArgs, Boundedness, BoundednessAnalysis, ShowArgs, Witness, analyse_all,
    analyse_main, batch_main, show_main,
};
pub use net::{Net, NetError, marking::Marking};
pub use rgraph::ReachabilityGraph;

/// Interned identifier of places, transitions and arcs.
pub type Symbol = DefaultAtom;

/// Reads and parses a net description from a file.
///
/// # Example
///
/// ```no_run
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use pnbound::read_file;
/// use std::path::Path;
///
/// let net = read_file(Path::new("nets/counter.pn"))?;
/// # Ok(())
/// # }
/// ```
pub fn read_file(file_name: &Path) -> Result<Net> {
    let file = fs::read_to_string(file_name)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", file_name.display(), e))?;
    net::parser::parse(&file)
        .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", file_name.display(), e))
}

/// Command-line interface arguments for the boundedness tools.
#[derive(Debug, Parser)]
#[clap(
    name = "pnbound",
    about = "Boundedness analysis of place/transition Petri nets"
)]
pub enum CLIArguments {
    /// Decide whether a net is bounded and report the witness if it is not.
    Analyse(AnalyseArgs),
    /// Analyse several nets in parallel, one result row per file.
    Batch(BatchArgs),
    /// Edit tokens, fire transitions and print the resulting state of a net.
    Show(ShowArgs),
}
