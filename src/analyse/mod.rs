//! Command-line front end of the boundedness analysis.
//!
//! # Main Operations
//!
//! - **[`analyse_main`]**: Decides whether a single net is bounded, reports the size of its
//!   reachability graph or the unboundedness witness, and can write the graph as DOT.
//!
//! - **[`batch_main`]**: Analyses many nets in parallel and reports one table row per file.
//!
//! - **[`show_main`]**: Applies manual token edits and firings to a net and prints the resulting
//!   state, handy to replay a witness path by hand.
//!
//! # Example
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use pnbound::analyse::{AnalyseArgs, analyse_main};
//!
//! let args = AnalyseArgs {
//!     input: "counter.pn".into(),
//!     report: Some("counter.rpt".into()),
//!     dot: Some("counter.dot".into()),
//! };
//!
//! analyse_main(args)?;
//! # Ok(())
//! # }
//! ```

use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::Parser;
use itertools::Itertools;
use log::info;
use prettytable::*;

use crate::{net::Net, read_file};

pub mod boundedness;

pub use boundedness::{Boundedness, BoundednessAnalysis, Witness, analyse_all};

/// Command-line arguments for the analysis command.
#[derive(Parser, Debug)]
pub struct AnalyseArgs {
    /// Net description input file
    pub input: PathBuf,

    /// Report file for analysis results (default: stdout)
    #[clap(long, short)]
    pub report: Option<PathBuf>,

    /// DOT file displaying the reachability graph
    #[clap(long)]
    pub dot: Option<PathBuf>,
}

/// Command-line arguments for the batch command.
#[derive(Parser, Debug)]
pub struct BatchArgs {
    /// Net description input files
    #[clap(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Report file for the result table (default: stdout)
    #[clap(long, short)]
    pub report: Option<PathBuf>,

    /// Number of worker threads (default: one per core)
    #[clap(long, short)]
    pub jobs: Option<usize>,
}

const SHOW_ORDER_HELP: &str = concat!(
    "Edits are applied in a fixed order, whatever their position on the command line:\n",
    "all --add-token, then all --remove-token, then all --fire."
);

/// Command-line arguments for the show command.
///
/// Edits run in a fixed order whatever their position on the command line: every
/// `--add-token`, then every `--remove-token`, then every `--fire`.
#[derive(Parser, Debug)]
#[clap(after_help = SHOW_ORDER_HELP)]
pub struct ShowArgs {
    /// Net description input file
    pub input: PathBuf,

    /// Add a token to a place (all additions run first)
    #[clap(long = "add-token", value_name = "PLACE")]
    pub add_token: Vec<String>,

    /// Remove a token from a place (after all additions)
    #[clap(long = "remove-token", value_name = "PLACE")]
    pub remove_token: Vec<String>,

    /// Fire a transition (after all token edits, in the order given)
    #[clap(long, value_name = "TRANSITION")]
    pub fire: Vec<String>,
}

fn open_report(report: Option<PathBuf>) -> Result<Box<dyn Write>> {
    Ok(match report {
        Some(path) => Box::new(
            fs::File::create(&path)
                .with_context(|| format!("Failed to create {}", path.display()))?,
        ),
        None => Box::new(std::io::stdout()),
    })
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Decide boundedness of a single net.
///
/// # Outputs
///
/// - **Report** (stdout or file): verdict, reachability graph size and, for unbounded nets,
///   `m1`, `m2` and the detection path step by step
/// - **DOT** (optional): the reachability graph with the witness highlighted
pub fn analyse_main(args: AnalyseArgs) -> Result<()> {
    let AnalyseArgs { input, report, dot } = args;

    let mut writer = open_report(report)?;
    let net = read_file(&input)?;
    let analysis = BoundednessAnalysis::run(&net);

    write_analysis_report(&mut writer, &file_name(&input), &net, &analysis)?;

    if let Some(filename) = dot {
        fs::write(&filename, analysis.graph().to_dot())
            .with_context(|| format!("Failed to write {}", filename.display()))?;
    }

    Ok(())
}

/// Analyse several nets in parallel and print one row per net, in input order.
pub fn batch_main(args: BatchArgs) -> Result<()> {
    let BatchArgs {
        inputs,
        report,
        jobs,
    } = args;

    let mut writer = open_report(report)?;

    let nets = inputs
        .iter()
        .map(|path| read_file(path))
        .collect::<Result<Vec<_>>>()?;

    let analyses = match jobs {
        Some(jobs) => {
            info!("Analysing {} nets on {} threads", nets.len(), jobs);
            rayon::ThreadPoolBuilder::new()
                .num_threads(jobs)
                .build()?
                .install(|| analyse_all(&nets))
        }
        None => analyse_all(&nets),
    };

    let names: Vec<String> = inputs.iter().map(|path| file_name(path)).collect();
    write_batch_report(&mut writer, &names, &analyses)
}

/// Apply manual edits and firings to a net and print its state.
pub fn show_main(args: ShowArgs) -> Result<()> {
    let ShowArgs {
        input,
        add_token,
        remove_token,
        fire,
    } = args;

    let mut net = read_file(&input)?;

    for place in add_token.iter() {
        net.add_token(place)?;
    }
    for place in remove_token.iter() {
        net.remove_token(place)?;
    }
    for transition in fire.iter() {
        net.fire(transition)?;
    }

    write_net_state(&mut std::io::stdout(), &net)
}

/// Write the report of a single analysis.
pub fn write_analysis_report<W: Write>(
    writer: &mut W,
    name: &str,
    net: &Net,
    analysis: &BoundednessAnalysis,
) -> Result<()> {
    writeln!(
        writer,
        "{}: {} places, {} transitions, {} arcs",
        name,
        net.place_count(),
        net.transition_count(),
        net.arc_count()
    )?;
    writeln!(writer, "Start marking: {}", net.start_marking())?;
    writeln!(writer, "Result: {}", analysis.result())?;
    writeln!(
        writer,
        "Reachability graph: {} markings / {} firings",
        analysis.graph().node_count(),
        analysis.graph().edge_count()
    )?;

    if let Some(Witness { m1, m2, path }) = analysis.witness() {
        writeln!(writer, "m1: {}", m1)?;
        writeln!(writer, "m2: {}", m2)?;
        writeln!(writer, "Unbounded places: {}", m2.excess_over(m1).join(", "))?;
        writeln!(
            writer,
            "\nDetection path ({} {}):",
            path.len(),
            if path.len() == 1 { "firing" } else { "firings" }
        )?;

        let graph = analysis.graph();
        let mut table = Table::new();
        table.set_titles(row!["Step", "Transition", "From", "To"]);
        table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);

        for (i, &ie) in path.iter().enumerate() {
            let (Some(arc), Some((s, t))) = (graph.edge(ie), graph.endpoints(ie)) else {
                continue;
            };
            let marking = |ix| {
                graph
                    .node(ix)
                    .map(|n| n.key().to_string())
                    .unwrap_or_default()
            };
            table.add_row(row![i + 1, arc.label, marking(s), marking(t)]);
        }
        table.print(writer)?;
    }

    Ok(())
}

/// Write the batch table: one row per analysis, `names` giving the file of each.
pub fn write_batch_report<W: Write>(
    writer: &mut W,
    names: &[String],
    analyses: &[BoundednessAnalysis],
) -> Result<()> {
    let mut table = Table::new();
    table.set_titles(row![
        "File",
        "Bounded",
        "Markings / Firings",
        "Path length: path; m1, m2",
    ]);
    table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);

    for (name, analysis) in names.iter().zip(analyses.iter()) {
        match analysis.witness() {
            None => table.add_row(row![
                name,
                "yes",
                format!(
                    "{} / {}",
                    analysis.graph().node_count(),
                    analysis.graph().edge_count()
                ),
                "",
            ]),
            Some(witness) => table.add_row(row![
                name,
                "no",
                "",
                format!(
                    "{}: ({}); {}, {}",
                    witness.path.len(),
                    analysis.path_transitions().iter().join(","),
                    witness.m1,
                    witness.m2
                ),
            ]),
        };
    }

    table.print(writer)?;
    Ok(())
}

/// Write the places, transitions and current marking of a net.
pub fn write_net_state<W: Write>(writer: &mut W, net: &Net) -> Result<()> {
    let mut places = Table::new();
    places.set_titles(row!["Place", "Name", "Tokens", "Start"]);
    places.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
    for p in net.places() {
        places.add_row(row![p.id, p.name, p.current_tokens, p.start_tokens]);
    }
    places.print(writer)?;

    writeln!(writer)?;

    let mut transitions = Table::new();
    transitions.set_titles(row!["Transition", "Name", "Enabled"]);
    transitions.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
    for t in net.transitions() {
        transitions.add_row(row![t.id, t.name, if t.enabled { "*" } else { " " }]);
    }
    transitions.print(writer)?;

    writeln!(writer, "\nMarking: {}", net.current_marking())?;
    if net.is_modified() {
        writeln!(writer, "Start marking modified: {}", net.start_marking())?;
    }

    Ok(())
}
