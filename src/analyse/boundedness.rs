//! Boundedness of place/transition nets.
//!
//! The search explores the reachability graph breadth first from the start marking. Every
//! dequeued marking `m'` is first compared against the markings explored so far, in the order
//! they were explored: if some `m` is covered by `m'`, strictly smaller on at least one place,
//! and `m'` is reachable from `m` in the graph built so far, the firing sequence from `m` to
//! `m'` can be repeated forever and the places where `m'` exceeds `m` grow without limit. The
//! net is then unbounded and `(m, m', path)` is returned as witness.
//!
//! By Dickson's lemma any infinite sequence of markings contains such a pair, so the search
//! always terminates.

use crate::{
    Symbol,
    net::{Net, marking::Marking},
    rgraph::ReachabilityGraph,
};
use log::{debug, info, trace};
use petgraph::graph::EdgeIndex;
use rayon::prelude::*;
use std::collections::{HashSet, VecDeque};
use std::fmt;

/// Evidence of unboundedness: `m2` is reachable from `m1` through `path` and strictly
/// dominates it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Witness {
    pub m1: Marking,
    pub m2: Marking,
    /// Edges of the reachability graph leading from `m1` to `m2`.
    pub path: Vec<EdgeIndex>,
}

/// Outcome of a boundedness search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Boundedness {
    Bounded,
    Unbounded(Witness),
}

impl fmt::Display for Boundedness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Boundedness::Bounded => write!(f, "bounded"),
            Boundedness::Unbounded(_) => write!(f, "unbounded"),
        }
    }
}

/// A finished boundedness search together with the net and graph it worked on.
///
/// The analysis owns a copy of the analysed net. For unbounded nets the copy is left at the
/// dominating marking `m2` and the graph carries the witness flags: no active node, the
/// detection path edges flagged, `m1` flagged as path start and `m2` as path end.
#[derive(Debug, Clone)]
pub struct BoundednessAnalysis {
    net: Net,
    graph: ReachabilityGraph,
    result: Boundedness,
}

impl BoundednessAnalysis {
    /// Analyse `net` from its start marking. The net itself is left untouched.
    pub fn run(net: &Net) -> Self {
        let mut net = net.clone();
        net.reset();

        let start = net.current_marking();
        let mut graph = ReachabilityGraph::new(&start);

        info!(
            "Analysing net with {} places, {} transitions and {} arcs from {}",
            net.place_count(),
            net.transition_count(),
            net.arc_count(),
            start
        );

        let mut frontier = VecDeque::from(vec![start]);
        // explored markings in discovery order, and their keys for exact lookups
        let mut visited: Vec<Marking> = Vec::new();
        let mut explored = HashSet::new();

        let mut result = Boundedness::Bounded;

        while let Some(current) = frontier.pop_front() {
            debug!("Dequeued {}", current);

            if let Some(witness) = find_dominated(&graph, &visited, &current) {
                debug!(
                    "{} dominates {} through {} firings",
                    witness.m2,
                    witness.m1,
                    witness.path.len()
                );
                result = Boundedness::Unbounded(witness);
                break;
            }

            if !explored.insert(current.key().clone()) {
                continue;
            }
            visited.push(current.clone());

            expand(&mut net, &mut graph, &current, &mut frontier);
        }

        if let Boundedness::Unbounded(witness) = &result {
            graph.clear_active();
            graph.mark_detection_path(&witness.path);
            if let (Some(start), Some(end)) =
                (graph.find(witness.m1.key()), graph.find(witness.m2.key()))
            {
                graph.mark_path_ends(start, end);
            }
            net.apply_marking(&witness.m2);
        }

        info!(
            "Net is {} ({} markings, {} firings explored)",
            result,
            graph.node_count(),
            graph.edge_count()
        );

        Self { net, graph, result }
    }

    pub fn is_bounded(&self) -> bool {
        matches!(self.result, Boundedness::Bounded)
    }

    pub fn result(&self) -> &Boundedness {
        &self.result
    }

    pub fn witness(&self) -> Option<&Witness> {
        match &self.result {
            Boundedness::Bounded => None,
            Boundedness::Unbounded(witness) => Some(witness),
        }
    }

    pub fn graph(&self) -> &ReachabilityGraph {
        &self.graph
    }

    /// The analysed copy of the net, left at `m2` for unbounded nets.
    pub fn net(&self) -> &Net {
        &self.net
    }

    /// Ids of the transitions fired along the detection path, empty for bounded nets.
    pub fn path_transitions(&self) -> Vec<Symbol> {
        match self.witness() {
            Some(witness) => self
                .graph
                .path_transitions(&witness.path)
                .cloned()
                .collect(),
            None => Vec::new(),
        }
    }
}

/// Analyse every net independently, results in input order.
pub fn analyse_all(nets: &[Net]) -> Vec<BoundednessAnalysis> {
    nets.par_iter().map(BoundednessAnalysis::run).collect()
}

/// First explored marking strictly dominated by `current` and from which `current` is
/// reachable in `graph`.
fn find_dominated(
    graph: &ReachabilityGraph,
    visited: &[Marking],
    current: &Marking,
) -> Option<Witness> {
    let to = graph.find(current.key())?;
    visited
        .iter()
        .filter(|m| current.strictly_dominates(m))
        .find_map(|m| {
            let from = graph.find(m.key())?;
            let path = graph.path_exists(from, to)?;
            Some(Witness {
                m1: m.clone(),
                m2: current.clone(),
                path,
            })
        })
}

/// Fire every transition enabled at `marking`, recording the successors in `graph` and queueing
/// them on `frontier`. The net is returned to `marking` after each firing.
fn expand(
    net: &mut Net,
    graph: &mut ReachabilityGraph,
    marking: &Marking,
    frontier: &mut VecDeque<Marking>,
) {
    net.apply_marking(marking);
    let source = graph.set_to_marking(marking);

    for ix in net.enabled_indices() {
        net.fire_unchecked(ix);
        let next = net.current_marking();

        if let Some(transition) = net.transition_at(ix) {
            trace!("{} --{}--> {}", marking, transition.id, next);
            let target = graph.add_marking(&next);
            graph.add_edge(transition, source, target);
        }

        frontier.push_back(next);
        net.apply_marking(marking);
    }
}
