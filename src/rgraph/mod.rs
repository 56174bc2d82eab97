//! Reachability graphs of place/transition nets.
//!
//! The reachability graph records every distinct marking met while exploring a net (its nodes)
//! and every transition firing between two of them (its edges). Both are deduplicated:
//!
//! - a node per [`CanonicalKey`], so equal markings always map to the same node;
//! - an edge per `(transition id, source node, target node)`, so firing the same transition
//!   between the same two markings twice yields one edge, while two different transitions
//!   between the same pair of markings yield two.
//!
//! Like the nets themselves, the graph is a `petgraph` [`StableGraph`]. Node and edge weights
//! keep their identity ([`MarkingNode::marking`], [`TransitionArc::transition`]) apart from the
//! presentation flags ([`NodeFlags`], [`ArcFlags`]) that the analysis sets for whoever renders
//! the graph.
//!
//! # Example
//!
//! ```
//! use pnbound::net::Net;
//! use pnbound::rgraph::ReachabilityGraph;
//!
//! let mut net = Net::new();
//! net.add_place("p1").unwrap();
//! net.add_place("p2").unwrap();
//! net.add_transition("t1").unwrap();
//! net.add_arc("a1", "p1", "t1").unwrap();
//! net.add_arc("a2", "t1", "p2").unwrap();
//! net.set_tokens("p1", 1).unwrap();
//!
//! let mut graph = ReachabilityGraph::new(&net.current_marking());
//! let root = graph.root().unwrap();
//!
//! net.fire("t1").unwrap();
//! let target = graph.add_marking(&net.current_marking());
//! graph.add_edge(net.transition("t1").unwrap(), root, target);
//!
//! let path = graph.path_exists(root, target).unwrap();
//! assert_eq!(path.len(), 1);
//! ```

pub mod dot;

use crate::{
    Symbol,
    net::{
        Transition,
        marking::{CanonicalKey, Marking},
    },
};
use petgraph::{
    Direction,
    graph::{EdgeIndex, NodeIndex},
    stable_graph::StableGraph,
    visit::EdgeRef,
};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Presentation flags of a reachability graph node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NodeFlags {
    /// The marking the net is currently in; at most one node at a time.
    pub active: bool,
    /// The start marking of the analysis run.
    pub root: bool,
    /// First marking `m` of an unboundedness witness.
    pub path_start: bool,
    /// Dominating marking `m'` of an unboundedness witness.
    pub path_end: bool,
}

/// Presentation flags of a reachability graph edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ArcFlags {
    /// The most recently fired edge; at most one edge at a time.
    pub latest: bool,
    /// Lies on the path from `m` to `m'` of an unboundedness witness.
    pub on_detection_path: bool,
}

/// A reachable marking.
#[derive(Debug, Clone)]
pub struct MarkingNode {
    pub marking: Marking,
    pub flags: NodeFlags,
}

impl MarkingNode {
    pub fn key(&self) -> &CanonicalKey {
        self.marking.key()
    }
}

impl fmt::Display for MarkingNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.marking)
    }
}

/// A transition firing between two reachable markings.
#[derive(Debug, Clone)]
pub struct TransitionArc {
    /// Id of the fired transition.
    pub transition: Symbol,
    /// `[id] name` of the fired transition.
    pub label: String,
    pub flags: ArcFlags,
}

impl fmt::Display for TransitionArc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label)
    }
}

/// Deduplicated graph of reachable markings and the firings between them.
#[derive(Debug, Clone, Default)]
pub struct ReachabilityGraph {
    graph: StableGraph<MarkingNode, TransitionArc>,
    by_key: HashMap<CanonicalKey, NodeIndex>,
    by_firing: HashMap<(Symbol, NodeIndex, NodeIndex), EdgeIndex>,
    root: Option<NodeIndex>,
    active: Option<NodeIndex>,
    latest: Option<EdgeIndex>,
}

impl ReachabilityGraph {
    /// A graph holding only `root`, flagged as root and active.
    pub fn new(root: &Marking) -> Self {
        let mut graph = Self::default();
        graph.reset(root);
        graph
    }

    /// Drop every node and edge and start over from `root`.
    pub fn reset(&mut self, root: &Marking) {
        self.graph.clear();
        self.by_key.clear();
        self.by_firing.clear();
        self.active = None;
        self.latest = None;

        let ix = self.add_marking(root);
        self.graph[ix].flags.root = true;
        self.root = Some(ix);
    }

    /// Node for `marking`, created if needed; either way it becomes the active node.
    pub fn add_marking(&mut self, marking: &Marking) -> NodeIndex {
        let ix = match self.by_key.get(marking.key()) {
            Some(&ix) => ix,
            None => {
                let ix = self.graph.add_node(MarkingNode {
                    marking: marking.clone(),
                    flags: NodeFlags::default(),
                });
                self.by_key.insert(marking.key().clone(), ix);
                ix
            }
        };
        self.set_active(ix);
        ix
    }

    /// Edge for firing `transition` from `source` into `target`, created if needed.
    ///
    /// The edge becomes the latest one.
    pub fn add_edge(
        &mut self,
        transition: &Transition,
        source: NodeIndex,
        target: NodeIndex,
    ) -> EdgeIndex {
        let key = (transition.id.clone(), source, target);

        let ie = match self.by_firing.get(&key) {
            Some(&ie) => ie,
            None => {
                let ie = self.graph.add_edge(
                    source,
                    target,
                    TransitionArc {
                        transition: transition.id.clone(),
                        label: transition.label(),
                        flags: ArcFlags::default(),
                    },
                );
                self.by_firing.insert(key, ie);
                ie
            }
        };
        self.set_latest(Some(ie));
        ie
    }

    /// Make `marking` the active node, creating it if needed, and forget the latest edge.
    pub fn set_to_marking(&mut self, marking: &Marking) -> NodeIndex {
        let ix = self.add_marking(marking);
        self.set_latest(None);
        ix
    }

    /// Depth-first search for a directed path from `from` to `to`.
    ///
    /// Outgoing edges are tried in the order they were added and the search stops at the first
    /// edge entering `to`, so the returned path is the first one found, not necessarily the
    /// shortest. Returns `None` when `to` is not reachable from `from`.
    pub fn path_exists(&self, from: NodeIndex, to: NodeIndex) -> Option<Vec<EdgeIndex>> {
        if !self.graph.contains_node(from) || !self.graph.contains_node(to) {
            return None;
        }

        let mut visited = HashSet::new();
        visited.insert(from);
        let mut path: Vec<EdgeIndex> = Vec::new();
        // one frame per node on the current path: its outgoing edges and the next one to try
        let mut stack = vec![(self.outgoing(from), 0usize)];

        while let Some((edges, next)) = stack.last_mut() {
            let step = edges.get(*next).copied();
            *next += 1;

            match step {
                None => {
                    stack.pop();
                    path.pop();
                }
                Some((ie, target)) if target == to => {
                    path.push(ie);
                    return Some(path);
                }
                Some((ie, target)) => {
                    if visited.insert(target) {
                        path.push(ie);
                        stack.push((self.outgoing(target), 0));
                    }
                }
            }
        }
        None
    }

    /// Clear the active flag of every node.
    pub fn clear_active(&mut self) {
        self.set_active_opt(None);
    }

    /// Flag every edge of `path` as lying on the detection path.
    pub fn mark_detection_path(&mut self, path: &[EdgeIndex]) {
        for &ie in path {
            if let Some(arc) = self.graph.edge_weight_mut(ie) {
                arc.flags.on_detection_path = true;
            }
        }
    }

    /// Flag the endpoints of an unboundedness witness.
    pub fn mark_path_ends(&mut self, start: NodeIndex, end: NodeIndex) {
        if let Some(node) = self.graph.node_weight_mut(start) {
            node.flags.path_start = true;
        }
        if let Some(node) = self.graph.node_weight_mut(end) {
            node.flags.path_end = true;
        }
    }

    pub fn find(&self, key: &CanonicalKey) -> Option<NodeIndex> {
        self.by_key.get(key).copied()
    }

    pub fn root(&self) -> Option<NodeIndex> {
        self.root
    }

    pub fn active(&self) -> Option<NodeIndex> {
        self.active
    }

    pub fn latest(&self) -> Option<EdgeIndex> {
        self.latest
    }

    pub fn node(&self, ix: NodeIndex) -> Option<&MarkingNode> {
        self.graph.node_weight(ix)
    }

    pub fn edge(&self, ie: EdgeIndex) -> Option<&TransitionArc> {
        self.graph.edge_weight(ie)
    }

    pub fn endpoints(&self, ie: EdgeIndex) -> Option<(NodeIndex, NodeIndex)> {
        self.graph.edge_endpoints(ie)
    }

    /// Nodes in the order they were discovered.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeIndex, &MarkingNode)> {
        self.graph.node_indices().map(move |ix| (ix, &self.graph[ix]))
    }

    /// Edges in the order they were added, with their endpoints.
    pub fn edges(&self) -> impl Iterator<Item = (EdgeIndex, NodeIndex, NodeIndex, &TransitionArc)> {
        self.graph.edge_indices().filter_map(move |ie| {
            let (s, t) = self.graph.edge_endpoints(ie)?;
            Some((ie, s, t, &self.graph[ie]))
        })
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Ids of the transitions fired along `path`.
    pub fn path_transitions<'a>(
        &'a self,
        path: &'a [EdgeIndex],
    ) -> impl Iterator<Item = &'a Symbol> + 'a {
        path.iter()
            .filter_map(move |&ie| self.graph.edge_weight(ie))
            .map(|arc| &arc.transition)
    }

    fn outgoing(&self, ix: NodeIndex) -> Vec<(EdgeIndex, NodeIndex)> {
        let mut edges: Vec<_> = self
            .graph
            .edges_directed(ix, Direction::Outgoing)
            .map(|e| (e.id(), e.target()))
            .collect();
        // edge indices grow with insertion, nothing is ever removed
        edges.sort_unstable_by_key(|(ie, _)| *ie);
        edges
    }

    fn set_active(&mut self, ix: NodeIndex) {
        self.set_active_opt(Some(ix));
    }

    fn set_active_opt(&mut self, ix: Option<NodeIndex>) {
        if let Some(old) = self.active.take() {
            if let Some(node) = self.graph.node_weight_mut(old) {
                node.flags.active = false;
            }
        }
        if let Some(ix) = ix {
            self.graph[ix].flags.active = true;
            self.active = Some(ix);
        }
    }

    fn set_latest(&mut self, ie: Option<EdgeIndex>) {
        if let Some(old) = self.latest.take() {
            if let Some(arc) = self.graph.edge_weight_mut(old) {
                arc.flags.latest = false;
            }
        }
        if let Some(ie) = ie {
            self.graph[ie].flags.latest = true;
            self.latest = Some(ie);
        }
    }
}
