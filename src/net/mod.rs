//! Place/transition nets and their firing rule.
//!
//! A [`Net`] is a bipartite directed graph: every node is either a [`Place`] holding a number of
//! tokens or a [`Transition`], and every [`Arc`] joins a place to a transition or a transition to
//! a place. The net is stored as a `petgraph` [`StableGraph`] whose node weights are the
//! [`NetNode`] sum type, so arc endpoints and graph traversals are total over both kinds without
//! runtime type checks.
//!
//! # Firing rule
//!
//! A transition is *enabled* when each of its input places (places with an arc pointing into the
//! transition) holds at least one token per such arc. Firing an enabled transition removes one
//! token per input arc and adds one token per output arc. Firing a disabled transition is
//! rejected with [`NetError::NotEnabled`] and leaves the net untouched.
//!
//! # Construction
//!
//! Nets are built through the loader interface ([`Net::add_place`], [`Net::add_transition`],
//! [`Net::add_arc`], [`Net::set_name`], [`Net::set_tokens`], [`Net::set_position`]), usually by
//! the textual [`parser`].
//!
//! ```
//! use pnbound::net::Net;
//!
//! let mut net = Net::new();
//! net.add_place("p1").unwrap();
//! net.add_place("p2").unwrap();
//! net.add_transition("t1").unwrap();
//! net.add_arc("a1", "p1", "t1").unwrap();
//! net.add_arc("a2", "t1", "p2").unwrap();
//! net.set_tokens("p1", 1).unwrap();
//!
//! assert_eq!(net.current_marking().key().as_str(), "(1|0)");
//! net.fire("t1").unwrap();
//! assert_eq!(net.current_marking().key().as_str(), "(0|1)");
//! assert!(net.enabled_transitions().is_empty());
//! ```

pub mod marking;
pub mod parser;
#[cfg(test)]
pub mod test_helpers;

use crate::Symbol;
use marking::Marking;
use petgraph::{
    Direction,
    graph::{EdgeIndex, NodeIndex},
    stable_graph::StableGraph,
    visit::EdgeRef,
};
use std::{
    collections::{BTreeMap, HashMap},
    error::Error,
    fmt,
};

/// Errors raised by net construction and mutation.
///
/// Every operation that returns one of these leaves the net exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetError {
    /// No place, transition or arc with this id exists.
    UnknownId(Symbol),
    /// A node or arc with this id already exists.
    DuplicateId(Symbol),
    /// An arc joining two places or two transitions.
    InvalidArc {
        arc: Symbol,
        source: Symbol,
        target: Symbol,
    },
    /// The id names a transition where a place was expected.
    NotAPlace(Symbol),
    /// The id names a place where a transition was expected.
    NotATransition(Symbol),
    /// Removing a token from an empty place.
    Underflow(Symbol),
    /// A place would exceed `usize::MAX` tokens.
    Overflow(Symbol),
    /// Firing a transition with an unsatisfied input place.
    NotEnabled(Symbol),
    /// A marking that does not enumerate exactly the places of the net.
    MarkingMismatch,
}

impl fmt::Display for NetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetError::UnknownId(id) => write!(f, "Unknown Element: {}", id),
            NetError::DuplicateId(id) => write!(f, "Multiple Definitions of {}", id),
            NetError::InvalidArc {
                arc,
                source,
                target,
            } => write!(
                f,
                "Arc {} joins {} and {}, which are of the same kind",
                arc, source, target
            ),
            NetError::NotAPlace(id) => write!(f, "{} is not a place", id),
            NetError::NotATransition(id) => write!(f, "{} is not a transition", id),
            NetError::Underflow(id) => write!(f, "Place {} holds no token to remove", id),
            NetError::Overflow(id) => write!(f, "Place {} cannot hold more tokens", id),
            NetError::NotEnabled(id) => write!(f, "Transition {} is not enabled", id),
            NetError::MarkingMismatch => {
                write!(f, "Marking does not match the places of the net")
            }
        }
    }
}

impl Error for NetError {}

/// Layout coordinates as given by the loader, kept for presentation only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub x: i64,
    pub y: i64,
}

/// A place and its tokens.
///
/// `current_tokens` is what firing moves around; `start_tokens` is the marking the net returns
/// to on [`Net::reset`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Place {
    pub id: Symbol,
    pub name: Symbol,
    pub current_tokens: usize,
    pub start_tokens: usize,
    pub position: Position,
}

impl Place {
    fn new(id: Symbol) -> Self {
        Self {
            name: id.clone(),
            id,
            current_tokens: 0,
            start_tokens: 0,
            position: Position::default(),
        }
    }
}

/// A transition of the net.
///
/// `enabled` mirrors the firing rule for the current marking; the net refreshes it after every
/// mutation and it is never set on its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub id: Symbol,
    pub name: Symbol,
    pub enabled: bool,
    pub position: Position,
}

impl Transition {
    fn new(id: Symbol) -> Self {
        Self {
            name: id.clone(),
            id,
            enabled: false,
            position: Position::default(),
        }
    }

    /// `[id] name`, the label used for reachability graph edges.
    pub fn label(&self) -> String {
        format!("[{}] {}", self.id, self.name)
    }
}

/// Node of the net graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetNode {
    Place(Place),
    Transition(Transition),
}

impl NetNode {
    pub fn id(&self) -> &Symbol {
        match self {
            NetNode::Place(p) => &p.id,
            NetNode::Transition(t) => &t.id,
        }
    }

    fn name_mut(&mut self) -> &mut Symbol {
        match self {
            NetNode::Place(p) => &mut p.name,
            NetNode::Transition(t) => &mut t.name,
        }
    }

    fn position_mut(&mut self) -> &mut Position {
        match self {
            NetNode::Place(p) => &mut p.position,
            NetNode::Transition(t) => &mut t.position,
        }
    }

    pub fn as_place(&self) -> Option<&Place> {
        match self {
            NetNode::Place(p) => Some(p),
            NetNode::Transition(_) => None,
        }
    }

    pub fn as_transition(&self) -> Option<&Transition> {
        match self {
            NetNode::Place(_) => None,
            NetNode::Transition(t) => Some(t),
        }
    }
}

/// An arc of the net; its endpoints are the edge endpoints in the net graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arc {
    pub id: Symbol,
}

/// Places, transitions and arcs plus the current token distribution.
#[derive(Debug, Clone, Default)]
pub struct Net {
    graph: StableGraph<NetNode, Arc>,
    /// Places, transitions and arcs by id.
    nodes: HashMap<Symbol, NodeIndex>,
    arcs: HashMap<Symbol, EdgeIndex>,
    /// Place indices sorted by place id, the canonical marking order.
    place_order: Vec<NodeIndex>,
    modified: bool,
}

impl Net {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_place(&mut self, id: &str) -> Result<(), NetError> {
        let id = self.fresh_node_id(id)?;
        let ix = self.graph.add_node(NetNode::Place(Place::new(id.clone())));
        self.nodes.insert(id.clone(), ix);

        let pos = self
            .place_order
            .binary_search_by(|&p| self.graph[p].id().as_ref().cmp(id.as_ref()))
            .unwrap_or_else(|pos| pos);
        self.place_order.insert(pos, ix);
        Ok(())
    }

    pub fn add_transition(&mut self, id: &str) -> Result<(), NetError> {
        let id = self.fresh_node_id(id)?;
        let ix = self
            .graph
            .add_node(NetNode::Transition(Transition::new(id.clone())));
        self.nodes.insert(id, ix);
        // A transition without input places is always enabled.
        self.refresh_enabled();
        Ok(())
    }

    /// Add an arc from `source` to `target`; one end must be a place and the other a transition.
    pub fn add_arc(&mut self, id: &str, source: &str, target: &str) -> Result<(), NetError> {
        let id = Symbol::from(id);
        if self.arcs.contains_key(&id) {
            return Err(NetError::DuplicateId(id));
        }
        let src = self.node_index(source)?;
        let dst = self.node_index(target)?;

        match (&self.graph[src], &self.graph[dst]) {
            (NetNode::Place(_), NetNode::Transition(_))
            | (NetNode::Transition(_), NetNode::Place(_)) => {}
            (s, t) => {
                return Err(NetError::InvalidArc {
                    arc: id,
                    source: s.id().clone(),
                    target: t.id().clone(),
                });
            }
        }

        let ie = self.graph.add_edge(src, dst, Arc { id: id.clone() });
        self.arcs.insert(id, ie);
        self.refresh_enabled();
        Ok(())
    }

    pub fn set_name(&mut self, id: &str, name: &str) -> Result<(), NetError> {
        let ix = self.node_index(id)?;
        *self.graph[ix].name_mut() = Symbol::from(name);
        Ok(())
    }

    /// Define the token count of a place, both current and start.
    pub fn set_tokens(&mut self, id: &str, tokens: usize) -> Result<(), NetError> {
        let ix = self.place_index(id)?;
        if let NetNode::Place(p) = &mut self.graph[ix] {
            p.current_tokens = tokens;
            p.start_tokens = tokens;
        }
        self.refresh_enabled();
        Ok(())
    }

    pub fn set_position(&mut self, id: &str, x: i64, y: i64) -> Result<(), NetError> {
        let ix = self.node_index(id)?;
        *self.graph[ix].position_mut() = Position { x, y };
        Ok(())
    }

    pub fn place(&self, id: &str) -> Option<&Place> {
        self.node_index(id)
            .ok()
            .and_then(|ix| self.graph[ix].as_place())
    }

    pub fn transition(&self, id: &str) -> Option<&Transition> {
        self.node_index(id)
            .ok()
            .and_then(|ix| self.graph[ix].as_transition())
    }

    /// Places ordered by id.
    pub fn places(&self) -> impl Iterator<Item = &Place> {
        self.place_order
            .iter()
            .filter_map(move |&ix| self.graph[ix].as_place())
    }

    /// Transitions in the order they were added.
    pub fn transitions(&self) -> impl Iterator<Item = &Transition> {
        self.graph
            .node_indices()
            .filter_map(move |ix| self.graph[ix].as_transition())
    }

    /// `(arc id, source id, target id)` in the order the arcs were added.
    pub fn arcs(&self) -> impl Iterator<Item = (&Symbol, &Symbol, &Symbol)> {
        self.graph.edge_indices().filter_map(move |ie| {
            let (s, t) = self.graph.edge_endpoints(ie)?;
            Some((&self.graph[ie].id, self.graph[s].id(), self.graph[t].id()))
        })
    }

    pub fn place_count(&self) -> usize {
        self.place_order.len()
    }

    pub fn transition_count(&self) -> usize {
        self.graph.node_count() - self.place_order.len()
    }

    pub fn arc_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Input places of a transition, one entry per arc.
    pub fn inputs(&self, transition: &str) -> Result<Vec<&Symbol>, NetError> {
        let ix = self.transition_index(transition)?;
        Ok(self.adjacent(ix, Direction::Incoming))
    }

    /// Output places of a transition, one entry per arc.
    pub fn outputs(&self, transition: &str) -> Result<Vec<&Symbol>, NetError> {
        let ix = self.transition_index(transition)?;
        Ok(self.adjacent(ix, Direction::Outgoing))
    }

    /// Transitions enabled at the current marking, in the order they were added.
    pub fn enabled_transitions(&self) -> Vec<&Transition> {
        self.graph
            .node_indices()
            .filter(|&ix| self.is_enabled(ix))
            .filter_map(|ix| self.graph[ix].as_transition())
            .collect()
    }

    /// Fire an enabled transition.
    ///
    /// A transition whose inputs are satisfied but that would push an output place past
    /// `usize::MAX` is rejected with [`NetError::Overflow`].
    pub fn fire(&mut self, transition: &str) -> Result<(), NetError> {
        let ix = self.transition_index(transition)?;
        if !self.inputs_satisfied(ix) {
            return Err(NetError::NotEnabled(Symbol::from(transition)));
        }
        if let Some(place) = self.overflowing_output(ix) {
            return Err(NetError::Overflow(place.clone()));
        }
        self.fire_unchecked(ix);
        Ok(())
    }

    pub fn current_marking(&self) -> Marking {
        Marking::new(
            self.places()
                .map(|p| (p.id.clone(), p.current_tokens))
                .collect(),
        )
    }

    /// The file-defined (or last committed) marking the net resets to.
    pub fn start_marking(&self) -> Marking {
        Marking::new(
            self.places()
                .map(|p| (p.id.clone(), p.start_tokens))
                .collect(),
        )
    }

    /// Overwrite every place's current tokens from `marking`.
    ///
    /// The marking must name exactly the places of this net.
    pub fn set_marking(&mut self, marking: &Marking) -> Result<(), NetError> {
        if marking.len() != self.place_order.len() {
            return Err(NetError::MarkingMismatch);
        }
        let matches = self
            .place_order
            .iter()
            .zip(marking.tokens())
            .all(|(&ix, (id, _))| self.graph[ix].id() == id);
        if !matches {
            return Err(NetError::MarkingMismatch);
        }
        self.apply_marking(marking);
        Ok(())
    }

    /// Return every place to its start tokens.
    pub fn reset(&mut self) {
        for &ix in self.place_order.iter() {
            if let NetNode::Place(p) = &mut self.graph[ix] {
                p.current_tokens = p.start_tokens;
            }
        }
        self.refresh_enabled();
    }

    /// Manually add a token to a place and commit the result as the new start marking.
    pub fn add_token(&mut self, place: &str) -> Result<(), NetError> {
        let ix = self.place_index(place)?;
        if let NetNode::Place(p) = &mut self.graph[ix] {
            p.current_tokens = p
                .current_tokens
                .checked_add(1)
                .ok_or_else(|| NetError::Overflow(p.id.clone()))?;
        }
        self.commit_start_marking();
        Ok(())
    }

    /// Manually remove a token from a place and commit the result as the new start marking.
    pub fn remove_token(&mut self, place: &str) -> Result<(), NetError> {
        let ix = self.place_index(place)?;
        if let NetNode::Place(p) = &mut self.graph[ix] {
            if p.current_tokens == 0 {
                return Err(NetError::Underflow(p.id.clone()));
            }
            p.current_tokens -= 1;
        }
        self.commit_start_marking();
        Ok(())
    }

    /// Whether manual token edits moved the net away from the marking it was loaded with.
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Apply a marking produced by this net, positionally.
    pub(crate) fn apply_marking(&mut self, marking: &Marking) {
        for (&ix, (_, tokens)) in self.place_order.iter().zip(marking.tokens()) {
            if let NetNode::Place(p) = &mut self.graph[ix] {
                p.current_tokens = *tokens;
            }
        }
        self.refresh_enabled();
    }

    /// Indices of the transitions enabled at the current marking.
    pub(crate) fn enabled_indices(&self) -> Vec<NodeIndex> {
        self.graph
            .node_indices()
            .filter(|&ix| self.is_enabled(ix))
            .collect()
    }

    pub(crate) fn transition_at(&self, ix: NodeIndex) -> Option<&Transition> {
        self.graph.node_weight(ix).and_then(NetNode::as_transition)
    }

    /// Fire a transition known to be enabled.
    ///
    /// Places that cannot take the change keep their count; enabledness rules that out.
    pub(crate) fn fire_unchecked(&mut self, ix: NodeIndex) {
        for (place, (consumed, produced)) in self.effect(ix) {
            if let NetNode::Place(p) = &mut self.graph[place] {
                if let Some(tokens) = p
                    .current_tokens
                    .checked_sub(consumed)
                    .and_then(|n| n.checked_add(produced))
                {
                    p.current_tokens = tokens;
                }
            }
        }
        self.refresh_enabled();
    }

    /// `(consumed, produced)` tokens of every place adjacent to a transition, one per arc.
    fn effect(&self, ix: NodeIndex) -> BTreeMap<NodeIndex, (usize, usize)> {
        let mut effect: BTreeMap<NodeIndex, (usize, usize)> = BTreeMap::new();
        for e in self.graph.edges_directed(ix, Direction::Incoming) {
            effect.entry(e.source()).or_default().0 += 1;
        }
        for e in self.graph.edges_directed(ix, Direction::Outgoing) {
            effect.entry(e.target()).or_default().1 += 1;
        }
        effect
    }

    /// Every input place holds one token per arc.
    fn inputs_satisfied(&self, ix: NodeIndex) -> bool {
        self.transition_at(ix).is_some()
            && self.effect(ix).into_iter().all(|(place, (consumed, _))| {
                matches!(&self.graph[place], NetNode::Place(p) if p.current_tokens >= consumed)
            })
    }

    /// First output place, in insertion order, that firing would push past `usize::MAX`.
    fn overflowing_output(&self, ix: NodeIndex) -> Option<&Symbol> {
        self.effect(ix)
            .into_iter()
            .find_map(|(place, (consumed, produced))| match &self.graph[place] {
                NetNode::Place(p)
                    if p.current_tokens
                        .saturating_sub(consumed)
                        .checked_add(produced)
                        .is_none() =>
                {
                    Some(&p.id)
                }
                _ => None,
            })
    }

    /// Firing rule: inputs satisfied and no output place overflowing.
    fn is_enabled(&self, ix: NodeIndex) -> bool {
        self.inputs_satisfied(ix) && self.overflowing_output(ix).is_none()
    }

    fn refresh_enabled(&mut self) {
        let enabled: Vec<(NodeIndex, bool)> = self
            .graph
            .node_indices()
            .filter(|&ix| self.transition_at(ix).is_some())
            .map(|ix| (ix, self.is_enabled(ix)))
            .collect();
        for (ix, flag) in enabled {
            if let NetNode::Transition(t) = &mut self.graph[ix] {
                t.enabled = flag;
            }
        }
    }

    fn commit_start_marking(&mut self) {
        for &ix in self.place_order.iter() {
            if let NetNode::Place(p) = &mut self.graph[ix] {
                p.start_tokens = p.current_tokens;
            }
        }
        self.modified = true;
        self.refresh_enabled();
    }

    fn adjacent(&self, ix: NodeIndex, dir: Direction) -> Vec<&Symbol> {
        let mut edges: Vec<_> = self
            .graph
            .edges_directed(ix, dir)
            .map(|e| {
                let other = match dir {
                    Direction::Incoming => e.source(),
                    Direction::Outgoing => e.target(),
                };
                (e.id(), other)
            })
            .collect();
        edges.sort_by_key(|(ie, _)| *ie);
        edges
            .into_iter()
            .map(|(_, other)| self.graph[other].id())
            .collect()
    }

    fn fresh_node_id(&self, id: &str) -> Result<Symbol, NetError> {
        let id = Symbol::from(id);
        if self.nodes.contains_key(&id) {
            Err(NetError::DuplicateId(id))
        } else {
            Ok(id)
        }
    }

    fn node_index(&self, id: &str) -> Result<NodeIndex, NetError> {
        let id = Symbol::from(id);
        match self.nodes.get(&id) {
            Some(&ix) => Ok(ix),
            None => Err(NetError::UnknownId(id)),
        }
    }

    fn place_index(&self, id: &str) -> Result<NodeIndex, NetError> {
        let ix = self.node_index(id)?;
        match self.graph[ix] {
            NetNode::Place(_) => Ok(ix),
            NetNode::Transition(_) => Err(NetError::NotAPlace(Symbol::from(id))),
        }
    }

    fn transition_index(&self, id: &str) -> Result<NodeIndex, NetError> {
        let ix = self.node_index(id)?;
        match self.graph[ix] {
            NetNode::Transition(_) => Ok(ix),
            NetNode::Place(_) => Err(NetError::NotATransition(Symbol::from(id))),
        }
    }
}

impl fmt::Display for Net {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Transitions: ")?;
        for t in self.transitions() {
            write!(
                f,
                "<{}, {}, x: {}, y: {}>, ",
                t.id, t.name, t.position.x, t.position.y
            )?;
        }
        writeln!(f)?;
        write!(f, "Places: ")?;
        for p in self.places() {
            write!(
                f,
                "<{}, {} {}, x: {}, y: {}>, ",
                p.id, p.name, p.current_tokens, p.position.x, p.position.y
            )?;
        }
        writeln!(f)?;
        write!(f, "Arcs: ")?;
        for (id, source, target) in self.arcs() {
            write!(f, "<{}, {}, {}>, ", id, source, target)?;
        }
        Ok(())
    }
}
