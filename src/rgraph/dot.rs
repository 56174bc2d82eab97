//! Graphviz rendering of reachability graphs.
//!
//! Flags are mapped to styles: the root node is double-circled, the active node is filled,
//! the endpoints of an unboundedness witness are drawn in red together with the edges of the
//! detection path, and the latest edge is bold.

use super::{ArcFlags, NodeFlags, ReachabilityGraph};
use std::fmt;

/// Write `graph` in DOT format into the provided writer.
pub fn write_dot<W: fmt::Write>(graph: &ReachabilityGraph, writer: &mut W) -> fmt::Result {
    writeln!(writer, "digraph reachability {{")?;
    writeln!(writer, "    node [shape=circle];")?;

    for (ix, node) in graph.nodes() {
        writeln!(
            writer,
            "    n{} [label=\"{}\"{}];",
            ix.index(),
            node.key(),
            node_style(&node.flags)
        )?;
    }

    for (_, source, target, arc) in graph.edges() {
        writeln!(
            writer,
            "    n{} -> n{} [label=\"{}\"{}];",
            source.index(),
            target.index(),
            escape(&arc.label),
            arc_style(&arc.flags)
        )?;
    }

    writeln!(writer, "}}")
}

/// `Display` adapter rendering a reachability graph in DOT format.
pub struct Dot<'a>(pub &'a ReachabilityGraph);

impl fmt::Display for Dot<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_dot(self.0, f)
    }
}

/// Render `graph` in DOT format.
pub fn to_dot(graph: &ReachabilityGraph) -> String {
    format!("{}", Dot(graph))
}

fn node_style(flags: &NodeFlags) -> String {
    let mut attrs = Vec::new();
    if flags.root {
        attrs.push("shape=doublecircle");
    }
    if flags.active {
        attrs.push("style=filled");
        attrs.push("fillcolor=lightblue");
    }
    if flags.path_start || flags.path_end {
        attrs.push("color=red");
        attrs.push("penwidth=2");
    }
    attrs.iter().map(|a| format!(", {}", a)).collect()
}

fn arc_style(flags: &ArcFlags) -> String {
    let mut attrs = Vec::new();
    if flags.on_detection_path {
        attrs.push("color=red");
    }
    if flags.latest {
        attrs.push("style=bold");
    }
    attrs.iter().map(|a| format!(", {}", a)).collect()
}

fn escape(label: &str) -> String {
    label.replace('\\', "\\\\").replace('"', "\\\"")
}

impl ReachabilityGraph {
    /// Render the graph in DOT format, see [`to_dot`].
    pub fn to_dot(&self) -> String {
        to_dot(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::test_helpers::counter;

    #[test]
    fn renders_nodes_edges_and_flags() {
        let mut net = counter();
        let mut graph = ReachabilityGraph::new(&net.current_marking());
        let root = graph.root().unwrap();
        net.fire("t").unwrap();
        let end = graph.add_marking(&net.current_marking());
        let ie = graph.add_edge(net.transition("t").unwrap(), root, end);
        graph.mark_detection_path(&[ie]);
        graph.mark_path_ends(root, end);

        let dot = graph.to_dot();
        assert!(dot.starts_with("digraph reachability {"));
        assert!(dot.contains("label=\"(1)\", shape=doublecircle, color=red"));
        assert!(dot.contains("label=\"(2)\", style=filled"));
        assert!(dot.contains("n0 -> n1 [label=\"[t] t\", color=red, style=bold]"));
        assert!(dot.trim_end().ends_with('}'));
    }

    #[test]
    fn display_adapter_matches_writer() {
        let graph = ReachabilityGraph::new(&counter().current_marking());
        let mut out = String::new();
        write_dot(&graph, &mut out).unwrap();
        assert_eq!(Dot(&graph).to_string(), out);
        assert_eq!(graph.to_dot(), out);
    }

    #[test]
    fn escapes_quotes() {
        assert_eq!(escape("[t] \"go\""), "[t] \\\"go\\\"");
    }
}
