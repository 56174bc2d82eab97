//! Small nets shared by the unit tests.
//!
//! Every net here is well formed; places carry their start tokens.

use super::Net;

/// Build a net from place `(id, tokens)` pairs, transition ids and `(arc, source, target)` triples.
pub fn build(places: &[(&str, usize)], transitions: &[&str], arcs: &[(&str, &str, &str)]) -> Net {
    let mut net = Net::new();
    for (id, _) in places {
        net.add_place(id).unwrap();
    }
    for id in transitions {
        net.add_transition(id).unwrap();
    }
    for (id, source, target) in arcs {
        net.add_arc(id, source, target).unwrap();
    }
    for (id, tokens) in places {
        net.set_tokens(id, *tokens).unwrap();
    }
    net
}

/// One place with two tokens and nothing else.
pub fn lonely_place() -> Net {
    build(&[("p1", 2)], &[], &[])
}

/// `p1 (1) -> t1 -> p2`
pub fn single_step() -> Net {
    build(
        &[("p1", 1), ("p2", 0)],
        &["t1"],
        &[("a1", "p1", "t1"), ("a2", "t1", "p2")],
    )
}

/// `p (1) -> t -> p, p`: every firing adds a token to `p`.
pub fn counter() -> Net {
    build(
        &[("p", 1)],
        &["t"],
        &[("a1", "p", "t"), ("a2", "t", "p"), ("a3", "t", "p")],
    )
}

/// `p1 (1) -> t1 -> p2 -> t2 -> p1`, a single token going round.
pub fn cycle() -> Net {
    build(
        &[("p1", 1), ("p2", 0)],
        &["t1", "t2"],
        &[
            ("a1", "p1", "t1"),
            ("a2", "t1", "p2"),
            ("a3", "p2", "t2"),
            ("a4", "t2", "p1"),
        ],
    )
}

/// Two transitions moving the token from `p1` to `p2` in the same way.
pub fn twin_transitions() -> Net {
    build(
        &[("p1", 1), ("p2", 0)],
        &["t1", "t2"],
        &[
            ("a1", "p1", "t1"),
            ("a2", "t1", "p2"),
            ("a3", "p1", "t2"),
            ("a4", "t2", "p2"),
        ],
    )
}

/// A bounded cycle `p1 -> t1 -> p2 -> t2 -> p1` next to a producer loop on `p3` that
/// only starts pumping after a detour through `p4`.
///
/// `t3` moves the token of `p4` into `p5`, `t4` takes it back and drops one more token in `p3`.
pub fn delayed_pump() -> Net {
    build(
        &[("p1", 1), ("p2", 0), ("p3", 0), ("p4", 1), ("p5", 0)],
        &["t1", "t2", "t3", "t4"],
        &[
            ("a1", "p1", "t1"),
            ("a2", "t1", "p2"),
            ("a3", "p2", "t2"),
            ("a4", "t2", "p1"),
            ("a5", "p4", "t3"),
            ("a6", "t3", "p5"),
            ("a7", "p5", "t4"),
            ("a8", "t4", "p4"),
            ("a9", "t4", "p3"),
        ],
    )
}

/// Producer/consumer with a buffer of capacity two, bounded.
pub fn bounded_buffer() -> Net {
    build(
        &[("ready", 1), ("full", 0), ("free", 2), ("empty", 1)],
        &["produce", "consume"],
        &[
            ("a1", "ready", "produce"),
            ("a2", "free", "produce"),
            ("a3", "produce", "ready"),
            ("a4", "produce", "full"),
            ("a5", "full", "consume"),
            ("a6", "empty", "consume"),
            ("a7", "consume", "free"),
            ("a8", "consume", "empty"),
        ],
    )
}
