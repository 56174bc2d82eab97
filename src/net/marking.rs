//! Token distributions and their canonical keys.
//!
//! A [`Marking`] is an immutable snapshot of how many tokens every place of a net holds at one
//! instant. Its [`CanonicalKey`] is built by ordering the places by id and joining their token
//! counts as `(n1|n2|...|nk)`, so two markings are equal exactly when their keys are equal,
//! regardless of the order in which places were added to the net or where they are drawn.
//!
//! # Example
//!
//! ```
//! use pnbound::net::marking::Marking;
//! use string_cache::DefaultAtom;
//!
//! let m = Marking::new(vec![
//!     (DefaultAtom::from("p2"), 0),
//!     (DefaultAtom::from("p1"), 3),
//! ]);
//! assert_eq!(m.key().as_str(), "(3|0)");
//! ```

use crate::Symbol;
use itertools::Itertools;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Order-independent identity of a marking, e.g. `(1|0|2)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CanonicalKey(String);

impl CanonicalKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CanonicalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CanonicalKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Per-place token counts of a net at one instant.
///
/// The `(place id, tokens)` pairs are kept sorted by place id, which is the order used by the
/// canonical key and by the component-wise comparisons below. Equality and hashing only look at
/// the key.
#[derive(Debug, Clone)]
pub struct Marking {
    tokens: Vec<(Symbol, usize)>,
    key: CanonicalKey,
}

impl Marking {
    /// Build a marking from `(place id, tokens)` pairs given in any order.
    pub fn new(mut tokens: Vec<(Symbol, usize)>) -> Self {
        tokens.sort_by(|(a, _), (b, _)| a.as_ref().cmp(b.as_ref()));
        let key = canonical_key(tokens.iter().map(|(_, n)| *n));
        Self { tokens, key }
    }

    pub fn key(&self) -> &CanonicalKey {
        &self.key
    }

    /// `(place id, tokens)` pairs ordered by place id.
    pub fn tokens(&self) -> &[(Symbol, usize)] {
        &self.tokens
    }

    /// Token count of a single place, `None` if the place is not part of this marking.
    pub fn get(&self, place: &str) -> Option<usize> {
        self.tokens
            .binary_search_by(|(id, _)| id.as_ref().cmp(place))
            .ok()
            .map(|i| self.tokens[i].1)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn total(&self) -> usize {
        self.tokens.iter().map(|(_, n)| n).sum()
    }

    /// Every place holds at least as many tokens here as in `other`.
    ///
    /// Both markings must come from the same net, the comparison is positional.
    pub fn covers(&self, other: &Marking) -> bool {
        self.counts().zip(other.counts()).all(|(a, b)| a >= b)
    }

    /// Some place holds strictly more tokens here than in `other`.
    pub fn exceeds_somewhere(&self, other: &Marking) -> bool {
        self.counts().zip(other.counts()).any(|(a, b)| a > b)
    }

    /// `self` covers `other` and is strictly larger on at least one place.
    pub fn strictly_dominates(&self, other: &Marking) -> bool {
        self.covers(other) && self.exceeds_somewhere(other)
    }

    /// Places whose count here is strictly greater than in `other`.
    pub fn excess_over<'a>(&'a self, other: &'a Marking) -> impl Iterator<Item = &'a Symbol> + 'a {
        self.tokens
            .iter()
            .zip(other.counts())
            .filter(|((_, a), b)| a > b)
            .map(|((id, _), _)| id)
    }

    fn counts(&self) -> impl Iterator<Item = usize> + '_ {
        self.tokens.iter().map(|(_, n)| *n)
    }
}

impl PartialEq for Marking {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for Marking {}

impl Hash for Marking {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state)
    }
}

impl fmt::Display for Marking {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key)
    }
}

fn canonical_key(counts: impl Iterator<Item = usize>) -> CanonicalKey {
    CanonicalKey(format!("({})", counts.format("|")))
}
