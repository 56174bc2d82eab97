use crate::Symbol;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attribute {
    Name(Symbol),
    Tokens(usize),
    Position(i64, i64),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Place {
        id: Symbol,
        attributes: Vec<Attribute>,
    },
    Transition {
        id: Symbol,
        attributes: Vec<Attribute>,
    },
    Arc {
        id: Symbol,
        source: Symbol,
        target: Symbol,
    },
}
