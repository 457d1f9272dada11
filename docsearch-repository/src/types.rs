//! Request types for facade operations.

use serde_json::Value;

/// A boolean composition of query clauses.
///
/// `must` clauses are ANDed, `must_not` clauses exclude, `should` clauses are
/// ORed, `filter` clauses restrict without scoring. How many `should` clauses
/// must match is left to the service unless `minimum_should_match` is set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoolQuery {
    pub must: Vec<Value>,
    pub must_not: Vec<Value>,
    pub should: Vec<Value>,
    pub filter: Vec<Value>,
    pub minimum_should_match: Option<u32>,
}

impl BoolQuery {
    /// Create an empty boolean query.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a clause every match must satisfy.
    pub fn must(mut self, clause: Value) -> Self {
        self.must.push(clause);
        self
    }

    /// Add a clause no match may satisfy.
    pub fn must_not(mut self, clause: Value) -> Self {
        self.must_not.push(clause);
        self
    }

    /// Add an optional clause.
    pub fn should(mut self, clause: Value) -> Self {
        self.should.push(clause);
        self
    }

    /// Add a non-scoring restriction.
    pub fn filter(mut self, clause: Value) -> Self {
        self.filter.push(clause);
        self
    }

    /// Require at least `n` of the `should` clauses to match.
    pub fn minimum_should_match(mut self, n: u32) -> Self {
        self.minimum_should_match = Some(n);
        self
    }

    /// Check if the query has no clauses at all.
    pub fn is_empty(&self) -> bool {
        self.must.is_empty()
            && self.must_not.is_empty()
            && self.should.is_empty()
            && self.filter.is_empty()
    }
}

/// Selects one element inside an object or array field.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementSelector {
    /// A member of an object field, by key.
    Key(String),
    /// An element of an array field, by position.
    Position(usize),
    /// The first element of an array field equal to the given value.
    Equals(Value),
}

impl std::fmt::Display for ElementSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Key(key) => write!(f, "key '{}'", key),
            Self::Position(position) => write!(f, "position {}", position),
            Self::Equals(value) => write!(f, "value {}", value),
        }
    }
}
