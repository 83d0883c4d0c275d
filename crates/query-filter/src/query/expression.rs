//! Query expression types and AST nodes.

use std::fmt;

use super::text_match::normalize_term;

/// A parsed query expression (AST node).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryExpression {
    Term(QueryTerm),
    Not(Box<QueryExpression>),
    And(Vec<QueryExpression>),
    Or(Vec<QueryExpression>),
    /// A parenthesized sub-expression.
    Group(Box<QueryExpression>),
    /// An operand position that held no usable primary. Never matches.
    Missing,
}

/// A single query term (leaf node in the AST).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryTerm {
    raw: String,
    needle: String,
}

impl QueryTerm {
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let needle = normalize_term(&raw);
        Self { raw, needle }
    }

    /// The term exactly as written in the query.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Lowercased text tested for containment.
    pub fn needle(&self) -> &str {
        &self.needle
    }
}

impl QueryExpression {
    pub fn term(raw: impl Into<String>) -> Self {
        Self::Term(QueryTerm::new(raw))
    }

    pub fn negate(inner: QueryExpression) -> Self {
        Self::Not(Box::new(inner))
    }
}

impl fmt::Display for QueryExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryExpression::Term(term) => f.write_str(term.raw()),
            QueryExpression::Missing => f.write_str("<missing>"),
            QueryExpression::Not(inner) => write!(f, "NOT {inner}"),
            QueryExpression::Group(inner) => write!(f, "({inner})"),
            QueryExpression::And(parts) => write_joined(f, parts, " AND "),
            QueryExpression::Or(parts) => write_joined(f, parts, " OR "),
        }
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, parts: &[QueryExpression], separator: &str) -> fmt::Result {
    f.write_str("(")?;
    for (index, part) in parts.iter().enumerate() {
        if index > 0 {
            f.write_str(separator)?;
        }
        write!(f, "{part}")?;
    }
    f.write_str(")")
}
