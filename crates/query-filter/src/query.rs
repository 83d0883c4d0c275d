//! Boolean filter queries for grid rows.
//!
//! This module provides the filter query language, including:
//! - Tokenization of operators, parentheses, words and quoted phrases
//! - Recursive-descent parsing into an expression tree (NOT > AND > OR)
//! - Expression optimization (group unwrapping, AND/OR flattening)
//! - Case-insensitive substring matching against candidate strings

mod evaluate;
mod expression;
mod matcher;
mod optimizer;
mod parser;
mod text_match;
mod token;

// Re-export public types
pub use evaluate::evaluate_query_expression;
pub use expression::{QueryExpression, QueryTerm};
pub use matcher::{check_query, check_query_with, create_query_predicate, QueryPredicate};
pub use optimizer::optimize_expression;
pub use parser::{ParsedQuery, QueryParser};
pub use token::{tokenize, QueryToken, QueryTokenKind};
