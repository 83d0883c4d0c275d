//! Boolean filter query compiler.
//!
//! Turns free-text filter expressions such as
//! `misc OR (canlend AND NOT residency)` into reusable, case-insensitive
//! predicates over row keys and cell values:
//! - Query tokenization and recursive-descent parsing
//! - Compile-once predicates that never fail at match time
//! - Strict validation for surfacing syntax errors to users

pub mod config;
pub mod error;
pub mod query;

// Re-export main types
pub use config::CompileOptions;
pub use error::{QueryError, Result};
pub use query::{
    check_query, check_query_with, create_query_predicate, QueryExpression, QueryParser,
    QueryPredicate, QueryTerm, QueryToken, QueryTokenKind,
};
