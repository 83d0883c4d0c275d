//! Query evaluation logic for matching expressions against candidates.

use super::expression::{QueryExpression, QueryTerm};
use super::text_match::text_matches;

/// Evaluates an expression against a candidate that is already lowercased.
pub fn evaluate_query_expression(expression: &QueryExpression, lowered_candidate: &str) -> bool {
    match expression {
        QueryExpression::Term(term) => evaluate_query_term(term, lowered_candidate),
        QueryExpression::Not(inner) => !evaluate_query_expression(inner, lowered_candidate),
        QueryExpression::Group(inner) => evaluate_query_expression(inner, lowered_candidate),
        QueryExpression::And(parts) => parts
            .iter()
            .all(|part| evaluate_query_expression(part, lowered_candidate)),
        QueryExpression::Or(parts) => parts
            .iter()
            .any(|part| evaluate_query_expression(part, lowered_candidate)),
        QueryExpression::Missing => false,
    }
}

/// Evaluates a single term against a lowercased candidate.
pub fn evaluate_query_term(term: &QueryTerm, lowered_candidate: &str) -> bool {
    text_matches(term.needle(), lowered_candidate)
}
