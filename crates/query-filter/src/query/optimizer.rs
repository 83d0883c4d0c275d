//! Query optimization.
//!
//! Applies rewrites that keep the meaning of an expression but make it
//! cheaper to evaluate per candidate:
//! - Unwraps parenthesized groups
//! - Flattens nested AND/OR expressions
//! - Removes double negation

use super::expression::QueryExpression;

/// Optimizes a query expression for repeated evaluation.
///
/// The function never mutates the input; a new tree is returned.
pub fn optimize_expression(expr: QueryExpression) -> QueryExpression {
    match expr {
        QueryExpression::Group(inner) => optimize_expression(*inner),
        QueryExpression::And(parts) => optimize_and(parts),
        QueryExpression::Or(parts) => optimize_or(parts),
        QueryExpression::Not(inner) => match optimize_expression(*inner) {
            QueryExpression::Not(double) => *double,
            other => QueryExpression::Not(Box::new(other)),
        },
        QueryExpression::Term(_) | QueryExpression::Missing => expr,
    }
}

fn optimize_and(parts: Vec<QueryExpression>) -> QueryExpression {
    let mut flattened = Vec::with_capacity(parts.len());

    for expr in parts.into_iter().map(optimize_expression) {
        match expr {
            QueryExpression::And(nested) => flattened.extend(nested),
            other => flattened.push(other),
        }
    }

    match flattened.len() {
        0 => QueryExpression::And(Vec::new()),
        1 => flattened.remove(0),
        _ => QueryExpression::And(flattened),
    }
}

fn optimize_or(parts: Vec<QueryExpression>) -> QueryExpression {
    let mut flattened = Vec::with_capacity(parts.len());

    for expr in parts.into_iter().map(optimize_expression) {
        match expr {
            QueryExpression::Or(nested) => flattened.extend(nested),
            other => flattened.push(other),
        }
    }

    match flattened.len() {
        0 => QueryExpression::Or(Vec::new()),
        1 => flattened.remove(0),
        _ => QueryExpression::Or(flattened),
    }
}
