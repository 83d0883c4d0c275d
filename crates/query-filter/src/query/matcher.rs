//! Compiled query predicates.

use crate::config::CompileOptions;
use crate::error::{QueryError, Result};

use super::evaluate::evaluate_query_expression;
use super::expression::QueryExpression;
use super::optimizer::optimize_expression;
use super::parser::QueryParser;
use super::token::tokenize;

#[derive(Debug, Clone, PartialEq, Eq)]
enum PredicateKind {
    MatchAll,
    MatchNone,
    Expression(QueryExpression),
}

/// A filter query compiled once and evaluated against many candidates.
///
/// Compilation never fails. Blank queries match everything. Queries that
/// are malformed or contain no term match nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryPredicate {
    query: String,
    kind: PredicateKind,
}

impl QueryPredicate {
    /// Compiles a raw query string with default options.
    pub fn compile(raw_query: &str) -> Self {
        Self::compile_with(raw_query, &CompileOptions::default())
    }

    /// Compiles a raw query string into a predicate.
    ///
    /// The compilation pipeline:
    /// 1. Blank query: match everything
    /// 2. Tokenize; no term tokens: match nothing
    /// 3. Parse into an AST; any syntax recovery or nesting overflow: match nothing
    /// 4. Optimize the expression (unwrap groups, flatten AND/OR)
    pub fn compile_with(raw_query: &str, options: &CompileOptions) -> Self {
        let kind = compile_kind(raw_query, options);
        Self {
            query: raw_query.to_string(),
            kind,
        }
    }

    /// Returns the query text this predicate was compiled from.
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn is_match_all(&self) -> bool {
        self.kind == PredicateKind::MatchAll
    }

    pub fn is_match_none(&self) -> bool {
        self.kind == PredicateKind::MatchNone
    }

    /// Returns the optimized expression, if the query compiled to one.
    pub fn expression(&self) -> Option<&QueryExpression> {
        match &self.kind {
            PredicateKind::Expression(expression) => Some(expression),
            PredicateKind::MatchAll | PredicateKind::MatchNone => None,
        }
    }

    /// Tests one candidate string. Matching is case-insensitive.
    pub fn matches(&self, candidate: &str) -> bool {
        match &self.kind {
            PredicateKind::MatchAll => true,
            PredicateKind::MatchNone => false,
            PredicateKind::Expression(expression) => {
                evaluate_query_expression(expression, &candidate.to_lowercase())
            }
        }
    }

    /// Returns true if any of the candidates matches.
    pub fn matches_any<I, S>(&self, candidates: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        candidates
            .into_iter()
            .any(|candidate| self.matches(candidate.as_ref()))
    }

    /// Row-level match used by the data grids: the row key is tested first,
    /// then the string form of every other cell.
    pub fn matches_row<I, S>(&self, key: &str, cells: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.matches(key) || self.matches_any(cells)
    }

    /// Lazily yields the candidates that match.
    pub fn filter<'p, I, S>(&'p self, candidates: I) -> impl Iterator<Item = S> + 'p
    where
        I: IntoIterator<Item = S>,
        I::IntoIter: 'p,
        S: AsRef<str>,
    {
        candidates
            .into_iter()
            .filter(move |candidate| self.matches(candidate.as_ref()))
    }
}

fn compile_kind(raw_query: &str, options: &CompileOptions) -> PredicateKind {
    if raw_query.trim().is_empty() {
        return PredicateKind::MatchAll;
    }

    let tokens = tokenize(raw_query);
    log::trace!("query {raw_query:?} tokenized into {} tokens", tokens.len());
    if !tokens.iter().any(|token| token.is_term()) {
        log::debug!("query {raw_query:?} has no terms; nothing will match");
        return PredicateKind::MatchNone;
    }

    let parsed = match QueryParser::parse_tokens(&tokens, options) {
        Ok(parsed) => parsed,
        Err(error) => {
            log::warn!("query {raw_query:?} could not be compiled: {error}");
            return PredicateKind::MatchNone;
        }
    };
    if let Some(problem) = parsed.diagnostics().first() {
        log::debug!("query {raw_query:?} is malformed ({problem}); nothing will match");
        return PredicateKind::MatchNone;
    }

    let expression = optimize_expression(parsed.into_expression());
    log::trace!("query {raw_query:?} compiled to {expression}");
    PredicateKind::Expression(expression)
}

/// Compiles `query` into a reusable matching function.
///
/// Equivalent to [`QueryPredicate::compile`] wrapped in a closure. The
/// returned function can be cloned and shared across threads.
pub fn create_query_predicate(query: &str) -> impl Fn(&str) -> bool + Clone + Send + Sync {
    let predicate = QueryPredicate::compile(query);
    move |candidate: &str| predicate.matches(candidate)
}

/// Strictly validates a query, reporting the first problem the permissive
/// compiler would have turned into "nothing matches".
///
/// A blank query is valid.
pub fn check_query(query: &str) -> Result<()> {
    check_query_with(query, &CompileOptions::default())
}

pub fn check_query_with(query: &str, options: &CompileOptions) -> Result<()> {
    if query.trim().is_empty() {
        return Ok(());
    }

    let tokens = tokenize(query);
    if !tokens.iter().any(|token| token.is_term()) {
        return Err(QueryError::NoTerms);
    }

    let parsed = QueryParser::parse_tokens(&tokens, options)?;
    match parsed.diagnostics().first() {
        Some(problem) => Err(problem.clone()),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CAN_LEND: &str = "CanLend";
    const RESIDENCY: &str = "Residency";
    const CAN_LEND_AND_RESIDENCY: &str = "CanLend and Residency";
    const MISCELLANEOUS: &str = "Miscellaneous";

    const SAMPLES: &[&str] = &[
        "",
        " ",
        CAN_LEND,
        RESIDENCY,
        CAN_LEND_AND_RESIDENCY,
        MISCELLANEOUS,
        "AND OR NOT",
        "ünïcødé",
    ];

    #[test]
    fn blank_query_matches_everything() {
        for query in ["", "   ", "\t\n"] {
            let predicate = create_query_predicate(query);
            for &sample in SAMPLES {
                assert!(predicate(sample), "{query:?} should match {sample:?}");
            }
            assert!(QueryPredicate::compile(query).is_match_all());
        }
    }

    #[test]
    fn operators_only_query_matches_nothing() {
        let predicate = create_query_predicate("AND OR NOT");
        for &sample in SAMPLES {
            assert!(!predicate(sample), "should not match {sample:?}");
        }
        assert!(QueryPredicate::compile("( ) NOT").is_match_none());
    }

    #[test]
    fn single_term_is_case_insensitive() {
        assert!(create_query_predicate("canlend")(CAN_LEND));
        assert!(create_query_predicate("CANLEND")("canlend"));
        assert!(!create_query_predicate("canlend")(RESIDENCY));
    }

    #[test]
    fn not_term() {
        let predicate = create_query_predicate("NOT residency");
        assert!(predicate(CAN_LEND));
        assert!(!predicate(RESIDENCY));
    }

    #[test]
    fn quoted_phrase_matches_exact_substring() {
        let predicate = create_query_predicate(r#""CanLend and Residency""#);
        assert!(predicate(CAN_LEND_AND_RESIDENCY));
        assert!(!predicate(CAN_LEND));
    }

    #[test]
    fn not_with_quoted_phrase() {
        let predicate = create_query_predicate(r#"NOT "CanLend and Residency""#);
        assert!(!predicate(CAN_LEND_AND_RESIDENCY));
        assert!(predicate(CAN_LEND));
    }

    #[test]
    fn two_terms_with_and() {
        let predicate = create_query_predicate("canlend AND residency");
        assert!(predicate(CAN_LEND_AND_RESIDENCY));
        assert!(!predicate(CAN_LEND));
        assert!(!predicate(MISCELLANEOUS));
    }

    #[test]
    fn and_with_not() {
        let predicate = create_query_predicate("miscellaneous AND NOT canlend");
        assert!(predicate("miscellaneous data"));
        assert!(!predicate("miscellaneous CanLend data"));
    }

    #[test]
    fn two_terms_with_or() {
        let predicate = create_query_predicate("canlend OR residency");
        assert!(predicate(CAN_LEND));
        assert!(predicate(RESIDENCY));
        assert!(!predicate(MISCELLANEOUS));
    }

    #[test]
    fn and_binds_tighter_than_or() {
        let predicate = create_query_predicate("residency OR canlend AND miscellaneous");
        assert!(predicate("canlend and miscellaneous data"));
        assert!(!predicate("canlend data"));
        assert!(!predicate("miscellaneous data"));
        assert!(predicate("residency data"));
        assert!(predicate(RESIDENCY));
    }

    #[test]
    fn grouping_with_not() {
        let predicate = create_query_predicate("misc OR (canlend AND NOT residency)");
        assert!(predicate(MISCELLANEOUS));
        assert!(predicate(CAN_LEND));
        assert!(!predicate(CAN_LEND_AND_RESIDENCY));
        assert!(!predicate(RESIDENCY));
    }

    #[test]
    fn not_applies_to_following_group_only() {
        let predicate = create_query_predicate("NOT (canlend OR residency) AND data");
        assert!(predicate("misc data"));
        assert!(!predicate("canlend data"));
        assert!(!predicate("misc"));
    }

    #[test]
    fn lowercase_operators() {
        let predicate = create_query_predicate("canlend and not residency");
        assert!(predicate(CAN_LEND));
        assert!(!predicate(CAN_LEND_AND_RESIDENCY));
    }

    #[test]
    fn extra_whitespace_is_ignored() {
        let padded = create_query_predicate("  canlend   OR   residency  ");
        let plain = create_query_predicate("canlend OR residency");
        for &sample in SAMPLES {
            assert_eq!(padded(sample), plain(sample), "differs on {sample:?}");
        }
        assert!(padded(CAN_LEND));
        assert!(padded(RESIDENCY));
    }

    #[test]
    fn compiling_twice_is_idempotent() {
        for query in [
            "misc OR (canlend AND NOT residency)",
            "AND OR NOT",
            "",
            "canlend residency",
        ] {
            let first = QueryPredicate::compile(query);
            let second = QueryPredicate::compile(query);
            assert_eq!(first, second);
            for &sample in SAMPLES {
                assert_eq!(first.matches(sample), second.matches(sample));
                assert_eq!(first.matches(sample), first.matches(sample));
            }
        }
    }

    #[test]
    fn empty_phrase_is_a_no_op() {
        let predicate = create_query_predicate(r#""" AND canlend"#);
        assert!(predicate(CAN_LEND));
        assert!(!predicate(RESIDENCY));
        assert!(create_query_predicate(r#""""#)(""));
    }

    #[test]
    fn trailing_tokens_match_nothing() {
        let predicate = QueryPredicate::compile("canlend residency");
        assert!(predicate.is_match_none());
        assert!(!predicate.matches(CAN_LEND_AND_RESIDENCY));
        assert!(!create_query_predicate("canlend )")(CAN_LEND));
    }

    #[test]
    fn malformed_syntax_matches_nothing() {
        for query in ["canlend OR", "canlend AND", "AND canlend", "(canlend", "NOT"] {
            let predicate = create_query_predicate(query);
            assert!(!predicate(CAN_LEND), "{query:?} should not match");
            assert!(!predicate(""), "{query:?} should not match empty");
        }
    }

    #[test]
    fn excessive_nesting_matches_nothing() {
        let query = format!("{}canlend", "NOT NOT ".repeat(550));
        let predicate = QueryPredicate::compile(&query);
        assert!(predicate.is_match_none());

        let options = CompileOptions::default().with_max_depth(1_200);
        let predicate = QueryPredicate::compile_with(&query, &options);
        assert!(predicate.matches(CAN_LEND));
        assert_eq!(
            predicate.expression().map(ToString::to_string).as_deref(),
            Some("canlend")
        );
    }

    #[test]
    fn moderately_deep_nesting_compiles() {
        let predicate = create_query_predicate(&format!("{}canlend", "NOT ".repeat(130)));
        assert!(predicate(CAN_LEND));
        assert!(!predicate(RESIDENCY));

        let query = format!("{}canlend{}", "(".repeat(200), ")".repeat(200));
        assert!(create_query_predicate(&query)(CAN_LEND));
    }

    #[test]
    fn operator_glued_to_phrase_or_punctuation() {
        let predicate = create_query_predicate(r#"NOT"residency""#);
        assert!(predicate(CAN_LEND));
        assert!(!predicate(RESIDENCY));

        let predicate = create_query_predicate("canlend AND-x");
        assert!(predicate("CanLend-X"));
        assert!(!predicate(CAN_LEND));
    }

    #[test]
    fn operator_lookalikes_are_terms() {
        let predicate = create_query_predicate("ANDroid");
        assert!(predicate("android phone"));
        assert!(!predicate("and"));
    }

    #[test]
    fn unicode_case_folding() {
        let predicate = create_query_predicate("ÜNÏCØDÉ");
        assert!(predicate("ünïcødé"));
    }

    #[test]
    fn predicate_is_shareable_across_threads() {
        let predicate = create_query_predicate("canlend");
        let handle = {
            let predicate = predicate.clone();
            std::thread::spawn(move || predicate(CAN_LEND))
        };
        assert!(handle.join().expect("thread"));
        assert!(!predicate(RESIDENCY));
    }

    #[test]
    fn matches_row_checks_key_then_cells() {
        let predicate = QueryPredicate::compile("residency");
        assert!(predicate.matches_row(RESIDENCY, Vec::<String>::new()));
        assert!(predicate.matches_row("row-1", ["CanLend", "Residency"]));
        assert!(!predicate.matches_row("row-1", ["CanLend", "Miscellaneous"]));
    }

    #[test]
    fn matches_row_tests_each_cell_on_its_own() {
        let predicate = QueryPredicate::compile("canlend AND residency");
        assert!(!predicate.matches_row("row-1", ["CanLend", "Residency"]));
        assert!(predicate.matches_row("row-1", [CAN_LEND_AND_RESIDENCY]));
    }

    #[test]
    fn filter_yields_matching_candidates() {
        let predicate = QueryPredicate::compile("canlend OR misc");
        let matched: Vec<&str> = predicate
            .filter([CAN_LEND, RESIDENCY, CAN_LEND_AND_RESIDENCY, MISCELLANEOUS])
            .collect();
        assert_eq!(matched, vec![CAN_LEND, CAN_LEND_AND_RESIDENCY, MISCELLANEOUS]);
    }

    #[test]
    fn query_text_is_kept() {
        let predicate = QueryPredicate::compile("  canlend ");
        assert_eq!(predicate.query(), "  canlend ");
    }

    #[test]
    fn check_query_reports_problems() {
        assert_eq!(check_query(""), Ok(()));
        assert_eq!(check_query("misc OR (canlend AND NOT residency)"), Ok(()));
        assert_eq!(check_query("AND OR NOT"), Err(QueryError::NoTerms));
        assert_eq!(
            check_query("canlend residency"),
            Err(QueryError::UnexpectedToken { position: 8 })
        );
        assert_eq!(check_query("canlend OR"), Err(QueryError::UnexpectedEnd));
        assert_eq!(
            check_query("(canlend"),
            Err(QueryError::MissingCloseParen { position: 8 })
        );
        assert_eq!(
            check_query_with("NOT NOT a", &CompileOptions::default().with_max_depth(1)),
            Err(QueryError::NestingTooDeep { limit: 1 })
        );
    }
}
