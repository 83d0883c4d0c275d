//! Recursive-descent query parser.
//!
//! Grammar, loosest binding first:
//!
//! ```text
//! Expression := AndTerm (OR AndTerm)*
//! AndTerm    := Primary (AND Primary)*
//! Primary    := NOT Primary | '(' Expression ')' | TERM
//! ```
//!
//! The parser is permissive. A position that should hold a primary but does
//! not becomes [`QueryExpression::Missing`] and the token is left in place, a
//! missing `)` is tolerated, and trailing tokens are left unconsumed. Each of
//! these recoveries is recorded as a diagnostic on the [`ParsedQuery`].

use crate::config::CompileOptions;
use crate::error::{QueryError, Result};

use super::expression::{QueryExpression, QueryTerm};
use super::token::{tokenize, QueryToken, QueryTokenKind};

/// Result of a parse: the tree plus everything the parser had to recover from.
#[derive(Debug, Clone)]
pub struct ParsedQuery {
    expression: QueryExpression,
    consumed: usize,
    token_count: usize,
    diagnostics: Vec<QueryError>,
}

impl ParsedQuery {
    pub fn expression(&self) -> &QueryExpression {
        &self.expression
    }

    pub fn into_expression(self) -> QueryExpression {
        self.expression
    }

    /// True when the cursor stopped exactly at the end of the token list.
    pub fn is_complete(&self) -> bool {
        self.consumed == self.token_count
    }

    /// True when no recovery was needed anywhere in the query.
    pub fn is_well_formed(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn diagnostics(&self) -> &[QueryError] {
        &self.diagnostics
    }
}

// ---------------------------------------------------------------------------
// Query parser
// ---------------------------------------------------------------------------

pub struct QueryParser<'a> {
    tokens: &'a [QueryToken],
    index: usize,
    depth: usize,
    max_depth: usize,
    diagnostics: Vec<QueryError>,
}

impl<'a> QueryParser<'a> {
    /// Tokenizes and parses `input` with default options.
    pub fn parse(input: &str) -> Result<ParsedQuery> {
        let tokens = tokenize(input);
        QueryParser::parse_tokens(&tokens, &CompileOptions::default())
    }

    /// Parses an already tokenized query.
    ///
    /// Only exceeding `options.max_depth` is an error; every syntax problem
    /// is reported through [`ParsedQuery::diagnostics`] instead.
    pub fn parse_tokens(tokens: &'a [QueryToken], options: &CompileOptions) -> Result<ParsedQuery> {
        let mut parser = Self {
            tokens,
            index: 0,
            depth: 0,
            max_depth: options.max_depth,
            diagnostics: Vec::new(),
        };

        let expression = parser.parse_or_expression()?;
        if let Some(token) = parser.peek() {
            parser.diagnostics.push(QueryError::UnexpectedToken {
                position: token.position(),
            });
        }

        Ok(ParsedQuery {
            expression,
            consumed: parser.index,
            token_count: tokens.len(),
            diagnostics: parser.diagnostics,
        })
    }

    fn parse_or_expression(&mut self) -> Result<QueryExpression> {
        let mut parts = vec![self.parse_and_expression()?];
        while self.consume(&QueryTokenKind::Or) {
            parts.push(self.parse_and_expression()?);
        }

        Ok(if parts.len() == 1 {
            parts.remove(0)
        } else {
            QueryExpression::Or(parts)
        })
    }

    fn parse_and_expression(&mut self) -> Result<QueryExpression> {
        let mut parts = vec![self.parse_primary_expression()?];
        while self.consume(&QueryTokenKind::And) {
            parts.push(self.parse_primary_expression()?);
        }

        Ok(if parts.len() == 1 {
            parts.remove(0)
        } else {
            QueryExpression::And(parts)
        })
    }

    fn parse_primary_expression(&mut self) -> Result<QueryExpression> {
        let Some(token) = self.peek() else {
            self.diagnostics.push(QueryError::UnexpectedEnd);
            return Ok(QueryExpression::Missing);
        };

        match token.kind() {
            QueryTokenKind::Not => {
                self.index += 1;
                self.enter()?;
                let inner = self.parse_primary_expression()?;
                self.leave();
                Ok(QueryExpression::negate(inner))
            }
            QueryTokenKind::LParen => {
                self.index += 1;
                self.enter()?;
                let inner = self.parse_or_expression()?;
                self.leave();
                if !self.consume(&QueryTokenKind::RParen) {
                    let position = self
                        .peek()
                        .map(QueryToken::position)
                        .unwrap_or_else(|| self.end_position());
                    self.diagnostics
                        .push(QueryError::MissingCloseParen { position });
                }
                Ok(QueryExpression::Group(Box::new(inner)))
            }
            QueryTokenKind::Term(raw) => {
                self.index += 1;
                Ok(QueryExpression::Term(QueryTerm::new(raw.as_str())))
            }
            QueryTokenKind::And | QueryTokenKind::Or | QueryTokenKind::RParen => {
                self.diagnostics.push(QueryError::ExpectedTerm {
                    position: token.position(),
                });
                Ok(QueryExpression::Missing)
            }
        }
    }

    fn enter(&mut self) -> Result<()> {
        if self.depth >= self.max_depth {
            return Err(QueryError::NestingTooDeep {
                limit: self.max_depth,
            });
        }
        self.depth += 1;
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn consume(&mut self, expected: &QueryTokenKind) -> bool {
        matches!(self.peek(), Some(token) if token.kind() == expected) && {
            self.index += 1;
            true
        }
    }

    fn peek(&self) -> Option<&'a QueryToken> {
        self.tokens.get(self.index)
    }

    fn end_position(&self) -> usize {
        self.tokens
            .last()
            .map(|token| token.span().end)
            .unwrap_or_default()
    }
}
