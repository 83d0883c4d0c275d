//! Query tokenizer.
//!
//! Splits raw filter text into operators, parentheses and terms. Whitespace
//! between tokens is discarded. Tokenization never fails: anything that is
//! not an operator or a parenthesis ends up as a term.

use std::ops::Range;

use logos::{Lexer, Logos};

/// A token together with the byte span it was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryToken {
    kind: QueryTokenKind,
    span: Range<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryTokenKind {
    And,
    Or,
    Not,
    LParen,
    RParen,
    /// Raw matched text: a bare word, or a phrase including its quotes.
    Term(String),
}

impl QueryToken {
    pub fn new(kind: QueryTokenKind, span: Range<usize>) -> Self {
        Self { kind, span }
    }

    pub fn kind(&self) -> &QueryTokenKind {
        &self.kind
    }

    pub fn span(&self) -> Range<usize> {
        self.span.clone()
    }

    /// Byte offset of the token in the source query.
    pub fn position(&self) -> usize {
        self.span.start
    }

    pub fn is_term(&self) -> bool {
        matches!(self.kind, QueryTokenKind::Term(_))
    }
}

// ---------------------------------------------------------------------------
// Lexer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QuotedKind {
    Phrase,
    Unterminated,
}

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"\s+")]
enum RawToken {
    #[regex("(?i)and", priority = 10)]
    And,
    #[regex("(?i)or", priority = 10)]
    Or,
    #[regex("(?i)not", priority = 10)]
    Not,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("\"", consume_quoted)]
    Quoted(QuotedKind),
    #[regex(r#"[^\s()"][^\s()]*"#)]
    Word,
}

/// Extends a token that opened with `"` up to the next `"` not preceded by
/// a backslash.
///
/// Without a closing quote the token falls back to a bare run that stops at
/// whitespace or a parenthesis, so `"abc def` lexes as `"abc` and `def`.
fn consume_quoted(lex: &mut Lexer<RawToken>) -> QuotedKind {
    let remainder = lex.remainder();

    let mut chars = remainder.char_indices().peekable();
    while let Some((offset, ch)) = chars.next() {
        match ch {
            '\\' => {
                chars.next_if(|&(_, next)| next == '"');
            }
            '"' => {
                lex.bump(offset + ch.len_utf8());
                return QuotedKind::Phrase;
            }
            _ => {}
        }
    }

    let end = remainder
        .find(|ch: char| ch.is_whitespace() || matches!(ch, '(' | ')'))
        .unwrap_or(remainder.len());
    lex.bump(end);
    QuotedKind::Unterminated
}

/// Splits an operator keyword off the front of a bare word.
///
/// Keywords are word-boundary delimited: `AND-x` starts with `AND`, while
/// `ANDroid` and `AND_x` are plain words.
fn leading_operator(word: &str) -> Option<(QueryTokenKind, usize)> {
    [
        ("and", QueryTokenKind::And),
        ("or", QueryTokenKind::Or),
        ("not", QueryTokenKind::Not),
    ]
    .into_iter()
    .find_map(|(keyword, kind)| {
        let prefix = word.get(..keyword.len())?;
        let next = word[keyword.len()..].chars().next()?;
        let boundary = !(next.is_ascii_alphanumeric() || next == '_');
        (boundary && prefix.eq_ignore_ascii_case(keyword)).then_some((kind, keyword.len()))
    })
}

/// Tokenizes a raw query string.
pub fn tokenize(input: &str) -> Vec<QueryToken> {
    let mut tokens = Vec::new();
    let mut base = 0usize;

    // A keyword split off a word restarts the lexer right after it.
    'restart: while base < input.len() {
        let mut lexer = RawToken::lexer(&input[base..]);

        while let Some(result) = lexer.next() {
            let span = base + lexer.span().start..base + lexer.span().end;
            let kind = match result {
                Ok(RawToken::And) => QueryTokenKind::And,
                Ok(RawToken::Or) => QueryTokenKind::Or,
                Ok(RawToken::Not) => QueryTokenKind::Not,
                Ok(RawToken::LParen) => QueryTokenKind::LParen,
                Ok(RawToken::RParen) => QueryTokenKind::RParen,
                Ok(RawToken::Word) => {
                    if let Some((kind, len)) = leading_operator(lexer.slice()) {
                        tokens.push(QueryToken::new(kind, span.start..span.start + len));
                        base = span.start + len;
                        continue 'restart;
                    }
                    QueryTokenKind::Term(lexer.slice().to_string())
                }
                Ok(RawToken::Quoted(QuotedKind::Unterminated)) => {
                    log::trace!("unterminated phrase near byte {}", span.start);
                    QueryTokenKind::Term(lexer.slice().to_string())
                }
                Ok(RawToken::Quoted(QuotedKind::Phrase)) => {
                    QueryTokenKind::Term(lexer.slice().to_string())
                }
                // Every non-whitespace character is covered by a rule above.
                Err(()) => QueryTokenKind::Term(lexer.slice().to_string()),
            };
            tokens.push(QueryToken::new(kind, span));
        }

        break;
    }

    tokens
}
