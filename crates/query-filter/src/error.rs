#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error("expected query term near byte {position}")]
    ExpectedTerm { position: usize },

    #[error("expected query term but reached end of query")]
    UnexpectedEnd,

    #[error("missing closing ')' near byte {position}")]
    MissingCloseParen { position: usize },

    #[error("unexpected token near byte {position}")]
    UnexpectedToken { position: usize },

    #[error("query must contain at least one term")]
    NoTerms,

    #[error("query nesting exceeds limit of {limit}")]
    NestingTooDeep { limit: usize },
}

pub type Result<T> = std::result::Result<T, QueryError>;
