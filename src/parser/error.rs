use crate::lexer::{LexerError, Token};
use compact_str::CompactString;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParserErrorKind {
    #[error("expected {expected} but found {actual}")]
    UnexpectedToken {
        expected: &'static str,
        actual: Token,
    },
    #[error("expected an expression but found {0}")]
    NonExpression(Token),
    #[error("unknown class `{0}`")]
    UnknownClass(CompactString),
    #[error("invalid assignment target")]
    InvalidAssignmentTarget,
    #[error("{0}")]
    Lexical(#[from] LexerError),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("[line {line}] {kind}")]
pub struct ParserError {
    #[source]
    pub kind: ParserErrorKind,
    pub line: u32,
}
