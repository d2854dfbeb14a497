use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LexerErrorKind {
    #[error("incorrect number of margins")]
    OddIndentation,
    #[error("unterminated string literal")]
    UnterminatedString,
    #[error("unexpected character `{0}`")]
    UnexpectedCharacter(char),
    #[error("numeric literal does not fit in an integer")]
    OversizedNumber,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{kind}")]
pub struct LexerError {
    #[source]
    pub kind: LexerErrorKind,
    /// 1-based source line the error was found on.
    pub line: u32,
}
