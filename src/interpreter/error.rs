use compact_str::CompactString;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    #[error("undefined name `{0}`")]
    UndefinedName(CompactString),
    #[error("instance of `{class}` has no field `{field}`")]
    UndefinedField {
        class: CompactString,
        field: CompactString,
    },
    #[error("expected an instance but got {0}")]
    NotAnInstance(&'static str),
    #[error("class `{class}` has no method `{method}` taking {arity} arguments")]
    UndefinedMethod {
        class: CompactString,
        method: CompactString,
        arity: usize,
    },
    #[error("cannot compare {0} and {1} for equality")]
    IncomparableEquality(&'static str, &'static str),
    #[error("cannot compare {0} and {1} for ordering")]
    IncomparableOrdering(&'static str, &'static str),
    #[error("cannot add {0} and {1}")]
    NonAddable(&'static str, &'static str),
    #[error("expected two numbers but got {0} and {1}")]
    NonNumerics(&'static str, &'static str),
    #[error("division by zero")]
    DivisionByZero,
    #[error("{0} has no string representation")]
    NoStringRepresentation(&'static str),
    #[error("return outside of a method body")]
    ReturnOutsideMethod,
}
