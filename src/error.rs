use thiserror::Error;

/// Errors produced while parsing an infix expression.
///
/// Positions are byte offsets into the expression after whitespace
/// stripping, since that is the form the parser consumes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("empty expression")]
    Empty,

    #[error("unexpected token at position {pos}")]
    TrailingInput { pos: usize },

    #[error("missing closing parenthesis at position {pos}")]
    UnclosedParen { pos: usize },

    #[error("invalid number at position {pos}")]
    InvalidNumber { pos: usize },

    #[error("invalid number format: {text}")]
    MalformedNumber { text: String },
}

/// Errors surfaced by coordinator operations.
///
/// Every operation returns one of these explicitly rather than panicking;
/// the transport layer maps each kind onto an HTTP status.
#[derive(Error, Debug)]
pub enum CoordError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("expression not found: {id}")]
    ExpressionNotFound { id: String },

    #[error("task not found: {id}")]
    TaskNotFound { id: String },

    #[error("no task available")]
    NoTaskAvailable,
}

/// Errors from actually performing a primitive operation.
///
/// Only workers evaluate operations; the coordinator never sees this type.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvalError {
    #[error("division by zero")]
    DivisionByZero,
}
