use gridflow_core::CellError;
use thiserror::Error;

/// Failure while lexing, parsing or evaluating an arithmetic expression
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExprError {
    #[error("unexpected character {ch:?} at position {position}")]
    UnexpectedChar { ch: char, position: usize },

    #[error("invalid number {text:?} at position {position}")]
    InvalidNumber { text: String, position: usize },

    #[error("unexpected token: {0}")]
    UnexpectedToken(String),

    #[error("division by zero")]
    DivisionByZero,

    #[error("result is not a finite number")]
    NonFinite,
}

impl From<ExprError> for CellError {
    fn from(err: ExprError) -> Self {
        match err {
            ExprError::UnexpectedChar { .. }
            | ExprError::InvalidNumber { .. }
            | ExprError::UnexpectedToken(_) => CellError::Syntax,
            ExprError::DivisionByZero => CellError::DivisionByZero,
            ExprError::NonFinite => CellError::NumError,
        }
    }
}
