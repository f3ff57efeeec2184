use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CarFinanceError {
    #[error("Invalid input: {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Arithmetic overflow in {0}")]
    Overflow(String),

    #[error("Date error: {0}")]
    DateError(String),

    #[error("Deal not found: {0}")]
    NotFound(String),

    #[error("Repository error: {0}")]
    Repository(String),
}

impl CarFinanceError {
    pub(crate) fn invalid(field: &str, reason: &str) -> Self {
        CarFinanceError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
