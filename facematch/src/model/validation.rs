use thiserror::Error;

/// Raised when inbound data or a stored item does not have the shape the pipeline needs
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid value for field {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("Malformed payload: {0}")]
    MalformedPayload(String),
}

pub type ValidationResult<T> = Result<T, ValidationError>;
