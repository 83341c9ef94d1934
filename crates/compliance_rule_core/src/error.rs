//! Error taxonomy for a single evaluation invocation.
//!
//! Every variant is terminal: the pipeline never recovers locally, it hands
//! the error back to the hosting platform as the invocation result.

use thiserror::Error;

/// Failure reported by a `ConfigService` adapter call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{operation} failed: {message}")]
pub struct ServiceError {
    pub operation: String,
    pub message: String,
}

impl ServiceError {
    pub fn new(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            message: message.into(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EvaluationError {
    /// An envelope field was absent or could not be parsed.
    #[error("malformed input in {field}: {message}")]
    MalformedInput { field: String, message: String },

    /// A required field was absent at a stage boundary.
    #[error("Error: {0} is not defined")]
    MissingField(String),

    /// The resource-history lookup failed.
    #[error("resource history lookup failed: {0}")]
    Lookup(ServiceError),

    /// The evaluation submission call itself failed.
    #[error("evaluation submission failed: {0}")]
    ReportTransport(ServiceError),

    /// The submission was acknowledged but contained failed evaluations.
    #[error("{0}")]
    ReportRejected(String),
}

impl EvaluationError {
    pub fn malformed(field: impl Into<String>, message: impl ToString) -> Self {
        Self::MalformedInput {
            field: field.into(),
            message: message.to_string(),
        }
    }

    /// Stable name of the error kind, used as a log field.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MalformedInput { .. } => "MalformedInputError",
            Self::MissingField(_) => "MissingFieldError",
            Self::Lookup(_) => "LookupError",
            Self::ReportTransport(_) => "ReportTransportError",
            Self::ReportRejected(_) => "ReportRejectedError",
        }
    }
}
