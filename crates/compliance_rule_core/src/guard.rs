use crate::error::EvaluationError;

/// Returns the value when present, otherwise `MissingField(field)`.
///
/// Stages call this once per required field in order, so the first missing
/// field is the one reported.
pub fn require<T>(value: Option<T>, field: &str) -> Result<T, EvaluationError> {
    value.ok_or_else(|| EvaluationError::MissingField(field.to_string()))
}
