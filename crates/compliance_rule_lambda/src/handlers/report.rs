use compliance_rule_core::contract::{EvaluationOutcome, PutEvaluationsResponse};
use compliance_rule_core::error::EvaluationError;

use crate::adapters::config_service::ConfigService;

/// Submits one evaluation correlated by `result_token`.
///
/// The acknowledgment is returned unmodified on success. An acknowledgment
/// listing failed evaluations is a rejection, serialized verbatim into the
/// error.
pub async fn report_outcome(
    outcome: EvaluationOutcome,
    result_token: &str,
    service: &impl ConfigService,
) -> Result<PutEvaluationsResponse, EvaluationError> {
    let request = outcome.into_put_request(result_token);
    let response = service
        .submit_evaluations(&request)
        .await
        .map_err(EvaluationError::ReportTransport)?;

    if response.has_failures() {
        let payload = serde_json::to_string(&response)
            .unwrap_or_else(|error| format!("{response:?} (serialization failed: {error})"));
        return Err(EvaluationError::ReportRejected(payload));
    }

    Ok(response)
}
