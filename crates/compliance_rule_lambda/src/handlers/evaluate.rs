use std::time::{Duration, Instant};

use compliance_rule_core::applicability::is_applicable;
use compliance_rule_core::configuration_item::ConfigurationItem;
use compliance_rule_core::contract::{
    parse_capture_time, result_token_fingerprint, ComplianceResult, EvaluationOutcome,
    EvaluationRequest, PutEvaluationsResponse, RuleParameters,
};
use compliance_rule_core::error::EvaluationError;
use compliance_rule_core::guard::require;
use compliance_rule_core::invoking_event::InvokingEvent;
use compliance_rule_core::rule::{evaluate_compliance, ComplianceRule};
use tracing::Instrument;

use crate::adapters::config_service::ConfigService;
use crate::handlers::normalize::resolve_configuration_item;
use crate::handlers::report::report_outcome;

/// Progress of one invocation, recorded as the `stage` field of log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvaluationStage {
    Received,
    Normalized,
    Applicable,
    Inapplicable,
    Evaluated,
    Reported,
    ReportFailed,
    ReportRejected,
    Failed,
}

impl EvaluationStage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Received => "RECEIVED",
            Self::Normalized => "NORMALIZED",
            Self::Applicable => "APPLICABLE",
            Self::Inapplicable => "INAPPLICABLE",
            Self::Evaluated => "EVALUATED",
            Self::Reported => "REPORTED",
            Self::ReportFailed => "REPORT_FAILED",
            Self::ReportRejected => "REPORT_REJECTED",
            Self::Failed => "FAILED",
        }
    }

    fn after_error(error: &EvaluationError) -> Self {
        match error {
            EvaluationError::ReportTransport(_) => Self::ReportFailed,
            EvaluationError::ReportRejected(_) => Self::ReportRejected,
            _ => Self::Failed,
        }
    }
}

/// Evaluates one request end to end and reports the outcome exactly once.
///
/// Any error is terminal for the invocation and nothing is submitted after
/// it; the caller hands it back to the platform.
pub async fn handle_evaluation_request(
    request: &EvaluationRequest,
    service: &impl ConfigService,
    rule: &impl ComplianceRule,
) -> Result<PutEvaluationsResponse, EvaluationError> {
    let started_at = Instant::now();
    let token_fingerprint = request
        .result_token
        .as_deref()
        .map(result_token_fingerprint)
        .unwrap_or_else(|| "absent".to_string());
    let span = tracing::info_span!(
        "evaluation",
        config_rule = request.config_rule_name.as_deref().unwrap_or("unknown"),
        account_id = request.account_id.as_deref().unwrap_or("unknown"),
        result_token = %token_fingerprint,
    );

    async move {
        tracing::info!(stage = EvaluationStage::Received.as_str(), "evaluation received");
        let result = evaluate_and_report(request, service, rule).await;
        let duration_ms = saturating_millis(started_at.elapsed());
        match &result {
            Ok(_) => tracing::info!(
                stage = EvaluationStage::Reported.as_str(),
                duration_ms,
                "evaluation reported"
            ),
            Err(error) => tracing::error!(
                stage = EvaluationStage::after_error(error).as_str(),
                error_kind = error.kind(),
                error = %error,
                duration_ms,
                "evaluation failed"
            ),
        }
        result
    }
    .instrument(span)
    .await
}

fn saturating_millis(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}

/// Compliance of a resolved item, with inapplicable items forced to
/// `NOT_APPLICABLE` before the rule runs.
pub fn determine_compliance(
    item: &ConfigurationItem,
    event_left_scope: Option<bool>,
    parameters: Option<&RuleParameters>,
    rule: &impl ComplianceRule,
) -> Result<ComplianceResult, EvaluationError> {
    if is_applicable(item, event_left_scope)? {
        tracing::debug!(stage = EvaluationStage::Applicable.as_str());
        evaluate_compliance(item, parameters, rule)
    } else {
        tracing::debug!(stage = EvaluationStage::Inapplicable.as_str());
        Ok(ComplianceResult::NotApplicable)
    }
}

async fn evaluate_and_report(
    request: &EvaluationRequest,
    service: &impl ConfigService,
    rule: &impl ComplianceRule,
) -> Result<PutEvaluationsResponse, EvaluationError> {
    let event = InvokingEvent::parse(request.invoking_event.as_deref())?;
    let parameters = request.parse_rule_parameters()?;

    let item = resolve_configuration_item(event, service).await?;
    let resource_type = require(item.resource_type.clone(), "configurationItem.resourceType")?;
    let resource_id = require(item.resource_id.clone(), "configurationItem.resourceId")?;
    tracing::info!(
        stage = EvaluationStage::Normalized.as_str(),
        resource_type = %resource_type,
        resource_id = %resource_id,
        status = item.configuration_item_status.as_deref().unwrap_or("absent"),
        "configuration item resolved"
    );

    let compliance_result =
        determine_compliance(&item, request.event_left_scope, parameters.as_ref(), rule)?;
    tracing::info!(
        stage = EvaluationStage::Evaluated.as_str(),
        compliance = compliance_result.as_str(),
        "compliance evaluated"
    );

    let capture_time = require(
        item.configuration_item_capture_time.as_deref(),
        "configurationItem.configurationItemCaptureTime",
    )?;
    let ordering_timestamp =
        parse_capture_time(capture_time, "configurationItem.configurationItemCaptureTime")?;
    let result_token = require(request.result_token.as_deref(), "resultToken")?;

    let outcome = EvaluationOutcome {
        resource_type,
        resource_id,
        compliance_result,
        ordering_timestamp,
    };
    report_outcome(outcome, result_token, service).await
}
