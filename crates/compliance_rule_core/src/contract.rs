use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::error::EvaluationError;

pub const OVERSIZED_MESSAGE_TYPE: &str = "OversizedConfigurationChangeNotification";
pub const HISTORY_LOOKUP_LIMIT: i32 = 1;
pub const EC2_INSTANCE_RESOURCE_TYPE: &str = "AWS::EC2::Instance";

pub type RuleParameters = BTreeMap<String, Value>;

/// Lambda payload delivered by the compliance service for one rule evaluation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationRequest {
    pub invoking_event: Option<String>,
    pub rule_parameters: Option<String>,
    pub result_token: Option<String>,
    pub event_left_scope: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_rule_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
}

impl EvaluationRequest {
    /// Parses the serialized rule parameters.
    ///
    /// A `null` document parses to `None`; the evaluator decides whether that
    /// is acceptable.
    pub fn parse_rule_parameters(&self) -> Result<Option<RuleParameters>, EvaluationError> {
        let Some(text) = self.rule_parameters.as_deref() else {
            return Err(EvaluationError::malformed(
                "ruleParameters",
                "field is absent",
            ));
        };
        serde_json::from_str::<Option<RuleParameters>>(text)
            .map_err(|error| EvaluationError::malformed("ruleParameters", error))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComplianceResult {
    Compliant,
    NonCompliant,
    NotApplicable,
}

impl ComplianceResult {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Compliant => "COMPLIANT",
            Self::NonCompliant => "NON_COMPLIANT",
            Self::NotApplicable => "NOT_APPLICABLE",
        }
    }
}

impl std::fmt::Display for ComplianceResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationOutcome {
    pub resource_type: String,
    pub resource_id: String,
    pub compliance_result: ComplianceResult,
    pub ordering_timestamp: DateTime<Utc>,
}

impl EvaluationOutcome {
    /// Builds the single-evaluation submission correlated by `result_token`.
    pub fn into_put_request(self, result_token: impl Into<String>) -> PutEvaluationsRequest {
        PutEvaluationsRequest {
            evaluations: vec![Evaluation {
                compliance_resource_type: self.resource_type,
                compliance_resource_id: self.resource_id,
                compliance_type: self.compliance_result.as_str().to_string(),
                ordering_timestamp: self.ordering_timestamp,
            }],
            result_token: result_token.into(),
        }
    }
}

/// Point-in-time query against the resource-history service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HistoryLookup {
    pub resource_type: String,
    pub resource_id: String,
    pub later_time: DateTime<Utc>,
    pub limit: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct Evaluation {
    pub compliance_resource_type: String,
    pub compliance_resource_id: String,
    pub compliance_type: String,
    pub ordering_timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct PutEvaluationsRequest {
    pub evaluations: Vec<Evaluation>,
    pub result_token: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct PutEvaluationsResponse {
    #[serde(default)]
    pub failed_evaluations: Vec<Evaluation>,
}

impl PutEvaluationsResponse {
    pub fn has_failures(&self) -> bool {
        !self.failed_evaluations.is_empty()
    }
}

/// Parses an RFC 3339 capture time into a UTC instant.
pub fn parse_capture_time(value: &str, field: &str) -> Result<DateTime<Utc>, EvaluationError> {
    DateTime::parse_from_rfc3339(value)
        .map(|time| time.with_timezone(&Utc))
        .map_err(|error| EvaluationError::malformed(field, error))
}

/// Short SHA-256 fingerprint of a result token, safe to put in logs.
pub fn result_token_fingerprint(result_token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(result_token.as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    digest[..12].to_string()
}
