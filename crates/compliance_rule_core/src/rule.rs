use serde_json::Value;

use crate::configuration_item::ConfigurationItem;
use crate::contract::{ComplianceResult, RuleParameters, EC2_INSTANCE_RESOURCE_TYPE};
use crate::error::EvaluationError;
use crate::guard::require;

/// Domain check applied to an applicable configuration item.
pub trait ComplianceRule: Send + Sync {
    fn evaluate(
        &self,
        item: &ConfigurationItem,
        configuration: &Value,
        parameters: &RuleParameters,
    ) -> ComplianceResult;
}

/// EC2 instances comply when their `instanceType` equals the
/// `desiredInstanceType` rule parameter. Other resource types are not
/// applicable.
#[derive(Debug, Default, Clone, Copy)]
pub struct DesiredInstanceTypeRule;

impl DesiredInstanceTypeRule {
    pub const PARAMETER: &'static str = "desiredInstanceType";
}

impl ComplianceRule for DesiredInstanceTypeRule {
    fn evaluate(
        &self,
        item: &ConfigurationItem,
        configuration: &Value,
        parameters: &RuleParameters,
    ) -> ComplianceResult {
        if item.resource_type.as_deref() != Some(EC2_INSTANCE_RESOURCE_TYPE) {
            return ComplianceResult::NotApplicable;
        }

        let desired = parameters.get(Self::PARAMETER);
        match (desired, configuration.get("instanceType")) {
            (Some(desired), Some(actual)) if desired == actual => ComplianceResult::Compliant,
            _ => ComplianceResult::NonCompliant,
        }
    }
}

/// Runs `rule` against an item the applicability filter already accepted.
pub fn evaluate_compliance(
    item: &ConfigurationItem,
    parameters: Option<&RuleParameters>,
    rule: &impl ComplianceRule,
) -> Result<ComplianceResult, EvaluationError> {
    let configuration = require(item.configuration.as_ref(), "configurationItem.configuration")?;
    let parameters = require(parameters, "ruleParameters")?;
    Ok(rule.evaluate(item, configuration, parameters))
}
