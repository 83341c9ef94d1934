use crate::configuration_item::ConfigurationItem;
use crate::error::EvaluationError;
use crate::guard::require;

const APPLICABLE_STATUSES: [&str; 2] = ["OK", "ResourceDiscovered"];

/// Whether the resource is still in scope for evaluation.
///
/// Deleted resources, and resources that left the rule scope, are not.
pub fn is_applicable(
    item: &ConfigurationItem,
    event_left_scope: Option<bool>,
) -> Result<bool, EvaluationError> {
    let status = require(
        item.configuration_item_status.as_deref(),
        "configurationItem.configurationItemStatus",
    )?;
    let event_left_scope = require(event_left_scope, "eventLeftScope")?;

    Ok(APPLICABLE_STATUSES.contains(&status) && !event_left_scope)
}
