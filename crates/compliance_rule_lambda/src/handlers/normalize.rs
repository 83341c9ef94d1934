use compliance_rule_core::configuration_item::ConfigurationItem;
use compliance_rule_core::contract::{parse_capture_time, HistoryLookup, HISTORY_LOOKUP_LIMIT};
use compliance_rule_core::error::{EvaluationError, ServiceError};
use compliance_rule_core::guard::require;
use compliance_rule_core::invoking_event::{ConfigurationItemSummary, InvokingEvent};

use crate::adapters::config_service::{ConfigService, LOOKUP_HISTORY_OPERATION};

/// Resolves the full configuration item an invoking event refers to.
///
/// Inline events carry the item. Oversized events only carry a summary, so
/// the item as of the capture time is fetched from the resource history.
pub async fn resolve_configuration_item(
    event: InvokingEvent,
    service: &impl ConfigService,
) -> Result<ConfigurationItem, EvaluationError> {
    match event {
        InvokingEvent::Inline(change) => require(change.configuration_item, "configurationItem"),
        InvokingEvent::Oversized(change) => {
            let summary = require(change.configuration_item_summary, "configurationItemSummary")?;
            let lookup = history_lookup(summary)?;
            fetch_history_item(&lookup, service).await
        }
    }
}

fn history_lookup(summary: ConfigurationItemSummary) -> Result<HistoryLookup, EvaluationError> {
    let resource_type = require(summary.resource_type, "configurationItemSummary.resourceType")?;
    let resource_id = require(summary.resource_id, "configurationItemSummary.resourceId")?;
    let capture_time = require(
        summary.configuration_item_capture_time,
        "configurationItemSummary.configurationItemCaptureTime",
    )?;
    let later_time = parse_capture_time(
        &capture_time,
        "configurationItemSummary.configurationItemCaptureTime",
    )?;

    Ok(HistoryLookup {
        resource_type,
        resource_id,
        later_time,
        limit: HISTORY_LOOKUP_LIMIT,
    })
}

async fn fetch_history_item(
    lookup: &HistoryLookup,
    service: &impl ConfigService,
) -> Result<ConfigurationItem, EvaluationError> {
    tracing::debug!(
        resource_type = %lookup.resource_type,
        resource_id = %lookup.resource_id,
        later_time = %lookup.later_time,
        "fetching oversized configuration item from resource history"
    );

    let items = service
        .lookup_history(lookup)
        .await
        .map_err(EvaluationError::Lookup)?;
    let Some(latest) = items.into_iter().next() else {
        return Err(EvaluationError::Lookup(ServiceError::new(
            LOOKUP_HISTORY_OPERATION,
            format!(
                "no configuration items returned for {} {}",
                lookup.resource_type, lookup.resource_id
            ),
        )));
    };

    latest.into_configuration_item()
}
