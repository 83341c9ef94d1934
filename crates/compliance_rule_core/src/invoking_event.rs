use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::configuration_item::ConfigurationItem;
use crate::contract::OVERSIZED_MESSAGE_TYPE;
use crate::error::EvaluationError;

/// Minimal identity of a resource whose notification was too large to inline.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConfigurationItemSummary {
    pub resource_type: Option<String>,
    pub resource_id: Option<String>,
    pub configuration_item_capture_time: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InlineConfigurationChange {
    pub configuration_item: Option<ConfigurationItem>,
    pub message_type: Option<String>,
    pub notification_creation_time: Option<String>,
    pub record_version: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OversizedConfigurationChange {
    pub configuration_item_summary: Option<ConfigurationItemSummary>,
    pub message_type: Option<String>,
    pub notification_creation_time: Option<String>,
    pub record_version: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InvokingEvent {
    Inline(InlineConfigurationChange),
    Oversized(OversizedConfigurationChange),
}

impl InvokingEvent {
    /// Parses the serialized `invokingEvent` envelope field.
    ///
    /// Only the exact oversized message type selects the oversized shape;
    /// every other value, including an absent one, is read as inline.
    pub fn parse(serialized: Option<&str>) -> Result<Self, EvaluationError> {
        let Some(text) = serialized else {
            return Err(EvaluationError::malformed("invokingEvent", "field is absent"));
        };
        let value: Value = serde_json::from_str(text)
            .map_err(|error| EvaluationError::malformed("invokingEvent", error))?;
        if value.is_null() {
            return Err(EvaluationError::MissingField("invokingEvent".to_string()));
        }

        let oversized = value.get("messageType").and_then(Value::as_str)
            == Some(OVERSIZED_MESSAGE_TYPE);
        let event = if oversized {
            serde_json::from_value(value).map(Self::Oversized)
        } else {
            serde_json::from_value(value).map(Self::Inline)
        };
        event.map_err(|error| EvaluationError::malformed("invokingEvent", error))
    }
}
