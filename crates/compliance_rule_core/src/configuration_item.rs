//! Resource snapshots in both wire shapes.
//!
//! Change notifications carry a [`ConfigurationItem`] directly. Oversized
//! notifications only carry a summary, and the full item has to be fetched
//! from the resource-history API, which returns a [`HistoryConfigurationItem`]
//! with different field names and a serialized `configuration` payload.
//! [`HistoryConfigurationItem::into_configuration_item`] maps the latter into
//! the former so the rest of the pipeline only ever sees one shape.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::EvaluationError;

/// Reads an explicit `null` list as empty.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Passthrough metadata: scalars become strings, anything else is dropped.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => Some(text),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    })
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub resource_name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Resource snapshot as delivered inline in a change notification.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConfigurationItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub resource_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub configuration_item_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub configuration_item_capture_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub configuration: Option<Value>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub relationships: Vec<Relationship>,
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub aws_account_id: Option<String>,
    #[serde(
        rename = "ARN",
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub arn: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub configuration_state_md5_hash: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub configuration_item_version: Option<String>,
    // Numeric in notifications, string in the history API.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub configuration_state_id: Option<Value>,
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub aws_region: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub availability_zone: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub resource_creation_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_events: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supplementary_configuration: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRelationship {
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub relationship_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub resource_name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Resource snapshot as returned by the resource-history API.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HistoryConfigurationItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub resource_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub configuration_item_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub configuration_item_capture_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub configuration: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub relationships: Vec<HistoryRelationship>,
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub account_id: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub arn: Option<String>,
    #[serde(
        rename = "configurationItemMD5Hash",
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub configuration_item_md5_hash: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub configuration_state_id: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub aws_region: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub availability_zone: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub resource_creation_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_events: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supplementary_configuration: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl From<HistoryRelationship> for Relationship {
    fn from(relationship: HistoryRelationship) -> Self {
        Self {
            name: relationship.relationship_name,
            resource_type: relationship.resource_type,
            resource_id: relationship.resource_id,
            resource_name: relationship.resource_name,
            extra: relationship.extra,
        }
    }
}

impl HistoryConfigurationItem {
    /// Maps the history-API shape into the notification shape.
    ///
    /// Fails with `MalformedInput` when the serialized `configuration`
    /// payload is not valid JSON.
    pub fn into_configuration_item(self) -> Result<ConfigurationItem, EvaluationError> {
        let configuration = self
            .configuration
            .as_deref()
            .map(serde_json::from_str::<Value>)
            .transpose()
            .map_err(|error| EvaluationError::malformed("configurationItem.configuration", error))?;

        Ok(ConfigurationItem {
            resource_type: self.resource_type,
            resource_id: self.resource_id,
            resource_name: self.resource_name,
            configuration_item_status: self.configuration_item_status,
            configuration_item_capture_time: self.configuration_item_capture_time,
            configuration,
            relationships: self
                .relationships
                .into_iter()
                .map(Relationship::from)
                .collect(),
            aws_account_id: self.account_id,
            arn: self.arn,
            configuration_state_md5_hash: self.configuration_item_md5_hash,
            configuration_item_version: self.version,
            configuration_state_id: self.configuration_state_id.map(Value::String),
            aws_region: self.aws_region,
            availability_zone: self.availability_zone,
            resource_creation_time: self.resource_creation_time,
            tags: self.tags,
            related_events: self.related_events,
            supplementary_configuration: self.supplementary_configuration,
            extra: self.extra,
        })
    }
}
