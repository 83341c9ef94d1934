use std::collections::HashMap;

use async_trait::async_trait;
use aws_config::retry::RetryConfig;
use aws_config::{BehaviorVersion, ConfigLoader};
use aws_sdk_config::error::DisplayErrorContext;
use aws_sdk_config::primitives::{DateTime, DateTimeFormat};
use aws_sdk_config::types::{ComplianceType, ResourceType};
use compliance_rule_core::configuration_item::{HistoryConfigurationItem, HistoryRelationship};
use compliance_rule_core::contract::{
    Evaluation, EvaluationRequest, HistoryLookup, PutEvaluationsRequest, PutEvaluationsResponse,
};
use compliance_rule_core::error::{EvaluationError, ServiceError};
use compliance_rule_core::rule::DesiredInstanceTypeRule;
use compliance_rule_lambda::adapters::config_service::{
    ConfigService, LOOKUP_HISTORY_OPERATION, SUBMIT_EVALUATIONS_OPERATION,
};
use compliance_rule_lambda::config::RuntimeConfig;
use compliance_rule_lambda::handlers::evaluate::handle_evaluation_request;
use compliance_rule_lambda::telemetry::init_tracing;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::{Map, Value};

struct AwsConfigService {
    client: aws_sdk_config::Client,
}

#[async_trait]
impl ConfigService for AwsConfigService {
    async fn lookup_history(
        &self,
        lookup: &HistoryLookup,
    ) -> Result<Vec<HistoryConfigurationItem>, ServiceError> {
        let output = self
            .client
            .get_resource_config_history()
            .resource_type(ResourceType::from(lookup.resource_type.as_str()))
            .resource_id(lookup.resource_id.clone())
            .later_time(DateTime::from_millis(lookup.later_time.timestamp_millis()))
            .limit(lookup.limit)
            .send()
            .await
            .map_err(|error| {
                ServiceError::new(
                    LOOKUP_HISTORY_OPERATION,
                    DisplayErrorContext(&error).to_string(),
                )
            })?;

        output
            .configuration_items()
            .iter()
            .map(history_item_from_sdk)
            .collect()
    }

    async fn submit_evaluations(
        &self,
        request: &PutEvaluationsRequest,
    ) -> Result<PutEvaluationsResponse, ServiceError> {
        let evaluations = request
            .evaluations
            .iter()
            .map(evaluation_to_sdk)
            .collect::<Result<Vec<_>, _>>()?;

        let output = self
            .client
            .put_evaluations()
            .set_evaluations(Some(evaluations))
            .result_token(request.result_token.clone())
            .send()
            .await
            .map_err(|error| {
                ServiceError::new(
                    SUBMIT_EVALUATIONS_OPERATION,
                    DisplayErrorContext(&error).to_string(),
                )
            })?;

        let failed_evaluations = output
            .failed_evaluations()
            .iter()
            .map(evaluation_from_sdk)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(PutEvaluationsResponse { failed_evaluations })
    }
}

fn history_item_from_sdk(
    item: &aws_sdk_config::types::ConfigurationItem,
) -> Result<HistoryConfigurationItem, ServiceError> {
    Ok(HistoryConfigurationItem {
        resource_type: item.resource_type().map(|value| value.as_str().to_string()),
        resource_id: item.resource_id().map(str::to_string),
        resource_name: item.resource_name().map(str::to_string),
        configuration_item_status: item
            .configuration_item_status()
            .map(|value| value.as_str().to_string()),
        configuration_item_capture_time: item
            .configuration_item_capture_time()
            .map(format_time)
            .transpose()?,
        configuration: item.configuration().map(str::to_string),
        relationships: item
            .relationships()
            .iter()
            .map(|relationship| HistoryRelationship {
                relationship_name: relationship.relationship_name().map(str::to_string),
                resource_type: relationship
                    .resource_type()
                    .map(|value| value.as_str().to_string()),
                resource_id: relationship.resource_id().map(str::to_string),
                resource_name: relationship.resource_name().map(str::to_string),
                extra: Map::new(),
            })
            .collect(),
        account_id: item.account_id().map(str::to_string),
        arn: item.arn().map(str::to_string),
        configuration_item_md5_hash: item.configuration_item_md5_hash().map(str::to_string),
        version: item.version().map(str::to_string),
        configuration_state_id: item.configuration_state_id().map(str::to_string),
        aws_region: item.aws_region().map(str::to_string),
        availability_zone: item.availability_zone().map(str::to_string),
        resource_creation_time: item.resource_creation_time().map(format_time).transpose()?,
        tags: item.tags().map(string_map_to_json),
        related_events: Some(Value::Array(
            item.related_events()
                .iter()
                .cloned()
                .map(Value::String)
                .collect(),
        )),
        supplementary_configuration: item.supplementary_configuration().map(string_map_to_json),
        extra: Map::new(),
    })
}

fn evaluation_to_sdk(
    evaluation: &Evaluation,
) -> Result<aws_sdk_config::types::Evaluation, ServiceError> {
    aws_sdk_config::types::Evaluation::builder()
        .compliance_resource_type(evaluation.compliance_resource_type.clone())
        .compliance_resource_id(evaluation.compliance_resource_id.clone())
        .compliance_type(ComplianceType::from(evaluation.compliance_type.as_str()))
        .ordering_timestamp(DateTime::from_millis(
            evaluation.ordering_timestamp.timestamp_millis(),
        ))
        .build()
        .map_err(|error| ServiceError::new(SUBMIT_EVALUATIONS_OPERATION, error.to_string()))
}

fn evaluation_from_sdk(
    evaluation: &aws_sdk_config::types::Evaluation,
) -> Result<Evaluation, ServiceError> {
    let millis = evaluation
        .ordering_timestamp()
        .to_millis()
        .map_err(|error| ServiceError::new(SUBMIT_EVALUATIONS_OPERATION, error.to_string()))?;
    let ordering_timestamp = chrono::DateTime::<chrono::Utc>::from_timestamp_millis(millis)
        .ok_or_else(|| {
            ServiceError::new(
                SUBMIT_EVALUATIONS_OPERATION,
                format!("ordering timestamp out of range: {millis}"),
            )
        })?;

    Ok(Evaluation {
        compliance_resource_type: evaluation.compliance_resource_type().to_string(),
        compliance_resource_id: evaluation.compliance_resource_id().to_string(),
        compliance_type: evaluation.compliance_type().as_str().to_string(),
        ordering_timestamp,
    })
}

fn format_time(time: &DateTime) -> Result<String, ServiceError> {
    time.fmt(DateTimeFormat::DateTime)
        .map_err(|error| ServiceError::new(LOOKUP_HISTORY_OPERATION, error.to_string()))
}

fn string_map_to_json(map: &HashMap<String, String>) -> Value {
    Value::Object(
        map.iter()
            .map(|(key, value)| (key.clone(), Value::String(value.clone())))
            .collect(),
    )
}

async fn handle_request(
    event: LambdaEvent<Value>,
    service: &AwsConfigService,
) -> Result<PutEvaluationsResponse, Error> {
    let request: EvaluationRequest = serde_json::from_value(event.payload)
        .map_err(|error| EvaluationError::malformed("event", error))?;

    let response = handle_evaluation_request(&request, service, &DesiredInstanceTypeRule).await?;
    Ok(response)
}

/// Each invocation makes at most one attempt per call; the platform owns retries.
fn sdk_config_loader() -> ConfigLoader {
    aws_config::defaults(BehaviorVersion::latest()).retry_config(RetryConfig::disabled())
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let config = RuntimeConfig::from_env()?;
    init_tracing(&config);

    let aws_config = sdk_config_loader().load().await;
    let service = AwsConfigService {
        client: aws_sdk_config::Client::new(&aws_config),
    };
    let service = &service;

    lambda_runtime::run(service_fn(move |event| async move {
        handle_request(event, service).await
    }))
    .await
}
