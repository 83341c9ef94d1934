#![allow(dead_code)]

use compliance_rule_core::configuration_item::HistoryConfigurationItem;
use compliance_rule_core::contract::EvaluationRequest;
use serde_json::{json, Value};

pub const CAPTURE_TIME: &str = "2026-02-14T08:30:00.000Z";

pub fn instance_item(status: &str, instance_type: &str) -> Value {
    json!({
        "configurationItemVersion": "1.3",
        "configurationItemCaptureTime": CAPTURE_TIME,
        "configurationStateId": 1771057800000_u64,
        "awsAccountId": "123456789012",
        "configurationItemStatus": status,
        "resourceType": "AWS::EC2::Instance",
        "resourceId": "i-0abc123",
        "ARN": "arn:aws:ec2:eu-west-1:123456789012:instance/i-0abc123",
        "awsRegion": "eu-west-1",
        "configuration": { "instanceType": instance_type, "state": { "name": "running" } },
        "relationships": [{
            "resourceType": "AWS::EC2::SecurityGroup",
            "resourceId": "sg-0123",
            "name": "Is associated with SecurityGroup"
        }]
    })
}

pub fn inline_invoking_event(configuration_item: Value) -> String {
    json!({
        "messageType": "ConfigurationItemChangeNotification",
        "notificationCreationTime": CAPTURE_TIME,
        "recordVersion": "1.3",
        "configurationItem": configuration_item
    })
    .to_string()
}

pub fn oversized_invoking_event() -> String {
    json!({
        "messageType": "OversizedConfigurationChangeNotification",
        "notificationCreationTime": CAPTURE_TIME,
        "recordVersion": "1.0",
        "configurationItemSummary": {
            "changeType": "UPDATE",
            "configurationItemVersion": "1.3",
            "configurationItemCaptureTime": CAPTURE_TIME,
            "configurationStateId": 1771057800000_u64,
            "awsAccountId": "123456789012",
            "configurationItemStatus": "OK",
            "resourceType": "AWS::EC2::Instance",
            "resourceId": "i-0abc123",
            "ARN": "arn:aws:ec2:eu-west-1:123456789012:instance/i-0abc123",
            "awsRegion": "eu-west-1"
        }
    })
    .to_string()
}

pub fn history_instance_item(status: &str, instance_type: &str) -> HistoryConfigurationItem {
    serde_json::from_value(json!({
        "version": "1.3",
        "accountId": "123456789012",
        "configurationItemCaptureTime": CAPTURE_TIME,
        "configurationItemStatus": status,
        "configurationStateId": "1771057800000",
        "configurationItemMD5Hash": "",
        "arn": "arn:aws:ec2:eu-west-1:123456789012:instance/i-0abc123",
        "resourceType": "AWS::EC2::Instance",
        "resourceId": "i-0abc123",
        "awsRegion": "eu-west-1",
        "configuration": json!({ "instanceType": instance_type }).to_string(),
        "relationships": [{
            "resourceType": "AWS::EC2::SecurityGroup",
            "resourceId": "sg-0123",
            "relationshipName": "Is associated with SecurityGroup"
        }]
    }))
    .expect("history item should parse")
}

pub fn evaluation_request(
    invoking_event: String,
    desired_instance_type: &str,
) -> EvaluationRequest {
    EvaluationRequest {
        invoking_event: Some(invoking_event),
        rule_parameters: Some(json!({ "desiredInstanceType": desired_instance_type }).to_string()),
        result_token: Some("result-token-1".to_string()),
        event_left_scope: Some(false),
        config_rule_name: Some("desired-instance-type".to_string()),
        ..EvaluationRequest::default()
    }
}
