mod support;

use chrono::{TimeZone, Utc};
use compliance_rule_core::contract::{Evaluation, EvaluationRequest, PutEvaluationsResponse};
use compliance_rule_core::error::{EvaluationError, ServiceError};
use compliance_rule_core::rule::DesiredInstanceTypeRule;
use compliance_rule_lambda::handlers::evaluate::handle_evaluation_request;
use serde_json::{json, Value};
use support::events::{
    evaluation_request, history_instance_item, inline_invoking_event, instance_item,
    oversized_invoking_event,
};
use support::service::RecordingConfigService;

#[tokio::test]
async fn matching_instance_is_reported_compliant() {
    let service = RecordingConfigService::new();
    let request = evaluation_request(
        inline_invoking_event(instance_item("OK", "m5.large")),
        "m5.large",
    );

    let acknowledgment = handle_evaluation_request(&request, &service, &DesiredInstanceTypeRule)
        .await
        .expect("evaluation should be reported");

    assert_eq!(acknowledgment, PutEvaluationsResponse::default());
    let submissions = service.submissions();
    assert_eq!(submissions.len(), 1);
    let submitted = serde_json::to_value(&submissions[0]).expect("submission should serialize");
    assert_eq!(
        submitted,
        json!({
            "Evaluations": [{
                "ComplianceResourceType": "AWS::EC2::Instance",
                "ComplianceResourceId": "i-0abc123",
                "ComplianceType": "COMPLIANT",
                "OrderingTimestamp": "2026-02-14T08:30:00Z"
            }],
            "ResultToken": "result-token-1"
        })
    );
    assert!(service.lookups().is_empty());
}

#[tokio::test]
async fn different_instance_type_is_reported_non_compliant() {
    let service = RecordingConfigService::new();
    let request = evaluation_request(
        inline_invoking_event(instance_item("OK", "t2.micro")),
        "m5.large",
    );

    handle_evaluation_request(&request, &service, &DesiredInstanceTypeRule)
        .await
        .expect("evaluation should be reported");

    assert_eq!(
        service.submissions()[0].evaluations[0].compliance_type,
        "NON_COMPLIANT"
    );
}

#[tokio::test]
async fn deleted_resource_is_reported_not_applicable() {
    let service = RecordingConfigService::new();
    let mut item = instance_item("ResourceDeleted", "t2.micro");
    item["configuration"] = Value::Null;
    let request = evaluation_request(inline_invoking_event(item), "m5.large");

    handle_evaluation_request(&request, &service, &DesiredInstanceTypeRule)
        .await
        .expect("evaluation should be reported");

    let submissions = service.submissions();
    assert_eq!(submissions.len(), 1);
    assert_eq!(submissions[0].evaluations[0].compliance_type, "NOT_APPLICABLE");
}

#[tokio::test]
async fn deletion_notification_with_null_metadata_is_reported_not_applicable() {
    let service = RecordingConfigService::new();
    let mut item = instance_item("ResourceDeleted", "t2.micro");
    item["configuration"] = Value::Null;
    item["relationships"] = Value::Null;
    item["ARN"] = Value::Null;
    item["resourceName"] = Value::Null;
    let request = evaluation_request(inline_invoking_event(item), "m5.large");

    handle_evaluation_request(&request, &service, &DesiredInstanceTypeRule)
        .await
        .expect("evaluation should be reported");

    let submissions = service.submissions();
    assert_eq!(submissions.len(), 1);
    assert_eq!(submissions[0].evaluations[0].compliance_type, "NOT_APPLICABLE");
    assert_eq!(submissions[0].evaluations[0].compliance_resource_id, "i-0abc123");
}

#[tokio::test]
async fn resource_leaving_scope_is_reported_not_applicable() {
    let service = RecordingConfigService::new();
    let request = EvaluationRequest {
        event_left_scope: Some(true),
        ..evaluation_request(
            inline_invoking_event(instance_item("OK", "m5.large")),
            "m5.large",
        )
    };

    handle_evaluation_request(&request, &service, &DesiredInstanceTypeRule)
        .await
        .expect("evaluation should be reported");

    assert_eq!(
        service.submissions()[0].evaluations[0].compliance_type,
        "NOT_APPLICABLE"
    );
}

#[tokio::test]
async fn non_instance_resource_is_not_applicable() {
    let service = RecordingConfigService::new();
    let mut item = instance_item("OK", "m5.large");
    item["resourceType"] = json!("AWS::EC2::SecurityGroup");
    item["resourceId"] = json!("sg-0123");
    let request = evaluation_request(inline_invoking_event(item), "m5.large");

    handle_evaluation_request(&request, &service, &DesiredInstanceTypeRule)
        .await
        .expect("evaluation should be reported");

    let evaluation = &service.submissions()[0].evaluations[0];
    assert_eq!(evaluation.compliance_resource_type, "AWS::EC2::SecurityGroup");
    assert_eq!(evaluation.compliance_type, "NOT_APPLICABLE");
}

#[tokio::test]
async fn oversized_notification_is_resolved_from_history() {
    let service = RecordingConfigService::new()
        .with_history(Ok(vec![history_instance_item("OK", "m5.large")]));
    let request = evaluation_request(oversized_invoking_event(), "m5.large");

    handle_evaluation_request(&request, &service, &DesiredInstanceTypeRule)
        .await
        .expect("evaluation should be reported");

    let lookups = service.lookups();
    assert_eq!(lookups.len(), 1);
    assert_eq!(lookups[0].resource_type, "AWS::EC2::Instance");
    assert_eq!(lookups[0].resource_id, "i-0abc123");
    assert_eq!(
        lookups[0].later_time,
        Utc.with_ymd_and_hms(2026, 2, 14, 8, 30, 0).unwrap()
    );
    assert_eq!(lookups[0].limit, 1);

    let submissions = service.submissions();
    assert_eq!(submissions.len(), 1);
    assert_eq!(submissions[0].evaluations[0].compliance_type, "COMPLIANT");
}

#[tokio::test]
async fn missing_configuration_item_fails_without_submission() {
    let service = RecordingConfigService::new();
    let request = evaluation_request(
        json!({ "messageType": "ConfigurationItemChangeNotification" }).to_string(),
        "m5.large",
    );

    let error = handle_evaluation_request(&request, &service, &DesiredInstanceTypeRule)
        .await
        .expect_err("evaluation should fail");

    assert_eq!(
        error,
        EvaluationError::MissingField("configurationItem".to_string())
    );
    assert!(service.submissions().is_empty());
}

#[tokio::test]
async fn lookup_failure_fails_without_submission() {
    let failure = ServiceError::new("GetResourceConfigHistory", "ThrottlingException");
    let service = RecordingConfigService::new().with_history(Err(failure.clone()));
    let request = evaluation_request(oversized_invoking_event(), "m5.large");

    let error = handle_evaluation_request(&request, &service, &DesiredInstanceTypeRule)
        .await
        .expect_err("evaluation should fail");

    assert_eq!(error, EvaluationError::Lookup(failure));
    assert_eq!(service.lookups().len(), 1);
    assert!(service.submissions().is_empty());
}

#[tokio::test]
async fn unparseable_envelope_fields_are_malformed() {
    let service = RecordingConfigService::new();
    let bad_event = EvaluationRequest {
        invoking_event: Some("{not json".to_string()),
        ..evaluation_request(String::new(), "m5.large")
    };
    let bad_parameters = EvaluationRequest {
        rule_parameters: None,
        ..evaluation_request(
            inline_invoking_event(instance_item("OK", "m5.large")),
            "m5.large",
        )
    };

    for request in [bad_event, bad_parameters] {
        let error = handle_evaluation_request(&request, &service, &DesiredInstanceTypeRule)
            .await
            .expect_err("evaluation should fail");
        assert_eq!(error.kind(), "MalformedInputError");
    }
    assert!(service.submissions().is_empty());
}

#[tokio::test]
async fn missing_scope_flag_fails_before_submission() {
    let service = RecordingConfigService::new();
    let request = EvaluationRequest {
        event_left_scope: None,
        ..evaluation_request(
            inline_invoking_event(instance_item("OK", "m5.large")),
            "m5.large",
        )
    };

    let error = handle_evaluation_request(&request, &service, &DesiredInstanceTypeRule)
        .await
        .expect_err("evaluation should fail");

    assert_eq!(error, EvaluationError::MissingField("eventLeftScope".to_string()));
    assert!(service.submissions().is_empty());
}

#[tokio::test]
async fn missing_result_token_fails_before_submission() {
    let service = RecordingConfigService::new();
    let request = EvaluationRequest {
        result_token: None,
        ..evaluation_request(
            inline_invoking_event(instance_item("OK", "m5.large")),
            "m5.large",
        )
    };

    let error = handle_evaluation_request(&request, &service, &DesiredInstanceTypeRule)
        .await
        .expect_err("evaluation should fail");

    assert_eq!(error, EvaluationError::MissingField("resultToken".to_string()));
    assert!(service.submissions().is_empty());
}

#[tokio::test]
async fn rejected_submission_fails_even_though_transport_succeeded() {
    let rejected = Evaluation {
        compliance_resource_type: "AWS::EC2::Instance".to_string(),
        compliance_resource_id: "i-0abc123".to_string(),
        compliance_type: "COMPLIANT".to_string(),
        ordering_timestamp: Utc.with_ymd_and_hms(2026, 2, 14, 8, 30, 0).unwrap(),
    };
    let service = RecordingConfigService::new().with_acknowledgment(Ok(PutEvaluationsResponse {
        failed_evaluations: vec![rejected],
    }));
    let request = evaluation_request(
        inline_invoking_event(instance_item("OK", "m5.large")),
        "m5.large",
    );

    let error = handle_evaluation_request(&request, &service, &DesiredInstanceTypeRule)
        .await
        .expect_err("evaluation should be rejected");

    assert_eq!(error.kind(), "ReportRejectedError");
    let payload: Value = serde_json::from_str(&error.to_string()).expect("payload should be json");
    assert_eq!(
        payload["FailedEvaluations"][0]["ComplianceResourceId"],
        json!("i-0abc123")
    );
    assert_eq!(service.submissions().len(), 1);
}

#[tokio::test]
async fn transport_failure_is_surfaced_after_single_attempt() {
    let failure = ServiceError::new("PutEvaluations", "connection reset by peer");
    let service = RecordingConfigService::new().with_acknowledgment(Err(failure.clone()));
    let request = evaluation_request(
        inline_invoking_event(instance_item("OK", "m5.large")),
        "m5.large",
    );

    let error = handle_evaluation_request(&request, &service, &DesiredInstanceTypeRule)
        .await
        .expect_err("evaluation should fail");

    assert_eq!(error, EvaluationError::ReportTransport(failure));
    assert_eq!(service.submissions().len(), 1);
}

#[tokio::test]
async fn platform_payload_deserializes_into_request() {
    let service = RecordingConfigService::new();
    let payload = json!({
        "version": "1.0",
        "invokingEvent": inline_invoking_event(instance_item("OK", "m5.large")),
        "ruleParameters": "{\"desiredInstanceType\":\"m5.large\"}",
        "resultToken": "result-token-1",
        "eventLeftScope": false,
        "executionRoleArn": "arn:aws:iam::123456789012:role/config-role",
        "configRuleArn": "arn:aws:config:eu-west-1:123456789012:config-rule/config-rule-abc",
        "configRuleName": "desired-instance-type",
        "configRuleId": "config-rule-abc",
        "accountId": "123456789012"
    });
    let request: EvaluationRequest =
        serde_json::from_value(payload).expect("payload should deserialize");

    handle_evaluation_request(&request, &service, &DesiredInstanceTypeRule)
        .await
        .expect("evaluation should be reported");

    assert_eq!(service.submissions()[0].result_token, "result-token-1");
}
