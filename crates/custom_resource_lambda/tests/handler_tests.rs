use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use custom_resource_core::contract::{CustomResourceResponse, RequestType, ResponseStatus};
use custom_resource_core::dispatcher::Dispatcher;
use custom_resource_core::test_helpers::{
    sample_event, FakeProvider, FAKE_RESPONSE_URL, FAKE_STACK_ID, FAKE_UUID,
};
use custom_resource_lambda::adapters::cfn_response::{ResponseError, ResponseSink};
use custom_resource_lambda::handlers::custom_resource::{
    handle_custom_resource_event, HandlerContext, HandlerError,
};
use serde_json::{json, Value};

const LOG_STREAM: &str = "2026/10/19/[$LATEST]0123456789abcdef";

#[derive(Default)]
struct RecordingSink {
    sent: Mutex<Vec<(String, CustomResourceResponse)>>,
    reject_with: Option<u16>,
}

impl RecordingSink {
    fn rejecting(status: u16) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            reject_with: Some(status),
        }
    }

    fn sent(&self) -> Vec<(String, CustomResourceResponse)> {
        self.sent.lock().expect("poisoned mutex").clone()
    }
}

#[async_trait]
impl ResponseSink for RecordingSink {
    async fn send(
        &self,
        response_url: &str,
        response: &CustomResourceResponse,
    ) -> Result<(), ResponseError> {
        self.sent
            .lock()
            .expect("poisoned mutex")
            .push((response_url.to_string(), response.clone()));
        match self.reject_with {
            Some(status) => Err(ResponseError::Rejected { status }),
            None => Ok(()),
        }
    }
}

fn context(provider: &Arc<FakeProvider>, sink: &Arc<RecordingSink>) -> HandlerContext {
    HandlerContext::new(
        Dispatcher::new(FakeProvider::capabilities(provider)),
        sink.clone(),
        LOG_STREAM,
    )
}

fn payload(request_type: RequestType, kind: &str, properties: Value) -> Value {
    serde_json::to_value(sample_event(request_type, kind, properties)).expect("event serializes")
}

#[tokio::test]
async fn pipeline_create_sends_one_success_response() {
    let provider = Arc::new(FakeProvider::new().with_pipeline_id("abc123"));
    let sink = Arc::new(RecordingSink::default());
    let event = payload(
        RequestType::Create,
        "Pipeline",
        json!({
            "Name": "vod-mp4",
            "Role": "arn:aws:iam::123456789012:role/ets",
            "InputBucket": "vod-source",
            "OutputBucket": "vod-mp4"
        }),
    );

    let summary = handle_custom_resource_event(event, &context(&provider, &sink))
        .await
        .expect("handler should succeed");

    assert_eq!(summary.status, ResponseStatus::Success);
    assert_eq!(summary.physical_resource_id, "abc123");

    let sent = sink.sent();
    assert_eq!(sent.len(), 1);
    let (url, response) = &sent[0];
    assert!(url.starts_with("https://cloudformation-custom-resource-response"));
    assert_eq!(response.status, ResponseStatus::Success);
    assert_eq!(response.physical_resource_id, "abc123");
    assert_eq!(response.logical_resource_id, "Pipeline");
    assert_eq!(response.request_id, "unique-request-id");
    assert_eq!(
        response.data.clone().map(Value::Object),
        Some(json!({"PipelineId": "abc123"}))
    );
}

#[tokio::test]
async fn capability_failure_sends_one_failed_response() {
    let provider = Arc::new(FakeProvider::new().fail_on("presets.delete", "quota exceeded"));
    let sink = Arc::new(RecordingSink::default());
    let mut event = sample_event(RequestType::Delete, "Presets", Value::Null);
    event.physical_resource_id = Some(LOG_STREAM.to_string());

    let summary = handle_custom_resource_event(
        serde_json::to_value(event).expect("event serializes"),
        &context(&provider, &sink),
    )
    .await
    .expect("a delivered failure is still a completed invocation");

    assert_eq!(summary.status, ResponseStatus::Failed);
    let sent = sink.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].1.status, ResponseStatus::Failed);
    assert!(sent[0].1.data.is_none());
    assert_eq!(
        sent[0].1.reason,
        format!("See the details in CloudWatch Log Stream: {LOG_STREAM}")
    );
}

#[tokio::test]
async fn unknown_kind_sends_success_with_log_stream_physical_id() {
    let provider = Arc::new(FakeProvider::new());
    let sink = Arc::new(RecordingSink::default());

    let summary = handle_custom_resource_event(
        payload(RequestType::Create, "UnknownThing", Value::Null),
        &context(&provider, &sink),
    )
    .await
    .expect("handler should succeed");

    assert_eq!(summary.status, ResponseStatus::Success);
    assert_eq!(summary.physical_resource_id, LOG_STREAM);
    assert_eq!(sink.sent().len(), 1);
    assert!(provider.calls().is_empty());
}

#[tokio::test]
async fn update_echoes_existing_physical_id() {
    let provider = Arc::new(FakeProvider::new());
    let sink = Arc::new(RecordingSink::default());
    let mut event = sample_event(RequestType::Update, "Pipeline", Value::Null);
    event.physical_resource_id = Some("abc123".to_string());

    let summary = handle_custom_resource_event(
        serde_json::to_value(event).expect("event serializes"),
        &context(&provider, &sink),
    )
    .await
    .expect("handler should succeed");

    assert_eq!(summary.status, ResponseStatus::Success);
    assert_eq!(summary.physical_resource_id, "abc123");
    assert!(provider.calls().is_empty());
}

#[tokio::test]
async fn telemetry_failure_still_sends_exactly_one_success() {
    let provider = Arc::new(FakeProvider::new().fail_on("telemetry.send", "timed out"));
    let sink = Arc::new(RecordingSink::default());

    let summary = handle_custom_resource_event(
        payload(
            RequestType::Create,
            "SendMetric",
            json!({"SolutionId": "SO0021", "UUID": FAKE_UUID, "Version": "1.0"}),
        ),
        &context(&provider, &sink),
    )
    .await
    .expect("handler should succeed");

    assert_eq!(summary.status, ResponseStatus::Success);
    let sent = sink.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].1.status, ResponseStatus::Success);
}

#[tokio::test]
async fn uuid_create_returns_generated_id_in_data() {
    let provider = Arc::new(FakeProvider::new());
    let sink = Arc::new(RecordingSink::default());

    handle_custom_resource_event(
        payload(RequestType::Create, "UUID", Value::Null),
        &context(&provider, &sink),
    )
    .await
    .expect("handler should succeed");

    let sent = sink.sent();
    assert_eq!(
        sent[0].1.data.clone().map(Value::Object),
        Some(json!({"UUID": FAKE_UUID}))
    );
}

#[tokio::test]
async fn delivery_rejection_surfaces_without_retrying() {
    let provider = Arc::new(FakeProvider::new());
    let sink = Arc::new(RecordingSink::rejecting(403));

    let error = handle_custom_resource_event(
        payload(RequestType::Create, "UnknownThing", Value::Null),
        &context(&provider, &sink),
    )
    .await
    .expect_err("rejected delivery should fail the invocation");

    assert!(matches!(
        error,
        HandlerError::Response(ResponseError::Rejected { status: 403 })
    ));
    assert_eq!(sink.sent().len(), 1);
}

#[tokio::test]
async fn malformed_event_is_rejected_before_dispatch() {
    let provider = Arc::new(FakeProvider::new());
    let sink = Arc::new(RecordingSink::default());

    let error = handle_custom_resource_event(
        json!({"RequestType": "Create", "ResourceProperties": {"Resource": "Pipeline"}}),
        &context(&provider, &sink),
    )
    .await
    .expect_err("event without ResponseURL should fail");

    assert!(matches!(error, HandlerError::InvalidEvent(_)));
    assert!(sink.sent().is_empty());
    assert!(provider.calls().is_empty());
}

#[tokio::test]
async fn unparseable_event_with_response_url_is_answered_failed() {
    let incomplete = json!({
        "RequestType": "Create",
        "ResponseURL": FAKE_RESPONSE_URL,
        "StackId": FAKE_STACK_ID,
        "RequestId": "unique-request-id",
        "ResourceProperties": {"Resource": "Pipeline"}
    });
    let unexpected_type = json!({
        "RequestType": "Replace",
        "ResponseURL": FAKE_RESPONSE_URL,
        "StackId": FAKE_STACK_ID,
        "RequestId": "unique-request-id",
        "LogicalResourceId": "Pipeline",
        "PhysicalResourceId": "1111111111111-abcde1",
        "ResourceProperties": {"Resource": "Pipeline"}
    });

    for (payload, expected_physical_id) in [
        (incomplete, LOG_STREAM),
        (unexpected_type, "1111111111111-abcde1"),
    ] {
        let provider = Arc::new(FakeProvider::new());
        let sink = Arc::new(RecordingSink::default());

        let summary = handle_custom_resource_event(payload, &context(&provider, &sink))
            .await
            .expect("an answered request is a completed invocation");

        assert_eq!(summary.status, ResponseStatus::Failed);
        let sent = sink.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, FAKE_RESPONSE_URL);
        assert_eq!(sent[0].1.status, ResponseStatus::Failed);
        assert_eq!(sent[0].1.stack_id, FAKE_STACK_ID);
        assert_eq!(sent[0].1.request_id, "unique-request-id");
        assert_eq!(sent[0].1.physical_resource_id, expected_physical_id);
        assert!(provider.calls().is_empty());
    }
}
