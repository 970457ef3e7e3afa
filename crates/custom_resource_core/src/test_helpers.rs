//! Test helpers for exercising the dispatcher without AWS.
//!
//! [`FakeProvider`] implements every capability trait, records each call it
//! receives and fails any call named through [`FakeProvider::fail_on`].

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::{json, Map, Value};

use crate::capability::{
    BucketNotifications, Capabilities, CapabilityError, CdnIdentities, Clock, IdGenerator,
    IdentityCreated, ObjectSeeder, PipelineCreated, PresetIds, StateMachineCreated, Telemetry,
    TranscodingPipelines, TranscodingPresets, WorkflowDefinitions,
};
use crate::contract::{CustomResourceEvent, RequestType};
use crate::metric::MetricRecord;
use crate::operation::{IdentitySpec, NotificationSpec, PipelineSpec, StateMachineSpec};

pub const FAKE_RESPONSE_URL: &str =
    "https://cloudformation-custom-resource-response-useast1.s3.amazonaws.com/response";
pub const FAKE_STACK_ID: &str =
    "arn:aws:cloudformation:us-east-1:123456789012:stack/vod/5b918d10-2f2e-11f0-9c6c-0a1b2c3d4e5f";
pub const FAKE_STACK_SCOPE: &str = "5b918d10-2f2e-11f0-9c6c-0a1b2c3d4e5f";
pub const FAKE_UUID: &str = "1b4e28ba-2fa1-11d2-883f-0016d3cca427";
pub const FAKE_STATE_MACHINE_ARN: &str =
    "arn:aws:states:us-east-1:123456789012:stateMachine:ingest";
pub const FAKE_PIPELINE_ID: &str = "1111111111111-abcde1";
pub const FAKE_IDENTITY_ID: &str = "E2QWRUHAPOMQZL";
pub const FAKE_CANONICAL_USER_ID: &str =
    "b970b42360b81c8ddbd79d2f5df0069ba9033c8a79655752abe380cd6d63ba8bcf23384d568fcf89fc49700b5e11a0fd";

#[derive(Default)]
pub struct FakeProvider {
    calls: Mutex<Vec<String>>,
    metrics: Mutex<Vec<MetricRecord>>,
    failures: BTreeMap<&'static str, String>,
    pipeline_id: Option<String>,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the named call (e.g. `"presets.delete"`) reject with `message`.
    pub fn fail_on(mut self, call: &'static str, message: impl Into<String>) -> Self {
        self.failures.insert(call, message.into());
        self
    }

    pub fn with_pipeline_id(mut self, id: impl Into<String>) -> Self {
        self.pipeline_id = Some(id.into());
        self
    }

    pub fn capabilities(provider: &Arc<Self>) -> Capabilities {
        Capabilities {
            workflows: provider.clone(),
            notifications: provider.clone(),
            seeder: provider.clone(),
            identities: provider.clone(),
            pipelines: provider.clone(),
            presets: provider.clone(),
            telemetry: provider.clone(),
            ids: provider.clone(),
            clock: provider.clone(),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("poisoned mutex").clone()
    }

    /// Calls that reach a service; id generation and clock reads are excluded.
    pub fn service_calls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|call| !call.starts_with("ids.") && !call.starts_with("clock."))
            .collect()
    }

    pub fn sent_metrics(&self) -> Vec<MetricRecord> {
        self.metrics.lock().expect("poisoned mutex").clone()
    }

    fn record(&self, call: &'static str, detail: impl AsRef<str>) -> Result<(), CapabilityError> {
        let detail = detail.as_ref();
        let entry = if detail.is_empty() {
            call.to_string()
        } else {
            format!("{call}:{detail}")
        };
        self.calls.lock().expect("poisoned mutex").push(entry);

        match self.failures.get(call) {
            Some(message) => Err(CapabilityError::new(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl WorkflowDefinitions for FakeProvider {
    async fn create(
        &self,
        spec: &StateMachineSpec,
    ) -> Result<StateMachineCreated, CapabilityError> {
        self.record("workflows.create", &spec.name)?;
        Ok(StateMachineCreated {
            arn: FAKE_STATE_MACHINE_ARN.to_string(),
        })
    }

    async fn delete(&self, arn: &str) -> Result<(), CapabilityError> {
        self.record("workflows.delete", arn)
    }
}

#[async_trait]
impl BucketNotifications for FakeProvider {
    async fn configure(&self, spec: &NotificationSpec) -> Result<(), CapabilityError> {
        self.record("notifications.configure", &spec.bucket)
    }
}

#[async_trait]
impl ObjectSeeder for FakeProvider {
    async fn put(&self, bucket: &str, key: &str) -> Result<(), CapabilityError> {
        self.record("seeder.put", format!("{bucket}/{key}"))
    }
}

#[async_trait]
impl CdnIdentities for FakeProvider {
    async fn create(
        &self,
        _spec: &IdentitySpec,
        caller_reference: &str,
    ) -> Result<IdentityCreated, CapabilityError> {
        self.record("identities.create", caller_reference)?;
        Ok(IdentityCreated {
            id: FAKE_IDENTITY_ID.to_string(),
            s3_canonical_user_id: FAKE_CANONICAL_USER_ID.to_string(),
        })
    }
}

#[async_trait]
impl TranscodingPipelines for FakeProvider {
    async fn create(&self, spec: &PipelineSpec) -> Result<PipelineCreated, CapabilityError> {
        self.record("pipelines.create", &spec.name)?;
        Ok(PipelineCreated {
            id: self
                .pipeline_id
                .clone()
                .unwrap_or_else(|| FAKE_PIPELINE_ID.to_string()),
        })
    }

    async fn delete(&self, id: &str) -> Result<(), CapabilityError> {
        self.record("pipelines.delete", id)
    }
}

#[async_trait]
impl TranscodingPresets for FakeProvider {
    async fn create(&self, scope: &str) -> Result<PresetIds, CapabilityError> {
        self.record("presets.create", scope)?;
        Ok(PresetIds::from([
            ("Hls_720p".to_string(), "1351620000001-200010".to_string()),
            ("Mp4_1080p".to_string(), "1351620000001-100010".to_string()),
        ]))
    }

    async fn delete(&self, scope: &str) -> Result<(), CapabilityError> {
        self.record("presets.delete", scope)
    }
}

#[async_trait]
impl Telemetry for FakeProvider {
    async fn send(&self, record: &MetricRecord) -> Result<(), CapabilityError> {
        self.metrics
            .lock()
            .expect("poisoned mutex")
            .push(record.clone());
        self.record("telemetry.send", &record.solution)
    }
}

impl IdGenerator for FakeProvider {
    fn generate(&self) -> String {
        self.calls
            .lock()
            .expect("poisoned mutex")
            .push("ids.generate".to_string());
        FAKE_UUID.to_string()
    }
}

impl Clock for FakeProvider {
    fn now(&self) -> DateTime<Utc> {
        self.calls
            .lock()
            .expect("poisoned mutex")
            .push("clock.now".to_string());
        fixed_now()
    }
}

pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0)
        .single()
        .expect("fixed timestamp should be valid")
}

/// Build a CloudFormation event for `kind` with extra resource properties.
pub fn sample_event(
    request_type: RequestType,
    kind: &str,
    properties: Value,
) -> CustomResourceEvent {
    let mut resource_properties = match properties {
        Value::Object(map) => map,
        Value::Null => Map::new(),
        _ => panic!("resource properties must be a JSON object"),
    };
    resource_properties.insert(
        "ServiceToken".to_string(),
        json!("arn:aws:lambda:us-east-1:123456789012:function:custom-resource"),
    );
    resource_properties.insert("Resource".to_string(), json!(kind));

    CustomResourceEvent {
        request_type,
        response_url: FAKE_RESPONSE_URL.to_string(),
        stack_id: FAKE_STACK_ID.to_string(),
        request_id: "unique-request-id".to_string(),
        resource_type: format!("Custom::{kind}"),
        logical_resource_id: kind.to_string(),
        physical_resource_id: None,
        resource_properties,
        old_resource_properties: None,
    }
}
