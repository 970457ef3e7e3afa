//! Routes one custom-resource event to at most one capability call and folds
//! the result into a single terminal [`Outcome`].

use serde_json::{json, Map, Value};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::capability::{Capabilities, CapabilityError};
use crate::contract::{CustomResourceEvent, Outcome, RequestType};
use crate::metric::{MetricEventKind, MetricRecord};
use crate::operation::{
    is_pipeline_id, is_state_machine_arn, parse_properties, IdentitySpec, MetricSpec,
    NotificationSpec, PipelineSpec, ResourceKind, StateMachineSpec, WatermarkSpec,
};

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("invalid properties for {kind}: {source}")]
    InvalidProperties {
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("{kind} delete requires a PhysicalResourceId")]
    MissingPhysicalId { kind: &'static str },
    #[error("{kind} {action} failed: {source}")]
    Capability {
        kind: &'static str,
        action: &'static str,
        #[source]
        source: CapabilityError,
    },
}

/// What a branch hands back when its capability call settled successfully.
#[derive(Debug, Clone, Default, PartialEq)]
struct Completion {
    data: Option<Map<String, Value>>,
    physical_resource_id: Option<String>,
}

impl Completion {
    fn empty() -> Self {
        Self::default()
    }

    fn with_data(data: Value) -> Self {
        Self {
            data: as_map(data),
            physical_resource_id: None,
        }
    }

    fn with_physical_id(mut self, physical_resource_id: String) -> Self {
        self.physical_resource_id = Some(physical_resource_id);
        self
    }
}

fn as_map(value: Value) -> Option<Map<String, Value>> {
    match value {
        Value::Object(map) => Some(map),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    CreateStateMachine,
    DeleteStateMachine,
    ConfigureNotifications,
    SeedWatermark,
    CreateIdentity,
    CreatePipeline,
    DeletePipeline,
    CreatePresets,
    DeletePresets,
    SendMetric(MetricEventKind),
    GenerateUuid,
    Noop,
}

/// Pure routing table. Anything without a dedicated branch is a no-op that
/// still reports success.
pub fn plan(request_type: RequestType, kind: &ResourceKind) -> Action {
    match (request_type, kind) {
        (RequestType::Create, ResourceKind::StepFunction) => Action::CreateStateMachine,
        (RequestType::Create, ResourceKind::S3) => Action::ConfigureNotifications,
        (RequestType::Create, ResourceKind::Watermark) => Action::SeedWatermark,
        (RequestType::Create, ResourceKind::CloudFrontIdentity) => Action::CreateIdentity,
        (RequestType::Create, ResourceKind::Pipeline) => Action::CreatePipeline,
        (RequestType::Create, ResourceKind::Presets) => Action::CreatePresets,
        (RequestType::Create, ResourceKind::SendMetric) => {
            Action::SendMetric(MetricEventKind::Launched)
        }
        (RequestType::Create, ResourceKind::Uuid) => Action::GenerateUuid,
        (RequestType::Delete, ResourceKind::StepFunction) => Action::DeleteStateMachine,
        (RequestType::Delete, ResourceKind::Pipeline) => Action::DeletePipeline,
        (RequestType::Delete, ResourceKind::Presets) => Action::DeletePresets,
        (RequestType::Delete, ResourceKind::SendMetric) => {
            Action::SendMetric(MetricEventKind::Deleted)
        }
        _ => Action::Noop,
    }
}

pub struct Dispatcher {
    capabilities: Capabilities,
}

impl Dispatcher {
    pub fn new(capabilities: Capabilities) -> Self {
        Self { capabilities }
    }

    pub async fn dispatch(&self, event: &CustomResourceEvent) -> Outcome {
        let kind = ResourceKind::parse(event.resource_kind_name());
        let action = plan(event.request_type, &kind);

        if action == Action::Noop {
            info!(
                component = "dispatcher",
                event = "no_case_match",
                request_type = event.request_type.as_str(),
                resource = kind.as_str(),
                "no case match, sending success response"
            );
            return Outcome::success();
        }

        match self.execute(&action, event).await {
            Ok(completion) => {
                info!(
                    component = "dispatcher",
                    event = "action_succeeded",
                    action = ?action,
                    physical_resource_id = completion.physical_resource_id.as_deref()
                );
                Outcome::Success {
                    data: completion.data,
                    physical_resource_id: completion.physical_resource_id,
                }
            }
            Err(dispatch_error) => {
                error!(
                    component = "dispatcher",
                    event = "action_failed",
                    action = ?action,
                    error = %dispatch_error
                );
                Outcome::Failed
            }
        }
    }

    async fn execute(
        &self,
        action: &Action,
        event: &CustomResourceEvent,
    ) -> Result<Completion, DispatchError> {
        let caps = &self.capabilities;
        let properties = &event.resource_properties;

        match action {
            Action::CreateStateMachine => {
                let spec: StateMachineSpec = parse(properties, "StepFunction")?;
                let created = caps
                    .workflows
                    .create(&spec)
                    .await
                    .map_err(capability_failed("StepFunction", "create"))?;
                Ok(Completion::with_data(json!({ "StepsArn": created.arn.clone() }))
                    .with_physical_id(created.arn))
            }
            Action::DeleteStateMachine => {
                let arn = physical_id(event, "StepFunction")?;
                if !is_state_machine_arn(arn) {
                    return Ok(nothing_to_delete("StepFunction", arn));
                }
                caps.workflows
                    .delete(arn)
                    .await
                    .map_err(capability_failed("StepFunction", "delete"))?;
                Ok(Completion::empty())
            }
            Action::ConfigureNotifications => {
                let spec: NotificationSpec = parse(properties, "S3")?;
                caps.notifications
                    .configure(&spec)
                    .await
                    .map_err(capability_failed("S3", "configure"))?;
                Ok(Completion::empty())
            }
            Action::SeedWatermark => {
                let spec: WatermarkSpec = parse(properties, "Watermark")?;
                caps.seeder
                    .put(&spec.bucket, &spec.key)
                    .await
                    .map_err(capability_failed("Watermark", "put"))?;
                Ok(Completion::empty())
            }
            Action::CreateIdentity => {
                let spec: IdentitySpec = parse(properties, "CloudFrontIdentity")?;
                let caller_reference = caps.ids.generate();
                let created = caps
                    .identities
                    .create(&spec, &caller_reference)
                    .await
                    .map_err(capability_failed("CloudFrontIdentity", "create"))?;
                Ok(Completion::with_data(json!({
                    "Identity": created.id,
                    "S3CanonicalUserId": created.s3_canonical_user_id,
                })))
            }
            Action::CreatePipeline => {
                let spec: PipelineSpec = parse(properties, "Pipeline")?;
                let created = caps
                    .pipelines
                    .create(&spec)
                    .await
                    .map_err(capability_failed("Pipeline", "create"))?;
                Ok(Completion::with_data(json!({ "PipelineId": created.id.clone() }))
                    .with_physical_id(created.id))
            }
            Action::DeletePipeline => {
                let id = physical_id(event, "Pipeline")?;
                if !is_pipeline_id(id) {
                    return Ok(nothing_to_delete("Pipeline", id));
                }
                caps.pipelines
                    .delete(id)
                    .await
                    .map_err(capability_failed("Pipeline", "delete"))?;
                Ok(Completion::empty())
            }
            Action::CreatePresets => {
                let ids = caps
                    .presets
                    .create(event.stack_scope())
                    .await
                    .map_err(capability_failed("Presets", "create"))?;
                let data = ids
                    .into_iter()
                    .map(|(name, id)| (name, Value::String(id)))
                    .collect();
                Ok(Completion {
                    data: Some(data),
                    physical_resource_id: None,
                })
            }
            Action::DeletePresets => {
                caps.presets
                    .delete(event.stack_scope())
                    .await
                    .map_err(capability_failed("Presets", "delete"))?;
                Ok(Completion::empty())
            }
            Action::SendMetric(kind) => {
                let spec: MetricSpec = parse(properties, "SendMetric")?;
                let record = MetricRecord::new(&spec, *kind, caps.clock.now());
                // Usage data never decides the fate of a stack operation.
                match caps.telemetry.send(&record).await {
                    Ok(()) => info!(
                        component = "dispatcher",
                        event = "metric_sent",
                        solution = record.solution.as_str()
                    ),
                    Err(send_error) => warn!(
                        component = "dispatcher",
                        event = "metric_send_failed",
                        error = %send_error
                    ),
                }
                Ok(Completion::empty())
            }
            Action::GenerateUuid => {
                Ok(Completion::with_data(json!({ "UUID": caps.ids.generate() })))
            }
            Action::Noop => Ok(Completion::empty()),
        }
    }
}

fn parse<T: serde::de::DeserializeOwned>(
    properties: &crate::contract::ResourceProperties,
    kind: &'static str,
) -> Result<T, DispatchError> {
    parse_properties(properties).map_err(|source| DispatchError::InvalidProperties { kind, source })
}

fn physical_id<'a>(
    event: &'a CustomResourceEvent,
    kind: &'static str,
) -> Result<&'a str, DispatchError> {
    event
        .physical_resource_id
        .as_deref()
        .filter(|id| !id.trim().is_empty())
        .ok_or(DispatchError::MissingPhysicalId { kind })
}

/// A create that failed reported a placeholder id; there is nothing behind it.
fn nothing_to_delete(kind: &'static str, physical_resource_id: &str) -> Completion {
    info!(
        component = "dispatcher",
        event = "delete_skipped",
        resource = kind,
        physical_resource_id,
        "physical id does not name a provisioned resource"
    );
    Completion::empty()
}

fn capability_failed(
    kind: &'static str,
    action: &'static str,
) -> impl FnOnce(CapabilityError) -> DispatchError {
    move |source| DispatchError::Capability {
        kind,
        action,
        source,
    }
}
