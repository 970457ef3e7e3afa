use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const RESOURCE_KIND_PROPERTY: &str = "Resource";
pub const LOG_STREAM_REASON_PREFIX: &str = "See the details in CloudWatch Log Stream: ";

pub type ResourceProperties = Map<String, Value>;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RequestType {
    Create,
    Update,
    Delete,
}

impl RequestType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "Create",
            Self::Update => "Update",
            Self::Delete => "Delete",
        }
    }
}

/// Lifecycle event delivered by CloudFormation for a custom resource.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct CustomResourceEvent {
    pub request_type: RequestType,
    #[serde(rename = "ResponseURL")]
    pub response_url: String,
    pub stack_id: String,
    pub request_id: String,
    #[serde(default)]
    pub resource_type: String,
    pub logical_resource_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub physical_resource_id: Option<String>,
    #[serde(default)]
    pub resource_properties: ResourceProperties,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_resource_properties: Option<ResourceProperties>,
}

impl CustomResourceEvent {
    /// Raw operation kind named by the template, if any.
    pub fn resource_kind_name(&self) -> Option<&str> {
        self.resource_properties
            .get(RESOURCE_KIND_PROPERTY)
            .and_then(Value::as_str)
    }

    /// Unique per stack: the trailing GUID of `StackId`.
    pub fn stack_scope(&self) -> &str {
        self.stack_id.rsplit('/').next().unwrap_or(&self.stack_id)
    }
}

/// The addressing fields of an event, readable even when the rest of the
/// payload is not a valid [`CustomResourceEvent`].
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct ResponseTarget {
    #[serde(rename = "ResponseURL")]
    pub response_url: String,
    pub stack_id: String,
    pub request_id: String,
    #[serde(default)]
    pub logical_resource_id: String,
    #[serde(default)]
    pub physical_resource_id: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ResponseStatus {
    #[serde(rename = "SUCCESS")]
    Success,
    #[serde(rename = "FAILED")]
    Failed,
}

impl ResponseStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::Failed => "FAILED",
        }
    }
}

/// Terminal result of one dispatch. Failure detail is only ever logged.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Success {
        data: Option<Map<String, Value>>,
        physical_resource_id: Option<String>,
    },
    Failed,
}

impl Outcome {
    pub fn success() -> Self {
        Self::Success {
            data: None,
            physical_resource_id: None,
        }
    }

    pub fn status(&self) -> ResponseStatus {
        match self {
            Self::Success { .. } => ResponseStatus::Success,
            Self::Failed => ResponseStatus::Failed,
        }
    }
}

/// Body PUT to the pre-signed `ResponseURL`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct CustomResourceResponse {
    pub status: ResponseStatus,
    pub reason: String,
    pub physical_resource_id: String,
    pub stack_id: String,
    pub request_id: String,
    pub logical_resource_id: String,
    pub no_echo: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Map<String, Value>>,
}

impl CustomResourceResponse {
    /// The physical id falls back to the one CloudFormation already knows, then
    /// to the log stream, so updates and deletes never look like replacements.
    pub fn from_outcome(event: &CustomResourceEvent, outcome: Outcome, log_stream: &str) -> Self {
        let status = outcome.status();
        let (data, outcome_physical_id) = match outcome {
            Outcome::Success {
                data,
                physical_resource_id,
            } => (data, physical_resource_id),
            Outcome::Failed => (None, None),
        };

        let physical_resource_id = outcome_physical_id
            .or_else(|| event.physical_resource_id.clone())
            .unwrap_or_else(|| log_stream.to_string());

        Self {
            status,
            reason: format!("{LOG_STREAM_REASON_PREFIX}{log_stream}"),
            physical_resource_id,
            stack_id: event.stack_id.clone(),
            request_id: event.request_id.clone(),
            logical_resource_id: event.logical_resource_id.clone(),
            no_echo: false,
            data,
        }
    }
}

impl CustomResourceResponse {
    /// FAILED answer for a request that could not be understood.
    pub fn rejected(target: &ResponseTarget, log_stream: &str) -> Self {
        Self {
            status: ResponseStatus::Failed,
            reason: format!("{LOG_STREAM_REASON_PREFIX}{log_stream}"),
            physical_resource_id: target
                .physical_resource_id
                .clone()
                .unwrap_or_else(|| log_stream.to_string()),
            stack_id: target.stack_id.clone(),
            request_id: target.request_id.clone(),
            logical_resource_id: target.logical_resource_id.clone(),
            no_echo: false,
            data: None,
        }
    }
}
