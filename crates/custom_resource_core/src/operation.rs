//! Operation kinds a template can request and the parameters each one reads
//! from `ResourceProperties`.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::contract::ResourceProperties;

pub const DEFAULT_SOURCE_SUFFIXES: [&str; 5] = ["mpg", "mp4", "m4v", "mov", "m2ts"];
pub const DEFAULT_WATERMARK_KEY: &str = "watermarks/aws-logo.png";
pub const DEFAULT_IDENTITY_COMMENT: &str = "access identity for the video delivery distribution";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceKind {
    StepFunction,
    S3,
    Watermark,
    CloudFrontIdentity,
    Pipeline,
    Presets,
    SendMetric,
    Uuid,
    Unknown(String),
}

impl ResourceKind {
    /// A missing kind is treated like any other unrecognized one.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("StepFunction") => Self::StepFunction,
            Some("S3") => Self::S3,
            Some("Watermark") => Self::Watermark,
            Some("CloudFrontIdentity") => Self::CloudFrontIdentity,
            Some("Pipeline") => Self::Pipeline,
            Some("Presets") => Self::Presets,
            Some("SendMetric") => Self::SendMetric,
            Some("UUID") => Self::Uuid,
            Some(other) => Self::Unknown(other.to_string()),
            None => Self::Unknown(String::new()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::StepFunction => "StepFunction",
            Self::S3 => "S3",
            Self::Watermark => "Watermark",
            Self::CloudFrontIdentity => "CloudFrontIdentity",
            Self::Pipeline => "Pipeline",
            Self::Presets => "Presets",
            Self::SendMetric => "SendMetric",
            Self::Uuid => "UUID",
            Self::Unknown(name) => name,
        }
    }
}

/// Decode the kind-specific parameters; unrelated keys such as `ServiceToken`
/// and `Resource` are ignored.
pub fn parse_properties<T: DeserializeOwned>(
    properties: &ResourceProperties,
) -> Result<T, serde_json::Error> {
    serde_json::from_value(Value::Object(properties.clone()))
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct StateMachineSpec {
    pub name: String,
    pub role_arn: String,
    pub definition: Value,
}

impl StateMachineSpec {
    /// Templates may pass the definition inline as an object or pre-rendered.
    pub fn definition_json(&self) -> String {
        match &self.definition {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct NotificationSpec {
    #[serde(rename = "Source")]
    pub bucket: String,
    /// Falls back to the function configured at startup when absent.
    #[serde(rename = "IngestArn", default)]
    pub target_arn: Option<String>,
    #[serde(default = "default_source_suffixes")]
    pub suffixes: Vec<String>,
}

fn default_source_suffixes() -> Vec<String> {
    DEFAULT_SOURCE_SUFFIXES
        .iter()
        .map(|suffix| suffix.to_string())
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct WatermarkSpec {
    #[serde(rename = "Source")]
    pub bucket: String,
    #[serde(default = "default_watermark_key")]
    pub key: String,
}

fn default_watermark_key() -> String {
    DEFAULT_WATERMARK_KEY.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct IdentitySpec {
    #[serde(default = "default_identity_comment")]
    pub comment: String,
}

fn default_identity_comment() -> String {
    DEFAULT_IDENTITY_COMMENT.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct PipelineSpec {
    pub name: String,
    pub role: String,
    pub input_bucket: String,
    pub output_bucket: String,
    #[serde(default)]
    pub sns_topic: Option<String>,
}

/// Whether `id` could have been returned by `CreateStateMachine`. A failed
/// create reports the log stream name instead, which never matches.
pub fn is_state_machine_arn(id: &str) -> bool {
    let parts: Vec<&str> = id.splitn(7, ':').collect();
    matches!(
        parts.as_slice(),
        ["arn", _, "states", _, _, "stateMachine", name] if !name.is_empty()
    )
}

/// Elastic Transcoder ids are 13 digits, a dash and 6 alphanumerics.
pub fn is_pipeline_id(id: &str) -> bool {
    match id.split_once('-') {
        Some((stamp, suffix)) => {
            stamp.len() == 13
                && stamp.bytes().all(|byte| byte.is_ascii_digit())
                && suffix.len() == 6
                && suffix.bytes().all(|byte| byte.is_ascii_alphanumeric())
        }
        None => false,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MetricSpec {
    #[serde(rename = "SolutionId", default)]
    pub solution_id: String,
    #[serde(rename = "UUID", default)]
    pub uuid: String,
    #[serde(rename = "Version", default)]
    pub version: String,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn properties(value: Value) -> ResourceProperties {
        match value {
            Value::Object(map) => map,
            _ => panic!("properties must be an object"),
        }
    }

    #[test]
    fn parses_known_and_unknown_kinds() {
        assert_eq!(ResourceKind::parse(Some("Pipeline")), ResourceKind::Pipeline);
        assert_eq!(ResourceKind::parse(Some("UUID")), ResourceKind::Uuid);
        assert_eq!(
            ResourceKind::parse(Some("UnknownThing")),
            ResourceKind::Unknown("UnknownThing".to_string())
        );
        assert_eq!(
            ResourceKind::parse(None),
            ResourceKind::Unknown(String::new())
        );
    }

    #[test]
    fn recognizes_state_machine_arns() {
        assert!(is_state_machine_arn("arn:aws:states:us-east-1:123456789012:stateMachine:ingest"));
        assert!(is_state_machine_arn(
            "arn:aws-cn:states:cn-north-1:123456789012:stateMachine:ingest"
        ));
        assert!(!is_state_machine_arn("2026/10/19/[$LATEST]0123456789abcdef"));
        assert!(!is_state_machine_arn("arn:aws:states:us-east-1:123456789012:activity:ingest"));
        assert!(!is_state_machine_arn("arn:aws:states:us-east-1:123456789012:stateMachine:"));
    }

    #[test]
    fn recognizes_pipeline_ids() {
        assert!(is_pipeline_id("1111111111111-abcde1"));
        assert!(!is_pipeline_id("2026/10/19/[$LATEST]0123456789abcdef"));
        assert!(!is_pipeline_id("abc123"));
        assert!(!is_pipeline_id("111111111111a-abcde1"));
    }

    #[test]
    fn kind_names_are_case_sensitive() {
        assert!(matches!(
            ResourceKind::parse(Some("pipeline")),
            ResourceKind::Unknown(_)
        ));
    }

    #[test]
    fn notification_spec_defaults_suffixes() {
        let spec: NotificationSpec = parse_properties(&properties(json!({
            "Resource": "S3",
            "Source": "b",
            "IngestArn": "arn:aws:lambda:us-east-1:123:function:ingest"
        })))
        .expect("spec should parse");

        assert_eq!(spec.bucket, "b");
        assert_eq!(
            spec.target_arn.as_deref(),
            Some("arn:aws:lambda:us-east-1:123:function:ingest")
        );
        assert_eq!(spec.suffixes, vec!["mpg", "mp4", "m4v", "mov", "m2ts"]);
    }

    #[test]
    fn pipeline_spec_requires_buckets() {
        let error = parse_properties::<PipelineSpec>(&properties(json!({
            "Name": "vod",
            "Role": "arn:aws:iam::123:role/ets"
        })))
        .expect_err("missing buckets should fail");

        assert!(error.to_string().contains("InputBucket"));
    }

    #[test]
    fn state_machine_definition_accepts_object_or_string() {
        let inline: StateMachineSpec = parse_properties(&properties(json!({
            "Name": "ingest",
            "RoleArn": "arn:aws:iam::123:role/states",
            "Definition": {"StartAt": "Done", "States": {"Done": {"Type": "Succeed"}}}
        })))
        .expect("inline definition should parse");
        let rendered: Value =
            serde_json::from_str(&inline.definition_json()).expect("definition is json");
        assert_eq!(rendered["StartAt"], json!("Done"));

        let text: StateMachineSpec = parse_properties(&properties(json!({
            "Name": "ingest",
            "RoleArn": "arn:aws:iam::123:role/states",
            "Definition": "{\"StartAt\":\"Done\"}"
        })))
        .expect("string definition should parse");
        assert_eq!(text.definition_json(), "{\"StartAt\":\"Done\"}");
    }

    #[test]
    fn metric_spec_tolerates_missing_fields() {
        let spec: MetricSpec = parse_properties(&properties(json!({
            "SolutionId": "SO0021",
            "UUID": "0b2f"
        })))
        .expect("metric spec should parse");
        assert_eq!(spec.solution_id, "SO0021");
        assert_eq!(spec.version, "");
    }
}
