//! Capability seams between the dispatcher and the services that do the
//! actual provisioning. Each trait covers one service concern so tests can
//! substitute any of them independently.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::metric::MetricRecord;
use crate::operation::{IdentitySpec, NotificationSpec, PipelineSpec, StateMachineSpec};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct CapabilityError {
    message: String,
}

impl CapabilityError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateMachineCreated {
    pub arn: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityCreated {
    pub id: String,
    pub s3_canonical_user_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineCreated {
    pub id: String,
}

/// Preset name to the id the transcoding service assigned it.
pub type PresetIds = BTreeMap<String, String>;

#[async_trait]
pub trait WorkflowDefinitions: Send + Sync {
    async fn create(&self, spec: &StateMachineSpec) -> Result<StateMachineCreated, CapabilityError>;
    async fn delete(&self, arn: &str) -> Result<(), CapabilityError>;
}

#[async_trait]
pub trait BucketNotifications: Send + Sync {
    async fn configure(&self, spec: &NotificationSpec) -> Result<(), CapabilityError>;
}

/// Uploads bundled seed content (the sample watermark) to a bucket.
#[async_trait]
pub trait ObjectSeeder: Send + Sync {
    async fn put(&self, bucket: &str, key: &str) -> Result<(), CapabilityError>;
}

#[async_trait]
pub trait CdnIdentities: Send + Sync {
    async fn create(
        &self,
        spec: &IdentitySpec,
        caller_reference: &str,
    ) -> Result<IdentityCreated, CapabilityError>;
}

#[async_trait]
pub trait TranscodingPipelines: Send + Sync {
    async fn create(&self, spec: &PipelineSpec) -> Result<PipelineCreated, CapabilityError>;
    async fn delete(&self, id: &str) -> Result<(), CapabilityError>;
}

/// The preset catalog, registered once per stack. `scope` tags each preset so
/// teardown only removes the presets its own stack created.
#[async_trait]
pub trait TranscodingPresets: Send + Sync {
    async fn create(&self, scope: &str) -> Result<PresetIds, CapabilityError>;
    async fn delete(&self, scope: &str) -> Result<(), CapabilityError>;
}

#[async_trait]
pub trait Telemetry: Send + Sync {
    async fn send(&self, record: &MetricRecord) -> Result<(), CapabilityError>;
}

pub trait IdGenerator: Send + Sync {
    fn generate(&self) -> String;
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct UuidV4Generator;

impl IdGenerator for UuidV4Generator {
    fn generate(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Every collaborator the dispatcher may call, constructed once per process.
#[derive(Clone)]
pub struct Capabilities {
    pub workflows: Arc<dyn WorkflowDefinitions>,
    pub notifications: Arc<dyn BucketNotifications>,
    pub seeder: Arc<dyn ObjectSeeder>,
    pub identities: Arc<dyn CdnIdentities>,
    pub pipelines: Arc<dyn TranscodingPipelines>,
    pub presets: Arc<dyn TranscodingPresets>,
    pub telemetry: Arc<dyn Telemetry>,
    pub ids: Arc<dyn IdGenerator>,
    pub clock: Arc<dyn Clock>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uuid_generator_yields_distinct_v4_ids() {
        let generator = UuidV4Generator;
        let first = generator.generate();
        let second = generator.generate();

        assert_ne!(first, second);
        let parsed = uuid::Uuid::parse_str(&first).expect("generated id should parse");
        assert_eq!(parsed.get_version_num(), 4);
    }
}
