use async_trait::async_trait;
use aws_sdk_cloudfront::types::CloudFrontOriginAccessIdentityConfig;
use custom_resource_core::capability::{CapabilityError, CdnIdentities, IdentityCreated};
use custom_resource_core::operation::IdentitySpec;

use super::service_error;

pub struct CloudFrontIdentities {
    client: aws_sdk_cloudfront::Client,
}

impl CloudFrontIdentities {
    pub fn new(client: aws_sdk_cloudfront::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CdnIdentities for CloudFrontIdentities {
    async fn create(
        &self,
        spec: &IdentitySpec,
        caller_reference: &str,
    ) -> Result<IdentityCreated, CapabilityError> {
        let identity_config = CloudFrontOriginAccessIdentityConfig::builder()
            .caller_reference(caller_reference)
            .comment(&spec.comment)
            .build()
            .map_err(|error| {
                CapabilityError::new(format!("invalid origin access identity config: {error}"))
            })?;

        let output = self
            .client
            .create_cloud_front_origin_access_identity()
            .cloud_front_origin_access_identity_config(identity_config)
            .send()
            .await
            .map_err(|error| service_error("failed to create origin access identity", error))?;

        let identity = output
            .cloud_front_origin_access_identity()
            .ok_or_else(|| CapabilityError::new("CloudFront returned no origin access identity"))?;

        Ok(IdentityCreated {
            id: identity.id().to_string(),
            s3_canonical_user_id: identity.s3_canonical_user_id().to_string(),
        })
    }
}
