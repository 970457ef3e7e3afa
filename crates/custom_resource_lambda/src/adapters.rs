pub mod cfn_response;
pub mod cloudfront;
pub mod elastic_transcoder;
pub mod metrics;
pub mod s3;
pub mod step_functions;

use std::sync::Arc;

use aws_config::SdkConfig;
use aws_sdk_s3::error::DisplayErrorContext;
use custom_resource_core::capability::{Capabilities, CapabilityError, SystemClock, UuidV4Generator};

use crate::config::RuntimeConfig;

/// Wire every capability to its AWS-backed adapter.
pub fn aws_capabilities(
    sdk_config: &SdkConfig,
    config: &RuntimeConfig,
    http_client: reqwest::Client,
) -> Capabilities {
    let s3_client = aws_sdk_s3::Client::new(sdk_config);
    let transcoder_client = aws_sdk_elastictranscoder::Client::new(sdk_config);

    Capabilities {
        workflows: Arc::new(step_functions::SfnWorkflowDefinitions::new(
            aws_sdk_sfn::Client::new(sdk_config),
        )),
        notifications: Arc::new(s3::S3BucketNotifications::new(
            s3_client.clone(),
            config.ingest_function_arn.clone(),
        )),
        seeder: Arc::new(s3::S3ObjectSeeder::new(
            s3_client,
            config.watermark_asset_path.clone(),
        )),
        identities: Arc::new(cloudfront::CloudFrontIdentities::new(
            aws_sdk_cloudfront::Client::new(sdk_config),
        )),
        pipelines: Arc::new(elastic_transcoder::EtsPipelines::new(
            transcoder_client.clone(),
        )),
        presets: Arc::new(elastic_transcoder::EtsPresets::new(transcoder_client)),
        telemetry: Arc::new(metrics::HttpTelemetry::new(
            http_client,
            config.metrics_endpoint.clone(),
        )),
        ids: Arc::new(UuidV4Generator),
        clock: Arc::new(SystemClock),
    }
}

/// Keep the service's own message (e.g. "quota exceeded") in the error text.
pub(crate) fn service_error<E>(context: &str, error: E) -> CapabilityError
where
    E: std::error::Error + 'static,
{
    CapabilityError::new(format!("{context}: {}", DisplayErrorContext(error)))
}
