use std::path::{Path, PathBuf};

use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{
    Event, FilterRule, FilterRuleName, LambdaFunctionConfiguration, NotificationConfiguration,
    NotificationConfigurationFilter, S3KeyFilter,
};
use custom_resource_core::capability::{BucketNotifications, CapabilityError, ObjectSeeder};
use custom_resource_core::operation::NotificationSpec;
use tracing::info;

use super::service_error;

const OBJECT_CREATED_EVENT: &str = "s3:ObjectCreated:*";

pub struct S3BucketNotifications {
    client: aws_sdk_s3::Client,
    default_target_arn: Option<String>,
}

impl S3BucketNotifications {
    pub fn new(client: aws_sdk_s3::Client, default_target_arn: Option<String>) -> Self {
        Self {
            client,
            default_target_arn,
        }
    }
}

#[async_trait]
impl BucketNotifications for S3BucketNotifications {
    async fn configure(&self, spec: &NotificationSpec) -> Result<(), CapabilityError> {
        let configuration =
            notification_configuration(spec, self.default_target_arn.as_deref())?;

        self.client
            .put_bucket_notification_configuration()
            .bucket(&spec.bucket)
            .notification_configuration(configuration)
            .send()
            .await
            .map(|_| ())
            .map_err(|error| service_error("failed to configure bucket notifications", error))
    }
}

/// One object-created trigger per suffix; S3 rejects several suffix rules in
/// a single configuration.
pub fn notification_configuration(
    spec: &NotificationSpec,
    default_target_arn: Option<&str>,
) -> Result<NotificationConfiguration, CapabilityError> {
    let target_arn = spec
        .target_arn
        .as_deref()
        .or(default_target_arn)
        .filter(|arn| !arn.trim().is_empty())
        .ok_or_else(|| CapabilityError::new("no ingest function ARN to notify"))?;
    if spec.suffixes.is_empty() {
        return Err(CapabilityError::new(
            "at least one source suffix must be configured",
        ));
    }

    let lambda_configurations = spec
        .suffixes
        .iter()
        .map(|suffix| lambda_configuration(target_arn, suffix))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(NotificationConfiguration::builder()
        .set_lambda_function_configurations(Some(lambda_configurations))
        .build())
}

fn lambda_configuration(
    target_arn: &str,
    suffix: &str,
) -> Result<LambdaFunctionConfiguration, CapabilityError> {
    let extension = suffix.trim().trim_start_matches('.');
    if extension.is_empty() {
        return Err(CapabilityError::new("source suffix cannot be empty"));
    }

    let rule = FilterRule::builder()
        .name(FilterRuleName::Suffix)
        .value(format!(".{extension}"))
        .build();
    let filter = NotificationConfigurationFilter::builder()
        .key(S3KeyFilter::builder().filter_rules(rule).build())
        .build();

    LambdaFunctionConfiguration::builder()
        .id(format!("ingest-{extension}"))
        .lambda_function_arn(target_arn)
        .events(Event::from(OBJECT_CREATED_EVENT))
        .filter(filter)
        .build()
        .map_err(|error| {
            CapabilityError::new(format!("invalid notification configuration: {error}"))
        })
}

/// Uploads the bundled watermark asset.
pub struct S3ObjectSeeder {
    client: aws_sdk_s3::Client,
    asset_path: PathBuf,
}

impl S3ObjectSeeder {
    pub fn new(client: aws_sdk_s3::Client, asset_path: PathBuf) -> Self {
        Self { client, asset_path }
    }
}

#[async_trait]
impl ObjectSeeder for S3ObjectSeeder {
    async fn put(&self, bucket: &str, key: &str) -> Result<(), CapabilityError> {
        let body = tokio::fs::read(&self.asset_path).await.map_err(|error| {
            CapabilityError::new(format!(
                "failed to read seed asset '{}': {error}",
                self.asset_path.display()
            ))
        })?;
        let size = body.len();

        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .content_type(content_type_for(&self.asset_path))
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|error| service_error("failed to write object to s3", error))?;

        info!(
            component = "s3_seeder",
            event = "object_seeded",
            bucket,
            key,
            bytes = size
        );
        Ok(())
    }
}

fn content_type_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|extension| extension.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        _ => "application/octet-stream",
    }
}
