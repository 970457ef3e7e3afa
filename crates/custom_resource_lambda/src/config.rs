use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_METRICS_ENDPOINT: &str = "https://metrics.awssolutionsbuilder.com/generic";
pub const DEFAULT_WATERMARK_ASSET_PATH: &str = "assets/aws-logo.png";
pub const DEFAULT_RESPONSE_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_LOG_STREAM: &str = "custom-resource";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{key} must be a positive integer, got '{value}'")]
    InvalidNumber { key: &'static str, value: String },
    #[error("{key} cannot be empty")]
    Empty { key: &'static str },
}

/// Settings resolved once per Lambda container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub metrics_endpoint: String,
    pub watermark_asset_path: PathBuf,
    pub response_timeout: Duration,
    pub log_stream: String,
    /// Notification target for `S3` requests that omit `IngestArn`.
    pub ingest_function_arn: Option<String>,
}

impl RuntimeConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let metrics_endpoint = lookup("METRICS_ENDPOINT")
            .unwrap_or_else(|| DEFAULT_METRICS_ENDPOINT.to_string());
        if metrics_endpoint.trim().is_empty() {
            return Err(ConfigError::Empty {
                key: "METRICS_ENDPOINT",
            });
        }

        let watermark_asset_path = lookup("WATERMARK_ASSET_PATH")
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_WATERMARK_ASSET_PATH.to_string());

        let response_timeout_secs = match lookup("RESPONSE_TIMEOUT_SECS") {
            None => DEFAULT_RESPONSE_TIMEOUT_SECS,
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(value) if value > 0 => value,
                _ => {
                    return Err(ConfigError::InvalidNumber {
                        key: "RESPONSE_TIMEOUT_SECS",
                        value: raw,
                    })
                }
            },
        };

        let log_stream = lookup("AWS_LAMBDA_LOG_STREAM_NAME")
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_LOG_STREAM.to_string());

        let ingest_function_arn =
            lookup("INGEST_FUNCTION_ARN").filter(|value| !value.trim().is_empty());

        Ok(Self {
            metrics_endpoint,
            watermark_asset_path: PathBuf::from(watermark_asset_path),
            response_timeout: Duration::from_secs(response_timeout_secs),
            log_stream,
            ingest_function_arn,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let values: BTreeMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key| values.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = RuntimeConfig::from_lookup(lookup_from(&[])).expect("defaults should load");

        assert_eq!(config.metrics_endpoint, DEFAULT_METRICS_ENDPOINT);
        assert_eq!(
            config.watermark_asset_path,
            PathBuf::from(DEFAULT_WATERMARK_ASSET_PATH)
        );
        assert_eq!(config.response_timeout, Duration::from_secs(10));
        assert_eq!(config.log_stream, DEFAULT_LOG_STREAM);
        assert!(config.ingest_function_arn.is_none());
    }

    #[test]
    fn reads_lambda_log_stream_and_overrides() {
        let config = RuntimeConfig::from_lookup(lookup_from(&[
            ("AWS_LAMBDA_LOG_STREAM_NAME", "2026/10/19/[$LATEST]abc"),
            ("METRICS_ENDPOINT", "https://metrics.example.com/generic"),
            ("RESPONSE_TIMEOUT_SECS", "3"),
            ("INGEST_FUNCTION_ARN", "arn:aws:lambda:us-east-1:123:function:ingest"),
        ]))
        .expect("overrides should load");

        assert_eq!(config.log_stream, "2026/10/19/[$LATEST]abc");
        assert_eq!(config.metrics_endpoint, "https://metrics.example.com/generic");
        assert_eq!(config.response_timeout, Duration::from_secs(3));
        assert_eq!(
            config.ingest_function_arn.as_deref(),
            Some("arn:aws:lambda:us-east-1:123:function:ingest")
        );
    }

    #[test]
    fn rejects_zero_or_garbage_timeout() {
        for raw in ["0", "soon"] {
            let error = RuntimeConfig::from_lookup(lookup_from(&[("RESPONSE_TIMEOUT_SECS", raw)]))
                .expect_err("invalid timeout should fail");
            assert!(error.to_string().contains("RESPONSE_TIMEOUT_SECS"));
        }
    }

    #[test]
    fn rejects_blank_metrics_endpoint() {
        let error = RuntimeConfig::from_lookup(lookup_from(&[("METRICS_ENDPOINT", " ")]))
            .expect_err("blank endpoint should fail");
        assert_eq!(
            error,
            ConfigError::Empty {
                key: "METRICS_ENDPOINT"
            }
        );
    }
}
