use async_trait::async_trait;
use custom_resource_core::contract::CustomResourceResponse;
use reqwest::header::CONTENT_TYPE;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResponseError {
    #[error("failed to serialize custom resource response: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to deliver custom resource response: {message}")]
    Transport { message: String },
    #[error("custom resource response rejected with status {status}")]
    Rejected { status: u16 },
}

/// Delivers the single terminal response for an invocation.
#[async_trait]
pub trait ResponseSink: Send + Sync {
    async fn send(
        &self,
        response_url: &str,
        response: &CustomResourceResponse,
    ) -> Result<(), ResponseError>;
}

/// PUTs the response to CloudFormation's pre-signed S3 URL.
pub struct HttpResponseSink {
    client: reqwest::Client,
}

impl HttpResponseSink {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ResponseSink for HttpResponseSink {
    async fn send(
        &self,
        response_url: &str,
        response: &CustomResourceResponse,
    ) -> Result<(), ResponseError> {
        let body = serde_json::to_string(response)?;

        // The URL is signed without a content type.
        let reply = self
            .client
            .put(response_url)
            .header(CONTENT_TYPE, "")
            .body(body)
            .send()
            .await
            .map_err(|error| ResponseError::Transport {
                message: error.to_string(),
            })?;

        let status = reply.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(ResponseError::Rejected {
                status: status.as_u16(),
            })
        }
    }
}
