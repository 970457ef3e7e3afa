use async_trait::async_trait;
use custom_resource_core::capability::{CapabilityError, Telemetry};
use custom_resource_core::metric::MetricRecord;

/// Posts anonymous usage records to the solutions metrics endpoint.
pub struct HttpTelemetry {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpTelemetry {
    pub fn new(client: reqwest::Client, endpoint: String) -> Self {
        Self { client, endpoint }
    }
}

#[async_trait]
impl Telemetry for HttpTelemetry {
    async fn send(&self, record: &MetricRecord) -> Result<(), CapabilityError> {
        self.client
            .post(&self.endpoint)
            .json(record)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map(|_| ())
            .map_err(|error| CapabilityError::new(format!("failed to send metric: {error}")))
    }
}
