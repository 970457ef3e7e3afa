use std::sync::Arc;
use std::time::Instant;

use custom_resource_core::contract::{
    CustomResourceEvent, CustomResourceResponse, ResponseStatus, ResponseTarget,
};
use custom_resource_core::dispatcher::Dispatcher;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{error, info};

use crate::adapters::cfn_response::{ResponseError, ResponseSink};

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("invalid custom resource event: {0}")]
    InvalidEvent(#[source] serde_json::Error),
    #[error(transparent)]
    Response(#[from] ResponseError),
}

/// Returned to the Lambda runtime once the response has been delivered.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InvocationSummary {
    pub status: ResponseStatus,
    pub physical_resource_id: String,
}

pub struct HandlerContext {
    dispatcher: Dispatcher,
    sink: Arc<dyn ResponseSink>,
    log_stream: String,
}

impl HandlerContext {
    pub fn new(
        dispatcher: Dispatcher,
        sink: Arc<dyn ResponseSink>,
        log_stream: impl Into<String>,
    ) -> Self {
        Self {
            dispatcher,
            sink,
            log_stream: log_stream.into(),
        }
    }
}

/// Answers every request that names a `ResponseURL` exactly once. Only a
/// payload without addressing fields is returned as an invocation error.
pub async fn handle_custom_resource_event(
    payload: Value,
    context: &HandlerContext,
) -> Result<InvocationSummary, HandlerError> {
    let started_at = Instant::now();
    info!(
        component = "handler",
        event = "request_received",
        payload = %payload
    );

    let (response_url, response) = match CustomResourceEvent::deserialize(&payload) {
        Ok(event) => {
            let outcome = context.dispatcher.dispatch(&event).await;
            let response =
                CustomResourceResponse::from_outcome(&event, outcome, &context.log_stream);
            (event.response_url, response)
        }
        Err(parse_error) => {
            error!(
                component = "handler",
                event = "invalid_event",
                error = %parse_error
            );
            let target = ResponseTarget::deserialize(&payload)
                .map_err(|_| HandlerError::InvalidEvent(parse_error))?;
            let response = CustomResourceResponse::rejected(&target, &context.log_stream);
            (target.response_url, response)
        }
    };

    match context.sink.send(&response_url, &response).await {
        Ok(()) => {
            info!(
                component = "handler",
                event = "response_sent",
                logical_resource_id = response.logical_resource_id.as_str(),
                status = response.status.as_str(),
                physical_resource_id = response.physical_resource_id.as_str(),
                duration_ms = started_at.elapsed().as_millis() as u64
            );
            Ok(InvocationSummary {
                status: response.status,
                physical_resource_id: response.physical_resource_id,
            })
        }
        Err(send_error) => {
            error!(
                component = "handler",
                event = "response_failed",
                logical_resource_id = response.logical_resource_id.as_str(),
                status = response.status.as_str(),
                error = %send_error
            );
            Err(send_error.into())
        }
    }
}
