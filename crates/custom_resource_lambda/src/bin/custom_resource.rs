use std::sync::Arc;

use custom_resource_core::dispatcher::Dispatcher;
use custom_resource_lambda::adapters::aws_capabilities;
use custom_resource_lambda::adapters::cfn_response::HttpResponseSink;
use custom_resource_lambda::config::RuntimeConfig;
use custom_resource_lambda::handlers::custom_resource::{
    handle_custom_resource_event, HandlerContext,
};
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_logging() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_target(false),
        )
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    init_logging();

    let config = RuntimeConfig::from_env()?;
    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let http_client = reqwest::Client::builder()
        .timeout(config.response_timeout)
        .build()?;

    let dispatcher = Dispatcher::new(aws_capabilities(&aws_config, &config, http_client.clone()));
    let context = Arc::new(HandlerContext::new(
        dispatcher,
        Arc::new(HttpResponseSink::new(http_client)),
        config.log_stream.clone(),
    ));

    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| {
        let context = Arc::clone(&context);
        async move {
            handle_custom_resource_event(event.payload, &context)
                .await
                .map_err(Error::from)
        }
    }))
    .await
}
