//! Conversion Forwarder Webhook Lambda
//!
//! Handles POST /?client_id=..&customer_id=.. from Branch webhooks and
//! uploads Google Ads attributed events as offline click conversions.

use std::collections::HashMap;

use forwarder_core::{Connector, Forwarder, GoogleAdsConnector, Reply, Settings};
use lambda_http::{run, service_fn, Body, Error as LambdaError, Request, RequestExt, Response};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

async fn handler<C: Connector>(
    forwarder: &Forwarder<C>,
    event: Request,
) -> Result<Response<Body>, LambdaError> {
    info!(method = %event.method(), path = %event.uri().path(), "Processing webhook");

    let query = query_parameters(&event);

    match forwarder.handle(event.body(), &query).await {
        Ok(reply) => json_response(reply),
        Err(e) => {
            error!(error = %e, code = e.code(), "Webhook failed");
            Err(e.into())
        }
    }
}

/// First value of every query-string parameter
fn query_parameters(event: &Request) -> HashMap<String, String> {
    let mut params = HashMap::new();
    for (key, value) in event.query_string_parameters().iter() {
        params
            .entry(key.to_string())
            .or_insert_with(|| value.to_string());
    }
    params
}

fn json_response(reply: Reply) -> Result<Response<Body>, LambdaError> {
    Ok(Response::builder()
        .status(reply.status)
        .header("Content-Type", "application/json")
        .body(Body::from(serde_json::to_string(&reply.body)?))?)
}

#[tokio::main]
async fn main() -> Result<(), LambdaError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .without_time()
        .init();

    let settings = Settings::from_env()?;
    let forwarder = Forwarder::new(GoogleAdsConnector::new(settings.clone())?, &settings);
    let forwarder = &forwarder;

    run(service_fn(move |event: Request| async move {
        handler(forwarder, event).await
    }))
    .await
}
