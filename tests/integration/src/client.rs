//! Webhook client for testing a deployed forwarder

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Client that posts attribution webhooks to the forwarder
pub struct ForwarderClient {
    client: Client,
    base_url: String,
}

// Request/Response types

#[derive(Debug, Clone, Serialize)]
pub struct AttributionEvent {
    pub last_attributed_touch_data: TouchData,
    pub name: String,
    pub timestamp: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_data: Option<EventData>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TouchData {
    #[serde(rename = "$3p")]
    pub ad_network: String,
    pub gclid: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EventData {
    pub currency: String,
    pub revenue: f64,
    pub transaction_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Status and parsed JSON body of a webhook call
#[derive(Debug)]
pub struct WebhookResponse {
    pub status: StatusCode,
    pub body: serde_json::Value,
}

impl WebhookResponse {
    /// Body as a `{message}` response
    pub fn message(&self) -> Option<String> {
        serde_json::from_value::<MessageResponse>(self.body.clone())
            .ok()
            .map(|m| m.message)
    }
}

#[derive(Debug)]
pub enum ApiError {
    /// Non-JSON answer, e.g. the platform's invocation error page
    Http { status: StatusCode, body: String },
    /// Network error
    Request(String),
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::Http { status, body } => write!(f, "HTTP {}: {}", status, body),
            ApiError::Request(msg) => write!(f, "Request error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

pub type ApiResult<T> = Result<T, ApiError>;

impl ForwarderClient {
    /// Create a new client with the given webhook URL
    pub fn new(base_url: &str) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Create a client from environment variable
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        let base_url = std::env::var("FORWARDER_API_URL")
            .expect("FORWARDER_API_URL environment variable not set");
        Self::new(&base_url)
    }

    /// Post an attribution event with the given query parameters
    pub async fn send_event(
        &self,
        event: &AttributionEvent,
        query: &[(String, String)],
    ) -> ApiResult<WebhookResponse> {
        let body = serde_json::to_string(event).map_err(|e| ApiError::Request(e.to_string()))?;
        self.send_raw(Some(body), query).await
    }

    /// Post an arbitrary body, or none at all
    pub async fn send_raw(
        &self,
        body: Option<String>,
        query: &[(String, String)],
    ) -> ApiResult<WebhookResponse> {
        let mut request = self.client.post(&self.base_url).query(query);
        if let Some(body) = body {
            request = request.header("Content-Type", "application/json").body(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;

        match serde_json::from_str(&text) {
            Ok(body) => Ok(WebhookResponse { status, body }),
            Err(_) => Err(ApiError::Http { status, body: text }),
        }
    }
}
