//! Integration tests for the conversion forwarder webhook
//!
//! Run with: FORWARDER_API_URL=https://your-api.execute-api.us-west-2.amazonaws.com/webhook cargo test
//!
//! These tests require a deployed forwarder instance. Only the live upload
//! test talks to Google Ads, and it always sets validate_only=true.

use forwarder_integration_tests::{
    client::{ApiError, ForwarderClient},
    fixtures::{google_ads_event, live_credentials, placeholder_credentials, unique_gclid},
    skip_if_no_api,
};
use pretty_assertions::assert_eq;
use serde_json::json;

/// Helper to get client or skip test
fn get_client() -> Option<ForwarderClient> {
    let _ = dotenvy::dotenv();
    match std::env::var("FORWARDER_API_URL") {
        Ok(url) => Some(ForwarderClient::new(&url)),
        Err(_) => {
            eprintln!("Skipping: FORWARDER_API_URL not set");
            None
        }
    }
}

// ============================================================================
// Validation Tests
// ============================================================================

#[tokio::test]
async fn test_missing_body() {
    let Some(client) = get_client() else { return };

    let response = client
        .send_raw(None, &placeholder_credentials())
        .await
        .expect("Failed to call webhook");

    assert_eq!(response.status.as_u16(), 500);
    assert_eq!(response.message().as_deref(), Some("body not provided in request"));
}

#[tokio::test]
async fn test_other_network_is_ignored() {
    let Some(client) = get_client() else { return };

    let body = json!({
        "last_attributed_touch_data": {"$3p": "a_facebook", "gclid": [unique_gclid()]},
        "name": "purchase",
        "timestamp": 1_700_000_000_000i64
    });

    let response = client
        .send_raw(Some(body.to_string()), &placeholder_credentials())
        .await
        .expect("Failed to call webhook");

    assert_eq!(response.status.as_u16(), 200);
    assert_eq!(
        response.message().as_deref(),
        Some("Ad network not a_google_adwords and/or gclid not found")
    );
}

#[tokio::test]
async fn test_empty_gclid_list_is_ignored() {
    let Some(client) = get_client() else { return };

    let response = client
        .send_event(&google_ads_event(vec![]), &[])
        .await
        .expect("Failed to call webhook");

    // Network check happens before the credential check
    assert_eq!(response.status.as_u16(), 200);
}

#[tokio::test]
async fn test_missing_credentials() {
    skip_if_no_api!();
    let client = ForwarderClient::from_env();

    let response = client
        .send_event(&google_ads_event(vec![unique_gclid()]), &[])
        .await
        .expect("Failed to call webhook");

    assert_eq!(response.status.as_u16(), 500);
    assert_eq!(
        response.message().as_deref(),
        Some("no authentication parameters provided, unable to upload conversion click")
    );
}

#[tokio::test]
async fn test_incomplete_credentials() {
    let Some(client) = get_client() else { return };

    let query: Vec<(String, String)> = placeholder_credentials()
        .into_iter()
        .filter(|(key, _)| key != "refresh_token")
        .collect();

    let response = client
        .send_event(&google_ads_event(vec![unique_gclid()]), &query)
        .await
        .expect("Failed to call webhook");

    assert_eq!(response.status.as_u16(), 500);
    assert_eq!(
        response.message().as_deref(),
        Some("missing authentication parameter: refresh_token")
    );
}

// ============================================================================
// Invocation Failure Tests
// ============================================================================

#[tokio::test]
async fn test_malformed_json_fails_invocation() {
    let Some(client) = get_client() else { return };

    let result = client
        .send_raw(Some("{not json".to_string()), &placeholder_credentials())
        .await;

    let status = match result {
        Ok(response) => response.status,
        Err(ApiError::Http { status, .. }) => status,
        Err(e) => panic!("Request failed: {}", e),
    };
    assert!(status.is_server_error(), "unexpected status {}", status);
}

#[tokio::test]
async fn test_rejected_refresh_token_fails_invocation() {
    let Some(client) = get_client() else { return };

    let result = client
        .send_event(&google_ads_event(vec![unique_gclid()]), &placeholder_credentials())
        .await;

    let status = match result {
        Ok(response) => response.status,
        Err(ApiError::Http { status, .. }) => status,
        Err(e) => panic!("Request failed: {}", e),
    };
    assert!(status.is_server_error(), "unexpected status {}", status);
}

// ============================================================================
// Google Ads Tests
// ============================================================================

#[tokio::test]
async fn test_validate_only_upload() {
    let Some(client) = get_client() else { return };
    let Some(query) = live_credentials() else {
        eprintln!("Skipping: GOOGLE_ADS_* credentials not set");
        return;
    };

    let gclid = unique_gclid();
    let response = client
        .send_event(&google_ads_event(vec![gclid.clone(), gclid]), &query)
        .await
        .expect("Failed to call webhook");

    // Test gclids cannot be decoded, so Google Ads usually reports a partial
    // failure; either way the body is downstream JSON, not a message.
    match response.status.as_u16() {
        200 => assert!(response.body.is_array()),
        500 => assert!(response.body.get("code").is_some() || response.body.get("message").is_some()),
        other => panic!("unexpected status {}: {}", other, response.body),
    }
}
