//! Webhook-to-Google-Ads forwarding pipeline
//!
//! Turns one Branch attribution webhook into at most one click conversion
//! upload. Handled outcomes come back as a [`Reply`]; anything else is an
//! `Err` the Lambda runtime reports as an invocation failure.

use std::collections::HashMap;

use chrono::FixedOffset;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::Settings;
use crate::conversion::{build_conversions, format_conversion_time};
use crate::credentials::RequestCredentials;
use crate::errors::{Error, Result};
use crate::google_ads::{Connector, ConversionsApi};
use crate::models::{
    google_ads_gclids, AttributionEvent, ConversionActionDefinition, MessageResponse, MutateOptions,
};

pub const MISSING_BODY_MESSAGE: &str = "body not provided in request";
pub const NOT_GOOGLE_ADS_MESSAGE: &str = "Ad network not a_google_adwords and/or gclid not found";
pub const MISSING_CREDENTIALS_MESSAGE: &str =
    "no authentication parameters provided, unable to upload conversion click";

/// Status and JSON body to answer the webhook with
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub status: u16,
    pub body: Value,
}

impl Reply {
    pub fn json<T: Serialize>(status: u16, body: &T) -> Result<Self> {
        Ok(Self {
            status,
            body: serde_json::to_value(body)?,
        })
    }

    pub fn message(status: u16, message: impl Into<String>) -> Result<Self> {
        Self::json(status, &MessageResponse::new(message))
    }
}

/// Forwards Google Ads attributed events as offline click conversions
pub struct Forwarder<C> {
    connector: C,
    utc_offset: FixedOffset,
}

impl<C: Connector> Forwarder<C> {
    pub fn new(connector: C, settings: &Settings) -> Self {
        Self {
            connector,
            utc_offset: settings.utc_offset,
        }
    }

    /// Process one webhook request.
    ///
    /// `body` is the raw request body; an empty slice means no body was sent.
    /// `query` holds the query-string parameters.
    pub async fn handle(&self, body: &[u8], query: &HashMap<String, String>) -> Result<Reply> {
        if body.is_empty() {
            return Reply::message(500, MISSING_BODY_MESSAGE);
        }

        let payload: Value = serde_json::from_slice(body).map_err(Error::MalformedBody)?;

        let Some(gclids) = google_ads_gclids(&payload) else {
            info!("Skipping event not attributed to Google Ads");
            return Reply::message(200, NOT_GOOGLE_ADS_MESSAGE);
        };

        if query.is_empty() {
            return Reply::message(500, MISSING_CREDENTIALS_MESSAGE);
        }
        let credentials = match RequestCredentials::from_query(query) {
            Ok(credentials) => credentials,
            Err(e @ Error::MissingCredential(_)) => {
                warn!(error = %e, "Rejecting webhook");
                return Reply::message(e.status_code(), e.to_string());
            }
            Err(e) => return Err(e),
        };

        let event = AttributionEvent::from_payload(payload)?;
        let action_name = event
            .offline_action_name()
            .ok_or_else(|| Error::Validation("event name is required".to_string()))?;

        info!(
            action_name = %action_name,
            gclid_count = gclids.len(),
            validate_only = credentials.validate_only,
            "Forwarding conversion"
        );
        debug!(gclids = %gclids.join(", "), "Unique gclids");

        let api = self.connector.connect(&credentials).await?;

        let resource_name = find_or_create_action(api.as_ref(), &action_name).await?;
        debug!(conversion_action = %resource_name, "Resolved conversion action");

        let conversion_date_time = format_conversion_time(event.timestamp, &self.utc_offset)?;
        let conversions = build_conversions(
            &gclids,
            &resource_name,
            &conversion_date_time,
            event.event_data.as_ref(),
        );
        debug!(conversions = ?conversions, "Uploading conversions");

        let options = MutateOptions {
            validate_only: credentials.validate_only,
            partial_failure: true,
        };
        let response = api.upload_click_conversions(&conversions, options).await?;
        debug!(response = ?response, "Upload result");

        match response.partial_failure_error {
            Some(partial_failure_error) => {
                warn!(error = %partial_failure_error, "Upload partially failed");
                Reply::json(500, &partial_failure_error)
            }
            None => Reply::json(200, &response.results),
        }
    }
}

/// Resource name of the conversion action called `name`, creating it if the
/// account has none.
///
/// Lookup and create are separate calls, so concurrent invocations for a new
/// event name can each create an action.
pub async fn find_or_create_action(api: &dyn ConversionsApi, name: &str) -> Result<String> {
    let existing = api
        .list_conversion_actions()
        .await?
        .into_iter()
        .find(|action| action.name == name)
        .map(|action| action.resource_name);

    let resource_name = match existing {
        Some(resource_name) => Some(resource_name),
        None => create_action(api, name).await?,
    };

    resource_name.ok_or(Error::ActionNotResolved)
}

/// Create an offline upload conversion action named `name`.
///
/// Returns the resource name of the first created result.
pub async fn create_action(api: &dyn ConversionsApi, name: &str) -> Result<Option<String>> {
    info!(action_name = %name, "Creating conversion action");

    let definition = ConversionActionDefinition::offline_upload(name);
    let options = MutateOptions {
        validate_only: false,
        partial_failure: true,
    };
    let response = api.create_conversion_action(&definition, options).await?;

    if let Some(details) = response.partial_failure_error {
        return Err(Error::ActionCreation {
            name: name.to_string(),
            details: details.to_string(),
        });
    }

    let first = response.results.into_iter().next();
    debug!(result = ?first, "Created conversion action");
    Ok(first.and_then(|result| {
        result
            .get("resourceName")
            .and_then(Value::as_str)
            .map(str::to_string)
    }))
}
