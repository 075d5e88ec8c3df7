//! Domain models for the conversion forwarder
//!
//! These types represent the two sides of the forwarder:
//! - Attribution events: the webhook payload posted by Branch
//! - Conversion actions and click conversions: the Google Ads REST shapes

use std::collections::HashSet;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::errors::{Error, Result};

/// `$3p` value Branch uses for Google Ads attributed touches
pub const GOOGLE_ADS_NETWORK: &str = "a_google_adwords";

/// Prefix of the conversion action every event name is recorded under
pub const OFFLINE_ACTION_PREFIX: &str = "branch_offline_";

/// Unique click identifiers of a Google Ads attributed payload.
///
/// Reads the raw JSON, so payloads of any other shape are simply not
/// forwarded. Returns `None` when the touch belongs to another network or
/// carries no usable gclid.
pub fn google_ads_gclids(payload: &Value) -> Option<Vec<String>> {
    let touch = payload.get("last_attributed_touch_data")?;
    if touch.get("$3p").and_then(Value::as_str) != Some(GOOGLE_ADS_NETWORK) {
        return None;
    }
    let gclids = unique_gclids(touch.get("gclid")?);
    if gclids.is_empty() {
        None
    } else {
        Some(gclids)
    }
}

/// Deduplicated gclids in first-seen order.
///
/// Branch sends either a single gclid or a list of them. Empty strings and
/// non-string entries are skipped rather than uploaded as an empty click id,
/// so a touch holding only those counts as having no gclid at all.
pub fn unique_gclids(value: &Value) -> Vec<String> {
    let raw: Vec<&str> = match value {
        Value::String(gclid) => vec![gclid.as_str()],
        Value::Array(items) => items.iter().filter_map(Value::as_str).collect(),
        _ => Vec::new(),
    };
    let mut seen = HashSet::new();
    let mut unique = Vec::with_capacity(raw.len());
    for gclid in raw {
        if !gclid.is_empty() && seen.insert(gclid) {
            unique.push(gclid.to_string());
        }
    }
    unique
}

/// Event fields needed once a payload is known to be Google Ads attributed
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AttributionEvent {
    /// Event name (e.g., "purchase")
    #[serde(default, deserialize_with = "string_or_number")]
    pub name: Option<String>,
    /// Epoch milliseconds, fractions allowed
    #[serde(default)]
    pub timestamp: Option<f64>,
    /// Commerce details, when the event carries any
    #[serde(default)]
    pub event_data: Option<EventData>,
}

impl AttributionEvent {
    /// Extract the event fields of a payload. Unknown fields are ignored.
    pub fn from_payload(payload: Value) -> Result<Self> {
        serde_json::from_value(payload).map_err(|e| Error::Validation(e.to_string()))
    }

    /// Name of the conversion action this event is uploaded against
    pub fn offline_action_name(&self) -> Option<String> {
        self.name
            .as_deref()
            .map(|name| format!("{}{}", OFFLINE_ACTION_PREFIX, name))
    }
}

/// Commerce details attached to an event
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EventData {
    #[serde(default, deserialize_with = "string_or_number")]
    pub currency: Option<String>,
    /// Number or numeric string
    #[serde(default, deserialize_with = "number_or_numeric_string")]
    pub revenue: Option<f64>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub transaction_id: Option<String>,
}

fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(D::Error::custom(format!("expected string or number, got {}", other))),
    }
}

fn number_or_numeric_string<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => Ok(n.as_f64()),
        Some(Value::String(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| D::Error::custom(format!("expected a numeric string, got {:?}", s))),
        Some(other) => Err(D::Error::custom(format!("expected number, got {}", other))),
    }
}

/// Plain message body returned for handled outcomes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Conversion action as listed from an account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionAction {
    pub resource_name: String,
    pub name: String,
}

/// Conversion action type. Only offline click uploads are created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConversionActionType {
    UploadClicks,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConversionActionStatus {
    Enabled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConversionActionCategory {
    Purchase,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConversionActionCountingType {
    ManyPerClick,
}

/// Default value settings of a conversion action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueSettings {
    pub default_value: f64,
    pub default_currency_code: String,
}

/// Conversion action to create when none matches the event name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionActionDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub action_type: ConversionActionType,
    pub status: ConversionActionStatus,
    pub category: ConversionActionCategory,
    pub counting_type: ConversionActionCountingType,
    pub value_settings: ValueSettings,
    /// Counts the action in the Conversions column (`primaryForGoal` in REST)
    #[serde(rename = "primaryForGoal")]
    pub include_in_conversions_metric: bool,
}

impl ConversionActionDefinition {
    /// Offline click upload action with the forwarder's fixed defaults
    pub fn offline_upload(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            action_type: ConversionActionType::UploadClicks,
            status: ConversionActionStatus::Enabled,
            category: ConversionActionCategory::Purchase,
            counting_type: ConversionActionCountingType::ManyPerClick,
            value_settings: ValueSettings {
                default_value: 0.0,
                default_currency_code: "USD".to_string(),
            },
            include_in_conversions_metric: true,
        }
    }
}

/// One offline click conversion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClickConversion {
    pub gclid: String,
    pub conversion_action: String,
    /// `YYYY-MM-DD HH:MM:SS+HH:MM`
    pub conversion_date_time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversion_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
}

/// Options of a mutate or upload call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MutateOptions {
    pub validate_only: bool,
    pub partial_failure: bool,
}

/// Response of a mutate or upload call.
///
/// Results and the partial failure error are kept verbatim; callers echo
/// them back to the webhook sender.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MutateResponse {
    #[serde(default)]
    pub results: Vec<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partial_failure_error: Option<serde_json::Value>,
}
