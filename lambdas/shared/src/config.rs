//! Runtime settings read from the Lambda environment
//!
//! Per-request Google Ads credentials never come from here; they arrive in
//! the webhook query string (see [`crate::credentials`]).

use std::time::Duration;

use chrono::{FixedOffset, Offset, Utc};

use crate::errors::{Error, Result};

const API_BASE_URL_ENV: &str = "GOOGLE_ADS_API_BASE_URL";
const API_VERSION_ENV: &str = "GOOGLE_ADS_API_VERSION";
const TOKEN_URL_ENV: &str = "GOOGLE_OAUTH_TOKEN_URL";
const TIMEOUT_ENV: &str = "GOOGLE_ADS_TIMEOUT_SECS";
const UTC_OFFSET_ENV: &str = "CONVERSION_UTC_OFFSET_MINUTES";

const DEFAULT_API_BASE_URL: &str = "https://googleads.googleapis.com";
const DEFAULT_API_VERSION: &str = "v17";
const DEFAULT_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Forwarder settings
#[derive(Debug, Clone)]
pub struct Settings {
    /// Google Ads REST endpoint, without version
    pub api_base_url: String,
    /// Google Ads API version segment (e.g., "v17")
    pub api_version: String,
    /// OAuth2 token endpoint used for the refresh token exchange
    pub token_url: String,
    /// Timeout applied to every outbound request
    pub timeout: Duration,
    /// Offset conversion times are rendered in
    pub utc_offset: FixedOffset,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            utc_offset: Utc.fix(),
        }
    }
}

impl Settings {
    /// Load settings from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load settings from an arbitrary key lookup (for testing)
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let timeout = match lookup(TIMEOUT_ENV) {
            Some(raw) => Duration::from_secs(raw.trim().parse().map_err(|_| {
                Error::Config(format!("{} must be a whole number of seconds, got {:?}", TIMEOUT_ENV, raw))
            })?),
            None => defaults.timeout,
        };

        let utc_offset = match lookup(UTC_OFFSET_ENV) {
            Some(raw) => {
                let minutes: i32 = raw.trim().parse().map_err(|_| {
                    Error::Config(format!("{} must be a number of minutes, got {:?}", UTC_OFFSET_ENV, raw))
                })?;
                minutes
                    .checked_mul(60)
                    .and_then(FixedOffset::east_opt)
                    .ok_or_else(|| Error::Config(format!("{} out of range: {}", UTC_OFFSET_ENV, minutes)))?
            }
            None => defaults.utc_offset,
        };

        Ok(Self {
            api_base_url: lookup(API_BASE_URL_ENV)
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.api_base_url),
            api_version: lookup(API_VERSION_ENV).unwrap_or(defaults.api_version),
            token_url: lookup(TOKEN_URL_ENV).unwrap_or(defaults.token_url),
            timeout,
            utc_offset,
        })
    }
}
