//! Error types for the conversion forwarder

use thiserror::Error;

/// Result type alias using the forwarder Error
pub type Result<T> = std::result::Result<T, Error>;

/// Conversion forwarder error types
#[derive(Error, Debug)]
pub enum Error {
    /// Request body is not valid JSON
    #[error("Malformed request body: {0}")]
    MalformedBody(serde_json::Error),

    /// A required authentication parameter is missing from the query string
    #[error("missing authentication parameter: {0}")]
    MissingCredential(&'static str),

    /// Event payload is missing a field the upload needs
    #[error("Validation error: {0}")]
    Validation(String),

    /// Event timestamp cannot be represented as a date
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// Environment configuration is invalid
    #[error("Configuration error: {0}")]
    Config(String),

    /// OAuth token exchange failed
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Transport-level HTTP failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Google Ads API answered with a non-success status
    #[error("Google Ads API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// Conversion action create call reported a partial failure
    #[error("Unable to create action: {name} details: {details}")]
    ActionCreation { name: String, details: String },

    /// Neither lookup nor creation produced a resource name
    #[error("Cannot find or create a conversion action")]
    ActionNotResolved,

    /// JSON serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Returns the error code used in logs
    pub fn code(&self) -> &'static str {
        match self {
            Error::MalformedBody(_) => "malformed_body",
            Error::MissingCredential(_) => "missing_credential",
            Error::Validation(_) => "validation_error",
            Error::InvalidTimestamp(_) => "invalid_timestamp",
            Error::Config(_) => "config_error",
            Error::Auth(_) => "auth_error",
            Error::Http(_) => "http_error",
            Error::Api { .. } => "google_ads_error",
            Error::ActionCreation { .. } => "action_creation_failed",
            Error::ActionNotResolved => "action_not_resolved",
            Error::Serialization(_) => "serialization_error",
        }
    }

    /// Returns the HTTP status code for this error.
    ///
    /// Missing credentials keep the 500 that existing webhook callers expect.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::MalformedBody(_) => 400,
            Error::MissingCredential(_) => 500,
            Error::Validation(_) => 400,
            Error::InvalidTimestamp(_) => 400,
            Error::Config(_) => 500,
            Error::Auth(_) => 502,
            Error::Http(_) => 502,
            Error::Api { .. } => 502,
            Error::ActionCreation { .. } => 502,
            Error::ActionNotResolved => 500,
            Error::Serialization(_) => 500,
        }
    }
}
