//! Google Ads credentials carried in the webhook query string

use std::collections::HashMap;
use std::fmt;

use crate::errors::{Error, Result};

/// Credentials and call options for one webhook invocation
#[derive(Clone, PartialEq, Eq)]
pub struct RequestCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub developer_token: String,
    pub refresh_token: String,
    /// Account conversions are uploaded to (dashes allowed)
    pub customer_id: String,
    /// Manager account the call is made through, if any
    pub login_customer_id: Option<String>,
    /// Ask Google Ads to validate without applying
    pub validate_only: bool,
}

impl RequestCredentials {
    /// Build credentials from query-string parameters.
    ///
    /// `validate_only` is set only by the exact value `"true"`.
    pub fn from_query(params: &HashMap<String, String>) -> Result<Self> {
        let required = |key: &'static str| -> Result<String> {
            params
                .get(key)
                .filter(|value| !value.is_empty())
                .cloned()
                .ok_or(Error::MissingCredential(key))
        };

        Ok(Self {
            client_id: required("client_id")?,
            client_secret: required("client_secret")?,
            developer_token: required("developer_token")?,
            refresh_token: required("refresh_token")?,
            customer_id: required("customer_id")?,
            login_customer_id: params
                .get("login_customer_id")
                .filter(|value| !value.is_empty())
                .cloned(),
            validate_only: params.get("validate_only").map(String::as_str) == Some("true"),
        })
    }
}

// Secrets stay out of logs.
impl fmt::Debug for RequestCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestCredentials")
            .field("client_id", &self.client_id)
            .field("customer_id", &self.customer_id)
            .field("login_customer_id", &self.login_customer_id)
            .field("validate_only", &self.validate_only)
            .finish_non_exhaustive()
    }
}
