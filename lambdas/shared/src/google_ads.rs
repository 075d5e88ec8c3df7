//! Google Ads REST operations for the forwarder
//!
//! Three calls per customer account, all `POST` against
//! `{base}/{version}/customers/{customer_id}`:
//!
//! | Path suffix                    | Purpose                           |
//! |--------------------------------|-----------------------------------|
//! | `/googleAds:search`            | List conversion actions (GAQL)    |
//! | `/conversionActions:mutate`    | Create a conversion action        |
//! | `:uploadClickConversions`      | Upload offline click conversions  |
//!
//! Access tokens come from the OAuth2 refresh token passed by the caller.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::Settings;
use crate::credentials::RequestCredentials;
use crate::errors::{Error, Result};
use crate::models::{ClickConversion, ConversionAction, ConversionActionDefinition, MutateOptions, MutateResponse};

const LIST_CONVERSION_ACTIONS_QUERY: &str =
    "SELECT conversion_action.resource_name, conversion_action.name FROM conversion_action";

/// Operations the forwarder needs from an authenticated account
#[async_trait]
pub trait ConversionsApi: Send + Sync {
    /// All conversion actions of the account
    async fn list_conversion_actions(&self) -> Result<Vec<ConversionAction>>;

    /// Create one conversion action
    async fn create_conversion_action(
        &self,
        definition: &ConversionActionDefinition,
        options: MutateOptions,
    ) -> Result<MutateResponse>;

    /// Upload a batch of click conversions
    async fn upload_click_conversions(
        &self,
        conversions: &[ClickConversion],
        options: MutateOptions,
    ) -> Result<MutateResponse>;
}

/// Builds an authenticated [`ConversionsApi`] from request credentials
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, credentials: &RequestCredentials) -> Result<Box<dyn ConversionsApi>>;
}

/// Connector for the real Google Ads REST API
pub struct GoogleAdsConnector {
    http: Client,
    settings: Settings,
}

impl GoogleAdsConnector {
    pub fn new(settings: Settings) -> Result<Self> {
        let http = Client::builder().timeout(settings.timeout).build()?;
        Ok(Self { http, settings })
    }

    /// Exchange the caller's refresh token for an access token
    async fn access_token(&self, credentials: &RequestCredentials) -> Result<String> {
        let response = self
            .http
            .post(&self.settings.token_url)
            .form(&[
                ("grant_type", "refresh_token"),
                ("client_id", credentials.client_id.as_str()),
                ("client_secret", credentials.client_secret.as_str()),
                ("refresh_token", credentials.refresh_token.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(Error::Auth(format!("token endpoint returned {}: {}", status, body)));
        }

        let token: TokenResponse = serde_json::from_str(&body)?;
        Ok(token.access_token)
    }
}

#[async_trait]
impl Connector for GoogleAdsConnector {
    async fn connect(&self, credentials: &RequestCredentials) -> Result<Box<dyn ConversionsApi>> {
        let access_token = self.access_token(credentials).await?;
        Ok(Box::new(GoogleAdsClient {
            http: self.http.clone(),
            customer_url: customer_url(&self.settings, &credentials.customer_id),
            access_token,
            developer_token: credentials.developer_token.clone(),
            login_customer_id: credentials.login_customer_id.as_deref().map(normalize_customer_id),
        }))
    }
}

/// Google Ads client bound to one customer account
pub struct GoogleAdsClient {
    http: Client,
    customer_url: String,
    access_token: String,
    developer_token: String,
    login_customer_id: Option<String>,
}

impl GoogleAdsClient {
    async fn post<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.customer_url, path);
        let mut request = self
            .http
            .post(&url)
            .bearer_auth(&self.access_token)
            .header("developer-token", &self.developer_token)
            .json(body);
        if let Some(login_customer_id) = &self.login_customer_id {
            request = request.header("login-customer-id", login_customer_id);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(Error::Api {
                status: status.as_u16(),
                body: text,
            });
        }

        Ok(serde_json::from_str(&text)?)
    }
}

#[async_trait]
impl ConversionsApi for GoogleAdsClient {
    async fn list_conversion_actions(&self) -> Result<Vec<ConversionAction>> {
        let mut actions = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let request = SearchRequest {
                query: LIST_CONVERSION_ACTIONS_QUERY,
                page_token: page_token.as_deref(),
            };
            let page: SearchResponse = self.post("/googleAds:search", &request).await?;
            actions.extend(page.results.into_iter().filter_map(|row| row.conversion_action));

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        debug!(count = actions.len(), "Listed conversion actions");
        Ok(actions)
    }

    async fn create_conversion_action(
        &self,
        definition: &ConversionActionDefinition,
        options: MutateOptions,
    ) -> Result<MutateResponse> {
        let request = MutateConversionActionsRequest {
            operations: vec![ConversionActionOperation { create: definition }],
            partial_failure: options.partial_failure,
            validate_only: options.validate_only,
        };
        self.post("/conversionActions:mutate", &request).await
    }

    async fn upload_click_conversions(
        &self,
        conversions: &[ClickConversion],
        options: MutateOptions,
    ) -> Result<MutateResponse> {
        let request = UploadClickConversionsRequest {
            conversions,
            partial_failure: options.partial_failure,
            validate_only: options.validate_only,
        };
        self.post(":uploadClickConversions", &request).await
    }
}

/// Google Ads wants bare digits; the UI shows `123-456-7890`
fn normalize_customer_id(customer_id: &str) -> String {
    customer_id.chars().filter(|c| *c != '-').collect()
}

fn customer_url(settings: &Settings, customer_id: &str) -> String {
    format!(
        "{}/{}/customers/{}",
        settings.api_base_url,
        settings.api_version,
        normalize_customer_id(customer_id)
    )
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchRequest<'a> {
    query: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    page_token: Option<&'a str>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchRow>,
    next_page_token: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchRow {
    conversion_action: Option<ConversionAction>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MutateConversionActionsRequest<'a> {
    operations: Vec<ConversionActionOperation<'a>>,
    partial_failure: bool,
    validate_only: bool,
}

#[derive(Serialize)]
struct ConversionActionOperation<'a> {
    create: &'a ConversionActionDefinition,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UploadClickConversionsRequest<'a> {
    conversions: &'a [ClickConversion],
    partial_failure: bool,
    validate_only: bool,
}
