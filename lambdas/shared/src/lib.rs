//! Conversion Forwarder Core Library
//!
//! Shared functionality for the conversion forwarder Lambda including:
//! - Attribution event and Google Ads models
//! - Query-string credentials and environment settings
//! - Google Ads REST operations
//! - The forwarding pipeline
//! - Error types

pub mod models;
pub mod config;
pub mod credentials;
pub mod conversion;
pub mod google_ads;
pub mod forwarder;
pub mod errors;

pub use models::*;
pub use config::Settings;
pub use credentials::RequestCredentials;
pub use google_ads::{Connector, ConversionsApi, GoogleAdsConnector};
pub use forwarder::{Forwarder, Reply};
pub use errors::{Error, Result};
