//! Conversion Forwarder Integration Tests
//!
//! These tests post webhooks to a deployed forwarder (set the
//! FORWARDER_API_URL environment variable). Tests that reach Google Ads also
//! need the GOOGLE_ADS_* credential variables and always run with
//! `validate_only=true`.
//!
//! Run with: cargo test --package forwarder-integration-tests

pub mod client;

pub use client::ForwarderClient;
pub use fixtures::*;
