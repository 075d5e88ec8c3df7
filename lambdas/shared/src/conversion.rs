//! Mapping attribution events onto Google Ads click conversions

use chrono::{DateTime, FixedOffset, Utc};

use crate::errors::{Error, Result};
use crate::models::{ClickConversion, EventData};

/// `conversion_date_time` layout Google Ads accepts: `2023-11-14 22:13:20+00:00`
const CONVERSION_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%:z";

/// Format an epoch-millisecond timestamp for upload.
///
/// Sub-millisecond fractions are truncated. A missing timestamp means the
/// conversion happened now.
pub fn format_conversion_time(timestamp_ms: Option<f64>, offset: &FixedOffset) -> Result<String> {
    let instant = match timestamp_ms {
        Some(ms) => ms
            .is_finite()
            .then(|| DateTime::<Utc>::from_timestamp_millis(ms.trunc() as i64))
            .flatten()
            .ok_or_else(|| Error::InvalidTimestamp(ms.to_string()))?,
        None => Utc::now(),
    };
    Ok(instant
        .with_timezone(offset)
        .format(CONVERSION_TIME_FORMAT)
        .to_string())
}

/// One click conversion per gclid, all recorded against the same action
pub fn build_conversions(
    gclids: &[String],
    conversion_action: &str,
    conversion_date_time: &str,
    event_data: Option<&EventData>,
) -> Vec<ClickConversion> {
    gclids
        .iter()
        .map(|gclid| ClickConversion {
            gclid: gclid.clone(),
            conversion_action: conversion_action.to_string(),
            conversion_date_time: conversion_date_time.to_string(),
            conversion_value: event_data.and_then(|data| data.revenue),
            currency_code: event_data.and_then(|data| data.currency.clone()),
            order_id: event_data.and_then(|data| data.transaction_id.clone()),
        })
        .collect()
}
