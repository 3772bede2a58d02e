//! Shared types used across the Waybill application.
//!
//! This module defines common newtypes and the status-record value type that
//! provide type safety and clear domain modeling.

use crate::error::WaybillError;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// Newtype for tracking numbers with validation.
///
/// Tracking numbers are trimmed on construction and must be 1-64 characters
/// of alphanumerics, hyphens, and underscores.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackingNumber(String);

impl TrackingNumber {
    /// Create a new `TrackingNumber` from a string.
    ///
    /// Leading and trailing whitespace is trimmed before validation.
    ///
    /// # Errors
    /// Returns error if the trimmed value is empty, too long, or contains
    /// characters outside `[A-Za-z0-9_-]`.
    pub fn new(number: impl Into<String>) -> Result<Self, WaybillError> {
        let number = number.into().trim().to_string();
        Self::validate(&number)?;
        Ok(Self(number))
    }

    /// Get the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Validate tracking number format: 1-64 chars of `[A-Za-z0-9_-]`.
    fn validate(number: &str) -> Result<(), WaybillError> {
        static NUMBER_REGEX: OnceLock<Regex> = OnceLock::new();
        let regex =
            NUMBER_REGEX.get_or_init(|| Regex::new(r"^[A-Za-z0-9_-]{1,64}$").expect("valid regex"));

        if regex.is_match(number) {
            Ok(())
        } else {
            Err(WaybillError::Validation(format!(
                "invalid tracking number: must be 1-64 alphanumeric/hyphen/underscore characters, got '{number}'"
            )))
        }
    }
}

impl fmt::Display for TrackingNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Newtype for client identifiers with validation.
///
/// Client IDs identify the logical originator of a tracking request (for
/// example a push-channel connection). They must be non-blank and at most
/// 128 characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientId(String);

impl ClientId {
    /// Create a new `ClientId` from a string.
    ///
    /// # Errors
    /// Returns error if the value is blank (empty or whitespace-only) or
    /// longer than 128 characters.
    pub fn new(id: impl Into<String>) -> Result<Self, WaybillError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(WaybillError::Validation(
                "invalid client ID: must not be blank".to_string(),
            ));
        }
        if id.len() > 128 {
            return Err(WaybillError::Validation(format!(
                "invalid client ID: must be at most 128 characters, got {}",
                id.len()
            )));
        }
        Ok(Self(id))
    }

    /// Get the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Wrapper around `chrono::DateTime<Utc>` for consistent timestamp handling.
///
/// Provides serialization/deserialization and utility methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Create a timestamp representing the current moment.
    #[must_use]
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Create a timestamp from a `DateTime<Utc>`.
    #[must_use]
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Get the inner `DateTime<Utc>`.
    #[must_use]
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Parse a timestamp from an RFC3339 string.
    pub fn from_rfc3339(s: &str) -> Result<Self, WaybillError> {
        DateTime::parse_from_rfc3339(s)
            .map(|dt| Self(dt.with_timezone(&Utc)))
            .map_err(|e| WaybillError::Validation(format!("invalid timestamp: {e}")))
    }

    /// Format as RFC3339 string.
    #[must_use]
    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339()
    }

    /// Get seconds since Unix epoch.
    #[must_use]
    pub fn timestamp(&self) -> i64 {
        self.0.timestamp()
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::now()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }
}

impl From<Timestamp> for DateTime<Utc> {
    fn from(ts: Timestamp) -> Self {
        ts.0
    }
}

/// One shipment status event as reported by a provider.
///
/// Immutable value type: no identity beyond value equality. Records for one
/// tracking number are presented downstream newest-first; use
/// [`sort_newest_first`] before handing a batch to a delivery sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRecord {
    /// When the carrier reported this status
    pub timestamp: Timestamp,
    /// Carrier status text (for example "Out for delivery")
    pub status: String,
    /// Whether this status marks the shipment as delivered/closed
    pub is_completed: bool,
    /// Location the status was reported from, if the carrier exposes one
    pub location: Option<String>,
    /// Carrier or handling company, if the carrier exposes one
    pub company: Option<String>,
}

impl StatusRecord {
    /// Create a record with only the required fields set.
    #[must_use]
    pub fn new(timestamp: Timestamp, status: impl Into<String>, is_completed: bool) -> Self {
        Self {
            timestamp,
            status: status.into(),
            is_completed,
            location: None,
            company: None,
        }
    }

    /// Set the location.
    #[must_use]
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Set the company.
    #[must_use]
    pub fn with_company(mut self, company: impl Into<String>) -> Self {
        self.company = Some(company.into());
        self
    }
}

/// Sort status records by timestamp descending (newest first).
///
/// This is the presentation order for records of one tracking number.
pub fn sort_newest_first(records: &mut [StatusRecord]) {
    records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
}
