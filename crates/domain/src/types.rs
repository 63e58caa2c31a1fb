//! Pending-record and credential types
//!
//! Records staged for offline delivery are persisted with the same camelCase
//! field names the backend expects, so a drained batch can be replayed
//! without reshaping.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Free-form metadata/attribute mapping attached to records.
pub type AttributeMap = HashMap<String, Value>;

/// Token pair issued by the account-validation handshake.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// In-memory credential state owned by the auth session.
///
/// Invariant: a non-`None` access token here always has a durable copy in the
/// secure store (write-then-cache ordering).
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

impl Credentials {
    /// True when an access token is cached in memory.
    #[must_use]
    pub fn has_access_token(&self) -> bool {
        self.access_token.is_some()
    }
}

/// Analytics event that could not be delivered live.
///
/// Immutable once created; queue order is insertion order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingEvent {
    pub campaign_id: Option<String>,
    pub event: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<AttributeMap>,
    pub timestamp: DateTime<Utc>,
}

impl PendingEvent {
    /// Create a pending event stamped with the current time.
    #[must_use]
    pub fn new(campaign_id: Option<String>, event: String, metadata: Option<AttributeMap>) -> Self {
        Self { campaign_id, event, metadata, timestamp: Utc::now() }
    }
}

/// CSAT survey response awaiting delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingCsatResponse {
    pub csat_id: String,
    pub user_id: String,
    pub rating: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback_option: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_comments: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Latest user-attribute snapshot awaiting delivery.
///
/// Single-slot: a newer snapshot overwrites the previous one because
/// attribute state is idempotent per user and only the latest value matters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingUserAttributes {
    pub user_id: String,
    pub attributes: AttributeMap,
    pub timestamp: DateTime<Utc>,
}

impl PendingUserAttributes {
    /// Create a snapshot stamped with the current time.
    #[must_use]
    pub fn new(user_id: String, attributes: AttributeMap) -> Self {
        Self { user_id, attributes, timestamp: Utc::now() }
    }
}
