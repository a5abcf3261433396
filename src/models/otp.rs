use chrono::{DateTime, Utc};
use mongodb::bson;
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One live record per email address (upsert semantics). A record older
/// than the configured TTL never satisfies verification or reset checks,
/// even if the TTL index has not reaped it yet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OtpRecord {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub email_address: String,
    pub code: String,
    #[serde(default)]
    pub verified: bool,

    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

/// Lifecycle of a stored OTP. Consumption is record deletion, so it has no
/// variant here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtpState {
    Issued,
    Verified,
    Expired,
}

impl OtpRecord {
    pub fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        let age = now.signed_duration_since(self.created_at);
        age.num_milliseconds() >= ttl.as_millis() as i64
    }

    /// Expiry wins over the verified flag.
    pub fn state(&self, now: DateTime<Utc>, ttl: Duration) -> OtpState {
        if self.is_expired(now, ttl) {
            OtpState::Expired
        } else if self.verified {
            OtpState::Verified
        } else {
            OtpState::Issued
        }
    }
}
