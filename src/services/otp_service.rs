use chrono::Utc;
use mongodb::bson::{doc, DateTime, Document};
use mongodb::{Collection, Database};
use rand::Rng;
use std::time::Duration;

use crate::config::ResetConfig;
use crate::errors::{AppError, Result};
use crate::models::otp::{OtpRecord, OtpState};

/// Issues and verifies the one-time codes backing the password-reset flow.
/// The `otps` collection is the serialization point: issuance is a single
/// upsert (last writer wins), verification a single match-and-flip.
#[derive(Clone)]
pub struct OtpService {
    collection: Collection<OtpRecord>,
    otp_ttl: Duration,
    code_length: usize,
}

impl OtpService {
    pub fn new(db: &Database, config: &ResetConfig) -> Self {
        Self {
            collection: db.collection("otps"),
            otp_ttl: config.otp_ttl,
            code_length: config.code_length,
        }
    }

    // Digits-only, zero-padded
    pub fn generate_code(length: usize) -> String {
        let mut rng = rand::thread_rng();
        let max = 10u32.pow(length as u32);
        format!("{:0width$}", rng.gen_range(0..max), width = length)
    }

    /// Replaces any prior code for this email and resets the verified flag.
    pub async fn generate(&self, email: &str) -> Result<String> {
        let code = Self::generate_code(self.code_length);
        self.collection
            .update_one(doc! { "email_address": email }, Self::issuance_update(&code))
            .upsert(true)
            .await?;

        tracing::info!("OTP generated for {}", email);
        Ok(code)
    }

    fn issuance_update(code: &str) -> Document {
        doc! {
            "$set": {
                "code": code,
                "verified": false,
                "created_at": DateTime::now(),
            }
        }
    }

    /// Atomic match-and-flip. A miss never says why: wrong code, unknown
    /// email, expired record and already-consumed code all read the same.
    pub async fn verify(&self, email: &str, code: &str) -> Result<()> {
        let filter = Self::verification_filter(email, code, Self::expiry_threshold(self.otp_ttl));
        let update = doc! { "$set": { "verified": true } };

        match self.collection.find_one_and_update(filter, update).await? {
            Some(_) => {
                tracing::info!("OTP verified for {}", email);
                Ok(())
            }
            None => {
                tracing::warn!("invalid OTP attempt for {}", email);
                Err(AppError::InvalidOtp)
            }
        }
    }

    fn verification_filter(email: &str, code: &str, threshold: DateTime) -> Document {
        doc! {
            "email_address": email,
            "code": code,
            "verified": false,
            "created_at": { "$gt": threshold },
        }
    }

    /// Reset-eligibility re-check: the record must still exist and derive to
    /// `Verified`. Absence, expiry and an unverified record all read the same.
    pub async fn find_verified(&self, email: &str) -> Result<OtpRecord> {
        let record = self
            .collection
            .find_one(doc! { "email_address": email })
            .await?;

        match record {
            Some(record) if record.state(Utc::now(), self.otp_ttl) == OtpState::Verified => {
                Ok(record)
            }
            _ => {
                tracing::warn!("reset attempted without a verified OTP for {}", email);
                Err(AppError::OtpNotVerified)
            }
        }
    }

    pub async fn delete(&self, email: &str) -> Result<()> {
        self.collection
            .delete_one(doc! { "email_address": email })
            .await?;
        Ok(())
    }

    fn expiry_threshold(ttl: Duration) -> DateTime {
        let threshold = Utc::now() - ttl;
        DateTime::from_millis(threshold.timestamp_millis())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::Bson;

    #[test]
    fn generated_codes_are_six_zero_padded_digits() {
        for _ in 0..200 {
            let code = OtpService::generate_code(6);
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn issuance_update_resets_the_verified_flag() {
        let update = OtpService::issuance_update("482913");
        let set = update.get_document("$set").unwrap();
        assert_eq!(set.get_str("code").unwrap(), "482913");
        assert!(!set.get_bool("verified").unwrap());
        assert!(matches!(set.get("created_at"), Some(Bson::DateTime(_))));
    }

    #[test]
    fn verification_is_single_use_and_time_bounded() {
        let threshold = OtpService::expiry_threshold(Duration::from_secs(600));
        let filter = OtpService::verification_filter("a@x.com", "482913", threshold);

        // An already-consumed record can never match again, and only records
        // younger than the TTL qualify.
        assert!(!filter.get_bool("verified").unwrap());
        let bound = filter.get_document("created_at").unwrap();
        assert_eq!(bound.get("$gt"), Some(&Bson::DateTime(threshold)));
        assert_eq!(filter.get_str("code").unwrap(), "482913");
        assert_eq!(filter.get_str("email_address").unwrap(), "a@x.com");
    }

    #[test]
    fn expiry_threshold_sits_one_ttl_in_the_past() {
        let threshold = OtpService::expiry_threshold(Duration::from_secs(600));
        let lag = Utc::now().timestamp_millis() - threshold.timestamp_millis();
        assert!((600_000..601_000).contains(&lag), "lag was {lag}ms");
    }
}
