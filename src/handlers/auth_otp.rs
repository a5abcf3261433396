use axum::{
    extract::State,
    http::{header, HeaderMap},
    response::Json,
};
use bcrypt::{hash, DEFAULT_COST};
use mongodb::bson::doc;
use mongodb::Collection;
use validator::Validate;

use crate::dtos::auth_dtos::{
    validation_message, ForgotPasswordRequest, MessageResponse, ResetPasswordRequest,
    ResetTokenData, VerifyOtpRequest, VerifyOtpResponse,
};
use crate::errors::{AppError, Result};
use crate::models::admin::Admin;
use crate::state::AppState;

// 1. Requested: issue a code and mail it
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(req): Json<ForgotPasswordRequest>,
) -> Result<Json<MessageResponse>> {
    req.validate()
        .map_err(|e| AppError::validation(validation_message(&e)))?;

    let generic = MessageResponse {
        success: true,
        message: "If that email address is registered, an OTP has been sent".to_string(),
    };

    let admins: Collection<Admin> = state.db.collection("admins");
    let admin = admins
        .find_one(doc! { "email_address": &req.email_address })
        .await?;

    // Same answer as the happy path so callers cannot probe for accounts
    let Some(admin) = admin else {
        tracing::warn!("password reset requested for unknown email address");
        return Ok(Json(generic));
    };

    let code = state.otp_service.generate(&admin.email_address).await?;
    // A delivery failure leaves the stored code valid; the caller can retry
    state.mailer.send_otp(&admin.email_address, &code).await?;

    tracing::info!("OTP sent to {}", admin.email_address);
    Ok(Json(generic))
}

// 2. Verified: flip the record and hand back a reset capability
pub async fn verify_otp(
    State(state): State<AppState>,
    Json(req): Json<VerifyOtpRequest>,
) -> Result<Json<VerifyOtpResponse>> {
    req.validate()
        .map_err(|e| AppError::validation(validation_message(&e)))?;

    state.otp_service.verify(&req.email_address, &req.otp).await?;

    let reset_token = state.token_service.issue(&req.email_address)?;

    Ok(Json(VerifyOtpResponse {
        success: true,
        message: "OTP verified successfully".to_string(),
        data: ResetTokenData { reset_token },
    }))
}

// 3. Reset. Check order is load-bearing: mismatch, then token, then OTP
// state, then the credential write.
pub async fn reset_password(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>> {
    if req.password != req.confirm_password {
        return Err(AppError::PasswordMismatch);
    }

    req.validate()
        .map_err(|e| AppError::validation(validation_message(&e)))?;

    let token = bearer_token(&headers).ok_or(AppError::InvalidOrExpiredToken)?;
    let email = state.token_service.authenticate(token)?;

    // A valid token is not enough: the verified record must still be live.
    // This is what makes a successful reset terminal.
    state.otp_service.find_verified(&email).await?;

    let password_hash = hash(&req.password, DEFAULT_COST)?;

    let admins: Collection<Admin> = state.db.collection("admins");
    let result = admins
        .update_one(
            doc! { "email_address": &email },
            doc! { "$set": { "password_hash": password_hash } },
        )
        .await?;
    if result.matched_count == 0 {
        return Err(AppError::NotFound);
    }

    state.otp_service.delete(&email).await?;

    tracing::info!("password reset successful for {}", email);

    Ok(Json(MessageResponse {
        success: true,
        message: "Password reset successfully".to_string(),
    }))
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AppConfig, MailConfig, ResetConfig};
    use crate::services::mail_service::MailSender;
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::time::Duration;

    struct NoopMailer;

    #[async_trait]
    impl MailSender for NoopMailer {
        async fn send_otp(&self, _email: &str, _code: &str) -> crate::errors::Result<()> {
            Ok(())
        }
    }

    // The driver connects lazily, so a state built on an unreachable URI is
    // fine for paths that fail before touching the store.
    async fn test_state() -> AppState {
        let client = mongodb::Client::with_uri_str("mongodb://127.0.0.1:27017")
            .await
            .unwrap();
        let config = AppConfig {
            database_url: "mongodb://127.0.0.1:27017".to_string(),
            database_name: "menucard_test".to_string(),
            host: "127.0.0.1".to_string(),
            port: 0,
            session_secret: "session-secret".to_string(),
            session_lifetime: Duration::from_secs(24 * 3600),
            reset: ResetConfig::new("reset-secret".to_string()),
            mail: MailConfig {
                api_url: String::new(),
                api_key: String::new(),
                from: String::new(),
            },
        };
        AppState::new(client.database("menucard_test"), config, Arc::new(NoopMailer))
    }

    fn request(password: &str, confirm: &str) -> ResetPasswordRequest {
        ResetPasswordRequest {
            password: password.to_string(),
            confirm_password: confirm.to_string(),
        }
    }

    fn bearer(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, format!("Bearer {value}").parse().unwrap());
        headers
    }

    #[tokio::test]
    async fn password_mismatch_wins_over_an_invalid_token() {
        let state = test_state().await;
        let result = reset_password(
            State(state),
            bearer("garbage"),
            Json(request("Str0ng#Pass", "Other#Pass1")),
        )
        .await;

        assert!(matches!(result, Err(AppError::PasswordMismatch)));
    }

    #[tokio::test]
    async fn invalid_token_is_rejected_before_any_lookup() {
        let state = test_state().await;
        let result = reset_password(
            State(state),
            bearer("garbage"),
            Json(request("Str0ng#Pass", "Str0ng#Pass")),
        )
        .await;

        assert!(matches!(result, Err(AppError::InvalidOrExpiredToken)));
    }

    #[tokio::test]
    async fn missing_authorization_header_reads_as_a_bad_token() {
        let state = test_state().await;
        let result = reset_password(
            State(state),
            HeaderMap::new(),
            Json(request("Str0ng#Pass", "Str0ng#Pass")),
        )
        .await;

        assert!(matches!(result, Err(AppError::InvalidOrExpiredToken)));
    }

    #[tokio::test]
    async fn weak_replacement_password_is_rejected_after_the_mismatch_check() {
        let state = test_state().await;
        let result = reset_password(
            State(state),
            bearer("garbage"),
            Json(request("weak", "weak")),
        )
        .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
