// src/errors.rs
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("MongoDB error: {0}")]
    MongoDB(#[from] mongodb::error::Error),

    #[error("Password hashing error: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Email address or phone number already in use")]
    DuplicateAdmin,

    #[error("Invalid email address or password")]
    InvalidCredentials,

    #[error("Admin not found")]
    NotFound,

    #[error("Invalid OTP")]
    InvalidOtp,

    #[error("Invalid or expired reset token")]
    InvalidOrExpiredToken,

    #[error("No verified OTP for this email address")]
    OtpNotVerified,

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("Token creation failed: {0}")]
    TokenCreation(String),

    #[error("Email delivery failed: {0}")]
    Delivery(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::MongoDB(e) => {
                tracing::error!("database error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Database error".to_string())
            }
            AppError::Hash(e) => {
                tracing::error!("bcrypt error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
            AppError::TokenCreation(e) => {
                tracing::error!("token creation error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
            AppError::Delivery(e) => {
                tracing::error!("mail delivery error: {}", e);
                (StatusCode::BAD_GATEWAY, "Failed to send OTP email".to_string())
            }
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::DuplicateAdmin => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::InvalidCredentials => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::NotFound => (StatusCode::NOT_FOUND, self.to_string()),
            AppError::InvalidOtp => (StatusCode::BAD_REQUEST, "Invalid OTP".to_string()),
            AppError::InvalidOrExpiredToken => {
                (StatusCode::UNAUTHORIZED, "Invalid or expired token".to_string())
            }
            AppError::OtpNotVerified => {
                (StatusCode::FORBIDDEN, "Invalid or expired OTP".to_string())
            }
            AppError::PasswordMismatch => (StatusCode::BAD_REQUEST, self.to_string()),
        };

        let body = Json(json!({
            "success": false,
            "message": message,
        }));

        (status, body).into_response()
    }
}

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn delivery(msg: impl Into<String>) -> Self {
        AppError::Delivery(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn envelope(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn invalid_otp_maps_to_400_with_generic_message() {
        let (status, body) = envelope(AppError::InvalidOtp).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Invalid OTP");
    }

    #[tokio::test]
    async fn reset_flow_errors_map_to_distinct_statuses() {
        let (status, _) = envelope(AppError::PasswordMismatch).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = envelope(AppError::InvalidOrExpiredToken).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) = envelope(AppError::OtpNotVerified).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["message"], "Invalid or expired OTP");
    }

    #[tokio::test]
    async fn internal_errors_do_not_leak_detail() {
        let (status, body) =
            envelope(AppError::TokenCreation("HS256 key too short".to_string())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "Internal server error");

        let (status, body) = envelope(AppError::Delivery("connection refused".to_string())).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["message"], "Failed to send OTP email");
    }
}
