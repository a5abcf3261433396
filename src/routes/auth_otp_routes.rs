use axum::{routing::post, Router};

use crate::{handlers::auth_otp, state::AppState};

pub fn auth_otp_routes() -> Router<AppState> {
    Router::new()
        // Request OTP for password reset
        .route("/forget-password", post(auth_otp::forgot_password))
        // Verify OTP, get a reset token back
        .route("/verify-otp", post(auth_otp::verify_otp))
        // Reset password with the token from verification
        .route("/reset-password", post(auth_otp::reset_password))
}
