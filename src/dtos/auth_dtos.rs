use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::models::admin::Admin;

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 50, message = "Full name must be 3 to 50 characters long"))]
    pub full_name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email_address: String,

    #[validate(custom(function = validate_phone))]
    pub phone_number: String,

    #[validate(
        length(min = 8, max = 20, message = "Password must be 8 to 20 characters long"),
        custom(function = validate_password_strength)
    )]
    pub password: String,

    #[validate(must_match(other = password, message = "Passwords must match"))]
    pub confirm_password: String,

    #[validate(length(
        min = 3,
        max = 100,
        message = "Restaurant name must be 3 to 100 characters long"
    ))]
    pub restaurant_name: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email_address: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ForgotPasswordRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email_address: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct VerifyOtpRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email_address: String,

    #[validate(length(equal = 6, message = "OTP must be 6 digits"))]
    pub otp: String,
}

// Password equality is checked in the handler, not here: a mismatch is its
// own error kind and must surface before token authentication.
#[derive(Debug, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    #[validate(
        length(min = 8, max = 20, message = "Password must be 8 to 20 characters long"),
        custom(function = validate_password_strength)
    )]
    pub password: String,

    pub confirm_password: String,
}

fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    let digits = phone.strip_prefix('+').unwrap_or(phone);
    let ok = (7..=15).contains(&digits.len()) && digits.chars().all(|c| c.is_ascii_digit());
    if ok {
        Ok(())
    } else {
        let mut error = ValidationError::new("phone");
        error.message = Some("Invalid phone number format".into());
        Err(error)
    }
}

const PASSWORD_SPECIALS: &str = "@$!%#./*?&";

fn validate_password_strength(password: &str) -> Result<(), ValidationError> {
    let allowed = password
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || PASSWORD_SPECIALS.contains(c));
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_special = password.chars().any(|c| PASSWORD_SPECIALS.contains(c));

    if allowed && has_lower && has_upper && has_digit && has_special {
        Ok(())
    } else {
        let mut error = ValidationError::new("password_strength");
        error.message = Some(
            "Password must contain at least one uppercase letter, one lowercase letter, \
             one number and one special character"
                .into(),
        );
        Err(error)
    }
}

/// Flattens field errors into the single joined message the API returns.
pub fn validation_message(errors: &ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| match &e.message {
                Some(msg) => msg.to_string(),
                None => format!("{} is invalid", field),
            })
        })
        .collect();
    messages.sort();
    messages.join(", ")
}

// Response DTOs

#[derive(Debug, Serialize)]
pub struct AdminResponse {
    pub id: String,
    pub full_name: String,
    pub email_address: String,
    pub phone_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restaurant_name: Option<String>,
}

impl From<Admin> for AdminResponse {
    fn from(admin: Admin) -> Self {
        AdminResponse {
            id: admin.id.map(|id| id.to_hex()).unwrap_or_default(),
            full_name: admin.full_name,
            email_address: admin.email_address,
            phone_number: admin.phone_number,
            restaurant_name: admin.restaurant_name,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub success: bool,
    pub message: String,
    pub data: AdminResponse,
}

#[derive(Debug, Serialize)]
pub struct LoginData {
    pub admin: AdminResponse,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
    pub data: LoginData,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ResetTokenData {
    #[serde(rename = "resetToken")]
    pub reset_token: String,
}

#[derive(Debug, Serialize)]
pub struct VerifyOtpResponse {
    pub success: bool,
    pub message: String,
    pub data: ResetTokenData,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register_payload() -> RegisterRequest {
        RegisterRequest {
            full_name: "Ada Lovelace".to_string(),
            email_address: "ada@chopcentral.app".to_string(),
            phone_number: "+2348012345678".to_string(),
            password: "Str0ng#Pass".to_string(),
            confirm_password: "Str0ng#Pass".to_string(),
            restaurant_name: Some("Chop Central".to_string()),
        }
    }

    #[test]
    fn valid_register_payload_passes() {
        assert!(register_payload().validate().is_ok());
    }

    #[test]
    fn register_rejects_bad_email_and_phone() {
        let mut payload = register_payload();
        payload.email_address = "not-an-email".to_string();
        assert!(payload.validate().is_err());

        let mut payload = register_payload();
        payload.phone_number = "12ab34".to_string();
        let errors = payload.validate().unwrap_err();
        assert!(validation_message(&errors).contains("Invalid phone number format"));
    }

    #[test]
    fn register_rejects_mismatched_confirmation() {
        let mut payload = register_payload();
        payload.confirm_password = "Other#Pass1".to_string();
        let errors = payload.validate().unwrap_err();
        assert!(validation_message(&errors).contains("Passwords must match"));
    }

    #[test]
    fn password_strength_requires_all_character_classes() {
        for weak in ["alllowercase1#", "ALLUPPERCASE1#", "NoDigitsHere#", "NoSpecials12a"] {
            let mut payload = register_payload();
            payload.password = weak.to_string();
            payload.confirm_password = weak.to_string();
            assert!(payload.validate().is_err(), "expected {weak:?} to be rejected");
        }
    }

    #[test]
    fn otp_must_be_exactly_six_characters() {
        let request = VerifyOtpRequest {
            email_address: "ada@chopcentral.app".to_string(),
            otp: "12345".to_string(),
        };
        assert!(request.validate().is_err());

        let request = VerifyOtpRequest {
            email_address: "ada@chopcentral.app".to_string(),
            otp: "123456".to_string(),
        };
        assert!(request.validate().is_ok());
    }
}
