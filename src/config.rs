// config.rs
use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub database_name: String,
    pub host: String,
    pub port: u16,
    pub session_secret: String,
    pub session_lifetime: Duration,
    pub reset: ResetConfig,
    pub mail: MailConfig,
}

/// Knobs for the password-reset flow. Injected into the OTP engine and the
/// token issuer at construction so tests can shrink the windows.
#[derive(Debug, Clone)]
pub struct ResetConfig {
    pub secret: String,
    pub otp_ttl: Duration,
    pub token_ttl: Duration,
    pub code_length: usize,
}

#[derive(Debug, Clone)]
pub struct MailConfig {
    pub api_url: String,
    pub api_key: String,
    pub from: String,
}

impl ResetConfig {
    pub fn new(secret: String) -> Self {
        ResetConfig {
            secret,
            otp_ttl: Duration::from_secs(600),
            token_ttl: Duration::from_secs(10 * 60),
            code_length: 6,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        AppConfig {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            database_name: env::var("DATABASE_NAME").unwrap_or_else(|_| "menucard".to_string()),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .expect("PORT must be a number"),
            session_secret: env::var("JWT_TOKEN_SECRET").expect("JWT_TOKEN_SECRET must be set"),
            session_lifetime: Duration::from_secs(
                env::var("JWT_TOKEN_LIFETIME_HOURS")
                    .unwrap_or_else(|_| "24".to_string())
                    .parse::<u64>()
                    .expect("JWT_TOKEN_LIFETIME_HOURS must be a number")
                    * 3600,
            ),
            reset: ResetConfig::new(env::var("JWT_SECRET").expect("JWT_SECRET must be set")),
            mail: MailConfig {
                api_url: env::var("MAIL_API_URL")
                    .unwrap_or_else(|_| "https://api.resend.com/emails".to_string()),
                api_key: env::var("MAIL_API_KEY").unwrap_or_default(),
                from: env::var("MAIL_FROM")
                    .unwrap_or_else(|_| "Chop Central <no-reply@chopcentral.app>".to_string()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_config_carries_fixed_windows() {
        let reset = ResetConfig::new("top-secret".to_string());
        assert_eq!(reset.otp_ttl, Duration::from_secs(600));
        assert_eq!(reset.token_ttl, Duration::from_secs(10 * 60));
        assert_eq!(reset.code_length, 6);
    }
}
