use mongodb::Database;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::services::mail_service::MailSender;
use crate::services::otp_service::OtpService;
use crate::services::token_service::ResetTokenService;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub config: Arc<AppConfig>,
    pub otp_service: OtpService,
    pub token_service: ResetTokenService,
    pub mailer: Arc<dyn MailSender>,
}

impl AppState {
    pub fn new(db: Database, config: AppConfig, mailer: Arc<dyn MailSender>) -> Self {
        let otp_service = OtpService::new(&db, &config.reset);
        let token_service = ResetTokenService::new(&config.reset);

        AppState {
            db,
            config: Arc::new(config),
            otp_service,
            token_service,
            mailer,
        }
    }
}
