pub(crate) mod mail_service;
pub(crate) mod otp_service;
pub(crate) mod token_service;
