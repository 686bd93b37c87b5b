pub mod log_mailer;
pub mod resend;
