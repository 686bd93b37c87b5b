pub mod key_value;
pub mod mailer;
pub mod rate_store;
