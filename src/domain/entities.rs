pub mod contact;
pub mod rate_window;
