pub mod client_gate;
pub mod contact;
pub mod rate_limit;
pub mod validation;
