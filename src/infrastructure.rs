pub mod clock;
pub mod limiter;
pub mod mail;
pub mod storage;
pub mod utils;
pub mod web;
