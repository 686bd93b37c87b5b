use std::sync::Arc;

mod domain;
mod interfaces;
pub mod infrastructure;
pub mod errors;
pub mod settings;
pub mod constants;
pub mod graceful_shutdown;

pub use domain::{entities, use_cases};
pub use interfaces::{handlers, repositories, routes};
pub use infrastructure::{clock, limiter, mail, storage, utils, web};

use clock::{Clock, SystemClock};
use limiter::memory_store::MemoryRateStore;
use repositories::mailer::Mailer;
use use_cases::{
    contact::{ContactHandler, MailSettings},
    rate_limit::{RateLimitPolicy, RateLimiter},
    validation::{SubmissionValidator, ValidationRules},
};

pub struct AppState {
    pub contact_handler: AppContactHandler,
    pub clock: Arc<dyn Clock>,
    pub trust_forwarded_headers: bool,
}

pub type AppContactHandler = ContactHandler<MemoryRateStore>;

impl AppState {
    pub fn new(config: &settings::AppConfig, mailer: Arc<dyn Mailer>) -> Self {
        Self::with_clock(config, mailer, Arc::new(SystemClock))
    }

    pub fn with_clock(
        config: &settings::AppConfig,
        mailer: Arc<dyn Mailer>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let rate_limiter = RateLimiter::new(MemoryRateStore::new(), RateLimitPolicy::from(config));
        let validator = SubmissionValidator::new(ValidationRules::from(config));
        let contact_handler = ContactHandler::new(
            rate_limiter,
            validator,
            MailSettings::from(config),
            mailer,
        );

        AppState {
            contact_handler,
            clock,
            trust_forwarded_headers: config.trust_forwarded_headers,
        }
    }
}
