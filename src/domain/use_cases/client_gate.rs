use chrono::{DateTime, TimeDelta, Utc};

use crate::{
    entities::{contact::parse_epoch_millis, rate_window::RateDecision},
    errors::ErrorKind,
    infrastructure::storage::local_rate_store::LocalRateStore,
    repositories::{key_value::KeyValueStorage, rate_store::RateStore},
    use_cases::{
        rate_limit::{format_remaining_time, RateLimitPolicy, RateLimiter},
        validation::TimingWindow,
    },
};

const LOCAL_IDENTITY: &str = "local";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimingCheck {
    pub valid: bool,
    pub time_taken: TimeDelta,
    pub error: Option<ErrorKind>,
}

/// Advisory checks run before a form is posted.
///
/// Nothing here is trusted by the server, which repeats its own quota and
/// validation on every request.
pub struct ClientPreGate<S>
where
    S: KeyValueStorage,
{
    limiter: RateLimiter<LocalRateStore<S>>,
    timing: TimingWindow,
}

impl<S> ClientPreGate<S>
where
    S: KeyValueStorage,
{
    pub fn new(storage: S, policy: RateLimitPolicy, timing: TimingWindow) -> Self {
        ClientPreGate {
            limiter: RateLimiter::new(LocalRateStore::new(storage), policy),
            timing,
        }
    }

    pub fn storage(&self) -> &S {
        self.limiter.store().storage()
    }

    pub fn check_rate_limit(&self, now: DateTime<Utc>) -> RateDecision {
        self.limiter.check_and_record(LOCAL_IDENTITY, now)
    }

    /// Forgets every recorded submission.
    pub fn reset(&self) {
        if let Err(e) = self.limiter.store().remove(LOCAL_IDENTITY) {
            tracing::warn!("Failed to reset client rate limit: {}", e);
        }
    }

    /// Checks the delay since `started_at` (epoch millis). An unreadable
    /// start time passes.
    pub fn validate_timing(&self, started_at: &str, now: DateTime<Utc>) -> TimingCheck {
        let Some(start) = parse_epoch_millis(started_at) else {
            tracing::warn!("Unreadable form start time: {:?}", started_at);
            return TimingCheck {
                valid: true,
                time_taken: TimeDelta::zero(),
                error: None,
            };
        };

        let time_taken = now - start;
        match self.timing.check(start, now) {
            Ok(_) => TimingCheck {
                valid: true,
                time_taken,
                error: None,
            },
            Err(kind) => TimingCheck {
                valid: false,
                time_taken,
                error: Some(kind),
            },
        }
    }

    /// Rate limit first, then timing when a start time is known.
    pub fn pre_check(&self, started_at: Option<&str>, now: DateTime<Utc>) -> Result<RateDecision, ErrorKind> {
        let decision = self.check_rate_limit(now);
        if !decision.allowed {
            return Err(ErrorKind::RateLimited);
        }

        if let Some(started_at) = started_at {
            if let Some(kind) = self.validate_timing(started_at, now).error {
                return Err(kind);
            }
        }

        Ok(decision)
    }

    pub fn remaining_time(&self, decision: &RateDecision, now: DateTime<Utc>) -> String {
        format_remaining_time(decision.reset_at, now)
    }
}

/// Value to embed in the form as `submissionTime` when it is rendered.
pub fn submission_timestamp(now: DateTime<Utc>) -> String {
    now.timestamp_millis().to_string()
}
