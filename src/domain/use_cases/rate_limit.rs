use chrono::{DateTime, TimeDelta, Utc};

use crate::{
    entities::rate_window::{RateDecision, RateWindow},
    repositories::rate_store::RateStore,
    settings::{AppConfig, MAX_DURATION_MS},
};

/// Reset-style quota: once a window has fully elapsed the next submission
/// opens a fresh window with a full quota.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    pub window: TimeDelta,
    pub max_per_window: u32,
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        RateLimitPolicy {
            window: TimeDelta::hours(1),
            max_per_window: 3,
        }
    }
}

impl From<&AppConfig> for RateLimitPolicy {
    fn from(config: &AppConfig) -> Self {
        RateLimitPolicy {
            window: TimeDelta::milliseconds(config.rate_limit_window_ms.min(MAX_DURATION_MS) as i64),
            max_per_window: config.max_requests_per_window,
        }
    }
}

impl RateLimitPolicy {
    pub fn is_expired(&self, record: &RateWindow, now: DateTime<Utc>) -> bool {
        match record.window_start() {
            Some(start) => now - start > self.window,
            None => true,
        }
    }

    /// Applies one submission attempt to `current`, returning the record to
    /// store and the decision. A rejected attempt leaves the record untouched.
    pub fn admit(&self, current: Option<RateWindow>, now: DateTime<Utc>) -> (RateWindow, RateDecision) {
        let mut record = match current {
            Some(record) if !self.is_expired(&record, now) => record,
            _ => {
                let fresh = RateWindow::start(now);
                let decision = RateDecision {
                    allowed: true,
                    remaining: self.max_per_window.saturating_sub(1),
                    reset_at: now + self.window,
                };
                return (fresh, decision);
            }
        };

        let start = record.window_start().unwrap_or(now);
        let reset_at = start + self.window;

        if record.len() >= self.max_per_window {
            return (
                record,
                RateDecision {
                    allowed: false,
                    remaining: 0,
                    reset_at,
                },
            );
        }

        record.record(now);
        let remaining = self.max_per_window.saturating_sub(record.len());
        (
            record,
            RateDecision {
                allowed: true,
                remaining,
                reset_at,
            },
        )
    }

    /// Decision returned when the store cannot be trusted.
    pub fn fail_open(&self, now: DateTime<Utc>) -> RateDecision {
        RateDecision {
            allowed: true,
            remaining: self.max_per_window,
            reset_at: now,
        }
    }
}

pub struct RateLimiter<S>
where
    S: RateStore,
{
    store: S,
    policy: RateLimitPolicy,
}

impl<S> RateLimiter<S>
where
    S: RateStore,
{
    pub fn new(store: S, policy: RateLimitPolicy) -> Self {
        RateLimiter { store, policy }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn policy(&self) -> &RateLimitPolicy {
        &self.policy
    }

    /// Counts a submission attempt from `identity` and reports whether it is
    /// within quota. Store failures fail open.
    pub fn check_and_record(&self, identity: &str, now: DateTime<Utc>) -> RateDecision {
        let policy = self.policy;

        if let Err(e) = self.store.purge_expired(&|record| policy.is_expired(record, now)) {
            tracing::warn!("Rate store cleanup failed: {}", e);
        }

        let mut decision = None;
        let result = self.store.update(identity, &mut |current| {
            let (next, outcome) = policy.admit(current, now);
            decision = Some(outcome);
            next
        });

        match (result, decision) {
            (Ok(()), Some(decision)) => decision,
            (Ok(()), None) => policy.fail_open(now),
            (Err(e), _) => {
                tracing::warn!(client = %identity, "Rate limit check failed open: {}", e);
                policy.fail_open(now)
            }
        }
    }
}

/// Human readable time left until `reset_at`, e.g. "1 hour and 5 minutes".
pub fn format_remaining_time(reset_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let diff = (reset_at - now).num_milliseconds();
    if diff <= 0 {
        return "0 minutes".to_string();
    }

    let minutes = (diff + 59_999) / 60_000;
    let hours = minutes / 60;
    let rest = minutes % 60;

    if hours > 0 {
        let mut text = plural(hours, "hour");
        if rest > 0 {
            text.push_str(" and ");
            text.push_str(&plural(rest, "minute"));
        }
        text
    } else {
        plural(minutes, "minute")
    }
}

fn plural(n: i64, unit: &str) -> String {
    if n > 1 {
        format!("{n} {unit}s")
    } else {
        format!("{n} {unit}")
    }
}
