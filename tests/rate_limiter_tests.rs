use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use contact_gate::{
    entities::rate_window::RateWindow,
    errors::StoreError,
    limiter::memory_store::MemoryRateStore,
    repositories::rate_store::RateStore,
    use_cases::rate_limit::{format_remaining_time, RateLimitPolicy, RateLimiter},
};

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 14, 9, 30, 0).unwrap()
}

fn limiter() -> RateLimiter<MemoryRateStore> {
    RateLimiter::new(MemoryRateStore::new(), RateLimitPolicy::default())
}

struct FailingStore;

impl RateStore for FailingStore {
    fn get(&self, _key: &str) -> Result<Option<RateWindow>, StoreError> {
        Err(StoreError::Unavailable("down".into()))
    }

    fn update(
        &self,
        _key: &str,
        _apply: &mut dyn FnMut(Option<RateWindow>) -> RateWindow,
    ) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("down".into()))
    }

    fn purge_expired(&self, _is_expired: &dyn Fn(&RateWindow) -> bool) -> Result<usize, StoreError> {
        Err(StoreError::Unavailable("down".into()))
    }

    fn remove(&self, _key: &str) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("down".into()))
    }
}

#[test]
fn first_three_submissions_are_allowed_with_decreasing_remaining() {
    let limiter = limiter();

    let remaining: Vec<u32> = (0..3)
        .map(|i| {
            let decision = limiter.check_and_record("203.0.113.7", t0() + TimeDelta::minutes(i));
            assert!(decision.allowed);
            assert_eq!(decision.reset_at, t0() + TimeDelta::hours(1));
            decision.remaining
        })
        .collect();

    assert_eq!(remaining, vec![2, 1, 0]);
}

#[test]
fn fourth_submission_within_window_is_rejected() {
    let limiter = limiter();
    for _ in 0..3 {
        limiter.check_and_record("203.0.113.7", t0());
    }

    let decision = limiter.check_and_record("203.0.113.7", t0() + TimeDelta::minutes(59));

    assert!(!decision.allowed);
    assert_eq!(decision.remaining, 0);
    assert_eq!(decision.reset_at, t0() + TimeDelta::hours(1));
}

#[test]
fn rejected_attempts_do_not_increment_the_count() {
    let limiter = limiter();
    for i in 0..8 {
        limiter.check_and_record("203.0.113.7", t0() + TimeDelta::seconds(i));
    }

    let record = limiter.store().get("203.0.113.7").unwrap().unwrap();
    assert_eq!(record.count, 3);
    assert_eq!(record.len(), 3);
}

#[test]
fn window_is_still_closed_exactly_at_its_end() {
    let limiter = limiter();
    for _ in 0..3 {
        limiter.check_and_record("203.0.113.7", t0());
    }

    let decision = limiter.check_and_record("203.0.113.7", t0() + TimeDelta::hours(1));

    assert!(!decision.allowed);
}

#[test]
fn elapsed_window_resets_to_a_fresh_quota() {
    let limiter = limiter();
    for _ in 0..4 {
        limiter.check_and_record("203.0.113.7", t0());
    }
    let later = t0() + TimeDelta::hours(1) + TimeDelta::milliseconds(1);

    let decision = limiter.check_and_record("203.0.113.7", later);

    assert!(decision.allowed);
    assert_eq!(decision.remaining, 2);
    assert_eq!(decision.reset_at, later + TimeDelta::hours(1));
    let record = limiter.store().get("203.0.113.7").unwrap().unwrap();
    assert_eq!(record.count, 1);
    assert_eq!(record.window_start(), Some(later));
}

#[test]
fn identities_are_limited_independently() {
    let limiter = limiter();
    for _ in 0..3 {
        limiter.check_and_record("203.0.113.7", t0());
    }

    assert!(!limiter.check_and_record("203.0.113.7", t0()).allowed);
    assert!(limiter.check_and_record("198.51.100.20", t0()).allowed);
}

#[test]
fn checks_purge_expired_records_of_other_identities() {
    let limiter = limiter();
    limiter.check_and_record("stale", t0());
    limiter.check_and_record("recent", t0() + TimeDelta::minutes(90));

    limiter.check_and_record("caller", t0() + TimeDelta::minutes(120));

    assert!(limiter.store().get("stale").unwrap().is_none());
    assert!(limiter.store().get("recent").unwrap().is_some());
    assert_eq!(limiter.store().tracked_identities(), 2);
}

#[test]
fn purge_does_not_change_the_result_for_the_caller() {
    let limiter = limiter();
    for _ in 0..3 {
        limiter.check_and_record("203.0.113.7", t0());
    }

    let decision = limiter.check_and_record("203.0.113.7", t0() + TimeDelta::hours(2));

    assert!(decision.allowed);
    assert_eq!(decision.remaining, 2);
}

#[test]
fn store_failure_fails_open() {
    let limiter = RateLimiter::new(FailingStore, RateLimitPolicy::default());
    let now = t0();

    for _ in 0..5 {
        let decision = limiter.check_and_record("203.0.113.7", now);
        assert!(decision.allowed);
        assert_eq!(decision.remaining, 3);
        assert_eq!(decision.reset_at, now);
    }
}

#[test]
fn concurrent_checks_on_one_identity_admit_exactly_the_quota() {
    let limiter = limiter();
    let allowed = AtomicUsize::new(0);

    std::thread::scope(|scope| {
        for _ in 0..32 {
            scope.spawn(|| {
                if limiter.check_and_record("203.0.113.7", t0()).allowed {
                    allowed.fetch_add(1, Ordering::SeqCst);
                }
            });
        }
    });

    assert_eq!(allowed.load(Ordering::SeqCst), 3);
}

#[test]
fn custom_policy_is_honoured() {
    let policy = RateLimitPolicy {
        window: TimeDelta::minutes(5),
        max_per_window: 1,
    };
    let limiter = RateLimiter::new(MemoryRateStore::new(), policy);

    assert!(limiter.check_and_record("a", t0()).allowed);
    assert!(!limiter.check_and_record("a", t0() + TimeDelta::minutes(4)).allowed);
    assert!(limiter.check_and_record("a", t0() + TimeDelta::minutes(6)).allowed);
}

#[test]
fn policy_treats_empty_record_as_absent() {
    let policy = RateLimitPolicy::default();

    let (record, decision) = policy.admit(Some(RateWindow::default()), t0());

    assert!(decision.allowed);
    assert_eq!(record, RateWindow::start(t0()));
}

#[test]
fn remaining_time_is_formatted_for_humans() {
    let now = t0();
    let cases = [
        (TimeDelta::zero(), "0 minutes"),
        (TimeDelta::seconds(-30), "0 minutes"),
        (TimeDelta::seconds(30), "1 minute"),
        (TimeDelta::minutes(45), "45 minutes"),
        (TimeDelta::minutes(60), "1 hour"),
        (TimeDelta::minutes(61), "1 hour and 1 minute"),
        (TimeDelta::minutes(125), "2 hours and 5 minutes"),
    ];

    for (delta, expected) in cases {
        assert_eq!(format_remaining_time(now + delta, now), expected, "for {delta}");
    }
}
