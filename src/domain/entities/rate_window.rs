use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// Submission history of one client inside the current quota window.
///
/// The first timestamp marks the start of the window. The same document is
/// what the client pre-gate persists, e.g. `{"submissions":[1700000000000],"count":1}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateWindow {
    /// Epoch milliseconds of each recorded submission, oldest first.
    pub submissions: Vec<i64>,
    #[serde(default)]
    pub count: u32,
}

impl RateWindow {
    pub fn start(now: DateTime<Utc>) -> Self {
        RateWindow {
            submissions: vec![now.timestamp_millis()],
            count: 1,
        }
    }

    pub fn window_start(&self) -> Option<DateTime<Utc>> {
        self.submissions
            .first()
            .and_then(|millis| DateTime::from_timestamp_millis(*millis))
    }

    /// Number of submissions in the window. The list is authoritative over
    /// the stored `count` when the two disagree.
    pub fn len(&self) -> u32 {
        self.submissions.len() as u32
    }

    pub fn is_empty(&self) -> bool {
        self.submissions.is_empty()
    }

    pub fn record(&mut self, now: DateTime<Utc>) {
        self.submissions.push(now.timestamp_millis());
        self.count = self.len();
    }
}

/// Outcome of a quota check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateDecision {
    pub allowed: bool,
    pub remaining: u32,
    pub reset_at: DateTime<Utc>,
}

impl RateDecision {
    pub fn retry_after(&self, now: DateTime<Utc>) -> TimeDelta {
        (self.reset_at - now).max(TimeDelta::zero())
    }
}
