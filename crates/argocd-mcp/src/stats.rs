// ── Request stats ──
//
// Process-wide counters updated by every resource read. Lock-free so
// handlers can run concurrently without coordinating.

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Sentinel for "no request served yet".
const NEVER: i64 = i64::MIN;

#[derive(Debug)]
pub struct RequestStats {
    start_time: DateTime<Utc>,
    request_count: AtomicU64,
    /// Microseconds since the epoch; only ever moves forward.
    last_request_micros: AtomicI64,
}

/// Point-in-time copy of [`RequestStats`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub start_time: DateTime<Utc>,
    pub request_count: u64,
    pub last_request: Option<DateTime<Utc>>,
}

impl RequestStats {
    pub fn new() -> Self {
        Self {
            start_time: Utc::now(),
            request_count: AtomicU64::new(0),
            last_request_micros: AtomicI64::new(NEVER),
        }
    }

    /// Count one served request. Returns the new total.
    pub fn record(&self) -> u64 {
        let now = Utc::now().timestamp_micros();
        self.last_request_micros.fetch_max(now, Ordering::AcqRel);
        self.request_count.fetch_add(1, Ordering::AcqRel) + 1
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    pub fn request_count(&self) -> u64 {
        self.request_count.load(Ordering::Acquire)
    }

    pub fn last_request(&self) -> Option<DateTime<Utc>> {
        match self.last_request_micros.load(Ordering::Acquire) {
            NEVER => None,
            micros => DateTime::from_timestamp_micros(micros),
        }
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            start_time: self.start_time,
            request_count: self.request_count(),
            last_request: self.last_request(),
        }
    }
}

impl Default for RequestStats {
    fn default() -> Self {
        Self::new()
    }
}
