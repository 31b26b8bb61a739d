//! Per-user daily creation quotas, shared by event and comment creation.
//!
//! The counter update is not transactional with the guarded creation: a
//! failure after the increment leaves one quota slot consumed without a
//! created resource. The quota is a best-effort limiter, not a hard
//! invariant.

const DAY_MS: i64 = 86_400_000;

/// Millisecond timestamp of the UTC midnight preceding `now_ms`.
pub fn utc_midnight_ms(now_ms: i64) -> i64 {
    now_ms - now_ms.rem_euclid(DAY_MS)
}

#[derive(Debug, PartialEq, Eq)]
pub enum QuotaDecision {
    /// Same UTC day, counter under the limit: bump the counter.
    Increment,
    /// First creation of a new UTC day: stamp `day` and reset the counter to 1.
    Reset { day: i64 },
    /// Daily limit reached.
    Denied,
}

pub fn evaluate(last_day_ms: i64, creations_today: i32, limit: i32, now_ms: i64) -> QuotaDecision {
    let today = utc_midnight_ms(now_ms);
    if last_day_ms == today {
        if creations_today >= limit {
            QuotaDecision::Denied
        } else {
            QuotaDecision::Increment
        }
    } else {
        QuotaDecision::Reset { day: today }
    }
}
