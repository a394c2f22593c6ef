/// 24 hours, in milliseconds
pub const DEFAULT_TTL_MS: i64 = 24 * 60 * 60 * 1000;

/// Whether an entry written at `stored_at_ms` may still be served at `now_ms`.
///
/// Strictly younger than the TTL. A timestamp from the future (clock skew)
/// counts as fresh.
pub fn is_fresh(stored_at_ms: i64, now_ms: i64, ttl_ms: i64) -> bool {
    now_ms.saturating_sub(stored_at_ms) < ttl_ms
}

pub fn hours_to_ms(hours: u64) -> i64 {
    (hours as i64).saturating_mul(60 * 60 * 1000)
}
