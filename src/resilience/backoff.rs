//! Exponential backoff with jitter.

use rand::Rng;
use std::time::Duration;

/// Delay inserted before retry attempt `next_attempt` (1-based).
///
/// The raw delay for attempt k is `base * multiplier^(k-1)`, capped at
/// `max_ms`, then scaled by a uniform jitter in [0.5, 1.0] so concurrent
/// sagas retrying against the same dependency spread out.
pub fn backoff_delay(next_attempt: u32, base_ms: u64, max_ms: u64, multiplier: f64) -> Duration {
    if next_attempt <= 1 {
        return Duration::ZERO;
    }

    let exponent = (next_attempt - 1) as i32;
    let raw_ms = base_ms as f64 * multiplier.powi(exponent);
    let capped_ms = raw_ms.min(max_ms as f64);

    let jitter = rand::thread_rng().gen_range(0.5..=1.0);
    Duration::from_millis((capped_ms * jitter).round() as u64)
}
