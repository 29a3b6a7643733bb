//! Exponential back-off with jitter for status polling.

use std::time::Duration;

/// Upper bound on a single back-off sleep.
const MAX_DELAY_MS: u64 = 60_000;

/// Delay before poll number `attempt + 1`, for a zero-based `attempt`.
///
/// Doubles from `base_ms` with ±25 % jitter, capped at 60 s.
pub(crate) fn backoff_delay(base_ms: u64, attempt: u32) -> Duration {
    let computed = base_ms.saturating_mul(1u64 << attempt.min(10));
    let capped = computed.min(MAX_DELAY_MS);
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    let delay_ms = (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
    Duration::from_millis(delay_ms)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_doubles_within_jitter_band() {
        for attempt in 0..4 {
            let expected = 1_000u64 << attempt;
            let delay = backoff_delay(1_000, attempt).as_millis();
            let low = u128::from(expected * 3 / 4);
            let high = u128::from(expected * 5 / 4);
            assert!(
                (low..=high).contains(&delay),
                "attempt {attempt}: {delay}ms outside {low}..={high}"
            );
        }
    }

    #[test]
    fn delay_is_capped() {
        assert!(backoff_delay(1_000, 30).as_millis() <= 75_000);
    }

    #[test]
    fn zero_base_never_sleeps() {
        assert_eq!(backoff_delay(0, 3), Duration::ZERO);
    }
}
