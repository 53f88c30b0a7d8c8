//! Wall-clock helpers over `SystemTime`.

use std::time::{SystemTime, UNIX_EPOCH};

/// Milliseconds since the Unix epoch. Clamps to 0 on a pre-epoch clock.
pub fn now_unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Seconds since the Unix epoch. Clamps to 0 on a pre-epoch clock.
pub fn now_unix_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_millis_and_secs_agree() {
        let millis = now_unix_millis();
        let secs = now_unix_secs();
        // sampled moments are close, so the scales must line up
        assert!(millis / 1000 >= secs.saturating_sub(2));
        assert!(millis / 1000 <= secs + 2);
    }

    #[test]
    fn test_monotonic_enough() {
        let a = now_unix_millis();
        let b = now_unix_millis();
        assert!(b >= a);
    }
}
