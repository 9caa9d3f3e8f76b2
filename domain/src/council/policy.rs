//! Timing and quorum policy for council stages.

/// Per-call timeout of a first attempt, in seconds.
pub const FIRST_ATTEMPT_TIMEOUT_SECS: f64 = 120.0;

/// Retry timeout used when no call of the batch succeeded, in seconds.
pub const DEFAULT_RETRY_TIMEOUT_SECS: f64 = 120.0;

/// Lower bound on the retry timeout, in seconds.
pub const MIN_RETRY_TIMEOUT_SECS: f64 = 10.0;

/// Timeout of the single chairman call, in seconds.
pub const CHAIRMAN_TIMEOUT_SECS: f64 = 120.0;

/// Timeout of the title side task, in seconds.
pub const TITLE_TIMEOUT_SECS: f64 = 30.0;

/// Timeout for the retry round of a batch.
///
/// The slowest successful call of the same batch is a good estimate of how
/// long a healthy worker needs, floored at [`MIN_RETRY_TIMEOUT_SECS`].
///
/// ```
/// use council_domain::council::policy::retry_timeout;
///
/// assert_eq!(retry_timeout(&[5.0, 30.0]), 30.0);
/// assert_eq!(retry_timeout(&[]), 120.0);
/// assert_eq!(retry_timeout(&[2.0, 9.5]), 10.0);
/// ```
pub fn retry_timeout(successful_elapsed: &[f64]) -> f64 {
    let slowest = successful_elapsed
        .iter()
        .copied()
        .filter(|t| t.is_finite())
        .reduce(f64::max)
        .unwrap_or(DEFAULT_RETRY_TIMEOUT_SECS);
    slowest.max(MIN_RETRY_TIMEOUT_SECS)
}

/// Number of distinct successes that constitutes a majority: `ceil(total / 2)`.
///
/// Returns `None` for an empty stage, where no majority can ever be reached.
pub fn majority_threshold(total: usize) -> Option<usize> {
    if total == 0 {
        None
    } else {
        Some(total.div_ceil(2))
    }
}
