//! Retry utilities for transient backend failures.
//!
//! Only `Timeout` and `ServiceUnavailable` from a connection failure, 429 or
//! 5xx are retried. Anything else fails at once.

use crate::error::DetectError;
use std::time::Duration;

/// Determine whether a detection error is worth retrying.
pub fn is_retryable(error: &DetectError) -> bool {
    match error {
        DetectError::Timeout { .. } => true,
        DetectError::ServiceUnavailable { status_code, .. } => match status_code {
            Some(code) => *code == 429 || (500..600).contains(code),
            None => true,
        },
        _ => false,
    }
}

/// Calculate exponential backoff duration for a given attempt.
///
/// Uses `base_delay * 2^attempt` with a cap at 30 seconds.
pub fn backoff_duration(attempt: u32, base_delay_ms: u64) -> Duration {
    let delay = base_delay_ms.saturating_mul(2u64.saturating_pow(attempt));
    Duration::from_millis(delay.min(30_000))
}
