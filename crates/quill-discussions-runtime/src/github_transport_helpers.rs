use std::time::Duration;

use reqwest::header::{HeaderMap, RETRY_AFTER};

const RATE_LIMIT_REMAINING: &str = "x-ratelimit-remaining";
const RATE_LIMIT_RESET: &str = "x-ratelimit-reset";
const MAX_BACKOFF_MS: u64 = 30_000;
const MAX_RATE_LIMIT_WAIT: Duration = Duration::from_secs(60);

fn header_u64(headers: &HeaderMap, name: &str) -> Option<u64> {
    headers.get(name)?.to_str().ok()?.trim().parse::<u64>().ok()
}

/// Server-directed wait before retrying a GraphQL request.
///
/// `retry-after` (secondary rate limit) wins. An exhausted primary budget
/// (`x-ratelimit-remaining: 0`) waits until `x-ratelimit-reset`, given in epoch seconds.
pub(crate) fn rate_limit_wait(headers: &HeaderMap, now_unix: i64) -> Option<Duration> {
    if let Some(seconds) = header_u64(headers, RETRY_AFTER.as_str()) {
        return Some(Duration::from_secs(seconds));
    }
    if header_u64(headers, RATE_LIMIT_REMAINING)? != 0 {
        return None;
    }
    let reset = header_u64(headers, RATE_LIMIT_RESET)?;
    let now = u64::try_from(now_unix).unwrap_or(0);
    Some(Duration::from_secs(reset.saturating_sub(now)))
}

/// Server-directed waits are honored up to a minute; otherwise exponential backoff.
pub(crate) fn retry_delay(
    base_delay_ms: u64,
    attempt: usize,
    rate_limit_wait: Option<Duration>,
) -> Duration {
    if let Some(wait) = rate_limit_wait {
        return wait
            .max(Duration::from_millis(base_delay_ms))
            .min(MAX_RATE_LIMIT_WAIT);
    }
    let exponent = attempt.saturating_sub(1).min(10) as u32;
    let scaled = base_delay_ms.saturating_mul(2_u64.saturating_pow(exponent));
    Duration::from_millis(scaled.min(MAX_BACKOFF_MS))
}

pub(crate) fn is_retryable_transport_error(error: &reqwest::Error) -> bool {
    error.is_timeout() || error.is_connect() || error.is_request()
}

// GitHub reports both rate limits as 403 (sometimes 429) with rate-limit headers.
pub(crate) fn is_retryable_github_status(status: u16, rate_limited: bool) -> bool {
    status == 429 || status >= 500 || (status == 403 && rate_limited)
}

pub(crate) fn truncate_for_error(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut truncated = text.chars().take(max_chars).collect::<String>();
    truncated.push_str("...");
    truncated
}
