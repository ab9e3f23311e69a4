//! Token consumption shared by the rate-limited handlers.

use crate::domain::foundation::ClientIdentity;
use crate::ports::{RateLimitAction, RateLimitDenied, RateLimitKey, RateLimitResult, RateLimitStatus, RateLimiter};

/// Consumes one token for `identity`.
///
/// A limiter failure lets the request through with no status to report.
pub(crate) async fn consume_token(
    limiter: &dyn RateLimiter,
    identity: &ClientIdentity,
    action: RateLimitAction,
) -> Result<Option<RateLimitStatus>, RateLimitDenied> {
    let key = RateLimitKey::for_identity(identity, action);
    match limiter.check(key).await {
        Ok(RateLimitResult::Allowed(status)) => Ok(Some(status)),
        Ok(RateLimitResult::Denied(denied)) => {
            tracing::info!(
                identity = %identity,
                action = %action,
                retry_after_secs = denied.retry_after_secs,
                "Rate limit exceeded"
            );
            Err(denied)
        }
        Err(e) => {
            tracing::warn!(identity = %identity, action = %action, "Rate limiter unavailable: {}", e);
            Ok(None)
        }
    }
}
