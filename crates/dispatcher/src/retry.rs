use std::future::Future;
use std::time::Duration;

use tracing::warn;

use workcell_core::{DispatchStatus, SchedulerResult};

/// Invoke `op` up to `max_attempts` times, sleeping `delay` between
/// attempts.
///
/// The first non-`Error` status short-circuits. `Fatal` is permanent
/// failure and is never retried. A transport-level `Err` counts as an
/// `Error` attempt. If every attempt errors the wrapper returns
/// `Error` — never `Fatal` — so callers can tell transient exhaustion
/// from a hard abort.
pub async fn retry<F, Fut>(
    mut op: F,
    max_attempts: u32,
    delay: Duration,
) -> SchedulerResult<DispatchStatus>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = SchedulerResult<DispatchStatus>>,
{
    let max_attempts = max_attempts.max(1);

    for attempt in 1..=max_attempts {
        match op().await {
            Ok(DispatchStatus::Fatal) => return Ok(DispatchStatus::Fatal),
            Ok(DispatchStatus::Error) => {
                warn!(attempt, max_attempts, "attempt returned ERROR");
            }
            Ok(status) => return Ok(status),
            Err(e) => {
                warn!(attempt, max_attempts, error = %e, "attempt failed");
            }
        }

        if attempt < max_attempts {
            tokio::time::sleep(delay).await;
        }
    }

    Ok(DispatchStatus::Error)
}
