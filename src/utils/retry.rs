use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::warn;

/// Backoff never sleeps longer than this between attempts.
const MAX_DELAY: Duration = Duration::from_secs(30);

/// Run `operation` up to `max_attempts` times with exponential backoff
/// starting at `base_delay`. The last error is returned once the budget is
/// exhausted.
pub async fn with_backoff<T, E, F, Fut>(
    max_attempts: u32,
    base_delay: Duration,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut attempt = 0;

    loop {
        match operation().await {
            Ok(result) => return Ok(result),
            Err(error) => {
                attempt += 1;
                if attempt >= max_attempts {
                    return Err(error);
                }

                let delay = base_delay
                    .saturating_mul(2u32.pow((attempt - 1).min(5)))
                    .min(MAX_DELAY);
                warn!(attempt, max_attempts, error = %error, "attempt failed, backing off");
                sleep(delay).await;
            }
        }
    }
}
