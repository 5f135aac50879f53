//! Bounded polling for eventually-consistent remote state.

use crate::Result;
use std::future::Future;
use std::time::Duration;
use tokio_retry::{strategy::FixedInterval, Retry};
use tracing::{info, warn};

/// Fixed-count, fixed-delay polling budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub attempts: usize,
    pub delay: Duration,
}

impl PollPolicy {
    /// Budget for waiting on a folder to appear.
    pub const FOLDER: PollPolicy = PollPolicy::new(3, Duration::from_millis(500));
    /// Budget for waiting on uploaded files to land.
    pub const CONTENTS: PollPolicy = PollPolicy::new(3, Duration::from_secs(5));

    pub const fn new(attempts: usize, delay: Duration) -> Self {
        Self { attempts, delay }
    }
}

/// Polls `check` until it reports `Ok(true)` or the budget runs out.
///
/// `Ok(false)` and `Err(_)` are both treated as "not yet"; neither ends the
/// loop early. Running out of attempts yields `false`, never an error.
pub async fn poll_until<F, Fut>(policy: PollPolicy, label: &str, mut check: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool>>,
{
    if policy.attempts == 0 {
        return false;
    }

    let strategy = FixedInterval::new(policy.delay).take(policy.attempts - 1);
    let mut attempt = 0;

    let outcome = Retry::spawn(strategy, || {
        attempt += 1;
        let current = attempt;
        let pending = check();
        async move {
            match pending.await {
                Ok(true) => {
                    info!("[{}] Condition met on attempt {}/{}", label, current, policy.attempts);
                    Ok(())
                }
                Ok(false) => {
                    warn!("[{}] Not consistent yet (attempt {}/{})", label, current, policy.attempts);
                    Err(())
                }
                Err(e) => {
                    warn!(
                        "[{}] Check failed on attempt {}/{}: {}",
                        label, current, policy.attempts, e
                    );
                    Err(())
                }
            }
        }
    })
    .await;

    if outcome.is_err() {
        warn!("[{}] Gave up after {} attempts", label, policy.attempts);
    }
    outcome.is_ok()
}
