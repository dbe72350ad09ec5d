//! Bounded retry for transient remote failures.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use mediahub_core::config::RemoteConfig;

use crate::command::RemoteCommand;
use crate::error::RemoteError;

/// How often and how patiently an idempotent command is repeated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one.
    pub max_attempts: u32,
    /// Delay before the second attempt; grows linearly afterwards.
    pub base_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_backoff: Duration::from_millis(250),
        }
    }
}

impl RetryPolicy {
    /// A policy with explicit limits.
    pub fn new(max_attempts: u32, base_backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_backoff,
        }
    }

    /// Never retry.
    pub fn none() -> Self {
        Self::new(1, Duration::ZERO)
    }

    /// Read the policy from the `remote` config section.
    pub fn from_config(config: &RemoteConfig) -> Self {
        Self::new(
            config.max_attempts,
            Duration::from_millis(config.retry_backoff_ms),
        )
    }

    /// Delay after the given failed attempt (1-based).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        self.base_backoff.saturating_mul(attempt)
    }

    /// Run `attempt` until it succeeds, fails permanently, or the attempts
    /// are exhausted. Non-idempotent commands get exactly one attempt.
    pub async fn run<T, F, Fut>(&self, command: &RemoteCommand, mut attempt: F) -> Result<T, RemoteError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, RemoteError>>,
    {
        let max_attempts = if command.is_idempotent() {
            self.max_attempts
        } else {
            1
        };

        let mut n = 1;
        loop {
            match attempt().await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_transient() && n < max_attempts => {
                    let delay = self.delay_for_attempt(n);
                    warn!(
                        command = %command.kind(),
                        attempt = n,
                        max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "Transient remote failure, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    n += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn reset() -> RemoteError {
        RemoteError::Connection {
            host: "media1".into(),
            message: "Connection reset by peer".into(),
        }
    }

    #[tokio::test]
    async fn test_retries_transient_failures() {
        let policy = RetryPolicy::new(3, Duration::ZERO);
        let calls = AtomicU32::new(0);
        let cmd = RemoteCommand::MakeDir { path: "/c/bob".into() };

        let result = policy
            .run(&cmd, || async {
                if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(reset())
                } else {
                    Ok(())
                }
            })
            .await;

        assert!(result.is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let policy = RetryPolicy::new(2, Duration::ZERO);
        let calls = AtomicU32::new(0);
        let cmd = RemoteCommand::RemoveDir { path: "/c/bob/x".into() };

        let result: Result<(), _> = policy
            .run(&cmd, || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(reset())
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_never_retries_move_or_permanent_errors() {
        let policy = RetryPolicy::new(5, Duration::ZERO);
        let calls = AtomicU32::new(0);
        let mv = RemoteCommand::Move {
            from: "/c/bob/a".into(),
            to: "/c/bob/b".into(),
        };
        let _ = policy
            .run(&mv, || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(reset())
            })
            .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        calls.store(0, Ordering::SeqCst);
        let mkdir = RemoteCommand::MakeDir { path: "/c/bob".into() };
        let _ = policy
            .run(&mkdir, || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(RemoteError::Authorization {
                    host: "media1".into(),
                    message: "Permission denied".into(),
                })
            })
            .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_linear_backoff() {
        let policy = RetryPolicy::new(4, Duration::from_millis(100));
        assert_eq!(policy.delay_for_attempt(1), Duration::from_millis(100));
        assert_eq!(policy.delay_for_attempt(3), Duration::from_millis(300));
    }
}
