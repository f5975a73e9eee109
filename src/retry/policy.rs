//! Fixed-delay retry policy (spec §4.6).
//!
//! Generalized from the teacher's exponential-backoff `RetryPolicy`: this
//! core only retries transport-level I/O failures, with a fixed delay
//! between attempts, bounded by `max_retries`. Callers who want jittered
//! exponential backoff or 5xx retries layer their own interceptor on top
//! (spec.md §9, open question (b)).

use std::time::Duration;

use tokio::time::sleep;

use crate::error::ClientError;
use crate::interceptor::Chain;
use crate::model::{Request, Response};

/// Retry policy configuration for the [`RetryInterceptor`](crate::interceptor::retry::RetryInterceptor).
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of retries after the initial attempt.
    pub max_retries: u32,
    /// Fixed delay between attempts.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            delay: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Only transport-level I/O failures are retried; cancellation and
    /// HTTP-status errors are this interceptor's responsibility to ignore.
    pub fn should_retry(&self, error: &ClientError) -> bool {
        error.is_retryable()
    }
}

/// Drives a retryable operation through [`RetryPolicy`], recording attempts
/// via a caller-supplied callback so the metrics pipeline can observe each
/// retry without this module depending on it directly.
pub struct RetryExecutor {
    policy: RetryPolicy,
}

impl RetryExecutor {
    pub const fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Execute `operation`, retrying on classified failures. `on_retry` is
    /// invoked with `(attempt_index, &error)` just before sleeping, so
    /// callers can emit a `RetryEvent`.
    pub async fn execute<F, Fut, T>(
        &self,
        mut operation: F,
        mut on_retry: impl FnMut(u32, &ClientError),
    ) -> Result<T, ClientError>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T, ClientError>>,
    {
        let mut attempt = 0;
        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(error) => {
                    if !self.policy.should_retry(&error) || attempt >= self.policy.max_retries {
                        return Err(error);
                    }
                    on_retry(attempt, &error);
                    attempt += 1;
                    if !self.policy.delay.is_zero() {
                        sleep(self.policy.delay).await;
                    }
                }
            }
        }
    }

    /// Drives `chain.proceed`/`chain.proceed_again` directly, retrying on
    /// classified failures (spec §4.6).
    ///
    /// This takes `chain` as an explicit parameter on every attempt rather
    /// than routing it through a captured closure passed to
    /// [`execute`](Self::execute): a `FnMut` closure that captures `&mut
    /// Chain` cannot return a future that reborrows that same `&mut` without
    /// forcing one umbrella lifetime across every reborrow, which `execute`'s
    /// `F: FnMut() -> Fut` shape can't express. Specializing to `Chain` and
    /// `Response` here (rather than staying generic over `Fut`) sidesteps
    /// the issue instead of fighting it with boxed higher-ranked futures.
    pub async fn retry_chain(
        &self,
        chain: &mut Chain<'_>,
        request: &Request,
        mut on_retry: impl FnMut(u32, &ClientError),
    ) -> Result<Response, ClientError> {
        let mut attempt = 0;
        let mut result = chain.proceed(request.clone()).await;

        while let Err(error) = &result {
            if !self.policy.should_retry(error) || attempt >= self.policy.max_retries {
                break;
            }
            on_retry(attempt, error);
            attempt += 1;
            if !self.policy.delay.is_zero() {
                sleep(self.policy.delay).await;
            }
            result = chain.proceed_again(request.clone()).await;
        }

        result
    }
}
