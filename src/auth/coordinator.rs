//! The single-flight refresh coordinator (spec §4.3) — the
//! correctness-critical concurrency primitive in this crate.
//!
//! Grounded on the teacher's `AdcTokenProvider` thundering-herd guard in the
//! now-removed `auth/adc.rs` (a `Mutex<bool>` + `Condvar` pair gating a
//! single in-flight refresh), generalized from a platform-specific ADC
//! resolver into a reusable single-flight primitive built on
//! `futures::future::Shared` rather than a condvar, since the refresh
//! itself is an async operation.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt, Shared};
use tokio::sync::Mutex;

use super::{AuthCredentials, TokenStore};
use crate::error::ClientError;

type RefreshResult = Result<Option<AuthCredentials>, ClientError>;
type SharedRefresh = Shared<BoxFuture<'static, RefreshResult>>;

/// The capability that performs a token-acquiring network call. This is the
/// `f` closure in the coordinator's contract: it runs at most once per
/// refresh window no matter how many callers invoke
/// [`RefreshCoordinator::refresh_if_needed`] concurrently.
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate(&self) -> RefreshResult;
}

#[async_trait]
impl<F> Authenticator for F
where
    F: Fn() -> BoxFuture<'static, RefreshResult> + Send + Sync,
{
    async fn authenticate(&self) -> RefreshResult {
        (self)().await
    }
}

/// Clears the coordinator's slot on every exit path of the refresh future —
/// normal completion, error, or the future being dropped mid-poll because
/// every awaiting caller was cancelled (spec §4.3, "clearing must run on
/// all completion paths").
struct ClearSlotGuard {
    slot: Arc<Mutex<Option<SharedRefresh>>>,
}

impl Drop for ClearSlotGuard {
    fn drop(&mut self) {
        if let Ok(mut guard) = self.slot.try_lock() {
            *guard = None;
        } else {
            let slot = self.slot.clone();
            tokio::spawn(async move {
                *slot.lock().await = None;
            });
        }
    }
}

/// Guarantees at most one in-flight refresh at a time (invariant I5).
///
/// `current_refresh` is the single mutable slot from spec §4.3, serialized
/// by a `tokio::sync::Mutex`. A `Shared` future lets every waiter poll the
/// same refresh without re-running it; if the task that happens to be
/// driving the poll is cancelled, the other clones still make progress —
/// matching spec §5's cancellation rule that a detached waiter does not
/// cancel the refresh itself.
#[derive(Default)]
pub struct RefreshCoordinator {
    current_refresh: Arc<Mutex<Option<SharedRefresh>>>,
}

impl RefreshCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `authenticator.authenticate()` at most once across any number of
    /// concurrent callers, writing a successful result to `store` before
    /// the slot clears.
    pub async fn refresh_if_needed(
        &self,
        store: Arc<dyn TokenStore>,
        authenticator: Arc<dyn Authenticator>,
    ) -> RefreshResult {
        // Check-and-insert happens under a single, uninterrupted lock hold so
        // two racing callers can never both observe an empty slot and each
        // spawn their own refresh (invariant I5). The lock is dropped before
        // awaiting the shared future so `ClearSlotGuard` can reacquire it.
        let shared = {
            let mut guard = self.current_refresh.lock().await;
            if let Some(existing) = guard.as_ref() {
                existing.clone()
            } else {
                let slot = self.current_refresh.clone();
                let fut: BoxFuture<'static, RefreshResult> = async move {
                    let _guard = ClearSlotGuard { slot };
                    let result = authenticator.authenticate().await;
                    if let Ok(Some(credentials)) = &result {
                        store.update(credentials.clone()).await;
                    }
                    result
                }
                .boxed();
                let shared = fut.shared();
                *guard = Some(shared.clone());
                shared
            }
        };

        shared.await
    }
}
