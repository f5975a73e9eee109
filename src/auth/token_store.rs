//! [`TokenStore`] — the capability the auth interceptor and coordinator
//! read and write credentials through (spec.md §9 "Legacy dual-constructor
//! auth interceptor": this collapses the source's two initializer shapes
//! into a single `TokenSource` capability).

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::AuthCredentials;

#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn current(&self) -> Option<AuthCredentials>;
    async fn update(&self, credentials: AuthCredentials);
}

/// An in-memory `TokenStore` backed by a single `RwLock` slot. Sufficient
/// for the single-process coordination this crate specifies; callers who
/// need cross-process sharing provide their own `TokenStore`.
#[derive(Default)]
pub struct InMemoryTokenStore {
    slot: RwLock<Option<AuthCredentials>>,
}

impl InMemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_initial(credentials: AuthCredentials) -> Self {
        Self {
            slot: RwLock::new(Some(credentials)),
        }
    }
}

#[async_trait]
impl TokenStore for InMemoryTokenStore {
    async fn current(&self) -> Option<AuthCredentials> {
        self.slot.read().await.clone()
    }

    async fn update(&self, credentials: AuthCredentials) {
        *self.slot.write().await = Some(credentials);
    }
}
