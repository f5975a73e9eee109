//! [`AuthInterceptor`] — 401 detection, token attachment, and the
//! retry-after-refresh handshake (spec §4.4), built on the single-flight
//! [`RefreshCoordinator`](crate::auth::RefreshCoordinator).

use std::sync::Arc;

use async_trait::async_trait;

use super::chain::{Chain, Interceptor};
use crate::auth::{AuthCredentials, Authenticator, RefreshCoordinator, TokenStore};
use crate::error::ClientError;
use crate::model::{Request, Response};

pub struct AuthInterceptor {
    store: Arc<dyn TokenStore>,
    authenticator: Arc<dyn Authenticator>,
    coordinator: RefreshCoordinator,
}

impl AuthInterceptor {
    pub fn new(store: Arc<dyn TokenStore>, authenticator: Arc<dyn Authenticator>) -> Self {
        Self {
            store,
            authenticator,
            coordinator: RefreshCoordinator::new(),
        }
    }

    fn with_bearer(request: &Request, token: &str) -> Result<Request, ClientError> {
        request.with_header("Authorization", &format!("Bearer {token}"))
    }
}

#[async_trait]
impl Interceptor for AuthInterceptor {
    async fn intercept(&self, chain: &mut Chain<'_>) -> Result<Response, ClientError> {
        let request = chain.request().clone();
        let sent_token = self.store.current().await.map(|c| c.access_token);

        let outgoing = match &sent_token {
            Some(token) => Self::with_bearer(&request, token)?,
            None => request.clone(),
        };

        let response = chain.proceed(outgoing).await?;
        if response.status != 401 {
            return Ok(response);
        }

        // Pre-coordinator fast path (spec §4.3): another caller may already
        // have refreshed between our send and this 401 landing.
        let current_token = self.store.current().await.map(|c| c.access_token);
        let refreshed_token = if current_token != sent_token {
            current_token
        } else {
            self.coordinator
                .refresh_if_needed(self.store.clone(), self.authenticator.clone())
                .await?
                .map(|c: AuthCredentials| c.access_token)
        };

        let Some(token) = refreshed_token else {
            return Ok(response);
        };

        // Exactly one retry on 401; a second 401 after refresh is surfaced.
        let retried = Self::with_bearer(&request, &token)?;
        chain.proceed_again(retried).await
    }

    fn name(&self) -> &'static str {
        "AuthInterceptor"
    }
}
