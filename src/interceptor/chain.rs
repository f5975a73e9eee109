//! [`Interceptor`] and the re-entrant [`Chain`] that invokes them.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;

use crate::error::ClientError;
use crate::model::{Request, Response};
use crate::transport::Transport;

/// Middleware composed in the chain. See the module docs for the contract.
#[async_trait]
pub trait Interceptor: Send + Sync {
    async fn intercept(&self, chain: &mut Chain<'_>) -> Result<Response, ClientError>;

    /// Human-readable name used in tracing spans. Defaults to the type name.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// The chain object passed to each interceptor. Exposes the request as it
/// exists at this interceptor's entry point and a `proceed` continuation.
pub struct Chain<'a> {
    interceptors: &'a [Arc<dyn Interceptor>],
    index: usize,
    request: Request,
    transport: &'a (dyn Transport + 'a),
    proceed_called: bool,
}

impl<'a> Chain<'a> {
    /// Build the outermost chain and run it to completion. Called once per
    /// [`crate::call::Call`] execution.
    pub async fn execute(
        request: Request,
        interceptors: &'a [Arc<dyn Interceptor>],
        transport: &'a (dyn Transport + 'a),
    ) -> Result<Response, ClientError> {
        let mut chain = Chain {
            interceptors,
            index: 0,
            request,
            transport,
            proceed_called: false,
        };
        chain.dispatch().await
    }

    /// The request as it exists at this interceptor's entry point.
    pub fn request(&self) -> &Request {
        &self.request
    }

    /// Advance the chain with `request` as the new chain request. An
    /// interceptor may pass a *different* request than the one it received;
    /// downstream interceptors observe the mutated request (re-entrancy,
    /// spec §4.1).
    ///
    /// Calling `proceed` a second time on the same chain handle is a
    /// programmer error: the contract requires at most one call per
    /// invocation, and this is detected and surfaced loudly rather than
    /// silently re-running the remaining chain.
    pub async fn proceed(&mut self, request: Request) -> Result<Response, ClientError> {
        if self.proceed_called {
            return Err(ClientError::InterceptorContractViolation(
                "proceed() called more than once by the same interceptor".to_string(),
            ));
        }
        self.proceed_called = true;
        self.request = request;
        self.dispatch().await
    }

    /// Re-dispatches downstream with `request`, bypassing the single-call
    /// guard on [`proceed`](Self::proceed).
    ///
    /// This is the documented escape hatch for the two interceptors whose
    /// contract requires more than one downstream attempt: the auth
    /// interceptor's retry-after-refresh (§4.4) and the retry interceptor's
    /// classified backoff (§4.6). Ordinary interceptors must use `proceed`
    /// and get the single-call contract enforced; an interceptor that needs
    /// `proceed_again` is, by construction, one of those two.
    pub async fn proceed_again(&mut self, request: Request) -> Result<Response, ClientError> {
        self.request = request;
        self.dispatch().await
    }

    async fn dispatch(&mut self) -> Result<Response, ClientError> {
        if self.index >= self.interceptors.len() {
            return self.transport.execute(self.request.clone()).await;
        }

        let interceptor = Arc::clone(&self.interceptors[self.index]);
        let mut next = Chain {
            interceptors: self.interceptors,
            index: self.index + 1,
            request: self.request.clone(),
            transport: self.transport,
            proceed_called: false,
        };

        let start = Instant::now();
        let result = interceptor.intercept(&mut next).await;
        tracing::debug!(
            interceptor = interceptor.name(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            ok = result.is_ok(),
            "interceptor invoked"
        );
        result
    }
}
