//! Request-only and response-only interceptor specializations (spec §4.1).
//!
//! These are adapted to the full [`Interceptor`] interface by
//! [`ordering::InterceptorChainBuilder::build`](super::InterceptorChainBuilder):
//! a request-only adapter mutates the request then calls `proceed`; a
//! response-only adapter calls `proceed` then transforms the response.

use async_trait::async_trait;
use std::sync::Arc;

use super::chain::{Chain, Interceptor};
use crate::error::ClientError;
use crate::model::{Request, Response};

/// An interceptor that only ever mutates the outgoing request.
pub trait RequestInterceptor: Send + Sync {
    fn intercept_request(&self, request: Request) -> Result<Request, ClientError>;
}

/// An interceptor that only ever transforms the incoming response.
pub trait ResponseInterceptor: Send + Sync {
    fn intercept_response(&self, response: Response) -> Result<Response, ClientError>;
}

pub(super) struct RequestOnlyAdapter(pub Arc<dyn RequestInterceptor>);

#[async_trait]
impl Interceptor for RequestOnlyAdapter {
    async fn intercept(&self, chain: &mut Chain<'_>) -> Result<Response, ClientError> {
        let mutated = self.0.intercept_request(chain.request().clone())?;
        chain.proceed(mutated).await
    }

    fn name(&self) -> &'static str {
        "RequestOnlyAdapter"
    }
}

pub(super) struct ResponseOnlyAdapter(pub Arc<dyn ResponseInterceptor>);

#[async_trait]
impl Interceptor for ResponseOnlyAdapter {
    async fn intercept(&self, chain: &mut Chain<'_>) -> Result<Response, ClientError> {
        let request = chain.request().clone();
        let response = chain.proceed(request).await?;
        self.0.intercept_response(response)
    }

    fn name(&self) -> &'static str {
        "ResponseOnlyAdapter"
    }
}
