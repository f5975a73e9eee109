//! `reqwest`-backed [`Transport`] implementation.
//!
//! Grounded on the teacher's `execution/http/transport.rs` custom-transport
//! abstraction, generalized from JSON-only POST requests to the full
//! request/response/body model this crate specifies.

use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;

use super::streaming::{ProgressCallback, StreamingResponse};
use super::Transport;
use crate::error::ClientError;
use crate::model::{Headers, Request, Response};

/// A [`Transport`] backed by a shared `reqwest::Client`.
///
/// The underlying client is assumed thread-safe and shared across calls
/// (spec §5, "Shared resources"); cloning this transport is cheap.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    default_timeout: Option<Duration>,
}

impl ReqwestTransport {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            default_timeout: None,
        }
    }

    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = Some(timeout);
        self
    }

    fn build_request(&self, request: &Request) -> Result<reqwest::RequestBuilder, ClientError> {
        let mut builder = self
            .client
            .request(request.method.into(), &request.url)
            .headers(request.headers.as_header_map().clone());

        if let Some(body) = &request.body {
            let encoded = body.encode()?;
            let content_type = match (&encoded.boundary, body) {
                (Some(boundary), _) => format!("multipart/form-data; boundary={boundary}"),
                (None, _) => body.content_type(),
            };
            builder = builder
                .header(reqwest::header::CONTENT_TYPE, content_type)
                .body(encoded.bytes);
        }

        if let Some(timeout) = request.timeout.or(self.default_timeout) {
            builder = builder.timeout(timeout);
        }

        Ok(builder)
    }

    async fn into_response(
        request: std::sync::Arc<Request>,
        resp: reqwest::Response,
    ) -> Result<Response, ClientError> {
        let status = resp.status().as_u16();
        let headers: Headers = resp.headers().clone().into();
        let bytes = resp.bytes().await.map_err(ClientError::from)?;
        Ok(Response::new(request, status, headers, Some(bytes.to_vec())))
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: Request) -> Result<Response, ClientError> {
        let builder = self.build_request(&request)?;
        let request = std::sync::Arc::new(request);
        let resp = builder.send().await.map_err(ClientError::from)?;
        Self::into_response(request, resp).await
    }

    async fn execute_with_progress(
        &self,
        request: Request,
        progress: ProgressCallback,
    ) -> Result<Response, ClientError> {
        let builder = self.build_request(&request)?;
        let request = std::sync::Arc::new(request);
        let resp = builder.send().await.map_err(ClientError::from)?;
        let status = resp.status().as_u16();
        let headers: Headers = resp.headers().clone().into();
        let total = resp.content_length();

        let mut received: u64 = 0;
        let mut body = Vec::new();
        let mut stream = resp.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(ClientError::from)?;
            received += chunk.len() as u64;
            progress(received, total);
            body.extend_from_slice(&chunk);
        }

        Ok(Response::new(request, status, headers, Some(body)))
    }

    async fn stream(&self, request: Request) -> Result<StreamingResponse, ClientError> {
        let builder = self.build_request(&request)?;
        let resp = builder.send().await.map_err(ClientError::from)?;
        let status = resp.status().as_u16();
        let headers: Headers = resp.headers().clone().into();
        let body = resp
            .bytes_stream()
            .map(|chunk| chunk.map_err(ClientError::from));

        Ok(StreamingResponse {
            status,
            headers,
            body: Box::pin(body),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Method, RequestBuilder};

    #[tokio::test]
    async fn executes_a_get_and_maps_status_and_body() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/ok")
            .with_status(200)
            .with_body("hello")
            .create_async()
            .await;

        let transport = ReqwestTransport::new(reqwest::Client::new());
        let request = RequestBuilder::new(Method::Get, format!("{}/ok", server.url())).build();

        let response = transport.execute(request).await.unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(response.body_bytes(), b"hello");
    }

    #[tokio::test]
    async fn propagates_a_non_2xx_status_without_erroring() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/missing")
            .with_status(404)
            .create_async()
            .await;

        let transport = ReqwestTransport::new(reqwest::Client::new());
        let request = RequestBuilder::new(Method::Get, format!("{}/missing", server.url())).build();

        let response = transport.execute(request).await.unwrap();
        assert_eq!(response.status, 404);
        assert!(!response.is_successful());
    }
}
