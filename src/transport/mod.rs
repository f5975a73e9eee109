//! Terminal I/O: bytes in, bytes out (spec §6 Transport contract).

mod pinning;
mod reqwest_transport;
mod streaming;
pub mod websocket;

pub use pinning::{CertificatePin, CertificatePinner, PinVerifier};
pub use reqwest_transport::ReqwestTransport;
pub use streaming::{ProgressCallback, StreamingResponse};
pub use websocket::{ReconnectPolicy, WebSocketCall, WebSocketMessage, WebSocketTransport};

use async_trait::async_trait;

use crate::error::ClientError;
use crate::model::{Request, Response};

/// The terminal component performing actual network I/O. The last link in
/// the interceptor chain calls into a `Transport`.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: Request) -> Result<Response, ClientError>;

    /// Execute with a progress callback receiving
    /// `(bytes_transferred, total_or_unknown)`. Transports that cannot
    /// report progress fall back to a plain [`Transport::execute`].
    async fn execute_with_progress(
        &self,
        request: Request,
        _progress: ProgressCallback,
    ) -> Result<Response, ClientError> {
        self.execute(request).await
    }

    /// Execute and stream the response body rather than buffering it.
    /// Transports that do not support streaming return a `TransportError`.
    async fn stream(&self, _request: Request) -> Result<StreamingResponse, ClientError> {
        Err(ClientError::transport(
            "this transport does not support streaming responses",
        ))
    }
}
