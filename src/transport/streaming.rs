//! Streaming response support for [`Transport::stream`](super::Transport::stream).

use std::pin::Pin;
use std::sync::Arc;

use bytes::Bytes;
use futures::Stream;

use crate::error::ClientError;
use crate::model::Headers;

/// `(bytes_transferred, total_size_if_known)`.
pub type ProgressCallback = Arc<dyn Fn(u64, Option<u64>) + Send + Sync>;

/// A response whose body is consumed incrementally rather than buffered.
pub struct StreamingResponse {
    pub status: u16,
    pub headers: Headers,
    pub body: Pin<Box<dyn Stream<Item = Result<Bytes, ClientError>> + Send>>,
}

impl StreamingResponse {
    pub fn is_successful(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
