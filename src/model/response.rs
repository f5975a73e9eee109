//! The [`Response`] value type (spec §3).

use std::sync::Arc;

use crate::model::{Headers, Request};

/// An HTTP response, carrying a back-reference to the request that produced
/// it (spec §3).
#[derive(Debug, Clone)]
pub struct Response {
    pub request: Arc<Request>,
    pub status: u16,
    pub headers: Headers,
    pub body: Option<Vec<u8>>,
}

impl Response {
    pub fn new(request: Arc<Request>, status: u16, headers: Headers, body: Option<Vec<u8>>) -> Self {
        Self {
            request,
            status,
            headers,
            body,
        }
    }

    /// `200 <= status < 300`.
    pub fn is_successful(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn body_bytes(&self) -> &[u8] {
        self.body.as_deref().unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Request;

    fn req() -> Arc<Request> {
        Arc::new(Request::get("https://example.com").build())
    }

    #[test]
    fn is_successful_boundaries() {
        assert!(Response::new(req(), 200, Headers::new(), None).is_successful());
        assert!(Response::new(req(), 299, Headers::new(), None).is_successful());
        assert!(!Response::new(req(), 300, Headers::new(), None).is_successful());
        assert!(!Response::new(req(), 199, Headers::new(), None).is_successful());
    }
}
