//! The immutable [`Request`] value type (spec §3, invariant I1).

use std::time::Duration;

use crate::cache::CachePolicy;
use crate::error::ClientError;
use crate::model::{Body, Headers};

/// HTTP request method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
            Method::Head => "HEAD",
            Method::Options => "OPTIONS",
        }
    }
}

impl From<Method> for reqwest::Method {
    fn from(m: Method) -> Self {
        match m {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
            Method::Head => reqwest::Method::HEAD,
            Method::Options => reqwest::Method::OPTIONS,
        }
    }
}

/// Request priority. Higher variants sort first (descending, stable).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Priority {
    Background,
    Low,
    Normal,
    High,
    Critical,
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Normal
    }
}

/// An immutable HTTP request (spec invariant I1: interceptors that mutate a
/// request must produce a *new* `Request`, never mutate one in place).
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub url: String,
    pub headers: Headers,
    pub body: Option<Body>,
    pub timeout: Option<Duration>,
    pub cache_policy: CachePolicy,
    pub priority: Priority,
}

impl Request {
    pub fn builder(method: Method, url: impl Into<String>) -> RequestBuilder {
        RequestBuilder::new(method, url)
    }

    pub fn get(url: impl Into<String>) -> RequestBuilder {
        RequestBuilder::new(Method::Get, url)
    }

    pub fn post(url: impl Into<String>) -> RequestBuilder {
        RequestBuilder::new(Method::Post, url)
    }

    /// Returns a clone of this request with `headers` merged on top (last
    /// write wins) and optionally a replaced body. Used by interceptors that
    /// need to produce a new request per invariant I1.
    pub fn with_headers(&self, extra: &Headers) -> Self {
        let mut next = self.clone();
        next.headers.merge(extra);
        next
    }

    pub fn with_header(&self, name: &str, value: &str) -> Result<Self, ClientError> {
        let mut next = self.clone();
        next.headers.insert(name, value)?;
        Ok(next)
    }
}

/// Builder for [`Request`]. Consuming (`with_*` returns `Self`), matching the
/// teacher's `HttpHeaderBuilder`/`HttpConfigBuilder` idiom.
pub struct RequestBuilder {
    method: Method,
    url: String,
    headers: Headers,
    body: Option<Body>,
    timeout: Option<Duration>,
    cache_policy: CachePolicy,
    priority: Priority,
}

impl RequestBuilder {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Headers::new(),
            body: None,
            timeout: None,
            cache_policy: CachePolicy::default(),
            priority: Priority::default(),
        }
    }

    pub fn header(mut self, name: &str, value: &str) -> Result<Self, ClientError> {
        self.headers.insert(name, value)?;
        Ok(self)
    }

    pub fn body(mut self, body: Body) -> Self {
        self.body = Some(body);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn cache_policy(mut self, policy: CachePolicy) -> Self {
        self.cache_policy = policy;
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn build(self) -> Request {
        Request {
            method: self.method,
            url: self.url,
            headers: self.headers,
            body: self.body,
            timeout: self.timeout,
            cache_policy: self.cache_policy,
            priority: self.priority,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_sorts_descending() {
        let mut priorities = vec![Priority::Low, Priority::Critical, Priority::Normal];
        priorities.sort_by_key(|p| std::cmp::Reverse(*p));
        assert_eq!(
            priorities,
            vec![Priority::Critical, Priority::Normal, Priority::Low]
        );
    }

    #[test]
    fn with_header_does_not_mutate_original() {
        let base = Request::get("https://example.com").build();
        let derived = base.with_header("X-Trace", "1").unwrap();
        assert!(!base.headers.contains("X-Trace"));
        assert!(derived.headers.contains("X-Trace"));
    }
}
