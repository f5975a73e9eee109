//! The five event kinds recorded by the metrics pipeline (spec §4.8).

use std::time::SystemTime;

use crate::model::Method;

#[derive(Debug, Clone)]
pub struct RequestEvent {
    pub method: Method,
    pub url: String,
    pub status: u16,
    pub start: SystemTime,
    pub end: SystemTime,
    pub response_bytes: usize,
    pub tags: Vec<(String, String)>,
}

#[derive(Debug, Clone)]
pub struct ErrorEvent {
    pub method: Method,
    pub url: String,
    pub error_kind: String,
    pub start: SystemTime,
    pub end: SystemTime,
}

#[derive(Debug, Clone)]
pub struct RetryEvent {
    pub method: Method,
    pub url: String,
    pub attempt: u32,
    pub reason: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheEventKind {
    Hit,
    Miss,
    Revalidated,
    Stored,
}

#[derive(Debug, Clone)]
pub struct CacheEvent {
    pub kind: CacheEventKind,
    pub method: Method,
    pub url: String,
}

#[derive(Debug, Clone)]
pub enum Event {
    Request(RequestEvent),
    Error(ErrorEvent),
    Retry(RetryEvent),
    Cache(CacheEvent),
}

impl Event {
    pub fn tags(&self) -> &[(String, String)] {
        match self {
            Event::Request(e) => &e.tags,
            _ => &[],
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Event::Error(_))
    }

    pub fn method(&self) -> Method {
        match self {
            Event::Request(e) => e.method,
            Event::Error(e) => e.method,
            Event::Retry(e) => e.method,
            Event::Cache(e) => e.method,
        }
    }

    pub fn url(&self) -> &str {
        match self {
            Event::Request(e) => &e.url,
            Event::Error(e) => &e.url,
            Event::Retry(e) => &e.url,
            Event::Cache(e) => &e.url,
        }
    }
}
