//! [`AuthCredentials`] — the value the coordinator refreshes and the
//! auth interceptor attaches to outgoing requests (spec §3).

use std::time::{Duration, SystemTime};

/// A default "needs refresh" window: credentials within this long of expiry
/// are treated as due for renewal even though they are not yet expired.
pub const DEFAULT_REFRESH_THRESHOLD: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthCredentials {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expiry: Option<SystemTime>,
    pub provider: String,
}

impl AuthCredentials {
    pub fn new(access_token: impl Into<String>, provider: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: None,
            expiry: None,
            provider: provider.into(),
        }
    }

    pub fn with_refresh_token(mut self, refresh_token: impl Into<String>) -> Self {
        self.refresh_token = Some(refresh_token.into());
        self
    }

    pub fn with_expiry(mut self, expiry: SystemTime) -> Self {
        self.expiry = Some(expiry);
        self
    }

    /// `true` iff the current time is at or past `expiry`. Credentials with
    /// no expiry never expire.
    pub fn is_expired(&self) -> bool {
        match self.expiry {
            Some(expiry) => SystemTime::now() >= expiry,
            None => false,
        }
    }

    /// `true` iff within `threshold` of expiry (or already expired).
    /// Credentials with no expiry never need a refresh.
    pub fn needs_refresh(&self, threshold: Duration) -> bool {
        match self.expiry {
            Some(expiry) => match expiry.checked_sub(threshold) {
                Some(refresh_at) => SystemTime::now() >= refresh_at,
                None => true,
            },
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credentials_without_expiry_never_need_refresh() {
        let creds = AuthCredentials::new("tok", "test");
        assert!(!creds.is_expired());
        assert!(!creds.needs_refresh(DEFAULT_REFRESH_THRESHOLD));
    }

    #[test]
    fn credentials_within_threshold_need_refresh() {
        let creds = AuthCredentials::new("tok", "test")
            .with_expiry(SystemTime::now() + Duration::from_secs(60));
        assert!(!creds.is_expired());
        assert!(creds.needs_refresh(DEFAULT_REFRESH_THRESHOLD));
    }

    #[test]
    fn expired_credentials_need_refresh() {
        let creds = AuthCredentials::new("tok", "test")
            .with_expiry(SystemTime::now() - Duration::from_secs(1));
        assert!(creds.is_expired());
        assert!(creds.needs_refresh(DEFAULT_REFRESH_THRESHOLD));
    }
}
