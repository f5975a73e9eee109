//! Certificate pinning (spec §6).
//!
//! A pin is `sha256/<base64(SHA-256(Subject Public Key Info))>`, the same
//! format used by `HPKP` and by most mobile TLS-pinning libraries. This
//! crate does not re-implement a TLS stack; `CertificatePinner` verifies a
//! leaf certificate's SPKI hash against a configured allowlist, letting a
//! transport reject a connection before sending any request data.

use base64::Engine;
use sha2::{Digest, Sha256};

use crate::error::ClientError;

/// A single pin for one host, in `sha256/<base64>` form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificatePin {
    pub host: String,
    pub pin: String,
}

impl CertificatePin {
    pub fn new(host: impl Into<String>, pin: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            pin: pin.into(),
        }
    }

    /// Compute the `sha256/<base64>` pin string for a DER-encoded SPKI.
    pub fn compute(spki_der: &[u8]) -> String {
        let digest = Sha256::digest(spki_der);
        format!("sha256/{}", base64::engine::general_purpose::STANDARD.encode(digest))
    }
}

/// Verifies a presented certificate's SPKI hash against configured pins.
pub trait PinVerifier: Send + Sync {
    /// Returns `Ok(())` if `spki_der` matches one of the pins configured for
    /// `host`, or if no pins are configured for that host at all (pinning is
    /// opt-in per host).
    fn verify(&self, host: &str, spki_der: &[u8]) -> Result<(), ClientError>;
}

/// A `PinVerifier` backed by a static, in-memory set of pins.
///
/// Per spec.md §6, a host with at least one configured pin rejects any
/// certificate whose SPKI hash is not in the configured set (pin
/// validation failure is terminal, not retried).
#[derive(Debug, Clone, Default)]
pub struct CertificatePinner {
    pins: Vec<CertificatePin>,
}

impl CertificatePinner {
    pub fn new() -> Self {
        Self { pins: Vec::new() }
    }

    pub fn with_pin(mut self, host: impl Into<String>, pin: impl Into<String>) -> Self {
        self.pins.push(CertificatePin::new(host, pin));
        self
    }

    fn pins_for(&self, host: &str) -> Vec<&str> {
        self.pins
            .iter()
            .filter(|p| p.host.eq_ignore_ascii_case(host))
            .map(|p| p.pin.as_str())
            .collect()
    }
}

impl PinVerifier for CertificatePinner {
    fn verify(&self, host: &str, spki_der: &[u8]) -> Result<(), ClientError> {
        let configured = self.pins_for(host);
        if configured.is_empty() {
            return Ok(());
        }

        let presented = CertificatePin::compute(spki_der);
        if configured.iter().any(|pin| *pin == presented) {
            Ok(())
        } else {
            Err(ClientError::transport(format!(
                "certificate pin mismatch for host '{host}'"
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unpinned_host_always_verifies() {
        let pinner = CertificatePinner::new().with_pin("api.example.com", "sha256/abc=");
        assert!(pinner.verify("other.example.com", b"irrelevant").is_ok());
    }

    #[test]
    fn matching_pin_verifies() {
        let spki = b"fake-spki-bytes";
        let pin = CertificatePin::compute(spki);
        let pinner = CertificatePinner::new().with_pin("api.example.com", pin);
        assert!(pinner.verify("api.example.com", spki).is_ok());
    }

    #[test]
    fn mismatched_pin_is_rejected() {
        let pinner = CertificatePinner::new().with_pin("api.example.com", "sha256/not-the-real-one=");
        let err = pinner.verify("api.example.com", b"fake-spki-bytes").unwrap_err();
        assert!(matches!(err, ClientError::TransportError { .. }));
    }
}
