//! The [`Body`] tagged union (spec §3) and its wire encodings (spec §6).

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::error::ClientError;
use crate::model::MultipartPart;

/// An opaque, lazily-evaluated JSON encoder captured at `Body::json` time.
///
/// Modeled on the Design Note in spec.md §9 ("Encodable body closure"): the
/// source language's captured encodable callable becomes a boxed `Fn` here,
/// and encoding is deferred until [`Body::encode`] is called at send time.
#[derive(Clone)]
pub struct JsonEncodable(Arc<dyn Fn() -> Result<Vec<u8>, ClientError> + Send + Sync>);

impl fmt::Debug for JsonEncodable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("JsonEncodable(..)")
    }
}

/// The four request-body variants from spec.md §3.
#[derive(Debug, Clone)]
pub enum Body {
    /// Raw bytes with an explicit content type (default
    /// `application/octet-stream`).
    Data { bytes: Vec<u8>, content_type: String },
    /// A value encoded to JSON lazily, at send time.
    Json(JsonEncodable),
    /// HTML5 form-encoded fields.
    Form { fields: Vec<(String, String)> },
    /// RFC 2388 multipart form data.
    Multipart { parts: Vec<MultipartPart> },
}

/// The result of encoding a [`Body`]: the bytes to send, and — for multipart
/// bodies — the boundary that frames them. Per invariant I4, the boundary in
/// the `Content-Type` header MUST equal this one.
pub struct EncodedBody {
    pub bytes: Vec<u8>,
    pub boundary: Option<String>,
}

impl Body {
    pub fn data(bytes: impl Into<Vec<u8>>) -> Self {
        Body::Data {
            bytes: bytes.into(),
            content_type: "application/octet-stream".to_string(),
        }
    }

    pub fn data_with_content_type(bytes: impl Into<Vec<u8>>, content_type: impl Into<String>) -> Self {
        Body::Data {
            bytes: bytes.into(),
            content_type: content_type.into(),
        }
    }

    pub fn json<T>(value: T) -> Self
    where
        T: Serialize + Send + Sync + 'static,
    {
        Body::Json(JsonEncodable(Arc::new(move || {
            serde_json::to_vec(&value).map_err(ClientError::encoding)
        })))
    }

    pub fn form(fields: impl IntoIterator<Item = (impl Into<String>, impl Into<String>)>) -> Self {
        Body::Form {
            fields: fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn multipart(parts: Vec<MultipartPart>) -> Self {
        Body::Multipart { parts }
    }

    /// The `Content-Type` value this body should be sent with. For
    /// `Multipart`, the boundary is generated fresh — callers that need the
    /// *same* boundary that frames the body must use [`Body::encode`]
    /// instead, which returns both together (invariant I4).
    pub fn content_type(&self) -> String {
        match self {
            Body::Data { content_type, .. } => content_type.clone(),
            Body::Json(_) => "application/json; charset=utf-8".to_string(),
            Body::Form { .. } => "application/x-www-form-urlencoded".to_string(),
            Body::Multipart { .. } => {
                format!("multipart/form-data; boundary={}", generate_boundary())
            }
        }
    }

    /// Encode the body to wire bytes, producing the boundary (if any) in the
    /// same call so the caller can build a `Content-Type` header that is
    /// guaranteed consistent with the framed bytes (invariant I4).
    pub fn encode(&self) -> Result<EncodedBody, ClientError> {
        match self {
            Body::Data { bytes, .. } => Ok(EncodedBody {
                bytes: bytes.clone(),
                boundary: None,
            }),
            Body::Json(encodable) => Ok(EncodedBody {
                bytes: (encodable.0)()?,
                boundary: None,
            }),
            Body::Form { fields } => Ok(EncodedBody {
                bytes: encode_form(fields).into_bytes(),
                boundary: None,
            }),
            Body::Multipart { parts } => {
                let boundary = generate_boundary();
                let bytes = crate::model::multipart::encode_multipart(parts, &boundary);
                Ok(EncodedBody {
                    bytes,
                    boundary: Some(boundary),
                })
            }
        }
    }
}

fn generate_boundary() -> String {
    format!("Boundary-{}", uuid::Uuid::new_v4())
}

/// HTML5 `application/x-www-form-urlencoded` encoding: alphanumerics and
/// `-_.~` pass through literally, space becomes `+`, everything else is
/// percent-encoded. Spec.md §3/§6.
fn encode_form(fields: &[(String, String)]) -> String {
    fields
        .iter()
        .map(|(k, v)| format!("{}={}", percent_encode_form(k), percent_encode_form(v)))
        .collect::<Vec<_>>()
        .join("&")
}

fn percent_encode_form(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            b' ' => out.push('+'),
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

/// Decode a `application/x-www-form-urlencoded` payload back into fields.
/// Used by tests asserting the form-encoding round trip (spec.md §8).
pub fn decode_form(encoded: &str) -> Vec<(String, String)> {
    encoded
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let mut parts = pair.splitn(2, '=');
            let k = parts.next().unwrap_or_default();
            let v = parts.next().unwrap_or_default();
            (percent_decode_form(k), percent_decode_form(v))
        })
        .collect()
}

fn percent_decode_form(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b'%' if i + 2 < bytes.len() => {
                if let Ok(byte) = u8::from_str_radix(&input[i + 1..i + 3], 16) {
                    out.push(byte);
                    i += 3;
                } else {
                    out.push(bytes[i]);
                    i += 1;
                }
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}
