//! Immutable value types for HTTP messages (§3 of the data model).

mod body;
mod headers;
mod multipart;
mod request;
mod response;

pub use body::Body;
pub use headers::Headers;
pub use multipart::MultipartPart;
pub use request::{Method, Priority, Request, RequestBuilder};
pub use response::Response;
