//! `From` conversions into [`ClientError`] from common library error types.

use super::ClientError;

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout(std::time::Duration::default())
        } else {
            ClientError::transport(err)
        }
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        ClientError::transport(err)
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::decoding(err)
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for ClientError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        use tokio_tungstenite::tungstenite::Error as WsError;
        match err {
            WsError::ConnectionClosed | WsError::AlreadyClosed => {
                ClientError::WebSocketError(super::WebSocketErrorKind::AlreadyClosed)
            }
            other => ClientError::WebSocketError(super::WebSocketErrorKind::TransportError(
                other.to_string(),
            )),
        }
    }
}
