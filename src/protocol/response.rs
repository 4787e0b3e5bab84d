//! Response definitions
//!
//! Represents responses to clients.

use bytes::Bytes;

/// A response to send to a client
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    /// Successful generation; carries the raster image bytes
    Image(Bytes),

    /// Failed generation; carries the human-readable error text
    Error(String),
}

impl Response {
    /// Create a success response around image bytes
    pub fn image(bytes: Bytes) -> Self {
        Response::Image(bytes)
    }

    /// Create an error response
    pub fn error(message: &str) -> Self {
        Response::Error(message.to_string())
    }

    /// Whether this response reports a failure
    pub fn is_error(&self) -> bool {
        matches!(self, Response::Error(_))
    }
}
