//! Error types for QRForge
//!
//! Provides a unified error type for all operations.
//!
//! The parse and validation variants carry fixed messages because their
//! Display text is sent to clients verbatim in `ERROR:` responses.

use thiserror::Error;

/// Result type alias using ForgeError
pub type Result<T> = std::result::Result<T, ForgeError>;

/// Unified error type for QRForge operations
#[derive(Debug, Error)]
pub enum ForgeError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Request Parse Errors
    // -------------------------------------------------------------------------
    #[error("Invalid request format")]
    InvalidRequest,

    #[error("Invalid GEO format")]
    InvalidGeo,

    // -------------------------------------------------------------------------
    // Payload Validation Errors
    // -------------------------------------------------------------------------
    #[error("Invalid coordinates (lat: -90..90, long: -180..180)")]
    CoordinatesOutOfRange,

    // -------------------------------------------------------------------------
    // QR Encoding Errors
    // -------------------------------------------------------------------------
    #[error("Failed to generate QR code: {0}")]
    Encoding(#[from] qrcode::types::QrError),

    #[error("Raster error: {0}")]
    Raster(String),

    // -------------------------------------------------------------------------
    // Network Errors
    // -------------------------------------------------------------------------
    #[error("Network error: {0}")]
    Network(String),

    #[error("Protocol error: {0}")]
    Protocol(String),
}
