//! # QRForge
//!
//! A multithreaded TCP service that renders payloads as QR code images:
//! - Free text and geographic coordinates as input
//! - 1-bit grayscale PNG output, one pixel per QR module
//! - Plain TCP line protocol, one request per connection
//! - Thread-per-connection handling with a configurable admission cap
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      TCP Server                              │
//! │          (acceptor thread, handler thread per client)        │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ raw bytes
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                  Protocol Handler                            │
//! │        (parse TEXT:/GEO: → Command, frame Response)          │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ typed command
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                     Generator                                │
//! │       (payload construction, coordinate validation)          │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ payload string
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │  QR Matrix  │          │ PNG Raster  │
//!   │  (encode)   │─────────▶│ (rasterize) │
//!   └─────────────┘          └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod qr;
pub mod generator;
pub mod protocol;
pub mod network;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{ForgeError, Result};
pub use config::Config;
pub use generator::Generator;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of QRForge
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
