//! Generator Module
//!
//! Builds logical payloads and drives the QR pipeline.
//!
//! ## Responsibilities
//! - Pass text content through verbatim
//! - Format geographic coordinates as a canonical geo URI
//! - Validate coordinate ranges before any encoding work
//! - Route parsed commands to the right entry point

use std::sync::atomic::{AtomicU64, Ordering};

use bytes::Bytes;

use crate::error::{ForgeError, Result};
use crate::protocol::Command;
use crate::qr::{self, QrMatrix};

/// Latitude must fall inside this range (degrees)
const LATITUDE_RANGE: std::ops::RangeInclusive<f64> = -90.0..=90.0;

/// Longitude must fall inside this range (degrees)
const LONGITUDE_RANGE: std::ops::RangeInclusive<f64> = -180.0..=180.0;

/// The QR image generator
///
/// ## Concurrency Model: Pure Per-Call Generation
///
/// Every call builds its own matrix and output buffer and returns the
/// image by value, so concurrent callers cannot observe each other's
/// intermediate state. No locking is involved; the handler threads share
/// one `Arc<Generator>` and only the counters below are shared state.
pub struct Generator {
    /// Images produced since startup
    images_generated: AtomicU64,

    /// Requests rejected by validation or the codec since startup
    generation_failures: AtomicU64,
}

impl Generator {
    /// Create a new generator
    pub fn new() -> Self {
        Self {
            images_generated: AtomicU64::new(0),
            generation_failures: AtomicU64::new(0),
        }
    }

    /// Execute a parsed command and return the image bytes
    pub fn execute(&self, command: Command) -> Result<Bytes> {
        match command {
            Command::Text { content } => self.generate_text(&content),
            Command::Geo {
                latitude,
                longitude,
                zoom,
            } => self.generate_location(latitude, longitude, zoom),
        }
    }

    /// Generate a QR image for free text
    ///
    /// The content is encoded verbatim; an empty payload is accepted.
    pub fn generate_text(&self, content: &str) -> Result<Bytes> {
        tracing::info!("Generating QR code for {} byte text payload", content.len());
        self.render(content)
    }

    /// Generate a QR image for a geographic location
    ///
    /// The payload is `geo:<lat>,<lon>?z=<zoom>` with latitude and
    /// longitude in five-decimal fixed formatting. Fails without producing
    /// an image when either coordinate is out of range; range containment
    /// also rejects non-finite values.
    pub fn generate_location(&self, latitude: f64, longitude: f64, zoom: i32) -> Result<Bytes> {
        tracing::info!(
            "Generating QR code for coordinates ({}, {})",
            latitude,
            longitude
        );

        if !LATITUDE_RANGE.contains(&latitude) || !LONGITUDE_RANGE.contains(&longitude) {
            tracing::warn!(
                "Rejected out-of-range coordinates ({}, {})",
                latitude,
                longitude
            );
            self.generation_failures.fetch_add(1, Ordering::Relaxed);
            return Err(ForgeError::CoordinatesOutOfRange);
        }

        let payload = format!("geo:{:.5},{:.5}?z={}", latitude, longitude, zoom);
        tracing::debug!("Geo URI payload: {}", payload);

        self.render(&payload)
    }

    /// Encode and rasterize a payload
    fn render(&self, payload: &str) -> Result<Bytes> {
        let image = QrMatrix::encode(payload)
            .and_then(|matrix| qr::rasterize(&matrix))
            .map_err(|e| {
                tracing::error!("QR generation failed: {}", e);
                self.generation_failures.fetch_add(1, Ordering::Relaxed);
                e
            })?;

        self.images_generated.fetch_add(1, Ordering::Relaxed);
        Ok(Bytes::from(image))
    }

    /// Number of images produced since startup
    pub fn images_generated(&self) -> u64 {
        self.images_generated.load(Ordering::Relaxed)
    }

    /// Number of failed generation attempts since startup
    pub fn generation_failures(&self) -> u64 {
        self.generation_failures.load(Ordering::Relaxed)
    }
}

impl Default for Generator {
    fn default() -> Self {
        Self::new()
    }
}
