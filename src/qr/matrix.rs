//! QR module matrix
//!
//! A square grid of boolean modules produced by the QR encoder.

use qrcode::bits::Bits;
use qrcode::types::QrError;
use qrcode::{Color, EcLevel, QrCode, Version};

use crate::error::Result;

/// A square grid of QR modules, row-major
///
/// The side length is chosen by the encoder from the payload size at the
/// fixed error-correction level. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrMatrix {
    /// Side length in modules
    size: usize,

    /// Module colors, row-major, `true` = dark
    modules: Vec<bool>,
}

impl QrMatrix {
    /// Error-correction level used for every generated code
    ///
    /// Low keeps byte-mode capacity at its maximum of 2953 payload bytes.
    const EC_LEVEL: EcLevel = EcLevel::L;

    /// Encode a payload into a module matrix
    ///
    /// The payload goes in as a single byte-mode segment, never as the
    /// denser numeric or alphanumeric modes, so capacity is the byte-mode
    /// table (2953 bytes at the largest version). Fails with an encoding
    /// error when the payload does not fit.
    pub fn encode(payload: &str) -> Result<Self> {
        let code = Self::byte_mode_code(payload.as_bytes())?;

        let size = code.width();
        let modules: Vec<bool> = code
            .to_colors()
            .iter()
            .map(|color| *color == Color::Dark)
            .collect();

        tracing::debug!(
            "Encoded {} byte payload into {}x{} matrix",
            payload.len(),
            size,
            size
        );

        Ok(Self { size, modules })
    }

    /// Build a code from the smallest version that fits the payload as
    /// one byte-mode segment
    fn byte_mode_code(data: &[u8]) -> Result<QrCode> {
        for version in (1..=40).map(Version::Normal) {
            let mut bits = Bits::new(version);
            let fits = bits
                .push_byte_data(data)
                .and_then(|_| bits.push_terminator(Self::EC_LEVEL));
            if fits.is_ok() {
                return Ok(QrCode::with_bits(bits, Self::EC_LEVEL)?);
            }
        }

        Err(QrError::DataTooLong.into())
    }

    /// Build a matrix from raw parts
    ///
    /// Used when reading a raster back into module form.
    ///
    /// # Panics
    /// Panics if `modules.len() != size * size`.
    pub fn from_modules(size: usize, modules: Vec<bool>) -> Self {
        assert_eq!(
            modules.len(),
            size * size,
            "module count must match a {size}x{size} grid"
        );
        Self { size, modules }
    }

    /// Side length in modules
    pub fn size(&self) -> usize {
        self.size
    }

    /// Whether the module at `(x, y)` is dark
    ///
    /// # Panics
    /// Panics if `x` or `y` is outside the grid.
    pub fn module(&self, x: usize, y: usize) -> bool {
        assert!(x < self.size && y < self.size, "module index out of bounds");
        self.modules[y * self.size + x]
    }

    /// Iterate over rows of modules
    pub fn rows(&self) -> impl Iterator<Item = &[bool]> {
        self.modules.chunks(self.size)
    }
}
