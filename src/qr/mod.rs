//! QR Code Module
//!
//! Turns a logical payload into a module matrix and serializes the matrix
//! as a raster image.
//!
//! ## Responsibilities
//! - Encode payload bytes into a square grid of boolean modules
//!   (fixed low error correction, byte mode)
//! - Rasterize the grid as a 1-bit grayscale PNG, one pixel per module
//! - Decode such a PNG back into a grid (client rendering, tests)
//!
//! ## Raster Format
//! Single channel, bit depth 1, no scaling. Rows are packed MSB-first and
//! each row is byte-aligned independently. A dark module is stored as bit
//! value 1, a light module as 0.

mod matrix;
mod raster;

pub use matrix::QrMatrix;
pub use raster::{decode, rasterize};
