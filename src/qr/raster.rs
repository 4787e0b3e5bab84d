//! Raster serialization
//!
//! Writes a module matrix as a 1-bit grayscale PNG and reads it back.
//!
//! ## Pixel Layout
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │ row 0:  m(0,0) m(1,0) ... m(size-1,0) | pad   │
//! │ row 1:  m(0,1) m(1,1) ... m(size-1,1) | pad   │
//! │ ...                                           │
//! └───────────────────────────────────────────────┘
//! ```
//!
//! One pixel per module, MSB-first within each byte, rows padded to a byte
//! boundary independently: `row[x / 8] |= 1 << (7 - x % 8)` for a dark
//! module. Dark = sample 1, light = sample 0.

use crate::error::{ForgeError, Result};
use crate::qr::QrMatrix;

/// Serialize a matrix as a 1-bit grayscale PNG
///
/// Never fails for a well-formed matrix; the error path only covers the
/// PNG writer's own plumbing.
pub fn rasterize(matrix: &QrMatrix) -> Result<Vec<u8>> {
    let size = matrix.size();
    let packed = pack_rows(matrix);

    let mut out = Vec::new();
    let mut encoder = png::Encoder::new(&mut out, size as u32, size as u32);
    encoder.set_color(png::ColorType::Grayscale);
    encoder.set_depth(png::BitDepth::One);

    let mut writer = encoder.write_header().map_err(raster_error)?;
    writer.write_image_data(&packed).map_err(raster_error)?;
    writer.finish().map_err(raster_error)?;

    Ok(out)
}

/// Read a 1-bit grayscale PNG back into a module matrix
///
/// Rejects containers that are not square single-channel bit-depth-1
/// images, since nothing else can be a rasterized QR matrix.
pub fn decode(bytes: &[u8]) -> Result<QrMatrix> {
    let mut decoder = png::Decoder::new(bytes);
    decoder.set_transformations(png::Transformations::IDENTITY);

    let mut reader = decoder.read_info().map_err(raster_error)?;

    {
        let info = reader.info();
        if info.color_type != png::ColorType::Grayscale || info.bit_depth != png::BitDepth::One {
            return Err(ForgeError::Raster(format!(
                "expected 1-bit grayscale image, got {:?} at depth {:?}",
                info.color_type, info.bit_depth
            )));
        }
        if info.width != info.height {
            return Err(ForgeError::Raster(format!(
                "QR raster must be square, got {}x{}",
                info.width, info.height
            )));
        }
    }

    let mut buf = vec![0u8; reader.output_buffer_size()];
    let frame = reader.next_frame(&mut buf).map_err(raster_error)?;

    let size = frame.width as usize;
    let stride = frame.line_size;

    let mut modules = Vec::with_capacity(size * size);
    for y in 0..size {
        let row = &buf[y * stride..(y + 1) * stride];
        for x in 0..size {
            modules.push((row[x / 8] & (1 << (7 - x % 8))) != 0);
        }
    }

    Ok(QrMatrix::from_modules(size, modules))
}

/// Pack module rows into byte-aligned MSB-first bit rows
fn pack_rows(matrix: &QrMatrix) -> Vec<u8> {
    let size = matrix.size();
    let stride = (size + 7) / 8;

    let mut packed = vec![0u8; stride * size];
    for (y, row) in matrix.rows().enumerate() {
        let out_row = &mut packed[y * stride..(y + 1) * stride];
        for (x, &dark) in row.iter().enumerate() {
            if dark {
                out_row[x / 8] |= 1 << (7 - x % 8);
            }
        }
    }

    packed
}

fn raster_error(err: impl std::fmt::Display) -> ForgeError {
    ForgeError::Raster(err.to_string())
}
