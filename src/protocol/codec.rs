//! Protocol codec
//!
//! Encoding and decoding functions for the wire protocol, plus the
//! bytes-in/response-out request pipeline.
//!
//! ## Wire Format
//!
//! ### Requests
//! ```text
//! TEXT:<content>        content is everything after the prefix, verbatim
//! GEO:<lat>,<lon>       exactly one comma; dot-decimal floats
//! ```
//!
//! ### Responses
//! ```text
//! QRCODE:<image bytes>  success
//! ERROR:<message>       failure
//! ```
//!
//! Parsing is total: every inbound byte sequence produces either a typed
//! command or a typed error, never a panic. The parser runs in a single
//! pass over one chunk of bytes; there is no multi-read framing.

use std::io::{Read, Write};

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{ForgeError, Result};
use crate::generator::Generator;
use super::{Command, CommandType, Response, DEFAULT_ZOOM};

/// Response prefix for successful generation
pub const IMAGE_PREFIX: &[u8] = b"QRCODE:";

/// Response prefix for failures
pub const ERROR_PREFIX: &[u8] = b"ERROR:";

// =============================================================================
// Request Parsing
// =============================================================================

/// Parse a raw request into a command
///
/// Dispatches on the ASCII prefix:
/// - `TEXT:` takes the remainder as the content, with no trimming; an
///   empty remainder is accepted.
/// - `GEO:` requires the remainder to be `<lat>,<lon>` with exactly one
///   comma and both halves parsing fully as dot-decimal floats. Zoom is
///   not transmitted and defaults to 15.
///
/// Anything else, including requests that are not valid UTF-8 (payloads
/// are strings end-to-end), is rejected.
pub fn parse_request(bytes: &[u8]) -> Result<Command> {
    let request = std::str::from_utf8(bytes).map_err(|_| ForgeError::InvalidRequest)?;

    if let Some(content) = request.strip_prefix(CommandType::Text.prefix()) {
        return Ok(Command::Text {
            content: content.to_string(),
        });
    }

    if let Some(coords) = request.strip_prefix(CommandType::Geo.prefix()) {
        return parse_geo(coords);
    }

    Err(ForgeError::InvalidRequest)
}

/// Parse the `<lat>,<lon>` remainder of a GEO request
fn parse_geo(coords: &str) -> Result<Command> {
    let (lat_text, lon_text) = coords.split_once(',').ok_or(ForgeError::InvalidGeo)?;

    let latitude: f64 = lat_text.parse().map_err(|_| ForgeError::InvalidGeo)?;
    let longitude: f64 = lon_text.parse().map_err(|_| ForgeError::InvalidGeo)?;

    Ok(Command::Geo {
        latitude,
        longitude,
        zoom: DEFAULT_ZOOM,
    })
}

/// Encode a command as request bytes
///
/// The inverse of `parse_request` for client use. A `Geo` command's zoom
/// is not representable on the wire; the server applies the default.
pub fn encode_request(command: &Command) -> Vec<u8> {
    let mut request = command.command_type().prefix().as_bytes().to_vec();
    match command {
        Command::Text { content } => request.extend_from_slice(content.as_bytes()),
        Command::Geo {
            latitude,
            longitude,
            ..
        } => request.extend_from_slice(format!("{},{}", latitude, longitude).as_bytes()),
    }
    request
}

// =============================================================================
// Response Encoding/Decoding
// =============================================================================

/// Encode a response as wire bytes
///
/// Format: `QRCODE:` + image bytes, or `ERROR:` + message text.
pub fn encode_response(response: &Response) -> Bytes {
    match response {
        Response::Image(image) => {
            let mut frame = BytesMut::with_capacity(IMAGE_PREFIX.len() + image.len());
            frame.put_slice(IMAGE_PREFIX);
            frame.put_slice(image);
            frame.freeze()
        }
        Response::Error(message) => {
            let mut frame = BytesMut::with_capacity(ERROR_PREFIX.len() + message.len());
            frame.put_slice(ERROR_PREFIX);
            frame.put_slice(message.as_bytes());
            frame.freeze()
        }
    }
}

/// Decode wire bytes into a response
///
/// Client-side counterpart of `encode_response`. Anything that does not
/// start with one of the two response prefixes is a protocol violation.
pub fn decode_response(bytes: &[u8]) -> Result<Response> {
    if bytes.is_empty() {
        return Err(ForgeError::Protocol("Empty response from server".to_string()));
    }

    if let Some(image) = bytes.strip_prefix(IMAGE_PREFIX) {
        return Ok(Response::Image(Bytes::copy_from_slice(image)));
    }

    if let Some(message) = bytes.strip_prefix(ERROR_PREFIX) {
        return Ok(Response::Error(
            String::from_utf8_lossy(message).into_owned(),
        ));
    }

    Err(ForgeError::Protocol("Invalid server response".to_string()))
}

// =============================================================================
// Request Pipeline
// =============================================================================

/// Run one raw request through parse → generate → response
///
/// Total like the parser: every failure kind collapses into an error
/// response carrying the failure's Display text, so the connection layer
/// always has something well-formed to write back.
pub fn handle_request(request: &[u8], generator: &Generator) -> Response {
    let command = match parse_request(request) {
        Ok(command) => command,
        Err(e) => {
            tracing::warn!("Rejected request of {} bytes: {}", request.len(), e);
            return Response::error(&e.to_string());
        }
    };

    tracing::trace!("Parsed command: {:?}", command);

    match generator.execute(command) {
        Ok(image) => Response::image(image),
        Err(e) => Response::error(&e.to_string()),
    }
}

// =============================================================================
// Stream-based I/O helpers
// =============================================================================

/// Write a request to a stream
pub fn write_request<W: Write>(writer: &mut W, command: &Command) -> Result<()> {
    let bytes = encode_request(command);
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

/// Read a complete response from a stream
///
/// The protocol delimits responses by connection close, so this reads to
/// EOF before decoding.
pub fn read_response<R: Read>(reader: &mut R) -> Result<Response> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    decode_response(&bytes)
}
