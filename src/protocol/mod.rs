//! Protocol Module
//!
//! Defines the wire protocol for client-server communication.
//!
//! ## Protocol Format (ASCII prefixes, one request per connection)
//!
//! ### Request Format
//! ```text
//! ┌──────────────┬──────────────────────────────────┐
//! │ "TEXT:"      │  content bytes, verbatim         │
//! ├──────────────┼──────────────────────────────────┤
//! │ "GEO:"       │  <lat>,<lon> as decimal floats   │
//! └──────────────┴──────────────────────────────────┘
//! ```
//!
//! ### Response Format
//! ```text
//! ┌──────────────┬──────────────────────────────────┐
//! │ "QRCODE:"    │  PNG image bytes                 │
//! ├──────────────┼──────────────────────────────────┤
//! │ "ERROR:"     │  human-readable message          │
//! └──────────────┴──────────────────────────────────┘
//! ```
//!
//! There is no length field in either direction. A request is whatever
//! arrives in the server's single read; a response is delimited by the
//! server closing the connection. Zoom never travels on the wire and
//! defaults to 15.

mod command;
mod response;
mod codec;

pub use command::{Command, CommandType, DEFAULT_ZOOM};
pub use response::Response;
pub use codec::{
    decode_response, encode_request, encode_response, handle_request, parse_request,
    read_response, write_request, ERROR_PREFIX, IMAGE_PREFIX,
};
