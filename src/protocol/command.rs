//! Command definitions
//!
//! Represents commands from clients.

/// Zoom level applied when a GEO request omits it (the wire always does)
pub const DEFAULT_ZOOM: i32 = 15;

/// Command types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandType {
    Text,
    Geo,
}

impl CommandType {
    /// The ASCII request prefix for this command type
    pub fn prefix(&self) -> &'static str {
        match self {
            CommandType::Text => "TEXT:",
            CommandType::Geo => "GEO:",
        }
    }
}

/// A parsed command
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Encode free text verbatim
    Text { content: String },

    /// Encode a geographic location as a geo URI
    Geo {
        latitude: f64,
        longitude: f64,
        zoom: i32,
    },
}

impl Command {
    /// Get the command type
    pub fn command_type(&self) -> CommandType {
        match self {
            Command::Text { .. } => CommandType::Text,
            Command::Geo { .. } => CommandType::Geo,
        }
    }
}
