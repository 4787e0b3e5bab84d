//! Network Module
//!
//! TCP server and connection handling.
//!
//! ## Architecture
//! - Single acceptor thread, non-blocking listener polled against a
//!   shutdown flag
//! - One handler thread per connection, bounded by an admission gate
//! - Each connection: one read, one response, unconditional close

mod server;
mod connection;

pub use server::{Server, ShutdownHandle};
pub use connection::Connection;
