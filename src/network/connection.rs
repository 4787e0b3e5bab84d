//! Connection Handler
//!
//! Handles individual client connections.

use std::io::{Read, Write};
use std::net::{Shutdown, TcpStream};
use std::sync::Arc;
use std::time::Duration;

use crate::error::Result;
use crate::generator::Generator;
use crate::protocol::{encode_response, handle_request, Response};

/// Handles a single client connection
///
/// The protocol is one request per connection with no length framing in
/// either direction: the request is whatever arrives in a single read,
/// and the response is delimited by the connection closing afterwards.
pub struct Connection {
    /// The accepted TCP stream
    stream: TcpStream,

    /// Reference to the image generator
    generator: Arc<Generator>,

    /// Peer address for logging
    peer_addr: String,

    /// Capacity of the single-read request buffer
    max_request_size: usize,
}

impl Connection {
    /// Create a new connection handler
    pub fn new(stream: TcpStream, generator: Arc<Generator>, max_request_size: usize) -> Result<Self> {
        // Get peer address for logging before anything can fail
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        // Listeners in non-blocking mode hand out non-blocking sockets on
        // some platforms; the handler needs a blocking one.
        stream.set_nonblocking(false)?;

        // Disable Nagle's algorithm for low latency
        stream.set_nodelay(true)?;

        Ok(Self {
            stream,
            generator,
            peer_addr,
            max_request_size,
        })
    }

    /// Configure connection timeouts
    pub fn set_timeouts(&mut self, read_ms: u64, write_ms: u64) -> Result<()> {
        if read_ms > 0 {
            self.stream
                .set_read_timeout(Some(Duration::from_millis(read_ms)))?;
        }
        if write_ms > 0 {
            self.stream
                .set_write_timeout(Some(Duration::from_millis(write_ms)))?;
        }

        Ok(())
    }

    /// Handle the connection (blocking until closed)
    ///
    /// Reads one request, writes one response, then closes with an
    /// orderly half-close and drain. A peer that disconnects before
    /// sending anything gets no response and no error.
    pub fn handle(&mut self) -> Result<()> {
        tracing::debug!("Connection established from {}", self.peer_addr);

        let mut buf = vec![0u8; self.max_request_size];
        let bytes_read = match self.stream.read(&mut buf) {
            Ok(n) => n,
            Err(ref e) if e.kind() == std::io::ErrorKind::ConnectionReset => {
                tracing::debug!("Connection reset by client {}", self.peer_addr);
                return Ok(());
            }
            Err(ref e) if e.kind() == std::io::ErrorKind::ConnectionAborted => {
                tracing::debug!("Connection aborted by client {}", self.peer_addr);
                return Ok(());
            }
            Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                tracing::debug!("Read timeout for client {}", self.peer_addr);
                return Ok(());
            }
            Err(ref e) if e.kind() == std::io::ErrorKind::TimedOut => {
                // Read timeout (Windows uses TimedOut instead of WouldBlock)
                tracing::debug!("Read timeout for client {}", self.peer_addr);
                return Ok(());
            }
            Err(e) => {
                tracing::warn!("Error reading from {}: {}", self.peer_addr, e);
                return Err(e.into());
            }
        };

        // Peer closed without sending a request
        if bytes_read == 0 {
            tracing::debug!("Client {} disconnected without sending a request", self.peer_addr);
            return Ok(());
        }

        tracing::trace!("Received {} byte request from {}", bytes_read, self.peer_addr);

        let response = handle_request(&buf[..bytes_read], &self.generator);
        self.send_response(&response)?;
        self.finish_close()
    }

    /// Send a response to the client
    fn send_response(&mut self, response: &Response) -> Result<()> {
        let bytes = encode_response(response);

        match self.stream.write_all(&bytes).and_then(|_| self.stream.flush()) {
            Ok(()) => {
                tracing::debug!("Sent {} byte response to {}", bytes.len(), self.peer_addr);
                Ok(())
            }
            Err(ref e)
                if matches!(
                    e.kind(),
                    std::io::ErrorKind::ConnectionAborted
                        | std::io::ErrorKind::ConnectionReset
                        | std::io::ErrorKind::BrokenPipe
                ) =>
            {
                // The client hung up before the response could be sent;
                // not a server error.
                tracing::debug!(
                    "Client {} disconnected before response could be sent: {}",
                    self.peer_addr,
                    e
                );
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Error writing to {}: {}", self.peer_addr, e);
                Err(e.into())
            }
        }
    }

    /// Wind the connection down without losing the response
    ///
    /// Dropping the socket while unread request bytes sit in its receive
    /// queue turns the close into a reset, which can destroy the response
    /// in flight. Half-close the write side so the peer sees
    /// end-of-response, then consume whatever the single read left behind
    /// until the peer closes.
    fn finish_close(&mut self) -> Result<()> {
        if let Err(e) = self.stream.shutdown(Shutdown::Write) {
            tracing::debug!("Could not half-close connection to {}: {}", self.peer_addr, e);
            return Ok(());
        }

        let mut leftover = [0u8; 1024];
        loop {
            match self.stream.read(&mut leftover) {
                Ok(0) => return Ok(()),
                Ok(n) => {
                    tracing::trace!("Discarded {} unread request bytes from {}", n, self.peer_addr);
                }
                Err(e) => {
                    // The response is already queued behind our FIN;
                    // nothing further to protect.
                    tracing::debug!("Stopped draining {}: {}", self.peer_addr, e);
                    return Ok(());
                }
            }
        }
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }
}
