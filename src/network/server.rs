//! TCP Server
//!
//! Accepts connections and dispatches each to its own handler thread.

use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::{Condvar, Mutex};

use crate::config::Config;
use crate::error::Result;
use crate::generator::Generator;
use crate::network::Connection;

/// How long the acceptor sleeps when the listener has nothing pending
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Base delay for backing off after a failed accept
const ACCEPT_RETRY_BASE: Duration = Duration::from_millis(10);

/// How long the acceptor waits per shutdown check while at the connection cap
const GATE_WAIT_INTERVAL: Duration = Duration::from_millis(100);

/// TCP server for QRForge
///
/// The accept loop runs on the calling thread. The listener is kept in
/// non-blocking mode so the loop can observe the shutdown flag between
/// accepts; each accepted socket is switched back to blocking before it
/// is handed to a handler thread.
pub struct Server {
    config: Config,
    generator: Arc<Generator>,
    listener: TcpListener,
    local_addr: SocketAddr,
    shutdown: Arc<AtomicBool>,
    gate: Arc<ConnectionGate>,
}

impl Server {
    /// Bind the listening socket
    ///
    /// A bind or listen failure here is fatal: the caller gets the error
    /// before any request is served.
    pub fn bind(config: Config, generator: Arc<Generator>) -> Result<Self> {
        let listener = TcpListener::bind(&config.listen_addr)?;
        let local_addr = listener.local_addr()?;
        listener.set_nonblocking(true)?;

        let gate = ConnectionGate::new(config.max_connections);

        Ok(Self {
            config,
            generator,
            listener,
            local_addr,
            shutdown: Arc::new(AtomicBool::new(false)),
            gate,
        })
    }

    /// The address the listener is actually bound to
    ///
    /// Useful when the configured address requested an ephemeral port.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Get a handle that can stop the accept loop from another thread
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            shutdown: Arc::clone(&self.shutdown),
        }
    }

    /// Run the accept loop (blocking until shutdown)
    ///
    /// Transient accept failures are logged and retried with bounded
    /// backoff; they never terminate the server. Handler threads are
    /// detached and close their connection when done.
    pub fn run(self) -> Result<()> {
        tracing::info!("Listening on {}", self.local_addr);

        let mut next_connection_id: u64 = 0;
        let mut consecutive_errors: u32 = 0;

        while !self.shutdown.load(Ordering::Relaxed) {
            let (stream, peer_addr) = match self.listener.accept() {
                Ok(accepted) => {
                    consecutive_errors = 0;
                    accepted
                }
                Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                    continue;
                }
                Err(e) => {
                    // Transient faults (e.g. too many open files) must not
                    // spin the loop at full speed.
                    consecutive_errors = consecutive_errors.saturating_add(1);
                    let backoff = ACCEPT_RETRY_BASE * 2u32.saturating_pow(consecutive_errors.min(6));
                    tracing::warn!("Failed to accept connection: {} (retry in {:?})", e, backoff);
                    thread::sleep(backoff);
                    continue;
                }
            };

            let permit = match ConnectionGate::acquire(&self.gate, &self.shutdown) {
                Some(permit) => permit,
                None => break,
            };

            next_connection_id += 1;
            let connection_id = next_connection_id;
            let generator = Arc::clone(&self.generator);
            let config = self.config.clone();

            tracing::debug!(
                "Accepted connection {} from {} ({} active)",
                connection_id,
                peer_addr,
                self.gate.active()
            );

            let spawned = thread::Builder::new()
                .name(format!("conn-{}", connection_id))
                .spawn(move || {
                    let _permit = permit;
                    handle_connection(stream, generator, &config, connection_id);
                });

            if let Err(e) = spawned {
                // The stream drops here, closing the connection.
                tracing::warn!("Failed to spawn handler for connection {}: {}", connection_id, e);
            }
        }

        tracing::info!(
            "Shutting down after {} connections ({} still active)",
            next_connection_id,
            self.gate.active()
        );
        tracing::info!(
            "Generated {} images total ({} failures)",
            self.generator.images_generated(),
            self.generator.generation_failures()
        );

        Ok(())
    }
}

/// Flips the shutdown flag observed by a server's accept loop
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    shutdown: Arc<AtomicBool>,
}

impl ShutdownHandle {
    /// Ask the accept loop to stop
    ///
    /// In-flight connections run to completion; only accepting stops.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    /// Whether shutdown has been requested
    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::Relaxed)
    }
}

/// Run one connection to completion on its handler thread
fn handle_connection(
    stream: TcpStream,
    generator: Arc<Generator>,
    config: &Config,
    connection_id: u64,
) {
    let mut connection = match Connection::new(stream, generator, config.max_request_size) {
        Ok(connection) => connection,
        Err(e) => {
            tracing::warn!("Failed to set up connection {}: {}", connection_id, e);
            return;
        }
    };

    if let Err(e) = connection.set_timeouts(config.read_timeout_ms, config.write_timeout_ms) {
        tracing::warn!(
            "Failed to set timeouts for connection {} from {}: {}",
            connection_id,
            connection.peer_addr(),
            e
        );
        return;
    }

    if let Err(e) = connection.handle() {
        tracing::warn!(
            "Connection {} from {} failed: {}",
            connection_id,
            connection.peer_addr(),
            e
        );
    }
}

/// Admission control for handler threads
///
/// Tracks the number of live connections. With a non-zero limit the
/// acceptor waits for a free slot before taking on another connection;
/// a limit of zero disables the cap and only keeps the count.
struct ConnectionGate {
    limit: usize,
    active: Mutex<usize>,
    released: Condvar,
}

/// Releases its gate slot on drop
struct GatePermit {
    gate: Arc<ConnectionGate>,
}

impl ConnectionGate {
    fn new(limit: usize) -> Arc<Self> {
        Arc::new(Self {
            limit,
            active: Mutex::new(0),
            released: Condvar::new(),
        })
    }

    /// Take a slot, waiting while the gate is full
    ///
    /// Returns `None` if shutdown is requested while waiting.
    fn acquire(gate: &Arc<Self>, shutdown: &AtomicBool) -> Option<GatePermit> {
        let mut active = gate.active.lock();

        if gate.limit > 0 && *active >= gate.limit {
            tracing::debug!("Connection limit {} reached, waiting for a free slot", gate.limit);
        }

        while gate.limit > 0 && *active >= gate.limit {
            if shutdown.load(Ordering::Relaxed) {
                return None;
            }
            let _ = gate.released.wait_for(&mut active, GATE_WAIT_INTERVAL);
        }

        *active += 1;
        Some(GatePermit {
            gate: Arc::clone(gate),
        })
    }

    /// Number of live connections
    fn active(&self) -> usize {
        *self.active.lock()
    }
}

impl Drop for GatePermit {
    fn drop(&mut self) {
        let mut active = self.gate.active.lock();
        *active -= 1;
        self.gate.released.notify_one();
    }
}
