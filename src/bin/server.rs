//! QRForge Server Binary
//!
//! Starts the TCP server for QRForge.

use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, EnvFilter};

use qrforge::network::Server;
use qrforge::{Config, Generator};

/// QRForge Server
#[derive(Parser, Debug)]
#[command(name = "qrforge-server")]
#[command(about = "TCP server that renders text and coordinates as QR code images")]
#[command(version)]
struct Args {
    /// Listen address (host:port)
    #[arg(short, long, default_value = "127.0.0.1:8080")]
    listen: String,

    /// Maximum concurrent connections (0 = unlimited)
    #[arg(short, long, default_value = "1024")]
    max_connections: usize,

    /// Request buffer capacity in bytes
    #[arg(long, default_value = "1024")]
    max_request_size: usize,

    /// Append logs to this file instead of stdout
    #[arg(long)]
    log_file: Option<String>,
}

fn main() {
    let args = Args::parse();

    // Initialize tracing/logging; the guard must outlive the server so
    // buffered file output is flushed on exit
    let _guard = init_logging(args.log_file.as_deref());

    tracing::info!("QRForge Server v{}", qrforge::VERSION);
    tracing::info!("Listen address: {}", args.listen);

    // Build config from args
    let config = Config::builder()
        .listen_addr(&args.listen)
        .max_connections(args.max_connections)
        .max_request_size(args.max_request_size)
        .build();

    let generator = Arc::new(Generator::new());

    // Bind the listener; a bind failure is fatal before serving
    let server = match Server::bind(config, generator) {
        Ok(server) => server,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", args.listen, e);
            std::process::exit(1);
        }
    };

    // Runs until the process is killed
    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Server stopped");
}

/// Install the fmt subscriber, optionally routed to a log file
fn init_logging(log_file: Option<&str>) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,qrforge=debug"));

    match log_file {
        Some(path) => {
            let path = Path::new(path);
            let directory = match path.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent,
                _ => Path::new("."),
            };
            let file_name = match path.file_name() {
                Some(name) => name,
                None => {
                    eprintln!("Invalid log file path: {}", path.display());
                    std::process::exit(1);
                }
            };

            let appender = tracing_appender::rolling::never(directory, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);

            fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true)
                .init();

            Some(guard)
        }
        None => {
            fmt()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();

            None
        }
    }
}
