//! QRForge CLI Client
//!
//! Command-line client for the QRForge server: sends one request, saves
//! the returned PNG, and can render the code in the terminal.

use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use clap::{Parser, Subcommand};

use qrforge::protocol::{read_response, write_request, Command, Response, DEFAULT_ZOOM};
use qrforge::{qr, ForgeError, Result};

/// Quiet-zone width, in modules, around the terminal rendering
const QUIET_ZONE: i32 = 4;

/// QRForge CLI
#[derive(Parser, Debug)]
#[command(name = "qrforge-cli")]
#[command(about = "CLI client for the QRForge server")]
#[command(version)]
struct Args {
    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:8080")]
    server: String,

    /// Network timeout in milliseconds (0 = no timeout)
    #[arg(short, long, default_value = "5000")]
    timeout_ms: u64,

    /// Write the received image to this file
    #[arg(short, long, default_value = "qrcode.png")]
    output: String,

    /// Also print the QR code to the terminal
    #[arg(long)]
    show: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Encode free text
    Text {
        /// The text to encode
        content: String,
    },

    /// Encode geographic coordinates
    Geo {
        /// Latitude in decimal degrees
        #[arg(allow_negative_numbers = true)]
        latitude: f64,

        /// Longitude in decimal degrees
        #[arg(allow_negative_numbers = true)]
        longitude: f64,
    },
}

fn main() {
    let args = Args::parse();

    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<()> {
    let command = match &args.command {
        Commands::Text { content } => Command::Text {
            content: content.clone(),
        },
        Commands::Geo {
            latitude,
            longitude,
        } => Command::Geo {
            latitude: *latitude,
            longitude: *longitude,
            zoom: DEFAULT_ZOOM,
        },
    };

    match send_command(&args.server, args.timeout_ms, &command)? {
        Response::Image(image) => {
            std::fs::write(&args.output, &image)?;
            println!("Saved {} byte image to {}", image.len(), args.output);

            if args.show {
                print_qr(&image)?;
            }

            Ok(())
        }
        Response::Error(message) => {
            eprintln!("Server error: {}", message);
            std::process::exit(1);
        }
    }
}

/// Send one command and read the close-delimited response
fn send_command(server: &str, timeout_ms: u64, command: &Command) -> Result<Response> {
    let addr = server
        .to_socket_addrs()?
        .next()
        .ok_or_else(|| ForgeError::Network(format!("No address found for {}", server)))?;

    let mut stream = if timeout_ms > 0 {
        let timeout = Duration::from_millis(timeout_ms);
        let stream = TcpStream::connect_timeout(&addr, timeout)?;
        stream.set_read_timeout(Some(timeout))?;
        stream.set_write_timeout(Some(timeout))?;
        stream
    } else {
        TcpStream::connect(addr)?
    };

    write_request(&mut stream, command)?;
    read_response(&mut stream)
}

/// Render the received PNG as block characters
fn print_qr(image: &[u8]) -> Result<()> {
    let matrix = qr::decode(image)?;
    let size = matrix.size() as i32;

    for y in -QUIET_ZONE..size + QUIET_ZONE {
        let mut line = String::new();
        for x in -QUIET_ZONE..size + QUIET_ZONE {
            let dark = x >= 0
                && y >= 0
                && x < size
                && y < size
                && matrix.module(x as usize, y as usize);
            line.push_str(if dark { "██" } else { "  " });
        }
        println!("{}", line);
    }

    Ok(())
}
