//! Shared helpers for integration tests

#![allow(dead_code)]

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use qrforge::network::{Server, ShutdownHandle};
use qrforge::{Config, Generator};

/// A server running on an ephemeral port, stopped and joined on drop
pub struct TestServer {
    pub addr: SocketAddr,
    shutdown: ShutdownHandle,
    acceptor: Option<JoinHandle<qrforge::Result<()>>>,
}

impl TestServer {
    /// Start a server with default config on an ephemeral port
    pub fn start() -> Self {
        Self::start_with_config(Config::builder().listen_addr("127.0.0.1:0").build())
    }

    /// Start a server with the given config (listen_addr should use port 0)
    pub fn start_with_config(config: Config) -> Self {
        Self::start_with_generator(config, Arc::new(Generator::new()))
    }

    /// Start a server around a caller-owned generator
    pub fn start_with_generator(config: Config, generator: Arc<Generator>) -> Self {
        let server = Server::bind(config, generator).expect("bind test server");
        let addr = server.local_addr();
        let shutdown = server.shutdown_handle();
        let acceptor = std::thread::spawn(move || server.run());

        Self {
            addr,
            shutdown,
            acceptor: Some(acceptor),
        }
    }

    /// Stop the accept loop and wait for it to exit
    pub fn stop(&mut self) {
        self.shutdown.shutdown();
        if let Some(acceptor) = self.acceptor.take() {
            acceptor
                .join()
                .expect("acceptor thread panicked")
                .expect("accept loop failed");
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.shutdown();
        if let Some(acceptor) = self.acceptor.take() {
            let _ = acceptor.join();
        }
    }
}

/// Send one request and read the close-delimited response
pub fn send_request(addr: SocketAddr, request: &[u8]) -> Vec<u8> {
    let mut stream = TcpStream::connect(addr).expect("connect to test server");
    stream
        .set_read_timeout(Some(Duration::from_secs(5)))
        .expect("set read timeout");

    stream.write_all(request).expect("send request");

    let mut response = Vec::new();
    stream
        .read_to_end(&mut response)
        .expect("read response to EOF");
    response
}

/// Decode the content of a rasterized QR code with an independent decoder
///
/// The raster is one borderless pixel per module, which is below what a
/// detector needs, so the image is upscaled and given a quiet zone first.
/// Neither step changes the module content.
pub fn decode_qr_content(png: &[u8]) -> String {
    const SCALE: usize = 4;
    const BORDER: usize = 4;

    let matrix = qrforge::qr::decode(png).expect("decode PNG raster");
    let size = matrix.size();
    let dim = (size + 2 * BORDER) * SCALE;

    let mut prepared = rqrr::PreparedImage::prepare_from_greyscale(dim, dim, |x, y| {
        let mx = x / SCALE;
        let my = y / SCALE;
        let inside = mx >= BORDER && my >= BORDER && mx < size + BORDER && my < size + BORDER;
        if inside && matrix.module(mx - BORDER, my - BORDER) {
            0
        } else {
            255
        }
    });

    let grids = prepared.detect_grids();
    assert_eq!(grids.len(), 1, "expected exactly one QR code in the image");

    let (_meta, content) = grids[0].decode().expect("decode QR content");
    content
}

/// Strip the success prefix from a wire response, panicking on errors
pub fn expect_image(response: &[u8]) -> &[u8] {
    assert!(
        response.starts_with(b"QRCODE:"),
        "expected QRCODE: response, got {:?}",
        String::from_utf8_lossy(&response[..response.len().min(64)])
    );
    &response[b"QRCODE:".len()..]
}
