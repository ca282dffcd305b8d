//! Minimal HTTP/1.1 server that serves one archive body for integration tests.
//!
//! Every GET gets the same response; `status` lets a test simulate a missing
//! release (404) or a broken mirror (500).

use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

#[derive(Debug, Clone, Copy)]
pub struct ArchiveServerOptions {
    /// HTTP status line code to answer with.
    pub status: u16,
}

impl Default for ArchiveServerOptions {
    fn default() -> Self {
        Self { status: 200 }
    }
}

/// Handle to a running server. `hits` counts GET requests served.
pub struct ArchiveServer {
    pub url: String,
    hits: Arc<AtomicUsize>,
}

impl ArchiveServer {
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

/// Starts a server in a background thread serving `body` at
/// `/archive/refs/tags/v1.0.0.tar.gz`. The server runs until the process exits.
pub fn start(body: Vec<u8>) -> ArchiveServer {
    start_with_options(body, ArchiveServerOptions::default())
}

pub fn start_with_options(body: Vec<u8>, opts: ArchiveServerOptions) -> ArchiveServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let body = Arc::new(body);
    let hits = Arc::new(AtomicUsize::new(0));
    let hits_srv = Arc::clone(&hits);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let body = Arc::clone(&body);
            let hits = Arc::clone(&hits_srv);
            thread::spawn(move || handle(stream, &body, opts, &hits));
        }
    });
    ArchiveServer {
        url: format!("http://127.0.0.1:{}/archive/refs/tags/v1.0.0.tar.gz", port),
        hits,
    }
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}

fn handle(mut stream: std::net::TcpStream, body: &[u8], opts: ArchiveServerOptions, hits: &AtomicUsize) {
    let _ = stream.set_read_timeout(Some(std::time::Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(std::time::Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) => return,
        Ok(n) => n,
        Err(_) => return,
    };
    let request = match std::str::from_utf8(&buf[..n]) {
        Ok(s) => s,
        Err(_) => return,
    };
    let method = request.split_whitespace().next().unwrap_or("");
    if !method.eq_ignore_ascii_case("GET") {
        let _ = stream.write_all(b"HTTP/1.1 405 Method Not Allowed\r\nContent-Length: 0\r\n\r\n");
        return;
    }
    hits.fetch_add(1, Ordering::SeqCst);

    let payload: &[u8] = if opts.status == 200 { body } else { b"not here" };
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/gzip\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        opts.status,
        reason(opts.status),
        payload.len()
    );
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.write_all(payload);
}
