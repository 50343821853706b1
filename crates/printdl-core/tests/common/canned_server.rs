//! Minimal HTTP/1.1 server serving canned responses for integration tests.
//!
//! Routes are keyed by `"METHOD /path"`. Every response carries
//! `Connection: close` so each request arrives on its own socket, and every
//! request is recorded so tests can assert on attempt counts.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;

#[derive(Debug, Clone)]
pub struct CannedResponse {
    pub status: u16,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

impl CannedResponse {
    pub fn ok(content_type: &'static str, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: 200,
            content_type,
            body: body.into(),
        }
    }

    pub fn status(status: u16) -> Self {
        Self {
            status,
            content_type: "text/plain",
            body: Vec::new(),
        }
    }
}

pub struct TestServer {
    pub base_url: String,
    hits: Arc<Mutex<Vec<String>>>,
}

impl TestServer {
    /// `"METHOD /path"` for every request received, in order.
    pub fn hits(&self) -> Vec<String> {
        self.hits.lock().unwrap().clone()
    }
}

/// Starts a server on a free port serving `routes`; unknown paths get 404.
/// The server runs until the process exits.
pub fn start(routes: HashMap<String, CannedResponse>) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let hits = Arc::new(Mutex::new(Vec::new()));
    let routes = Arc::new(routes);
    let hits_bg = Arc::clone(&hits);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let routes = Arc::clone(&routes);
            let hits = Arc::clone(&hits_bg);
            thread::spawn(move || handle(stream, &routes, &hits));
        }
    });
    TestServer {
        base_url: format!("http://127.0.0.1:{}", port),
        hits,
    }
}

fn handle(
    mut stream: TcpStream,
    routes: &HashMap<String, CannedResponse>,
    hits: &Mutex<Vec<String>>,
) {
    let _ = stream.set_read_timeout(Some(std::time::Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(std::time::Duration::from_secs(2)));

    let Some((method, path, body_remaining, expect_continue)) = read_request_head(&mut stream)
    else {
        return;
    };
    if expect_continue {
        let _ = stream.write_all(b"HTTP/1.1 100 Continue\r\n\r\n");
    }
    drain_body(&mut stream, body_remaining);

    hits.lock().unwrap().push(format!("{} {}", method, path));

    let response = routes
        .get(&format!("{} {}", method, path))
        .cloned()
        .unwrap_or_else(|| CannedResponse {
            status: 404,
            content_type: "text/plain",
            body: b"not found".to_vec(),
        });
    let head = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        response.status,
        reason(response.status),
        response.content_type,
        response.body.len()
    );
    let _ = stream.write_all(head.as_bytes());
    let _ = stream.write_all(&response.body);
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        404 => "Not Found",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Status",
    }
}

/// Reads the request head. Returns (method, path, body bytes still unread,
/// expect-continue).
fn read_request_head(stream: &mut TcpStream) -> Option<(String, String, usize, bool)> {
    let mut data = Vec::new();
    let mut buf = [0u8; 4096];
    let header_end = loop {
        let n = stream.read(&mut buf).ok()?;
        if n == 0 {
            return None;
        }
        data.extend_from_slice(&buf[..n]);
        if let Some(pos) = data.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos;
        }
        if data.len() > 64 * 1024 {
            return None;
        }
    };

    let head = std::str::from_utf8(&data[..header_end]).ok()?;
    let mut lines = head.lines();
    let request_line = lines.next()?;
    let mut parts = request_line.split_whitespace();
    let method = parts.next()?.to_string();
    let path = parts.next()?.to_string();

    let mut content_length = 0usize;
    let mut expect_continue = false;
    for line in lines {
        if let Some((name, value)) = line.split_once(':') {
            let value = value.trim();
            if name.trim().eq_ignore_ascii_case("content-length") {
                content_length = value.parse().unwrap_or(0);
            }
            if name.trim().eq_ignore_ascii_case("expect") {
                expect_continue = value.eq_ignore_ascii_case("100-continue");
            }
        }
    }

    let already_read = data.len() - (header_end + 4);
    Some((
        method,
        path,
        content_length.saturating_sub(already_read),
        expect_continue,
    ))
}

fn drain_body(stream: &mut TcpStream, mut remaining: usize) {
    let mut buf = [0u8; 4096];
    while remaining > 0 {
        let take = remaining.min(buf.len());
        match stream.read(&mut buf[..take]) {
            Ok(0) | Err(_) => break,
            Ok(n) => remaining -= n,
        }
    }
}
