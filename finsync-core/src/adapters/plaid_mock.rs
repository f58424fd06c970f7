//! Mock Plaid API server for testing
//!
//! A small blocking HTTP server on a background thread that answers the
//! three Plaid endpoints the client uses and records every request it
//! receives:
//! - POST /sandbox/public_token/create returns { public_token: "public-sandbox-<institution>" }
//! - POST /item/public_token/exchange returns { access_token: "access-..." }
//! - POST /transactions/get returns { transactions: [...], total_transactions: N }

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use serde_json::{json, Value as JsonValue};

/// Mock Plaid server for testing
pub struct MockPlaidServer {
    port: u16,
    running: Arc<AtomicBool>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    thread_handle: Option<thread::JoinHandle<()>>,
}

/// Canned behaviour of the mock server
#[derive(Debug, Clone, Default)]
pub struct MockConfig {
    /// Transactions returned per access token (unknown tokens get none)
    pub transactions: HashMap<String, Vec<JsonValue>>,
    /// Paths that answer with a Plaid error body
    pub fail_paths: Vec<String>,
    /// Delay in milliseconds before responding
    pub delay_ms: u64,
}

/// A request as seen by the mock server
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    /// Header names are lowercased
    pub headers: Vec<(String, String)>,
    pub body: JsonValue,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        let name = name.to_ascii_lowercase();
        self.headers
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.as_str())
    }
}

impl MockPlaidServer {
    /// Start a new mock server on a random available port
    pub fn start(config: MockConfig) -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0")?;
        let port = listener.local_addr()?.port();
        let running = Arc::new(AtomicBool::new(true));
        let requests = Arc::new(Mutex::new(Vec::new()));

        // Non-blocking accept so the loop can notice shutdown
        listener.set_nonblocking(true)?;

        let running_clone = running.clone();
        let requests_clone = requests.clone();
        let thread_handle = thread::spawn(move || {
            while running_clone.load(Ordering::SeqCst) {
                match listener.accept() {
                    Ok((stream, _)) => {
                        let cfg = config.clone();
                        let log = requests_clone.clone();
                        thread::spawn(move || handle_connection(stream, &cfg, &log));
                    }
                    Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                        thread::sleep(std::time::Duration::from_millis(10));
                    }
                    Err(_) => break,
                }
            }
        });

        Ok(Self {
            port,
            running,
            requests,
            thread_handle: Some(thread_handle),
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Get the base URL for this mock server
    pub fn base_url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    /// Requests received so far, in arrival order
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for MockPlaidServer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Read one full request: headers, then as many body bytes as Content-Length says
fn read_request(stream: &mut TcpStream) -> Option<(String, Vec<u8>)> {
    // The accepted socket may inherit non-blocking mode from the listener
    stream.set_nonblocking(false).ok()?;

    let mut data = Vec::new();
    let mut buffer = [0u8; 4096];
    let header_end = loop {
        let n = stream.read(&mut buffer).ok()?;
        if n == 0 {
            return None;
        }
        data.extend_from_slice(&buffer[..n]);
        if let Some(pos) = data.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&data[..header_end]).to_string();
    let content_length = head
        .lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(k, _)| k.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, v)| v.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while data.len() < header_end + content_length {
        let n = stream.read(&mut buffer).ok()?;
        if n == 0 {
            break;
        }
        data.extend_from_slice(&buffer[..n]);
    }

    let end = (header_end + content_length).min(data.len());
    Some((head, data[header_end..end].to_vec()))
}

fn handle_connection(
    mut stream: TcpStream,
    config: &MockConfig,
    log: &Arc<Mutex<Vec<RecordedRequest>>>,
) {
    let Some((head, body)) = read_request(&mut stream) else {
        return;
    };

    if config.delay_ms > 0 {
        thread::sleep(std::time::Duration::from_millis(config.delay_ms));
    }

    let mut lines = head.lines();
    let first_line = lines.next().unwrap_or("");
    let parts: Vec<&str> = first_line.split_whitespace().collect();
    if parts.len() < 2 {
        send_response(&mut stream, 400, "Bad Request", r#"{"error": "Invalid request"}"#);
        return;
    }

    let headers: Vec<(String, String)> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(k, v)| (k.trim().to_ascii_lowercase(), v.trim().to_string()))
        .collect();
    let body: JsonValue = serde_json::from_slice(&body).unwrap_or(JsonValue::Null);

    let request = RecordedRequest {
        method: parts[0].to_string(),
        path: parts[1].to_string(),
        headers,
        body,
    };
    if let Ok(mut log) = log.lock() {
        log.push(request.clone());
    }

    if request.method != "POST" {
        send_response(
            &mut stream,
            405,
            "Method Not Allowed",
            r#"{"error": "Method not allowed"}"#,
        );
        return;
    }

    if request.header("plaid-client-id").unwrap_or("").is_empty()
        || request.header("plaid-secret").unwrap_or("").is_empty()
    {
        let error = plaid_error("INVALID_REQUEST", "MISSING_FIELDS", "client_id and secret are required");
        send_response(&mut stream, 400, "Bad Request", &error.to_string());
        return;
    }

    if config.fail_paths.iter().any(|p| *p == request.path) {
        let code = match request.path.as_str() {
            "/item/public_token/exchange" => "INVALID_PUBLIC_TOKEN",
            "/transactions/get" => "INVALID_ACCESS_TOKEN",
            _ => "INVALID_INSTITUTION",
        };
        let error = plaid_error("INVALID_INPUT", code, "the provided input is not valid");
        send_response(&mut stream, 400, "Bad Request", &error.to_string());
        return;
    }

    let field = |name: &str| request.body[name].as_str().unwrap_or("").to_string();

    let response = match request.path.as_str() {
        "/sandbox/public_token/create" => json!({
            "public_token": format!("public-sandbox-{}", field("institution_id")),
            "request_id": "mock-request"
        }),
        "/item/public_token/exchange" => {
            let public_token = field("public_token");
            let suffix = public_token.strip_prefix("public-").unwrap_or(&public_token);
            json!({
                "access_token": format!("access-{}", suffix),
                "item_id": format!("item-{}", suffix),
                "request_id": "mock-request"
            })
        }
        "/transactions/get" => {
            let txs = config
                .transactions
                .get(&field("access_token"))
                .cloned()
                .unwrap_or_default();
            json!({
                "accounts": [],
                "total_transactions": txs.len(),
                "transactions": txs,
                "request_id": "mock-request"
            })
        }
        _ => {
            send_response(
                &mut stream,
                404,
                "Not Found",
                r#"{"error": "Endpoint not found"}"#,
            );
            return;
        }
    };

    send_response(&mut stream, 200, "OK", &response.to_string());
}

fn plaid_error(error_type: &str, error_code: &str, message: &str) -> JsonValue {
    json!({
        "error_type": error_type,
        "error_code": error_code,
        "error_message": message,
        "display_message": null,
        "request_id": "mock-request"
    })
}

fn send_response(stream: &mut TcpStream, status: u16, status_text: &str, body: &str) {
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        status_text,
        body.len(),
        body
    );
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.flush();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_server_records_requests() {
        let server = MockPlaidServer::start(MockConfig::default()).unwrap();

        let mut stream = TcpStream::connect(("127.0.0.1", server.port())).unwrap();
        let body = r#"{"institution_id":"ins_1","initial_products":[]}"#;
        let request = format!(
            "POST /sandbox/public_token/create HTTP/1.1\r\nHost: localhost\r\nPLAID-CLIENT-ID: c\r\nPLAID-SECRET: s\r\nContent-Length: {}\r\n\r\n{}",
            body.len(),
            body
        );
        stream.write_all(request.as_bytes()).unwrap();

        let mut response = String::new();
        stream.read_to_string(&mut response).unwrap();
        assert!(response.starts_with("HTTP/1.1 200"));
        assert!(response.contains("public-sandbox-ins_1"));

        let requests = server.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].header("PLAID-SECRET"), Some("s"));
    }

    #[test]
    fn test_mock_server_requires_credentials() {
        let server = MockPlaidServer::start(MockConfig::default()).unwrap();

        let mut stream = TcpStream::connect(("127.0.0.1", server.port())).unwrap();
        stream
            .write_all(b"POST /transactions/get HTTP/1.1\r\nContent-Length: 2\r\n\r\n{}")
            .unwrap();

        let mut response = String::new();
        stream.read_to_string(&mut response).unwrap();
        assert!(response.starts_with("HTTP/1.1 400"));
        assert!(response.contains("MISSING_FIELDS"));
    }
}
