//! A minimal mock HTTP server built on tokio that returns canned responses.

use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use crate::VartiqClient;

pub(crate) const TEST_API_KEY: &str = "test-key";

pub(crate) struct MockServer {
    listener: TcpListener,
    base_url: String,
}

/// The parts of a request the tests assert on.
#[derive(Debug)]
pub(crate) struct CapturedRequest {
    pub method: String,
    pub target: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl CapturedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).expect("request body should be JSON")
    }
}

impl MockServer {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind mock server");
        let port = listener.local_addr().unwrap().port();
        let base_url = format!("http://127.0.0.1:{port}");
        Self { listener, base_url }
    }

    pub fn client(&self) -> VartiqClient {
        VartiqClient::builder(TEST_API_KEY)
            .base_url(&self.base_url)
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap()
    }

    /// Accept one connection, read the full request and respond with the
    /// given status code and JSON body.
    pub async fn respond_once(self, status_code: u16, body: &str) -> CapturedRequest {
        let (mut stream, _) = self.listener.accept().await.unwrap();

        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        let header_end = loop {
            let n = stream.read(&mut chunk).await.unwrap();
            assert!(n > 0, "connection closed before headers were complete");
            buf.extend_from_slice(&chunk[..n]);
            if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                break pos + 4;
            }
        };

        let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
        let mut lines = head.split("\r\n");
        let mut request_line = lines.next().unwrap().split(' ');
        let method = request_line.next().unwrap().to_string();
        let target = request_line.next().unwrap().to_string();
        let headers: Vec<(String, String)> = lines
            .filter_map(|line| line.split_once(':'))
            .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
            .collect();

        let content_length = headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
            .map_or(0, |(_, v)| v.parse::<usize>().unwrap());

        let mut body_bytes = buf[header_end..].to_vec();
        while body_bytes.len() < content_length {
            let n = stream.read(&mut chunk).await.unwrap();
            assert!(n > 0, "connection closed before body was complete");
            body_bytes.extend_from_slice(&chunk[..n]);
        }

        let response = format!(
            "HTTP/1.1 {status_code} Mock\r\n\
             Content-Type: application/json\r\n\
             Content-Length: {}\r\n\
             Connection: close\r\n\
             \r\n\
             {body}",
            body.len()
        );
        stream.write_all(response.as_bytes()).await.unwrap();
        stream.shutdown().await.unwrap();

        CapturedRequest {
            method,
            target,
            headers,
            body: body_bytes,
        }
    }

    /// Assert that nobody connects within a short window.
    pub async fn assert_no_request(self) {
        let accepted =
            tokio::time::timeout(Duration::from_millis(200), self.listener.accept()).await;
        assert!(accepted.is_err(), "unexpected request reached the server");
    }
}

/// Wrap `data` in a successful envelope.
pub(crate) fn ok_envelope(data: &serde_json::Value) -> String {
    serde_json::json!({ "data": data, "message": "ok", "success": true }).to_string()
}
