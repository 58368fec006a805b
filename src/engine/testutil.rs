//! Shared fixtures for workflow tests: a tiny in-process HTTP responder plus
//! canned service payloads.

use crate::model::RunConfig;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

pub(crate) const UPLOAD_OK: &str = r#"{"text": "John Doe, 5 years Python"}"#;
pub(crate) const ANALYZE_OK: &str =
    r#"{"keywords": ["Python", "engineer"], "matchedKeywords": ["Python"], "score": 50}"#;

/// Canned behavior for one endpoint of the mock service.
#[derive(Clone)]
pub(crate) struct Endpoint {
    pub status: u16,
    pub body: String,
    pub delay: Duration,
}

impl Endpoint {
    pub fn ok(body: &str) -> Self {
        Self {
            status: 200,
            body: body.to_string(),
            delay: Duration::ZERO,
        }
    }

    pub fn error(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
            delay: Duration::ZERO,
        }
    }

    pub fn slow(body: &str, delay: Duration) -> Self {
        Self {
            status: 200,
            body: body.to_string(),
            delay,
        }
    }
}

pub(crate) struct MockService {
    pub addr: SocketAddr,
    hits: Arc<Mutex<Vec<String>>>,
}

impl MockService {
    pub fn hit_paths(&self) -> Vec<String> {
        self.hits.lock().unwrap().clone()
    }
}

fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Tiny HTTP/1.1 responder: records request paths and answers each endpoint
/// with its canned status and JSON body. Connections are one-shot.
pub(crate) async fn spawn_mock_service(upload: Endpoint, analyze: Endpoint) -> MockService {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let hits = Arc::new(Mutex::new(Vec::new()));
    let hits2 = hits.clone();

    tokio::spawn(async move {
        loop {
            let Ok((mut stream, _)) = listener.accept().await else {
                break;
            };
            let hits = hits2.clone();
            let upload = upload.clone();
            let analyze = analyze.clone();
            tokio::spawn(async move {
                let mut buf = Vec::new();
                let mut tmp = [0u8; 4096];

                // Read the request head, then the declared body length.
                let (path, body_len, head_len) = loop {
                    let n = stream.read(&mut tmp).await.unwrap_or(0);
                    if n == 0 {
                        return;
                    }
                    buf.extend_from_slice(&tmp[..n]);
                    if let Some(pos) = find_subsequence(&buf, b"\r\n\r\n") {
                        let head = String::from_utf8_lossy(&buf[..pos]).to_string();
                        let path = head
                            .lines()
                            .next()
                            .and_then(|l| l.split_whitespace().nth(1))
                            .unwrap_or("/")
                            .to_string();
                        let body_len = head
                            .lines()
                            .find_map(|l| {
                                let (k, v) = l.split_once(':')?;
                                k.eq_ignore_ascii_case("content-length")
                                    .then(|| v.trim().parse::<usize>().ok())
                                    .flatten()
                            })
                            .unwrap_or(0);
                        break (path, body_len, pos + 4);
                    }
                };
                while buf.len() < head_len + body_len {
                    let n = stream.read(&mut tmp).await.unwrap_or(0);
                    if n == 0 {
                        break;
                    }
                    buf.extend_from_slice(&tmp[..n]);
                }

                hits.lock().unwrap().push(path.clone());
                let endpoint = if path.starts_with("/upload") {
                    upload
                } else {
                    analyze
                };
                if !endpoint.delay.is_zero() {
                    tokio::time::sleep(endpoint.delay).await;
                }

                let reason = if endpoint.status == 200 { "OK" } else { "Error" };
                let response = format!(
                    "HTTP/1.1 {} {reason}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                    endpoint.status,
                    endpoint.body.len(),
                    endpoint.body
                );
                let _ = stream.write_all(response.as_bytes()).await;
                let _ = stream.shutdown().await;
            });
        }
    });

    MockService { addr, hits }
}

pub(crate) fn test_config(addr: SocketAddr) -> RunConfig {
    RunConfig {
        base_url: format!("http://{addr}"),
        request_timeout: Duration::from_secs(5),
        user_agent: "resume-optimizer/test".into(),
    }
}

pub(crate) fn resume_fixture(contents: &str) -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("resume.txt");
    std::fs::write(&path, contents).unwrap();
    (dir, path)
}
