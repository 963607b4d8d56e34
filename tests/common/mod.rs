/*!
 * Common test utilities for the docs-translator test suite
 */

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use docs_translator::app_config::TranslationConfig;
use docs_translator::providers::mock::MockProvider;
use docs_translator::translation::{RetryPolicy, TranslationService};

/// A document with front matter, a link and two headings
pub const GETTING_STARTED: &str = "---
title: Getting Started
displayed_sidebar: docsEnglish
---
# Getting Started

Read the [prerequisites](#prerequisites) first.

```bash
# not a heading
npm install
```

## Prerequisites

Node.js 18 or later.
";

/// Route library logs to the test output; safe to call more than once
pub fn init_test_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content, creating parent directories
pub fn create_test_file(dir: &Path, relative_path: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(relative_path);
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Translation service backed by a mock provider, retrying without delay
pub fn mock_service(provider: MockProvider, max_attempts: u32) -> TranslationService {
    TranslationService::with_mock_provider(provider, TranslationConfig::default(), "en", "ja")
        .with_retry_policy(RetryPolicy::immediate(max_attempts))
}

/// Serve one canned HTTP reply per connection, in order.
///
/// Each reply is a status line such as `"503 Service Unavailable"` and a body.
/// Returns the base URL of the listener.
pub async fn serve_http(replies: Vec<(&'static str, &'static str)>) -> Result<String> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let address = listener.local_addr()?;

    tokio::spawn(async move {
        for (status, body) in replies {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };
            if read_request(&mut socket).await.is_err() {
                continue;
            }
            let reply = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            let _ = socket.write_all(reply.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });

    Ok(format!("http://{}", address))
}

/// Read a full request (headers and `Content-Length` body) off the socket
async fn read_request(socket: &mut TcpStream) -> std::io::Result<()> {
    let mut data = Vec::new();
    let mut buffer = [0u8; 4096];
    loop {
        let read = socket.read(&mut buffer).await?;
        if read == 0 {
            return Ok(());
        }
        data.extend_from_slice(&buffer[..read]);

        if let Some(end) = data.windows(4).position(|w| w == b"\r\n\r\n") {
            let headers = String::from_utf8_lossy(&data[..end]).to_ascii_lowercase();
            let length = headers
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|value| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if data.len() >= end + 4 + length {
                return Ok(());
            }
        }
    }
}
