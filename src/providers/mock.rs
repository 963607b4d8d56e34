/*!
 * Mock provider implementations for testing.
 *
 * This module provides mock providers that simulate different behaviors:
 * - `MockProvider::working()` - Always succeeds with a "translated" body
 * - `MockProvider::intermittent(n)` - Fails every n-th request
 * - `MockProvider::fail_first(n)` - Fails n times, then succeeds
 * - `MockProvider::failing()` - Always fails with an error
 * - `MockProvider::flaky_connection(n)` - Connection check fails n times, then works
 * - `MockProvider::fenced()` / `with_preamble()` - Wraps the answer the way chatty models do
 *
 * The default translation keeps every line and marks heading text with the
 * target language, so anchors change in a predictable way.
 */

use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::errors::ProviderError;
use crate::providers::Provider;

/// Mock request for testing
#[derive(Debug, Clone)]
pub struct MockRequest {
    /// The body to translate
    pub text: String,
    /// Source language
    pub source_language: String,
    /// Target language
    pub target_language: String,
}

/// Mock response for testing
#[derive(Debug, Clone)]
pub struct MockResponse {
    /// The translated text
    pub text: String,
}

/// Behavior mode for the mock provider
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds with a proper translation
    Working,
    /// Fails intermittently (every Nth request)
    Intermittent { fail_every: usize },
    /// Fails the first N requests, then works
    FailFirst { failures: usize },
    /// Always fails with an error
    Failing,
    /// Always rejects the credentials
    Unauthorized,
    /// Returns empty response
    Empty,
    /// Wraps the translation in a ```markdown fence
    Fenced,
    /// Prefixes the translation with a conversational sentence
    WithPreamble,
    /// Simulates slow response (for timeout testing)
    Slow { delay_ms: u64 },
    /// Connection check fails the first N times, requests always work
    FlakyConnection { failures: usize },
}

/// Mock provider for testing translation behavior
#[derive(Debug)]
pub struct MockProvider {
    /// Behavior mode
    behavior: MockBehavior,
    /// Request counter shared between clones
    request_count: Arc<AtomicUsize>,
    /// Connection check counter shared between clones
    connection_count: Arc<AtomicUsize>,
    /// Custom response generator (optional)
    custom_response: Option<fn(&MockRequest) -> String>,
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            connection_count: Arc::new(AtomicUsize::new(0)),
            custom_response: None,
        }
    }

    /// Create a working mock provider that always succeeds
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create an intermittently failing mock provider
    pub fn intermittent(fail_every: usize) -> Self {
        Self::new(MockBehavior::Intermittent { fail_every })
    }

    /// Create a mock that fails `failures` times before succeeding
    pub fn fail_first(failures: usize) -> Self {
        Self::new(MockBehavior::FailFirst { failures })
    }

    /// Create a failing mock provider that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Create a mock whose credentials are always rejected
    pub fn unauthorized() -> Self {
        Self::new(MockBehavior::Unauthorized)
    }

    /// Create a mock that returns empty responses
    pub fn empty() -> Self {
        Self::new(MockBehavior::Empty)
    }

    /// Create a mock that wraps answers in a markdown fence
    pub fn fenced() -> Self {
        Self::new(MockBehavior::Fenced)
    }

    /// Create a mock that opens answers with small talk
    pub fn with_preamble() -> Self {
        Self::new(MockBehavior::WithPreamble)
    }

    /// Create a mock that answers after a delay
    pub fn slow(delay_ms: u64) -> Self {
        Self::new(MockBehavior::Slow { delay_ms })
    }

    /// Create a mock whose connection check fails `failures` times before succeeding
    pub fn flaky_connection(failures: usize) -> Self {
        Self::new(MockBehavior::FlakyConnection { failures })
    }

    /// Set a custom response generator
    pub fn with_custom_response(mut self, generator: fn(&MockRequest) -> String) -> Self {
        self.custom_response = Some(generator);
        self
    }

    /// Number of requests received so far (shared with clones)
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Number of connection checks made so far (shared with clones)
    pub fn connection_count(&self) -> usize {
        self.connection_count.load(Ordering::SeqCst)
    }

    /// Default fake translation: heading text gets a `[lang]` marker
    pub fn mark_headings(text: &str, target_language: &str) -> String {
        text.split('\n')
            .map(|line| {
                let trimmed = line.trim_start();
                let hashes = trimmed.chars().take_while(|&c| c == '#').count();
                let rest = &trimmed[hashes..];
                if (1..=6).contains(&hashes) && rest.starts_with([' ', '\t']) {
                    format!("{} [{}] {}", &trimmed[..hashes], target_language, rest.trim())
                } else {
                    line.to_string()
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn translate(&self, request: &MockRequest) -> String {
        match self.custom_response {
            Some(generator) => generator(request),
            None => Self::mark_headings(&request.text, &request.target_language),
        }
    }

    fn respond(text: String) -> Result<MockResponse, ProviderError> {
        Ok(MockResponse { text })
    }
}

impl Clone for MockProvider {
    fn clone(&self) -> Self {
        Self {
            behavior: self.behavior,
            request_count: Arc::clone(&self.request_count),
            connection_count: Arc::clone(&self.connection_count),
            custom_response: self.custom_response,
        }
    }
}

#[async_trait]
impl Provider for MockProvider {
    type Request = MockRequest;
    type Response = MockResponse;

    async fn complete(&self, request: Self::Request) -> Result<Self::Response, ProviderError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst);

        match self.behavior {
            MockBehavior::Working | MockBehavior::FlakyConnection { .. } => {
                Self::respond(self.translate(&request))
            }

            MockBehavior::Intermittent { fail_every } => {
                if fail_every > 0 && count % fail_every == fail_every - 1 {
                    Err(ProviderError::ApiError {
                        message: format!("Simulated intermittent failure (request #{})", count + 1),
                        status_code: 503,
                    })
                } else {
                    Self::respond(self.translate(&request))
                }
            }

            MockBehavior::FailFirst { failures } => {
                if count < failures {
                    Err(ProviderError::ConnectionError(format!(
                        "Simulated outage (request #{})",
                        count + 1
                    )))
                } else {
                    Self::respond(self.translate(&request))
                }
            }

            MockBehavior::Failing => Err(ProviderError::ApiError {
                message: "Simulated provider failure".to_string(),
                status_code: 500,
            }),

            MockBehavior::Unauthorized => Err(ProviderError::AuthenticationError(
                "Simulated invalid credentials".to_string(),
            )),

            MockBehavior::Empty => Self::respond(String::new()),

            MockBehavior::Fenced => {
                Self::respond(format!("```markdown\n{}\n```", self.translate(&request)))
            }

            MockBehavior::WithPreamble => Self::respond(format!(
                "Here is the translated document:\n\n{}",
                self.translate(&request)
            )),

            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(tokio::time::Duration::from_millis(delay_ms)).await;
                Self::respond(self.translate(&request))
            }
        }
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        let count = self.connection_count.fetch_add(1, Ordering::SeqCst);

        match self.behavior {
            MockBehavior::Unauthorized => Err(ProviderError::AuthenticationError(
                "Simulated invalid credentials".to_string(),
            )),
            MockBehavior::FlakyConnection { failures } if count < failures => Err(ProviderError::ApiError {
                message: format!("Simulated unavailable service (check #{})", count + 1),
                status_code: 503,
            }),
            _ => Ok(()),
        }
    }

    fn extract_text(response: &Self::Response) -> String {
        response.text.clone()
    }
}
