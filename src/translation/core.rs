/*!
 * Core translation service implementation.
 *
 * This module contains the main TranslationService struct, which sends a
 * document body to the configured provider with bounded retries, a
 * per-attempt timeout and defensive response extraction. The service owns a
 * lazily opened session that lives until `close_session` is called at the
 * end of a batch.
 */

use anyhow::Result;
use log::{debug, info, warn};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;
use tokio::sync::OnceCell;

use crate::app_config::{TranslationConfig, TranslationProvider as ConfigTranslationProvider};
use crate::errors::TranslationError;
use crate::providers::Provider;
use crate::providers::anthropic::{Anthropic, AnthropicRequest};
use crate::providers::claude_code::{ClaudeCode, ClaudeCodeRequest};
use crate::providers::mock::{MockProvider, MockRequest};
use crate::providers::ollama::{GenerationRequest, Ollama};
use crate::providers::openai::{OpenAI, OpenAIRequest};

use super::extract::extract_translation;
use super::prompts::{TranslationPromptBuilder, TranslationRequest};
use super::retry::RetryPolicy;

/// Translation provider implementation variants
#[derive(Debug)]
enum TranslationProviderImpl {
    /// Claude Code command-line tool
    ClaudeCode {
        /// Client instance
        client: ClaudeCode,
    },

    /// Anthropic API service
    Anthropic {
        /// Client instance
        client: Anthropic,
    },

    /// OpenAI API service (or a compatible local server)
    OpenAI {
        /// Client instance
        client: OpenAI,
    },

    /// Ollama LLM service
    Ollama {
        /// Client instance
        client: Ollama,
    },

    /// Scripted provider used by tests
    Mock {
        /// Client instance
        client: MockProvider,
    },
}

/// Handle for an established connection to the provider
#[derive(Debug)]
pub struct TranslationSession {
    /// Provider display name
    pub provider: String,
    /// Model in use (may be empty for the CLI default)
    pub model: String,
    /// When the session was opened
    pub opened_at: Instant,
}

/// Main translation service for document bodies
#[derive(Debug)]
pub struct TranslationService {
    /// Provider implementation
    provider: TranslationProviderImpl,

    /// Configuration for the translation service
    pub config: TranslationConfig,

    /// Language the documents are written in
    source_language: String,

    /// Language to translate into
    target_language: String,

    /// Attempt budget, backoff and timeout
    policy: RetryPolicy,

    /// Lazily opened session, shared by every document of a batch
    session: OnceCell<TranslationSession>,

    /// Number of provider calls made since the session opened
    calls: AtomicUsize,
}

impl TranslationService {
    /// Create a new translation service with the given configuration
    pub fn new(config: TranslationConfig, source_language: &str, target_language: &str) -> Result<Self> {
        let model = config.get_model();
        let timeout = config.get_timeout();

        let provider = match config.provider {
            ConfigTranslationProvider::ClaudeCode => TranslationProviderImpl::ClaudeCode {
                client: ClaudeCode::new(config.get_endpoint(), Some(model)),
            },
            ConfigTranslationProvider::Anthropic => TranslationProviderImpl::Anthropic {
                client: Anthropic::new(config.get_api_key(), config.get_endpoint(), model, timeout),
            },
            ConfigTranslationProvider::OpenAI => TranslationProviderImpl::OpenAI {
                client: OpenAI::new(config.get_api_key(), config.get_endpoint(), model, timeout),
            },
            ConfigTranslationProvider::Ollama => TranslationProviderImpl::Ollama {
                client: Ollama::from_endpoint(&config.get_endpoint(), timeout)?,
            },
        };

        Ok(Self::with_provider(provider, config, source_language, target_language))
    }

    /// Create a service backed by a mock provider
    pub fn with_mock_provider(
        client: MockProvider,
        config: TranslationConfig,
        source_language: &str,
        target_language: &str,
    ) -> Self {
        Self::with_provider(
            TranslationProviderImpl::Mock { client },
            config,
            source_language,
            target_language,
        )
    }

    fn with_provider(
        provider: TranslationProviderImpl,
        config: TranslationConfig,
        source_language: &str,
        target_language: &str,
    ) -> Self {
        let policy = config.common.retry_policy();
        Self {
            provider,
            config,
            source_language: source_language.to_string(),
            target_language: target_language.to_string(),
            policy,
            session: OnceCell::new(),
            calls: AtomicUsize::new(0),
        }
    }

    /// Replace the retry policy
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Retry policy in effect
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Target language code
    pub fn target_language(&self) -> &str {
        &self.target_language
    }

    /// Whether a session is currently open
    pub fn has_session(&self) -> bool {
        self.session.initialized()
    }

    fn provider_name(&self) -> String {
        match &self.provider {
            TranslationProviderImpl::Mock { .. } => "Mock".to_string(),
            _ => self.config.provider.display_name().to_string(),
        }
    }

    async fn test_provider(&self) -> Result<(), TranslationError> {
        let result = match &self.provider {
            TranslationProviderImpl::ClaudeCode { client } => client.test_connection().await,
            TranslationProviderImpl::Anthropic { client } => client.test_connection().await,
            TranslationProviderImpl::OpenAI { client } => client.test_connection().await,
            TranslationProviderImpl::Ollama { client } => client.test_connection().await,
            TranslationProviderImpl::Mock { client } => client.test_connection().await,
        };
        result.map_err(TranslationError::Session)
    }

    /// Open the session on first use; later calls reuse it
    pub async fn ensure_session(&self) -> Result<&TranslationSession, TranslationError> {
        self.session
            .get_or_try_init(|| async {
                self.test_provider().await?;
                let session = TranslationSession {
                    provider: self.provider_name(),
                    model: self.config.get_model(),
                    opened_at: Instant::now(),
                };
                info!("Opened {} translation session", session.provider);
                Ok(session)
            })
            .await
    }

    /// Tear the session down; the next translation opens a new one
    pub fn close_session(&mut self) {
        if let Some(session) = self.session.take() {
            info!(
                "Closed {} translation session after {} call(s) in {:.1?}",
                session.provider,
                self.calls.swap(0, Ordering::SeqCst),
                session.opened_at.elapsed()
            );
        }
    }

    /// Build the framed request for a body
    pub fn build_request(&self, body: &str, document: Option<&str>) -> TranslationRequest {
        let mut builder = TranslationPromptBuilder::new(&self.source_language, &self.target_language);
        if let Some(name) = document {
            builder = builder.with_document_name(name);
        }
        builder.build(body)
    }

    /// Translate a document body.
    ///
    /// Runs at most `max_attempts` attempts, each bounded by the attempt
    /// timeout, waiting `attempt * base_delay` in between. Opening the session
    /// is part of an attempt, so a transient failure there uses the same
    /// budget. Authentication failures end the loop at once.
    pub async fn translate(&self, body: &str, document: Option<&str>) -> Result<String, TranslationError> {
        if body.trim().is_empty() {
            debug!("Nothing to translate in {}", document.unwrap_or("document"));
            return Ok(body.to_string());
        }

        let request = self.build_request(body, document);
        let mut last_error = TranslationError::EmptyResult;

        for attempt in 1..=self.policy.max_attempts {
            let outcome = tokio::time::timeout(self.policy.attempt_timeout, async {
                self.ensure_session().await?;
                self.attempt(body, &request).await
            })
            .await;

            let error = match outcome {
                Ok(Ok(translated)) => {
                    if attempt > 1 {
                        info!("Translation succeeded on attempt {}", attempt);
                    }
                    return Ok(translated);
                }
                Ok(Err(e)) => e,
                Err(_) => TranslationError::Timeout(self.policy.attempt_timeout),
            };

            warn!(
                "Translation attempt {}/{} failed: {}",
                attempt, self.policy.max_attempts, error
            );

            if !error.is_retryable() {
                return Err(error);
            }

            if self.policy.has_attempts_left(attempt) {
                let delay = self.policy.delay(attempt);
                debug!("Retrying in {:?}", delay);
                tokio::time::sleep(delay).await;
            }

            last_error = error;
        }

        if last_error.is_empty_result() {
            return Err(last_error);
        }

        Err(TranslationError::Failure {
            attempts: self.policy.max_attempts,
            last_error: last_error.to_string(),
        })
    }

    /// One call to the provider plus extraction
    async fn attempt(&self, body: &str, request: &TranslationRequest) -> Result<String, TranslationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let model = self.config.get_model();
        let common = &self.config.common;

        let raw = match &self.provider {
            TranslationProviderImpl::ClaudeCode { client } => {
                let response = client
                    .complete(ClaudeCodeRequest::new(request.combined_prompt()))
                    .await?;
                ClaudeCode::extract_text(&response)
            }
            TranslationProviderImpl::Anthropic { client } => {
                let provider_request = AnthropicRequest::new(model, common.max_tokens)
                    .system(&request.system_prompt)
                    .add_message("user", &request.user_prompt)
                    .temperature(common.temperature);
                let response = client.complete(provider_request).await?;
                if response.stop_reason.as_deref() == Some("max_tokens") {
                    warn!("Anthropic response was cut off at max_tokens={}", common.max_tokens);
                }
                Anthropic::extract_text(&response)
            }
            TranslationProviderImpl::OpenAI { client } => {
                let provider_request = OpenAIRequest::new(model)
                    .add_message("system", &request.system_prompt)
                    .add_message("user", &request.user_prompt)
                    .temperature(common.temperature)
                    .max_tokens(common.max_tokens);
                let response = client.complete(provider_request).await?;
                OpenAI::extract_text(&response)
            }
            TranslationProviderImpl::Ollama { client } => {
                let provider_request = GenerationRequest::new(model, &request.user_prompt)
                    .system(&request.system_prompt)
                    .temperature(common.temperature)
                    .num_predict(common.max_tokens)
                    .no_stream();
                let response = client.complete(provider_request).await?;
                Ollama::extract_text(&response)
            }
            TranslationProviderImpl::Mock { client } => {
                let response = client
                    .complete(MockRequest {
                        text: body.to_string(),
                        source_language: request.source_language.clone(),
                        target_language: request.target_language.clone(),
                    })
                    .await?;
                MockProvider::extract_text(&response)
            }
        };

        extract_translation(&raw, body)
    }
}
