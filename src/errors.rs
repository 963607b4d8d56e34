/*!
 * Error types for the docs-translator application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when working with provider APIs
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// The provider did not answer in time
    #[error("Request timed out: {0}")]
    Timeout(String),
}

impl ProviderError {
    /// Classify an HTTP error status into the matching provider error
    pub fn from_status(status_code: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status_code {
            401 | 403 => Self::AuthenticationError(message),
            429 => Self::RateLimitExceeded(message),
            _ => Self::ApiError { status_code, message },
        }
    }

    /// Classify a transport-level reqwest error
    pub fn from_reqwest(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout(error.to_string())
        } else if error.is_connect() {
            Self::ConnectionError(error.to_string())
        } else if error.is_decode() {
            Self::ParseError(error.to_string())
        } else {
            Self::RequestFailed(error.to_string())
        }
    }

    /// Whether another attempt could change the outcome
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::AuthenticationError(_))
    }
}

/// Errors that can occur during translation
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Error from the provider API
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Nothing usable was left after unwrapping the provider response
    #[error("Translation returned no usable content")]
    EmptyResult,

    /// A single attempt exceeded its wall-clock budget
    #[error("Translation attempt timed out after {0:?}")]
    Timeout(Duration),

    /// The session for the external capability could not be established
    #[error("Translation session unavailable: {0}")]
    Session(#[source] ProviderError),

    /// All attempts were used up
    #[error("Translation failed after {attempts} attempts: {last_error}")]
    Failure {
        /// Number of attempts that were made
        attempts: u32,
        /// Message of the last error seen
        last_error: String,
    },
}

impl TranslationError {
    /// Whether the retry loop may try again after this error
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Provider(e) | Self::Session(e) => e.is_retryable(),
            Self::EmptyResult | Self::Timeout(_) => true,
            Self::Failure { .. } => false,
        }
    }

    /// Whether this failure came from an empty result rather than the transport
    pub fn is_empty_result(&self) -> bool {
        matches!(self, Self::EmptyResult)
    }
}

/// Errors that can occur while transforming a single document
#[derive(Error, Debug)]
pub enum DocumentError {
    /// The translation stage failed
    #[error("Translation stage failed: {0}")]
    Translation(#[from] TranslationError),

    /// The document could not be read or written
    #[error("Document I/O failed: {0}")]
    Io(String),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from translation
    #[error("Translation error: {0}")]
    Translation(#[from] TranslationError),

    /// Error from document processing
    #[error("Document error: {0}")]
    Document(#[from] DocumentError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
