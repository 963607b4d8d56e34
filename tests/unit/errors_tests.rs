/*!
 * Tests for error types and their retry classification
 */

use docs_translator::errors::{AppError, DocumentError, ProviderError, TranslationError};
use std::time::Duration;

#[test]
fn test_providerError_fromStatus_shouldClassifyCodes() {
    assert!(matches!(ProviderError::from_status(401, "no"), ProviderError::AuthenticationError(_)));
    assert!(matches!(ProviderError::from_status(403, "no"), ProviderError::AuthenticationError(_)));
    assert!(matches!(ProviderError::from_status(429, "slow down"), ProviderError::RateLimitExceeded(_)));
    assert!(matches!(
        ProviderError::from_status(502, "bad gateway"),
        ProviderError::ApiError { status_code: 502, .. }
    ));
}

#[test]
fn test_providerError_isRetryable_shouldExcludeOnlyAuthentication() {
    assert!(!ProviderError::AuthenticationError("bad key".to_string()).is_retryable());
    assert!(ProviderError::ConnectionError("refused".to_string()).is_retryable());
    assert!(ProviderError::RateLimitExceeded("429".to_string()).is_retryable());
    assert!(ProviderError::Timeout("slow".to_string()).is_retryable());
}

#[test]
fn test_translationError_isRetryable_shouldStopOnRejectedSessionAndFailure() {
    assert!(TranslationError::EmptyResult.is_retryable());
    assert!(TranslationError::Timeout(Duration::from_secs(1)).is_retryable());
    assert!(TranslationError::Session(ProviderError::ConnectionError("offline".to_string())).is_retryable());
    assert!(
        !TranslationError::Session(ProviderError::AuthenticationError("bad key".to_string())).is_retryable()
    );
    assert!(
        !TranslationError::Failure {
            attempts: 3,
            last_error: "boom".to_string()
        }
        .is_retryable()
    );
    assert!(!TranslationError::Provider(ProviderError::AuthenticationError("x".to_string())).is_retryable());
}

#[test]
fn test_translationError_display_shouldMentionAttempts() {
    let error = TranslationError::Failure {
        attempts: 3,
        last_error: "API responded with error: 500 - down".to_string(),
    };
    assert_eq!(
        error.to_string(),
        "Translation failed after 3 attempts: API responded with error: 500 - down"
    );
}

#[test]
fn test_errorConversions_shouldWrapIntoAppError() {
    let document_error = DocumentError::from(TranslationError::EmptyResult);
    assert!(document_error.to_string().contains("no usable content"));

    let app_error = AppError::from(document_error);
    assert!(matches!(app_error, AppError::Document(_)));

    let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.md");
    assert!(matches!(AppError::from(io_error), AppError::File(_)));

    let anyhow_error = anyhow::anyhow!("something odd");
    assert_eq!(AppError::from(anyhow_error).to_string(), "Unknown error: something odd");
}
