/*!
 * Tests for HTTP providers against a local canned server
 */

use docs_translator::errors::ProviderError;
use docs_translator::providers::Provider;
use docs_translator::providers::ollama::Ollama;
use std::time::Duration;

use crate::common;

#[tokio::test]
async fn test_ollamaVersion_withServiceUnavailable_shouldReportStatus() {
    let endpoint = common::serve_http(vec![("503 Service Unavailable", "busy")]).await.unwrap();
    let client = Ollama::from_endpoint(&endpoint, Duration::from_secs(5)).unwrap();

    let error = client.version().await.unwrap_err();

    assert!(matches!(error, ProviderError::ApiError { status_code: 503, .. }));
    assert!(error.is_retryable());
}

#[tokio::test]
async fn test_ollamaTestConnection_withForbidden_shouldBeAuthenticationError() {
    let endpoint = common::serve_http(vec![("403 Forbidden", "denied")]).await.unwrap();
    let client = Ollama::from_endpoint(&endpoint, Duration::from_secs(5)).unwrap();

    let error = client.test_connection().await.unwrap_err();

    assert!(matches!(error, ProviderError::AuthenticationError(_)));
}

#[tokio::test]
async fn test_ollamaVersion_withVersionBody_shouldReturnIt() {
    let endpoint = common::serve_http(vec![("200 OK", r#"{"version":"0.5.1"}"#)]).await.unwrap();
    let client = Ollama::from_endpoint(&endpoint, Duration::from_secs(5)).unwrap();

    assert_eq!(client.version().await.unwrap(), "0.5.1");
}
