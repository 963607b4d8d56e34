/*!
 * Tests for the translation service: retries, sessions and answer cleanup
 */

use docs_translator::app_config::{Config, TranslationProvider};
use docs_translator::errors::TranslationError;
use docs_translator::providers::mock::MockProvider;
use docs_translator::translation::{RetryPolicy, TranslationService, extract_translation};
use std::time::Duration;

use crate::common::{self, mock_service};

#[tokio::test]
async fn test_translate_withWorkingProvider_shouldReturnTranslatedBody() {
    let service = mock_service(MockProvider::working(), 3);

    let translated = service.translate("# Title\n\nText\n", Some("a.md")).await.unwrap();

    assert_eq!(translated, "# [ja] Title\n\nText\n");
    assert!(service.has_session());
}

#[tokio::test]
async fn test_translate_withTwoFailuresAndThreeAttempts_shouldSucceed() {
    let provider = MockProvider::fail_first(2);
    let service = mock_service(provider.clone(), 3);

    let translated = service.translate("# Title", None).await.unwrap();

    assert_eq!(translated, "# [ja] Title");
    assert_eq!(provider.request_count(), 3);
}

#[tokio::test]
async fn test_translate_withExhaustedBudget_shouldReportAttempts() {
    let provider = MockProvider::fail_first(5);
    let service = mock_service(provider.clone(), 3);

    let error = service.translate("# Title", None).await.unwrap_err();

    assert!(matches!(error, TranslationError::Failure { attempts: 3, .. }));
    assert_eq!(provider.request_count(), 3);
}

#[tokio::test]
async fn test_translate_withEmptyAnswers_shouldFailAsEmptyResult() {
    let service = mock_service(MockProvider::empty(), 2);

    let error = service.translate("# Title", None).await.unwrap_err();

    assert!(error.is_empty_result());
}

#[tokio::test]
async fn test_translate_withRejectedCredentials_shouldNotCallProvider() {
    let provider = MockProvider::unauthorized();
    let service = mock_service(provider.clone(), 3);

    let error = service.translate("# Title", None).await.unwrap_err();

    assert!(matches!(error, TranslationError::Session(_)));
    assert_eq!(provider.request_count(), 0);
    assert!(!service.has_session());
}

#[tokio::test]
async fn test_translate_withOllamaUnavailableOnce_shouldRetryAndTranslate() {
    let endpoint = common::serve_http(vec![
        ("503 Service Unavailable", "busy"),
        ("200 OK", r#"{"version":"0.5.1"}"#),
        ("200 OK", r##"{"model":"llama3.1","created_at":"t","response":"# タイトル","done":true}"##),
    ])
    .await
    .unwrap();
    let mut config = Config::default();
    config.translation.provider = TranslationProvider::Ollama;
    config.translation.provider_config_mut(&TranslationProvider::Ollama).endpoint = endpoint;

    let service = TranslationService::new(config.translation, "en", "ja")
        .unwrap()
        .with_retry_policy(RetryPolicy::immediate(3));

    assert_eq!(service.translate("# Title", None).await.unwrap(), "# タイトル");
    assert!(service.has_session());
}

#[tokio::test]
async fn test_translate_withFlakyConnection_shouldSpendAttemptsOnSession() {
    let provider = MockProvider::flaky_connection(2);
    let service = mock_service(provider.clone(), 3);

    let translated = service.translate("# Title", None).await.unwrap();

    assert_eq!(translated, "# [ja] Title");
    assert_eq!(provider.connection_count(), 3);
    assert_eq!(provider.request_count(), 1);
}

#[tokio::test]
async fn test_translate_withSlowProvider_shouldTimeOutEachAttempt() {
    let provider = MockProvider::slow(500);
    let service = TranslationService::with_mock_provider(provider.clone(), Config::default().translation, "en", "ja")
        .with_retry_policy(RetryPolicy::new(2, Duration::ZERO, Duration::from_millis(20)));

    let error = service.translate("# Title", None).await.unwrap_err();

    assert!(matches!(error, TranslationError::Failure { attempts: 2, .. }));
    assert!(error.to_string().contains("timed out"));
    assert_eq!(provider.request_count(), 2);
}

#[tokio::test]
async fn test_translate_withChattyAnswers_shouldStripWrapping() {
    let fenced = mock_service(MockProvider::fenced(), 1);
    let chatty = mock_service(MockProvider::with_preamble(), 1);

    assert_eq!(fenced.translate("# A\n", None).await.unwrap(), "# [ja] A\n");
    assert_eq!(chatty.translate("# A\n", None).await.unwrap(), "# [ja] A\n");
}

#[tokio::test]
async fn test_session_shouldBeReusedUntilClosed() {
    let mut service = mock_service(MockProvider::working(), 1);

    service.translate("# One", None).await.unwrap();
    service.translate("# Two", None).await.unwrap();
    assert!(service.has_session());

    service.close_session();
    assert!(!service.has_session());

    service.translate("# Three", None).await.unwrap();
    assert!(service.has_session());
}

#[test]
fn test_buildRequest_shouldCarryLanguagesAndPreservationRules() {
    let service = mock_service(MockProvider::working(), 1);

    let request = service.build_request("# Title", Some("intro.md"));

    assert!(request.system_prompt.contains("English"));
    assert!(request.system_prompt.contains("Japanese"));
    assert!(request.user_prompt.contains("# Title"));
    assert!(request.user_prompt.contains("intro.md"));
}

#[test]
fn test_extractTranslation_withOnlyWhitespace_shouldBeEmptyResult() {
    assert!(extract_translation("  \n\n", "# Title\n").unwrap_err().is_empty_result());
}

#[test]
fn test_new_withOllamaConfig_shouldBuildWithoutNetwork() {
    let mut config = Config::default();
    config.translation.provider = TranslationProvider::Ollama;

    let service = TranslationService::new(config.translation, "en", "ja").unwrap();

    assert_eq!(service.target_language(), "ja");
    assert!(!service.has_session());
}
