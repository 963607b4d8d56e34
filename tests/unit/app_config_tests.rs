/*!
 * Tests for application configuration functionality
 */

use docs_translator::app_config::{Config, LogLevel, TranslationProvider};
use std::time::Duration;

/// Test default configuration values
#[test]
fn test_default_config_withNoParameters_shouldHaveCorrectDefaults() {
    let config = Config::default();

    assert_eq!(config.source_language, "en");
    assert_eq!(config.target_language, "ja");
    assert_eq!(config.translation.provider, TranslationProvider::ClaudeCode);
    assert_eq!(config.log_level, LogLevel::Info);

    let common = &config.translation.common;
    assert_eq!(common.max_attempts, 3);
    assert_eq!(common.retry_backoff_ms, 1000);
    assert_eq!(common.attempt_timeout_secs, 120);

    let document = &config.document;
    assert_eq!(document.metadata_field, "displayed_sidebar");
    assert_eq!(document.field_remap.get("docsEnglish").map(String::as_str), Some("docsJapanese"));
    assert_eq!(document.banner_path, "/src/components/_translation-ja-jp.mdx");
    assert_eq!(document.locale_dir, "ja-jp");
}

#[test]
fn test_retryPolicy_fromCommonConfig_shouldUseLinearBackoff() {
    let policy = Config::default().translation.common.retry_policy();

    assert_eq!(policy.max_attempts, 3);
    assert_eq!(policy.delay(1), Duration::from_secs(1));
    assert_eq!(policy.delay(2), Duration::from_secs(2));
    assert_eq!(policy.attempt_timeout, Duration::from_secs(120));
}

/// Test configuration validation
#[test]
fn test_config_validation_withVariousConfigs_shouldValidateCorrectly() {
    let mut config = Config::default();
    assert!(config.validate().is_ok());

    // Invalid source language
    config.source_language = "xyz".to_string();
    assert!(config.validate().is_err());
    config.source_language = "en".to_string();

    // Same language on both sides
    config.target_language = "en-US".to_string();
    assert!(config.validate().is_err());
    config.target_language = "ja-jp".to_string();
    assert!(config.validate().is_ok());

    // No attempts at all
    config.translation.common.max_attempts = 0;
    assert!(config.validate().is_err());
    config.translation.common.max_attempts = 3;

    // OpenAI needs a key, either in the config or in the environment
    config.translation.provider = TranslationProvider::OpenAI;
    config.translation.provider_config_mut(&TranslationProvider::OpenAI).api_key = "sk-test".to_string();
    assert!(config.validate().is_ok());
}

#[test]
fn test_config_deserialization_withPartialJson_shouldFillDefaults() {
    let json = r#"{
        "source_language": "en",
        "target_language": "ja",
        "translation": { "provider": "ollama" },
        "document": { "locale_dir": "ja" }
    }"#;

    let config: Config = serde_json::from_str(json).unwrap();

    assert_eq!(config.translation.provider, TranslationProvider::Ollama);
    assert_eq!(config.translation.get_endpoint(), "http://localhost:11434");
    assert_eq!(config.translation.common.max_attempts, 3);
    assert_eq!(config.document.locale_dir, "ja");
    assert_eq!(config.document.banner_component, "TranslationBanner");
}

#[test]
fn test_providerConfigMut_withMissingProvider_shouldCreateIt() {
    let mut config = Config::default();
    config.translation.available_providers.clear();

    config.translation.provider = TranslationProvider::Anthropic;
    config.translation.provider_config_mut(&TranslationProvider::Anthropic).model = "custom-model".to_string();

    assert_eq!(config.translation.get_model(), "custom-model");
    assert_eq!(config.translation.available_providers.len(), 1);
}

#[test]
fn test_provider_fromStr_shouldAcceptBothClaudeCodeSpellings() {
    assert_eq!("claude-code".parse::<TranslationProvider>().unwrap(), TranslationProvider::ClaudeCode);
    assert_eq!("ClaudeCode".parse::<TranslationProvider>().unwrap(), TranslationProvider::ClaudeCode);
    assert!("lmstudio".parse::<TranslationProvider>().is_err());
}
