/*!
 * Integration tests for application lifecycle
 */

use anyhow::Result;
use docs_translator::app_config::Config;
use docs_translator::app_controller::{Controller, TranslateOptions};
use docs_translator::providers::mock::MockProvider;
use std::fs;

use crate::common::{self, GETTING_STARTED, mock_service};

/// Test the controller initialization with default config
#[test]
fn test_controller_initialization_withDefaultConfig_shouldSucceed() -> Result<()> {
    let controller = Controller::new_for_test()?;
    assert_eq!(controller.config().target_language, "ja");
    Ok(())
}

#[tokio::test]
async fn test_run_withDocsTree_shouldWriteLocalizedFiles() -> Result<()> {
    common::init_test_logging();
    let temp = common::create_temp_dir()?;
    let docs = temp.path().join("docs");
    common::create_test_file(&docs, "intro.md", GETTING_STARTED)?;
    common::create_test_file(&docs, "guides/setup.mdx", "# Setup\n\nRun it.\n")?;
    common::create_test_file(&docs, "assets/logo.svg", "<svg/>")?;

    let controller = Controller::new_for_test()?;
    let mut service = mock_service(MockProvider::working(), 2);
    let summary = controller
        .run_with_service(&mut service, &[docs.clone()], &TranslateOptions::default())
        .await?;

    assert_eq!(summary.planned.len(), 2);
    assert!(summary.report.is_success());

    let translated = fs::read_to_string(docs.join("ja-jp/guides/setup.mdx"))?;
    assert!(translated.contains("translated: true"));
    assert!(translated.contains("# [ja] Setup"));
    assert!(docs.join("ja-jp/intro.md").is_file());
    assert!(!docs.join("ja-jp/assets").exists());
    Ok(())
}

#[tokio::test]
async fn test_run_twice_shouldSkipExistingUnlessForced() -> Result<()> {
    let temp = common::create_temp_dir()?;
    let docs = temp.path().join("docs");
    common::create_test_file(&docs, "a.md", "# A\n")?;

    let controller = Controller::new_for_test()?;
    let provider = MockProvider::working();
    let mut service = mock_service(provider.clone(), 1);

    controller
        .run_with_service(&mut service, &[docs.clone()], &TranslateOptions::default())
        .await?;
    let second = controller
        .run_with_service(&mut service, &[docs.clone()], &TranslateOptions::default())
        .await?;
    assert_eq!(second.skipped, vec![docs.join("a.md")]);
    assert_eq!(provider.request_count(), 1);

    let forced = TranslateOptions {
        force_overwrite: true,
        ..TranslateOptions::default()
    };
    let third = controller.run_with_service(&mut service, &[docs.clone()], &forced).await?;
    assert_eq!(third.report.completed.len(), 1);
    assert_eq!(provider.request_count(), 2);
    Ok(())
}

#[test]
fn test_run_withDryRun_shouldNotTranslateOrWrite() -> Result<()> {
    let temp = common::create_temp_dir()?;
    let docs = temp.path().join("docs");
    common::create_test_file(&docs, "a.md", "# A\n")?;

    let controller = Controller::new_for_test()?;
    let provider = MockProvider::working();
    let mut service = mock_service(provider.clone(), 1);
    let options = TranslateOptions {
        dry_run: true,
        ..TranslateOptions::default()
    };

    let summary = tokio_test::block_on(controller.run_with_service(&mut service, &[docs.clone()], &options))?;

    assert_eq!(summary.planned.len(), 1);
    assert_eq!(summary.planned[0].target, docs.join("ja-jp/a.md"));
    assert_eq!(provider.request_count(), 0);
    assert!(!docs.join("ja-jp").exists());
    Ok(())
}

#[tokio::test]
async fn test_run_withManifestAndFailure_shouldRecordBothLists() -> Result<()> {
    fn only_good(request: &docs_translator::providers::mock::MockRequest) -> String {
        if request.text.contains("good") { request.text.clone() } else { String::new() }
    }

    let temp = common::create_temp_dir()?;
    let docs = temp.path().join("docs");
    common::create_test_file(&docs, "good.md", "# good\n")?;
    common::create_test_file(&docs, "bad.md", "# bad\n")?;
    let out = temp.path().join("out");
    let manifest_path = temp.path().join("manifest.json");

    let controller = Controller::new_for_test()?;
    let mut service = mock_service(MockProvider::working().with_custom_response(only_good), 1);
    let options = TranslateOptions {
        output_root: Some(out.clone()),
        manifest: Some(manifest_path.clone()),
        ..TranslateOptions::default()
    };

    let summary = controller.run_with_service(&mut service, &[docs.clone()], &options).await?;
    assert_eq!(summary.report.completed.len(), 1);
    assert_eq!(summary.report.failed.len(), 1);

    let manifest: serde_json::Value = serde_json::from_str(&fs::read_to_string(&manifest_path)?)?;
    assert_eq!(manifest["target_language"], "ja");
    assert_eq!(manifest["completed"].as_array().map(Vec::len), Some(1));
    assert_eq!(manifest["failed"][0]["stage"], "Translate");

    let written = manifest["completed"][0]["transformed_identity"].as_str().unwrap_or_default();
    assert!(written.starts_with(&out.display().to_string()));
    assert!(written.ends_with("docs/ja-jp/good.md"));
    Ok(())
}

#[test]
fn test_check_shouldCountBrokenLinksAndLintIssues() -> Result<()> {
    let temp = common::create_temp_dir()?;
    let docs = temp.path().join("docs");
    common::create_test_file(&docs, "ok.md", "# Title\n\n[self](#title)\n")?;
    common::create_test_file(&docs, "broken.md", "# Title\n\n[gone](#missing)\n```\nunclosed\n")?;

    let report = Controller::new_for_test()?.check(&[docs])?;

    assert_eq!(report.files, 2);
    assert_eq!(report.broken_links, 1);
    assert_eq!(report.lint_issues, 1);
    assert!(!report.is_clean());
    Ok(())
}

#[test]
fn test_anchors_shouldPreviewMapping() -> Result<()> {
    let temp = common::create_temp_dir()?;
    let original = common::create_test_file(temp.path(), "en.md", GETTING_STARTED)?;
    let translated = common::create_test_file(
        temp.path(),
        "ja.md",
        "---\ntitle: はじめに\n---\n# はじめに\n\n## 前提条件\n\n## 追加の節\n",
    )?;

    let rows = Controller::new_for_test()?.anchors(&original, &translated)?;

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].target_anchor.as_deref(), Some("はじめに"));
    assert_eq!(rows[1].source_anchor, "prerequisites");
    assert_eq!(rows[1].target_anchor.as_deref(), Some("前提条件"));
    Ok(())
}

#[test]
fn test_config_roundTripThroughJson_shouldKeepDocumentSettings() -> Result<()> {
    let mut config = Config::default();
    config.document.locale_dir = "ja".to_string();

    let json = serde_json::to_string_pretty(&config)?;
    let parsed: Config = serde_json::from_str(&json)?;

    assert_eq!(parsed.document.locale_dir, "ja");
    assert_eq!(parsed.translation.provider, config.translation.provider);
    Ok(())
}
