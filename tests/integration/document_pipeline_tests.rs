/*!
 * End-to-end tests of the document pipeline with mock providers
 */

use chrono::NaiveDate;
use docs_translator::app_config::DocumentConfig;
use docs_translator::document;
use docs_translator::pipeline::{DocumentPipeline, PipelineConfig, PipelineStage, SourceDocument};
use docs_translator::providers::mock::{MockProvider, MockRequest};
use serde_yaml::Value;

use crate::common::{GETTING_STARTED, mock_service};

fn pipeline() -> DocumentPipeline {
    let date = NaiveDate::from_ymd_opt(2024, 12, 24).unwrap();
    DocumentPipeline::new(PipelineConfig::from_document_config(&DocumentConfig::default(), date))
}

fn source(identity: &str, content: &str) -> SourceDocument {
    SourceDocument {
        identity: identity.to_string(),
        target_identity: identity.replacen("docs/", "docs/ja-jp/", 1),
        content: content.to_string(),
    }
}

fn to_japanese(request: &MockRequest) -> String {
    request
        .text
        .replace("# Getting Started", "# はじめに")
        .replace("## Prerequisites", "## 前提条件")
        .replace("Read the [prerequisites](#prerequisites) first.", "まず[前提条件](#prerequisites)を読んでください。")
        .replace("Node.js 18 or later.", "Node.js 18 以降。")
}

/// Translation that only succeeds for documents whose body mentions "ok"
fn selective(request: &MockRequest) -> String {
    if request.text.contains("ok") {
        MockProvider::mark_headings(&request.text, &request.target_language)
    } else {
        String::new()
    }
}

#[tokio::test]
async fn test_gettingStartedExample_shouldProduceLinkedJapaneseDocument() {
    let service = mock_service(MockProvider::working().with_custom_response(to_japanese), 3);

    let result = pipeline()
        .process_document(&service, &source("docs/intro.md", GETTING_STARTED))
        .await
        .unwrap();

    assert_eq!(result.original_identity, "docs/intro.md");
    assert_eq!(result.transformed_identity, "docs/ja-jp/intro.md");

    let output = document::split(&result.final_text);
    assert_eq!(output.metadata.get("displayed_sidebar").and_then(Value::as_str), Some("docsJapanese"));
    assert_eq!(output.metadata.get("translated").and_then(Value::as_bool), Some(true));
    assert_eq!(output.metadata.get("translation_date").and_then(Value::as_str), Some("2024-12-24"));

    assert!(output.body.contains("まず[前提条件](#前提条件)を読んでください。"));
    assert!(output.body.contains("# not a heading"));
    assert!(output.body.contains("<TranslationBanner />"));
    assert!(document::validate_links(&output.body).is_empty());

    assert_eq!(result.stats.positional_matches, 2);
    assert_eq!(result.stats.fallback_matches, 0);
    assert_eq!(result.stats.links_rewritten, 1);
    assert!(result.diagnostics.is_clean());
}

#[tokio::test]
async fn test_documentWithoutMetadata_shouldGetProvenanceOnly() {
    let service = mock_service(MockProvider::working(), 1);
    let config = pipeline().config().clone().with_banner(None);

    let result = DocumentPipeline::new(config)
        .process_document(&service, &source("docs/plain.md", "Just prose.\n"))
        .await
        .unwrap();

    let output = document::split(&result.final_text);
    assert_eq!(output.body, "Just prose.\n");
    let keys: Vec<&str> = output.metadata.keys().filter_map(Value::as_str).collect();
    assert_eq!(keys, vec!["translated", "translation_source", "translation_date"]);
}

#[tokio::test]
async fn test_brokenSourceLink_shouldBeReportedNotFatal() {
    let raw = "# Title\n\nSee [missing](#nowhere).\n";
    let service = mock_service(MockProvider::working(), 1);

    let result = pipeline().process_document(&service, &source("docs/x.md", raw)).await.unwrap();

    assert_eq!(result.diagnostics.source_broken_links.len(), 1);
    assert_eq!(result.diagnostics.unresolved_anchors.len(), 1);
    assert_eq!(result.diagnostics.unresolved_anchors[0].anchor, "nowhere");
    assert!(result.final_text.contains("[missing](#nowhere)"));
}

#[tokio::test]
async fn test_droppedHeading_shouldBeListedAsUnmapped() {
    fn drop_second(request: &MockRequest) -> String {
        request.text.replace("## Second\n", "")
    }
    let raw = "# First\n## Second\n## Third\n";
    let service = mock_service(MockProvider::working().with_custom_response(drop_second), 1);

    let result = pipeline().process_document(&service, &source("docs/d.md", raw)).await.unwrap();

    assert_eq!(result.stats.translated_headings, 2);
    assert!(!result.diagnostics.unmapped_headings.is_empty());
}

#[tokio::test]
async fn test_batch_withOneUntranslatableDocument_shouldCompleteTheRest() {
    crate::common::init_test_logging();
    let mut service = mock_service(MockProvider::working().with_custom_response(selective), 2);
    let documents = vec![
        source("docs/a.md", "# A ok\n"),
        source("docs/b.md", "# B fails\n"),
        source("docs/c.md", "# C ok\n"),
    ];

    let report = pipeline().run_batch(&mut service, documents, None).await;

    let completed: Vec<&str> = report.completed.iter().map(|d| d.original_identity.as_str()).collect();
    assert_eq!(completed, vec!["docs/a.md", "docs/c.md"]);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].identity, "docs/b.md");
    assert_eq!(report.failed[0].stage, Some(PipelineStage::Translate));
    assert!(report.failed[0].reason.contains("no usable content"));
    assert!(!report.is_success());
    assert!(!service.has_session());
}

#[tokio::test]
async fn test_batch_withRejectedCredentials_shouldFailEveryDocumentQuickly() {
    let provider = MockProvider::unauthorized();
    let mut service = mock_service(provider.clone(), 3);
    let documents = vec![source("docs/a.md", "# A\n"), source("docs/b.md", "# B\n")];

    let report = pipeline().run_batch(&mut service, documents, None).await;

    assert_eq!(report.failed.len(), 2);
    assert_eq!(provider.request_count(), 0);
    assert!(report.failed.iter().all(|f| f.reason.contains("session unavailable")));
}
