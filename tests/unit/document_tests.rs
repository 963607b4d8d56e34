/*!
 * Tests for front matter, heading and anchor handling through the public API
 */

use chrono::NaiveDate;
use docs_translator::document::{
    self, Banner, MetadataRewrite, anchor_stats, compute_anchor_id, extract_headings, reconcile, rewrite_links,
    validate_links,
};
use serde_yaml::Value;
use std::collections::BTreeMap;

use crate::common::GETTING_STARTED;

fn rewrite() -> MetadataRewrite {
    MetadataRewrite {
        field: "displayed_sidebar".to_string(),
        remap: BTreeMap::from([("docsEnglish".to_string(), "docsJapanese".to_string())]),
        translation_source: "claude-code".to_string(),
    }
}

#[test]
fn test_splitAndReassemble_withSample_shouldRoundTrip() {
    let doc = document::split(GETTING_STARTED);

    assert!(doc.has_metadata_block);
    assert!(doc.body.starts_with("# Getting Started\n"));
    assert_eq!(document::reassemble(&doc.metadata, &doc.body), GETTING_STARTED);
}

#[test]
fn test_splitAndReassemble_withoutMetadata_shouldPassThrough() {
    let raw = "Plain text.\n\n## Section\n";
    let doc = document::split(raw);

    assert!(!doc.has_metadata_block);
    assert_eq!(document::reassemble(&doc.metadata, &doc.body), raw);
}

#[test]
fn test_rewriteMetadata_withSidebarExample_shouldRemapAndStamp() {
    let doc = document::split(GETTING_STARTED);
    let date = NaiveDate::from_ymd_opt(2024, 12, 24).unwrap();

    let rewritten = document::rewrite_metadata(&doc.metadata, &rewrite(), date);

    assert_eq!(rewritten.get("title").and_then(Value::as_str), Some("Getting Started"));
    assert_eq!(rewritten.get("displayed_sidebar").and_then(Value::as_str), Some("docsJapanese"));
    assert_eq!(rewritten.get("translated").and_then(Value::as_bool), Some(true));
    assert_eq!(rewritten.get("translation_source").and_then(Value::as_str), Some("claude-code"));
    assert_eq!(rewritten.get("translation_date").and_then(Value::as_str), Some("2024-12-24"));
}

#[test]
fn test_extractHeadings_withSample_shouldIgnoreCodeComments() {
    let body = document::split(GETTING_STARTED).body;
    let anchors: Vec<String> = extract_headings(&body).into_iter().map(|h| h.anchor_id).collect();

    assert_eq!(anchors, vec!["getting-started", "prerequisites"]);
}

#[test]
fn test_reconcileAndRewrite_withGettingStartedExample_shouldFollowTranslation() {
    let source = extract_headings("# Getting Started\n## Prerequisites\n");
    let translated_body = "# はじめに\n[前提](#prerequisites)\n## 前提条件\n";
    let translated = extract_headings(translated_body);

    let reconciliation = reconcile(&source, &translated);
    assert_eq!(reconciliation.mapping.get("getting-started"), Some("はじめに"));
    assert_eq!(reconciliation.mapping.get("prerequisites"), Some("前提条件"));

    let rewrite = rewrite_links(translated_body, &reconciliation.mapping);
    assert_eq!(rewrite.body, "# はじめに\n[前提](#前提条件)\n## 前提条件\n");
    assert!(validate_links(&rewrite.body).is_empty());

    // Running the rewrite again changes nothing
    let again = rewrite_links(&rewrite.body, &reconciliation.mapping);
    assert_eq!(again.body, rewrite.body);
    assert!(again.unresolved.is_empty());
}

#[test]
fn test_rewriteLinks_withUnknownAnchor_shouldReportAndKeepIt() {
    let translated_body = "# はじめに\nSee [old](#removed).\n";
    let reconciliation = reconcile(&extract_headings("# Intro\n"), &extract_headings(translated_body));

    let rewrite = rewrite_links(translated_body, &reconciliation.mapping);

    assert_eq!(rewrite.body, translated_body);
    assert_eq!(rewrite.unresolved.len(), 1);
    assert_eq!(rewrite.unresolved[0].anchor, "removed");
    assert_eq!(rewrite.unresolved[0].line, 1);
}

#[test]
fn test_computeAnchorId_shouldMatchSiteSlugs() {
    assert_eq!(compute_anchor_id("Installing `docs-translator`"), "installing-docs-translator");
    assert_eq!(compute_anchor_id("設定ファイル"), "設定ファイル");
}

#[test]
fn test_insertBanner_withSample_shouldFollowTitle() {
    let banner = Banner {
        component: "TranslationBanner".to_string(),
        import_path: "/src/components/_translation-ja-jp.mdx".to_string(),
    };
    let body = document::split(GETTING_STARTED).body;

    let bannered = document::insert_banner(&body, &banner);

    let lines: Vec<&str> = bannered.lines().collect();
    assert_eq!(lines[0], "import TranslationBanner from '/src/components/_translation-ja-jp.mdx';");
    assert_eq!(lines[2], "# Getting Started");
    assert_eq!(lines[4], "<TranslationBanner />");
    assert_eq!(lines[5], "");
    assert_eq!(lines[6], "Read the [prerequisites](#prerequisites) first.");
}

#[test]
fn test_anchorStats_withSample_shouldCountOutsideCode() {
    let stats = anchor_stats(&document::split(GETTING_STARTED).body);

    assert_eq!(stats.headings, 2);
    assert_eq!(stats.anchor_links, 1);
    assert_eq!(stats.headings_per_level[0], 1);
    assert_eq!(stats.headings_per_level[1], 1);
}
