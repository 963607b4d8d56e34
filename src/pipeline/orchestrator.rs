/*!
 * Pipeline orchestrator for document translation.
 *
 * Each document runs through
 * `Split -> Translate -> RewriteMetadata -> InsertBanner -> ReconcileAnchors -> Reassemble`.
 * Only `Translate` can fail; every other stage is pure and degrades in
 * place. A batch runs documents one after another and records failures
 * without stopping.
 */

use chrono::NaiveDate;
use log::{debug, error, info, warn};
use serde::Serialize;
use std::fmt;
use std::time::Instant;

use crate::app_config::DocumentConfig;
use crate::document::{
    self, Banner, LintIssue, MetadataRewrite, UnresolvedAnchor, count_words, extract_headings,
    introduced_issues, validate_links, validate_markdown,
};
use crate::errors::DocumentError;
use crate::translation::TranslationService;

/// Configuration for the document pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Front matter rewrite rules
    pub rewrite: MetadataRewrite,

    /// Notice inserted into translated bodies; `None` disables it
    pub banner: Option<Banner>,

    /// Date written to `translation_date`
    pub translation_date: NaiveDate,
}

impl PipelineConfig {
    /// Build the pipeline configuration from the document settings
    pub fn from_document_config(config: &DocumentConfig, translation_date: NaiveDate) -> Self {
        let banner = if config.banner_component.trim().is_empty() {
            None
        } else {
            Some(Banner {
                component: config.banner_component.clone(),
                import_path: config.banner_path.clone(),
            })
        };

        Self {
            rewrite: MetadataRewrite {
                field: config.metadata_field.clone(),
                remap: config.field_remap.clone(),
                translation_source: config.translation_source.clone(),
            },
            banner,
            translation_date,
        }
    }

    /// Enable or disable the translation notice.
    pub fn with_banner(mut self, banner: Option<Banner>) -> Self {
        self.banner = banner;
        self
    }
}

/// Stages of the per-document state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PipelineStage {
    Split,
    Translate,
    RewriteMetadata,
    InsertBanner,
    ReconcileAnchors,
    Reassemble,
    Done,
    Failed,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::Split => "split",
            PipelineStage::Translate => "translate",
            PipelineStage::RewriteMetadata => "rewrite-metadata",
            PipelineStage::InsertBanner => "insert-banner",
            PipelineStage::ReconcileAnchors => "reconcile-anchors",
            PipelineStage::Reassemble => "reassemble",
            PipelineStage::Done => "done",
            PipelineStage::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// A document waiting to be translated
#[derive(Debug, Clone)]
pub struct SourceDocument {
    /// Logical identity of the source (e.g. its path)
    pub identity: String,
    /// Identity of the translated output
    pub target_identity: String,
    /// Raw text
    pub content: String,
}

/// Findings collected while transforming a document
#[derive(Debug, Clone, Default, Serialize)]
pub struct DocumentDiagnostics {
    /// Why the front matter was kept as body text, if it was
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata_degraded: Option<String>,

    /// Internal links already broken in the source
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub source_broken_links: Vec<UnresolvedAnchor>,

    /// Links of the translated body that could not be remapped
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unresolved_anchors: Vec<UnresolvedAnchor>,

    /// Texts of source headings left without a counterpart
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unmapped_headings: Vec<String>,

    /// Structural problems introduced by translation
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub lint: Vec<LintIssue>,
}

impl DocumentDiagnostics {
    /// Whether nothing was found
    pub fn is_clean(&self) -> bool {
        self.metadata_degraded.is_none()
            && self.source_broken_links.is_empty()
            && self.unresolved_anchors.is_empty()
            && self.unmapped_headings.is_empty()
            && self.lint.is_empty()
    }
}

/// Numbers describing one transformation
#[derive(Debug, Clone, Default, Serialize)]
pub struct DocumentStats {
    pub source_headings: usize,
    pub translated_headings: usize,
    pub positional_matches: usize,
    pub fallback_matches: usize,
    pub links_rewritten: usize,
    pub source_words: usize,
    pub translated_words: usize,
    pub duration_ms: u128,
}

/// A successfully transformed document
#[derive(Debug, Clone, Serialize)]
pub struct TransformedDocument {
    pub original_identity: String,
    pub transformed_identity: String,
    #[serde(skip)]
    pub final_text: String,
    pub diagnostics: DocumentDiagnostics,
    pub stats: DocumentStats,
}

/// A document that did not make it through
#[derive(Debug, Clone, Serialize)]
pub struct DocumentFailure {
    pub identity: String,
    /// Stage that failed; `None` when the document never entered the pipeline
    pub stage: Option<PipelineStage>,
    pub reason: String,
}

impl fmt::Display for DocumentFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.stage {
            Some(stage) => write!(f, "{} ({}): {}", self.identity, stage, self.reason),
            None => write!(f, "{}: {}", self.identity, self.reason),
        }
    }
}

/// Outcome of a batch
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub completed: Vec<TransformedDocument>,
    pub failed: Vec<DocumentFailure>,
}

impl BatchReport {
    /// Whether every document completed
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// Number of documents in the batch
    pub fn total(&self) -> usize {
        self.completed.len() + self.failed.len()
    }

    /// One-line summary
    pub fn summary(&self) -> String {
        format!(
            "{} of {} document(s) translated, {} failed",
            self.completed.len(),
            self.total(),
            self.failed.len()
        )
    }
}

/// Progress information during a batch.
#[derive(Debug, Clone)]
pub struct BatchProgress {
    /// Zero-based index of the document
    pub index: usize,
    /// Number of documents in the batch
    pub total: usize,
    /// Identity of the document
    pub identity: String,
    /// Whether the document just finished (successfully or not)
    pub finished: bool,
}

/// The per-document pipeline.
#[derive(Debug, Clone)]
pub struct DocumentPipeline {
    config: PipelineConfig,
}

impl DocumentPipeline {
    /// Create a new pipeline with the given configuration.
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Configuration in use
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    fn enter(identity: &str, stage: PipelineStage) {
        debug!("{}: {}", identity, stage);
    }

    /// Transform one document.
    pub async fn process_document(
        &self,
        service: &TranslationService,
        source: &SourceDocument,
    ) -> Result<TransformedDocument, DocumentFailure> {
        let start_time = Instant::now();
        let identity = source.identity.as_str();
        let mut diagnostics = DocumentDiagnostics::default();

        Self::enter(identity, PipelineStage::Split);
        let doc = document::split(&source.content);
        if let Some(reason) = &doc.degraded {
            warn!("{}: front matter kept as body text ({})", identity, reason);
            diagnostics.metadata_degraded = Some(reason.clone());
        }

        diagnostics.source_broken_links = validate_links(&doc.body);
        for link in &diagnostics.source_broken_links {
            warn!(
                "{}: source link [{}](#{}) on line {} has no matching heading",
                identity,
                link.label,
                link.anchor,
                link.line + 1
            );
        }
        let source_lint = validate_markdown(&doc.body);

        Self::enter(identity, PipelineStage::Translate);
        let translated_body = service.translate(&doc.body, Some(identity)).await.map_err(|e| {
            let err = DocumentError::from(e);
            error!("{}: {}", identity, err);
            DocumentFailure {
                identity: identity.to_string(),
                stage: Some(PipelineStage::Translate),
                reason: err.to_string(),
            }
        })?;

        Self::enter(identity, PipelineStage::RewriteMetadata);
        let metadata = if doc.is_degraded() {
            doc.metadata.clone()
        } else {
            document::rewrite_metadata(&doc.metadata, &self.config.rewrite, self.config.translation_date)
        };

        Self::enter(identity, PipelineStage::InsertBanner);
        let bannered_body = match &self.config.banner {
            Some(banner) => document::insert_banner(&translated_body, banner),
            None => translated_body,
        };

        Self::enter(identity, PipelineStage::ReconcileAnchors);
        let source_headings = extract_headings(&doc.body);
        let translated_headings = extract_headings(&bannered_body);
        let reconciliation = document::reconcile(&source_headings, &translated_headings);
        let rewrite = document::rewrite_links(&bannered_body, &reconciliation.mapping);

        for link in &rewrite.unresolved {
            warn!(
                "{}: link [{}](#{}) on line {} left unchanged, no matching heading",
                identity,
                link.label,
                link.anchor,
                link.line + 1
            );
        }
        if source_headings.len() != translated_headings.len() {
            warn!(
                "{}: heading count changed in translation ({} -> {})",
                identity,
                source_headings.len(),
                translated_headings.len()
            );
        }

        diagnostics.unresolved_anchors = rewrite.unresolved;
        diagnostics.unmapped_headings = reconciliation
            .unmapped_source
            .iter()
            .map(|h| h.text.clone())
            .collect();
        diagnostics.lint = introduced_issues(&source_lint, validate_markdown(&rewrite.body));
        for issue in &diagnostics.lint {
            warn!("{}: {}", identity, issue);
        }

        Self::enter(identity, PipelineStage::Reassemble);
        let final_text = document::reassemble(&metadata, &rewrite.body);

        let stats = DocumentStats {
            source_headings: source_headings.len(),
            translated_headings: translated_headings.len(),
            positional_matches: reconciliation.positional_matches,
            fallback_matches: reconciliation.fallback_matches,
            links_rewritten: rewrite.rewritten,
            source_words: count_words(&doc.body),
            translated_words: count_words(&rewrite.body),
            duration_ms: start_time.elapsed().as_millis(),
        };

        Self::enter(identity, PipelineStage::Done);
        info!(
            "{} -> {} ({} heading(s) mapped, {} link(s) rewritten)",
            identity,
            source.target_identity,
            reconciliation.mapping.len(),
            stats.links_rewritten
        );

        Ok(TransformedDocument {
            original_identity: source.identity.clone(),
            transformed_identity: source.target_identity.clone(),
            final_text,
            diagnostics,
            stats,
        })
    }

    /// Run a batch of documents one after another.
    ///
    /// A failed document is logged, recorded in the report and skipped.
    /// The translation session is closed once the batch is over.
    pub async fn run_batch(
        &self,
        service: &mut TranslationService,
        documents: Vec<SourceDocument>,
        progress_callback: Option<&(dyn Fn(BatchProgress) + Send + Sync)>,
    ) -> BatchReport {
        let total = documents.len();
        let mut report = BatchReport::default();

        for (index, source) in documents.into_iter().enumerate() {
            if let Some(callback) = progress_callback {
                callback(BatchProgress {
                    index,
                    total,
                    identity: source.identity.clone(),
                    finished: false,
                });
            }

            match self.process_document(service, &source).await {
                Ok(transformed) => report.completed.push(transformed),
                Err(failure) => {
                    debug!("{}: {}", source.identity, PipelineStage::Failed);
                    report.failed.push(failure);
                }
            }

            if let Some(callback) = progress_callback {
                callback(BatchProgress {
                    index,
                    total,
                    identity: source.identity,
                    finished: true,
                });
            }
        }

        service.close_session();
        info!("{}", report.summary());
        report
    }
}
