use anyhow::{Context, Result, anyhow};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};
use serde::Serialize;
use std::path::{Component, Path, PathBuf};
use std::time::Instant;

use crate::app_config::Config;
use crate::document::{self, MappingPreview};
use crate::errors::DocumentError;
use crate::file_utils::FileManager;
use crate::pipeline::{
    BatchProgress, BatchReport, DocumentFailure, DocumentPipeline, PipelineConfig, SourceDocument,
};
use crate::translation::TranslationService;

// @module: Application controller for documentation translation

/// Options of a translate run
#[derive(Debug, Clone, Default)]
pub struct TranslateOptions {
    /// Translate even when the output file already exists
    pub force_overwrite: bool,
    /// Only report what would be translated
    pub dry_run: bool,
    /// Directory the localized tree is written under; defaults to the working directory
    pub output_root: Option<PathBuf>,
    /// Where to write the JSON manifest, if anywhere
    pub manifest: Option<PathBuf>,
}

/// A source file and where its translation goes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedDocument {
    pub source: PathBuf,
    pub target: PathBuf,
}

/// Record handed to whatever publishes the translations
#[derive(Debug, Clone, Serialize)]
pub struct ManifestEntry {
    pub original_identity: String,
    pub transformed_identity: String,
}

/// JSON manifest of a translate run
#[derive(Debug, Clone, Serialize)]
pub struct Manifest {
    pub source_language: String,
    pub target_language: String,
    pub completed: Vec<ManifestEntry>,
    pub failed: Vec<DocumentFailure>,
}

/// Result of a translate run
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Documents selected for translation
    pub planned: Vec<PlannedDocument>,
    /// Sources skipped because their output already exists
    pub skipped: Vec<PathBuf>,
    /// Outcome of the batch; empty for a dry run
    pub report: BatchReport,
}

/// Result of a link check
#[derive(Debug, Default, Clone, Serialize)]
pub struct CheckReport {
    pub files: usize,
    pub broken_links: usize,
    pub lint_issues: usize,
}

impl CheckReport {
    pub fn is_clean(&self) -> bool {
        self.broken_links == 0 && self.lint_issues == 0
    }
}

/// Main application controller for documentation translation
pub struct Controller {
    // @field: App configuration
    config: Config,
}

impl Controller {
    /// Create a new controller for test purposes with default configuration
    pub fn new_for_test() -> Result<Self> {
        Self::with_config(Config::default())
    }

    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        Ok(Self { config })
    }

    /// Configuration in use
    pub fn config(&self) -> &Config {
        &self.config
    }

    fn pipeline(&self) -> DocumentPipeline {
        let today = chrono::Local::now().date_naive();
        DocumentPipeline::new(PipelineConfig::from_document_config(&self.config.document, today))
    }

    fn output_path(&self, source: &Path, output_root: Option<&Path>) -> PathBuf {
        let document = &self.config.document;
        let localized = FileManager::localized_path(source, &document.docs_dir, &document.locale_dir);
        match output_root {
            Some(root) => root.join(
                localized
                    .components()
                    .filter(|c| matches!(c, Component::Normal(_)))
                    .collect::<PathBuf>(),
            ),
            None => localized,
        }
    }

    /// Discover documents and decide which ones need translating
    pub fn plan(&self, inputs: &[PathBuf], options: &TranslateOptions) -> Result<(Vec<PlannedDocument>, Vec<PathBuf>)> {
        let document = &self.config.document;
        let sources = FileManager::find_documents(
            inputs,
            &document.file_extensions,
            &document.docs_dir,
            &document.locale_dir,
        )?;

        let mut planned = Vec::new();
        let mut skipped = Vec::new();
        for source in sources {
            let target = self.output_path(&source, options.output_root.as_deref());
            if FileManager::file_exists(&target) && !options.force_overwrite {
                warn!(
                    "Skipping {}, translation already exists (use -f to force overwrite)",
                    source.display()
                );
                skipped.push(source);
            } else {
                planned.push(PlannedDocument { source, target });
            }
        }

        Ok((planned, skipped))
    }

    /// Translate the documents found under `inputs` with the configured provider
    pub async fn run(&self, inputs: &[PathBuf], options: &TranslateOptions) -> Result<RunSummary> {
        let mut service = TranslationService::new(
            self.config.translation.clone(),
            &self.config.source_language,
            &self.config.target_language,
        )
        .context("Failed to create translation service")?;

        self.run_with_service(&mut service, inputs, options).await
    }

    /// Translate the documents found under `inputs` with the given service
    pub async fn run_with_service(
        &self,
        service: &mut TranslationService,
        inputs: &[PathBuf],
        options: &TranslateOptions,
    ) -> Result<RunSummary> {
        let start_time = Instant::now();
        let (planned, skipped) = self.plan(inputs, options)?;

        if planned.is_empty() {
            info!("Nothing to translate ({} skipped)", skipped.len());
            return Ok(RunSummary {
                planned,
                skipped,
                report: BatchReport::default(),
            });
        }

        if options.dry_run {
            for doc in &planned {
                info!("Would translate {} -> {}", doc.source.display(), doc.target.display());
            }
            return Ok(RunSummary {
                planned,
                skipped,
                report: BatchReport::default(),
            });
        }

        let mut unreadable = Vec::new();
        let mut sources = Vec::with_capacity(planned.len());
        for doc in &planned {
            match FileManager::read_to_string(&doc.source) {
                Ok(content) => sources.push(SourceDocument {
                    identity: doc.source.display().to_string(),
                    target_identity: doc.target.display().to_string(),
                    content,
                }),
                Err(e) => {
                    let err = DocumentError::Io(format!("{:#}", e));
                    error!("{}", err);
                    unreadable.push(DocumentFailure {
                        identity: doc.source.display().to_string(),
                        stage: None,
                        reason: err.to_string(),
                    });
                }
            }
        }

        let progress_bar = ProgressBar::new(sources.len() as u64);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} documents ({percent}%) {msg}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(style.progress_chars("█▓▒░"));

        let callback = |progress: BatchProgress| {
            if progress.finished {
                progress_bar.inc(1);
            } else {
                progress_bar.set_message(progress.identity);
            }
        };

        let mut report = self.pipeline().run_batch(service, sources, Some(&callback)).await;
        progress_bar.finish_and_clear();
        report.failed.extend(unreadable);

        let mut written = Vec::with_capacity(report.completed.len());
        for doc in std::mem::take(&mut report.completed) {
            match FileManager::write_to_file(&doc.transformed_identity, &doc.final_text) {
                Ok(()) => {
                    debug!("Wrote {}", doc.transformed_identity);
                    written.push(doc);
                }
                Err(e) => {
                    let err = DocumentError::Io(format!("{:#}", e));
                    error!("{}", err);
                    report.failed.push(DocumentFailure {
                        identity: doc.original_identity,
                        stage: None,
                        reason: err.to_string(),
                    });
                }
            }
        }
        report.completed = written;

        if let Some(manifest_path) = &options.manifest {
            self.write_manifest(manifest_path, &report)?;
        }

        for failure in &report.failed {
            error!("Failed: {}", failure);
        }
        info!(
            "{} in {}",
            report.summary(),
            Self::format_duration(start_time.elapsed())
        );

        Ok(RunSummary {
            planned,
            skipped,
            report,
        })
    }

    /// Write the JSON manifest of a batch
    pub fn write_manifest(&self, path: &Path, report: &BatchReport) -> Result<()> {
        let manifest = Manifest {
            source_language: self.config.source_language.clone(),
            target_language: self.config.target_language.clone(),
            completed: report
                .completed
                .iter()
                .map(|doc| ManifestEntry {
                    original_identity: doc.original_identity.clone(),
                    transformed_identity: doc.transformed_identity.clone(),
                })
                .collect(),
            failed: report.failed.clone(),
        };

        let json = serde_json::to_string_pretty(&manifest).context("Failed to serialize manifest")?;
        FileManager::write_to_file(path, &json)?;
        info!("Manifest written to {}", path.display());
        Ok(())
    }

    /// Report broken internal links and structural problems without translating
    pub fn check(&self, inputs: &[PathBuf]) -> Result<CheckReport> {
        let document = &self.config.document;
        let files = FileManager::find_documents(
            inputs,
            &document.file_extensions,
            &document.docs_dir,
            // Localized files are checked too when passed explicitly
            "",
        )?;

        let mut report = CheckReport {
            files: files.len(),
            ..CheckReport::default()
        };

        for file in &files {
            let raw = FileManager::read_to_string(file)?;
            let body = document::split(&raw).body;
            let stats = document::anchor_stats(&body);
            debug!(
                "{}: {} heading(s), {} internal link(s)",
                file.display(),
                stats.headings,
                stats.anchor_links
            );

            for link in document::validate_links(&body) {
                warn!(
                    "{}:{}: [{}](#{}) matches no heading",
                    file.display(),
                    link.line + 1,
                    link.label,
                    link.anchor
                );
                report.broken_links += 1;
            }
            for issue in document::validate_markdown(&body) {
                warn!("{}: {}", file.display(), issue);
                report.lint_issues += 1;
            }
        }

        info!(
            "Checked {} file(s): {} broken link(s), {} structural issue(s)",
            report.files, report.broken_links, report.lint_issues
        );
        Ok(report)
    }

    /// Show how the headings of an original and its translation pair up
    pub fn anchors(&self, original: &Path, translated: &Path) -> Result<Vec<MappingPreview>> {
        if !FileManager::file_exists(original) {
            return Err(anyhow!("Original file does not exist: {:?}", original));
        }
        if !FileManager::file_exists(translated) {
            return Err(anyhow!("Translated file does not exist: {:?}", translated));
        }

        let source_body = document::split(&FileManager::read_to_string(original)?).body;
        let translated_body = document::split(&FileManager::read_to_string(translated)?).body;
        let (rows, reconciliation) = document::preview_mapping(&source_body, &translated_body);

        for row in &rows {
            let indent = "  ".repeat(usize::from(row.level.saturating_sub(1)));
            match &row.target_anchor {
                Some(target) => println!("{}#{} -> #{}", indent, row.source_anchor, target),
                None => println!("{}#{} -> (unmapped)", indent, row.source_anchor),
            }
        }
        info!(
            "{} positional, {} fallback, {} unmapped source, {} unmapped translated",
            reconciliation.positional_matches,
            reconciliation.fallback_matches,
            reconciliation.unmapped_source.len(),
            reconciliation.unmapped_translated.len()
        );

        Ok(rows)
    }

    // Format duration in a human-readable format
    fn format_duration(duration: std::time::Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
