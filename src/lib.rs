/*!
 * # docs-translator
 *
 * A Rust library for translating Markdown/MDX documentation with AI while
 * keeping its structure intact.
 *
 * ## Features
 *
 * - YAML front matter split, rewrite and reassembly
 * - Translation through various AI providers:
 *   - Claude Code CLI (print mode)
 *   - Anthropic API
 *   - OpenAI API (and compatible servers)
 *   - Ollama (local LLM)
 * - Bounded retries with linear backoff and per-attempt timeouts
 * - Anchor reconciliation: in-page links follow translated headings
 * - Translation notice insertion and provenance fields
 * - Batch processing where one failed document never stops the others
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `document`: Front matter, headings, anchors and lint checks
 * - `translation`: AI-powered translation service:
 *   - `translation::core`: Session handling and the retry loop
 *   - `translation::extract`: Cleanup of model answers
 *   - `translation::prompts`: Prompt templates
 *   - `translation::retry`: Retry policy
 * - `pipeline`: Per-document state machine and batch runner
 * - `file_utils`: File discovery and localized output paths
 * - `app_controller`: Main application controller
 * - `language_utils`: ISO language code utilities
 * - `providers`: Client implementations for the translation backends
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod document;
pub mod errors;
pub mod file_utils;
pub mod language_utils;
pub mod pipeline;
pub mod providers;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use document::{AnchorMapping, Document, Heading};
pub use errors::{AppError, DocumentError, ProviderError, TranslationError};
pub use language_utils::{get_language_name, language_codes_match, normalize_to_part3};
pub use pipeline::{BatchReport, DocumentFailure, DocumentPipeline, SourceDocument, TransformedDocument};
pub use translation::TranslationService;
