/*!
 * Prompt construction for document translation.
 *
 * This module provides:
 * - The system prompt template carrying the format-preservation rules
 * - A builder that frames a document body as a translation request
 */

pub mod templates;

// Re-export main types
pub use templates::{PromptTemplate, TranslationPromptBuilder, TranslationRequest};
