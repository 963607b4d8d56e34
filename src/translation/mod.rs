/*!
 * Translation of document bodies through an external capability.
 *
 * This module is split into several submodules:
 *
 * - `core`: the translation service, its session and the retry loop
 * - `retry`: the retry policy value
 * - `prompts`: prompt templates and builders for translation
 * - `extract`: clean-up of the model's answer
 */

// Re-export main types for easier usage
pub use self::core::{TranslationService, TranslationSession};
pub use self::extract::extract_translation;
pub use self::prompts::{PromptTemplate, TranslationPromptBuilder, TranslationRequest};
pub use self::retry::RetryPolicy;

// Submodules
pub mod core;
pub mod extract;
pub mod prompts;
pub mod retry;
