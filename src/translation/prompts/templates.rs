/*!
 * Prompt templates for Markdown document translation.
 *
 * The system prompt carries the format-preservation rules; the user prompt
 * frames the prose body. Front matter is never part of the request.
 */

use serde::{Deserialize, Serialize};

use crate::language_utils;

/// System prompt template for document translation.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    /// The template string with placeholders
    template: String,
}

impl PromptTemplate {
    /// The default system prompt for Markdown translation.
    pub const MARKDOWN_TRANSLATOR: &'static str = r#"You are a professional technical translator working on {source_language} to {target_language} documentation.

## Requirements
- Preserve ALL Markdown formatting exactly: headings, lists, tables, emphasis, links and HTML/MDX tags
- Do NOT translate fenced code blocks, inline code spans, URLs, file paths or shell commands
- Keep link targets such as (#anchor) and (./path.md) unchanged; translate only the link label
- Keep the number and order of headings identical to the source
- Keep any YAML front matter unchanged
- Use natural, professional {target_language}

## Output
- Return ONLY the translated Markdown
- Do not wrap the answer in a code fence
- Do not add explanations, notes or greetings"#;

    /// Create a new prompt template.
    pub fn new(template: &str) -> Self {
        Self {
            template: template.to_string(),
        }
    }

    /// Create the default Markdown translator template.
    pub fn markdown_translator() -> Self {
        Self::new(Self::MARKDOWN_TRANSLATOR)
    }

    /// Render the template with the given variables.
    pub fn render(&self, source_language: &str, target_language: &str) -> String {
        self.template
            .replace("{source_language}", source_language)
            .replace("{target_language}", target_language)
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::markdown_translator()
    }
}

/// A fully framed translation request, ready to be handed to a provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationRequest {
    /// Source language code
    pub source_language: String,

    /// Target language code
    pub target_language: String,

    /// Instructions for the model
    pub system_prompt: String,

    /// The prose body wrapped with framing text
    pub user_prompt: String,
}

impl TranslationRequest {
    /// Single-prompt form for backends without a separate system slot
    pub fn combined_prompt(&self) -> String {
        format!("{}\n\n{}", self.system_prompt, self.user_prompt)
    }
}

/// Builder for constructing translation prompts.
#[derive(Debug, Clone)]
pub struct TranslationPromptBuilder {
    source_language: String,
    target_language: String,
    document_name: Option<String>,
}

impl TranslationPromptBuilder {
    /// Create a new prompt builder from language codes.
    pub fn new(source_language: &str, target_language: &str) -> Self {
        Self {
            source_language: source_language.to_string(),
            target_language: target_language.to_string(),
            document_name: None,
        }
    }

    /// Name the document being translated (gives the model some context).
    pub fn with_document_name(mut self, name: &str) -> Self {
        self.document_name = Some(name.to_string());
        self
    }

    fn display_name(code: &str) -> String {
        language_utils::get_language_name(code).unwrap_or_else(|_| code.to_string())
    }

    /// Build the system prompt.
    pub fn build_system_prompt(&self) -> String {
        PromptTemplate::markdown_translator().render(
            &Self::display_name(&self.source_language),
            &Self::display_name(&self.target_language),
        )
    }

    /// Build the user prompt around the prose body.
    pub fn build_user_prompt(&self, body: &str) -> String {
        let header = match &self.document_name {
            Some(name) => format!(
                "Translate the following Markdown document ({}) from {} to {}.",
                name,
                Self::display_name(&self.source_language),
                Self::display_name(&self.target_language)
            ),
            None => format!(
                "Translate the following Markdown content from {} to {}.",
                Self::display_name(&self.source_language),
                Self::display_name(&self.target_language)
            ),
        };

        format!(
            "{}\n\nContent:\n{}\n\nReturn only the translated markdown:",
            header, body
        )
    }

    /// Build the complete request for a prose body.
    pub fn build(&self, body: &str) -> TranslationRequest {
        TranslationRequest {
            source_language: self.source_language.clone(),
            target_language: self.target_language.clone(),
            system_prompt: self.build_system_prompt(),
            user_prompt: self.build_user_prompt(body),
        }
    }
}
