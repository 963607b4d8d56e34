/*!
 * Front matter handling: split, rewrite, reassemble, and the translation
 * notice inserted into translated bodies.
 */

use chrono::NaiveDate;
use log::{error, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_yaml::{Mapping, Value};
use std::collections::BTreeMap;

use super::headings::FenceTracker;

/// `---` line, optional YAML payload, `---` line, then the body
static FRONT_MATTER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)\A---[ \t]*\r?\n(?:(.*?)\r?\n)?---[ \t]*(?:\r?\n|\z)(.*)\z").unwrap()
});

/// Key of the provenance flag
pub const TRANSLATED_KEY: &str = "translated";
/// Key of the provenance source identifier
pub const TRANSLATION_SOURCE_KEY: &str = "translation_source";
/// Key of the provenance date
pub const TRANSLATION_DATE_KEY: &str = "translation_date";

/// A document split into front matter and prose
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Front matter, in source key order; empty when absent
    pub metadata: Mapping,
    /// Prose after the front matter
    pub body: String,
    /// Whether the input opened with a delimited block
    pub has_metadata_block: bool,
    /// Why a delimited block could not be used, if it could not
    pub degraded: Option<String>,
}

impl Document {
    /// Whether the metadata block was found but had to be left as body text
    pub fn is_degraded(&self) -> bool {
        self.degraded.is_some()
    }
}

/// How the front matter of a translated document is rewritten
#[derive(Debug, Clone, PartialEq)]
pub struct MetadataRewrite {
    /// Field whose value is remapped
    pub field: String,
    /// Old value -> new value
    pub remap: BTreeMap<String, String>,
    /// Value of the `translation_source` field
    pub translation_source: String,
}

/// The notice placed in translated bodies
#[derive(Debug, Clone, PartialEq)]
pub struct Banner {
    /// Component name, e.g. `TranslationBanner`
    pub component: String,
    /// Module path the component is imported from
    pub import_path: String,
}

impl Banner {
    /// `import X from '...';` line placed at the top of the body
    pub fn import_line(&self) -> String {
        format!("import {} from '{}';", self.component, self.import_path)
    }

    /// Self-closing element placed after the title
    pub fn element(&self) -> String {
        format!("<{} />", self.component)
    }
}

/// Split raw text into front matter and body. Never fails.
///
/// A delimited block whose payload is not a YAML mapping (or not YAML at
/// all) is kept as body text, with the reason recorded in `degraded`.
/// An empty payload is an empty mapping.
pub fn split(raw: &str) -> Document {
    let Some(captures) = FRONT_MATTER_REGEX.captures(raw) else {
        return Document {
            metadata: Mapping::new(),
            body: raw.to_string(),
            has_metadata_block: false,
            degraded: None,
        };
    };

    let payload = captures.get(1).map(|m| m.as_str()).unwrap_or_default();
    let body = captures.get(2).map(|m| m.as_str()).unwrap_or_default();

    let parsed = match serde_yaml::from_str::<Value>(payload) {
        Ok(Value::Mapping(mapping)) => Ok(mapping),
        Ok(Value::Null) => Ok(Mapping::new()),
        Ok(other) => Err(format!("front matter is a {}, not a mapping", value_kind(&other))),
        Err(e) => Err(format!("front matter is not valid YAML: {}", e)),
    };

    match parsed {
        Ok(metadata) => Document {
            metadata,
            body: body.to_string(),
            has_metadata_block: true,
            degraded: None,
        },
        Err(reason) => {
            warn!("Keeping unparsable front matter as body text: {}", reason);
            Document {
                metadata: Mapping::new(),
                body: raw.to_string(),
                has_metadata_block: true,
                degraded: Some(reason),
            }
        }
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}

/// Rewrite front matter for the translated document.
///
/// The configured field is remapped when its value is a key of the remap
/// table, then the provenance fields are set. Existing keys keep their
/// position; new keys are appended.
pub fn rewrite_metadata(metadata: &Mapping, rewrite: &MetadataRewrite, date: NaiveDate) -> Mapping {
    let mut rewritten = metadata.clone();

    let field = Value::String(rewrite.field.clone());
    let replacement = rewritten
        .get(&field)
        .and_then(Value::as_str)
        .and_then(|current| rewrite.remap.get(current))
        .cloned();
    if let Some(new_value) = replacement {
        rewritten.insert(field, Value::String(new_value));
    }

    rewritten.insert(Value::from(TRANSLATED_KEY), Value::Bool(true));
    rewritten.insert(
        Value::from(TRANSLATION_SOURCE_KEY),
        Value::String(rewrite.translation_source.clone()),
    );
    rewritten.insert(
        Value::from(TRANSLATION_DATE_KEY),
        Value::String(date.format("%Y-%m-%d").to_string()),
    );

    rewritten
}

/// Serialize front matter back in front of the body.
///
/// Empty metadata gives the body verbatim. If serialization fails the body
/// is returned alone rather than losing the document.
pub fn reassemble(metadata: &Mapping, body: &str) -> String {
    if metadata.is_empty() {
        return body.to_string();
    }

    match serde_yaml::to_string(metadata) {
        Ok(yaml) => format!("---\n{}---\n{}", yaml, body),
        Err(e) => {
            error!("Failed to serialize front matter, writing body only: {}", e);
            body.to_string()
        }
    }
}

/// Insert the translation notice into a body.
///
/// The import line goes first, the element right after the first `# `
/// title outside code fences, or at the very start when there is no title.
/// A body that already carries the element is returned unchanged. Inserted
/// lines use the body's own line ending.
pub fn insert_banner(body: &str, banner: &Banner) -> String {
    let element = banner.element();
    if body.lines().any(|line| line.trim() == element) {
        return body.to_string();
    }

    let newline = if body.contains("\r\n") { "\r\n" } else { "\n" };
    let import = banner.import_line();
    let lines: Vec<&str> = body.split(newline).collect();

    let mut fences = FenceTracker::default();
    let title_index = lines
        .iter()
        .position(|line| !fences.is_code(line) && line.trim_start().starts_with("# "));

    match title_index {
        Some(index) => {
            let mut out: Vec<&str> = Vec::with_capacity(lines.len() + 5);
            out.push(&import);
            out.push("");
            out.extend_from_slice(&lines[..=index]);
            out.push("");
            out.push(&element);
            let rest = &lines[index + 1..];
            if rest.first().is_none_or(|line| !line.trim().is_empty()) {
                out.push("");
            }
            out.extend_from_slice(rest);
            out.join(newline)
        }
        None => format!("{import}{nl}{nl}{element}{nl}{nl}{body}", nl = newline),
    }
}
