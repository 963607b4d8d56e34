/*!
 * Heading extraction and anchor identifiers.
 *
 * Anchor identifiers follow the slug convention of the documentation site
 * the files are published to. Any change here silently breaks every
 * in-page link, so the rules are pinned by tests.
 */

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

/// ATX heading on a trimmed line
static HEADING_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(#{1,6})\s+(.+)$").unwrap());

/// Paired inline markup, stripped in this order with the inner text kept
static MARKUP_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        // **bold**
        Regex::new(r"\*\*([^*]+)\*\*").unwrap(),
        // *italic*
        Regex::new(r"\*([^*]+)\*").unwrap(),
        // `code`
        Regex::new(r"`([^`]+)`").unwrap(),
        // [text](url)
        Regex::new(r"\[([^\]]+)\]\([^)]+\)").unwrap(),
    ]
});

/// A heading found in a document body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Heading {
    /// Heading level, 1 to 6
    pub level: u8,
    /// Heading text with inline markup retained
    pub text: String,
    /// Anchor identifier derived from `text`
    pub anchor_id: String,
    /// Index among the headings of the body
    pub position: usize,
    /// Zero-based line index, for diagnostics
    pub line: usize,
}

impl Heading {
    /// Build a heading, computing its anchor
    pub fn new(level: u8, text: &str, position: usize, line: usize) -> Self {
        Self {
            level,
            text: text.to_string(),
            anchor_id: compute_anchor_id(text),
            position,
            line,
        }
    }
}

/// Tracks whether a line-by-line scan is inside a fenced code block
#[derive(Debug, Default)]
pub(crate) struct FenceTracker {
    open: Option<(char, usize)>,
}

impl FenceTracker {
    /// Whether the scan is currently inside a fence
    pub(crate) fn is_open(&self) -> bool {
        self.open.is_some()
    }

    /// Feed the next line; returns true when the line belongs to a fence
    /// (including the opening and closing lines).
    pub(crate) fn is_code(&mut self, line: &str) -> bool {
        let trimmed = line.trim_start();
        let marker = match trimmed.chars().next() {
            Some(c @ ('`' | '~')) => c,
            _ => return self.open.is_some(),
        };
        let run = trimmed.chars().take_while(|&c| c == marker).count();

        match self.open {
            None if run >= 3 => {
                self.open = Some((marker, run));
                true
            }
            Some((open_marker, open_run))
                if marker == open_marker && run >= open_run && trimmed[run..].trim().is_empty() =>
            {
                self.open = None;
                true
            }
            _ => self.open.is_some(),
        }
    }
}

/// Parse a single line as a heading: level and trimmed text
pub fn parse_heading_line(line: &str) -> Option<(u8, &str)> {
    let captures = HEADING_REGEX.captures(line.trim())?;
    let level = captures.get(1)?.as_str().len() as u8;
    let text = captures.get(2)?.as_str().trim();
    if text.is_empty() {
        return None;
    }
    Some((level, text))
}

/// Extract the headings of a body in document order.
///
/// Lines inside fenced code blocks are never headings.
pub fn extract_headings(body: &str) -> Vec<Heading> {
    let mut fences = FenceTracker::default();
    let mut headings = Vec::new();

    for (line_index, line) in body.lines().enumerate() {
        if fences.is_code(line) {
            continue;
        }
        if let Some((level, text)) = parse_heading_line(line) {
            headings.push(Heading::new(level, text, headings.len(), line_index));
        }
    }

    headings
}

fn is_kept_char(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || c == '_'
        || c == '-'
        || c.is_whitespace()
        || ('\u{3040}'..='\u{309F}').contains(&c)
        || ('\u{30A0}'..='\u{30FF}').contains(&c)
        || ('\u{4E00}'..='\u{9FAF}').contains(&c)
}

/// Compute the anchor identifier for a heading text.
///
/// Steps: strip paired markup keeping the inner text, lowercase, keep only
/// ASCII word characters, whitespace, hyphens and Japanese scripts, turn
/// whitespace runs into a hyphen, collapse hyphens, trim hyphens.
pub fn compute_anchor_id(text: &str) -> String {
    let mut stripped = text.to_string();
    for pattern in MARKUP_PATTERNS.iter() {
        stripped = pattern.replace_all(&stripped, "$1").into_owned();
    }

    let filtered: String = stripped.to_lowercase().chars().filter(|&c| is_kept_char(c)).collect();

    let mut anchor = String::with_capacity(filtered.len());
    for c in filtered.chars() {
        let c = if c.is_whitespace() { '-' } else { c };
        if c == '-' && anchor.ends_with('-') {
            continue;
        }
        anchor.push(c);
    }

    anchor.trim_matches('-').to_string()
}
