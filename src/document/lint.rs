//! Light structural checks on Markdown bodies.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use super::headings::FenceTracker;

static EMPTY_LINK_TEXT_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(^|[^!])\[\]\([^)]*\)").unwrap());
static EMPTY_LINK_TARGET_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[[^\]]*\]\(\s*\)").unwrap());
static INLINE_CODE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"`[^`\n]*`").unwrap());

/// A structural problem found in a body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LintIssue {
    /// A code fence is opened but never closed
    UnclosedCodeFence { line: usize },
    /// `[](...)`
    EmptyLinkText { line: usize },
    /// `[text]()`
    EmptyLinkTarget { line: usize },
}

impl std::fmt::Display for LintIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LintIssue::UnclosedCodeFence { line } => write!(f, "line {}: unclosed code fence", line + 1),
            LintIssue::EmptyLinkText { line } => write!(f, "line {}: link with empty text", line + 1),
            LintIssue::EmptyLinkTarget { line } => write!(f, "line {}: link with empty target", line + 1),
        }
    }
}

impl LintIssue {
    /// Whether both issues are the same kind of problem, wherever they are
    pub fn same_kind(&self, other: &LintIssue) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

/// Issues of `translated` not accounted for by an issue of the same kind in `source`.
///
/// Line numbers are ignored: translation and banner insertion move lines.
pub fn introduced_issues(source: &[LintIssue], translated: Vec<LintIssue>) -> Vec<LintIssue> {
    let mut inherited: Vec<&LintIssue> = source.iter().collect();
    translated
        .into_iter()
        .filter(|issue| match inherited.iter().position(|known| known.same_kind(issue)) {
            Some(index) => {
                inherited.swap_remove(index);
                false
            }
            None => true,
        })
        .collect()
}

/// Check a body for unclosed fences and empty links
pub fn validate_markdown(body: &str) -> Vec<LintIssue> {
    let mut issues = Vec::new();
    let mut fences = FenceTracker::default();
    let mut open_fence_line = None;

    for (line_index, line) in body.split('\n').enumerate() {
        if fences.is_code(line) {
            if !fences.is_open() {
                open_fence_line = None;
            } else if open_fence_line.is_none() {
                open_fence_line = Some(line_index);
            }
            continue;
        }

        if EMPTY_LINK_TEXT_REGEX.is_match(line) {
            issues.push(LintIssue::EmptyLinkText { line: line_index });
        }
        if EMPTY_LINK_TARGET_REGEX.is_match(line) {
            issues.push(LintIssue::EmptyLinkTarget { line: line_index });
        }
    }

    if let Some(line) = open_fence_line {
        issues.push(LintIssue::UnclosedCodeFence { line });
    }

    issues
}

/// Count words outside code.
///
/// Whitespace-separated tokens are words; each CJK character counts as one
/// word since those scripts do not separate words with spaces.
pub fn count_words(body: &str) -> usize {
    let mut fences = FenceTracker::default();
    let mut count = 0;

    for line in body.split('\n') {
        if fences.is_code(line) {
            continue;
        }
        let prose = INLINE_CODE_REGEX.replace_all(line, " ");
        for token in prose.split_whitespace() {
            let cjk = token.chars().filter(|&c| is_cjk(c)).count();
            let has_other = token.chars().any(|c| !is_cjk(c) && c.is_alphanumeric());
            count += cjk + usize::from(has_other);
        }
    }

    count
}

fn is_cjk(c: char) -> bool {
    ('\u{3040}'..='\u{30FF}').contains(&c) || ('\u{4E00}'..='\u{9FFF}').contains(&c)
}
