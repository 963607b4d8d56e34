/*!
 * Defensive extraction of the translated body from a model answer.
 *
 * Models occasionally wrap the document in a code fence or open with a
 * conversational sentence. Both are removed here, but only in ways that can
 * never cut into a document that legitimately starts with prose or a fence.
 */

use crate::errors::TranslationError;

/// Fence languages that mean "this whole block is the document"
const DOCUMENT_FENCE_LANGS: [&str; 3] = ["markdown", "md", "mdx"];

/// Maximum number of chatty lines tolerated before an enclosing fence
const MAX_PREAMBLE_LINES: usize = 2;

/// Turn a raw model answer into the translated body.
///
/// `source_body` is the prose that was sent; its shape decides which
/// clean-ups are safe and which surrounding newlines are restored.
pub fn extract_translation(raw: &str, source_body: &str) -> Result<String, TranslationError> {
    let unwrapped = unwrap_document_fence(raw, source_body);
    let trimmed = trim_preamble(&unwrapped, source_body);
    let content = trimmed.trim();

    if content.is_empty() {
        return Err(TranslationError::EmptyResult);
    }

    Ok(restore_edges(content, source_body))
}

fn first_non_empty_line(text: &str) -> Option<&str> {
    text.lines().map(str::trim).find(|line| !line.is_empty())
}

fn is_fence_line(line: &str) -> bool {
    line.starts_with("```") || line.starts_with("~~~")
}

fn is_structural_line(line: &str) -> bool {
    line.starts_with("---") || line.starts_with('#')
}

/// Opening fence marker plus its info string, if the line opens a fence
fn fence_open(line: &str) -> Option<(&str, &str)> {
    let marker = if line.starts_with("```") {
        "```"
    } else if line.starts_with("~~~") {
        "~~~"
    } else {
        return None;
    };
    Some((marker, line.trim_start_matches(marker.chars().next()?).trim()))
}

/// Remove a code fence enclosing the whole answer.
///
/// Accepted shapes: a `markdown`/`md`/`mdx` fence, optionally after a short
/// preamble, or a bare fence around the entire answer. Either way the closing
/// fence must be the last non-empty line. Nothing is unwrapped when the
/// source itself opens with a fence.
fn unwrap_document_fence(raw: &str, source_body: &str) -> String {
    if first_non_empty_line(source_body).is_some_and(is_fence_line) {
        return raw.to_string();
    }

    let lines: Vec<&str> = raw.lines().collect();
    let non_empty: Vec<usize> = (0..lines.len())
        .filter(|&i| !lines[i].trim().is_empty())
        .collect();

    let Some(&last) = non_empty.last() else {
        return raw.to_string();
    };

    for (rank, &open) in non_empty.iter().enumerate() {
        if rank > MAX_PREAMBLE_LINES || open >= last {
            break;
        }

        let line = lines[open].trim();
        if rank > 0 && is_structural_line(line) {
            break;
        }

        let Some((marker, lang)) = fence_open(line) else {
            continue;
        };

        let tagged = DOCUMENT_FENCE_LANGS.contains(&lang.to_lowercase().as_str());
        let bare = lang.is_empty() && rank == 0;
        if !(tagged || bare) {
            break;
        }

        if lines[last].trim() != marker {
            break;
        }

        return lines[open + 1..last].join("\n");
    }

    raw.to_string()
}

/// Drop conversational lines before the first structural line.
///
/// Only applied when the source body itself opens with a structural line.
fn trim_preamble(text: &str, source_body: &str) -> String {
    if !first_non_empty_line(source_body).is_some_and(is_structural_line) {
        return text.to_string();
    }

    let lines: Vec<&str> = text.lines().collect();
    match lines.iter().position(|line| is_structural_line(line.trim_start())) {
        Some(start) => lines[start..].join("\n"),
        None => text.to_string(),
    }
}

/// Put back the blank lines the source started with and its trailing newline
fn restore_edges(content: &str, source_body: &str) -> String {
    let is_newline = |c: char| c == '\n' || c == '\r';
    let leading_len = source_body.len() - source_body.trim_start_matches(is_newline).len();
    let trailing_len = source_body.len() - source_body.trim_end_matches(is_newline).len();

    let mut result = String::with_capacity(content.len() + leading_len + trailing_len);
    result.push_str(&source_body[..leading_len]);
    result.push_str(content);
    if leading_len < source_body.len() {
        result.push_str(&source_body[source_body.len() - trailing_len..]);
    }
    result
}
