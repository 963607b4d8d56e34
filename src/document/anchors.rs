/*!
 * Anchor reconciliation between a source body and its translation.
 *
 * Translation changes heading text and therefore every anchor identifier.
 * Reconciliation pairs source headings with translated headings in two
 * passes (by position, then per level in order) and the resulting mapping
 * is used to rewrite `[label](#anchor)` links in the translated body.
 */

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};

use super::headings::{FenceTracker, Heading, extract_headings};

/// `[label](#anchor)`
static ANCHOR_LINK_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[([^\]]*)\]\(#([^)]+)\)").unwrap());

/// Source anchor -> translated anchor, first assignment wins
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnchorMapping {
    targets_by_source: HashMap<String, String>,
    targets: HashSet<String>,
    order: Vec<String>,
}

impl AnchorMapping {
    /// Create an empty mapping
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `source -> target` unless `source` is already mapped.
    /// Returns whether the pair was recorded.
    pub fn insert_if_absent(&mut self, source: &str, target: &str) -> bool {
        if self.targets_by_source.contains_key(source) {
            return false;
        }
        self.targets_by_source.insert(source.to_string(), target.to_string());
        self.targets.insert(target.to_string());
        self.order.push(source.to_string());
        true
    }

    /// Target for a source anchor
    pub fn get(&self, source: &str) -> Option<&str> {
        self.targets_by_source.get(source).map(String::as_str)
    }

    /// Whether the source anchor is mapped
    pub fn contains_source(&self, source: &str) -> bool {
        self.targets_by_source.contains_key(source)
    }

    /// Whether some source anchor maps to this target
    pub fn contains_target(&self, target: &str) -> bool {
        self.targets.contains(target)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.order
            .iter()
            .filter_map(|source| self.get(source).map(|target| (source.as_str(), target)))
    }
}

/// Outcome of reconciling two heading sequences
#[derive(Debug, Clone, Default)]
pub struct Reconciliation {
    pub mapping: AnchorMapping,
    /// Source headings whose anchor stayed unmapped
    pub unmapped_source: Vec<Heading>,
    /// Translated headings no source anchor maps to
    pub unmapped_translated: Vec<Heading>,
    /// Pairs found by the positional pass
    pub positional_matches: usize,
    /// Pairs found by the per-level fallback pass
    pub fallback_matches: usize,
}

/// Internal link whose anchor could not be resolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnresolvedAnchor {
    pub anchor: String,
    pub label: String,
    /// Zero-based line index
    pub line: usize,
}

/// Result of rewriting the links of a body
#[derive(Debug, Clone, Default)]
pub struct LinkRewrite {
    pub body: String,
    /// Number of links pointed at a new anchor
    pub rewritten: usize,
    pub unresolved: Vec<UnresolvedAnchor>,
}

fn try_map(mapping: &mut AnchorMapping, source: &Heading, translated: &Heading) -> bool {
    if source.anchor_id.is_empty() || translated.anchor_id.is_empty() {
        return false;
    }
    mapping.insert_if_absent(&source.anchor_id, &translated.anchor_id)
}

/// Pair source headings with translated headings.
///
/// 1. Positional: index `i` on both sides with equal levels.
/// 2. Fallback: still-unmapped source headings and still-unclaimed
///    translated headings, grouped by level, paired in order.
///
/// Headings with an empty anchor are never paired.
pub fn reconcile(source: &[Heading], translated: &[Heading]) -> Reconciliation {
    let mut mapping = AnchorMapping::new();
    let mut positional_matches = 0;
    let mut fallback_matches = 0;

    for (s, t) in source.iter().zip(translated) {
        if s.level == t.level && try_map(&mut mapping, s, t) {
            positional_matches += 1;
        }
    }

    let mut source_by_level: BTreeMap<u8, Vec<&Heading>> = BTreeMap::new();
    for heading in source.iter().filter(|h| !mapping.contains_source(&h.anchor_id)) {
        source_by_level.entry(heading.level).or_default().push(heading);
    }

    let mut translated_by_level: BTreeMap<u8, Vec<&Heading>> = BTreeMap::new();
    for heading in translated.iter().filter(|h| !mapping.contains_target(&h.anchor_id)) {
        translated_by_level.entry(heading.level).or_default().push(heading);
    }

    for (level, sources) in &source_by_level {
        let Some(candidates) = translated_by_level.get(level) else {
            continue;
        };
        for (s, t) in sources.iter().zip(candidates) {
            if try_map(&mut mapping, s, t) {
                fallback_matches += 1;
            }
        }
    }

    let unmapped_source = source
        .iter()
        .filter(|h| !mapping.contains_source(&h.anchor_id))
        .cloned()
        .collect();
    let unmapped_translated = translated
        .iter()
        .filter(|h| !mapping.contains_target(&h.anchor_id))
        .cloned()
        .collect();

    Reconciliation {
        mapping,
        unmapped_source,
        unmapped_translated,
        positional_matches,
        fallback_matches,
    }
}

/// Rewrite `[label](#anchor)` links whose anchor is a mapping key.
///
/// Other links are left as they are; those that do not already point at a
/// translated anchor are reported. Links inside fenced code are ignored.
pub fn rewrite_links(body: &str, mapping: &AnchorMapping) -> LinkRewrite {
    let mut fences = FenceTracker::default();
    let mut rewritten = 0;
    let mut unresolved = Vec::new();

    let lines: Vec<String> = body
        .split('\n')
        .enumerate()
        .map(|(line_index, line)| {
            if fences.is_code(line) {
                return line.to_string();
            }
            ANCHOR_LINK_REGEX
                .replace_all(line, |caps: &Captures| {
                    let label = &caps[1];
                    let anchor = &caps[2];
                    match mapping.get(anchor) {
                        Some(target) => {
                            if target != anchor {
                                rewritten += 1;
                            }
                            format!("[{}](#{})", label, target)
                        }
                        None => {
                            if !mapping.contains_target(anchor) {
                                unresolved.push(UnresolvedAnchor {
                                    anchor: anchor.to_string(),
                                    label: label.to_string(),
                                    line: line_index,
                                });
                            }
                            caps[0].to_string()
                        }
                    }
                })
                .into_owned()
        })
        .collect();

    LinkRewrite {
        body: lines.join("\n"),
        rewritten,
        unresolved,
    }
}

/// Internal links of a body that match none of its own headings
pub fn validate_links(body: &str) -> Vec<UnresolvedAnchor> {
    let anchors: HashSet<String> = extract_headings(body).into_iter().map(|h| h.anchor_id).collect();
    let mut fences = FenceTracker::default();
    let mut broken = Vec::new();

    for (line_index, line) in body.split('\n').enumerate() {
        if fences.is_code(line) {
            continue;
        }
        for caps in ANCHOR_LINK_REGEX.captures_iter(line) {
            if !anchors.contains(&caps[2]) {
                broken.push(UnresolvedAnchor {
                    anchor: caps[2].to_string(),
                    label: caps[1].to_string(),
                    line: line_index,
                });
            }
        }
    }

    broken
}

/// Heading and link counts of a body
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AnchorStats {
    pub headings: usize,
    pub anchor_links: usize,
    pub unique_anchors: usize,
    /// Index 0 holds level 1
    pub headings_per_level: [usize; 6],
}

/// Count headings, anchors and internal links
pub fn anchor_stats(body: &str) -> AnchorStats {
    let headings = extract_headings(body);
    let mut stats = AnchorStats {
        headings: headings.len(),
        unique_anchors: headings
            .iter()
            .map(|h| h.anchor_id.as_str())
            .collect::<HashSet<_>>()
            .len(),
        ..AnchorStats::default()
    };

    for heading in &headings {
        stats.headings_per_level[usize::from(heading.level) - 1] += 1;
    }

    let mut fences = FenceTracker::default();
    stats.anchor_links = body
        .split('\n')
        .filter(|line| !fences.is_code(line))
        .map(|line| ANCHOR_LINK_REGEX.find_iter(line).count())
        .sum();

    stats
}

/// One row of a mapping preview
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MappingPreview {
    pub level: u8,
    pub source_text: String,
    pub source_anchor: String,
    /// Translated anchor, if the heading was paired
    pub target_anchor: Option<String>,
}

/// Show how each source heading of a pair of bodies would be mapped
pub fn preview_mapping(source_body: &str, translated_body: &str) -> (Vec<MappingPreview>, Reconciliation) {
    let source = extract_headings(source_body);
    let translated = extract_headings(translated_body);
    let reconciliation = reconcile(&source, &translated);

    let rows = source
        .iter()
        .map(|h| MappingPreview {
            level: h.level,
            source_text: h.text.clone(),
            source_anchor: h.anchor_id.clone(),
            target_anchor: reconciliation.mapping.get(&h.anchor_id).map(str::to_string),
        })
        .collect();

    (rows, reconciliation)
}
