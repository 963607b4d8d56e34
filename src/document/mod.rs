/*!
 * Markdown document model for translation.
 *
 * - `metadata`: front matter split/rewrite/reassemble and the translation notice
 * - `headings`: heading extraction and anchor identifiers
 * - `anchors`: source/translated anchor reconciliation and link rewriting
 * - `lint`: structural sanity checks and word counts
 */

pub mod anchors;
pub mod headings;
pub mod lint;
pub mod metadata;

// Re-export types used by other modules
pub use anchors::{
    AnchorMapping, AnchorStats, LinkRewrite, MappingPreview, Reconciliation, UnresolvedAnchor,
    anchor_stats, preview_mapping, reconcile, rewrite_links, validate_links,
};
pub use headings::{Heading, compute_anchor_id, extract_headings};
pub use lint::{LintIssue, count_words, introduced_issues, validate_markdown};
pub use metadata::{Banner, Document, MetadataRewrite, insert_banner, reassemble, rewrite_metadata, split};
