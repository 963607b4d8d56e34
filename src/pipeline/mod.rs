/*!
 * Document pipeline.
 *
 * Runs split, translate, metadata rewrite, banner insertion, anchor
 * reconciliation and reassembly for each document of a batch.
 */

pub mod orchestrator;

pub use orchestrator::{
    BatchProgress, BatchReport, DocumentDiagnostics, DocumentFailure, DocumentPipeline, DocumentStats,
    PipelineConfig, PipelineStage, SourceDocument, TransformedDocument,
};
