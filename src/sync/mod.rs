// ABOUTME: Spreadsheet-to-PostgreSQL sync job
// ABOUTME: Re-exports the pipeline, its report and the pure normalization steps

pub mod pipeline;

pub use pipeline::{
    normalize_blocks, parse_markers, NormalizedRows, SyncPipeline, SyncReport, SyncStatus,
};
