// ABOUTME: Library root for problem-sync
// ABOUTME: Spreadsheet change sync into PostgreSQL plus the problems HTTP API

pub mod config;
pub mod error;
pub mod postgres;
pub mod ranges;
pub mod record;
pub mod scrape;
pub mod server;
pub mod sheets;
pub mod store;
pub mod sync;
pub mod utils;

pub use error::SyncError;
pub use record::ProblemRecord;
pub use sync::{SyncPipeline, SyncReport, SyncStatus};
