// ABOUTME: SyncPipeline - reconciles edited spreadsheet rows into the problems table
// ABOUTME: Tracker markers -> compacted ranges -> one batch fetch -> normalize -> upsert -> clear

use std::time::Instant;

use crate::config::SyncSettings;
use crate::error::SyncError;
use crate::ranges::{compact_ranges, RowRange};
use crate::record::{dedup_by_row_id, is_blank_row, ProblemRecord};
use crate::sheets::{CellGrid, Spreadsheet};
use crate::store::ProblemSink;

/// How a sync run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStatus {
    /// The tracker was empty; nothing was read or written.
    NoChanges,
    /// Markers were consumed and the tracker was cleared.
    Applied,
}

/// Statistics from one sync run.
#[derive(Debug, Clone)]
pub struct SyncReport {
    pub status: SyncStatus,
    /// Tracker entries read, duplicates included
    pub markers_read: usize,
    /// Distinct rows named by the tracker
    pub distinct_rows: usize,
    pub ranges: Vec<RowRange>,
    /// Rows actually returned by the spreadsheet
    pub rows_fetched: usize,
    /// Returned rows dropped as header or blank
    pub rows_skipped: usize,
    pub records_upserted: usize,
    pub duration_ms: u64,
}

impl SyncReport {
    fn no_changes(start: Instant) -> Self {
        Self {
            status: SyncStatus::NoChanges,
            markers_read: 0,
            distinct_rows: 0,
            ranges: Vec::new(),
            rows_fetched: 0,
            rows_skipped: 0,
            records_upserted: 0,
            duration_ms: start.elapsed().as_millis() as u64,
        }
    }
}

/// Records built from fetched blocks, with bookkeeping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedRows {
    pub records: Vec<ProblemRecord>,
    pub rows_fetched: usize,
    pub rows_skipped: usize,
}

/// One sync run over a spreadsheet and a problem sink.
///
/// The run:
/// 1. Reads the change tracker (a no-op when it is empty)
/// 2. Compacts the edited row numbers into ranges
/// 3. Fetches every range in one batched call
/// 4. Normalizes, deduplicates and upserts the rows
/// 5. Clears the tracker, only after the upsert committed
pub struct SyncPipeline<'a> {
    sheets: &'a dyn Spreadsheet,
    sink: &'a dyn ProblemSink,
    settings: &'a SyncSettings,
}

impl<'a> SyncPipeline<'a> {
    pub fn new(
        sheets: &'a dyn Spreadsheet,
        sink: &'a dyn ProblemSink,
        settings: &'a SyncSettings,
    ) -> Self {
        Self {
            sheets,
            sink,
            settings,
        }
    }

    pub async fn run(&self) -> Result<SyncReport, SyncError> {
        let start = Instant::now();
        let settings = self.settings;
        let tracker_range = settings.tracker_data_range();

        tracing::info!("Fetching changed row indices from '{}'", settings.tracker_sheet);
        let entries = self
            .sheets
            .column_values(&settings.tracker_sheet, &tracker_range)
            .await
            .map_err(|e| SyncError::connection("reading the change tracker", e))?;

        if entries.is_empty() {
            tracing::info!("No changes detected");
            return Ok(SyncReport::no_changes(start));
        }

        let markers = parse_markers(&entries, settings.header_row.saturating_add(1))?;
        tracing::info!("Changed rows detected: {:?}", markers);

        let ranges = compact_ranges(&markers);
        let distinct_rows: usize = ranges.iter().map(RowRange::len).sum();
        tracing::info!(
            "Grouped {} distinct rows into {} ranges: {}",
            distinct_rows,
            ranges.len(),
            ranges
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        );

        let a1_ranges: Vec<String> = ranges
            .iter()
            .map(|r| r.to_a1(&settings.first_column, &settings.last_column))
            .collect();
        tracing::info!("Batch ranges to fetch: {:?}", a1_ranges);

        let grids = self
            .sheets
            .batch_get(&settings.problems_sheet, &a1_ranges)
            .await
            .map_err(|e| SyncError::connection("fetching changed rows", e))?;

        if grids.len() != ranges.len() {
            return Err(SyncError::connection(
                "fetching changed rows",
                anyhow::anyhow!(
                    "spreadsheet returned {} blocks for {} ranges",
                    grids.len(),
                    ranges.len()
                ),
            ));
        }

        let normalized = normalize_blocks(&ranges, grids, settings.header_row);
        tracing::info!(
            "Prepared {} rows for database insertion ({} fetched, {} skipped)",
            normalized.records.len(),
            normalized.rows_fetched,
            normalized.rows_skipped
        );

        let records = dedup_by_row_id(normalized.records);
        tracing::info!("Final number of rows to upsert: {}", records.len());

        if records.is_empty() {
            tracing::info!("No rows to upsert. Skipping database update");
        } else {
            self.sink.upsert_problems(&records).await?;
            tracing::info!("Rows successfully inserted/updated");
        }

        self.sheets
            .batch_clear(&settings.tracker_sheet, &[tracker_range])
            .await
            .map_err(|e| SyncError::connection("clearing the change tracker", e))?;
        tracing::info!("Cleared change tracker. Sync complete");

        Ok(SyncReport {
            status: SyncStatus::Applied,
            markers_read: entries.len(),
            distinct_rows,
            ranges,
            rows_fetched: normalized.rows_fetched,
            rows_skipped: normalized.rows_skipped,
            records_upserted: records.len(),
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }
}

/// Parse tracker entries into row numbers.
///
/// `first_row` is the sheet row of the first entry and is only used for
/// error reporting. Any entry that is not a positive integer (blank entries
/// included) rejects the whole batch.
pub fn parse_markers(entries: &[String], first_row: u32) -> Result<Vec<u32>, SyncError> {
    entries
        .iter()
        .enumerate()
        .map(|(idx, entry)| {
            entry
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|row| *row > 0 && i32::try_from(*row).is_ok())
                .ok_or_else(|| {
                    tracing::error!("Error parsing row indices from change tracker");
                    SyncError::MalformedInput {
                        tracker_row: first_row.saturating_add(idx as u32),
                        value: entry.clone(),
                    }
                })
        })
        .collect()
}

/// Turn fetched blocks into problem records.
///
/// Each block belongs to the range at the same position; its rows are
/// numbered from the range start. The header row, and rows that are missing
/// or entirely blank, produce no record.
pub fn normalize_blocks(ranges: &[RowRange], grids: Vec<CellGrid>, header_row: u32) -> NormalizedRows {
    let mut out = NormalizedRows::default();

    for (range, grid) in ranges.iter().zip(grids) {
        for (row_number, cells) in range.rows().zip(grid) {
            out.rows_fetched += 1;

            if row_number == header_row || is_blank_row(&cells) {
                tracing::debug!("Skipping header or empty row at index {}", row_number);
                out.rows_skipped += 1;
                continue;
            }

            let Ok(row_id) = i32::try_from(row_number) else {
                tracing::warn!("Row index {} does not fit the row id column", row_number);
                out.rows_skipped += 1;
                continue;
            };

            out.records.push(ProblemRecord::from_cells(row_id, &cells));
        }
    }

    out
}
