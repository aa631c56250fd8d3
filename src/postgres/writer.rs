// ABOUTME: ProblemWriter - applies normalized problem records to PostgreSQL
// ABOUTME: Uses multi-row INSERT ... ON CONFLICT (spreadsheet_row_id) DO UPDATE

use tokio_postgres::types::ToSql;
use tokio_postgres::GenericClient;

use crate::record::ProblemRecord;

/// Conflict key of the `problems` table.
pub const KEY_COLUMN: &str = "spreadsheet_row_id";

/// Columns written by an upsert, in parameter order.
pub const PROBLEM_COLUMNS: [&str; 12] = [
    "spreadsheet_row_id",
    "problem_name",
    "problem_type",
    "difficulty_level",
    "problem_link",
    "problem_html_link",
    "completion_time_minutes",
    "solution_link",
    "solution_runtime_complexity",
    "solution_space_complexity",
    "complexity_explanation",
    "found_optimal_solution",
];

// PostgreSQL allows at most 65535 bind parameters per statement.
const MAX_PARAMS: usize = 65_000;

/// Writes problem records with upsert statements.
///
/// The writer does not manage transactions; hand it a transaction to make a
/// multi-chunk batch atomic.
pub struct ProblemWriter<'a, C> {
    client: &'a C,
}

impl<'a, C> ProblemWriter<'a, C>
where
    C: GenericClient + Sync,
{
    pub fn new(client: &'a C) -> Self {
        Self { client }
    }

    /// Upsert every record, keyed on `spreadsheet_row_id`.
    ///
    /// Conflicting rows have every non-key column overwritten; the surrogate
    /// `id` is left untouched. Returns the number of rows affected.
    pub async fn upsert(&self, records: &[ProblemRecord]) -> Result<u64, tokio_postgres::Error> {
        if records.is_empty() {
            return Ok(0);
        }

        let batch_size = std::cmp::max(1, MAX_PARAMS / PROBLEM_COLUMNS.len());
        let mut total_affected = 0u64;

        for chunk in records.chunks(batch_size) {
            let query = build_upsert_query("problems", chunk.len());
            let params: Vec<&(dyn ToSql + Sync)> =
                chunk.iter().flat_map(record_params).collect();

            let affected = self.client.execute(query.as_str(), &params).await?;
            tracing::debug!("Upserted {} problem rows", affected);
            total_affected += affected;
        }

        Ok(total_affected)
    }
}

/// Bind parameters for one record, in [`PROBLEM_COLUMNS`] order.
fn record_params(record: &ProblemRecord) -> [&(dyn ToSql + Sync); 12] {
    [
        &record.spreadsheet_row_id,
        &record.problem_name,
        &record.problem_type,
        &record.difficulty_level,
        &record.problem_link,
        &record.problem_html_link,
        &record.completion_time_minutes,
        &record.solution_link,
        &record.solution_runtime_complexity,
        &record.solution_space_complexity,
        &record.complexity_explanation,
        &record.found_optimal_solution,
    ]
}

/// Build an upsert query for the problems table and batch size.
///
/// Generates a query like:
/// ```sql
/// INSERT INTO "problems" ("spreadsheet_row_id", "problem_name", ...)
/// VALUES ($1, $2, ...), ($13, $14, ...)
/// ON CONFLICT ("spreadsheet_row_id") DO UPDATE SET
///   "problem_name" = EXCLUDED."problem_name", ...
/// ```
fn build_upsert_query(table: &str, num_rows: usize) -> String {
    let quoted_columns: Vec<String> = PROBLEM_COLUMNS
        .iter()
        .map(|c| format!("\"{}\"", c))
        .collect();

    let num_cols = PROBLEM_COLUMNS.len();
    let value_rows: Vec<String> = (0..num_rows)
        .map(|row_idx| {
            let placeholders: Vec<String> = (0..num_cols)
                .map(|col_idx| format!("${}", row_idx * num_cols + col_idx + 1))
                .collect();
            format!("({})", placeholders.join(", "))
        })
        .collect();

    let update_columns: Vec<String> = PROBLEM_COLUMNS
        .iter()
        .filter(|c| **c != KEY_COLUMN)
        .map(|c| format!("\"{}\" = EXCLUDED.\"{}\"", c, c))
        .collect();

    format!(
        "INSERT INTO \"{}\" ({}) VALUES {} ON CONFLICT (\"{}\") DO UPDATE SET {}",
        table,
        quoted_columns.join(", "),
        value_rows.join(", "),
        KEY_COLUMN,
        update_columns.join(", ")
    )
}
