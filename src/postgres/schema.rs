// ABOUTME: DDL for the problems table
// ABOUTME: Idempotent creation of the table, its uniqueness key and lookup indexes

use anyhow::{Context, Result};
use tokio_postgres::GenericClient;

/// Statements creating the `problems` table if it does not exist.
///
/// The `UNIQUE` constraint on `spreadsheet_row_id` is the conflict target of
/// the sync upsert and the guard against duplicate API creates.
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS problems (
    id                          SERIAL PRIMARY KEY,
    spreadsheet_row_id          INTEGER NOT NULL UNIQUE CHECK (spreadsheet_row_id > 0),
    problem_name                TEXT NOT NULL,
    problem_type                TEXT NOT NULL,
    difficulty_level            TEXT NOT NULL,
    problem_link                TEXT NOT NULL,
    problem_html_link           TEXT,
    completion_time_minutes     INTEGER NOT NULL DEFAULT 0 CHECK (completion_time_minutes >= 0),
    solution_link               TEXT,
    solution_runtime_complexity TEXT,
    solution_space_complexity   TEXT,
    complexity_explanation      TEXT,
    found_optimal_solution      BOOLEAN NOT NULL DEFAULT FALSE
);
CREATE INDEX IF NOT EXISTS problems_difficulty_level_idx ON problems (difficulty_level);
CREATE INDEX IF NOT EXISTS problems_problem_type_idx ON problems (problem_type);
"#;

/// Create the `problems` table and its indexes when missing.
pub async fn ensure_schema<C>(client: &C) -> Result<()>
where
    C: GenericClient + Sync,
{
    tracing::info!("Ensuring 'problems' table exists");
    client
        .batch_execute(SCHEMA_SQL)
        .await
        .context("Failed to create 'problems' table")?;
    Ok(())
}
