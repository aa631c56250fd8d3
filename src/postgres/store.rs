// ABOUTME: PostgreSQL implementation of the problem sink and repository
// ABOUTME: One pooled connection per operation, released when the operation ends

use async_trait::async_trait;
use deadpool_postgres::Pool;
use tokio_postgres::error::SqlState;
use tokio_postgres::types::ToSql;
use tokio_postgres::{Client, Row};

use super::writer::ProblemWriter;
use crate::config::DatabaseConfig;
use crate::record::ProblemRecord;
use crate::store::{NewProblem, Problem, ProblemFilter, ProblemRepository, ProblemSink, StoreError};
use crate::utils::escape_like_pattern;

const SELECT_COLUMNS: &str = "id, spreadsheet_row_id, problem_name, problem_type, difficulty_level, \
     problem_link, problem_html_link, completion_time_minutes, solution_link, \
     solution_runtime_complexity, solution_space_complexity, complexity_explanation, \
     found_optimal_solution";

const INSERT_SQL: &str = "INSERT INTO problems \
     (spreadsheet_row_id, problem_name, problem_type, difficulty_level, problem_link, \
      problem_html_link, solution_link, completion_time_minutes, \
      solution_runtime_complexity, solution_space_complexity, complexity_explanation, \
      found_optimal_solution) \
     VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
     RETURNING id";

/// The `problems` table behind a connection pool.
///
/// Cloning is cheap; clones share the pool.
#[derive(Clone)]
pub struct PgProblemStore {
    pool: Pool,
}

impl PgProblemStore {
    /// Build the pool and check connectivity once.
    pub async fn connect(config: &DatabaseConfig) -> anyhow::Result<Self> {
        let pool = super::create_pool(config).await?;
        Ok(Self { pool })
    }

    /// Build the pool but defer connecting until the first operation.
    ///
    /// Used by the sync job, which only needs the database once it has
    /// changed rows to write.
    pub fn lazy(config: &DatabaseConfig) -> anyhow::Result<Self> {
        Ok(Self::from_pool(super::build_pool(config)?))
    }

    pub fn from_pool(pool: Pool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &Pool {
        &self.pool
    }

    /// Create the `problems` table if it is missing.
    pub async fn ensure_schema(&self) -> anyhow::Result<()> {
        let client = self.pool.get().await.map_err(StoreError::from)?;
        let client: &Client = &client;
        super::ensure_schema(client).await
    }
}

#[async_trait]
impl ProblemSink for PgProblemStore {
    async fn upsert_problems(&self, records: &[ProblemRecord]) -> Result<u64, StoreError> {
        if records.is_empty() {
            return Ok(0);
        }

        let mut client = self.pool.get().await?;
        let tx = client.transaction().await?;

        let result = ProblemWriter::new(&*tx).upsert(records).await;

        match result {
            Ok(affected) => {
                tx.commit().await?;
                tracing::info!("Committed upsert of {} problem rows", affected);
                Ok(affected)
            }
            Err(e) => {
                tracing::error!("Upsert failed, rolling back: {}", e);
                if let Err(rollback_err) = tx.rollback().await {
                    tracing::warn!("Rollback after failed upsert also failed: {}", rollback_err);
                }
                Err(StoreError::Query(e))
            }
        }
    }
}

#[async_trait]
impl ProblemRepository for PgProblemStore {
    async fn create(&self, problem: &NewProblem) -> Result<i32, StoreError> {
        let client = self.pool.get().await?;

        let completion_time = problem.completion_time_minutes.unwrap_or(0);
        let found_optimal = problem.found_optimal_solution.unwrap_or(false);

        let row = client
            .query_one(
                INSERT_SQL,
                &[
                    &problem.spreadsheet_row_id,
                    &problem.problem_name,
                    &problem.problem_type,
                    &problem.difficulty_level,
                    &problem.problem_link,
                    &problem.problem_html_link,
                    &problem.solution_link,
                    &completion_time,
                    &problem.solution_runtime_complexity,
                    &problem.solution_space_complexity,
                    &problem.complexity_explanation,
                    &found_optimal,
                ],
            )
            .await
            .map_err(|e| {
                if e.code() == Some(&SqlState::UNIQUE_VIOLATION) {
                    StoreError::DuplicateRowId(problem.spreadsheet_row_id)
                } else {
                    StoreError::Query(e)
                }
            })?;

        Ok(row.try_get("id")?)
    }

    async fn list(&self, filter: &ProblemFilter) -> Result<Vec<Problem>, StoreError> {
        let client = self.pool.get().await?;

        let difficulty = filter.difficulty_level();
        let problem_type = filter.problem_type();

        let mut query = format!("SELECT {} FROM problems WHERE TRUE", SELECT_COLUMNS);
        let mut params: Vec<&(dyn ToSql + Sync)> = Vec::new();
        if let Some(difficulty) = &difficulty {
            params.push(difficulty);
            query.push_str(&format!(" AND difficulty_level = ${}", params.len()));
        }
        if let Some(problem_type) = &problem_type {
            params.push(problem_type);
            query.push_str(&format!(" AND problem_type = ${}", params.len()));
        }
        query.push_str(" ORDER BY id");

        let rows = client.query(query.as_str(), &params).await?;
        rows.iter().map(problem_from_row).collect()
    }

    async fn get(&self, id: i32) -> Result<Option<Problem>, StoreError> {
        let client = self.pool.get().await?;
        let query = format!("SELECT {} FROM problems WHERE id = $1", SELECT_COLUMNS);
        let row = client.query_opt(query.as_str(), &[&id]).await?;
        row.as_ref().map(problem_from_row).transpose()
    }

    async fn search_by_name(&self, needle: &str) -> Result<Vec<Problem>, StoreError> {
        let client = self.pool.get().await?;
        let pattern = format!("%{}%", escape_like_pattern(needle));
        let query = format!(
            "SELECT {} FROM problems WHERE problem_name ILIKE $1 ORDER BY id",
            SELECT_COLUMNS
        );
        let rows = client.query(query.as_str(), &[&pattern]).await?;
        rows.iter().map(problem_from_row).collect()
    }
}

fn problem_from_row(row: &Row) -> Result<Problem, StoreError> {
    Ok(Problem {
        id: row.try_get("id")?,
        spreadsheet_row_id: row.try_get("spreadsheet_row_id")?,
        problem_name: row.try_get("problem_name")?,
        problem_type: row.try_get("problem_type")?,
        difficulty_level: row.try_get("difficulty_level")?,
        problem_link: row.try_get("problem_link")?,
        problem_html_link: row.try_get("problem_html_link")?,
        completion_time_minutes: row.try_get("completion_time_minutes")?,
        solution_link: row.try_get("solution_link")?,
        solution_runtime_complexity: row.try_get("solution_runtime_complexity")?,
        solution_space_complexity: row.try_get("solution_space_complexity")?,
        complexity_explanation: row.try_get("complexity_explanation")?,
        found_optimal_solution: row.try_get("found_optimal_solution")?,
    })
}
