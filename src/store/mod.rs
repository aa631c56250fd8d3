// ABOUTME: Storage seams for the problems table
// ABOUTME: ProblemSink feeds the sync pipeline, ProblemRepository backs the HTTP API

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::record::ProblemRecord;

/// Errors surfaced by a problems store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No connection could be obtained from the pool.
    #[error("failed to acquire database connection")]
    Pool(#[from] deadpool_postgres::PoolError),

    #[error("database query failed")]
    Query(#[from] tokio_postgres::Error),

    /// A row with this `spreadsheet_row_id` already exists.
    #[error("spreadsheet_row_id {0} already exists")]
    DuplicateRowId(i32),
}

/// A persisted row of the `problems` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Problem {
    pub id: i32,
    pub spreadsheet_row_id: i32,
    pub problem_name: String,
    pub problem_type: String,
    pub difficulty_level: String,
    pub problem_link: String,
    pub problem_html_link: Option<String>,
    pub completion_time_minutes: i32,
    pub solution_link: Option<String>,
    pub solution_runtime_complexity: Option<String>,
    pub solution_space_complexity: Option<String>,
    pub complexity_explanation: Option<String>,
    pub found_optimal_solution: bool,
}

/// Body of a create request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProblem {
    pub spreadsheet_row_id: i32,
    pub problem_name: String,
    pub problem_type: String,
    pub difficulty_level: String,
    pub problem_link: String,
    #[serde(default)]
    pub problem_html_link: Option<String>,
    #[serde(default)]
    pub solution_link: Option<String>,
    #[serde(default)]
    pub completion_time_minutes: Option<i32>,
    #[serde(default)]
    pub solution_runtime_complexity: Option<String>,
    #[serde(default)]
    pub solution_space_complexity: Option<String>,
    #[serde(default)]
    pub complexity_explanation: Option<String>,
    #[serde(default)]
    pub found_optimal_solution: Option<bool>,
}

impl NewProblem {
    /// Check the field constraints the table enforces.
    ///
    /// Returns a human readable reason on failure.
    pub fn validate(&self) -> Result<(), String> {
        if self.spreadsheet_row_id <= 0 {
            return Err("spreadsheet_row_id must be a positive integer".to_string());
        }
        if matches!(self.completion_time_minutes, Some(minutes) if minutes < 0) {
            return Err("completion_time_minutes must be non-negative".to_string());
        }
        Ok(())
    }

    /// Materialize the row this request would create.
    pub fn into_problem(self, id: i32) -> Problem {
        Problem {
            id,
            spreadsheet_row_id: self.spreadsheet_row_id,
            problem_name: self.problem_name,
            problem_type: self.problem_type,
            difficulty_level: self.difficulty_level,
            problem_link: self.problem_link,
            problem_html_link: self.problem_html_link,
            completion_time_minutes: self.completion_time_minutes.unwrap_or(0),
            solution_link: self.solution_link,
            solution_runtime_complexity: self.solution_runtime_complexity,
            solution_space_complexity: self.solution_space_complexity,
            complexity_explanation: self.complexity_explanation,
            found_optimal_solution: self.found_optimal_solution.unwrap_or(false),
        }
    }
}

/// Optional equality filters for listing problems.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProblemFilter {
    pub difficulty_level: Option<String>,
    pub problem_type: Option<String>,
}

impl ProblemFilter {
    /// Filter values that are actually set; empty strings count as unset.
    pub fn difficulty_level(&self) -> Option<&str> {
        self.difficulty_level.as_deref().filter(|v| !v.is_empty())
    }

    pub fn problem_type(&self) -> Option<&str> {
        self.problem_type.as_deref().filter(|v| !v.is_empty())
    }

    pub fn matches(&self, problem: &Problem) -> bool {
        self.difficulty_level()
            .map_or(true, |d| problem.difficulty_level == d)
            && self.problem_type().map_or(true, |t| problem.problem_type == t)
    }
}

/// Destination of a sync run.
#[async_trait]
pub trait ProblemSink: Send + Sync {
    /// Insert or fully overwrite the given records, keyed on
    /// `spreadsheet_row_id`, atomically. Returns the number of rows written.
    async fn upsert_problems(&self, records: &[ProblemRecord]) -> Result<u64, StoreError>;
}

/// Read/create access used by the HTTP API.
#[async_trait]
pub trait ProblemRepository: Send + Sync {
    /// Insert a new row and return its generated id.
    ///
    /// Fails with [`StoreError::DuplicateRowId`] when the row id is taken.
    async fn create(&self, problem: &NewProblem) -> Result<i32, StoreError>;

    async fn list(&self, filter: &ProblemFilter) -> Result<Vec<Problem>, StoreError>;

    async fn get(&self, id: i32) -> Result<Option<Problem>, StoreError>;

    /// Case-insensitive substring match on `problem_name`.
    async fn search_by_name(&self, needle: &str) -> Result<Vec<Problem>, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_problem() -> NewProblem {
        NewProblem {
            spreadsheet_row_id: 3,
            problem_name: "Two Sum".to_string(),
            problem_type: "Arrays".to_string(),
            difficulty_level: "easy".to_string(),
            problem_link: "https://leetcode.com/problems/two-sum".to_string(),
            problem_html_link: None,
            solution_link: None,
            completion_time_minutes: None,
            solution_runtime_complexity: None,
            solution_space_complexity: None,
            complexity_explanation: None,
            found_optimal_solution: None,
        }
    }

    #[test]
    fn test_validate_accepts_minimal_body() {
        assert!(new_problem().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_non_positive_row_id() {
        let mut problem = new_problem();
        problem.spreadsheet_row_id = 0;
        assert!(problem.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_negative_minutes() {
        let mut problem = new_problem();
        problem.completion_time_minutes = Some(-1);
        assert!(problem.validate().is_err());
        problem.completion_time_minutes = Some(0);
        assert!(problem.validate().is_ok());
    }

    #[test]
    fn test_new_problem_defaults_optional_fields() {
        let body = r#"{
            "spreadsheet_row_id": 9,
            "problem_name": "LRU Cache",
            "problem_type": "Design",
            "difficulty_level": "medium",
            "problem_link": "https://leetcode.com/problems/lru-cache"
        }"#;
        let parsed: NewProblem = serde_json::from_str(body).unwrap();
        let problem = parsed.into_problem(1);
        assert_eq!(problem.completion_time_minutes, 0);
        assert!(!problem.found_optimal_solution);
        assert!(problem.solution_link.is_none());
    }

    #[test]
    fn test_filter_ignores_empty_values() {
        let filter = ProblemFilter {
            difficulty_level: Some(String::new()),
            problem_type: Some("Arrays".to_string()),
        };
        assert_eq!(filter.difficulty_level(), None);
        assert_eq!(filter.problem_type(), Some("Arrays"));
    }
}
