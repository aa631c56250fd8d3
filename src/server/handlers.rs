// ABOUTME: Request handlers for the problems API
// ABOUTME: Create, filtered list, lookup by id and case-insensitive name search

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use super::error::ApiError;
use super::AppState;
use crate::store::{NewProblem, Problem, ProblemFilter};

#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedProblem {
    pub id: i32,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub problem_name: String,
}

/// `POST /problems/`
pub async fn create_problem(
    State(state): State<AppState>,
    Json(problem): Json<NewProblem>,
) -> Result<Json<CreatedProblem>, ApiError> {
    problem.validate().map_err(ApiError::Validation)?;

    let id = state.repo.create(&problem).await.map_err(|e| {
        tracing::warn!("Error occurred in POST /problems/: {}", e);
        ApiError::from(e)
    })?;

    tracing::info!(
        "Created problem {} for spreadsheet row {}",
        id,
        problem.spreadsheet_row_id
    );
    Ok(Json(CreatedProblem { id }))
}

/// `GET /problems/?difficulty_level=&problem_type=`
pub async fn list_problems(
    State(state): State<AppState>,
    Query(filter): Query<ProblemFilter>,
) -> Result<Json<Vec<Problem>>, ApiError> {
    let problems = state.repo.list(&filter).await?;
    Ok(Json(problems))
}

/// `GET /problems/{id}`
pub async fn get_problem(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Problem>, ApiError> {
    match state.repo.get(id).await? {
        Some(problem) => Ok(Json(problem)),
        None => Err(ApiError::NotFound),
    }
}

/// `GET /problems/search/?problem_name=`
pub async fn search_problems(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Problem>>, ApiError> {
    let problems = state.repo.search_by_name(&params.problem_name).await?;
    if problems.is_empty() {
        return Err(ApiError::NotFound);
    }
    Ok(Json(problems))
}
