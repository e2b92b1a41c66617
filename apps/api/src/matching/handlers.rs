use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::errors::AppError;
use crate::hashing::cache::TagHashLookup;
use crate::hashing::{build_table, CollisionStrategy, HashAlgorithm, InsertOutcome, TableStats};
use crate::matching::service::SortSpec;
use crate::matching::tag_matcher::{validate_tags, MatchDetails, TagSide};
use crate::models::job_match::{JobMatchRecord, JobMatchRow, MatchFilter};
use crate::state::AppState;

/// Two raw tag lists. Elements are validated before anything is hashed.
#[derive(Debug, Deserialize)]
pub struct MatchTagsRequest {
    pub applicant_tags: Vec<Value>,
    pub job_tags: Vec<Value>,
}

#[derive(Debug, Serialize)]
pub struct MatchScoreResponse {
    pub score: u32,
}

#[derive(Debug, Deserialize)]
pub struct TableStatsRequest {
    pub tags: Vec<Value>,
    #[serde(default)]
    pub strategy: CollisionStrategy,
    #[serde(default)]
    pub hash: HashAlgorithm,
    pub table_size: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct TableStatsResponse {
    pub stats: TableStats,
    /// Tags the table had no room for.
    pub rejected: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct StoredMatchResponse {
    pub applicant_id: i64,
    pub job_id: i64,
    pub stored_score: Option<f64>,
    pub details: MatchDetails,
}

fn match_request(state: &AppState, req: &MatchTagsRequest) -> Result<MatchDetails, AppError> {
    let applicant = validate_tags(TagSide::Applicant, &req.applicant_tags)?;
    let job = validate_tags(TagSide::Job, &req.job_tags)?;
    Ok(state.matching.match_tags(&applicant, &job)?)
}

/// POST /api/v1/match/score
pub async fn handle_match_score(
    State(state): State<AppState>,
    Json(req): Json<MatchTagsRequest>,
) -> Result<Json<MatchScoreResponse>, AppError> {
    let details = match_request(&state, &req)?;
    Ok(Json(MatchScoreResponse {
        score: details.score,
    }))
}

/// POST /api/v1/match/details
pub async fn handle_match_details(
    State(state): State<AppState>,
    Json(req): Json<MatchTagsRequest>,
) -> Result<Json<MatchDetails>, AppError> {
    Ok(Json(match_request(&state, &req)?))
}

/// POST /api/v1/match/table-stats
pub async fn handle_table_stats(
    State(state): State<AppState>,
    Json(req): Json<TableStatsRequest>,
) -> Result<Json<TableStatsResponse>, AppError> {
    let tags = validate_tags(TagSide::Job, &req.tags)?;
    let size = req
        .table_size
        .unwrap_or(state.matching.matcher_config().table_size);
    if size == 0 {
        return Err(AppError::Validation(
            "table_size must be at least 1".to_string(),
        ));
    }

    let mut table = build_table(req.strategy, size, req.hash);
    let rejected = tags
        .into_iter()
        .filter(|tag| table.insert(tag) == InsertOutcome::Full)
        .collect();
    Ok(Json(TableStatsResponse {
        stats: table.stats(),
        rejected,
    }))
}

/// GET /api/v1/matching/applicant/:id/jobs
pub async fn handle_jobs_for_applicant(
    State(state): State<AppState>,
    Path(applicant_id): Path<i64>,
    Query(sort): Query<SortSpec>,
) -> Result<Json<Vec<JobMatchRecord>>, AppError> {
    let records = state.matching.jobs_for_applicant(applicant_id, &sort).await?;
    Ok(Json(records))
}

/// GET /api/v1/matching/job/:id/applicants
pub async fn handle_applicants_for_job(
    State(state): State<AppState>,
    Path(job_id): Path<i64>,
    Query(sort): Query<SortSpec>,
) -> Result<Json<Vec<JobMatchRecord>>, AppError> {
    let records = state.matching.applicants_for_job(job_id, &sort).await?;
    Ok(Json(records))
}

/// GET /api/v1/matching/applicant/:aid/job/:jid/details
pub async fn handle_pair_details(
    State(state): State<AppState>,
    Path((applicant_id, job_id)): Path<(i64, i64)>,
) -> Result<Json<StoredMatchResponse>, AppError> {
    let details = state
        .matching
        .calculate_match_details(applicant_id, job_id)
        .await?;
    let stored_score = state
        .matching
        .stored_match_score(applicant_id, job_id)
        .await?;
    Ok(Json(StoredMatchResponse {
        applicant_id,
        job_id,
        stored_score,
        details,
    }))
}

/// GET /api/v1/job-matches/sorted
pub async fn handle_sorted_matches(
    State(state): State<AppState>,
    Query(sort): Query<SortSpec>,
) -> Result<Json<Vec<JobMatchRow>>, AppError> {
    let rows = state
        .matching
        .sorted_job_matches(MatchFilter::All, &sort)
        .await?;
    Ok(Json(rows))
}

/// GET /api/v1/job-matches/applicant/:id/sorted
pub async fn handle_sorted_matches_for_applicant(
    State(state): State<AppState>,
    Path(applicant_id): Path<i64>,
    Query(sort): Query<SortSpec>,
) -> Result<Json<Vec<JobMatchRow>>, AppError> {
    let rows = state
        .matching
        .sorted_job_matches(MatchFilter::Applicant(applicant_id), &sort)
        .await?;
    Ok(Json(rows))
}

/// GET /api/v1/job-matches/job/:id/sorted
pub async fn handle_sorted_matches_for_job(
    State(state): State<AppState>,
    Path(job_id): Path<i64>,
    Query(sort): Query<SortSpec>,
) -> Result<Json<Vec<JobMatchRow>>, AppError> {
    let rows = state
        .matching
        .sorted_job_matches(MatchFilter::Job(job_id), &sort)
        .await?;
    Ok(Json(rows))
}

/// GET /api/v1/tags/hash/:name
pub async fn handle_tag_hash(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<TagHashLookup>, AppError> {
    let index = state.tag_cache.get(state.store.as_ref()).await?;
    Ok(Json(index.lookup(&name)))
}

/// POST /api/v1/tags/refresh
pub async fn handle_tag_refresh(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let index = state.tag_cache.refresh(state.store.as_ref()).await?;
    Ok(Json(json!({
        "status": "refreshed",
        "tags": index.len(),
        "builds": state.tag_cache.builds()
    })))
}
