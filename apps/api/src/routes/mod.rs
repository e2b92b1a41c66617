pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::matching::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Ad-hoc matching over request bodies
        .route("/api/v1/match/score", post(handlers::handle_match_score))
        .route("/api/v1/match/details", post(handlers::handle_match_details))
        .route(
            "/api/v1/match/table-stats",
            post(handlers::handle_table_stats),
        )
        // Matching over stored applicants and jobs
        .route(
            "/api/v1/matching/applicant/:id/jobs",
            get(handlers::handle_jobs_for_applicant),
        )
        .route(
            "/api/v1/matching/job/:id/applicants",
            get(handlers::handle_applicants_for_job),
        )
        .route(
            "/api/v1/matching/applicant/:aid/job/:jid/details",
            get(handlers::handle_pair_details),
        )
        // Stored match listings
        .route(
            "/api/v1/job-matches/sorted",
            get(handlers::handle_sorted_matches),
        )
        .route(
            "/api/v1/job-matches/applicant/:id/sorted",
            get(handlers::handle_sorted_matches_for_applicant),
        )
        .route(
            "/api/v1/job-matches/job/:id/sorted",
            get(handlers::handle_sorted_matches_for_job),
        )
        // Tag vocabulary
        .route("/api/v1/tags/hash/:name", get(handlers::handle_tag_hash))
        .route("/api/v1/tags/refresh", post(handlers::handle_tag_refresh))
        .with_state(state)
}
