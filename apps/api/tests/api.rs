use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use match_api::config::Config;
use match_api::hashing::fnv1a;
use match_api::matching::store::InMemoryMatchStore;
use match_api::routes::build_router;
use match_api::state::AppState;

fn app() -> Router {
    let store = InMemoryMatchStore::new()
        .with_applicant(1, Some("Ada Lovelace"), ["Python", "React", "SQL", "JavaScript"])
        .with_applicant(2, Some("Alan Turing"), ["Python", "React", "Node.js"])
        .with_job(10, Some("Frontend Engineer"), ["Python", "React", "Node.js"])
        .with_job(11, Some("Data Analyst"), ["SQL", "Excel"])
        .with_application(1, 10)
        .with_application(2, 10);
    build_router(AppState::new(Config::default(), Arc::new(store)))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_health() {
    let (status, body) = send(&app(), get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_match_score_endpoint() {
    let request = post_json(
        "/api/v1/match/score",
        json!({
            "applicant_tags": ["Python", "React", "SQL", "JavaScript"],
            "job_tags": ["Python", "React", "Node.js"]
        }),
    );
    let (status, body) = send(&app(), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["score"], 62);
}

#[tokio::test]
async fn test_match_score_empty_side_is_zero() {
    let request = post_json(
        "/api/v1/match/score",
        json!({ "applicant_tags": [], "job_tags": ["Python"] }),
    );
    let (status, body) = send(&app(), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["score"], 0);
}

#[tokio::test]
async fn test_null_tag_is_rejected() {
    let request = post_json(
        "/api/v1/match/details",
        json!({ "applicant_tags": ["Python", null], "job_tags": ["Python"] }),
    );
    let (status, body) = send(&app(), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn test_match_details_endpoint() {
    let request = post_json(
        "/api/v1/match/details",
        json!({
            "applicant_tags": ["Python", "React", "SQL", "JavaScript"],
            "job_tags": ["Python", "React", "Node.js"]
        }),
    );
    let (status, body) = send(&app(), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["matched"], json!(["Python", "React"]));
    assert_eq!(body["unmatched_job"], json!(["Node.js"]));
    assert_eq!(body["applicant_coverage_pct"], 50.0);
}

#[tokio::test]
async fn test_table_stats_reports_rejections() {
    let request = post_json(
        "/api/v1/match/table-stats",
        json!({
            "tags": ["a", "b", "c", "d", "e"],
            "strategy": "linear_probing",
            "hash": "fnv1a",
            "table_size": 5
        }),
    );
    let (status, body) = send(&app(), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stats"]["entries"], 3);
    assert_eq!(body["stats"]["strategy"], "linear_probing");
    assert_eq!(body["rejected"], json!(["d", "e"]));
}

#[tokio::test]
async fn test_table_stats_rejects_zero_size() {
    let request = post_json(
        "/api/v1/match/table-stats",
        json!({ "tags": ["a"], "table_size": 0 }),
    );
    let (status, _) = send(&app(), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_jobs_for_applicant_then_sorted_listing() {
    let app = app();
    let (status, body) = send(&app, get("/api/v1/matching/applicant/1/jobs")).await;
    assert_eq!(status, StatusCode::OK);
    let scores: Vec<u64> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["match_score"].as_u64().unwrap())
        .collect();
    assert_eq!(scores, vec![62, 42]);

    let (status, body) = send(
        &app,
        get("/api/v1/job-matches/applicant/1/sorted?sort_by=job_id&descending=false"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let jobs: Vec<i64> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["job_id"].as_i64().unwrap())
        .collect();
    assert_eq!(jobs, vec![10, 11]);
}

#[tokio::test]
async fn test_unknown_ids_are_not_found() {
    let app = app();
    let (status, body) = send(&app, get("/api/v1/matching/applicant/999/jobs")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");

    let (status, _) = send(&app, get("/api/v1/matching/job/999/applicants")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, get("/api/v1/matching/applicant/1/job/999/details")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, all) = send(&app, get("/api/v1/job-matches/sorted")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(all.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_applicants_for_job() {
    let (status, body) = send(&app(), get("/api/v1/matching/job/10/applicants")).await;
    assert_eq!(status, StatusCode::OK);
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["applicant_id"], 2);
    assert_eq!(rows[0]["match_score"], 100);
    assert_eq!(rows[0]["applicant_name"], "Alan Turing");
    assert_eq!(rows[0]["skills"], json!(["Python", "React", "Node.js"]));
}

#[tokio::test]
async fn test_pair_details_reads_stored_score() {
    let app = app();
    let (_, before) = send(&app, get("/api/v1/matching/applicant/1/job/10/details")).await;
    assert_eq!(before["stored_score"], Value::Null);
    assert_eq!(before["details"]["score"], 62);

    send(&app, get("/api/v1/matching/job/10/applicants")).await;
    let (_, after) = send(&app, get("/api/v1/matching/applicant/1/job/10/details")).await;
    assert_eq!(after["stored_score"], 62.0);
}

#[tokio::test]
async fn test_sorted_matches_for_job() {
    let app = app();
    send(&app, get("/api/v1/matching/job/10/applicants")).await;
    let (status, body) = send(&app, get("/api/v1/job-matches/job/10/sorted")).await;
    assert_eq!(status, StatusCode::OK);
    let applicants: Vec<i64> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["applicant_id"].as_i64().unwrap())
        .collect();
    assert_eq!(applicants, vec![2, 1]);

    let (_, all) = send(&app, get("/api/v1/job-matches/sorted")).await;
    assert_eq!(all.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_tag_hash_lookup_and_refresh() {
    let app = app();
    let (status, body) = send(&app, get("/api/v1/tags/hash/Python")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["known"], true);
    assert_eq!(body["hash"], fnv1a("Python"));
    assert_eq!(body["vocabulary_size"], 6);

    let (_, unknown) = send(&app, get("/api/v1/tags/hash/Cobol")).await;
    assert_eq!(unknown["known"], false);
    assert_eq!(unknown["hash"], Value::Null);

    let (status, refreshed) = send(&app, post_json("/api/v1/tags/refresh", json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(refreshed["tags"], 6);
    assert_eq!(refreshed["builds"], 2);
}
