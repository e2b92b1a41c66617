//! Tag-based applicant/job matching: hash tables over skill tags, a weighted
//! coverage score, and stable null-last record sorting, served over axum.

pub mod config;
pub mod db;
pub mod errors;
pub mod hashing;
pub mod matching;
pub mod models;
pub mod routes;
pub mod sorting;
pub mod state;
