//! Persistence collaborator for the matching service.
//!
//! The service only ever asks for tag names, job/applicant listings and the
//! stored score of a pair. `AppState` carries an `Arc<dyn MatchStore>`, so the
//! Postgres store and the in-memory store are interchangeable.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;

use crate::errors::AppError;
use crate::models::job_match::{ApplicantSummary, JobMatchRow, JobSummary, MatchFilter};

#[async_trait]
pub trait MatchStore: Send + Sync {
    /// Tag names held by an applicant, in storage order.
    async fn applicant_tags(&self, applicant_id: i64) -> Result<Vec<String>, AppError>;

    /// Tag names attached to a job, in storage order.
    async fn job_tags(&self, job_id: i64) -> Result<Vec<String>, AppError>;

    async fn applicant_exists(&self, applicant_id: i64) -> Result<bool, AppError>;

    async fn job_exists(&self, job_id: i64) -> Result<bool, AppError>;

    /// The whole tag vocabulary.
    async fn all_tag_names(&self) -> Result<Vec<String>, AppError>;

    async fn jobs(&self) -> Result<Vec<JobSummary>, AppError>;

    /// Applicants who applied to `job_id`.
    async fn applicants_for_job(&self, job_id: i64) -> Result<Vec<ApplicantSummary>, AppError>;

    /// Reads the stored score when `score` is `None`; otherwise writes it
    /// (insert or overwrite) and returns it.
    async fn get_or_store_match_score(
        &self,
        applicant_id: i64,
        job_id: i64,
        score: Option<f64>,
    ) -> Result<Option<f64>, AppError>;

    async fn job_matches(&self, filter: MatchFilter) -> Result<Vec<JobMatchRow>, AppError>;
}

// ────────────────────────────────────────────────────────────────────────────
// In-memory store
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct Tables {
    tags: BTreeSet<String>,
    applicant_tags: BTreeMap<i64, Vec<String>>,
    job_tags: BTreeMap<i64, Vec<String>>,
    jobs: BTreeMap<i64, JobSummary>,
    applicants: BTreeMap<i64, ApplicantSummary>,
    applications: BTreeSet<(i64, i64)>,
    scores: BTreeMap<(i64, i64), Option<f64>>,
}

/// A `MatchStore` backed by process memory. Used when no `DATABASE_URL` is
/// configured, and by tests.
#[derive(Debug, Default)]
pub struct InMemoryMatchStore {
    tables: RwLock<Tables>,
    tag_name_loads: AtomicUsize,
}

impl InMemoryMatchStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_applicant<S: Into<String>>(
        self,
        applicant_id: i64,
        full_name: Option<&str>,
        tags: impl IntoIterator<Item = S>,
    ) -> Self {
        {
            let mut t = self.write();
            let tags: Vec<String> = tags.into_iter().map(Into::into).collect();
            t.tags.extend(tags.iter().cloned());
            t.applicant_tags.insert(applicant_id, tags);
            t.applicants.insert(
                applicant_id,
                ApplicantSummary {
                    applicant_id,
                    full_name: full_name.map(str::to_string),
                },
            );
        }
        self
    }

    pub fn with_job<S: Into<String>>(
        self,
        job_id: i64,
        job_title: Option<&str>,
        tags: impl IntoIterator<Item = S>,
    ) -> Self {
        self.with_job_summary(JobSummary::new(job_id, job_title), tags)
    }

    /// Adds a job with its full listing fields.
    pub fn with_job_summary<S: Into<String>>(
        self,
        job: JobSummary,
        tags: impl IntoIterator<Item = S>,
    ) -> Self {
        {
            let mut t = self.write();
            let tags: Vec<String> = tags.into_iter().map(Into::into).collect();
            t.tags.extend(tags.iter().cloned());
            t.job_tags.insert(job.job_id, tags);
            t.jobs.insert(job.job_id, job);
        }
        self
    }

    pub fn with_application(self, applicant_id: i64, job_id: i64) -> Self {
        self.write().applications.insert((applicant_id, job_id));
        self
    }

    /// Adds a tag to the vocabulary without attaching it to anyone.
    pub fn add_tag(&self, name: &str) {
        self.write().tags.insert(name.to_string());
    }

    /// How many times the tag vocabulary has been read.
    pub fn tag_name_loads(&self) -> usize {
        self.tag_name_loads.load(Ordering::SeqCst)
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Tables> {
        self.tables.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Tables> {
        self.tables.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl MatchStore for InMemoryMatchStore {
    async fn applicant_tags(&self, applicant_id: i64) -> Result<Vec<String>, AppError> {
        Ok(self
            .read()
            .applicant_tags
            .get(&applicant_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn job_tags(&self, job_id: i64) -> Result<Vec<String>, AppError> {
        Ok(self.read().job_tags.get(&job_id).cloned().unwrap_or_default())
    }

    async fn applicant_exists(&self, applicant_id: i64) -> Result<bool, AppError> {
        Ok(self.read().applicants.contains_key(&applicant_id))
    }

    async fn job_exists(&self, job_id: i64) -> Result<bool, AppError> {
        Ok(self.read().jobs.contains_key(&job_id))
    }

    async fn all_tag_names(&self) -> Result<Vec<String>, AppError> {
        self.tag_name_loads.fetch_add(1, Ordering::SeqCst);
        Ok(self.read().tags.iter().cloned().collect())
    }

    async fn jobs(&self) -> Result<Vec<JobSummary>, AppError> {
        Ok(self.read().jobs.values().cloned().collect())
    }

    async fn applicants_for_job(&self, job_id: i64) -> Result<Vec<ApplicantSummary>, AppError> {
        let t = self.read();
        Ok(t.applications
            .iter()
            .filter(|(_, j)| *j == job_id)
            .map(|(a, _)| {
                t.applicants.get(a).cloned().unwrap_or(ApplicantSummary {
                    applicant_id: *a,
                    full_name: None,
                })
            })
            .collect())
    }

    async fn get_or_store_match_score(
        &self,
        applicant_id: i64,
        job_id: i64,
        score: Option<f64>,
    ) -> Result<Option<f64>, AppError> {
        let key = (applicant_id, job_id);
        match score {
            Some(value) => {
                self.write().scores.insert(key, Some(value));
                Ok(Some(value))
            }
            None => Ok(self.read().scores.get(&key).copied().flatten()),
        }
    }

    async fn job_matches(&self, filter: MatchFilter) -> Result<Vec<JobMatchRow>, AppError> {
        Ok(self
            .read()
            .scores
            .iter()
            .filter(|((a, j), _)| match filter {
                MatchFilter::All => true,
                MatchFilter::Applicant(id) => *a == id,
                MatchFilter::Job(id) => *j == id,
            })
            .map(|(&(applicant_id, job_id), &match_score)| JobMatchRow {
                applicant_id,
                job_id,
                match_score,
            })
            .collect())
    }
}
