//! Pulls tag lists from the store, runs the tag matcher
//! and orders bulk results with the sorting engine.

use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use tracing::{debug, info};

use crate::errors::AppError;
use crate::matching::store::MatchStore;
use crate::matching::tag_matcher::{MatchDetails, MatchError, MatcherConfig, TagMatcher};
use crate::models::job_match::{JobMatchRecord, JobMatchRow, MatchFilter};
use crate::sorting::{sort_records_with, SortAlgorithm, SortKey};

/// Sort key and direction for bulk listings.
///
/// Deserialises from the `sort_by` / `descending` query parameters; missing
/// parameters mean highest score first.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SortSpec {
    #[serde(default = "default_sort_key")]
    pub sort_by: String,
    #[serde(default = "default_descending")]
    pub descending: bool,
}

fn default_sort_key() -> String {
    "match_score".to_string()
}

fn default_descending() -> bool {
    true
}

impl Default for SortSpec {
    fn default() -> Self {
        Self {
            sort_by: default_sort_key(),
            descending: default_descending(),
        }
    }
}

impl SortSpec {
    pub fn new(sort_by: impl Into<String>, descending: bool) -> Self {
        Self {
            sort_by: sort_by.into(),
            descending,
        }
    }
}

pub struct MatchingService {
    store: Arc<dyn MatchStore>,
    config: MatcherConfig,
    sort_algorithm: SortAlgorithm,
}

impl MatchingService {
    pub fn new(store: Arc<dyn MatchStore>) -> Self {
        Self {
            store,
            config: MatcherConfig::default(),
            sort_algorithm: SortAlgorithm::default(),
        }
    }

    pub fn with_matcher_config(mut self, config: MatcherConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_sort_algorithm(mut self, algorithm: SortAlgorithm) -> Self {
        self.sort_algorithm = algorithm;
        self
    }

    pub fn matcher_config(&self) -> &MatcherConfig {
        &self.config
    }

    pub fn sort_algorithm(&self) -> SortAlgorithm {
        self.sort_algorithm
    }

    /// Matches two caller-supplied tag lists with the configured table.
    pub fn match_tags(
        &self,
        applicant_tags: &[String],
        job_tags: &[String],
    ) -> Result<MatchDetails, MatchError> {
        if applicant_tags.is_empty() || job_tags.is_empty() {
            return Ok(MatchDetails::empty(applicant_tags, job_tags));
        }
        Ok(TagMatcher::with_config(applicant_tags, job_tags, &self.config)?.details())
    }

    /// Scores a stored applicant/job pair and persists the score.
    ///
    /// A pair where either side has no tags scores 0; that 0 is persisted too.
    pub async fn calculate_match_score(
        &self,
        applicant_id: i64,
        job_id: i64,
    ) -> Result<u32, AppError> {
        let details = self.calculate_match_details(applicant_id, job_id).await?;
        self.store
            .get_or_store_match_score(applicant_id, job_id, Some(f64::from(details.score)))
            .await?;
        Ok(details.score)
    }

    /// Breakdown for a stored pair. Nothing is persisted.
    pub async fn calculate_match_details(
        &self,
        applicant_id: i64,
        job_id: i64,
    ) -> Result<MatchDetails, AppError> {
        self.require_applicant(applicant_id).await?;
        self.require_job(job_id).await?;
        let applicant_tags = self.store.applicant_tags(applicant_id).await?;
        let job_tags = self.store.job_tags(job_id).await?;
        let details = self.match_tags(&applicant_tags, &job_tags)?;
        debug!(
            applicant_id,
            job_id,
            score = details.score,
            intersection = details.intersection,
            "Computed match"
        );
        Ok(details)
    }

    /// The last persisted score for a pair, if any.
    pub async fn stored_match_score(
        &self,
        applicant_id: i64,
        job_id: i64,
    ) -> Result<Option<f64>, AppError> {
        self.store
            .get_or_store_match_score(applicant_id, job_id, None)
            .await
    }

    /// Scores every job for one applicant, persists each score and returns
    /// the records ordered by `sort`.
    pub async fn jobs_for_applicant(
        &self,
        applicant_id: i64,
        sort: &SortSpec,
    ) -> Result<Vec<JobMatchRecord>, AppError> {
        self.require_applicant(applicant_id).await?;
        let applicant_tags = self.store.applicant_tags(applicant_id).await?;
        let jobs = self.store.jobs().await?;
        info!(applicant_id, jobs = jobs.len(), "Scoring jobs for applicant");

        let mut records = Vec::with_capacity(jobs.len());
        for job in jobs {
            let job_tags = self.store.job_tags(job.job_id).await?;
            let details = self.match_tags(&applicant_tags, &job_tags)?;
            self.store
                .get_or_store_match_score(applicant_id, job.job_id, Some(f64::from(details.score)))
                .await?;
            let mut record =
                JobMatchRecord::new(applicant_id, job.job_id, details.score, Utc::now());
            record.matched_tags = details.matched;
            records.push(record.with_job(job));
        }

        Ok(self.sort(&records, sort))
    }

    /// Scores every applicant who applied to `job_id`, persists each score
    /// and returns the records ordered by `sort`.
    pub async fn applicants_for_job(
        &self,
        job_id: i64,
        sort: &SortSpec,
    ) -> Result<Vec<JobMatchRecord>, AppError> {
        self.require_job(job_id).await?;
        let job_tags = self.store.job_tags(job_id).await?;
        let applicants = self.store.applicants_for_job(job_id).await?;
        info!(job_id, applicants = applicants.len(), "Scoring applicants for job");

        let mut records = Vec::with_capacity(applicants.len());
        for applicant in applicants {
            let applicant_tags = self.store.applicant_tags(applicant.applicant_id).await?;
            let details = self.match_tags(&applicant_tags, &job_tags)?;
            self.store
                .get_or_store_match_score(
                    applicant.applicant_id,
                    job_id,
                    Some(f64::from(details.score)),
                )
                .await?;
            let mut record =
                JobMatchRecord::new(applicant.applicant_id, job_id, details.score, Utc::now());
            record.applicant_name = applicant.full_name;
            record.matched_tags = details.matched;
            record.skills = Some(applicant_tags);
            records.push(record);
        }

        Ok(self.sort(&records, sort))
    }

    /// Persisted matches, ordered by `sort`. Rows without a score sort last.
    pub async fn sorted_job_matches(
        &self,
        filter: MatchFilter,
        sort: &SortSpec,
    ) -> Result<Vec<JobMatchRow>, AppError> {
        let rows = self.store.job_matches(filter).await?;
        Ok(self.sort(&rows, sort))
    }

    async fn require_applicant(&self, applicant_id: i64) -> Result<(), AppError> {
        if self.store.applicant_exists(applicant_id).await? {
            Ok(())
        } else {
            Err(AppError::NotFound(format!("Applicant {applicant_id} not found")))
        }
    }

    async fn require_job(&self, job_id: i64) -> Result<(), AppError> {
        if self.store.job_exists(job_id).await? {
            Ok(())
        } else {
            Err(AppError::NotFound(format!("Job {job_id} not found")))
        }
    }

    fn sort<T>(&self, records: &[T], sort: &SortSpec) -> Vec<T>
    where
        T: SortKey + Clone,
    {
        sort_records_with(self.sort_algorithm, records, &sort.sort_by, sort.descending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hashing::{CollisionStrategy, HashAlgorithm};
    use crate::matching::store::InMemoryMatchStore;
    use crate::models::job_match::JobSummary;

    fn store() -> Arc<InMemoryMatchStore> {
        Arc::new(
            InMemoryMatchStore::new()
                .with_applicant(1, Some("Ada Lovelace"), ["Python", "React", "SQL", "JavaScript"])
                .with_applicant(2, Some("Alan Turing"), ["Python", "React", "Node.js"])
                .with_applicant(3, None, Vec::<String>::new())
                .with_job(10, Some("Frontend Engineer"), ["Python", "React", "Node.js"])
                .with_job(11, Some("Data Analyst"), ["SQL", "Excel"])
                .with_job(12, Some("Untagged"), Vec::<String>::new())
                .with_application(1, 10)
                .with_application(2, 10)
                .with_application(3, 10),
        )
    }

    fn service(store: &Arc<InMemoryMatchStore>) -> MatchingService {
        MatchingService::new(store.clone())
    }

    #[tokio::test]
    async fn test_score_is_persisted() {
        let store = store();
        let svc = service(&store);
        assert_eq!(svc.calculate_match_score(1, 10).await.unwrap(), 62);
        assert_eq!(svc.stored_match_score(1, 10).await.unwrap(), Some(62.0));
    }

    #[tokio::test]
    async fn test_empty_side_scores_zero_and_persists() {
        let store = store();
        let svc = service(&store);
        assert_eq!(svc.calculate_match_score(3, 10).await.unwrap(), 0);
        assert_eq!(svc.calculate_match_score(1, 12).await.unwrap(), 0);
        assert_eq!(svc.stored_match_score(3, 10).await.unwrap(), Some(0.0));
    }

    #[tokio::test]
    async fn test_details_do_not_persist() {
        let store = store();
        let svc = service(&store);
        let details = svc.calculate_match_details(1, 10).await.unwrap();
        assert_eq!(details.matched, vec!["Python", "React"]);
        assert_eq!(details.unmatched_job, vec!["Node.js"]);
        assert_eq!(svc.stored_match_score(1, 10).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_jobs_for_applicant_sorted_by_score() {
        let store = store();
        let svc = service(&store);
        let records = svc.jobs_for_applicant(1, &SortSpec::default()).await.unwrap();
        let order: Vec<(i64, u32)> = records.iter().map(|r| (r.job_id, r.match_score)).collect();
        // Job 11: 1/2 × 70 + 1/4 × 30 = 42.5 → 42.
        assert_eq!(order, vec![(10, 62), (11, 42), (12, 0)]);
        assert_eq!(records[0].job_title.as_deref(), Some("Frontend Engineer"));
        assert_eq!(store.job_matches(MatchFilter::Applicant(1)).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_jobs_for_applicant_ascending_by_id() {
        let store = store();
        let svc = service(&store);
        let records = svc
            .jobs_for_applicant(1, &SortSpec::new("job_id", false))
            .await
            .unwrap();
        let ids: Vec<i64> = records.iter().map(|r| r.job_id).collect();
        assert_eq!(ids, vec![10, 11, 12]);
    }

    #[tokio::test]
    async fn test_applicants_for_job_only_applied() {
        let store = store();
        let svc = service(&store);
        let records = svc.applicants_for_job(10, &SortSpec::default()).await.unwrap();
        let order: Vec<(i64, u32)> = records
            .iter()
            .map(|r| (r.applicant_id, r.match_score))
            .collect();
        assert_eq!(order, vec![(2, 100), (1, 62), (3, 0)]);
        assert_eq!(records[0].applicant_name.as_deref(), Some("Alan Turing"));
        assert_eq!(
            records[1].skills.as_deref(),
            Some(&["Python", "React", "SQL", "JavaScript"].map(String::from)[..])
        );
        assert!(svc.applicants_for_job(11, &SortSpec::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_ids_are_not_found_and_not_persisted() {
        let store = store();
        let svc = service(&store);
        let err = svc.jobs_for_applicant(999, &SortSpec::default()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        let err = svc.applicants_for_job(999, &SortSpec::default()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        let err = svc.calculate_match_score(999, 10).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        let err = svc.calculate_match_score(1, 999).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert!(matches!(
            svc.calculate_match_details(1, 999).await,
            Err(AppError::NotFound(_))
        ));
        assert!(store.job_matches(MatchFilter::All).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_jobs_for_applicant_carries_listing_fields() {
        let job = JobSummary {
            company_name: Some("Acme".to_string()),
            location: Some("Remote".to_string()),
            salary_min: Some(80_000.0),
            salary_max: Some(120_000.0),
            ..JobSummary::new(20, Some("Platform Engineer"))
        };
        let store = Arc::new(
            InMemoryMatchStore::new()
                .with_applicant(1, None, ["Rust"])
                .with_job(10, Some("Frontend Engineer"), ["React"])
                .with_job_summary(job, ["Rust"]),
        );
        let svc = service(&store);
        let records = svc
            .jobs_for_applicant(1, &SortSpec::new("salary_max", true))
            .await
            .unwrap();
        assert_eq!(records[0].job_id, 20);
        assert_eq!(records[0].company_name.as_deref(), Some("Acme"));
        assert_eq!(records[0].salary_min, Some(80_000.0));
        assert_eq!(records[1].job_id, 10);
        assert_eq!(records[1].salary_max, None);
        assert!(records.iter().all(|r| r.skills.is_none()));
    }

    #[tokio::test]
    async fn test_sorted_job_matches_null_last() {
        let store = store();
        let svc = service(&store);
        store.get_or_store_match_score(1, 10, Some(62.0)).await.unwrap();
        store.get_or_store_match_score(2, 10, Some(100.0)).await.unwrap();
        store.get_or_store_match_score(1, 11, Some(42.0)).await.unwrap();

        let all = svc
            .sorted_job_matches(MatchFilter::All, &SortSpec::new("match_score", false))
            .await
            .unwrap();
        let scores: Vec<Option<f64>> = all.iter().map(|r| r.match_score).collect();
        assert_eq!(scores, vec![Some(42.0), Some(62.0), Some(100.0)]);

        let for_job = svc
            .sorted_job_matches(MatchFilter::Job(10), &SortSpec::default())
            .await
            .unwrap();
        let applicants: Vec<i64> = for_job.iter().map(|r| r.applicant_id).collect();
        assert_eq!(applicants, vec![2, 1]);
    }

    #[tokio::test]
    async fn test_every_sort_algorithm_gives_same_bulk_order() {
        let store = store();
        let expected = service(&store)
            .jobs_for_applicant(1, &SortSpec::default())
            .await
            .unwrap();
        for algorithm in SortAlgorithm::ALL {
            let svc = service(&store).with_sort_algorithm(algorithm);
            let records = svc.jobs_for_applicant(1, &SortSpec::default()).await.unwrap();
            let ids: Vec<i64> = records.iter().map(|r| r.job_id).collect();
            let expected_ids: Vec<i64> = expected.iter().map(|r| r.job_id).collect();
            assert_eq!(ids, expected_ids, "{algorithm}");
        }
    }

    #[tokio::test]
    async fn test_open_addressing_overflow_surfaces_as_error() {
        let store = Arc::new(
            InMemoryMatchStore::new()
                .with_applicant(1, None, ["a"])
                .with_job(10, None, ["a", "b", "c", "d", "e"]),
        );
        let svc = MatchingService::new(store).with_matcher_config(MatcherConfig {
            table_size: 5,
            strategy: CollisionStrategy::LinearProbing,
            hash: HashAlgorithm::Fnv1a,
        });
        let err = svc.calculate_match_score(1, 10).await.unwrap_err();
        assert!(matches!(err, AppError::Match(MatchError::TableFull { .. })));
    }
}
