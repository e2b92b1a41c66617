//! `MatchStore` over the relational schema.
//!
//! Ids are `int4` in the schema, `match_score` and salaries are `NUMERIC`
//! and work settings are enums. All are cast in SQL so rows decode straight
//! into `i64`, `f64` and `String`.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::errors::AppError;
use crate::matching::store::MatchStore;
use crate::models::job_match::{ApplicantSummary, JobMatchRow, JobSummary, MatchFilter};

#[derive(Clone)]
pub struct PgMatchStore {
    pool: PgPool,
}

impl PgMatchStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const JOB_MATCH_COLUMNS: &str =
    r#"applicant_id::int8 AS applicant_id, job_id::int8 AS job_id, match_score::float8 AS match_score"#;

#[async_trait]
impl MatchStore for PgMatchStore {
    async fn applicant_tags(&self, applicant_id: i64) -> Result<Vec<String>, AppError> {
        let tags: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT t.tag_name
            FROM "Applicant_Tags" at
            JOIN "Tags" t ON t.tag_id = at.tag_id
            WHERE at.applicant_id = $1
            ORDER BY t.tag_id
            "#,
        )
        .bind(applicant_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(tags)
    }

    async fn job_tags(&self, job_id: i64) -> Result<Vec<String>, AppError> {
        let tags: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT t.tag_name
            FROM "Job_Tags" jt
            JOIN "Tags" t ON t.tag_id = jt.tag_id
            WHERE jt.job_id = $1
            ORDER BY t.tag_id
            "#,
        )
        .bind(job_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(tags)
    }

    async fn applicant_exists(&self, applicant_id: i64) -> Result<bool, AppError> {
        let exists: bool = sqlx::query_scalar(
            r#"SELECT EXISTS(SELECT 1 FROM "Applicant" WHERE applicant_id = $1)"#,
        )
        .bind(applicant_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn job_exists(&self, job_id: i64) -> Result<bool, AppError> {
        let exists: bool =
            sqlx::query_scalar(r#"SELECT EXISTS(SELECT 1 FROM "Job" WHERE job_id = $1)"#)
                .bind(job_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn all_tag_names(&self) -> Result<Vec<String>, AppError> {
        let tags: Vec<String> =
            sqlx::query_scalar(r#"SELECT tag_name FROM "Tags" ORDER BY tag_id"#)
                .fetch_all(&self.pool)
                .await?;
        Ok(tags)
    }

    async fn jobs(&self) -> Result<Vec<JobSummary>, AppError> {
        let jobs: Vec<JobSummary> = sqlx::query_as(
            r#"
            SELECT j.job_id::int8 AS job_id,
                   j.job_title,
                   c.company_name,
                   c.location,
                   j.setting::text AS work_setting,
                   j.work_type::text AS work_type,
                   j.salary_min::float8 AS salary_min,
                   j.salary_max::float8 AS salary_max,
                   j.description
            FROM "Job" j
            LEFT JOIN "Company" c ON c.company_id = j.company_id
            ORDER BY j.job_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(jobs)
    }

    async fn applicants_for_job(&self, job_id: i64) -> Result<Vec<ApplicantSummary>, AppError> {
        let applicants: Vec<ApplicantSummary> = sqlx::query_as(
            r#"
            SELECT a.applicant_id::int8 AS applicant_id,
                   NULLIF(TRIM(CONCAT_WS(' ', a.first_name, a.last_name)), '') AS full_name
            FROM "Job_Application" ja
            JOIN "Applicant" a ON a.applicant_id = ja.applicant_id
            WHERE ja.job_id = $1
            ORDER BY a.applicant_id
            "#,
        )
        .bind(job_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(applicants)
    }

    async fn get_or_store_match_score(
        &self,
        applicant_id: i64,
        job_id: i64,
        score: Option<f64>,
    ) -> Result<Option<f64>, AppError> {
        match score {
            Some(value) => {
                sqlx::query(
                    r#"
                    INSERT INTO "Job_Matching" (applicant_id, job_id, match_score)
                    VALUES ($1, $2, $3)
                    ON CONFLICT (applicant_id, job_id)
                    DO UPDATE SET match_score = EXCLUDED.match_score
                    "#,
                )
                .bind(applicant_id)
                .bind(job_id)
                .bind(value)
                .execute(&self.pool)
                .await?;
                Ok(Some(value))
            }
            None => {
                let stored: Option<Option<f64>> = sqlx::query_scalar(
                    r#"
                    SELECT match_score::float8
                    FROM "Job_Matching"
                    WHERE applicant_id = $1 AND job_id = $2
                    "#,
                )
                .bind(applicant_id)
                .bind(job_id)
                .fetch_optional(&self.pool)
                .await?;
                Ok(stored.flatten())
            }
        }
    }

    async fn job_matches(&self, filter: MatchFilter) -> Result<Vec<JobMatchRow>, AppError> {
        let rows: Vec<JobMatchRow> = match filter {
            MatchFilter::All => {
                sqlx::query_as(&format!(
                    r#"SELECT {JOB_MATCH_COLUMNS} FROM "Job_Matching""#
                ))
                .fetch_all(&self.pool)
                .await?
            }
            MatchFilter::Applicant(id) => {
                sqlx::query_as(&format!(
                    r#"SELECT {JOB_MATCH_COLUMNS} FROM "Job_Matching" WHERE applicant_id = $1"#
                ))
                .bind(id)
                .fetch_all(&self.pool)
                .await?
            }
            MatchFilter::Job(id) => {
                sqlx::query_as(&format!(
                    r#"SELECT {JOB_MATCH_COLUMNS} FROM "Job_Matching" WHERE job_id = $1"#
                ))
                .bind(id)
                .fetch_all(&self.pool)
                .await?
            }
        };
        Ok(rows)
    }
}
