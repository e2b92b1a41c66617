use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::sorting::{SortKey, SortValue};

/// A persisted (applicant, job) match score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct JobMatchRow {
    pub applicant_id: i64,
    pub job_id: i64,
    pub match_score: Option<f64>,
}

impl SortKey for JobMatchRow {
    fn sort_key(&self, field: &str) -> Option<SortValue> {
        match field {
            "applicant_id" => Some(self.applicant_id.into()),
            "job_id" => Some(self.job_id.into()),
            "match_score" => self.match_score.map(SortValue::from),
            _ => None,
        }
    }
}

/// A freshly computed match, as returned by the bulk matching operations.
///
/// Job listing fields are filled when scoring jobs for an applicant;
/// `applicant_name` and `skills` when scoring applicants for a job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobMatchRecord {
    pub applicant_id: i64,
    pub job_id: i64,
    pub job_title: Option<String>,
    pub company_name: Option<String>,
    pub location: Option<String>,
    pub work_setting: Option<String>,
    pub work_type: Option<String>,
    pub salary_min: Option<f64>,
    pub salary_max: Option<f64>,
    pub description: Option<String>,
    pub applicant_name: Option<String>,
    /// The applicant's full tag list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skills: Option<Vec<String>>,
    pub match_score: u32,
    pub matched_tags: Vec<String>,
    pub computed_at: DateTime<Utc>,
}

impl JobMatchRecord {
    /// A record with only the ids and the score set.
    pub fn new(
        applicant_id: i64,
        job_id: i64,
        match_score: u32,
        computed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            applicant_id,
            job_id,
            job_title: None,
            company_name: None,
            location: None,
            work_setting: None,
            work_type: None,
            salary_min: None,
            salary_max: None,
            description: None,
            applicant_name: None,
            skills: None,
            match_score,
            matched_tags: Vec::new(),
            computed_at,
        }
    }

    /// Copies the listing fields of `job` onto the record.
    pub fn with_job(mut self, job: JobSummary) -> Self {
        self.job_title = job.job_title;
        self.company_name = job.company_name;
        self.location = job.location;
        self.work_setting = job.work_setting;
        self.work_type = job.work_type;
        self.salary_min = job.salary_min;
        self.salary_max = job.salary_max;
        self.description = job.description;
        self
    }
}

fn text(value: &Option<String>) -> Option<SortValue> {
    value.as_deref().map(SortValue::from)
}

impl SortKey for JobMatchRecord {
    fn sort_key(&self, field: &str) -> Option<SortValue> {
        match field {
            "applicant_id" => Some(self.applicant_id.into()),
            "job_id" => Some(self.job_id.into()),
            "match_score" => Some(self.match_score.into()),
            "job_title" => text(&self.job_title),
            "company_name" => text(&self.company_name),
            "location" => text(&self.location),
            "work_setting" => text(&self.work_setting),
            "work_type" => text(&self.work_type),
            "salary_min" => self.salary_min.map(SortValue::from),
            "salary_max" => self.salary_max.map(SortValue::from),
            "applicant_name" => text(&self.applicant_name),
            "matched_count" => Some(SortValue::Int(self.matched_tags.len() as i64)),
            "skill_count" => self.skills.as_ref().map(|s| SortValue::Int(s.len() as i64)),
            "computed_at" => Some(SortValue::Int(self.computed_at.timestamp_millis())),
            _ => None,
        }
    }
}

/// A job as seen by the matcher, with the listing fields shown next to a score.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow)]
pub struct JobSummary {
    pub job_id: i64,
    pub job_title: Option<String>,
    pub company_name: Option<String>,
    pub location: Option<String>,
    pub work_setting: Option<String>,
    pub work_type: Option<String>,
    pub salary_min: Option<f64>,
    pub salary_max: Option<f64>,
    pub description: Option<String>,
}

impl JobSummary {
    pub fn new(job_id: i64, job_title: Option<&str>) -> Self {
        Self {
            job_id,
            job_title: job_title.map(str::to_string),
            ..Self::default()
        }
    }
}

/// An applicant as seen by the matcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ApplicantSummary {
    pub applicant_id: i64,
    pub full_name: Option<String>,
}

/// Which stored matches to list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchFilter {
    All,
    Applicant(i64),
    Job(i64),
}
