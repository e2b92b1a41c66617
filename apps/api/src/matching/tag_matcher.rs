//! Scores an applicant's skill tags against a job's required tags.
//!
//! The job's tags go into a hash table, then every applicant tag is looked
//! up in it. Both sides are deduplicated on the way in, so a tag counts at
//! most once per side and `|A ∩ J| <= min(|A|, |J|)` holds by construction.
//!
//! Score = `(|A ∩ J| / |J|) × 70 + (|A ∩ J| / |A|) × 30`, rounded half to
//! even. Either side empty scores 0.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::hashing::{
    build_table, percentage, ChainingTable, CollisionStrategy, HashAlgorithm, InsertOutcome,
    TableStats, TagTable, DEFAULT_TABLE_SIZE,
};

/// Weight of job-requirement coverage in the score.
pub const JOB_COVERAGE_WEIGHT: f64 = 70.0;
/// Weight of applicant-tag coverage in the score.
pub const APPLICANT_COVERAGE_WEIGHT: f64 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagSide {
    Applicant,
    Job,
}

impl fmt::Display for TagSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagSide::Applicant => f.write_str("applicant"),
            TagSide::Job => f.write_str("job"),
        }
    }
}

#[derive(Debug, Error)]
pub enum MatchError {
    #[error("invalid {side} tag at index {index}: expected a string, found {found}")]
    InvalidTag {
        side: TagSide,
        index: usize,
        found: String,
    },

    #[error("{strategy} table of size {size} has no room for job tag '{tag}'")]
    TableFull {
        strategy: CollisionStrategy,
        size: usize,
        tag: String,
    },
}

/// Checks that every element of a loosely typed tag list is a string.
///
/// Null and non-string values are rejected instead of being hashed.
pub fn validate_tags(side: TagSide, values: &[Value]) -> Result<Vec<String>, MatchError> {
    values
        .iter()
        .enumerate()
        .map(|(index, value)| match value {
            Value::String(tag) => Ok(tag.clone()),
            other => Err(MatchError::InvalidTag {
                side,
                index,
                found: json_kind(other).to_string(),
            }),
        })
        .collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Table settings for the job-side lookup table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatcherConfig {
    pub table_size: usize,
    pub strategy: CollisionStrategy,
    pub hash: HashAlgorithm,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            table_size: DEFAULT_TABLE_SIZE,
            strategy: CollisionStrategy::SeparateChaining,
            hash: HashAlgorithm::Fnv1a,
        }
    }
}

/// Breakdown of a match, for explaining a score to a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchDetails {
    pub score: u32,
    /// Weighted score before rounding.
    pub raw_score: f64,
    pub intersection: usize,
    pub applicant_total: usize,
    pub job_total: usize,
    /// Applicant tags the job asks for, in applicant order.
    pub matched: Vec<String>,
    /// Job tags the applicant lacks, in job order.
    pub unmatched_job: Vec<String>,
    /// Applicant tags the job does not ask for, in applicant order.
    pub unmatched_applicant: Vec<String>,
    /// intersection / job_total × 100
    pub job_coverage_pct: f64,
    /// intersection / applicant_total × 100
    pub applicant_coverage_pct: f64,
}

impl MatchDetails {
    /// The all-zero result for an empty side.
    pub fn empty(applicant_tags: &[String], job_tags: &[String]) -> Self {
        Self {
            score: 0,
            raw_score: 0.0,
            intersection: 0,
            applicant_total: distinct(applicant_tags).len(),
            job_total: distinct(job_tags).len(),
            matched: Vec::new(),
            unmatched_job: distinct(job_tags),
            unmatched_applicant: distinct(applicant_tags),
            job_coverage_pct: 0.0,
            applicant_coverage_pct: 0.0,
        }
    }
}

fn distinct(tags: &[String]) -> Vec<String> {
    let mut seen = ChainingTable::new(DEFAULT_TABLE_SIZE);
    tags.iter()
        .filter(|t| seen.insert(t) == InsertOutcome::Inserted)
        .cloned()
        .collect()
}

/// Weighted score before rounding. Zero when either side is empty.
pub fn raw_score(intersection: usize, applicant_total: usize, job_total: usize) -> f64 {
    if applicant_total == 0 || job_total == 0 {
        return 0.0;
    }
    let i = intersection as f64;
    (i / job_total as f64) * JOB_COVERAGE_WEIGHT
        + (i / applicant_total as f64) * APPLICANT_COVERAGE_WEIGHT
}

/// Rounds half to even and clamps into `0..=100`.
pub fn round_score(raw: f64) -> u32 {
    raw.round_ties_even().clamp(0.0, 100.0) as u32
}

/// One matching computation over an applicant/job tag pair.
///
/// Owns its tables; nothing is shared between instances.
pub struct TagMatcher<'a> {
    applicant: Vec<&'a str>,
    job: Vec<&'a str>,
    applicant_table: ChainingTable,
    job_table: Box<dyn TagTable>,
}

impl<'a> TagMatcher<'a> {
    /// Builds the matcher with the production table (FNV-1a, separate chaining).
    pub fn new<A, J>(applicant_tags: &'a [A], job_tags: &'a [J]) -> Self
    where
        A: AsRef<str>,
        J: AsRef<str>,
    {
        // Chaining never reports Full.
        let job_table = Box::new(ChainingTable::new(DEFAULT_TABLE_SIZE));
        let (job, job_table) =
            fill(job_tags, job_table).unwrap_or_else(|(kept, table, _)| (kept, table));
        let (applicant, applicant_table) = dedup_applicant(applicant_tags, DEFAULT_TABLE_SIZE);
        Self {
            applicant,
            job,
            applicant_table,
            job_table,
        }
    }

    /// Builds the matcher with a chosen table strategy.
    ///
    /// Open-addressing tables can run out of room; that is reported as
    /// [`MatchError::TableFull`] rather than silently dropping job tags.
    pub fn with_config<A, J>(
        applicant_tags: &'a [A],
        job_tags: &'a [J],
        config: &MatcherConfig,
    ) -> Result<Self, MatchError>
    where
        A: AsRef<str>,
        J: AsRef<str>,
    {
        let table = build_table(config.strategy, config.table_size, config.hash);
        let (job, job_table) =
            fill(job_tags, table).map_err(|(_, table, tag)| MatchError::TableFull {
                strategy: config.strategy,
                size: table.size(),
                tag,
            })?;
        let (applicant, applicant_table) = dedup_applicant(applicant_tags, config.table_size);
        Ok(Self {
            applicant,
            job,
            applicant_table,
            job_table,
        })
    }

    /// Distinct applicant tags present in the job table.
    pub fn intersection(&self) -> usize {
        self.applicant
            .iter()
            .filter(|tag| self.job_table.contains(tag))
            .count()
    }

    pub fn applicant_total(&self) -> usize {
        self.applicant.len()
    }

    pub fn job_total(&self) -> usize {
        self.job.len()
    }

    pub fn raw_score(&self) -> f64 {
        raw_score(self.intersection(), self.applicant_total(), self.job_total())
    }

    pub fn score(&self) -> u32 {
        round_score(self.raw_score())
    }

    pub fn details(&self) -> MatchDetails {
        let (matched, unmatched_applicant): (Vec<&str>, Vec<&str>) = self
            .applicant
            .iter()
            .copied()
            .partition(|tag| self.job_table.contains(tag));
        let unmatched_job: Vec<&str> = self
            .job
            .iter()
            .copied()
            .filter(|tag| !self.applicant_table.contains(tag))
            .collect();

        let intersection = matched.len();
        let applicant_total = self.applicant_total();
        let job_total = self.job_total();
        let raw = raw_score(intersection, applicant_total, job_total);

        MatchDetails {
            score: round_score(raw),
            raw_score: raw,
            intersection,
            applicant_total,
            job_total,
            matched: to_owned(&matched),
            unmatched_job: to_owned(&unmatched_job),
            unmatched_applicant: to_owned(&unmatched_applicant),
            job_coverage_pct: percentage(intersection, job_total),
            applicant_coverage_pct: percentage(intersection, applicant_total),
        }
    }

    /// Diagnostics for the job-side table.
    pub fn table_stats(&self) -> TableStats {
        self.job_table.stats()
    }
}

type Filled<'a> = (Vec<&'a str>, Box<dyn TagTable>);

/// Inserts `tags` into `table`, keeping the first occurrence of each.
/// On `Full`, hands back what was kept, the table and the rejected tag.
fn fill<'a, S: AsRef<str>>(
    tags: &'a [S],
    mut table: Box<dyn TagTable>,
) -> Result<Filled<'a>, (Vec<&'a str>, Box<dyn TagTable>, String)> {
    let mut kept = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.as_ref();
        match table.insert(tag) {
            InsertOutcome::Inserted => kept.push(tag),
            InsertOutcome::AlreadyPresent => {}
            InsertOutcome::Full => return Err((kept, table, tag.to_string())),
        }
    }
    Ok((kept, table))
}

fn dedup_applicant<S: AsRef<str>>(tags: &[S], size: usize) -> (Vec<&str>, ChainingTable) {
    let mut table = ChainingTable::new(size);
    let mut kept = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.as_ref();
        if table.insert(tag) == InsertOutcome::Inserted {
            kept.push(tag);
        }
    }
    (kept, table)
}

fn to_owned(tags: &[&str]) -> Vec<String> {
    tags.iter().map(|t| t.to_string()).collect()
}

/// Match score in `0..=100` for two tag lists.
pub fn compute_match_score<A, J>(applicant_tags: &[A], job_tags: &[J]) -> u32
where
    A: AsRef<str>,
    J: AsRef<str>,
{
    TagMatcher::new(applicant_tags, job_tags).score()
}

/// Score plus the breakdown behind it.
pub fn compute_match_details<A, J>(applicant_tags: &[A], job_tags: &[J]) -> MatchDetails
where
    A: AsRef<str>,
    J: AsRef<str>,
{
    TagMatcher::new(applicant_tags, job_tags).details()
}
