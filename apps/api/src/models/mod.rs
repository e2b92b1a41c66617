pub mod job_match;
