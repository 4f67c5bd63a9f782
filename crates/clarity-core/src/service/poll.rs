//! Polling state machine for asynchronous enhancement jobs.
//!
//! A job starts `InProgress` at attempt 0. Each status response moves it to
//! `Complete`, `Failed`, or back to `InProgress` with the next attempt index.
//! The retry budget is checked before every status request, so a budget of
//! `max_retries` allows `max_retries + 1` requests.

use super::api::{JobStatus, StatusResponse};
use crate::error::ServiceError;
use crate::types::PollJob;

/// Where a polled job currently stands.
#[derive(Debug)]
pub enum PollState {
    /// Waiting on the service; the job carries the next attempt index
    InProgress(PollJob),
    /// Finished with a result URL
    Complete(String),
    /// Terminal failure (unknown status, missing result, or exhausted budget)
    Failed(ServiceError),
}

impl PollState {
    pub fn start(job_id: impl Into<String>) -> Self {
        Self::InProgress(PollJob::new(job_id))
    }

    /// Gate a pending job on the retry budget before it queries the service.
    pub fn check_budget(job: PollJob, max_retries: u32) -> Self {
        if job.is_exhausted(max_retries) {
            Self::Failed(ServiceError::MaxRetries {
                attempts: job.attempt,
                job_id: job.job_id,
            })
        } else {
            Self::InProgress(job)
        }
    }

    /// Apply a status response to a pending job.
    pub fn advance(mut job: PollJob, response: StatusResponse) -> Self {
        match response.job_status() {
            JobStatus::Complete => match response.result_url {
                Some(url) => Self::Complete(url),
                None => Self::Failed(ServiceError::MissingResultUrl),
            },
            JobStatus::InProgress => {
                job.next_attempt();
                Self::InProgress(job)
            }
            JobStatus::Other(status) => Self::Failed(ServiceError::UnknownPollingStatus(status)),
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::InProgress(_))
    }
}
