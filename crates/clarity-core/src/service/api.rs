//! Wire types for the Deep-Image REST API.

use serde::{Deserialize, Serialize};

/// `POST /process_result` request body.
#[derive(Debug, Serialize)]
pub(crate) struct ProcessRequest<'a> {
    pub url: &'a str,
    pub enhancements: &'a [String],
    pub width: u32,
}

/// `POST /process_result` response.
#[derive(Debug, Clone, Deserialize)]
pub struct ProcessResponse {
    /// Missing on malformed replies; parses as an unknown status
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub result_url: Option<String>,
    #[serde(default)]
    pub job: Option<String>,
}

/// `GET /result/<job>` response.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub result_url: Option<String>,
}

/// Job status as reported by either endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    Complete,
    InProgress,
    Other(String),
}

impl JobStatus {
    pub fn parse(status: &str) -> Self {
        match status {
            "complete" => Self::Complete,
            "in_progress" => Self::InProgress,
            other => Self::Other(other.to_string()),
        }
    }
}

impl ProcessResponse {
    pub fn job_status(&self) -> JobStatus {
        JobStatus::parse(&self.status)
    }
}

impl StatusResponse {
    pub fn job_status(&self) -> JobStatus {
        JobStatus::parse(&self.status)
    }
}
