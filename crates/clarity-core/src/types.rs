//! Core data types exchanged between the caller, the enhancement client, and
//! the remote service adapter.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::encode;
use crate::error::EncodeError;

/// A locally selected image handed to the client.
///
/// Path-backed sources are read lazily, so an unreadable file surfaces as an
/// [`EncodeError`] from [`SourceFile::read`] rather than at construction.
#[derive(Debug, Clone)]
pub enum SourceFile {
    /// A file on disk
    Path(PathBuf),

    /// An in-memory blob, as a file picker would hand it over
    Bytes {
        name: Option<String>,
        media_type: Option<String>,
        data: Vec<u8>,
    },
}

impl SourceFile {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self::Path(path.into())
    }

    pub fn from_bytes(data: Vec<u8>) -> Self {
        Self::Bytes {
            name: None,
            media_type: None,
            data,
        }
    }

    /// Display name used in log lines.
    pub fn name(&self) -> String {
        match self {
            Self::Path(path) => path.display().to_string(),
            Self::Bytes { name, .. } => name.clone().unwrap_or_else(|| "<blob>".to_string()),
        }
    }

    /// Read the blob into memory and resolve its media type.
    pub async fn read(&self) -> Result<FileBlob, EncodeError> {
        match self {
            Self::Path(path) => {
                let data = tokio::fs::read(path).await.map_err(|source| EncodeError::Read {
                    path: path.clone(),
                    source,
                })?;
                let media_type = encode::sniff_media_type(&data, Some(path.as_path()));
                Ok(FileBlob { media_type, data })
            }
            Self::Bytes {
                name,
                media_type,
                data,
            } => {
                let media_type = media_type.clone().unwrap_or_else(|| {
                    encode::sniff_media_type(data, name.as_deref().map(Path::new))
                });
                Ok(FileBlob {
                    media_type,
                    data: data.clone(),
                })
            }
        }
    }
}

/// File contents plus the media type used for its data URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileBlob {
    pub media_type: String,
    pub data: Vec<u8>,
}

/// A single user action: enhance this file.
#[derive(Debug, Clone)]
pub struct EnhancementRequest {
    pub source_file: SourceFile,
}

impl EnhancementRequest {
    pub fn new(source_file: SourceFile) -> Self {
        Self { source_file }
    }
}

/// The displayable outcome of an enhancement.
///
/// `fallback` is true exactly when `enhanced_url` is a data URL of the
/// original file. Build values through [`EnhancementResult::remote`] and
/// [`EnhancementResult::fallback`] to keep that pairing intact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhancementResult {
    enhanced_url: String,
    fallback: bool,
}

impl EnhancementResult {
    /// A result produced by the remote service.
    pub fn remote(result_url: impl Into<String>) -> Self {
        Self {
            enhanced_url: result_url.into(),
            fallback: false,
        }
    }

    /// A locally encoded substitute for the original file.
    pub fn fallback(data_url: impl Into<String>) -> Self {
        Self {
            enhanced_url: data_url.into(),
            fallback: true,
        }
    }

    pub fn enhanced_url(&self) -> &str {
        &self.enhanced_url
    }

    pub fn is_fallback(&self) -> bool {
        self.fallback
    }
}

/// Polling state for one asynchronous job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollJob {
    pub job_id: String,
    pub attempt: u32,
}

impl PollJob {
    pub fn new(job_id: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            attempt: 0,
        }
    }

    /// Advance to the next attempt.
    pub fn next_attempt(&mut self) {
        self.attempt += 1;
    }

    /// Whether the attempt counter has passed the retry budget.
    pub fn is_exhausted(&self, max_retries: u32) -> bool {
        self.attempt > max_retries
    }
}
