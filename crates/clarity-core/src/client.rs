//! Enhancement client: the single entry point the caller uses.
//!
//! The remote service is URL-based and this crate has no step that hosts a
//! local file at a public URL, so `enhance` reports direct upload as
//! unsupported and answers with the fallback encoding of the original file.
//! A configured service handle is held but not called on this path.

use std::sync::Arc;

use crate::error::{EncodeError, ServiceError};
use crate::service::EnhancementService;
use crate::types::{EnhancementRequest, EnhancementResult, SourceFile};

const UPLOAD_UNSUPPORTED: &str =
    "Direct file upload not supported by API. Upload image elsewhere first.";

/// Turns a locally selected file into a displayable enhanced image.
#[derive(Clone, Default)]
pub struct EnhancementClient {
    service: Option<Arc<dyn EnhancementService>>,
}

impl EnhancementClient {
    /// A client with no remote service; every call takes the fallback path.
    pub fn new() -> Self {
        Self::default()
    }

    /// A client holding a remote service handle.
    pub fn with_service(service: Arc<dyn EnhancementService>) -> Self {
        Self {
            service: Some(service),
        }
    }

    /// Enhance a file.
    ///
    /// Remote failures never reach the caller; they degrade to a fallback
    /// result. Only a failure to read the file is returned as an error.
    pub async fn enhance(&self, file: &SourceFile) -> Result<EnhancementResult, EncodeError> {
        match self.try_remote(file).await {
            Ok(result) => Ok(result),
            Err(e) => {
                tracing::warn!("API call failed: {e}");
                self.fallback(file).await
            }
        }
    }

    /// Convenience wrapper over [`EnhancementClient::enhance`].
    pub async fn handle(&self, request: EnhancementRequest) -> Result<EnhancementResult, EncodeError> {
        self.enhance(&request.source_file).await
    }

    async fn try_remote(&self, file: &SourceFile) -> Result<EnhancementResult, ServiceError> {
        if let Some(service) = &self.service {
            tracing::debug!(
                "Remote service '{}' available but {} has no public URL",
                service.name(),
                file.name()
            );
        }
        Err(ServiceError::Unsupported(UPLOAD_UNSUPPORTED.to_string()))
    }

    async fn fallback(&self, file: &SourceFile) -> Result<EnhancementResult, EncodeError> {
        let blob = file.read().await?;
        tracing::info!(
            "Using original {} ({}, {} bytes) as fallback",
            file.name(),
            blob.media_type,
            blob.data.len()
        );
        Ok(EnhancementResult::fallback(blob.data_url()))
    }
}
