//! Remote enhancement service integration.
//!
//! [`EnhancementService`] is the seam between the enhancement client and a
//! URL-based processing backend. [`RemoteEnhancer`] implements it over the
//! Deep-Image REST API: one processing request, then status polling when the
//! service answers asynchronously.

pub(crate) mod api;
pub(crate) mod poll;
pub(crate) mod remote;

pub use api::{JobStatus, ProcessResponse, StatusResponse};
pub use poll::PollState;
pub use remote::RemoteEnhancer;

use crate::error::ServiceResult;
use crate::types::EnhancementResult;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// A backend that can enhance a publicly reachable image.
///
/// Uses `async_trait` so the client can hold an `Arc<dyn EnhancementService>`.
#[async_trait]
pub trait EnhancementService: Send + Sync {
    /// Service name for logging.
    fn name(&self) -> &str;

    /// Request an enhanced version of the image at `image_url`, polling to
    /// completion if needed. Cancelling `cancel` aborts an in-flight poll.
    async fn request_enhancement_with_cancel(
        &self,
        image_url: &str,
        cancel: &CancellationToken,
    ) -> ServiceResult<EnhancementResult>;

    /// Request an enhancement that runs until completion or exhaustion.
    async fn request_enhancement(&self, image_url: &str) -> ServiceResult<EnhancementResult> {
        self.request_enhancement_with_cancel(image_url, &CancellationToken::new())
            .await
    }
}

/// Resolve `${ENV_VAR}` references in config strings.
pub fn resolve_env_var(value: &str) -> Option<String> {
    if value.starts_with("${") && value.ends_with('}') {
        let var_name = &value[2..value.len() - 1];
        std::env::var(var_name).ok().filter(|v| !v.is_empty())
    } else if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
