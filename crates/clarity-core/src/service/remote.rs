//! Deep-Image REST client: processing requests and job polling.

use super::api::{JobStatus, ProcessRequest, ProcessResponse, StatusResponse};
use super::poll::PollState;
use super::{resolve_env_var, EnhancementService};
use crate::config::{Config, EnhancementOptions, PollingConfig, ServiceConfig};
use crate::error::{ServiceError, ServiceResult};
use crate::types::EnhancementResult;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;

const API_KEY_HEADER: &str = "x-api-key";

/// Adapter for the remote enhancement service.
///
/// All endpoints, the credential, and retry limits come from configuration
/// injected at construction.
#[derive(Clone)]
pub struct RemoteEnhancer {
    service: ServiceConfig,
    polling: PollingConfig,
    options: EnhancementOptions,
    api_key: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for RemoteEnhancer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteEnhancer")
            .field("process_url", &self.service.process_url)
            .field("result_url_base", &self.service.result_url_base)
            .field("polling", &self.polling)
            .finish_non_exhaustive()
    }
}

impl RemoteEnhancer {
    /// Build an adapter from the full config, resolving the API key.
    pub fn from_config(config: &Config) -> ServiceResult<Self> {
        let api_key = resolve_env_var(&config.service.api_key).ok_or_else(|| {
            ServiceError::MissingCredential(format!(
                "set service.api_key or the variable referenced by '{}'",
                config.service.api_key
            ))
        })?;
        Ok(Self::new(
            config.service.clone(),
            config.polling.clone(),
            config.enhancement.clone(),
            api_key,
        ))
    }

    pub fn new(
        service: ServiceConfig,
        polling: PollingConfig,
        options: EnhancementOptions,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            service,
            polling,
            options,
            api_key: api_key.into(),
            client: reqwest::Client::new(),
        }
    }

    fn result_url(&self, job_id: &str) -> String {
        format!(
            "{}/{}",
            self.service.result_url_base.trim_end_matches('/'),
            job_id
        )
    }

    /// Submit `image_url` for processing.
    ///
    /// A synchronous `complete` answer is returned directly; an accepted job
    /// is polled to completion. Any other answer is an unknown status.
    pub async fn request(
        &self,
        image_url: &str,
        cancel: &CancellationToken,
    ) -> ServiceResult<EnhancementResult> {
        let body = ProcessRequest {
            url: image_url,
            enhancements: &self.options.enhancements,
            width: self.options.width,
        };

        tracing::debug!("Submitting {image_url} to {}", self.service.process_url);
        let request = self
            .client
            .post(&self.service.process_url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&body);

        let response: ProcessResponse = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                return Err(ServiceError::Cancelled {
                    job_id: None,
                    attempt: 0,
                });
            }
            result = self.send_json(request) => result?,
        };

        match (response.job_status(), response.result_url, response.job) {
            (JobStatus::Complete, Some(url), _) => {
                tracing::info!("Enhancement completed synchronously");
                Ok(EnhancementResult::remote(url))
            }
            (JobStatus::Complete, None, _) => Err(ServiceError::MissingResultUrl),
            (JobStatus::InProgress, _, Some(job_id)) => {
                tracing::info!("Enhancement accepted as job {job_id}, polling for result");
                self.poll_for_result_with_cancel(&job_id, cancel).await
            }
            _ => Err(ServiceError::UnknownResponseStatus(response.status)),
        }
    }

    /// Poll a job until it completes, fails, or exhausts the retry budget.
    pub async fn poll_for_result(&self, job_id: &str) -> ServiceResult<EnhancementResult> {
        self.poll_for_result_with_cancel(job_id, &CancellationToken::new())
            .await
    }

    /// Poll a job, aborting with [`ServiceError::Cancelled`] once `cancel`
    /// fires. Both the status request and the inter-attempt delay race the
    /// token.
    pub async fn poll_for_result_with_cancel(
        &self,
        job_id: &str,
        cancel: &CancellationToken,
    ) -> ServiceResult<EnhancementResult> {
        let mut state = PollState::start(job_id);

        loop {
            let job = match state {
                PollState::InProgress(job) => job,
                PollState::Complete(url) => {
                    tracing::info!("Job {job_id} complete");
                    return Ok(EnhancementResult::remote(url));
                }
                PollState::Failed(e) => {
                    tracing::warn!("Job {job_id} failed: {e}");
                    return Err(e);
                }
            };

            let job = match PollState::check_budget(job, self.polling.max_retries) {
                PollState::InProgress(job) => job,
                terminal => {
                    state = terminal;
                    continue;
                }
            };

            let request = self
                .client
                .get(self.result_url(&job.job_id))
                .header(API_KEY_HEADER, &self.api_key);

            let response: StatusResponse = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    return Err(ServiceError::Cancelled {
                        job_id: Some(job.job_id),
                        attempt: job.attempt,
                    });
                }
                result = self.send_json(request) => result?,
            };

            state = PollState::advance(job, response);

            if let PollState::InProgress(ref job) = state {
                let delay = self.polling.retry_delay();
                tracing::debug!(
                    "Job {job_id} in progress, retry {}/{} after {delay:?}",
                    job.attempt,
                    self.polling.max_retries
                );
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => {
                        return Err(ServiceError::Cancelled {
                            job_id: Some(job.job_id.clone()),
                            attempt: job.attempt,
                        });
                    }
                    _ = tokio::time::sleep(delay) => {}
                }
            }
        }
    }

    /// Send a request and decode a JSON body, mapping transport and HTTP
    /// failures to [`ServiceError::Request`].
    async fn send_json<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> ServiceResult<T> {
        let resp = request
            .timeout(self.service.request_timeout())
            .send()
            .await
            .map_err(|e| ServiceError::Request {
                message: format!("Enhancement request failed: {e}"),
                status_code: None,
            })?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(ServiceError::Request {
                message: format!("Enhancement service HTTP {status}: {text}"),
                status_code: Some(status.as_u16()),
            });
        }

        resp.json().await.map_err(|e| ServiceError::Request {
            message: format!("Failed to parse enhancement service response: {e}"),
            status_code: None,
        })
    }
}

#[async_trait]
impl EnhancementService for RemoteEnhancer {
    fn name(&self) -> &str {
        "deep-image"
    }

    async fn request_enhancement_with_cancel(
        &self,
        image_url: &str,
        cancel: &CancellationToken,
    ) -> ServiceResult<EnhancementResult> {
        self.request(image_url, cancel).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const API_KEY: &str = "test-key";

    fn enhancer(server: &MockServer, max_retries: u32, retry_delay_ms: u64) -> RemoteEnhancer {
        let service = ServiceConfig {
            process_url: format!("{}/rest_api/process_result", server.uri()),
            result_url_base: format!("{}/rest_api/result", server.uri()),
            api_key: API_KEY.to_string(),
            request_timeout_ms: 5_000,
        };
        let polling = PollingConfig {
            max_retries,
            retry_delay_ms,
        };
        RemoteEnhancer::new(service, polling, EnhancementOptions::default(), API_KEY)
    }

    #[tokio::test]
    async fn test_synchronous_complete_returns_result_url() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest_api/process_result"))
            .and(header("x-api-key", API_KEY))
            .and(body_json(json!({
                "url": "https://img.example.com/cat.jpg",
                "enhancements": ["denoise", "deblur", "light"],
                "width": 2000
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "complete",
                "result_url": "https://cdn.example.com/cat-enhanced.jpg"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let result = enhancer(&server, 20, 1)
            .request_enhancement("https://img.example.com/cat.jpg")
            .await
            .unwrap();

        assert!(!result.is_fallback());
        assert_eq!(
            result.enhanced_url(),
            "https://cdn.example.com/cat-enhanced.jpg"
        );
    }

    #[tokio::test]
    async fn test_async_job_polls_until_complete() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest_api/process_result"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "in_progress",
                "job": "job-42"
            })))
            .mount(&server)
            .await;

        // First two status checks report progress, then the fallthrough mock completes
        Mock::given(method("GET"))
            .and(path("/rest_api/result/job-42"))
            .and(header("x-api-key", API_KEY))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"status": "in_progress"})),
            )
            .up_to_n_times(2)
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/rest_api/result/job-42"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "complete",
                "result_url": "https://cdn.example.com/job-42.jpg"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let result = enhancer(&server, 20, 1)
            .request_enhancement("https://img.example.com/cat.jpg")
            .await
            .unwrap();

        assert!(!result.is_fallback());
        assert_eq!(result.enhanced_url(), "https://cdn.example.com/job-42.jpg");
    }

    #[tokio::test]
    async fn test_unknown_response_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest_api/process_result"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "rejected"})))
            .mount(&server)
            .await;

        let err = enhancer(&server, 20, 1)
            .request_enhancement("https://img.example.com/cat.jpg")
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::UnknownResponseStatus(ref s) if s == "rejected"));
    }

    #[tokio::test]
    async fn test_response_without_status_is_unknown_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest_api/process_result"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "queued"})))
            .expect(1)
            .mount(&server)
            .await;

        let err = enhancer(&server, 20, 1)
            .request_enhancement("https://img.example.com/cat.jpg")
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::UnknownResponseStatus(ref s) if s.is_empty()));
        server.verify().await;
    }

    #[tokio::test]
    async fn test_in_progress_without_job_is_unknown_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest_api/process_result"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"status": "in_progress"})),
            )
            .mount(&server)
            .await;

        let err = enhancer(&server, 20, 1)
            .request_enhancement("https://img.example.com/cat.jpg")
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::UnknownResponseStatus(_)));
    }

    #[tokio::test]
    async fn test_http_error_is_request_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest_api/process_result"))
            .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
            .mount(&server)
            .await;

        let err = enhancer(&server, 20, 1)
            .request_enhancement("https://img.example.com/cat.jpg")
            .await
            .unwrap_err();
        match err {
            ServiceError::Request {
                status_code,
                message,
            } => {
                assert_eq!(status_code, Some(401));
                assert!(message.contains("bad key"));
            }
            other => panic!("expected Request error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_polling_exhausts_after_max_retries_plus_one_requests() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest_api/result/stuck"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"status": "in_progress"})),
            )
            .expect(21)
            .mount(&server)
            .await;

        let err = enhancer(&server, 20, 1)
            .poll_for_result("stuck")
            .await
            .unwrap_err();

        match err {
            ServiceError::MaxRetries { job_id, attempts } => {
                assert_eq!(job_id, "stuck");
                assert_eq!(attempts, 21);
            }
            other => panic!("expected MaxRetries, got {other:?}"),
        }
        server.verify().await;
    }

    #[tokio::test]
    async fn test_unknown_polling_status_fails_without_retry() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest_api/result/broken"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "error"})))
            .expect(1)
            .mount(&server)
            .await;

        let err = enhancer(&server, 20, 1)
            .poll_for_result("broken")
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::UnknownPollingStatus(ref s) if s == "error"));
        server.verify().await;
    }

    #[tokio::test]
    async fn test_status_reply_without_status_is_unknown_polling_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest_api/result/shapeless"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"state": "done"})))
            .expect(1)
            .mount(&server)
            .await;

        let err = enhancer(&server, 20, 1)
            .poll_for_result("shapeless")
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::UnknownPollingStatus(ref s) if s.is_empty()));
        server.verify().await;
    }

    #[tokio::test]
    async fn test_complete_without_result_url() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest_api/result/empty"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "complete"})))
            .mount(&server)
            .await;

        let err = enhancer(&server, 20, 1)
            .poll_for_result("empty")
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::MissingResultUrl));
    }

    #[tokio::test]
    async fn test_cancel_during_delay_stops_polling() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest_api/result/slow"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"status": "in_progress"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let enhancer = enhancer(&server, 20, 60_000);
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(200)).await;
            trigger.cancel();
        });

        let err = tokio::time::timeout(
            Duration::from_secs(10),
            enhancer.poll_for_result_with_cancel("slow", &cancel),
        )
        .await
        .expect("poll should stop promptly after cancellation")
        .unwrap_err();

        match err {
            ServiceError::Cancelled { job_id, attempt } => {
                assert_eq!(job_id.as_deref(), Some("slow"));
                assert_eq!(attempt, 1);
            }
            other => panic!("expected Cancelled, got {other:?}"),
        }
        server.verify().await;
    }

    #[tokio::test]
    async fn test_precancelled_token_sends_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = enhancer(&server, 20, 1)
            .poll_for_result_with_cancel("never", &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Cancelled { attempt: 0, .. }));
        server.verify().await;
    }

    #[tokio::test]
    async fn test_cancelled_before_submit_sends_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest_api/process_result"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "complete",
                "result_url": "https://cdn.example.com/never.jpg"
            })))
            .expect(0)
            .mount(&server)
            .await;

        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = enhancer(&server, 20, 1)
            .request_enhancement_with_cancel("https://img.example.com/cat.jpg", &cancel)
            .await
            .unwrap_err();

        match err {
            ServiceError::Cancelled { job_id, attempt } => {
                assert_eq!(job_id, None);
                assert_eq!(attempt, 0);
            }
            other => panic!("expected Cancelled, got {other:?}"),
        }
        server.verify().await;
    }

    #[tokio::test]
    async fn test_cancel_during_slow_submit() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest_api/process_result"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"status": "in_progress", "job": "late"}))
                    .set_delay(Duration::from_secs(30)),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let enhancer = enhancer(&server, 20, 1);
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            trigger.cancel();
        });

        let err = tokio::time::timeout(
            Duration::from_secs(10),
            enhancer.request_enhancement_with_cancel("https://img.example.com/cat.jpg", &cancel),
        )
        .await
        .expect("submit should stop promptly after cancellation")
        .unwrap_err();

        assert!(matches!(
            err,
            ServiceError::Cancelled {
                job_id: None,
                attempt: 0
            }
        ));
        server.verify().await;
    }

    #[test]
    fn test_from_config_requires_credential() {
        let mut config = Config::default();
        config.service.api_key = "${CLARITY_UNSET_KEY_FOR_TEST}".to_string();
        let err = RemoteEnhancer::from_config(&config).unwrap_err();
        assert!(matches!(err, ServiceError::MissingCredential(_)));
    }

    #[test]
    fn test_result_url_trims_trailing_slash() {
        let mut config = Config::default();
        config.service.api_key = "literal".to_string();
        config.service.result_url_base = "https://svc.example.com/result/".to_string();
        let enhancer = RemoteEnhancer::from_config(&config).unwrap();
        assert_eq!(
            enhancer.result_url("abc"),
            "https://svc.example.com/result/abc"
        );
    }
}
