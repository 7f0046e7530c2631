//! Rate-limited generation client.
//!
//! Wraps a [`GenerationBackend`] with two concerns the backend itself
//! must not own:
//! - a minimum inter-call interval, shared across every design (the
//!   upstream quota is global, not per-design);
//! - transparent, bounded backoff when the upstream answers with a rate
//!   limit. This is quota plumbing, not a business retry -- drift retries
//!   belong to the orchestrator.
//!
//! Every other error kind surfaces unchanged after exactly one upstream
//! call.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

use archgen_types::generation::{GenerationError, GenerationRequest, GenerationResult};

use super::backend::GenerationBackend;

/// Fallback wait when the upstream rate-limits without a Retry-After.
const DEFAULT_RETRY_AFTER: Duration = Duration::from_millis(500);

/// Rate-limited wrapper around a generation backend.
pub struct GenerationClient<B> {
    backend: B,
    min_interval: Duration,
    rate_limit_retries: u32,
    /// Completion time of the most recent upstream call.
    last_call: Mutex<Option<Instant>>,
}

impl<B: GenerationBackend> GenerationClient<B> {
    pub fn new(backend: B, min_interval: Duration, rate_limit_retries: u32) -> Self {
        Self {
            backend,
            min_interval,
            rate_limit_retries,
            last_call: Mutex::new(None),
        }
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Render one image, pacing the upstream and absorbing bounded
    /// rate-limit pushback.
    pub async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResult, GenerationError> {
        let mut attempt = 0;
        loop {
            self.pace().await;

            let result = self.backend.generate(request).await;
            self.mark_called().await;

            match result {
                Ok(result) => {
                    tracing::debug!(
                        backend = self.backend.name(),
                        latency_ms = result.latency_ms,
                        trace_id = %result.trace_id,
                        "generation succeeded"
                    );
                    return Ok(result);
                }
                Err(GenerationError::RateLimited { retry_after_ms })
                    if attempt < self.rate_limit_retries =>
                {
                    attempt += 1;
                    let wait = retry_after_ms
                        .map(Duration::from_millis)
                        .unwrap_or(DEFAULT_RETRY_AFTER);
                    tracing::warn!(
                        attempt,
                        wait_ms = wait.as_millis() as u64,
                        "upstream rate limited, backing off"
                    );
                    tokio::time::sleep(wait).await;
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Sleep until the minimum interval since the previous call elapsed.
    /// The lock is held across the sleep so concurrent callers serialize
    /// into properly spaced slots.
    async fn pace(&self) {
        let mut last = self.last_call.lock().await;
        if let Some(prev) = *last {
            let elapsed = prev.elapsed();
            if elapsed < self.min_interval {
                tokio::time::sleep(self.min_interval - elapsed).await;
            }
        }
        // Reserve the slot before releasing the lock.
        *last = Some(Instant::now());
    }

    async fn mark_called(&self) {
        *self.last_call.lock().await = Some(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Scripted backend: pops one outcome per call.
    struct ScriptedBackend {
        calls: AtomicU32,
        script: Vec<Result<GenerationResult, GenerationError>>,
    }

    impl ScriptedBackend {
        fn new(script: Vec<Result<GenerationResult, GenerationError>>) -> Self {
            Self {
                calls: AtomicU32::new(0),
                script,
            }
        }
    }

    fn ok_result() -> GenerationResult {
        GenerationResult {
            image_url: "mem://sheet.png".into(),
            seed: 123456,
            model: "test-model".into(),
            latency_ms: 5,
            trace_id: "t-1".into(),
        }
    }

    impl GenerationBackend for ScriptedBackend {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn generate(
            &self,
            _request: &GenerationRequest,
        ) -> Result<GenerationResult, GenerationError> {
            let i = self.calls.fetch_add(1, Ordering::SeqCst) as usize;
            match self.script.get(i) {
                Some(Ok(r)) => Ok(r.clone()),
                Some(Err(GenerationError::RateLimited { retry_after_ms })) => {
                    Err(GenerationError::RateLimited {
                        retry_after_ms: *retry_after_ms,
                    })
                }
                Some(Err(GenerationError::Timeout)) => Err(GenerationError::Timeout),
                _ => panic!("backend called more times than scripted"),
            }
        }
    }

    fn request() -> GenerationRequest {
        GenerationRequest {
            prompt: "sheet".into(),
            negative_prompt: "drift".into(),
            seed: 123456,
            width: 1536,
            height: 1024,
            init_image_url: None,
            strength: None,
        }
    }

    #[tokio::test]
    async fn test_success_is_one_upstream_call() {
        let backend = ScriptedBackend::new(vec![Ok(ok_result())]);
        let client = GenerationClient::new(backend, Duration::ZERO, 3);
        let result = client.generate(&request()).await.unwrap();
        assert_eq!(result.seed, 123456);
        assert_eq!(client.backend.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_rate_limit_retried_transparently() {
        let backend = ScriptedBackend::new(vec![
            Err(GenerationError::RateLimited { retry_after_ms: Some(1) }),
            Err(GenerationError::RateLimited { retry_after_ms: Some(1) }),
            Ok(ok_result()),
        ]);
        let client = GenerationClient::new(backend, Duration::ZERO, 3);
        let result = client.generate(&request()).await;
        assert!(result.is_ok());
        assert_eq!(client.backend.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_rate_limit_surfaces_after_bound() {
        let backend = ScriptedBackend::new(vec![
            Err(GenerationError::RateLimited { retry_after_ms: Some(1) }),
            Err(GenerationError::RateLimited { retry_after_ms: Some(1) }),
            Err(GenerationError::RateLimited { retry_after_ms: Some(1) }),
        ]);
        let client = GenerationClient::new(backend, Duration::ZERO, 2);
        let err = client.generate(&request()).await.unwrap_err();
        assert!(matches!(err, GenerationError::RateLimited { .. }));
        assert_eq!(client.backend.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_timeout_is_not_retried() {
        let backend = ScriptedBackend::new(vec![Err(GenerationError::Timeout)]);
        let client = GenerationClient::new(backend, Duration::ZERO, 3);
        let err = client.generate(&request()).await.unwrap_err();
        assert!(matches!(err, GenerationError::Timeout));
        assert_eq!(client.backend.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_minimum_interval_is_enforced() {
        let backend = ScriptedBackend::new(vec![Ok(ok_result()), Ok(ok_result())]);
        let client = GenerationClient::new(backend, Duration::from_millis(200), 0);

        let start = Instant::now();
        client.generate(&request()).await.unwrap();
        client.generate(&request()).await.unwrap();
        assert!(
            start.elapsed() >= Duration::from_millis(200),
            "second call ran before the pacing interval elapsed"
        );
    }
}
