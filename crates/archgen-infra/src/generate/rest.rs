//! REST generation backend.
//!
//! Sends render requests to an image-generation HTTP API
//! (`/v1/renders`) with bearer authentication. The API key is wrapped in
//! [`secrecy::SecretString`] and is never logged or included in `Debug`
//! output.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use archgen_core::generate::GenerationBackend;
use archgen_types::generation::{GenerationError, GenerationRequest, GenerationResult};

/// Default end-to-end timeout per render call. Sheet renders are slow;
/// anything past this is treated as a timeout, not a transport error.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(180);

/// REST image-generation backend.
// Intentionally no Debug derive; the SecretString field already refuses
// to print, and omitting Debug keeps the whole client out of logs.
pub struct RestGenerationBackend {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
    model: String,
}

/// Wire request for one render.
#[derive(Debug, Serialize)]
struct RenderRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    negative_prompt: &'a str,
    seed: u64,
    width: u32,
    height: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    init_image_url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    strength: Option<f64>,
}

/// Wire response for one render.
#[derive(Debug, Deserialize)]
struct RenderResponse {
    image_url: String,
    seed: u64,
    model: String,
    #[serde(default)]
    latency_ms: u64,
    #[serde(default)]
    trace_id: String,
}

impl RestGenerationBackend {
    pub fn new(api_key: SecretString, base_url: String, model: String) -> Result<Self, GenerationError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| GenerationError::Transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key,
            base_url,
            model,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Override the base URL (useful for testing or proxies).
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn to_render_request<'a>(&'a self, request: &'a GenerationRequest) -> RenderRequest<'a> {
        RenderRequest {
            model: &self.model,
            prompt: &request.prompt,
            negative_prompt: &request.negative_prompt,
            seed: request.seed,
            width: request.width,
            height: request.height,
            init_image_url: request.init_image_url.as_deref(),
            strength: request.strength,
        }
    }
}

/// Parse a `Retry-After` header value, seconds only.
fn retry_after_ms(headers: &reqwest::header::HeaderMap) -> Option<u64> {
    headers
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(|secs| secs * 1_000)
}

impl GenerationBackend for RestGenerationBackend {
    fn name(&self) -> &str {
        "rest"
    }

    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResult, GenerationError> {
        let body = self.to_render_request(request);
        let url = self.url("/v1/renders");

        let response = self
            .client
            .post(&url)
            .bearer_auth(self.api_key.expose_secret())
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GenerationError::Timeout
                } else {
                    GenerationError::Transport(format!("HTTP request failed: {e}"))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = retry_after_ms(response.headers());
            let error_body = response.text().await.unwrap_or_default();
            return Err(match status.as_u16() {
                429 => GenerationError::RateLimited {
                    retry_after_ms: retry_after,
                },
                408 => GenerationError::Timeout,
                code => GenerationError::Server {
                    status: code,
                    message: error_body,
                },
            });
        }

        let render: RenderResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::InvalidResponse(format!("failed to parse response: {e}")))?;

        if render.seed != request.seed {
            return Err(GenerationError::InvalidResponse(format!(
                "backend echoed seed {} for request seed {}",
                render.seed, request.seed
            )));
        }

        Ok(GenerationResult {
            image_url: render.image_url,
            seed: render.seed,
            model: render.model,
            latency_ms: render.latency_ms,
            trace_id: render.trace_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_request_serialization() {
        let backend = RestGenerationBackend::new(
            SecretString::from("test-key"),
            "http://localhost".into(),
            "sheet-v1".into(),
        )
        .unwrap();
        let request = GenerationRequest {
            prompt: "sheet".into(),
            negative_prompt: "drift".into(),
            seed: 123456,
            width: 1536,
            height: 1024,
            init_image_url: None,
            strength: None,
        };
        let json = serde_json::to_string(&backend.to_render_request(&request)).unwrap();
        assert!(json.contains("\"model\":\"sheet-v1\""));
        assert!(json.contains("\"seed\":123456"));
        assert!(!json.contains("init_image_url"));
        assert!(!json.contains("strength"));
    }

    #[test]
    fn test_render_request_carries_init_image() {
        let backend = RestGenerationBackend::new(
            SecretString::from("test-key"),
            "http://localhost".into(),
            "sheet-v1".into(),
        )
        .unwrap();
        let request = GenerationRequest {
            prompt: "sheet".into(),
            negative_prompt: "drift".into(),
            seed: 123456,
            width: 1536,
            height: 1024,
            init_image_url: Some("mem://baseline.png".into()),
            strength: Some(0.35),
        };
        let json = serde_json::to_string(&backend.to_render_request(&request)).unwrap();
        assert!(json.contains("mem://baseline.png"));
        assert!(json.contains("0.35"));
    }

    #[test]
    fn test_retry_after_parsing() {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(reqwest::header::RETRY_AFTER, "2".parse().unwrap());
        assert_eq!(retry_after_ms(&headers), Some(2_000));

        headers.insert(reqwest::header::RETRY_AFTER, "soon".parse().unwrap());
        assert_eq!(retry_after_ms(&headers), None);

        assert_eq!(retry_after_ms(&reqwest::header::HeaderMap::new()), None);
    }

    #[test]
    fn test_url_joins_base_and_path() {
        let backend = RestGenerationBackend::new(
            SecretString::from("test-key"),
            "http://localhost:9999".into(),
            "sheet-v1".into(),
        )
        .unwrap();
        assert_eq!(backend.url("/v1/renders"), "http://localhost:9999/v1/renders");
    }
}
