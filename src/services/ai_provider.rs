use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Failure classes a model provider can surface. The generator decides retry
/// policy from the variant alone, never from message text.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProviderError {
    #[error("quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),

    #[error("model not found: {0}")]
    NotFound(String),

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("{0}")]
    Transient(String),
}

/// Prompt in, raw text out.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GenerativeModelProvider: Send + Sync {
    async fn complete(&self, prompt: &str, model: &str) -> Result<String, ProviderError>;
}

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(rename = "generationConfig")]
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
struct GeminiGenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: i32,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: GeminiContent,
}

/// Google Gemini `generateContent` adapter.
#[derive(Clone)]
pub struct GeminiProvider {
    client: Client,
    api_key: String,
    base_url: String,
    timeout: Duration,
}

impl GeminiProvider {
    pub fn new(api_key: String, base_url: String, client: Client, timeout: Duration) -> Self {
        Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        }
    }

    fn request_failure(&self, err: reqwest::Error) -> ProviderError {
        if err.is_timeout() {
            ProviderError::Timeout(self.timeout)
        } else {
            ProviderError::Transient(format!("request failed: {}", err))
        }
    }
}

#[async_trait]
impl GenerativeModelProvider for GeminiProvider {
    async fn complete(&self, prompt: &str, model: &str) -> Result<String, ProviderError> {
        let request = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GeminiGenerationConfig {
                temperature: 0.7,
                max_output_tokens: 8192,
            },
        };

        let url = format!("{}/models/{}:generateContent", self.base_url, model);
        let res = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .timeout(self.timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.request_failure(e))?;

        let status = res.status();
        if !status.is_success() {
            let text = res.text().await.unwrap_or_default();
            tracing::warn!(model, %status, "Gemini API error");
            return Err(classify_failure(status, &text));
        }

        let body: GeminiResponse = res
            .json()
            .await
            .map_err(|e| ProviderError::Transient(format!("invalid response body: {}", e)))?;

        let text: String = body
            .candidates
            .into_iter()
            .next()
            .map(|c| c.content.parts.into_iter().map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(ProviderError::Transient("empty response from model".to_string()));
        }
        Ok(text)
    }
}

/// Maps an unsuccessful HTTP reply onto a provider failure class.
pub fn classify_failure(status: StatusCode, body: &str) -> ProviderError {
    let summary: String = body.chars().take(300).collect();
    let message = format!("{}: {}", status, summary);

    if status == StatusCode::TOO_MANY_REQUESTS
        || body.contains("RESOURCE_EXHAUSTED")
        || body.to_lowercase().contains("quota")
    {
        ProviderError::QuotaExceeded(message)
    } else if status == StatusCode::UNAUTHORIZED
        || status == StatusCode::FORBIDDEN
        || body.contains("API_KEY_INVALID")
        || body.contains("PERMISSION_DENIED")
    {
        ProviderError::InvalidCredentials(message)
    } else if status == StatusCode::NOT_FOUND {
        ProviderError::NotFound(message)
    } else {
        ProviderError::Transient(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limits_are_quota_failures() {
        assert!(matches!(
            classify_failure(StatusCode::TOO_MANY_REQUESTS, ""),
            ProviderError::QuotaExceeded(_)
        ));
        assert!(matches!(
            classify_failure(StatusCode::BAD_REQUEST, r#"{"status":"RESOURCE_EXHAUSTED"}"#),
            ProviderError::QuotaExceeded(_)
        ));
    }

    #[test]
    fn credential_and_not_found_failures_are_distinct() {
        assert!(matches!(
            classify_failure(StatusCode::BAD_REQUEST, "API_KEY_INVALID"),
            ProviderError::InvalidCredentials(_)
        ));
        assert!(matches!(
            classify_failure(StatusCode::FORBIDDEN, ""),
            ProviderError::InvalidCredentials(_)
        ));
        assert!(matches!(
            classify_failure(StatusCode::NOT_FOUND, "models/x is not found"),
            ProviderError::NotFound(_)
        ));
        assert!(matches!(
            classify_failure(StatusCode::INTERNAL_SERVER_ERROR, "boom"),
            ProviderError::Transient(_)
        ));
    }

    #[tokio::test]
    async fn unresponsive_endpoint_surfaces_as_timeout() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let timeout = Duration::from_millis(100);
        let provider = GeminiProvider::new(
            "test-key".to_string(),
            format!("http://{}", addr),
            Client::new(),
            timeout,
        );

        let err = provider.complete("prompt", "any-model").await.unwrap_err();
        assert_eq!(err, ProviderError::Timeout(timeout));
    }

    #[tokio::test]
    async fn refused_connection_is_transient() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let provider = GeminiProvider::new(
            "test-key".to_string(),
            format!("http://{}", addr),
            Client::new(),
            Duration::from_secs(5),
        );

        let err = provider.complete("prompt", "any-model").await.unwrap_err();
        assert!(matches!(err, ProviderError::Transient(_)));
    }
}
