use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::analysis::GenerateText;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_MODEL: &str = "gemini-2.5-flash";

#[derive(Debug, Error)]
pub enum ServiceError {
    /// The service rejected the configured API key.
    #[error("API key rejected: {0}")]
    InvalidCredential(String),
    /// Transport failure or non-auth service error.
    #[error("service unavailable: {0}")]
    Unavailable(String),
    /// The service answered but the body carried no usable text.
    #[error("malformed response: {0}")]
    BadResponse(String),
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

/// One-shot, non-streaming client for the Gemini `generateContent` endpoint.
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
}

impl GeminiClient {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }
}

impl Default for GeminiClient {
    fn default() -> Self {
        Self::new()
    }
}

impl GenerateText for GeminiClient {
    async fn generate(&self, api_key: &str, prompt: &str) -> Result<String, ServiceError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
        };

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ServiceError::Unavailable(e.to_string()))?;

        let status = response.status();
        // Key problems surface as 400 INVALID_ARGUMENT or 401/403; classify
        // by status rather than scraping the error message text.
        if matches!(
            status,
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN
        ) {
            let detail = response.text().await.unwrap_or_default();
            return Err(ServiceError::InvalidCredential(detail));
        }
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(ServiceError::Unavailable(format!("HTTP {status}: {detail}")));
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| ServiceError::BadResponse(e.to_string()))?;
        extract_text(body)
    }
}

fn extract_text(body: GenerateResponse) -> Result<String, ServiceError> {
    let content = body
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .ok_or_else(|| ServiceError::BadResponse("no candidates in response".to_string()))?;

    let text: String = content
        .parts
        .into_iter()
        .map(|p| p.text)
        .collect::<Vec<_>>()
        .join("");

    if text.is_empty() {
        return Err(ServiceError::BadResponse(
            "candidate carried no text parts".to_string(),
        ));
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_text_from_first_candidate() {
        let body: GenerateResponse = serde_json::from_str(
            r###"{
                "candidates": [
                    {"content": {"parts": [{"text": "## Summary"}, {"text": "\nAll good."}]}},
                    {"content": {"parts": [{"text": "ignored"}]}}
                ]
            }"###,
        )
        .unwrap();
        assert_eq!(extract_text(body).unwrap(), "## Summary\nAll good.");
    }

    #[test]
    fn missing_candidates_is_a_bad_response() {
        let body: GenerateResponse = serde_json::from_str(r#"{}"#).unwrap();
        assert!(matches!(
            extract_text(body),
            Err(ServiceError::BadResponse(_))
        ));
    }

    #[test]
    fn empty_parts_is_a_bad_response() {
        let body: GenerateResponse = serde_json::from_str(
            r#"{"candidates": [{"content": {"parts": []}}]}"#,
        )
        .unwrap();
        assert!(matches!(
            extract_text(body),
            Err(ServiceError::BadResponse(_))
        ));
    }
}
