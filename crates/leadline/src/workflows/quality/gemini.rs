use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::assessor::{AssessmentError, GenerativeClient};

/// Minimal client for the Generative Language `generateContent` endpoint.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    endpoint: String,
    timeout: Duration,
}

impl GeminiClient {
    pub fn new(
        api_key: &str,
        model: &str,
        endpoint: &str,
        timeout: Duration,
    ) -> Result<Self, AssessmentError> {
        if api_key.trim().is_empty() {
            return Err(AssessmentError::Configuration(
                "API key must not be blank".to_string(),
            ));
        }
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| AssessmentError::Configuration(err.to_string()))?;

        Ok(Self {
            client,
            api_key: api_key.trim().to_string(),
            model: model.to_string(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    fn generate_url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateResponse {
    fn into_text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let text: String = content
            .parts
            .into_iter()
            .filter_map(|part| part.text)
            .collect::<Vec<_>>()
            .join("");
        (!text.is_empty()).then_some(text)
    }
}

#[async_trait]
impl GenerativeClient for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, AssessmentError> {
        let request = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(self.generate_url())
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    AssessmentError::Timeout(self.timeout)
                } else {
                    AssessmentError::Transport(err.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AssessmentError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let payload: GenerateResponse = response
            .json()
            .await
            .map_err(|err| AssessmentError::Transport(err.to_string()))?;

        payload.into_text().ok_or(AssessmentError::MissingJson)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_blank_key() {
        let result = GeminiClient::new("  ", "gemini-pro", "https://example.test", Duration::from_secs(1));
        assert!(matches!(result, Err(AssessmentError::Configuration(_))));
    }

    #[test]
    fn joins_candidate_parts() {
        let payload: GenerateResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"{\"is_suspicious\":"},{"text":" false}"}]}}]}"#,
        )
        .expect("payload parses");
        assert_eq!(payload.into_text().as_deref(), Some("{\"is_suspicious\": false}"));
    }

    #[tokio::test]
    async fn client_timeout_reports_the_configured_duration() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("listener binds");
        let addr = listener.local_addr().expect("local addr");
        let _server = tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.expect("accepts");
            tokio::time::sleep(Duration::from_secs(5)).await;
        });
        let timeout = Duration::from_millis(200);
        let client = GeminiClient::new("key", "gemini-pro", &format!("http://{addr}"), timeout)
            .expect("client builds");

        let result = client.generate("prompt").await;

        assert_eq!(result, Err(AssessmentError::Timeout(timeout)));
        assert!(AssessmentError::Timeout(timeout).to_string().contains("200ms"));
    }

    #[test]
    fn builds_model_url_without_double_slash() {
        let client = GeminiClient::new("key", "gemini-pro", "https://example.test/v1beta/", Duration::from_secs(1))
            .expect("client builds");
        assert_eq!(
            client.generate_url(),
            "https://example.test/v1beta/models/gemini-pro:generateContent"
        );
    }
}
