//! Gemini `generateContent` client.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use docquote_core::config::LlmConfig;

use crate::llm::{AdvisoryError, LlmClient};

const API_KEY_HEADER: &str = "x-goog-api-key";
const MAX_ERROR_BODY_CHARS: usize = 512;

pub struct GeminiClient {
    api_key: SecretString,
    base_url: String,
    model: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

impl GeminiClient {
    pub fn new(
        api_key: SecretString,
        base_url: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, AdvisoryError> {
        if api_key.expose_secret().trim().is_empty() {
            return Err(AdvisoryError::MissingCredential);
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| AdvisoryError::Transport(format!("http client: {error}")))?;

        Ok(Self { api_key, base_url: base_url.into(), model: model.into(), client })
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self, AdvisoryError> {
        let api_key = config.api_key.clone().ok_or(AdvisoryError::MissingCredential)?;
        Self::new(
            api_key,
            config.base_url.clone(),
            config.model.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url.trim_end_matches('/'), self.model)
    }
}

#[async_trait]
impl LlmClient for GeminiClient {
    async fn complete(&self, prompt: &str) -> Result<String, AdvisoryError> {
        let started = Instant::now();
        let request = GenerateContentRequest::new(prompt);

        let prompt_chars = prompt.chars().count();
        debug!(model = %self.model, prompt_chars, "sending gemini request");

        let response = self
            .client
            .post(self.endpoint())
            .header(API_KEY_HEADER, self.api_key.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|error| AdvisoryError::Transport(error.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "gemini request rejected");
            return Err(AdvisoryError::Status {
                status: status.as_u16(),
                body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        let envelope: Value = response
            .json()
            .await
            .map_err(|error| AdvisoryError::Envelope(error.to_string()))?;

        debug!(
            model = %self.model,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "gemini response received"
        );

        candidate_text(&envelope)
    }
}

/// Stage 1: pull the first candidate's text out of the response envelope.
pub fn candidate_text(envelope: &Value) -> Result<String, AdvisoryError> {
    envelope
        .pointer("/candidates/0/content/parts/0/text")
        .and_then(Value::as_str)
        .map(str::to_owned)
        .ok_or_else(|| {
            AdvisoryError::Envelope("no text in candidates[0].content.parts[0]".to_string())
        })
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

impl<'a> GenerateContentRequest<'a> {
    fn new(prompt: &'a str) -> Self {
        Self { contents: [Content { parts: [Part { text: prompt }] }] }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use secrecy::SecretString;
    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    use docquote_core::config::AppConfig;

    use super::{candidate_text, GeminiClient, GenerateContentRequest};
    use crate::llm::{AdvisoryError, LlmClient};

    /// Serves exactly one HTTP response and hands back the raw request.
    async fn one_shot_server(
        status_line: &'static str,
        body: String,
    ) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let address = listener.local_addr().expect("local addr");

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.expect("accept");
            let mut received = Vec::new();
            let mut buffer = [0_u8; 4096];
            loop {
                let read = socket.read(&mut buffer).await.expect("read");
                if read == 0 {
                    break;
                }
                received.extend_from_slice(&buffer[..read]);
                if request_complete(&received) {
                    break;
                }
            }

            let response = format!(
                "HTTP/1.1 {status_line}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.expect("write");
            socket.shutdown().await.ok();
            String::from_utf8_lossy(&received).into_owned()
        });

        (format!("http://{address}/v1beta"), handle)
    }

    fn request_complete(received: &[u8]) -> bool {
        let text = String::from_utf8_lossy(received);
        let Some((head, body)) = text.split_once("\r\n\r\n") else {
            return false;
        };
        let length = head
            .lines()
            .find_map(|line| {
                let (name, value) = line.split_once(':')?;
                name.eq_ignore_ascii_case("content-length").then(|| value.trim().parse().ok())?
            })
            .unwrap_or(0_usize);
        body.len() >= length
    }

    fn client(base_url: &str) -> GeminiClient {
        GeminiClient::new(
            SecretString::from("test-key".to_string()),
            base_url,
            "gemini-2.5-flash",
            Duration::from_secs(5),
        )
        .expect("client")
    }

    #[test]
    fn request_body_has_single_text_part() {
        let body = serde_json::to_value(GenerateContentRequest::new("привет")).expect("json");
        assert_eq!(body, json!({"contents": [{"parts": [{"text": "привет"}]}]}));
    }

    #[test]
    fn envelope_text_is_extracted_from_first_candidate() {
        let envelope = json!({
            "candidates": [{"content": {"parts": [{"text": "{\"stage\":\"П\"}"}]}}]
        });
        assert_eq!(candidate_text(&envelope), Ok("{\"stage\":\"П\"}".to_string()));

        let blocked = json!({"promptFeedback": {"blockReason": "SAFETY"}});
        assert!(matches!(candidate_text(&blocked), Err(AdvisoryError::Envelope(_))));
    }

    #[test]
    fn missing_key_is_reported_before_any_request() {
        let config = AppConfig::default();
        let error = GeminiClient::from_config(&config.llm).expect_err("no key configured");
        assert_eq!(error, AdvisoryError::MissingCredential);
    }

    #[test]
    fn debug_output_redacts_api_key() {
        let rendered = format!("{:?}", client("http://localhost"));
        assert!(rendered.contains("[REDACTED]"));
        assert!(!rendered.contains("test-key"));
    }

    #[tokio::test]
    async fn posts_prompt_with_key_header_and_returns_candidate_text() {
        let envelope = json!({
            "candidates": [{"content": {"parts": [{"text": "{\"urgency\":\"Срочно\"}"}]}}]
        });
        let (base_url, server) = one_shot_server("200 OK", envelope.to_string()).await;

        let text = client(&base_url).complete("описание").await.expect("completion");
        assert_eq!(text, "{\"urgency\":\"Срочно\"}");

        let request = server.await.expect("server task");
        assert!(request.starts_with("POST /v1beta/models/gemini-2.5-flash:generateContent"));
        assert!(request.to_ascii_lowercase().contains("x-goog-api-key: test-key"));
        assert!(!request.contains("key=test-key"), "key must not travel in the query string");
    }

    #[tokio::test]
    async fn non_success_status_is_reported_with_body() {
        let (base_url, server) =
            one_shot_server("429 Too Many Requests", "{\"error\":\"quota\"}".to_string()).await;

        let error = client(&base_url).complete("описание").await.expect_err("rate limited");
        assert_eq!(
            error,
            AdvisoryError::Status { status: 429, body: "{\"error\":\"quota\"}".to_string() }
        );
        server.await.expect("server task");
    }

    #[tokio::test]
    async fn unreachable_service_is_a_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let address = listener.local_addr().expect("local addr");
        drop(listener);

        let error = client(&format!("http://{address}"))
            .complete("описание")
            .await
            .expect_err("connection refused");
        assert!(matches!(error, AdvisoryError::Transport(_)));
    }
}
