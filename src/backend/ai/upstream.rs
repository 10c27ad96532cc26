/**
 * AI Service Client
 *
 * Thin `reqwest` client for the external text-generation service. Every
 * call is `POST {base_url}/stream` with a body of the form
 *
 * ```json
 * {"session_id": "sess_...", "query": "{\"text\":\"...\",\"image_base64\":\"...\"}"}
 * ```
 *
 * where `query` is itself a JSON document encoded as a string. The session
 * id keeps conversations of different chats apart on the service side.
 */
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

/// Errors talking to the AI service
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("AI service request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("AI service responded with status: {0}")]
    Status(u16),

    #[error("Failed to encode AI query: {0}")]
    Encode(#[from] serde_json::Error),
}

/// User input forwarded to the AI service
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AiQuery {
    pub text: String,
    /// Base64 image data, empty when the user attached none
    pub image_base64: String,
}

impl AiQuery {
    pub fn new(text: impl Into<String>, image: Option<String>) -> Self {
        Self {
            text: text.into(),
            image_base64: image.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Serialize)]
struct StreamRequest<'a> {
    session_id: &'a str,
    query: String,
}

/// Client for the AI service
#[derive(Clone, Debug)]
pub struct AiUpstream {
    client: reqwest::Client,
    base_url: String,
}

impl AiUpstream {
    pub fn new(base_url: impl Into<String>, connect_timeout: Duration) -> Result<Self, UpstreamError> {
        let client = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn stream_url(&self) -> String {
        format!("{}/stream", self.base_url)
    }

    /// Send a query and return the response once its status is known to be 2xx.
    ///
    /// The body is left unread so callers can relay it chunk by chunk.
    pub async fn open(&self, session_id: &str, query: &AiQuery) -> Result<reqwest::Response, UpstreamError> {
        let body = StreamRequest {
            session_id,
            query: serde_json::to_string(query)?,
        };

        tracing::info!("[AI] Proxying to {} (session {})", self.stream_url(), session_id);
        let response = self.client.post(self.stream_url()).json(&body).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Status(status.as_u16()));
        }
        Ok(response)
    }

    /// Send a query and read the whole response body as text
    pub async fn collect(&self, session_id: &str, query: &AiQuery) -> Result<String, UpstreamError> {
        let response = self.open(session_id, query).await?;
        Ok(response.text().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn upstream(server: &MockServer) -> AiUpstream {
        AiUpstream::new(server.uri(), Duration::from_secs(1)).unwrap()
    }

    #[tokio::test]
    async fn test_collect_sends_nested_query() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/stream"))
            .and(body_json(serde_json::json!({
                "session_id": "sess_1_abcdefghi",
                "query": "{\"text\":\"hello\",\"image_base64\":\"\"}"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_string("Hi there"))
            .expect(1)
            .mount(&server)
            .await;

        let text = upstream(&server)
            .collect("sess_1_abcdefghi", &AiQuery::new("hello", None))
            .await
            .unwrap();
        assert_eq!(text, "Hi there");
    }

    #[tokio::test]
    async fn test_non_success_status_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/stream"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let result = upstream(&server)
            .open("sess_1_abcdefghi", &AiQuery::new("hello", None))
            .await;
        assert!(matches!(result, Err(UpstreamError::Status(503))));
    }

    #[tokio::test]
    async fn test_unreachable_service_is_an_error() {
        let client = AiUpstream::new("http://127.0.0.1:9", Duration::from_millis(200)).unwrap();
        let result = client.collect("sess", &AiQuery::new("hello", None)).await;
        assert!(matches!(result, Err(UpstreamError::Request(_))));
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let client = AiUpstream::new("http://ai.local:8004/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.base_url(), "http://ai.local:8004");
        assert_eq!(client.stream_url(), "http://ai.local:8004/stream");
    }

    #[test]
    fn test_query_with_image() {
        let query = AiQuery::new("what is this", Some("aGVsbG8=".to_string()));
        let encoded = serde_json::to_string(&query).unwrap();
        assert_eq!(encoded, r#"{"text":"what is this","image_base64":"aGVsbG8="}"#);
    }
}
