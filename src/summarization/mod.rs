//! Student summaries generated by an Ollama-compatible text generation service.
//!
//! The client sends a fixed prompt to `POST {base_url}/api/generate` and reads the streamed
//! reply: one JSON object per line, each carrying a partial `response`. Fragments are joined
//! in order. Every call is a single attempt.

use crate::config::Config;
use crate::students::Student;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors surfaced while generating a student summary.
#[derive(Debug, Error)]
pub enum SummaryError {
    /// The request could not be sent, timed out, or the body could not be read.
    #[error("error sending request to summary service: {0}")]
    Transport(#[from] reqwest::Error),
    /// The generation service answered with a non-success status.
    #[error("error from summary service (status {code}): {body}", code = .status.as_u16())]
    Upstream {
        /// HTTP status returned by the service.
        status: StatusCode,
        /// Raw response body, kept for diagnostics.
        body: String,
    },
    /// A response fragment was not the expected JSON shape.
    #[error("error decoding summary response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Interface implemented by summary generators.
#[async_trait]
pub trait SummaryClient: Send + Sync {
    /// Produce a short professional summary of `student`.
    async fn generate_summary(&self, student: &Student) -> Result<String, SummaryError>;
}

/// Summary client backed by Ollama's `/api/generate` endpoint.
#[derive(Debug, Clone)]
pub struct OllamaSummaryClient {
    http: Client,
    base_url: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

/// One line of the streamed generation output. Only `response` is used.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
#[allow(dead_code)]
struct GenerateFragment {
    model: String,
    response: String,
    done: bool,
}

impl OllamaSummaryClient {
    /// Build a client for `base_url` using `model`, with an optional per-request timeout.
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        timeout: Option<std::time::Duration>,
    ) -> Result<Self, SummaryError> {
        let mut builder = Client::builder().user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build()?,
            base_url: base_url.into(),
            model: model.into(),
        })
    }

    /// Build a client from the loaded runtime configuration.
    pub fn from_config(config: &Config) -> Result<Self, SummaryError> {
        Self::new(
            config.ollama_url.clone(),
            config.summary_model.clone(),
            config.summary_timeout,
        )
    }

    fn endpoint(&self) -> String {
        format!("{}/api/generate", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl SummaryClient for OllamaSummaryClient {
    async fn generate_summary(&self, student: &Student) -> Result<String, SummaryError> {
        let prompt = build_prompt(student);
        let payload = GenerateRequest {
            model: &self.model,
            prompt: &prompt,
        };

        tracing::debug!(
            id = student.id,
            model = %self.model,
            endpoint = %self.endpoint(),
            "Requesting student summary"
        );
        let response = self.http.post(self.endpoint()).json(&payload).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(
                id = student.id,
                status = status.as_u16(),
                "Summary service rejected request"
            );
            return Err(SummaryError::Upstream { status, body });
        }

        let body = response.text().await?;
        let summary = collect_fragments(&body)?;
        tracing::debug!(id = student.id, chars = summary.len(), "Summary generated");
        Ok(summary)
    }
}

/// Render the fixed summary prompt for `student`.
pub fn build_prompt(student: &Student) -> String {
    format!(
        "Generate a brief summary for a student with the following information:\n\
         Name: {}\n\
         Age: {}\n\
         Email: {}\n\
         Please provide a concise professional summary in 2-3 sentences.",
        student.name, student.age, student.email
    )
}

/// Join the `response` fields of a newline-delimited JSON stream, skipping blank lines.
///
/// The first fragment that fails to parse aborts the whole summary.
pub fn collect_fragments(body: &str) -> Result<String, SummaryError> {
    body.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .try_fold(String::new(), |mut summary, line| {
            let fragment: GenerateFragment = serde_json::from_str(line)?;
            summary.push_str(&fragment.response);
            Ok(summary)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::{Method::POST, MockServer};
    use serde_json::json;

    fn ann() -> Student {
        Student {
            id: 1,
            name: "Ann".into(),
            age: 30,
            email: "a@x.com".into(),
        }
    }

    fn client_for(server: &MockServer) -> OllamaSummaryClient {
        OllamaSummaryClient::new(server.base_url(), "llama3", None).expect("client")
    }

    #[test]
    fn prompt_embeds_every_field() {
        let prompt = build_prompt(&ann());
        assert!(prompt.starts_with("Generate a brief summary for a student"));
        assert!(prompt.contains("Name: Ann\n"));
        assert!(prompt.contains("Age: 30\n"));
        assert!(prompt.contains("Email: a@x.com\n"));
        assert!(prompt.ends_with("in 2-3 sentences."));
    }

    #[test]
    fn fragments_are_concatenated_in_order() {
        let body = concat!(
            r#"{"model":"llama3","response":"Ann is ","done":false}"#,
            "\n",
            r#"{"model":"llama3","response":"a student.","done":false}"#,
            "\n\n",
            r#"{"model":"llama3","response":"","done":true,"total_duration":12,"context":[1,2]}"#,
            "\n",
        );
        assert_eq!(collect_fragments(body).expect("summary"), "Ann is a student.");
    }

    #[test]
    fn empty_body_yields_empty_summary() {
        assert_eq!(collect_fragments("\n \n").expect("summary"), "");
    }

    #[test]
    fn malformed_fragment_is_a_decode_error() {
        let body = "{\"response\":\"ok\"}\nnot json\n";
        assert!(matches!(
            collect_fragments(body),
            Err(SummaryError::Decode(_))
        ));
    }

    #[test]
    fn fragment_with_wrong_field_type_is_a_decode_error() {
        assert!(matches!(
            collect_fragments(r#"{"response": 42}"#),
            Err(SummaryError::Decode(_))
        ));
    }

    #[tokio::test]
    async fn ollama_client_streams_summary() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/api/generate")
                    .json_body_partial(r#"{"model":"llama3"}"#)
                    .body_contains("Name: Ann");
                then.status(200).body(concat!(
                    r#"{"model":"llama3","response":"Ann is a diligent","done":false}"#,
                    "\n",
                    r#"{"model":"llama3","response":" student.","done":true}"#,
                    "\n",
                ));
            })
            .await;

        let summary = client_for(&server)
            .generate_summary(&ann())
            .await
            .expect("summary");

        mock.assert_async().await;
        assert_eq!(summary, "Ann is a diligent student.");
    }

    #[tokio::test]
    async fn ollama_client_sends_model_and_prompt() {
        let server = MockServer::start_async().await;
        let expected = json!({ "model": "llama3", "prompt": build_prompt(&ann()) });
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/api/generate").json_body(expected);
                then.status(200)
                    .body(r#"{"model":"llama3","response":"ok","done":true}"#);
            })
            .await;

        client_for(&server)
            .generate_summary(&ann())
            .await
            .expect("summary");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn ollama_client_reports_upstream_status() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/generate");
                then.status(500).body("model not loaded");
            })
            .await;

        let error = client_for(&server)
            .generate_summary(&ann())
            .await
            .expect_err("upstream failure");

        match &error {
            SummaryError::Upstream { status, body } => {
                assert_eq!(*status, StatusCode::INTERNAL_SERVER_ERROR);
                assert_eq!(body, "model not loaded");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(error.to_string().contains("status 500"));
    }

    #[tokio::test]
    async fn ollama_client_reports_decode_failure() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/generate");
                then.status(200).body("<html>proxy error</html>");
            })
            .await;

        let error = client_for(&server)
            .generate_summary(&ann())
            .await
            .expect_err("decode failure");
        assert!(matches!(error, SummaryError::Decode(_)));
    }

    #[tokio::test]
    async fn unreachable_service_is_a_transport_error() {
        // Port 9 (discard) is not expected to be listening on loopback.
        let client = OllamaSummaryClient::new(
            "http://127.0.0.1:9",
            "llama3",
            Some(std::time::Duration::from_secs(5)),
        )
        .expect("client");

        let error = client
            .generate_summary(&ann())
            .await
            .expect_err("transport failure");
        assert!(matches!(error, SummaryError::Transport(_)));
    }
}
