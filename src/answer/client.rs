//! HTTP client for the natural-language answer service.
//!
//! One endpoint: `POST {base_url}/answer` with a free-text query and a JSON
//! schema describing the structured answer we want back. Auth is an API key
//! header. Every call carries a bounded timeout; callers treat transport and
//! decode failures as degradable (empty result for that unit of work).

use std::time::Duration;

use serde_json::Value;

const USER_AGENT: &str = "prospector/0.3";

/// Errors from answer-service calls.
#[derive(Debug, thiserror::Error)]
pub enum AnswerError {
    #[error("No API key configured for the answer service")]
    NoApiKey,
    #[error("Request failed: {0}")]
    Transport(String),
    #[error("Answer API error {status}: {body}")]
    Http { status: u16, body: String },
    #[error("Unexpected response shape: {0}")]
    Decode(String),
}

/// Client for the answer service.
pub struct AnswerClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl AnswerClient {
    /// Build a client. A missing credential fails here, before any record is
    /// processed.
    pub fn new(api_key: &str, base_url: &str, timeout: Duration) -> Result<Self, AnswerError> {
        if api_key.is_empty() {
            return Err(AnswerError::NoApiKey);
        }
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AnswerError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    /// Submit a query with an output schema; returns the raw `answer` payload.
    ///
    /// The payload may be an array, an object, or a plain string depending on
    /// how the service chose to respond; shape handling lives in
    /// [`crate::answer::decode`].
    pub async fn answer(&self, query: &str, output_schema: &Value) -> Result<Value, AnswerError> {
        let body = serde_json::json!({
            "query": query,
            "text": true,
            "outputSchema": output_schema,
        });

        let resp = self
            .client
            .post(format!("{}/answer", self.base_url))
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .header("User-Agent", USER_AGENT)
            .header("x-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AnswerError::Transport(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let text = resp.text().await.unwrap_or_default();
            let snippet: String = text.chars().take(200).collect();
            return Err(AnswerError::Http {
                status,
                body: snippet,
            });
        }

        let json: Value = resp
            .json()
            .await
            .map_err(|e| AnswerError::Decode(e.to_string()))?;

        Ok(json.get("answer").cloned().unwrap_or(Value::Null))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_key_rejected_at_construction() {
        let err = AnswerClient::new("", "https://api.example.test", Duration::from_secs(30))
            .err()
            .unwrap();
        assert!(matches!(err, AnswerError::NoApiKey));
    }

    #[test]
    fn base_url_trailing_slash_normalized() {
        let client =
            AnswerClient::new("k", "https://api.example.test/", Duration::from_secs(30)).unwrap();
        assert_eq!(client.base_url, "https://api.example.test");
    }
}
