use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};
use tokio::time::timeout;

use crate::error::ModelCallError;

/// One system + user exchange asking for a single completion.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub system: String,
    pub user: String,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
}

impl CompletionRequest {
    /// Short, near-deterministic call whose answer is a single verdict token.
    pub fn classification(
        model: impl Into<String>,
        system: impl Into<String>,
        user: impl Into<String>,
        temperature: f32,
        max_tokens: u32,
    ) -> Self {
        Self {
            model: model.into(),
            system: system.into(),
            user: user.into(),
            temperature,
            max_tokens: Some(max_tokens),
        }
    }

    /// Open-ended call; `max_tokens: None` leaves the length to the provider.
    pub fn generation(
        model: impl Into<String>,
        system: impl Into<String>,
        user: impl Into<String>,
        temperature: f32,
        max_tokens: Option<u32>,
    ) -> Self {
        Self {
            model: model.into(),
            system: system.into(),
            user: user.into(),
            temperature,
            max_tokens,
        }
    }
}

/// Anything that turns role-tagged messages into one completion's text.
///
/// `Ok(None)` means the provider answered but produced no content.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn complete(&self, request: &CompletionRequest)
    -> Result<Option<String>, ModelCallError>;
}

pub struct CompletionsClient {
    http: Client,
    api_key: String,
    base: String,
}

impl CompletionsClient {
    pub fn new(api_key: String, base: Option<String>) -> Result<Self, ModelCallError> {
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .build()?;
        Ok(Self {
            http,
            api_key,
            base: base
                .map(|base| base.trim_end_matches('/').to_string())
                .unwrap_or_else(|| "https://api.openai.com".into()),
        })
    }

    async fn post_json(&self, path: &str, body: &Value) -> reqwest::Result<reqwest::Response> {
        self.http
            .post(format!("{}/v1{}", self.base, path))
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
    }
}

#[async_trait]
impl LanguageModel for CompletionsClient {
    async fn complete(
        &self,
        request: &CompletionRequest,
    ) -> Result<Option<String>, ModelCallError> {
        let body = request_body(request);
        let resp = self.post_json("/chat/completions", &body).await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ModelCallError::Provider {
                status: status.as_u16(),
                body,
            });
        }

        let root: Value = resp
            .json()
            .await
            .map_err(|err| ModelCallError::Decode(err.to_string()))?;
        Ok(first_choice_text(&root))
    }
}

/// Run a completion under a deadline; expiry counts as a failed call.
pub(crate) async fn complete_within(
    model: &dyn LanguageModel,
    request: &CompletionRequest,
    limit: Duration,
) -> Result<Option<String>, ModelCallError> {
    timeout(limit, model.complete(request))
        .await
        .map_err(|_| ModelCallError::Timeout(limit))?
}

fn request_body(request: &CompletionRequest) -> Value {
    let mut body = json!({
        "model": request.model,
        "messages": [
            { "role": "system", "content": request.system },
            { "role": "user",   "content": request.user }
        ],
        "temperature": request.temperature,
        "n": 1,
    });
    if let Some(max_tokens) = request.max_tokens {
        body["max_tokens"] = json!(max_tokens);
    }
    body
}

fn first_choice_text(root: &Value) -> Option<String> {
    let content = root
        .get("choices")?
        .as_array()?
        .first()?
        .get("message")?
        .get("content")?;

    match content {
        Value::String(text) => Some(text.clone()),
        // Some compatible providers send content as typed parts.
        Value::Array(parts) => {
            let text: String = parts
                .iter()
                .filter_map(|part| part.get("text").and_then(Value::as_str))
                .collect();
            Some(text)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(max_tokens: Option<u32>) -> CompletionRequest {
        CompletionRequest {
            model: "gpt-3.5-turbo".to_string(),
            system: "system".to_string(),
            user: "user".to_string(),
            temperature: 0.1,
            max_tokens,
        }
    }

    #[test]
    fn classification_shape_is_always_capped() {
        let request = CompletionRequest::classification("gpt-3.5-turbo", "sys", "usr", 0.1, 5);
        assert_eq!(request.max_tokens, Some(5));
        assert_eq!(request.system, "sys");
        assert_eq!(request.user, "usr");

        let body = request_body(&request);
        assert_eq!(body["model"], "gpt-3.5-turbo");
        assert_eq!(body["max_tokens"], 5);
    }

    #[test]
    fn generation_shape_may_be_unbounded() {
        let request = CompletionRequest::generation("gpt-4o", "sys", "usr", 0.7, None);
        assert_eq!(request.model, "gpt-4o");
        assert!(request.max_tokens.is_none());
        assert!(request_body(&request).get("max_tokens").is_none());
    }

    #[test]
    fn body_carries_both_roles_in_order() {
        let body = request_body(&request(Some(5)));
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["max_tokens"], 5);
        assert_eq!(body["n"], 1);
    }

    #[test]
    fn body_omits_token_cap_when_unbounded() {
        let body = request_body(&request(None));
        assert!(body.get("max_tokens").is_none());
    }

    #[test]
    fn reads_first_choice_content() {
        let root = json!({
            "choices": [
                { "message": { "role": "assistant", "content": "true" } },
                { "message": { "role": "assistant", "content": "false" } }
            ]
        });
        assert_eq!(first_choice_text(&root).as_deref(), Some("true"));
    }

    #[test]
    fn joins_content_parts() {
        let root = json!({
            "choices": [{ "message": { "content": [
                { "type": "text", "text": "Mitosis is " },
                { "type": "text", "text": "cell division." }
            ] } }]
        });
        assert_eq!(
            first_choice_text(&root).as_deref(),
            Some("Mitosis is cell division.")
        );
    }

    #[test]
    fn missing_or_null_content_is_none() {
        assert!(first_choice_text(&json!({ "choices": [] })).is_none());
        assert!(first_choice_text(&json!({ "choices": [{ "message": { "content": null } }] })).is_none());
        assert!(first_choice_text(&json!({ "error": "nope" })).is_none());
    }
}
