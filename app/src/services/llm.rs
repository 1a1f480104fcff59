use crate::{config::app_config, modules::common::responses::SimpleError};
use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error};

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("the LLM api key is not configured")]
    NotConfigured,

    #[error("LLM request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("unexpected LLM reply: {0}")]
    BadReply(String),
}

impl From<LlmError> for (StatusCode, SimpleError) {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::NotConfigured => (
                StatusCode::SERVICE_UNAVAILABLE,
                SimpleError::from("AI features are not available"),
            ),
            LlmError::Request(e) => {
                error!("[LLM] {e}");
                (
                    StatusCode::BAD_GATEWAY,
                    SimpleError::from("failed to reach the AI provider"),
                )
            }
            LlmError::BadReply(reply) => {
                error!("[LLM] unexpected reply: {reply}");
                (
                    StatusCode::BAD_GATEWAY,
                    SimpleError::from("the AI provider returned a invalid reply"),
                )
            }
        }
    }
}

struct LlmApi {
    key: String,
    url: String,
    model: String,
}

/// Client for a OpenAI compatible chat completion api.
///
/// when no api key is configured every call fails with `LlmError::NotConfigured`
#[derive(Clone)]
pub struct LlmClient {
    http: reqwest::Client,
    api: Option<Arc<LlmApi>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Deserialize)]
struct ReplyMessage {
    content: Option<String>,
    function_call: Option<FunctionCall>,
}

#[derive(Deserialize)]
struct FunctionCall {
    arguments: String,
}

impl LlmClient {
    pub fn new(http: reqwest::Client, key: String, url: String, model: String) -> Self {
        Self {
            http,
            api: Some(Arc::new(LlmApi {
                key,
                url: url.trim_end_matches('/').to_string(),
                model,
            })),
        }
    }

    pub fn disabled(http: reqwest::Client) -> Self {
        Self { http, api: None }
    }

    /// creates the client from the app config, disabled if `OPENAI_API_KEY` is not set
    pub fn from_config(http: reqwest::Client) -> Self {
        let cfg = app_config();

        match &cfg.openai_api_key {
            Some(key) if !key.is_empty() => Self::new(
                http,
                key.clone(),
                cfg.openai_api_url.clone(),
                cfg.openai_model.clone(),
            ),
            _ => Self::disabled(http),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.api.is_some()
    }

    async fn complete(&self, mut body: Value) -> Result<ReplyMessage, LlmError> {
        let api = self.api.as_ref().ok_or(LlmError::NotConfigured)?;

        body["model"] = Value::String(api.model.clone());

        debug!("[LLM] requesting completion");

        let res: CompletionResponse = self
            .http
            .post(format!("{}/chat/completions", api.url))
            .bearer_auth(&api.key)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        res.choices
            .into_iter()
            .next()
            .map(|choice| choice.message)
            .ok_or_else(|| LlmError::BadReply(String::from("no choices")))
    }

    /// sends a system and user message, returning the text reply
    pub async fn chat(
        &self,
        system: &str,
        user: &str,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String, LlmError> {
        let body = json!({
            "messages": [
                ChatMessage { role: "system", content: system },
                ChatMessage { role: "user", content: user },
            ],
            "temperature": temperature,
            "max_tokens": max_tokens,
        });

        self.complete(body)
            .await?
            .content
            .ok_or_else(|| LlmError::BadReply(String::from("empty content")))
    }

    /// forces the model to call `function_name` with arguments matching `parameters`,
    /// a json schema, returning the parsed arguments
    pub async fn call_function(
        &self,
        system: &str,
        user: &str,
        function_name: &str,
        parameters: Value,
    ) -> Result<Value, LlmError> {
        let body = json!({
            "messages": [
                ChatMessage { role: "system", content: system },
                ChatMessage { role: "user", content: user },
            ],
            "functions": [{ "name": function_name, "parameters": parameters }],
            "function_call": { "name": function_name },
        });

        let reply = self.complete(body).await?;

        let arguments = reply
            .function_call
            .map(|call| call.arguments)
            .ok_or_else(|| LlmError::BadReply(String::from("missing function call")))?;

        serde_json::from_str(&arguments).map_err(|_| LlmError::BadReply(arguments))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn disabled_client_fails_without_network() {
        let client = LlmClient::disabled(reqwest::Client::new());

        assert!(!client.is_enabled());
        assert!(matches!(
            client.chat("system", "hello", 0.7, 10).await,
            Err(LlmError::NotConfigured)
        ));
    }

    #[test]
    fn maps_errors_to_status_codes() {
        let (status, _) = <(StatusCode, SimpleError)>::from(LlmError::NotConfigured);
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

        let (status, _) =
            <(StatusCode, SimpleError)>::from(LlmError::BadReply(String::from("not json")));
        assert_eq!(status, StatusCode::BAD_GATEWAY);
    }
}
