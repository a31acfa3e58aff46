//! Anthropic Messages API provider.

use crate::prompt::{build_prompt, parse_scenarios};
use crate::{require_request, ExpandError, ScenarioExpander};
use async_trait::async_trait;
use qa_core::config::ExpanderConfig;
use qa_core::types::ScenarioDraft;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

pub const ANTHROPIC_VERSION: &str = "2023-06-01";
const MESSAGES_PATH: &str = "/v1/messages";

#[derive(Debug, Clone)]
pub struct AnthropicExpander {
    client: reqwest::Client,
    api_key: Option<String>,
    model: String,
    api_base: String,
    max_tokens: u32,
    timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

impl AnthropicExpander {
    pub fn from_config(config: &ExpanderConfig) -> Result<Self, ExpandError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|err| ExpandError::Transport {
                message: format!("failed to build HTTP client: {err}"),
            })?;
        Ok(Self {
            client,
            api_key: config.api_key.clone().filter(|key| !key.trim().is_empty()),
            model: config.model_or_default().to_string(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            max_tokens: config.max_tokens,
            timeout: Duration::from_secs(config.timeout_secs),
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn call_api(&self, api_key: &str, prompt: &str) -> Result<String, ExpandError> {
        let response = self
            .client
            .post(format!("{}{MESSAGES_PATH}", self.api_base))
            .timeout(self.timeout)
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&serde_json::json!({
                "model": &self.model,
                "max_tokens": self.max_tokens,
                "messages": [{
                    "role": "user",
                    "content": [{"type": "text", "text": prompt}]
                }]
            }))
            .send()
            .await
            .map_err(|err| self.transport_error(err))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ExpandError::Transport {
                message: format!("Anthropic API returned {status}: {body}"),
            });
        }

        let body: MessagesResponse = response
            .json()
            .await
            .map_err(|err| self.transport_error(err))?;
        Ok(body
            .content
            .into_iter()
            .filter(|block| block.kind == "text")
            .map(|block| block.text.unwrap_or_default())
            .collect::<Vec<_>>()
            .join("\n"))
    }

    fn transport_error(&self, err: reqwest::Error) -> ExpandError {
        if err.is_timeout() {
            ExpandError::Timeout {
                secs: self.timeout.as_secs(),
            }
        } else {
            ExpandError::Transport {
                message: err.to_string(),
            }
        }
    }
}

#[async_trait]
impl ScenarioExpander for AnthropicExpander {
    fn name(&self) -> &str {
        "anthropic"
    }

    async fn expand(&self, request: &str) -> Result<Vec<ScenarioDraft>, ExpandError> {
        let request = require_request(request)?;
        let api_key = self.api_key.as_deref().ok_or(ExpandError::MissingApiKey)?;

        info!(model = %self.model, "expanding scenario request");
        let text = self.call_api(api_key, &build_prompt(request)).await?;
        debug!(bytes = text.len(), "received model response");
        parse_scenarios(&text)
    }
}
