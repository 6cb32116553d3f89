//! Anthropic Messages API provider.
//!
//! Sends the pattern image to a vision-capable Claude model and normalizes
//! the response into a flat name list. The outbound request pins the current
//! tool-invocation output contract; extraction also accepts the older
//! structured-JSON-in-text contract so responses produced under either API
//! revision yield the same result.

use super::{NamingProvider, ProviderError};
use crate::config::AnthropicConfig;
use async_trait::async_trait;
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Tool the model is forced to invoke with its suggestions.
pub const NAME_TOOL: &str = "suggest_pattern_names";

const NAMING_PROMPT: &str = "Look at this image of a knitting pattern and suggest 2-4 short names \
    for it (3 words or fewer each). Prefer descriptive names based on what the pattern depicts, \
    then evocative ones. Avoid words like grid, tile, or pixel.";

/// Call timeout for one naming request.
const CALL_TIMEOUT: Duration = Duration::from_secs(30);

/// Anthropic-backed naming provider.
pub struct AnthropicProvider {
    config: AnthropicConfig,
    client: Client,
}

#[derive(Serialize)]
struct MessagesRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<Message>,
    tools: Vec<ToolSpec>,
    tool_choice: ToolChoice,
}

#[derive(Serialize)]
struct Message {
    role: &'static str,
    content: Vec<ContentPart>,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    Image { source: ImageSource },
    Text { text: String },
}

#[derive(Serialize)]
struct ImageSource {
    #[serde(rename = "type")]
    kind: &'static str,
    media_type: &'static str,
    data: String,
}

#[derive(Serialize)]
struct ToolSpec {
    name: &'static str,
    description: &'static str,
    input_schema: serde_json::Value,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ToolChoice {
    Tool { name: &'static str },
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

/// One unit of the provider response, tagged by kind. Unknown kinds
/// deserialize to `Other` and are skipped during extraction.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    ToolUse {
        name: String,
        input: serde_json::Value,
    },
    Text {
        text: String,
    },
    #[serde(other)]
    Other,
}

/// The output shape both contracts constrain the model to.
#[derive(Debug, Deserialize)]
struct NameList {
    names: Vec<String>,
}

impl AnthropicProvider {
    pub fn new(config: AnthropicConfig) -> Self {
        let client = Client::builder()
            .timeout(CALL_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    fn build_request(&self, image_data: &str) -> MessagesRequest {
        MessagesRequest {
            model: self.config.model.clone(),
            max_tokens: self.config.max_tokens,
            messages: vec![Message {
                role: "user",
                content: vec![
                    ContentPart::Image {
                        source: ImageSource {
                            kind: "base64",
                            media_type: "image/png",
                            data: image_data.to_string(),
                        },
                    },
                    ContentPart::Text {
                        text: NAMING_PROMPT.to_string(),
                    },
                ],
            }],
            tools: vec![ToolSpec {
                name: NAME_TOOL,
                description: "Report the suggested names for the knitting pattern",
                input_schema: serde_json::json!({
                    "type": "object",
                    "properties": {
                        "names": {
                            "type": "array",
                            "items": { "type": "string" }
                        }
                    },
                    "required": ["names"],
                    "additionalProperties": false
                }),
            }],
            tool_choice: ToolChoice::Tool { name: NAME_TOOL },
        }
    }
}

#[async_trait]
impl NamingProvider for AnthropicProvider {
    async fn suggest_names(&self, image_data: &str) -> Result<Vec<String>, ProviderError> {
        let request = self.build_request(image_data);
        let url = format!("{}/v1/messages", self.config.api_base_url);

        tracing::debug!(
            model = %self.config.model,
            image_len = image_data.len(),
            "Sending naming request to Anthropic API"
        );

        let response = self
            .client
            .post(&url)
            .header("x-api-key", self.config.api_key.expose_secret())
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        if !status.is_success() {
            tracing::error!(status = %status, body = %body, "Anthropic API request failed");
            return Err(ProviderError::Api {
                status: status.as_u16(),
                body,
            });
        }

        tracing::debug!(status = %status, body = %body, "Anthropic API response");

        let parsed: MessagesResponse = serde_json::from_str(&body).map_err(|e| {
            ProviderError::MalformedResponse(format!("Failed to parse response body: {}", e))
        })?;

        extract_names(&parsed.content)
    }
}

/// Flatten the `names` arrays of all matching content blocks, in block order.
///
/// A `tool_use` block matches when it carries the naming tool's name; a
/// `text` block matches when its payload is a JSON object. A matching block
/// that then violates the name-list schema fails the whole request. Plain
/// prose text blocks and unknown block kinds are skipped, and a response
/// with no matching block yields an empty list, not an error.
pub fn extract_names(blocks: &[ContentBlock]) -> Result<Vec<String>, ProviderError> {
    let mut names = Vec::new();

    for block in blocks {
        match block {
            ContentBlock::ToolUse { name, input } if name == NAME_TOOL => {
                let list: NameList = serde_json::from_value(input.clone()).map_err(|e| {
                    ProviderError::MalformedResponse(format!(
                        "Tool input does not match the name-list schema: {}",
                        e
                    ))
                })?;
                names.extend(list.names);
            }
            ContentBlock::Text { text } => match serde_json::from_str::<serde_json::Value>(text) {
                Ok(value) if value.is_object() => {
                    let list: NameList = serde_json::from_value(value).map_err(|e| {
                        ProviderError::MalformedResponse(format!(
                            "Text block does not match the name-list schema: {}",
                            e
                        ))
                    })?;
                    names.extend(list.names);
                }
                _ => {}
            },
            _ => {}
        }
    }

    Ok(names)
}
