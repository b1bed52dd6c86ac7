//! LLM-backed structuring of ingredient mentions.
//!
//! [`parse_structured_payload`] is the deterministic half: it validates
//! whatever JSON the model replied with. [`ChatStructurer`] is the HTTP half,
//! an OpenAI-compatible chat-completions client (plain OpenAI, or an Azure
//! OpenAI deployment URL with `api-key` auth).

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use async_trait::async_trait;

use super::IngredientStructurer;
use crate::config::StructuringConfig;
use crate::ledger::IngredientRecord;

const SYSTEM_PROMPT: &str = "You turn grocery text into structured data. \
Drop anything that is not a food or household product. \
Reply with a bare JSON array and nothing else: no prose, no code fences. \
Each element is an object with the keys ingredient, quantity, unit, category. \
Keep ingredient names in the language of the input. \
quantity is a number (integer or decimal); use 1 when the text gives no amount. \
unit is a unit such as kg, g, l, ml, szt or opak.; use \"szt\" when there is none. \
category is a short product category in the language of the input, e.g. Nabiał, Warzywa, Owoce, Pieczywo.";

#[derive(Debug, thiserror::Error)]
pub enum StructuringError {
    #[error("structuring service not configured: {0}")]
    NotConfigured(String),
    #[error("structuring request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("structuring service returned HTTP {status}: {body}")]
    Api { status: u16, body: String },
    #[error("structuring service returned an empty reply")]
    EmptyReply,
    #[error("malformed structured payload: {0}")]
    Malformed(String),
}

/// Parse a model reply into records.
///
/// Accepts a JSON array of records, an object wrapping the array under
/// `ingredients`, or a single record object, optionally inside a Markdown code
/// fence. Each record needs a non-empty string `ingredient`; `quantity` may be
/// a number or numeric string and defaults to 1; `unit` and `category` are
/// optional strings.
pub fn parse_structured_payload(raw: &str) -> Result<Vec<IngredientRecord>, StructuringError> {
    let body = strip_code_fence(raw);
    let value: Value = serde_json::from_str(body)
        .map_err(|e| StructuringError::Malformed(format!("not valid JSON ({e})")))?;

    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("ingredients") {
            Some(Value::Array(items)) => items,
            Some(_) => {
                return Err(StructuringError::Malformed(
                    "'ingredients' must be an array".into(),
                ))
            }
            None => vec![Value::Object(map)],
        },
        other => {
            return Err(StructuringError::Malformed(format!(
                "expected an array or object, got {}",
                json_kind(&other)
            )))
        }
    };

    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| parse_record(i, item))
        .collect()
}

fn parse_record(index: usize, item: Value) -> Result<IngredientRecord, StructuringError> {
    let malformed = |reason: String| StructuringError::Malformed(format!("item {index}: {reason}"));

    let map = match item {
        Value::Object(map) => map,
        other => {
            return Err(malformed(format!(
                "expected an object, got {}",
                json_kind(&other)
            )))
        }
    };

    let ingredient = match map.get("ingredient") {
        Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        Some(_) => return Err(malformed("'ingredient' must be a non-empty string".into())),
        None => return Err(malformed("missing 'ingredient'".into())),
    };

    let quantity = match map.get("quantity") {
        None | Some(Value::Null) => 1.0,
        Some(Value::Number(n)) => n
            .as_f64()
            .ok_or_else(|| malformed("'quantity' is out of range".into()))?,
        Some(Value::String(s)) => s
            .trim()
            .replace(',', ".")
            .parse::<f64>()
            .map_err(|_| malformed(format!("'quantity' is not a number: {s:?}")))?,
        Some(other) => {
            return Err(malformed(format!(
                "'quantity' must be a number, got {}",
                json_kind(other)
            )))
        }
    };

    Ok(IngredientRecord {
        ingredient,
        quantity,
        unit: optional_string(&map, "unit").map_err(malformed)?,
        category: optional_string(&map, "category").map_err(malformed)?,
    })
}

fn optional_string(
    map: &serde_json::Map<String, Value>,
    key: &str,
) -> Result<Option<String>, String> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(format!("'{key}' must be a string, got {}", json_kind(other))),
    }
}

fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string (```json) up to the first newline.
    let rest = rest.split_once('\n').map_or("", |(_, body)| body);
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    content: Option<String>,
}

/// How the API key is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AuthStyle {
    Bearer,
    ApiKeyHeader,
}

/// Chat-completions client that structures ingredient text.
pub struct ChatStructurer {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: String,
    auth: AuthStyle,
}

impl ChatStructurer {
    /// Build a client. Fails with `NotConfigured` if the API key variable is
    /// unset or the auth style is unknown.
    pub fn from_config(config: &StructuringConfig) -> Result<Self, StructuringError> {
        let api_key = std::env::var(&config.api_key_env).map_err(|_| {
            StructuringError::NotConfigured(format!("{} is not set", config.api_key_env))
        })?;
        let auth = match config.auth.as_str() {
            "bearer" => AuthStyle::Bearer,
            "api-key" => AuthStyle::ApiKeyHeader,
            other => {
                return Err(StructuringError::NotConfigured(format!(
                    "unknown auth style: {other}. Supported: bearer, api-key"
                )))
            }
        };
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            api_key,
            auth,
        })
    }

    async fn complete(&self, text: &str) -> Result<String, StructuringError> {
        let request = ChatCompletionRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system".into(),
                    content: SYSTEM_PROMPT.into(),
                },
                ChatMessage {
                    role: "user".into(),
                    content: text.into(),
                },
            ],
        };

        let builder = self.client.post(&self.endpoint).json(&request);
        let builder = match self.auth {
            AuthStyle::Bearer => builder.bearer_auth(&self.api_key),
            AuthStyle::ApiKeyHeader => builder.header("api-key", &self.api_key),
        };

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StructuringError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let completion: ChatCompletionResponse = response.json().await?;
        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(StructuringError::EmptyReply)
    }
}

#[async_trait]
impl IngredientStructurer for ChatStructurer {
    async fn structure(&self, text: &str) -> Result<Vec<IngredientRecord>, StructuringError> {
        tracing::debug!(text_len = text.len(), "requesting structuring");
        let reply = self.complete(text).await?;
        let records = parse_structured_payload(&reply)?;
        tracing::info!(records = records.len(), "structuring reply parsed");
        Ok(records)
    }
}
