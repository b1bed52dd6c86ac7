//! OCR via Azure AI Vision Image Analysis (`read` feature).

use std::time::Duration;

use serde::Deserialize;

use async_trait::async_trait;

use super::TextExtractor;
use crate::config::VisionConfig;

#[derive(Debug, thiserror::Error)]
pub enum VisionError {
    #[error("vision service not configured: {0}")]
    NotConfigured(String),
    #[error("vision request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("vision service returned HTTP {status}: {body}")]
    Api { status: u16, body: String },
    #[error("unexpected vision response: {0}")]
    Decode(String),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeResponse {
    read_result: Option<ReadResult>,
}

#[derive(Debug, Deserialize)]
struct ReadResult {
    #[serde(default)]
    blocks: Vec<ReadBlock>,
}

#[derive(Debug, Deserialize)]
struct ReadBlock {
    #[serde(default)]
    lines: Vec<ReadLine>,
}

#[derive(Debug, Deserialize)]
struct ReadLine {
    text: String,
}

/// Pull every non-blank line of text out of an Image Analysis response body.
pub fn parse_read_result(body: &str) -> Result<Vec<String>, VisionError> {
    let response: AnalyzeResponse =
        serde_json::from_str(body).map_err(|e| VisionError::Decode(e.to_string()))?;
    let read = response
        .read_result
        .ok_or_else(|| VisionError::Decode("response has no readResult".into()))?;

    Ok(read
        .blocks
        .into_iter()
        .flat_map(|block| block.lines)
        .map(|line| line.text.trim().to_string())
        .filter(|text| !text.is_empty())
        .collect())
}

/// Image Analysis 4.0 client.
pub struct AzureVisionReader {
    client: reqwest::Client,
    analyze_url: String,
    api_key: String,
}

impl AzureVisionReader {
    /// Build a client. Fails with `NotConfigured` if the endpoint is empty or
    /// the API key variable is unset.
    pub fn from_config(config: &VisionConfig) -> Result<Self, VisionError> {
        if config.endpoint.trim().is_empty() {
            return Err(VisionError::NotConfigured("vision endpoint is empty".into()));
        }
        let api_key = std::env::var(&config.api_key_env).map_err(|_| {
            VisionError::NotConfigured(format!("{} is not set", config.api_key_env))
        })?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            analyze_url: analyze_url(&config.endpoint, &config.api_version),
            api_key,
        })
    }
}

fn analyze_url(endpoint: &str, api_version: &str) -> String {
    format!(
        "{}/computervision/imageanalysis:analyze?api-version={api_version}&features=read",
        endpoint.trim_end_matches('/')
    )
}

#[async_trait]
impl TextExtractor for AzureVisionReader {
    async fn extract_lines(&self, image: &[u8]) -> Result<Vec<String>, VisionError> {
        tracing::debug!(bytes = image.len(), "requesting OCR");
        let response = self
            .client
            .post(&self.analyze_url)
            .header("Ocp-Apim-Subscription-Key", &self.api_key)
            .header("Content-Type", "application/octet-stream")
            .body(image.to_vec())
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(VisionError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let lines = parse_read_result(&body)?;
        tracing::info!(lines = lines.len(), "OCR complete");
        Ok(lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_lines_from_every_block() {
        let body = r#"{
            "modelVersion": "2023-10-01",
            "readResult": {
                "blocks": [
                    {"lines": [{"text": "Lista zakupów", "words": []}, {"text": "2x mleko"}]},
                    {"lines": [{"text": "  "}, {"text": "chleb"}]}
                ]
            }
        }"#;

        let lines = parse_read_result(body).unwrap();
        assert_eq!(lines, ["Lista zakupów", "2x mleko", "chleb"]);
    }

    #[test]
    fn empty_image_yields_no_lines() {
        let lines = parse_read_result(r#"{"readResult": {"blocks": []}}"#).unwrap();
        assert!(lines.is_empty());
    }

    #[test]
    fn missing_read_result_is_an_error() {
        let err = parse_read_result(r#"{"captionResult": {}}"#).unwrap_err();
        assert!(matches!(err, VisionError::Decode(_)));
        assert!(parse_read_result("not json").is_err());
    }

    #[test]
    fn analyze_url_trims_trailing_slash() {
        assert_eq!(
            analyze_url("https://example.cognitiveservices.azure.com/", "2024-02-01"),
            "https://example.cognitiveservices.azure.com/computervision/imageanalysis:analyze?api-version=2024-02-01&features=read"
        );
    }
}
