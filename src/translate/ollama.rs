use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::BackendConfig;
use crate::error::{Result, TranslatorError};
use super::{BackendOutput, TranslationBackend};

#[derive(Debug, Clone, Serialize)]
struct GenerateRequest {
    model: String,
    prompt: String,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct TranslationResult {
    text: String,
}

/// Translation backend driving an Ollama server through `/api/generate`
pub struct OllamaBackend {
    client: Client,
    config: BackendConfig,
    target_code: String,
}

impl OllamaBackend {
    pub fn new(config: BackendConfig, target_code: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            config,
            target_code: target_code.to_string(),
        })
    }

    /// Check that the server is reachable and the model is pulled
    pub async fn check_availability(&self) -> Result<()> {
        let url = format!("{}/api/show", self.config.endpoint);
        let response = self
            .client
            .post(&url)
            .json(&json!({ "name": self.config.model }))
            .send()
            .await
            .map_err(|e| TranslatorError::Backend(format!("Failed to connect to Ollama: {}", e)))?;

        if response.status().is_success() {
            info!("Ollama model '{}' is available", self.config.model);
            Ok(())
        } else {
            Err(TranslatorError::Backend(format!(
                "Ollama model '{}' not found. Please pull the model first: ollama pull {}",
                self.config.model, self.config.model
            )))
        }
    }

    fn build_prompt(&self, text: &str, json_output: bool) -> String {
        let language_name = language_code_to_name(&self.target_code);
        let output_rule = if json_output {
            format!(
                "Return ONLY the translation in JSON format as {{\"text\":\"your {} translation here\"}}.",
                language_name
            )
        } else {
            "Return ONLY the translated text.".to_string()
        };

        format!(
            "You are a professional translator.\n\
             \n\
             Translate the text to {} (language code: {}).\n\
             {}\n\
             Do not include any explanations, alternatives, or text in other languages.\n\
             Copy every token of the form __glossary_id_...__ unchanged.\n\
             \n\
             [Text to translate]\n\
             {}\n",
            language_name, self.target_code, output_rule, text
        )
    }

    async fn send(&self, text: &str) -> Result<Response> {
        let request = GenerateRequest {
            model: self.config.model.clone(),
            prompt: self.build_prompt(text, !self.config.stream),
            stream: self.config.stream,
            format: (!self.config.stream).then(|| "json".to_string()),
        };

        let url = format!("{}/api/generate", self.config.endpoint);
        debug!("Sending translation request to: {}", url);

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| TranslatorError::Backend(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(TranslatorError::Backend(format!(
                "Ollama API error {}: {}",
                status, error_text
            )));
        }

        Ok(response)
    }
}

#[async_trait]
impl TranslationBackend for OllamaBackend {
    async fn translate(&self, text: &str) -> Result<BackendOutput> {
        let response = self.send(text).await?;

        if self.config.stream {
            return Ok(BackendOutput::Stream(stream_chunks(response)));
        }

        let generated: GenerateResponse = response
            .json()
            .await
            .map_err(|e| TranslatorError::Backend(format!("Failed to parse response: {}", e)))?;
        if let Some(error) = generated.error {
            return Err(TranslatorError::Backend(error));
        }

        let raw = generated.response.trim();
        debug!("Raw Ollama response: {}", raw);
        if raw.is_empty() {
            return Err(TranslatorError::Backend("Empty translation received".to_string()));
        }

        Ok(BackendOutput::Complete(extract_translation(raw)))
    }

    fn target_code(&self) -> &str {
        &self.target_code
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(self.config.timeout_secs)
    }
}

/// Take the `text` field of a JSON answer, falling back to the raw answer
fn extract_translation(raw: &str) -> String {
    match serde_json::from_str::<TranslationResult>(raw) {
        Ok(result) => result.text,
        Err(_) => raw.to_string(),
    }
}

/// Parse one NDJSON line of a streaming response
fn parse_stream_line(line: &[u8]) -> Result<Option<String>> {
    if line.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }

    let chunk: GenerateResponse = serde_json::from_slice(line)?;
    if let Some(error) = chunk.error {
        return Err(TranslatorError::Backend(error));
    }

    Ok((!chunk.response.is_empty()).then_some(chunk.response))
}

struct StreamState {
    response: Response,
    buffer: Vec<u8>,
    finished: bool,
}

/// Yield response pieces as NDJSON lines arrive
fn stream_chunks(response: Response) -> BoxStream<'static, Result<String>> {
    let state = StreamState {
        response,
        buffer: Vec::new(),
        finished: false,
    };

    stream::unfold(state, |mut state| async move {
        loop {
            if let Some(pos) = state.buffer.iter().position(|b| *b == b'\n') {
                let line: Vec<u8> = state.buffer.drain(..=pos).collect();
                match parse_stream_line(&line) {
                    Ok(Some(piece)) => return Some((Ok(piece), state)),
                    Ok(None) => continue,
                    Err(e) => {
                        state.finished = true;
                        state.buffer.clear();
                        return Some((Err(e), state));
                    }
                }
            }

            if state.finished {
                let rest = std::mem::take(&mut state.buffer);
                return match parse_stream_line(&rest) {
                    Ok(Some(piece)) => Some((Ok(piece), state)),
                    Ok(None) => None,
                    Err(e) => Some((Err(e), state)),
                };
            }

            match state.response.chunk().await {
                Ok(Some(bytes)) => state.buffer.extend_from_slice(&bytes),
                Ok(None) => state.finished = true,
                Err(e) => {
                    state.finished = true;
                    state.buffer.clear();
                    return Some((Err(TranslatorError::Http(e)), state));
                }
            }
        }
    })
    .boxed()
}

/// Convert language code to full language name for clearer prompts
fn language_code_to_name(code: &str) -> String {
    match code.to_lowercase().as_str() {
        "ja" => "Japanese".to_string(),
        "ko" => "Korean".to_string(),
        "zh" => "Chinese".to_string(),
        "fr" => "French".to_string(),
        "de" => "German".to_string(),
        "es" => "Spanish".to_string(),
        "ru" => "Russian".to_string(),
        "it" => "Italian".to_string(),
        "pt" => "Portuguese".to_string(),
        "nl" => "Dutch".to_string(),
        "pl" => "Polish".to_string(),
        "uk" => "Ukrainian".to_string(),
        "vi" => "Vietnamese".to_string(),
        "en" => "English".to_string(),
        _ => code.to_string(),
    }
}
