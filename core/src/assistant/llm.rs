//! Text generation backends.

use crate::{
    config::AssistantConfig,
    error::{FabError, FabResult},
};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

/// Turns a prompt into free text.
pub trait TextGenerator {
    fn generate(&self, prompt: &str) -> FabResult<String>;
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model:  &'a str,
    prompt: &'a str,
    stream: bool,
}

/// Ollama's non-streaming `/api/generate` endpoint.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    endpoint: String,
    model:    String,
    client:   reqwest::blocking::Client,
}

impl OllamaClient {
    pub fn new(config: &AssistantConfig) -> FabResult<Self> {
        let mut builder = reqwest::blocking::Client::builder();
        if config.timeout_secs > 0 {
            builder = builder.timeout(Duration::from_secs(config.timeout_secs));
        }
        Ok(Self {
            endpoint: config.endpoint.clone(),
            model:    config.model.clone(),
            client:   builder.build()?,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl TextGenerator for OllamaClient {
    fn generate(&self, prompt: &str) -> FabResult<String> {
        let body = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
        };
        let resp = self.client.post(&self.endpoint).json(&body).send()?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().unwrap_or_default();
            return Err(FabError::Other(anyhow::anyhow!(
                "ollama http error {status}: {text}"
            )));
        }

        let v: Value = resp.json()?;
        extract_response(&v)
    }
}

fn extract_response(v: &Value) -> FabResult<String> {
    v.get("response")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| FabError::Other(anyhow::anyhow!("ollama: no 'response' field in reply")))
}
