use crate::config::{RunConfig, CONTEXT_WINDOW};
use crate::error::InferenceError;
use crate::traits::InferenceBackend;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

pub const ERROR_PREFIX: &str = "Error processing chunk: ";

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: String,
    stream: bool,
    temperature: f32,
    options: GenerateOptions,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    num_ctx: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Blocking client for an Ollama-compatible `/api/generate` route.
///
/// One request per call, no retry and no timeout: a stalled endpoint stalls the run.
pub struct OllamaClient {
    client: Client,
    generate_url: String,
    model: String,
    prompt: String,
    temperature: f32,
    api_key: Option<String>,
}

impl OllamaClient {
    pub fn new(
        endpoint: &Url,
        model: impl Into<String>,
        prompt: impl Into<String>,
        temperature: f32,
        api_key: Option<String>,
    ) -> Result<Self, InferenceError> {
        let client = Client::builder().timeout(None::<Duration>).build()?;

        Ok(Self {
            client,
            generate_url: format!("{}/api/generate", endpoint.as_str().trim_end_matches('/')),
            model: model.into(),
            prompt: prompt.into(),
            temperature,
            api_key,
        })
    }

    pub fn from_config(config: &RunConfig) -> Result<Self, InferenceError> {
        Self::new(
            &config.endpoint,
            config.model.clone(),
            config.prompt.clone(),
            config.temperature,
            config.api_key.clone(),
        )
    }

    pub fn generate_url(&self) -> &str {
        &self.generate_url
    }

    pub fn try_generate(&self, text: &str) -> Result<String, InferenceError> {
        let body = GenerateRequest {
            model: &self.model,
            prompt: compose_prompt(&self.prompt, text),
            stream: false,
            temperature: self.temperature,
            options: GenerateOptions {
                num_ctx: CONTEXT_WINDOW,
            },
        };

        let mut request = self
            .client
            .post(&self.generate_url)
            .header("content-type", "application/json")
            .json(&body);

        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key);
        }

        debug!(url = %self.generate_url, model = %self.model, chars = text.len(), "sending generate request");
        let response = request.send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(InferenceError::Status { status, body });
        }

        let raw = response.text()?;
        let parsed: GenerateResponse = serde_json::from_str(&raw)
            .map_err(|error| InferenceError::MalformedBody(error.to_string()))?;

        Ok(parsed.response)
    }
}

impl InferenceBackend for OllamaClient {
    fn generate(&self, text: &str) -> String {
        match self.try_generate(text) {
            Ok(response) => response,
            Err(error) => {
                warn!(url = %self.generate_url, %error, "inference request failed");
                format!("{ERROR_PREFIX}{error}")
            }
        }
    }
}

pub fn compose_prompt(prompt: &str, text: &str) -> String {
    format!("{prompt}\n\nText: {text}")
}
