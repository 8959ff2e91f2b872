use crate::error::ConfigError;
use std::path::PathBuf;
use url::Url;

pub const DEFAULT_MAX_WORDS: usize = 3_000;
pub const DEFAULT_TEMPERATURE: f32 = 0.6;
pub const DEFAULT_MODEL: &str = "deepseek-r1:32b-qwen-distill-q8_0";
pub const OUTPUT_FILE_NAME: &str = "out.txt";
pub const CONTEXT_WINDOW: u32 = 20_480;

/// Operator input as typed by a front-end, before validation.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub directory: PathBuf,
    pub prompt: String,
    pub endpoint: String,
    pub api_key: Option<String>,
    pub max_words: usize,
    pub model: String,
    pub temperature: f32,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            directory: PathBuf::new(),
            prompt: String::new(),
            endpoint: String::new(),
            api_key: None,
            max_words: DEFAULT_MAX_WORDS,
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

/// Validated settings for one run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub directory: PathBuf,
    pub prompt: String,
    pub endpoint: Url,
    pub api_key: Option<String>,
    pub max_words: usize,
    pub model: String,
    pub temperature: f32,
}

impl RunConfig {
    pub fn output_path(&self) -> PathBuf {
        self.directory.join(OUTPUT_FILE_NAME)
    }
}

impl RunOptions {
    pub fn validate(self) -> Result<RunConfig, ConfigError> {
        if self.directory.as_os_str().is_empty() {
            return Err(ConfigError::Missing("directory"));
        }
        if self.prompt.trim().is_empty() {
            return Err(ConfigError::Missing("prompt"));
        }
        if self.model.trim().is_empty() {
            return Err(ConfigError::Missing("model"));
        }
        if self.endpoint.trim().is_empty() {
            return Err(ConfigError::Missing("endpoint url"));
        }
        if self.max_words == 0 {
            return Err(ConfigError::ZeroMaxWords);
        }
        if !self.temperature.is_finite() || self.temperature < 0.0 {
            return Err(ConfigError::InvalidTemperature(self.temperature));
        }

        let endpoint = parse_endpoint(&self.endpoint)?;

        if !self.directory.is_dir() {
            return Err(ConfigError::NotADirectory(self.directory));
        }

        let api_key = self
            .api_key
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());

        Ok(RunConfig {
            directory: self.directory,
            prompt: self.prompt.trim().to_string(),
            endpoint,
            api_key,
            max_words: self.max_words,
            model: self.model.trim().to_string(),
            temperature: self.temperature,
        })
    }
}

fn parse_endpoint(raw: &str) -> Result<Url, ConfigError> {
    let trimmed = raw.trim();
    let url = Url::parse(trimmed).map_err(|error| ConfigError::InvalidEndpoint {
        url: trimmed.to_string(),
        details: error.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::InvalidEndpoint {
            url: trimmed.to_string(),
            details: format!("unsupported scheme {other}"),
        }),
    }
}
