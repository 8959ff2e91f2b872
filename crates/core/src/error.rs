use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required input: {0}")]
    Missing(&'static str),

    #[error("max words per chunk must be greater than zero")]
    ZeroMaxWords,

    #[error("temperature must be a finite, non-negative number (got {0})")]
    InvalidTemperature(f32),

    #[error("invalid endpoint url {url}: {details}")]
    InvalidEndpoint { url: String, details: String },

    #[error("target directory does not exist or is not a directory: {0}")]
    NotADirectory(PathBuf),
}

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("pdf parse error: {0}")]
    PdfParse(String),

    #[error("word document error: {0}")]
    Docx(String),

    #[error("unsupported file type: {0}")]
    Unsupported(String),
}

#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("{0}")]
    Http(#[from] reqwest::Error),

    #[error("endpoint returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("malformed response body: {0}")]
    MalformedBody(String),
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not prepare output file {path}: {source}")]
    OutputFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("could not list directory {path}: {details}")]
    Enumerate { path: PathBuf, details: String },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type Result<T, E = PipelineError> = std::result::Result<T, E>;
