pub mod cancel;
pub mod chunking;
pub mod config;
pub mod error;
pub mod extractor;
pub mod inference;
pub mod models;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod traits;

#[cfg(test)]
mod test_support;

pub use cancel::CancellationFlag;
pub use chunking::{chunk_words, normalize_whitespace, unit_count, word_count, ChunkIter};
pub use config::{
    RunConfig, RunOptions, CONTEXT_WINDOW, DEFAULT_MAX_WORDS, DEFAULT_MODEL, DEFAULT_TEMPERATURE,
    OUTPUT_FILE_NAME,
};
pub use error::{ConfigError, ExtractError, InferenceError, PipelineError};
pub use extractor::{
    extract_document, extract_text, DocxExtractor, LopdfExtractor, PlainTextExtractor,
    TextExtractor,
};
pub use inference::{compose_prompt, OllamaClient, ERROR_PREFIX};
pub use models::{
    Chunk, DocumentKind, DocumentPlan, OutputRecord, RecordLabel, RunOutcome, RunReport,
};
pub use output::{format_header, OutputSink};
pub use pipeline::{discover_documents, plan_directory, PipelineDriver};
pub use progress::{NoopProgress, ProgressEvent, ProgressReporter};
pub use traits::InferenceBackend;
