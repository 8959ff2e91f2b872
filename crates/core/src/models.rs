use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Document type, resolved once per file from its extension.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    PlainText,
    Pdf,
    Word,
    Unsupported,
}

impl DocumentKind {
    pub fn from_path(path: &Path) -> Self {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());

        match extension.as_deref() {
            Some("txt") => Self::PlainText,
            Some("pdf") => Self::Pdf,
            Some("doc") | Some("docx") => Self::Word,
            _ => Self::Unsupported,
        }
    }

    pub fn is_supported(self) -> bool {
        !matches!(self, Self::Unsupported)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// 1-based position within the document.
    pub index: usize,
    pub text: String,
}

impl Chunk {
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}

/// Header identity of one output record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordLabel {
    pub file_name: String,
    pub chunk: Option<usize>,
}

impl RecordLabel {
    pub fn whole(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            chunk: None,
        }
    }

    pub fn chunk(file_name: impl Into<String>, index: usize) -> Self {
        Self {
            file_name: file_name.into(),
            chunk: Some(index),
        }
    }
}

impl fmt::Display for RecordLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.chunk {
            Some(index) => write!(f, "{} (chunk {index})", self.file_name),
            None => write!(f, "{}", self.file_name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputRecord {
    pub label: RecordLabel,
    pub response: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunOutcome {
    Completed,
    Cancelled,
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Completed => f.write_str("Processing complete."),
            Self::Cancelled => f.write_str("Processing interrupted by user."),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub outcome: RunOutcome,
    pub files_processed: usize,
    pub files_skipped: usize,
    pub files_failed: usize,
    pub records_written: usize,
}

impl RunReport {
    pub(crate) fn empty() -> Self {
        Self {
            outcome: RunOutcome::Completed,
            files_processed: 0,
            files_skipped: 0,
            files_failed: 0,
            records_written: 0,
        }
    }
}

/// What a run would do with one document, without calling the endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentPlan {
    pub file_name: String,
    pub kind: DocumentKind,
    pub word_count: usize,
    pub units: usize,
}
