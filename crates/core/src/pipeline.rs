use crate::cancel::CancellationFlag;
use crate::chunking::{chunk_words, normalize_whitespace, unit_count, word_count};
use crate::config::{RunConfig, OUTPUT_FILE_NAME};
use crate::error::{ConfigError, PipelineError};
use crate::extractor::extract_text;
use crate::models::{DocumentKind, DocumentPlan, OutputRecord, RecordLabel, RunOutcome, RunReport};
use crate::output::OutputSink;
use crate::progress::{ProgressEvent, ProgressReporter};
use crate::traits::InferenceBackend;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use walkdir::WalkDir;

/// Supported documents directly inside `folder`, sorted by file name.
///
/// Not recursive. The run's own output file is never a candidate.
pub fn discover_documents(folder: &Path) -> Result<Vec<PathBuf>, PipelineError> {
    let mut files = Vec::new();

    for entry in WalkDir::new(folder)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(error) if error.depth() == 0 => {
                return Err(PipelineError::Enumerate {
                    path: folder.to_path_buf(),
                    details: error.to_string(),
                });
            }
            Err(error) => {
                warn!(folder = %folder.display(), %error, "unreadable directory entry");
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }
        if entry.file_name() == OUTPUT_FILE_NAME {
            continue;
        }
        if DocumentKind::from_path(entry.path()).is_supported() {
            files.push(entry.into_path());
        }
    }

    files.sort_unstable_by(|left, right| left.file_name().cmp(&right.file_name()));
    Ok(files)
}

enum FileStatus {
    Done,
    Skipped,
    Interrupted,
}

/// Runs one prompt over every document in a directory, one unit at a time.
pub struct PipelineDriver<'a, B, P>
where
    B: InferenceBackend,
    P: ProgressReporter,
{
    config: &'a RunConfig,
    backend: B,
    progress: P,
}

impl<'a, B, P> PipelineDriver<'a, B, P>
where
    B: InferenceBackend,
    P: ProgressReporter,
{
    pub fn new(config: &'a RunConfig, backend: B, progress: P) -> Self {
        Self {
            config,
            backend,
            progress,
        }
    }

    /// Truncates the output file, then processes documents until the directory is
    /// exhausted or `cancel` is observed at a file or chunk boundary.
    ///
    /// Only failures to prepare the run are returned as errors; anything that goes
    /// wrong inside one file is logged and counted in the report.
    pub fn run(&self, cancel: &CancellationFlag) -> Result<RunReport, PipelineError> {
        if self.config.max_words == 0 {
            return Err(ConfigError::ZeroMaxWords.into());
        }

        let mut sink = OutputSink::create(self.config.output_path())?;
        let files = discover_documents(&self.config.directory)?;
        info!(
            folder = %self.config.directory.display(),
            candidates = files.len(),
            max_words = self.config.max_words,
            "starting run"
        );

        let mut report = RunReport::empty();

        for path in files {
            if cancel.is_cancelled() {
                report.outcome = RunOutcome::Cancelled;
                break;
            }

            info!(path = %path.display(), "processing file");
            self.progress.report(ProgressEvent::FileStarted { path: &path });

            match self.process_file(&path, &mut sink, cancel, &mut report) {
                Ok(FileStatus::Done) => report.files_processed += 1,
                Ok(FileStatus::Skipped) => report.files_skipped += 1,
                Ok(FileStatus::Interrupted) => {
                    report.files_processed += 1;
                    report.outcome = RunOutcome::Cancelled;
                    break;
                }
                Err(error) => {
                    report.files_failed += 1;
                    let message = error.to_string();
                    warn!(path = %path.display(), error = %message, "error processing file");
                    self.progress.report(ProgressEvent::FileFailed {
                        path: &path,
                        error: &message,
                    });
                }
            }
        }

        match report.outcome {
            RunOutcome::Completed => info!(
                records = report.records_written,
                processed = report.files_processed,
                skipped = report.files_skipped,
                failed = report.files_failed,
                "processing complete"
            ),
            RunOutcome::Cancelled => warn!(
                records = report.records_written,
                processed = report.files_processed,
                "processing interrupted by user"
            ),
        }
        self.progress.report(ProgressEvent::Finished {
            outcome: report.outcome,
        });

        Ok(report)
    }

    fn process_file(
        &self,
        path: &Path,
        sink: &mut OutputSink,
        cancel: &CancellationFlag,
        report: &mut RunReport,
    ) -> Result<FileStatus, PipelineError> {
        let file_name = display_name(path);
        let raw = extract_text(path);

        if raw.is_empty() {
            let reason = "no text extracted";
            info!(path = %path.display(), "no text extracted, skipping");
            self.progress.report(ProgressEvent::FileSkipped { path, reason });
            return Ok(FileStatus::Skipped);
        }

        // Whitespace-only text still goes out as one (empty) unit.
        let normalized = normalize_whitespace(&raw);
        let words = word_count(&normalized);
        if words <= self.config.max_words {
            let response = self.backend.generate(&normalized);
            self.write_record(sink, RecordLabel::whole(file_name), response, report)?;
            return Ok(FileStatus::Done);
        }

        info!(
            path = %path.display(),
            words,
            chunks = unit_count(&normalized, self.config.max_words),
            "document exceeds word limit, chunking"
        );
        for chunk in chunk_words(&normalized, self.config.max_words) {
            if cancel.is_cancelled() {
                return Ok(FileStatus::Interrupted);
            }
            let response = self.backend.generate(&chunk.text);
            self.write_record(
                sink,
                RecordLabel::chunk(file_name.clone(), chunk.index),
                response,
                report,
            )?;
        }

        Ok(FileStatus::Done)
    }

    fn write_record(
        &self,
        sink: &mut OutputSink,
        label: RecordLabel,
        response: String,
        report: &mut RunReport,
    ) -> Result<(), PipelineError> {
        sink.append(&label, &response)?;
        report.records_written += 1;

        let record = OutputRecord { label, response };
        self.progress
            .report(ProgressEvent::RecordWritten { record: &record });
        Ok(())
    }
}

/// Extracts and measures every candidate without calling the endpoint or touching the output file.
pub fn plan_directory(folder: &Path, max_words: usize) -> Result<Vec<DocumentPlan>, PipelineError> {
    if max_words == 0 {
        return Err(ConfigError::ZeroMaxWords.into());
    }

    let plans = discover_documents(folder)?
        .into_iter()
        .map(|path| {
            let raw = extract_text(&path);
            let normalized = normalize_whitespace(&raw);
            let units = if raw.is_empty() {
                0
            } else {
                unit_count(&normalized, max_words).max(1)
            };
            DocumentPlan {
                file_name: display_name(&path),
                kind: DocumentKind::from_path(&path),
                word_count: word_count(&normalized),
                units,
            }
        })
        .collect();

    Ok(plans)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
