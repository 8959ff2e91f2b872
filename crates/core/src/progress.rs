use crate::models::{OutputRecord, RunOutcome};
use std::path::Path;

/// Events a front-end can surface while a run is in progress.
pub enum ProgressEvent<'a> {
    FileStarted { path: &'a Path },
    FileSkipped { path: &'a Path, reason: &'a str },
    FileFailed { path: &'a Path, error: &'a str },
    RecordWritten { record: &'a OutputRecord },
    Finished { outcome: RunOutcome },
}

pub trait ProgressReporter {
    fn report(&self, event: ProgressEvent<'_>);
}

/// No-op reporter for unit tests.
pub struct NoopProgress;

impl ProgressReporter for NoopProgress {
    fn report(&self, _event: ProgressEvent<'_>) {}
}
