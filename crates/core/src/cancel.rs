use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Stop request shared between a front-end and the pipeline worker.
///
/// The pipeline only reads it before each file and before each chunk; an in-flight
/// inference call always runs to completion.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag {
    cancelled: Arc<AtomicBool>,
}

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::CancellationFlag;

    #[test]
    fn clones_observe_the_same_flag() {
        let flag = CancellationFlag::new();
        let handle = flag.clone();
        assert!(!flag.is_cancelled());

        handle.cancel();
        assert!(flag.is_cancelled());
    }
}
