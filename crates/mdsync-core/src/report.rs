//! Progress and problem reporting seam.
//!
//! The sync loop never aborts on per-document or per-block failures; it
//! hands them to a [`Reporter`] and moves on. The CLI plugs in a console
//! reporter, tests plug in a collecting one.

use std::path::Path;

/// Sink for warnings and errors produced during a sync run.
pub trait Reporter: Send + Sync {
    /// A block was skipped for a recoverable reason.
    fn warning(&self, path: &Path, message: &str);

    /// A document or block failed.
    fn error(&self, path: &Path, message: &str);

    /// Progress detail.
    fn debug(&self, message: &str);
}

/// Reporter forwarding everything to `tracing`.
#[derive(Debug, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn warning(&self, path: &Path, message: &str) {
        tracing::warn!(path = %path.display(), "{message}");
    }

    fn error(&self, path: &Path, message: &str) {
        tracing::error!(path = %path.display(), "{message}");
    }

    fn debug(&self, message: &str) {
        tracing::debug!("{message}");
    }
}
