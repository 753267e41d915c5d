//! The process-wide error sink.
//!
//! Neither the message dispatcher nor the event fan-out recovers handler
//! failures. Every failure becomes an [`ErrorReport`] and is handed to one
//! [`ErrorSink`], which logs it and lets the receive loop carry on.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::error;

use crate::error::HandlerError;

/// A handler failure together with where it happened.
pub struct ErrorReport {
    origin: String,
    error: HandlerError,
}

impl ErrorReport {
    /// Creates a report for `error` raised while handling `origin`.
    pub fn new(origin: impl Into<String>, error: HandlerError) -> Self {
        Self {
            origin: origin.into(),
            error,
        }
    }

    /// Where the failure happened, e.g. `"message"` or `"ready/greeter"`.
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// The error itself.
    pub fn error(&self) -> &HandlerError {
        &self.error
    }

    /// Renders the error followed by every `source()` in its chain.
    pub fn chain(&self) -> String {
        let mut out = self.error.to_string();
        let mut source = self.error.source();
        while let Some(cause) = source {
            out.push_str("\n  caused by: ");
            out.push_str(&cause.to_string());
            source = cause.source();
        }
        out
    }
}

impl fmt::Debug for ErrorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorReport")
            .field("origin", &self.origin)
            .field("error", &self.chain())
            .finish()
    }
}

/// Receives every runtime failure.
#[async_trait]
pub trait ErrorSink: Send + Sync {
    /// Records one failure. Must not fail itself.
    async fn report(&self, report: ErrorReport);
}

/// A shared ErrorSink trait object.
pub type BoxedErrorSink = Arc<dyn ErrorSink>;

/// Sink that logs each failure through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingErrorSink;

#[async_trait]
impl ErrorSink for TracingErrorSink {
    async fn report(&self, report: ErrorReport) {
        error!(origin = %report.origin(), "Handler failed:\n{}", report.chain());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[derive(Debug, thiserror::Error)]
    #[error("lookup failed")]
    struct Outer(#[source] io::Error);

    #[test]
    fn test_chain_includes_sources() {
        let err = Outer(io::Error::other("connection reset"));
        let report = ErrorReport::new("message", Box::new(err));
        assert_eq!(report.chain(), "lookup failed\n  caused by: connection reset");
    }

    #[tokio::test]
    async fn test_tracing_sink_accepts_reports() {
        let sink = TracingErrorSink;
        sink.report(ErrorReport::new("ready", "boom".into())).await;
    }
}
