//! Test doubles for code built on the router.
//!
//! Enabled inside this crate's tests and, for downstream crates, through the
//! `testing` feature.

use std::any::Any;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::bot::Bot;
use crate::error::{TransportError, TransportResult};
use crate::message::{ChannelId, Message, User, UserId};
use crate::sink::{ErrorReport, ErrorSink};

/// A [`Bot`] that records every outbound call instead of sending it.
pub struct RecordingBot {
    id: UserId,
    sent: Mutex<Vec<(ChannelId, String)>>,
    presence: Mutex<Option<String>>,
    fail_sends: bool,
}

impl RecordingBot {
    /// Creates a recording bot with the given user id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: UserId::new(id),
            sent: Mutex::new(Vec::new()),
            presence: Mutex::new(None),
            fail_sends: false,
        }
    }

    /// Creates a bot whose sends always fail.
    pub fn failing(id: impl Into<String>) -> Self {
        Self {
            fail_sends: true,
            ..Self::new(id)
        }
    }

    /// Returns every `(channel, text)` pair sent so far, in order.
    pub fn sent(&self) -> Vec<(ChannelId, String)> {
        self.sent.lock().clone()
    }

    /// Returns only the texts sent so far, in order.
    pub fn sent_texts(&self) -> Vec<String> {
        self.sent.lock().iter().map(|(_, t)| t.clone()).collect()
    }

    /// Returns the last presence set, if any.
    pub fn presence(&self) -> Option<String> {
        self.presence.lock().clone()
    }
}

#[async_trait]
impl Bot for RecordingBot {
    fn user_id(&self) -> &UserId {
        &self.id
    }

    async fn send(&self, channel: &ChannelId, text: &str) -> TransportResult<()> {
        if self.fail_sends {
            return Err(TransportError::SendFailed {
                channel: channel.to_string(),
                reason: "recording bot configured to fail".into(),
            });
        }
        self.sent.lock().push((channel.clone(), text.to_string()));
        Ok(())
    }

    async fn set_presence(&self, game: Option<&str>) -> TransportResult<()> {
        *self.presence.lock() = game.map(str::to_string);
        Ok(())
    }

    fn as_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

/// An [`ErrorSink`] that keeps `(origin, error chain)` pairs.
#[derive(Default)]
pub struct RecordingSink {
    reports: Mutex<Vec<(String, String)>>,
}

impl RecordingSink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every report received so far, in order.
    pub fn reports(&self) -> Vec<(String, String)> {
        self.reports.lock().clone()
    }
}

#[async_trait]
impl ErrorSink for RecordingSink {
    async fn report(&self, report: ErrorReport) {
        self.reports
            .lock()
            .push((report.origin().to_string(), report.chain()));
    }
}

/// Builds a server message from `author_id` in channel `"general"`.
pub fn message_from(author_id: &str, content: &str) -> Message {
    Message::new(
        User::new(author_id, format!("user-{author_id}")),
        ChannelId::new("general"),
        content,
    )
    .in_server("test-server")
}
