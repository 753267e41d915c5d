//! Lifecycle events delivered by the transport.
//!
//! The vocabulary is open: `ready`, `message` and `error` are the events every
//! transport produces, and any other name a transport exposes can be carried
//! through [`Event::Custom`].

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use crate::message::Message;
use crate::sink::ErrorReport;

/// Name of a lifecycle event.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventName(Cow<'static, str>);

impl EventName {
    /// The connection finished its handshake.
    pub const READY: EventName = EventName(Cow::Borrowed("ready"));
    /// A chat message was received.
    pub const MESSAGE: EventName = EventName(Cow::Borrowed("message"));
    /// A handler failed.
    pub const ERROR: EventName = EventName(Cow::Borrowed("error"));

    /// Creates an event name.
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    /// Returns the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if the name is usable as a registry key.
    pub(crate) fn is_valid(&self) -> bool {
        !self.0.is_empty() && !self.0.chars().any(char::is_whitespace)
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for EventName {
    fn from(name: &'static str) -> Self {
        Self::new(name)
    }
}

/// One inbound lifecycle event.
#[derive(Debug, Clone)]
pub enum Event {
    /// The connection is ready to send and receive.
    Ready,
    /// A chat message arrived.
    Message(Arc<Message>),
    /// A handler failed while processing an earlier event.
    Error(Arc<ErrorReport>),
    /// Any other transport-level occurrence.
    Custom {
        /// Event name.
        name: EventName,
        /// Transport-defined payload.
        payload: serde_json::Value,
    },
}

impl Event {
    /// Returns the lifecycle name of this event.
    pub fn name(&self) -> EventName {
        match self {
            Self::Ready => EventName::READY,
            Self::Message(_) => EventName::MESSAGE,
            Self::Error(_) => EventName::ERROR,
            Self::Custom { name, .. } => name.clone(),
        }
    }

    /// Returns the message carried by a `message` event.
    pub fn as_message(&self) -> Option<&Arc<Message>> {
        match self {
            Self::Message(msg) => Some(msg),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names() {
        assert_eq!(Event::Ready.name(), EventName::READY);
        let custom = Event::Custom {
            name: EventName::new("member_join"),
            payload: serde_json::Value::Null,
        };
        assert_eq!(custom.name().as_str(), "member_join");
    }

    #[test]
    fn test_event_name_validity() {
        assert!(EventName::new("ready").is_valid());
        assert!(!EventName::new("").is_valid());
        assert!(!EventName::new("on ready").is_valid());
    }
}
