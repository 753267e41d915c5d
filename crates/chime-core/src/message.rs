//! Inbound message model.
//!
//! A [`Message`] is read-only data handed to every command and handler: who
//! sent it, where, and the raw text. Transports build it; the router never
//! mutates it.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a user on the messaging service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Creates a user identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the mention syntax for this user.
    pub fn mention(&self) -> String {
        format!("<@{}>", self.0)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a channel (server channel or direct-message channel).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelId(String);

impl ChannelId {
    /// Creates a channel identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The author of a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Service-wide identifier.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Whether the account is a bot.
    #[serde(default)]
    pub bot: bool,
}

impl User {
    /// Creates a human user.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: UserId::new(id),
            name: name.into(),
            bot: false,
        }
    }
}

/// One inbound chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Transport-assigned message identifier.
    pub id: String,
    /// Who sent it.
    pub author: User,
    /// Where it was sent; replies go here.
    pub channel: ChannelId,
    /// Server the channel belongs to, `None` for direct messages.
    #[serde(default)]
    pub server: Option<String>,
    /// Raw text content.
    pub content: String,
}

impl Message {
    /// Creates a message in a server channel.
    pub fn new(author: User, channel: ChannelId, content: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            author,
            channel,
            server: None,
            content: content.into(),
        }
    }

    /// Sets the transport-assigned identifier.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Sets the server the message was posted in.
    pub fn in_server(mut self, server: impl Into<String>) -> Self {
        self.server = Some(server.into());
        self
    }

    /// Returns `true` if the message arrived over a direct-message channel.
    pub fn is_private(&self) -> bool {
        self.server.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_is_private_without_server() {
        let msg = Message::new(User::new("1", "alice"), ChannelId::new("dm-1"), "hi");
        assert!(msg.is_private());
        assert!(!msg.in_server("guild").is_private());
    }

    #[test]
    fn test_user_id_mention() {
        assert_eq!(UserId::new("42").mention(), "<@42>");
    }
}
