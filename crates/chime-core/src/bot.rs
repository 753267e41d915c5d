//! Bot trait: the outbound side of the transport.
//!
//! The router never talks to the messaging service directly. Everything it
//! needs from the connection is expressed by [`Bot`]: who the bot is (so it can
//! ignore its own messages), how to send text to a channel, and how to update
//! its presence.
//!
//! Concrete transports (e.g. the console transport in `chime-bot`) implement
//! this trait and may expose richer, protocol-specific methods that handlers
//! reach through [`downcast_bot`].

use std::any::Any;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::TransportResult;
use crate::message::{ChannelId, UserId};

/// The core Bot trait.
///
/// # Example Implementation
///
/// ```rust,ignore
/// struct ConsoleBot { id: UserId }
///
/// #[async_trait]
/// impl Bot for ConsoleBot {
///     fn user_id(&self) -> &UserId { &self.id }
///
///     async fn send(&self, channel: &ChannelId, text: &str) -> TransportResult<()> {
///         println!("[{channel}] {text}");
///         Ok(())
///     }
///
///     fn as_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> { self }
/// }
/// ```
#[async_trait]
pub trait Bot: Send + Sync {
    /// Returns the bot's own user identifier.
    fn user_id(&self) -> &UserId;

    /// Sends one message to a channel.
    ///
    /// Implementations may reject text longer than the service's hard limit;
    /// use [`send_long_message`](crate::reply::send_long_message) to split first.
    async fn send(&self, channel: &ChannelId, text: &str) -> TransportResult<()>;

    /// Updates the "playing" presence shown next to the bot's name.
    ///
    /// `None` clears it. The default implementation does nothing.
    async fn set_presence(&self, _game: Option<&str>) -> TransportResult<()> {
        Ok(())
    }

    /// Returns self as an `Arc<dyn Any>` for safe downcasting.
    ///
    /// Implementors should simply return `self`.
    fn as_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

/// A shared Bot trait object.
pub type BoxedBot = Arc<dyn Bot>;

/// Attempts to downcast a [`BoxedBot`] to a specific concrete type.
pub fn downcast_bot<T: Bot + 'static>(bot: BoxedBot) -> Option<Arc<T>> {
    Arc::downcast::<T>(bot.as_any()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingBot;

    #[test]
    fn test_downcast_to_concrete_bot() {
        let bot: BoxedBot = Arc::new(RecordingBot::new("self"));
        let concrete = downcast_bot::<RecordingBot>(bot).expect("should downcast");
        assert_eq!(concrete.user_id().as_str(), "self");
    }
}
