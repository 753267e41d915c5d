//! Contexts handed to callbacks.
//!
//! Each callback kind gets its own context type, all sharing a [`BotContext`]
//! with the bot handle and the router:
//!
//! - [`CommandContext`]: the (possibly transformed) [`Args`], the message and
//!   the resolved command's key.
//! - [`PatternContext`]: the first [`PatternMatch`] and the message.
//! - [`EventContext`]: the lifecycle [`Event`].

use std::collections::HashMap;
use std::sync::Arc;

use regex::{Captures, Regex};
use serde_json::Value;

use crate::args::Args;
use crate::bot::BoxedBot;
use crate::error::TransportResult;
use crate::event::Event;
use crate::message::{ChannelId, Message};
use crate::registry::CommandKey;
use crate::reply::send_long_message;
use crate::router::Router;

// =============================================================================
// BotContext, shared by every context
// =============================================================================

/// The transport context every callback receives.
#[derive(Clone)]
pub struct BotContext {
    bot: BoxedBot,
    router: Arc<Router>,
    feature: Arc<str>,
}

impl BotContext {
    pub(crate) fn new(bot: BoxedBot, router: Arc<Router>, feature: Arc<str>) -> Self {
        Self {
            bot,
            router,
            feature,
        }
    }

    /// The bot the event arrived on.
    pub fn bot(&self) -> &BoxedBot {
        &self.bot
    }

    /// The router, for registry lookups such as help menus.
    pub fn router(&self) -> &Arc<Router> {
        &self.router
    }

    /// Name of the feature that registered the running callback.
    pub fn feature(&self) -> &str {
        &self.feature
    }

    /// The running feature's configuration section, if one was supplied.
    pub fn feature_config(&self) -> Option<&Value> {
        self.router.feature_config(&self.feature)
    }

    /// Sends `text` to `channel`, split into chunks over the length limit.
    pub async fn send(&self, channel: &ChannelId, text: &str) -> TransportResult<()> {
        send_long_message(self.bot.as_ref(), channel, text, false, self.router.reply_limits())
            .await
    }

    /// Sends `text` to `channel`, truncated to the configured line count.
    pub async fn send_truncated(&self, channel: &ChannelId, text: &str) -> TransportResult<()> {
        send_long_message(self.bot.as_ref(), channel, text, true, self.router.reply_limits())
            .await
    }
}

impl std::fmt::Debug for BotContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BotContext")
            .field("bot", &self.bot.user_id())
            .field("feature", &self.feature)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// CommandContext
// =============================================================================

/// Context for a command invocation.
#[derive(Debug, Clone)]
pub struct CommandContext {
    /// Raw or transformed arguments.
    pub args: Args,
    /// The invoking message.
    pub message: Arc<Message>,
    /// Key of the resolved command.
    pub command: CommandKey,
    base: BotContext,
}

impl CommandContext {
    pub(crate) fn new(
        args: Args,
        message: Arc<Message>,
        command: CommandKey,
        base: BotContext,
    ) -> Self {
        Self {
            args,
            message,
            command,
            base,
        }
    }

    /// The shared transport context.
    pub fn ctx(&self) -> &BotContext {
        &self.base
    }

    /// The bot handle.
    pub fn bot(&self) -> &BoxedBot {
        self.base.bot()
    }

    /// The router.
    pub fn router(&self) -> &Arc<Router> {
        self.base.router()
    }

    /// Replies in the invoking channel.
    pub async fn reply(&self, text: &str) -> TransportResult<()> {
        self.base.send(&self.message.channel, text).await
    }

    /// Replies in the invoking channel, truncating long output.
    pub async fn reply_truncated(&self, text: &str) -> TransportResult<()> {
        self.base.send_truncated(&self.message.channel, text).await
    }

    /// Returns the help text of the running command.
    pub fn help(&self) -> &str {
        self.router()
            .command(&self.command)
            .map(|c| c.help())
            .unwrap_or_default()
    }
}

// =============================================================================
// PatternContext
// =============================================================================

/// The first match of a trigger pattern, detached from the haystack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternMatch {
    text: String,
    start: usize,
    end: usize,
    groups: Vec<Option<String>>,
    named: HashMap<String, String>,
}

impl PatternMatch {
    pub(crate) fn new(regex: &Regex, captures: &Captures<'_>) -> Self {
        let whole = captures.get(0);
        let groups = captures
            .iter()
            .skip(1)
            .map(|m| m.map(|m| m.as_str().to_string()))
            .collect();
        let named = regex
            .capture_names()
            .flatten()
            .filter_map(|name| {
                captures
                    .name(name)
                    .map(|m| (name.to_string(), m.as_str().to_string()))
            })
            .collect();

        Self {
            text: whole.map(|m| m.as_str().to_string()).unwrap_or_default(),
            start: whole.map_or(0, |m| m.start()),
            end: whole.map_or(0, |m| m.end()),
            groups,
            named,
        }
    }

    /// The matched text.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Byte offset of the match start in the message content.
    pub fn start(&self) -> usize {
        self.start
    }

    /// Byte offset one past the match end.
    pub fn end(&self) -> usize {
        self.end
    }

    /// Capture group `i` (1-based, as in the pattern), if it participated.
    pub fn group(&self, i: usize) -> Option<&str> {
        i.checked_sub(1)
            .and_then(|i| self.groups.get(i))
            .and_then(|g| g.as_deref())
    }

    /// Named capture group, if it participated.
    pub fn name(&self, name: &str) -> Option<&str> {
        self.named.get(name).map(String::as_str)
    }
}

/// Context for a pattern handler invocation.
#[derive(Debug, Clone)]
pub struct PatternContext {
    /// First match of the handler's pattern in the message content.
    pub matched: PatternMatch,
    /// The message that matched.
    pub message: Arc<Message>,
    base: BotContext,
}

impl PatternContext {
    pub(crate) fn new(matched: PatternMatch, message: Arc<Message>, base: BotContext) -> Self {
        Self {
            matched,
            message,
            base,
        }
    }

    /// The shared transport context.
    pub fn ctx(&self) -> &BotContext {
        &self.base
    }

    /// The bot handle.
    pub fn bot(&self) -> &BoxedBot {
        self.base.bot()
    }

    /// Replies in the channel the message came from.
    pub async fn reply(&self, text: &str) -> TransportResult<()> {
        self.base.send(&self.message.channel, text).await
    }
}

// =============================================================================
// EventContext
// =============================================================================

/// Context for a lifecycle event extension.
#[derive(Debug, Clone)]
pub struct EventContext {
    /// The event being handled.
    pub event: Event,
    base: BotContext,
}

impl EventContext {
    pub(crate) fn new(event: Event, base: BotContext) -> Self {
        Self { event, base }
    }

    /// The shared transport context.
    pub fn ctx(&self) -> &BotContext {
        &self.base
    }

    /// The bot handle.
    pub fn bot(&self) -> &BoxedBot {
        self.base.bot()
    }

    /// The router.
    pub fn router(&self) -> &Arc<Router> {
        self.base.router()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_match_groups() {
        let regex = Regex::new(r"(?P<verb>go) (\w+)(!)?").unwrap();
        let caps = regex.captures("please go translate now").unwrap();
        let m = PatternMatch::new(&regex, &caps);

        assert_eq!(m.as_str(), "go translate");
        assert_eq!(m.start(), 7);
        assert_eq!(m.end(), 19);
        assert_eq!(m.group(1), Some("go"));
        assert_eq!(m.group(2), Some("translate"));
        assert_eq!(m.group(3), None);
        assert_eq!(m.group(0), None);
        assert_eq!(m.name("verb"), Some("go"));
    }
}
