//! Message routing and lifecycle event fan-out.
//!
//! # Messages
//!
//! A message whose content starts with the prefix and whose author is not the
//! bot itself is a command invocation. The first whitespace-delimited token
//! after the prefix is the alias, the rest (leading whitespace removed) is the
//! raw argument string. Unknown aliases are ignored. A known command runs its
//! argument transform, if any, then its body exactly once.
//!
//! Any other message is tested against every pattern handler in registration
//! order. Each matching handler is invoked with its first match only, and the
//! next handler does not start until the previous one completed.
//!
//! # Events
//!
//! [`Router::handle_event`] awaits the built-in implementation of the event,
//! then runs every registered extension concurrently and waits for all of
//! them. Extension failures go to the error sink one by one; they never stop
//! the other extensions or fail the event.

use std::sync::Arc;
use std::sync::atomic::Ordering;

use futures::future::join_all;
use tracing::{Instrument, debug, debug_span, trace};

use crate::args::{ArgOutcome, Args};
use crate::bot::BoxedBot;
use crate::context::{BotContext, CommandContext, EventContext, PatternContext, PatternMatch};
use crate::error::{HandlerError, HandlerResult};
use crate::event::{Event, EventName};
use crate::message::Message;
use crate::registry::{Command, CommandKey};
use crate::router::Router;
use crate::sink::ErrorReport;

/// Feature name carried by contexts of built-in event implementations.
pub const BUILTIN_FEATURE: &str = "builtin";

/// What the dispatcher did with one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Routed {
    /// The command's body ran.
    Command(CommandKey),
    /// The argument transform rejected the invocation; help was sent.
    Rejected(CommandKey),
    /// Prefixed, but no command owns the alias.
    UnknownAlias,
    /// Not a command; this many pattern handlers ran.
    Patterns(usize),
}

/// Splits a prefix-stripped invocation into alias and raw arguments.
fn split_invocation(rest: &str) -> (&str, &str) {
    match rest.split_once(char::is_whitespace) {
        Some((alias, args)) => (alias, args.trim_start()),
        None => (rest, ""),
    }
}

impl Router {
    fn context(self: &Arc<Self>, bot: &BoxedBot, feature: Arc<str>) -> BotContext {
        BotContext::new(Arc::clone(bot), Arc::clone(self), feature)
    }

    /// Routes one inbound message.
    ///
    /// Errors raised by the command body or a pattern handler are returned
    /// unchanged; the remaining pattern handlers are skipped.
    pub async fn dispatch_message(
        self: &Arc<Self>,
        bot: &BoxedBot,
        message: Arc<Message>,
    ) -> Result<Routed, HandlerError> {
        let span = debug_span!(
            "dispatch_message",
            channel = %message.channel,
            author = %message.author.id,
        );
        self.route(bot, message).instrument(span).await
    }

    async fn route(
        self: &Arc<Self>,
        bot: &BoxedBot,
        message: Arc<Message>,
    ) -> Result<Routed, HandlerError> {
        let invocation = if message.author.id == *bot.user_id() {
            None
        } else {
            message.content.strip_prefix(self.prefix.as_str())
        };

        match invocation {
            Some(rest) => {
                let (alias, args) = split_invocation(rest);
                match self.commands.resolve(alias) {
                    Some(command) => self.run_command(bot, &message, command, args).await,
                    None => {
                        trace!(alias, "Ignoring unknown alias");
                        Ok(Routed::UnknownAlias)
                    }
                }
            }
            None => self.run_patterns(bot, &message).await.map(Routed::Patterns),
        }
    }

    async fn run_command(
        self: &Arc<Self>,
        bot: &BoxedBot,
        message: &Arc<Message>,
        command: &Command,
        raw: &str,
    ) -> Result<Routed, HandlerError> {
        self.commands_parsed.fetch_add(1, Ordering::Relaxed);
        let key = command.key().clone();
        let base = self.context(bot, command.feature_arc());

        let args = match command.transform().map(|transform| transform(raw)) {
            None | Some(ArgOutcome::Accept) => Args::Raw(raw.to_string()),
            Some(ArgOutcome::Replace(value)) => Args::Parsed(value),
            Some(ArgOutcome::Reject) => {
                debug!(command = %key, "Arguments rejected, sending help");
                base.send(&message.channel, command.help()).await?;
                return Ok(Routed::Rejected(key));
            }
        };

        debug!(command = %key, "Invoking command");
        let ctx = CommandContext::new(args, Arc::clone(message), key.clone(), base);
        command.body().call(ctx).await?;
        Ok(Routed::Command(key))
    }

    async fn run_patterns(
        self: &Arc<Self>,
        bot: &BoxedBot,
        message: &Arc<Message>,
    ) -> Result<usize, HandlerError> {
        let mut invoked = 0;
        for handler in self.patterns.iter() {
            let matched = match handler.regex().captures(&message.content) {
                Some(captures) => PatternMatch::new(handler.regex(), &captures),
                None => continue,
            };
            trace!(handler = handler.key(), "Pattern matched");

            let ctx = PatternContext::new(
                matched,
                Arc::clone(message),
                self.context(bot, handler.feature_arc()),
            );
            handler.body().call(ctx).await?;
            invoked += 1;
        }
        Ok(invoked)
    }

    /// Handles one lifecycle event: built-in first, then every extension.
    ///
    /// Returns the built-in's failure, in which case no extension runs.
    /// Extension failures are reported to the error sink, never returned.
    pub async fn handle_event(self: &Arc<Self>, bot: &BoxedBot, event: Event) -> HandlerResult {
        let name = event.name();
        let span = debug_span!("handle_event", event = %name);
        async move {
            self.run_builtin(bot, &name, &event).await?;
            let failed = self.fan_out(bot, &name, &event).await;
            if failed > 0 {
                debug!(failed, "Some extensions failed");
            }
            Ok::<(), HandlerError>(())
        }
        .instrument(span)
        .await
    }

    async fn run_builtin(
        self: &Arc<Self>,
        bot: &BoxedBot,
        name: &EventName,
        event: &Event,
    ) -> HandlerResult {
        if let Event::Message(message) = event {
            self.dispatch_message(bot, Arc::clone(message)).await?;
            return Ok(());
        }
        if let Some(builtin) = self.builtins.get(name) {
            let base = self.context(bot, Arc::from(BUILTIN_FEATURE));
            let ctx = EventContext::new(event.clone(), base);
            builtin.call(ctx).await?;
        }
        Ok(())
    }

    /// Runs every extension of `name` jointly and returns how many failed.
    async fn fan_out(self: &Arc<Self>, bot: &BoxedBot, name: &EventName, event: &Event) -> usize {
        let extensions = self.hooks.extensions(name);
        if extensions.is_empty() {
            return 0;
        }
        trace!(count = extensions.len(), "Fanning out to extensions");

        let runs = extensions.iter().map(|ext| {
            let ctx = EventContext::new(event.clone(), self.context(bot, ext.feature_arc()));
            let run = ext.body().call(ctx);
            async move { (ext.feature(), run.await) }
        });

        let mut failed = 0;
        for (feature, result) in join_all(runs).await {
            if let Err(error) = result {
                failed += 1;
                self.sink
                    .report(ErrorReport::new(format!("{name}/{feature}"), error))
                    .await;
            }
        }
        failed
    }
}
