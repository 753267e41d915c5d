//! # Chime Core
//!
//! The command-and-event router of the Chime chat bot.
//!
//! Features register three kinds of callbacks:
//!
//! - **Commands**: alias-addressable units invoked by prefixed messages
//!   ([`CommandDecl`], [`CommandRegistry`]).
//! - **Pattern handlers**: callbacks for non-command messages matching a regex
//!   ([`TriggerDecl`], [`PatternRegistry`]).
//! - **Event extensions**: observers of lifecycle events such as `ready`
//!   ([`EventHooks`]).
//!
//! Registration is validated as it happens and fails fast. Once every feature
//! registered, the [`RouterBuilder`] freezes into a shared [`Router`] that
//! dispatches inbound traffic:
//!
//! ```text
//! ┌───────────┐     ┌──────────────┐     ┌──────────────────────────────┐
//! │ Transport │────▶│ handle_event │────▶│ built-in (message: dispatch) │
//! │  (events) │     │              │     └──────────────────────────────┘
//! └───────────┘     └──────────────┘────▶ extensions, joined
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use chime_core::prelude::*;
//!
//! async fn ping(ctx: CommandContext) -> HandlerResult {
//!     ctx.reply("pong").await?;
//!     Ok(())
//! }
//!
//! struct General;
//!
//! impl Feature for General {
//!     fn name(&self) -> &str { "general" }
//!
//!     fn register(&self, reg: &mut Registrar<'_>) -> RegistrationResult<()> {
//!         reg.command(CommandDecl::new("ping", ping).doc("replies with pong."))?;
//!         Ok(())
//!     }
//! }
//!
//! let router = RouterBuilder::new().feature(&General)?.build();
//! router.handle_event(&bot, Event::Message(message)).await?;
//! ```

pub mod args;
pub mod bot;
pub mod context;
pub mod dispatcher;
pub mod error;
pub mod event;
pub mod handler;
pub mod help;
pub mod message;
pub mod registry;
pub mod reply;
pub mod router;
pub mod sink;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use args::{ArgOutcome, ArgTransform, Args};
pub use bot::{Bot, BoxedBot, downcast_bot};
pub use context::{BotContext, CommandContext, EventContext, PatternContext, PatternMatch};
pub use dispatcher::Routed;
pub use error::{
    HandlerError, HandlerResult, RegistrationError, RegistrationResult, TransportError,
    TransportResult,
};
pub use event::{Event, EventName};
pub use handler::{BoxFuture, BoxedCallback, Callback, into_callback};
pub use message::{ChannelId, Message, User, UserId};
pub use registry::{
    Command, CommandDecl, CommandKey, CommandRegistry, EventHooks, PatternFlags, PatternRegistry,
    Section, TriggerDecl,
};
pub use reply::{ReplyLimits, send_long_message};
pub use router::{Feature, Registrar, Router, RouterBuilder};
pub use sink::{BoxedErrorSink, ErrorReport, ErrorSink, TracingErrorSink};

/// Commonly used types for writing features.
pub mod prelude {
    pub use crate::args::{ArgOutcome, Args, get_kwargs, has_args, len_split, strip_kwargs};
    pub use crate::bot::{Bot, BoxedBot};
    pub use crate::context::{CommandContext, EventContext, PatternContext};
    pub use crate::error::{HandlerError, HandlerResult, RegistrationResult};
    pub use crate::event::{Event, EventName};
    pub use crate::message::{ChannelId, Message};
    pub use crate::registry::{CommandDecl, PatternFlags, TriggerDecl};
    pub use crate::router::{Feature, Registrar, RouterBuilder};
}
