//! Router construction and the feature registration surface.
//!
//! Building a router is a two-phase affair:
//!
//! 1. A mutable [`RouterBuilder`] collects commands, pattern handlers and event
//!    extensions from every [`Feature`], validating each one as it arrives.
//!    The first configuration mistake aborts the build.
//! 2. [`RouterBuilder::build`] freezes the registries into an immutable
//!    [`Router`], shared as `Arc<Router>` by the dispatch loop and every
//!    callback context.
//!
//! ```rust,ignore
//! let router = RouterBuilder::new()
//!     .prefix("!")
//!     .feature(&General)?
//!     .add_aliases("timezone", ["tz"])?
//!     .build();
//! ```

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde_json::Value;
use tracing::{debug, info};

use crate::context::EventContext;
use crate::error::{HandlerResult, RegistrationError, RegistrationResult};
use crate::event::EventName;
use crate::handler::{BoxedCallback, into_callback};
use crate::registry::{
    Command, CommandDecl, CommandKey, CommandRegistry, EventHooks, PatternRegistry, Section,
    TriggerDecl,
};
use crate::reply::ReplyLimits;
use crate::sink::{BoxedErrorSink, TracingErrorSink};

/// Default command prefix.
pub const DEFAULT_PREFIX: &str = "!";

// =============================================================================
// Feature
// =============================================================================

/// A unit of bot functionality that registers itself with the router.
///
/// ```rust,ignore
/// struct Tags;
///
/// impl Feature for Tags {
///     fn name(&self) -> &str { "tags" }
///
///     fn register(&self, reg: &mut Registrar<'_>) -> RegistrationResult<()> {
///         reg.command(CommandDecl::new("tag", tag).doc("!tag <name>\nshows a tag."))?;
///         reg.event(EventName::READY, load_tags)?;
///         Ok(())
///     }
/// }
/// ```
pub trait Feature: Send + Sync {
    /// Name of the feature; the default help section of its commands.
    fn name(&self) -> &str;

    /// Registers every command, handler and extension of the feature.
    fn register(&self, reg: &mut Registrar<'_>) -> RegistrationResult<()>;
}

/// Registration handle scoped to one feature.
pub struct Registrar<'a> {
    feature: Arc<str>,
    builder: &'a mut RouterBuilder,
}

impl Registrar<'_> {
    /// Name of the feature being registered.
    pub fn feature(&self) -> &str {
        &self.feature
    }

    /// The feature's configuration section, if one was supplied.
    pub fn config(&self) -> Option<&Value> {
        self.builder.feature_config.get(&*self.feature)
    }

    /// Registers a command.
    pub fn command(&mut self, decl: CommandDecl) -> RegistrationResult<CommandKey> {
        self.builder.commands.register(&self.feature, decl)
    }

    /// Registers a pattern handler.
    pub fn handler(&mut self, decl: TriggerDecl) -> RegistrationResult<()> {
        self.builder.patterns.register(&self.feature, decl)?;
        Ok(())
    }

    /// Registers an extension for lifecycle event `name`.
    pub fn event<F, Fut>(&mut self, name: impl Into<EventName>, body: F) -> RegistrationResult<()>
    where
        F: Fn(EventContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        let name = name.into();
        if !name.is_valid() {
            return Err(RegistrationError::InvalidEventName(name.to_string()));
        }
        self.builder
            .hooks
            .push(name, Arc::clone(&self.feature), into_callback(body));
        Ok(())
    }
}

// =============================================================================
// RouterBuilder
// =============================================================================

/// Collects registrations before traffic starts.
pub struct RouterBuilder {
    prefix: String,
    limits: ReplyLimits,
    sink: BoxedErrorSink,
    commands: CommandRegistry,
    patterns: PatternRegistry,
    hooks: EventHooks,
    builtins: HashMap<EventName, BoxedCallback<EventContext>>,
    features: Vec<String>,
    feature_config: HashMap<String, Value>,
}

impl Default for RouterBuilder {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
            limits: ReplyLimits::default(),
            sink: Arc::new(TracingErrorSink),
            commands: CommandRegistry::new(),
            patterns: PatternRegistry::new(),
            hooks: EventHooks::new(),
            builtins: HashMap::new(),
            features: Vec::new(),
            feature_config: HashMap::new(),
        }
    }
}

impl RouterBuilder {
    /// Creates a builder with the default prefix and a logging error sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the command prefix.
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Sets the outbound reply limits.
    pub fn reply_limits(mut self, limits: ReplyLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Sets the sink every handler failure is reported to.
    pub fn error_sink(mut self, sink: BoxedErrorSink) -> Self {
        self.sink = sink;
        self
    }

    /// Supplies the configuration section of feature `name`.
    ///
    /// Must be called before the feature registers for [`Registrar::config`]
    /// to see it.
    pub fn feature_config(mut self, name: impl Into<String>, config: Value) -> Self {
        self.feature_config.insert(name.into(), config);
        self
    }

    /// Sets the built-in implementation of lifecycle event `name`.
    ///
    /// The built-in runs to completion before any extension for the event.
    /// `message` always uses the command/pattern dispatcher, so a built-in
    /// set for it is ignored.
    pub fn builtin<F, Fut>(mut self, name: impl Into<EventName>, body: F) -> Self
    where
        F: Fn(EventContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.builtins.insert(name.into(), into_callback(body));
        self
    }

    /// Returns a registrar scoped to `feature`.
    pub fn scope(&mut self, feature: &str) -> Registrar<'_> {
        if !self.features.iter().any(|f| f == feature) {
            self.features.push(feature.to_string());
        }
        Registrar {
            feature: Arc::from(feature),
            builder: self,
        }
    }

    /// Lets `feature` register everything it provides.
    pub fn feature(mut self, feature: &dyn Feature) -> RegistrationResult<Self> {
        self.register_feature(feature)?;
        Ok(self)
    }

    /// Like [`feature`](Self::feature), through a mutable reference.
    pub fn register_feature(&mut self, feature: &dyn Feature) -> RegistrationResult<()> {
        info!(feature = %feature.name(), "Registering feature");
        feature.register(&mut self.scope(feature.name()))
    }

    /// Attaches extra aliases to the command owning `base`.
    ///
    /// Meant for alias configuration loaded after every feature registered.
    pub fn add_aliases<I, S>(mut self, base: &str, extra: I) -> RegistrationResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.commands.add_aliases(base, extra)?;
        Ok(self)
    }

    /// Freezes the registries.
    pub fn build(self) -> Arc<Router> {
        debug!(
            commands = self.commands.len(),
            patterns = self.patterns.len(),
            features = self.features.len(),
            "Router built"
        );
        Arc::new(Router {
            prefix: self.prefix,
            limits: self.limits,
            sink: self.sink,
            commands: self.commands,
            patterns: self.patterns,
            hooks: self.hooks,
            builtins: self.builtins,
            features: self.features,
            feature_config: self.feature_config,
            commands_parsed: AtomicU64::new(0),
        })
    }
}

impl fmt::Debug for RouterBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouterBuilder")
            .field("prefix", &self.prefix)
            .field("features", &self.features)
            .field("commands", &self.commands.len())
            .field("patterns", &self.patterns.len())
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Router
// =============================================================================

/// The frozen registries plus dispatch settings.
///
/// Dispatch lives in [`crate::dispatcher`].
pub struct Router {
    pub(crate) prefix: String,
    pub(crate) limits: ReplyLimits,
    pub(crate) sink: BoxedErrorSink,
    pub(crate) commands: CommandRegistry,
    pub(crate) patterns: PatternRegistry,
    pub(crate) hooks: EventHooks,
    pub(crate) builtins: HashMap<EventName, BoxedCallback<EventContext>>,
    features: Vec<String>,
    feature_config: HashMap<String, Value>,
    pub(crate) commands_parsed: AtomicU64,
}

impl Router {
    /// Starts a new builder.
    pub fn builder() -> RouterBuilder {
        RouterBuilder::new()
    }

    /// The command prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// The outbound reply limits.
    pub fn reply_limits(&self) -> ReplyLimits {
        self.limits
    }

    /// The error sink.
    pub fn error_sink(&self) -> &BoxedErrorSink {
        &self.sink
    }

    /// Resolves an alias to its command.
    pub fn resolve(&self, alias: &str) -> Option<&Command> {
        self.commands.resolve(alias)
    }

    /// Looks up a command by key.
    pub fn command(&self, key: &CommandKey) -> Option<&Command> {
        self.commands.get(key)
    }

    /// The command registry.
    pub fn commands(&self) -> &CommandRegistry {
        &self.commands
    }

    /// Commands grouped by help section.
    pub fn sections(&self) -> Vec<Section<'_>> {
        self.commands.sections()
    }

    /// The pattern handler registry.
    pub fn patterns(&self) -> &PatternRegistry {
        &self.patterns
    }

    /// The event hooks.
    pub fn hooks(&self) -> &EventHooks {
        &self.hooks
    }

    /// Returns `true` if a wrapper is installed for event `name`.
    pub fn is_wrapped(&self, name: &EventName) -> bool {
        self.hooks.is_wrapped(name)
    }

    /// Returns `true` if event `name` has a built-in implementation.
    pub fn has_builtin(&self, name: &EventName) -> bool {
        *name == EventName::MESSAGE || self.builtins.contains_key(name)
    }

    /// Names of the registered features, in registration order.
    pub fn features(&self) -> &[String] {
        &self.features
    }

    /// Configuration section of feature `name`.
    pub fn feature_config(&self, name: &str) -> Option<&Value> {
        self.feature_config.get(name)
    }

    /// Number of messages resolved to a command so far.
    pub fn commands_parsed(&self) -> u64 {
        self.commands_parsed.load(Ordering::Relaxed)
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("prefix", &self.prefix)
            .field("features", &self.features)
            .field("commands", &self.commands)
            .field("patterns", &self.patterns.len())
            .field("commands_parsed", &self.commands_parsed())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{CommandContext, PatternContext};
    use serde_json::json;

    async fn noop_cmd(_: CommandContext) -> HandlerResult {
        Ok(())
    }

    async fn noop_pattern(_: PatternContext) -> HandlerResult {
        Ok(())
    }

    async fn noop_event(_: EventContext) -> HandlerResult {
        Ok(())
    }

    struct General;

    impl Feature for General {
        fn name(&self) -> &str {
            "general"
        }

        fn register(&self, reg: &mut Registrar<'_>) -> RegistrationResult<()> {
            reg.command(
                CommandDecl::new("help", noop_cmd)
                    .aliases(["h", "info"])
                    .doc("!help [command]\ndisplays help."),
            )?;
            reg.command(CommandDecl::new("timezone", noop_cmd).doc("converts time."))?;
            reg.handler(TriggerDecl::new("bored", "bored", noop_pattern))?;
            reg.event(EventName::READY, noop_event)?;
            Ok(())
        }
    }

    struct Clash;

    impl Feature for Clash {
        fn name(&self) -> &str {
            "clash"
        }

        fn register(&self, reg: &mut Registrar<'_>) -> RegistrationResult<()> {
            reg.command(CommandDecl::new("hint", noop_cmd).alias("h").doc("hints."))?;
            Ok(())
        }
    }

    #[test]
    fn test_feature_registration_and_late_aliases() {
        let router = RouterBuilder::new()
            .prefix(".")
            .feature(&General)
            .unwrap()
            .add_aliases("timezone", ["tz"])
            .unwrap()
            .build();

        assert_eq!(router.prefix(), ".");
        assert_eq!(router.features(), ["general"]);
        assert_eq!(router.resolve("tz").unwrap().primary(), "timezone");
        assert_eq!(router.resolve("h").unwrap().section(), "general");
        assert_eq!(router.patterns().len(), 1);
        assert!(router.is_wrapped(&EventName::READY));
        assert!(!router.is_wrapped(&EventName::ERROR));
        assert!(router.has_builtin(&EventName::MESSAGE));
        assert!(!router.has_builtin(&EventName::READY));
    }

    #[test]
    fn test_conflicting_features_fail_regardless_of_order() {
        let err = RouterBuilder::new()
            .feature(&General)
            .and_then(|b| b.feature(&Clash))
            .unwrap_err();
        assert!(matches!(err, RegistrationError::DuplicateAlias { .. }));

        let err = RouterBuilder::new()
            .feature(&Clash)
            .and_then(|b| b.feature(&General))
            .unwrap_err();
        assert!(matches!(err, RegistrationError::DuplicateAlias { .. }));
    }

    #[test]
    fn test_invalid_event_name() {
        let mut builder = RouterBuilder::new();
        let err = builder
            .scope("general")
            .event(EventName::new("on ready"), noop_event)
            .unwrap_err();
        assert_eq!(err, RegistrationError::InvalidEventName("on ready".into()));
    }

    #[test]
    fn test_registrar_sees_feature_config() {
        let mut builder =
            RouterBuilder::new().feature_config("tags", json!({ "file": "tags.json" }));
        let reg = builder.scope("tags");
        assert_eq!(reg.feature(), "tags");
        assert_eq!(reg.config(), Some(&json!({ "file": "tags.json" })));
        assert!(builder.scope("general").config().is_none());
    }
}
