//! Regex-triggered pattern handlers.
//!
//! Handlers react to messages that are not commands. Registration order is
//! evaluation order, and a pattern's source text may be registered only once.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use bitflags::bitflags;
use regex::{Regex, RegexBuilder};
use tracing::debug;

use crate::context::PatternContext;
use crate::error::{HandlerResult, RegistrationError, RegistrationResult};
use crate::handler::{BoxedCallback, into_callback};

bitflags! {
    /// Matching flags applied when a trigger is compiled.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct PatternFlags: u8 {
        /// `(?i)`
        const CASE_INSENSITIVE = 1 << 0;
        /// `(?m)`: `^` and `$` match at line boundaries.
        const MULTI_LINE = 1 << 1;
        /// `(?s)`: `.` matches `\n`.
        const DOT_MATCHES_NEW_LINE = 1 << 2;
        /// `(?x)`
        const IGNORE_WHITESPACE = 1 << 3;
    }
}

/// Compiles `pattern` with `flags`.
pub fn compile(pattern: &str, flags: PatternFlags) -> RegistrationResult<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(flags.contains(PatternFlags::CASE_INSENSITIVE))
        .multi_line(flags.contains(PatternFlags::MULTI_LINE))
        .dot_matches_new_line(flags.contains(PatternFlags::DOT_MATCHES_NEW_LINE))
        .ignore_whitespace(flags.contains(PatternFlags::IGNORE_WHITESPACE))
        .build()
        .map_err(|e| RegistrationError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })
}

/// A pattern handler declaration.
pub struct TriggerDecl {
    name: String,
    pattern: String,
    flags: PatternFlags,
    body: BoxedCallback<PatternContext>,
}

impl TriggerDecl {
    /// Declares handler `name` for `pattern`.
    pub fn new<F, Fut>(name: impl Into<String>, pattern: impl Into<String>, body: F) -> Self
    where
        F: Fn(PatternContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        Self {
            name: name.into(),
            pattern: pattern.into(),
            flags: PatternFlags::empty(),
            body: into_callback(body),
        }
    }

    /// Sets the matching flags.
    pub fn flags(mut self, flags: PatternFlags) -> Self {
        self.flags = flags;
        self
    }
}

impl fmt::Debug for TriggerDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TriggerDecl")
            .field("name", &self.name)
            .field("pattern", &self.pattern)
            .field("flags", &self.flags)
            .finish_non_exhaustive()
    }
}

/// A registered pattern handler.
pub struct PatternHandler {
    key: String,
    feature: Arc<str>,
    regex: Regex,
    body: BoxedCallback<PatternContext>,
}

impl PatternHandler {
    /// Process-unique key, `"{feature}.{name}"` with `_` appended on collision.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Feature that registered the handler.
    pub fn feature(&self) -> &str {
        &self.feature
    }

    pub(crate) fn feature_arc(&self) -> Arc<str> {
        Arc::clone(&self.feature)
    }

    /// The compiled pattern.
    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    /// The pattern's source text.
    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }

    pub(crate) fn body(&self) -> &BoxedCallback<PatternContext> {
        &self.body
    }
}

impl fmt::Debug for PatternHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PatternHandler")
            .field("key", &self.key)
            .field("pattern", &self.regex.as_str())
            .finish_non_exhaustive()
    }
}

/// Pattern handlers in registration order.
#[derive(Debug, Default)]
pub struct PatternRegistry {
    handlers: Vec<PatternHandler>,
}

impl PatternRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler owned by `feature`.
    pub fn register(
        &mut self,
        feature: &str,
        decl: TriggerDecl,
    ) -> RegistrationResult<&PatternHandler> {
        if self.handlers.iter().any(|h| h.pattern() == decl.pattern) {
            return Err(RegistrationError::DuplicatePattern(decl.pattern));
        }
        let regex = compile(&decl.pattern, decl.flags)?;

        let mut key = format!("{feature}.{}", decl.name);
        while self.handlers.iter().any(|h| h.key == key) {
            key.push('_');
        }
        debug!(handler = %key, pattern = %decl.pattern, "Registered pattern handler");

        self.handlers.push(PatternHandler {
            key,
            feature: Arc::from(feature),
            regex,
            body: decl.body,
        });
        Ok(&self.handlers[self.handlers.len() - 1])
    }

    /// Iterates handlers in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &PatternHandler> {
        self.handlers.iter()
    }

    /// Number of registered handlers.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Returns `true` if no handler is registered.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn noop(_: PatternContext) -> HandlerResult {
        Ok(())
    }

    #[test]
    fn test_duplicate_pattern_rejected() {
        let mut reg = PatternRegistry::new();
        reg.register("general", TriggerDecl::new("a", r"\bhello\b", noop))
            .unwrap();
        let err = reg
            .register("other", TriggerDecl::new("b", r"\bhello\b", noop))
            .unwrap_err();
        assert_eq!(err, RegistrationError::DuplicatePattern(r"\bhello\b".into()));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn test_same_text_different_flags_is_still_duplicate() {
        let mut reg = PatternRegistry::new();
        reg.register("general", TriggerDecl::new("a", "hi", noop)).unwrap();
        let err = reg
            .register(
                "general",
                TriggerDecl::new("b", "hi", noop).flags(PatternFlags::CASE_INSENSITIVE),
            )
            .unwrap_err();
        assert!(matches!(err, RegistrationError::DuplicatePattern(_)));
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let mut reg = PatternRegistry::new();
        let err = reg
            .register("general", TriggerDecl::new("a", "(unclosed", noop))
            .unwrap_err();
        assert!(matches!(err, RegistrationError::InvalidPattern { .. }));
        assert!(reg.is_empty());
    }

    #[test]
    fn test_key_collision_gets_suffix() {
        let mut reg = PatternRegistry::new();
        let first = reg
            .register("general", TriggerDecl::new("greet", "hello", noop))
            .unwrap()
            .key()
            .to_string();
        let second = reg
            .register("general", TriggerDecl::new("greet", "hey", noop))
            .unwrap()
            .key()
            .to_string();
        assert_eq!(first, "general.greet");
        assert_eq!(second, "general.greet_");
    }

    #[test]
    fn test_flags_applied() {
        let flags = PatternFlags::CASE_INSENSITIVE | PatternFlags::MULTI_LINE;
        let regex = compile("^bored$", flags).unwrap();
        assert!(regex.is_match("hi\nBORED"));
        assert!(!compile("^bored$", PatternFlags::empty()).unwrap().is_match("hi\nBORED"));
    }
}
