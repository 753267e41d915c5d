//! Lifecycle event hooks.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::context::EventContext;
use crate::event::EventName;
use crate::handler::BoxedCallback;

/// One registered event extension.
#[derive(Clone)]
pub struct Extension {
    feature: Arc<str>,
    body: BoxedCallback<EventContext>,
}

impl Extension {
    /// Feature that registered the extension.
    pub fn feature(&self) -> &str {
        &self.feature
    }

    pub(crate) fn feature_arc(&self) -> Arc<str> {
        Arc::clone(&self.feature)
    }

    pub(crate) fn body(&self) -> &BoxedCallback<EventContext> {
        &self.body
    }
}

impl fmt::Debug for Extension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Extension")
            .field("feature", &self.feature)
            .finish_non_exhaustive()
    }
}

/// Extensions per event name.
///
/// The first extension registered for a name installs the wrapper; later ones
/// append to the same list.
#[derive(Debug, Default)]
pub struct EventHooks {
    hooks: HashMap<EventName, Vec<Extension>>,
}

impl EventHooks {
    /// Creates an empty hook table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an extension. Returns `true` if this installed the wrapper.
    pub fn push(
        &mut self,
        name: EventName,
        feature: Arc<str>,
        body: BoxedCallback<EventContext>,
    ) -> bool {
        let installed = !self.hooks.contains_key(&name);
        if installed {
            debug!(event = %name, "Installed event wrapper");
        }
        self.hooks
            .entry(name)
            .or_default()
            .push(Extension { feature, body });
        installed
    }

    /// Extensions for `name`, in registration order.
    pub fn extensions(&self, name: &EventName) -> &[Extension] {
        self.hooks.get(name).map(Vec::as_slice).unwrap_or_default()
    }

    /// Returns `true` if a wrapper is installed for `name`.
    pub fn is_wrapped(&self, name: &EventName) -> bool {
        self.hooks.contains_key(name)
    }

    /// Event names with at least one extension.
    pub fn names(&self) -> impl Iterator<Item = &EventName> {
        self.hooks.keys()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HandlerResult;
    use crate::handler::into_callback;

    async fn noop(_: EventContext) -> HandlerResult {
        Ok(())
    }

    #[test]
    fn test_wrapper_installed_once() {
        let mut hooks = EventHooks::new();
        assert!(!hooks.is_wrapped(&EventName::READY));
        assert!(hooks.push(EventName::READY, "a".into(), into_callback(noop)));
        assert!(!hooks.push(EventName::READY, "b".into(), into_callback(noop)));
        assert!(hooks.is_wrapped(&EventName::READY));

        let features: Vec<_> = hooks
            .extensions(&EventName::READY)
            .iter()
            .map(Extension::feature)
            .collect();
        assert_eq!(features, ["a", "b"]);
        assert!(hooks.extensions(&EventName::ERROR).is_empty());
    }
}
