//! Commands and the alias table.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use tracing::debug;

use crate::args::{ArgOutcome, ArgTransform, into_transform};
use crate::context::CommandContext;
use crate::error::{HandlerResult, RegistrationError, RegistrationResult};
use crate::handler::{BoxedCallback, into_callback};
use crate::help::format_help;

/// Returns `true` if `alias` matches `[a-z0-9]+` exactly.
pub fn is_valid_alias(alias: &str) -> bool {
    !alias.is_empty()
        && alias
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
}

/// Canonical, process-unique key of a registered command.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CommandKey(Arc<str>);

impl CommandKey {
    pub(crate) fn new(key: impl Into<Arc<str>>) -> Self {
        Self(key.into())
    }

    /// Returns the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for CommandKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CommandKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// CommandDecl
// =============================================================================

/// A command declaration, built by a feature and handed to its registrar.
///
/// ```rust,ignore
/// reg.command(
///     CommandDecl::new("help", help)
///         .aliases(["info", "h"])
///         .doc("!help [command/section]\ndisplays command help.")
///         .arg_transform(|args: &str| !args.contains('@')),
/// )?;
/// ```
pub struct CommandDecl {
    name: String,
    aliases: Vec<String>,
    section: Option<String>,
    doc: Option<String>,
    transform: Option<ArgTransform>,
    body: BoxedCallback<CommandContext>,
}

impl CommandDecl {
    /// Declares a command whose primary alias is `name`.
    pub fn new<F, Fut>(name: impl Into<String>, body: F) -> Self
    where
        F: Fn(CommandContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        Self {
            name: name.into(),
            aliases: Vec::new(),
            section: None,
            doc: None,
            transform: None,
            body: into_callback(body),
        }
    }

    /// Adds one extra alias.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    /// Adds several extra aliases, in order.
    pub fn aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases.extend(aliases.into_iter().map(Into::into));
        self
    }

    /// Overrides the help-menu section (defaults to the feature name).
    pub fn section(mut self, section: impl Into<String>) -> Self {
        self.section = Some(section.into());
        self
    }

    /// Sets the documentation the help text is derived from.
    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    /// Sets the argument transform.
    pub fn arg_transform<F, R>(mut self, transform: F) -> Self
    where
        F: Fn(&str) -> R + Send + Sync + 'static,
        R: Into<ArgOutcome>,
    {
        self.transform = Some(into_transform(transform));
        self
    }

    /// Primary alias followed by the extra aliases.
    fn all_aliases(&self) -> Vec<String> {
        std::iter::once(self.name.clone())
            .chain(self.aliases.iter().cloned())
            .collect()
    }
}

impl fmt::Debug for CommandDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandDecl")
            .field("name", &self.name)
            .field("aliases", &self.aliases)
            .field("section", &self.section)
            .field("has_transform", &self.transform.is_some())
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Command
// =============================================================================

/// A registered command.
pub struct Command {
    key: CommandKey,
    feature: Arc<str>,
    aliases: Vec<String>,
    section: String,
    help: String,
    transform: Option<ArgTransform>,
    body: BoxedCallback<CommandContext>,
}

impl Command {
    /// The canonical key.
    pub fn key(&self) -> &CommandKey {
        &self.key
    }

    /// Feature that registered the command.
    pub fn feature(&self) -> &str {
        &self.feature
    }

    pub(crate) fn feature_arc(&self) -> Arc<str> {
        Arc::clone(&self.feature)
    }

    /// The primary alias, used as the display name.
    pub fn primary(&self) -> &str {
        // never empty: the declared name always comes first
        self.aliases.first().map(String::as_str).unwrap_or_default()
    }

    /// Every alias, primary first.
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// Help-menu section.
    pub fn section(&self) -> &str {
        &self.section
    }

    /// Pre-formatted one-line help text.
    pub fn help(&self) -> &str {
        &self.help
    }

    /// Whether an argument transform is declared.
    pub fn has_transform(&self) -> bool {
        self.transform.is_some()
    }

    pub(crate) fn transform(&self) -> Option<&ArgTransform> {
        self.transform.as_ref()
    }

    pub(crate) fn body(&self) -> &BoxedCallback<CommandContext> {
        &self.body
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("key", &self.key)
            .field("aliases", &self.aliases)
            .field("section", &self.section)
            .field("help", &self.help)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// CommandRegistry
// =============================================================================

/// Commands by key, plus the alias table pointing into them.
#[derive(Default)]
pub struct CommandRegistry {
    commands: HashMap<CommandKey, Command>,
    order: Vec<CommandKey>,
    aliases: HashMap<String, CommandKey>,
}

impl CommandRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates `aliases` against the alias table and against each other.
    fn check_new_aliases(&self, aliases: &[String]) -> RegistrationResult<()> {
        for (i, alias) in aliases.iter().enumerate() {
            if !is_valid_alias(alias) {
                return Err(RegistrationError::InvalidAlias(alias.clone()));
            }
            if let Some(owner) = self.aliases.get(alias) {
                return Err(RegistrationError::DuplicateAlias {
                    alias: alias.clone(),
                    owner: owner.to_string(),
                });
            }
            if aliases[..i].contains(alias) {
                return Err(RegistrationError::DuplicateAlias {
                    alias: alias.clone(),
                    owner: aliases[0].clone(),
                });
            }
        }
        Ok(())
    }

    /// Registers a command owned by `feature`.
    ///
    /// Nothing is inserted unless every check passes.
    pub fn register(&mut self, feature: &str, decl: CommandDecl) -> RegistrationResult<CommandKey> {
        let doc = decl.doc.as_deref().map(str::trim).unwrap_or_default();
        if doc.is_empty() {
            return Err(RegistrationError::MissingDocumentation(decl.name.clone()));
        }

        let aliases = decl.all_aliases();
        self.check_new_aliases(&aliases)?;

        let mut key = format!("{feature}.{}", decl.name);
        while self.commands.contains_key(key.as_str()) {
            key.push('_');
        }
        let key = CommandKey::new(key);

        let command = Command {
            key: key.clone(),
            feature: Arc::from(feature),
            help: format_help(&aliases[0], doc),
            section: decl.section.unwrap_or_else(|| feature.to_string()),
            aliases,
            transform: decl.transform,
            body: decl.body,
        };

        for alias in &command.aliases {
            self.aliases.insert(alias.clone(), key.clone());
        }
        debug!(command = %key, aliases = ?command.aliases, "Registered command");
        self.order.push(key.clone());
        self.commands.insert(key.clone(), command);

        Ok(key)
    }

    /// Adds `extra` aliases to the command that owns `base`.
    pub fn add_aliases<I, S>(&mut self, base: &str, extra: I) -> RegistrationResult<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let key = self
            .aliases
            .get(base)
            .cloned()
            .ok_or_else(|| RegistrationError::UnknownBaseAlias(base.to_string()))?;
        let extra: Vec<String> = extra.into_iter().map(Into::into).collect();
        self.check_new_aliases(&extra)?;

        if let Some(command) = self.commands.get_mut(&key) {
            for alias in extra {
                self.aliases.insert(alias.clone(), key.clone());
                command.aliases.push(alias);
            }
        }
        Ok(())
    }

    /// Looks up the command an alias points at.
    pub fn resolve(&self, alias: &str) -> Option<&Command> {
        self.aliases.get(alias).and_then(|key| self.commands.get(key))
    }

    /// Looks up a command by key.
    pub fn get(&self, key: &CommandKey) -> Option<&Command> {
        self.commands.get(key)
    }

    /// Iterates commands in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Command> {
        self.order.iter().filter_map(|key| self.commands.get(key))
    }

    /// Number of registered commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Returns `true` if no command is registered.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Groups commands by section.
    ///
    /// Sections appear in the order of their first command; commands keep
    /// registration order inside a section.
    pub fn sections(&self) -> Vec<Section<'_>> {
        let mut sections: Vec<Section<'_>> = Vec::new();
        for command in self.iter() {
            match sections.iter_mut().find(|s| s.name == command.section()) {
                Some(section) => section.commands.push(command),
                None => sections.push(Section {
                    name: command.section(),
                    commands: vec![command],
                }),
            }
        }
        sections
    }

    /// Looks up one section by name.
    pub fn section(&self, name: &str) -> Option<Section<'_>> {
        self.sections().into_iter().find(|s| s.name == name)
    }
}

impl fmt::Debug for CommandRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandRegistry")
            .field("commands", &self.order)
            .field("aliases", &self.aliases.len())
            .finish()
    }
}

/// A help-menu section and its commands.
#[derive(Debug, Clone)]
pub struct Section<'a> {
    /// Section label.
    pub name: &'a str,
    /// Commands in registration order.
    pub commands: Vec<&'a Command>,
}
