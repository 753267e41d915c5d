//! The three registries a feature can populate.
//!
//! - [`CommandRegistry`]: commands and the alias table.
//! - [`PatternRegistry`]: regex-triggered handlers for non-command messages.
//! - [`EventHooks`]: extensions per lifecycle event.
//!
//! All three are written only while the [`RouterBuilder`](crate::RouterBuilder)
//! runs and are read-only once the [`Router`](crate::Router) is built.

mod command;
mod event;
mod pattern;

pub use command::{Command, CommandDecl, CommandKey, CommandRegistry, Section, is_valid_alias};
pub use event::{EventHooks, Extension};
pub use pattern::{PatternFlags, PatternHandler, PatternRegistry, TriggerDecl, compile};
