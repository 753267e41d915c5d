//! Command arguments and argument transforms.
//!
//! A command may declare an [`ArgTransform`] that validates and optionally
//! reshapes the raw argument string before the command body runs. The
//! transform returns an [`ArgOutcome`]:
//!
//! - [`ArgOutcome::Reject`]: the router replies with the command's help text
//!   and the body is not invoked.
//! - [`ArgOutcome::Accept`]: the body receives the raw string.
//! - [`ArgOutcome::Replace`]: the body receives the parsed value instead.
//!
//! Plain `bool`s and `(bool, T)` pairs convert into outcomes, so transforms
//! read naturally:
//!
//! ```rust,ignore
//! fn tz_args(args: &str) -> (bool, Vec<String>) {
//!     let split: Vec<String> = args.split_whitespace().map(String::from).collect();
//!     (split.len() == 1 || split.len() >= 3, split)
//! }
//! ```
//!
//! This module also carries the small parsing helpers commands commonly
//! use as transforms or inside their bodies.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Arguments handed to a command body.
#[derive(Clone)]
pub enum Args {
    /// The raw text after the alias, leading whitespace removed.
    Raw(String),
    /// The value produced by the command's argument transform.
    Parsed(Arc<dyn Any + Send + Sync>),
}

impl Args {
    /// Returns the raw argument string, if the transform did not replace it.
    pub fn raw(&self) -> Option<&str> {
        match self {
            Self::Raw(s) => Some(s),
            Self::Parsed(_) => None,
        }
    }

    /// Returns the parsed value as `T`, if there is one of that type.
    pub fn parsed<T: Any>(&self) -> Option<&T> {
        match self {
            Self::Raw(_) => None,
            Self::Parsed(value) => value.downcast_ref::<T>(),
        }
    }

    /// Returns the arguments as text: the raw string, or a parsed `String`/`&str`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Raw(s) => Some(s),
            Self::Parsed(value) => value
                .downcast_ref::<String>()
                .map(String::as_str)
                .or_else(|| value.downcast_ref::<&'static str>().copied()),
        }
    }
}

impl fmt::Debug for Args {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Raw(s) => f.debug_tuple("Raw").field(s).finish(),
            Self::Parsed(_) => f.debug_tuple("Parsed").finish_non_exhaustive(),
        }
    }
}

/// Result of running an argument transform.
#[derive(Clone)]
pub enum ArgOutcome {
    /// Malformed invocation; reply with help.
    Reject,
    /// Accepted; pass the raw string through.
    Accept,
    /// Accepted; pass this value instead of the raw string.
    Replace(Arc<dyn Any + Send + Sync>),
}

impl ArgOutcome {
    /// Accepts and replaces the arguments with `value`.
    pub fn replace<T: Any + Send + Sync>(value: T) -> Self {
        Self::Replace(Arc::new(value))
    }
}

impl fmt::Debug for ArgOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reject => f.write_str("Reject"),
            Self::Accept => f.write_str("Accept"),
            Self::Replace(_) => f.debug_tuple("Replace").finish_non_exhaustive(),
        }
    }
}

impl From<bool> for ArgOutcome {
    fn from(accepted: bool) -> Self {
        if accepted { Self::Accept } else { Self::Reject }
    }
}

impl<T: Any + Send + Sync> From<(bool, T)> for ArgOutcome {
    fn from((accepted, value): (bool, T)) -> Self {
        if accepted {
            Self::replace(value)
        } else {
            Self::Reject
        }
    }
}

/// A type-erased argument transform.
pub type ArgTransform = Arc<dyn Fn(&str) -> ArgOutcome + Send + Sync>;

/// Converts any `Fn(&str) -> impl Into<ArgOutcome>` into an [`ArgTransform`].
pub fn into_transform<F, R>(f: F) -> ArgTransform
where
    F: Fn(&str) -> R + Send + Sync + 'static,
    R: Into<ArgOutcome>,
{
    Arc::new(move |args| f(args).into())
}

// ============================================================================
// Helpers
// ============================================================================

/// Accepts any non-empty argument string.
pub fn has_args(args: &str) -> bool {
    !args.is_empty()
}

/// Builds a transform accepting exactly `n` whitespace-separated arguments.
///
/// The split itself is passed on as a `Vec<String>`.
pub fn len_split(n: usize) -> impl Fn(&str) -> (bool, Vec<String>) + Send + Sync + 'static {
    move |args| {
        let split: Vec<String> = args.split_whitespace().map(str::to_string).collect();
        (split.len() == n, split)
    }
}

/// Shell-like argument splitting.
///
/// Handles space-separated arguments, single and double quotes, and escapes
/// inside double quotes. Returns `None` when a quote is left open.
pub fn shell_split(input: &str) -> Option<Vec<String>> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut in_single_quote = false;
    let mut in_double_quote = false;
    let mut escape_next = false;

    for ch in input.chars() {
        if escape_next {
            current.push(ch);
            escape_next = false;
            continue;
        }

        match ch {
            '\\' if !in_single_quote => {
                escape_next = true;
                in_token = true;
            }
            '\'' if !in_double_quote => {
                in_single_quote = !in_single_quote;
                in_token = true;
            }
            '"' if !in_single_quote => {
                in_double_quote = !in_double_quote;
                in_token = true;
            }
            c if c.is_whitespace() && !in_single_quote && !in_double_quote => {
                if in_token {
                    args.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            _ => {
                current.push(ch);
                in_token = true;
            }
        }
    }

    if in_single_quote || in_double_quote || escape_next {
        return None;
    }
    if in_token {
        args.push(current);
    }

    Some(args)
}

/// Shell-splits `input`, falling back to plain whitespace splitting when the
/// quoting is unbalanced.
pub fn try_shell_split(input: &str) -> Vec<String> {
    shell_split(input)
        .unwrap_or_else(|| input.split_whitespace().map(str::to_string).collect())
}

fn kwarg_selected<'a>(token: &'a str, keys: Option<&[&str]>) -> Option<(&'a str, &'a str)> {
    let (key, value) = token.split_once('=')?;
    match keys {
        Some(keys) if !keys.contains(&key) => None,
        _ => Some((key, value)),
    }
}

/// Collects `key=value` tokens, optionally restricted to `keys`.
pub fn get_kwargs(args: &str, keys: Option<&[&str]>) -> HashMap<String, String> {
    try_shell_split(args)
        .iter()
        .filter_map(|token| kwarg_selected(token, keys))
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Removes the tokens [`get_kwargs`] would collect and re-joins the rest.
pub fn strip_kwargs(args: &str, keys: Option<&[&str]>) -> String {
    try_shell_split(args)
        .into_iter()
        .filter(|token| kwarg_selected(token, keys).is_none())
        .collect::<Vec<_>>()
        .join(" ")
}
