//! Help text derivation.
//!
//! Every command's documentation string is reduced to one line of the form
//!
//! ```text
//! <primary-alias> - <first line> <remaining lines space-joined>
//! ```
//!
//! Lines are trimmed before joining. A literal `\n` (backslash, `n`) in the
//! documentation becomes a real line break, which lets a command keep a
//! multi-line usage block without breaking the one-line rule.

use crate::registry::Section;

/// Formats the help text for a command whose primary alias is `primary`.
pub fn format_help(primary: &str, doc: &str) -> String {
    let mut lines = doc.trim().lines().map(str::trim);
    let first = lines.next().unwrap_or_default();
    let rest = lines.filter(|l| !l.is_empty()).collect::<Vec<_>>().join(" ");

    let body = if rest.is_empty() {
        first.to_string()
    } else {
        format!("{first} {rest}")
    };
    format!("{primary} - {}", body.replace("\\n", "\n"))
}

/// Returns the description part of a formatted help text (after `" - "`).
pub fn description(help: &str) -> &str {
    help.split_once(" - ").map_or(help, |(_, d)| d)
}

/// Renders the sectioned command menu.
///
/// ```text
/// **commands**:
///   __general__:
///     *help* - !help [command/section] displays command help.
/// ```
pub fn help_menu(sections: &[Section<'_>]) -> String {
    let mut out = String::from("**commands**:");
    for section in sections {
        out.push_str(&format!("\n  __{}__:", section.name));
        for cmd in &section.commands {
            let desc = description(cmd.help()).replace('\n', "\n    ");
            out.push_str(&format!("\n    *{}* - {}", cmd.primary(), desc));
        }
    }
    out
}

/// Legend explaining the usage notation found in help texts.
pub const SYNTAX_LEGEND: &str = "**command help syntax**:\n\
[]     optional argument\n\
<>    required argument\n\
\\*       any number of arguments\n\
k=v  kwargs style argument (each key-value pair is separated by space, \
and the key and value are separated by the \"=\" character).\n\
\\*\\*     any number of kwargs";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_help_joins_remaining_lines() {
        let doc = "!help [command/section]\n    displays command help\n    and information.";
        assert_eq!(
            format_help("help", doc),
            "help - !help [command/section] displays command help and information."
        );
    }

    #[test]
    fn test_format_help_single_line() {
        assert_eq!(format_help("ping", "replies with pong."), "ping - replies with pong.");
    }

    #[test]
    fn test_format_help_literal_newline_escape() {
        let doc = "!tz <time>\\nconverts time.";
        assert_eq!(format_help("timezone", doc), "timezone - !tz <time>\nconverts time.");
    }

    #[test]
    fn test_description() {
        assert_eq!(description("help - shows help - really"), "shows help - really");
        assert_eq!(description("no separator"), "no separator");
    }
}
