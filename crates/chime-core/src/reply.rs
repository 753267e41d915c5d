//! Splitting long replies for the outbound length limit.
//!
//! The messaging service rejects messages above a hard character limit. A
//! reply that exceeds it is sent as ordered chunks, one send after the other.
//! In truncation mode a reply with too many lines is instead cut down to a
//! fixed prefix plus a notice, and sent once.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::bot::Bot;
use crate::error::TransportResult;
use crate::message::ChannelId;

/// Notice appended to truncated replies.
pub const TRUNCATION_NOTICE: &str = "\n... *Message truncated. Send me a command over PM to show more!*";

/// Outbound size limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyLimits {
    /// Hard per-message character limit.
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,

    /// Line count above which truncation mode cuts the reply.
    #[serde(default = "default_max_lines")]
    pub max_lines: usize,
}

impl Default for ReplyLimits {
    fn default() -> Self {
        Self {
            max_chars: default_max_chars(),
            max_lines: default_max_lines(),
        }
    }
}

fn default_max_chars() -> usize {
    2000
}

fn default_max_lines() -> usize {
    15
}

/// Splits `s` into pieces of at most `n` characters.
pub fn split_every(s: &str, n: usize) -> Vec<String> {
    let n = n.max(1);
    let chars: Vec<char> = s.chars().collect();
    chars.chunks(n).map(|c| c.iter().collect()).collect()
}

/// Prepares `output` for sending.
///
/// Trailing whitespace is dropped. With `truncate` set and more than
/// `limits.max_lines` line breaks, the result is a single message holding the
/// first `max_lines` lines and [`TRUNCATION_NOTICE`]. Otherwise the text is
/// split into `max_chars` chunks.
pub fn long_message(output: &str, truncate: bool, limits: ReplyLimits) -> Vec<String> {
    let output = output.trim_end();
    if truncate && output.matches('\n').count() > limits.max_lines {
        let head = output
            .split('\n')
            .take(limits.max_lines)
            .collect::<Vec<_>>()
            .join("\n");
        vec![format!("{head}{TRUNCATION_NOTICE}")]
    } else {
        split_every(output, limits.max_chars)
    }
}

/// Sends `text` to `channel`, chunked or truncated per [`long_message`].
///
/// Chunks are sent sequentially; the first failed send aborts the rest.
pub async fn send_long_message(
    bot: &dyn Bot,
    channel: &ChannelId,
    text: &str,
    truncate: bool,
    limits: ReplyLimits,
) -> TransportResult<()> {
    let chunks = long_message(text, truncate, limits);
    trace!(channel = %channel, chunks = chunks.len(), "Sending long message");
    for chunk in chunks {
        bot.send(channel, &chunk).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingBot;

    #[test]
    fn test_short_message_single_chunk() {
        assert_eq!(long_message("hello  \n", false, ReplyLimits::default()), vec!["hello"]);
    }

    #[test]
    fn test_split_counts_characters_not_bytes() {
        let chunks = split_every("ééééé", 2);
        assert_eq!(chunks, vec!["éé", "éé", "é"]);
    }

    #[test]
    fn test_long_message_split() {
        let text = "a".repeat(4500);
        let chunks = long_message(&text, false, ReplyLimits::default());
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].len(), 2000);
        assert_eq!(chunks[2].len(), 500);
    }

    #[test]
    fn test_truncate_mode() {
        let limits = ReplyLimits {
            max_chars: 2000,
            max_lines: 3,
        };
        let text = "1\n2\n3\n4\n5";
        let out = long_message(text, true, limits);
        assert_eq!(out, vec![format!("1\n2\n3{TRUNCATION_NOTICE}")]);
    }

    #[test]
    fn test_truncate_mode_within_limit_is_untouched() {
        let limits = ReplyLimits {
            max_chars: 2000,
            max_lines: 3,
        };
        assert_eq!(long_message("1\n2\n3", true, limits), vec!["1\n2\n3"]);
    }

    #[tokio::test]
    async fn test_send_long_message_sends_chunks_in_order() {
        let bot = RecordingBot::new("self");
        let limits = ReplyLimits {
            max_chars: 3,
            max_lines: 15,
        };
        send_long_message(&bot, &ChannelId::new("c"), "abcdefg", false, limits)
            .await
            .unwrap();
        assert_eq!(bot.sent_texts(), vec!["abc", "def", "g"]);
    }

    #[tokio::test]
    async fn test_send_long_message_truncated_is_one_send() {
        let bot = RecordingBot::new("self");
        let text = (0..40).map(|i| i.to_string()).collect::<Vec<_>>().join("\n");
        send_long_message(&bot, &ChannelId::new("c"), &text, true, ReplyLimits::default())
            .await
            .unwrap();
        let sent = bot.sent_texts();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].starts_with("0\n1\n"));
        assert!(sent[0].ends_with(TRUNCATION_NOTICE));
        assert_eq!(sent[0].matches('\n').count(), 14 + TRUNCATION_NOTICE.matches('\n').count());
    }

    #[test]
    fn test_send_failure_aborts_remaining_chunks() {
        let bot = RecordingBot::failing("self");
        let limits = ReplyLimits {
            max_chars: 2,
            max_lines: 15,
        };
        let result = tokio_test::block_on(send_long_message(
            &bot,
            &ChannelId::new("c"),
            "abcdef",
            false,
            limits,
        ));
        tokio_test::assert_err!(result);
        assert!(bot.sent().is_empty());
    }
}
