//! A line-based console transport.
//!
//! Every non-empty input line becomes a message from one local user in one
//! channel. Outbound messages are written as `[channel] text` lines.

use std::any::Any;
use std::sync::Arc;

use async_trait::async_trait;
use chime::core::{Bot, ChannelId, Event, Message, TransportResult, User, UserId};
use futures::stream::{self, Stream, StreamExt};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;
use tracing::{trace, warn};

type Output = Box<dyn AsyncWrite + Send + Unpin>;

/// Bot whose sends are written to a stream, stdout by default.
pub struct ConsoleBot {
    id: UserId,
    output: Mutex<Output>,
}

impl ConsoleBot {
    /// Writes to stdout.
    pub fn stdout(id: impl Into<String>) -> Self {
        Self::with_output(id, tokio::io::stdout())
    }

    pub fn with_output(
        id: impl Into<String>,
        output: impl AsyncWrite + Send + Unpin + 'static,
    ) -> Self {
        Self {
            id: UserId::new(id),
            output: Mutex::new(Box::new(output)),
        }
    }
}

#[async_trait]
impl Bot for ConsoleBot {
    fn user_id(&self) -> &UserId {
        &self.id
    }

    async fn send(&self, channel: &ChannelId, text: &str) -> TransportResult<()> {
        let line = format!("[{channel}] {text}\n");
        let mut output = self.output.lock().await;
        output.write_all(line.as_bytes()).await?;
        output.flush().await?;
        Ok(())
    }

    async fn set_presence(&self, game: Option<&str>) -> TransportResult<()> {
        if let Some(game) = game {
            let mut output = self.output.lock().await;
            output.write_all(format!("* playing {game}\n").as_bytes()).await?;
            output.flush().await?;
        }
        Ok(())
    }

    fn as_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

/// Turns `input` into `ready` followed by one `message` event per line.
///
/// The stream ends with the input. A read error is logged and ends it too.
pub fn events<R>(input: R, author: User, channel: ChannelId) -> impl Stream<Item = Event> + Send
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    let messages = stream::unfold((input.lines(), 0u64), move |(mut lines, seq)| {
        let author = author.clone();
        let channel = channel.clone();
        async move {
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) if line.trim().is_empty() => continue,
                    Ok(Some(line)) => {
                        trace!(seq, "Console input");
                        let message = Message::new(author, channel, line).with_id(seq.to_string());
                        return Some((Event::Message(Arc::new(message)), (lines, seq + 1)));
                    }
                    Ok(None) => return None,
                    Err(e) => {
                        warn!(error = %e, "Failed to read console input");
                        return None;
                    }
                }
            }
        }
    });
    stream::once(async { Event::Ready }).chain(messages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::BufReader;

    #[tokio::test]
    async fn test_events_skip_blank_lines() {
        let input = BufReader::new(&b"!help\n\n   \nhi there\n"[..]);
        let author = User::new("console", "you");
        let events: Vec<Event> = events(input, author, ChannelId::new("console"))
            .collect()
            .await;

        assert_eq!(events.len(), 3);
        assert!(matches!(events[0], Event::Ready));
        let texts: Vec<&str> = events[1..]
            .iter()
            .filter_map(Event::as_message)
            .map(|m| m.content.as_str())
            .collect();
        assert_eq!(texts, vec!["!help", "hi there"]);
        assert_eq!(events[2].as_message().map(|m| m.id.as_str()), Some("1"));
    }

    #[tokio::test]
    async fn test_console_bot_writes_lines() {
        let (writer, reader) = tokio::io::duplex(1024);
        let bot = ConsoleBot::with_output("chime", writer);
        bot.send(&ChannelId::new("console"), "pong").await.unwrap();
        bot.set_presence(Some("with regexes")).await.unwrap();
        drop(bot);

        let mut lines = BufReader::new(reader).lines();
        assert_eq!(lines.next_line().await.unwrap().as_deref(), Some("[console] pong"));
        assert_eq!(lines.next_line().await.unwrap().as_deref(), Some("* playing with regexes"));
        assert_eq!(lines.next_line().await.unwrap(), None);
    }
}
