//! The `general` feature: command help and small talk.

use chime::core::help::{SYNTAX_LEGEND, help_menu};
use chime::prelude::*;
use tracing::info;

const NOT_FOUND: &str = "Command could not be found.";

/// Help, the "go translate" handler, and a ready log line.
pub struct General;

impl Feature for General {
    fn name(&self) -> &str {
        "general"
    }

    fn register(&self, reg: &mut Registrar<'_>) -> RegistrationResult<()> {
        reg.command(
            CommandDecl::new("help", help)
                .aliases(["info", "h", "cmds", "commands"])
                .doc("!help [command/section]\ndisplays command help and information."),
        )?;
        reg.handler(
            TriggerDecl::new("gotranslate", r"^(i|im|i'm)\b(.*)\bbored$", go_translate)
                .flags(PatternFlags::CASE_INSENSITIVE),
        )?;
        reg.event(EventName::READY, |ctx: EventContext| async move {
            let router = ctx.router();
            info!(
                user = %ctx.bot().user_id(),
                commands = router.commands().len(),
                prefix = %router.prefix(),
                "Ready for commands"
            );
            Ok::<(), HandlerError>(())
        })?;
        Ok(())
    }
}

async fn help(ctx: CommandContext) -> HandlerResult {
    let query = ctx.args.as_str().unwrap_or_default().trim();
    let router = ctx.router();

    let menu = if query.is_empty() {
        help_menu(&router.sections())
    } else if let Some(command) = router.resolve(query) {
        let text = command.help().to_string();
        ctx.reply(&text).await?;
        return Ok(());
    } else if let Some(section) = router.commands().section(query) {
        help_menu(&[section])
    } else {
        ctx.reply(NOT_FOUND).await?;
        return Ok(());
    };

    let hint = format!(
        "type {}help [command/section] to display more information about a certain command or section.",
        router.prefix()
    );
    ctx.reply(&menu).await?;
    ctx.reply(&hint).await?;
    ctx.reply(SYNTAX_LEGEND).await?;
    Ok(())
}

/// "i'm so bored", unless a "not" shows up before "bored".
async fn go_translate(ctx: PatternContext) -> HandlerResult {
    let between = ctx.matched.group(2).unwrap_or_default();
    if between.to_lowercase().contains("not") {
        return Ok(());
    }
    ctx.reply("Go translate!").await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chime::core::testing::{RecordingBot, message_from};
    use std::sync::Arc;

    async fn say(content: &str) -> Vec<String> {
        let router = RouterBuilder::new().feature(&General).unwrap().build();
        let recording = Arc::new(RecordingBot::new("self"));
        let bot: BoxedBot = recording.clone();
        let event = Event::Message(Arc::new(message_from("alice", content)));
        tokio_test::assert_ok!(router.handle_event(&bot, event).await);
        recording.sent_texts()
    }

    #[tokio::test]
    async fn test_help_for_a_command() {
        let expected = "help - !help [command/section] displays command help and information.";
        for query in ["!help help", "!h info", "!commands cmds"] {
            assert_eq!(say(query).await, vec![expected]);
        }
    }

    #[tokio::test]
    async fn test_help_menu() {
        let sent = say("!help").await;
        assert_eq!(sent.len(), 3);
        assert_eq!(
            sent[0],
            "**commands**:\n  __general__:\n    *help* - !help [command/section] displays command help and information."
        );
        assert!(sent[1].starts_with("type !help [command/section]"));
        assert_eq!(sent[2], SYNTAX_LEGEND);
    }

    #[tokio::test]
    async fn test_help_for_a_section() {
        let sent = say("!help general").await;
        assert!(sent[0].contains("__general__"));
    }

    #[tokio::test]
    async fn test_help_unknown_topic() {
        assert_eq!(say("!help timezone").await, vec![NOT_FOUND]);
    }

    #[tokio::test]
    async fn test_go_translate() {
        assert_eq!(say("I'm so bored").await, vec!["Go translate!"]);
        assert_eq!(say("im bored").await, vec!["Go translate!"]);
        assert!(say("i'm not bored").await.is_empty());
        assert!(say("I am NOT bored").await.is_empty());
        assert!(say("i'm bored now").await.is_empty());
        assert!(say("him bored").await.is_empty());
    }
}
