use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::events::{EventContext, EventHandlerError, HandlerResult, MessageCreateEvent};

pub const DEFAULT_COMMAND_PREFIX: &str = "!";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BotCommand {
    /// Starts a clock wizard in the message's channel.
    Clock,
    Hello,
    Unknown(String),
}

/// Parses `<prefix><name> [args...]`. Returns `None` for ordinary chat.
/// Command names are case-sensitive.
pub fn parse_bot_command(prefix: &str, content: &str) -> Option<BotCommand> {
    let rest = content.strip_prefix(prefix)?;
    if rest.starts_with(char::is_whitespace) {
        return None;
    }
    let name = rest.split_whitespace().next()?;
    Some(match name {
        "clock" => BotCommand::Clock,
        "hello" => BotCommand::Hello,
        other => BotCommand::Unknown(other.to_owned()),
    })
}

#[async_trait]
pub trait CommandService: Send + Sync {
    async fn start_clock(
        &self,
        message: &MessageCreateEvent,
        ctx: &EventContext,
    ) -> Result<HandlerResult, EventHandlerError>;

    async fn hello(
        &self,
        message: &MessageCreateEvent,
        ctx: &EventContext,
    ) -> Result<HandlerResult, EventHandlerError>;
}

#[async_trait]
impl<S> CommandService for Arc<S>
where
    S: CommandService + ?Sized,
{
    async fn start_clock(
        &self,
        message: &MessageCreateEvent,
        ctx: &EventContext,
    ) -> Result<HandlerResult, EventHandlerError> {
        (**self).start_clock(message, ctx).await
    }

    async fn hello(
        &self,
        message: &MessageCreateEvent,
        ctx: &EventContext,
    ) -> Result<HandlerResult, EventHandlerError> {
        (**self).hello(message, ctx).await
    }
}

pub struct CommandRouter<S> {
    prefix: String,
    service: S,
}

impl<S> CommandRouter<S>
where
    S: CommandService,
{
    pub fn new(prefix: impl Into<String>, service: S) -> Self {
        Self { prefix: prefix.into(), service }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub async fn route(
        &self,
        message: &MessageCreateEvent,
        ctx: &EventContext,
    ) -> Result<HandlerResult, EventHandlerError> {
        if message.author_is_bot {
            return Ok(HandlerResult::Ignored);
        }
        let Some(command) = parse_bot_command(&self.prefix, &message.content) else {
            return Ok(HandlerResult::Ignored);
        };

        match command {
            BotCommand::Clock => self.service.start_clock(message, ctx).await,
            BotCommand::Hello => self.service.hello(message, ctx).await,
            BotCommand::Unknown(name) => {
                debug!(
                    event_name = "ingress.discord.unknown_command",
                    correlation_id = %ctx.correlation_id,
                    command = %name,
                    "ignoring unknown command"
                );
                Ok(HandlerResult::Ignored)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::{parse_bot_command, BotCommand, CommandRouter, CommandService};
    use crate::events::{EventContext, EventHandlerError, HandlerResult, MessageCreateEvent};

    #[derive(Default)]
    struct RecordingService {
        calls: Mutex<Vec<&'static str>>,
    }

    #[async_trait]
    impl CommandService for RecordingService {
        async fn start_clock(
            &self,
            _message: &MessageCreateEvent,
            _ctx: &EventContext,
        ) -> Result<HandlerResult, EventHandlerError> {
            self.calls.lock().expect("lock").push("clock");
            Ok(HandlerResult::Processed)
        }

        async fn hello(
            &self,
            _message: &MessageCreateEvent,
            _ctx: &EventContext,
        ) -> Result<HandlerResult, EventHandlerError> {
            self.calls.lock().expect("lock").push("hello");
            Ok(HandlerResult::Processed)
        }
    }

    fn message(content: &str, author_is_bot: bool) -> MessageCreateEvent {
        MessageCreateEvent {
            message_id: "M-1".to_owned(),
            channel_id: "C-1".to_owned(),
            author_id: "U-1".to_owned(),
            author_is_bot,
            content: content.to_owned(),
        }
    }

    #[test]
    fn parses_known_and_unknown_commands() {
        assert_eq!(parse_bot_command("!", "!clock"), Some(BotCommand::Clock));
        assert_eq!(parse_bot_command("!", "!clock now"), Some(BotCommand::Clock));
        assert_eq!(parse_bot_command("!", "!hello"), Some(BotCommand::Hello));
        assert_eq!(parse_bot_command("!", "!dance"), Some(BotCommand::Unknown("dance".to_owned())));
        assert_eq!(parse_bot_command("$", "$clock"), Some(BotCommand::Clock));
    }

    #[test]
    fn ordinary_chat_is_not_a_command() {
        assert_eq!(parse_bot_command("!", "clock"), None);
        assert_eq!(parse_bot_command("!", "!"), None);
        assert_eq!(parse_bot_command("!", "! clock"), None);
        assert_eq!(parse_bot_command("!", "  !clock"), None);
        assert_eq!(parse_bot_command("!", "!Clock"), Some(BotCommand::Unknown("Clock".to_owned())));
    }

    #[tokio::test]
    async fn routes_commands_and_skips_bots() {
        let router = CommandRouter::new("!", RecordingService::default());
        let ctx = EventContext::default();

        let clock = router.route(&message("!clock", false), &ctx).await.expect("route");
        let hello = router.route(&message("!hello", false), &ctx).await.expect("route");
        let from_bot = router.route(&message("!clock", true), &ctx).await.expect("route");
        let unknown = router.route(&message("!dance", false), &ctx).await.expect("route");

        assert_eq!(clock, HandlerResult::Processed);
        assert_eq!(hello, HandlerResult::Processed);
        assert_eq!(from_bot, HandlerResult::Ignored);
        assert_eq!(unknown, HandlerResult::Ignored);
        assert_eq!(*router.service.calls.lock().expect("lock"), vec!["clock", "hello"]);
    }
}
