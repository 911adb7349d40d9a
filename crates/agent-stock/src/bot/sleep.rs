//! `!sleep`

use agent_tools::{CommandContext, CommandHandler, Outcome};
use async_trait::async_trait;
use std::time::Duration;

/// Says goodnight, then keeps the loop idle for a while
///
/// The pause is requested through the context so the reply is posted before
/// the bot goes quiet.
pub struct SleepCommand {
    duration: Duration,
}

impl SleepCommand {
    pub fn new(duration: Duration) -> Self {
        Self { duration }
    }
}

#[async_trait]
impl CommandHandler for SleepCommand {
    fn keyword(&self) -> &str {
        "sleep"
    }

    fn help_text(&self) -> &str {
        "Send me to sleep for a minute"
    }

    async fn invoke(&self, ctx: &mut CommandContext<'_>, _args: &[String]) -> Outcome {
        ctx.pause_for(self.duration);
        Outcome::reply("Zzzz 😴")
    }
}
