//! `!help`

use agent_tools::{CommandContext, CommandHandler, Outcome};
use async_trait::async_trait;

/// Lists every other registered command with its help text
pub struct HelpCommand;

#[async_trait]
impl CommandHandler for HelpCommand {
    fn keyword(&self) -> &str {
        "help"
    }

    fn help_text(&self) -> &str {
        "Show this help"
    }

    async fn invoke(&self, ctx: &mut CommandContext<'_>, _args: &[String]) -> Outcome {
        let mut text = String::from("Bot commands:");
        for (keyword, help) in ctx.registry().list() {
            if keyword == self.keyword() {
                continue;
            }
            text.push_str(&format!("\n!{keyword} - {help}"));
        }
        Outcome::reply(text)
    }
}
