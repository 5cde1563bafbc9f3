//! Command, message and callback handlers.

use std::sync::Arc;

use calendar_orchestrator::{Orchestrator, CALLBACK_TODAY, CALLBACK_TOMORROW};
use calendar_persistence::UserStats;
use teloxide::prelude::*;
use teloxide::types::{CallbackQuery, InlineKeyboardButton, InlineKeyboardMarkup};
use teloxide::utils::command::BotCommands;
use tracing::{debug, error, info, warn};

/// Bot commands that can be invoked with /.
#[derive(BotCommands, Clone, Debug)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
pub enum Command {
    #[command(description = "Start the bot and show quick views")]
    Start,

    #[command(description = "Show help message")]
    Help,

    #[command(description = "Show your usage statistics")]
    Stats,
}

const WELCOME: &str = "Hi! I'm your calendar assistant.\n\n\
    Ask me things like:\n\
    • What's on my calendar today?\n\
    • Schedule a dentist appointment tomorrow at 14:30\n\
    • What did I have on Monday and Tuesday last week?\n\
    • Delete the event with ID abc123\n\n\
    All times are in UTC. Type /help for commands.";

/// Inline keyboard with the quick-view buttons.
pub fn quick_view_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![
        InlineKeyboardButton::callback("📅 Today", CALLBACK_TODAY),
        InlineKeyboardButton::callback("📆 Tomorrow", CALLBACK_TOMORROW),
    ]])
}

/// Renders `/stats` output.
pub fn format_stats(stats: &UserStats) -> String {
    if stats.total_interactions == 0 {
        return "No interactions recorded yet.".to_string();
    }

    let mut text = format!("Your statistics:\n\nTotal interactions: {}\n", stats.total_interactions);
    if let Some(first) = stats.first_interaction {
        text.push_str(&format!("First interaction: {}\n", first.format("%Y-%m-%d %H:%M UTC")));
    }
    if let Some(last) = stats.last_interaction {
        text.push_str(&format!("Last interaction: {}\n", last.format("%Y-%m-%d %H:%M UTC")));
    }
    if !stats.actions_used.is_empty() {
        text.push_str("\nActions used:\n");
        for (action, count) in &stats.actions_used {
            text.push_str(&format!("• {action}: {count}\n"));
        }
    }
    text
}

/// Telegram user ID of a message sender, falling back to the chat ID.
fn sender_id(msg: &Message) -> i64 {
    msg.from
        .as_ref()
        .map(|u| u.id.0 as i64)
        .unwrap_or(msg.chat.id.0)
}

/// Handle the /start command.
pub async fn handle_start(bot: Bot, msg: Message) -> ResponseResult<()> {
    bot.send_message(msg.chat.id, WELCOME)
        .reply_markup(quick_view_keyboard())
        .await?;

    info!(chat_id = %msg.chat.id, user = ?msg.from.as_ref().map(|u| &u.username), "User started bot");
    Ok(())
}

/// Handle the /help command.
pub async fn handle_help(bot: Bot, msg: Message) -> ResponseResult<()> {
    let help_text = format!(
        "{}\n\nAny other message is read as a calendar request.",
        Command::descriptions()
    );
    bot.send_message(msg.chat.id, help_text).await?;
    Ok(())
}

/// Handle the /stats command.
pub async fn handle_stats(
    bot: Bot,
    msg: Message,
    orchestrator: Arc<Orchestrator>,
) -> ResponseResult<()> {
    let stats = orchestrator.user_stats(sender_id(&msg)).await;
    bot.send_message(msg.chat.id, format_stats(&stats)).await?;
    Ok(())
}

/// Dispatch commands to appropriate handlers.
pub async fn handle_command(
    bot: Bot,
    msg: Message,
    cmd: Command,
    orchestrator: Arc<Orchestrator>,
) -> ResponseResult<()> {
    match cmd {
        Command::Start => handle_start(bot, msg).await,
        Command::Help => handle_help(bot, msg).await,
        Command::Stats => handle_stats(bot, msg, orchestrator).await,
    }
}

/// Handle a regular text message.
///
/// The request runs on its own task so a slow model or calendar call never
/// holds up other updates.
pub async fn handle_message(msg: Message, orchestrator: Arc<Orchestrator>) -> ResponseResult<()> {
    let Some(text) = msg.text().map(str::to_string) else {
        return Ok(());
    };
    let user_id = sender_id(&msg);
    let chat_id = msg.chat.id.0;

    debug!(user_id, chat_id, len = text.len(), "Spawning message task");
    tokio::spawn(async move {
        if let Err(e) = orchestrator.handle_message(user_id, chat_id, &text).await {
            error!(user_id, chat_id, error = %e, "Failed to deliver response");
        }
    });
    Ok(())
}

/// Handle a press on an inline keyboard button.
pub async fn handle_callback(
    bot: Bot,
    q: CallbackQuery,
    orchestrator: Arc<Orchestrator>,
) -> ResponseResult<()> {
    // Stops the button's loading spinner. A stale query still gets its view.
    if let Err(e) = bot.answer_callback_query(q.id.clone()).await {
        warn!(user_id = q.from.id.0, error = %e, "Failed to acknowledge callback query");
    }

    let Some(data) = q.data.clone() else {
        warn!(user_id = q.from.id.0, "Callback query without data");
        return Ok(());
    };
    let chat_id = q
        .message
        .as_ref()
        .map(|m| m.chat().id)
        .unwrap_or_else(|| ChatId::from(q.from.id));

    info!(chat_id = %chat_id, data = %data, "Callback received");
    if let Err(e) = orchestrator.handle_callback(chat_id.0, &data).await {
        error!(chat_id = %chat_id, error = %e, "Failed to answer callback");
    }
    Ok(())
}
