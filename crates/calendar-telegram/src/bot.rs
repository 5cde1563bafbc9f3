//! Bot wiring: update dispatch and background maintenance.

use std::sync::Arc;
use std::time::Duration;

use calendar_orchestrator::Orchestrator;
use teloxide::dispatching::UpdateFilterExt;
use teloxide::prelude::*;
use teloxide::types::CallbackQuery;
use tokio::time::interval;
use tracing::{info, warn};

use crate::error::Result;
use crate::handlers::{handle_callback, handle_command, handle_message, Command};

/// How often old interactions are purged.
pub const CLEANUP_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// The calendar assistant's Telegram bot.
pub struct CalendarBot {
    /// The teloxide bot instance.
    bot: Bot,
    /// Shared message pipeline.
    orchestrator: Arc<Orchestrator>,
    /// Retention period for interactions, if any.
    cleanup_days: Option<u32>,
}

impl CalendarBot {
    /// Creates a bot dispatching to `orchestrator`.
    pub fn new(bot: Bot, orchestrator: Arc<Orchestrator>) -> Self {
        Self {
            bot,
            orchestrator,
            cleanup_days: None,
        }
    }

    /// Purges interactions older than `days` once a day while running.
    pub fn with_cleanup_days(mut self, days: Option<u32>) -> Self {
        self.cleanup_days = days;
        self
    }

    /// Get the bot's username.
    pub async fn get_me(&self) -> Result<String> {
        let me = self.bot.get_me().await?;
        Ok(me.username().to_string())
    }

    /// Runs the bot in long-polling mode until Ctrl+C.
    pub async fn start_polling(&self) -> Result<()> {
        info!("Starting Telegram bot in polling mode...");

        if let Some(days) = self.cleanup_days {
            let orchestrator = Arc::clone(&self.orchestrator);
            tokio::spawn(async move {
                cleanup_loop(orchestrator, days).await;
            });
        }

        let orchestrator_for_commands = Arc::clone(&self.orchestrator);
        let orchestrator_for_messages = Arc::clone(&self.orchestrator);
        let orchestrator_for_callbacks = Arc::clone(&self.orchestrator);

        let handler = dptree::entry()
            .branch(
                Update::filter_callback_query().endpoint(move |bot: Bot, q: CallbackQuery| {
                    let orchestrator = Arc::clone(&orchestrator_for_callbacks);
                    async move { handle_callback(bot, q, orchestrator).await }
                }),
            )
            .branch(
                Update::filter_message()
                    .filter_command::<Command>()
                    .endpoint(move |bot: Bot, msg: Message, cmd: Command| {
                        let orchestrator = Arc::clone(&orchestrator_for_commands);
                        info!(chat_id = %msg.chat.id, "Command matched: {:?}", cmd);
                        async move { handle_command(bot, msg, cmd, orchestrator).await }
                    }),
            )
            .branch(
                Update::filter_message()
                    .filter(|msg: Message| msg.text().is_some())
                    .endpoint(move |msg: Message| {
                        let orchestrator = Arc::clone(&orchestrator_for_messages);
                        async move { handle_message(msg, orchestrator).await }
                    }),
            );

        info!("Bot is running! Send /start to begin.");

        Dispatcher::builder(self.bot.clone(), handler)
            .default_handler(|upd| async move {
                warn!("Unhandled update: {:?}", upd.kind);
            })
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;

        info!("Bot stopped");
        Ok(())
    }
}

/// Background task purging old interactions on a fixed interval.
async fn cleanup_loop(orchestrator: Arc<Orchestrator>, days: u32) {
    let mut ticker = interval(CLEANUP_INTERVAL);

    loop {
        ticker.tick().await;

        match orchestrator.cleanup_old_interactions(days).await {
            Ok(removed) => info!(removed, days, "Periodic cleanup finished"),
            Err(e) => warn!(error = %e, "Periodic cleanup failed"),
        }
    }
}
