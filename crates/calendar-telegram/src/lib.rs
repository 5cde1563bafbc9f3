//! Telegram front end for the calendar assistant.
//!
//! Incoming text is handed to the
//! [`Orchestrator`](calendar_orchestrator::Orchestrator), which classifies
//! it, runs the calendar action and replies through [`TelegramNotifier`].
//!
//! # Environment Variables
//!
//! Required:
//! - `TELEGRAM_TOKEN`: Bot token from @BotFather
//! - `OPENAI_API_KEY`: Key for the chat-completions API
//! - `GOOGLE_CREDENTIALS_FILE`: Google service account or authorized user JSON
//! - `GOOGLE_CALENDAR_ID`: Calendar to operate on
//!
//! Optional:
//! - `PORT`: Health endpoint port (default: 8080)
//! - `OPENAI_MODEL`, `OPENAI_API_URL`: Model and endpoint overrides
//! - `DATA_DIR`: Conversation log directory (default: ./data)
//! - `CLEANUP_DAYS`: Drop interactions older than this many days
//!
//! # Commands
//!
//! - `/start` - Welcome message with Today/Tomorrow quick views
//! - `/help` - Show available commands
//! - `/stats` - Show your usage statistics
//!
//! Any other text is treated as a calendar request.

pub mod bot;
pub mod error;
pub mod handlers;
pub mod health;
pub mod notifier;

pub use bot::CalendarBot;
pub use error::{BotError, Result};
pub use notifier::{split_message, TelegramNotifier};
