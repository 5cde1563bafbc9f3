//! Calendar assistant Telegram bot binary.
//!
//! Start the bot with:
//! ```bash
//! TELEGRAM_TOKEN=xxx OPENAI_API_KEY=xxx GOOGLE_CREDENTIALS_FILE=creds.json \
//!   GOOGLE_CALENDAR_ID=primary cargo run -p calendar-telegram
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use calendar_agent::{ChatClient, LlmClassifier, ModelConfig};
use calendar_core::{load_env_file, Config};
use calendar_google::GoogleCalendar;
use calendar_orchestrator::Orchestrator;
use calendar_persistence::ConversationStore;
use calendar_telegram::health::{self, HealthState};
use calendar_telegram::{CalendarBot, TelegramNotifier};
use clap::Parser;
use teloxide::Bot;
use tracing_subscriber::EnvFilter;

/// Calendar assistant - manage Google Calendar from Telegram
#[derive(Parser, Debug)]
#[command(name = "calendar-telegram")]
#[command(about = "Telegram bot that turns chat messages into Google Calendar actions")]
struct Args {
    /// Verbose logging (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Conversation log directory (overrides DATA_DIR)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Health endpoint port (overrides PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Drop interactions older than this many days (overrides CLEANUP_DAYS)
    #[arg(long)]
    cleanup_days: Option<u32>,

    /// Write a snapshot of the conversation log to PATH and exit
    #[arg(long, value_name = "PATH")]
    backup: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> calendar_telegram::Result<()> {
    let args = Args::parse();

    // Before the subscriber, so RUST_LOG from .env applies
    let env_file = load_env_file();

    // Initialize logging based on verbosity; RUST_LOG wins when set
    let filter = match args.verbose {
        0 => "calendar_telegram=info,calendar_orchestrator=info,teloxide=warn",
        1 => "calendar_telegram=debug,calendar_orchestrator=debug,calendar_google=debug,teloxide=info",
        2 => "calendar_telegram=trace,calendar_orchestrator=trace,calendar_google=trace,teloxide=debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new(filter))
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match &env_file {
        Some(path) => tracing::info!(path = %path.display(), "Loaded environment file"),
        None => tracing::warn!(".env file not found, using environment variables"),
    }

    if let Some(path) = args.backup {
        let data_dir = args.data_dir.unwrap_or_else(calendar_core::data_dir_from_env);
        let store = ConversationStore::open(&data_dir)?;
        store.backup(&path).await?;
        println!("Backup written to {}", path.display());
        return Ok(());
    }

    let mut config = Config::from_env()?;
    if let Some(data_dir) = args.data_dir {
        config.data_dir = data_dir;
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    if args.cleanup_days.is_some() {
        config.cleanup_days = args.cleanup_days;
    }
    config.log_summary();

    let store = Arc::new(ConversationStore::open(&config.data_dir)?);

    let classifier = LlmClassifier::new(
        ChatClient::new(&config.openai_api_url, &config.openai_api_key),
        ModelConfig::new(&config.openai_model),
    );

    let calendar = GoogleCalendar::from_credentials_file(&config.google_credentials, &config.calendar_id)?;
    calendar.test_connection().await;

    let bot = Bot::new(&config.telegram_token);
    let orchestrator = Arc::new(Orchestrator::new(
        store,
        Arc::new(classifier),
        Arc::new(calendar),
        Arc::new(TelegramNotifier::new(bot.clone())),
    ));

    let port = config.port;
    tokio::spawn(async move {
        if let Err(e) = health::serve(port, HealthState::new()).await {
            tracing::error!(port, error = %e, "Health server failed");
        }
    });

    let calendar_bot = CalendarBot::new(bot, orchestrator).with_cleanup_days(config.cleanup_days);

    match calendar_bot.get_me().await {
        Ok(username) => {
            tracing::info!(username = %username, "Bot initialized successfully");
            println!("\n[calendar] Calendar Assistant Bot");
            println!("   Bot: @{}", username);
            println!("   Calendar: {}", config.calendar_id);
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to get bot info");
            return Err(e);
        }
    }

    println!("\n[phone] Open Telegram and send /start to begin");
    println!("   Press Ctrl+C to stop\n");

    calendar_bot.start_polling().await?;

    Ok(())
}
