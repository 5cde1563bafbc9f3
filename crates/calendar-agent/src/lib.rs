//! Intent classification for the calendar assistant.
//!
//! A user message and the recent dialogue are sent to a chat-completions
//! model, which answers with a JSON intent describing which calendar action
//! to take.
//!
//! # Core Types
//!
//! - [`IntentClassifier`]: the seam the orchestrator depends on
//! - [`LlmClassifier`]: implementation backed by [`ChatClient`]
//! - [`ClassificationError`]: transport, API and envelope failures
//!
//! # Example
//!
//! ```no_run
//! use calendar_agent::{ChatClient, IntentClassifier, LlmClassifier, ModelConfig};
//!
//! # async fn run() -> calendar_agent::Result<()> {
//! let client = ChatClient::new("https://api.openai.com/v1/chat/completions", "sk-...");
//! let classifier = LlmClassifier::new(client, ModelConfig::new("gpt-4o-mini"));
//!
//! let intent = classifier.classify("", "what do I have tomorrow?").await?;
//! println!("{}", intent.message());
//! # Ok(())
//! # }
//! ```

pub mod classifier;
pub mod client;
pub mod error;
pub mod prompt;

pub use classifier::{parse_intent, IntentClassifier, LlmClassifier};
pub use client::{ChatClient, ChatMessage, ModelConfig};
pub use error::{ClassificationError, Result};
