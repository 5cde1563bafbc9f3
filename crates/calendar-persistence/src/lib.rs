//! Persistence layer for the calendar assistant.
//!
//! Conversation history lives in a single JSON file mapping user IDs to
//! their recent interactions. Every mutation rewrites the whole file using
//! atomic file operations (write to temp file, then rename).
//!
//! # Example
//!
//! ```no_run
//! use calendar_persistence::ConversationStore;
//!
//! # async fn run() -> calendar_persistence::Result<()> {
//! let store = ConversationStore::open("./data")?;
//!
//! store.append(42, "what's on today?", "Checking today", "getEvents").await?;
//! let context = store.context(42, 10).await;
//! assert!(context.starts_with("User: what's on today?"));
//! # Ok(())
//! # }
//! ```

pub mod atomic;
pub mod conversation_store;
pub mod error;

pub use conversation_store::{ConversationStore, UserStats, MAX_INTERACTIONS_PER_USER};
pub use error::{PersistenceError, Result};
