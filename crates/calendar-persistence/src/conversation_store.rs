//! Per-user conversation log.
//!
//! The whole table is held in memory and mirrored to one JSON file:
//! ```text
//! data_dir/
//! └── interactions.json   { "<user_id>": [Interaction, ...], ... }
//! ```
//! One async read/write lock guards the table. Mutations hold the write lock
//! through the disk write, so the file always reflects a complete state.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use calendar_models::Interaction;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::atomic::{atomic_write_json, read_json_optional};
use crate::error::{PersistenceError, Result};

/// Interactions retained per user; older ones are evicted first.
pub const MAX_INTERACTIONS_PER_USER: usize = 50;

/// File name of the conversation log inside the data directory.
const STORE_FILE: &str = "interactions.json";

type Table = BTreeMap<i64, Vec<Interaction>>;

/// Usage summary for one user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UserStats {
    /// Number of retained interactions.
    pub total_interactions: usize,
    /// Timestamp of the oldest retained interaction.
    pub first_interaction: Option<DateTime<Utc>>,
    /// Timestamp of the newest retained interaction.
    pub last_interaction: Option<DateTime<Utc>>,
    /// How often each action tag was used. Empty tags are not counted.
    pub actions_used: BTreeMap<String, usize>,
}

/// Append-only conversation history, persisted on every mutation.
pub struct ConversationStore {
    path: PathBuf,
    interactions: RwLock<Table>,
}

impl ConversationStore {
    /// Opens the store in `data_dir`, creating the directory if needed.
    ///
    /// A missing or unreadable log yields an empty store; only failure to
    /// create the directory is an error.
    pub fn open(data_dir: impl AsRef<Path>) -> Result<Self> {
        let data_dir = data_dir.as_ref();
        fs::create_dir_all(data_dir).map_err(|source| PersistenceError::DirectoryError {
            path: data_dir.to_path_buf(),
            source,
        })?;
        Ok(Self::with_file(data_dir.join(STORE_FILE)))
    }

    /// Opens the store backed by an explicit file path.
    pub fn with_file(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let interactions = load_table(&path);
        Self {
            path,
            interactions: RwLock::new(interactions),
        }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Records an interaction and persists the table.
    ///
    /// On a write error the interaction stays in memory; it reaches disk with
    /// the next successful mutation.
    pub async fn append(
        &self,
        user_id: i64,
        user_message: &str,
        ai_response: &str,
        action: &str,
    ) -> Result<()> {
        self.push(Interaction::new(user_id, user_message, ai_response, action))
            .await
    }

    /// Appends a prepared interaction, enforcing the per-user cap.
    pub async fn push(&self, interaction: Interaction) -> Result<()> {
        let mut table = self.interactions.write().await;
        let user_id = interaction.user_id;

        let history = table.entry(user_id).or_default();
        history.push(interaction);
        if history.len() > MAX_INTERACTIONS_PER_USER {
            let excess = history.len() - MAX_INTERACTIONS_PER_USER;
            history.drain(..excess);
        }

        debug!(user_id, count = history.len(), "Saving interactions");
        self.persist(&table)
    }

    /// Returns the last `limit` interactions for a user, oldest first.
    ///
    /// A `limit` of zero or less returns everything retained.
    pub async fn recent(&self, user_id: i64, limit: i64) -> Vec<Interaction> {
        let table = self.interactions.read().await;
        let Some(history) = table.get(&user_id) else {
            return Vec::new();
        };
        history[tail_start(history.len(), limit)..].to_vec()
    }

    /// Formats the last `n` interactions as dialogue for the classifier.
    ///
    /// Each interaction becomes `"User: ...\nAI: ...\n\n"`. Empty when the
    /// user has no history.
    pub async fn context(&self, user_id: i64, n: i64) -> String {
        self.recent(user_id, n)
            .await
            .iter()
            .map(|i| format!("User: {}\nAI: {}\n\n", i.user_message, i.ai_response))
            .collect()
    }

    /// Summarizes a user's retained history.
    pub async fn stats(&self, user_id: i64) -> UserStats {
        let table = self.interactions.read().await;
        let Some(history) = table.get(&user_id).filter(|h| !h.is_empty()) else {
            return UserStats::default();
        };

        let mut actions_used = BTreeMap::new();
        for interaction in history.iter().filter(|i| !i.action.is_empty()) {
            *actions_used.entry(interaction.action.clone()).or_insert(0) += 1;
        }

        UserStats {
            total_interactions: history.len(),
            first_interaction: history.first().map(|i| i.timestamp),
            last_interaction: history.last().map(|i| i.timestamp),
            actions_used,
        }
    }

    /// Removes interactions older than `max_age` for every user.
    ///
    /// Returns how many interactions were removed.
    pub async fn cleanup(&self, max_age: Duration) -> Result<usize> {
        let cutoff = Utc::now() - max_age;
        let mut table = self.interactions.write().await;

        let mut removed = 0;
        for history in table.values_mut() {
            let before = history.len();
            history.retain(|i| i.timestamp > cutoff);
            removed += before - history.len();
        }
        table.retain(|_, history| !history.is_empty());

        info!(removed, "Cleaned up old interactions");
        self.persist(&table)?;
        Ok(removed)
    }

    /// Writes a snapshot of the whole table to `path`.
    pub async fn backup(&self, path: &Path) -> Result<()> {
        let table = self.interactions.read().await;
        atomic_write_json(path, &*table)?;
        info!(path = %path.display(), users = table.len(), "Wrote conversation backup");
        Ok(())
    }

    /// Copy of the full table.
    pub async fn snapshot(&self) -> BTreeMap<i64, Vec<Interaction>> {
        self.interactions.read().await.clone()
    }

    // Blocking write while the write lock is held, so the file follows mutation order.
    fn persist(&self, table: &Table) -> Result<()> {
        atomic_write_json(&self.path, table)
    }
}

/// Index of the first of the last `limit` items in a list of `len`.
fn tail_start(len: usize, limit: i64) -> usize {
    match usize::try_from(limit) {
        Ok(limit) if limit > 0 && limit < len => len - limit,
        _ => 0,
    }
}

fn load_table(path: &Path) -> Table {
    match read_json_optional::<Table>(path) {
        Ok(Some(table)) => {
            info!(path = %path.display(), users = table.len(), "Loaded interactions");
            table
        }
        Ok(None) => {
            debug!(path = %path.display(), "No existing interactions file");
            Table::new()
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Could not load existing interactions");
            Table::new()
        }
    }
}
