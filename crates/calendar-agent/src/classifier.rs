//! Intent classification.

use async_trait::async_trait;
use calendar_models::{Intent, IntentPayload};
use chrono::Utc;
use tracing::{debug, warn};

use crate::client::{ChatClient, ChatMessage, ModelConfig};
use crate::error::{ClassificationError, Result};
use crate::prompt::{system_prompt, user_prompt};

/// Turns a user message plus prior dialogue into an [`Intent`].
#[async_trait]
pub trait IntentClassifier: Send + Sync {
    /// Classifies `message` given the formatted conversation `context`.
    ///
    /// Malformed model output is not an error: it degrades to a plain
    /// `message` intent carrying the raw text.
    async fn classify(&self, context: &str, message: &str) -> Result<Intent>;
}

/// Classifier backed by a chat-completions model.
pub struct LlmClassifier {
    client: ChatClient,
    config: ModelConfig,
}

impl LlmClassifier {
    /// Creates a classifier using `client` and `config`.
    pub fn new(client: ChatClient, config: ModelConfig) -> Self {
        Self { client, config }
    }

    /// Model configuration in use.
    pub fn config(&self) -> &ModelConfig {
        &self.config
    }
}

#[async_trait]
impl IntentClassifier for LlmClassifier {
    async fn classify(&self, context: &str, message: &str) -> Result<Intent> {
        let messages = vec![
            ChatMessage::system(system_prompt(Utc::now())),
            ChatMessage::user(user_prompt(context, message)),
        ];

        let response = self.client.chat(&self.config, messages).await?;
        let content = response
            .content()
            .ok_or(ClassificationError::EmptyResponse)?;

        debug!(content_len = content.len(), "Model answered");
        Ok(parse_intent(content))
    }
}

/// Parses model output into an intent.
///
/// Surrounding Markdown code fences are ignored. Anything that is not a
/// JSON intent object becomes a plain reply with the raw text.
pub fn parse_intent(content: &str) -> Intent {
    match serde_json::from_str::<IntentPayload>(strip_code_fence(content)) {
        Ok(payload) => Intent::from(payload),
        Err(e) => {
            warn!(error = %e, "Model output is not a JSON intent, replying with raw text");
            Intent::reply(content)
        }
    }
}

fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}
