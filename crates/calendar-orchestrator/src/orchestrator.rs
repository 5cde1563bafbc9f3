//! Message orchestration and action dispatch.

use std::sync::Arc;

use calendar_agent::IntentClassifier;
use calendar_google::CalendarGateway;
use calendar_models::{Action, BatchIntent, Intent, SingleIntent};
use calendar_persistence::{ConversationStore, PersistenceError, UserStats};
use tracing::{debug, error, info, warn};

use crate::render;
use crate::sink::{NotificationSink, TransportError};

/// Interactions fed back to the classifier as context.
pub const CONTEXT_WINDOW: i64 = 10;

/// Reply sent when the classifier fails.
pub const CLASSIFICATION_FAILED_REPLY: &str =
    "Sorry, I encountered an error processing your request. Please try again.";

/// Callback data of the "today" quick-view button.
pub const CALLBACK_TODAY: &str = "calendar_today";

/// Callback data of the "tomorrow" quick-view button.
pub const CALLBACK_TOMORROW: &str = "calendar_tomorrow";

const DEFAULT_DATE: &str = "today";

/// Drives a message through classification, calendar actions and delivery.
///
/// Holds no per-call state, so one instance is shared by every update
/// handler.
pub struct Orchestrator {
    store: Arc<ConversationStore>,
    classifier: Arc<dyn IntentClassifier>,
    calendar: Arc<dyn CalendarGateway>,
    sink: Arc<dyn NotificationSink>,
}

impl Orchestrator {
    /// Wires the orchestrator to its collaborators.
    pub fn new(
        store: Arc<ConversationStore>,
        classifier: Arc<dyn IntentClassifier>,
        calendar: Arc<dyn CalendarGateway>,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            store,
            classifier,
            calendar,
            sink,
        }
    }

    /// Conversation store in use.
    pub fn store(&self) -> &Arc<ConversationStore> {
        &self.store
    }

    /// Handles one inbound text message.
    ///
    /// Only a delivery failure is returned; classification, calendar and
    /// persistence failures are reported to the user or logged.
    pub async fn handle_message(
        &self,
        user_id: i64,
        chat_id: i64,
        text: &str,
    ) -> Result<(), TransportError> {
        info!(user_id, chat_id, "Processing message");

        let context = self.store.context(user_id, CONTEXT_WINDOW).await;
        let intent = match self.classifier.classify(&context, text).await {
            Ok(intent) => intent,
            Err(e) => {
                error!(user_id, error = %e, "Intent classification failed");
                return self.sink.send(chat_id, CLASSIFICATION_FAILED_REPLY).await;
            }
        };
        debug!(user_id, action = %intent.action_tag(), "Classified message");

        if let Err(e) = self
            .store
            .append(user_id, text, intent.message(), intent.action_tag())
            .await
        {
            warn!(user_id, error = %e, "Failed to persist interaction");
        }

        let response = self.execute(&intent).await;
        self.sink.send(chat_id, &response).await.inspect_err(|e| {
            error!(user_id, error = %e, "Failed to send response");
        })
    }

    /// Executes an intent and returns the text to show the user.
    pub async fn execute(&self, intent: &Intent) -> String {
        match intent {
            Intent::Batch(batch) => self.execute_batch(batch).await,
            Intent::Single(single) => self.execute_single(single).await,
        }
    }

    async fn execute_batch(&self, batch: &BatchIntent) -> String {
        info!(steps = batch.steps.len(), "Executing batch intent");

        let mut response = format!("{}\n\n", batch.message);
        for (i, step) in batch.steps.iter().enumerate() {
            debug!(step = i + 1, action = %step.action, "Executing batch step");
            match step.action {
                Action::GetEvents => {
                    let date = date_or_today(&step.details.date);
                    let result = self.calendar.get_events(date).await;
                    if let Err(e) = &result {
                        warn!(date, error = %e, "Batch step failed");
                    }
                    response.push_str(&render::batch_block(date, &result));
                }
                ref other => response.push_str(&format!("Unknown action: {other}\n")),
            }
        }
        response
    }

    async fn execute_single(&self, intent: &SingleIntent) -> String {
        let details = &intent.details;
        match &intent.action {
            Action::GetEvents => {
                let date = date_or_today(&details.date);
                let result = self.calendar.get_events(date).await;
                if let Err(e) = &result {
                    warn!(date, error = %e, "Failed to get events");
                }
                render::day_listing(date, &result)
            }
            Action::MakeEvent => match self.calendar.create_event(details).await {
                Ok(()) => format!(
                    "Event '{}' created successfully for {} at {}",
                    details.title, details.date, details.time
                ),
                Err(e) => {
                    warn!(error = %e, "Failed to create event");
                    format!("Error creating event: {e}")
                }
            },
            Action::UpdateEvent => {
                if intent.event_id.is_empty() {
                    return missing_event_id("update");
                }
                match self.calendar.update_event(&intent.event_id, details).await {
                    Ok(()) => "Event updated successfully.".to_string(),
                    Err(e) => {
                        warn!(event_id = %intent.event_id, error = %e, "Failed to update event");
                        format!("Error updating event: {e}")
                    }
                }
            }
            Action::DeleteEvent => {
                if intent.event_id.is_empty() {
                    return missing_event_id("delete");
                }
                match self.calendar.delete_event(&intent.event_id).await {
                    Ok(()) => "Event deleted successfully.".to_string(),
                    Err(e) => {
                        warn!(event_id = %intent.event_id, error = %e, "Failed to delete event");
                        format!("Error deleting event: {e}")
                    }
                }
            }
            Action::Message | Action::None | Action::Other(_) => intent.message.clone(),
        }
    }

    /// Handles a press on one of the quick-view buttons.
    pub async fn handle_callback(&self, chat_id: i64, data: &str) -> Result<(), TransportError> {
        debug!(chat_id, data, "Handling callback");

        let response = match data {
            CALLBACK_TODAY | CALLBACK_TOMORROW => {
                let day = if data == CALLBACK_TODAY { "today" } else { "tomorrow" };
                let result = self.calendar.get_events(day).await;
                render::quick_view(day, &result)
            }
            _ => "Calendar navigation not implemented yet.".to_string(),
        };

        self.sink.send(chat_id, &response).await
    }

    /// Interaction statistics for a user.
    pub async fn user_stats(&self, user_id: i64) -> UserStats {
        self.store.stats(user_id).await
    }

    /// Drops interactions older than `days` days. Returns how many were removed.
    pub async fn cleanup_old_interactions(&self, days: u32) -> Result<usize, PersistenceError> {
        self.store.cleanup(chrono::Duration::days(i64::from(days))).await
    }
}

fn date_or_today(date: &str) -> &str {
    if date.trim().is_empty() {
        DEFAULT_DATE
    } else {
        date
    }
}

fn missing_event_id(verb: &str) -> String {
    format!("Please specify an event ID to {verb}. Use 'getEvents' first to see available events.")
}
