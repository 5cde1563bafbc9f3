//! End-to-end dispatch tests with in-memory collaborators.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use calendar_agent::{ClassificationError, IntentClassifier};
use calendar_google::{CalendarError, CalendarGateway};
use calendar_models::{
    Action, BatchIntent, CalendarEvent, EventDetails, Intent, SingleIntent, SubIntent,
};
use calendar_orchestrator::{
    NotificationSink, Orchestrator, TransportError, CLASSIFICATION_FAILED_REPLY,
};
use calendar_persistence::ConversationStore;
use chrono::DateTime;
use tempfile::TempDir;

// --- mocks ---------------------------------------------------------------

/// Returns a fixed intent (or failure) and records what it was asked.
struct ScriptedClassifier {
    intent: Option<Intent>,
    calls: Mutex<Vec<(String, String)>>,
}

impl ScriptedClassifier {
    fn returning(intent: Intent) -> Self {
        Self {
            intent: Some(intent),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn failing() -> Self {
        Self {
            intent: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl IntentClassifier for ScriptedClassifier {
    async fn classify(
        &self,
        context: &str,
        message: &str,
    ) -> calendar_agent::Result<Intent> {
        self.calls
            .lock()
            .unwrap()
            .push((context.to_string(), message.to_string()));
        self.intent
            .clone()
            .ok_or_else(|| ClassificationError::Request("connection refused".into()))
    }
}

/// Serves canned events per date and records every call.
#[derive(Default)]
struct FakeCalendar {
    events: HashMap<String, usize>,
    failing_dates: HashSet<String>,
    fail_writes: bool,
    calls: Mutex<Vec<String>>,
}

impl FakeCalendar {
    fn with_events(mut self, date: &str, count: usize) -> Self {
        self.events.insert(date.to_string(), count);
        self
    }

    fn failing_on(mut self, date: &str) -> Self {
        self.failing_dates.insert(date.to_string());
        self
    }

    fn failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn write_result(&self) -> calendar_google::Result<()> {
        if self.fail_writes {
            Err(CalendarError::Api {
                status: 403,
                body: "forbidden".into(),
            })
        } else {
            Ok(())
        }
    }
}

fn event(n: usize) -> CalendarEvent {
    CalendarEvent {
        id: format!("evt{n}"),
        title: format!("Event {n}"),
        description: String::new(),
        start: DateTime::parse_from_rfc3339("2025-08-05T09:00:00Z").unwrap(),
        end: DateTime::parse_from_rfc3339("2025-08-05T10:00:00Z").unwrap(),
        location: String::new(),
    }
}

#[async_trait]
impl CalendarGateway for FakeCalendar {
    async fn get_events(&self, date: &str) -> calendar_google::Result<Vec<CalendarEvent>> {
        self.record(format!("get:{date}"));
        if self.failing_dates.contains(date) {
            return Err(CalendarError::Request("timed out".into()));
        }
        let count = self.events.get(date).copied().unwrap_or(0);
        Ok((0..count).map(event).collect())
    }

    async fn create_event(&self, details: &EventDetails) -> calendar_google::Result<()> {
        self.record(format!("create:{}", details.title));
        self.write_result()
    }

    async fn update_event(
        &self,
        event_id: &str,
        _details: &EventDetails,
    ) -> calendar_google::Result<()> {
        self.record(format!("update:{event_id}"));
        self.write_result()
    }

    async fn delete_event(&self, event_id: &str) -> calendar_google::Result<()> {
        self.record(format!("delete:{event_id}"));
        self.write_result()
    }
}

/// Collects sent messages; optionally fails every send.
#[derive(Default)]
struct RecordingSink {
    fail: bool,
    sent: Mutex<Vec<(i64, String)>>,
}

impl RecordingSink {
    fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    fn sent(&self) -> Vec<(i64, String)> {
        self.sent.lock().unwrap().clone()
    }

    fn only_text(&self) -> String {
        let sent = self.sent();
        assert_eq!(sent.len(), 1, "expected exactly one message, got {sent:?}");
        sent[0].1.clone()
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn send(&self, chat_id: i64, text: &str) -> Result<(), TransportError> {
        self.sent.lock().unwrap().push((chat_id, text.to_string()));
        if self.fail {
            return Err(TransportError::new(chat_id, "chat not found"));
        }
        Ok(())
    }
}

// --- harness -------------------------------------------------------------

const USER: i64 = 42;
const CHAT: i64 = 4242;

struct Harness {
    _dir: TempDir,
    store: Arc<ConversationStore>,
    classifier: Arc<ScriptedClassifier>,
    calendar: Arc<FakeCalendar>,
    sink: Arc<RecordingSink>,
    orchestrator: Orchestrator,
}

fn harness_with(
    classifier: ScriptedClassifier,
    calendar: FakeCalendar,
    sink: RecordingSink,
) -> Harness {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(ConversationStore::open(dir.path()).unwrap());
    let classifier = Arc::new(classifier);
    let calendar = Arc::new(calendar);
    let sink = Arc::new(sink);
    let orchestrator = Orchestrator::new(
        Arc::clone(&store),
        classifier.clone(),
        calendar.clone(),
        sink.clone(),
    );
    Harness {
        _dir: dir,
        store,
        classifier,
        calendar,
        sink,
        orchestrator,
    }
}

fn harness(intent: Intent, calendar: FakeCalendar) -> Harness {
    harness_with(
        ScriptedClassifier::returning(intent),
        calendar,
        RecordingSink::default(),
    )
}

fn single(action: Action, message: &str, event_id: &str, details: EventDetails) -> Intent {
    Intent::Single(SingleIntent {
        action,
        message: message.to_string(),
        event_id: event_id.to_string(),
        details,
    })
}

fn on_date(date: &str) -> EventDetails {
    EventDetails {
        date: date.to_string(),
        ..Default::default()
    }
}

fn get_events_step(date: &str) -> SubIntent {
    SubIntent {
        action: Action::GetEvents,
        details: on_date(date),
    }
}

// --- single actions ------------------------------------------------------

#[tokio::test]
async fn test_get_events_empty_date_defaults_to_today() {
    let h = harness(
        single(Action::GetEvents, "Checking", "", on_date("")),
        FakeCalendar::default(),
    );

    h.orchestrator.handle_message(USER, CHAT, "what's on?").await.unwrap();

    assert_eq!(h.calendar.calls(), vec!["get:today"]);
    assert_eq!(h.sink.sent(), vec![(CHAT, "No events found for today.".to_string())]);
}

#[tokio::test]
async fn test_get_events_truncates_to_twenty() {
    let h = harness(
        single(Action::GetEvents, "Here", "", on_date("2025-08-05")),
        FakeCalendar::default().with_events("2025-08-05", 25),
    );

    h.orchestrator.handle_message(USER, CHAT, "busy day?").await.unwrap();

    let text = h.sink.only_text();
    assert!(text.starts_with("Events for 2025-08-05 (showing first 20 of 25):\n"));
    assert_eq!(text.matches("• Event").count(), 20);
    assert!(text.contains("... and 5 more events."));
}

#[tokio::test]
async fn test_get_events_error_is_rendered() {
    let h = harness(
        single(Action::GetEvents, "", "", on_date("today")),
        FakeCalendar::default().failing_on("today"),
    );

    h.orchestrator.handle_message(USER, CHAT, "today?").await.unwrap();

    assert_eq!(h.sink.only_text(), "Error getting events: request failed: timed out");
}

#[tokio::test]
async fn test_make_event_success_and_failure() {
    let details = EventDetails {
        title: "Dentist".into(),
        date: "2025-08-07".into(),
        time: "14:30".into(),
        ..Default::default()
    };

    let h = harness(
        single(Action::MakeEvent, "Booked", "", details.clone()),
        FakeCalendar::default(),
    );
    h.orchestrator.handle_message(USER, CHAT, "book dentist").await.unwrap();
    assert_eq!(
        h.sink.only_text(),
        "Event 'Dentist' created successfully for 2025-08-07 at 14:30"
    );
    assert_eq!(h.calendar.calls(), vec!["create:Dentist"]);

    let h = harness(
        single(Action::MakeEvent, "Booked", "", details),
        FakeCalendar::default().failing_writes(),
    );
    h.orchestrator.handle_message(USER, CHAT, "book dentist").await.unwrap();
    assert_eq!(
        h.sink.only_text(),
        "Error creating event: Google API error (403): forbidden"
    );
}

#[tokio::test]
async fn test_update_and_delete_without_id_skip_gateway() {
    for (action, verb) in [(Action::UpdateEvent, "update"), (Action::DeleteEvent, "delete")] {
        let h = harness(
            single(action, "Sure", "", on_date("today")),
            FakeCalendar::default(),
        );

        h.orchestrator.handle_message(USER, CHAT, "change it").await.unwrap();

        assert!(h.calendar.calls().is_empty());
        assert_eq!(
            h.sink.only_text(),
            format!(
                "Please specify an event ID to {verb}. Use 'getEvents' first to see available events."
            )
        );
    }
}

#[tokio::test]
async fn test_update_and_delete_with_id() {
    let h = harness(
        single(Action::DeleteEvent, "Deleting", "evt7", EventDetails::default()),
        FakeCalendar::default(),
    );
    h.orchestrator.handle_message(USER, CHAT, "delete it").await.unwrap();
    assert_eq!(h.calendar.calls(), vec!["delete:evt7"]);
    assert_eq!(h.sink.only_text(), "Event deleted successfully.");

    let h = harness(
        single(Action::UpdateEvent, "Moving", "evt7", on_date("tomorrow")),
        FakeCalendar::default().failing_writes(),
    );
    h.orchestrator.handle_message(USER, CHAT, "move it").await.unwrap();
    assert_eq!(h.calendar.calls(), vec!["update:evt7"]);
    assert!(h.sink.only_text().starts_with("Error updating event: "));
}

#[tokio::test]
async fn test_message_none_and_unknown_reply_verbatim() {
    for action in [Action::Message, Action::None, Action::parse("dance")] {
        let h = harness(
            single(action, "It is 10:00 UTC.", "", EventDetails::default()),
            FakeCalendar::default(),
        );

        h.orchestrator.handle_message(USER, CHAT, "what time is it?").await.unwrap();

        assert!(h.calendar.calls().is_empty());
        assert_eq!(h.sink.only_text(), "It is 10:00 UTC.");
    }
}

// --- batches -------------------------------------------------------------

#[tokio::test]
async fn test_batch_with_one_failing_step() {
    let intent = Intent::Batch(BatchIntent {
        tag: String::new(),
        message: "Last week:".into(),
        steps: vec![
            get_events_step("2025-08-04"),
            get_events_step("2025-08-05"),
            get_events_step("2025-08-06"),
        ],
    });
    let h = harness(
        intent,
        FakeCalendar::default()
            .with_events("2025-08-04", 1)
            .failing_on("2025-08-05"),
    );

    h.orchestrator.handle_message(USER, CHAT, "last week?").await.unwrap();

    assert_eq!(
        h.calendar.calls(),
        vec!["get:2025-08-04", "get:2025-08-05", "get:2025-08-06"]
    );
    assert_eq!(
        h.sink.only_text(),
        "Last week:\n\n\
         Events for 2025-08-04:\n• Event 0 (09:00 - 10:00)\n\n\
         Error getting events for 2025-08-05: request failed: timed out\n\
         No events found for 2025-08-06.\n"
    );
}

#[tokio::test]
async fn test_batch_truncates_to_fifteen_and_flags_unknown_steps() {
    let intent = Intent::Batch(BatchIntent {
        tag: String::new(),
        message: "Plan".into(),
        steps: vec![
            get_events_step("2025-08-04"),
            SubIntent {
                action: Action::MakeEvent,
                details: on_date("2025-08-05"),
            },
        ],
    });
    let h = harness(intent, FakeCalendar::default().with_events("2025-08-04", 18));

    h.orchestrator.handle_message(USER, CHAT, "plan").await.unwrap();

    let text = h.sink.only_text();
    assert!(text.contains("Events for 2025-08-04 (showing first 15 of 18):\n"));
    assert!(text.contains("... and 3 more events.\n\n"));
    assert!(text.ends_with("Unknown action: makeEvent\n"));
    assert_eq!(h.calendar.calls(), vec!["get:2025-08-04"]);
}

// --- classification and persistence --------------------------------------

#[tokio::test]
async fn test_classification_failure_sends_apology_only() {
    let h = harness_with(
        ScriptedClassifier::failing(),
        FakeCalendar::default(),
        RecordingSink::default(),
    );

    h.orchestrator.handle_message(USER, CHAT, "hello").await.unwrap();

    assert_eq!(h.sink.only_text(), CLASSIFICATION_FAILED_REPLY);
    assert!(h.calendar.calls().is_empty());
    assert!(h.store.recent(USER, 0).await.is_empty());
}

#[tokio::test]
async fn test_interaction_persisted_and_fed_back_as_context() {
    let h = harness(
        single(Action::GetEvents, "Looking", "", on_date("")),
        FakeCalendar::default(),
    );

    h.orchestrator.handle_message(USER, CHAT, "first").await.unwrap();
    h.orchestrator.handle_message(USER, CHAT, "second").await.unwrap();

    let history = h.store.recent(USER, 0).await;
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].user_message, "first");
    assert_eq!(history[0].ai_response, "Looking");
    assert_eq!(history[0].action, "getEvents");

    let calls = h.classifier.calls();
    assert_eq!(calls[0], (String::new(), "first".to_string()));
    assert_eq!(calls[1], ("User: first\nAI: Looking\n\n".to_string(), "second".to_string()));
}

#[tokio::test]
async fn test_persistence_failure_does_not_block_reply() {
    let dir = TempDir::new().unwrap();
    let blocked = dir.path().join("interactions.json");
    std::fs::create_dir(&blocked).unwrap();

    let store = Arc::new(ConversationStore::with_file(&blocked));
    let sink = Arc::new(RecordingSink::default());
    let orchestrator = Orchestrator::new(
        store,
        Arc::new(ScriptedClassifier::returning(Intent::reply("Hi!"))),
        Arc::new(FakeCalendar::default()),
        sink.clone(),
    );

    orchestrator.handle_message(USER, CHAT, "hello").await.unwrap();
    assert_eq!(sink.only_text(), "Hi!");
}

#[tokio::test]
async fn test_transport_failure_is_returned_after_persisting() {
    let h = harness_with(
        ScriptedClassifier::returning(Intent::reply("Hi!")),
        FakeCalendar::default(),
        RecordingSink::failing(),
    );

    let err = h.orchestrator.handle_message(USER, CHAT, "hello").await.unwrap_err();

    assert_eq!(err.chat_id, CHAT);
    assert_eq!(h.store.recent(USER, 0).await.len(), 1);
}

// --- callbacks, stats and maintenance ------------------------------------

#[tokio::test]
async fn test_quick_view_callbacks() {
    let h = harness(
        Intent::reply("unused"),
        FakeCalendar::default().with_events("today", 1),
    );

    h.orchestrator.handle_callback(CHAT, "calendar_today").await.unwrap();
    h.orchestrator.handle_callback(CHAT, "calendar_tomorrow").await.unwrap();
    h.orchestrator.handle_callback(CHAT, "calendar_next_week").await.unwrap();

    let texts: Vec<String> = h.sink.sent().into_iter().map(|(_, t)| t).collect();
    assert_eq!(
        texts,
        vec![
            "Here are your events for today:\n• Event 0 (09:00 - 10:00)\n".to_string(),
            "No events found for tomorrow.".to_string(),
            "Calendar navigation not implemented yet.".to_string(),
        ]
    );
    assert_eq!(h.calendar.calls(), vec!["get:today", "get:tomorrow"]);
}

#[tokio::test]
async fn test_stats_and_cleanup() {
    let h = harness(
        single(Action::GetEvents, "Looking", "", on_date("today")),
        FakeCalendar::default(),
    );
    h.orchestrator.handle_message(USER, CHAT, "today?").await.unwrap();

    let stats = h.orchestrator.user_stats(USER).await;
    assert_eq!(stats.total_interactions, 1);
    assert_eq!(stats.actions_used.get("getEvents"), Some(&1));

    assert_eq!(h.orchestrator.cleanup_old_interactions(30).await.unwrap(), 0);
    assert_eq!(h.orchestrator.cleanup_old_interactions(0).await.unwrap(), 1);
    assert_eq!(h.orchestrator.cleanup_old_interactions(0).await.unwrap(), 0);
    assert_eq!(h.orchestrator.user_stats(USER).await.total_interactions, 0);
}
