//! Gateway tests against a local mock of the Calendar and OAuth2 APIs.

use calendar_google::{CalendarError, CalendarGateway, Credentials, GoogleCalendar, TokenProvider};
use calendar_models::EventDetails;
use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const EVENTS_PATH: &str = "/calendars/primary/events";

fn gateway(server: &MockServer) -> GoogleCalendar {
    GoogleCalendar::new(TokenProvider::fixed("test-token"), "primary")
        .unwrap()
        .with_base_url(&server.uri())
        .unwrap()
}

fn details() -> EventDetails {
    EventDetails {
        title: "Dentist".into(),
        date: "2025-08-07".into(),
        time: "14:30".into(),
        description: String::new(),
        location: "Main St".into(),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_get_events_for_explicit_date() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(EVENTS_PATH))
        .and(header("authorization", "Bearer test-token"))
        .and(query_param("timeMin", "2025-08-05T00:00:00Z"))
        .and(query_param("timeMax", "2025-08-06T00:00:00Z"))
        .and(query_param("orderBy", "startTime"))
        .and(query_param("singleEvents", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "kind": "calendar#events",
            "items": [
                {
                    "id": "evt1",
                    "summary": "Standup",
                    "start": {"dateTime": "2025-08-05T09:00:00Z"},
                    "end": {"dateTime": "2025-08-05T09:15:00Z"}
                },
                {
                    "id": "evt2",
                    "summary": "Lunch",
                    "location": "Cafe",
                    "start": {"dateTime": "2025-08-05T12:00:00Z"},
                    "end": {"dateTime": "2025-08-05T13:00:00Z"}
                }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let events = gateway(&server).get_events("2025-08-05").await.unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].id, "evt1");
    assert_eq!(events[1].location, "Cafe");
    assert_eq!(events[1].time_span(), "12:00 - 13:00");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_get_events_without_items() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(EVENTS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"kind": "calendar#events"})))
        .mount(&server)
        .await;

    let events = gateway(&server).get_events("today").await.unwrap();
    assert!(events.is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_invalid_date_never_reaches_api() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = gateway(&server).get_events("next week").await.unwrap_err();
    assert!(matches!(err, CalendarError::InvalidDateFormat(_)));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_api_error_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(EVENTS_PATH))
        .respond_with(ResponseTemplate::new(404).set_body_string("Not Found"))
        .mount(&server)
        .await;

    let err = gateway(&server).get_events("2025-08-05").await.unwrap_err();
    match err {
        CalendarError::Api { status, body } => {
            assert_eq!(status, 404);
            assert_eq!(body, "Not Found");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_create_event_posts_one_hour_event() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(EVENTS_PATH))
        .and(body_string_contains("\"dateTime\":\"2025-08-07T14:30:00Z\""))
        .and(body_string_contains("\"dateTime\":\"2025-08-07T15:30:00Z\""))
        .and(body_string_contains("\"summary\":\"Dentist\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "new1"})))
        .expect(1)
        .mount(&server)
        .await;

    gateway(&server).create_event(&details()).await.unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_update_and_delete_target_event_id() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path(format!("{EVENTS_PATH}/evt42")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "evt42"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path(format!("{EVENTS_PATH}/evt42")))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let calendar = gateway(&server);
    calendar.update_event("evt42", &details()).await.unwrap();
    calendar.delete_event("evt42").await.unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_delete_missing_event() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(410).set_body_string("Resource has been deleted"))
        .mount(&server)
        .await;

    let err = gateway(&server).delete_event("gone").await.unwrap_err();
    assert!(matches!(err, CalendarError::Api { status: 410, .. }));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_refresh_token_grant_is_cached() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains("refresh_token=stored-refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "ya29.fresh",
            "expires_in": 3599,
            "token_type": "Bearer"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let credentials = Credentials::from_json(
        &json!({
            "type": "authorized_user",
            "client_id": "client",
            "client_secret": "secret",
            "refresh_token": "stored-refresh",
            "token_uri": format!("{}/token", server.uri())
        })
        .to_string(),
    )
    .unwrap();

    let provider = TokenProvider::new(credentials, reqwest::Client::new());
    assert_eq!(provider.access_token().await.unwrap(), "ya29.fresh");
    assert_eq!(provider.access_token().await.unwrap(), "ya29.fresh");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_service_account_jwt_grant() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("jwt-bearer"))
        .and(body_string_contains("assertion="))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "ya29.service",
            "expires_in": 3600
        })))
        .expect(1)
        .mount(&server)
        .await;

    let credentials = Credentials::from_json(
        &json!({
            "type": "service_account",
            "client_email": "bot@assistant.iam.gserviceaccount.com",
            "private_key": include_str!("fixtures/test_key.pem"),
            "token_uri": format!("{}/token", server.uri())
        })
        .to_string(),
    )
    .unwrap();

    let provider = TokenProvider::new(credentials, reqwest::Client::new());
    assert_eq!(provider.access_token().await.unwrap(), "ya29.service");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_token_endpoint_rejection() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({"error": "invalid_grant"})))
        .mount(&server)
        .await;

    let credentials = Credentials::AuthorizedUser {
        client_id: "client".into(),
        client_secret: "secret".into(),
        refresh_token: "revoked".into(),
        token_uri: format!("{}/token", server.uri()),
    };

    let provider = TokenProvider::new(credentials, reqwest::Client::new());
    let err = provider.access_token().await.unwrap_err();
    assert!(matches!(err, CalendarError::Auth(ref msg) if msg.contains("invalid_grant")));
}
