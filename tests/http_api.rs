//! HTTP-level tests through the full axum router.
//!
//! Requests go through `tower::ServiceExt::oneshot` against in-memory
//! adapters; no socket is opened.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use secrecy::SecretString;
use serde_json::{json, Value};
use tower::ServiceExt;

use estimatex::adapters::http::{app_router, RoomAppState};
use estimatex::adapters::websocket::{LiveState, RoomChannels};
use estimatex::adapters::{InMemoryEventBus, InMemoryRoomRepository, JwtCredentialService};

struct Api {
    router: Router,
    bus: Arc<InMemoryEventBus>,
}

impl Api {
    fn new() -> Self {
        let bus = Arc::new(InMemoryEventBus::recording());
        let credentials = Arc::new(JwtCredentialService::new(
            &SecretString::new("http-integration-secret".to_string()),
            3600,
        ));
        let router = app_router(
            RoomAppState {
                repository: Arc::new(InMemoryRoomRepository::new()),
                event_publisher: bus.clone(),
                credentials: credentials.clone(),
            },
            LiveState::new(Arc::new(RoomChannels::default()), credentials),
            Duration::from_secs(5),
            &[],
        );
        Self { router, bus }
    }

    async fn call(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<&str>,
    ) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let body = match body {
            Some(json) => {
                request = request.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(request.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn host(&self, name: &str) -> (String, String) {
        let (status, body) = self
            .call(Method::POST, "/rooms", None, Some(&json!({ "name": name }).to_string()))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        (
            body["room_id"].as_str().unwrap().to_string(),
            body["access_token"].as_str().unwrap().to_string(),
        )
    }

    async fn join(&self, room_id: &str, name: &str) -> (StatusCode, Value) {
        self.call(
            Method::POST,
            "/rooms/join",
            None,
            Some(&json!({ "room_id": room_id, "name": name }).to_string()),
        )
        .await
    }
}

#[tokio::test]
async fn health_is_public() {
    let api = Api::new();

    let (status, body) = api.call(Method::GET, "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));
}

#[tokio::test]
async fn full_round_over_http() {
    let api = Api::new();
    let (room_id, alice) = api.host("Alice").await;

    let (status, body) = api.join(&room_id, "Bob").await;
    assert_eq!(status, StatusCode::OK);
    let bob = body["access_token"].as_str().unwrap().to_string();

    let (status, body) = api
        .call(Method::POST, "/votes", Some(&bob), Some(r#"{"vote": "13"}"#))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({}));

    let (status, room) = api.call(Method::GET, "/room", Some(&bob), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(room["id"], room_id.as_str());

    let (status, _) = api.call(Method::POST, "/votes/reveal", Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, participants) = api.call(Method::GET, "/participants", Some(&alice), None).await;
    let bob_row = participants
        .as_array()
        .unwrap()
        .iter()
        .find(|p| p["name"] == "Bob")
        .unwrap()
        .clone();
    assert_eq!(bob_row["latest_vote"], "13");
    assert_eq!(bob_row["is_admin"], false);

    let (status, _) = api.call(Method::POST, "/votes/reset", Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, participants) = api.call(Method::GET, "/participants", Some(&bob), None).await;
    assert!(participants
        .as_array()
        .unwrap()
        .iter()
        .all(|p| p["latest_vote"] == ""));

    assert_eq!(api.bus.event_count(), 4);
}

#[tokio::test]
async fn authenticated_routes_deny_without_credential() {
    let api = Api::new();

    for (method, uri) in [
        (Method::GET, "/room"),
        (Method::GET, "/participants"),
        (Method::POST, "/votes"),
        (Method::POST, "/votes/reveal"),
        (Method::POST, "/votes/reset"),
    ] {
        let (status, body) = api.call(method.clone(), uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{} {}", method, uri);
        assert_eq!(body, Value::Null, "{} {} should have no body", method, uri);
    }

    let (status, _) = api
        .call(Method::GET, "/participants", Some("not.a.jwt"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn non_admin_reveal_is_forbidden() {
    let api = Api::new();
    let (room_id, _) = api.host("Alice").await;
    let (_, body) = api.join(&room_id, "Bob").await;
    let bob = body["access_token"].as_str().unwrap().to_string();
    api.bus.clear();

    let (status, body) = api.call(Method::POST, "/votes/reveal", Some(&bob), None).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");
    assert_eq!(api.bus.event_count(), 0);
}

#[tokio::test]
async fn join_errors_map_to_statuses() {
    let api = Api::new();
    let (room_id, _) = api.host("Alice").await;

    let (status, body) = api.join(&room_id, "Alice").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "PARTICIPANT_ALREADY_EXISTS");

    let (status, body) = api.join("zzzzzz", "Bob").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "ROOM_NOT_FOUND");

    let (status, body) = api.join(&room_id, "   ").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_FAILED");
}

#[tokio::test]
async fn malformed_body_is_bad_request() {
    let api = Api::new();

    for body in ["{not json", r#"{"nom": "Alice"}"#] {
        let (status, value) = api.call(Method::POST, "/rooms", None, Some(body)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(value["message"], "failed to unmarshal body");
    }
}

#[tokio::test]
async fn blank_vote_is_rejected() {
    let api = Api::new();
    let (_, alice) = api.host("Alice").await;

    let (status, body) = api
        .call(Method::POST, "/votes", Some(&alice), Some(r#"{"vote": ""}"#))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_FAILED");
}
