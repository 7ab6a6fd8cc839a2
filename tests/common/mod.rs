//! Common test helpers for integration tests.
//!
//! # Note
//!
//! The `#![allow(dead_code)]` attribute is necessary because Rust compiles each
//! integration test file as a separate crate, and not every file uses every
//! helper.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Method, Request, StatusCode, header};
use futures::future::BoxFuture;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use bugtrackr::api::{AppState, router};
use bugtrackr::config::ServerConfig;
use bugtrackr::domain::{Bug, BugId, NewBug};
use bugtrackr::infrastructure::{BugRepository, InMemoryBugRepository, RepositoryError};

// =============================================================================
// AppState Creation Helpers
// =============================================================================

/// Creates a test `AppState` with an empty in-memory repository.
pub fn create_test_app_state() -> AppState {
    AppState::from_repository(Arc::new(InMemoryBugRepository::new()))
}

/// Creates a router over the given state with the default CORS origins.
pub fn create_test_router(state: AppState) -> Router {
    router(state, &ServerConfig::default().allowed_origins)
}

// =============================================================================
// Failing Repository
// =============================================================================

/// A repository whose every operation fails, for exercising 500 responses.
pub struct FailingBugRepository;

fn connection_lost() -> RepositoryError {
    RepositoryError::DatabaseError("connection to server at 10.0.0.5 lost".to_string())
}

impl BugRepository for FailingBugRepository {
    fn insert(&self, _bug: NewBug) -> BoxFuture<'_, Result<Bug, RepositoryError>> {
        Box::pin(async { Err(connection_lost()) })
    }

    fn find_by_id(&self, _id: BugId) -> BoxFuture<'_, Result<Option<Bug>, RepositoryError>> {
        Box::pin(async { Err(connection_lost()) })
    }

    fn list_newest_first(&self) -> BoxFuture<'_, Result<Vec<Bug>, RepositoryError>> {
        Box::pin(async { Err(connection_lost()) })
    }

    fn update(&self, _bug: Bug) -> BoxFuture<'_, Result<bool, RepositoryError>> {
        Box::pin(async { Err(connection_lost()) })
    }

    fn delete(&self, _id: BugId) -> BoxFuture<'_, Result<bool, RepositoryError>> {
        Box::pin(async { Err(connection_lost()) })
    }
}

// =============================================================================
// Request Helpers
// =============================================================================

/// A decoded response.
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

/// Sends a request through the router and decodes the JSON body.
///
/// An empty response body decodes to `Value::Null`.
pub async fn send(router: &Router, method: Method, uri: &str, body: Option<&str>) -> TestResponse {
    let mut builder = Request::builder().method(method).uri(uri);
    if body.is_some() {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
    }
    let request = builder
        .body(body.map_or_else(Body::empty, |text| Body::from(text.to_string())))
        .unwrap();

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    TestResponse {
        status,
        headers,
        body,
    }
}

/// Creates a bug through the API and returns its response body.
pub async fn create_bug(router: &Router, title: &str, severity: &str) -> Value {
    let payload = serde_json::json!({
        "title": title,
        "description": format!("{title} description"),
        "severity": severity,
    });
    let response = send(router, Method::POST, "/bugs", Some(&payload.to_string())).await;
    assert_eq!(response.status, StatusCode::CREATED);
    response.body
}
