//! HTTP handlers for the bug endpoints.
//!
//! Handlers decode the raw body, delegate to [`BugService`], and map the
//! result onto a status code and a JSON body.

use std::sync::Arc;

use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
};

use super::dto::{BugResponse, MessageResponse, decode_payload};
use super::error::ApiErrorResponse;
use crate::domain::BugId;
use crate::infrastructure::BugRepository;
use crate::service::BugService;

// =============================================================================
// Application State
// =============================================================================

/// Application state shared across handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Bug operations over the configured repository.
    pub bug_service: BugService,
}

impl AppState {
    /// Creates application state over the given repository.
    #[must_use]
    pub const fn from_repository(repository: Arc<dyn BugRepository>) -> Self {
        Self {
            bug_service: BugService::new(repository),
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parses a bug ID path segment.
///
/// Anything that is not an `i64` cannot name a stored bug, so it is answered
/// with the same 404 body as an unknown ID.
fn parse_bug_id(raw: &str) -> Result<BugId, ApiErrorResponse> {
    raw.parse::<i64>()
        .map(BugId::new)
        .map_err(|_| ApiErrorResponse::not_found(format!("Bug {raw} not found")))
}

// =============================================================================
// Handlers
// =============================================================================

/// Health check.
///
/// GET /
pub async fn health_check() -> Json<MessageResponse> {
    Json(MessageResponse::new("BugTrackr API is running!"))
}

/// Creates a new bug.
///
/// POST /bugs
///
/// # Errors
///
/// - 400 if the body is not JSON, a required key is missing, or a value is
///   not a string
/// - 500 if the store fails
pub async fn create_bug(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<BugResponse>), ApiErrorResponse> {
    let payload = decode_payload(&body)?;
    let bug = state.bug_service.create(payload.as_ref()).await?;

    Ok((StatusCode::CREATED, Json(BugResponse::from(&bug))))
}

/// Lists all bugs, most recently created first.
///
/// GET /bugs
///
/// # Errors
///
/// Returns 500 if the store fails.
pub async fn list_bugs(
    State(state): State<AppState>,
) -> Result<Json<Vec<BugResponse>>, ApiErrorResponse> {
    let bugs = state.bug_service.list().await?;

    Ok(Json(bugs.iter().map(BugResponse::from).collect()))
}

/// Returns a single bug.
///
/// GET /bugs/{id}
///
/// # Errors
///
/// - 404 if no bug has this ID
/// - 500 if the store fails
pub async fn get_bug(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<BugResponse>, ApiErrorResponse> {
    let bug = state.bug_service.get(parse_bug_id(&id)?).await?;

    Ok(Json(BugResponse::from(&bug)))
}

/// Applies a partial update to a bug.
///
/// PUT /bugs/{id}
///
/// The bug is looked up before a malformed body is reported, so an unknown
/// ID always answers 404.
///
/// # Errors
///
/// - 404 if no bug has this ID
/// - 400 if the body is not JSON, carries no data, or has an invalid status
/// - 500 if the store fails
pub async fn update_bug(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<BugResponse>, ApiErrorResponse> {
    let id = parse_bug_id(&id)?;
    let payload = match decode_payload(&body) {
        Ok(payload) => payload,
        Err(error) => {
            state.bug_service.get(id).await?;
            return Err(error);
        }
    };
    let bug = state.bug_service.update(id, payload.as_ref()).await?;

    Ok(Json(BugResponse::from(&bug)))
}

/// Deletes a bug.
///
/// DELETE /bugs/{id}
///
/// # Errors
///
/// - 404 if no bug has this ID
/// - 500 if the store fails
pub async fn delete_bug(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiErrorResponse> {
    state.bug_service.delete(parse_bug_id(&id)?).await?;

    Ok(Json(MessageResponse::new("Bug deleted successfully")))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::InMemoryBugRepository;
    use rstest::{fixture, rstest};

    #[fixture]
    fn state() -> AppState {
        AppState::from_repository(Arc::new(InMemoryBugRepository::new()))
    }

    fn body(json: &str) -> Bytes {
        Bytes::from(json.to_string())
    }

    #[rstest]
    #[tokio::test]
    async fn test_health_check() {
        let Json(response) = health_check().await;
        assert_eq!(response.message, "BugTrackr API is running!");
    }

    #[rstest]
    #[tokio::test]
    async fn test_create_then_get(state: AppState) {
        let (status, Json(created)) = create_bug(
            State(state.clone()),
            body(r#"{"title": "t", "description": "d", "severity": "Low"}"#),
        )
        .await
        .unwrap();

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created.status, "Open");

        let Json(fetched) = get_bug(State(state), Path(created.id.to_string()))
            .await
            .unwrap();
        assert_eq!(fetched, created);
    }

    #[rstest]
    #[tokio::test]
    async fn test_create_without_body(state: AppState) {
        let error = create_bug(State(state), Bytes::new()).await.unwrap_err();

        assert_eq!(error.status, StatusCode::BAD_REQUEST);
        assert_eq!(
            error.error.message,
            "Missing required fields: title, description, severity"
        );
    }

    #[rstest]
    #[tokio::test]
    async fn test_update_missing_bug_with_bad_body(state: AppState) {
        let error = update_bug(
            State(state),
            Path("42".to_string()),
            body(r#"{"status": "Bogus"}"#),
        )
        .await
        .unwrap_err();

        assert_eq!(error.status, StatusCode::NOT_FOUND);
    }

    #[rstest]
    #[tokio::test]
    async fn test_update_missing_bug_with_malformed_body(state: AppState) {
        let error = update_bug(State(state), Path("42".to_string()), body("{not json"))
            .await
            .unwrap_err();

        assert_eq!(error.status, StatusCode::NOT_FOUND);
        assert_eq!(error.error.message, "Bug 42 not found");
    }

    #[rstest]
    #[tokio::test]
    async fn test_update_existing_bug_with_malformed_body(state: AppState) {
        create_bug(
            State(state.clone()),
            body(r#"{"title": "t", "description": "d", "severity": "Low"}"#),
        )
        .await
        .unwrap();

        let error = update_bug(State(state), Path("1".to_string()), body("{not json"))
            .await
            .unwrap_err();

        assert_eq!(error.status, StatusCode::BAD_REQUEST);
        assert_eq!(error.error.code, "VALIDATION_ERROR");
    }

    #[rstest]
    #[case("abc")]
    #[case("1.5")]
    #[case("99999999999999999999")]
    fn test_parse_bug_id_rejects_non_integers(#[case] raw: &str) {
        let error = parse_bug_id(raw).unwrap_err();

        assert_eq!(error.status, StatusCode::NOT_FOUND);
        assert_eq!(error.error.code, "NOT_FOUND");
        assert_eq!(error.error.message, format!("Bug {raw} not found"));
    }

    #[rstest]
    #[tokio::test]
    async fn test_delete_missing_bug(state: AppState) {
        let error = delete_bug(State(state), Path("1".to_string()))
            .await
            .unwrap_err();
        assert_eq!(error.status, StatusCode::NOT_FOUND);
    }
}
