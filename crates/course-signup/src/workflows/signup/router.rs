use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{SessionId, SignupSubmission, StudentPreview};
use super::service::{SignupError, SignupService};
use super::session::{SessionStore, SignupNotifier, ADDED_MESSAGE};

/// Header carrying the opaque session identifier. Cookie management belongs
/// to the form collaborator; this surface only scopes storage by it.
pub const SESSION_HEADER: &str = "x-session-id";

/// Router builder exposing the catalog option lists and the signup workflow.
pub fn signup_router<S, N>(service: Arc<SignupService<S, N>>) -> Router
where
    S: SessionStore + 'static,
    N: SignupNotifier + 'static,
{
    Router::new()
        .route("/api/v1/catalog/subjects", get(subjects_handler::<S, N>))
        .route("/api/v1/catalog/topics", get(topics_handler::<S, N>))
        .route("/api/v1/catalog/timeslots", get(timeslots_handler::<S, N>))
        .route(
            "/api/v1/signup",
            get(preview_handler::<S, N>).delete(delete_handler::<S, N>),
        )
        .route("/api/v1/signup/courses", post(submit_handler::<S, N>))
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct TopicsQuery {
    #[serde(default)]
    pub(crate) subject: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TimeslotsQuery {
    #[serde(default)]
    pub(crate) subject: String,
    #[serde(default)]
    pub(crate) topic: String,
}

fn session_from(headers: &HeaderMap) -> Option<SessionId> {
    headers
        .get(SESSION_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(|value| SessionId(value.to_string()))
}

fn missing_session() -> Response {
    let payload = json!({ "error": format!("the {SESSION_HEADER} header is required") });
    (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response()
}

pub(crate) async fn subjects_handler<S, N>(
    State(service): State<Arc<SignupService<S, N>>>,
) -> Response
where
    S: SessionStore + 'static,
    N: SignupNotifier + 'static,
{
    (StatusCode::OK, axum::Json(service.subjects())).into_response()
}

pub(crate) async fn topics_handler<S, N>(
    State(service): State<Arc<SignupService<S, N>>>,
    Query(query): Query<TopicsQuery>,
) -> Response
where
    S: SessionStore + 'static,
    N: SignupNotifier + 'static,
{
    (StatusCode::OK, axum::Json(service.topics(&query.subject))).into_response()
}

pub(crate) async fn timeslots_handler<S, N>(
    State(service): State<Arc<SignupService<S, N>>>,
    Query(query): Query<TimeslotsQuery>,
) -> Response
where
    S: SessionStore + 'static,
    N: SignupNotifier + 'static,
{
    (
        StatusCode::OK,
        axum::Json(service.timeslots(&query.subject, &query.topic)),
    )
        .into_response()
}

pub(crate) async fn submit_handler<S, N>(
    State(service): State<Arc<SignupService<S, N>>>,
    headers: HeaderMap,
    axum::Json(submission): axum::Json<SignupSubmission>,
) -> Response
where
    S: SessionStore + 'static,
    N: SignupNotifier + 'static,
{
    let Some(session) = session_from(&headers) else {
        return missing_session();
    };

    match service.submit(&session, submission) {
        Ok(record) => {
            let payload = json!({
                "message": ADDED_MESSAGE,
                "student": StudentPreview::from(&record),
            });
            (StatusCode::CREATED, axum::Json(payload)).into_response()
        }
        Err(SignupError::Rejected(rejection)) => {
            let errors: Vec<serde_json::Value> = rejection
                .errors
                .iter()
                .map(|error| {
                    json!({
                        "field": error.field().key(),
                        "message": error.to_string(),
                    })
                })
                .collect();
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                axum::Json(json!({ "errors": errors })),
            )
                .into_response()
        }
        Err(other) => {
            let payload = json!({ "error": other.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn preview_handler<S, N>(
    State(service): State<Arc<SignupService<S, N>>>,
    headers: HeaderMap,
) -> Response
where
    S: SessionStore + 'static,
    N: SignupNotifier + 'static,
{
    let Some(session) = session_from(&headers) else {
        return missing_session();
    };

    match service.preview(&session) {
        Ok(student) => {
            (StatusCode::OK, axum::Json(json!({ "student": student }))).into_response()
        }
        Err(other) => {
            let payload = json!({ "error": other.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn delete_handler<S, N>(
    State(service): State<Arc<SignupService<S, N>>>,
    headers: HeaderMap,
) -> Response
where
    S: SessionStore + 'static,
    N: SignupNotifier + 'static,
{
    let Some(session) = session_from(&headers) else {
        return missing_session();
    };

    match service.delete(&session) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(other) => {
            let payload = json!({ "error": other.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CourseCatalog;
    use crate::workflows::signup::domain::StudentRecord;
    use crate::workflows::signup::session::{NotifyError, SessionError, SignupNotice};
    use axum::body::to_bytes;
    use std::collections::HashMap;
    use std::sync::Mutex;

    const CATALOG: &str = r#"{
        "Mathematics": {
            "Algebra": { "timeslot": ["2024-06-03 09:00", "2024-06-10 09:00"] }
        }
    }"#;

    #[derive(Default)]
    struct MemorySessions {
        records: Mutex<HashMap<SessionId, StudentRecord>>,
    }

    impl SessionStore for MemorySessions {
        fn get(&self, session: &SessionId) -> Result<Option<StudentRecord>, SessionError> {
            Ok(self.records.lock().expect("lock").get(session).cloned())
        }

        fn set(&self, session: &SessionId, record: StudentRecord) -> Result<(), SessionError> {
            self.records
                .lock()
                .expect("lock")
                .insert(session.clone(), record);
            Ok(())
        }

        fn remove(&self, session: &SessionId) -> Result<(), SessionError> {
            self.records.lock().expect("lock").remove(session);
            Ok(())
        }
    }

    #[derive(Default)]
    struct MemoryNotices {
        notices: Mutex<Vec<SignupNotice>>,
    }

    impl SignupNotifier for MemoryNotices {
        fn publish(&self, notice: SignupNotice) -> Result<(), NotifyError> {
            self.notices.lock().expect("lock").push(notice);
            Ok(())
        }
    }

    fn service() -> Arc<SignupService<MemorySessions, MemoryNotices>> {
        let catalog = Arc::new(CourseCatalog::from_json(CATALOG).expect("catalog parses"));
        Arc::new(SignupService::new(
            catalog,
            Arc::new(MemorySessions::default()),
            Arc::new(MemoryNotices::default()),
        ))
    }

    fn submission() -> SignupSubmission {
        SignupSubmission {
            username: "ab12".to_string(),
            email: "a@b.com".to_string(),
            student_id: "42".to_string(),
            course_subject: "Mathematics".to_string(),
            course_topic: "Algebra".to_string(),
            course_timeslot: "2024-06-03 09:00".to_string(),
        }
    }

    fn session_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(SESSION_HEADER, "sess-1".parse().expect("header value"));
        headers
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body reads");
        serde_json::from_slice(&bytes).expect("body is JSON")
    }

    #[tokio::test]
    async fn topics_endpoint_is_permissive_for_unknown_subjects() {
        let response = topics_handler(
            State(service()),
            Query(TopicsQuery {
                subject: "Astrology".to_string(),
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body[0]["label"], "- Select -");
        assert_eq!(body.as_array().expect("array").len(), 1);
    }

    #[tokio::test]
    async fn submit_without_session_header_is_rejected() {
        let response = submit_handler(
            State(service()),
            HeaderMap::new(),
            axum::Json(submission()),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn submit_commits_and_returns_the_preview() {
        let response =
            submit_handler(State(service()), session_headers(), axum::Json(submission())).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        assert_eq!(body["message"], ADDED_MESSAGE);
        assert_eq!(body["student"]["courses"][0]["topic"], "Algebra");
    }

    #[tokio::test]
    async fn rejected_submission_lists_field_errors() {
        let mut bad = submission();
        bad.username = "ab 12".to_string();
        let response = submit_handler(State(service()), session_headers(), axum::Json(bad)).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = body_json(response).await;
        assert_eq!(body["errors"][0]["field"], "username");
    }

    #[tokio::test]
    async fn preview_is_null_for_fresh_sessions() {
        let response = preview_handler(State(service()), session_headers()).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert!(body["student"].is_null());
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let service = service();
        let response = delete_handler(State(service.clone()), session_headers()).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        let response = delete_handler(State(service), session_headers()).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }
}
