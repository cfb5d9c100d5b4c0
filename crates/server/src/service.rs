use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use scribe_core::{FeedbackError, FeedbackTransport, GenerationError, InputError, Pipeline, Session};
use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;
use uuid::Uuid;

/// Shared handle to one session. The mutex keeps at most one action in
/// flight per session.
pub type SessionHandle = Arc<Mutex<Session>>;

/// Idle time after which a session is discarded unless configured otherwise.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(60 * 60);

struct SessionEntry {
    last_access: Instant,
    handle: SessionHandle,
}

/// In-memory session store.
///
/// Sessions idle for longer than the TTL are evicted, together with any
/// credential they hold. Every lookup refreshes the idle timer.
#[derive(Clone)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<Uuid, SessionEntry>>>,
    ttl: Duration,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::with_ttl(DEFAULT_SESSION_TTL)
    }
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self { sessions: Arc::default(), ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub async fn create(&self) -> Uuid {
        self.evict_expired().await;

        let id = Uuid::new_v4();
        let entry = SessionEntry { last_access: Instant::now(), handle: Arc::new(Mutex::new(Session::new())) };
        self.sessions.write().await.insert(id, entry);
        id
    }

    pub async fn get(&self, id: Uuid) -> Result<SessionHandle, ApiError> {
        let mut sessions = self.sessions.write().await;
        let now = Instant::now();

        match sessions.get_mut(&id) {
            Some(entry) if now.duration_since(entry.last_access) <= self.ttl => {
                entry.last_access = now;
                Ok(entry.handle.clone())
            }
            Some(_) => {
                sessions.remove(&id);
                tracing::debug!(%id, "session expired");
                Err(ApiError::SessionNotFound(id))
            }
            None => Err(ApiError::SessionNotFound(id)),
        }
    }

    pub async fn remove(&self, id: Uuid) -> Result<(), ApiError> {
        self.sessions.write().await.remove(&id).map(|_| ()).ok_or(ApiError::SessionNotFound(id))
    }

    /// Drops every session idle for longer than the TTL. Returns how many were dropped.
    pub async fn evict_expired(&self) -> usize {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| now.duration_since(entry.last_access) <= self.ttl);

        let evicted = before - sessions.len();
        if evicted > 0 {
            tracing::info!(evicted, remaining = sessions.len(), "evicted idle sessions");
        }
        evicted
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionRegistry,
    pub pipeline: Arc<Pipeline>,
    /// `None` when no mail relay is configured.
    pub feedback: Option<Arc<dyn FeedbackTransport>>,
}

impl AppState {
    pub fn new(pipeline: Pipeline, feedback: Option<Arc<dyn FeedbackTransport>>) -> Self {
        Self::with_sessions(SessionRegistry::new(), pipeline, feedback)
    }

    pub fn with_sessions(
        sessions: SessionRegistry,
        pipeline: Pipeline,
        feedback: Option<Arc<dyn FeedbackTransport>>,
    ) -> Self {
        Self { sessions, pipeline: Arc::new(pipeline), feedback }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("session not found: {0}")]
    SessionNotFound(Uuid),

    #[error("no generated text in this session")]
    NoArtifact,

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Feedback(#[from] FeedbackError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<InputError> for ApiError {
    fn from(e: InputError) -> Self {
        ApiError::BadRequest(e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = match &self {
            ApiError::SessionNotFound(_) | ApiError::NoArtifact => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Generation(GenerationError::AuthInvalid) => StatusCode::UNAUTHORIZED,
            ApiError::Generation(GenerationError::ServiceUnavailable(_)) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Generation(GenerationError::Unknown(_)) => StatusCode::BAD_GATEWAY,
            ApiError::Feedback(FeedbackError::NotConfigured) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Feedback(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = match &self {
            ApiError::Generation(e) => serde_json::json!({ "error": self.to_string(), "kind": e.kind() }),
            _ => serde_json::json!({ "error": self.to_string() }),
        };
        (code, Json(body)).into_response()
    }
}
