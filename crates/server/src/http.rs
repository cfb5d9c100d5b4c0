use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use scribe_core::{
    Credential, CredentialStatus, FeedbackCategory, FeedbackError, FeedbackSubmission, GeneratedArtifact,
    GenerationDirective, View,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::service::{ApiError, AppState};

/// Health endpoint path.
pub const HEALTH_PATH: &str = "/health";
/// Usage text endpoint path.
pub const HELP_PATH: &str = "/help";
pub const SESSIONS_PATH: &str = "/sessions";
pub const SESSION_PATH: &str = "/sessions/{id}";
pub const SESSION_VIEW_PATH: &str = "/sessions/{id}/view";
pub const SESSION_CREDENTIAL_PATH: &str = "/sessions/{id}/credential";
pub const SESSION_LINKS_PATH: &str = "/sessions/{id}/links";
pub const SESSION_GENERATE_PATH: &str = "/sessions/{id}/generate";
pub const SESSION_ARTIFACT_PATH: &str = "/sessions/{id}/artifact";
pub const FEEDBACK_PATH: &str = "/feedback";

pub const HELP_TEXT: &str = "\
## Welcome to the SEO Content Generator!

This tool creates SEO-optimized text from your keywords, locations and website sources.

### 1. Setting up
- Create a session and store your OpenAI API key with `PUT /sessions/{id}/credential`.
- The key is checked once. An invalid key blocks generation until a valid one is stored.

### 2. Entering your inputs
- **Keywords:** comma-separated SEO keywords.
- **Locations:** comma-separated target locations.
- **Text length:** minimum and maximum word count (100 to 5000).
- **Target website:** the page the text is written for.
- **Reference websites:** one URL per line, used to match tone and wording.
- Use `POST /sessions/{id}/links` to collect links from a site and merge them into the references.

### 3. Structuring your text
- Choose the number of subheadings (0 to 10) and paragraphs per subheading (1 to 10),
  or let the model decide the structure.
- Optionally include a \"Contact us\" section.

### 4. Generating and copying the text
- `POST /sessions/{id}/generate` returns the text with Markdown and as plain text,
  with word and character counts for both.

### 5. FAQ and support
- Need an API key? See https://platform.openai.com/api-keys
- Found a bug or have an idea? Send it with `POST /feedback`.
";

pub fn health_routes() -> Router<AppState> {
    Router::new().route(HEALTH_PATH, get(health)).route(HELP_PATH, get(help))
}

pub fn session_routes() -> Router<AppState> {
    Router::new()
        .route(SESSIONS_PATH, post(create_session))
        .route(SESSION_PATH, get(get_session).delete(delete_session))
        .route(SESSION_VIEW_PATH, put(set_view))
        .route(SESSION_CREDENTIAL_PATH, put(set_credential))
        .route(SESSION_LINKS_PATH, post(discover_links))
        .route(SESSION_GENERATE_PATH, post(generate))
        .route(SESSION_ARTIFACT_PATH, get(get_artifact))
}

pub fn feedback_routes() -> Router<AppState> {
    Router::new().route(FEEDBACK_PATH, post(send_feedback))
}

/// All routes with `state` attached.
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(health_routes())
        .merge(session_routes())
        .merge(feedback_routes())
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    StatusCode::OK
}

async fn help() -> impl IntoResponse {
    HELP_TEXT
}

#[derive(Debug, Serialize)]
struct CreatedSession {
    id: Uuid,
}

#[derive(Debug, Serialize)]
struct SessionSnapshot<'a> {
    id: Uuid,
    view: View,
    credential_status: CredentialStatus,
    links: Vec<&'a str>,
    artifact: Option<&'a GeneratedArtifact>,
}

async fn create_session(State(st): State<AppState>) -> impl IntoResponse {
    let id = st.sessions.create().await;
    tracing::info!(%id, "session created");
    (StatusCode::CREATED, Json(CreatedSession { id }))
}

async fn get_session(State(st): State<AppState>, Path(id): Path<Uuid>) -> Result<impl IntoResponse, ApiError> {
    let handle = st.sessions.get(id).await?;
    let session = handle.lock().await;

    let snapshot = SessionSnapshot {
        id,
        view: session.view(),
        credential_status: session.credential_status(),
        links: session.links().iter().collect(),
        artifact: session.artifact(),
    };
    Ok(Json(serde_json::to_value(snapshot).map_err(|e| ApiError::Internal(e.to_string()))?))
}

async fn delete_session(State(st): State<AppState>, Path(id): Path<Uuid>) -> Result<StatusCode, ApiError> {
    st.sessions.remove(id).await?;
    tracing::info!(%id, "session discarded");
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
struct ViewRequest {
    view: View,
}

async fn set_view(
    State(st): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ViewRequest>,
) -> Result<StatusCode, ApiError> {
    let handle = st.sessions.get(id).await?;
    handle.lock().await.show(req.view);
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
struct CredentialRequest {
    api_key: String,
}

#[derive(Debug, Serialize)]
struct CredentialResponse {
    credential_status: CredentialStatus,
}

async fn set_credential(
    State(st): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<CredentialRequest>,
) -> Result<Json<CredentialResponse>, ApiError> {
    let handle = st.sessions.get(id).await?;
    let mut session = handle.lock().await;

    session.set_credential(Credential::new(req.api_key), &st.pipeline).await?;
    Ok(Json(CredentialResponse { credential_status: session.credential_status() }))
}

#[derive(Debug, Deserialize)]
struct LinksRequest {
    url: String,
}

#[derive(Debug, Serialize)]
struct LinksResponse {
    /// Links found by this request.
    links: Vec<String>,
    /// All links cached in the session.
    cached: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    notice: Option<String>,
}

/// Crawl failures are reported as a notice with an empty result.
async fn discover_links(
    State(st): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<LinksRequest>,
) -> Result<Json<LinksResponse>, ApiError> {
    let handle = st.sessions.get(id).await?;
    let mut session = handle.lock().await;

    let (links, notice) = match session.discover(&req.url, &st.pipeline).await {
        Ok(found) => (found.into_vec(), None),
        Err(e) => (Vec::new(), Some(format!("Could not fetch links: {}", e))),
    };

    Ok(Json(LinksResponse { links, cached: session.links().len(), notice }))
}

fn default_min_words() -> u32 {
    300
}

fn default_max_words() -> u32 {
    800
}

fn default_subheadings() -> u32 {
    2
}

fn default_paragraphs() -> u32 {
    2
}

/// Form fields of a generation request, in their raw text form.
#[derive(Debug, Deserialize)]
struct GenerateRequest {
    /// Comma-separated.
    #[serde(default)]
    keywords: String,
    /// Comma-separated.
    #[serde(default)]
    locations: String,
    #[serde(default)]
    target_page: String,
    /// One per line.
    #[serde(default)]
    reference_links: String,
    #[serde(default = "default_min_words")]
    min_words: u32,
    #[serde(default = "default_max_words")]
    max_words: u32,
    #[serde(default = "default_subheadings")]
    subheadings: u32,
    #[serde(default = "default_paragraphs")]
    paragraphs_per_subheading: u32,
    #[serde(default)]
    auto_structure: bool,
    #[serde(default)]
    include_contact: bool,
    /// Append the links discovered in this session to the references.
    #[serde(default)]
    use_discovered_links: bool,
}

async fn generate(
    State(st): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<GenerateRequest>,
) -> Result<Json<GeneratedArtifact>, ApiError> {
    let handle = st.sessions.get(id).await?;
    let mut session = handle.lock().await;

    let mut builder = GenerationDirective::builder()
        .keywords_input(&req.keywords)
        .locations_input(&req.locations)
        .target_page(req.target_page)
        .reference_links_input(&req.reference_links)
        .word_bounds(req.min_words, req.max_words)
        .include_contact(req.include_contact);

    builder = if req.auto_structure {
        builder.auto_structure()
    } else {
        builder.outline(req.subheadings, req.paragraphs_per_subheading)
    };

    if req.use_discovered_links {
        builder = builder.merge_reference_links(session.links().clone());
    }

    let directive = builder.build()?;
    let artifact = session.generate(&directive, &st.pipeline).await?;
    Ok(Json(artifact.clone()))
}

async fn get_artifact(State(st): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<GeneratedArtifact>, ApiError> {
    let handle = st.sessions.get(id).await?;
    let session = handle.lock().await;
    session.artifact().cloned().map(Json).ok_or(ApiError::NoArtifact)
}

#[derive(Debug, Deserialize)]
struct FeedbackRequest {
    category: FeedbackCategory,
    #[serde(default)]
    email: Option<String>,
    message: String,
}

async fn send_feedback(State(st): State<AppState>, Json(req): Json<FeedbackRequest>) -> Result<StatusCode, ApiError> {
    if req.message.trim().is_empty() {
        return Err(ApiError::BadRequest("feedback message is empty".to_string()));
    }

    let transport = st.feedback.clone().ok_or(ApiError::Feedback(FeedbackError::NotConfigured))?;
    let submission = FeedbackSubmission::new(req.category, req.email, req.message);

    tokio::task::spawn_blocking(move || transport.send(&submission))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))??;

    Ok(StatusCode::ACCEPTED)
}
