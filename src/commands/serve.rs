use crate::commands::common;
use crate::error::PipelineError;
use crate::recipe::{self, RecipeInput};
use crate::scanner::{self, SourceFile};
use crate::settings::{Limits, Settings};
use crate::store::{MemoryStore, Submission, SubmissionStore};
use crate::types::{AnalyzeRequest, ErrorResponse, GenerateResponse, ListQuery, SubmissionRequest};
use anyhow::Result;
use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Json, Response,
    },
    routing::{get, post},
    Router,
};
use colored::Colorize;
use std::convert::Infallible;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use uuid::Uuid;

pub struct AppState {
    pub token: Option<String>,
    pub store: Arc<dyn SubmissionStore>,
    pub limits: Limits,
}

#[derive(Debug)]
enum ApiError {
    Unauthorized,
    BadRequest(String),
    NotFound(String),
    TooLarge(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized".to_string()),
            ApiError::BadRequest(e) => (StatusCode::BAD_REQUEST, e),
            ApiError::NotFound(e) => (StatusCode::NOT_FOUND, e),
            ApiError::TooLarge(e) => (StatusCode::PAYLOAD_TOO_LARGE, e),
            ApiError::Internal(e) => (StatusCode::INTERNAL_SERVER_ERROR, e),
        };
        (status, Json(ErrorResponse { error })).into_response()
    }
}

impl From<PipelineError> for ApiError {
    fn from(e: PipelineError) -> Self {
        ApiError::BadRequest(e.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(r: JsonRejection) -> Self {
        if r.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::TooLarge(r.body_text())
        } else {
            ApiError::BadRequest(r.body_text())
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        o_error!("{} {:#}", "✗".red(), e);
        ApiError::Internal(e.to_string())
    }
}

fn check_auth(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    let expected = match state.token {
        Some(ref t) => t,
        None => return Ok(()),
    };
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    if auth.strip_prefix("Bearer ") == Some(expected.as_str()) {
        Ok(())
    } else {
        Err(ApiError::Unauthorized)
    }
}

fn parse_files(state: &AppState, value: &serde_json::Value) -> Result<Vec<SourceFile>, ApiError> {
    let files = SourceFile::list_from_json(value)?;
    if files.len() > state.limits.max_files {
        return Err(ApiError::TooLarge(format!(
            "{} files exceeds the limit of {}",
            files.len(),
            state.limits.max_files
        )));
    }
    Ok(files)
}

pub fn router(state: Arc<AppState>, request_timeout: Duration) -> Router {
    let max_body = state.limits.max_body_bytes;
    Router::new()
        .route("/health", get(health))
        .route("/analyze", post(analyze))
        .route("/generate-dockerfile", post(generate_dockerfile))
        .route("/submissions", post(create_submission).get(list_submissions))
        .route("/submissions/stream", get(stream_submissions))
        .route("/submissions/:id", get(get_submission))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_body))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn handle_serve(port: Option<u16>, token: Option<String>, settings: Option<PathBuf>) -> Result<()> {
    let settings = Settings::load(settings.as_deref())?;

    let store: Arc<dyn SubmissionStore> = match settings.server.store_path {
        Some(ref path) => Arc::new(common::open_store(Some(path.as_path()))?),
        None => {
            o_warn!("{} No server.store_path set; submissions are kept in memory", "⚠".yellow());
            Arc::new(MemoryStore::new())
        }
    };

    let state = Arc::new(AppState {
        token: token.filter(|t| !t.is_empty()),
        store,
        limits: settings.limits,
    });
    if state.token.is_none() {
        o_warn!("{} No --token given; the API is open to anyone who can reach it", "⚠".yellow());
    }

    let app = router(state, settings.server.request_timeout);

    let addr = format!("0.0.0.0:{}", port.unwrap_or(settings.server.port));
    o_success!("{} stackprobe serve listening on {}", "✓".green(), addr.cyan());

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// --- Route handlers ---

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn analyze(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    check_auth(&state, &headers)?;
    let Json(req) = body?;
    let files = parse_files(&state, &req.files)?;
    Ok(Json(scanner::scan(&files)))
}

async fn generate_dockerfile(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Result<Json<RecipeInput>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    check_auth(&state, &headers)?;
    let Json(input) = body?;
    let recipe = recipe::synthesize(&input)?;
    Ok(Json(GenerateResponse {
        dockerfile: recipe.render(),
        recipe,
    }))
}

async fn create_submission(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Result<Json<SubmissionRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    check_auth(&state, &headers)?;
    let Json(req) = body?;
    let owner = req.owner.trim();
    if owner.is_empty() {
        return Err(PipelineError::invalid("owner is required").into());
    }

    let files = parse_files(&state, &req.files)?;
    let profile = scanner::detect(&files);
    if profile.tech_stack.is_empty() {
        return Err(PipelineError::invalid("no technology detected in the submitted files").into());
    }
    let recipe = recipe::synthesize(&RecipeInput::from(&profile))?;

    let source = req.source.as_deref().unwrap_or("upload");
    let submission = Submission::new(owner, source, profile.tech_stack.into_iter().collect(), &recipe);
    // FileStore rewrites its file on every insert; keep that off the runtime threads.
    let store = state.store.clone();
    let record = submission.clone();
    tokio::task::spawn_blocking(move || store.insert(record))
        .await
        .map_err(anyhow::Error::from)??;
    o_debug!("  submission {} by {} ({})", submission.id, submission.owner, submission.family);

    Ok((StatusCode::CREATED, Json(submission)))
}

async fn list_submissions(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(q): Query<ListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    check_auth(&state, &headers)?;
    let owner = q
        .owner
        .filter(|o| !o.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("owner query parameter is required".into()))?;
    Ok(Json(state.store.list_by_owner(&owner)?))
}

async fn get_submission(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    check_auth(&state, &headers)?;
    let id = Uuid::parse_str(&id).map_err(|_| ApiError::BadRequest(format!("invalid submission id '{}'", id)))?;
    match state.store.get(id)? {
        Some(s) => Ok(Json(s)),
        None => Err(ApiError::NotFound(format!("submission {} not found", id))),
    }
}

async fn stream_submissions(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(q): Query<ListQuery>,
) -> Result<Sse<impl tokio_stream::Stream<Item = Result<Event, Infallible>>>, ApiError> {
    check_auth(&state, &headers)?;

    let owner = q.owner;
    // Lagged receivers drop the missed records and keep going.
    let stream = BroadcastStream::new(state.store.subscribe()).filter_map(move |item| {
        let s = item.ok()?;
        if owner.as_deref().map_or(false, |o| o != s.owner) {
            return None;
        }
        Event::default().event("submission").json_data(&s).ok().map(Ok)
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::FileStore;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn app_with(token: Option<&str>, limits: Limits) -> (Router, Arc<AppState>) {
        let state = Arc::new(AppState {
            token: token.map(String::from),
            store: Arc::new(MemoryStore::new()),
            limits,
        });
        (router(state.clone(), Duration::from_secs(30)), state)
    }

    fn app() -> Router {
        app_with(None, Limits::default()).0
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(res: Response) -> Value {
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_needs_no_token() {
        let (app, _) = app_with(Some("secret"), Limits::default());
        let res = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(body_json(res).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_token_required_when_configured() {
        let (app, _) = app_with(Some("secret"), Limits::default());
        let res = app
            .clone()
            .oneshot(post_json("/analyze", json!({"files": []})))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

        let mut req = post_json("/analyze", json!({"files": []}));
        req.headers_mut()
            .insert("authorization", "Bearer secret".parse().unwrap());
        assert_eq!(app.oneshot(req).await.unwrap().status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_analyze_profile_and_warnings() {
        let res = app()
            .oneshot(post_json(
                "/analyze",
                json!({"files": [
                    {"name": "requirements.txt", "content": "flask==2.0"},
                    {"name": "package.json", "content": "{ nope"},
                    {"name": "big.bin", "content": "[FILE TOO LARGE FOR ANALYSIS - 7.00MB]"}
                ]}),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body = body_json(res).await;
        let stack = body["profile"]["techStack"].as_array().unwrap();
        assert!(stack.contains(&json!("Flask")));
        assert!(body["profile"]["ports"].as_array().unwrap().contains(&json!(5000)));
        assert_eq!(body["warnings"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_analyze_rejects_non_array_files() {
        let res = app()
            .oneshot(post_json("/analyze", json!({"files": {"name": "x"}})))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert!(body_json(res).await["error"].as_str().unwrap().contains("array"));
    }

    #[tokio::test]
    async fn test_analyze_too_many_files() {
        let limits = Limits {
            max_files: 1,
            ..Limits::default()
        };
        let (app, _) = app_with(None, limits);
        let res = app
            .oneshot(post_json(
                "/analyze",
                json!({"files": [{"name": "a", "content": ""}, {"name": "b", "content": ""}]}),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_body_limit() {
        let limits = Limits {
            max_body_bytes: 64,
            ..Limits::default()
        };
        let (app, _) = app_with(None, limits);
        let res = app
            .oneshot(post_json(
                "/analyze",
                json!({"files": [{"name": "a.txt", "content": "x".repeat(200)}]}),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_generate_dockerfile() {
        let res = app()
            .oneshot(post_json(
                "/generate-dockerfile",
                json!({"techStack": ["Node.js"], "envVariables": ["API_KEY"], "entryPoint": "index.js"}),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body = body_json(res).await;
        let dockerfile = body["dockerfile"].as_str().unwrap();
        assert!(dockerfile.starts_with("FROM node:20-alpine\n"));
        assert!(dockerfile.contains("ENV API_KEY=\n"));
        assert!(dockerfile.ends_with("CMD [\"node\", \"index.js\"]\n"));
        assert_eq!(body["recipe"]["family"], "Node.js");
    }

    #[tokio::test]
    async fn test_generate_dockerfile_empty_stack_is_400() {
        let res = app()
            .oneshot(post_json("/generate-dockerfile", json!({"techStack": []})))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert!(body_json(res).await["error"].as_str().unwrap().contains("techStack"));

        let res = app()
            .oneshot(post_json("/generate-dockerfile", json!("not an object")))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_submission_lifecycle() {
        let (app, state) = app_with(None, Limits::default());
        let mut rx = state.store.subscribe();

        let res = app
            .clone()
            .oneshot(post_json(
                "/submissions",
                json!({
                    "owner": "alice",
                    "source": "github:acme/web",
                    "files": [{"name": "go.mod", "content": "module acme\n"}]
                }),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
        let created = body_json(res).await;
        let id = created["id"].as_str().unwrap().to_string();
        assert_eq!(created["family"], "Go");
        assert_eq!(rx.recv().await.unwrap().id.to_string(), id);

        let res = app
            .clone()
            .oneshot(Request::get(format!("/submissions/{}", id)).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(body_json(res).await["source"], "github:acme/web");

        let res = app
            .clone()
            .oneshot(Request::get("/submissions?owner=alice").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(body_json(res).await.as_array().unwrap().len(), 1);

        let res = app
            .clone()
            .oneshot(Request::get(format!("/submissions/{}", Uuid::new_v4())).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);

        let res = app
            .oneshot(Request::get("/submissions").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_submission_persisted_by_file_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("submissions.json");
        let state = Arc::new(AppState {
            token: None,
            store: Arc::new(FileStore::open(&path).unwrap()),
            limits: Limits::default(),
        });
        let app = router(state, Duration::from_secs(30));

        let res = app
            .oneshot(post_json(
                "/submissions",
                json!({"owner": "carol", "files": [{"name": "requirements.txt", "content": "flask\n"}]}),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
        let id = Uuid::parse_str(body_json(res).await["id"].as_str().unwrap()).unwrap();

        let reopened = FileStore::open(&path).unwrap();
        let stored = reopened.get(id).unwrap().unwrap();
        assert_eq!(stored.owner, "carol");
        assert_eq!(stored.family, "Flask");
    }

    #[tokio::test]
    async fn test_submission_without_detectable_stack_is_400() {
        let res = app()
            .oneshot(post_json(
                "/submissions",
                json!({"owner": "bob", "files": [{"name": "notes.txt", "content": "hi"}]}),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let res = app()
            .oneshot(post_json("/submissions", json!({"owner": " ", "files": []})))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_stream_is_event_stream() {
        let res = app()
            .oneshot(Request::get("/submissions/stream").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.headers()["content-type"], "text/event-stream");
    }
}
