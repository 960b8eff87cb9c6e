// Pedigree Trust - Web Server
// REST API with Axum: verify a dog against the registry, save the result

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use pedigree_trust::{
    is_client_error, save_verification, Config, DocumentFetcher, HttpFetcher, LookupOutcome,
    LookupQuery, PersistenceSink, RestSink, SaveOutcome, SqliteSink, VerificationPayload,
    VerificationService, VerifyError,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

type SharedFetcher = Arc<dyn DocumentFetcher>;

/// Shared application state
#[derive(Clone)]
struct AppState {
    verifier: Arc<VerificationService<SharedFetcher>>,
    sink: Arc<dyn PersistenceSink>,
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    kind: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    results: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            kind: None,
            message: None,
            data: Some(data),
            results: None,
            error: None,
        }
    }

    fn profile(data: T, message: Option<String>) -> Self {
        Self {
            kind: Some("profile"),
            message,
            ..Self::ok(data)
        }
    }

    fn search(results: T, message: String) -> Self {
        Self {
            success: true,
            kind: Some("search"),
            message: Some(message),
            data: None,
            results: Some(results),
            error: None,
        }
    }

    fn saved(results: T, message: String) -> Self {
        Self {
            success: true,
            kind: None,
            message: Some(message),
            data: None,
            results: Some(results),
            error: None,
        }
    }
}

impl ApiResponse<()> {
    fn failure(error: String) -> Self {
        Self {
            success: false,
            kind: None,
            message: None,
            data: None,
            results: None,
            error: Some(error),
        }
    }
}

/// 400 for caller mistakes, 500 (message kept) for fetch/store failures
fn error_response(err: anyhow::Error) -> Response {
    let status = if is_client_error(&err) {
        StatusCode::BAD_REQUEST
    } else {
        error!(error = %err, "request failed");
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (status, Json(ApiResponse::failure(err.to_string()))).into_response()
}

/// Run blocking fetch/store work off the async runtime
async fn run_blocking<T, F>(work: F) -> anyhow::Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> anyhow::Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(work).await?
}

// ============================================================================
// API Handlers
// ============================================================================

#[derive(Debug, Deserialize)]
struct VerifyParams {
    id: Option<String>,
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SaveRequest {
    dog_id: Option<String>,
    verification_data: Option<VerificationPayload>,
}

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/verify-pedigree?id=|name= - Look a dog up on the registry
async fn verify_pedigree(
    State(state): State<AppState>,
    Query(params): Query<VerifyParams>,
) -> Response {
    let query = match LookupQuery::from_parts(params.id.as_deref(), params.name.as_deref()) {
        Ok(query) => query,
        Err(e) => return error_response(e),
    };

    info!(?query, "verify-pedigree");
    let verifier = state.verifier.clone();
    let lookup = query.clone();
    let outcome = match run_blocking(move || verifier.lookup(&lookup)).await {
        Ok(outcome) => outcome,
        Err(e) => return error_response(e),
    };

    let name = match &query {
        LookupQuery::ByName(name) => Some(name.as_str()),
        LookupQuery::ById(_) => None,
    };

    match outcome {
        LookupOutcome::Profile(profile) => {
            let message = name.map(|n| format!("Found exact match for \"{}\"", n));
            Json(ApiResponse::profile(*profile, message)).into_response()
        }
        LookupOutcome::Candidates(candidates) => {
            let message = format!(
                "Found {} dogs matching \"{}\"",
                candidates.len(),
                name.unwrap_or_default()
            );
            Json(ApiResponse::search(candidates, message)).into_response()
        }
        LookupOutcome::NoMatch => {
            let message = format!("No dogs found matching \"{}\"", name.unwrap_or_default());
            Json(ApiResponse::search(Vec::<()>::new(), message)).into_response()
        }
    }
}

/// POST /api/save-verification - Persist a verified profile for a subject
async fn save(
    State(state): State<AppState>,
    body: Result<Json<SaveRequest>, JsonRejection>,
) -> Response {
    let body = match body {
        Ok(Json(body)) => body,
        Err(rejection) => {
            return error_response(
                VerifyError::invalid(format!("Invalid request body: {}", rejection.body_text())).into(),
            )
        }
    };

    let (Some(dog_id), Some(payload)) = (
        body.dog_id.filter(|id| !id.trim().is_empty()),
        body.verification_data,
    ) else {
        return error_response(
            VerifyError::invalid(
                "Required: dog_id (UUID from dogs table) and verification_data (from verify-pedigree)",
            )
            .into(),
        );
    };

    info!(dog_id = %dog_id, "save-verification");
    let sink = state.sink.clone();
    let result = run_blocking(move || {
        save_verification(sink.as_ref(), &dog_id, &payload.record, payload.score)
    })
    .await;

    match result {
        Ok(outcome) => {
            let message = outcome.message.clone();
            Json(ApiResponse::<SaveOutcome>::saved(outcome, message)).into_response()
        }
        Err(e) => error_response(e),
    }
}

fn open_sink(config: &Config) -> anyhow::Result<Arc<dyn PersistenceSink>> {
    if let Some(rest) = RestSink::from_config(&config.sink)? {
        info!("persisting to REST document store");
        return Ok(Arc::new(rest));
    }
    info!(path = %config.sink.db_path.display(), "persisting to local SQLite store");
    Ok(Arc::new(SqliteSink::open(&config.sink.db_path)?))
}

fn build_state(config: &Config) -> anyhow::Result<AppState> {
    let fetcher: SharedFetcher = Arc::new(HttpFetcher::new(&config.registry)?);
    Ok(AppState {
        verifier: Arc::new(VerificationService::new(config.registry.clone(), fetcher)),
        sink: open_sink(config)?,
    })
}

fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/verify-pedigree", get(verify_pedigree))
        .route("/save-verification", post(save))
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
}

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("pedigree_trust=info,pedigree_server=info")),
        )
        .init();

    println!("🌐 Pedigree Trust - Web Server");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let config = Config::from_env();

    // Blocking HTTP clients are built off the async runtime
    let state_config = config.clone();
    let state = run_blocking(move || build_state(&state_config)).await?;
    println!("✓ Registry: {}", config.registry.base_url);

    // Start server
    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;

    println!("\n🚀 Server running on http://{}", addr);
    println!("   API: http://{}/api/verify-pedigree?id=110391", addr);
    println!("\n   Press Ctrl+C to stop\n");

    axum::serve(listener, router(state)).await?;
    Ok(())
}
