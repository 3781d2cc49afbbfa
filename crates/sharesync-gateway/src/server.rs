use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use sharesync_core::{
    AuthorizationFlow, IndexingJob, IndexingOrchestrator, IndexingRequest, JobRegistry,
    PermissionJob, SinkConnector, SourceProvider, SyncJob,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::auth;
use crate::error::ApiError;
use crate::extract::JsonBody;
use crate::types::*;

const INDEX_FAILED: &str = "Failed to complete indexing";
const SEARCH_FAILED: &str = "Search failed";
const TOKEN_REQUIRED: &str = "Access token is required";

/// Where the authorization callback sends the user agent afterwards.
#[derive(Debug, Clone)]
pub struct AuthRedirects {
    pub success: String,
    pub error: String,
}

impl Default for AuthRedirects {
    fn default() -> Self {
        Self {
            success: "/auth/success".to_string(),
            error: "/auth/error".to_string(),
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub source: Arc<dyn SourceProvider>,
    pub sink: Arc<dyn SinkConnector>,
    pub orchestrator: Arc<IndexingOrchestrator>,
    pub sync_jobs: Arc<JobRegistry<SyncJob>>,
    pub permission_jobs: Arc<JobRegistry<PermissionJob>>,
    pub auth: Arc<AuthorizationFlow>,
    pub redirects: AuthRedirects,
    pub allowed_origins: Vec<String>,
}

impl AppState {
    /// State with fresh, empty job registries.
    pub fn new(
        source: Arc<dyn SourceProvider>,
        sink: Arc<dyn SinkConnector>,
        orchestrator: IndexingOrchestrator,
        auth: AuthorizationFlow,
    ) -> Self {
        Self {
            source,
            sink,
            orchestrator: Arc::new(orchestrator),
            sync_jobs: Arc::new(JobRegistry::new()),
            permission_jobs: Arc::new(JobRegistry::new()),
            auth: Arc::new(auth),
            redirects: AuthRedirects::default(),
            allowed_origins: Vec::new(),
        }
    }
}

/// Create the Axum router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = if state.allowed_origins.is_empty() {
        CorsLayer::permissive()
    } else {
        let origins = state
            .allowed_origins
            .iter()
            .filter_map(|origin| match origin.parse::<HeaderValue>() {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!(origin = %origin, "Ignoring invalid CORS origin");
                    None
                }
            })
            .collect::<Vec<_>>();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    };

    let api = Router::new()
        .route("/auth/sharepoint", get(auth::begin_authorization))
        .route("/auth/callback", get(auth::handle_callback))
        .route("/auth/status", get(auth::authorization_status))
        .route("/auth/disconnect", post(auth::disconnect))
        .route(
            "/sharepoint/index",
            post(start_indexing).get(list_indexing_jobs),
        )
        .route("/sharepoint/sync", post(start_sync).get(sync_status))
        .route(
            "/sharepoint/permissions",
            post(start_permission_sync).get(list_permission_jobs),
        )
        .route("/sharepoint/search", post(search_content))
        .route("/websocket", get(realtime_unavailable));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Start the gateway server
pub async fn start_server(state: AppState, host: &str, port: u16) -> anyhow::Result<()> {
    let router = create_router(state);
    let addr = format!("{}:{}", host, port);

    info!(addr = %addr, "Starting gateway server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Gateway server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received, draining connections");
}

fn require_token(token: Option<&str>) -> Result<&str, ApiError> {
    token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::bad_request(TOKEN_REQUIRED))
}

// --- REST Handlers ---

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn start_indexing(
    State(state): State<AppState>,
    body: JsonBody,
) -> Result<Json<IndexResponse>, ApiError> {
    let token = require_token(body.str_field("accessToken"))?.to_string();
    let req: IndexRequest = body.decode()?;
    let source = state
        .source
        .connect(&token)
        .map_err(|e| ApiError::from_sync(INDEX_FAILED, e))?;

    let request = IndexingRequest {
        content_types: req.content_types,
        sync_type: req.sync_type,
        search_depth: req.search_depth,
    };
    let outcome = state
        .orchestrator
        .run_indexing_pass(source.as_ref(), request)
        .await
        .map_err(|e| ApiError::from_sync(INDEX_FAILED, e))?;

    Ok(Json(IndexResponse {
        success: true,
        message: "Indexing completed successfully".to_string(),
        job: outcome.job,
        indexed_items: outcome.preview,
    }))
}

async fn list_indexing_jobs(State(state): State<AppState>) -> Json<JobListResponse<IndexingJob>> {
    Json(JobListResponse {
        success: true,
        jobs: state.orchestrator.registry().list(),
    })
}

async fn start_sync(
    State(state): State<AppState>,
    body: JsonBody,
) -> Result<Json<SyncJobResponse>, ApiError> {
    require_token(body.str_field("accessToken"))?;

    let job = SyncJob::started(Utc::now());
    state.sync_jobs.put(job.clone());
    info!(job_id = %job.id, "Sync job recorded");

    Ok(Json(SyncJobResponse {
        success: true,
        message: Some("Sync job started successfully".to_string()),
        job,
    }))
}

async fn sync_status(
    State(state): State<AppState>,
    Query(query): Query<SyncStatusQuery>,
) -> Result<Json<SyncJobResponse>, ApiError> {
    let job_id = query
        .job_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::bad_request("Job ID is required"))?;

    let job = state
        .sync_jobs
        .get(&job_id)
        .ok_or_else(|| ApiError::not_found("Sync job not found", job_id))?;

    Ok(Json(SyncJobResponse {
        success: true,
        message: None,
        job,
    }))
}

async fn start_permission_sync(
    State(state): State<AppState>,
    body: JsonBody,
) -> Result<Json<PermissionResponse>, ApiError> {
    require_token(body.str_field("accessToken"))?;
    let req: PermissionRequest = body.decode()?;

    if !req.mirror_permissions {
        return Ok(Json(PermissionResponse {
            success: true,
            message: "Permission mirroring is disabled".to_string(),
            job: None,
        }));
    }

    let job = PermissionJob::started(Utc::now());
    state.permission_jobs.put(job.clone());
    info!(job_id = %job.id, "Permission sync job recorded");

    Ok(Json(PermissionResponse {
        success: true,
        message: "Permission synchronization started successfully".to_string(),
        job: Some(job),
    }))
}

async fn list_permission_jobs(
    State(state): State<AppState>,
) -> Json<JobListResponse<PermissionJob>> {
    Json(JobListResponse {
        success: true,
        jobs: state.permission_jobs.list(),
    })
}

async fn search_content(
    State(state): State<AppState>,
    body: JsonBody,
) -> Result<Json<SearchResponse>, ApiError> {
    let query = body
        .str_field("query")
        .filter(|q| !q.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("Search query is required"))?
        .to_string();
    require_token(body.str_field("accessToken"))?;
    let req: SearchRequest = body.decode()?;
    if req.page == 0 || req.page_size == 0 {
        return Err(ApiError::bad_request("page and pageSize must be at least 1"));
    }

    let hits = state
        .sink
        .search_content(&query, req.user_id.as_deref())
        .await
        .map_err(|e| ApiError::from_sync(SEARCH_FAILED, e))?;

    let (results, pagination) = paginate(hits, req.page, req.page_size);
    Ok(Json(SearchResponse {
        success: true,
        results,
        pagination,
    }))
}

async fn realtime_unavailable() -> impl IntoResponse {
    (
        StatusCode::NOT_IMPLEMENTED,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        "Real-time queries are not implemented; use POST /api/sharepoint/search",
    )
}

/// Slice one page out of `items`. Pages are 1-based; both arguments must be at least 1.
fn paginate<T>(items: Vec<T>, page: u32, page_size: u32) -> (Vec<T>, Pagination) {
    let total_results = items.len();
    let size = page_size as usize;
    let start = (page as usize - 1).saturating_mul(size);
    let results = items.into_iter().skip(start).take(size).collect();

    (
        results,
        Pagination {
            page,
            page_size,
            total_results,
            total_pages: total_results.div_ceil(size),
        },
    )
}
