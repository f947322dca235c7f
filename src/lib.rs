use std::sync::Arc;

use axum::{
    Router,
    extract::FromRef,
    http::HeaderName,
    middleware,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    services::ServeDir,
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

pub mod access;
pub mod config;
pub mod error;
pub mod guard;
pub mod handlers;
pub mod models;
pub mod session;

// Routes split by how the route guard treats them (public, API).
pub mod routes;
use routes::{api, public};

// --- Public Re-exports ---

pub use access::RoleAccessTable;
pub use config::AppConfig;
pub use guard::{GuardDecision, GuardState, RedirectTarget, RouteGuard};
pub use session::SessionFlags;

use error::AccessTableError;

/// ApiDoc
///
/// OpenAPI document for the JSON session API and the callback endpoint,
/// served at `/api/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::get_session, handlers::update_session_role,
        handlers::auth_callback, handlers::auth_callback_fragment
    ),
    components(
        schemas(models::SessionView, models::UpdateRoleRequest, models::FragmentPayload)
    ),
    tags(
        (name = "so-portal", description = "Supply Ontario portal session API")
    )
)]
struct ApiDoc;

/// AppState
///
/// Shared, immutable state: the loaded configuration and the route guard
/// (which owns the role access table).
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub guard: GuardState,
}

impl AppState {
    pub fn new(config: AppConfig, table: RoleAccessTable) -> Self {
        Self {
            config,
            guard: Arc::new(RouteGuard::new(Arc::new(table))),
        }
    }

    /// Loads the role table named by the configuration (or the built-in one).
    pub fn from_config(config: AppConfig) -> Result<Self, AccessTableError> {
        let table = RoleAccessTable::load(config.role_access_file.as_deref())?;
        Ok(Self::new(config, table))
    }
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

impl FromRef<AppState> for GuardState {
    fn from_ref(app_state: &AppState) -> GuardState {
        app_state.guard.clone()
    }
}

/// create_router
///
/// Assembles every route, wraps them (fallback included) in the route guard,
/// then applies the observability and CORS layers.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    let static_files = ServeDir::new(&state.config.static_dir);

    let base_router = Router::new()
        // Documentation lives under /api, which the guard excludes.
        .merge(SwaggerUi::new("/api/docs").url("/api/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        .merge(api::api_routes())
        .nest_service("/static", static_files)
        // Any other path is an application page; the guard decides if it is served.
        .fallback(handlers::app_shell)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            guard::route_guard,
        ))
        .with_state(state);

    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(
                    x_request_id.clone(),
                    MakeRequestUuid,
                ))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Span for `TraceLayer` carrying method, uri and the `x-request-id` set by
/// `SetRequestIdLayer`, so every log line of a request is correlated.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
