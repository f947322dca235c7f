use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, put},
};

/// API Router Module
///
/// JSON endpoints for the front end. These paths sit in the guard's
/// exclusion list, so each handler reads `SessionFlags` and enforces its
/// own requirement.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // GET /api/health
        // Liveness probe for load balancers.
        .route("/api/health", get(|| async { "ok" }))
        // GET /api/session
        // Session flags plus the prefixes the role may reach.
        .route("/api/session", get(handlers::get_session))
        // PUT /api/session/role
        // Records the role of a signed-in session. Unknown roles are rejected.
        .route("/api/session/role", put(handlers::update_session_role))
}
