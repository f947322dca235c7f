use crate::{AppState, handlers};
use axum::{
    Router,
    routing::get,
};

/// Public Router Module
///
/// Routes served regardless of session state. `/signin` is the one
/// exception the guard enforces: a signed-in session is sent home instead.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /signin
        // Sign-in page linking to the identity provider.
        .route("/signin", get(handlers::signin_page))
        // GET /logout
        // Clears both session cookies and redirects to /signin.
        .route("/logout", get(handlers::logout))
        // GET/POST /auth/callback
        // Identity-provider landing page. GET handles query-mode responses
        // (and serves the fragment forwarder); POST receives the forwarded fragment.
        .route(
            "/auth/callback",
            get(handlers::auth_callback).post(handlers::auth_callback_fragment),
        )
}
