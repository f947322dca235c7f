use axum::{
    Json,
    extract::{RawQuery, State, rejection::JsonRejection},
    http::{StatusCode, Uri, header},
    response::{AppendHeaders, Html, IntoResponse, Redirect, Response},
};

use crate::{
    config::AppConfig,
    error::{CallbackError, SessionError},
    guard::{GuardState, HOME_PATH, SIGNIN_PATH},
    models::{CallbackParams, FragmentPayload, SessionView, SignInGrant, UpdateRoleRequest},
    session::{AUTH_COOKIE, ROLE_COOKIE, SessionFlags},
};

// --- Session API ---

/// get_session
///
/// [API Route] Returns the caller's session flags and the path prefixes its
/// role may reach. Never fails: a request without cookies gets an
/// unauthenticated view.
#[utoipa::path(
    get,
    path = "/api/session",
    responses((status = 200, description = "Current session", body = SessionView))
)]
pub async fn get_session(
    State(guard): State<GuardState>,
    session: SessionFlags,
) -> Json<SessionView> {
    Json(session_view(&guard, session))
}

/// update_session_role
///
/// [API Route] Records the signed-in user's role once the front end has
/// loaded the profile. Only roles present in the access table are accepted.
#[utoipa::path(
    put,
    path = "/api/session/role",
    request_body = UpdateRoleRequest,
    responses(
        (status = 200, description = "Role recorded", body = SessionView),
        (status = 400, description = "Unknown role"),
        (status = 401, description = "Not signed in")
    )
)]
pub async fn update_session_role(
    State(config): State<AppConfig>,
    State(guard): State<GuardState>,
    session: SessionFlags,
    Json(payload): Json<UpdateRoleRequest>,
) -> Result<Response, SessionError> {
    if !session.authenticated {
        return Err(SessionError::NotAuthenticated);
    }

    let role = payload.role.trim().to_string();
    if !guard.table().contains_role(&role) {
        tracing::warn!(role = %role, "Rejected role update for unmapped role");
        return Err(SessionError::UnknownRole(role));
    }

    let cookie = config.cookie_policy().set_role(&role);
    let view = session_view(&guard, SessionFlags::new(true, Some(&role)));

    Ok((AppendHeaders([(header::SET_COOKIE, cookie)]), Json(view)).into_response())
}

fn session_view(guard: &GuardState, session: SessionFlags) -> SessionView {
    let allowed_prefixes = match (session.authenticated, session.role.as_deref()) {
        (true, Some(role)) => guard
            .table()
            .allowed_prefixes(role)
            .map(<[String]>::to_vec)
            .unwrap_or_default(),
        _ => Vec::new(),
    };

    SessionView {
        authenticated: session.authenticated,
        role: session.role,
        allowed_prefixes,
    }
}

// --- Authentication Callback ---

/// auth_callback
///
/// [Public Route] Landing page for the identity provider redirect.
///
/// With query parameters (query response mode) the sign-in is completed
/// immediately. Without any, the provider used fragment mode: the page
/// forwards `location.hash` to `POST /auth/callback`. The query is read raw
/// so every malformed or repeated parameter still ends on the error page.
#[utoipa::path(
    get,
    path = "/auth/callback",
    params(CallbackParams),
    responses((status = 200, description = "Callback page (success or error)"))
)]
pub async fn auth_callback(
    State(config): State<AppConfig>,
    RawQuery(query): RawQuery,
) -> Response {
    let params = CallbackParams::from_query(query.as_deref());
    if params == CallbackParams::default() {
        return Html(FRAGMENT_FORWARD_PAGE).into_response();
    }
    complete_sign_in(&config, params.validate())
}

/// auth_callback_fragment
///
/// [Public Route] Completes a sign-in from a forwarded URL fragment. An
/// unreadable body is a failed sign-in, not a bare 4xx.
#[utoipa::path(
    post,
    path = "/auth/callback",
    request_body = FragmentPayload,
    responses((status = 200, description = "Callback page (success or error)"))
)]
pub async fn auth_callback_fragment(
    State(config): State<AppConfig>,
    payload: Result<Json<FragmentPayload>, JsonRejection>,
) -> Response {
    let grant = payload
        .map_err(|rejection| CallbackError::MalformedPayload(rejection.body_text()))
        .and_then(|Json(payload)| CallbackParams::from_fragment(&payload.fragment))
        .and_then(CallbackParams::validate);
    complete_sign_in(&config, grant)
}

/// complete_sign_in
///
/// On success: set the signed-in flag, drop any stale role flag, and move on
/// to the home page after the success delay. On failure: leave cookies alone,
/// show the message, and return to sign-in after the error delay.
fn complete_sign_in(config: &AppConfig, grant: Result<SignInGrant, CallbackError>) -> Response {
    match grant {
        Ok(_grant) => {
            tracing::info!("Sign-in callback accepted");
            let cookies = config.cookie_policy();
            (
                AppendHeaders([
                    (header::SET_COOKIE, cookies.set_authenticated()),
                    (header::SET_COOKIE, cookies.clear(ROLE_COOKIE)),
                ]),
                transition_page(
                    "Signed in",
                    "Sign-in successful. Redirecting...",
                    HOME_PATH,
                    config.callback_success_delay_secs,
                ),
            )
                .into_response()
        }
        Err(error) => {
            tracing::warn!(%error, "Sign-in callback rejected");
            transition_page(
                "Sign-in failed",
                &error.user_message(),
                SIGNIN_PATH,
                config.callback_error_delay_secs,
            )
            .into_response()
        }
    }
}

/// logout
///
/// [Public Route] Clears both session cookies and returns to the sign-in page.
pub async fn logout(State(config): State<AppConfig>) -> impl IntoResponse {
    let cookies = config.cookie_policy();
    (
        AppendHeaders([
            (header::SET_COOKIE, cookies.clear(AUTH_COOKIE)),
            (header::SET_COOKIE, cookies.clear(ROLE_COOKIE)),
        ]),
        Redirect::to(SIGNIN_PATH),
    )
}

// --- Pages ---

/// signin_page
///
/// [Public Route] Sign-in page. Links to the identity provider when an
/// authorize URL is configured.
pub async fn signin_page(State(config): State<AppConfig>) -> Html<String> {
    let action = match &config.signin_authorize_url {
        Some(url) => format!(
            r#"<a class="signin-button" href="{}">Sign in</a>"#,
            escape_html(url)
        ),
        None => "<p>Sign-in is not configured.</p>".to_string(),
    };

    Html(format!(
        r#"<!doctype html>
<html lang="en">
<head><meta charset="utf-8"><title>Supply Ontario | Sign in</title><link rel="stylesheet" href="/static/app.css"></head>
<body><main class="signin"><h1>Supply Ontario</h1>{action}</main></body>
</html>"#
    ))
}

/// app_shell
///
/// [Guarded Fallback] Serves the application shell for any page the route
/// guard lets through. The front-end bundle renders the page for the path.
/// Paths the guard skips (assets, API) never get the shell: anything not
/// matched by a real route there is a 404.
pub async fn app_shell(State(guard): State<GuardState>, uri: Uri) -> Response {
    if guard.is_excluded(uri.path()) {
        return StatusCode::NOT_FOUND.into_response();
    }

    let path = escape_html(uri.path());
    (
        StatusCode::OK,
        Html(format!(
            r#"<!doctype html>
<html lang="en">
<head><meta charset="utf-8"><title>Supply Ontario</title><link rel="stylesheet" href="/static/app.css"></head>
<body><div id="root" data-path="{path}"></div><script type="module" src="/static/app.js"></script></body>
</html>"#
        )),
    )
        .into_response()
}

fn transition_page(title: &str, message: &str, target: &str, delay_secs: u64) -> Html<String> {
    let title = escape_html(title);
    let message = escape_html(message);
    Html(format!(
        r#"<!doctype html>
<html lang="en">
<head><meta charset="utf-8"><meta http-equiv="refresh" content="{delay_secs};url={target}"><title>Supply Ontario | {title}</title></head>
<body><main class="callback"><p role="status">{message}</p></main></body>
</html>"#
    ))
}

const FRAGMENT_FORWARD_PAGE: &str = r#"<!doctype html>
<html lang="en">
<head><meta charset="utf-8"><title>Supply Ontario | Signing in</title></head>
<body><main class="callback"><p role="status">Signing in...</p></main>
<script>
fetch("/auth/callback", {
  method: "POST",
  credentials: "same-origin",
  headers: { "Content-Type": "application/json" },
  body: JSON.stringify({ fragment: window.location.hash })
})
  .then((response) => response.text())
  .then((html) => { document.open(); document.write(html); document.close(); })
  .catch(() => { window.location.replace("/signin"); });
</script>
</body>
</html>"#;

fn escape_html(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
