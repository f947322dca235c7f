use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::{
    access::{RoleAccessTable, path_matches_prefix},
    session::SessionFlags,
};

pub const SIGNIN_PATH: &str = "/signin";
pub const HOME_PATH: &str = "/";

/// Paths reachable without a session.
pub const DEFAULT_PUBLIC_PATHS: &[&str] = &[SIGNIN_PATH, "/logout"];

/// Paths the guard never inspects: static assets, the JSON API and the
/// identity-provider callback.
pub const DEFAULT_EXCLUDED_PATHS: &[&str] = &[
    "/static",
    "/images",
    "/assets",
    "/api",
    "/favicon.ico",
    "/auth/callback",
];

/// Where a rejected request is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectTarget {
    SignIn,
    Home,
}

impl RedirectTarget {
    pub fn path(self) -> &'static str {
        match self {
            RedirectTarget::SignIn => SIGNIN_PATH,
            RedirectTarget::Home => HOME_PATH,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Forward,
    Redirect(RedirectTarget),
}

/// RouteGuard
///
/// Decides, per request, whether a page may be served given the session
/// flags. Holds only immutable configuration, so one instance is shared by
/// every request.
#[derive(Debug, Clone)]
pub struct RouteGuard {
    table: Arc<RoleAccessTable>,
    public_paths: Vec<String>,
    excluded_paths: Vec<String>,
}

/// GuardState
///
/// The shared handle stored in `AppState`.
pub type GuardState = Arc<RouteGuard>;

impl RouteGuard {
    pub fn new(table: Arc<RoleAccessTable>) -> Self {
        Self {
            table,
            public_paths: DEFAULT_PUBLIC_PATHS.iter().map(|p| p.to_string()).collect(),
            excluded_paths: DEFAULT_EXCLUDED_PATHS
                .iter()
                .map(|p| p.to_string())
                .collect(),
        }
    }

    /// Replaces the public path set. The sign-in page keeps its "already
    /// signed in" redirect only if it is part of the new set.
    pub fn with_public_paths<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        self.public_paths = paths.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_excluded_paths<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        self.excluded_paths = paths.into_iter().map(Into::into).collect();
        self
    }

    pub fn table(&self) -> &RoleAccessTable {
        &self.table
    }

    pub fn is_excluded(&self, path: &str) -> bool {
        self.excluded_paths
            .iter()
            .any(|prefix| path_matches_prefix(path, prefix))
    }

    pub fn is_public(&self, path: &str) -> bool {
        self.public_paths
            .iter()
            .any(|prefix| path_matches_prefix(path, prefix))
    }

    /// evaluate
    ///
    /// Pure decision over (path, session). Order matters:
    /// 1. Public paths are served, except the sign-in page for a signed-in session.
    /// 2. Everything else needs a session.
    /// 3. The home page is open to any session.
    /// 4. Other pages need a mapped role with a covering prefix.
    pub fn evaluate(&self, path: &str, session: &SessionFlags) -> GuardDecision {
        if self.is_public(path) {
            if session.authenticated && path_matches_prefix(path, SIGNIN_PATH) {
                return GuardDecision::Redirect(RedirectTarget::Home);
            }
            return GuardDecision::Forward;
        }

        if !session.authenticated {
            return GuardDecision::Redirect(RedirectTarget::SignIn);
        }

        if path == HOME_PATH {
            return GuardDecision::Forward;
        }

        // Missing or unmapped roles are home-only.
        match session.role.as_deref() {
            Some(role) if self.table.allows(role, path) => GuardDecision::Forward,
            _ => GuardDecision::Redirect(RedirectTarget::Home),
        }
    }
}

/// route_guard
///
/// Middleware that runs `RouteGuard::evaluate` ahead of every page handler.
/// Excluded paths pass straight through. Rejections become 307 redirects so
/// the original method is preserved.
pub async fn route_guard(
    State(guard): State<GuardState>,
    session: SessionFlags,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path();
    if guard.is_excluded(path) {
        return next.run(request).await;
    }

    match guard.evaluate(path, &session) {
        GuardDecision::Forward => next.run(request).await,
        GuardDecision::Redirect(target) => {
            tracing::debug!(
                path,
                role = session.role.as_deref().unwrap_or("<none>"),
                authenticated = session.authenticated,
                redirect_to = target.path(),
                "Route guard redirect"
            );
            Redirect::temporary(target.path()).into_response()
        }
    }
}
