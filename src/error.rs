use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Failures while building the role access table at startup.
#[derive(Error, Debug)]
pub enum AccessTableError {
    #[error("failed to read role access file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed role access table: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("role '{role}' has invalid path prefix '{prefix}' (must start with '/')")]
    InvalidPrefix { role: String, prefix: String },
}

/// CallbackError
///
/// Reasons the identity-provider callback cannot complete a sign-in.
/// None of these are retried; the user is sent back to the sign-in page.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CallbackError {
    #[error("identity provider returned error '{code}'")]
    Provider {
        code: String,
        description: Option<String>,
    },

    #[error("callback is missing the '{0}' parameter")]
    MissingParameter(&'static str),

    #[error("callback fragment is empty")]
    EmptyFragment,

    #[error("callback body could not be read: {0}")]
    MalformedPayload(String),
}

impl CallbackError {
    /// The message shown on the transient error page.
    pub fn user_message(&self) -> String {
        match self {
            CallbackError::Provider {
                description: Some(description),
                ..
            } if !description.trim().is_empty() => format!("Sign-in failed: {description}"),
            CallbackError::Provider { code, .. } => format!("Sign-in failed: {code}"),
            CallbackError::MissingParameter(_)
            | CallbackError::EmptyFragment
            | CallbackError::MalformedPayload(_) => {
                "Sign-in failed: the response from the identity provider was incomplete."
                    .to_string()
            }
        }
    }
}

/// Rejections from the session API.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("not signed in")]
    NotAuthenticated,

    #[error("unknown role '{0}'")]
    UnknownRole(String),
}

impl IntoResponse for SessionError {
    fn into_response(self) -> Response {
        let status = match self {
            SessionError::NotAuthenticated => StatusCode::UNAUTHORIZED,
            SessionError::UnknownRole(_) => StatusCode::BAD_REQUEST,
        };

        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}
