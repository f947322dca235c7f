use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::{IntoParams, ToSchema};

use crate::error::CallbackError;

// --- Session API Schemas ---

/// SessionView
///
/// What the front end needs to render role-gated navigation: the session
/// flags plus the prefixes the role may reach. `allowed_prefixes` is empty
/// for a missing or unmapped role.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default, PartialEq, Eq)]
#[ts(export)]
pub struct SessionView {
    pub authenticated: bool,
    pub role: Option<String>,
    pub allowed_prefixes: Vec<String>,
}

/// UpdateRoleRequest
///
/// Input payload for PUT /api/session/role. The role must be a key of the
/// role access table.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct UpdateRoleRequest {
    #[schema(example = "SO Admin")]
    pub role: String,
}

/// FragmentPayload
///
/// Body of POST /auth/callback: the raw `location.hash` of the callback page,
/// forwarded by its script because fragments never reach the server.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct FragmentPayload {
    #[schema(example = "#code=abc&state=xyz&client_info=eyJ1aWQiOiIxIn0")]
    pub fragment: String,
}

// --- Callback Parameters ---

/// CallbackParams
///
/// Parameters the identity provider appends to the callback URL, either as
/// a query string or as a fragment. Both are parsed by hand so a repeated
/// key keeps its first value instead of failing deserialization.
#[derive(Debug, Clone, Default, IntoParams, PartialEq, Eq)]
#[into_params(parameter_in = Query)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub client_info: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// SignInGrant
///
/// A callback that carried every required parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignInGrant {
    pub code: String,
    pub state: String,
    pub client_info: String,
}

impl CallbackParams {
    /// Parses a `#key=value&...` fragment. Unknown keys are ignored and the
    /// first occurrence of a repeated key wins.
    pub fn from_fragment(fragment: &str) -> Result<Self, CallbackError> {
        let body = fragment.trim().trim_start_matches('#');
        if body.is_empty() {
            return Err(CallbackError::EmptyFragment);
        }
        Ok(Self::from_pairs(body))
    }

    /// Parses a raw query string with the same rules as `from_fragment`.
    /// A missing or empty query yields the default (all absent) params.
    pub fn from_query(query: Option<&str>) -> Self {
        query.map(Self::from_pairs).unwrap_or_default()
    }

    fn from_pairs(encoded: &str) -> Self {
        let mut params = Self::default();
        for (key, value) in url::form_urlencoded::parse(encoded.as_bytes()) {
            let slot = match &*key {
                "code" => &mut params.code,
                "state" => &mut params.state,
                "client_info" => &mut params.client_info,
                "error" => &mut params.error,
                "error_description" => &mut params.error_description,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into_owned());
            }
        }
        params
    }

    /// validate
    ///
    /// A provider-reported error takes precedence over everything else; then
    /// `code`, `state` and `client_info` must all be present and non-empty.
    pub fn validate(self) -> Result<SignInGrant, CallbackError> {
        if let Some(code) = self.error.filter(|e| !e.trim().is_empty()) {
            return Err(CallbackError::Provider {
                code,
                description: self.error_description,
            });
        }

        Ok(SignInGrant {
            code: required(self.code, "code")?,
            state: required(self.state, "state")?,
            client_info: required(self.client_info, "client_info")?,
        })
    }
}

fn required(value: Option<String>, name: &'static str) -> Result<String, CallbackError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or(CallbackError::MissingParameter(name))
}
