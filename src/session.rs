use std::convert::Infallible;

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header, request::Parts},
};
use percent_encoding::{NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};

/// Cookie carrying the "signed in" flag.
pub const AUTH_COOKIE: &str = "so_auth";
/// Cookie carrying the role display name, e.g. `SO Admin`.
pub const ROLE_COOKIE: &str = "so_user_role";

/// SessionFlags
///
/// Snapshot of the two session cookies for a single request. Values are
/// untrusted client input: anything missing or unreadable resolves to
/// "not authenticated" / "no role", never to a more permissive state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionFlags {
    pub authenticated: bool,
    pub role: Option<String>,
}

impl SessionFlags {
    pub fn new(authenticated: bool, role: Option<&str>) -> Self {
        Self {
            authenticated,
            role: role.map(str::to_string),
        }
    }

    /// Reads both flags from the request's `Cookie` headers.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let authenticated = cookie_value(headers, AUTH_COOKIE).is_some_and(is_truthy);
        let role = cookie_value(headers, ROLE_COOKIE).and_then(decode_role);

        Self {
            authenticated,
            role,
        }
    }
}

/// SessionFlags Extractor
///
/// Never rejects; a request without cookies simply yields the default
/// (unauthenticated, no role) flags.
impl<S> FromRequestParts<S> for SessionFlags
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers))
    }
}

/// cookie_value
///
/// Finds the first `name=value` pair across all `Cookie` headers. Header
/// values that are not valid visible ASCII are skipped. Surrounding double
/// quotes on the value are removed.
pub fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| key.trim() == name)
        .map(|(_, value)| {
            let value = value.trim();
            value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .unwrap_or(value)
        })
}

fn is_truthy(value: &str) -> bool {
    !matches!(value, "" | "false" | "0")
}

fn decode_role(raw: &str) -> Option<String> {
    let role = percent_decode_str(raw).decode_utf8().ok()?;
    (!role.is_empty()).then(|| role.into_owned())
}

/// CookiePolicy
///
/// Attributes attached to every session cookie the portal writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CookiePolicy {
    pub secure: bool,
}

impl CookiePolicy {
    pub fn new(secure: bool) -> Self {
        Self { secure }
    }

    /// `Set-Cookie` value for the signed-in flag.
    pub fn set_authenticated(&self) -> String {
        self.build(AUTH_COOKIE, "true", None)
    }

    /// `Set-Cookie` value for the role flag. The role is percent-encoded so
    /// display names with spaces survive the cookie grammar.
    pub fn set_role(&self, role: &str) -> String {
        let encoded = utf8_percent_encode(role, NON_ALPHANUMERIC).to_string();
        self.build(ROLE_COOKIE, &encoded, None)
    }

    /// `Set-Cookie` value that expires `name` immediately.
    pub fn clear(&self, name: &str) -> String {
        self.build(name, "", Some(0))
    }

    fn build(&self, name: &str, value: &str, max_age: Option<u64>) -> String {
        let mut cookie = format!("{name}={value}; Path=/; SameSite=Lax");
        if let Some(max_age) = max_age {
            cookie.push_str(&format!("; Max-Age={max_age}"));
        }
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }
}
