use std::env;

use crate::session::CookiePolicy;

/// AppConfig
///
/// Holds the portal's configuration. Loaded once at startup, immutable
/// afterwards, and pulled into handlers through `FromRef`.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Runtime environment marker. Controls log format and which settings are mandatory.
    pub env: Env,
    // Socket address the HTTP server binds to.
    pub bind_addr: String,
    // Directory served under /static (front-end bundle, images).
    pub static_dir: String,
    // Optional JSON role table; the built-in table is used when unset.
    pub role_access_file: Option<String>,
    // Identity-provider authorize URL linked from the sign-in page.
    pub signin_authorize_url: Option<String>,
    // Seconds the callback page waits before moving on to the home page.
    pub callback_success_delay_secs: u64,
    // Seconds the callback error page waits before returning to sign-in.
    pub callback_error_delay_secs: u64,
    // Whether session cookies carry the Secure attribute.
    pub cookie_secure: bool,
}

#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

impl Default for AppConfig {
    /// Non-panicking values for tests; no environment variables are read.
    fn default() -> Self {
        Self {
            env: Env::Local,
            bind_addr: "127.0.0.1:3000".to_string(),
            static_dir: "./public".to_string(),
            role_access_file: None,
            signin_authorize_url: None,
            callback_success_delay_secs: 1,
            callback_error_delay_secs: 3,
            cookie_secure: false,
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads the configuration from environment variables.
    ///
    /// # Panics
    /// Panics when a setting mandatory for the current environment is missing,
    /// or when a numeric/boolean setting cannot be parsed.
    pub fn load() -> Self {
        let env_str = env::var("APP_ENV").unwrap_or_else(|_| "local".to_string());
        let env = match env_str.as_str() {
            "production" => Env::Production,
            _ => Env::Local,
        };

        let signin_authorize_url = match env {
            Env::Production => Some(
                env::var("SIGNIN_AUTHORIZE_URL")
                    .expect("FATAL: SIGNIN_AUTHORIZE_URL must be set in production."),
            ),
            Env::Local => optional_var("SIGNIN_AUTHORIZE_URL"),
        };

        let cookie_secure = parse_var("COOKIE_SECURE", env == Env::Production);

        Self {
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            static_dir: env::var("STATIC_DIR").unwrap_or_else(|_| "./public".to_string()),
            role_access_file: optional_var("ROLE_ACCESS_FILE"),
            signin_authorize_url,
            callback_success_delay_secs: parse_var("CALLBACK_SUCCESS_DELAY_SECS", 1),
            callback_error_delay_secs: parse_var("CALLBACK_ERROR_DELAY_SECS", 3),
            cookie_secure,
            env,
        }
    }

    pub fn cookie_policy(&self) -> CookiePolicy {
        CookiePolicy::new(self.cookie_secure)
    }
}

fn optional_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> T {
    match optional_var(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .unwrap_or_else(|_| panic!("FATAL: {name} has an invalid value '{raw}'.")),
        None => default,
    }
}
