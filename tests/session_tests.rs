use axum::http::{HeaderMap, HeaderValue, header};
use so_portal::{
    SessionFlags,
    session::{AUTH_COOKIE, CookiePolicy, ROLE_COOKIE, cookie_value},
};

// --- Helper Functions ---

fn headers_with(cookies: &[&str]) -> HeaderMap {
    let mut headers = HeaderMap::new();
    for cookie in cookies {
        headers.append(header::COOKIE, HeaderValue::from_str(cookie).unwrap());
    }
    headers
}

// --- Reading Flags ---

#[test]
fn test_no_cookies_is_anonymous() {
    let flags = SessionFlags::from_headers(&HeaderMap::new());
    assert_eq!(flags, SessionFlags::default());
    assert!(!flags.authenticated);
    assert!(flags.role.is_none());
}

#[test]
fn test_reads_auth_and_encoded_role() {
    let headers = headers_with(&["theme=dark; so_auth=true; so_user_role=SO%20Admin"]);
    let flags = SessionFlags::from_headers(&headers);
    assert_eq!(flags, SessionFlags::new(true, Some("SO Admin")));
}

#[test]
fn test_reads_across_multiple_cookie_headers() {
    let headers = headers_with(&["so_auth=1", "so_user_role=Read%20Only"]);
    let flags = SessionFlags::from_headers(&headers);
    assert!(flags.authenticated);
    assert_eq!(flags.role.as_deref(), Some("Read Only"));
}

#[test]
fn test_falsy_auth_values_are_not_authenticated() {
    for value in ["so_auth=", "so_auth=false", "so_auth=0"] {
        let flags = SessionFlags::from_headers(&headers_with(&[value]));
        assert!(!flags.authenticated, "{value}");
    }
}

#[test]
fn test_empty_or_undecodable_role_is_absent() {
    let empty = SessionFlags::from_headers(&headers_with(&["so_auth=true; so_user_role="]));
    assert!(empty.role.is_none());

    // %FF is not valid UTF-8 once decoded.
    let garbled = SessionFlags::from_headers(&headers_with(&["so_auth=true; so_user_role=%FF"]));
    assert!(garbled.authenticated);
    assert!(garbled.role.is_none());
}

#[test]
fn test_role_whitespace_is_kept_verbatim() {
    let headers = headers_with(&["so_auth=true; so_user_role=%20SO%20Admin"]);
    let flags = SessionFlags::from_headers(&headers);
    assert_eq!(flags.role.as_deref(), Some(" SO Admin"));
}

#[test]
fn test_first_occurrence_wins() {
    let headers = headers_with(&["so_user_role=Read%20Only; so_user_role=SO%20Admin"]);
    assert_eq!(cookie_value(&headers, ROLE_COOKIE), Some("Read%20Only"));
}

#[test]
fn test_cookie_names_match_exactly() {
    let headers = headers_with(&["so_auth_legacy=true; xso_auth=true"]);
    assert_eq!(cookie_value(&headers, AUTH_COOKIE), None);
}

#[test]
fn test_quoted_value_is_unwrapped() {
    let headers = headers_with(&[r#"so_user_role="Org%20Admin""#]);
    let flags = SessionFlags::from_headers(&headers);
    assert_eq!(flags.role.as_deref(), Some("Org Admin"));
}

// --- Writing Cookies ---

#[test]
fn test_set_role_encodes_display_name() {
    let cookie = CookiePolicy::new(false).set_role("SO System Admin");
    assert_eq!(cookie, "so_user_role=SO%20System%20Admin; Path=/; SameSite=Lax");
}

#[test]
fn test_set_authenticated_with_secure_policy() {
    let cookie = CookiePolicy::new(true).set_authenticated();
    assert_eq!(cookie, "so_auth=true; Path=/; SameSite=Lax; Secure");
}

#[test]
fn test_clear_expires_immediately() {
    let cookie = CookiePolicy::new(false).clear(AUTH_COOKIE);
    assert_eq!(cookie, "so_auth=; Path=/; SameSite=Lax; Max-Age=0");
}

#[test]
fn test_written_role_reads_back() {
    let set_cookie = CookiePolicy::new(false).set_role("Standard User");
    let pair = set_cookie.split(';').next().unwrap();
    let flags = SessionFlags::from_headers(&headers_with(&["so_auth=true", pair]));
    assert_eq!(flags.role.as_deref(), Some("Standard User"));
}
