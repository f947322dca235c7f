use so_portal::{
    error::CallbackError,
    models::{CallbackParams, SignInGrant},
};

#[test]
fn test_fragment_with_all_parameters_validates() {
    let grant = CallbackParams::from_fragment("#code=abc&state=xyz&client_info=eyJ1aWQiOiIxIn0%3D")
        .and_then(CallbackParams::validate)
        .unwrap();

    assert_eq!(
        grant,
        SignInGrant {
            code: "abc".to_string(),
            state: "xyz".to_string(),
            client_info: "eyJ1aWQiOiIxIn0=".to_string(),
        }
    );
}

#[test]
fn test_fragment_without_hash_is_accepted() {
    let params = CallbackParams::from_fragment("code=a&state=b&client_info=c").unwrap();
    assert_eq!(params.code.as_deref(), Some("a"));
}

#[test]
fn test_empty_fragment_is_rejected() {
    assert_eq!(
        CallbackParams::from_fragment("#"),
        Err(CallbackError::EmptyFragment)
    );
    assert_eq!(
        CallbackParams::from_fragment("  "),
        Err(CallbackError::EmptyFragment)
    );
}

#[test]
fn test_repeated_key_keeps_first_value() {
    let params = CallbackParams::from_fragment("#code=first&code=second").unwrap();
    assert_eq!(params.code.as_deref(), Some("first"));
}

#[test]
fn test_missing_parameters_are_reported_in_order() {
    let missing_code = CallbackParams::from_fragment("#state=s&client_info=c")
        .and_then(CallbackParams::validate);
    assert_eq!(missing_code, Err(CallbackError::MissingParameter("code")));

    let blank_state = CallbackParams::from_fragment("#code=a&state=&client_info=c")
        .and_then(CallbackParams::validate);
    assert_eq!(blank_state, Err(CallbackError::MissingParameter("state")));

    let missing_info =
        CallbackParams::from_fragment("#code=a&state=s").and_then(CallbackParams::validate);
    assert_eq!(missing_info, Err(CallbackError::MissingParameter("client_info")));
}

#[test]
fn test_provider_error_takes_precedence() {
    let result = CallbackParams::from_fragment(
        "#code=a&state=s&client_info=c&error=interaction_required&error_description=Session%20expired",
    )
    .and_then(CallbackParams::validate);

    let err = result.unwrap_err();
    assert_eq!(
        err,
        CallbackError::Provider {
            code: "interaction_required".to_string(),
            description: Some("Session expired".to_string()),
        }
    );
    assert_eq!(err.user_message(), "Sign-in failed: Session expired");
}

#[test]
fn test_provider_error_without_description_uses_code() {
    let err = CallbackParams {
        error: Some("access_denied".to_string()),
        ..CallbackParams::default()
    }
    .validate()
    .unwrap_err();

    assert_eq!(err.user_message(), "Sign-in failed: access_denied");
}

#[test]
fn test_incomplete_response_message_hides_parameter_name() {
    let message = CallbackError::MissingParameter("state").user_message();
    assert!(!message.contains("state"));
    assert!(message.starts_with("Sign-in failed"));
}

#[test]
fn test_query_repeated_key_keeps_first_value() {
    let params = CallbackParams::from_query(Some("code=first&code=second&state=s&client_info=c"));
    assert_eq!(params.code.as_deref(), Some("first"));
    assert!(params.validate().is_ok());
}

#[test]
fn test_query_absent_or_empty_is_default() {
    assert_eq!(CallbackParams::from_query(None), CallbackParams::default());
    assert_eq!(CallbackParams::from_query(Some("")), CallbackParams::default());
}

#[test]
fn test_malformed_payload_message_is_generic() {
    let message = CallbackError::MalformedPayload("expected value".to_string()).user_message();
    assert!(!message.contains("expected value"));
    assert!(message.starts_with("Sign-in failed"));
}
