use reqwest::Method;
use reqwest::header::{AUTHORIZATION, HeaderValue};
use secrecy::SecretString;
use upsql::api::auth_filler::{EMAIL_HEADER, PASSWORD_HEADER};
use upsql::api::{ApiRequest, AuthFiller, CredentialsFiller, TokenFiller};

fn request() -> ApiRequest {
    ApiRequest::new(Method::GET, "http://localhost/users")
}

fn fillers() -> Vec<Box<dyn AuthFiller>> {
    vec![
        Box::new(CredentialsFiller::new("me@example.com", &SecretString::from("hunter2".to_string())).unwrap()),
        Box::new(TokenFiller::new(&SecretString::from("token123".to_string())).unwrap()),
    ]
}

#[test]
fn fill_leaves_input_untouched() {
    for filler in fillers() {
        let before = request();
        let after = filler.fill(&before);
        assert!(before.headers.is_empty(), "input request was modified");
        assert!(!after.headers.is_empty(), "nothing was filled");
        assert_eq!(after.url, before.url);
        assert_eq!(after.method, before.method);
    }
}

#[test]
fn credentials_filler_sets_both_headers() {
    let filler =
        CredentialsFiller::new("me@example.com", &SecretString::from("hunter2".to_string())).unwrap();
    let filled = filler.fill(&request());
    assert_eq!(filled.headers[&EMAIL_HEADER], "me@example.com");
    assert_eq!(filled.headers[&PASSWORD_HEADER], "hunter2");
    assert!(filled.headers[&PASSWORD_HEADER].is_sensitive());
    assert!(!filled.headers.contains_key(AUTHORIZATION));
}

#[test]
fn token_filler_sets_authorization() {
    let filler = TokenFiller::new(&SecretString::from("token123".to_string())).unwrap();
    let filled = filler.fill(&request());
    assert_eq!(filled.headers[AUTHORIZATION], "token123");
    assert!(filled.headers[AUTHORIZATION].is_sensitive());
}

#[test]
fn body_is_carried_over() {
    let filler = TokenFiller::new(&SecretString::from("token123".to_string())).unwrap();
    let req = ApiRequest::new(Method::POST, "http://localhost/query")
        .with_body(serde_json::json!({"sql": "SELECT 1"}));
    let filled = filler.fill(&req);
    assert_eq!(filled.body, req.body);
}

#[test]
#[should_panic(expected = "already carries")]
fn token_filler_refuses_double_fill() {
    let filler = TokenFiller::new(&SecretString::from("token123".to_string())).unwrap();
    let mut req = request();
    req.headers.insert(AUTHORIZATION, HeaderValue::from_static("other"));
    let _ = filler.fill(&req);
}

#[test]
#[should_panic(expected = "already carries")]
fn credentials_filler_refuses_double_fill() {
    let filler =
        CredentialsFiller::new("me@example.com", &SecretString::from("hunter2".to_string())).unwrap();
    let once = filler.fill(&request());
    let _ = filler.fill(&once);
}

#[test]
fn invalid_header_characters_are_a_config_error() {
    let err = TokenFiller::new(&SecretString::from("bad\ntoken".to_string())).unwrap_err();
    assert!(err.to_string().starts_with("config:"), "Got: {}", err);
}

#[test]
fn closures_are_fillers() {
    let filler = |req: &ApiRequest| {
        let mut filled = req.clone();
        filled
            .headers
            .insert("x-test", HeaderValue::from_static("123"));
        filled
    };
    let filled = filler.fill(&request());
    assert_eq!(filled.headers["x-test"], "123");
}
