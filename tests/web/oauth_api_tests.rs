use std::collections::HashMap;

use actix_web::http::StatusCode;
use actix_web::test;

use crate::support::{self, RecordingMailer, ScriptedModel};

fn oauth_state() -> riquer_chat::routes::app_state::AppState {
    let config = riquer_chat::config::Config {
        google_client_id: Some("client-123.apps.googleusercontent.com".to_string()),
        google_client_secret: Some("shh".to_string()),
        ..support::test_config()
    };
    support::state_with(config, ScriptedModel::new(vec![]), RecordingMailer::working())
}

fn query_of(location: &str) -> HashMap<String, String> {
    let parsed = if location.starts_with('/') {
        url::Url::parse(&format!("http://localhost{}", location)).unwrap()
    } else {
        url::Url::parse(location).unwrap()
    };
    parsed.query_pairs().into_owned().collect()
}

#[actix_web::test]
async fn login_page_warns_when_oauth_missing() {
    let app = init_app!(support::state(ScriptedModel::new(vec![]), RecordingMailer::working()));

    let req = test::TestRequest::get().uri("/login").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let page = String::from_utf8_lossy(&test::read_body(resp).await).to_string();
    assert!(page.contains("no està configurat"));
    assert!(page.contains("disabled"));
}

#[actix_web::test]
async fn login_page_shows_callback_error() {
    let app = init_app!(oauth_state());

    let req = test::TestRequest::get()
        .uri("/login?error=access_denied&error_description=Acc%C3%A9s+denegat")
        .to_request();
    let page = test::call_and_read_body(&app, req).await;
    let page = String::from_utf8_lossy(&page);
    assert!(page.contains("Accés denegat"));
    assert!(page.contains(r#"href="/auth/google""#));
}

#[actix_web::test]
async fn logged_in_user_skips_login_page() {
    let app = init_app!(oauth_state());
    let cookie = login!(app);

    let req = test::TestRequest::get().uri("/login").cookie(cookie).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(support::location(&resp), "/");
}

#[actix_web::test]
async fn google_auth_without_credentials_reports_error() {
    let app = init_app!(support::state(ScriptedModel::new(vec![]), RecordingMailer::working()));

    let req = test::TestRequest::get().uri("/auth/google").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);

    let location = support::location(&resp);
    assert!(location.starts_with("/login?"));
    assert_eq!(query_of(&location)["error"], "oauth_not_configured");
}

#[actix_web::test]
async fn google_auth_redirects_with_state_and_callback() {
    let app = init_app!(oauth_state());

    let req = test::TestRequest::get()
        .uri("/auth/google")
        .insert_header(("Host", "xat.local:8000"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert!(support::session_cookie(&resp).is_some());

    let location = support::location(&resp);
    assert!(location.starts_with("https://accounts.google.com/"));
    let params = query_of(&location);
    assert_eq!(params["redirect_uri"], "http://xat.local:8000/auth/google/callback");
    assert_eq!(params["prompt"], "select_account");
    assert!(!params["state"].is_empty());
}

#[actix_web::test]
async fn callback_with_wrong_state_is_refused() {
    let app = init_app!(oauth_state());

    let req = test::TestRequest::get().uri("/auth/google").to_request();
    let resp = test::call_service(&app, req).await;
    let cookie = support::session_cookie(&resp).unwrap();

    let req = test::TestRequest::get()
        .uri("/auth/google/callback?code=abc&state=forged")
        .cookie(cookie)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(query_of(&support::location(&resp))["error"], "state_mismatch");
}

#[actix_web::test]
async fn callback_without_code_is_refused() {
    let app = init_app!(oauth_state());

    let req = test::TestRequest::get().uri("/auth/google").to_request();
    let resp = test::call_service(&app, req).await;
    let cookie = support::session_cookie(&resp).unwrap();
    let state = query_of(&support::location(&resp))["state"].clone();

    let req = test::TestRequest::get()
        .uri(&format!("/auth/google/callback?state={}", state))
        .cookie(cookie)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(query_of(&support::location(&resp))["error"], "missing_code");
}

#[actix_web::test]
async fn provider_error_is_forwarded_to_login() {
    let app = init_app!(oauth_state());

    let req = test::TestRequest::get()
        .uri("/auth/google/callback?error=access_denied")
        .to_request();
    let resp = test::call_service(&app, req).await;
    let params = query_of(&support::location(&resp));
    assert_eq!(params["error"], "access_denied");
    assert_eq!(params["error_description"], "access_denied");
}

#[actix_web::test]
async fn health_reports_configured_oauth() {
    let app = init_app!(oauth_state());

    let req = test::TestRequest::get().uri("/api/health").to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["oauth_configured"], true);
}
