use actix_web::http::StatusCode;
use actix_web::test;
use serde_json::{json, Value};

use riquer_chat::i18n;
use riquer_chat::models::language::Language;

use crate::support::{self, RecordingMailer, ScriptedModel};

#[actix_web::test]
async fn user_endpoint_returns_session_user() {
    let app = init_app!(support::state(ScriptedModel::new(vec![]), RecordingMailer::working()));
    let cookie = login!(app);

    let req = test::TestRequest::get().uri("/api/user").cookie(cookie).to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["email"], support::USER_EMAIL);
    assert_eq!(body["name"], support::USER_NAME);
    assert_eq!(body["language"], "ca");
}

#[actix_web::test]
async fn user_endpoint_reports_stored_language() {
    let app = init_app!(support::state(ScriptedModel::new(vec![]), RecordingMailer::working()));
    let cookie = login!(app);

    let req = test::TestRequest::post()
        .uri("/api/language")
        .cookie(cookie)
        .set_json(json!({ "language": "es" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let cookie = support::session_cookie(&resp).expect("language is stored in the cookie");

    let req = test::TestRequest::get().uri("/api/user").cookie(cookie).to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["language"], "es");
    assert_eq!(body["email"], support::USER_EMAIL);
}

#[actix_web::test]
async fn chosen_language_applies_to_later_replies() {
    let app = init_app!(support::state(ScriptedModel::new(vec![]), RecordingMailer::working()));
    let cookie = login!(app);

    let req = test::TestRequest::post()
        .uri("/api/language")
        .cookie(cookie)
        .set_json(json!({ "language": "ar" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let cookie = support::session_cookie(&resp).expect("language is stored in the cookie");
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["language"], "ar");

    let req = test::TestRequest::post()
        .uri("/api/chat")
        .cookie(cookie)
        .set_json(json!({ "message": "Justificar falta - Alumne: Pau Serra" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["response"], i18n::complete_required_fields(Language::Ar));
}

#[actix_web::test]
async fn unsupported_language_is_rejected() {
    let app = init_app!(support::state(ScriptedModel::new(vec![]), RecordingMailer::working()));
    let cookie = login!(app);

    let req = test::TestRequest::post()
        .uri("/api/language")
        .cookie(cookie)
        .set_json(json!({ "language": "fr" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "error");
}

#[actix_web::test]
async fn teachers_are_listed() {
    let app = init_app!(support::state(ScriptedModel::new(vec![]), RecordingMailer::working()));
    let cookie = login!(app);

    let req = test::TestRequest::get().uri("/api/teachers").cookie(cookie).to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["status"], "success");
    let teachers = body["teachers"].as_array().unwrap();
    assert_eq!(teachers.len(), 4);
    assert!(teachers
        .iter()
        .any(|t| t["name"] == "Anna Bresolí" && t["email"] == "anna.bresoli@inscalaf.cat"));
}

#[actix_web::test]
async fn health_is_public_and_reports_bot_status() {
    let app = init_app!(support::state(ScriptedModel::new(vec![]), RecordingMailer::working()));

    let req = test::TestRequest::get().uri("/api/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "Riquer Chat Bot");
    assert_eq!(body["oauth_configured"], false);
    assert_eq!(body["bot_initialized"], true);
    assert_eq!(body["bot"]["files_loaded"], 1);
    assert_eq!(body["bot"]["mailgun_configured"], true);
    assert_eq!(body["bot"]["total_requests"], 0);
}

#[actix_web::test]
async fn logout_drops_conversation_and_redirects() {
    let state = support::state(ScriptedModel::new(vec![]), RecordingMailer::working());
    let bot = state.bot.clone();
    let app = init_app!(state);
    let cookie = login!(app);

    let req = test::TestRequest::post()
        .uri("/api/chat")
        .cookie(cookie)
        .set_json(json!({ "message": "Hola" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let cookie = support::session_cookie(&resp).unwrap();
    assert_eq!(bot.conversations().len(), 1);

    let req = test::TestRequest::get().uri("/logout").cookie(cookie).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(support::location(&resp), "/login");
    assert!(bot.conversations().is_empty());
}

#[actix_web::test]
async fn anonymous_pages_redirect_to_login() {
    let app = init_app!(support::state(ScriptedModel::new(vec![]), RecordingMailer::working()));

    for uri in ["/", "/no-such-page"] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FOUND, "{}", uri);
        assert_eq!(support::location(&resp), "/login", "{}", uri);
    }
}

#[actix_web::test]
async fn index_is_served_after_login() {
    let app = init_app!(support::state(ScriptedModel::new(vec![]), RecordingMailer::working()));
    let cookie = login!(app);

    let req = test::TestRequest::get().uri("/").cookie(cookie).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body = test::read_body(resp).await;
    let page = String::from_utf8_lossy(&body);
    assert!(page.contains("/api/chat"));
    assert!(page.contains("/api/forms/absence"));
    assert!(page.contains("/api/forms/teacher"));
    assert!(page.contains("/api/teachers"));
}
