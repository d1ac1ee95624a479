use actix_web::http::StatusCode;
use actix_web::test;
use serde_json::{json, Value};

use riquer_chat::i18n;
use riquer_chat::models::chat_message::Role;
use riquer_chat::models::language::Language;

use crate::support::{self, rate_limited, RecordingMailer, ScriptedModel};

#[actix_web::test]
async fn chat_requires_login() {
    let app = init_app!(support::state(ScriptedModel::new(vec![]), RecordingMailer::working()));

    let req = test::TestRequest::post()
        .uri("/api/chat")
        .set_json(json!({ "message": "Hola" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "error");
    assert_eq!(body["message"], i18n::login_required(Language::Ca));
}

#[actix_web::test]
async fn question_is_answered_by_model_with_institute_context() {
    let model = ScriptedModel::new(vec![Ok("**Horari**: de 8:00 a 14:30.".to_string())]);
    let app = init_app!(support::state(model.clone(), RecordingMailer::working()));
    let cookie = login!(app);

    let req = test::TestRequest::post()
        .uri("/api/chat")
        .cookie(cookie)
        .set_json(json!({ "message": "Quin és l'horari?", "timestamp": "10:15" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["status"], "success");
    assert_eq!(body["response"], "Horari: de 8:00 a 14:30.");
    assert_eq!(body["timestamp"], "10:15");
    assert_eq!(model.calls(), 1);

    let sent = model.last_request();
    assert_eq!(sent.len(), 3);
    assert_eq!(sent[0].role, Role::User);
    assert!(sent[0].text.contains("--- Document 1 ---"));
    assert_eq!(sent[1].role, Role::Model);
    assert!(sent[2].text.contains("User: Marta Puig"));
    assert!(sent[2].text.contains("Question: Quin és l'horari?"));
    assert!(sent[2].text.contains("català"));
}

#[actix_web::test]
async fn follow_up_questions_share_history() {
    let model = ScriptedModel::new(vec![Ok("Primera".to_string()), Ok("Segona".to_string())]);
    let app = init_app!(support::state(model.clone(), RecordingMailer::working()));
    let cookie = login!(app);

    let req = test::TestRequest::post()
        .uri("/api/chat")
        .cookie(cookie)
        .set_json(json!({ "message": "Quan comencen les classes?" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let cookie = support::session_cookie(&resp).expect("conversation id is stored in the cookie");

    let req = test::TestRequest::post()
        .uri("/api/chat")
        .cookie(cookie)
        .set_json(json!({ "message": "I quan acaben?" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["response"], "Segona");

    let sent = model.last_request();
    assert_eq!(sent.len(), 5);
    assert_eq!(sent[3].text, "Primera");
}

#[actix_web::test]
async fn teacher_contact_form_is_mailed_without_calling_model() {
    let model = ScriptedModel::new(vec![]);
    let mailer = RecordingMailer::working();
    let app = init_app!(support::state(model.clone(), mailer.clone()));
    let cookie = login!(app);

    let req = test::TestRequest::post()
        .uri("/api/chat")
        .cookie(cookie)
        .set_json(json!({
            "message": "Contactar professor Anna Bresolí - Assumpte: consulta, Missatge: Hola"
        }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["status"], "success");
    assert!(body["response"]
        .as_str()
        .unwrap()
        .contains("anna.bresoli@inscalaf.cat"));
    assert_eq!(model.calls(), 0);

    let sent = mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].recipients, vec!["anna.bresoli@inscalaf.cat".to_string()]);
    assert_eq!(sent[0].subject, "consulta - Marta Puig");
    assert!(sent[0].body.contains("Hola"));
    assert!(sent[0].body.contains(support::USER_EMAIL));
}

#[actix_web::test]
async fn incomplete_absence_form_asks_for_missing_fields() {
    let model = ScriptedModel::new(vec![]);
    let mailer = RecordingMailer::working();
    let app = init_app!(support::state(model.clone(), mailer.clone()));
    let cookie = login!(app);

    let req = test::TestRequest::post()
        .uri("/api/chat")
        .cookie(cookie)
        .set_json(json!({
            "message": "Justificar falta - Alumne: Pau Serra, Curs: 2n ESO",
            "language": "es"
        }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["response"], i18n::complete_required_fields(Language::Es));
    assert!(mailer.sent().is_empty());
    assert_eq!(model.calls(), 0);
}

#[actix_web::test]
async fn persistent_rate_limit_returns_busy_message() {
    let model = ScriptedModel::new(vec![Err(rate_limited()), Err(rate_limited())]);
    let app = init_app!(support::state(model.clone(), RecordingMailer::working()));
    let cookie = login!(app);

    let req = test::TestRequest::post()
        .uri("/api/chat")
        .cookie(cookie)
        .set_json(json!({ "message": "Hi ha menjador?" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["status"], "success");
    assert_eq!(body["response"], i18n::system_busy(Language::Ca));
    assert_eq!(model.calls(), 2);
}

#[actix_web::test]
async fn rate_limit_then_success_returns_answer() {
    let model = ScriptedModel::new(vec![Err(rate_limited()), Ok("Sí, hi ha menjador.".to_string())]);
    let app = init_app!(support::state(model.clone(), RecordingMailer::working()));
    let cookie = login!(app);

    let req = test::TestRequest::post()
        .uri("/api/chat")
        .cookie(cookie)
        .set_json(json!({ "message": "Hi ha menjador?" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["response"], "Sí, hi ha menjador.");
    assert_eq!(model.calls(), 2);
}

#[actix_web::test]
async fn upstream_failure_returns_apology() {
    let model = ScriptedModel::new(vec![Err(riquer_chat::services::llm_service::LlmError::Api {
        status: 500,
        message: "internal".to_string(),
    })]);
    let app = init_app!(support::state(model.clone(), RecordingMailer::working()));
    let cookie = login!(app);

    let req = test::TestRequest::post()
        .uri("/api/chat")
        .cookie(cookie)
        .set_json(json!({ "message": "Hi ha menjador?" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["response"], i18n::processing_error(Language::Ca));
    assert_eq!(model.calls(), 1);
}

#[actix_web::test]
async fn empty_message_is_rejected() {
    let app = init_app!(support::state(ScriptedModel::new(vec![]), RecordingMailer::working()));
    let cookie = login!(app);

    let req = test::TestRequest::post()
        .uri("/api/chat")
        .cookie(cookie)
        .set_json(json!({ "message": "   " }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
