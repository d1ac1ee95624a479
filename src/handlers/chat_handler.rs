use actix_session::Session;
use actix_web::{web, HttpResponse};
use log::{error, info, warn};
use serde::Deserialize;
use serde_json::json;

use crate::handlers::session_handler::{self, require_user};
use crate::i18n;
use crate::models::form::{AbsenceRequest, TeacherContactRequest};
use crate::models::language::Language;
use crate::routes::app_state::AppState;
use crate::services::chat_service::FormOutcome;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
}

/// An explicit language in the body wins over the one stored in the session.
fn request_language(session: &Session, requested: Option<&str>) -> Language {
    match requested.map(str::parse::<Language>) {
        Some(Ok(language)) => language,
        Some(Err(e)) => {
            warn!("{}; using session language", e);
            session_handler::language(session)
        }
        None => session_handler::language(session),
    }
}

pub async fn handle_chat_request(
    data: web::Data<AppState>,
    session: Session,
    req_body: web::Json<ChatRequest>,
) -> HttpResponse {
    let user = match require_user(&session) {
        Ok(user) => user,
        Err(resp) => return resp,
    };
    let lang = request_language(&session, req_body.language.as_deref());

    let message = req_body.message.trim();
    if message.is_empty() {
        return HttpResponse::BadRequest().json(json!({
            "status": "error",
            "message": i18n::chat_request_failed(lang),
            "error": "Empty message",
        }));
    }

    let conversation_id = match session_handler::conversation_id(&session) {
        Ok(id) => id,
        Err(e) => {
            error!("Error in /api/chat: {}", e);
            return HttpResponse::InternalServerError().json(json!({
                "status": "error",
                "message": i18n::chat_request_failed(lang),
                "error": e.to_string(),
            }));
        }
    };

    info!("Processing message for {} ({})", user.email, conversation_id);
    let response = data
        .bot
        .process_message(&conversation_id, message, &user.to_context(), lang)
        .await;

    HttpResponse::Ok().json(json!({
        "status": "success",
        "response": response,
        "timestamp": req_body.timestamp.clone().unwrap_or_default(),
    }))
}

/// Mail failures still answer 200: the reply carries the alternative contact instructions.
fn form_response(outcome: FormOutcome) -> HttpResponse {
    let status = if outcome.sent { "success" } else { "error" };
    HttpResponse::Ok().json(json!({ "status": status, "response": outcome.message }))
}

pub async fn submit_absence(
    data: web::Data<AppState>,
    session: Session,
    req_body: web::Json<AbsenceRequest>,
) -> HttpResponse {
    let user = match require_user(&session) {
        Ok(user) => user,
        Err(resp) => return resp,
    };
    let lang = session_handler::language(&session);
    let request = req_body.into_inner().normalized();

    if let Err(missing) = request.validate() {
        return HttpResponse::UnprocessableEntity().json(json!({
            "status": "error",
            "response": i18n::complete_required_fields(lang),
            "error": missing.to_string(),
        }));
    }

    let outcome = data.bot.submit_absence(&request, &user.to_context(), lang).await;
    form_response(outcome)
}

pub async fn submit_teacher_contact(
    data: web::Data<AppState>,
    session: Session,
    req_body: web::Json<TeacherContactRequest>,
) -> HttpResponse {
    let user = match require_user(&session) {
        Ok(user) => user,
        Err(resp) => return resp,
    };
    let lang = session_handler::language(&session);
    let request = req_body.into_inner().normalized();

    if let Err(missing) = request.validate() {
        return HttpResponse::UnprocessableEntity().json(json!({
            "status": "error",
            "response": i18n::complete_required_fields(lang),
            "error": missing.to_string(),
        }));
    }

    let outcome = data
        .bot
        .submit_teacher_contact(&request, &user.to_context(), lang)
        .await;
    form_response(outcome)
}
