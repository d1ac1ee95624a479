use actix_session::Session;
use actix_web::{post, web, Responder};

use crate::handlers::chat_handler::{self, ChatRequest};
use crate::models::form::{AbsenceRequest, TeacherContactRequest};
use crate::routes::app_state::AppState;

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(chat)
        .service(absence_form)
        .service(teacher_form);
}

#[post("/api/chat")]
async fn chat(
    data: web::Data<AppState>,
    session: Session,
    req_body: web::Json<ChatRequest>,
) -> impl Responder {
    chat_handler::handle_chat_request(data, session, req_body).await
}

#[post("/api/forms/absence")]
async fn absence_form(
    data: web::Data<AppState>,
    session: Session,
    req_body: web::Json<AbsenceRequest>,
) -> impl Responder {
    chat_handler::submit_absence(data, session, req_body).await
}

#[post("/api/forms/teacher")]
async fn teacher_form(
    data: web::Data<AppState>,
    session: Session,
    req_body: web::Json<TeacherContactRequest>,
) -> impl Responder {
    chat_handler::submit_teacher_contact(data, session, req_body).await
}
