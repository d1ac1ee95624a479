use actix_session::Session;
use actix_web::{get, post, web, Responder};

use crate::handlers::session_handler::{self, LanguageRequest};
use crate::routes::app_state::AppState;

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(user)
        .service(language)
        .service(logout);
}

#[get("/api/user")]
async fn user(session: Session) -> impl Responder {
    session_handler::get_user(session).await
}

#[post("/api/language")]
async fn language(session: Session, body: web::Json<LanguageRequest>) -> impl Responder {
    session_handler::set_language(session, body).await
}

#[get("/logout")]
async fn logout(data: web::Data<AppState>, session: Session) -> impl Responder {
    session_handler::logout(data, session).await
}
