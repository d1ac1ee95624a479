use actix_session::Session;
use actix_web::{get, web, HttpRequest, Responder};

use crate::handlers::info_handler;
use crate::routes::app_state::AppState;

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(index)
        .service(teachers)
        .service(health);
}

#[get("/")]
async fn index(data: web::Data<AppState>, session: Session, req: HttpRequest) -> impl Responder {
    info_handler::index(data, session, req).await
}

#[get("/api/teachers")]
async fn teachers(data: web::Data<AppState>, session: Session) -> impl Responder {
    info_handler::teachers(data, session).await
}

#[get("/api/health")]
async fn health(data: web::Data<AppState>) -> impl Responder {
    info_handler::health(data).await
}
