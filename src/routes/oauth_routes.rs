use actix_session::Session;
use actix_web::{get, web, HttpRequest, Responder};

use crate::handlers::oauth_handler::{self, CallbackQuery, LoginQuery};
use crate::routes::app_state::AppState;

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(login)
        .service(google_auth)
        .service(google_callback);
}

#[get("/login")]
async fn login(
    data: web::Data<AppState>,
    session: Session,
    query: web::Query<LoginQuery>,
) -> impl Responder {
    oauth_handler::login_page(data, session, query).await
}

#[get("/auth/google")]
async fn google_auth(data: web::Data<AppState>, session: Session, req: HttpRequest) -> impl Responder {
    oauth_handler::google_auth(data, session, req).await
}

#[get("/auth/google/callback")]
async fn google_callback(
    data: web::Data<AppState>,
    session: Session,
    req: HttpRequest,
    query: web::Query<CallbackQuery>,
) -> impl Responder {
    oauth_handler::google_callback(data, session, req, query).await
}
