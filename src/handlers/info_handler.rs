use std::path::Path;

use actix_files::NamedFile;
use actix_session::Session;
use actix_web::{web, HttpRequest, HttpResponse};
use log::error;
use serde_json::json;

use crate::config;
use crate::handlers::session_handler::{self, require_user};
use crate::routes::app_state::AppState;

/// The chat page for signed-in users; everyone else goes to `/login`.
pub async fn index(data: web::Data<AppState>, session: Session, req: HttpRequest) -> HttpResponse {
    if session_handler::current_user(&session).is_none() {
        return HttpResponse::Found()
            .append_header(("Location", "/login"))
            .finish();
    }

    let path = Path::new(&data.config.static_dir).join("index.html");
    match NamedFile::open_async(&path).await {
        Ok(file) => file.into_response(&req),
        Err(e) => {
            error!("Could not open {}: {}", path.display(), e);
            HttpResponse::InternalServerError().body("index.html not found")
        }
    }
}

pub async fn teachers(data: web::Data<AppState>, session: Session) -> HttpResponse {
    if let Err(resp) = require_user(&session) {
        return resp;
    }
    HttpResponse::Ok().json(json!({
        "status": "success",
        "teachers": data.bot.teachers(),
    }))
}

pub async fn health(data: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "service": config::SERVICE_NAME,
        "oauth_configured": data.config.oauth_configured(),
        "bot_initialized": true,
        "bot": data.bot.status(),
    }))
}
