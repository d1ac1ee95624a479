use actix_files::Files;
use actix_session::storage::CookieSessionStore;
use actix_session::SessionMiddleware;
use actix_web::cookie::Key;
use actix_web::{error, web, HttpResponse};
use log::warn;
use serde_json::json;

pub mod app_state;
pub mod chat_routes;
pub mod info_routes;
pub mod oauth_routes;
pub mod session_routes;

pub const SESSION_COOKIE: &str = "riquer_session";

/// Every route of the app plus `/static` and the catch-all redirect to `/login`.
pub fn configure(cfg: &mut web::ServiceConfig, static_dir: &str) {
    cfg.app_data(json_config());
    oauth_routes::init_routes(cfg);
    session_routes::init_routes(cfg);
    chat_routes::init_routes(cfg);
    info_routes::init_routes(cfg);
    cfg.service(Files::new("/static", static_dir))
        .default_service(web::to(|| async {
            HttpResponse::Found()
                .append_header(("Location", "/login"))
                .finish()
        }));
}

/// Malformed JSON bodies get the same error envelope as the handlers.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let response = HttpResponse::BadRequest().json(json!({
            "status": "error",
            "error": err.to_string(),
        }));
        error::InternalError::from_response(err, response).into()
    })
}

/// Signing/encryption key for the session cookie.
///
/// A `SECRET_KEY` shorter than 32 bytes cannot seed a key, so a random one is
/// used and sessions do not survive a restart.
pub fn session_key(secret: Option<&str>) -> Key {
    match secret {
        Some(secret) if secret.len() >= 32 => Key::derive_from(secret.as_bytes()),
        Some(_) => {
            warn!("SECRET_KEY is shorter than 32 bytes; using a random session key");
            Key::generate()
        }
        None => {
            warn!("SECRET_KEY is not set; using a random session key");
            Key::generate()
        }
    }
}

pub fn session_middleware(key: Key, secure: bool) -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name(SESSION_COOKIE.to_string())
        .cookie_secure(secure)
        .build()
}
