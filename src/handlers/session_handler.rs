use actix_session::Session;
use actix_web::{web, HttpResponse};
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::i18n;
use crate::models::language::Language;
use crate::models::user_session::UserSession;
use crate::routes::app_state::AppState;

pub const USER_KEY: &str = "user";
pub const LANGUAGE_KEY: &str = "language";
pub const CONVERSATION_KEY: &str = "conversation_id";
pub const OAUTH_STATE_KEY: &str = "oauth_state";

pub fn current_user(session: &Session) -> Option<UserSession> {
    match session.get::<UserSession>(USER_KEY) {
        Ok(user) => user,
        Err(e) => {
            warn!("Discarding unreadable user in session: {}", e);
            None
        }
    }
}

pub fn store_user(session: &Session, user: &UserSession) -> Result<(), actix_session::SessionInsertError> {
    session.renew();
    session.insert(USER_KEY, user)
}

pub fn language(session: &Session) -> Language {
    session
        .get::<Language>(LANGUAGE_KEY)
        .ok()
        .flatten()
        .unwrap_or_default()
}

/// Id of this browser's conversation, created on first use.
pub fn conversation_id(session: &Session) -> Result<String, actix_session::SessionInsertError> {
    if let Ok(Some(id)) = session.get::<String>(CONVERSATION_KEY) {
        return Ok(id);
    }
    let id = Uuid::new_v4().to_string();
    session.insert(CONVERSATION_KEY, &id)?;
    info!("Stored conversation id {} in cookie", id);
    Ok(id)
}

/// The signed-in user, or the 401 body every `/api` route answers without one.
pub fn require_user(session: &Session) -> Result<UserSession, HttpResponse> {
    current_user(session).ok_or_else(|| {
        HttpResponse::Unauthorized().json(json!({
            "status": "error",
            "message": i18n::login_required(language(session)),
        }))
    })
}

/// `/api/user` body: the stored user plus the language the page should start in.
#[derive(Debug, Serialize)]
struct UserResponse {
    #[serde(flatten)]
    user: UserSession,
    language: Language,
}

pub async fn get_user(session: Session) -> HttpResponse {
    match require_user(&session) {
        Ok(user) => HttpResponse::Ok().json(UserResponse {
            user,
            language: language(&session),
        }),
        Err(resp) => resp,
    }
}

#[derive(Debug, Deserialize)]
pub struct LanguageRequest {
    #[serde(default)]
    pub language: Option<String>,
}

pub async fn set_language(session: Session, body: web::Json<LanguageRequest>) -> HttpResponse {
    if let Err(resp) = require_user(&session) {
        return resp;
    }

    let requested = body.language.as_deref().unwrap_or("ca");
    let language = match requested.parse::<Language>() {
        Ok(language) => language,
        Err(e) => {
            return HttpResponse::BadRequest().json(json!({
                "status": "error",
                "error": e.to_string(),
            }))
        }
    };

    match session.insert(LANGUAGE_KEY, language) {
        Ok(()) => HttpResponse::Ok().json(json!({
            "status": "success",
            "language": language,
        })),
        Err(e) => {
            error!("Error setting language: {}", e);
            HttpResponse::InternalServerError().json(json!({
                "status": "error",
                "error": e.to_string(),
            }))
        }
    }
}

pub async fn logout(data: web::Data<AppState>, session: Session) -> HttpResponse {
    if let Ok(Some(id)) = session.get::<String>(CONVERSATION_KEY) {
        data.bot.end_conversation(&id);
    }
    if let Some(user) = current_user(&session) {
        info!("User {} logged out", user.email);
    }
    session.purge();
    HttpResponse::Found()
        .append_header(("Location", "/login"))
        .finish()
}
