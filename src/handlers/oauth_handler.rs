use actix_session::Session;
use actix_web::{web, HttpRequest, HttpResponse};
use log::{error, info, warn};
use serde::Deserialize;
use url::form_urlencoded;

use crate::config::{self, Config};
use crate::handlers::session_handler::{self, OAUTH_STATE_KEY};
use crate::i18n;
use crate::models::language::Language;
use crate::routes::app_state::AppState;
use crate::services::oauth_service::OAuthFlowError;

pub const CALLBACK_PATH: &str = "/auth/google/callback";

#[derive(Debug, Default, Deserialize)]
pub struct LoginQuery {
    pub error: Option<String>,
    pub error_description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// Absolute callback URL registered with Google.
///
/// `PUBLIC_BASE_URL` wins; otherwise the scheme and host come from the
/// request, which honours `Forwarded` / `X-Forwarded-*` behind a proxy.
pub fn redirect_uri(config: &Config, req: &HttpRequest) -> String {
    match &config.public_base_url {
        Some(base) => format!("{}{}", base, CALLBACK_PATH),
        None => {
            let info = req.connection_info();
            format!("{}://{}{}", info.scheme(), info.host(), CALLBACK_PATH)
        }
    }
}

fn redirect(location: &str) -> HttpResponse {
    HttpResponse::Found()
        .append_header(("Location", location))
        .finish()
}

/// `/login?error=<code>&error_description=<text>`
pub fn login_error_location(code: &str, description: &str) -> String {
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("error", code)
        .append_pair("error_description", description)
        .finish();
    format!("/login?{}", query)
}

fn login_error(err: &OAuthFlowError) -> HttpResponse {
    warn!("Google login failed: {}", err);
    redirect(&login_error_location(err.code(), &err.to_string()))
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

pub fn render_login_page(query: &LoginQuery, oauth_configured: bool, lang: Language) -> String {
    let error_block = match (&query.error, &query.error_description) {
        (None, None) => String::new(),
        (code, description) => {
            let text = description
                .as_deref()
                .or(code.as_deref())
                .unwrap_or_default();
            format!(
                r#"<div class="error">{}</div>"#,
                escape_html(&i18n::login_error(lang, text))
            )
        }
    };
    let label = escape_html(&i18n::login_button(lang));
    let (warning_block, button) = if oauth_configured {
        (
            String::new(),
            format!(r#"<a class="google-btn" href="/auth/google">{}</a>"#, label),
        )
    } else {
        (
            format!(
                r#"<div class="warning">{}</div>"#,
                escape_html(&i18n::login_unavailable(lang))
            ),
            format!(r#"<button class="google-btn" disabled>{}</button>"#, label),
        )
    };
    let dir = if lang == Language::Ar { "rtl" } else { "ltr" };

    format!(
        r#"<!DOCTYPE html>
<html lang="{code}" dir="{dir}">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{school} - Riquer</title>
<style>
body {{ font-family: sans-serif; background: #f4f6f8; display: flex; justify-content: center; align-items: center; min-height: 100vh; margin: 0; }}
.card {{ background: #fff; padding: 2rem 2.5rem; border-radius: 12px; box-shadow: 0 2px 12px rgba(0,0,0,.08); max-width: 380px; text-align: center; }}
.error {{ background: #fdecea; color: #a12622; padding: .75rem; border-radius: 8px; margin-bottom: 1rem; }}
.warning {{ background: #fff4e5; color: #8a5300; padding: .75rem; border-radius: 8px; margin-bottom: 1rem; }}
.google-btn {{ display: inline-block; padding: .75rem 1.5rem; border-radius: 8px; background: #1a73e8; color: #fff; text-decoration: none; border: none; font-size: 1rem; }}
.google-btn[disabled] {{ background: #9aa0a6; }}
</style>
</head>
<body>
<div class="card">
<h1>Riquer</h1>
<p>{subtitle}</p>
{error}{warning}{button}
</div>
</body>
</html>"#,
        code = lang.code(),
        dir = dir,
        school = config::SCHOOL_NAME,
        subtitle = escape_html(&i18n::login_subtitle(lang)),
        error = error_block,
        warning = warning_block,
        button = button,
    )
}

pub async fn login_page(
    data: web::Data<AppState>,
    session: Session,
    query: web::Query<LoginQuery>,
) -> HttpResponse {
    if session_handler::current_user(&session).is_some() {
        return redirect("/");
    }
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(render_login_page(
            &query,
            data.oauth.is_some(),
            session_handler::language(&session),
        ))
}

pub async fn google_auth(data: web::Data<AppState>, session: Session, req: HttpRequest) -> HttpResponse {
    let Some(oauth) = &data.oauth else {
        return login_error(&OAuthFlowError::NotConfigured);
    };

    let callback = redirect_uri(&data.config, &req);
    let (auth_url, state) = match oauth.authorize_url(&callback) {
        Ok(pair) => pair,
        Err(e) => return login_error(&e),
    };

    if let Err(e) = session.insert(OAUTH_STATE_KEY, state.secret()) {
        error!("Could not store OAuth state: {}", e);
        return redirect(&login_error_location("oauth_init_error", &e.to_string()));
    }

    info!("Redirecting to Google with callback {}", callback);
    redirect(&auth_url)
}

pub async fn google_callback(
    data: web::Data<AppState>,
    session: Session,
    req: HttpRequest,
    query: web::Query<CallbackQuery>,
) -> HttpResponse {
    if let Some(code) = &query.error {
        warn!("Google returned an OAuth error: {}", code);
        let description = query.error_description.as_deref().unwrap_or(code);
        return redirect(&login_error_location(code, description));
    }

    let Some(oauth) = &data.oauth else {
        return login_error(&OAuthFlowError::NotConfigured);
    };

    let expected = session.get::<String>(OAUTH_STATE_KEY).ok().flatten();
    session.remove(OAUTH_STATE_KEY);
    match (&expected, &query.state) {
        (Some(expected), Some(received)) if expected == received => {}
        _ => return login_error(&OAuthFlowError::StateMismatch),
    }

    let Some(code) = query.code.as_deref().filter(|c| !c.is_empty()) else {
        return login_error(&OAuthFlowError::MissingCode);
    };

    let callback = redirect_uri(&data.config, &req);
    let user = match oauth.exchange(code, &callback).await {
        Ok(user) => user,
        Err(e) => return login_error(&e),
    };

    if let Err(e) = session_handler::store_user(&session, &user) {
        error!("Could not store user session: {}", e);
        return redirect(&login_error_location("callback_error", &e.to_string()));
    }

    info!("User {} signed in", user.email);
    redirect("/")
}
