use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use actix_session::Session;
use actix_web::cookie::Cookie;
use actix_web::dev::ServiceResponse;
use actix_web::HttpResponse;
use async_trait::async_trait;

use riquer_chat::config::Config;
use riquer_chat::handlers::session_handler;
use riquer_chat::models::chat_message::ChatMessage;
use riquer_chat::models::user_session::UserSession;
use riquer_chat::routes::app_state::AppState;
use riquer_chat::routes::SESSION_COOKIE;
use riquer_chat::services::chat_service::ChatBot;
use riquer_chat::services::document_service::{DocumentSet, LoadedDocument};
use riquer_chat::services::llm_service::{ChatModel, LlmError};
use riquer_chat::services::mail_service::{MailTransport, OutgoingMail, SendReport};
use riquer_chat::services::oauth_service::GoogleOAuth;
use riquer_chat::services::retry::RetryPolicy;

pub const USER_EMAIL: &str = "marta.puig@example.org";
pub const USER_NAME: &str = "Marta Puig";

/// Answers from a queue, then with a fixed reply once the queue is empty.
pub struct ScriptedModel {
    replies: Mutex<VecDeque<Result<String, LlmError>>>,
    calls: AtomicUsize,
    last_request: Mutex<Vec<ChatMessage>>,
}

impl ScriptedModel {
    pub fn new(replies: Vec<Result<String, LlmError>>) -> Arc<Self> {
        Arc::new(ScriptedModel {
            replies: Mutex::new(replies.into()),
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Vec<ChatMessage> {
        self.last_request.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    async fn generate(&self, history: &[ChatMessage]) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = history.to_vec();
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok("D'acord.".to_string()))
    }

    fn is_configured(&self) -> bool {
        true
    }
}

pub fn rate_limited() -> LlmError {
    LlmError::Api {
        status: 429,
        message: "RESOURCE_EXHAUSTED: quota exceeded".to_string(),
    }
}

pub struct RecordingMailer {
    sent: Mutex<Vec<OutgoingMail>>,
    fail: bool,
}

impl RecordingMailer {
    pub fn working() -> Arc<Self> {
        Arc::new(RecordingMailer {
            sent: Mutex::new(Vec::new()),
            fail: false,
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(RecordingMailer {
            sent: Mutex::new(Vec::new()),
            fail: true,
        })
    }

    pub fn sent(&self) -> Vec<OutgoingMail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl MailTransport for RecordingMailer {
    async fn send(&self, mail: &OutgoingMail) -> SendReport {
        self.sent.lock().unwrap().push(mail.clone());
        if self.fail {
            return SendReport::error("Mailgun returned 401");
        }
        SendReport::Success {
            subject: mail.subject.clone(),
            body: mail.body.clone(),
            sender: "riquer@inscalaf.cat".to_string(),
            recipients: mail.recipients.clone(),
        }
    }

    fn is_configured(&self) -> bool {
        true
    }
}

pub fn test_config() -> Config {
    Config {
        retry: RetryPolicy {
            initial_delay: Duration::ZERO,
            max_jitter: Duration::ZERO,
            ..RetryPolicy::default()
        },
        ..Config::default()
    }
}

pub fn documents() -> DocumentSet {
    DocumentSet {
        documents: vec![LoadedDocument {
            index: 1,
            url: "https://docs.example.org/horaris".to_string(),
            content: "Horari lectiu: de 8:00 a 14:30.".to_string(),
        }],
        attempted: 2,
    }
}

pub fn state(model: Arc<ScriptedModel>, mailer: Arc<RecordingMailer>) -> AppState {
    state_with(test_config(), model, mailer)
}

pub fn state_with(config: Config, model: Arc<ScriptedModel>, mailer: Arc<RecordingMailer>) -> AppState {
    let bot = ChatBot::new(&config, model, mailer, documents());
    let oauth = GoogleOAuth::from_config(&config).unwrap();
    AppState {
        bot: Arc::new(bot),
        oauth,
        config: Arc::new(config),
    }
}

pub async fn test_login(session: Session) -> HttpResponse {
    let user = UserSession {
        email: USER_EMAIL.to_string(),
        name: USER_NAME.to_string(),
        picture: String::new(),
        given_name: "Marta".to_string(),
        locale: Some("ca".to_string()),
    };
    match session_handler::store_user(&session, &user) {
        Ok(()) => HttpResponse::Ok().finish(),
        Err(e) => HttpResponse::InternalServerError().body(e.to_string()),
    }
}

pub fn session_cookie<B>(resp: &ServiceResponse<B>) -> Option<Cookie<'static>> {
    resp.response()
        .cookies()
        .find(|c| c.name() == SESSION_COOKIE)
        .map(|c| c.into_owned())
}

pub fn location<B>(resp: &ServiceResponse<B>) -> String {
    resp.headers()
        .get("Location")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}
