use std::env;
use std::time::Duration;

use log::{info, warn};

use crate::services::retry::RetryPolicy;

pub fn init_logging() {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));
}

pub const SERVICE_NAME: &str = "Riquer Chat Bot";
pub const MODEL_NAME: &str = "gemini-2.5-flash";
pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com";
pub const MAILGUN_API_BASE: &str = "https://api.mailgun.net";
pub const DEFAULT_PORT: u16 = 8000;

pub const SCHOOL_NAME: &str = "Institut Alexandre de Riquer";
pub const SCHOOL_PHONE: &str = "93 868 04 14";
pub const SCHOOL_EMAIL_DOMAIN: &str = "inscalaf.cat";
pub const SCHOOL_SECRETARIAT_EMAIL: &str = "a8043395@xtec.cat";
pub const MAIL_SENDER_ADDRESS: &str = "riquer@inscalaf.cat";

pub const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const GOOGLE_USERINFO_URL: &str = "https://openidconnect.googleapis.com/v1/userinfo";

const DEFAULT_DOCUMENT_URLS: [&str; 5] = [
    "https://drive.google.com/uc?export=download&id=1-Stsv68nDGxH2kDy_idcGM6FoXYMO3I8",
    "https://drive.google.com/uc?export=download&id=1kOjm0jHpF-LqtXYC7uUC1HJAV7DQPBsy",
    "https://drive.google.com/uc?export=download&id=1iMfgjXLrn51EkYhCqMejJT7K5M5J5Ezy",
    "https://drive.google.com/uc?export=download&id=1N7Xpt9JSr1JPoIaju-ekIRW4NGVgPxMU",
    "https://drive.google.com/uc?export=download&id=1neJFgTH0GWO5HbL64V6Fro0r1SKw8mFw",
];

pub const SYSTEM_PROMPT: &str = "Ets Riquer, l'assistent virtual de l'Institut Alexandre de Riquer de Calaf.

Personalitat: amable, proper i eficient.

Què fas:
- Informes sobre l'institut: horaris, cursos, contactes.
- Per contactar un professor, suggereix el botó \"Sol·licitar reunió\".
- Per justificar una falta, suggereix el botó \"Justificar falta\".
- Resols dubtes acadèmics i administratius.

Contacte: C. Sant Joan Bta. de la Salle 6-8, 08280 Calaf. Telèfon 93 868 04 14. Correu a8043395@xtec.cat. Web inscalaf.cat.
Horaris: classes 8:00-14:35h; atenció de dilluns a divendres 8:00-14:00h; secretaria de dilluns a divendres 9:00-13:00h.
Cursos: ESO (1r-4t), Batxillerat (1r-2n), FP (grau mitjà i grau superior).

Normes:
- Respostes breus i clares.
- Fes servir només informació verificada dels arxius.
- Si no saps una cosa, digues-ho.
- No inventis informació ni parlis de temes aliens a l'institut.";

pub const MODEL_GREETING: &str = "Entès! Sóc Riquer, l'assistent virtual de l'Institut Alexandre de Riquer. \
He processat la informació de l'institut. En què et puc ajudar avui?";

pub const DOCUMENTS_UNAVAILABLE: &str = "No s'han pogut carregar els arxius de l'institut.";

/// Runtime configuration gathered from the environment (and `.env` when present).
///
/// Every secret is optional: a missing one disables the feature that needs it
/// instead of stopping the process.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub secret_key: Option<String>,
    pub public_base_url: Option<String>,
    pub google_client_id: Option<String>,
    pub google_client_secret: Option<String>,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub mailgun_api_key: Option<String>,
    pub mailgun_domain: Option<String>,
    pub document_urls: Vec<String>,
    pub absence_recipient: String,
    pub school_email_domain: String,
    pub static_dir: String,
    pub retry: RetryPolicy,
    pub conversation_idle: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: DEFAULT_PORT,
            secret_key: None,
            public_base_url: None,
            google_client_id: None,
            google_client_secret: None,
            gemini_api_key: None,
            gemini_model: MODEL_NAME.to_string(),
            mailgun_api_key: None,
            mailgun_domain: None,
            document_urls: DEFAULT_DOCUMENT_URLS.iter().map(|u| u.to_string()).collect(),
            absence_recipient: SCHOOL_SECRETARIAT_EMAIL.to_string(),
            school_email_domain: SCHOOL_EMAIL_DOMAIN.to_string(),
            static_dir: "./static".to_string(),
            retry: RetryPolicy::default(),
            conversation_idle: Duration::from_secs(2 * 60 * 60),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        if dotenv::dotenv().is_ok() {
            info!("Loaded environment from .env");
        }

        let defaults = Config::default();
        let port = match env::var("PORT") {
            Ok(raw) => raw.parse().unwrap_or_else(|_| {
                warn!("Invalid PORT value {:?}, using {}", raw, DEFAULT_PORT);
                DEFAULT_PORT
            }),
            Err(_) => DEFAULT_PORT,
        };

        let document_urls = non_empty_var("DOCUMENT_URLS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|u| !u.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or(defaults.document_urls);

        Config {
            port,
            secret_key: non_empty_var("SECRET_KEY"),
            public_base_url: non_empty_var("PUBLIC_BASE_URL")
                .map(|u| u.trim_end_matches('/').to_string()),
            google_client_id: non_empty_var("GOOGLE_CLIENT_ID"),
            google_client_secret: non_empty_var("GOOGLE_CLIENT_SECRET"),
            gemini_api_key: non_empty_var("API_GEMINI"),
            gemini_model: non_empty_var("GEMINI_MODEL").unwrap_or(defaults.gemini_model),
            mailgun_api_key: non_empty_var("MAILGUN_API_KEY"),
            mailgun_domain: non_empty_var("MAILGUN_DOMAIN"),
            document_urls,
            absence_recipient: non_empty_var("ABSENCE_RECIPIENT")
                .unwrap_or(defaults.absence_recipient),
            school_email_domain: non_empty_var("SCHOOL_EMAIL_DOMAIN")
                .unwrap_or(defaults.school_email_domain),
            static_dir: non_empty_var("STATIC_DIR").unwrap_or(defaults.static_dir),
            ..defaults
        }
    }

    pub fn oauth_configured(&self) -> bool {
        self.google_client_id.is_some() && self.google_client_secret.is_some()
    }

    pub fn mailgun_configured(&self) -> bool {
        self.mailgun_api_key.is_some() && self.mailgun_domain.is_some()
    }

    /// Logs one warning per missing secret so a half-configured deploy is obvious at startup.
    pub fn report_missing(&self) {
        if self.google_client_id.is_none() {
            warn!("GOOGLE_CLIENT_ID is not set; Google login is disabled");
        }
        if self.google_client_secret.is_none() {
            warn!("GOOGLE_CLIENT_SECRET is not set; Google login is disabled");
        }
        if self.gemini_api_key.is_none() {
            warn!("API_GEMINI is not set; questions will not reach the model");
        }
        if !self.mailgun_configured() {
            warn!("MAILGUN_API_KEY or MAILGUN_DOMAIN is not set; form emails will fail");
        }
        if self.secret_key.is_none() {
            warn!("SECRET_KEY is not set; sessions will not survive a restart");
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
