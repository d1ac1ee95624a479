use std::sync::Arc;

use actix_web::{middleware::Logger, web, App, HttpServer};
use log::info;

use riquer_chat::config::{self, Config};
use riquer_chat::routes::{self, app_state::AppState};
use riquer_chat::services::chat_service::ChatBot;
use riquer_chat::services::document_service::{load_documents, HttpFetcher};
use riquer_chat::services::llm_service::{ChatModel, GeminiClient};
use riquer_chat::services::mail_service::{MailTransport, MailgunMailer};
use riquer_chat::services::oauth_service::GoogleOAuth;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    config::init_logging();

    let config = Config::from_env();
    config.report_missing();

    let documents = load_documents(&HttpFetcher::new(), &config.document_urls).await;
    let model: Arc<dyn ChatModel> = Arc::new(GeminiClient::from_config(&config));
    let mailer: Arc<dyn MailTransport> = Arc::new(MailgunMailer::from_config(&config));
    let bot = Arc::new(ChatBot::new(&config, model, mailer, documents));
    let oauth = GoogleOAuth::from_config(&config)?;

    let key = routes::session_key(config.secret_key.as_deref());
    let secure_cookies = config
        .public_base_url
        .as_deref()
        .is_some_and(|url| url.starts_with("https://"));
    let port = config.port;

    let state = AppState {
        bot,
        oauth,
        config: Arc::new(config),
    };

    info!("Starting {} on http://0.0.0.0:{}", config::SERVICE_NAME, port);
    HttpServer::new(move || {
        let static_dir = state.config.static_dir.clone();
        App::new()
            .wrap(routes::session_middleware(key.clone(), secure_cookies))
            .wrap(Logger::default())
            .app_data(web::Data::new(state.clone()))
            .configure(|cfg| routes::configure(cfg, &static_dir))
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await?;

    Ok(())
}
