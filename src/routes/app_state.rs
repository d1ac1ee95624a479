use std::sync::Arc;

use crate::config::Config;
use crate::services::chat_service::ChatBot;
use crate::services::oauth_service::GoogleOAuth;

#[derive(Clone)]
pub struct AppState {
    pub bot: Arc<ChatBot>,
    /// `None` when Google credentials are missing; login is then disabled.
    pub oauth: Option<GoogleOAuth>,
    pub config: Arc<Config>,
}
