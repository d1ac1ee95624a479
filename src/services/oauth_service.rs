use std::time::Duration;

use log::{error, info};
use oauth2::basic::BasicClient;
use oauth2::reqwest::async_http_client;
use oauth2::{
    AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, RedirectUrl, Scope,
    TokenResponse, TokenUrl,
};

use crate::config::{self, Config};
use crate::models::user_session::{GoogleUserInfo, UserSession};

const SCOPES: [&str; 3] = ["openid", "email", "profile"];

#[derive(Debug, thiserror::Error)]
pub enum OAuthFlowError {
    #[error("Google OAuth is not configured")]
    NotConfigured,

    #[error("Invalid OAuth URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("OAuth state does not match this session")]
    StateMismatch,

    #[error("Google did not return an authorization code")]
    MissingCode,

    #[error("Token exchange failed: {0}")]
    TokenExchange(String),

    #[error("Could not fetch user info: {0}")]
    UserInfo(String),

    #[error("Google account has no email address")]
    MissingEmail,
}

impl OAuthFlowError {
    /// Short code put in the `/login?error=` redirect.
    pub fn code(&self) -> &'static str {
        match self {
            OAuthFlowError::NotConfigured => "oauth_not_configured",
            OAuthFlowError::InvalidUrl(_) => "oauth_init_error",
            OAuthFlowError::StateMismatch => "state_mismatch",
            OAuthFlowError::MissingCode => "missing_code",
            OAuthFlowError::TokenExchange(_) => "callback_error",
            OAuthFlowError::UserInfo(_) | OAuthFlowError::MissingEmail => "no_user_info",
        }
    }
}

impl From<reqwest::Error> for OAuthFlowError {
    fn from(error: reqwest::Error) -> Self {
        OAuthFlowError::UserInfo(error.to_string())
    }
}

/// Google sign-in: builds the consent redirect and turns the callback code into a `UserSession`.
#[derive(Clone)]
pub struct GoogleOAuth {
    client: BasicClient,
    http: reqwest::Client,
}

impl GoogleOAuth {
    /// `Ok(None)` when the client id or secret is missing, which disables login.
    pub fn from_config(config: &Config) -> Result<Option<Self>, OAuthFlowError> {
        let (Some(client_id), Some(client_secret)) = (
            config.google_client_id.clone(),
            config.google_client_secret.clone(),
        ) else {
            return Ok(None);
        };

        let client = BasicClient::new(
            ClientId::new(client_id),
            Some(ClientSecret::new(client_secret)),
            AuthUrl::new(config::GOOGLE_AUTH_URL.to_string())?,
            Some(TokenUrl::new(config::GOOGLE_TOKEN_URL.to_string())?),
        );
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .unwrap_or_default();

        info!("Google OAuth registered");
        Ok(Some(GoogleOAuth { client, http }))
    }

    fn client_for(&self, redirect_uri: &str) -> Result<BasicClient, OAuthFlowError> {
        Ok(self
            .client
            .clone()
            .set_redirect_uri(RedirectUrl::new(redirect_uri.to_string())?))
    }

    /// Consent URL plus the CSRF state the callback must echo back.
    pub fn authorize_url(&self, redirect_uri: &str) -> Result<(String, CsrfToken), OAuthFlowError> {
        let client = self.client_for(redirect_uri)?;
        let mut request = client.authorize_url(CsrfToken::new_random);
        for scope in SCOPES {
            request = request.add_scope(Scope::new(scope.to_string()));
        }
        let (url, state) = request.add_extra_param("prompt", "select_account").url();
        Ok((url.to_string(), state))
    }

    pub async fn exchange(&self, code: &str, redirect_uri: &str) -> Result<UserSession, OAuthFlowError> {
        let client = self.client_for(redirect_uri)?;
        let token = client
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .request_async(async_http_client)
            .await
            .map_err(|e| {
                error!("Token exchange error: {:?}", e);
                OAuthFlowError::TokenExchange(e.to_string())
            })?;

        let info: GoogleUserInfo = self
            .http
            .get(config::GOOGLE_USERINFO_URL)
            .bearer_auth(token.access_token().secret())
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        UserSession::from_userinfo(info).ok_or(OAuthFlowError::MissingEmail)
    }
}
