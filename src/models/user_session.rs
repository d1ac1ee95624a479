use serde::{Deserialize, Serialize};

use crate::services::form_service::UserContext;

/// The signed-in user, as stored in the session cookie.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSession {
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub picture: String,
    #[serde(default)]
    pub given_name: String,
    #[serde(default)]
    pub locale: Option<String>,
}

/// Subset of Google's OpenID userinfo response.
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleUserInfo {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,
    #[serde(default)]
    pub given_name: Option<String>,
    #[serde(default)]
    pub locale: Option<String>,
}

impl UserSession {
    /// `None` when Google did not hand back an email address.
    pub fn from_userinfo(info: GoogleUserInfo) -> Option<Self> {
        let email = info.email.map(|e| e.trim().to_string()).filter(|e| !e.is_empty())?;
        Some(UserSession {
            email,
            name: info.name.unwrap_or_default(),
            picture: info.picture.unwrap_or_default(),
            given_name: info.given_name.unwrap_or_default(),
            locale: info.locale,
        })
    }

    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            "Usuari"
        } else {
            &self.name
        }
    }

    pub fn to_context(&self) -> UserContext {
        UserContext {
            name: self.display_name().to_string(),
            contact: self.email.clone(),
        }
    }
}
