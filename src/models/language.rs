use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Reply language picked explicitly by the client; the model is told to
/// answer in it and every canned reply is rendered in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Ca,
    Es,
    Ar,
}

#[derive(Debug, thiserror::Error, PartialEq)]
#[error("Unsupported language code: {0}")]
pub struct UnsupportedLanguage(pub String);

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::Ca => "ca",
            Language::Es => "es",
            Language::Ar => "ar",
        }
    }

    /// Name of the language written in that language, used in model instructions.
    pub fn native_name(&self) -> &'static str {
        match self {
            Language::Ca => "català",
            Language::Es => "español",
            Language::Ar => "العربية",
        }
    }
}

impl FromStr for Language {
    type Err = UnsupportedLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Accept region-tagged codes such as "es-ES" or "ca_ES".
        let primary = s
            .trim()
            .split(|c| c == '-' || c == '_')
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        match primary.as_str() {
            "ca" => Ok(Language::Ca),
            "es" => Ok(Language::Es),
            "ar" => Ok(Language::Ar),
            _ => Err(UnsupportedLanguage(s.to_string())),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
