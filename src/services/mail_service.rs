use std::time::Duration;

use async_trait::async_trait;
use log::{error, info};
use serde::Serialize;

use crate::config::{self, Config};

const MAILGUN_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutgoingMail {
    pub subject: String,
    pub body: String,
    pub recipients: Vec<String>,
}

/// Outcome of one send attempt, shaped like the JSON the frontend expects.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum SendReport {
    Success {
        subject: String,
        body: String,
        sender: String,
        recipients: Vec<String>,
    },
    Error {
        error: String,
    },
}

impl SendReport {
    pub fn is_success(&self) -> bool {
        matches!(self, SendReport::Success { .. })
    }

    pub fn error(message: impl Into<String>) -> Self {
        SendReport::Error {
            error: message.into(),
        }
    }
}

/// Delivers one email. Failures come back as `SendReport::Error`, never as a panic or `Err`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, mail: &OutgoingMail) -> SendReport;

    fn is_configured(&self) -> bool;
}

pub struct MailgunMailer {
    client: reqwest::Client,
    api_base: String,
    api_key: Option<String>,
    domain: Option<String>,
    from: String,
}

impl MailgunMailer {
    pub fn new(api_key: Option<String>, domain: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(MAILGUN_TIMEOUT)
            .build()
            .unwrap_or_default();
        MailgunMailer {
            client,
            api_base: config::MAILGUN_API_BASE.to_string(),
            api_key,
            domain,
            from: format!("{} <{}>", config::SCHOOL_NAME, config::MAIL_SENDER_ADDRESS),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        MailgunMailer::new(config.mailgun_api_key.clone(), config.mailgun_domain.clone())
    }

    /// Points the mailer at another Mailgun-compatible host, e.g. the EU region.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    fn credentials(&self) -> Option<(&str, &str)> {
        match (self.api_key.as_deref(), self.domain.as_deref()) {
            (Some(key), Some(domain)) if !key.is_empty() && !domain.is_empty() => {
                Some((key, domain))
            }
            _ => None,
        }
    }
}

#[async_trait]
impl MailTransport for MailgunMailer {
    async fn send(&self, mail: &OutgoingMail) -> SendReport {
        let Some((api_key, domain)) = self.credentials() else {
            error!("Mailgun credentials are missing, not sending \"{}\"", mail.subject);
            return SendReport::error("Mailgun configuration is not available");
        };

        let mut form: Vec<(&str, &str)> = vec![("from", self.from.as_str())];
        for recipient in &mail.recipients {
            form.push(("to", recipient.as_str()));
        }
        form.push(("subject", mail.subject.as_str()));
        form.push(("text", mail.body.as_str()));

        let url = format!("{}/v3/{}/messages", self.api_base, domain);
        let response = self
            .client
            .post(&url)
            .basic_auth("api", Some(api_key))
            .form(&form)
            .send()
            .await;

        match response {
            Ok(res) if res.status().as_u16() == 200 => {
                info!("Mail \"{}\" sent to {:?}", mail.subject, mail.recipients);
                SendReport::Success {
                    subject: mail.subject.clone(),
                    body: mail.body.clone(),
                    sender: config::MAIL_SENDER_ADDRESS.to_string(),
                    recipients: mail.recipients.clone(),
                }
            }
            Ok(res) => {
                let status = res.status();
                let detail = res.text().await.unwrap_or_default();
                error!("Mailgun error: {} - {}", status, detail);
                SendReport::error(format!("Error sending email: {}", status.as_u16()))
            }
            Err(e) => {
                error!("Error sending mail via Mailgun: {}", e);
                SendReport::error(e.to_string())
            }
        }
    }

    fn is_configured(&self) -> bool {
        self.credentials().is_some()
    }
}
