use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Local;
use log::{error, info, warn};
use serde::Serialize;

use crate::config::{self, Config};
use crate::i18n;
use crate::models::chat_message::ChatMessage;
use crate::models::conversation_manager::ConversationManager;
use crate::models::form::{AbsenceRequest, FormKind, TeacherContactRequest};
use crate::models::language::Language;
use crate::models::teacher::{TeacherDirectory, TeacherDirectoryEntry};
use crate::services::document_service::DocumentSet;
use crate::services::form_service::{self, Route, UserContext};
use crate::services::llm_service::{ChatModel, LlmError};
use crate::services::mail_service::MailTransport;
use crate::services::retry::{retry_with_backoff, RetryPolicy, Sleeper, TokioSleeper};

/// One user's dialogue with the model, seeded with the institute context.
pub struct Conversation {
    history: Vec<ChatMessage>,
    last_used: Instant,
}

impl Conversation {
    pub fn seeded(context: impl Into<String>, greeting: impl Into<String>) -> Self {
        Conversation {
            history: vec![ChatMessage::user(context), ChatMessage::model(greeting)],
            last_used: Instant::now(),
        }
    }

    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    pub fn idle_for(&self) -> Duration {
        self.last_used.elapsed()
    }

    /// Sends `message` with the full history, retrying rate limits.
    ///
    /// Both turns are recorded only when the model actually answered; a
    /// `busy` fallback or an error leaves the history untouched.
    pub async fn ask(
        &mut self,
        model: &dyn ChatModel,
        policy: &RetryPolicy,
        sleeper: &dyn Sleeper,
        message: &str,
        busy: String,
    ) -> Result<String, LlmError> {
        self.last_used = Instant::now();

        let mut request = self.history.clone();
        request.push(ChatMessage::user(message));
        let request = &request;

        let reply = retry_with_backoff(policy, sleeper, None, move || async move {
            model.generate(request).await.map(Some)
        })
        .await?;

        match reply {
            Some(text) => {
                self.history.push(ChatMessage::user(message));
                self.history.push(ChatMessage::model(text.clone()));
                Ok(clean_reply(&text))
            }
            None => Ok(busy),
        }
    }
}

/// Drops markdown emphasis markers the chat widget would show literally.
pub fn clean_reply(text: &str) -> String {
    text.replace('*', "").trim().to_string()
}

/// Result of a form submission: whether the mail went out and the reply to show.
#[derive(Debug, Clone, PartialEq)]
pub struct FormOutcome {
    pub sent: bool,
    pub message: String,
}

impl FormOutcome {
    fn rejected(message: String) -> Self {
        FormOutcome {
            sent: false,
            message,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BotStatus {
    pub chat_initialized: bool,
    pub model_available: bool,
    pub files_loaded: usize,
    pub api_key_configured: bool,
    pub mailgun_configured: bool,
    pub total_requests: u64,
}

/// Routes chat messages either to the form path (parse, validate, mail) or
/// to the user's conversation with the model.
pub struct ChatBot {
    model: Arc<dyn ChatModel>,
    mailer: Arc<dyn MailTransport>,
    sleeper: Arc<dyn Sleeper>,
    directory: TeacherDirectory,
    documents: DocumentSet,
    retry: RetryPolicy,
    absence_recipient: String,
    conversations: ConversationManager,
    request_count: AtomicU64,
}

impl ChatBot {
    pub fn new(
        config: &Config,
        model: Arc<dyn ChatModel>,
        mailer: Arc<dyn MailTransport>,
        documents: DocumentSet,
    ) -> Self {
        info!(
            "Chat bot ready with {}/{} documents loaded",
            documents.len(),
            documents.attempted
        );
        ChatBot {
            model,
            mailer,
            sleeper: Arc::new(TokioSleeper),
            directory: TeacherDirectory::institute(&config.school_email_domain),
            documents,
            retry: config.retry.clone(),
            absence_recipient: config.absence_recipient.clone(),
            conversations: ConversationManager::new(config.conversation_idle),
            request_count: AtomicU64::new(0),
        }
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn conversations(&self) -> &ConversationManager {
        &self.conversations
    }

    pub fn teachers(&self) -> &[TeacherDirectoryEntry] {
        self.directory.entries()
    }

    /// Static instructions followed by the downloaded institute documents.
    pub fn context_prompt(&self) -> String {
        let documents = if self.documents.is_empty() {
            config::DOCUMENTS_UNAVAILABLE.to_string()
        } else {
            self.documents.context_blob()
        };
        format!(
            "{}\n\nINFORMACIÓ DELS ARXIUS DE L'INSTITUT:\n{}",
            config::SYSTEM_PROMPT,
            documents
        )
    }

    pub async fn process_message(
        &self,
        conversation_id: &str,
        message: &str,
        user: &UserContext,
        lang: Language,
    ) -> String {
        self.request_count.fetch_add(1, Ordering::Relaxed);

        match form_service::route(message) {
            Route::Form(kind) => self.handle_form_text(kind, message, user, lang).await,
            Route::UnrecognizedForm => {
                warn!("Message looked like a form but matched no known form");
                i18n::form_not_recognized(lang)
            }
            Route::Question => self.ask(conversation_id, message, user, lang).await,
        }
    }

    async fn ask(
        &self,
        conversation_id: &str,
        message: &str,
        user: &UserContext,
        lang: Language,
    ) -> String {
        if !self.model.is_configured() {
            error!("Question received but the model is not configured");
            return i18n::chat_unavailable(lang);
        }

        let handle = self.conversations.get_or_create(conversation_id, || {
            Conversation::seeded(self.context_prompt(), config::MODEL_GREETING)
        });
        let mut conversation = handle.lock().await;

        let prompt = i18n::question_prompt(lang, &user.name, message);
        match conversation
            .ask(
                self.model.as_ref(),
                &self.retry,
                self.sleeper.as_ref(),
                &prompt,
                i18n::system_busy(lang),
            )
            .await
        {
            Ok(reply) => reply,
            Err(e) => {
                error!("Error processing message for {}: {}", conversation_id, e);
                i18n::processing_error(lang)
            }
        }
    }

    async fn handle_form_text(
        &self,
        kind: FormKind,
        message: &str,
        user: &UserContext,
        lang: Language,
    ) -> String {
        let fields = form_service::extract_fields(message, kind);
        match kind {
            FormKind::Absence => match AbsenceRequest::from_fields(&fields) {
                Ok(request) => self.submit_absence(&request, user, lang).await.message,
                Err(missing) => {
                    info!("Absence form incomplete: {}", missing);
                    i18n::complete_required_fields(lang)
                }
            },
            FormKind::TeacherContact => match TeacherContactRequest::from_fields(&fields) {
                Ok(request) => self.submit_teacher_contact(&request, user, lang).await.message,
                Err(missing) => {
                    info!("Teacher contact form incomplete: {}", missing);
                    i18n::complete_required_fields(lang)
                }
            },
        }
    }

    pub async fn submit_absence(
        &self,
        request: &AbsenceRequest,
        user: &UserContext,
        lang: Language,
    ) -> FormOutcome {
        if request.validate().is_err() {
            return FormOutcome::rejected(i18n::complete_required_fields(lang));
        }
        let recipient = self.absence_recipient.as_str();
        let mail = form_service::absence_mail(request, user, recipient, Local::now());

        let report = self.mailer.send(&mail).await;
        if report.is_success() {
            FormOutcome {
                sent: true,
                message: i18n::absence_sent(lang, recipient),
            }
        } else {
            error!("Absence justification for {} not sent: {:?}", request.alumne, report);
            FormOutcome::rejected(i18n::absence_failed(lang, recipient))
        }
    }

    pub async fn submit_teacher_contact(
        &self,
        request: &TeacherContactRequest,
        user: &UserContext,
        lang: Language,
    ) -> FormOutcome {
        if request.validate().is_err() {
            return FormOutcome::rejected(i18n::complete_required_fields(lang));
        }
        let recipient = self.directory.resolve_email(&request.professor);
        info!("Teacher {} resolved to {}", request.professor, recipient);
        let mail = form_service::teacher_contact_mail(request, user, &recipient, Local::now());

        let report = self.mailer.send(&mail).await;
        if report.is_success() {
            FormOutcome {
                sent: true,
                message: i18n::teacher_message_sent(lang, &recipient),
            }
        } else {
            error!("Message to {} not sent: {:?}", recipient, report);
            FormOutcome::rejected(i18n::teacher_message_failed(lang, &recipient))
        }
    }

    pub fn end_conversation(&self, conversation_id: &str) {
        self.conversations.remove(conversation_id);
    }

    pub fn status(&self) -> BotStatus {
        BotStatus {
            chat_initialized: self.model.is_configured(),
            model_available: self.model.is_configured(),
            files_loaded: self.documents.len(),
            api_key_configured: self.model.is_configured(),
            mailgun_configured: self.mailer.is_configured(),
            total_requests: self.request_count.load(Ordering::Relaxed),
        }
    }
}
