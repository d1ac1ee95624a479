pub mod chat_service;
pub mod document_service;
pub mod form_service;
pub mod llm_service;
pub mod mail_service;
pub mod oauth_service;
pub mod retry;
