pub mod chat_message;
pub mod conversation_manager;
pub mod form;
pub mod language;
pub mod teacher;
pub mod user_session;
