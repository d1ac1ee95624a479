pub mod chat_handler;
pub mod info_handler;
pub mod oauth_handler;
pub mod session_handler;
