pub mod config;
pub mod handlers;
pub mod i18n;
pub mod models;
pub mod routes;
pub mod services;
