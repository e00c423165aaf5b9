pub mod apis;
pub mod arguments;
pub mod auth;
pub mod clock;
pub mod commands;
pub mod config;
pub mod errors; // Structured error handling
pub mod logger;
pub mod notifications;
pub mod pricing;
pub mod refresh;
pub mod sessions;
pub mod version;
pub mod webserver;
