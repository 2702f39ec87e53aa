pub mod config;
pub mod messages;
pub mod platform;
pub mod runtime;
