//! CLI command implementations

pub mod chat;
pub mod info;
pub mod route;
