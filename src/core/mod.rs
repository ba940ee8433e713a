//! Conversation state: messages, transcript and sessions

pub mod message;
pub mod session;
