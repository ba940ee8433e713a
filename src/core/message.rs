//! Conversation messages and the append-only transcript

use serde::{Deserialize, Serialize};

/// Input that expands to the help command
pub const HELP_SHORTCUT: &str = "!";

/// Reserved command token that shows the routing table
pub const HELP_COMMAND: &str = "helpme";

/// Message role in conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single message in conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    /// Build a message; a lone `!` becomes the help command token
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        let content = content.into();
        let content = if content.trim() == HELP_SHORTCUT {
            HELP_COMMAND.to_string()
        } else {
            content
        };
        Self { role, content }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Assistant greeting for the given wall-clock hour
    pub fn greeting(hour: u32) -> Self {
        Self::assistant(format!(
            "Good {}! I'm your AI assistant. I can help you with a variety of tasks.",
            day_part(hour)
        ))
    }
}

/// Part of the day for a 24h clock hour
pub fn day_part(hour: u32) -> &'static str {
    match hour {
        5..=11 => "morning",
        12..=17 => "afternoon",
        _ => "evening",
    }
}

/// Ordered conversation history. Entries can be appended and read, never
/// edited or removed.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_part_buckets() {
        assert_eq!(day_part(4), "evening");
        assert_eq!(day_part(5), "morning");
        assert_eq!(day_part(11), "morning");
        assert_eq!(day_part(12), "afternoon");
        assert_eq!(day_part(17), "afternoon");
        assert_eq!(day_part(18), "evening");
        assert_eq!(day_part(0), "evening");
    }

    #[test]
    fn test_greeting_text() {
        let msg = Message::greeting(9);
        assert_eq!(msg.role, Role::Assistant);
        assert_eq!(
            msg.content,
            "Good morning! I'm your AI assistant. I can help you with a variety of tasks."
        );
    }

    #[test]
    fn test_bang_is_rewritten_to_help_command() {
        assert_eq!(Message::user("!").content, HELP_COMMAND);
        assert_eq!(Message::user("  !  ").content, HELP_COMMAND);
        assert_eq!(Message::user("!!").content, "!!");
    }

    #[test]
    fn test_message_serialization() {
        let json = serde_json::to_string(&Message::system("Be brief")).unwrap();
        assert_eq!(json, r#"{"role":"system","content":"Be brief"}"#);
    }

    #[test]
    fn test_transcript_appends_in_order() {
        let mut transcript = Transcript::new();
        assert!(transcript.is_empty());
        transcript.push(Message::user("a"));
        transcript.push(Message::assistant("b"));
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript.messages()[0].content, "a");
        assert_eq!(transcript.last().map(|m| m.role), Some(Role::Assistant));
    }
}
