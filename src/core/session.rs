//! Chat session state and turn handling
//!
//! A [`Session`] owns the transcript and the current model for the life
//! of one interactive run. Each turn borrows it mutably, so two replies
//! can never be generated against the same transcript at once.

use chrono::Timelike;
use std::borrow::Cow;

use super::message::{Message, Transcript, HELP_COMMAND, HELP_SHORTCUT};
use crate::ai::error::ApiError;
use crate::ai::router::{Router, RoutingDecision};
use crate::ai::stream::{DisplaySink, Pacing, Streamer};

/// What the user typed, before any routing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `!` or `helpme`: show the routing table
    Help,
    /// `/exit`, `/quit`, `/q`
    Exit,
    /// `/model`, `/m`: print the current model
    ShowModel,
    /// Anything else goes to the router
    Prompt(String),
}

impl Command {
    pub fn parse(input: &str) -> Self {
        let normalized = input.trim().to_lowercase();
        match normalized.as_str() {
            HELP_SHORTCUT | HELP_COMMAND => Command::Help,
            "/exit" | "/quit" | "/q" => Command::Exit,
            "/model" | "/m" => Command::ShowModel,
            _ => Command::Prompt(input.to_string()),
        }
    }
}

/// A completed assistant reply
#[derive(Debug, Clone)]
pub struct Reply {
    pub decision: RoutingDecision,
    pub text: String,
}

/// Result of handling one line of input
#[derive(Debug, Clone)]
pub enum TurnOutcome {
    Help,
    Exit,
    ShowModel,
    Reply(Reply),
}

/// Conversation state for one interactive run
#[derive(Debug)]
pub struct Session {
    transcript: Transcript,
    current_model: String,
    persona_as_system: bool,
}

impl Session {
    /// Start a session greeted for the given hour
    pub fn new(initial_model: &str, hour: u32) -> Self {
        let mut transcript = Transcript::new();
        transcript.push(Message::greeting(hour));

        Self {
            transcript,
            current_model: initial_model.to_string(),
            persona_as_system: false,
        }
    }

    /// Start a session greeted for the local wall-clock hour
    pub fn start(initial_model: &str) -> Self {
        Self::new(initial_model, chrono::Local::now().hour())
    }

    /// Prepend the routed persona as a system message on each request
    pub fn with_persona_as_system(mut self, enabled: bool) -> Self {
        self.persona_as_system = enabled;
        self
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn current_model(&self) -> &str {
        &self.current_model
    }

    /// Handle one line of input. Commands never reach the router.
    pub async fn handle_input(
        &mut self,
        input: &str,
        router: &mut Router,
        streamer: &Streamer<'_>,
        sink: &mut dyn DisplaySink,
        pacing: &dyn Pacing,
    ) -> Result<TurnOutcome, ApiError> {
        match Command::parse(input) {
            Command::Help => Ok(TurnOutcome::Help),
            Command::Exit => Ok(TurnOutcome::Exit),
            Command::ShowModel => Ok(TurnOutcome::ShowModel),
            Command::Prompt(prompt) => {
                let reply = self.submit(&prompt, router, streamer, sink, pacing).await?;
                Ok(TurnOutcome::Reply(reply))
            }
        }
    }

    /// Route, record and answer a prompt.
    ///
    /// The user message is recorded before the request since it is part
    /// of the context sent. The assistant message is only recorded once
    /// the reply is complete.
    pub async fn submit(
        &mut self,
        prompt: &str,
        router: &mut Router,
        streamer: &Streamer<'_>,
        sink: &mut dyn DisplaySink,
        pacing: &dyn Pacing,
    ) -> Result<Reply, ApiError> {
        let decision = router.route(prompt);
        tracing::info!("Using model: {}", decision.model);
        self.current_model = decision.model.clone();

        self.transcript.push(Message::user(prompt));

        let messages: Cow<'_, [Message]> = if self.persona_as_system {
            let mut with_persona = Vec::with_capacity(self.transcript.len() + 1);
            with_persona.push(Message::system(decision.role.as_str()));
            with_persona.extend_from_slice(self.transcript.messages());
            Cow::Owned(with_persona)
        } else {
            Cow::Borrowed(self.transcript.messages())
        };

        let text = streamer
            .generate(&decision.model, &messages, sink, pacing)
            .await?;

        self.transcript.push(Message::assistant(text.as_str()));
        Ok(Reply { decision, text })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::stream::tests::{Call, ScriptedService};
    use crate::ai::stream::NoPacing;
    use crate::config::Config;
    use crate::core::message::Role;

    fn router() -> Router {
        Router::from_config(&Config::default().routing)
    }

    #[test]
    fn test_command_parsing() {
        assert_eq!(Command::parse("!"), Command::Help);
        assert_eq!(Command::parse("  !  "), Command::Help);
        assert_eq!(Command::parse("HelpMe"), Command::Help);
        assert_eq!(Command::parse("/quit"), Command::Exit);
        assert_eq!(Command::parse("/m"), Command::ShowModel);
        assert_eq!(
            Command::parse("! write code"),
            Command::Prompt("! write code".to_string())
        );
    }

    #[test]
    fn test_new_session_has_single_greeting() {
        let session = Session::new("gpt-3.5-turbo", 14);
        assert_eq!(session.transcript().len(), 1);
        assert!(session.transcript().messages()[0].content.starts_with("Good afternoon!"));
        assert_eq!(session.current_model(), "gpt-3.5-turbo");
    }

    #[tokio::test]
    async fn test_help_never_reaches_router_or_service() {
        let service = ScriptedService::streaming(&["unused"]);
        let streamer = Streamer::new(&service, "fine-tuned-model", 60);
        let mut router = router();
        let mut session = Session::new("gpt-3.5-turbo", 9);

        for input in ["!", "  !  ", "helpme"] {
            let outcome = session
                .handle_input(input, &mut router, &streamer, &mut Vec::new(), &NoPacing)
                .await
                .unwrap();
            assert!(matches!(outcome, TurnOutcome::Help));
        }

        assert_eq!(router.cached_len(), 0);
        assert!(service.calls().is_empty());
        assert_eq!(session.transcript().len(), 1);
    }

    #[tokio::test]
    async fn test_transcript_grows_by_two_per_turn() {
        let service = ScriptedService::streaming(&["Sure", ", here you go."]);
        let streamer = Streamer::new(&service, "fine-tuned-model", 60);
        let mut router = router();
        let mut session = Session::new("gpt-3.5-turbo", 20);

        let prompts = ["write some code", "now an essay", "xyzzy"];
        let mut snapshots = Vec::new();
        for (i, prompt) in prompts.iter().enumerate() {
            let outcome = session
                .handle_input(prompt, &mut router, &streamer, &mut Vec::new(), &NoPacing)
                .await
                .unwrap();
            let TurnOutcome::Reply(reply) = outcome else {
                panic!("expected a reply");
            };
            assert_eq!(reply.text, "Sure, here you go.");
            assert_eq!(session.transcript().len(), 1 + 2 * (i + 1));
            snapshots.push(session.transcript().messages().to_vec());
        }

        // earlier entries are never rewritten
        let last = snapshots.last().unwrap();
        for snap in &snapshots {
            assert_eq!(&last[..snap.len()], &snap[..]);
        }

        let roles: Vec<Role> = last.iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            [
                Role::Assistant,
                Role::User,
                Role::Assistant,
                Role::User,
                Role::Assistant,
                Role::User,
                Role::Assistant,
            ]
        );
        assert_eq!(session.current_model(), "default-general-model");
    }

    #[tokio::test]
    async fn test_routed_model_is_used_for_request() {
        let service = ScriptedService::streaming(&["ok"]);
        let streamer = Streamer::new(&service, "fine-tuned-model", 60);
        let mut router = router();
        let mut session = Session::new("gpt-3.5-turbo", 9);

        session
            .submit("Draft a report", &mut router, &streamer, &mut Vec::new(), &NoPacing)
            .await
            .unwrap();

        match &service.calls()[0] {
            Call::Chat { model, messages } => {
                assert_eq!(model, "gpt-4");
                assert_eq!(messages.len(), 2);
                assert_eq!(messages[1], Message::user("Draft a report"));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(session.current_model(), "gpt-4");
    }

    #[tokio::test]
    async fn test_persona_prepended_only_to_request() {
        let service = ScriptedService::streaming(&["ok"]);
        let streamer = Streamer::new(&service, "fine-tuned-model", 60);
        let mut router = router();
        let mut session = Session::new("gpt-3.5-turbo", 9).with_persona_as_system(true);

        session
            .submit("a fable please", &mut router, &streamer, &mut Vec::new(), &NoPacing)
            .await
            .unwrap();

        match &service.calls()[0] {
            Call::Chat { messages, .. } => {
                assert_eq!(messages[0].role, Role::System);
                assert!(messages[0].content.contains("storyteller"));
                assert_eq!(messages.len(), 3);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(session.transcript().len(), 3);
    }

    #[tokio::test]
    async fn test_failed_reply_is_not_recorded() {
        let service = ScriptedService::failing_after(&["half an ans"], "stream closed");
        let streamer = Streamer::new(&service, "fine-tuned-model", 60);
        let mut router = router();
        let mut session = Session::new("gpt-3.5-turbo", 9);

        let result = session
            .submit("code me a parser", &mut router, &streamer, &mut Vec::new(), &NoPacing)
            .await;

        assert!(result.is_err());
        assert_eq!(session.transcript().len(), 2);
        assert_eq!(session.transcript().last().map(|m| m.role), Some(Role::User));
    }
}
