//! Response generation with progressive display
//!
//! Chat models are streamed and republished word by word to a
//! [`DisplaySink`], paced by a [`Pacing`] policy. The completion-mode
//! model is answered in one shot.

use futures_util::StreamExt;
use std::time::Duration;

use super::error::ApiError;
use super::openai::CompletionService;
use crate::core::message::Message;

/// Cursor glyph shown while text is still arriving
pub const DEFAULT_CURSOR: &str = "▌";

/// Something that shows the current state of a reply. The last render wins.
pub trait DisplaySink {
    fn render(&mut self, text: &str);
}

/// Records every render; useful for inspection in tests
impl DisplaySink for Vec<String> {
    fn render(&mut self, text: &str) {
        self.push(text.to_string());
    }
}

/// Delay inserted after each word-level refresh
pub trait Pacing {
    fn delay(&self, word_len: usize) -> Duration;
}

/// No delay at all
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPacing;

impl Pacing for NoPacing {
    fn delay(&self, _word_len: usize) -> Duration {
        Duration::ZERO
    }
}

/// Same delay for every word
#[derive(Debug, Clone, Copy)]
pub struct FixedPacing(pub Duration);

impl FixedPacing {
    pub fn from_millis(ms: u64) -> Self {
        Self(Duration::from_millis(ms))
    }
}

impl Pacing for FixedPacing {
    fn delay(&self, _word_len: usize) -> Duration {
        self.0
    }
}

impl<F> Pacing for F
where
    F: Fn(usize) -> Duration,
{
    fn delay(&self, word_len: usize) -> Duration {
        self(word_len)
    }
}

/// Generates replies against a completion service
pub struct Streamer<'a> {
    service: &'a dyn CompletionService,
    completion_model: String,
    max_tokens: u32,
    cursor: String,
}

impl<'a> Streamer<'a> {
    pub fn new(service: &'a dyn CompletionService, completion_model: &str, max_tokens: u32) -> Self {
        Self {
            service,
            completion_model: completion_model.to_string(),
            max_tokens,
            cursor: DEFAULT_CURSOR.to_string(),
        }
    }

    pub fn with_cursor(mut self, cursor: &str) -> Self {
        self.cursor = cursor.to_string();
        self
    }

    /// Generate a reply for `messages` and return its full text.
    ///
    /// Service errors propagate unchanged; any partial text is dropped.
    pub async fn generate(
        &self,
        model: &str,
        messages: &[Message],
        sink: &mut dyn DisplaySink,
        pacing: &dyn Pacing,
    ) -> Result<String, ApiError> {
        if model == self.completion_model {
            return self.complete_once(model, messages, sink).await;
        }

        let mut deltas = self.service.stream_chat(model, messages).await?;
        let mut accumulated = String::new();

        while let Some(delta) = deltas.next().await {
            let delta = delta?;
            if delta.is_empty() {
                continue;
            }

            accumulated.push_str(&delta);
            for word in delta.split_whitespace() {
                sink.render(&format!("{} {}", accumulated, self.cursor));
                let wait = pacing.delay(word.len());
                if !wait.is_zero() {
                    tokio::time::sleep(wait).await;
                }
            }
        }

        sink.render(&accumulated);
        tracing::debug!("Streamed {} chars from {}", accumulated.len(), model);
        Ok(accumulated)
    }

    /// Legacy completion: latest message only, single render
    async fn complete_once(
        &self,
        model: &str,
        messages: &[Message],
        sink: &mut dyn DisplaySink,
    ) -> Result<String, ApiError> {
        let prompt = messages.last().map(|m| m.content.as_str()).unwrap_or_default();
        let text = self
            .service
            .complete(model, prompt, self.max_tokens)
            .await?
            .trim()
            .to_string();

        sink.render(&text);
        Ok(text)
    }
}
