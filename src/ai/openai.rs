//! OpenAI-compatible API client
//!
//! Implements the legacy completions endpoint and streaming chat
//! completions over server-sent events.

use async_trait::async_trait;
use futures_util::stream::{self, BoxStream, StreamExt};
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;

use super::error::ApiError;
use crate::config::AiConfig;
use crate::core::message::Message;

/// Incremental text fragments of one chat response
pub type DeltaStream = BoxStream<'static, Result<String, ApiError>>;

/// Remote model provider as seen by the streamer
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// One-shot legacy completion of a flat prompt
    async fn complete(&self, model: &str, prompt: &str, max_tokens: u32) -> Result<String, ApiError>;

    /// Open a streaming chat completion over the given messages
    async fn stream_chat(&self, model: &str, messages: &[Message]) -> Result<DeltaStream, ApiError>;
}

/// Request body for the legacy completions endpoint
#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    text: String,
}

/// Request body for chat completions
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    stream: bool,
}

/// One `data:` payload of a chat stream
#[derive(Debug, Deserialize)]
struct ChatChunk {
    choices: Vec<ChunkChoice>,
}

#[derive(Debug, Deserialize)]
struct ChunkChoice {
    #[serde(default)]
    delta: ChunkDelta,
}

#[derive(Debug, Default, Deserialize)]
struct ChunkDelta {
    content: Option<String>,
}

/// Parsed server-sent event
#[derive(Debug, Clone, PartialEq)]
pub enum SseEvent {
    Delta(String),
    Done,
}

/// Line-buffered decoder for chat completion event streams.
///
/// Bytes are held until a full line arrives, so multi-byte characters
/// split across network chunks decode correctly.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed raw bytes, returning every event completed by them
    pub fn feed(&mut self, chunk: &[u8]) -> Result<Vec<SseEvent>, ApiError> {
        self.buffer.extend_from_slice(chunk);

        let mut events = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            if let Some(event) = parse_line(&line[..line.len() - 1])? {
                let done = event == SseEvent::Done;
                events.push(event);
                if done {
                    self.buffer.clear();
                    break;
                }
            }
        }
        Ok(events)
    }

    /// Flush a trailing line that had no newline before end of stream
    pub fn finish(&mut self) -> Result<Option<SseEvent>, ApiError> {
        let rest = std::mem::take(&mut self.buffer);
        parse_line(&rest)
    }
}

fn parse_line(raw: &[u8]) -> Result<Option<SseEvent>, ApiError> {
    let line = std::str::from_utf8(raw)
        .map_err(|e| ApiError::MalformedStream(format!("invalid UTF-8: {}", e)))?
        .trim();

    // blank separators, comments and `event:`/`id:` fields carry no text
    let payload = match line.strip_prefix("data:") {
        Some(p) => p.trim_start(),
        None => return Ok(None),
    };

    if payload.is_empty() {
        return Ok(None);
    }
    if payload == "[DONE]" {
        return Ok(Some(SseEvent::Done));
    }

    match serde_json::from_str::<ChatChunk>(payload) {
        Ok(chunk) => Ok(Some(SseEvent::Delta(
            chunk
                .choices
                .into_iter()
                .next()
                .and_then(|c| c.delta.content)
                .unwrap_or_default(),
        ))),
        Err(_) => {
            let summary = serde_json::from_str::<serde_json::Value>(payload)
                .ok()
                .and_then(|v| v.pointer("/error/message").and_then(|m| m.as_str()).map(str::to_owned))
                .unwrap_or_else(|| payload.to_string());
            Err(ApiError::MalformedStream(summary))
        }
    }
}

struct StreamState {
    bytes: BoxStream<'static, reqwest::Result<Vec<u8>>>,
    decoder: SseDecoder,
    pending: VecDeque<String>,
    finished: bool,
    idle: Duration,
}

impl StreamState {
    fn absorb(&mut self, events: Vec<SseEvent>) {
        for event in events {
            match event {
                SseEvent::Delta(text) => self.pending.push_back(text),
                SseEvent::Done => self.finished = true,
            }
        }
    }
}

/// Turn a raw SSE byte stream into a stream of text deltas.
///
/// `idle` bounds the wait for each chunk, not the whole reply.
fn delta_stream(bytes: BoxStream<'static, reqwest::Result<Vec<u8>>>, idle: Duration) -> DeltaStream {
    let state = StreamState {
        bytes,
        decoder: SseDecoder::new(),
        pending: VecDeque::new(),
        finished: false,
        idle,
    };

    stream::unfold(state, |mut state| async move {
        loop {
            if let Some(delta) = state.pending.pop_front() {
                return Some((Ok(delta), state));
            }
            if state.finished {
                return None;
            }

            let next = match tokio::time::timeout(state.idle, state.bytes.next()).await {
                Ok(next) => next,
                Err(_) => {
                    state.finished = true;
                    return Some((Err(ApiError::Stalled(state.idle)), state));
                }
            };

            match next {
                Some(Ok(chunk)) => match state.decoder.feed(&chunk) {
                    Ok(events) => state.absorb(events),
                    Err(e) => {
                        state.finished = true;
                        return Some((Err(e), state));
                    }
                },
                Some(Err(e)) => {
                    state.finished = true;
                    return Some((Err(ApiError::Network(e)), state));
                }
                None => {
                    state.finished = true;
                    match state.decoder.finish() {
                        Ok(Some(SseEvent::Delta(text))) => state.pending.push_back(text),
                        Ok(_) => {}
                        Err(e) => return Some((Err(e), state)),
                    }
                }
            }
        }
    })
    .boxed()
}

/// OpenAI API client
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    base_url: String,
    timeout: Duration,
}

impl OpenAiClient {
    /// Create a new client.
    ///
    /// `timeout` bounds connecting, the whole one-shot completion request,
    /// and each wait between chunks of a chat stream. A long stream that
    /// keeps producing chunks is never cut off.
    pub fn new(api_key: String, base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder()
            .connect_timeout(timeout)
            .user_agent(format!("model-sliding/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    /// Create client from the configured environment variable
    pub fn from_config(config: &AiConfig) -> Result<Self, ApiError> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| ApiError::MissingApiKey(config.api_key_env.clone()))?;

        Self::new(
            api_key,
            &config.base_url,
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn post<T: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
        deadline: Option<Duration>,
    ) -> Result<reqwest::Response, ApiError> {
        let mut request = self
            .client
            .post(self.endpoint(path))
            .header(header::CONTENT_TYPE, "application/json")
            .bearer_auth(&self.api_key)
            .json(body);
        if let Some(deadline) = deadline {
            request = request.timeout(deadline);
        }

        let response = request.send().await?;

        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let error_text = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status.as_u16(), &error_text))
        }
    }
}

#[async_trait]
impl CompletionService for OpenAiClient {
    async fn complete(&self, model: &str, prompt: &str, max_tokens: u32) -> Result<String, ApiError> {
        let request = CompletionRequest {
            model,
            prompt,
            max_tokens,
        };

        tracing::debug!("POST completions model={} max_tokens={}", model, max_tokens);
        let body: CompletionResponse = self
            .post("completions", &request, Some(self.timeout))
            .await?.json().await?;

        body.choices
            .into_iter()
            .next()
            .map(|c| c.text)
            .ok_or(ApiError::EmptyCompletion)
    }

    async fn stream_chat(&self, model: &str, messages: &[Message]) -> Result<DeltaStream, ApiError> {
        let request = ChatRequest {
            model,
            messages,
            stream: true,
        };

        tracing::debug!("POST chat/completions model={} messages={}", model, messages.len());
        let response = self.post("chat/completions", &request, None).await?;

        let bytes = response
            .bytes_stream()
            .map(|chunk| chunk.map(|b| b.to_vec()))
            .boxed();
        Ok(delta_stream(bytes, self.timeout))
    }
}
