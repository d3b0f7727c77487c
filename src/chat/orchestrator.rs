//! ChatOrchestrator - drives one user turn through the continuation protocol
//!
//! A turn is a sequence of rounds. Each round streams one completion; when
//! the model stops for tool use, the tool results become the pending input of
//! the next round. Only one turn runs at a time.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use thiserror::Error;
use tokio::sync::{broadcast, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::history::build_api_messages;
use super::ratelimit::RateLimiter;
use super::types::{ChatEvent, ChatMessage, ChatStatus, ToolCallInfo, Transcript, TurnOutcome, new_transcript};
use crate::config::Config;
use crate::llm::{CompletionRequest, LlmClient, LlmError};
use crate::prompt::{PromptOptions, SystemPrompt};
use crate::stream::{StreamError, StreamSession};
use crate::tools::ToolInterpreter;
use crate::trip::TripStore;

/// Default bound on rounds per turn
pub const MAX_CONTINUATION_ROUNDS: u32 = 10;

/// Largest conversation the endpoint is sent
pub const MAX_API_MESSAGES: usize = 100;

/// Limiter key for this process
const RATE_KEY: &str = "local";

/// Errors that end a turn
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("A response is already in progress")]
    Busy,

    #[error("Rate limit exceeded. Please try again in {} seconds.", .retry_after.as_secs().max(1))]
    RateLimited { retry_after: Duration },

    #[error("Too many messages in conversation ({0})")]
    TooManyMessages(usize),

    #[error("Failed to build system prompt: {0}")]
    Prompt(String),

    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error(transparent)]
    Stream(#[from] StreamError),
}

/// Tunables for the orchestrator
#[derive(Debug, Clone)]
pub struct ChatOptions {
    pub max_rounds: u32,
    pub max_tokens: u32,
    pub commit_interval: Duration,
    pub prompt: PromptOptions,
}

impl ChatOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_rounds: config.chat.max_rounds.max(1),
            max_tokens: config.llm.max_tokens,
            commit_interval: config.chat.commit_interval(),
            prompt: PromptOptions::from_config(&config.chat),
        }
    }
}

impl Default for ChatOptions {
    fn default() -> Self {
        Self {
            max_rounds: MAX_CONTINUATION_ROUNDS,
            max_tokens: 4096,
            commit_interval: crate::stream::DEFAULT_COMMIT_INTERVAL,
            prompt: PromptOptions::default(),
        }
    }
}

struct Inner {
    client: Arc<dyn LlmClient>,
    store: TripStore,
    interpreter: Arc<ToolInterpreter>,
    prompt: SystemPrompt,
    limiter: RateLimiter,
    options: ChatOptions,
    transcript: Transcript,
    status_tx: watch::Sender<ChatStatus>,
    events: broadcast::Sender<ChatEvent>,
    in_flight: AtomicBool,
    cancel: Mutex<Option<CancellationToken>>,
    last_error: Mutex<Option<String>>,
}

/// Handle to the chat orchestrator; clones share one conversation
#[derive(Clone)]
pub struct ChatOrchestrator {
    inner: Arc<Inner>,
}

/// Clears the in-flight flag when the turn ends, however it ends
struct FlightGuard<'a>(&'a AtomicBool);

impl<'a> FlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl ChatOrchestrator {
    pub fn new(
        client: Arc<dyn LlmClient>,
        store: TripStore,
        interpreter: Arc<ToolInterpreter>,
        prompt: SystemPrompt,
        limiter: RateLimiter,
        options: ChatOptions,
    ) -> Self {
        debug!(max_rounds = options.max_rounds, "ChatOrchestrator::new: called");
        let (status_tx, _) = watch::channel(ChatStatus::Idle);
        let (events, _) = broadcast::channel(256);
        Self {
            inner: Arc::new(Inner {
                client,
                store,
                interpreter,
                prompt,
                limiter,
                options,
                transcript: new_transcript(),
                status_tx,
                events,
                in_flight: AtomicBool::new(false),
                cancel: Mutex::new(None),
                last_error: Mutex::new(None),
            }),
        }
    }

    /// Run one user turn to completion
    pub async fn send_message(&self, text: &str) -> Result<TurnOutcome, ChatError> {
        let text = text.trim();
        if text.is_empty() {
            debug!("send_message: empty input ignored");
            return Ok(TurnOutcome::Ignored);
        }
        let Some(_guard) = FlightGuard::acquire(&self.inner.in_flight) else {
            warn!("send_message: turn already in flight");
            return Err(ChatError::Busy);
        };
        info!(len = text.len(), "send_message: starting turn");

        let cancel = CancellationToken::new();
        *lock(&self.inner.cancel) = Some(cancel.clone());
        *lock(&self.inner.last_error) = None;

        self.append(ChatMessage::user(text)).await;
        let result = self.run_turn(&cancel).await;
        lock(&self.inner.cancel).take();

        match result {
            Ok(outcome) => {
                info!(?outcome, "send_message: turn finished");
                self.set_status(ChatStatus::Idle);
                self.emit(ChatEvent::TurnFinished(outcome.clone()));
                Ok(outcome)
            }
            Err(e) => {
                let message = e.to_string();
                error!(error = %message, "send_message: turn failed");
                *lock(&self.inner.last_error) = Some(message.clone());
                self.set_status(ChatStatus::Error);
                self.emit(ChatEvent::Error(message));
                Err(e)
            }
        }
    }

    async fn run_turn(&self, cancel: &CancellationToken) -> Result<TurnOutcome, ChatError> {
        let inner = &self.inner;
        let mut pending: Vec<ToolCallInfo> = Vec::new();
        let mut last_stop = None;

        for round in 1..=inner.options.max_rounds {
            if cancel.is_cancelled() {
                return Ok(TurnOutcome::Cancelled);
            }
            debug!(%round, pending = pending.len(), "run_turn: round");
            self.set_status(if pending.is_empty() {
                ChatStatus::Streaming
            } else {
                ChatStatus::ProcessingTools
            });

            let history = inner.transcript.lock().await.clone();
            let placeholder = ChatMessage::assistant_placeholder();
            let message_id = placeholder.id.clone();
            self.append(placeholder).await;

            let messages = build_api_messages(&history, &pending);
            if messages.len() > MAX_API_MESSAGES {
                return Err(ChatError::TooManyMessages(messages.len()));
            }
            if !inner.limiter.check(RATE_KEY) {
                return Err(ChatError::RateLimited {
                    retry_after: inner.limiter.retry_after(RATE_KEY),
                });
            }

            let snapshot = inner.store.snapshot();
            let system_prompt = inner
                .prompt
                .render(&snapshot.document, &inner.options.prompt)
                .map_err(|e| ChatError::Prompt(e.to_string()))?;
            let request = CompletionRequest {
                system_prompt,
                messages,
                tools: inner.interpreter.definitions(&inner.options.prompt.currency),
                max_tokens: inner.options.max_tokens,
            };

            let bytes = tokio::select! {
                _ = cancel.cancelled() => return Ok(TurnOutcome::Cancelled),
                opened = inner.client.open_stream(request) => opened?,
            };

            let session = StreamSession::new(
                message_id,
                inner.store.clone(),
                inner.interpreter.clone(),
                inner.transcript.clone(),
                inner.events.clone(),
            )
            .with_commit_interval(inner.options.commit_interval);
            let outcome = session.run(bytes, cancel.clone()).await?;

            if outcome.cancelled {
                return Ok(TurnOutcome::Cancelled);
            }
            last_stop = outcome.stop_reason;
            if !outcome.wants_continuation() {
                return Ok(TurnOutcome::Completed {
                    rounds: round,
                    stop_reason: last_stop,
                });
            }
            pending = outcome.tool_calls;
        }

        warn!(max_rounds = inner.options.max_rounds, "run_turn: round limit reached");
        Ok(TurnOutcome::Completed {
            rounds: inner.options.max_rounds,
            stop_reason: last_stop,
        })
    }

    /// Cancel the turn in flight, if any
    pub fn stop(&self) {
        if let Some(cancel) = lock(&self.inner.cancel).take() {
            info!("stop: cancelling turn");
            cancel.cancel();
        }
        if !self.is_busy() {
            self.set_status(ChatStatus::Idle);
        }
    }

    /// Stop, then clear the conversation and any error
    pub async fn reset(&self) {
        debug!("reset: called");
        self.stop();
        self.inner.transcript.lock().await.clear();
        lock(&self.inner.last_error).take();
        self.set_status(ChatStatus::Idle);
    }

    pub fn status(&self) -> ChatStatus {
        *self.inner.status_tx.borrow()
    }

    pub fn watch_status(&self) -> watch::Receiver<ChatStatus> {
        self.inner.status_tx.subscribe()
    }

    pub fn is_busy(&self) -> bool {
        self.inner.in_flight.load(Ordering::Acquire)
    }

    /// Copy of the transcript
    pub async fn messages(&self) -> Vec<ChatMessage> {
        self.inner.transcript.lock().await.clone()
    }

    pub fn last_error(&self) -> Option<String> {
        lock(&self.inner.last_error).clone()
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ChatEvent> {
        self.inner.events.subscribe()
    }

    pub fn store(&self) -> &TripStore {
        &self.inner.store
    }

    async fn append(&self, message: ChatMessage) {
        let event = ChatEvent::MessageAppended {
            id: message.id.clone(),
            role: message.role,
        };
        self.inner.transcript.lock().await.push(message);
        self.emit(event);
    }

    fn set_status(&self, status: ChatStatus) {
        let changed = self.inner.status_tx.send_if_modified(|current| {
            if *current == status {
                return false;
            }
            *current = status;
            true
        });
        if changed {
            debug!(%status, "set_status: changed");
            self.emit(ChatEvent::StatusChanged(status));
        }
    }

    fn emit(&self, event: ChatEvent) {
        let _ = self.inner.events.send(event);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
