//! Interactive trip planning REPL
//!
//! Wires the trip store, persistence, route fetcher and chat orchestrator
//! together and hands them to a readline session.

mod render;
mod session;

pub use render::{StreamPrinter, format_trip};
pub use session::ReplSession;

use std::sync::Arc;

use eyre::{Context, Result};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::chat::{ChatOptions, ChatOrchestrator, RateLimiter};
use crate::config::Config;
use crate::llm;
use crate::prompt::SystemPrompt;
use crate::route::spawn_route_fetcher;
use crate::tools::{InterpreterOptions, ToolInterpreter};
use crate::trip::{TripPersistence, TripStore, UuidIds, spawn_autosave};

/// Run the interactive REPL
///
/// This is the main entry point for `roadtrip chat`.
pub async fn run_interactive(config: &Config, initial_prompt: Option<String>) -> Result<()> {
    config.validate()?;

    let client = llm::create_client(&config.llm).map_err(|e| eyre::eyre!("Failed to create LLM client: {}", e))?;
    let prompt = SystemPrompt::from_config(&config.prompt)?;

    let persistence = TripPersistence::new(&config.storage.state_file);
    let initial = persistence.load_for_hydration().unwrap_or_default();
    info!(stops = initial.stops.len(), "Starting trip store");
    let store = TripStore::spawn_with(initial, Arc::new(UuidIds));

    let shutdown = CancellationToken::new();
    let autosave = spawn_autosave(&store, persistence, config.storage.autosave_delay());
    let fetcher = spawn_route_fetcher(&store, &config.route, shutdown.clone());

    let interpreter = Arc::new(ToolInterpreter::standard(InterpreterOptions {
        strict_recommendations: config.tools.strict_recommendations,
    }));
    let limiter = RateLimiter::new(config.chat.rate_limit, config.chat.rate_window());
    let orchestrator = ChatOrchestrator::new(
        client,
        store.clone(),
        interpreter,
        prompt,
        limiter,
        ChatOptions::from_config(config),
    );

    let result = ReplSession::new(orchestrator).run(initial_prompt).await;

    shutdown.cancel();
    if let Some(fetcher) = fetcher {
        let _ = fetcher.await;
    }
    if let Err(e) = store.shutdown().await {
        warn!(error = %e, "Trip store already stopped");
    }
    autosave.await.context("Autosave task failed")?;
    result
}
