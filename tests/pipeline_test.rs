//! End-to-end tests for the chat pipeline
//!
//! A scripted completion client feeds SSE transcripts through the real
//! decoder, session, interpreter, store, route fetcher and persistence.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use serde_json::{Value, json};
use tempfile::TempDir;

use roadtrip::chat::{ChatEvent, ChatOptions, ChatOrchestrator, RateLimiter, TurnOutcome};
use roadtrip::llm::{
    ByteStream, CompletionRequest, ContentBlock, LlmClient, LlmError, MessageContent, Role, StopReason, sse_event,
};
use roadtrip::prompt::SystemPrompt;
use roadtrip::route::{FetcherOptions, PathLookup, RouteError, RouteFetcher};
use roadtrip::tools::{InterpreterOptions, ToolInterpreter};
use roadtrip::trip::{RouteSegment, SequentialIds, Stop, TripDocument, TripPersistence, TripStore, spawn_autosave};
use tokio_util::sync::CancellationToken;

// =============================================================================
// Scripted completion endpoint
// =============================================================================

enum Reply {
    /// Whole transcript, delivered in small chunks
    Transcript(String),
    /// Some bytes, then the connection stays open forever
    Stall(String),
}

struct ScriptedClient {
    replies: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedClient {
    fn new(replies: Vec<Reply>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

fn chunks(transcript: &str, size: usize) -> Vec<Result<Vec<u8>, LlmError>> {
    transcript.as_bytes().chunks(size).map(|c| Ok(c.to_vec())).collect()
}

#[async_trait]
impl LlmClient for ScriptedClient {
    async fn open_stream(&self, request: CompletionRequest) -> Result<ByteStream, LlmError> {
        self.requests.lock().unwrap().push(request);
        let reply = self.replies.lock().unwrap().pop_front();
        match reply {
            Some(Reply::Transcript(t)) => Ok(Box::pin(futures::stream::iter(chunks(&t, 5)))),
            Some(Reply::Stall(t)) => Ok(Box::pin(
                futures::stream::iter(chunks(&t, 5)).chain(futures::stream::pending()),
            )),
            None => Ok(roadtrip::llm::api_error_stream(500, "no scripted reply")),
        }
    }
}

/// SSE transcript builder
struct Sse {
    out: String,
    index: usize,
}

impl Sse {
    fn new() -> Self {
        let out = sse_event(
            "message_start",
            &json!({"type": "message_start", "message": {"id": "msg_1", "role": "assistant"}}),
        );
        Self { out, index: 0 }
    }

    fn text(mut self, text: &str) -> Self {
        let i = self.index;
        self.out.push_str(&sse_event(
            "content_block_start",
            &json!({"type": "content_block_start", "index": i, "content_block": {"type": "text", "text": ""}}),
        ));
        self.out.push_str(&sse_event(
            "content_block_delta",
            &json!({"type": "content_block_delta", "index": i, "delta": {"type": "text_delta", "text": text}}),
        ));
        self.stop_block()
    }

    fn tool(mut self, id: &str, name: &str, input: Value) -> Self {
        let i = self.index;
        self.out.push_str(&sse_event(
            "content_block_start",
            &json!({"type": "content_block_start", "index": i,
                    "content_block": {"type": "tool_use", "id": id, "name": name, "input": {}}}),
        ));
        self.out.push_str(&sse_event(
            "content_block_delta",
            &json!({"type": "content_block_delta", "index": i,
                    "delta": {"type": "input_json_delta", "partial_json": input.to_string()}}),
        ));
        self.stop_block()
    }

    fn stop_block(mut self) -> Self {
        self.out.push_str(&sse_event(
            "content_block_stop",
            &json!({"type": "content_block_stop", "index": self.index}),
        ));
        self.index += 1;
        self
    }

    fn end(mut self, stop_reason: &str) -> String {
        self.out.push_str(&sse_event(
            "message_delta",
            &json!({"type": "message_delta", "delta": {"stop_reason": stop_reason}}),
        ));
        self.out.push_str(&sse_event("message_stop", &json!({"type": "message_stop"})));
        self.out
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn orchestrator(client: Arc<ScriptedClient>, store: &TripStore) -> ChatOrchestrator {
    ChatOrchestrator::new(
        client,
        store.clone(),
        Arc::new(ToolInterpreter::standard(InterpreterOptions::default())),
        SystemPrompt::embedded(),
        RateLimiter::new(30, Duration::from_secs(60)),
        ChatOptions::default(),
    )
}

fn new_store() -> TripStore {
    TripStore::spawn_with(TripDocument::default(), Arc::new(SequentialIds::new()))
}

fn stop_names(store: &TripStore) -> Vec<String> {
    store.document().stops.into_iter().map(|s| s.name).collect()
}

fn plan_reply() -> String {
    Sse::new()
        .text("Let me plan that.")
        .tool(
            "toolu_1",
            "set_route",
            json!({"stops": [
                {"name": "Paris", "lat": 48.8566, "lng": 2.3522, "nights": 2},
                {"name": "Lyon", "lat": "45.764", "lng": "4.8357"}
            ]}),
        )
        .tool(
            "toolu_2",
            "add_stop",
            json!({"name": "Nice", "lat": 43.7102, "lng": 7.262, "nights": 3}),
        )
        .end("tool_use")
}

struct StraightLookup;

#[async_trait]
impl PathLookup for StraightLookup {
    async fn lookup(&self, from: &Stop, to: &Stop) -> Result<RouteSegment, RouteError> {
        if to.name == "Nice" {
            return Err(RouteError::Status(503));
        }
        let mut segment = RouteSegment::straight_fallback(from, to);
        segment.is_ferry = None;
        segment.distance_km = Some(465.0);
        Ok(segment)
    }
}

async fn wait_for<F>(store: &TripStore, mut ready: F)
where
    F: FnMut(&TripDocument) -> bool,
{
    let mut rx = store.subscribe();
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            if ready(&rx.borrow_and_update().document) {
                return;
            }
            rx.changed().await.expect("store stopped");
        }
    })
    .await
    .expect("Timed out waiting for trip state");
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn test_tool_turn_continues_with_results() {
    let client = ScriptedClient::new(vec![
        Reply::Transcript(plan_reply()),
        Reply::Transcript(Sse::new().text("Enjoy the drive!").end("end_turn")),
    ]);
    let store = new_store();
    let chat = orchestrator(client.clone(), &store);

    let outcome = chat.send_message("Plan a trip through France").await.unwrap();
    assert_eq!(
        outcome,
        TurnOutcome::Completed {
            rounds: 2,
            stop_reason: Some(StopReason::EndTurn)
        }
    );

    // Both calls of one response applied in order, the second seeing the first
    assert_eq!(stop_names(&store), vec!["Paris", "Lyon", "Nice"]);
    let doc = store.document();
    assert_eq!(doc.stops[0].nights, 2);
    assert_eq!(doc.stops[1].coordinates.lat, 45.764);
    assert_eq!(doc.stops[2].nights, 3);

    let requests = client.requests();
    assert_eq!(requests.len(), 2);
    let second = &requests[1].messages;
    assert_eq!(second.len(), 3);
    assert_eq!(second[1].role, Role::Assistant);
    assert_eq!(second[1].tool_use_ids(), vec!["toolu_1", "toolu_2"]);

    let results = match &second[2].content {
        MessageContent::Blocks(blocks) => blocks.clone(),
        other => panic!("expected tool results, got {:?}", other),
    };
    assert_eq!(
        results,
        vec![
            ContentBlock::tool_result("toolu_1", "Route set with 2 stops: Paris → Lyon", false),
            ContentBlock::tool_result("toolu_2", "Added stop: Nice at the end", false),
        ]
    );

    let messages = chat.messages().await;
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[1].content, "Let me plan that.");
    assert_eq!(messages[1].calls().len(), 2);
    assert_eq!(messages[2].content, "Enjoy the drive!");
    assert!(requests[1].system_prompt.contains("\"name\": \"Nice\""));
}

#[tokio::test]
async fn test_routes_fetched_and_trip_persisted() {
    let dir = TempDir::new().unwrap();
    let persistence = TripPersistence::new(dir.path().join("trip.json"));

    let client = ScriptedClient::new(vec![
        Reply::Transcript(plan_reply()),
        Reply::Transcript(Sse::new().text("Done.").end("end_turn")),
    ]);
    let store = new_store();
    let shutdown = CancellationToken::new();
    let autosave = spawn_autosave(&store, persistence.clone(), Duration::from_millis(20));
    let options = FetcherOptions {
        debounce: Duration::from_millis(20),
        request_delay: Duration::from_millis(1),
    };
    RouteFetcher::new(store.clone(), Arc::new(StraightLookup), options).spawn(shutdown.clone());

    let chat = orchestrator(client, &store);
    chat.send_message("Plan it").await.unwrap();

    wait_for(&store, |doc| doc.route_segments.len() == 2).await;
    let doc = store.document();
    assert_eq!(doc.route_segments[0].distance_km, Some(465.0));
    assert!(!doc.route_segments[0].is_ferry());
    // Lyon to Nice failed and fell back to a straight ferry-flagged line
    assert!(doc.route_segments[1].is_ferry());
    assert_eq!(doc.route_segments[1].from_stop_id, doc.stops[1].id);

    shutdown.cancel();
    store.shutdown().await.unwrap();
    autosave.await.unwrap();

    let restored = persistence.load_for_hydration().expect("trip was saved");
    assert_eq!(
        restored.stops.iter().map(|s| s.name.as_str()).collect::<Vec<_>>(),
        vec!["Paris", "Lyon", "Nice"]
    );
    assert!(restored.route_segments.is_empty());
}

#[tokio::test]
async fn test_stop_keeps_partial_text() {
    let partial = {
        let mut out = sse_event("message_start", &json!({"type": "message_start", "message": {}}));
        out.push_str(&sse_event(
            "content_block_start",
            &json!({"type": "content_block_start", "index": 0, "content_block": {"type": "text", "text": ""}}),
        ));
        out.push_str(&sse_event(
            "content_block_delta",
            &json!({"type": "content_block_delta", "index": 0, "delta": {"type": "text_delta", "text": "Partial answer"}}),
        ));
        out
    };
    let client = ScriptedClient::new(vec![Reply::Stall(partial)]);
    let store = new_store();
    let chat = orchestrator(client, &store);
    let mut events = chat.subscribe_events();

    let turn = tokio::spawn({
        let chat = chat.clone();
        async move { chat.send_message("Tell me about Lyon").await }
    });

    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            if let Ok(ChatEvent::TextCommitted { text, .. }) = events.recv().await
                && text == "Partial answer"
            {
                return;
            }
        }
    })
    .await
    .expect("text was never committed");

    assert!(chat.is_busy());
    chat.stop();
    let outcome = turn.await.unwrap().unwrap();
    assert_eq!(outcome, TurnOutcome::Cancelled);
    assert!(!chat.is_busy());

    let messages = chat.messages().await;
    assert_eq!(messages.last().unwrap().content, "Partial answer");
    assert!(stop_names(&store).is_empty());
}

#[tokio::test]
async fn test_api_error_surfaces_and_keeps_state() {
    let client = ScriptedClient::new(vec![]);
    let store = new_store();
    let chat = orchestrator(client, &store);

    let err = chat.send_message("Hello").await.unwrap_err();
    assert_eq!(err.to_string(), "API error 500: no scripted reply");
    assert_eq!(chat.last_error().as_deref(), Some("API error 500: no scripted reply"));
    assert!(!chat.is_busy());
}
