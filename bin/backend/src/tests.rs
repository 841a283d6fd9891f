use super::{
    endpoints::{
        blockchain_info, chat_endpoint, contract_template, convert_units, delete_session, gas_fees,
        health, validate_address, ChatRequest, ConvertQuery, ValidateAddressQuery,
    },
    manager::{generate_session_id, SessionManager},
    session::{ChatBackend, MessageSender, SessionState},
};
use anyhow::Result;
use async_trait::async_trait;
use axum::extract::{Path, Query, State};
use buddy_agent::{AgentMessage, Message};
use std::{
    collections::VecDeque,
    sync::Arc,
    time::Duration,
};
use tokio::sync::{mpsc, Mutex, RwLock};

#[derive(Clone)]
struct MockChatBackend {
    interactions: Arc<Mutex<VecDeque<MockInteraction>>>,
}

#[derive(Clone)]
struct MockInteraction {
    expected_input: String,
    streaming_chunks: Vec<String>,
    tool_calls: Vec<(String, String)>,
    fail_with: Option<String>,
}

impl MockInteraction {
    fn streaming_only(input: &str, reply: &str) -> Self {
        Self {
            expected_input: input.to_string(),
            streaming_chunks: vec![reply.to_string()],
            tool_calls: Vec::new(),
            fail_with: None,
        }
    }

    fn with_tool_call(input: &str, reply: &str, tool_name: &str, tool_args: &str) -> Self {
        Self {
            expected_input: input.to_string(),
            streaming_chunks: vec![reply.to_string()],
            tool_calls: vec![(tool_name.to_string(), tool_args.to_string())],
            fail_with: None,
        }
    }

    fn failing(input: &str, error: &str) -> Self {
        Self {
            expected_input: input.to_string(),
            streaming_chunks: Vec::new(),
            tool_calls: Vec::new(),
            fail_with: Some(error.to_string()),
        }
    }
}

impl MockChatBackend {
    fn new(interactions: Vec<MockInteraction>) -> Self {
        Self {
            interactions: Arc::new(Mutex::new(interactions.into())),
        }
    }
}

#[async_trait]
impl ChatBackend for MockChatBackend {
    async fn process_message(
        &self,
        history: Arc<RwLock<Vec<Message>>>,
        input: String,
        sender_to_ui: &mpsc::Sender<AgentMessage>,
    ) -> Result<()> {
        let interaction = {
            let mut queued = self.interactions.lock().await;
            queued
                .pop_front()
                .expect("no scripted interaction remaining")
        };

        assert_eq!(
            interaction.expected_input, input,
            "unexpected user input routed to agent"
        );

        if let Some(error) = interaction.fail_with {
            anyhow::bail!(error);
        }

        for (name, args) in interaction.tool_calls.iter().cloned() {
            sender_to_ui
                .send(AgentMessage::ToolCall { name, args })
                .await
                .expect("tool call send");
        }

        let mut reply = String::new();
        for chunk in interaction.streaming_chunks.iter() {
            reply.push_str(chunk);
            sender_to_ui
                .send(AgentMessage::StreamingText(chunk.clone()))
                .await
                .expect("streaming chunk send");
        }

        {
            let mut history_guard = history.write().await;
            history_guard.push(Message::user(input));
            history_guard.push(Message::assistant(reply));
        }

        sender_to_ui
            .send(AgentMessage::Complete)
            .await
            .expect("complete send");

        Ok(())
    }
}

fn manager_with(interactions: Vec<MockInteraction>) -> Arc<SessionManager> {
    let backend: Arc<dyn ChatBackend> = Arc::new(MockChatBackend::new(interactions));
    Arc::new(SessionManager::new(backend))
}

#[tokio::test]
async fn run_turn_collects_reply_and_logs_tool_calls() {
    let backend: Arc<dyn ChatBackend> = Arc::new(MockChatBackend::new(vec![
        MockInteraction::with_tool_call(
            "convert 1 eth to gwei",
            "That's 1000000000 Gwei.",
            "convert_crypto_units",
            r#"{"amount":1,"from_unit":"eth","to_unit":"gwei"}"#,
        ),
    ]));
    let mut state = SessionState::new(backend);

    let reply = state
        .run_turn("convert 1 eth to gwei")
        .await
        .expect("turn should succeed");
    assert_eq!(reply, "That's 1000000000 Gwei.");
    assert!(!state.is_processing);

    let senders: Vec<_> = state.messages.iter().map(|m| m.sender.clone()).collect();
    assert_eq!(
        senders,
        vec![
            MessageSender::User,
            MessageSender::System,
            MessageSender::Assistant
        ]
    );
    assert!(state.messages[1].content.starts_with("tool: convert_crypto_units"));
}

#[tokio::test]
async fn run_turn_skips_empty_messages() {
    let backend: Arc<dyn ChatBackend> = Arc::new(MockChatBackend::new(vec![]));
    let mut state = SessionState::new(backend);

    let reply = state.run_turn("   ").await.expect("no-op turn");
    assert_eq!(reply, "");
    assert!(state.messages.is_empty());
}

#[tokio::test]
async fn run_turn_surfaces_agent_failures() {
    let backend: Arc<dyn ChatBackend> = Arc::new(MockChatBackend::new(vec![
        MockInteraction::failing("hello", "provider unreachable"),
    ]));
    let mut state = SessionState::new(backend);

    let err = state.run_turn("hello").await.expect_err("turn should fail");
    assert!(err.to_string().contains("provider unreachable"));
    assert!(!state.is_processing);
}

#[tokio::test]
async fn chat_endpoint_preserves_session_identity() {
    let manager = manager_with(vec![
        MockInteraction::streaming_only("first", "first reply"),
        MockInteraction::streaming_only("second", "second reply"),
    ]);

    let response = chat_endpoint(
        State(Arc::clone(&manager)),
        axum::Json(ChatRequest {
            message: "first".to_string(),
            session_id: Some("session-a".to_string()),
        }),
    )
    .await
    .expect("first turn")
    .0;
    assert_eq!(response.response, "first reply");
    assert_eq!(response.session_id, "session-a");

    let response = chat_endpoint(
        State(Arc::clone(&manager)),
        axum::Json(ChatRequest {
            message: "second".to_string(),
            session_id: Some("session-a".to_string()),
        }),
    )
    .await
    .expect("second turn")
    .0;
    assert_eq!(response.response, "second reply");

    assert_eq!(manager.get_active_session_count().await, 1);
}

#[tokio::test]
async fn chat_endpoint_generates_session_id_when_missing() {
    let manager = manager_with(vec![MockInteraction::streaming_only("hi", "hello there")]);

    let response = chat_endpoint(
        State(manager),
        axum::Json(ChatRequest {
            message: "hi".to_string(),
            session_id: None,
        }),
    )
    .await
    .expect("turn")
    .0;

    uuid::Uuid::parse_str(&response.session_id).expect("generated id should be a UUID");
    assert!(!response.timestamp.is_empty());
}

#[tokio::test]
async fn chat_endpoint_substitutes_fallback_for_empty_replies() {
    let manager = manager_with(vec![MockInteraction {
        expected_input: "hi".to_string(),
        streaming_chunks: Vec::new(),
        tool_calls: Vec::new(),
        fail_with: None,
    }]);

    let response = chat_endpoint(
        State(manager),
        axum::Json(ChatRequest {
            message: "hi".to_string(),
            session_id: None,
        }),
    )
    .await
    .expect("turn")
    .0;

    assert!(response.response.starts_with("I apologize"));
}

#[tokio::test]
async fn chat_endpoint_maps_agent_failure_to_500() {
    let manager = manager_with(vec![MockInteraction::failing("hi", "model exploded")]);

    let (status, detail) = chat_endpoint(
        State(manager),
        axum::Json(ChatRequest {
            message: "hi".to_string(),
            session_id: None,
        }),
    )
    .await
    .expect_err("turn should fail");

    assert_eq!(status, axum::http::StatusCode::INTERNAL_SERVER_ERROR);
    assert!(detail.contains("model exploded"));
}

#[tokio::test]
async fn delete_session_endpoint_removes_state() {
    let manager = manager_with(vec![MockInteraction::streaming_only("hi", "hello")]);

    chat_endpoint(
        State(Arc::clone(&manager)),
        axum::Json(ChatRequest {
            message: "hi".to_string(),
            session_id: Some("doomed".to_string()),
        }),
    )
    .await
    .expect("turn");
    assert_eq!(manager.get_active_session_count().await, 1);

    let deleted = delete_session(State(Arc::clone(&manager)), Path("doomed".to_string()))
        .await
        .0;
    assert_eq!(deleted.status, "deleted");
    assert_eq!(deleted.session_id, "doomed");
    assert_eq!(manager.get_active_session_count().await, 0);
}

#[tokio::test]
async fn cleanup_removes_idle_sessions() {
    let backend: Arc<dyn ChatBackend> = Arc::new(MockChatBackend::new(vec![]));
    let manager =
        SessionManager::new(backend).with_timeouts(Duration::from_millis(1), Duration::ZERO);

    manager.get_or_create_session("idle").await;
    assert_eq!(manager.get_active_session_count().await, 1);

    manager.cleanup_inactive_sessions().await;
    assert_eq!(manager.get_active_session_count().await, 0);
}

#[tokio::test]
async fn health_endpoints_identify_the_agent() {
    let body = health().await.0;
    assert_eq!(body.status, "healthy");
    assert_eq!(body.agent_name, "BlockchainBuddy");
}

#[tokio::test]
async fn tool_endpoints_return_envelopes() {
    let reply = blockchain_info(Path("Ethereum".to_string())).await.0;
    let encoded = serde_json::to_value(&reply).unwrap();
    assert_eq!(encoded["status"], "success");
    assert_eq!(encoded["data"]["symbol"], "ETH");

    let reply = gas_fees(Path("dogecoin".to_string())).await.0;
    let encoded = serde_json::to_value(&reply).unwrap();
    assert_eq!(encoded["status"], "not_found");

    let reply = contract_template(Path("erc20".to_string())).await.0;
    let encoded = serde_json::to_value(&reply).unwrap();
    assert_eq!(encoded["template"]["name"], "ERC-20 Token");

    let reply = convert_units(Query(ConvertQuery {
        amount: 1.0,
        from_unit: "eth".to_string(),
        to_unit: "gwei".to_string(),
    }))
    .await
    .0;
    let encoded = serde_json::to_value(&reply).unwrap();
    assert_eq!(encoded["output"]["amount"], 1e9);

    // chain defaults to ethereum when the query omits it
    let reply = validate_address(Query(ValidateAddressQuery {
        address: "0x71C7656EC7ab88b098defB751B7401B5f6d8976F".to_string(),
        chain: None,
    }))
    .await
    .0;
    let encoded = serde_json::to_value(&reply).unwrap();
    assert_eq!(encoded["chain"], "ethereum");
    assert_eq!(encoded["is_valid"], true);
}

#[test]
fn generated_session_ids_are_unique_uuids() {
    let first = generate_session_id();
    let second = generate_session_id();
    assert_ne!(first, second);
    uuid::Uuid::parse_str(&first).expect("session id should be a UUID");
}
