use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::Local;
use serde::Serialize;
use tokio::sync::{mpsc, RwLock};
use tracing::warn;

use buddy_agent::{AgentMessage, ChatApp, Message};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum MessageSender {
    #[serde(rename = "user")]
    User,
    #[serde(rename = "agent")]
    Assistant,
    #[serde(rename = "system")]
    System,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub sender: MessageSender,
    pub content: String,
    pub timestamp: String,
}

/// Seam between the session layer and the agent runtime. The production
/// implementation is [`ChatApp`]; tests script their own.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn process_message(
        &self,
        history: Arc<RwLock<Vec<Message>>>,
        input: String,
        sender_to_ui: &mpsc::Sender<AgentMessage>,
    ) -> Result<()>;
}

#[async_trait]
impl ChatBackend for ChatApp {
    async fn process_message(
        &self,
        history: Arc<RwLock<Vec<Message>>>,
        input: String,
        sender_to_ui: &mpsc::Sender<AgentMessage>,
    ) -> Result<()> {
        ChatApp::process_message(self, history, input, sender_to_ui)
            .await
            .map_err(|e| anyhow::anyhow!("{e}"))
    }
}

/// Conversation state for one session: the UI-facing transcript plus the
/// channels to this session's dedicated agent task.
pub struct SessionState {
    pub messages: Vec<ChatMessage>,
    pub is_processing: bool,
    sender_to_llm: mpsc::Sender<String>,
    receiver_from_llm: mpsc::Receiver<AgentMessage>,
}

impl SessionState {
    pub fn new(backend: Arc<dyn ChatBackend>) -> Self {
        // llm <- backend <- ui
        let (sender_to_llm, mut receiver_from_ui) = mpsc::channel::<String>(100);
        // ui <- backend <- llm
        let (sender_to_ui, receiver_from_llm) = mpsc::channel(100);

        let agent_history: Arc<RwLock<Vec<Message>>> = Arc::new(RwLock::new(Vec::new()));

        tokio::spawn(async move {
            while let Some(input) = receiver_from_ui.recv().await {
                if let Err(e) = backend
                    .process_message(Arc::clone(&agent_history), input, &sender_to_ui)
                    .await
                {
                    warn!(target: "backend::session", error = %e, "agent turn failed");
                    let _ = sender_to_ui.send(AgentMessage::Error(e.to_string())).await;
                }
            }
        });

        Self {
            messages: vec![],
            is_processing: false,
            sender_to_llm,
            receiver_from_llm,
        }
    }

    /// Sends one user message and waits for the complete assistant reply.
    ///
    /// Tool invocations and informational events are recorded in the
    /// transcript as system messages along the way. An `Error` event from
    /// the agent runtime fails the turn.
    pub async fn run_turn(&mut self, message: &str) -> Result<String> {
        let message = message.trim();
        if message.is_empty() {
            return Ok(String::new());
        }

        self.append(MessageSender::User, message);
        self.is_processing = true;

        if self.sender_to_llm.send(message.to_string()).await.is_err() {
            self.is_processing = false;
            anyhow::bail!("agent task disconnected");
        }

        let mut response = String::new();
        loop {
            let Some(msg) = self.receiver_from_llm.recv().await else {
                self.is_processing = false;
                anyhow::bail!("agent task disconnected");
            };
            match msg {
                AgentMessage::StreamingText(text) => response.push_str(&text),
                AgentMessage::ToolCall { name, args } => {
                    self.append(MessageSender::System, &format!("tool: {name} | args: {args}"));
                }
                AgentMessage::System(info) => self.append(MessageSender::System, &info),
                AgentMessage::Complete => break,
                AgentMessage::Error(err) => {
                    self.is_processing = false;
                    anyhow::bail!("{err}");
                }
            }
        }

        self.is_processing = false;
        self.append(MessageSender::Assistant, &response);
        Ok(response)
    }

    fn append(&mut self, sender: MessageSender, content: &str) {
        self.messages.push(ChatMessage {
            sender,
            content: content.to_string(),
            timestamp: Local::now().format("%H:%M:%S %Z").to_string(),
        });
    }
}
