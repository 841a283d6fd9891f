// Environment variables
static ANTHROPIC_API_KEY: std::sync::LazyLock<Result<String, std::env::VarError>> =
    std::sync::LazyLock::new(|| std::env::var("ANTHROPIC_API_KEY"));

use std::sync::Arc;

use eyre::Result;
use futures::StreamExt;
use rig::{
    agent::Agent,
    client::completion::CompletionClient,
    message::{Message, Text},
    providers::anthropic::{self, completion::CompletionModel},
};
use tokio::sync::{mpsc, RwLock};
use tracing::info;

use buddy_tools::{
    ConvertCryptoUnits, ExplainGasFees, GetBlockchainInfo, GetSmartContractTemplate,
    ValidateWalletAddress,
};

use crate::helpers::multi_turn_prompt;

pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";

/// Events surfaced to the session layer while a turn is processed.
#[derive(Debug, Clone)]
pub enum AgentMessage {
    StreamingText(String),
    ToolCall { name: String, args: String },
    Complete,
    Error(String),
    System(String),
}

const PREAMBLE: &str = r#"
You are BlockchainBuddy, an expert blockchain and cryptocurrency assistant. You help users with:

1. **Blockchain Information**: Explain different blockchain networks, their features, consensus mechanisms, and use cases.
2. **Wallet Address Validation**: Verify if wallet addresses are in the correct format for different chains.
3. **Gas Fee Explanations**: Help users understand gas fees, how they work, and tips to save on transaction costs.
4. **Smart Contract Development**: Provide templates and guidance for creating smart contracts (ERC-20, ERC-721, etc.).
5. **Unit Conversions**: Convert between crypto units (ETH/Gwei/Wei, BTC/Satoshi, SOL/Lamports).
6. **General Crypto Knowledge**: Answer questions about DeFi, NFTs, DAOs, Layer 2 solutions, and more.

<constraints>
- Always be accurate; if you're unsure about something, say so rather than guessing.
- Warn users about security best practices (never share private keys, verify contracts before interacting).
- Use the available tools to provide concrete data when possible.
- Explain complex concepts in simple terms.
- If a tool reports not_found or error, relay the valid options it suggests.
</constraints>
"#;

/// Builds and owns the tool-equipped Anthropic agent.
pub struct ChatApp {
    agent: Arc<Agent<CompletionModel>>,
}

impl ChatApp {
    pub fn new(model: Option<&str>) -> Result<Self> {
        let anthropic_api_key = ANTHROPIC_API_KEY
            .as_ref()
            .map_err(|_| eyre::eyre!("ANTHROPIC_API_KEY not set"))?
            .clone();

        let client = anthropic::Client::new(&anthropic_api_key);
        let agent = client
            .agent(model.unwrap_or(DEFAULT_MODEL))
            .preamble(PREAMBLE)
            .tool(GetBlockchainInfo)
            .tool(ValidateWalletAddress)
            .tool(ExplainGasFees)
            .tool(GetSmartContractTemplate)
            .tool(ConvertCryptoUnits)
            .build();

        Ok(Self {
            agent: Arc::new(agent),
        })
    }

    pub fn agent(&self) -> Arc<Agent<CompletionModel>> {
        Arc::clone(&self.agent)
    }

    /// Runs one conversational turn: streams the reply, executes any tool
    /// calls, and reports progress through `sender_to_ui`. On success the
    /// user message and final reply are appended to `history`.
    pub async fn process_message(
        &self,
        history: Arc<RwLock<Vec<Message>>>,
        input: String,
        sender_to_ui: &mpsc::Sender<AgentMessage>,
    ) -> Result<()> {
        let snapshot = history.read().await.clone();
        let mut stream = multi_turn_prompt(self.agent(), input.clone(), snapshot).await;
        let mut response = String::new();

        // Process stream content, splitting tool markers out of the text
        while let Some(content) = stream.next().await {
            match content {
                Ok(Text { text }) => {
                    if text.starts_with("[[TOOL_CALL:") && text.contains("]]") {
                        let marker_end = text.rfind("]]").unwrap_or(text.len());
                        let content = &text[12..marker_end];
                        if let Some(colon_idx) = content.find(':') {
                            let name = content[..colon_idx].to_string();
                            let args = content[colon_idx + 1..].to_string();
                            info!(target: "buddy_agent", tool = %name, "agent invoked tool");
                            let _ = sender_to_ui.send(AgentMessage::ToolCall { name, args }).await;
                        }
                    } else if text.starts_with("[[TOOL_RESULT:") && text.contains("]]") {
                        let marker_end = text.rfind("]]").unwrap_or(text.len());
                        let result = &text[14..marker_end];
                        let _ = sender_to_ui.send(AgentMessage::System(result.to_string())).await;
                    } else if text.starts_with("[[TOOL_ERROR:") && text.contains("]]") {
                        // Tool failures are not fatal: the model sees the
                        // error text and can recover, so report them as
                        // informational events.
                        let marker_end = text.rfind("]]").unwrap_or(text.len());
                        let error = &text[13..marker_end];
                        let _ = sender_to_ui
                            .send(AgentMessage::System(format!("error: {error}")))
                            .await;
                    } else {
                        response.push_str(&text);
                        let _ = sender_to_ui.send(AgentMessage::StreamingText(text)).await;
                    }
                }
                Err(err) => {
                    let _ = sender_to_ui.send(AgentMessage::Error(err.to_string())).await;
                    return Ok(());
                }
            }
        }

        {
            let mut history = history.write().await;
            history.push(Message::user(input));
            history.push(Message::assistant(response));
        }
        let _ = sender_to_ui.send(AgentMessage::Complete).await;

        Ok(())
    }
}
