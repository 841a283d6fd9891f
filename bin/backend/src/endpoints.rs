use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use buddy_tools::{
    convert_crypto_units, explain_gas_fees, get_blockchain_info, get_contract_template,
    validate_wallet_address, AddressValidation, ChainInfo, Conversion, GasFees, TemplateInfo,
    ToolReply,
};

use crate::manager::{generate_session_id, SessionManager};

const AGENT_NAME: &str = "BlockchainBuddy";
const EMPTY_REPLY_FALLBACK: &str =
    "I apologize, but I couldn't generate a response. Please try again.";

type SharedSessionManager = Arc<SessionManager>;

// API Types
#[derive(Deserialize)]
pub(crate) struct ChatRequest {
    pub(crate) message: String,
    pub(crate) session_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ChatResponse {
    pub(crate) response: String,
    pub(crate) session_id: String,
    pub(crate) timestamp: String,
}

#[derive(Serialize)]
pub(crate) struct HealthResponse {
    pub(crate) status: &'static str,
    pub(crate) agent_name: &'static str,
    pub(crate) timestamp: String,
}

#[derive(Serialize)]
pub(crate) struct SessionDeleted {
    pub(crate) status: &'static str,
    pub(crate) session_id: String,
}

#[derive(Deserialize)]
pub(crate) struct ValidateAddressQuery {
    pub(crate) address: String,
    pub(crate) chain: Option<String>,
}

#[derive(Deserialize)]
pub(crate) struct ConvertQuery {
    pub(crate) amount: f64,
    pub(crate) from_unit: String,
    pub(crate) to_unit: String,
}

fn health_response(status: &'static str) -> Json<HealthResponse> {
    Json(HealthResponse {
        status,
        agent_name: AGENT_NAME,
        timestamp: Utc::now().to_rfc3339(),
    })
}

// HTTP Handlers
pub(crate) async fn root() -> Json<HealthResponse> {
    health_response("online")
}

pub(crate) async fn health() -> Json<HealthResponse> {
    health_response("healthy")
}

pub(crate) async fn chat_endpoint(
    State(session_manager): State<SharedSessionManager>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, (StatusCode, String)> {
    let session_id = request.session_id.unwrap_or_else(generate_session_id);

    let session_state = session_manager.get_or_create_session(&session_id).await;
    let mut state = session_state.lock().await;

    let response = state.run_turn(&request.message).await.map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Error processing request: {e}"),
        )
    })?;

    let response = if response.is_empty() {
        EMPTY_REPLY_FALLBACK.to_string()
    } else {
        response
    };

    Ok(Json(ChatResponse {
        response,
        session_id,
        timestamp: Utc::now().to_rfc3339(),
    }))
}

pub(crate) async fn delete_session(
    State(session_manager): State<SharedSessionManager>,
    Path(session_id): Path<String>,
) -> Json<SessionDeleted> {
    session_manager.remove_session(&session_id).await;
    Json(SessionDeleted {
        status: "deleted",
        session_id,
    })
}

// Direct tool endpoints
pub(crate) async fn blockchain_info(
    Path(chain_name): Path<String>,
) -> Json<ToolReply<ChainInfo>> {
    Json(get_blockchain_info(&chain_name))
}

pub(crate) async fn validate_address(
    Query(query): Query<ValidateAddressQuery>,
) -> Json<ToolReply<AddressValidation>> {
    let chain = query.chain.as_deref().unwrap_or("ethereum");
    Json(validate_wallet_address(&query.address, chain))
}

pub(crate) async fn gas_fees(Path(chain): Path<String>) -> Json<ToolReply<GasFees>> {
    Json(explain_gas_fees(&chain))
}

pub(crate) async fn contract_template(
    Path(contract_type): Path<String>,
) -> Json<ToolReply<TemplateInfo>> {
    Json(get_contract_template(&contract_type))
}

pub(crate) async fn convert_units(Query(query): Query<ConvertQuery>) -> Json<ToolReply<Conversion>> {
    Json(convert_crypto_units(
        query.amount,
        &query.from_unit,
        &query.to_unit,
    ))
}
