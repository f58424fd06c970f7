//! Request handlers, one per workflow step.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use finsync_core::{DateRange, MonthlyBudget};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::{error::ApiError, AppState};

const PUBLIC_TOKENS_CREATED: &str = "New public tokens generated and old tokens cleared.";
const CREATE_PUBLIC_TOKENS_FAILED: &str = "Failed to create public tokens.";

const ACCESS_TOKENS_UPDATED: &str = "Access tokens updated successfully.";
const NO_PUBLIC_TOKENS: &str = "No public tokens found.";
const EXCHANGE_FAILED: &str = "Failed to exchange public tokens.";

const TRANSACTIONS_STORED: &str = "Transactions fetched and stored successfully for all tokens.";
const NO_ACCESS_TOKENS: &str = "No access tokens found.";
const GET_TRANSACTIONS_FAILED: &str = "Failed to fetch transactions for one or more tokens.";

const BUDGET_FAILED: &str = "Failed to calculate monthly budgets.";

/// Body of a successful step that only reports a message.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: &'static str,
}

impl MessageResponse {
    fn ok(message: &'static str) -> Json<Self> {
        Json(Self {
            success: true,
            message,
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetResponse {
    pub success: bool,
    pub monthly_budgets: MonthlyBudget,
}

/// Body of a transaction fetch request. Both dates are passed through as is.
#[derive(Debug, Clone, Deserialize)]
pub struct GetTransactionsRequest {
    pub start_date: String,
    pub end_date: String,
}

pub async fn create_public_tokens(
    State(state): State<AppState>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .context
        .token_provisioner()
        .provision()
        .await
        .map_err(|e| ApiError::failed(CREATE_PUBLIC_TOKENS_FAILED, e))?;

    Ok(MessageResponse::ok(PUBLIC_TOKENS_CREATED))
}

pub async fn exchange_public_tokens(
    State(state): State<AppState>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .context
        .token_exchanger()
        .exchange()
        .await
        .map_err(|e| ApiError::from_core(e, NO_PUBLIC_TOKENS, EXCHANGE_FAILED))?;

    Ok(MessageResponse::ok(ACCESS_TOKENS_UPDATED))
}

/// An unreadable body counts as a failed fetch, not a client error.
pub async fn get_transactions(
    State(state): State<AppState>,
    body: Result<Json<GetTransactionsRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Json(request) = body.map_err(|e| ApiError::failed(GET_TRANSACTIONS_FAILED, e.body_text()))?;
    let range = DateRange::new(request.start_date, request.end_date);

    state
        .context
        .transaction_sync()
        .sync(&range)
        .await
        .map_err(|e| ApiError::from_core(e, NO_ACCESS_TOKENS, GET_TRANSACTIONS_FAILED))?;

    Ok(MessageResponse::ok(TRANSACTIONS_STORED))
}

pub async fn calculate_monthly_budget(
    State(state): State<AppState>,
) -> Result<Json<BudgetResponse>, ApiError> {
    let monthly_budgets = state
        .context
        .budget_service()
        .monthly_budget()
        .await
        .map_err(|e| ApiError::failed(BUDGET_FAILED, e))?;

    Ok(Json(BudgetResponse {
        success: true,
        monthly_budgets,
    }))
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
