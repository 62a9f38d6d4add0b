use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use shared::{
    AccountResponse, CreateDepositRequest, CreateTransferRequest, CreateWithdrawalRequest,
    RegisterRequest, TransactionResponse, UserResponse,
};
use time::format_description::well_known::Rfc3339;
use tracing::info;

use crate::accounts::Account;
use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::transactions::TransactionRecord;
use crate::AppState;

fn account_body(account: &Account) -> AccountResponse {
    AccountResponse { id: account.id, balance: account.balance }
}

fn transaction_body(entry: &TransactionRecord) -> TransactionResponse {
    TransactionResponse {
        id: entry.id,
        from_account_id: entry.from_account_id,
        to_account_id: entry.to_account_id,
        amount: entry.amount,
        created_at: entry.created_at.format(&Rfc3339).unwrap_or_default(),
    }
}

/// Axum handler for GET /health
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "ok": true }))
}

/// Axum handler for POST /auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    info!("POST /auth/register - username: {}", request.username);

    let user = state.auth.register(&request.username, &request.password).await?;
    Ok((StatusCode::CREATED, Json(UserResponse { username: user.username })))
}

/// Axum handler for GET /auth/me
pub async fn me(user: AuthUser) -> Json<UserResponse> {
    Json(UserResponse { username: user.username })
}

/// Axum handler for GET /users/:username
pub async fn get_user(
    State(state): State<AppState>,
    _caller: AuthUser,
    Path(username): Path<String>,
) -> Result<StatusCode, ApiError> {
    info!("GET /users/{}", username);

    if state.auth.user_exists(&username).await? {
        Ok(StatusCode::OK)
    } else {
        Err(ApiError::NotFound)
    }
}

/// Axum handler for POST /accounts
pub async fn create_account(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    info!("POST /accounts - user: {}", user.username);

    let account = state.accounts.create_account(&user).await?;
    Ok((StatusCode::CREATED, Json(account_body(&account))))
}

/// Axum handler for GET /accounts/:id
pub async fn get_account(
    State(state): State<AppState>,
    user: AuthUser,
    Path(account_id): Path<i64>,
) -> Result<Json<AccountResponse>, ApiError> {
    info!("GET /accounts/{} - user: {}", account_id, user.username);

    let account = state.accounts.get_account(account_id, &user).await?;
    Ok(Json(account_body(&account)))
}

/// Axum handler for GET /accounts
pub async fn list_accounts(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<AccountResponse>>, ApiError> {
    info!("GET /accounts - user: {}", user.username);

    let accounts = state.accounts.list_accounts(&user).await?;
    Ok(Json(accounts.iter().map(account_body).collect()))
}

/// Axum handler for POST /transactions/deposit
pub async fn create_deposit(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<CreateDepositRequest>,
) -> Result<impl IntoResponse, ApiError> {
    info!(
        "POST /transactions/deposit - account: {}, amount: {}",
        request.account_id, request.amount
    );

    let entry = state
        .transactions
        .deposit(&user, request.account_id, request.amount)
        .await?;
    Ok((StatusCode::CREATED, Json(transaction_body(&entry))))
}

/// Axum handler for POST /transactions/withdrawal
pub async fn create_withdrawal(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<CreateWithdrawalRequest>,
) -> Result<impl IntoResponse, ApiError> {
    info!(
        "POST /transactions/withdrawal - account: {}, amount: {}",
        request.account_id, request.amount
    );

    let entry = state
        .transactions
        .withdraw(&user, request.account_id, request.amount)
        .await?;
    Ok((StatusCode::CREATED, Json(transaction_body(&entry))))
}

/// Axum handler for POST /transactions/transfer
pub async fn create_transfer(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<CreateTransferRequest>,
) -> Result<impl IntoResponse, ApiError> {
    info!(
        "POST /transactions/transfer - from: {}, to: {}, amount: {}",
        request.from_account_id, request.to_account_id, request.amount
    );

    let entry = state
        .transactions
        .transfer(
            &user,
            request.from_account_id,
            request.to_account_id,
            request.amount,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(transaction_body(&entry))))
}

/// Axum handler for GET /transactions/account/:id
pub async fn list_account_transactions(
    State(state): State<AppState>,
    user: AuthUser,
    Path(account_id): Path<i64>,
) -> Result<Json<Vec<TransactionResponse>>, ApiError> {
    info!("GET /transactions/account/{} - user: {}", account_id, user.username);

    let entries = state.transactions.list_for_account(&user, account_id).await?;
    Ok(Json(entries.iter().map(transaction_body).collect()))
}
