//! Toy banking ledger served over HTTP.
//!
//! Users register, open accounts and move money between them. Every money
//! movement runs as a single SQLite transaction, so balances stay consistent
//! under concurrent requests and no account is ever observed overdrawn.

pub mod accounts;
pub mod auth;
pub mod db;
pub mod error;
pub mod rest;
pub mod transactions;

use axum::routing::{get, post};
use axum::Router;

use crate::accounts::AccountService;
use crate::auth::AuthService;
use crate::db::DbConnection;
use crate::transactions::TransactionService;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthService,
    pub accounts: AccountService,
    pub transactions: TransactionService,
}

impl AppState {
    /// Create application state with all services backed by one database
    pub fn new(db: DbConnection) -> Self {
        Self {
            auth: AuthService::new(db.clone()),
            accounts: AccountService::new(db.clone()),
            transactions: TransactionService::new(db),
        }
    }
}

/// Build the full application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(rest::health))
        .route("/auth/register", post(rest::register))
        .route("/auth/me", get(rest::me))
        .route("/users/:username", get(rest::get_user))
        .route("/accounts", post(rest::create_account).get(rest::list_accounts))
        .route("/accounts/:id", get(rest::get_account))
        .route("/transactions/deposit", post(rest::create_deposit))
        .route("/transactions/withdrawal", post(rest::create_withdrawal))
        .route("/transactions/transfer", post(rest::create_transfer))
        .route("/transactions/account/:id", get(rest::list_account_transactions))
        .with_state(state)
}
