use sqlx::FromRow;
use time::OffsetDateTime;
use tracing::info;

use crate::auth::AuthUser;
use crate::db::DbConnection;
use crate::error::ApiError;

/// An account row. Balances are fixed-point minor units (cents).
#[derive(Debug, Clone, FromRow)]
pub struct Account {
    pub id: i64,
    pub user_id: i64,
    pub balance: i64,
    pub created_at: OffsetDateTime,
}

/// Account ledger operations, always scoped to the calling user.
#[derive(Clone)]
pub struct AccountService {
    db: DbConnection,
}

impl AccountService {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    /// Open a zero-balance account owned by the caller.
    pub async fn create_account(&self, owner: &AuthUser) -> Result<Account, ApiError> {
        let account = sqlx::query_as::<_, Account>(
            "INSERT INTO accounts (user_id, balance, created_at) VALUES (?1, 0, ?2) \
             RETURNING id, user_id, balance, created_at",
        )
        .bind(owner.id)
        .bind(OffsetDateTime::now_utc())
        .fetch_one(self.db.pool())
        .await?;

        info!("user {} opened account {}", owner.username, account.id);
        Ok(account)
    }

    /// Fetch one of the caller's accounts.
    ///
    /// An account that exists but belongs to someone else is reported exactly
    /// like a missing one.
    pub async fn get_account(
        &self,
        account_id: i64,
        owner: &AuthUser,
    ) -> Result<Account, ApiError> {
        sqlx::query_as::<_, Account>(
            "SELECT id, user_id, balance, created_at FROM accounts \
             WHERE id = ?1 AND user_id = ?2",
        )
        .bind(account_id)
        .bind(owner.id)
        .fetch_optional(self.db.pool())
        .await?
        .ok_or(ApiError::NotFound)
    }

    /// All of the caller's accounts, newest first. Owning no accounts yields
    /// an empty list, not an error.
    pub async fn list_accounts(&self, owner: &AuthUser) -> Result<Vec<Account>, ApiError> {
        let accounts = sqlx::query_as::<_, Account>(
            "SELECT id, user_id, balance, created_at FROM accounts \
             WHERE user_id = ?1 ORDER BY created_at DESC, id DESC",
        )
        .bind(owner.id)
        .fetch_all(self.db.pool())
        .await?;

        Ok(accounts)
    }
}

/// Apply `delta` to an account balance inside an open database transaction,
/// returning the resulting balance.
///
/// When `owner` is given the update is conditioned on ownership, and a
/// missing or foreign account yields `None`. Non-negativity is not checked
/// here; the movement protocol validates the returned balance before the
/// unit commits.
pub(crate) async fn adjust_balance(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    account_id: i64,
    delta: i64,
    owner: Option<&AuthUser>,
) -> Result<Option<i64>, sqlx::Error> {
    match owner {
        Some(user) => {
            sqlx::query_scalar(
                "UPDATE accounts SET balance = balance + ?1 \
                 WHERE id = ?2 AND user_id = ?3 RETURNING balance",
            )
            .bind(delta)
            .bind(account_id)
            .bind(user.id)
            .fetch_optional(&mut **tx)
            .await
        }
        None => {
            sqlx::query_scalar(
                "UPDATE accounts SET balance = balance + ?1 WHERE id = ?2 RETURNING balance",
            )
            .bind(delta)
            .bind(account_id)
            .fetch_optional(&mut **tx)
            .await
        }
    }
}
