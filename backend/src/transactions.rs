use sqlx::FromRow;
use time::OffsetDateTime;
use tracing::info;

use crate::accounts::adjust_balance;
use crate::auth::AuthUser;
use crate::db::DbConnection;
use crate::error::ApiError;

/// One immutable entry in the append-only transaction log.
#[derive(Debug, Clone, FromRow)]
pub struct TransactionRecord {
    pub id: i64,
    pub from_account_id: Option<i64>,
    pub to_account_id: Option<i64>,
    pub amount: i64,
    pub created_at: OffsetDateTime,
}

/// Money-movement protocol: deposits, withdrawals and transfers.
///
/// Every operation runs as a single database transaction: balance updates
/// and the matching log entry commit together or not at all. Returning an
/// error before `commit` drops the transaction, which rolls back any
/// tentative writes.
#[derive(Clone)]
pub struct TransactionService {
    db: DbConnection,
}

impl TransactionService {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    /// Deposit `amount` minor units into one of the caller's accounts.
    pub async fn deposit(
        &self,
        owner: &AuthUser,
        account_id: i64,
        amount: i64,
    ) -> Result<TransactionRecord, ApiError> {
        if amount <= 0 {
            return Err(ApiError::InvalidAmount);
        }

        let mut tx = self.db.pool().begin().await?;

        if adjust_balance(&mut tx, account_id, amount, Some(owner)).await?.is_none() {
            return Err(ApiError::NotFound);
        }
        let entry = record(&mut tx, None, Some(account_id), amount).await?;

        tx.commit().await?;
        info!("deposit of {} into account {}", amount, account_id);
        Ok(entry)
    }

    /// Withdraw `amount` minor units from one of the caller's accounts.
    ///
    /// The delta is applied first and the resulting balance checked inside
    /// the same transaction. The store serializes writers on the account
    /// row, so a concurrent withdrawal always sees the previous one's
    /// committed balance; there is no read-then-write window.
    pub async fn withdraw(
        &self,
        owner: &AuthUser,
        account_id: i64,
        amount: i64,
    ) -> Result<TransactionRecord, ApiError> {
        if amount <= 0 {
            return Err(ApiError::InvalidAmount);
        }

        let mut tx = self.db.pool().begin().await?;

        let balance = match adjust_balance(&mut tx, account_id, -amount, Some(owner)).await? {
            Some(balance) => balance,
            None => return Err(ApiError::NotFound),
        };
        if balance < 0 {
            tx.rollback().await?;
            return Err(ApiError::InsufficientFunds);
        }
        let entry = record(&mut tx, Some(account_id), None, amount).await?;

        tx.commit().await?;
        info!("withdrawal of {} from account {}", amount, account_id);
        Ok(entry)
    }

    /// Move `amount` minor units between two accounts.
    ///
    /// Only the source account must belong to the caller; the destination
    /// may be any existing account, which is what makes person-to-person
    /// transfers possible.
    pub async fn transfer(
        &self,
        owner: &AuthUser,
        from_account_id: i64,
        to_account_id: i64,
        amount: i64,
    ) -> Result<TransactionRecord, ApiError> {
        if amount <= 0 {
            return Err(ApiError::InvalidAmount);
        }
        if from_account_id == to_account_id {
            return Err(ApiError::SameAccount);
        }

        let mut tx = self.db.pool().begin().await?;

        let from_balance =
            match adjust_balance(&mut tx, from_account_id, -amount, Some(owner)).await? {
                Some(balance) => balance,
                None => return Err(ApiError::NotFound),
            };
        if adjust_balance(&mut tx, to_account_id, amount, None).await?.is_none() {
            return Err(ApiError::NotFound);
        }
        if from_balance < 0 {
            tx.rollback().await?;
            return Err(ApiError::InsufficientFunds);
        }
        let entry = record(&mut tx, Some(from_account_id), Some(to_account_id), amount).await?;

        tx.commit().await?;
        info!(
            "transfer of {} from account {} to account {}",
            amount, from_account_id, to_account_id
        );
        Ok(entry)
    }

    /// Log entries touching one of the caller's accounts, newest first.
    ///
    /// An account the caller cannot see is `NotFound`; a visible account
    /// with no history yields an empty list.
    pub async fn list_for_account(
        &self,
        owner: &AuthUser,
        account_id: i64,
    ) -> Result<Vec<TransactionRecord>, ApiError> {
        let visible: Option<i64> =
            sqlx::query_scalar("SELECT 1 FROM accounts WHERE id = ?1 AND user_id = ?2")
                .bind(account_id)
                .bind(owner.id)
                .fetch_optional(self.db.pool())
                .await?;
        if visible.is_none() {
            return Err(ApiError::NotFound);
        }

        let entries = sqlx::query_as::<_, TransactionRecord>(
            "SELECT id, from_account_id, to_account_id, amount, created_at FROM transactions \
             WHERE from_account_id = ?1 OR to_account_id = ?1 \
             ORDER BY created_at DESC, id DESC",
        )
        .bind(account_id)
        .fetch_all(self.db.pool())
        .await?;

        Ok(entries)
    }
}

/// Append one immutable log entry inside an open database transaction.
/// Callers guarantee `amount > 0` and at least one populated endpoint.
async fn record(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    from_account_id: Option<i64>,
    to_account_id: Option<i64>,
    amount: i64,
) -> Result<TransactionRecord, sqlx::Error> {
    sqlx::query_as::<_, TransactionRecord>(
        "INSERT INTO transactions (from_account_id, to_account_id, amount, created_at) \
         VALUES (?1, ?2, ?3, ?4) \
         RETURNING id, from_account_id, to_account_id, amount, created_at",
    )
    .bind(from_account_id)
    .bind(to_account_id)
    .bind(amount)
    .bind(OffsetDateTime::now_utc())
    .fetch_one(&mut **tx)
    .await
}
