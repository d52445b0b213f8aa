use log::debug;
use sqlx::SqliteConnection;

use crate::{
    db_types::{Account, AccountStatus, NewAccount, SpamCounter},
    traits::StorageError,
};

pub async fn fetch_account(account_id: i64, conn: &mut SqliteConnection) -> Result<Option<Account>, sqlx::Error> {
    let account =
        sqlx::query_as("SELECT * FROM accounts WHERE id = $1").bind(account_id).fetch_optional(conn).await?;
    Ok(account)
}

pub async fn fetch_account_by_username(
    username: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Account>, sqlx::Error> {
    let account =
        sqlx::query_as("SELECT * FROM accounts WHERE username = $1").bind(username).fetch_optional(conn).await?;
    Ok(account)
}

pub async fn insert_account(account: NewAccount, conn: &mut SqliteConnection) -> Result<Account, StorageError> {
    let username = account.username.clone();
    let result = sqlx::query_as("INSERT INTO accounts (username, email) VALUES ($1, $2) RETURNING *")
        .bind(account.username)
        .bind(account.email)
        .fetch_one(conn)
        .await;
    match result {
        Ok(account) => Ok(account),
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(StorageError::AccountAlreadyExists(username)),
        Err(e) => Err(e.into()),
    }
}

pub async fn update_account_status(
    account_id: i64,
    status: AccountStatus,
    conn: &mut SqliteConnection,
) -> Result<Account, StorageError> {
    let account: Option<Account> =
        sqlx::query_as("UPDATE accounts SET status = $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2 RETURNING *")
            .bind(status)
            .bind(account_id)
            .fetch_optional(conn)
            .await?;
    account.ok_or(StorageError::AccountNotFound(account_id))
}

/// Upserts the abuse counter. The insert-or-increment is a single statement, so concurrent signals for the same
/// account are never lost.
pub async fn increment_spam_counter(
    account_id: i64,
    conn: &mut SqliteConnection,
) -> Result<SpamCounter, sqlx::Error> {
    let counter: SpamCounter = sqlx::query_as(
        r#"
            INSERT INTO spam_counters (account_id, count) VALUES ($1, 1)
            ON CONFLICT (account_id) DO UPDATE SET
                count = spam_counters.count + 1,
                updated_at = CURRENT_TIMESTAMP
            RETURNING *;
        "#,
    )
    .bind(account_id)
    .fetch_one(conn)
    .await?;
    debug!("🚫️ Spam counter for account {account_id} is now {}", counter.count);
    Ok(counter)
}

pub async fn fetch_spam_counter(
    account_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<SpamCounter>, sqlx::Error> {
    let counter = sqlx::query_as("SELECT * FROM spam_counters WHERE account_id = $1")
        .bind(account_id)
        .fetch_optional(conn)
        .await?;
    Ok(counter)
}
