use crate::{
    db_types::{Account, AccountStatus, NewAccount, SpamCounter},
    traits::StorageError,
};

#[allow(async_fn_in_trait)]
pub trait AccountManagement: Clone {
    async fn fetch_account(&self, account_id: i64) -> Result<Option<Account>, StorageError>;

    async fn fetch_account_by_username(&self, username: &str) -> Result<Option<Account>, StorageError>;

    /// Creates a new `ACTIVE` account. Usernames are unique.
    async fn insert_account(&self, account: NewAccount) -> Result<Account, StorageError>;

    async fn set_account_status(&self, account_id: i64, status: AccountStatus) -> Result<Account, StorageError>;

    /// Atomically increments the abuse counter for the account, creating it with a count of 1 if it does not exist.
    /// Returns the counter after the increment.
    async fn increment_spam_counter(&self, account_id: i64) -> Result<SpamCounter, StorageError>;

    async fn fetch_spam_counter(&self, account_id: i64) -> Result<Option<SpamCounter>, StorageError>;
}
